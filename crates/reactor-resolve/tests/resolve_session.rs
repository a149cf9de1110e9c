// reactor: Target platform aggregation and resolution for multi-module builds.
// Copyright (C) 2024 International Digital Economy Academy
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//
// For inquiries, you can contact us via e-mail at jichuruanjian@idea.edu.cn.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use expect_test::expect;
use reactor_platform::{
    ArtifactProvider, FilterRule, JointArtifactProvider, LocalArtifactCache, RuleFilter,
    TargetPlatform, UnitMatcher,
};
use reactor_resolve::{PlatformResolver, ResolveError, ResolutionResult};
use reactor_util::{
    ArtifactKey, ArtifactLocation, ArtifactReference, EnvFilter, PlatformConfigBuilder,
    ProfileHints, ReactorProject, Requirement, TargetEnvironment, Unit, UnitRef, UnitSet,
};
use semver::{Version, VersionReq};
use test_log::test;

/// Files of already published artifacts.
struct PublishedRepo(HashMap<ArtifactKey, PathBuf>);

impl ArtifactProvider for PublishedRepo {
    fn artifact_file(&self, key: &ArtifactKey) -> Option<PathBuf> {
        self.0.get(key).cloned()
    }
}

fn v(s: &str) -> Version {
    s.parse().unwrap()
}

fn jre() -> UnitRef {
    Unit::new("a.jre.javase", v("17.0.0"))
        .with_package("javax.xml", v("17.0.0"))
        .into_ref()
}

fn guava(version: &str) -> UnitRef {
    Unit::new("com.google.guava", v(version))
        .with_package("com.google.common.collect", v(version))
        .into_ref()
}

fn swt() -> UnitRef {
    Unit::new("org.eclipse.swt.win32", v("3.124.0"))
        .with_capability("osgi.fragment", "org.eclipse.swt", v("3.124.0"))
        .with_filter(EnvFilter::os("win32"))
        .into_ref()
}

/// A session with two modules, published artifacts and a local cache holding
/// a locally built `org.example.util`.
fn session(cache_root: &Path) -> TargetPlatform {
    let util = Unit::new("org.example.util", v("2.0.0"))
        .with_package("org.example.util", v("2.0.0"))
        .into_ref();
    let mut cache = LocalArtifactCache::open(cache_root).unwrap();
    cache.add(util.clone(), "org.example.util_2.0.0.jar");
    cache.add(jre(), "a.jre.javase_17.0.0.jar");
    let cache = Arc::new(cache);

    let ui = ReactorProject::new("ui", "/work/ui")
        .publish(
            Unit::new("org.example.ui", v("1.0.0"))
                .with_requirement(Requirement::unit("org.example.core", VersionReq::STAR))
                .with_requirement(Requirement::capability(
                    "osgi.fragment",
                    "org.eclipse.swt",
                    VersionReq::STAR,
                ))
                .into_ref(),
        )
        .require(Requirement::unit("org.example.ui", VersionReq::STAR))
        .into_ref();
    let core = ReactorProject::new("core", "/work/core")
        .publish(
            Unit::new("org.example.core", v("1.0.0"))
                .with_requirement(Requirement::package(
                    "com.google.common.collect",
                    "^32".parse().unwrap(),
                ))
                .with_requirement(Requirement::package("org.example.util", VersionReq::STAR))
                .with_requirement(Requirement::package("javax.xml", VersionReq::STAR))
                .into_ref(),
        )
        .publish_secondary(Unit::new("org.example.core.tests", v("1.0.0")).into_ref())
        .require(Requirement::unit("org.example.core", VersionReq::STAR))
        .into_ref();

    let published = PublishedRepo(HashMap::from([
        (
            ArtifactKey::new("com.google.guava", v("32.1.0")),
            PathBuf::from("/repo/guava-32.1.0.jar"),
        ),
        (
            ArtifactKey::new("org.eclipse.swt.win32", v("3.124.0")),
            PathBuf::from("/repo/swt-win32.jar"),
        ),
    ]));

    let mut builder = TargetPlatform::builder()
        .module(ui)
        .module(core)
        .hints(Arc::new(
            ProfileHints::new("JavaSE-17")
                .with_mandatory(jre())
                .with_synthetic_prefix("a.jre"),
        ))
        .filter(Arc::new(RuleFilter::new(vec![FilterRule::remove(
            UnitMatcher::id("com.google.guava").with_version("<32".parse().unwrap()),
        )])))
        .artifact_provider(Arc::new(
            JointArtifactProvider::new()
                .with_provider(published)
                .with_provider(Arc::clone(&cache)),
        ))
        .local_cache(cache.clone())
        .local_cache_writer(cache.clone())
        .config(
            PlatformConfigBuilder::default()
                .include_local_repository(true)
                .build()
                .unwrap(),
        );
    for unit in [guava("31.1.0"), guava("32.1.0"), guava("33.0.0"), swt(), util] {
        let coordinates = format!("{}:{}", unit.id(), unit.version());
        builder = builder.external_artifact(unit, ArtifactReference::new(coordinates));
    }
    builder.build()
}

fn render(result: &ResolutionResult) -> String {
    let env = result
        .environment()
        .map_or_else(|| "any".to_string(), |e| e.to_string());
    match result.outcome() {
        Ok(units) => {
            let mut out = format!("[{env}]");
            for (key, location) in units.locations() {
                let location = match location {
                    Ok(ArtifactLocation::Module(dir)) => format!("module {}", dir.display()),
                    Ok(ArtifactLocation::File(file)) => match file.strip_prefix("/repo") {
                        Ok(rel) => format!("repo {}", rel.display()),
                        Err(_) => format!("local {}", file.file_name().unwrap().to_string_lossy()),
                    },
                    Ok(ArtifactLocation::ExecutionEnvironment) => "jre".to_string(),
                    Err(e) => e.to_string(),
                };
                out.push_str(&format!("\n{key} -> {location}"));
            }
            out
        }
        Err(e) => format!("[{env}] {e}"),
    }
}

#[test]
fn resolve_modules_per_environment() {
    let dir = tempfile::tempdir().unwrap();
    let platform = session(dir.path());

    expect![[r#"
        [
            org.example.ui@1.0.0,
            org.example.core@1.0.0,
            com.google.guava@32.1.0,
            com.google.guava@33.0.0,
            org.eclipse.swt.win32@3.124.0,
            org.example.util@2.0.0,
            a.jre.javase@17.0.0,
        ]
    "#]]
    .assert_debug_eq(&platform.all_units().iter().collect::<Vec<_>>());

    let mut resolver = PlatformResolver::default();
    resolver.set_environments([
        TargetEnvironment::new("win32", "win32", "x86_64"),
        TargetEnvironment::new("linux", "gtk", "x86_64"),
    ]);
    let results = resolver
        .resolve_for_module(&platform, Path::new("/work/ui"))
        .unwrap();
    let rendered: Vec<_> = results.iter().map(render).collect();
    expect![[r#"
        [win32/win32/x86_64]
        org.example.ui@1.0.0 -> module /work/ui
        org.example.core@1.0.0 -> module /work/core
        org.eclipse.swt.win32@3.124.0 -> repo swt-win32.jar
        com.google.guava@32.1.0 -> repo guava-32.1.0.jar
        org.example.util@2.0.0 -> local org.example.util_2.0.0.jar
        a.jre.javase@17.0.0 -> jre
        [linux/gtk/x86_64] cannot resolve requirements for environment linux/gtk/x86_64:
        missing capability osgi.fragment/org.eclipse.swt * required by org.example.ui@1.0.0"#]]
    .assert_eq(&rendered.join("\n"));

    let used: UnitSet = results[0].units().unwrap().units().cloned().collect();
    let report = platform.report_local_usage(&used).unwrap();
    expect![[r#"
        The following locally built units have been used to resolve dependencies:
          org.example.util/2.0.0"#]]
    .assert_eq(&report.message());

    platform.persist_local_artifact_cache().unwrap();
    let reopened = LocalArtifactCache::open(dir.path()).unwrap();
    assert_eq!(reopened.len(), 2);
}

#[test]
fn dependencies_unit_and_missing_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let platform = session(dir.path());
    let resolver = PlatformResolver::default();

    let deps = resolver
        .collect_dependencies(&platform, Path::new("/work/core"))
        .unwrap();
    expect![[r#"
        [any]
        com.google.guava@32.1.0 -> repo guava-32.1.0.jar
        org.example.util@2.0.0 -> local org.example.util_2.0.0.jar
        a.jre.javase@17.0.0 -> jre"#]]
    .assert_eq(&render(&deps));

    let unit = resolver
        .resolve_unit(&platform, "com.google.guava", &v("33.0.0"))
        .unwrap();
    expect![[r#"
        [any]
        com.google.guava@33.0.0 -> no artifact file available for com.google.guava@33.0.0"#]]
    .assert_eq(&render(&unit));

    let filtered = resolver.resolve_unit(&platform, "com.google.guava", &v("31.1.0"));
    assert!(matches!(filtered, Err(ResolveError::UnitNotFound { .. })));

    let missing = resolver.resolve_for_module(&platform, Path::new("/work/nowhere"));
    assert!(matches!(missing, Err(ResolveError::ModuleNotFound(_))));
}

#[test]
fn concurrent_resolution_is_consistent() {
    let dir = tempfile::tempdir().unwrap();
    let platform = session(dir.path());
    let rendered: Vec<String> = std::thread::scope(|s| {
        let handles: Vec<_> = ["/work/ui", "/work/core", "/work/ui", "/work/core"]
            .into_iter()
            .map(|root| {
                let platform = &platform;
                s.spawn(move || {
                    let mut resolver = PlatformResolver::default();
                    resolver.add_environment(TargetEnvironment::new("win32", "win32", "x86_64"));
                    let results = resolver
                        .resolve_for_module(platform, Path::new(root))
                        .unwrap();
                    render(&results[0])
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(rendered[0], rendered[2]);
    assert_eq!(rendered[1], rendered[3]);
    assert_ne!(rendered[0], rendered[1]);
}
