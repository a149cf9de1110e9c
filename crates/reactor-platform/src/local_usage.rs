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

//! Warns when a resolution was satisfied by units from the developer-local
//! cache, which makes the build irreproducible elsewhere.

use reactor_util::{ExecutionEnvironmentHints, PlatformConfig, UnitRef, UnitSet};

use crate::provider::LocalUnitCache;

/// Locally cached units that took part in a resolution.
#[derive(Debug, Clone)]
pub struct LocalUsageReport {
    units: Vec<UnitRef>,
}

impl LocalUsageReport {
    pub fn units(&self) -> &[UnitRef] {
        &self.units
    }

    /// The warning text, one `id/version` line per unit.
    pub fn message(&self) -> String {
        let mut msg = String::from(
            "The following locally built units have been used to resolve dependencies:",
        );
        for unit in &self.units {
            msg.push_str(&format!("\n  {}/{}", unit.id(), unit.version()));
        }
        msg
    }
}

/// Compares `used` against the local cache and logs a single warning naming
/// every locally built unit that is not an expected environment unit.
///
/// Never fails; a disabled setting or a missing cache produce no report.
pub fn report_local_usage(
    used: &UnitSet,
    local: Option<&dyn LocalUnitCache>,
    hints: &dyn ExecutionEnvironmentHints,
    config: &PlatformConfig,
) -> Option<LocalUsageReport> {
    if !config.include_local_repository {
        return None;
    }
    let local = local?;

    let mut local_units = local.cached_units().intersection(used);
    local_units.retain(|unit| !hints.is_non_applicable(unit));
    if local_units.is_empty() {
        return None;
    }

    let report = LocalUsageReport {
        units: local_units.iter().cloned().collect(),
    };
    log::warn!("{}", report.message());
    Some(report)
}

#[cfg(test)]
mod test {
    use expect_test::expect;
    use reactor_util::{PlatformConfigBuilder, ProfileHints, Unit};
    use test_log::test;

    use super::*;

    struct FixedCache(UnitSet);

    impl LocalUnitCache for FixedCache {
        fn cached_units(&self) -> UnitSet {
            self.0.clone()
        }
    }

    fn unit(id: &str, version: &str) -> UnitRef {
        Unit::new(id, version.parse().unwrap()).into_ref()
    }

    fn enabled() -> PlatformConfig {
        PlatformConfigBuilder::default()
            .include_local_repository(true)
            .build()
            .unwrap()
    }

    fn inputs(x_id: &str) -> (UnitSet, FixedCache) {
        let used = [unit(x_id, "1.0.0"), unit("y", "1.0.0")].into_iter().collect();
        let cache = FixedCache([unit(x_id, "1.0.0"), unit("z", "1.0.0")].into_iter().collect());
        (used, cache)
    }

    #[test]
    fn suppressed_environment_unit() {
        let (used, cache) = inputs("a.jre.x");
        let hints = ProfileHints::new("JavaSE-17").with_synthetic_prefix("a.jre.");
        let report = report_local_usage(&used, Some(&cache), &hints, &enabled());
        assert!(report.is_none());
    }

    #[test]
    fn signals_locally_built_unit() {
        let (used, cache) = inputs("x");
        let hints = ProfileHints::new("JavaSE-17").with_synthetic_prefix("a.jre.");
        let report = report_local_usage(&used, Some(&cache), &hints, &enabled()).unwrap();
        expect!["[x@1.0.0]"].assert_eq(&format!("{:?}", report.units()));
        expect![[r#"
            The following locally built units have been used to resolve dependencies:
              x/1.0.0"#]]
        .assert_eq(&report.message());
    }

    #[test]
    fn disabled_or_missing_cache() {
        let (used, cache) = inputs("x");
        let hints = ProfileHints::new("JavaSE-17");
        assert!(report_local_usage(&used, Some(&cache), &hints, &PlatformConfig::default()).is_none());
        assert!(report_local_usage(&used, None, &hints, &enabled()).is_none());
    }
}
