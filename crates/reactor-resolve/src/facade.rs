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

//! Drives a [`Solver`] with namespaces and requirements shaped by a
//! [`TargetPlatform`].

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use reactor_platform::{
    ChainedFilter, FilterEvaluator, LocalUsageReport, ModuleUnits, TargetPlatform,
    TargetPlatformBuilder,
};
use reactor_util::{
    ArtifactKey, ArtifactLocation, ReactorModule, Requirement, TargetEnvironment, UnitKey, UnitRef,
    UnitSet, UnitSetKind,
};
use semver::Version;

use crate::{
    closure::ResolvedClosure,
    error::ResolveError,
    result::{ArtifactUnavailable, LocationMap, ResolutionResult, ResolvedUnits},
    solver::{SlicingSolver, SolveRequest, Solver},
};

/// Per-scenario resolution settings layered over a target platform.
///
/// Configuration accumulates across calls until [`Self::clear`] is called.
/// Use one resolver per independent scenario.
pub struct PlatformResolver<S = SlicingSolver> {
    solver: S,
    environments: Vec<TargetEnvironment>,
    extra_units: Vec<(UnitRef, Option<PathBuf>)>,
    extra_filters: ChainedFilter,
    extra_requirements: Vec<Requirement>,
}

impl Default for PlatformResolver<SlicingSolver> {
    fn default() -> Self {
        Self::new(SlicingSolver)
    }
}

impl<S: Solver> PlatformResolver<S> {
    pub fn new(solver: S) -> Self {
        PlatformResolver {
            solver,
            environments: Vec::new(),
            extra_units: Vec::new(),
            extra_filters: ChainedFilter::new(),
            extra_requirements: Vec::new(),
        }
    }

    pub fn add_environment(&mut self, environment: TargetEnvironment) -> &mut Self {
        self.environments.push(environment);
        self
    }

    pub fn set_environments(
        &mut self,
        environments: impl IntoIterator<Item = TargetEnvironment>,
    ) -> &mut Self {
        self.environments = environments.into_iter().collect();
        self
    }

    /// Adds a unit that is not part of the platform, optionally with the
    /// file holding its bytes.
    pub fn add_extra_unit(&mut self, unit: UnitRef, file: Option<PathBuf>) -> &mut Self {
        self.extra_units.push((unit, file));
        self
    }

    /// Adds a filter applied after the platform's own filter.
    pub fn add_extra_filter(&mut self, filter: Arc<dyn FilterEvaluator>) -> &mut Self {
        self.extra_filters = std::mem::take(&mut self.extra_filters).then(filter);
        self
    }

    pub fn add_extra_requirement(&mut self, requirement: Requirement) -> &mut Self {
        self.extra_requirements.push(requirement);
        self
    }

    pub fn environments(&self) -> &[TargetEnvironment] {
        &self.environments
    }

    pub fn extra_requirements(&self) -> &[Requirement] {
        &self.extra_requirements
    }

    /// Drops all accumulated configuration.
    pub fn clear(&mut self) {
        self.environments.clear();
        self.extra_units.clear();
        self.extra_filters = ChainedFilter::new();
        self.extra_requirements.clear();
    }

    /// Resolves the module rooted at `module_path` once per configured
    /// environment, in configuration order. Without any environment a single
    /// environment-agnostic result is returned.
    ///
    /// An unknown module fails the whole call. An unsatisfiable environment
    /// only fails its own entry.
    pub fn resolve_for_module(
        &self,
        platform: &TargetPlatform,
        module_path: &Path,
    ) -> Result<Vec<ResolutionResult>, ResolveError> {
        self.resolve_for_module_with_report(platform, module_path)
            .map(|(results, _)| results)
    }

    /// Like [`Self::resolve_for_module`], also returning the local usage
    /// report computed once over the units used by all environments.
    pub fn resolve_for_module_with_report(
        &self,
        platform: &TargetPlatform,
        module_path: &Path,
    ) -> Result<(Vec<ResolutionResult>, Option<LocalUsageReport>), ResolveError> {
        let module = platform.module(module_path)?;
        log::debug!("Resolving module {}", module.name());
        let roots = self.roots(module.requirements());
        let namespace = self.namespace(platform);
        let module_units = platform.module_units();

        let results = if self.environments.is_empty() {
            vec![self.resolve_in(platform, &module_units, &namespace, &roots, None, |c| c)]
        } else {
            self.environments
                .iter()
                .map(|env| {
                    self.resolve_in(platform, &module_units, &namespace, &roots, Some(env), |c| c)
                })
                .collect()
        };
        let report = report_local_usage(platform, &results);
        Ok((results, report))
    }

    /// Resolves what the module at `module_path` depends on, ignoring target
    /// environments. The module's own primary units are left out of the
    /// closure.
    pub fn collect_dependencies(
        &self,
        platform: &TargetPlatform,
        module_path: &Path,
    ) -> Result<ResolutionResult, ResolveError> {
        let module = platform.module(module_path)?;
        let own = platform.module_units_of(module_path, UnitSetKind::Primary)?;
        let roots = self.roots(module.requirements());
        let namespace = self.namespace(platform);
        let module_units = platform.module_units();
        let result = self.resolve_in(platform, &module_units, &namespace, &roots, None, |closure| {
            closure.without(|unit| own.contains(unit.key()))
        });
        report_local_usage(platform, std::slice::from_ref(&result));
        Ok(result)
    }

    /// Builds a platform from `builder` and resolves only the extra
    /// requirements in `environment`.
    pub fn resolve_metadata(
        &self,
        builder: TargetPlatformBuilder,
        environment: &TargetEnvironment,
    ) -> ResolutionResult {
        let platform = builder.build();
        let namespace = self.namespace(&platform);
        let module_units = platform.module_units();
        let result = self.resolve_in(
            &platform,
            &module_units,
            &namespace,
            &self.extra_requirements,
            Some(environment),
            |c| c,
        );
        report_local_usage(&platform, std::slice::from_ref(&result));
        result
    }

    /// Resolves the closure of the unit `id@version`, ignoring modules and
    /// target environments.
    pub fn resolve_unit(
        &self,
        platform: &TargetPlatform,
        id: &str,
        version: &Version,
    ) -> Result<ResolutionResult, ResolveError> {
        let key = UnitKey::new(id, version.clone());
        if !platform.all_units().contains(&key) {
            return Err(ResolveError::UnitNotFound {
                id: id.to_string(),
                version: version.clone(),
            });
        }
        let roots = [Requirement::exact_unit(&key)];
        let namespace = self.namespace(platform);
        let module_units = platform.module_units();
        let result = self.resolve_in(platform, &module_units, &namespace, &roots, None, |c| c);
        report_local_usage(platform, std::slice::from_ref(&result));
        Ok(result)
    }

    fn roots(&self, own: Vec<Requirement>) -> Vec<Requirement> {
        let mut roots = own;
        roots.extend(self.extra_requirements.iter().cloned());
        roots
    }

    /// The platform units plus extra units, passed through the extra filters.
    /// Extra units also go through the platform filter first. Mandatory
    /// environment units survive any filter.
    fn namespace(&self, platform: &TargetPlatform) -> UnitSet {
        let mut extra: UnitSet = self
            .extra_units
            .iter()
            .map(|(unit, _)| Arc::clone(unit))
            .collect();
        if let Some(filter) = platform.filter() {
            filter.apply(&mut extra);
        }
        let mut units = platform.all_units().clone();
        units.extend(extra.iter().cloned());
        self.extra_filters.apply(&mut units);
        units.extend(platform.mandatory_units().iter().cloned());
        units
    }

    fn resolve_in(
        &self,
        platform: &TargetPlatform,
        module_units: &ModuleUnits,
        namespace: &UnitSet,
        roots: &[Requirement],
        environment: Option<&TargetEnvironment>,
        post_process: impl FnOnce(ResolvedClosure) -> ResolvedClosure,
    ) -> ResolutionResult {
        let request = SolveRequest {
            units: namespace,
            roots,
            environment,
            hints: platform.execution_environment_hints(),
            respect_filters: platform.config().resolve_with_environment_constraints,
        };
        let outcome = match self.solver.solve(&request) {
            Ok(closure) => {
                let closure = post_process(closure);
                let locations = self.locate(platform, module_units, &closure);
                Ok(ResolvedUnits::new(closure, locations))
            }
            Err(source) => {
                let error = ResolveError::Unsatisfiable {
                    environment: environment.cloned(),
                    source,
                };
                log::warn!("{error}");
                Err(error)
            }
        };
        ResolutionResult::new(environment.cloned(), outcome)
    }

    fn locate(
        &self,
        platform: &TargetPlatform,
        module_units: &ModuleUnits,
        closure: &ResolvedClosure,
    ) -> LocationMap {
        let mandatory = platform.mandatory_units();
        closure
            .units()
            .map(|unit| {
                let key = unit.key();
                let location = if let Some((_, module)) = module_units.get(key) {
                    Ok(ArtifactLocation::Module(module.basedir().to_owned()))
                } else if let Some(file) = self.extra_file(key) {
                    Ok(ArtifactLocation::File(file.to_owned()))
                } else if mandatory.iter().any(|m| m.key() == key) {
                    Ok(ArtifactLocation::ExecutionEnvironment)
                } else {
                    platform
                        .artifact_file(&ArtifactKey::from(&**unit))
                        .map(ArtifactLocation::File)
                        .ok_or_else(|| ArtifactUnavailable { unit: key.clone() })
                };
                (key.clone(), location)
            })
            .collect()
    }

    fn extra_file(&self, key: &UnitKey) -> Option<&Path> {
        self.extra_units
            .iter()
            .find(|(unit, _)| unit.key() == key)
            .and_then(|(_, file)| file.as_deref())
    }
}

/// Reports local usage once over the union of all successful closures.
fn report_local_usage(
    platform: &TargetPlatform,
    results: &[ResolutionResult],
) -> Option<LocalUsageReport> {
    let used: UnitSet = results
        .iter()
        .filter_map(ResolutionResult::units)
        .flat_map(|units| units.units().cloned())
        .collect();
    platform.report_local_usage(&used)
}
