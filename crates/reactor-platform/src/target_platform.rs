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

//! The target platform: every unit visible to resolution in a build session.
//!
//! A [`TargetPlatform`] is merged once from four sources, in precedence order:
//!
//! 1. the primary units of the modules in this build,
//! 2. units read from repositories, which carry no artifact provenance,
//! 3. units built elsewhere and referenced as external artifacts,
//! 4. the mandatory units of the execution environment.
//!
//! When two sources publish the same `(id, version)` the earlier source
//! wins, so a module's own unit is never shadowed by an external one. The
//! merged namespace and the artifact provenance map never change after
//! [`TargetPlatformBuilder::build`], which makes a platform safe to read from
//! several threads.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use indexmap::IndexMap;
use reactor_util::{
    ArtifactKey, ArtifactReference, ExecutionEnvironmentHints, ModuleRef, PlatformConfig,
    ProfileHints, Unit, UnitKey, UnitRef, UnitSet, UnitSetKind,
};

use crate::{
    error::PlatformError,
    filter::{apply_optional, FilterEvaluator},
    local_usage::{report_local_usage, LocalUsageReport},
    provider::{ArtifactProvider, LocalCacheWriter, LocalUnitCache},
};

/// Module-contributed units mapped to the module that published them.
pub type ModuleUnits = IndexMap<UnitKey, (UnitRef, ModuleRef)>;

pub struct TargetPlatform {
    units: UnitSet,
    modules: Vec<ModuleRef>,
    external_artifacts: HashMap<UnitKey, ArtifactReference>,
    hints: Arc<dyn ExecutionEnvironmentHints>,
    filter: Option<Arc<dyn FilterEvaluator>>,
    artifact_provider: Option<Arc<dyn ArtifactProvider>>,
    local_units: Option<Arc<dyn LocalUnitCache>>,
    local_writer: Option<Arc<dyn LocalCacheWriter>>,
    config: PlatformConfig,
}

impl TargetPlatform {
    pub fn builder() -> TargetPlatformBuilder {
        TargetPlatformBuilder::new()
    }

    /// The merged, deduplicated namespace in insertion order: module units,
    /// then external units, then execution-environment units.
    pub fn all_units(&self) -> &UnitSet {
        &self.units
    }

    /// Maps every unit published by a module of this build to its module.
    ///
    /// The map is rebuilt on each call: the primary units of all modules are
    /// gathered first and the filter runs once over that union. This costs
    /// O(modules × units per module), so callers looking up many units
    /// should call this once and reuse the result.
    pub fn module_units(&self) -> ModuleUnits {
        let mut working = UnitSet::new();
        let mut owners: HashMap<UnitKey, ModuleRef> = HashMap::new();
        for module in &self.modules {
            for unit in module.published_units(UnitSetKind::Primary) {
                owners
                    .entry(unit.key().clone())
                    .or_insert_with(|| Arc::clone(module));
                working.insert(unit);
            }
        }
        apply_optional(self.filter.as_deref(), &mut working);

        let mut result = ModuleUnits::new();
        for unit in working.iter() {
            match owners.get(unit.key()) {
                Some(module) => {
                    result.insert(unit.key().clone(), (Arc::clone(unit), Arc::clone(module)));
                }
                None => log::debug!("{} was introduced by a filter and has no owning module", unit),
            }
        }
        result
    }

    /// The primary or secondary units of the module rooted exactly at `root`,
    /// filtered like [`Self::module_units`].
    pub fn module_units_of(&self, root: &Path, kind: UnitSetKind) -> Result<UnitSet, PlatformError> {
        let module = self.module(root)?;
        let mut units: UnitSet = module.published_units(kind).into_iter().collect();
        apply_optional(self.filter.as_deref(), &mut units);
        Ok(units)
    }

    /// The module that published `unit`, if any.
    ///
    /// Goes through [`Self::module_units`] and has the same cost; resolve many
    /// units against one `module_units()` result instead of calling this in a
    /// loop.
    pub fn resolve_owning_module(&self, unit: &Unit) -> Option<ModuleRef> {
        self.module_units()
            .get(unit.key())
            .map(|(_, module)| Arc::clone(module))
    }

    /// The external artifact `unit` came from. Units contributed by modules
    /// or by the execution environment have none.
    pub fn resolve_owning_artifact(&self, unit: &Unit) -> Option<&ArtifactReference> {
        self.external_artifacts.get(unit.key())
    }

    /// Locates the file of `key` through the configured artifact provider.
    pub fn artifact_file(&self, key: &ArtifactKey) -> Option<PathBuf> {
        self.artifact_provider.as_ref()?.artifact_file(key)
    }

    pub fn execution_environment_hints(&self) -> &dyn ExecutionEnvironmentHints {
        &*self.hints
    }

    pub fn mandatory_units(&self) -> &[UnitRef] {
        self.hints.mandatory_units()
    }

    /// Warns about locally built units among `used`. See
    /// [`crate::local_usage::report_local_usage`].
    pub fn report_local_usage(&self, used: &UnitSet) -> Option<LocalUsageReport> {
        report_local_usage(
            used,
            self.local_units.as_deref(),
            &*self.hints,
            &self.config,
        )
    }

    /// Flushes the local artifact cache, if write-back was configured.
    /// Callers must not run this concurrently.
    pub fn persist_local_artifact_cache(&self) -> anyhow::Result<()> {
        match &self.local_writer {
            Some(writer) => writer.save(),
            None => Ok(()),
        }
    }

    pub fn modules(&self) -> &[ModuleRef] {
        &self.modules
    }

    /// The module whose basedir equals `root`.
    pub fn module(&self, root: &Path) -> Result<&ModuleRef, PlatformError> {
        self.modules
            .iter()
            .find(|m| m.basedir() == root)
            .ok_or_else(|| PlatformError::ModuleNotFound {
                root: root.to_owned(),
            })
    }

    pub fn filter(&self) -> Option<&Arc<dyn FilterEvaluator>> {
        self.filter.as_ref()
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }
}

impl std::fmt::Debug for TargetPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetPlatform")
            .field("units", &self.units)
            .field("modules", &self.modules)
            .field("profile", &self.hints.profile_name())
            .finish_non_exhaustive()
    }
}

/// Gathers the provenance sources of a [`TargetPlatform`].
#[derive(Default)]
pub struct TargetPlatformBuilder {
    modules: Vec<ModuleRef>,
    external_units: Vec<UnitRef>,
    external: Vec<(UnitRef, ArtifactReference)>,
    hints: Option<Arc<dyn ExecutionEnvironmentHints>>,
    filter: Option<Arc<dyn FilterEvaluator>>,
    artifact_provider: Option<Arc<dyn ArtifactProvider>>,
    local_units: Option<Arc<dyn LocalUnitCache>>,
    local_writer: Option<Arc<dyn LocalCacheWriter>>,
    config: PlatformConfig,
}

impl TargetPlatformBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn module(mut self, module: ModuleRef) -> Self {
        self.modules.push(module);
        self
    }

    /// Adds a unit taken from a repository, with no artifact provenance.
    /// These are merged after module units and before external artifacts.
    pub fn external_unit(mut self, unit: UnitRef) -> Self {
        self.external_units.push(unit);
        self
    }

    pub fn external_artifact(mut self, unit: UnitRef, reference: ArtifactReference) -> Self {
        self.external.push((unit, reference));
        self
    }

    pub fn hints(mut self, hints: Arc<dyn ExecutionEnvironmentHints>) -> Self {
        self.hints = Some(hints);
        self
    }

    pub fn filter(mut self, filter: Arc<dyn FilterEvaluator>) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn artifact_provider(mut self, provider: Arc<dyn ArtifactProvider>) -> Self {
        self.artifact_provider = Some(provider);
        self
    }

    pub fn local_cache(mut self, cache: Arc<dyn LocalUnitCache>) -> Self {
        self.local_units = Some(cache);
        self
    }

    /// Enables [`TargetPlatform::persist_local_artifact_cache`].
    pub fn local_cache_writer(mut self, writer: Arc<dyn LocalCacheWriter>) -> Self {
        self.local_writer = Some(writer);
        self
    }

    pub fn config(mut self, config: PlatformConfig) -> Self {
        self.config = config;
        self
    }

    /// Merges and filters all sources.
    pub fn build(self) -> TargetPlatform {
        let hints = self
            .hints
            .unwrap_or_else(|| Arc::new(ProfileHints::new("default")));
        let filter = self.filter.as_deref();

        log::debug!("Merging target platform");

        let mut module_units = UnitSet::new();
        for module in &self.modules {
            module_units.extend(module.published_units(UnitSetKind::Primary));
        }
        apply_optional(filter, &mut module_units);
        log::debug!("-- {} module units", module_units.len());

        let mut units = module_units;

        let mut repository_units: UnitSet = self.external_units.into_iter().collect();
        apply_optional(filter, &mut repository_units);
        for unit in repository_units.iter() {
            if !units.insert(Arc::clone(unit)) {
                log::debug!("---- {} is shadowed by an earlier unit", unit);
            }
        }
        log::debug!("-- {} repository units", repository_units.len());

        let mut artifact_units: UnitSet = self
            .external
            .iter()
            .map(|(u, _)| Arc::clone(u))
            .collect();
        apply_optional(filter, &mut artifact_units);
        let references: HashMap<&UnitKey, &ArtifactReference> =
            self.external.iter().map(|(u, r)| (u.key(), r)).collect();
        let mut external_artifacts = HashMap::new();
        for unit in artifact_units.iter() {
            if !units.insert(Arc::clone(unit)) {
                log::debug!("---- {} is shadowed by an earlier unit", unit);
                continue;
            }
            if let Some(reference) = references.get(unit.key()) {
                external_artifacts.insert(unit.key().clone(), (*reference).clone());
            }
        }
        log::debug!("-- {} external units", external_artifacts.len());

        for unit in hints.mandatory_units() {
            units.insert(Arc::clone(unit));
        }
        log::debug!(
            "-- {} units in total, profile {}",
            units.len(),
            hints.profile_name()
        );

        TargetPlatform {
            units,
            modules: self.modules,
            external_artifacts,
            hints,
            filter: self.filter,
            artifact_provider: self.artifact_provider,
            local_units: self.local_units,
            local_writer: self.local_writer,
            config: self.config,
        }
    }
}
