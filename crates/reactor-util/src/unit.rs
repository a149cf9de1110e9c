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

//! Resolvable units and the ordered collections they travel in.

use std::{
    borrow::Borrow,
    hash::{Hash, Hasher},
    sync::Arc,
};

use indexmap::{map::Entry, IndexMap};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::{
    environment::{EnvFilter, TargetEnvironment},
    requirement::Requirement,
};

/// Capability namespace of packages exported by a unit.
pub const PACKAGE_NAMESPACE: &str = "java.package";

/// A shared, immutable unit.
pub type UnitRef = Arc<Unit>;

/// The identity of a unit. Two units with the same key are the same unit,
/// no matter where they came from.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitKey {
    pub id: String,
    pub version: Version,
}

impl UnitKey {
    pub fn new(id: impl Into<String>, version: Version) -> Self {
        UnitKey {
            id: id.into(),
            version,
        }
    }
}

impl std::fmt::Display for UnitKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.id, self.version)
    }
}

impl std::fmt::Debug for UnitKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self, f)
    }
}

/// Something a unit provides to others, e.g. an exported package.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capability {
    pub namespace: String,
    pub name: String,
    pub version: Version,
}

/// The atomic resolvable entity.
#[derive(Clone, Serialize, Deserialize)]
pub struct Unit {
    #[serde(flatten)]
    key: UnitKey,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    capabilities: Vec<Capability>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    requirements: Vec<Requirement>,
    /// Restricts the environments this unit can be installed into.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    filter: Option<EnvFilter>,
}

impl Unit {
    pub fn new(id: impl Into<String>, version: Version) -> Self {
        Unit {
            key: UnitKey::new(id, version),
            capabilities: Vec::new(),
            requirements: Vec::new(),
            filter: None,
        }
    }

    pub fn with_capability(
        mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        version: Version,
    ) -> Self {
        self.capabilities.push(Capability {
            namespace: namespace.into(),
            name: name.into(),
            version,
        });
        self
    }

    /// Shorthand for exporting a package at the given version.
    pub fn with_package(self, name: impl Into<String>, version: Version) -> Self {
        self.with_capability(PACKAGE_NAMESPACE, name, version)
    }

    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    pub fn with_filter(mut self, filter: EnvFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn key(&self) -> &UnitKey {
        &self.key
    }

    pub fn id(&self) -> &str {
        &self.key.id
    }

    pub fn version(&self) -> &Version {
        &self.key.version
    }

    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn filter(&self) -> Option<&EnvFilter> {
        self.filter.as_ref()
    }

    /// Finds the capability this unit provides under `namespace` and `name`.
    pub fn provided(&self, namespace: &str, name: &str) -> Option<&Capability> {
        self.capabilities
            .iter()
            .find(|c| c.namespace == namespace && c.name == name)
    }

    /// Whether this unit may be installed into `env`. A unit without a filter
    /// applies everywhere; no environment means every filter passes.
    pub fn applies_to(&self, env: Option<&TargetEnvironment>) -> bool {
        match (&self.filter, env) {
            (Some(filter), Some(env)) => filter.matches(env),
            _ => true,
        }
    }

    pub fn into_ref(self) -> UnitRef {
        Arc::new(self)
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Unit {}

impl Hash for Unit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state)
    }
}

impl Borrow<UnitKey> for Unit {
    fn borrow(&self) -> &UnitKey {
        &self.key
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.key, f)
    }
}

impl std::fmt::Debug for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.key, f)
    }
}

/// An insertion-ordered collection of units, deduplicated by identity.
///
/// Inserting a unit whose key is already present keeps the existing unit, so
/// whichever source is merged first takes precedence.
#[derive(Clone, Default)]
pub struct UnitSet {
    units: IndexMap<UnitKey, UnitRef>,
}

impl UnitSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `unit` unless a unit with the same key exists. Returns whether
    /// the unit was added.
    pub fn insert(&mut self, unit: UnitRef) -> bool {
        match self.units.entry(unit.key().clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(v) => {
                v.insert(unit);
                true
            }
        }
    }

    pub fn get(&self, key: &UnitKey) -> Option<&UnitRef> {
        self.units.get(key)
    }

    pub fn contains(&self, key: &UnitKey) -> bool {
        self.units.contains_key(key)
    }

    /// Removes a unit, keeping the order of the remaining ones.
    pub fn remove(&mut self, key: &UnitKey) -> Option<UnitRef> {
        self.units.shift_remove(key)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&UnitRef) -> bool) {
        self.units.retain(|_, unit| keep(unit))
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnitRef> {
        self.units.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &UnitKey> {
        self.units.keys()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Units of `self` that are also in `other`, in the order of `self`.
    pub fn intersection(&self, other: &UnitSet) -> UnitSet {
        self.iter()
            .filter(|unit| other.contains(unit.key()))
            .cloned()
            .collect()
    }
}

impl FromIterator<UnitRef> for UnitSet {
    fn from_iter<T: IntoIterator<Item = UnitRef>>(iter: T) -> Self {
        let mut set = UnitSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<UnitRef> for UnitSet {
    fn extend<T: IntoIterator<Item = UnitRef>>(&mut self, iter: T) {
        for unit in iter {
            self.insert(unit);
        }
    }
}

impl<'a> IntoIterator for &'a UnitSet {
    type Item = &'a UnitRef;
    type IntoIter = indexmap::map::Values<'a, UnitKey, UnitRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.values()
    }
}

impl std::fmt::Debug for UnitSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.units.keys()).finish()
    }
}
