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

//! Requirement declarations, one variant per notion of dependency.

use semver::{Prerelease, Version, VersionReq};
use serde::{Deserialize, Serialize};

use crate::unit::{Unit, UnitKey, PACKAGE_NAMESPACE};

/// Suffix of the unit id that carries a feature's contents.
pub const FEATURE_GROUP_SUFFIX: &str = ".feature.group";

/// What a requirement points at.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RequirementKind {
    /// A unit with this exact id.
    Unit { id: String },
    /// A feature, installed through its `<id>.feature.group` unit.
    Feature { id: String },
    /// Any unit exporting this package.
    Package { name: String },
    /// Any unit providing this capability.
    Capability { namespace: String, name: String },
    /// Exactly the unit `id@version`, build metadata included. The range is
    /// ignored.
    Exact { id: String, version: Version },
}

/// A declared dependency: a target, the acceptable versions and whether a
/// missing provider is tolerated.
///
/// A version with a pre-release part, such as `1.0.0-SNAPSHOT`, is treated
/// as a qualified build of `1.0.0` and is in range wherever `1.0.0` is. See
/// [`version_in_range`].
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Requirement {
    #[serde(flatten)]
    pub kind: RequirementKind,
    #[serde(default = "any_version")]
    pub range: VersionReq,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

fn any_version() -> VersionReq {
    VersionReq::STAR
}

/// Whether `version` is in `range`, counting `x.y.z-qualifier` as `x.y.z`.
///
/// Plain [`VersionReq::matches`] rejects pre-release versions unless a
/// comparator names the same `x.y.z`, which would hide every snapshot build
/// of a module.
pub fn version_in_range(range: &VersionReq, version: &Version) -> bool {
    if range.matches(version) {
        return true;
    }
    if version.pre.is_empty() {
        return false;
    }
    let release = Version {
        pre: Prerelease::EMPTY,
        ..version.clone()
    };
    range.matches(&release)
}

impl Requirement {
    pub fn new(kind: RequirementKind, range: VersionReq) -> Self {
        Requirement {
            kind,
            range,
            optional: false,
        }
    }

    pub fn unit(id: impl Into<String>, range: VersionReq) -> Self {
        Self::new(RequirementKind::Unit { id: id.into() }, range)
    }

    /// Requires exactly the unit identified by `key`.
    pub fn exact_unit(key: &UnitKey) -> Self {
        Self::new(
            RequirementKind::Exact {
                id: key.id.clone(),
                version: key.version.clone(),
            },
            VersionReq::STAR,
        )
    }

    pub fn feature(id: impl Into<String>, range: VersionReq) -> Self {
        Self::new(RequirementKind::Feature { id: id.into() }, range)
    }

    pub fn package(name: impl Into<String>, range: VersionReq) -> Self {
        Self::new(RequirementKind::Package { name: name.into() }, range)
    }

    pub fn capability(
        namespace: impl Into<String>,
        name: impl Into<String>,
        range: VersionReq,
    ) -> Self {
        Self::new(
            RequirementKind::Capability {
                namespace: namespace.into(),
                name: name.into(),
            },
            range,
        )
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Whether `unit` satisfies this requirement.
    pub fn matches(&self, unit: &Unit) -> bool {
        let in_range = |v: &Version| version_in_range(&self.range, v);
        match &self.kind {
            RequirementKind::Unit { id } => unit.id() == id && in_range(unit.version()),
            RequirementKind::Feature { id } => {
                unit.id().strip_suffix(FEATURE_GROUP_SUFFIX) == Some(id.as_str())
                    && in_range(unit.version())
            }
            RequirementKind::Package { name } => unit
                .provided(PACKAGE_NAMESPACE, name)
                .is_some_and(|c| in_range(&c.version)),
            RequirementKind::Capability { namespace, name } => unit
                .provided(namespace, name)
                .is_some_and(|c| in_range(&c.version)),
            RequirementKind::Exact { id, version } => {
                unit.id() == id && unit.version() == version
            }
        }
    }
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            RequirementKind::Unit { id } => write!(f, "unit {id} {}", self.range)?,
            RequirementKind::Feature { id } => write!(f, "feature {id} {}", self.range)?,
            RequirementKind::Package { name } => write!(f, "package {name} {}", self.range)?,
            RequirementKind::Capability { namespace, name } => {
                write!(f, "capability {namespace}/{name} {}", self.range)?
            }
            RequirementKind::Exact { id, version } => write!(f, "unit {id} ={version}")?,
        }
        if self.optional {
            write!(f, " (optional)")?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self, f)
    }
}
