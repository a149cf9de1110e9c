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

use std::path::PathBuf;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::unit::Unit;

/// Names the bytes behind a unit.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactKey {
    pub id: String,
    pub version: Version,
}

impl ArtifactKey {
    pub fn new(id: impl Into<String>, version: Version) -> Self {
        ArtifactKey {
            id: id.into(),
            version,
        }
    }
}

impl From<&Unit> for ArtifactKey {
    fn from(unit: &Unit) -> Self {
        ArtifactKey::new(unit.id(), unit.version().clone())
    }
}

impl std::fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.id, self.version)
    }
}

impl std::fmt::Debug for ArtifactKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self, f)
    }
}

/// Where a unit built outside this build came from, e.g. the coordinates
/// of an already published package.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactReference {
    pub coordinates: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<PathBuf>,
}

impl ArtifactReference {
    pub fn new(coordinates: impl Into<String>) -> Self {
        ArtifactReference {
            coordinates: coordinates.into(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl std::fmt::Display for ArtifactReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.coordinates)?;
        if let Some(location) = &self.location {
            write!(f, " ({})", location.display())?;
        }
        Ok(())
    }
}

/// The resolved location of a unit's bytes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ArtifactLocation {
    /// Built by a module of this build, rooted at the given directory.
    Module(PathBuf),
    /// A concrete file.
    File(PathBuf),
    /// Provided by the execution environment itself; there are no bytes.
    ExecutionEnvironment,
}
