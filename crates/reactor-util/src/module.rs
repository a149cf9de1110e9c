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

//! Modules of the current build and the units they publish.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{requirement::Requirement, unit::UnitRef};

/// Which of a module's published unit sets to look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitSetKind {
    /// The module's own build output.
    Primary,
    /// Auxiliary output, such as test fragments.
    Secondary,
}

/// A module (reactor project) that publishes units in this build.
///
/// Unit sets are asked for on every query and are not cached by callers, so
/// implementations should return them cheaply.
pub trait ReactorModule: Send + Sync + std::fmt::Debug {
    /// The root directory; modules are matched by exact equality on it.
    fn basedir(&self) -> &Path;

    fn name(&self) -> &str;

    /// Units published by the module, in publication order.
    fn published_units(&self, kind: UnitSetKind) -> Vec<UnitRef>;

    /// Requirements declared by the module itself.
    fn requirements(&self) -> Vec<Requirement>;
}

pub type ModuleRef = Arc<dyn ReactorModule>;

/// A module whose metadata is already in memory.
#[derive(Debug, Clone)]
pub struct ReactorProject {
    basedir: PathBuf,
    name: String,
    primary: Vec<UnitRef>,
    secondary: Vec<UnitRef>,
    requirements: Vec<Requirement>,
}

impl ReactorProject {
    pub fn new(name: impl Into<String>, basedir: impl Into<PathBuf>) -> Self {
        ReactorProject {
            basedir: basedir.into(),
            name: name.into(),
            primary: Vec::new(),
            secondary: Vec::new(),
            requirements: Vec::new(),
        }
    }

    pub fn publish(mut self, unit: UnitRef) -> Self {
        self.primary.push(unit);
        self
    }

    pub fn publish_secondary(mut self, unit: UnitRef) -> Self {
        self.secondary.push(unit);
        self
    }

    pub fn require(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    pub fn into_ref(self) -> ModuleRef {
        Arc::new(self)
    }
}

impl ReactorModule for ReactorProject {
    fn basedir(&self) -> &Path {
        &self.basedir
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn published_units(&self, kind: UnitSetKind) -> Vec<UnitRef> {
        match kind {
            UnitSetKind::Primary => self.primary.clone(),
            UnitSetKind::Secondary => self.secondary.clone(),
        }
    }

    fn requirements(&self) -> Vec<Requirement> {
        self.requirements.clone()
    }
}
