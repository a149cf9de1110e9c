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

//! Shared data model of the reactor target platform: units, requirements,
//! target environments, build modules and session configuration.

pub mod artifact;
pub mod config;
pub mod environment;
pub mod hints;
pub mod module;
pub mod requirement;
pub mod unit;

pub use artifact::{ArtifactKey, ArtifactLocation, ArtifactReference};
pub use config::{PlatformConfig, PlatformConfigBuilder};
pub use environment::{EnvFilter, TargetEnvironment};
pub use hints::{ExecutionEnvironmentHints, ProfileHints};
pub use module::{ModuleRef, ReactorModule, ReactorProject, UnitSetKind};
pub use requirement::{version_in_range, Requirement, RequirementKind};
pub use unit::{Capability, Unit, UnitKey, UnitRef, UnitSet};
