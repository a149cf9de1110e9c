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

use std::path::Path;

use anyhow::Context;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Environment variable that turns the local repository diagnostic on or off.
pub const INCLUDE_LOCAL_REPO_ENV: &str = "REACTOR_INCLUDE_LOCAL_REPO";

/// Session-wide settings of a target platform. Fixed once the platform is
/// built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(setter(into))]
pub struct PlatformConfig {
    /// Whether units from the developer-local cache may take part in the
    /// build. Enables the local usage warning.
    #[builder(default = false)]
    #[serde(default)]
    pub include_local_repository: bool,

    /// When false, environment filters declared by units are ignored while
    /// solving.
    #[builder(default = true)]
    #[serde(default = "default_true")]
    pub resolve_with_environment_constraints: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PlatformConfig {
    fn default() -> Self {
        PlatformConfig {
            include_local_repository: false,
            resolve_with_environment_constraints: true,
        }
    }
}

impl PlatformConfig {
    /// Reads the configuration from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read platform config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse platform config {}", path.display()))?;
        Ok(config)
    }

    /// Applies overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup(INCLUDE_LOCAL_REPO_ENV) {
            match parse_flag(&v) {
                Some(flag) => self.include_local_repository = flag,
                None => log::warn!("Ignoring {INCLUDE_LOCAL_REPO_ENV}={v}, expected a boolean"),
            }
        }
        self
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
