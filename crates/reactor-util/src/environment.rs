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

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const OS: &str = "osgi.os";
pub const WS: &str = "osgi.ws";
pub const ARCH: &str = "osgi.arch";

/// A deployment target, described as environment property name → value.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetEnvironment {
    properties: BTreeMap<String, String>,
}

impl TargetEnvironment {
    /// The usual operating system / windowing system / architecture triple.
    pub fn new(os: &str, ws: &str, arch: &str) -> Self {
        Self::default()
            .with_property(OS, os)
            .with_property(WS, ws)
            .with_property(ARCH, arch)
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn os(&self) -> Option<&str> {
        self.get(OS)
    }
}

impl std::fmt::Display for TargetEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let triple = [OS, WS, ARCH];
        let only_triple = self.properties.keys().all(|k| triple.contains(&k.as_str()));
        if only_triple && !self.properties.is_empty() {
            let parts = triple.map(|k| self.get(k).unwrap_or("*"));
            return write!(f, "{}", parts.join("/"));
        }
        let mut first = true;
        for (k, v) in &self.properties {
            if !first {
                write!(f, ",")?;
            }
            first = false;
            write!(f, "{k}={v}")?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for TargetEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self, f)
    }
}

/// Restricts a unit to environments where every listed property has the
/// given value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvFilter {
    required: BTreeMap<String, String>,
}

impl EnvFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.required.insert(key.into(), value.into());
        self
    }

    pub fn os(os: &str) -> Self {
        Self::new().require(OS, os)
    }

    /// A property missing from `env` fails the filter.
    pub fn matches(&self, env: &TargetEnvironment) -> bool {
        self.required
            .iter()
            .all(|(k, v)| env.get(k) == Some(v.as_str()))
    }
}
