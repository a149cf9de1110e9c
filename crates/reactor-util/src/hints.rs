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

//! Execution-environment hints: what a runtime baseline contributes to
//! resolution.

use crate::unit::{Unit, UnitRef};

pub trait ExecutionEnvironmentHints: Send + Sync + std::fmt::Debug {
    /// Name of the runtime profile, e.g. `JavaSE-17`.
    fn profile_name(&self) -> &str;

    /// Units that are part of every target platform for this profile. These
    /// are never removed by filters.
    fn mandatory_units(&self) -> &[UnitRef];

    /// Whether `unit` is a synthetic environment unit that is expected to be
    /// present and should not show up in diagnostics.
    fn is_non_applicable(&self, unit: &Unit) -> bool;
}

/// Hints for a named runtime profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileHints {
    name: String,
    mandatory: Vec<UnitRef>,
    synthetic_prefixes: Vec<String>,
}

impl ProfileHints {
    pub fn new(name: impl Into<String>) -> Self {
        ProfileHints {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_mandatory(mut self, unit: UnitRef) -> Self {
        self.mandatory.push(unit);
        self
    }

    /// Units whose id starts with `prefix` are treated as synthetic.
    pub fn with_synthetic_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.synthetic_prefixes.push(prefix.into());
        self
    }
}

impl ExecutionEnvironmentHints for ProfileHints {
    fn profile_name(&self) -> &str {
        &self.name
    }

    fn mandatory_units(&self) -> &[UnitRef] {
        &self.mandatory
    }

    fn is_non_applicable(&self, unit: &Unit) -> bool {
        self.synthetic_prefixes
            .iter()
            .any(|p| unit.id().starts_with(p.as_str()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn synthetic_prefix() {
        let hints = ProfileHints::new("JavaSE-17").with_synthetic_prefix("a.jre.");
        let jre = Unit::new("a.jre.javase", "17.0.0".parse().unwrap());
        let lib = Unit::new("org.example", "1.0.0".parse().unwrap());
        assert!(hints.is_non_applicable(&jre));
        assert!(!hints.is_non_applicable(&lib));
        assert_eq!(hints.profile_name(), "JavaSE-17");
    }
}
