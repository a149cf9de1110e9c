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

//! Exclusion and override rules over a working set of units.

use std::sync::Arc;

use reactor_util::{version_in_range, Unit, UnitRef, UnitSet};
use semver::VersionReq;
use serde::{Deserialize, Serialize};

/// Removes or replaces units of a working set in place.
///
/// Evaluators are shared between threads and called repeatedly, so `apply`
/// must not keep scratch state between calls.
pub trait FilterEvaluator: Send + Sync {
    fn apply(&self, units: &mut UnitSet);
}

/// Selects units by id, version and provided capability. Unset parts match
/// anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitMatcher {
    /// Exact id, or a prefix when it ends with `*`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionReq>,
    /// `(namespace, name)` of a capability the unit must provide.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provides: Option<(String, String)>,
}

impl UnitMatcher {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn id(id: impl Into<String>) -> Self {
        UnitMatcher {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn providing(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        UnitMatcher {
            provides: Some((namespace.into(), name.into())),
            ..Default::default()
        }
    }

    pub fn with_version(mut self, version: VersionReq) -> Self {
        self.version = Some(version);
        self
    }

    pub fn matches(&self, unit: &Unit) -> bool {
        let id_ok = match &self.id {
            None => true,
            Some(pattern) => match pattern.strip_suffix('*') {
                Some(prefix) => unit.id().starts_with(prefix),
                None => unit.id() == pattern,
            },
        };
        let version_ok = self
            .version
            .as_ref()
            .is_none_or(|range| version_in_range(range, unit.version()));
        let provides_ok = self
            .provides
            .as_ref()
            .is_none_or(|(ns, name)| unit.provided(ns, name).is_some());
        id_ok && version_ok && provides_ok
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterAction {
    /// Drop the unit.
    Remove,
    /// Keep the unit only if its version is in range.
    RestrictTo(VersionReq),
    /// Substitute another unit.
    Replace(UnitRef),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRule {
    #[serde(rename = "match")]
    pub matcher: UnitMatcher,
    pub action: FilterAction,
}

impl FilterRule {
    pub fn remove(matcher: UnitMatcher) -> Self {
        FilterRule {
            matcher,
            action: FilterAction::Remove,
        }
    }

    pub fn restrict(matcher: UnitMatcher, range: VersionReq) -> Self {
        FilterRule {
            matcher,
            action: FilterAction::RestrictTo(range),
        }
    }

    pub fn replace(matcher: UnitMatcher, with: UnitRef) -> Self {
        FilterRule {
            matcher,
            action: FilterAction::Replace(with),
        }
    }
}

/// A rule list evaluated in configuration order. For each unit the first
/// matching rule decides; a replacement is not evaluated again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleFilter {
    rules: Vec<FilterRule>,
}

impl RuleFilter {
    pub fn new(rules: Vec<FilterRule>) -> Self {
        RuleFilter { rules }
    }

    pub fn with_rule(mut self, rule: FilterRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }
}

impl FilterEvaluator for RuleFilter {
    fn apply(&self, units: &mut UnitSet) {
        if self.rules.is_empty() {
            return;
        }
        let mut filtered = UnitSet::new();
        for unit in units.iter() {
            let Some(rule) = self.rules.iter().find(|r| r.matcher.matches(unit)) else {
                filtered.insert(Arc::clone(unit));
                continue;
            };
            match &rule.action {
                FilterAction::Remove => log::debug!("Filter removed {}", unit),
                FilterAction::RestrictTo(range) => {
                    if version_in_range(range, unit.version()) {
                        filtered.insert(Arc::clone(unit));
                    } else {
                        log::debug!("Filter removed {}, outside of {}", unit, range);
                    }
                }
                FilterAction::Replace(with) => {
                    log::debug!("Filter replaced {} with {}", unit, with);
                    filtered.insert(Arc::clone(with));
                }
            }
        }
        *units = filtered;
    }
}

/// Applies several evaluators one after another.
#[derive(Default, Clone)]
pub struct ChainedFilter {
    filters: Vec<Arc<dyn FilterEvaluator>>,
}

impl ChainedFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, filter: Arc<dyn FilterEvaluator>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl FilterEvaluator for ChainedFilter {
    fn apply(&self, units: &mut UnitSet) {
        for filter in &self.filters {
            filter.apply(units);
        }
    }
}

/// Applies `filter` if one is configured; no filter leaves `units` untouched.
pub fn apply_optional(filter: Option<&dyn FilterEvaluator>, units: &mut UnitSet) {
    if let Some(filter) = filter {
        filter.apply(units);
    }
}

#[cfg(test)]
mod test {
    use expect_test::expect;
    use reactor_util::Unit;

    use super::*;

    fn unit(id: &str, version: &str) -> UnitRef {
        Unit::new(id, version.parse().unwrap()).into_ref()
    }

    fn sample() -> UnitSet {
        [
            unit("org.apache.commons", "1.0.0"),
            unit("org.apache.commons", "2.0.0"),
            unit("org.example.core", "1.0.0"),
            unit("org.example.ui", "1.0.0"),
            unit("junit", "4.13.0"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn remove_and_restrict() {
        let filter = RuleFilter::default()
            .with_rule(FilterRule::remove(UnitMatcher::id("org.example.*")))
            .with_rule(FilterRule::restrict(
                UnitMatcher::id("org.apache.commons"),
                "^2".parse().unwrap(),
            ));
        let mut units = sample();
        filter.apply(&mut units);
        expect!["[org.apache.commons@2.0.0, junit@4.13.0]"].assert_eq(&format!("{:?}", units));
    }

    #[test]
    fn first_matching_rule_wins() {
        // The restrict rule comes first and keeps org.example.core, so the
        // later remove rule never sees it.
        let filter = RuleFilter::default()
            .with_rule(FilterRule::restrict(
                UnitMatcher::id("org.example.core"),
                "*".parse().unwrap(),
            ))
            .with_rule(FilterRule::remove(UnitMatcher::id("org.example.*")));
        let mut units = sample();
        filter.apply(&mut units);
        expect!["[org.apache.commons@1.0.0, org.apache.commons@2.0.0, org.example.core@1.0.0, junit@4.13.0]"]
            .assert_eq(&format!("{:?}", units));
    }

    #[test]
    fn replacement_is_not_evaluated_again() {
        let filter = RuleFilter::default()
            .with_rule(FilterRule::replace(
                UnitMatcher::id("junit"),
                unit("junit", "5.0.0"),
            ))
            .with_rule(FilterRule::remove(
                UnitMatcher::id("junit").with_version("^5".parse().unwrap()),
            ));
        let mut units = sample();
        filter.apply(&mut units);
        expect!["[org.apache.commons@1.0.0, org.apache.commons@2.0.0, org.example.core@1.0.0, org.example.ui@1.0.0, junit@5.0.0]"]
            .assert_eq(&format!("{:?}", units));
    }

    #[test]
    fn match_by_capability() {
        let mut units: UnitSet = [
            Unit::new("a", "1.0.0".parse().unwrap())
                .with_package("javax.servlet", "3.1.0".parse().unwrap())
                .into_ref(),
            unit("b", "1.0.0"),
        ]
        .into_iter()
        .collect();
        RuleFilter::default()
            .with_rule(FilterRule::remove(UnitMatcher::providing(
                "java.package",
                "javax.servlet",
            )))
            .apply(&mut units);
        expect!["[b@1.0.0]"].assert_eq(&format!("{:?}", units));
    }

    #[test]
    fn restrict_keeps_snapshot_builds() {
        let mut units: UnitSet = [unit("core", "1.1.0-SNAPSHOT"), unit("core", "2.0.0-SNAPSHOT")]
            .into_iter()
            .collect();
        RuleFilter::new(vec![FilterRule::restrict(
            UnitMatcher::id("core"),
            "^1".parse().unwrap(),
        )])
        .apply(&mut units);
        expect!["[core@1.1.0-SNAPSHOT]"].assert_eq(&format!("{:?}", units));
    }

    #[test]
    fn chained_and_absent_filters() {
        let mut units = sample();
        apply_optional(None, &mut units);
        assert_eq!(units.len(), 5);

        let chain = ChainedFilter::new()
            .then(Arc::new(RuleFilter::new(vec![FilterRule::remove(
                UnitMatcher::id("junit"),
            )])))
            .then(Arc::new(RuleFilter::new(vec![FilterRule::remove(
                UnitMatcher::id("org.apache.*").with_version("<2".parse().unwrap()),
            )])));
        apply_optional(Some(&chain), &mut units);
        expect!["[org.apache.commons@2.0.0, org.example.core@1.0.0, org.example.ui@1.0.0]"]
            .assert_eq(&format!("{:?}", units));
    }

    #[test]
    fn rules_from_json() {
        let filter: RuleFilter = serde_json::from_str(
            r#"[
                { "match": { "id": "junit" }, "action": "remove" },
                { "match": { "id": "org.apache.*" }, "action": { "restrict-to": "^1" } }
            ]"#,
        )
        .unwrap();
        let mut units = sample();
        filter.apply(&mut units);
        expect!["[org.apache.commons@1.0.0, org.example.core@1.0.0, org.example.ui@1.0.0]"]
            .assert_eq(&format!("{:?}", units));
    }
}
