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

use std::{collections::HashMap, sync::Arc};

use indexmap::IndexMap;
use petgraph::graphmap::DiGraphMap;
use reactor_util::{Unit, UnitKey, UnitRef, UnitSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u32);

impl UnitId {
    pub fn new_usize(id: usize) -> Self {
        Self(id as u32)
    }

    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

/// The units selected by a solve, and which selected unit satisfies which.
#[derive(Debug, Clone)]
pub struct ResolvedClosure {
    units: IndexMap<UnitKey, UnitRef>,
    roots: Vec<UnitId>,
    /// Edges point from a unit to the units satisfying its requirements.
    dep_graph: DiGraphMap<UnitId, ()>,
}

impl ResolvedClosure {
    pub fn builder() -> ResolvedClosureBuilder {
        ResolvedClosureBuilder::new()
    }

    pub fn unit(&self, id: UnitId) -> &UnitRef {
        &self.units[id.as_usize()]
    }

    pub fn id_of(&self, key: &UnitKey) -> Option<UnitId> {
        self.units.get_index_of(key).map(UnitId::new_usize)
    }

    pub fn contains(&self, key: &UnitKey) -> bool {
        self.units.contains_key(key)
    }

    /// Units selected directly for the root requirements.
    pub fn roots(&self) -> &[UnitId] {
        &self.roots
    }

    /// Selected units, in the order they were selected.
    pub fn units(&self) -> impl Iterator<Item = &UnitRef> {
        self.units.values()
    }

    pub fn units_and_id(&self) -> impl Iterator<Item = (UnitId, &UnitRef)> {
        self.units
            .values()
            .enumerate()
            .map(|(id, unit)| (UnitId::new_usize(id), unit))
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Units that `id` depends on.
    pub fn deps(&self, id: UnitId) -> impl Iterator<Item = UnitId> + '_ {
        self.dep_graph
            .neighbors_directed(id, petgraph::Direction::Outgoing)
    }

    pub fn graph(&self) -> &DiGraphMap<UnitId, ()> {
        &self.dep_graph
    }

    pub fn to_unit_set(&self) -> UnitSet {
        self.units.values().cloned().collect()
    }

    /// A copy of this closure without the units matching `exclude`. Edges
    /// touching a removed unit are dropped and the remaining ids are
    /// renumbered in selection order.
    pub fn without(&self, exclude: impl Fn(&Unit) -> bool) -> ResolvedClosure {
        let mut builder = ResolvedClosureBuilder::new();
        let mut remap: HashMap<UnitId, UnitId> = HashMap::new();
        for (id, unit) in self.units_and_id() {
            if !exclude(&**unit) {
                remap.insert(id, builder.add_unit(Arc::clone(unit)));
            }
        }
        for root in &self.roots {
            if let Some(&new) = remap.get(root) {
                builder.add_root(new);
            }
        }
        for (from, to, _) in self.dep_graph.all_edges() {
            if let (Some(&from), Some(&to)) = (remap.get(&from), remap.get(&to)) {
                builder.add_dependency(from, to);
            }
        }
        builder.build()
    }
}

pub struct ResolvedClosureBuilder {
    closure: ResolvedClosure,
}

impl ResolvedClosureBuilder {
    pub fn new() -> Self {
        Self {
            closure: ResolvedClosure {
                units: IndexMap::new(),
                roots: Vec::new(),
                dep_graph: DiGraphMap::new(),
            },
        }
    }

    /// Adds `unit` if it is not selected yet and returns its id.
    pub fn add_unit(&mut self, unit: UnitRef) -> UnitId {
        let entry = self.closure.units.entry(unit.key().clone());
        let id = UnitId::new_usize(entry.index());
        entry.or_insert(unit);
        self.closure.dep_graph.add_node(id);
        id
    }

    pub fn add_root(&mut self, id: UnitId) {
        if !self.closure.roots.contains(&id) {
            self.closure.roots.push(id);
        }
    }

    pub fn add_dependency(&mut self, from: UnitId, to: UnitId) {
        self.closure.dep_graph.add_edge(from, to, ());
    }

    pub fn id_of(&self, key: &UnitKey) -> Option<UnitId> {
        self.closure.id_of(key)
    }

    pub fn unit(&self, id: UnitId) -> &UnitRef {
        self.closure.unit(id)
    }

    pub fn units(&self) -> impl Iterator<Item = &UnitRef> {
        self.closure.units()
    }

    pub fn units_and_id(&self) -> impl Iterator<Item = (UnitId, &UnitRef)> {
        self.closure.units_and_id()
    }

    pub fn build(self) -> ResolvedClosure {
        self.closure
    }
}

impl Default for ResolvedClosureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use expect_test::expect;

    use super::*;

    fn unit(id: &str) -> UnitRef {
        Unit::new(id, "1.0.0".parse().unwrap()).into_ref()
    }

    fn sample() -> ResolvedClosure {
        let mut builder = ResolvedClosure::builder();
        let app = builder.add_unit(unit("app"));
        let lib = builder.add_unit(unit("lib"));
        let util = builder.add_unit(unit("util"));
        assert_eq!(builder.add_unit(unit("lib")), lib);
        builder.add_root(app);
        builder.add_root(app);
        builder.add_dependency(app, lib);
        builder.add_dependency(lib, util);
        builder.add_dependency(app, util);
        builder.build()
    }

    #[test]
    fn lookup() {
        let closure = sample();
        assert_eq!(closure.len(), 3);
        assert_eq!(closure.roots(), &[UnitId::new_usize(0)]);
        let lib = closure.id_of(&UnitKey::new("lib", "1.0.0".parse().unwrap())).unwrap();
        expect!["lib@1.0.0"].assert_eq(&closure.unit(lib).to_string());
        let deps: Vec<_> = closure
            .deps(UnitId::new_usize(0))
            .map(|id| closure.unit(id).id().to_string())
            .collect();
        expect![[r#"["lib", "util"]"#]].assert_eq(&format!("{deps:?}"));
        expect!["[app@1.0.0, lib@1.0.0, util@1.0.0]"]
            .assert_eq(&format!("{:?}", closure.to_unit_set()));
    }

    #[test]
    fn without_renumbers() {
        let closure = sample().without(|u| u.id() == "app");
        assert!(closure.roots().is_empty());
        expect!["[lib@1.0.0, util@1.0.0]"]
            .assert_eq(&format!("{:?}", closure.to_unit_set()));
        let edges: Vec<_> = closure
            .graph()
            .all_edges()
            .map(|(from, to, _)| (from.as_usize(), to.as_usize()))
            .collect();
        assert_eq!(edges, vec![(0, 1)]);
    }
}
