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

//! The boundary to the dependency-resolution engine.

use std::{collections::VecDeque, sync::Arc};

use reactor_util::{
    ExecutionEnvironmentHints, Requirement, TargetEnvironment, UnitKey, UnitRef, UnitSet,
};

use crate::closure::{ResolvedClosure, UnitId};

/// Everything an engine needs for one solve.
pub struct SolveRequest<'a> {
    /// The namespace to pick units from.
    pub units: &'a UnitSet,
    /// Requirements that must be satisfied.
    pub roots: &'a [Requirement],
    /// The target environment, or `None` for an environment-agnostic solve.
    pub environment: Option<&'a TargetEnvironment>,
    pub hints: &'a dyn ExecutionEnvironmentHints,
    /// Whether unit environment filters are honoured.
    pub respect_filters: bool,
}

impl SolveRequest<'_> {
    /// The environment unit filters are checked against.
    pub fn filter_environment(&self) -> Option<&TargetEnvironment> {
        self.environment.filter(|_| self.respect_filters)
    }
}

/// A requirement no unit in the namespace could satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingRequirement {
    pub requirement: Requirement,
    /// The unit that declared it; `None` for a root requirement.
    pub required_by: Option<UnitKey>,
}

impl std::fmt::Display for MissingRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "missing {}", self.requirement)?;
        match &self.required_by {
            Some(key) => write!(f, " required by {key}"),
            None => write!(f, " required by the root"),
        }
    }
}

/// The engine could not satisfy the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveError {
    pub missing: Vec<MissingRequirement>,
}

impl std::fmt::Display for SolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, missing) in self.missing.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{missing}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SolveError {}

/// A dependency-resolution engine.
pub trait Solver {
    /// Computes the installable closure for `request`.
    fn solve(&self, request: &SolveRequest<'_>) -> Result<ResolvedClosure, SolveError>;
}

impl<S> Solver for &S
where
    S: Solver + ?Sized,
{
    fn solve(&self, request: &SolveRequest<'_>) -> Result<ResolvedClosure, SolveError> {
        (**self).solve(request)
    }
}

/// A simple engine that slices the namespace from the roots.
///
/// Every requirement is satisfied by a unit already in the closure if there
/// is one, otherwise by a mandatory environment unit, otherwise by the
/// highest applicable version in the namespace (the earliest one on ties).
/// It does not backtrack. All missing requirements are collected before
/// failing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlicingSolver;

impl Solver for SlicingSolver {
    fn solve(&self, request: &SolveRequest<'_>) -> Result<ResolvedClosure, SolveError> {
        slice(request)
    }
}

fn slice(request: &SolveRequest<'_>) -> Result<ResolvedClosure, SolveError> {
    let env = request.filter_environment();
    let applicable: Vec<&UnitRef> = request
        .units
        .iter()
        .filter(|unit| unit.applies_to(env))
        .collect();
    let mandatory: Vec<&UnitRef> = request
        .hints
        .mandatory_units()
        .iter()
        .filter(|unit| request.units.contains(unit.key()))
        .collect();

    log::debug!(
        "Begin slicing over {} applicable units for {}",
        applicable.len(),
        env.map_or_else(|| "any environment".to_string(), |e| e.to_string())
    );

    let mut builder = ResolvedClosure::builder();
    let mut missing = Vec::new();
    let mut queue: VecDeque<(Option<UnitId>, &Requirement)> =
        request.roots.iter().map(|r| (None, r)).collect();

    while let Some((from, requirement)) = queue.pop_front() {
        let selected = builder
            .units_and_id()
            .find(|(_, unit)| requirement.matches(unit))
            .map(|(id, _)| id);
        let id = match selected {
            Some(id) => id,
            None => {
                let candidate = mandatory
                    .iter()
                    .find(|unit| requirement.matches(unit))
                    .copied()
                    .or_else(|| best_candidate(&applicable, requirement));
                let Some(unit) = candidate else {
                    if requirement.optional {
                        log::debug!("-- Skipping optional {}", requirement);
                    } else {
                        missing.push(MissingRequirement {
                            requirement: requirement.clone(),
                            required_by: from.map(|id| builder.unit(id).key().clone()),
                        });
                    }
                    continue;
                };
                log::debug!("-- {} selected for {}", unit, requirement);
                let id = builder.add_unit(Arc::clone(unit));
                queue.extend(unit.requirements().iter().map(|r| (Some(id), r)));
                id
            }
        };
        match from {
            Some(from) => builder.add_dependency(from, id),
            None => builder.add_root(id),
        }
    }

    if missing.is_empty() {
        log::debug!("Finished slicing");
        Ok(builder.build())
    } else {
        Err(SolveError { missing })
    }
}

fn best_candidate<'u>(
    applicable: &[&'u UnitRef],
    requirement: &Requirement,
) -> Option<&'u UnitRef> {
    let mut best: Option<&'u UnitRef> = None;
    for &unit in applicable {
        if !requirement.matches(unit) {
            continue;
        }
        if best.is_none_or(|b| unit.version() > b.version()) {
            best = Some(unit);
        }
    }
    best
}
