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

//! What a resolution hands back to the build orchestrator.

use indexmap::IndexMap;
use reactor_util::{ArtifactLocation, TargetEnvironment, UnitKey, UnitRef};

use crate::{closure::ResolvedClosure, error::ResolveError};

/// A resolved unit whose bytes no provider could locate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no artifact file available for {unit}")]
pub struct ArtifactUnavailable {
    pub unit: UnitKey,
}

pub type LocationMap = IndexMap<UnitKey, Result<ArtifactLocation, ArtifactUnavailable>>;

/// A successful closure and where each of its units lives.
#[derive(Debug)]
pub struct ResolvedUnits {
    closure: ResolvedClosure,
    locations: LocationMap,
}

impl ResolvedUnits {
    pub(crate) fn new(closure: ResolvedClosure, locations: LocationMap) -> Self {
        ResolvedUnits { closure, locations }
    }

    pub fn closure(&self) -> &ResolvedClosure {
        &self.closure
    }

    pub fn units(&self) -> impl Iterator<Item = &UnitRef> {
        self.closure.units()
    }

    /// One entry per unit of the closure, in the same order.
    pub fn locations(&self) -> &LocationMap {
        &self.locations
    }

    pub fn location(&self, key: &UnitKey) -> Option<&Result<ArtifactLocation, ArtifactUnavailable>> {
        self.locations.get(key)
    }

    pub fn unavailable(&self) -> impl Iterator<Item = &ArtifactUnavailable> {
        self.locations.values().filter_map(|l| l.as_ref().err())
    }
}

/// The outcome of resolving for one target environment.
#[derive(Debug)]
pub struct ResolutionResult {
    environment: Option<TargetEnvironment>,
    outcome: Result<ResolvedUnits, ResolveError>,
}

impl ResolutionResult {
    pub(crate) fn new(
        environment: Option<TargetEnvironment>,
        outcome: Result<ResolvedUnits, ResolveError>,
    ) -> Self {
        ResolutionResult {
            environment,
            outcome,
        }
    }

    /// `None` when the resolution ignored environments.
    pub fn environment(&self) -> Option<&TargetEnvironment> {
        self.environment.as_ref()
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn units(&self) -> Option<&ResolvedUnits> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&ResolveError> {
        self.outcome.as_ref().err()
    }

    pub fn outcome(&self) -> &Result<ResolvedUnits, ResolveError> {
        &self.outcome
    }

    pub fn into_outcome(self) -> Result<ResolvedUnits, ResolveError> {
        self.outcome
    }
}
