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

/*!
    Resolution on top of a [`reactor_platform::TargetPlatform`].

    A [`PlatformResolver`] turns a module, a single unit or a set of ad-hoc
    requirements into one [`ResolutionResult`] per target environment by handing
    platform-shaped inputs to a [`Solver`]. [`SlicingSolver`] is the engine used by
    default.
*/

pub mod closure;
pub mod error;
pub mod facade;
pub mod result;
pub mod solver;

pub use closure::{ResolvedClosure, ResolvedClosureBuilder, UnitId};
pub use error::ResolveError;
pub use facade::PlatformResolver;
pub use result::{ArtifactUnavailable, LocationMap, ResolutionResult, ResolvedUnits};
pub use solver::{MissingRequirement, SlicingSolver, SolveError, SolveRequest, Solver};
