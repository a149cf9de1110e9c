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
    The target platform of a multi-module build.

    A build session gathers units from several provenance sources: the
    modules being built, externally built artifacts and the execution
    environment. [`TargetPlatform`] merges them into one deduplicated,
    ordered namespace, remembers where each unit came from and applies the
    configured [`filter`]s. Diagnostics about units taken from the
    developer-local cache live in [`local_usage`].
*/

pub mod error;
pub mod filter;
pub mod local_cache;
pub mod local_usage;
pub mod provider;
pub mod target_platform;

pub use error::PlatformError;
pub use filter::{
    ChainedFilter, FilterAction, FilterEvaluator, FilterRule, RuleFilter, UnitMatcher,
};
pub use local_cache::LocalArtifactCache;
pub use local_usage::LocalUsageReport;
pub use provider::{ArtifactProvider, JointArtifactProvider, LocalCacheWriter, LocalUnitCache};
pub use target_platform::{ModuleUnits, TargetPlatform, TargetPlatformBuilder};
