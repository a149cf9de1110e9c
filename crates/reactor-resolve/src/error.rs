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

use reactor_platform::PlatformError;
use reactor_util::TargetEnvironment;
use semver::Version;

use crate::solver::SolveError;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    ModuleNotFound(#[from] PlatformError),

    #[error("unit {id}@{version} is not part of the target platform")]
    UnitNotFound { id: String, version: Version },

    #[error("cannot resolve requirements for {}:\n{source}", describe(.environment))]
    Unsatisfiable {
        environment: Option<TargetEnvironment>,
        source: SolveError,
    },
}

fn describe(environment: &Option<TargetEnvironment>) -> String {
    match environment {
        Some(env) => format!("environment {env}"),
        None => "any environment".to_string(),
    }
}
