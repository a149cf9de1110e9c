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

//! Collaborators the target platform delegates to.

use std::{path::PathBuf, sync::Arc};

use reactor_util::{ArtifactKey, UnitSet};

/// Locates the bytes of an artifact.
pub trait ArtifactProvider: Send + Sync {
    /// Returns the file holding `key`, or `None` if this provider cannot
    /// supply it. Implementations own their blocking and retry behaviour.
    fn artifact_file(&self, key: &ArtifactKey) -> Option<PathBuf>;
}

impl<P> ArtifactProvider for Arc<P>
where
    P: ArtifactProvider + ?Sized,
{
    fn artifact_file(&self, key: &ArtifactKey) -> Option<PathBuf> {
        (**self).artifact_file(key)
    }
}

/// Asks a list of providers in order; the first one that knows the artifact
/// answers.
#[derive(Default)]
pub struct JointArtifactProvider {
    providers: Vec<Box<dyn ArtifactProvider>>,
}

impl JointArtifactProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: impl ArtifactProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl ArtifactProvider for JointArtifactProvider {
    fn artifact_file(&self, key: &ArtifactKey) -> Option<PathBuf> {
        self.providers.iter().find_map(|p| p.artifact_file(key))
    }
}

/// Units present in the developer-local cache.
pub trait LocalUnitCache: Send + Sync {
    fn cached_units(&self) -> UnitSet;
}

/// Write-back capability of a local cache.
pub trait LocalCacheWriter: Send + Sync {
    /// Flushes pending state to storage. Not synchronized; callers make sure
    /// only one flush runs at a time.
    fn save(&self) -> anyhow::Result<()>;
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;

    struct MapProvider(HashMap<ArtifactKey, PathBuf>);

    impl ArtifactProvider for MapProvider {
        fn artifact_file(&self, key: &ArtifactKey) -> Option<PathBuf> {
            self.0.get(key).cloned()
        }
    }

    #[test]
    fn first_provider_wins() {
        let key = ArtifactKey::new("a", "1.0.0".parse().unwrap());
        let other = ArtifactKey::new("b", "1.0.0".parse().unwrap());
        let joint = JointArtifactProvider::new()
            .with_provider(MapProvider(HashMap::from([(key.clone(), "first/a.jar".into())])))
            .with_provider(MapProvider(HashMap::from([
                (key.clone(), "second/a.jar".into()),
                (other.clone(), "second/b.jar".into()),
            ])));
        assert_eq!(joint.artifact_file(&key), Some(PathBuf::from("first/a.jar")));
        assert_eq!(joint.artifact_file(&other), Some(PathBuf::from("second/b.jar")));
        assert_eq!(
            joint.artifact_file(&ArtifactKey::new("c", "1.0.0".parse().unwrap())),
            None
        );
    }
}
