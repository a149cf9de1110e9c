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

//! A developer-local cache of built units, kept as a JSON index next to the
//! artifact files.

use std::path::{Path, PathBuf};

use anyhow::Context;
use indexmap::IndexMap;
use reactor_util::{ArtifactKey, UnitKey, UnitRef, UnitSet};
use serde::{Deserialize, Serialize};

use crate::provider::{ArtifactProvider, LocalCacheWriter, LocalUnitCache};

pub const INDEX_FILE: &str = "index.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    unit: UnitRef,
    /// Relative paths are relative to the cache root.
    file: PathBuf,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheIndex {
    #[serde(default)]
    entries: Vec<CacheEntry>,
}

#[derive(Debug)]
pub struct LocalArtifactCache {
    root: PathBuf,
    entries: IndexMap<UnitKey, CacheEntry>,
}

impl LocalArtifactCache {
    /// Opens the cache rooted at `root`. A missing index is an empty cache.
    pub fn open(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        let index_file = root.join(INDEX_FILE);
        let mut entries = IndexMap::new();
        if index_file.exists() {
            log::debug!("Reading local cache index {}", index_file.display());
            let content = std::fs::read_to_string(&index_file)
                .with_context(|| format!("failed to read {}", index_file.display()))?;
            let index: CacheIndex = serde_json::from_str(&content)
                .with_context(|| format!("malformed local cache index {}", index_file.display()))?;
            for entry in index.entries {
                entries.insert(entry.unit.key().clone(), entry);
            }
        }
        Ok(LocalArtifactCache { root, entries })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Records a locally built unit. A newer build of the same unit replaces
    /// the previous entry.
    pub fn add(&mut self, unit: UnitRef, file: impl Into<PathBuf>) {
        let entry = CacheEntry {
            unit,
            file: file.into(),
        };
        self.entries.insert(entry.unit.key().clone(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LocalUnitCache for LocalArtifactCache {
    fn cached_units(&self) -> UnitSet {
        self.entries.values().map(|e| e.unit.clone()).collect()
    }
}

impl ArtifactProvider for LocalArtifactCache {
    fn artifact_file(&self, key: &ArtifactKey) -> Option<PathBuf> {
        let entry = self
            .entries
            .get(&UnitKey::new(key.id.clone(), key.version.clone()))?;
        Some(self.root.join(&entry.file))
    }
}

impl LocalCacheWriter for LocalArtifactCache {
    fn save(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create {}", self.root.display()))?;
        let index = CacheIndex {
            entries: self.entries.values().cloned().collect(),
        };
        let content = serde_json::to_string_pretty(&index)?;
        let index_file = self.root.join(INDEX_FILE);
        let tmp = self.root.join(format!("{INDEX_FILE}.tmp"));
        std::fs::write(&tmp, content)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &index_file)
            .with_context(|| format!("failed to replace {}", index_file.display()))?;
        log::debug!(
            "Saved {} entries to {}",
            self.entries.len(),
            index_file.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use expect_test::expect;
    use reactor_util::Unit;

    use super::*;

    #[test]
    fn save_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = LocalArtifactCache::open(dir.path()).unwrap();
        assert!(cache.is_empty());

        let unit = Unit::new("org.example.core", "1.0.0".parse().unwrap())
            .with_package("org.example.api", "1.0.0".parse().unwrap())
            .into_ref();
        cache.add(unit.clone(), "org.example.core_1.0.0.jar");
        cache.add(
            Unit::new("org.example.ui", "1.0.0".parse().unwrap()).into_ref(),
            "/abs/ui.jar",
        );
        cache.save().unwrap();

        let reopened = LocalArtifactCache::open(dir.path()).unwrap();
        expect!["[org.example.core@1.0.0, org.example.ui@1.0.0]"]
            .assert_eq(&format!("{:?}", reopened.cached_units()));
        let restored = reopened.cached_units();
        let restored = restored.get(unit.key()).unwrap();
        assert_eq!(restored.capabilities(), unit.capabilities());

        let key = ArtifactKey::from(&*unit);
        assert_eq!(
            reopened.artifact_file(&key),
            Some(dir.path().join("org.example.core_1.0.0.jar"))
        );
        assert_eq!(
            reopened.artifact_file(&ArtifactKey::new("org.example.ui", "1.0.0".parse().unwrap())),
            Some(PathBuf::from("/abs/ui.jar"))
        );
        assert!(!dir.path().join("index.json.tmp").exists());
    }

    #[test]
    fn malformed_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(INDEX_FILE), "{ not json").unwrap();
        let err = LocalArtifactCache::open(dir.path()).unwrap_err();
        assert!(err.to_string().starts_with("malformed local cache index"));
    }
}
