//! JSON document store on the local filesystem

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::core::error::{AxiomError, Result};
use crate::store::WorldStore;
use crate::world::snapshot::WorldSnapshot;

/// Stores the world as one JSON file
///
/// Saves write a sibling temp file and rename it over the target, so the
/// file on disk is always a complete document.
#[derive(Debug, Clone)]
pub struct JsonFileWorldStore {
    path: PathBuf,
}

impl JsonFileWorldStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "world.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl WorldStore for JsonFileWorldStore {
    async fn load(&self) -> Result<Option<WorldSnapshot>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let world = serde_json::from_slice(&bytes).map_err(|e| {
            AxiomError::Store(format!("{} is not a valid world: {}", self.path.display(), e))
        })?;
        Ok(Some(world))
    }

    async fn save(&self, world: &WorldSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec(world)?;
        let staging = self.staging_path();
        fs::write(&staging, &bytes).await?;
        fs::rename(&staging, &self.path).await?;

        debug!(path = %self.path.display(), bytes = bytes.len(), tick = world.tick, "World saved");
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_path_is_sibling() {
        let store = JsonFileWorldStore::new("/data/world.json");
        assert_eq!(store.staging_path(), PathBuf::from("/data/world.json.tmp"));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let store = JsonFileWorldStore::new(&path);
        assert!(matches!(store.load().await, Err(AxiomError::Store(_))));
    }

    #[tokio::test]
    async fn test_missing_file_loads_none_and_resets_quietly() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileWorldStore::new(dir.path().join("absent.json"));
        assert!(store.load().await.unwrap().is_none());
        store.reset().await.unwrap();
    }
}
