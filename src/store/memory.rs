use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::error::Result;
use crate::store::WorldStore;
use crate::world::snapshot::WorldSnapshot;

/// Process-local store; the world is lost on exit
#[derive(Debug, Default)]
pub struct InMemoryWorldStore {
    world: RwLock<Option<WorldSnapshot>>,
}

impl InMemoryWorldStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorldStore for InMemoryWorldStore {
    async fn load(&self) -> Result<Option<WorldSnapshot>> {
        Ok(self.world.read().await.clone())
    }

    async fn save(&self, world: &WorldSnapshot) -> Result<()> {
        *self.world.write().await = Some(world.clone());
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        *self.world.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EngineConfig;
    use chrono::Utc;

    #[tokio::test]
    async fn test_save_load_reset() {
        let store = InMemoryWorldStore::new();
        assert!(store.load().await.unwrap().is_none());

        let world = WorldSnapshot::empty(&EngineConfig::default(), Utc::now());
        store.save(&world).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(world));

        store.reset().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }
}
