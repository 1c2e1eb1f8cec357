//! World persistence
//!
//! The world is one document. Stores replace it whole on every save, so a
//! reader never sees half of a tick.

pub mod file;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::info;

use crate::core::config::EngineConfig;
use crate::core::error::Result;
use crate::world::snapshot::WorldSnapshot;

pub use file::JsonFileWorldStore;
pub use memory::InMemoryWorldStore;

#[async_trait]
pub trait WorldStore: Send + Sync {
    /// The stored world, if one exists
    async fn load(&self) -> Result<Option<WorldSnapshot>>;

    /// Replace the stored world
    async fn save(&self, world: &WorldSnapshot) -> Result<()>;

    /// Delete the stored world
    async fn reset(&self) -> Result<()>;
}

/// Load the stored world, bootstrapping and saving a fresh one if absent
pub async fn load_or_bootstrap<R: Rng>(
    store: &dyn WorldStore,
    config: &EngineConfig,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<WorldSnapshot> {
    if let Some(mut world) = store.load().await? {
        world.sanitize(config);
        return Ok(world);
    }

    let world = WorldSnapshot::bootstrap(config, rng, now);
    store.save(&world).await?;
    info!(
        agents = world.agents.len(),
        pois = world.pois.len(),
        cells = world.grid.len(),
        "Bootstrapped new world"
    );
    Ok(world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[tokio::test]
    async fn test_bootstrap_only_once() {
        let store = InMemoryWorldStore::new();
        let config = EngineConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let mut first = load_or_bootstrap(&store, &config, &mut rng, Utc::now()).await.unwrap();
        first.tick = 42;
        store.save(&first).await.unwrap();

        let second = load_or_bootstrap(&store, &config, &mut rng, Utc::now()).await.unwrap();
        assert_eq!(second.tick, 42);
        assert_eq!(second.agents.len(), 2);
    }

    #[tokio::test]
    async fn test_loaded_world_is_sanitized() {
        let store = InMemoryWorldStore::new();
        let config = EngineConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut world = WorldSnapshot::bootstrap(&config, &mut rng, Utc::now());
        world.agents[0].vitals.energy = 9_999;
        store.save(&world).await.unwrap();

        let loaded = load_or_bootstrap(&store, &config, &mut rng, Utc::now()).await.unwrap();
        assert_eq!(loaded.agents[0].vitals.energy, loaded.agents[0].vitals.max_energy);
    }
}
