//! Shared engine handles
//!
//! One [`EngineContext`] is built at startup and passed (behind an `Arc`) to
//! the clock and the request-side service. Every world mutation goes through
//! a [`WorldSession`]: the session holds the world lock from load to commit,
//! so the clock and concurrent requests never interleave their writes.

use std::sync::{Arc, Mutex as StdMutex};

use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::core::config::EngineConfig;
use crate::core::error::Result;
use crate::llm::gateway::ReasoningGateway;
use crate::notify::{Notifier, NullNotifier};
use crate::simulation::cognition::Cognition;
use crate::store::{load_or_bootstrap, InMemoryWorldStore, WorldStore};
use crate::world::snapshot::WorldSnapshot;

pub struct EngineContext {
    pub config: Arc<EngineConfig>,
    pub store: Arc<dyn WorldStore>,
    pub notifier: Arc<dyn Notifier>,
    pub cognition: Cognition,
    world_lock: Mutex<()>,
    rng: StdMutex<ChaCha8Rng>,
}

impl EngineContext {
    pub fn new(
        config: EngineConfig,
        store: Arc<dyn WorldStore>,
        notifier: Arc<dyn Notifier>,
        gateway: Option<Arc<dyn ReasoningGateway>>,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let cognition = Cognition::new(&config, gateway);
        Self {
            config: Arc::new(config),
            store,
            notifier,
            cognition,
            world_lock: Mutex::new(()),
            rng: StdMutex::new(rng),
        }
    }

    /// In-memory store, no observers, heuristic cognition only
    pub fn in_memory(config: EngineConfig) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryWorldStore::new()),
            Arc::new(NullNotifier),
            None,
        )
    }

    /// A generator split off the engine's seeded stream
    pub fn fork_rng(&self) -> ChaCha8Rng {
        let seed = match self.rng.lock() {
            Ok(mut rng) => rng.gen(),
            Err(poisoned) => poisoned.into_inner().gen(),
        };
        ChaCha8Rng::seed_from_u64(seed)
    }

    /// Lock the world and load it for mutation
    pub async fn session(&self) -> Result<WorldSession<'_>> {
        let guard = self.world_lock.lock().await;
        let mut rng = self.fork_rng();
        let world = load_or_bootstrap(self.store.as_ref(), &self.config, &mut rng, Utc::now()).await?;
        Ok(WorldSession {
            _guard: guard,
            store: self.store.as_ref(),
            world,
        })
    }

    /// A consistent read-only copy of the world
    pub async fn snapshot(&self) -> Result<WorldSnapshot> {
        Ok(self.session().await?.world)
    }

    /// Delete the stored world and bootstrap a fresh one
    pub async fn reset(&self) -> Result<WorldSnapshot> {
        let _guard = self.world_lock.lock().await;
        self.store.reset().await?;
        let mut rng = self.fork_rng();
        let world = load_or_bootstrap(self.store.as_ref(), &self.config, &mut rng, Utc::now()).await?;
        info!(tick = world.tick, "World reset");
        Ok(world)
    }
}

/// Exclusive access to the world between load and commit
///
/// Dropping a session without committing discards its changes.
pub struct WorldSession<'a> {
    _guard: MutexGuard<'a, ()>,
    store: &'a dyn WorldStore,
    pub world: WorldSnapshot,
}

impl WorldSession<'_> {
    /// Persist the world and release the lock
    pub async fn commit(self) -> Result<WorldSnapshot> {
        self.store.save(&self.world).await?;
        Ok(self.world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> EngineContext {
        EngineContext::in_memory(EngineConfig { seed: Some(7), ..EngineConfig::default() })
    }

    #[tokio::test]
    async fn test_commit_persists_and_drop_discards() {
        let ctx = seeded();

        let mut session = ctx.session().await.unwrap();
        session.world.tick = 5;
        session.commit().await.unwrap();
        assert_eq!(ctx.snapshot().await.unwrap().tick, 5);

        let mut session = ctx.session().await.unwrap();
        session.world.tick = 99;
        drop(session);
        assert_eq!(ctx.snapshot().await.unwrap().tick, 5);
    }

    #[tokio::test]
    async fn test_reset_bootstraps_again() {
        let ctx = seeded();
        let mut session = ctx.session().await.unwrap();
        session.world.agents.clear();
        session.commit().await.unwrap();

        let world = ctx.reset().await.unwrap();
        assert_eq!(world.agents.len(), 2);
        assert_eq!(world.tick, 0);
    }

    #[test]
    fn test_seeded_rng_forks_are_reproducible() {
        let a = seeded().fork_rng().gen::<u64>();
        let b = seeded().fork_rng().gen::<u64>();
        assert_eq!(a, b);
    }
}
