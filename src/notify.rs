//! Push delivery of world updates to connected observers
//!
//! Delivery is best effort: the clock never waits on a slow observer and a
//! failed delivery is never an error.

use std::sync::Mutex;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::entity::agent::Agent;
use crate::entity::monster::Monster;
use crate::spatial::grid::WorldGrid;
use crate::world::events::EventLogEntry;
use crate::world::poi::PointOfInterest;
use crate::world::snapshot::{WorldMetrics, WorldSnapshot};

/// What observers receive after every tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldUpdate {
    pub tick: u64,
    pub agents: Vec<Agent>,
    pub monsters: Vec<Monster>,
    pub pois: Vec<PointOfInterest>,
    pub grid: WorldGrid,
    /// Newest first
    pub events: Vec<EventLogEntry>,
    pub metrics: WorldMetrics,
    pub uptime_secs: f64,
}

impl WorldUpdate {
    pub fn from_snapshot(world: &WorldSnapshot, event_window: usize) -> Self {
        Self {
            tick: world.tick,
            agents: world.agents.clone(),
            monsters: world.monsters.clone(),
            pois: world.pois.clone(),
            grid: world.grid.clone(),
            events: world.events.recent(event_window).cloned().collect(),
            metrics: world.metrics,
            uptime_secs: world.uptime_secs,
        }
    }
}

pub trait Notifier: Send + Sync {
    /// Push the current world to every observer
    fn broadcast(&self, world: &WorldSnapshot);
}

/// Drops every update
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn broadcast(&self, _world: &WorldSnapshot) {}
}

/// Fan-out to bounded channels handed out by [`subscribe`](Self::subscribe)
pub struct SubscriberNotifier {
    subscribers: Mutex<Vec<mpsc::Sender<WorldUpdate>>>,
    capacity: usize,
    event_window: usize,
}

impl SubscriberNotifier {
    pub fn new(capacity: usize, event_window: usize) -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            capacity: capacity.max(1),
            event_window,
        }
    }

    pub fn subscribe(&self) -> mpsc::Receiver<WorldUpdate> {
        let (tx, rx) = mpsc::channel(self.capacity);
        match self.subscribers.lock() {
            Ok(mut subscribers) => subscribers.push(tx),
            Err(poisoned) => poisoned.into_inner().push(tx),
        }
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        match self.subscribers.lock() {
            Ok(subscribers) => subscribers.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

impl Notifier for SubscriberNotifier {
    fn broadcast(&self, world: &WorldSnapshot) {
        let mut subscribers = match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Subscriber list lock was poisoned");
                poisoned.into_inner()
            }
        };
        if subscribers.is_empty() {
            return;
        }

        let update = WorldUpdate::from_snapshot(world, self.event_window);
        subscribers.retain(|tx| match tx.try_send(update.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!(tick = update.tick, "Observer lagging, update skipped");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
    }
}
