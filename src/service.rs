//! Request-side operations on the world
//!
//! Everything here runs outside the clock. Each mutation is one
//! [`WorldSession`](crate::context::WorldSession), so it either lands whole
//! or not at all, and never interleaves with a tick.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::context::EngineContext;
use crate::core::error::{AxiomError, Result};
use crate::core::types::AgentId;
use crate::entity::agent::Agent;
use crate::llm::gateway::EmergentBehavior;
use crate::simulation::cognition::{apply_decision, apply_reflection, AgentDecision};
use crate::simulation::erosion::stabilize;
use crate::simulation::utility::recursion_factor;
use crate::spatial::grid::GridCell;
use crate::world::events::{Channel, EventCategory, EventLogEntry};
use crate::world::import;
use crate::world::snapshot::WorldSnapshot;

/// Stability credited to the log for one stabilizing action
const STABILIZE_IMPACT: f32 = 0.05;

#[derive(Clone)]
pub struct WorldService {
    ctx: Arc<EngineContext>,
}

impl WorldService {
    pub fn new(ctx: Arc<EngineContext>) -> Self {
        Self { ctx }
    }

    pub async fn world(&self) -> Result<WorldSnapshot> {
        self.ctx.snapshot().await
    }

    pub async fn agent(&self, id: &AgentId) -> Result<Agent> {
        self.world()
            .await?
            .agent(id)
            .cloned()
            .ok_or_else(|| AxiomError::AgentNotFound(id.clone()))
    }

    /// Add a character from an external JSON card
    pub async fn import_character(&self, json: &str, source: &str) -> Result<Agent> {
        let mut rng = self.ctx.fork_rng();
        let agent = import::import_character(json, source, self.ctx.config.memory_cap, &mut rng, Utc::now())?;

        let mut session = self.ctx.session().await?;
        session.world.agents.push(agent.clone());
        session.commit().await?;

        info!(agent = %agent.id, name = %agent.name, source, "Character imported");
        Ok(agent)
    }

    /// Run cognition for one agent right now
    pub async fn trigger_decision(&self, id: &AgentId) -> Result<AgentDecision> {
        let world = self.world().await?;
        let agent = world
            .agent(id)
            .ok_or_else(|| AxiomError::AgentNotFound(id.clone()))?;

        let cognition = &self.ctx.cognition;
        let now = Utc::now();
        let ctx = cognition.context_for(&world, agent);
        let recursion = recursion_factor(cognition.recursion_time(&world, now));
        let mut rng = self.ctx.fork_rng();
        let decision = cognition.deliberate(&ctx, recursion, &mut rng).await;

        let mut session = self.ctx.session().await?;
        if !apply_decision(&mut session.world, &decision, now) {
            return Err(AxiomError::AgentNotFound(id.clone()));
        }
        session.commit().await?;
        Ok(decision)
    }

    /// Ask for an emergent behavior and log it on the agent
    pub async fn trigger_reflection(&self, id: &AgentId) -> Result<EmergentBehavior> {
        let world = self.world().await?;
        let agent = world
            .agent(id)
            .ok_or_else(|| AxiomError::AgentNotFound(id.clone()))?;
        let behavior = self.ctx.cognition.reflect(&world, agent).await;

        let mut session = self.ctx.session().await?;
        apply_reflection(
            &mut session.world,
            id,
            &behavior,
            self.ctx.config.emergent_log_cap,
            Utc::now(),
        )?;
        session.commit().await?;
        Ok(behavior)
    }

    /// Append a chat message to the event log
    pub async fn post_message(
        &self,
        sender_id: &str,
        sender_name: &str,
        channel: Channel,
        content: &str,
    ) -> Result<EventLogEntry> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AxiomError::EmptyMessage);
        }

        let entry = EventLogEntry::new(
            sender_id,
            sender_name,
            EventCategory::Chat,
            channel,
            content,
            Utc::now(),
        );
        let mut session = self.ctx.session().await?;
        session.world.events.append(entry.clone());
        session.commit().await?;
        Ok(entry)
    }

    /// Newest first
    pub async fn recent_events(&self, limit: usize) -> Result<Vec<EventLogEntry>> {
        Ok(self.world().await?.events.recent(limit).cloned().collect())
    }

    /// Restore one cell to a stable state
    pub async fn stabilize_cell(&self, x: i32, z: i32) -> Result<GridCell> {
        let now = Utc::now();
        let mut session = self.ctx.session().await?;
        let cell = session
            .world
            .grid
            .get_mut(x, z)
            .ok_or(AxiomError::CellNotFound { x, z })?;
        stabilize(cell, &self.ctx.config);
        let cell = cell.clone();

        session.world.events.append(
            EventLogEntry::system(
                EventCategory::Evolution,
                format!("Axiomatic stabilization of sector [{}, {}] complete", x, z),
                now,
            )
            .with_stability_impact(STABILIZE_IMPACT),
        );
        session.commit().await?;
        Ok(cell)
    }

    pub async fn reset_world(&self) -> Result<WorldSnapshot> {
        self.ctx.reset().await
    }
}
