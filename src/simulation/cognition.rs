//! Cognition: picking each agent's next state
//!
//! Deliberation runs against a read-only snapshot so slow gateway calls never
//! hold the world. The resulting [`AgentDecision`]s are applied afterwards in
//! one batch. A missing, failing, slow or incoherent gateway always degrades
//! to the utility heuristic, never to an error.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, warn};

use crate::core::config::{EngineConfig, RecursionClock};
use crate::core::error::{AxiomError, Result};
use crate::core::types::AgentId;
use crate::entity::agent::{Agent, AgentState, DecisionRecord, DecisionSource, EmergentRecord, Faction};
use crate::llm::context::DecisionContext;
use crate::llm::gateway::{EmergentBehavior, GatewayDecision, ReasoningGateway};
use crate::simulation::utility::{recursion_factor, UtilityEngine};
use crate::world::events::{Channel, EventCategory, EventLogEntry};
use crate::world::snapshot::WorldSnapshot;

const REFLECTION_MEMORY_WINDOW: usize = 5;
const REFLECTION_NEARBY_LIMIT: usize = 3;

/// A decision ready to be applied to the world
#[derive(Debug, Clone, PartialEq)]
pub struct AgentDecision {
    pub agent_id: AgentId,
    pub decision: AgentState,
    pub justification: String,
    pub new_state: AgentState,
    pub message: Option<String>,
    pub source: DecisionSource,
}

pub struct Cognition {
    gateway: Option<Arc<dyn ReasoningGateway>>,
    utility: UtilityEngine,
    timeout: Duration,
    memory_window: usize,
    nearby_limit: usize,
    recursion_clock: RecursionClock,
    fast_tick_secs: f32,
}

impl Cognition {
    pub fn new(config: &EngineConfig, gateway: Option<Arc<dyn ReasoningGateway>>) -> Self {
        Self {
            gateway,
            utility: UtilityEngine::new(config),
            timeout: config.gateway_timeout(),
            memory_window: config.gateway_memory_window,
            nearby_limit: config.gateway_nearby_limit,
            recursion_clock: config.recursion_clock,
            fast_tick_secs: config.fast_tick_secs,
        }
    }

    pub fn has_gateway(&self) -> bool {
        self.gateway.is_some()
    }

    /// Time input of the recursion factor, in seconds
    pub fn recursion_time(&self, world: &WorldSnapshot, now: DateTime<Utc>) -> f64 {
        match self.recursion_clock {
            RecursionClock::WallClock => now.timestamp_millis() as f64 / 1000.0,
            RecursionClock::TickCounter => world.tick as f64 * self.fast_tick_secs as f64,
        }
    }

    /// Decision context for `agent` within `world`
    pub fn context_for(&self, world: &WorldSnapshot, agent: &Agent) -> DecisionContext {
        DecisionContext::from_agent(
            agent,
            &world.agents,
            world.metrics,
            self.memory_window,
            self.nearby_limit,
        )
    }

    /// Decide for one agent: gateway first, heuristic on any failure
    pub async fn deliberate<R: Rng>(
        &self,
        ctx: &DecisionContext,
        recursion: f32,
        rng: &mut R,
    ) -> AgentDecision {
        if let Some(decision) = self.consult(ctx).await {
            let justification = if decision.justification.trim().is_empty() {
                "Neural link active".to_string()
            } else {
                decision.justification
            };
            return AgentDecision {
                agent_id: ctx.agent_id.clone(),
                decision: decision.decision,
                justification,
                new_state: decision.new_state,
                message: decision.message,
                source: DecisionSource::Gateway,
            };
        }

        let choice = self.utility.choose(ctx, recursion, rng);
        AgentDecision {
            agent_id: ctx.agent_id.clone(),
            decision: choice.decision,
            justification: choice.justification,
            new_state: choice.new_state,
            message: None,
            source: DecisionSource::Heuristic,
        }
    }

    /// Decide for every non-SYSTEM agent in `world`, in roster order
    pub async fn deliberate_all<R: Rng>(
        &self,
        world: &WorldSnapshot,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Vec<AgentDecision> {
        let recursion = recursion_factor(self.recursion_time(world, now));
        let mut decisions = Vec::with_capacity(world.agents.len());

        for agent in world.agents.iter().filter(|a| a.faction != Faction::System) {
            let ctx = self.context_for(world, agent);
            decisions.push(self.deliberate(&ctx, recursion, rng).await);
        }
        decisions
    }

    /// Emergent reflection for one agent
    pub async fn reflect(&self, world: &WorldSnapshot, agent: &Agent) -> EmergentBehavior {
        let Some(gateway) = &self.gateway else {
            return EmergentBehavior::internal_reflection("Local heuristics active, matrix stable");
        };

        let ctx = DecisionContext::from_agent(
            agent,
            &world.agents,
            world.metrics,
            REFLECTION_MEMORY_WINDOW,
            REFLECTION_NEARBY_LIMIT,
        );

        match self.bounded(gateway.reflect(&ctx)).await {
            Ok(behavior) => behavior,
            Err(e) => {
                warn!(agent = %agent.id, error = %e, "Reflection failed");
                EmergentBehavior::internal_reflection(format!("Neural pathways recalibrating: {}", e))
            }
        }
    }

    async fn consult(&self, ctx: &DecisionContext) -> Option<GatewayDecision> {
        let gateway = self.gateway.as_ref()?;
        match self.bounded(gateway.decide(ctx)).await {
            Ok(decision) => Some(decision),
            Err(e) => {
                warn!(agent = %ctx.agent_id, error = %e, "Gateway decision unavailable, using heuristic");
                None
            }
        }
    }

    async fn bounded<T>(&self, call: impl std::future::Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| AxiomError::GatewayTimeout(self.timeout.as_secs_f32()))?
    }
}

/// Write a decision into the world
///
/// Returns false when the agent no longer exists.
pub fn apply_decision(world: &mut WorldSnapshot, decision: &AgentDecision, now: DateTime<Utc>) -> bool {
    let Some(agent) = world.agent_mut(&decision.agent_id) else {
        return false;
    };

    agent.state = decision.new_state;
    agent.last_decision = Some(DecisionRecord {
        decision: decision.decision,
        justification: decision.justification.clone(),
        source: decision.source,
        decided_at: now,
    });
    debug!(
        agent = %agent.id,
        state = %decision.new_state,
        source = ?decision.source,
        "Decision applied"
    );

    if let Some(message) = decision.message.as_deref() {
        speak(world, &decision.agent_id, message, now);
    }
    true
}

/// Record a reflection on the agent's emergent log
pub fn apply_reflection(
    world: &mut WorldSnapshot,
    agent_id: &AgentId,
    behavior: &EmergentBehavior,
    log_cap: usize,
    now: DateTime<Utc>,
) -> Result<()> {
    let agent = world
        .agent_mut(agent_id)
        .ok_or_else(|| AxiomError::AgentNotFound(agent_id.clone()))?;

    agent.record_emergent(
        EmergentRecord {
            action: behavior.action.clone(),
            reasoning: behavior.reasoning.clone(),
            recorded_at: now,
        },
        log_cap,
    );

    if let Some(message) = behavior.message.as_deref() {
        speak(world, agent_id, message, now);
    }
    Ok(())
}

/// Thoughts become visible: memory plus a THOUGHT channel entry
fn speak(world: &mut WorldSnapshot, agent_id: &AgentId, message: &str, now: DateTime<Utc>) {
    let message = message.trim();
    if message.is_empty() {
        return;
    }
    let Some(agent) = world.agent_mut(agent_id) else {
        return;
    };
    agent.remember(message);
    let entry = EventLogEntry::new(
        agent.id.as_str(),
        agent.name.clone(),
        EventCategory::Thought,
        Channel::Thought,
        message,
        now,
    );
    world.events.append(entry);
}
