//! Integration tests for the reasoning gateway contract
//!
//! A gateway that errors, stalls, or answers with nonsense must produce
//! exactly the same kind of outcome as having no gateway at all: a
//! heuristic decision, applied normally, with nothing leaking into memory
//! or the event log.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axiom_engine::core::config::EngineConfig;
use axiom_engine::core::error::{AxiomError, Result};
use axiom_engine::core::types::AgentId;
use axiom_engine::entity::agent::{AgentState, DecisionSource};
use axiom_engine::llm::context::DecisionContext;
use axiom_engine::llm::gateway::{parse_decision, EmergentBehavior, GatewayDecision, ReasoningGateway};
use axiom_engine::notify::NullNotifier;
use axiom_engine::simulation::utility::CANDIDATES;
use axiom_engine::store::InMemoryWorldStore;
use axiom_engine::world::events::{Channel, EventCategory};
use axiom_engine::world::WorldSnapshot;
use axiom_engine::{EngineContext, SimulationClock, WorldService};
use chrono::Utc;

// ============================================================================
// Scripted gateways
// ============================================================================

struct AlwaysFail;

#[async_trait]
impl ReasoningGateway for AlwaysFail {
    async fn decide(&self, _ctx: &DecisionContext) -> Result<GatewayDecision> {
        Err(AxiomError::Llm("connection refused".into()))
    }

    async fn reflect(&self, _ctx: &DecisionContext) -> Result<EmergentBehavior> {
        Err(AxiomError::Llm("connection refused".into()))
    }
}

struct Stalled;

#[async_trait]
impl ReasoningGateway for Stalled {
    async fn decide(&self, _ctx: &DecisionContext) -> Result<GatewayDecision> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Err(AxiomError::Llm("unreachable".into()))
    }

    async fn reflect(&self, _ctx: &DecisionContext) -> Result<EmergentBehavior> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Err(AxiomError::Llm("unreachable".into()))
    }
}

/// Answers with text that is not a decision
struct Rambling;

#[async_trait]
impl ReasoningGateway for Rambling {
    async fn decide(&self, _ctx: &DecisionContext) -> Result<GatewayDecision> {
        parse_decision(r#"I think the agent should {"decision": "DANCE", "new_state": "SING"}"#)
    }

    async fn reflect(&self, _ctx: &DecisionContext) -> Result<EmergentBehavior> {
        Err(AxiomError::MalformedDecision("no object".into()))
    }
}

/// Always answers with the same decision and counts calls
struct Fixed {
    state: AgentState,
    message: Option<String>,
    calls: AtomicUsize,
}

impl Fixed {
    fn new(state: AgentState, message: Option<&str>) -> Self {
        Self { state, message: message.map(String::from), calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl ReasoningGateway for Fixed {
    async fn decide(&self, _ctx: &DecisionContext) -> Result<GatewayDecision> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(GatewayDecision {
            decision: self.state,
            justification: "Scripted".into(),
            new_state: self.state,
            message: self.message.as_ref().map(|m| format!("{} #{}", m, n)),
        })
    }

    async fn reflect(&self, _ctx: &DecisionContext) -> Result<EmergentBehavior> {
        Ok(EmergentBehavior {
            action: "Map the old roads".into(),
            reasoning: "Curiosity".into(),
            message: None,
        })
    }
}

fn context_with(gateway: Arc<dyn ReasoningGateway>, timeout_secs: f32) -> Arc<EngineContext> {
    let config = EngineConfig {
        seed: Some(77),
        gateway_timeout_secs: timeout_secs,
        ..EngineConfig::default()
    };
    Arc::new(EngineContext::new(
        config,
        Arc::new(InMemoryWorldStore::new()),
        Arc::new(NullNotifier),
        Some(gateway),
    ))
}

fn thought_count(world: &WorldSnapshot) -> usize {
    world.events.by_category(EventCategory::Thought).count()
}

// ============================================================================
// Fallback behavior
// ============================================================================

#[tokio::test]
async fn test_failing_gateway_falls_back_to_heuristic() {
    let ctx = context_with(Arc::new(AlwaysFail), 1.0);
    let mut clock = SimulationClock::new(ctx.clone());

    let report = clock.tick(Utc::now()).await.unwrap();
    assert_eq!(report.decisions, 2);
    assert_eq!(report.gateway_fallbacks, 2);

    let world = ctx.snapshot().await.unwrap();
    for agent in &world.agents {
        let record = agent.last_decision.as_ref().expect("decision applied");
        assert_eq!(record.source, DecisionSource::Heuristic);
        assert!(CANDIDATES.contains(&agent.state));
    }
    assert_eq!(thought_count(&world), 0);
}

#[tokio::test]
async fn test_stalled_gateway_times_out() {
    let ctx = context_with(Arc::new(Stalled), 0.05);
    let mut clock = SimulationClock::new(ctx.clone());

    let started = Instant::now();
    let report = clock.tick(Utc::now()).await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(5), "tick waited on the gateway");
    assert_eq!(report.gateway_fallbacks, 2);

    let world = ctx.snapshot().await.unwrap();
    assert!(world
        .agents
        .iter()
        .all(|a| a.last_decision.as_ref().map(|d| d.source) == Some(DecisionSource::Heuristic)));
}

#[tokio::test]
async fn test_malformed_answer_is_treated_as_absent() {
    let ctx = context_with(Arc::new(Rambling), 1.0);
    let service = WorldService::new(ctx.clone());
    let id = AgentId::new("aurelius_001");

    let decision = service.trigger_decision(&id).await.unwrap();
    assert_eq!(decision.source, DecisionSource::Heuristic);
    assert!(decision.message.is_none());

    let behavior = service.trigger_reflection(&id).await.unwrap();
    assert_eq!(behavior.action, "Internal Reflection");

    let agent = service.agent(&id).await.unwrap();
    assert_eq!(agent.memory.len(), 2, "bootstrap memories only");
}

// ============================================================================
// Gateway decisions
// ============================================================================

#[tokio::test]
async fn test_gateway_decision_is_applied_with_message() {
    let gateway = Arc::new(Fixed::new(AgentState::Crafting, Some("The anvil calls")));
    let ctx = context_with(gateway.clone(), 1.0);
    let mut clock = SimulationClock::new(ctx.clone());

    let report = clock.tick(Utc::now()).await.unwrap();
    assert_eq!(report.gateway_fallbacks, 0);
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 2);

    let world = ctx.snapshot().await.unwrap();
    for agent in &world.agents {
        assert_eq!(agent.state, AgentState::Crafting);
        assert!(agent.memory.iter().last().unwrap().starts_with("The anvil calls"));
    }

    let thoughts: Vec<_> = world.events.by_category(EventCategory::Thought).collect();
    assert_eq!(thoughts.len(), 2);
    assert!(thoughts.iter().all(|e| e.channel() == Channel::Thought));
}

#[tokio::test]
async fn test_gateway_messages_respect_memory_cap() {
    let gateway = Arc::new(Fixed::new(AgentState::Thinking, Some("thought")));
    let ctx = context_with(gateway, 1.0);
    let service = WorldService::new(ctx.clone());
    let id = AgentId::new("vulcan_002");

    for _ in 0..25 {
        service.trigger_decision(&id).await.unwrap();
    }

    let agent = service.agent(&id).await.unwrap();
    assert_eq!(agent.memory.len(), 20);
    // 1 bootstrap memory + 25 thoughts: the oldest 6 are gone
    assert_eq!(agent.memory.iter().next(), Some("thought #5"));
    assert_eq!(agent.memory.iter().last(), Some("thought #24"));
}

#[tokio::test]
async fn test_reflection_through_gateway() {
    let ctx = context_with(Arc::new(Fixed::new(AgentState::Idle, None)), 1.0);
    let service = WorldService::new(ctx);
    let id = AgentId::new("aurelius_001");

    for _ in 0..22 {
        service.trigger_reflection(&id).await.unwrap();
    }
    let agent = service.agent(&id).await.unwrap();
    assert_eq!(agent.emergent_log.len(), 20);
    assert_eq!(agent.emergent_log[0].action, "Map the old roads");
}
