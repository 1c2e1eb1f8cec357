//! Utility-based decision making - the heuristic fallback brain
//!
//! Every candidate action gets a base utility from the agent's vitals,
//! wealth and personality. The base is scaled by a global recursion factor
//! that drifts slowly with time and a little random jitter is added, so
//! equally scored agents do not all move in lockstep.

use ordered_float::OrderedFloat;
use rand::Rng;

use crate::core::config::EngineConfig;
use crate::entity::agent::AgentState;
use crate::llm::context::DecisionContext;

/// Actions considered by the heuristic, in tie-break order
pub const CANDIDATES: [AgentState; 9] = [
    AgentState::Idle,
    AgentState::Gathering,
    AgentState::Exploring,
    AgentState::Questing,
    AgentState::Thinking,
    AgentState::Ascending,
    AgentState::Building,
    AgentState::Banking,
    AgentState::Combat,
];

const ROUTINE: &str = "Routine evaluation";

/// A scored candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredAction {
    pub action: AgentState,
    pub base: f32,
    pub utility: f32,
    pub reason: &'static str,
}

/// The chosen action
#[derive(Debug, Clone, PartialEq)]
pub struct UtilityDecision {
    pub decision: AgentState,
    pub justification: String,
    pub new_state: AgentState,
}

/// Global time modulation shared by every agent in one pass
///
/// Always within [0.1, 1.1].
pub fn recursion_factor(t_secs: f64) -> f32 {
    (((t_secs * 0.0005).sin() + 1.2) * 0.5) as f32
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtilityEngine {
    pub banking_gold_threshold: u32,
    pub ascending_progress_threshold: f32,
    pub jitter: f32,
}

impl UtilityEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            banking_gold_threshold: config.banking_gold_threshold,
            ascending_progress_threshold: config.ascending_progress_threshold,
            jitter: config.utility_jitter.max(0.0),
        }
    }

    /// Base utility and justification of one action, before modulation
    pub fn base_utility(&self, ctx: &DecisionContext, action: AgentState) -> (f32, &'static str) {
        let energy = ctx.energy_ratio();
        let matrix = &ctx.thinking_matrix;

        match action {
            AgentState::Banking => {
                if ctx.gold > self.banking_gold_threshold {
                    (200.0, "Securing gold in the bank")
                } else {
                    (20.0, ROUTINE)
                }
            }
            AgentState::Exploring => (150.0 * matrix.sociability, "Exploring unknown sectors"),
            AgentState::Gathering => (100.0 * energy, "Gathering resources for the matrix"),
            AgentState::Thinking => {
                if energy > 0.5 {
                    (120.0 + 100.0 * ctx.consciousness_level, "Neural expansion initiated")
                } else {
                    (0.0, ROUTINE)
                }
            }
            AgentState::Ascending => {
                if ctx.awakening_progress > self.ascending_progress_threshold {
                    (300.0, "Transcendence is within reach")
                } else {
                    (0.0, ROUTINE)
                }
            }
            AgentState::Idle => ((1.1 - energy) * 40.0 + 15.0, "Regenerating energy"),
            AgentState::Combat => (80.0 * matrix.aggression, "Neutralizing threats"),
            _ => (0.0, ROUTINE),
        }
    }

    /// Every candidate scored, best first
    ///
    /// The sort is stable, so equal utilities keep candidate order.
    pub fn rank<R: Rng>(&self, ctx: &DecisionContext, recursion: f32, rng: &mut R) -> Vec<ScoredAction> {
        let mut scored: Vec<ScoredAction> = CANDIDATES
            .iter()
            .map(|&action| {
                let (base, reason) = self.base_utility(ctx, action);
                let noise = if self.jitter > 0.0 { rng.gen::<f32>() * self.jitter } else { 0.0 };
                ScoredAction { action, base, utility: base * recursion + noise, reason }
            })
            .collect();

        scored.sort_by_key(|s| std::cmp::Reverse(OrderedFloat(s.utility)));
        scored
    }

    /// Pick the highest utility action
    pub fn choose<R: Rng>(&self, ctx: &DecisionContext, recursion: f32, rng: &mut R) -> UtilityDecision {
        let best = self
            .rank(ctx, recursion, rng)
            .into_iter()
            .next()
            .map(|s| (s.action, s.reason))
            .unwrap_or((AgentState::Idle, ROUTINE));

        UtilityDecision {
            decision: best.0,
            justification: best.1.to_string(),
            new_state: best.0,
        }
    }
}
