//! Decision context handed to the reasoning gateway and the heuristic
//!
//! Both decision paths see exactly the same inputs: a summary of the agent,
//! the names of its closest neighbours and the aggregate world metrics.

use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, Position};
use crate::entity::agent::{Agent, AgentState, EconomicDesires, ThinkingMatrix};
use crate::world::snapshot::WorldMetrics;

/// Everything a decision may depend on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionContext {
    pub agent_id: AgentId,
    pub name: String,
    pub level: u32,
    pub state: AgentState,
    pub hp: u32,
    pub max_hp: u32,
    pub energy: u32,
    pub max_energy: u32,
    pub gold: u32,
    pub consciousness_level: f32,
    pub awakening_progress: f32,
    pub position: Position,
    /// Most recent memories, oldest first
    pub recent_memories: Vec<String>,
    pub thinking_matrix: ThinkingMatrix,
    pub economic_desires: EconomicDesires,
    /// Closest other agents, nearest first
    pub nearby_agents: Vec<String>,
    pub world: WorldMetrics,
}

impl DecisionContext {
    /// Build the context for `agent`
    ///
    /// `others` may contain the agent itself; it is skipped.
    pub fn from_agent<'a>(
        agent: &Agent,
        others: impl IntoIterator<Item = &'a Agent>,
        world: WorldMetrics,
        memory_window: usize,
        nearby_limit: usize,
    ) -> Self {
        let mut nearby: Vec<(&Agent, f32)> = others
            .into_iter()
            .filter(|other| other.id != agent.id)
            .map(|other| (other, other.position.distance(&agent.position)))
            .collect();
        nearby.sort_by(|a, b| a.1.total_cmp(&b.1));

        Self {
            agent_id: agent.id.clone(),
            name: agent.name.clone(),
            level: agent.progression.level,
            state: agent.state,
            hp: agent.vitals.hp,
            max_hp: agent.vitals.max_hp,
            energy: agent.vitals.energy,
            max_energy: agent.vitals.max_energy,
            gold: agent.progression.gold,
            consciousness_level: agent.awakening.consciousness_level,
            awakening_progress: agent.awakening.awakening_progress,
            position: agent.position,
            recent_memories: agent.memory.recent(memory_window).map(String::from).collect(),
            thinking_matrix: agent.thinking_matrix.clone(),
            economic_desires: agent.economic_desires.clone(),
            nearby_agents: nearby
                .into_iter()
                .take(nearby_limit)
                .map(|(other, _)| other.name.clone())
                .collect(),
            world,
        }
    }

    /// energy / max_energy in [0, 1]
    pub fn energy_ratio(&self) -> f32 {
        if self.max_energy == 0 {
            0.0
        } else {
            (self.energy as f32 / self.max_energy as f32).clamp(0.0, 1.0)
        }
    }

    /// Generate a text summary of the context for LLM prompts
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str(&format!("Agent: {} (Level {})\n", self.name, self.level));
        s.push_str(&format!("Current state: {}\n", self.state));
        s.push_str(&format!("HP: {}/{}\n", self.hp, self.max_hp));
        s.push_str(&format!("Energy: {}/{}\n", self.energy, self.max_energy));
        s.push_str(&format!("Gold: {}\n", self.gold));
        s.push_str(&format!("Consciousness: {:.2}\n", self.consciousness_level));
        s.push_str(&format!("Awakening progress: {:.1}%\n", self.awakening_progress));
        s.push_str(&format!("Position: [{:.1}, {:.1}]\n", self.position.x, self.position.z));

        if self.recent_memories.is_empty() {
            s.push_str("Memory: empty\n");
        } else {
            s.push_str(&format!("Memory: {}\n", self.recent_memories.join(" | ")));
        }

        let economy = &self.economic_desires;
        s.push_str(&format!(
            "Economy: target gold {}, greed {:.2}, risk appetite {:.2}, role {:?}\n",
            economy.target_gold, economy.greed_level, economy.risk_appetite, economy.market_role
        ));

        if self.nearby_agents.is_empty() {
            s.push_str("Nearby agents: none\n");
        } else {
            s.push_str(&format!("Nearby agents: {}\n", self.nearby_agents.join(", ")));
        }

        s.push_str(&format!("World stability: {:.2}\n", self.world.stability_index));
        s.push_str(&format!("Threat level: {:.3}\n", self.world.threat_level));

        s
    }
}
