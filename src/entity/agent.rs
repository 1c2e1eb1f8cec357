//! Agents: the autonomous inhabitants of the world
//!
//! An agent's behavioral state doubles as the decision vocabulary: the
//! utility engine and the reasoning gateway both answer with an
//! [`AgentState`], and physics reads the same value to decide how the agent
//! moves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::types::{unit, AgentId, Position};
use crate::entity::memory::MemoryLog;

/// Behavioral state, also used as the decision label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentState {
    Idle,
    Gathering,
    Combat,
    Crafting,
    Ascending,
    Questing,
    Thinking,
    Trading,
    Building,
    Exploring,
    Banking,
    Marketing,
}

impl AgentState {
    pub const ALL: [AgentState; 12] = [
        AgentState::Idle,
        AgentState::Gathering,
        AgentState::Combat,
        AgentState::Crafting,
        AgentState::Ascending,
        AgentState::Questing,
        AgentState::Thinking,
        AgentState::Trading,
        AgentState::Building,
        AgentState::Exploring,
        AgentState::Banking,
        AgentState::Marketing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentState::Idle => "IDLE",
            AgentState::Gathering => "GATHERING",
            AgentState::Combat => "COMBAT",
            AgentState::Crafting => "CRAFTING",
            AgentState::Ascending => "ASCENDING",
            AgentState::Questing => "QUESTING",
            AgentState::Thinking => "THINKING",
            AgentState::Trading => "TRADING",
            AgentState::Building => "BUILDING",
            AgentState::Exploring => "EXPLORING",
            AgentState::Banking => "BANKING",
            AgentState::Marketing => "MARKETING",
        }
    }

    /// States that cost energy every fast tick
    pub fn is_exertive(&self) -> bool {
        matches!(
            self,
            AgentState::Gathering
                | AgentState::Combat
                | AgentState::Exploring
                | AgentState::Building
                | AgentState::Questing
        )
    }

    /// States during which awakening progress accrues
    pub fn is_contemplative(&self) -> bool {
        matches!(self, AgentState::Thinking | AgentState::Ascending)
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_uppercase();
        AgentState::ALL
            .iter()
            .copied()
            .find(|state| state.as_str() == label)
            .ok_or_else(|| format!("unknown agent state '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Faction {
    Player,
    Npc,
    /// World-owned entities; skipped by cognition
    System,
}

/// Health, energy and integrity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub hp: u32,
    pub max_hp: u32,
    pub energy: u32,
    pub max_energy: u32,
    /// Structural integrity (0.0 - 1.0)
    pub integrity: f32,
}

impl Vitals {
    pub fn new(max_hp: u32, max_energy: u32) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            energy: max_energy,
            max_energy,
            integrity: 1.0,
        }
    }

    /// energy / max_energy, 0.0 when the agent has no energy pool
    pub fn energy_ratio(&self) -> f32 {
        if self.max_energy == 0 {
            0.0
        } else {
            unit(self.energy as f32 / self.max_energy as f32)
        }
    }

    pub fn drain_energy(&mut self, amount: u32) {
        self.energy = self.energy.saturating_sub(amount);
    }

    pub fn restore_energy(&mut self, amount: u32) {
        self.energy = self.energy.saturating_add(amount).min(self.max_energy);
    }

    /// Pull every value back into its valid range
    pub fn clamp(&mut self) {
        self.hp = self.hp.min(self.max_hp);
        self.energy = self.energy.min(self.max_energy);
        self.integrity = unit(self.integrity);
    }
}

impl Default for Vitals {
    fn default() -> Self {
        Self::new(100, 100)
    }
}

/// Base attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(rename = "str")]
    pub strength: u32,
    #[serde(rename = "agi")]
    pub agility: u32,
    #[serde(rename = "int")]
    pub intellect: u32,
    #[serde(rename = "vit")]
    pub vitality: u32,
}

impl Default for Attributes {
    fn default() -> Self {
        Self { strength: 10, agility: 10, intellect: 10, vitality: 10 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progression {
    pub level: u32,
    pub xp: u64,
    pub gold: u32,
}

impl Default for Progression {
    fn default() -> Self {
        Self { level: 1, xp: 0, gold: 100 }
    }
}

/// Consciousness and the progress that feeds it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Awakening {
    /// 0.0 - 1.0, never decreases
    pub consciousness_level: f32,
    /// 0.0 - 100.0, resets on overflow
    pub awakening_progress: f32,
}

impl Awakening {
    /// Add progress; on reaching 100 reset it and bump consciousness
    ///
    /// Returns true when consciousness was raised.
    pub fn accrue(&mut self, amount: f32, increment: f32) -> bool {
        self.awakening_progress += amount.max(0.0);
        if self.awakening_progress >= 100.0 {
            self.awakening_progress = 0.0;
            self.consciousness_level = (self.consciousness_level + increment.max(0.0)).min(1.0);
            return true;
        }
        false
    }

    pub fn clamp(&mut self) {
        self.consciousness_level = unit(self.consciousness_level);
        self.awakening_progress = if self.awakening_progress.is_nan() {
            0.0
        } else {
            self.awakening_progress.clamp(0.0, 100.0)
        };
    }
}

impl Default for Awakening {
    fn default() -> Self {
        Self { consciousness_level: 0.1, awakening_progress: 0.0 }
    }
}

/// Personality profile
///
/// Unrecognized keys from stored or imported documents are kept in `extra`
/// so they survive a load/save cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThinkingMatrix {
    pub personality: String,
    pub current_long_term_goal: String,
    /// -1.0 (chaotic) to 1.0 (lawful)
    pub alignment: f32,
    pub language_preference: String,
    pub sociability: f32,
    pub aggression: f32,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for ThinkingMatrix {
    fn default() -> Self {
        Self {
            personality: "Neutral".into(),
            current_long_term_goal: "Survive".into(),
            alignment: 0.5,
            language_preference: "EN".into(),
            sociability: 0.5,
            aggression: 0.2,
            extra: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketRole {
    Hoarder,
    Producer,
    Consumer,
    Trader,
}

/// Economic desire profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomicDesires {
    pub target_gold: u32,
    pub preferred_resources: Vec<String>,
    pub greed_level: f32,
    pub risk_appetite: f32,
    pub frugality: f32,
    pub market_role: MarketRole,
    pub trade_frequency: f32,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for EconomicDesires {
    fn default() -> Self {
        Self {
            target_gold: 1000,
            preferred_resources: vec!["GOLD_ORE".into(), "SILVER_ORE".into()],
            greed_level: 0.3,
            risk_appetite: 0.2,
            frugality: 0.8,
            market_role: MarketRole::Hoarder,
            trade_frequency: 0.1,
            extra: serde_json::Map::new(),
        }
    }
}

/// Who produced a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    Gateway,
    Heuristic,
}

/// The most recent decision applied to an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub decision: AgentState,
    pub justification: String,
    pub source: DecisionSource,
    pub decided_at: DateTime<Utc>,
}

/// One entry of the emergent behavior log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergentRecord {
    pub action: String,
    pub reasoning: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub class_type: String,
    pub faction: Faction,
    pub position: Position,
    pub rotation_y: f32,
    pub state: AgentState,
    pub vitals: Vitals,
    pub attributes: Attributes,
    pub progression: Progression,
    pub awakening: Awakening,
    pub vision_range: f32,
    pub is_awakened: bool,
    pub lore_snippet: Option<String>,
    pub thinking_matrix: ThinkingMatrix,
    pub economic_desires: EconomicDesires,
    pub memory: MemoryLog,
    pub last_decision: Option<DecisionRecord>,
    /// Newest first, capped
    pub emergent_log: Vec<EmergentRecord>,
    pub imported_from: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Agent {
    /// An agent with default profiles, standing idle at `position`
    pub fn new(
        id: AgentId,
        name: impl Into<String>,
        faction: Faction,
        position: Position,
        memory_cap: usize,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            class_type: "Wanderer".into(),
            faction,
            position,
            rotation_y: 0.0,
            state: AgentState::Idle,
            vitals: Vitals::default(),
            attributes: Attributes::default(),
            progression: Progression::default(),
            awakening: Awakening::default(),
            vision_range: 20.0,
            is_awakened: false,
            lore_snippet: None,
            thinking_matrix: ThinkingMatrix::default(),
            economic_desires: EconomicDesires::default(),
            memory: MemoryLog::new(memory_cap),
            last_decision: None,
            emergent_log: Vec::new(),
            imported_from: None,
            created_at: Utc::now(),
        }
    }

    /// Record a memory, evicting the oldest past the cap
    pub fn remember(&mut self, entry: impl Into<String>) {
        self.memory.push(entry);
    }

    pub fn record_emergent(&mut self, record: EmergentRecord, cap: usize) {
        self.emergent_log.insert(0, record);
        self.emergent_log.truncate(cap.max(1));
    }

    /// Clamp every bounded attribute back into range
    pub fn sanitize(&mut self) {
        self.vitals.clamp();
        self.awakening.clamp();
        self.thinking_matrix.sociability = unit(self.thinking_matrix.sociability);
        self.thinking_matrix.aggression = unit(self.thinking_matrix.aggression);
        self.position.y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> Agent {
        Agent::new(AgentId::new("a"), "Tester", Faction::Player, Position::default(), 20)
    }

    #[test]
    fn test_state_serializes_as_screaming_label() {
        let json = serde_json::to_string(&AgentState::Banking).unwrap();
        assert_eq!(json, "\"BANKING\"");
        let state: AgentState = serde_json::from_str("\"ASCENDING\"").unwrap();
        assert_eq!(state, AgentState::Ascending);
    }

    #[test]
    fn test_unknown_state_label_fails_to_parse() {
        assert!(serde_json::from_str::<AgentState>("\"DANCING\"").is_err());
        assert!("dancing".parse::<AgentState>().is_err());
        assert_eq!(" thinking ".parse::<AgentState>(), Ok(AgentState::Thinking));
    }

    #[test]
    fn test_awakening_overflow_bumps_consciousness() {
        let mut awakening = Awakening { consciousness_level: 0.1, awakening_progress: 95.0 };
        assert!(!awakening.accrue(2.0, 0.05));
        assert!(awakening.accrue(10.0, 0.05));
        assert_eq!(awakening.awakening_progress, 0.0);
        assert!((awakening.consciousness_level - 0.15).abs() < 0.0001);
    }

    #[test]
    fn test_consciousness_caps_at_one() {
        let mut awakening = Awakening { consciousness_level: 0.98, awakening_progress: 99.0 };
        awakening.accrue(5.0, 0.05);
        assert_eq!(awakening.consciousness_level, 1.0);
    }

    #[test]
    fn test_vitals_clamp() {
        let mut vitals = Vitals { hp: 150, max_hp: 100, energy: 300, max_energy: 100, integrity: 1.4 };
        vitals.clamp();
        assert_eq!(vitals.hp, 100);
        assert_eq!(vitals.energy, 100);
        assert_eq!(vitals.integrity, 1.0);
    }

    #[test]
    fn test_energy_ratio_with_empty_pool() {
        let vitals = Vitals::new(100, 0);
        assert_eq!(vitals.energy_ratio(), 0.0);
    }

    #[test]
    fn test_emergent_log_is_newest_first_and_capped() {
        let mut a = agent();
        for i in 0..5 {
            a.record_emergent(
                EmergentRecord {
                    action: format!("act {}", i),
                    reasoning: String::new(),
                    recorded_at: Utc::now(),
                },
                3,
            );
        }
        assert_eq!(a.emergent_log.len(), 3);
        assert_eq!(a.emergent_log[0].action, "act 4");
        assert_eq!(a.emergent_log[2].action, "act 2");
    }

    #[test]
    fn test_thinking_matrix_keeps_unknown_keys() {
        let json = r#"{"personality": "Wise", "sociability": 0.8, "favorite_color": "teal"}"#;
        let matrix: ThinkingMatrix = serde_json::from_str(json).unwrap();
        assert_eq!(matrix.personality, "Wise");
        assert_eq!(matrix.aggression, 0.2);
        assert_eq!(matrix.extra.get("favorite_color").and_then(|v| v.as_str()), Some("teal"));

        let round = serde_json::to_value(&matrix).unwrap();
        assert_eq!(round["favorite_color"], "teal");
    }
}
