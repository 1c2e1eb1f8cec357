pub mod agent;
pub mod memory;
pub mod monster;

pub use agent::{
    Agent, AgentState, Awakening, DecisionRecord, DecisionSource, EconomicDesires, Faction,
    ThinkingMatrix, Vitals,
};
pub use memory::MemoryLog;
pub use monster::{Monster, MonsterKind, MonsterState};
