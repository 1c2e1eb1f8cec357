//! Import characters from external JSON character cards
//!
//! Cards come from third-party tools with no shared schema, so the only hard
//! requirement is that the input parses as JSON. Every recognized field is
//! optional and falls back to a safe default when missing or of the wrong
//! type.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::Value;

use crate::core::error::{AxiomError, Result};
use crate::core::types::{unit, AgentId, Position};
use crate::entity::agent::{
    Agent, Attributes, EconomicDesires, Faction, MarketRole, Progression, ThinkingMatrix,
};
use crate::entity::memory::MemoryLog;

/// Max characters of the description copied into memory
const DESCRIPTION_MEMORY_CHARS: usize = 100;

/// Spawn area half-width around the origin
const IMPORT_SPAWN_SPREAD: f32 = 10.0;

/// Build a new agent from a character card
pub fn import_character<R: Rng>(
    json: &str,
    source: &str,
    memory_cap: usize,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<Agent> {
    let card: Value =
        serde_json::from_str(json).map_err(|e| AxiomError::InvalidImport(e.to_string()))?;

    let name = str_field(&card, &["name"]).unwrap_or("Unknown Import");
    let description = str_field(&card, &["description"]).unwrap_or("");
    let personality = card.get("personality");
    let stats = card.get("stats");

    let position = Position::new(
        rng.gen_range(-IMPORT_SPAWN_SPREAD..=IMPORT_SPAWN_SPREAD),
        rng.gen_range(-IMPORT_SPAWN_SPREAD..=IMPORT_SPAWN_SPREAD),
    );

    let mut agent = Agent::new(
        AgentId::generate("imported"),
        name,
        Faction::Player,
        position,
        memory_cap,
    );
    agent.class_type = str_field(&card, &["class"]).unwrap_or("Wanderer").to_string();
    agent.progression = Progression { level: 1, xp: 0, gold: 50 };
    agent.lore_snippet = Some(if description.is_empty() {
        "A consciousness from another realm".to_string()
    } else {
        description.to_string()
    });

    let excerpt: String = description.chars().take(DESCRIPTION_MEMORY_CHARS).collect();
    agent.memory = MemoryLog::with_entries(
        memory_cap,
        [format!("Imported from {}", source), excerpt],
    );

    agent.thinking_matrix = ThinkingMatrix {
        personality: personality
            .and_then(|p| str_field(p, &["primary"]))
            .unwrap_or("Imported")
            .to_string(),
        current_long_term_goal: "Understand this new world".into(),
        sociability: personality
            .and_then(|p| f32_field(p, "sociability"))
            .map(unit)
            .unwrap_or(0.5),
        aggression: personality
            .and_then(|p| f32_field(p, "aggression"))
            .map(unit)
            .unwrap_or(0.2),
        ..ThinkingMatrix::default()
    };

    agent.economic_desires = EconomicDesires {
        preferred_resources: vec!["GOLD_ORE".into()],
        risk_appetite: 0.3,
        frugality: 0.5,
        market_role: MarketRole::Consumer,
        trade_frequency: 0.3,
        ..EconomicDesires::default()
    };

    let defaults = Attributes::default();
    agent.attributes = Attributes {
        strength: stats.and_then(|s| u32_field(s, "str")).unwrap_or(defaults.strength),
        agility: stats.and_then(|s| u32_field(s, "agi")).unwrap_or(defaults.agility),
        intellect: stats.and_then(|s| u32_field(s, "int")).unwrap_or(defaults.intellect),
        vitality: stats.and_then(|s| u32_field(s, "vit")).unwrap_or(defaults.vitality),
    };

    agent.imported_from = Some(source.to_string());
    agent.created_at = now;
    Ok(agent)
}

fn str_field<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    path.iter()
        .try_fold(value, |v, key| v.get(key))
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

fn f32_field(value: &Value, key: &str) -> Option<f32> {
    value.get(key).and_then(Value::as_f64).map(|v| v as f32)
}

fn u32_field(value: &Value, key: &str) -> Option<u32> {
    value
        .get(key)
        .and_then(Value::as_u64)
        .map(|v| v.min(u32::MAX as u64) as u32)
}
