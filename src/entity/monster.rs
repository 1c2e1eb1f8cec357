//! Hostile entities and their templates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, MonsterId, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MonsterKind {
    Slime,
    Goblin,
    Orc,
    Dragon,
    /// Materialized by a corruption breach near the safe zone
    CorruptionSpawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MonsterState {
    Idle,
    Hunting,
    /// Defeated; kept for the record rather than removed
    Dead,
}

/// Base stats for a monster kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonsterTemplate {
    pub name: &'static str,
    pub hp: u32,
    pub atk: u32,
    pub defense: u32,
    pub xp_reward: u32,
    pub color: &'static str,
    pub scale: f32,
}

impl MonsterKind {
    pub fn template(&self) -> MonsterTemplate {
        match self {
            MonsterKind::Slime => MonsterTemplate {
                name: "Void Slime",
                hp: 30,
                atk: 3,
                defense: 1,
                xp_reward: 15,
                color: "#22c55e",
                scale: 0.5,
            },
            MonsterKind::Goblin => MonsterTemplate {
                name: "Scavenger Goblin",
                hp: 60,
                atk: 8,
                defense: 3,
                xp_reward: 40,
                color: "#84cc16",
                scale: 0.8,
            },
            MonsterKind::Orc => MonsterTemplate {
                name: "Axiom Orc",
                hp: 150,
                atk: 18,
                defense: 10,
                xp_reward: 120,
                color: "#166534",
                scale: 1.3,
            },
            MonsterKind::Dragon => MonsterTemplate {
                name: "Data Drake",
                hp: 800,
                atk: 55,
                defense: 40,
                xp_reward: 1500,
                color: "#ef4444",
                scale: 3.5,
            },
            MonsterKind::CorruptionSpawn => MonsterTemplate {
                name: "Corruption Spawn",
                hp: 80,
                atk: 12,
                defense: 5,
                xp_reward: 60,
                color: "#7c3aed",
                scale: 1.0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub id: MonsterId,
    pub kind: MonsterKind,
    pub name: String,
    pub position: Position,
    pub hp: u32,
    pub max_hp: u32,
    pub atk: u32,
    pub defense: u32,
    pub xp_reward: u32,
    pub state: MonsterState,
    pub color: String,
    pub scale: f32,
    /// True when spawned by a corruption breach rather than at bootstrap
    pub corruption_spawned: bool,
    pub target: Option<AgentId>,
    pub spawned_at: DateTime<Utc>,
}

impl Monster {
    pub fn from_template(kind: MonsterKind, position: Position, now: DateTime<Utc>) -> Self {
        let template = kind.template();
        Self {
            id: MonsterId::new(),
            kind,
            name: template.name.to_string(),
            position,
            hp: template.hp,
            max_hp: template.hp,
            atk: template.atk,
            defense: template.defense,
            xp_reward: template.xp_reward,
            state: MonsterState::Idle,
            color: template.color.to_string(),
            scale: template.scale,
            corruption_spawned: kind == MonsterKind::CorruptionSpawn,
            target: None,
            spawned_at: now,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.state != MonsterState::Dead
    }
}
