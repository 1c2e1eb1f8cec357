//! The persisted world document and its bootstrap

use ahash::AHashSet;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::EngineConfig;
use crate::core::types::{unit, AgentId, Position, Tick};
use crate::entity::agent::{
    Agent, Attributes, Awakening, EconomicDesires, Faction, MarketRole, Progression, ThinkingMatrix,
    Vitals,
};
use crate::entity::memory::MemoryLog;
use crate::entity::monster::{Monster, MonsterKind};
use crate::simulation::erosion::pin_sanctuary;
use crate::spatial::grid::{CellType, WorldGrid};
use crate::world::events::{EventCategory, EventLog, EventLogEntry};
use crate::world::poi::{central_pois, generate_pois, PointOfInterest};

/// Key of the singleton world document
pub const WORLD_ID: &str = "main_world";

/// Aggregate world health, recomputed every stability pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldMetrics {
    /// Mean cell stability (0.0 - 1.0)
    pub stability_index: f32,
    /// Mean cell corruption (0.0 - 1.0)
    pub threat_level: f32,
}

impl Default for WorldMetrics {
    fn default() -> Self {
        Self { stability_index: 1.0, threat_level: 0.05 }
    }
}

impl WorldMetrics {
    pub fn from_grid(grid: &WorldGrid) -> Self {
        let (stability_index, threat_level) = grid.averages();
        Self { stability_index, threat_level }
    }
}

/// Everything the clock reads and writes in one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub id: String,
    pub agents: Vec<Agent>,
    pub monsters: Vec<Monster>,
    pub pois: Vec<PointOfInterest>,
    pub grid: WorldGrid,
    pub events: EventLog,
    pub metrics: WorldMetrics,
    pub uptime_secs: f64,
    pub tick: Tick,
    pub created_at: DateTime<Utc>,
    pub last_tick: Option<DateTime<Utc>>,
}

impl WorldSnapshot {
    /// An empty world over a freshly created grid
    pub fn empty(config: &EngineConfig, now: DateTime<Utc>) -> Self {
        let grid = WorldGrid::new(config);
        let metrics = WorldMetrics::from_grid(&grid);
        Self {
            id: WORLD_ID.to_string(),
            agents: Vec::new(),
            monsters: Vec::new(),
            pois: Vec::new(),
            grid,
            events: EventLog::new(),
            metrics,
            uptime_secs: 0.0,
            tick: 0,
            created_at: now,
            last_tick: None,
        }
    }

    /// The initial world: full grid, founding agents, landmarks, a few
    /// wandering monsters
    pub fn bootstrap<R: Rng>(config: &EngineConfig, rng: &mut R, now: DateTime<Utc>) -> Self {
        let mut world = Self::empty(config, now);
        world.agents = founding_agents(config, now);
        world.monsters = vec![
            Monster::from_template(MonsterKind::Slime, Position::new(25.0, 25.0), now),
            Monster::from_template(MonsterKind::Goblin, Position::new(-30.0, 40.0), now),
        ];
        world.pois = central_pois();
        world.pois.extend(generate_pois(config.procedural_poi_count, rng));
        world.events.append(EventLogEntry::system(
            EventCategory::System,
            "World initialized. Logic must persist.",
            now,
        ));
        world
    }

    pub fn agent(&self, id: &AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| &a.id == id)
    }

    pub fn agent_mut(&mut self, id: &AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| &a.id == id)
    }

    pub fn living_monsters(&self) -> impl Iterator<Item = &Monster> {
        self.monsters.iter().filter(|m| m.is_alive())
    }

    /// Drop the oldest corruption spawns beyond `cap`
    ///
    /// Bootstrap monsters are never pruned. Returns how many were removed.
    pub fn prune_corruption_spawns(&mut self, cap: usize) -> usize {
        let spawned = self.monsters.iter().filter(|m| m.corruption_spawned).count();
        let mut excess = spawned.saturating_sub(cap);
        let pruned = excess;
        // Monsters are appended as they spawn, so the front holds the oldest
        self.monsters.retain(|m| {
            if excess > 0 && m.corruption_spawned {
                excess -= 1;
                return false;
            }
            true
        });
        pruned
    }

    /// Clamp every bounded value back into range
    ///
    /// Stored documents may have been edited by hand or written by an older
    /// build. Duplicate agent ids keep their first entry.
    pub fn sanitize(&mut self, config: &EngineConfig) {
        let mut seen = AHashSet::with_capacity(self.agents.len());
        self.agents.retain(|agent| seen.insert(agent.id.clone()));

        for agent in &mut self.agents {
            agent.sanitize();
            agent.memory.enforce_cap(config.memory_cap);
            agent.emergent_log.truncate(config.emergent_log_cap);
        }
        for cell in self.grid.cells_mut() {
            if cell.cell_type == CellType::Sanctuary {
                pin_sanctuary(cell);
                continue;
            }
            cell.stability_index = unit(cell.stability_index);
            cell.corruption_level = unit(cell.corruption_level);
        }
        self.metrics.stability_index = unit(self.metrics.stability_index);
        self.metrics.threat_level = unit(self.metrics.threat_level);
    }
}

fn founding_agents(config: &EngineConfig, now: DateTime<Utc>) -> Vec<Agent> {
    let mut aurelius = Agent::new(
        AgentId::new("aurelius_001"),
        "Aurelius",
        Faction::Player,
        Position::new(0.0, 0.0),
        config.memory_cap,
    );
    aurelius.class_type = "Scribe".into();
    aurelius.is_awakened = true;
    aurelius.lore_snippet = Some("A scribe of the old order".into());
    aurelius.memory = MemoryLog::with_entries(
        config.memory_cap,
        ["Awakened in the Matrix", "The axioms guide me"],
    );
    aurelius.attributes = Attributes { intellect: 15, ..Attributes::default() };
    aurelius.thinking_matrix = ThinkingMatrix {
        personality: "Wise".into(),
        current_long_term_goal: "Archive the Axioms".into(),
        language_preference: "DE".into(),
        sociability: 0.8,
        aggression: 0.1,
        ..ThinkingMatrix::default()
    };
    aurelius.created_at = now;

    let mut vulcan = Agent::new(
        AgentId::new("vulcan_002"),
        "Vulcan",
        Faction::Npc,
        Position::new(-5.0, 5.0),
        config.memory_cap,
    );
    vulcan.class_type = "Blacksmith".into();
    vulcan.vision_range = 15.0;
    vulcan.lore_snippet = Some("Master of the flames".into());
    vulcan.memory = MemoryLog::with_entries(config.memory_cap, ["The forge is my realm"]);
    vulcan.vitals = Vitals::new(150, 100);
    vulcan.attributes = Attributes { strength: 15, agility: 8, intellect: 5, vitality: 15 };
    vulcan.progression = Progression { level: 3, xp: 0, gold: 50 };
    vulcan.awakening = Awakening { consciousness_level: 0.05, awakening_progress: 0.0 };
    vulcan.thinking_matrix = ThinkingMatrix {
        personality: "Gruff".into(),
        current_long_term_goal: "Forge Perfection".into(),
        alignment: 0.1,
        sociability: 0.4,
        aggression: 0.4,
        ..ThinkingMatrix::default()
    };
    vulcan.economic_desires = EconomicDesires {
        target_gold: 5000,
        preferred_resources: vec!["IRON_ORE".into(), "GOLD_ORE".into()],
        greed_level: 0.7,
        risk_appetite: 0.5,
        frugality: 0.4,
        market_role: MarketRole::Producer,
        trade_frequency: 0.6,
        ..EconomicDesires::default()
    };
    vulcan.created_at = now;

    vec![aurelius, vulcan]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_bootstrap_world_contents() {
        let config = EngineConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let world = WorldSnapshot::bootstrap(&config, &mut rng, Utc::now());

        assert_eq!(world.id, WORLD_ID);
        assert_eq!(world.agents.len(), 2);
        assert_eq!(world.monsters.len(), 2);
        assert_eq!(world.pois.len(), 2 + config.procedural_poi_count);
        assert_eq!(world.grid.len(), 35 * 35);
        assert_eq!(world.grid.get(0, 0).unwrap().cell_type, CellType::Sanctuary);
        assert!(world.monsters.iter().all(|m| !m.corruption_spawned));
        assert_eq!(world.events.len(), 1);
    }

    #[test]
    fn test_agent_lookup() {
        let config = EngineConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut world = WorldSnapshot::bootstrap(&config, &mut rng, Utc::now());

        let id = AgentId::new("vulcan_002");
        assert_eq!(world.agent(&id).unwrap().name, "Vulcan");
        world.agent_mut(&id).unwrap().progression.gold = 900;
        assert_eq!(world.agent(&id).unwrap().progression.gold, 900);
        assert!(world.agent(&AgentId::new("nobody")).is_none());
    }

    #[test]
    fn test_sanitize_clamps_out_of_range_values() {
        let config = EngineConfig::default();
        let mut world = WorldSnapshot::empty(&config, Utc::now());
        let mut agent = Agent::new(AgentId::new("x"), "X", Faction::Npc, Position::default(), 50);
        agent.vitals.energy = 500;
        for i in 0..30 {
            agent.remember(format!("m{}", i));
        }
        world.agents.push(agent);
        world.agents.push(Agent::new(AgentId::new("x"), "Twin", Faction::Npc, Position::default(), 20));
        world.grid.get_mut(4, 4).unwrap().corruption_level = 3.0;

        world.sanitize(&config);

        assert_eq!(world.agents.len(), 1);
        assert_eq!(world.agents[0].name, "X");
        assert_eq!(world.agents[0].vitals.energy, 100);
        assert_eq!(world.agents[0].memory.len(), config.memory_cap);
        assert_eq!(world.grid.get(4, 4).unwrap().corruption_level, 1.0);
    }

    #[test]
    fn test_sanitize_repins_edited_sanctuary() {
        let config = EngineConfig::default();
        let mut world = WorldSnapshot::empty(&config, Utc::now());
        let origin = world.grid.get_mut(0, 0).unwrap();
        origin.stability_index = 0.4;
        origin.corruption_level = 0.6;

        world.sanitize(&config);

        let origin = world.grid.get(0, 0).unwrap();
        assert_eq!(origin.stability_index, 1.0);
        assert_eq!(origin.corruption_level, 0.0);
    }

    #[test]
    fn test_prune_keeps_newest_spawns_and_bootstrap_monsters() {
        let config = EngineConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let now = Utc::now();
        let mut world = WorldSnapshot::bootstrap(&config, &mut rng, now);
        for i in 0..5 {
            let mut spawn = Monster::from_template(MonsterKind::CorruptionSpawn, Position::new(i as f32, 0.0), now);
            spawn.name = format!("spawn {}", i);
            world.monsters.push(spawn);
        }

        assert_eq!(world.prune_corruption_spawns(10), 0);
        assert_eq!(world.prune_corruption_spawns(2), 3);

        assert_eq!(world.monsters.len(), 4);
        assert_eq!(world.monsters.iter().filter(|m| !m.corruption_spawned).count(), 2);
        let names: Vec<&str> = world
            .monsters
            .iter()
            .filter(|m| m.corruption_spawned)
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["spawn 3", "spawn 4"]);
    }
}
