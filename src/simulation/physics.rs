//! Fast-tick physics: movement, vitality drift, awakening and discovery
//!
//! Physics reads the agent's state label and nothing else; the decision
//! that set the label is irrelevant here.

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::debug;

use crate::core::config::EngineConfig;
use crate::core::types::Position;
use crate::entity::agent::{Agent, AgentState};
use crate::world::events::{EventCategory, EventLogEntry};
use crate::world::poi::{nearest_resource, PointOfInterest};
use crate::world::snapshot::WorldSnapshot;

/// Result of one physics step
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PhysicsReport {
    pub moved: usize,
    pub awakenings: usize,
    pub discoveries: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Physics {
    pub move_speed: f32,
    pub gather_speed_factor: f32,
    pub gather_arrival_distance: f32,
    pub awakening_rate: f32,
    pub consciousness_increment: f32,
    pub energy_drain: u32,
    pub energy_regen: u32,
    /// Agents are kept inside +-extent on both axes
    pub extent: f32,
}

impl Physics {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            move_speed: config.move_speed,
            gather_speed_factor: config.gather_speed_factor,
            gather_arrival_distance: config.gather_arrival_distance,
            awakening_rate: config.awakening_rate,
            consciousness_increment: config.consciousness_increment,
            energy_drain: config.energy_drain,
            energy_regen: config.energy_regen,
            extent: (config.grid_radius as f32 + 0.5) * config.cell_size,
        }
    }

    /// Advance the world by `dt` seconds
    pub fn step<R: Rng>(
        &self,
        world: &mut WorldSnapshot,
        dt: f32,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> PhysicsReport {
        let mut report = PhysicsReport::default();
        let pois = &world.pois;

        for agent in world.agents.iter_mut() {
            if self.move_agent(agent, pois, dt, rng) {
                report.moved += 1;
            }
            self.drift_vitals(agent);
            if self.accrue_awakening(agent, dt) {
                report.awakenings += 1;
            }
        }

        let discoveries = discover_pois(&mut world.pois, &world.agents, now);
        report.discoveries = discoveries.len();
        for event in discoveries {
            world.events.append(event);
        }

        world.uptime_secs += dt as f64;
        world.tick += 1;
        report
    }

    /// Returns true when the agent's position changed
    fn move_agent<R: Rng>(
        &self,
        agent: &mut Agent,
        pois: &[PointOfInterest],
        dt: f32,
        rng: &mut R,
    ) -> bool {
        let before = agent.position;
        match agent.state {
            AgentState::Exploring => {
                let dx = (rng.gen::<f32>() - 0.5) * self.move_speed * dt;
                let dz = (rng.gen::<f32>() - 0.5) * self.move_speed * dt;
                agent.position = agent.position + Position::new(dx, dz);
            }
            AgentState::Gathering => {
                if let Some(target) = nearest_resource(pois, &agent.position) {
                    if agent.position.distance(&target.position) > self.gather_arrival_distance {
                        let step = self.move_speed * self.gather_speed_factor * dt;
                        agent.position = agent.position.step_toward(&target.position, step);
                    }
                }
            }
            _ => {}
        }

        agent.position.x = agent.position.x.clamp(-self.extent, self.extent);
        agent.position.z = agent.position.z.clamp(-self.extent, self.extent);
        agent.position.y = 0.0;

        let (dx, dz) = (agent.position.x - before.x, agent.position.z - before.z);
        if dx != 0.0 || dz != 0.0 {
            agent.rotation_y = dx.atan2(dz);
            true
        } else {
            false
        }
    }

    fn drift_vitals(&self, agent: &mut Agent) {
        if agent.state.is_exertive() {
            agent.vitals.drain_energy(self.energy_drain);
        } else if agent.state == AgentState::Idle {
            agent.vitals.restore_energy(self.energy_regen);
        }
        agent.vitals.clamp();
    }

    /// Returns true when consciousness rose
    fn accrue_awakening(&self, agent: &mut Agent, dt: f32) -> bool {
        if !agent.state.is_contemplative() {
            return false;
        }
        let raised = agent
            .awakening
            .accrue(self.awakening_rate * dt, self.consciousness_increment);
        if raised {
            debug!(
                agent = %agent.id,
                consciousness = agent.awakening.consciousness_level,
                "Consciousness expanded"
            );
        }
        raised
    }
}

/// Mark POIs within discovery range of any agent as discovered
fn discover_pois(
    pois: &mut [PointOfInterest],
    agents: &[Agent],
    now: DateTime<Utc>,
) -> Vec<EventLogEntry> {
    let mut events = Vec::new();
    for poi in pois.iter_mut().filter(|p| !p.is_discovered) {
        let Some(finder) = agents
            .iter()
            .find(|a| a.position.distance(&poi.position) <= poi.discovery_radius)
        else {
            continue;
        };

        poi.is_discovered = true;
        let mut content = format!(
            "{} discovered a {} at [{:.0}, {:.0}]",
            finder.name,
            poi.kind.label(),
            poi.position.x,
            poi.position.z
        );
        if let Some(lore) = &poi.lore_fragment {
            content.push_str(": ");
            content.push_str(lore);
        }
        events.push(EventLogEntry::system(EventCategory::System, content, now));
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::AgentId;
    use crate::entity::agent::Faction;
    use crate::world::poi::PoiKind;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn world_with(agent_state: AgentState, at: Position) -> WorldSnapshot {
        let config = EngineConfig::default();
        let mut world = WorldSnapshot::empty(&config, Utc::now());
        let mut agent = Agent::new(AgentId::new("a"), "Walker", Faction::Npc, at, 20);
        agent.state = agent_state;
        world.agents.push(agent);
        world
    }

    fn poi(kind: PoiKind, x: f32, z: f32) -> PointOfInterest {
        PointOfInterest {
            id: format!("poi_{}_{}", x, z),
            kind,
            position: Position::new(x, z),
            is_discovered: false,
            discovery_radius: 10.0,
            reward_insight: 5,
            threat_level: 0.0,
            lore_fragment: None,
        }
    }

    #[test]
    fn test_exploring_drift_is_bounded() {
        let physics = Physics::new(&EngineConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut world = world_with(AgentState::Exploring, Position::new(0.0, 0.0));

        physics.step(&mut world, 2.0, Utc::now(), &mut rng);
        let p = world.agents[0].position;
        // (rand - 0.5) * 6 * 2 is within +-6 per axis
        assert!(p.x.abs() <= 6.0 && p.z.abs() <= 6.0);
        assert_eq!(world.agents[0].vitals.energy, 99);
    }

    #[test]
    fn test_gathering_homes_toward_resource() {
        let physics = Physics::new(&EngineConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut world = world_with(AgentState::Gathering, Position::new(0.0, 0.0));
        world.pois = vec![poi(PoiKind::Shrine, 5.0, 0.0), poi(PoiKind::Mine, 100.0, 0.0)];

        physics.step(&mut world, 2.0, Utc::now(), &mut rng);
        let p = world.agents[0].position;
        // 6 * 0.5 * 2 = 6 units toward the mine
        assert!((p.x - 6.0).abs() < 1e-4);
        assert!(p.z.abs() < 1e-4);
    }

    #[test]
    fn test_gathering_stops_near_resource() {
        let physics = Physics::new(&EngineConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut world = world_with(AgentState::Gathering, Position::new(99.0, 0.0));
        world.pois = vec![poi(PoiKind::Forest, 100.0, 0.0)];

        let report = physics.step(&mut world, 2.0, Utc::now(), &mut rng);
        assert_eq!(report.moved, 0);
        assert_eq!(world.agents[0].position.x, 99.0);
    }

    #[test]
    fn test_thinking_agent_awakens() {
        let physics = Physics::new(&EngineConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut world = world_with(AgentState::Thinking, Position::new(50.0, 50.0));
        world.agents[0].awakening.awakening_progress = 95.0;

        let report = physics.step(&mut world, 2.0, Utc::now(), &mut rng);
        let awakening = world.agents[0].awakening;
        assert_eq!(report.awakenings, 1);
        assert_eq!(awakening.awakening_progress, 0.0);
        assert!((awakening.consciousness_level - 0.15).abs() < 1e-5);
        assert_eq!(world.agents[0].position, Position::new(50.0, 50.0));
    }

    #[test]
    fn test_idle_regenerates_energy_up_to_max() {
        let physics = Physics::new(&EngineConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut world = world_with(AgentState::Idle, Position::default());
        world.agents[0].vitals.energy = 99;

        physics.step(&mut world, 2.0, Utc::now(), &mut rng);
        assert_eq!(world.agents[0].vitals.energy, 100);
    }

    #[test]
    fn test_discovery_logs_once() {
        let physics = Physics::new(&EngineConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut world = world_with(AgentState::Idle, Position::new(0.0, 0.0));
        let mut ruin = poi(PoiKind::Ruin, 3.0, 4.0);
        ruin.lore_fragment = Some("Old words".into());
        world.pois = vec![ruin, poi(PoiKind::Nest, 200.0, 0.0)];

        let first = physics.step(&mut world, 2.0, Utc::now(), &mut rng);
        let second = physics.step(&mut world, 2.0, Utc::now(), &mut rng);

        assert_eq!(first.discoveries, 1);
        assert_eq!(second.discoveries, 0);
        assert!(world.pois[0].is_discovered);
        assert!(!world.pois[1].is_discovered);
        let event = world.events.recent(1).next().unwrap();
        assert_eq!(event.category(), EventCategory::System);
        assert!(event.content().contains("Walker discovered a Ruin"));
        assert!(event.content().contains("Old words"));
    }

    #[test]
    fn test_uptime_and_tick_advance() {
        let physics = Physics::new(&EngineConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut world = world_with(AgentState::Idle, Position::default());
        for _ in 0..3 {
            physics.step(&mut world, 2.0, Utc::now(), &mut rng);
        }
        assert_eq!(world.tick, 3);
        assert!((world.uptime_secs - 6.0).abs() < 1e-9);
    }
}
