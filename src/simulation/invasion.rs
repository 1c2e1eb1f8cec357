//! Corruption invasions near the safe zone
//!
//! A cell close to the origin whose corruption has crossed the threshold
//! breaches: one corruption spawn appears near the cell center and the
//! breach is written to the event log. Each cell then waits out a cooldown
//! before it can breach again.

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::info;

use crate::core::config::EngineConfig;
use crate::core::types::{AgentId, Position};
use crate::entity::agent::Agent;
use crate::entity::monster::{Monster, MonsterKind, MonsterState};
use crate::spatial::grid::GridCell;
use crate::world::events::{EventCategory, EventLogEntry};

/// What a single invasion check produced
#[derive(Debug, Default)]
pub struct InvasionReport {
    pub monsters: Vec<Monster>,
    pub events: Vec<EventLogEntry>,
}

impl InvasionReport {
    pub fn is_empty(&self) -> bool {
        self.monsters.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InvasionSpawner {
    pub threshold: f32,
    pub radius: i32,
    pub cooldown: chrono::Duration,
    pub stability_impact: f32,
    pub jitter: f32,
    pub cell_size: f32,
    pub target_radius: f32,
}

impl InvasionSpawner {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            threshold: config.invasion_threshold,
            radius: config.invasion_radius,
            cooldown: config.invasion_cooldown(),
            stability_impact: config.invasion_stability_impact,
            jitter: if config.spawn_jitter.is_finite() { config.spawn_jitter.abs() } else { 0.0 },
            cell_size: config.cell_size,
            target_radius: config.spawn_target_radius,
        }
    }

    /// Whether `cell` breaches at `now`
    pub fn is_triggered(&self, cell: &GridCell, now: DateTime<Utc>) -> bool {
        if cell.corruption() <= self.threshold || cell.ring() > self.radius {
            return false;
        }
        match cell.last_invasion {
            None => true,
            Some(last) => now - last > self.cooldown,
        }
    }

    /// Check every cell, spawning where a breach triggers
    ///
    /// Triggered cells get `last_invasion = now`.
    pub fn check<R: Rng>(
        &self,
        cells: &mut [GridCell],
        agents: &[Agent],
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> InvasionReport {
        let mut report = InvasionReport::default();

        for cell in cells.iter_mut() {
            if !self.is_triggered(cell, now) {
                continue;
            }

            let center = cell.center(self.cell_size);
            let position = Position::new(center.x + self.offset(rng), center.z + self.offset(rng));

            let mut monster = Monster::from_template(MonsterKind::CorruptionSpawn, position, now);
            monster.target = nearest_agent(agents, &position, self.target_radius);
            if monster.target.is_some() {
                monster.state = MonsterState::Hunting;
            }

            cell.last_invasion = Some(now);

            info!(
                x = cell.x,
                z = cell.z,
                corruption = cell.corruption(),
                target = ?monster.target,
                "Corruption breach spawned a monster"
            );

            report.events.push(
                EventLogEntry::system(
                    EventCategory::Invasion,
                    format!(
                        "Corruption breach at sector [{}, {}]: {} emerged near the sanctuary",
                        cell.x, cell.z, monster.name
                    ),
                    now,
                )
                .with_stability_impact(self.stability_impact),
            );
            report.monsters.push(monster);
        }

        report
    }
}

impl InvasionSpawner {
    fn offset<R: Rng>(&self, rng: &mut R) -> f32 {
        if self.jitter > 0.0 {
            rng.gen_range(-self.jitter..=self.jitter)
        } else {
            0.0
        }
    }
}

fn nearest_agent(
    agents: &[Agent],
    from: &Position,
    max_distance: f32,
) -> Option<AgentId> {
    agents
        .iter()
        .map(|a| (a, a.position.distance(from)))
        .filter(|(_, d)| *d <= max_distance)
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(a, _)| a.id.clone())
}
