//! The simulation clock
//!
//! One loop drives three cadences off the fast tick:
//! - every tick: physics
//! - every cognition interval: a decision for each agent
//! - every stability interval: grid erosion, invasions, world metrics
//!
//! Errors inside a tick are logged and the loop carries on; the world is
//! retried on the next tick.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rand_chacha::ChaCha8Rng;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::context::EngineContext;
use crate::core::error::Result;
use crate::core::types::Tick;
use crate::entity::agent::DecisionSource;
use crate::simulation::cognition::apply_decision;
use crate::simulation::erosion::GridSimulator;
use crate::simulation::invasion::InvasionSpawner;
use crate::simulation::physics::Physics;
use crate::world::snapshot::{WorldMetrics, WorldSnapshot};

/// What one tick did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: Tick,
    pub agents_moved: usize,
    pub awakenings: usize,
    pub discoveries: usize,
    pub cognition_ran: bool,
    pub decisions: usize,
    pub gateway_fallbacks: usize,
    pub stability_ran: bool,
    pub cells_advanced: usize,
    pub monsters_spawned: usize,
    pub monsters_pruned: usize,
    pub duration: Duration,
}

/// A periodic phase keyed off wall-clock time
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    interval: chrono::Duration,
    last_run: Option<DateTime<Utc>>,
}

impl Cadence {
    pub fn new(interval_secs: f32) -> Self {
        Self {
            interval: chrono::Duration::milliseconds((interval_secs.max(0.0) * 1000.0) as i64),
            last_run: None,
        }
    }

    /// Never-run phases are due immediately
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_run {
            None => true,
            Some(last) => now - last >= self.interval,
        }
    }

    pub fn mark(&mut self, now: DateTime<Utc>) {
        self.last_run = Some(now);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Running,
    Paused,
    Stopped,
}

/// Remote control for a running clock
#[derive(Debug, Clone)]
pub struct ClockHandle {
    tx: Arc<watch::Sender<ClockState>>,
}

impl ClockHandle {
    fn new() -> (Self, watch::Receiver<ClockState>) {
        let (tx, rx) = watch::channel(ClockState::Running);
        (Self { tx: Arc::new(tx) }, rx)
    }

    pub fn pause(&self) {
        self.set(ClockState::Paused);
    }

    pub fn resume(&self) {
        self.set(ClockState::Running);
    }

    /// The in-flight tick finishes, then the loop exits
    pub fn stop(&self) {
        self.set(ClockState::Stopped);
    }

    pub fn state(&self) -> ClockState {
        *self.tx.borrow()
    }

    fn set(&self, state: ClockState) {
        self.tx.send_if_modified(|current| {
            // Stopped is final
            if *current == state || *current == ClockState::Stopped {
                return false;
            }
            *current = state;
            true
        });
    }
}

pub struct SimulationClock {
    ctx: Arc<EngineContext>,
    physics: Physics,
    erosion: GridSimulator,
    invasion: InvasionSpawner,
    cognition: Cadence,
    stability: Cadence,
    rng: ChaCha8Rng,
    handle: ClockHandle,
    control: watch::Receiver<ClockState>,
}

impl SimulationClock {
    pub fn new(ctx: Arc<EngineContext>) -> Self {
        let config = &ctx.config;
        let (handle, control) = ClockHandle::new();
        Self {
            physics: Physics::new(config),
            erosion: GridSimulator::new(config),
            invasion: InvasionSpawner::new(config),
            cognition: Cadence::new(config.cognition_interval_secs),
            stability: Cadence::new(config.stability_interval_secs),
            rng: ctx.fork_rng(),
            handle,
            control,
            ctx,
        }
    }

    pub fn handle(&self) -> ClockHandle {
        self.handle.clone()
    }

    /// Run one fast tick at `now`
    pub async fn tick(&mut self, now: DateTime<Utc>) -> Result<TickReport> {
        let started = Instant::now();
        let mut report = TickReport::default();

        let mut world = self.advance_world(now, &mut report).await?;

        // Cadences are marked only once their results are committed, so a
        // failed save is retried on the next tick
        if self.cognition.is_due(now) {
            world = self.think(world, now, &mut report).await?;
            self.cognition.mark(now);
            report.cognition_ran = true;
        }

        self.ctx.notifier.broadcast(&world);

        report.tick = world.tick;
        report.duration = started.elapsed();
        Ok(report)
    }

    /// Physics, plus the stability pass when due, in one session
    async fn advance_world(&mut self, now: DateTime<Utc>, report: &mut TickReport) -> Result<WorldSnapshot> {
        let dt = self.ctx.config.fast_tick_secs;
        let mut session = self.ctx.session().await?;
        let world = &mut session.world;

        let physics = self.physics.step(world, dt, now, &mut self.rng);
        report.agents_moved = physics.moved;
        report.awakenings = physics.awakenings;
        report.discoveries = physics.discoveries;

        let stability_due = self.stability.is_due(now);
        if stability_due {
            report.cells_advanced = self.erosion.advance(world.grid.cells_mut());

            let invasion = self
                .invasion
                .check(world.grid.cells_mut(), &world.agents, now, &mut self.rng);
            report.monsters_spawned = invasion.monsters.len();
            world.monsters.extend(invasion.monsters);
            for event in invasion.events {
                world.events.append(event);
            }
            report.monsters_pruned = world.prune_corruption_spawns(self.ctx.config.corruption_spawn_cap);

            world.metrics = WorldMetrics::from_grid(&world.grid);
            debug!(
                stability = world.metrics.stability_index,
                threat = world.metrics.threat_level,
                "Stability pass complete"
            );
        }

        world.last_tick = Some(now);
        let world = session.commit().await?;

        if stability_due {
            self.stability.mark(now);
            report.stability_ran = true;
        }
        Ok(world)
    }

    /// Deliberate outside the lock, then apply every decision at once
    async fn think(&mut self, world: WorldSnapshot, now: DateTime<Utc>, report: &mut TickReport) -> Result<WorldSnapshot> {
        let decisions = self
            .ctx
            .cognition
            .deliberate_all(&world, now, &mut self.rng)
            .await;
        drop(world);

        report.gateway_fallbacks = if self.ctx.cognition.has_gateway() {
            decisions
                .iter()
                .filter(|d| d.source == DecisionSource::Heuristic)
                .count()
        } else {
            0
        };

        let mut session = self.ctx.session().await?;
        // Agents removed during deliberation are skipped
        report.decisions = decisions
            .iter()
            .filter(|decision| apply_decision(&mut session.world, decision, now))
            .count();
        session.commit().await
    }

    /// Drive the clock until stopped, or for at most `max_ticks` ticks
    pub async fn run(mut self, max_ticks: Option<u64>) {
        let period = self.ctx.config.fast_tick();
        let budget = period.mul_f32(0.8);
        let mut ticks: u64 = 0;

        info!(
            period_ms = period.as_millis() as u64,
            gateway = self.ctx.cognition.has_gateway(),
            "Simulation clock started"
        );

        loop {
            let state = *self.control.borrow_and_update();
            match state {
                ClockState::Stopped => break,
                ClockState::Paused => {
                    if self.control.changed().await.is_err() {
                        break;
                    }
                    continue;
                }
                ClockState::Running => {}
            }

            match self.tick(Utc::now()).await {
                Ok(report) => {
                    debug!(
                        tick = report.tick,
                        moved = report.agents_moved,
                        decisions = report.decisions,
                        fallbacks = report.gateway_fallbacks,
                        spawned = report.monsters_spawned,
                        pruned = report.monsters_pruned,
                        cells = report.cells_advanced,
                        duration_ms = report.duration.as_millis() as u64,
                        "Tick complete"
                    );
                    if report.duration > budget {
                        warn!(
                            tick = report.tick,
                            duration_ms = report.duration.as_millis() as u64,
                            "Tick is close to the fast tick period"
                        );
                    }
                }
                Err(e) => error!(error = %e, "Tick failed"),
            }

            ticks += 1;
            if max_ticks.is_some_and(|max| ticks >= max) {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(period) => {}
                changed = self.control.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!(ticks, "Simulation clock stopped");
    }
}
