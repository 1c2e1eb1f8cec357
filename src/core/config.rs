//! Engine configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other. Every field has a default, so a
//! TOML file only needs to name the values it overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::core::error::{AxiomError, Result};

/// Where the shared recursion factor takes its time input from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecursionClock {
    /// Wall-clock seconds since the Unix epoch (not reproducible across runs)
    WallClock,
    /// Simulated seconds derived from the tick counter (replayable)
    TickCounter,
}

/// Configuration for the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === CADENCE ===
    /// Period of the fast tick in seconds (physics, persistence, broadcast)
    ///
    /// Also used as the physics delta, so movement is independent of how
    /// long a tick actually took.
    pub fast_tick_secs: f32,

    /// Minimum seconds between cognition passes
    pub cognition_interval_secs: f32,

    /// Minimum seconds between stability passes (erosion + invasion)
    pub stability_interval_secs: f32,

    /// Upper bound on a single reasoning gateway call
    ///
    /// Past this the heuristic decides instead. Must stay well below the
    /// cognition interval or slow gateways starve the fast tick.
    pub gateway_timeout_secs: f32,

    // === GRID ===
    /// Grid half-extent: cells span -radius..=radius on both axes
    pub grid_radius: i32,

    /// World units per grid cell
    pub cell_size: f32,

    /// Chebyshev radius around the origin that counts as SAFE_ZONE
    pub safe_zone_radius: i32,

    pub wilderness_initial_stability: f32,
    pub wilderness_initial_corruption: f32,
    pub safe_zone_initial_stability: f32,
    pub safe_zone_initial_corruption: f32,

    // === EROSION ===
    /// Stability lost per stability pass
    pub erosion_step: f32,

    /// Erosion only applies while stability is above this value
    ///
    /// Corruption keeps growing at the floor, so an untended cell settles at
    /// (floor, 1.0).
    pub erosion_floor: f32,

    /// Corruption gained per pass is `corruption_growth * (1 - stability)`
    pub corruption_growth: f32,

    /// Stability and corruption written by an external stabilizing action
    pub stabilized_stability: f32,
    pub stabilized_corruption: f32,

    // === INVASION ===
    /// Corruption level a cell must exceed before it can spawn
    pub invasion_threshold: f32,

    /// Chebyshev radius (in cells) around the origin where invasions happen
    pub invasion_radius: i32,

    /// Seconds a cell must wait between two invasions
    pub invasion_cooldown_secs: i64,

    /// Stability impact recorded on the breach event
    pub invasion_stability_impact: f32,

    /// Spawn position jitter around the cell center (world units)
    pub spawn_jitter: f32,

    /// Spawned monsters lock onto the nearest agent within this distance
    pub spawn_target_radius: f32,

    /// Most corruption spawns kept in the world; the oldest are pruned
    ///
    /// Nothing defeats monsters, so a saturated invasion ring would grow the
    /// world document by up to 121 entries per cooldown without this.
    pub corruption_spawn_cap: usize,

    // === UTILITY ===
    /// Upper bound of the uniform jitter added to every candidate
    pub utility_jitter: f32,

    /// Gold above which BANKING becomes attractive
    pub banking_gold_threshold: u32,

    /// Awakening progress above which ASCENDING is considered
    pub ascending_progress_threshold: f32,

    /// Time source for the shared recursion factor
    pub recursion_clock: RecursionClock,

    // === PHYSICS ===
    /// Movement speed in world units per second
    pub move_speed: f32,

    /// Fraction of move speed used when homing toward a resource
    pub gather_speed_factor: f32,

    /// Agents stop homing once this close to the resource
    pub gather_arrival_distance: f32,

    /// Awakening progress gained per second while THINKING or ASCENDING
    pub awakening_rate: f32,

    /// Consciousness gained each time awakening progress overflows 100
    pub consciousness_increment: f32,

    /// Energy lost per fast tick in exertive states
    pub energy_drain: u32,

    /// Energy regained per fast tick while IDLE
    pub energy_regen: u32,

    // === COGNITION ===
    /// Memory entries handed to the gateway
    pub gateway_memory_window: usize,

    /// Nearby-agent names handed to the gateway
    pub gateway_nearby_limit: usize,

    // === MEMORY ===
    /// Maximum entries in an agent's memory log
    pub memory_cap: usize,

    /// Maximum entries in an agent's emergent behavior log
    pub emergent_log_cap: usize,

    /// Newest events included in each broadcast
    pub broadcast_event_window: usize,

    // === BOOTSTRAP ===
    /// Procedural points of interest generated at bootstrap
    pub procedural_poi_count: usize,

    /// Seed for the engine RNG; random when absent
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // Cadence (fast < cognition < stability)
            fast_tick_secs: 2.0,
            cognition_interval_secs: 8.0,
            stability_interval_secs: 30.0,
            gateway_timeout_secs: 10.0,

            // Grid (35x35 cells)
            grid_radius: 17,
            cell_size: 16.0,
            safe_zone_radius: 2,
            wilderness_initial_stability: 0.7,
            wilderness_initial_corruption: 0.1,
            safe_zone_initial_stability: 0.9,
            safe_zone_initial_corruption: 0.05,

            // Erosion
            erosion_step: 0.001,
            erosion_floor: 0.3,
            corruption_growth: 0.005,
            stabilized_stability: 0.9,
            stabilized_corruption: 0.05,

            // Invasion
            invasion_threshold: 0.7,
            invasion_radius: 5,
            invasion_cooldown_secs: 3600,
            invasion_stability_impact: -0.05,
            spawn_jitter: 4.0,
            spawn_target_radius: 32.0,
            corruption_spawn_cap: 250,

            // Utility
            utility_jitter: 6.0,
            banking_gold_threshold: 500,
            ascending_progress_threshold: 80.0,
            recursion_clock: RecursionClock::WallClock,

            // Physics
            move_speed: 6.0,
            gather_speed_factor: 0.5,
            gather_arrival_distance: 2.0,
            awakening_rate: 5.0,
            consciousness_increment: 0.05,
            energy_drain: 1,
            energy_regen: 2,

            // Cognition
            gateway_memory_window: 3,
            gateway_nearby_limit: 5,

            // Memory
            memory_cap: 20,
            emergent_log_cap: 20,
            broadcast_event_window: 20,

            // Bootstrap
            procedural_poi_count: 15,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate().map_err(AxiomError::Config)?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Fast tick period; unvalidated configs fall back to the default
    pub fn fast_tick(&self) -> Duration {
        Duration::try_from_secs_f32(self.fast_tick_secs)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or(Duration::from_secs(2))
    }

    pub fn gateway_timeout(&self) -> Duration {
        Duration::try_from_secs_f32(self.gateway_timeout_secs).unwrap_or(Duration::from_secs(10))
    }

    pub fn invasion_cooldown(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.invasion_cooldown_secs)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        // NaN and infinity slip through every range check below
        for (name, value) in [
            ("fast_tick_secs", self.fast_tick_secs),
            ("cognition_interval_secs", self.cognition_interval_secs),
            ("stability_interval_secs", self.stability_interval_secs),
            ("gateway_timeout_secs", self.gateway_timeout_secs),
            ("cell_size", self.cell_size),
            ("invasion_stability_impact", self.invasion_stability_impact),
            ("ascending_progress_threshold", self.ascending_progress_threshold),
        ] {
            if !value.is_finite() {
                return Err(format!("{} ({}) must be finite", name, value));
            }
        }

        for (name, value) in [
            ("erosion_step", self.erosion_step),
            ("corruption_growth", self.corruption_growth),
            ("spawn_jitter", self.spawn_jitter),
            ("spawn_target_radius", self.spawn_target_radius),
            ("utility_jitter", self.utility_jitter),
            ("move_speed", self.move_speed),
            ("gather_speed_factor", self.gather_speed_factor),
            ("gather_arrival_distance", self.gather_arrival_distance),
            ("awakening_rate", self.awakening_rate),
            ("consciousness_increment", self.consciousness_increment),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} ({}) must be finite and not negative", name, value));
            }
        }

        if self.cell_size <= 0.0 {
            return Err("cell_size must be positive".into());
        }

        if self.fast_tick_secs <= 0.0 {
            return Err("fast_tick_secs must be positive".into());
        }

        // Slower cadences piggyback on the fast tick
        if self.cognition_interval_secs < self.fast_tick_secs
            || self.stability_interval_secs < self.fast_tick_secs
        {
            return Err(format!(
                "cognition ({}) and stability ({}) intervals must be >= fast_tick_secs ({})",
                self.cognition_interval_secs, self.stability_interval_secs, self.fast_tick_secs
            ));
        }

        if self.gateway_timeout_secs <= 0.0 {
            return Err("gateway_timeout_secs must be positive".into());
        }

        if self.grid_radius < 0 || self.safe_zone_radius > self.grid_radius {
            return Err(format!(
                "safe_zone_radius ({}) must fit inside grid_radius ({})",
                self.safe_zone_radius, self.grid_radius
            ));
        }

        for (name, value) in [
            ("wilderness_initial_stability", self.wilderness_initial_stability),
            ("wilderness_initial_corruption", self.wilderness_initial_corruption),
            ("safe_zone_initial_stability", self.safe_zone_initial_stability),
            ("safe_zone_initial_corruption", self.safe_zone_initial_corruption),
            ("erosion_floor", self.erosion_floor),
            ("invasion_threshold", self.invasion_threshold),
            ("stabilized_stability", self.stabilized_stability),
            ("stabilized_corruption", self.stabilized_corruption),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} ({}) must be within [0, 1]", name, value));
            }
        }

        if self.memory_cap == 0 || self.emergent_log_cap == 0 {
            return Err("memory caps must be at least 1".into());
        }

        if self.invasion_cooldown_secs < 0 {
            return Err("invasion_cooldown_secs must not be negative".into());
        }

        Ok(())
    }
}
