//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for agents
///
/// Bootstrap agents carry readable ids ("aurelius_001"), imported and
/// spawned ones a random suffix, so this wraps a string rather than a Uuid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh id with the given prefix and a short random suffix
    pub fn generate(prefix: &str) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("{}_{}", prefix, &suffix[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for monsters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonsterId(pub Uuid);

impl MonsterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MonsterId {
    fn default() -> Self {
        Self::new()
    }
}

/// Clock tick counter (one per fast tick)
pub type Tick = u64;

/// World-space position
///
/// Agents live on the x/z plane; `y` is kept for clients and stays at
/// ground level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, z: f32) -> Self {
        Self { x, y: 0.0, z }
    }

    /// Distance on the ground plane
    pub fn distance(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// Move toward `target` by at most `step` units, never overshooting
    pub fn step_toward(&self, target: &Self, step: f32) -> Self {
        let dist = self.distance(target);
        if dist <= step || dist < 0.0001 {
            return Self::new(target.x, target.z);
        }
        Self::new(
            self.x + (target.x - self.x) / dist * step,
            self.z + (target.z - self.z) / dist * step,
        )
    }
}

impl std::ops::Add for Position {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y, z: self.z + rhs.z }
    }
}

/// Clamp into [0, 1], mapping NaN to 0
pub fn unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
