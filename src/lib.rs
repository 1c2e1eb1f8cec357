//! Axiom Engine - persistent agent world simulation
//!
//! A clock ages a grid of world cells toward instability, spawns corruption
//! near the sanctuary once cells breach, and asks every agent for its next
//! state through an optional reasoning gateway with a utility heuristic as
//! fallback.

pub mod context;
pub mod core;
pub mod entity;
pub mod llm;
pub mod notify;
pub mod service;
pub mod simulation;
pub mod spatial;
pub mod store;
pub mod world;

pub use crate::context::{EngineContext, WorldSession};
pub use crate::core::{AxiomError, EngineConfig, Result};
pub use crate::service::WorldService;
pub use crate::simulation::SimulationClock;
