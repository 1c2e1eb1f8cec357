//! World dynamics: the clock and every phase it drives

pub mod clock;
pub mod cognition;
pub mod erosion;
pub mod invasion;
pub mod physics;
pub mod utility;

pub use clock::{ClockHandle, ClockState, SimulationClock, TickReport};
pub use cognition::{apply_decision, apply_reflection, AgentDecision, Cognition};
pub use erosion::GridSimulator;
pub use invasion::InvasionSpawner;
pub use physics::Physics;
pub use utility::{recursion_factor, UtilityEngine};
