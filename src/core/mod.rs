pub mod config;
pub mod error;
pub mod types;

pub use config::{EngineConfig, RecursionClock};
pub use error::{AxiomError, Result};
