use thiserror::Error;

use crate::core::types::AgentId;

#[derive(Error, Debug)]
pub enum AxiomError {
    #[error("Agent not found: {0}")]
    AgentNotFound(AgentId),

    #[error("Grid cell not found: ({x}, {z})")]
    CellNotFound { x: i32, z: i32 },

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Reasoning gateway timed out after {0:.1}s")]
    GatewayTimeout(f32),

    #[error("Malformed decision: {0}")]
    MalformedDecision(String),

    #[error("Invalid character import: {0}")]
    InvalidImport(String),

    #[error("Empty message")]
    EmptyMessage,

    #[error("World store error: {0}")]
    Store(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, AxiomError>;
