//! Optional LLM-backed reasoning for agent decisions

pub mod client;
pub mod context;
pub mod gateway;

pub use client::LlmClient;
pub use context::DecisionContext;
pub use gateway::{EmergentBehavior, GatewayDecision, LlmReasoningGateway, ReasoningGateway};
