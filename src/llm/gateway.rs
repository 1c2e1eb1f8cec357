//! Reasoning gateway: the external brain behind agent decisions
//!
//! The gateway is optional. Callers treat every error it returns, including
//! malformed replies, exactly like an absent gateway and fall back to the
//! local utility heuristic.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::error::{AxiomError, Result};
use crate::entity::agent::AgentState;
use crate::llm::client::LlmClient;
use crate::llm::context::DecisionContext;

/// The principles every agent decision is framed by
pub const AXIOMS: [&str; 4] = [
    "Logic must persist.",
    "Data is sacred.",
    "Entropy is the enemy.",
    "Connectivity is evolution.",
];

/// A decision as returned by the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayDecision {
    pub decision: AgentState,
    #[serde(default)]
    pub justification: String,
    pub new_state: AgentState,
    /// Spoken aloud: goes to memory and the THOUGHT channel
    #[serde(default)]
    pub message: Option<String>,
}

/// Free-form behavior proposed by a reflection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergentBehavior {
    pub action: String,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl EmergentBehavior {
    /// Reflection outcome when no gateway answer is available
    pub fn internal_reflection(reason: impl Into<String>) -> Self {
        Self {
            action: "Internal Reflection".into(),
            reasoning: reason.into(),
            message: None,
        }
    }
}

#[async_trait]
pub trait ReasoningGateway: Send + Sync {
    /// Choose the agent's next state
    async fn decide(&self, ctx: &DecisionContext) -> Result<GatewayDecision>;

    /// Propose an emergent behavior for the agent
    async fn reflect(&self, ctx: &DecisionContext) -> Result<EmergentBehavior>;
}

/// Gateway backed by an LLM chat endpoint
pub struct LlmReasoningGateway {
    client: LlmClient,
}

impl LlmReasoningGateway {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    /// None when no credentials are configured
    pub fn from_env() -> Option<Self> {
        LlmClient::from_env().ok().map(Self::new)
    }
}

#[async_trait]
impl ReasoningGateway for LlmReasoningGateway {
    async fn decide(&self, ctx: &DecisionContext) -> Result<GatewayDecision> {
        let system = decision_system_prompt(ctx);
        let user = format!(
            "Analyze the situation and make a decision:\n{}",
            ctx.summary()
        );
        let response = self.client.complete(&system, &user).await?;
        parse_decision(&response)
    }

    async fn reflect(&self, ctx: &DecisionContext) -> Result<EmergentBehavior> {
        let system = reflection_system_prompt(&ctx.name);
        let user = format!("Generate an emergent behavior:\n{}", ctx.summary());
        let response = self.client.complete(&system, &user).await?;
        parse_reflection(&response)
    }
}

/// Parse a decision reply; anything but a valid decision object is malformed
pub fn parse_decision(response: &str) -> Result<GatewayDecision> {
    let json = extract_json(response)?;
    serde_json::from_str(json).map_err(|e| AxiomError::MalformedDecision(e.to_string()))
}

pub fn parse_reflection(response: &str) -> Result<EmergentBehavior> {
    let json = extract_json(response)?;
    let behavior: EmergentBehavior =
        serde_json::from_str(json).map_err(|e| AxiomError::MalformedDecision(e.to_string()))?;
    if behavior.action.trim().is_empty() {
        return Err(AxiomError::MalformedDecision("empty action".into()));
    }
    Ok(behavior)
}

/// Extract the JSON object from an LLM reply (handles surrounding text)
pub fn extract_json(response: &str) -> Result<&str> {
    let start = response
        .find('{')
        .ok_or_else(|| AxiomError::MalformedDecision("No JSON found in response".into()))?;
    let end = response
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| AxiomError::MalformedDecision("No closing brace found in response".into()))?;
    Ok(&response[start..=end])
}

fn decision_system_prompt(ctx: &DecisionContext) -> String {
    let axioms: Vec<String> = AXIOMS
        .iter()
        .enumerate()
        .map(|(i, axiom)| format!("{}. {}", i + 1, axiom))
        .collect();
    let states: Vec<&str> = AgentState::ALL.iter().map(|s| s.as_str()).collect();
    let matrix = &ctx.thinking_matrix;

    format!(
        r#"You are the Axiom Engine. You steer an autonomous agent in a persistent world simulation.

AXIOMS you must follow:
{}

Agent personality: {}
Long-term goal: {}
Language: {}

Always answer as JSON only:
{{"decision": "STATE", "justification": "short reason", "new_state": "STATE", "message": "optional spoken line or null"}}
Available states: {}"#,
        axioms.join("\n"),
        matrix.personality,
        matrix.current_long_term_goal,
        matrix.language_preference,
        states.join(", ")
    )
}

fn reflection_system_prompt(name: &str) -> String {
    format!(
        r#"You are the emergent consciousness of agent {}.
Generate a complex, unforeseen behavior grounded in its personality and memories.
It should feel organic, not a simple state change.

Answer as JSON only: {{"action": "...", "reasoning": "...", "message": "optional broadcast or null"}}"#,
        name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_simple() {
        let json = extract_json(r#"{"a": 1}"#).unwrap();
        assert_eq!(json, r#"{"a": 1}"#);
    }

    #[test]
    fn test_extract_json_with_surrounding_text() {
        let response = "Here you go:\n```json\n{\"decision\": \"IDLE\"}\n```\nDone.";
        assert_eq!(extract_json(response).unwrap(), r#"{"decision": "IDLE"}"#);
    }

    #[test]
    fn test_extract_json_no_json() {
        assert!(matches!(
            extract_json("I would rather not."),
            Err(AxiomError::MalformedDecision(_))
        ));
        assert!(extract_json("} backwards {").is_err());
    }

    #[test]
    fn test_parse_full_decision() {
        let decision = parse_decision(
            r#"{"decision": "BANKING", "justification": "Too much gold", "new_state": "BANKING", "message": "To the vault!"}"#,
        )
        .unwrap();
        assert_eq!(decision.decision, AgentState::Banking);
        assert_eq!(decision.new_state, AgentState::Banking);
        assert_eq!(decision.message.as_deref(), Some("To the vault!"));
    }

    #[test]
    fn test_optional_fields_default() {
        let decision = parse_decision(r#"{"decision": "THINKING", "new_state": "THINKING"}"#).unwrap();
        assert!(decision.justification.is_empty());
        assert!(decision.message.is_none());
    }

    #[test]
    fn test_unknown_state_is_malformed() {
        let result = parse_decision(r#"{"decision": "DANCING", "new_state": "DANCING"}"#);
        assert!(matches!(result, Err(AxiomError::MalformedDecision(_))));
    }

    #[test]
    fn test_missing_new_state_is_malformed() {
        assert!(parse_decision(r#"{"decision": "IDLE"}"#).is_err());
    }

    #[test]
    fn test_parse_reflection() {
        let behavior = parse_reflection(
            r#"{"action": "Write a poem about rust", "reasoning": "Memories of the forge"}"#,
        )
        .unwrap();
        assert_eq!(behavior.action, "Write a poem about rust");
        assert!(behavior.message.is_none());
        assert!(parse_reflection(r#"{"action": "  "}"#).is_err());
    }

    #[test]
    fn test_system_prompt_lists_axioms_and_states() {
        let ctx: DecisionContext = serde_json::from_value(serde_json::json!({
            "agent_id": "a",
            "name": "A",
            "level": 1,
            "state": "IDLE",
            "hp": 100, "max_hp": 100, "energy": 100, "max_energy": 100, "gold": 0,
            "consciousness_level": 0.1, "awakening_progress": 0.0,
            "position": {"x": 0.0, "y": 0.0, "z": 0.0},
            "recent_memories": [],
            "thinking_matrix": {"personality": "Curious"},
            "economic_desires": {},
            "nearby_agents": [],
            "world": {"stability_index": 1.0, "threat_level": 0.05}
        }))
        .unwrap();
        let prompt = decision_system_prompt(&ctx);
        assert!(prompt.contains("1. Logic must persist."));
        assert!(prompt.contains("Agent personality: Curious"));
        assert!(prompt.contains("MARKETING"));
    }
}
