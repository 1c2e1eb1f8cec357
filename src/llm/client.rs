//! Async LLM client backing the reasoning gateway
//!
//! Speaks the Anthropic messages API or any OpenAI-compatible chat API; the
//! format is picked from the endpoint URL.

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

use crate::core::error::{AxiomError, Result};

const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";

/// Decisions and reflections are a few sentences of JSON
const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

impl ApiFormat {
    pub fn detect(url: &str) -> Self {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            ApiFormat::OpenAI
        }
    }
}

pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    api_format: ApiFormat,
}

impl LlmClient {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        let api_format = ApiFormat::detect(&api_url);
        Self {
            client: Client::new(),
            api_key,
            api_url,
            model,
            api_format,
        }
    }

    /// Create a client from environment variables
    ///
    /// Required: LLM_API_KEY
    /// Optional: LLM_API_URL, LLM_MODEL
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("LLM_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AxiomError::Llm("LLM_API_KEY not set".into()))?;
        let api_url = std::env::var("LLM_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

        Ok(Self::new(api_key, api_url, model))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn api_format(&self) -> ApiFormat {
        self.api_format
    }

    /// Send one system + user exchange, returning the reply text
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        match self.api_format {
            ApiFormat::Anthropic => self.complete_anthropic(system, user).await,
            ApiFormat::OpenAI => self.complete_openai(system, user).await,
        }
    }

    async fn complete_anthropic(&self, system: &str, user: &str) -> Result<String> {
        let request = AnthropicRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![Message { role: "user", content: user }],
        };

        let builder = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request);

        let completion: AnthropicResponse = send(builder).await?;
        completion
            .content
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or_else(|| AxiomError::Llm("Empty response".into()))
    }

    async fn complete_openai(&self, system: &str, user: &str) -> Result<String> {
        let request = OpenAIRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: vec![
                Message { role: "system", content: system },
                Message { role: "user", content: user },
            ],
        };

        let builder = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request);

        let completion: OpenAIResponse = send(builder).await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AxiomError::Llm("Empty response".into()))
    }
}

async fn send<T: for<'de> Deserialize<'de>>(builder: RequestBuilder) -> Result<T> {
    let response = builder
        .send()
        .await
        .map_err(|e| AxiomError::Llm(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(AxiomError::Llm(format!("API error {}: {}", status, error_text)));
    }

    response.json().await.map_err(|e| AxiomError::Llm(e.to_string()))
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = LlmClient::new(
            "test-key".into(),
            "https://api.example.com/v1/chat/completions".into(),
            "test-model".into(),
        );
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.model(), "test-model");
        assert_eq!(client.api_format(), ApiFormat::OpenAI);
    }

    #[test]
    fn test_anthropic_url_detected() {
        assert_eq!(ApiFormat::detect(DEFAULT_API_URL), ApiFormat::Anthropic);
        assert_eq!(ApiFormat::detect("https://api.deepseek.com/chat"), ApiFormat::OpenAI);
    }

    #[test]
    fn test_request_shape() {
        let request = AnthropicRequest {
            model: "m",
            max_tokens: MAX_TOKENS,
            system: "sys",
            messages: vec![Message { role: "user", content: "hi" }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["system"], "sys");
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
