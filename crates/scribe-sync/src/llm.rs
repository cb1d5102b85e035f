use std::time::Duration;

use async_trait::async_trait;
use scribe_core::{LlmConfig, ScribeError};
use serde::{Deserialize, Serialize};

/// Sampling temperature used for every synthesis call.
pub const SYNTHESIS_TEMPERATURE: f64 = 0.7;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const ANTHROPIC_MAX_TOKENS: u32 = 8192;

/// A single synthesis request: one instruction, one prompt, one completion.
///
/// # Examples
///
/// ```
/// use scribe_sync::llm::{GenerationRequest, SYNTHESIS_TEMPERATURE};
///
/// let request = GenerationRequest::new("be brief", "update AGENTS.md", "gpt-4o");
/// assert_eq!(request.temperature, SYNTHESIS_TEMPERATURE);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// System instruction.
    pub system: String,
    /// User prompt.
    pub prompt: String,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
}

impl GenerationRequest {
    /// Build a request at [`SYNTHESIS_TEMPERATURE`].
    pub fn new(
        system: impl Into<String>,
        prompt: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            model: model.into(),
            temperature: SYNTHESIS_TEMPERATURE,
        }
    }
}

/// A text-generation backend.
///
/// Implementations make exactly one request per call and never retry. Every
/// failure, including a response envelope without text, is reported as
/// [`ScribeError::Synthesis`]. A well-formed response with no text yields an
/// empty string.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Run one completion and return its raw text.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ScribeError>;
}

/// A message in a chat conversation with the LLM.
///
/// # Examples
///
/// ```
/// use scribe_sync::llm::{ChatMessage, Role};
///
/// let msg = ChatMessage {
///     role: Role::User,
///     content: "Update AGENTS.md".into(),
/// };
/// assert!(matches!(msg.role, Role::User));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: Role,
    /// Text content of the message.
    pub content: String,
}

/// Role in the chat conversation.
///
/// # Examples
///
/// ```
/// use scribe_sync::llm::Role;
///
/// let role = Role::System;
/// assert_eq!(serde_json::to_string(&role).unwrap(), "\"system\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System-level instructions.
    System,
    /// User input.
    User,
}

/// Wire protocol spoken by the configured provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// OpenAI-compatible `/v1/chat/completions` (OpenAI, Ollama, vLLM, LiteLLM, ...).
    OpenAi,
    /// Anthropic `/v1/messages`.
    Anthropic,
}

impl Provider {
    /// Resolve a provider name from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScribeError::Config`] for unknown providers.
    ///
    /// # Examples
    ///
    /// ```
    /// use scribe_sync::llm::Provider;
    ///
    /// assert_eq!(Provider::from_name("anthropic").unwrap(), Provider::Anthropic);
    /// assert_eq!(Provider::from_name("ollama").unwrap(), Provider::OpenAi);
    /// assert!(Provider::from_name("carrier-pigeon").is_err());
    /// ```
    pub fn from_name(name: &str) -> Result<Self, ScribeError> {
        match name.to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Provider::Anthropic),
            "openai" | "ollama" | "vllm" | "litellm" => Ok(Provider::OpenAi),
            other => Err(ScribeError::Config(format!(
                "unknown LLM provider '{other}' (expected anthropic or openai)"
            ))),
        }
    }

    fn default_base_url(self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com",
            Provider::Anthropic => "https://api.anthropic.com",
        }
    }
}

/// HTTP client for the configured generation backend.
///
/// # Examples
///
/// ```
/// use scribe_core::LlmConfig;
/// use scribe_sync::llm::LlmClient;
///
/// let config = LlmConfig {
///     api_key: Some("test-key".into()),
///     ..LlmConfig::default()
/// };
/// let client = LlmClient::new(&config).unwrap();
/// ```
pub struct LlmClient {
    client: reqwest::Client,
    config: LlmConfig,
    provider: Provider,
}

impl LlmClient {
    /// Create a new LLM client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScribeError::Config`] for an unknown provider, or
    /// [`ScribeError::Synthesis`] if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, ScribeError> {
        let provider = Provider::from_name(&config.provider)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| ScribeError::Synthesis(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            config: config.clone(),
            provider,
        })
    }

    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .map(|u| u.trim_end_matches('/'))
            .unwrap_or(self.provider.default_base_url())
    }

    async fn post(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, ScribeError> {
        let mut request = self.client.post(url);
        if let Some(api_key) = &self.config.api_key {
            request = match self.provider {
                Provider::OpenAi => request.header("Authorization", format!("Bearer {api_key}")),
                Provider::Anthropic => request.header("x-api-key", api_key),
            };
        }
        if self.provider == Provider::Anthropic {
            request = request.header("anthropic-version", ANTHROPIC_VERSION);
        }
        request = request.header("Content-Type", "application/json");

        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| ScribeError::Synthesis(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ScribeError::Synthesis(format!(
                "LLM API error {status}: {body_text}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ScribeError::Synthesis(format!("failed to parse response: {e}")))
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ScribeError> {
        let base_url = self.base_url();
        match self.provider {
            Provider::OpenAi => {
                let url = format!("{base_url}/v1/chat/completions");
                let response = self.post(&url, &openai_request_body(request)).await?;
                extract_openai_text(&response)
            }
            Provider::Anthropic => {
                let url = format!("{base_url}/v1/messages");
                let response = self.post(&url, &anthropic_request_body(request)).await?;
                extract_anthropic_text(&response)
            }
        }
    }
}

/// Chat completions request body: system and user messages, plain-text output.
pub fn openai_request_body(request: &GenerationRequest) -> serde_json::Value {
    let messages = vec![
        ChatMessage {
            role: Role::System,
            content: request.system.clone(),
        },
        ChatMessage {
            role: Role::User,
            content: request.prompt.clone(),
        },
    ];
    serde_json::json!({
        "model": request.model,
        "messages": messages,
        "temperature": request.temperature,
    })
}

/// Messages API request body; the system instruction is a top-level field.
pub fn anthropic_request_body(request: &GenerationRequest) -> serde_json::Value {
    let messages = vec![ChatMessage {
        role: Role::User,
        content: request.prompt.clone(),
    }];
    serde_json::json!({
        "model": request.model,
        "system": request.system,
        "messages": messages,
        "max_tokens": ANTHROPIC_MAX_TOKENS,
        "temperature": request.temperature,
    })
}

/// Pull the completion text out of a chat completions response.
///
/// A `null` content is an empty completion, not an error.
///
/// # Errors
///
/// Returns [`ScribeError::Synthesis`] if there is no first choice message, or
/// if the completion was cut off at the token limit.
pub fn extract_openai_text(response: &serde_json::Value) -> Result<String, ScribeError> {
    let choice = response
        .get("choices")
        .and_then(|c| c.get(0))
        .ok_or_else(|| {
            ScribeError::Synthesis(format!("unexpected response structure: {response}"))
        })?;
    if choice.get("finish_reason").and_then(|r| r.as_str()) == Some("length") {
        return Err(ScribeError::Synthesis(
            "completion was truncated at the token limit".into(),
        ));
    }
    let message = choice.get("message").ok_or_else(|| {
        ScribeError::Synthesis(format!("unexpected response structure: {response}"))
    })?;

    match message.get("content") {
        None | Some(serde_json::Value::Null) => Ok(String::new()),
        Some(serde_json::Value::String(text)) => Ok(text.clone()),
        Some(other) => Err(ScribeError::Synthesis(format!(
            "message content is not text: {other}"
        ))),
    }
}

/// Concatenate the text blocks of a messages API response.
///
/// # Errors
///
/// Returns [`ScribeError::Synthesis`] if the `content` array is missing, or
/// if generation stopped at `max_tokens`.
pub fn extract_anthropic_text(response: &serde_json::Value) -> Result<String, ScribeError> {
    if response.get("stop_reason").and_then(|r| r.as_str()) == Some("max_tokens") {
        return Err(ScribeError::Synthesis(format!(
            "completion was truncated at {ANTHROPIC_MAX_TOKENS} tokens"
        )));
    }
    let blocks = response
        .get("content")
        .and_then(|c| c.as_array())
        .ok_or_else(|| {
            ScribeError::Synthesis(format!("unexpected response structure: {response}"))
        })?;

    Ok(blocks
        .iter()
        .filter(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
        .filter_map(|b| b.get("text").and_then(|t| t.as_str()))
        .collect())
}
