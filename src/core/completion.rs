//! Completion Service
//!
//! Every provider speaks the OpenAI-compatible `chat/completions` protocol,
//! so a single HTTP client type covers all of them. Clients are collected
//! into a [`CompletionClients`] map once at startup and handed to whoever
//! needs completions, which keeps provider wiring explicit and lets tests
//! substitute their own [`CompletionService`].

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::api::{ChatCompletionResponse, ChatMessage, ChatRequest};
use crate::core::builtin_providers::BuiltinProvider;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_ERROR_BODY_CHARS: usize = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    ProviderNotConfigured { provider: String },
    Network { provider: String, message: String },
    Api { provider: String, status: u16, message: String },
    InvalidResponse { provider: String, message: String },
    EmptyResponse { provider: String },
}

impl CompletionError {
    pub fn provider(&self) -> &str {
        match self {
            CompletionError::ProviderNotConfigured { provider }
            | CompletionError::Network { provider, .. }
            | CompletionError::Api { provider, .. }
            | CompletionError::InvalidResponse { provider, .. }
            | CompletionError::EmptyResponse { provider } => provider,
        }
    }
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionError::ProviderNotConfigured { provider } => {
                write!(f, "{provider} provider is not configured.")
            }
            CompletionError::Network { provider, message } => {
                write!(f, "API call failed for {provider}: {message}")
            }
            CompletionError::Api {
                provider,
                status,
                message,
            } => write!(f, "API call failed for {provider}: HTTP {status}: {message}"),
            CompletionError::InvalidResponse { provider, message } => {
                write!(f, "API call failed for {provider}: invalid response: {message}")
            }
            CompletionError::EmptyResponse { provider } => write!(
                f,
                "API call failed for {provider}: Received empty response from the API provider"
            ),
        }
    }
}

impl StdError for CompletionError {}

/// Anything that can turn a prompt into assistant text.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(
        &self,
        model: &str,
        provider: &str,
        user_text: &str,
        system_prompt: Option<&str>,
    ) -> Result<String, CompletionError>;
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value
                .get("error")
                .and_then(|v| v.as_str().map(str::to_owned))
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        })
        .or_else(|| {
            // Google wraps errors in a one-element array.
            value
                .pointer("/0/error/message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
}

/// One-line description of an error body returned by a provider.
pub fn summarize_api_error(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&value) {
            return summary;
        }
    }

    let collapsed = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > MAX_ERROR_BODY_CHARS {
        let truncated: String = collapsed.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{truncated}…")
    } else {
        collapsed
    }
}

/// The error and every cause below it, `: ` separated.
fn describe_error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }
    message
}

fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

/// HTTP client for one provider's chat completions endpoint.
#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    http: reqwest::Client,
    provider_id: String,
    base_url: String,
    api_key: String,
    anthropic_auth: bool,
}

impl fmt::Debug for OpenAiCompatibleClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiCompatibleClient")
            .field("provider_id", &self.provider_id)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAiCompatibleClient {
    pub fn new(http: reqwest::Client, provider: &BuiltinProvider, api_key: String) -> Self {
        Self {
            http,
            provider_id: provider.id.clone(),
            base_url: provider.base_url.clone(),
            api_key,
            anthropic_auth: provider.is_anthropic_mode(),
        }
    }

    /// Point the client somewhere other than the catalog URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    pub fn endpoint(&self) -> String {
        construct_api_url(&self.base_url, "chat/completions")
    }

    fn build_request(&self, request: &ChatRequest) -> reqwest::RequestBuilder {
        let builder = self
            .http
            .post(self.endpoint())
            .timeout(REQUEST_TIMEOUT)
            .header("Content-Type", "application/json")
            .json(request);

        if self.anthropic_auth {
            builder
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", "2023-06-01")
        } else {
            builder.header("Authorization", format!("Bearer {}", self.api_key))
        }
    }

    pub async fn chat(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<String, CompletionError> {
        let provider = self.provider_id.clone();
        let request = ChatRequest {
            model: model.to_string(),
            messages,
            stream: false,
        };

        debug!(provider = %provider, model, "Sending chat completion request");
        let response = self
            .build_request(&request)
            .send()
            .await
            .map_err(|err| CompletionError::Network {
                provider: provider.clone(),
                message: describe_error_chain(&err),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| CompletionError::Network {
                provider: provider.clone(),
                message: describe_error_chain(&err),
            })?;

        if !status.is_success() {
            warn!(provider = %provider, status = status.as_u16(), "Chat completion failed");
            return Err(CompletionError::Api {
                provider,
                status: status.as_u16(),
                message: summarize_api_error(&body),
            });
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&body).map_err(|err| CompletionError::InvalidResponse {
                provider: provider.clone(),
                message: err.to_string(),
            })?;

        match parsed.first_content() {
            Some(content) if !content.trim().is_empty() => Ok(content.to_string()),
            _ => Err(CompletionError::EmptyResponse { provider }),
        }
    }
}

/// Build the `[system?, user]` message list sent for a single prompt.
pub fn prompt_messages(user_text: &str, system_prompt: Option<&str>) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system_prompt.filter(|s| !s.trim().is_empty()) {
        messages.push(ChatMessage::system(system));
    }
    messages.push(ChatMessage::user(user_text));
    messages
}

/// Provider id → client, built once at startup.
#[derive(Debug, Default, Clone)]
pub struct CompletionClients {
    clients: HashMap<String, OpenAiCompatibleClient>,
}

impl CompletionClients {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, client: OpenAiCompatibleClient) {
        self.clients
            .insert(client.provider_id().to_lowercase(), client);
    }

    pub fn get(&self, provider: &str) -> Option<&OpenAiCompatibleClient> {
        self.clients.get(&provider.to_lowercase())
    }

    pub fn providers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.clients.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

#[async_trait]
impl CompletionService for CompletionClients {
    async fn complete(
        &self,
        model: &str,
        provider: &str,
        user_text: &str,
        system_prompt: Option<&str>,
    ) -> Result<String, CompletionError> {
        let client = self
            .get(provider)
            .ok_or_else(|| CompletionError::ProviderNotConfigured {
                provider: provider.to_string(),
            })?;
        client
            .chat(model, prompt_messages(user_text, system_prompt))
            .await
    }
}
