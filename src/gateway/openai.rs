/// Chat-completion HTTP client for the API gateway.
///
/// Talks to an OpenAI-compatible `chat/completions` endpoint using the
/// synchronous `ureq` HTTP client. One call is one POST with a system and a
/// user message; the reply is read from `choices[0].message.content`.
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{CompletionRequest, CompletionTransport, GatewayError};
use crate::config::schema::GatewayConfig;

// ---------------------------------------------------------------------------
// Credential
// ---------------------------------------------------------------------------

/// Bearer credential for the completion endpoint.
///
/// `Debug` output is redacted so the secret never reaches logs.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    /// Wrap an explicit credential value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Read the credential from the named environment variable.
    ///
    /// An unset or empty variable is [`GatewayError::MissingCredential`].
    pub fn from_env(var: &str) -> Result<Self, GatewayError> {
        match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => Ok(Self(value.trim().to_string())),
            _ => Err(GatewayError::MissingCredential(var.to_string())),
        }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// A single message in the request body.
#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Request body for `POST /v1/chat/completions`.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [WireMessage<'a>; 2],
    temperature: f64,
}

/// The subset of the response body we consume.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    /// Null when the model refuses or only calls tools.
    #[serde(default)]
    content: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous chat-completion client.
///
/// Built once at startup and shared by every flow; holds no mutable state.
#[derive(Debug)]
pub struct OpenAiClient {
    endpoint: String,
    model: String,
    credential: Credential,
    timeout: Duration,
}

impl OpenAiClient {
    /// Build a client from the resolved gateway config and a credential.
    pub fn from_config(config: &GatewayConfig, credential: Credential) -> Self {
        Self {
            endpoint: config.endpoint.trim().to_string(),
            model: config.model.clone(),
            credential,
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }
}

impl CompletionTransport for OpenAiClient {
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, GatewayError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                WireMessage {
                    role: "system",
                    content: request.system,
                },
                WireMessage {
                    role: "user",
                    content: request.user,
                },
            ],
            temperature: request.temperature,
        };

        let resp = match ureq::post(&self.endpoint)
            .timeout(self.timeout)
            .set("Authorization", &self.credential.bearer())
            .send_json(&body)
        {
            Ok(resp) => resp,
            Err(ureq::Error::Status(status, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                return Err(GatewayError::Status {
                    status,
                    body: truncate(&body, 512),
                });
            }
            Err(ureq::Error::Transport(e)) => return Err(GatewayError::Transport(e.to_string())),
        };

        let text = resp
            .into_string()
            .map_err(|e| GatewayError::Transport(format!("failed to read response body: {e}")))?;

        extract_content(&text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Pull `choices[0].message.content` out of a response body.
///
/// Only a malformed envelope is an error. A null or absent content yields an
/// empty string and a non-string content yields its JSON text, so the reply
/// parser decides what to make of them.
pub fn extract_content(body: &str) -> Result<String, GatewayError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| GatewayError::Envelope(e.to_string()))?;

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::Envelope("response contained no choices".to_string()))?;

    Ok(match choice.message.content {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(text)) => text,
        Some(other) => other.to_string(),
    })
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
