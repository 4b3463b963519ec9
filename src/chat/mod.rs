//! Advisory chat panels.
//!
//! A [`ChatPanel`] owns one topic's transcript. It starts with the topic
//! greeting and grows by one user/assistant pair per submission. Panels share
//! nothing; the diet and exercise panels are separate values.

use serde::{Deserialize, Serialize};

use crate::gateway::{Gateway, GatewayError, Topic};

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Advisor seam
// ---------------------------------------------------------------------------

/// Answers a free-text question on one topic.
pub trait Advisor {
    fn advise(&self, topic: Topic, text: &str) -> Result<String, GatewayError>;
}

impl Advisor for Gateway {
    fn advise(&self, topic: Topic, text: &str) -> Result<String, GatewayError> {
        Gateway::advise(self, topic, text)
    }
}

// ---------------------------------------------------------------------------
// Panel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Idle,
    Awaiting,
}

#[derive(Debug, Clone)]
pub struct ChatPanel {
    topic: Topic,
    transcript: Vec<ChatMessage>,
    state: PanelState,
}

impl ChatPanel {
    pub fn new(topic: Topic) -> Self {
        Self {
            topic,
            transcript: vec![ChatMessage::assistant(topic.greeting())],
            state: PanelState::Idle,
        }
    }

    pub fn topic(&self) -> Topic {
        self.topic
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    /// Send `text` to the advisor and append the exchange.
    ///
    /// Blank input is ignored and returns `None`. Otherwise the user message
    /// is stored as typed and the assistant reply (or the topic apology when
    /// the advisor fails) is returned.
    pub fn submit(&mut self, text: &str, advisor: &dyn Advisor) -> Option<&ChatMessage> {
        if text.trim().is_empty() || self.state == PanelState::Awaiting {
            return None;
        }

        self.transcript.push(ChatMessage::user(text));

        let reply = {
            let _busy = BusyGuard::enter(&mut self.state);
            match advisor.advise(self.topic, text) {
                Ok(reply) => reply,
                Err(e) => {
                    eprintln!("{} chat request failed: {e}", self.topic);
                    self.topic.apology().to_string()
                }
            }
        };

        self.transcript.push(ChatMessage::assistant(reply));
        self.transcript.last()
    }
}

/// Holds a panel in `Awaiting` until dropped.
struct BusyGuard<'a> {
    state: &'a mut PanelState,
}

impl<'a> BusyGuard<'a> {
    fn enter(state: &'a mut PanelState) -> Self {
        *state = PanelState::Awaiting;
        Self { state }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        *self.state = PanelState::Idle;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
