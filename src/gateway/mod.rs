/// API gateway: the single boundary to the remote chat-completion service.
///
/// Every remote call in glycowise goes through [`Gateway`]. It exposes three
/// operations:
///
/// - [`Gateway::assess_risk`]: metrics in, [`Assessment`] out. A reply that
///   cannot be parsed is answered with the glucose fallback heuristic; only
///   transport-level failures surface as errors.
/// - [`Gateway::advise_on_diet`] / [`Gateway::advise_on_exercise`]: text in,
///   text out. Transport failures become the topic's fixed apology; a reply
///   is returned verbatim whatever it contains.
///
/// # Credential
///
/// [`Gateway::from_config`] reads the bearer credential from the environment
/// variable named by `gateway.api_key_env`. A missing credential is an error
/// the binary propagates out of `main`, so nothing that needs the gateway
/// starts without it.
///
/// # Transport
///
/// The HTTP call sits behind [`CompletionTransport`]; production uses
/// [`openai::OpenAiClient`], tests substitute scripted transports.
use std::time::Instant;

use thiserror::Error;

pub mod openai;
pub mod parse;
pub mod prompts;

pub use prompts::Topic;

use crate::analytics::logger::{Operation, Outcome, RequestLog};
use crate::assessment::{Assessment, PredictionResult, ResultSource, RiskMetrics};
use crate::config::GlycowiseConfig;
use openai::{Credential, OpenAiClient};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures of a gateway call that the caller has to handle.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The credential variable is unset or empty.
    #[error("missing credential: environment variable {0} is not set")]
    MissingCredential(String),
    /// Network-level failure (DNS, connect, TLS, timeout, broken body).
    #[error("request to completion endpoint failed: {0}")]
    Transport(String),
    /// The endpoint answered with a non-2xx status.
    #[error("completion endpoint returned HTTP {status}")]
    Status { status: u16, body: String },
    /// 2xx response without `choices[0].message.content`.
    #[error("unexpected completion response: {0}")]
    Envelope(String),
}

// ---------------------------------------------------------------------------
// Transport seam
// ---------------------------------------------------------------------------

/// One completion request: a system instruction, a user message and the
/// sampling temperature.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub user: &'a str,
    pub temperature: f64,
}

/// Something that can turn a [`CompletionRequest`] into reply text.
pub trait CompletionTransport: Send + Sync {
    /// Perform the call and return `choices[0].message.content`.
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, GatewayError>;

    /// Model name, for the request log.
    fn model_name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

/// Stateless wrapper around one completion transport.
///
/// Shared immutably between flows and server threads.
pub struct Gateway {
    transport: Box<dyn CompletionTransport>,
    risk_temperature: f64,
    advice_temperature: f64,
    request_log: Option<RequestLog>,
}

impl Gateway {
    /// Wrap a transport with the default temperatures and no request log.
    pub fn new(transport: impl CompletionTransport + 'static) -> Self {
        let defaults = crate::config::schema::GatewayConfig::default();
        Self {
            transport: Box::new(transport),
            risk_temperature: defaults.risk_temperature,
            advice_temperature: defaults.advice_temperature,
            request_log: None,
        }
    }

    /// Build the production gateway from the resolved config.
    ///
    /// Fails with [`GatewayError::MissingCredential`] when the credential
    /// variable is not set.
    pub fn from_config(config: &GlycowiseConfig) -> Result<Self, GatewayError> {
        let credential = Credential::from_env(&config.gateway.api_key_env)?;
        let client = OpenAiClient::from_config(&config.gateway, credential);

        let mut gateway = Self::new(client)
            .with_temperatures(config.gateway.risk_temperature, config.gateway.advice_temperature);
        if config.logging.enabled {
            gateway.request_log = RequestLog::from_config(&config.logging);
        }
        Ok(gateway)
    }

    /// Override the sampling temperatures.
    pub fn with_temperatures(mut self, risk: f64, advice: f64) -> Self {
        self.risk_temperature = risk;
        self.advice_temperature = advice;
        self
    }

    /// Append one entry per call to the given request log.
    pub fn with_request_log(mut self, log: RequestLog) -> Self {
        self.request_log = Some(log);
        self
    }

    /// Model name of the underlying transport.
    pub fn model_name(&self) -> &str {
        self.transport.model_name()
    }

    /// Ask the remote model for a diabetes risk assessment.
    ///
    /// Returns `Err` only for transport-level failures. A reply that does
    /// not parse yields the glucose fallback with
    /// [`ResultSource::Fallback`].
    pub fn assess_risk(&self, metrics: &RiskMetrics) -> Result<Assessment, GatewayError> {
        let prompt = prompts::risk_prompt(metrics);
        let request = CompletionRequest {
            system: prompts::RISK_SYSTEM_INSTRUCTION,
            user: &prompt,
            temperature: self.risk_temperature,
        };

        let start = Instant::now();
        let reply = self.transport.complete(&request);
        let latency_ms = start.elapsed().as_millis() as u64;

        let content = match reply {
            Ok(content) => content,
            Err(e) => {
                eprintln!("risk assessment request failed: {e}");
                self.record(Operation::AssessRisk, Outcome::Error, latency_ms, Some(e.to_string()));
                return Err(e);
            }
        };

        match parse::parse_prediction(&content) {
            Ok(result) => {
                self.record(Operation::AssessRisk, Outcome::Ok, latency_ms, None);
                Ok(Assessment {
                    result,
                    source: ResultSource::Remote,
                })
            }
            Err(e) => {
                eprintln!("risk assessment reply unusable, applying glucose fallback: {e}");
                self.record(Operation::AssessRisk, Outcome::Fallback, latency_ms, Some(e.to_string()));
                Ok(Assessment {
                    result: PredictionResult::glucose_fallback(metrics.glucose),
                    source: ResultSource::Fallback,
                })
            }
        }
    }

    /// Ask the remote model a scoped question and return its reply verbatim.
    pub fn advise(&self, topic: Topic, query: &str) -> Result<String, GatewayError> {
        let request = CompletionRequest {
            system: topic.system_instruction(),
            user: query,
            temperature: self.advice_temperature,
        };

        let start = Instant::now();
        let reply = self.transport.complete(&request);
        let latency_ms = start.elapsed().as_millis() as u64;

        match &reply {
            Ok(_) => self.record(Operation::advise(topic), Outcome::Ok, latency_ms, None),
            Err(e) => {
                eprintln!("{topic} advice request failed: {e}");
                self.record(Operation::advise(topic), Outcome::Error, latency_ms, Some(e.to_string()));
            }
        }
        reply
    }

    /// Diet advice, or the diet apology if the call fails.
    pub fn advise_on_diet(&self, query: &str) -> String {
        self.advise_or_apologize(Topic::Diet, query)
    }

    /// Exercise advice, or the exercise apology if the call fails.
    pub fn advise_on_exercise(&self, query: &str) -> String {
        self.advise_or_apologize(Topic::Exercise, query)
    }

    fn advise_or_apologize(&self, topic: Topic, query: &str) -> String {
        self.advise(topic, query)
            .unwrap_or_else(|_| topic.apology().to_string())
    }

    fn record(
        &self,
        operation: Operation,
        outcome: Outcome,
        latency_ms: u64,
        error: Option<String>,
    ) {
        if let Some(log) = &self.request_log {
            log.record(
                operation,
                outcome,
                latency_ms,
                self.transport.model_name(),
                error,
            );
        }
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("model", &self.transport.model_name())
            .field("risk_temperature", &self.risk_temperature)
            .field("advice_temperature", &self.advice_temperature)
            .field("request_log", &self.request_log)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
