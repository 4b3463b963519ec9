/// Configuration schema and defaults for glycowise.
///
/// Defines the TOML-serializable configuration structure with the sections
/// `[gateway]`, `[server]` and `[logging]`.
///
/// Every field has a built-in default, so a config file only needs the
/// values it wants to override.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level glycowise configuration.
///
/// Maps directly to `~/.glycowise/config.toml` and `.glycowise.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlycowiseConfig {
    pub gateway: GatewayConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [gateway]
// ---------------------------------------------------------------------------

/// Remote chat-completion endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Full URL of the chat-completions endpoint.
    pub endpoint: String,
    /// Model name sent with every request.
    pub model: String,
    /// Name of the environment variable holding the bearer credential.
    pub api_key_env: String,
    /// Sampling temperature for risk assessments.
    pub risk_temperature: f64,
    /// Sampling temperature for diet/exercise advice.
    pub advice_temperature: f64,
    /// Transport timeout for a single request (milliseconds).
    pub timeout_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            risk_temperature: 0.3,
            advice_temperature: 0.5,
            timeout_ms: 30_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// Settings for `glycowise serve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address.
    pub addr: String,
    /// Open the UI in the default browser after the server starts.
    pub open_browser: bool,
    /// Request handler threads. Zero is treated as one.
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:3000".to_string(),
            open_browser: false,
            workers: 8,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Request log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether gateway calls are appended to the request log.
    pub enabled: bool,
    /// Request log path. A leading `~/` is expanded to the home directory.
    pub path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.glycowise/request-log.jsonl".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl GlycowiseConfig {
    /// Generate the annotated default TOML config file content.
    ///
    /// Used by `glycowise config init`.
    pub fn default_toml() -> String {
        r#"# glycowise Configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (GLYCOWISE_*)
#   2. Project config (.glycowise.toml in current directory)
#   3. User global config (~/.glycowise/config.toml)
#   4. Built-in defaults

[gateway]
endpoint = "https://api.openai.com/v1/chat/completions"
model = "gpt-3.5-turbo"
api_key_env = "OPENAI_API_KEY"     # The credential itself never goes in this file
risk_temperature = 0.3
advice_temperature = 0.5
timeout_ms = 30000

[server]
addr = "127.0.0.1:3000"
open_browser = false
workers = 8                        # Requests beyond this many wait their turn

[logging]
enabled = true
path = "~/.glycowise/request-log.jsonl"
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
