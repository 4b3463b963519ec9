/// Configuration system for glycowise.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::GlycowiseConfig::default()`]
/// 2. **User global config**: `~/.glycowise/config.toml`
/// 3. **Project local config**: `.glycowise.toml` in the current working directory
/// 4. **Environment variables**: `GLYCOWISE_*` overrides (highest precedence)
///
/// The credential for the completion endpoint is never stored here; the
/// config only names the environment variable it is read from.
///
/// # Usage
///
/// ```rust,ignore
/// use glycowise::config;
///
/// let cfg = config::load();
/// println!("talking to {}", cfg.gateway.endpoint);
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::GlycowiseConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved glycowise configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars.
pub fn load() -> GlycowiseConfig {
    // Layers 2 and 3: ~/.glycowise/config.toml, then .glycowise.toml
    let mut merged = toml::Value::Table(toml::Table::new());
    for path in [global_config_path(), project_config_path()] {
        if let Some(layer) = load_toml_file(path) {
            merge_config(&mut merged, layer);
        }
    }

    let mut config = merged.try_into::<GlycowiseConfig>().unwrap_or_else(|e| {
        eprintln!("ignoring config files, merged result is invalid: {e}");
        GlycowiseConfig::default()
    });

    // Layer 4: environment variable overrides
    apply_env_overrides(&mut config);

    config
}

/// Load a TOML config file from the given path (if it exists).
///
/// Returns `None` if the path is `None`, the file doesn't exist, or the
/// content does not fit the schema. A malformed file is reported on stderr
/// and skipped.
fn load_toml_file(path: Option<PathBuf>) -> Option<toml::Value> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    let parsed = toml::from_str::<toml::Value>(&content).and_then(|value| {
        value.clone().try_into::<GlycowiseConfig>()?;
        Ok(value)
    });
    match parsed {
        Ok(value) => Some(value),
        Err(e) => {
            eprintln!("ignoring malformed config {}: {e}", path.display());
            None
        }
    }
}

/// Merge a loaded config layer into the base layer, key by key.
///
/// Tables merge recursively; any other value in the overlay replaces the
/// base value. Keys the overlay does not mention keep the base value.
fn merge_config(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_config(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.glycowise/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".glycowise").join("config.toml"))
}

/// Path to the project local config: `.glycowise.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".glycowise.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

/// Expand a configured path, resolving a leading `~/` against the home
/// directory.
pub fn expand_path(raw: &str) -> Option<PathBuf> {
    match raw.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
        None => Some(PathBuf::from(raw)),
    }
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `GLYCOWISE_ENDPOINT`: completion endpoint URL
/// - `GLYCOWISE_MODEL`: model name
/// - `GLYCOWISE_API_KEY_ENV`: name of the credential variable
/// - `GLYCOWISE_TIMEOUT_MS`: transport timeout
/// - `GLYCOWISE_ADDR`: server listen address
/// - `GLYCOWISE_LOG`: request log enabled (`1`/`true`/`yes`/`on`)
fn apply_env_overrides(config: &mut GlycowiseConfig) {
    if let Ok(val) = std::env::var("GLYCOWISE_ENDPOINT")
        && !val.is_empty()
    {
        config.gateway.endpoint = val;
    }
    if let Ok(val) = std::env::var("GLYCOWISE_MODEL")
        && !val.is_empty()
    {
        config.gateway.model = val;
    }
    if let Ok(val) = std::env::var("GLYCOWISE_API_KEY_ENV")
        && !val.is_empty()
    {
        config.gateway.api_key_env = val;
    }
    if let Ok(val) = std::env::var("GLYCOWISE_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.gateway.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("GLYCOWISE_ADDR")
        && !val.is_empty()
    {
        config.server.addr = val;
    }
    if let Ok(val) = std::env::var("GLYCOWISE_LOG") {
        config.logging.enabled = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.glycowise/config.toml`.
///
/// Creates the `~/.glycowise/` directory if it doesn't exist. Returns an
/// error if the file already exists (use `force = true` to overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.glycowise/ directory")?;
    }

    fs::write(&path, GlycowiseConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Reads the current global config (or the serialized defaults), updates the
/// dotted key (e.g. `gateway.model`), and writes the result back.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let content = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&GlycowiseConfig::default())
            .context("failed to serialize default config")?
    };

    let mut value_table: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;

    set_toml_value(&mut value_table, key, value)?;

    // Reject edits that would no longer deserialize into the schema
    let output =
        toml::to_string_pretty(&value_table).context("failed to serialize updated config")?;
    toml::from_str::<GlycowiseConfig>(&output)
        .with_context(|| format!("'{value}' is not a valid value for '{key}'"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
///
/// The new value takes the type of the existing one; unknown keys are
/// rejected.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let Some((section_path, leaf)) = key.rsplit_once('.') else {
        anyhow::bail!("config key must be of the form section.key, got '{key}'");
    };

    let mut current = root;
    for part in section_path.split('.') {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current
        .as_table_mut()
        .with_context(|| format!("expected table at '{section_path}'"))?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        Some(_) => toml::Value::String(raw_value.to_string()),
        None => anyhow::bail!("config key not found: '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
