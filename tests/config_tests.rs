/// Integration tests for configuration loading.
///
/// # Safety
///
/// These tests use `std::env::set_var` / `remove_var`, which are `unsafe` in
/// Rust 2024 edition. Everything that reads the environment lives in a single
/// test function, so no other thread reads the variables while they change.
use glycowise::config::{self, GlycowiseConfig};

/// Helper: set an env var (wraps the `unsafe` call).
///
/// # Safety
/// Must only be called from single-threaded test contexts.
unsafe fn set_env(key: &str, val: &str) {
    unsafe { std::env::set_var(key, val) }
}

/// Helper: remove an env var (wraps the `unsafe` call).
///
/// # Safety
/// Must only be called from single-threaded test contexts.
unsafe fn remove_env(key: &str) {
    unsafe { std::env::remove_var(key) }
}

const VARS: [&str; 6] = [
    "GLYCOWISE_ENDPOINT",
    "GLYCOWISE_MODEL",
    "GLYCOWISE_API_KEY_ENV",
    "GLYCOWISE_TIMEOUT_MS",
    "GLYCOWISE_ADDR",
    "GLYCOWISE_LOG",
];

#[test]
fn env_overrides_take_precedence() {
    unsafe {
        set_env("GLYCOWISE_ENDPOINT", "http://localhost:9999/v1/chat/completions");
        set_env("GLYCOWISE_MODEL", "local-llama");
        set_env("GLYCOWISE_API_KEY_ENV", "LOCAL_LLM_KEY");
        set_env("GLYCOWISE_TIMEOUT_MS", "1500");
        set_env("GLYCOWISE_ADDR", "0.0.0.0:8088");
        set_env("GLYCOWISE_LOG", "off");
    }

    let cfg = config::load();
    assert_eq!(cfg.gateway.endpoint, "http://localhost:9999/v1/chat/completions");
    assert_eq!(cfg.gateway.model, "local-llama");
    assert_eq!(cfg.gateway.api_key_env, "LOCAL_LLM_KEY");
    assert_eq!(cfg.gateway.timeout_ms, 1500);
    assert_eq!(cfg.server.addr, "0.0.0.0:8088");
    assert!(!cfg.logging.enabled);

    // An unparseable timeout is ignored rather than zeroing the value.
    unsafe { set_env("GLYCOWISE_TIMEOUT_MS", "soon") };
    assert_ne!(config::load().gateway.timeout_ms, 0);

    // The shown config is the resolved one and parses back.
    let shown = config::show_effective_config().unwrap();
    let parsed: GlycowiseConfig = toml::from_str(&shown).unwrap();
    assert_eq!(parsed.gateway.model, "local-llama");
    assert_eq!(parsed.server.addr, "0.0.0.0:8088");

    for var in VARS {
        unsafe { remove_env(var) };
    }
}
