//! Secrets never live in config.
//!
//! GREEN when:
//! - A literal token value anywhere in the merged tree fails the load with
//!   CONFIG_SECRET_DETECTED, and the message does not echo the value.
//! - A config that names the env var (`token_env`) loads, and the canonical
//!   JSON carries only the name.
//! - `resolve_secrets` in REMOTE mode fails on an explicitly named but unset
//!   variable, naming the variable and never a value.
//! - `Debug` of the resolved secrets is redacted.

use rta_config::{load_layered_yaml_from_strings, resolve_secrets, ConfigMode};

const YAML_WITH_SECRET: &str = r#"
source:
  base_url: "http://localhost:3000"
  token: "eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiJkYXNoIn0.sig"
"#;

const YAML_WITH_ENV_NAME: &str = r#"
source:
  base_url: "http://localhost:3000"
  token_env: "RTA_SCENARIO_SENTINEL_TOKEN_UNSET_7F3A"
"#;

#[test]
fn literal_secret_is_rejected() {
    let err = load_layered_yaml_from_strings(&[YAML_WITH_SECRET]).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("CONFIG_SECRET_DETECTED"), "{msg}");
    assert!(msg.contains("/source/token"), "{msg}");
    assert!(!msg.contains("eyJhbGci"), "secret value leaked: {msg}");
}

#[test]
fn secret_in_overlay_is_rejected_too() {
    let overlay = "source:\n  token_env: \"sk-live-abcdefgh12345\"\n";
    let err = load_layered_yaml_from_strings(&[YAML_WITH_ENV_NAME, overlay]).unwrap_err();
    assert!(err.to_string().contains("CONFIG_SECRET_DETECTED"));
}

#[test]
fn env_name_is_accepted_and_hashed_as_name() {
    let loaded = load_layered_yaml_from_strings(&[YAML_WITH_ENV_NAME]).unwrap();
    assert!(loaded
        .canonical_json
        .contains("RTA_SCENARIO_SENTINEL_TOKEN_UNSET_7F3A"));
}

#[test]
fn remote_mode_requires_named_token() {
    let loaded = load_layered_yaml_from_strings(&[YAML_WITH_ENV_NAME]).unwrap();

    let offline = resolve_secrets(&loaded.config_json, ConfigMode::Offline).unwrap();
    assert!(offline.dashboard_token.is_none());

    let err = resolve_secrets(&loaded.config_json, ConfigMode::Remote).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("SECRETS_MISSING mode=REMOTE"), "{msg}");
    assert!(msg.contains("RTA_SCENARIO_SENTINEL_TOKEN_UNSET_7F3A"), "{msg}");
}
