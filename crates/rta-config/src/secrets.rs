//! Runtime secret resolution.
//!
//! Config stores only the env var NAME of the dashboard bearer token
//! (`/source/token_env`). Callers resolve once at startup and pass the
//! result into source constructors. Errors mention the variable name, never
//! its value, and `Debug` redacts.

use anyhow::{bail, Result};
use serde_json::Value;

use crate::consumption::ConfigMode;

pub const DEFAULT_TOKEN_ENV: &str = "RTA_DASHBOARD_TOKEN";

#[derive(Clone, Default)]
pub struct ResolvedSecrets {
    /// Env var the token was read from.
    pub token_env: String,
    /// `None` when the variable is unset or blank.
    pub dashboard_token: Option<String>,
}

impl std::fmt::Debug for ResolvedSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSecrets")
            .field("token_env", &self.token_env)
            .field(
                "dashboard_token",
                &self.dashboard_token.as_ref().map(|_| "<REDACTED>"),
            )
            .finish()
    }
}

fn resolve_env(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Resolve the dashboard token for `mode`.
///
/// | Mode    | `/source/token_env` set | Token required |
/// |---------|-------------------------|----------------|
/// | OFFLINE | any                     | no             |
/// | REMOTE  | no (default name used)  | no             |
/// | REMOTE  | yes                     | yes            |
///
/// An explicitly configured variable that is missing is an error in REMOTE
/// mode: the operator asked for authentication and would otherwise get an
/// anonymous request. A `token_env` that is not a string is rejected in any
/// mode rather than read as unset.
pub fn resolve_secrets(config_json: &Value, mode: ConfigMode) -> Result<ResolvedSecrets> {
    let configured = match config_json.pointer("/source/token_env") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.trim()).filter(|s| !s.is_empty()),
        Some(other) => bail!(
            "CONFIG_INVALID /source/token_env={}: expected a string",
            other
        ),
    };

    let token_env = configured.unwrap_or(DEFAULT_TOKEN_ENV).to_string();
    let dashboard_token = resolve_env(&token_env);

    if mode == ConfigMode::Remote && configured.is_some() && dashboard_token.is_none() {
        bail!(
            "SECRETS_MISSING mode={}: required env var '{}' (dashboard token) is not set or empty",
            mode.as_str(),
            token_env
        );
    }

    Ok(ResolvedSecrets {
        token_env,
        dashboard_token,
    })
}
