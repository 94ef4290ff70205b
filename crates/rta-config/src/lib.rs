//! rta-config
//!
//! Layered YAML configuration for the analytics tools.
//!
//! - Later layers override earlier ones (deep merge of mappings).
//! - The merged tree is rendered as canonical JSON and hashed (SHA-256) so an
//!   analysis can record exactly which configuration produced it.
//! - Secret material never lives in config: literal values that look like
//!   credentials abort the load with `CONFIG_SECRET_DETECTED`. Config holds
//!   env var NAMES; [`resolve_secrets`] reads the values.

mod consumption;
mod secrets;
mod settings;

use anyhow::{bail, Context, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

pub use consumption::{
    consumed_pointers_for_mode, report_unused_keys, ConfigMode, UnusedKeyPolicy, UnusedKeyReport,
};
pub use secrets::{resolve_secrets, ResolvedSecrets, DEFAULT_TOKEN_ENV};
pub use settings::{AnalysisSettings, DEFAULT_EXPORTS_ROOT};

/// Leaf string prefixes that mark a value as a credential.
const SECRET_PREFIXES: &[&str] = &[
    "sk-",
    "sk_live",
    "sk_test",
    "AKIA",
    "-----BEGIN",
    "ghp_",
    "gho_",
    "glpat-",
    "xoxb-",
    "xoxp-",
    "Bearer ",
    "eyJ", // JWT header
];

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

impl LoadedConfig {
    /// An empty configuration: every setting takes its default.
    pub fn empty() -> Result<Self> {
        load_layered_yaml_from_strings(&[])
    }
}

pub fn load_layered_yaml<P: AsRef<Path>>(paths: &[P]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::with_capacity(paths.len());
    for p in paths {
        let p = p.as_ref();
        let raw = fs::read_to_string(p)
            .with_context(|| format!("failed to read yaml path: {}", p.display()))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = serde_json::json!({});
    for (i, raw) in yaml_docs.iter().enumerate() {
        let v_yaml: serde_yaml::Value =
            serde_yaml::from_str(raw).with_context(|| format!("invalid yaml (layer {i})"))?;
        // An empty document parses as null; it contributes nothing.
        if v_yaml.is_null() {
            continue;
        }
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    enforce_no_secret_literals(&merged)?;

    let canonical_json = canonicalize_json(&merged)?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

/// Compact JSON with sorted object keys (serde_json's default `Map` is a
/// BTreeMap, so serialization order is key order, not insertion order).
fn canonicalize_json(v: &Value) -> Result<String> {
    serde_json::to_string(v).context("canonical json serialize failed")
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn enforce_no_secret_literals(v: &Value) -> Result<()> {
    let mut leaves = Vec::new();
    consumption::collect_leaf_pointers(v, "", &mut leaves);

    for ptr in leaves {
        if let Some(s) = v.pointer(&ptr).and_then(Value::as_str) {
            if looks_like_secret(s) {
                bail!("CONFIG_SECRET_DETECTED leaf={} value=REDACTED", ptr);
            }
        }
    }
    Ok(())
}

fn looks_like_secret(s: &str) -> bool {
    let t = s.trim_start();
    if t.trim_end().len() < 8 {
        return false;
    }
    SECRET_PREFIXES.iter().any(|p| t.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_layer_overrides_and_merges() {
        let base = "analysis:\n  department_order: first_seen\n  validation: strict\n";
        let over = "analysis:\n  validation: permissive\nexports:\n  root: out\n";
        let cfg = load_layered_yaml_from_strings(&[base, over]).unwrap();
        assert_eq!(
            cfg.config_json.pointer("/analysis/validation"),
            Some(&Value::from("permissive"))
        );
        assert_eq!(
            cfg.config_json.pointer("/analysis/department_order"),
            Some(&Value::from("first_seen"))
        );
        assert_eq!(cfg.config_json.pointer("/exports/root"), Some(&Value::from("out")));
    }

    #[test]
    fn empty_layers_hash_like_no_layers() {
        let a = load_layered_yaml_from_strings(&[]).unwrap();
        let b = load_layered_yaml_from_strings(&["", "# only a comment\n"]).unwrap();
        assert_eq!(a.canonical_json, "{}");
        assert_eq!(a.config_hash, b.config_hash);
        assert_eq!(a.config_hash.len(), 64);
    }

    #[test]
    fn short_values_are_never_secrets() {
        assert!(!looks_like_secret("sk-1"));
        assert!(looks_like_secret("Bearer abcdefgh123"));
        assert!(looks_like_secret("eyJhbGciOiJIUzI1NiJ9.e30.x"));
        assert!(!looks_like_secret("RTA_DASHBOARD_TOKEN"));
    }

    #[test]
    fn invalid_yaml_names_layer() {
        let err = load_layered_yaml_from_strings(&["a: 1", "a: [unclosed"]).unwrap_err();
        assert!(format!("{err:#}").contains("layer 1"));
    }

    #[test]
    fn missing_file_names_path() {
        let err = load_layered_yaml(&["/definitely/not/here.yaml"]).unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here.yaml"));
    }
}
