//! Config hash stability.
//!
//! GREEN when:
//! - Loading the same layers twice yields the same `config_hash`.
//! - Reordering keys inside a YAML document does not change the hash.
//! - A changed value changes the hash.
//! - Splitting one document into base + overlay that merge to the same tree
//!   yields the same hash as the single document.

use rta_config::load_layered_yaml_from_strings;

const BASE_YAML: &str = r#"
analysis:
  department_order: first_seen
  validation: strict
source:
  base_url: "http://localhost:3000"
  token_env: "RTA_DASHBOARD_TOKEN"
exports:
  root: exports
"#;

const BASE_YAML_REORDERED: &str = r#"
exports:
  root: exports
source:
  token_env: "RTA_DASHBOARD_TOKEN"
  base_url: "http://localhost:3000"
analysis:
  validation: strict
  department_order: first_seen
"#;

const SPLIT_BASE: &str = r#"
analysis:
  department_order: sorted
  validation: strict
source:
  base_url: "http://localhost:3000"
  token_env: "RTA_DASHBOARD_TOKEN"
"#;

const SPLIT_OVERLAY: &str = r#"
analysis:
  department_order: first_seen
exports:
  root: exports
"#;

#[test]
fn same_input_same_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
    assert_eq!(a.canonical_json, b.canonical_json);
}

#[test]
fn key_order_does_not_matter() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML_REORDERED]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
}

#[test]
fn different_value_different_hash() {
    let changed = BASE_YAML.replace("validation: strict", "validation: permissive");
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[changed.as_str()]).unwrap();
    assert_ne!(a.config_hash, b.config_hash);
}

#[test]
fn layered_merge_matches_flat_document() {
    let flat = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let layered = load_layered_yaml_from_strings(&[SPLIT_BASE, SPLIT_OVERLAY]).unwrap();
    assert_eq!(flat.config_hash, layered.config_hash);
    assert_eq!(flat.config_json, layered.config_json);
}
