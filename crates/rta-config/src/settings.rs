//! Typed view over the merged config tree.

use anyhow::{bail, Result};
use rta_seasonal::{AnalysisOptions, DepartmentOrder, ValidationMode};
use serde_json::Value;

pub const DEFAULT_EXPORTS_ROOT: &str = "exports";

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    pub department_order: DepartmentOrder,
    pub validation: ValidationMode,
    /// `csv` or `json`; `None` means infer from the file extension.
    pub ingest_format: Option<String>,
    pub source_base_url: Option<String>,
    /// `None` leaves the source client's own default in place.
    pub source_timeout_secs: Option<u64>,
    pub exports_root: String,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            department_order: DepartmentOrder::default(),
            validation: ValidationMode::default(),
            ingest_format: None,
            source_base_url: None,
            source_timeout_secs: None,
            exports_root: DEFAULT_EXPORTS_ROOT.to_string(),
        }
    }
}

impl AnalysisSettings {
    /// Absent keys take defaults; present keys with the wrong type or an
    /// unknown value are errors naming the pointer.
    pub fn from_config_json(config: &Value) -> Result<Self> {
        let mut s = Self::default();

        if let Some(raw) = str_at(config, "/analysis/department_order")? {
            s.department_order = match DepartmentOrder::parse(raw) {
                Some(o) => o,
                None => bail!(
                    "CONFIG_INVALID /analysis/department_order='{}': expected first_seen | sorted",
                    raw
                ),
            };
        }

        if let Some(raw) = str_at(config, "/analysis/validation")? {
            s.validation = match ValidationMode::parse(raw) {
                Some(v) => v,
                None => bail!(
                    "CONFIG_INVALID /analysis/validation='{}': expected strict | permissive",
                    raw
                ),
            };
        }

        if let Some(raw) = str_at(config, "/ingest/format")? {
            let lower = raw.trim().to_ascii_lowercase();
            if lower != "csv" && lower != "json" {
                bail!("CONFIG_INVALID /ingest/format='{}': expected csv | json", raw);
            }
            s.ingest_format = Some(lower);
        }

        s.source_base_url = str_at(config, "/source/base_url")?.map(str::to_string);

        if let Some(v) = config.pointer("/source/timeout_secs") {
            match v.as_u64() {
                Some(n) if n > 0 => s.source_timeout_secs = Some(n),
                _ => bail!(
                    "CONFIG_INVALID /source/timeout_secs={}: expected a positive integer",
                    v
                ),
            }
        }

        if let Some(raw) = str_at(config, "/exports/root")? {
            s.exports_root = raw.to_string();
        }

        Ok(s)
    }

    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            department_order: self.department_order,
            validation: self.validation,
        }
    }
}

fn str_at<'a>(config: &'a Value, pointer: &str) -> Result<Option<&'a str>> {
    match config.pointer(pointer) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim())),
        Some(other) => bail!("CONFIG_INVALID {}={}: expected a string", pointer, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_when_absent() {
        let s = AnalysisSettings::from_config_json(&json!({})).unwrap();
        assert_eq!(s, AnalysisSettings::default());
        assert_eq!(s.validation, ValidationMode::Strict);
        assert_eq!(s.department_order, DepartmentOrder::FirstSeen);
        assert_eq!(s.exports_root, "exports");
        assert_eq!(s.source_timeout_secs, None);
    }

    #[test]
    fn reads_every_key() {
        let cfg = json!({
            "analysis": {"department_order": "sorted", "validation": "permissive"},
            "ingest": {"format": "JSON"},
            "source": {"base_url": "http://dash:3000", "timeout_secs": 5},
            "exports": {"root": "/tmp/out"}
        });
        let s = AnalysisSettings::from_config_json(&cfg).unwrap();
        assert_eq!(s.department_order, DepartmentOrder::Sorted);
        assert_eq!(s.validation, ValidationMode::Permissive);
        assert_eq!(s.ingest_format.as_deref(), Some("json"));
        assert_eq!(s.source_base_url.as_deref(), Some("http://dash:3000"));
        assert_eq!(s.source_timeout_secs, Some(5));
        assert_eq!(s.exports_root, "/tmp/out");
        assert_eq!(s.analysis_options().department_order, DepartmentOrder::Sorted);
    }

    #[test]
    fn bad_values_name_the_pointer() {
        for cfg in [
            json!({"analysis": {"department_order": "random"}}),
            json!({"analysis": {"validation": 1}}),
            json!({"ingest": {"format": "xlsx"}}),
            json!({"source": {"timeout_secs": 0}}),
            json!({"source": {"timeout_secs": "30"}}),
        ] {
            let err = AnalysisSettings::from_config_json(&cfg).unwrap_err();
            assert!(err.to_string().starts_with("CONFIG_INVALID /"), "{err}");
        }
    }
}
