//! rta-ingest
//!
//! Boundary crate that turns exports and API payloads into
//! [`RawSeasonalFact`] values for the aggregation engine.
//!
//! - `ingest_csv` / `ingest_json`: file and in-memory parsers
//! - `source`: pluggable async fact sources (local file, dashboard API)
//! - `rollup`: raw transactions + products → month×department facts
//! - `households` / `household_rollups`: household demographics CSV and the
//!   demographic, drill-down and summary views built on it
//! - `quality`: deterministic data-quality report over a fact batch
//!
//! Nothing here aggregates seasons; callers hand the facts to `rta-seasonal`.

pub mod household_rollups;
pub mod households;
pub mod ingest_csv;
pub mod ingest_json;
pub mod quality;
pub mod rollup;
pub mod source;

use std::path::Path;

use anyhow::{anyhow, Result};
use rta_seasonal::RawSeasonalFact;
use serde::{Deserialize, Serialize};

pub use quality::{build_quality_report, FactQualityReport};
pub use source::{DashboardApiSource, FileFactSource, SeasonalFactSource, SourceError};

/// On-disk encodings accepted for fact exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    Json,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Csv => "csv",
            SourceFormat::Json => "json",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "json" => Ok(SourceFormat::Json),
            other => Err(anyhow!(
                "invalid format '{}'. expected one of: csv | json",
                other
            )),
        }
    }

    /// Infer from the file extension (`.csv`, `.json`), case-insensitive.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(SourceFormat::Csv),
            "json" => Some(SourceFormat::Json),
            _ => None,
        }
    }
}

/// A row a parser could not turn into a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRow {
    /// 1-based line (CSV) or 1-based element position (JSON array).
    pub row: u64,
    pub field: String,
    pub raw: String,
}

/// Parser output: accepted records plus the rows that were rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub records: Vec<T>,
    pub rejected: Vec<RejectedRow>,
}

impl<T> Default for Parsed<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

impl<T> Parsed<T> {
    pub fn rows_read(&self) -> usize {
        self.records.len() + self.rejected.len()
    }
}

pub type LoadedFacts = Parsed<RawSeasonalFact>;
