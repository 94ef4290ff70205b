//! CSV ingestion for seasonal fact exports.
//!
//! Read side only: converts CSV text into [`RawSeasonalFact`] values. It does
//! **not** validate the input contract (month range, blank departments,
//! negative spend); that is `rta_seasonal::validate_facts`' job, so every
//! source is held to the same rules.
//!
//! ## CSV column contract (order-independent)
//!
//! Header names are matched case-insensitively with underscores and spaces
//! ignored, so `Total_Spend`, `total_spend` and `totalSpend` are the same
//! column.
//!
//! | Column              | Type / example | Notes                          |
//! |---------------------|----------------|--------------------------------|
//! | `month`             | `12`           | Integer 0..=255 (range checked later) |
//! | `department`        | `GROCERY`      |                                |
//! | `total_spend`       | `1834.27`      | Decimal                        |
//! | `basket_count`      | `88`           | Integer ≥ 0                    |
//! | `transaction_count` | `240`          | Integer ≥ 0                    |
//! | `avg_spend`         | `7.64`         | Optional; defaults to `0`      |
//! | `season`            | `Winter`       | See [`Season::parse`]          |

use std::collections::HashMap;
use std::fmt;

use csv::StringRecord;
use rta_seasonal::{RawSeasonalFact, Season};

use crate::{LoadedFacts, RejectedRow};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Structural errors. Row-level problems are reported as [`RejectedRow`]s.
#[derive(Debug)]
pub enum CsvIngestError {
    /// An I/O or CSV-library error.
    Io(String),
    /// The header row is missing a required column.
    MissingHeader(String),
}

impl fmt::Display for CsvIngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsvIngestError::Io(msg) => write!(f, "csv io error: {msg}"),
            CsvIngestError::MissingHeader(col) => {
                write!(f, "csv missing required header column: '{col}'")
            }
        }
    }
}

impl std::error::Error for CsvIngestError {}

const REQUIRED: [&str; 6] = [
    "month",
    "department",
    "total_spend",
    "basket_count",
    "transaction_count",
    "season",
];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse fact CSV from a string slice.
///
/// Empty input (no header) yields no facts. Rows with unparseable fields are
/// rejected and recorded; only I/O and header problems return `Err`.
pub fn parse_csv_str(src: &str) -> Result<LoadedFacts, CsvIngestError> {
    let mut rdr = reader(src);
    let Some(cols) = read_header(&mut rdr, &REQUIRED)? else {
        return Ok(LoadedFacts::default());
    };
    let avg_col = cols.get(&normalize_header("avg_spend")).copied();

    let mut out = LoadedFacts::default();
    for (i, rec) in rdr.records().enumerate() {
        let rec = rec.map_err(|e| CsvIngestError::Io(e.to_string()))?;
        let row = line_of(&rec, i);

        match fact_from_record(&rec, &cols, avg_col) {
            Ok(fact) => out.records.push(fact),
            Err((field, raw)) => {
                tracing::debug!(row, field, raw = %raw, "fact row rejected");
                out.rejected.push(RejectedRow {
                    row,
                    field: field.to_string(),
                    raw,
                });
            }
        }
    }

    Ok(out)
}

fn fact_from_record(
    rec: &StringRecord,
    cols: &ColumnIndex,
    avg_col: Option<usize>,
) -> Result<RawSeasonalFact, (&'static str, String)> {
    let month = parse_field::<u8>(rec, cols, "month")?;
    let department = cell(rec, cols, "department").to_string();
    let total_spend = parse_field::<f64>(rec, cols, "total_spend")?;
    let basket_count = parse_field::<u64>(rec, cols, "basket_count")?;
    let transaction_count = parse_field::<u64>(rec, cols, "transaction_count")?;

    let avg_spend = match avg_col.and_then(|i| rec.get(i)).map(str::trim) {
        None | Some("") => 0.0,
        Some(raw) => raw
            .parse::<f64>()
            .map_err(|_| ("avg_spend", raw.to_string()))?,
    };

    let season_raw = cell(rec, cols, "season");
    let season = Season::parse(season_raw).map_err(|_| ("season", season_raw.to_string()))?;

    Ok(RawSeasonalFact {
        month,
        department,
        total_spend,
        basket_count,
        transaction_count,
        avg_spend,
        season,
    })
}

// ---------------------------------------------------------------------------
// Shared helpers (also used by the rollup parsers)
// ---------------------------------------------------------------------------

/// Normalised header name → column position.
pub(crate) type ColumnIndex = HashMap<String, usize>;

pub(crate) fn reader(src: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(src.as_bytes())
}

/// Lower-case and drop `_`, `-` and spaces: `Total_Spend` → `totalspend`.
pub(crate) fn normalize_header(name: &str) -> String {
    name.trim()
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Read the header row and check `required` columns are present.
///
/// `Ok(None)` when the input has no header row at all.
pub(crate) fn read_header(
    rdr: &mut csv::Reader<&[u8]>,
    required: &[&str],
) -> Result<Option<ColumnIndex>, CsvIngestError> {
    let headers = rdr
        .headers()
        .map_err(|e| CsvIngestError::Io(e.to_string()))?;
    if headers.is_empty() {
        return Ok(None);
    }

    let mut idx = ColumnIndex::new();
    for (i, col) in headers.iter().enumerate() {
        idx.entry(normalize_header(col)).or_insert(i);
    }

    for req in required {
        if !idx.contains_key(&normalize_header(req)) {
            return Err(CsvIngestError::MissingHeader(req.to_string()));
        }
    }

    Ok(Some(idx))
}

/// Trimmed cell for a required column; missing trailing cells read as `""`.
pub(crate) fn cell<'r>(rec: &'r StringRecord, cols: &ColumnIndex, name: &str) -> &'r str {
    cols.get(&normalize_header(name))
        .and_then(|&i| rec.get(i))
        .map(str::trim)
        .unwrap_or("")
}

/// Position of the first alias present in the header.
pub(crate) fn column(cols: &ColumnIndex, aliases: &[&str]) -> Option<usize> {
    aliases
        .iter()
        .find_map(|a| cols.get(&normalize_header(a)).copied())
}

/// Like [`column`], but a header with none of the aliases is an error naming
/// the first one.
pub(crate) fn require_column(
    cols: &ColumnIndex,
    aliases: &[&str],
) -> Result<usize, CsvIngestError> {
    column(cols, aliases).ok_or_else(|| {
        CsvIngestError::MissingHeader(aliases.first().copied().unwrap_or_default().to_string())
    })
}

/// Trimmed cell at an optional position; absent columns read as `""`.
pub(crate) fn cell_at(rec: &StringRecord, idx: Option<usize>) -> &str {
    idx.and_then(|i| rec.get(i)).map(str::trim).unwrap_or("")
}

pub(crate) fn parse_field<T: std::str::FromStr>(
    rec: &StringRecord,
    cols: &ColumnIndex,
    name: &'static str,
) -> Result<T, (&'static str, String)> {
    let raw = cell(rec, cols, name);
    raw.parse::<T>().map_err(|_| (name, raw.to_string()))
}

/// 1-based source line of a record; falls back to `index + 2` (header = 1).
pub(crate) fn line_of(rec: &StringRecord, index: usize) -> u64 {
    rec.position()
        .map(|p| p.line())
        .unwrap_or(index as u64 + 2)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
