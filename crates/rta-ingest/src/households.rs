//! Household demographics CSV.
//!
//! Accepts both the database column names (`Loyalty_flag`, `Marital_status`,
//! `Hshd_size`, ...) and the abbreviated 84.51 extract headers (`L`,
//! `MARITAL`, `HH_SIZE`, ...). Only `hshd_num`, `income_range`, the size
//! column and `children` are required; the remaining descriptors read as
//! empty strings when absent.
//!
//! Size and children counts are `None` for blank or `null` cells. The
//! open-ended top bucket (`5+`, `3+`) reads as its lower bound.

use std::path::Path;

use csv::StringRecord;
use serde::{Deserialize, Serialize};

use crate::ingest_csv::{
    cell, cell_at, column, parse_field, read_header, reader, require_column, ColumnIndex,
    CsvIngestError,
};
use crate::rollup::{collect_rows, read};
use crate::Parsed;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseholdRow {
    pub hshd_num: u64,
    pub loyalty_flag: String,
    pub age_range: String,
    pub marital_status: String,
    pub income_range: String,
    pub homeowner_desc: String,
    pub hshd_composition: String,
    pub hshd_size: Option<u32>,
    pub children: Option<u32>,
}

// ---------------------------------------------------------------------------
// Segments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChildStatus {
    #[serde(rename = "No Children")]
    NoChildren,
    #[serde(rename = "With Children")]
    WithChildren,
}

impl ChildStatus {
    /// Unknown counts fall in `NoChildren`.
    pub fn of(children: Option<u32>) -> Self {
        match children {
            Some(n) if n > 0 => ChildStatus::WithChildren,
            _ => ChildStatus::NoChildren,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChildStatus::NoChildren => "No Children",
            ChildStatus::WithChildren => "With Children",
        }
    }
}

/// Income bands in reporting order.
pub const INCOME_BANDS: [&str; 6] = [
    "UNDER 35K",
    "35-49K",
    "50-74K",
    "75-99K",
    "100-150K",
    "150K+",
];

/// 1-based position in [`INCOME_BANDS`]; `None` for anything else.
pub fn income_band_rank(income_range: &str) -> Option<u8> {
    let raw = income_range.trim();
    INCOME_BANDS
        .iter()
        .position(|b| b.eq_ignore_ascii_case(raw))
        .map(|i| i as u8 + 1)
}

// ---------------------------------------------------------------------------
// CSV parser
// ---------------------------------------------------------------------------

const SIZE_COLUMNS: [&str; 2] = ["hshd_size", "hh_size"];

struct DescriptorColumns {
    size: usize,
    loyalty_flag: Option<usize>,
    age_range: Option<usize>,
    marital_status: Option<usize>,
    homeowner_desc: Option<usize>,
    hshd_composition: Option<usize>,
}

pub fn parse_households_str(src: &str) -> Result<Parsed<HouseholdRow>, CsvIngestError> {
    let mut rdr = reader(src);
    let Some(cols) = read_header(&mut rdr, &["hshd_num", "income_range", "children"])? else {
        return Ok(Parsed::default());
    };
    let desc = DescriptorColumns {
        size: require_column(&cols, &SIZE_COLUMNS)?,
        loyalty_flag: column(&cols, &["loyalty_flag", "l"]),
        age_range: column(&cols, &["age_range"]),
        marital_status: column(&cols, &["marital_status", "marital"]),
        homeowner_desc: column(&cols, &["homeowner_desc", "homeowner"]),
        hshd_composition: column(&cols, &["hshd_composition"]),
    };

    collect_rows(&mut rdr, |rec| household_from_record(rec, &cols, &desc))
}

pub fn parse_households_file(path: &Path) -> Result<Parsed<HouseholdRow>, CsvIngestError> {
    parse_households_str(&read(path)?)
}

fn household_from_record(
    rec: &StringRecord,
    cols: &ColumnIndex,
    desc: &DescriptorColumns,
) -> Result<HouseholdRow, (&'static str, String)> {
    Ok(HouseholdRow {
        hshd_num: parse_field(rec, cols, "hshd_num")?,
        loyalty_flag: cell_at(rec, desc.loyalty_flag).to_string(),
        age_range: cell_at(rec, desc.age_range).to_string(),
        marital_status: cell_at(rec, desc.marital_status).to_string(),
        income_range: cell(rec, cols, "income_range").to_string(),
        homeowner_desc: cell_at(rec, desc.homeowner_desc).to_string(),
        hshd_composition: cell_at(rec, desc.hshd_composition).to_string(),
        hshd_size: parse_count(cell_at(rec, Some(desc.size)), "hshd_size")?,
        children: parse_count(cell(rec, cols, "children"), "children")?,
    })
}

fn parse_count(raw: &str, field: &'static str) -> Result<Option<u32>, (&'static str, String)> {
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") {
        return Ok(None);
    }
    raw.strip_suffix('+')
        .unwrap_or(raw)
        .trim()
        .parse::<u32>()
        .map(Some)
        .map_err(|_| (field, raw.to_string()))
}
