//! Raw transactions + products → seasonal facts.
//!
//! Mirrors the dashboard's seasonal query: transactions are inner-joined to
//! products on `product_num` and grouped by (calendar month of the purchase
//! date, department):
//!
//! ```text
//! total_spend       = Σ spend
//! basket_count      = COUNT(DISTINCT basket_num)
//! transaction_count = COUNT(*)
//! avg_spend         = total_spend / transaction_count
//! season            = season_of(month)
//! ```
//!
//! Output is ordered by `(month, department)`. Transactions whose product is
//! unknown are dropped and counted.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use csv::StringRecord;
use rta_seasonal::{season_of, RawSeasonalFact};
use serde::{Deserialize, Serialize};

use crate::ingest_csv::{
    cell, cell_at, column, line_of, parse_field, read_header, reader, require_column,
    ColumnIndex, CsvIngestError,
};
use crate::{Parsed, RejectedRow};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    pub hshd_num: u64,
    pub basket_num: u64,
    pub purchase_date: NaiveDate,
    pub product_num: u64,
    pub spend: f64,
    /// Negative for returns. `0` when the export has no units column.
    pub units: i64,
    pub store_region: String,
    pub week_num: Option<u32>,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRow {
    pub product_num: u64,
    pub department: String,
    /// Empty when the catalogue has no commodity column.
    pub commodity: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RollupOutcome {
    pub facts: Vec<RawSeasonalFact>,
    pub transactions_read: usize,
    /// Transactions dropped because their product has no catalogue entry.
    pub unmatched_transactions: usize,
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%d-%b-%y"];

/// Parse `YYYY-MM-DD`, `MM/DD/YYYY` or `DD-MON-YY` (`01-JAN-18`).
pub fn parse_purchase_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

// ---------------------------------------------------------------------------
// CSV parsers
// ---------------------------------------------------------------------------

const TRANSACTION_COLUMNS: [&str; 4] = ["hshd_num", "basket_num", "product_num", "spend"];
// The 84.51 extracts abbreviate these to `PURCHASE_` and `STORE_R`.
const DATE_COLUMNS: [&str; 2] = ["purchase_date", "purchase_"];
const REGION_COLUMNS: [&str; 2] = ["store_region", "store_r"];

/// Positions of the optional transaction columns.
struct TransactionExtras {
    date: usize,
    units: Option<usize>,
    store_region: Option<usize>,
    week_num: Option<usize>,
    year: Option<usize>,
}

pub fn parse_transactions_str(src: &str) -> Result<Parsed<TransactionRow>, CsvIngestError> {
    let mut rdr = reader(src);
    let Some(cols) = read_header(&mut rdr, &TRANSACTION_COLUMNS)? else {
        return Ok(Parsed::default());
    };
    let extras = TransactionExtras {
        date: require_column(&cols, &DATE_COLUMNS)?,
        units: column(&cols, &["units"]),
        store_region: column(&cols, &REGION_COLUMNS),
        week_num: column(&cols, &["week_num"]),
        year: column(&cols, &["year"]),
    };

    collect_rows(&mut rdr, |rec| transaction_from_record(rec, &cols, &extras))
}

pub fn parse_products_str(src: &str) -> Result<Parsed<ProductRow>, CsvIngestError> {
    let mut rdr = reader(src);
    let Some(cols) = read_header(&mut rdr, &["product_num", "department"])? else {
        return Ok(Parsed::default());
    };
    let commodity = column(&cols, &["commodity"]);
    collect_rows(&mut rdr, |rec| {
        Ok(ProductRow {
            product_num: parse_field(rec, &cols, "product_num")?,
            department: cell(rec, &cols, "department").to_string(),
            commodity: cell_at(rec, commodity).to_string(),
        })
    })
}

pub fn parse_transactions_file(path: &Path) -> Result<Parsed<TransactionRow>, CsvIngestError> {
    parse_transactions_str(&read(path)?)
}

pub fn parse_products_file(path: &Path) -> Result<Parsed<ProductRow>, CsvIngestError> {
    parse_products_str(&read(path)?)
}

pub(crate) fn read(path: &Path) -> Result<String, CsvIngestError> {
    std::fs::read_to_string(path)
        .map_err(|e| CsvIngestError::Io(format!("read '{}': {e}", path.display())))
}

fn transaction_from_record(
    rec: &StringRecord,
    cols: &ColumnIndex,
    extras: &TransactionExtras,
) -> Result<TransactionRow, (&'static str, String)> {
    let raw_date = cell_at(rec, Some(extras.date));
    let purchase_date =
        parse_purchase_date(raw_date).ok_or_else(|| ("purchase_date", raw_date.to_string()))?;
    Ok(TransactionRow {
        hshd_num: parse_field(rec, cols, "hshd_num")?,
        basket_num: parse_field(rec, cols, "basket_num")?,
        purchase_date,
        product_num: parse_field(rec, cols, "product_num")?,
        spend: parse_field(rec, cols, "spend")?,
        units: optional_field(rec, extras.units, "units")?.unwrap_or(0),
        store_region: cell_at(rec, extras.store_region).to_string(),
        week_num: optional_field(rec, extras.week_num, "week_num")?,
        year: optional_field(rec, extras.year, "year")?,
    })
}

/// Blank or absent reads as `None`; anything else must parse.
pub(crate) fn optional_field<T: std::str::FromStr>(
    rec: &StringRecord,
    idx: Option<usize>,
    name: &'static str,
) -> Result<Option<T>, (&'static str, String)> {
    match cell_at(rec, idx) {
        "" => Ok(None),
        raw => raw.parse::<T>().map(Some).map_err(|_| (name, raw.to_string())),
    }
}

pub(crate) fn collect_rows<T>(
    rdr: &mut csv::Reader<&[u8]>,
    mut convert: impl FnMut(&StringRecord) -> Result<T, (&'static str, String)>,
) -> Result<Parsed<T>, CsvIngestError> {
    let mut out = Parsed::default();
    for (i, rec) in rdr.records().enumerate() {
        let rec = rec.map_err(|e| CsvIngestError::Io(e.to_string()))?;
        match convert(&rec) {
            Ok(row) => out.records.push(row),
            Err((field, raw)) => out.rejected.push(RejectedRow {
                row: line_of(&rec, i),
                field: field.to_string(),
                raw,
            }),
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Rollup
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Bucket {
    total_spend: f64,
    baskets: BTreeSet<u64>,
    transactions: u64,
}

/// Join and group. When a product number repeats in `products`, the first
/// entry wins.
pub fn rollup_transactions(
    transactions: &[TransactionRow],
    products: &[ProductRow],
) -> RollupOutcome {
    let mut catalogue: HashMap<u64, &str> = HashMap::with_capacity(products.len());
    for p in products {
        catalogue
            .entry(p.product_num)
            .or_insert(p.department.as_str());
    }

    let mut buckets: BTreeMap<(u8, &str), Bucket> = BTreeMap::new();
    let mut unmatched = 0usize;

    for t in transactions {
        let Some(&department) = catalogue.get(&t.product_num) else {
            unmatched += 1;
            continue;
        };
        // chrono months are 1..=12, so the cast is lossless.
        let month = t.purchase_date.month() as u8;
        let b = buckets.entry((month, department)).or_default();
        b.total_spend += t.spend;
        b.baskets.insert(t.basket_num);
        b.transactions += 1;
    }

    if unmatched > 0 {
        tracing::warn!(unmatched, "transactions without a catalogued product dropped");
    }

    let facts = buckets
        .into_iter()
        .map(|((month, department), b)| RawSeasonalFact {
            month,
            department: department.to_string(),
            total_spend: b.total_spend,
            basket_count: b.baskets.len() as u64,
            transaction_count: b.transactions,
            avg_spend: b.total_spend / b.transactions as f64,
            season: season_of(month),
        })
        .collect();

    RollupOutcome {
        facts,
        transactions_read: transactions.len(),
        unmatched_transactions: unmatched,
    }
}
