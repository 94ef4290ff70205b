//! `rta rollup` and `rta quality`.

use anyhow::{bail, Context, Result};
use rta_ingest::households::{parse_households_file, HouseholdRow};
use rta_ingest::rollup::{
    parse_products_file, parse_transactions_file, rollup_transactions, ProductRow,
    TransactionRow,
};
use rta_ingest::{build_quality_report, FileFactSource, Parsed, SeasonalFactSource, SourceFormat};
use std::path::Path;

// ---------------------------------------------------------------------------
// Raw CSV loaders (shared with the household commands)
// ---------------------------------------------------------------------------

fn warn_rejected<T>(kind: &str, parsed: &Parsed<T>) {
    for r in &parsed.rejected {
        tracing::warn!(kind, row = r.row, field = %r.field, raw = %r.raw, "row rejected");
    }
}

pub(super) fn load_transactions(path: &Path) -> Result<Parsed<TransactionRow>> {
    let parsed = parse_transactions_file(path)
        .with_context(|| format!("read transactions failed: {}", path.display()))?;
    warn_rejected("transactions", &parsed);
    Ok(parsed)
}

pub(super) fn load_products(path: &Path) -> Result<Parsed<ProductRow>> {
    let parsed = parse_products_file(path)
        .with_context(|| format!("read products failed: {}", path.display()))?;
    warn_rejected("products", &parsed);
    Ok(parsed)
}

pub(super) fn load_households(path: &Path) -> Result<Parsed<HouseholdRow>> {
    let parsed = parse_households_file(path)
        .with_context(|| format!("read households failed: {}", path.display()))?;
    warn_rejected("households", &parsed);
    Ok(parsed)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Raw transactions + products → fact CSV.
pub fn rollup(transactions: &Path, products: &Path, out: &Path) -> Result<()> {
    let txs = load_transactions(transactions)?;
    let prods = load_products(products)?;

    let outcome = rollup_transactions(&txs.records, &prods.records);
    rta_artifacts::write_facts_csv(out, &outcome.facts)?;

    tracing::info!(
        facts = outcome.facts.len(),
        out = %out.display(),
        "rollup complete"
    );

    println!("rollup_ok=true out={}", out.display());
    println!(
        "transactions_read={} transactions_rejected={} unmatched_transactions={}",
        outcome.transactions_read,
        txs.rejected.len(),
        outcome.unmatched_transactions
    );
    println!(
        "products_read={} products_rejected={}",
        prods.records.len(),
        prods.rejected.len()
    );
    println!("facts_written={}", outcome.facts.len());
    Ok(())
}

/// Print the quality report for a fact export.
pub async fn quality(input: &Path, format: Option<&str>, fail_on_issues: bool) -> Result<()> {
    let format = format.map(SourceFormat::parse).transpose()?;
    let loaded = FileFactSource::resolve(input, format)?
        .fetch_facts()
        .await
        .with_context(|| format!("load facts failed: {}", input.display()))?;

    let report = build_quality_report(&loaded.records, &loaded.rejected);
    println!("{report}");
    println!("quality_clean={}", report.is_clean());

    if fail_on_issues && !report.is_clean() {
        bail!(
            "QUALITY_ISSUES: {} duplicate key(s), {} season mismatch(es), {} out-of-range month(s), {} rejected row(s)",
            report.duplicates.len(),
            report.season_mismatches.len(),
            report.out_of_range_months.len(),
            report.rejected_rows.len()
        );
    }
    Ok(())
}
