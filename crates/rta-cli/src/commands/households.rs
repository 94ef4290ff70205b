//! `rta demographics`, `rta household` and `rta summary`.
//!
//! Each prints one JSON document to stdout.

use anyhow::{Context, Result};
use rta_ingest::household_rollups::{
    dashboard_summary, demographic_breakdown, household_history, DemographicSegment,
};
use serde::Serialize;
use std::path::Path;

use super::ingest::{load_households, load_products, load_transactions};

#[derive(Serialize)]
struct DemographicsReport<'a> {
    demographics: &'a [DemographicSegment],
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize report failed")?;
    println!("{json}");
    Ok(())
}

/// Spend by income band, household size and child status.
pub fn demographics(households: &Path, transactions: &Path) -> Result<()> {
    let hh = load_households(households)?;
    let txs = load_transactions(transactions)?;

    let outcome = demographic_breakdown(&hh.records, &txs.records);
    tracing::info!(
        segments = outcome.segments.len(),
        households_without_transactions = outcome.households_without_transactions,
        unmatched_transactions = outcome.unmatched_transactions,
        "demographic breakdown complete"
    );

    print_json(&DemographicsReport {
        demographics: &outcome.segments,
    })
}

/// Every purchase line of one household.
pub fn household(id: u64, households: &Path, transactions: &Path, products: &Path) -> Result<()> {
    let hh = load_households(households)?;
    let txs = load_transactions(transactions)?;
    let prods = load_products(products)?;

    let lines = household_history(id, &hh.records, &txs.records, &prods.records);
    if lines.is_empty() {
        tracing::warn!(hshd_num = id, "no purchase lines for household");
    } else {
        tracing::info!(hshd_num = id, lines = lines.len(), "household history built");
    }

    print_json(&lines)
}

/// Headline counts for the dashboard landing page.
pub fn summary(households: &Path, transactions: &Path) -> Result<()> {
    let hh = load_households(households)?;
    let txs = load_transactions(transactions)?;

    let summary = dashboard_summary(&hh.records, &txs.records);
    tracing::info!(
        total_households = summary.total_households,
        total_transactions = summary.total_transactions,
        "dashboard summary complete"
    );

    print_json(&summary)
}
