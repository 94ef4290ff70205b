//! Data-quality report for a batch of seasonal facts.
//!
//! Accepts the parsed facts plus the parser's rejected rows and produces a
//! [`FactQualityReport`] covering:
//! - total fact count and distinct departments
//! - months covered / missing out of 1..=12
//! - duplicate `(month, department)` keys
//! - season labels that disagree with the calendar season of the month
//! - months outside 1..=12
//! - facts with zero transactions
//! - rejected rows carried through from ingest
//!
//! Everything is ordered deterministically (BTreeMap iteration or input
//! order), independent of how the facts arrived.
//!
//! This module does **not** reject or repair facts; it only reports.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rta_seasonal::{calendar, try_season_of, RawSeasonalFact, Season};
use serde::Serialize;

use crate::RejectedRow;

// ---------------------------------------------------------------------------
// Issue types
// ---------------------------------------------------------------------------

/// A `(month, department)` key that appears more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateIssue {
    pub month: u8,
    pub department: String,
    /// Always >= 2.
    pub count: usize,
}

/// A fact whose `season` label is not the calendar season of its month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeasonMismatch {
    /// Position in the input slice.
    pub index: usize,
    pub month: u8,
    pub department: String,
    pub labelled: Season,
    pub expected: Season,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactQualityReport {
    pub total_facts: usize,
    pub distinct_departments: usize,
    /// Ascending.
    pub months_covered: Vec<u8>,
    /// Ascending; months in 1..=12 with no fact at all.
    pub months_missing: Vec<u8>,
    /// Sorted by `(month, department)`.
    pub duplicates: Vec<DuplicateIssue>,
    /// Input order.
    pub season_mismatches: Vec<SeasonMismatch>,
    /// Input indices of facts with a month outside 1..=12.
    pub out_of_range_months: Vec<usize>,
    /// Input indices of facts with `transaction_count == 0`.
    pub zero_transaction_facts: Vec<usize>,
    pub rejected_rows: Vec<RejectedRow>,
}

impl FactQualityReport {
    /// No issue of any kind. Missing months and zero-transaction facts are
    /// legitimate gaps in the data, not defects, and do not count.
    pub fn is_clean(&self) -> bool {
        self.duplicates.is_empty()
            && self.season_mismatches.is_empty()
            && self.out_of_range_months.is_empty()
            && self.rejected_rows.is_empty()
    }
}

impl fmt::Display for FactQualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FactQualityReport {{")?;
        writeln!(f, "  total_facts: {}", self.total_facts)?;
        writeln!(f, "  distinct_departments: {}", self.distinct_departments)?;
        writeln!(f, "  months_covered: {}", join(&self.months_covered))?;
        writeln!(f, "  months_missing: {}", join(&self.months_missing))?;
        writeln!(f, "  duplicates: {}", self.duplicates.len())?;
        for d in &self.duplicates {
            writeln!(
                f,
                "    key=({}, {}) count={}",
                d.month, d.department, d.count
            )?;
        }
        writeln!(f, "  season_mismatches: {}", self.season_mismatches.len())?;
        for m in &self.season_mismatches {
            writeln!(
                f,
                "    fact[{}] month={} department={} labelled={} expected={}",
                m.index, m.month, m.department, m.labelled, m.expected
            )?;
        }
        writeln!(
            f,
            "  out_of_range_months: {}",
            self.out_of_range_months.len()
        )?;
        writeln!(
            f,
            "  zero_transaction_facts: {}",
            self.zero_transaction_facts.len()
        )?;
        writeln!(f, "  rejected_rows: {}", self.rejected_rows.len())?;
        for r in &self.rejected_rows {
            writeln!(f, "    row={} field={} raw={:?}", r.row, r.field, r.raw)?;
        }
        write!(f, "}}")
    }
}

fn join(months: &[u8]) -> String {
    if months.is_empty() {
        return "none".to_string();
    }
    months
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

pub fn build_quality_report(facts: &[RawSeasonalFact], rejected: &[RejectedRow]) -> FactQualityReport {
    let departments: BTreeSet<&str> = facts.iter().map(|f| f.department.as_str()).collect();

    let covered: BTreeSet<u8> = facts
        .iter()
        .map(|f| f.month)
        .filter(|m| calendar::is_valid_month(*m))
        .collect();
    let months_missing: Vec<u8> = calendar::MONTHS.filter(|m| !covered.contains(m)).collect();

    let mut key_counts: BTreeMap<(u8, &str), usize> = BTreeMap::new();
    for f in facts {
        *key_counts
            .entry((f.month, f.department.as_str()))
            .or_insert(0) += 1;
    }
    let duplicates = key_counts
        .into_iter()
        .filter(|(_, count)| *count >= 2)
        .map(|((month, department), count)| DuplicateIssue {
            month,
            department: department.to_string(),
            count,
        })
        .collect();

    let mut season_mismatches = Vec::new();
    let mut out_of_range_months = Vec::new();
    let mut zero_transaction_facts = Vec::new();

    for (index, f) in facts.iter().enumerate() {
        match try_season_of(f.month) {
            Some(expected) if expected != f.season => season_mismatches.push(SeasonMismatch {
                index,
                month: f.month,
                department: f.department.clone(),
                labelled: f.season,
                expected,
            }),
            Some(_) => {}
            None => out_of_range_months.push(index),
        }
        if f.transaction_count == 0 {
            zero_transaction_facts.push(index);
        }
    }

    FactQualityReport {
        total_facts: facts.len(),
        distinct_departments: departments.len(),
        months_covered: covered.into_iter().collect(),
        months_missing,
        duplicates,
        season_mismatches,
        out_of_range_months,
        zero_transaction_facts,
        rejected_rows: rejected.to_vec(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
