//! Household-level views over households + transactions (+ products).
//!
//! - [`demographic_breakdown`]: spend by income band × household size × child
//!   status. Households are inner-joined to their transactions, so a household
//!   with no transactions is not in any segment.
//! - [`household_history`]: every purchase line of one household.
//! - [`dashboard_summary`]: headline counts. Households are left-joined, so a
//!   household with no transactions still counts.
//!
//! When a household number repeats, the first row wins. Money is rounded to
//! cents on output.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::households::{income_band_rank, ChildStatus, HouseholdRow};
use crate::rollup::{ProductRow, TransactionRow};

/// How many household numbers the summary lists.
pub const SUMMARY_SAMPLE_SIZE: usize = 100;

pub fn round_cents(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn index_households(households: &[HouseholdRow]) -> HashMap<u64, &HouseholdRow> {
    let mut idx = HashMap::with_capacity(households.len());
    for h in households {
        idx.entry(h.hshd_num).or_insert(h);
    }
    idx
}

// ---------------------------------------------------------------------------
// Demographic breakdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemographicSegment {
    #[serde(rename = "Income_range")]
    pub income_range: String,
    #[serde(rename = "Hshd_size")]
    pub hshd_size: Option<u32>,
    #[serde(rename = "Child_Status")]
    pub child_status: ChildStatus,
    #[serde(rename = "Household_Count")]
    pub household_count: u64,
    /// Mean over households of (household spend / household transactions).
    #[serde(rename = "Avg_Spend_Per_Transaction")]
    pub avg_spend_per_transaction: f64,
    #[serde(rename = "Total_Spend")]
    pub total_spend: f64,
    #[serde(rename = "Total_Transactions")]
    pub total_transactions: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemographicOutcome {
    pub segments: Vec<DemographicSegment>,
    pub households_without_transactions: usize,
    /// Transactions whose household is not in the households file.
    pub unmatched_transactions: usize,
}

#[derive(Default)]
struct HouseholdTotals {
    spend: f64,
    transactions: u64,
}

/// Ordered by income band (unknown bands first), then household size
/// (unknown first). Income text and child status break remaining ties.
pub fn demographic_breakdown(
    households: &[HouseholdRow],
    transactions: &[TransactionRow],
) -> DemographicOutcome {
    let by_num = index_households(households);

    let mut per_household: BTreeMap<u64, HouseholdTotals> = BTreeMap::new();
    let mut unmatched = 0usize;
    for t in transactions {
        if !by_num.contains_key(&t.hshd_num) {
            unmatched += 1;
            continue;
        }
        let totals = per_household.entry(t.hshd_num).or_default();
        totals.spend += t.spend;
        totals.transactions += 1;
    }

    type SegmentKey<'a> = (Option<u8>, Option<u32>, &'a str, ChildStatus);
    let mut segments: BTreeMap<SegmentKey<'_>, Vec<&HouseholdTotals>> = BTreeMap::new();
    for (num, totals) in &per_household {
        let Some(h) = by_num.get(num) else { continue };
        let key = (
            income_band_rank(&h.income_range),
            h.hshd_size,
            h.income_range.as_str(),
            ChildStatus::of(h.children),
        );
        segments.entry(key).or_default().push(totals);
    }

    let segments = segments
        .into_iter()
        .map(|((_, hshd_size, income_range, child_status), members)| {
            let household_count = members.len() as u64;
            let total_spend: f64 = members.iter().map(|m| m.spend).sum();
            let total_transactions: u64 = members.iter().map(|m| m.transactions).sum();
            // Every member has at least one transaction (inner join).
            let mean_ticket = members
                .iter()
                .map(|m| m.spend / m.transactions as f64)
                .sum::<f64>()
                / household_count as f64;
            DemographicSegment {
                income_range: income_range.to_string(),
                hshd_size,
                child_status,
                household_count,
                avg_spend_per_transaction: round_cents(mean_ticket),
                total_spend: round_cents(total_spend),
                total_transactions,
            }
        })
        .collect();

    let households_without_transactions = by_num
        .keys()
        .filter(|n| !per_household.contains_key(n))
        .count();

    if unmatched > 0 {
        tracing::warn!(unmatched, "transactions without a known household dropped");
    }

    DemographicOutcome {
        segments,
        households_without_transactions,
        unmatched_transactions: unmatched,
    }
}

// ---------------------------------------------------------------------------
// Single-household drill-down
// ---------------------------------------------------------------------------

/// One purchase line. Field names match the household report columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdTransaction {
    #[serde(rename = "Hshd_num")]
    pub hshd_num: u64,
    #[serde(rename = "Loyalty_flag")]
    pub loyalty_flag: String,
    #[serde(rename = "Age_range")]
    pub age_range: String,
    #[serde(rename = "Marital_status")]
    pub marital_status: String,
    #[serde(rename = "Income_range")]
    pub income_range: String,
    #[serde(rename = "Homeowner_desc")]
    pub homeowner_desc: String,
    #[serde(rename = "Hshd_composition")]
    pub hshd_composition: String,
    #[serde(rename = "Hshd_size")]
    pub hshd_size: Option<u32>,
    #[serde(rename = "Children")]
    pub children: Option<u32>,
    #[serde(rename = "Basket_num")]
    pub basket_num: u64,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Product_num")]
    pub product_num: u64,
    #[serde(rename = "Department")]
    pub department: String,
    #[serde(rename = "Commodity")]
    pub commodity: String,
    #[serde(rename = "Spend")]
    pub spend: f64,
    #[serde(rename = "Units")]
    pub units: i64,
    #[serde(rename = "Store_region")]
    pub store_region: String,
    #[serde(rename = "Week_num")]
    pub week_num: Option<u32>,
    #[serde(rename = "Year")]
    pub year: Option<i32>,
}

/// Purchase lines of `hshd_num` joined to its descriptors and products,
/// ordered by basket, date, product, department, commodity. Empty when the
/// household is unknown or has no catalogued purchases.
pub fn household_history(
    hshd_num: u64,
    households: &[HouseholdRow],
    transactions: &[TransactionRow],
    products: &[ProductRow],
) -> Vec<HouseholdTransaction> {
    let Some(h) = households.iter().find(|h| h.hshd_num == hshd_num) else {
        return Vec::new();
    };

    let mut catalogue: HashMap<u64, &ProductRow> = HashMap::with_capacity(products.len());
    for p in products {
        catalogue.entry(p.product_num).or_insert(p);
    }

    let mut lines: Vec<HouseholdTransaction> = transactions
        .iter()
        .filter(|t| t.hshd_num == hshd_num)
        .filter_map(|t| {
            let p = catalogue.get(&t.product_num)?;
            Some(HouseholdTransaction {
                hshd_num,
                loyalty_flag: h.loyalty_flag.clone(),
                age_range: h.age_range.clone(),
                marital_status: h.marital_status.clone(),
                income_range: h.income_range.clone(),
                homeowner_desc: h.homeowner_desc.clone(),
                hshd_composition: h.hshd_composition.clone(),
                hshd_size: h.hshd_size,
                children: h.children,
                basket_num: t.basket_num,
                date: t.purchase_date,
                product_num: t.product_num,
                department: p.department.clone(),
                commodity: p.commodity.clone(),
                spend: t.spend,
                units: t.units,
                store_region: t.store_region.clone(),
                week_num: t.week_num,
                year: t.year,
            })
        })
        .collect();

    lines.sort_by(line_order);
    lines
}

fn line_order(a: &HouseholdTransaction, b: &HouseholdTransaction) -> Ordering {
    a.basket_num
        .cmp(&b.basket_num)
        .then(a.date.cmp(&b.date))
        .then(a.product_num.cmp(&b.product_num))
        .then_with(|| a.department.cmp(&b.department))
        .then_with(|| a.commodity.cmp(&b.commodity))
}

// ---------------------------------------------------------------------------
// Dashboard summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_households: u64,
    pub total_transactions: u64,
    /// Mean of cent-rounded spend per transaction; `0` with no transactions.
    pub average_spend: f64,
    /// First [`SUMMARY_SAMPLE_SIZE`] household numbers, ascending.
    pub household_numbers: Vec<u64>,
}

pub fn dashboard_summary(
    households: &[HouseholdRow],
    transactions: &[TransactionRow],
) -> DashboardSummary {
    let known: BTreeSet<u64> = households.iter().map(|h| h.hshd_num).collect();

    let (total_transactions, spend_cents) = transactions
        .iter()
        .filter(|t| known.contains(&t.hshd_num))
        .fold((0u64, 0.0f64), |(n, sum), t| (n + 1, sum + round_cents(t.spend)));

    let average_spend = if total_transactions == 0 {
        0.0
    } else {
        round_cents(spend_cents / total_transactions as f64)
    };

    DashboardSummary {
        total_households: known.len() as u64,
        total_transactions,
        average_spend,
        household_numbers: known.iter().copied().take(SUMMARY_SAMPLE_SIZE).collect(),
    }
}
