use serde::{Deserialize, Serialize};

use crate::calendar::Season;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One pre-aggregated month×department spending bucket.
///
/// Field names on the wire follow the upstream seasonal query
/// (`Month`, `Department`, `Total_Spend`, ...). snake_case and camelCase
/// spellings are accepted on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSeasonalFact {
    /// Calendar month, 1..=12.
    #[serde(rename = "Month", alias = "month")]
    pub month: u8,
    #[serde(rename = "Department", alias = "department")]
    pub department: String,
    #[serde(rename = "Total_Spend", alias = "total_spend", alias = "totalSpend")]
    pub total_spend: f64,
    #[serde(rename = "Basket_Count", alias = "basket_count", alias = "basketCount")]
    pub basket_count: u64,
    #[serde(
        rename = "Transaction_Count",
        alias = "transaction_count",
        alias = "transactionCount"
    )]
    pub transaction_count: u64,
    /// Per-bucket mean computed upstream. Carried through; aggregation never
    /// reads it.
    #[serde(
        rename = "Avg_Spend",
        alias = "avg_spend",
        alias = "avgSpend",
        default
    )]
    pub avg_spend: f64,
    /// Season as labelled upstream. Trusted by the department and summary
    /// views; the monthly view derives its own from `month`.
    #[serde(rename = "Season", alias = "season")]
    pub season: Season,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Totals plus the transaction-weighted average spend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalMetrics {
    pub total_spend: f64,
    pub basket_count: u64,
    pub transaction_count: u64,
    /// `total_spend / transaction_count`, or `0` when there are no
    /// transactions.
    pub average_spend: f64,
}

impl SeasonalMetrics {
    /// The all-zero identity.
    pub const fn empty() -> Self {
        Self {
            total_spend: 0.0,
            basket_count: 0,
            transaction_count: 0,
            average_spend: 0.0,
        }
    }

    /// Build metrics from accumulated totals, deriving the guarded average.
    pub fn from_totals(total_spend: f64, basket_count: u64, transaction_count: u64) -> Self {
        let average_spend = if transaction_count > 0 {
            total_spend / transaction_count as f64
        } else {
            0.0
        };
        Self {
            total_spend,
            basket_count,
            transaction_count,
            average_spend,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transaction_count == 0 && self.basket_count == 0 && self.total_spend == 0.0
    }
}

impl Default for SeasonalMetrics {
    fn default() -> Self {
        Self::empty()
    }
}

/// One [`SeasonalMetrics`] per season. All four keys are always present.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SeasonalBreakdown {
    #[serde(rename = "Winter")]
    pub winter: SeasonalMetrics,
    #[serde(rename = "Spring")]
    pub spring: SeasonalMetrics,
    #[serde(rename = "Summer")]
    pub summer: SeasonalMetrics,
    #[serde(rename = "Fall")]
    pub fall: SeasonalMetrics,
}

impl SeasonalBreakdown {
    pub fn get(&self, season: Season) -> &SeasonalMetrics {
        match season {
            Season::Winter => &self.winter,
            Season::Spring => &self.spring,
            Season::Summer => &self.summer,
            Season::Fall => &self.fall,
        }
    }

    /// `(season, metrics)` pairs in [`Season::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Season, &SeasonalMetrics)> {
        Season::ALL.into_iter().map(move |s| (s, self.get(s)))
    }

    pub(crate) fn from_fn(mut f: impl FnMut(Season) -> SeasonalMetrics) -> Self {
        Self {
            winter: f(Season::Winter),
            spring: f(Season::Spring),
            summer: f(Season::Summer),
            fall: f(Season::Fall),
        }
    }
}

/// Season-level totals across every department.
pub type SeasonalSummary = SeasonalBreakdown;

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Aggregated metrics for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrend {
    pub month: u8,
    pub month_name: String,
    /// Derived from `month`, never from the facts' own season labels.
    pub season: Season,
    pub metrics: SeasonalMetrics,
}

/// Four-season breakdown for one department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSeasonalData {
    pub department: String,
    pub metrics: SeasonalBreakdown,
}

/// Complete seasonal analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalAnalysis {
    /// Exactly twelve entries, January..December.
    pub monthly_trends: Vec<MonthlyTrend>,
    pub department_trends: Vec<DepartmentSeasonalData>,
    pub seasonal_summary: SeasonalSummary,
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Ordering of [`SeasonalAnalysis::department_trends`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepartmentOrder {
    /// Order in which departments first appear in the input.
    #[default]
    FirstSeen,
    /// Lexicographic by department name.
    Sorted,
}

impl DepartmentOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepartmentOrder::FirstSeen => "first_seen",
            DepartmentOrder::Sorted => "sorted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "first_seen" | "firstseen" | "encounter" => Some(DepartmentOrder::FirstSeen),
            "sorted" | "alpha" | "alphabetical" => Some(DepartmentOrder::Sorted),
            _ => None,
        }
    }
}

/// What `analyze_checked` does with facts that break the input contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Reject the whole input with every violation listed.
    #[default]
    Strict,
    /// Aggregate anyway. Out-of-range months drop out of the monthly view but
    /// still reach the department and summary views.
    Permissive,
}

impl ValidationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationMode::Strict => "strict",
            ValidationMode::Permissive => "permissive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(ValidationMode::Strict),
            "permissive" | "lenient" => Some(ValidationMode::Permissive),
            _ => None,
        }
    }
}

/// Knobs for [`crate::analyze_checked`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalysisOptions {
    pub department_order: DepartmentOrder,
    pub validation: ValidationMode,
}
