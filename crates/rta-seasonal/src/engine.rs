use std::collections::{BTreeMap, HashMap};

use crate::accumulator::{accumulate, MetricsAccumulator};
use crate::calendar::{month_name, season_of, Season, MONTHS};
use crate::types::{
    AnalysisOptions, DepartmentOrder, DepartmentSeasonalData, MonthlyTrend, RawSeasonalFact,
    SeasonalAnalysis, SeasonalBreakdown, SeasonalSummary, ValidationMode,
};
use crate::validate::{validate_facts, FactValidationError};

// ============================================================================
// Public API
// ============================================================================

/// Run the three builders over `facts` with default options
/// (first-seen department order, no validation).
///
/// Pure and deterministic. Never fails; see [`analyze_checked`] for the
/// validating entry point.
pub fn analyze(facts: &[RawSeasonalFact]) -> SeasonalAnalysis {
    analyze_with_order(facts, DepartmentOrder::default())
}

/// Validate (in [`ValidationMode::Strict`]) and then analyze.
///
/// Either returns a complete analysis or fails before any aggregation runs.
pub fn analyze_checked(
    options: &AnalysisOptions,
    facts: &[RawSeasonalFact],
) -> Result<SeasonalAnalysis, FactValidationError> {
    if options.validation == ValidationMode::Strict {
        validate_facts(facts)?;
    }
    Ok(analyze_with_order(facts, options.department_order))
}

fn analyze_with_order(facts: &[RawSeasonalFact], order: DepartmentOrder) -> SeasonalAnalysis {
    SeasonalAnalysis {
        monthly_trends: build_monthly_trends(facts),
        department_trends: build_department_trends(facts, order),
        seasonal_summary: build_seasonal_summary(facts),
    }
}

// ============================================================================
// Builders
// ============================================================================

/// One entry per calendar month, January..December, including months with
/// no facts (all-zero metrics).
///
/// The entry's season comes from the month itself; the facts' own `season`
/// labels are not consulted here.
pub fn build_monthly_trends(facts: &[RawSeasonalFact]) -> Vec<MonthlyTrend> {
    MONTHS
        .map(|month| MonthlyTrend {
            month,
            month_name: month_name(month).to_string(),
            season: season_of(month),
            metrics: accumulate(facts.iter().filter(|f| f.month == month)),
        })
        .collect()
}

/// Four-season breakdown per distinct department.
///
/// Facts are bucketed by their own `season` label. Each department appears
/// exactly once, ordered per `order`.
pub fn build_department_trends(
    facts: &[RawSeasonalFact],
    order: DepartmentOrder,
) -> Vec<DepartmentSeasonalData> {
    let mut buckets: Vec<(&str, [MetricsAccumulator; 4])> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for fact in facts {
        let slot = *index.entry(fact.department.as_str()).or_insert_with(|| {
            buckets.push((fact.department.as_str(), [MetricsAccumulator::new(); 4]));
            buckets.len() - 1
        });
        buckets[slot].1[fact.season.ordinal()].add(fact);
    }

    let finish = |(department, accs): (&str, [MetricsAccumulator; 4])| DepartmentSeasonalData {
        department: department.to_string(),
        metrics: SeasonalBreakdown::from_fn(|s| accs[s.ordinal()].finish()),
    };

    match order {
        DepartmentOrder::FirstSeen => buckets.into_iter().map(finish).collect(),
        DepartmentOrder::Sorted => buckets
            .into_iter()
            .collect::<BTreeMap<_, _>>()
            .into_iter()
            .map(finish)
            .collect(),
    }
}

/// Season-level totals across all departments, bucketed by each fact's own
/// `season` label. All four seasons are present.
pub fn build_seasonal_summary(facts: &[RawSeasonalFact]) -> SeasonalSummary {
    let mut accs = [MetricsAccumulator::new(); 4];
    for fact in facts {
        accs[fact.season.ordinal()].add(fact);
    }
    SeasonalBreakdown::from_fn(|s: Season| accs[s.ordinal()].finish())
}
