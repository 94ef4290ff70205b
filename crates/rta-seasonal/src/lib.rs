//! rta-seasonal
//!
//! Seasonal aggregation engine for the retail analytics dashboard.
//!
//! Takes flat per-(month, department) spending facts and produces three
//! views, each with transaction-weighted averages:
//! - a twelve-entry monthly trend sequence (season derived from the month)
//! - a four-season breakdown per department (season taken from the fact)
//! - an overall four-season summary (season taken from the fact)
//!
//! Pure, synchronous, allocation-only. No IO, no logging, no shared state.

mod accumulator;
pub mod calendar;
pub mod chart;
mod engine;
mod types;
mod validate;

pub use accumulator::{accumulate, MetricsAccumulator};
pub use calendar::{month_name, season_of, try_season_of, Season, SeasonParseError};
pub use chart::{ChartDataPoint, ChartSeries};
pub use engine::{
    analyze, analyze_checked, build_department_trends, build_monthly_trends,
    build_seasonal_summary,
};
pub use types::{
    AnalysisOptions, DepartmentOrder, DepartmentSeasonalData, MonthlyTrend, RawSeasonalFact,
    SeasonalAnalysis, SeasonalBreakdown, SeasonalMetrics, SeasonalSummary, ValidationMode,
};
pub use validate::{check_fact, validate_facts, FactValidationError, Violation, ViolationKind};
