//! Flat chart series derived from a [`SeasonalAnalysis`].
//!
//! The presentation layer plots these directly. Values are the weighted
//! `average_spend`, so buckets without transactions chart as `0`.

use serde::{Deserialize, Serialize};

use crate::calendar::Season;
use crate::types::SeasonalAnalysis;

pub const MONTHLY_SERIES_CATEGORY: &str = "Average Monthly Spending";
pub const SUMMARY_SERIES_CATEGORY: &str = "Seasonal Summary";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataPoint {
    pub label: String,
    pub value: f64,
    pub category: String,
}

/// All three series, as written to `chart_series.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub monthly_spend: Vec<ChartDataPoint>,
    pub department_seasons: Vec<ChartDataPoint>,
    pub seasonal_summary: Vec<ChartDataPoint>,
}

impl ChartSeries {
    pub fn from_analysis(analysis: &SeasonalAnalysis) -> Self {
        Self {
            monthly_spend: monthly_spend_series(analysis),
            department_seasons: department_season_series(analysis),
            seasonal_summary: seasonal_summary_series(analysis),
        }
    }
}

/// Twelve points, January..December.
pub fn monthly_spend_series(analysis: &SeasonalAnalysis) -> Vec<ChartDataPoint> {
    analysis
        .monthly_trends
        .iter()
        .map(|m| ChartDataPoint {
            label: m.month_name.clone(),
            value: m.metrics.average_spend,
            category: MONTHLY_SERIES_CATEGORY.to_string(),
        })
        .collect()
}

/// Four points per department (Winter, Spring, Summer, Fall), departments in
/// analysis order. `category` carries the department name.
pub fn department_season_series(analysis: &SeasonalAnalysis) -> Vec<ChartDataPoint> {
    let mut out = Vec::with_capacity(analysis.department_trends.len() * Season::ALL.len());
    for dept in &analysis.department_trends {
        for (season, metrics) in dept.metrics.iter() {
            out.push(ChartDataPoint {
                label: season.to_string(),
                value: metrics.average_spend,
                category: dept.department.clone(),
            });
        }
    }
    out
}

pub fn seasonal_summary_series(analysis: &SeasonalAnalysis) -> Vec<ChartDataPoint> {
    analysis
        .seasonal_summary
        .iter()
        .map(|(season, metrics)| ChartDataPoint {
            label: season.to_string(),
            value: metrics.average_spend,
            category: SUMMARY_SERIES_CATEGORY.to_string(),
        })
        .collect()
}
