use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rta_ingest::FactQualityReport;
use rta_seasonal::{ChartSeries, RawSeasonalFact, SeasonalAnalysis};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const SCHEMA_VERSION: i32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisManifest {
    pub schema_version: i32,
    pub analysis_id: Uuid,
    /// `file` or `dashboard_api`.
    pub source: String,
    /// Path or URL the facts came from.
    pub source_ref: String,
    pub config_hash: String,
    pub fact_count: usize,
    pub rejected_rows: usize,
    pub department_order: String,
    pub validation: String,
    pub created_at_utc: DateTime<Utc>,
    pub artifacts: ArtifactList,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactList {
    pub manifest_json: String,
    pub seasonal_analysis_json: String,
    pub data_quality_json: String,
    pub monthly_trends_csv: String,
    pub department_trends_csv: String,
    pub chart_series_json: String,
}

impl Default for ArtifactList {
    fn default() -> Self {
        Self {
            manifest_json: "manifest.json".to_string(),
            seasonal_analysis_json: "seasonal_analysis.json".to_string(),
            data_quality_json: "data_quality.json".to_string(),
            monthly_trends_csv: "monthly_trends.csv".to_string(),
            department_trends_csv: "department_trends.csv".to_string(),
            chart_series_json: "chart_series.json".to_string(),
        }
    }
}

pub struct WriteAnalysisArtifactsArgs<'a> {
    pub exports_root: &'a Path, // e.g. ./exports
    pub analysis_id: Uuid,
    pub source: &'a str,
    pub source_ref: &'a str,
    pub config_hash: &'a str,
    pub department_order: &'a str,
    pub validation: &'a str,
    pub analysis: &'a SeasonalAnalysis,
    pub quality: &'a FactQualityReport,
}

#[derive(Debug)]
pub struct WriteAnalysisArtifactsResult {
    pub analysis_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub manifest: AnalysisManifest,
}

/// Write every artifact for one analysis under `<exports_root>/<analysis_id>/`.
///
/// Existing files in that directory are overwritten; the id is fresh per run.
pub fn write_analysis_artifacts(
    args: WriteAnalysisArtifactsArgs<'_>,
) -> Result<WriteAnalysisArtifactsResult> {
    let analysis_dir = args.exports_root.join(args.analysis_id.to_string());
    fs::create_dir_all(&analysis_dir)
        .with_context(|| format!("create exports dir failed: {}", analysis_dir.display()))?;

    let files = ArtifactList::default();

    write_json(&analysis_dir.join(&files.seasonal_analysis_json), args.analysis)?;
    write_json(&analysis_dir.join(&files.data_quality_json), args.quality)?;
    write_json(
        &analysis_dir.join(&files.chart_series_json),
        &ChartSeries::from_analysis(args.analysis),
    )?;
    write_monthly_trends_csv(&analysis_dir.join(&files.monthly_trends_csv), args.analysis)?;
    write_department_trends_csv(
        &analysis_dir.join(&files.department_trends_csv),
        args.analysis,
    )?;

    // Manifest last: its presence marks a complete export.
    let manifest = AnalysisManifest {
        schema_version: SCHEMA_VERSION,
        analysis_id: args.analysis_id,
        source: args.source.to_string(),
        source_ref: args.source_ref.to_string(),
        config_hash: args.config_hash.to_string(),
        fact_count: args.quality.total_facts,
        rejected_rows: args.quality.rejected_rows.len(),
        department_order: args.department_order.to_string(),
        validation: args.validation.to_string(),
        created_at_utc: Utc::now(),
        artifacts: files,
    };
    let manifest_path = analysis_dir.join(&manifest.artifacts.manifest_json);
    write_json(&manifest_path, &manifest)?;

    Ok(WriteAnalysisArtifactsResult {
        analysis_dir,
        manifest_path,
        manifest,
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("serialize failed: {}", path.display()))?;
    fs::write(path, format!("{json}\n"))
        .with_context(|| format!("write failed: {}", path.display()))
}

// ---------------------------------------------------------------------------
// CSV views
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct MonthlyTrendRow<'a> {
    month: u8,
    month_name: &'a str,
    season: &'a str,
    total_spend: f64,
    basket_count: u64,
    transaction_count: u64,
    average_spend: f64,
}

#[derive(Serialize)]
struct DepartmentTrendRow<'a> {
    department: &'a str,
    season: &'a str,
    total_spend: f64,
    basket_count: u64,
    transaction_count: u64,
    average_spend: f64,
}

const MONTHLY_HEADER: [&str; 7] = [
    "month",
    "month_name",
    "season",
    "total_spend",
    "basket_count",
    "transaction_count",
    "average_spend",
];

const DEPARTMENT_HEADER: [&str; 6] = [
    "department",
    "season",
    "total_spend",
    "basket_count",
    "transaction_count",
    "average_spend",
];

/// Header written up front so an empty view still yields a readable file.
fn open_csv(path: &Path, header: &[&str]) -> Result<csv::Writer<fs::File>> {
    let mut w = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("open csv failed: {}", path.display()))?;
    w.write_record(header)
        .with_context(|| format!("write csv header failed: {}", path.display()))?;
    Ok(w)
}

/// One row per month, January..December.
pub fn write_monthly_trends_csv(path: &Path, analysis: &SeasonalAnalysis) -> Result<()> {
    let mut w = open_csv(path, &MONTHLY_HEADER)?;
    for m in &analysis.monthly_trends {
        w.serialize(MonthlyTrendRow {
            month: m.month,
            month_name: &m.month_name,
            season: m.season.as_str(),
            total_spend: m.metrics.total_spend,
            basket_count: m.metrics.basket_count,
            transaction_count: m.metrics.transaction_count,
            average_spend: m.metrics.average_spend,
        })
        .with_context(|| format!("write csv row failed: {}", path.display()))?;
    }
    w.flush()
        .with_context(|| format!("flush csv failed: {}", path.display()))
}

/// Long format: four rows per department (Winter, Spring, Summer, Fall).
pub fn write_department_trends_csv(path: &Path, analysis: &SeasonalAnalysis) -> Result<()> {
    let mut w = open_csv(path, &DEPARTMENT_HEADER)?;
    for d in &analysis.department_trends {
        for (season, metrics) in d.metrics.iter() {
            w.serialize(DepartmentTrendRow {
                department: &d.department,
                season: season.as_str(),
                total_spend: metrics.total_spend,
                basket_count: metrics.basket_count,
                transaction_count: metrics.transaction_count,
                average_spend: metrics.average_spend,
            })
            .with_context(|| format!("write csv row failed: {}", path.display()))?;
        }
    }
    w.flush()
        .with_context(|| format!("flush csv failed: {}", path.display()))
}

const FACT_HEADER: [&str; 7] = [
    "Month",
    "Department",
    "Total_Spend",
    "Basket_Count",
    "Transaction_Count",
    "Avg_Spend",
    "Season",
];

/// Facts in the upstream column layout, readable by `rta_ingest`.
pub fn write_facts_csv(path: &Path, facts: &[RawSeasonalFact]) -> Result<()> {
    let mut w = open_csv(path, &FACT_HEADER)?;
    for f in facts {
        w.serialize(f)
            .with_context(|| format!("write csv row failed: {}", path.display()))?;
    }
    w.flush()
        .with_context(|| format!("flush csv failed: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rta_seasonal::{analyze, Season};

    fn fact(month: u8, dept: &str, spend: f64, txns: u64, season: Season) -> RawSeasonalFact {
        RawSeasonalFact {
            month,
            department: dept.to_string(),
            total_spend: spend,
            basket_count: 1,
            transaction_count: txns,
            avg_spend: 0.0,
            season,
        }
    }

    #[test]
    fn monthly_csv_has_header_and_twelve_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.csv");
        write_monthly_trends_csv(&path, &analyze(&[])).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 13);
        assert_eq!(lines[0], MONTHLY_HEADER.join(","));
        assert!(lines[1].starts_with("1,January,Winter,"));
        assert!(lines[12].starts_with("12,December,Winter,"));
    }

    #[test]
    fn department_csv_is_long_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d.csv");
        let analysis = analyze(&[fact(7, "DELI", 20.0, 4, Season::Summer)]);
        write_department_trends_csv(&path, &analysis).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[3], "DELI,Summer,20.0,1,4,5.0");
    }

    #[test]
    fn empty_department_csv_keeps_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d.csv");
        write_department_trends_csv(&path, &analyze(&[])).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_end(), DEPARTMENT_HEADER.join(","));
    }

    #[test]
    fn facts_csv_uses_upstream_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facts.csv");
        write_facts_csv(&path, &[fact(12, "GROCERY", 10.5, 2, Season::Winter)]).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], FACT_HEADER.join(","));
        assert_eq!(lines[1], "12,GROCERY,10.5,1,2,0.0,Winter");
    }
}
