//! File-backed fact loading.
//!
//! GREEN when:
//! - `FileFactSource` infers CSV/JSON from the extension and parses both.
//! - An explicit format overrides an unknown extension.
//! - A CSV with a bad row loads the good rows and reports the reject.
//! - A missing file is a `SourceError::Io` naming the path.
//! - The quality report over a loaded batch is deterministic and flags the
//!   reject and the season mismatch.

use std::fs;

use rta_ingest::{
    build_quality_report, FileFactSource, SeasonalFactSource, SourceError, SourceFormat,
};
use tempfile::tempdir;

const CSV: &str = "\
Month,Department,Total_Spend,Basket_Count,Transaction_Count,Avg_Spend,Season
1,GROCERY,100,5,10,10,Winter
4,GROCERY,60,2,2,30,Spring
6,FOOD,x,1,1,1,Summer
9,FOOD,40,2,4,10,Winter
";

const JSON: &str = r#"{"seasonalData":[
  {"Month":1,"Department":"GROCERY","Total_Spend":100,"Basket_Count":5,"Transaction_Count":10,"Avg_Spend":10,"Season":"Winter"},
  {"Month":4,"Department":"GROCERY","Total_Spend":60,"Basket_Count":2,"Transaction_Count":2,"Avg_Spend":30,"Season":"Spring"}
]}"#;

#[tokio::test]
async fn csv_and_json_load_by_extension() {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("seasonal.csv");
    let json_path = dir.path().join("seasonal.json");
    fs::write(&csv_path, CSV).unwrap();
    fs::write(&json_path, JSON).unwrap();

    let csv_source = FileFactSource::from_path(&csv_path).unwrap();
    assert_eq!(csv_source.source_name(), "file");
    let from_csv = csv_source.fetch_facts().await.unwrap();
    let from_json = FileFactSource::from_path(&json_path)
        .unwrap()
        .fetch_facts()
        .await
        .unwrap();

    assert_eq!(from_csv.records.len(), 3);
    assert_eq!(from_csv.rejected.len(), 1);
    assert_eq!(from_csv.rejected[0].row, 4);
    assert_eq!(from_csv.rejected[0].field, "total_spend");

    assert_eq!(from_json.records.len(), 2);
    assert_eq!(from_json.records[..], from_csv.records[..2]);
}

#[tokio::test]
async fn explicit_format_overrides_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("export.txt");
    fs::write(&path, JSON).unwrap();

    assert!(FileFactSource::resolve(&path, None).is_err());
    let loaded = FileFactSource::resolve(&path, Some(SourceFormat::Json))
        .unwrap()
        .fetch_facts()
        .await
        .unwrap();
    assert_eq!(loaded.records.len(), 2);
}

#[tokio::test]
async fn missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.csv");
    let err = FileFactSource::from_path(&path)
        .unwrap()
        .fetch_facts()
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::Io(ref m) if m.contains("absent.csv")), "{err}");
}

#[tokio::test]
async fn quality_report_over_loaded_batch() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("seasonal.csv");
    fs::write(&path, CSV).unwrap();
    let loaded = FileFactSource::from_path(&path)
        .unwrap()
        .fetch_facts()
        .await
        .unwrap();

    let report = build_quality_report(&loaded.records, &loaded.rejected);
    assert_eq!(report.total_facts, 3);
    assert_eq!(report.distinct_departments, 2);
    assert_eq!(report.months_covered, vec![1, 4, 9]);
    assert_eq!(report.season_mismatches.len(), 1);
    assert_eq!(report.season_mismatches[0].month, 9);
    assert_eq!(report.rejected_rows.len(), 1);
    assert!(!report.is_clean());

    let again = build_quality_report(&loaded.records, &loaded.rejected);
    assert_eq!(report.to_string(), again.to_string());
}
