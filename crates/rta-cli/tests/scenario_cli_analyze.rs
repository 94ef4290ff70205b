//! `rta analyze` end to end.
//!
//! GREEN when:
//! - Without an output directory, stdout is the analysis JSON with twelve
//!   monthly trends and the four-key seasonal summary.
//! - With `--out-dir`, artifacts land under `<dir>/<analysis_id>/` and stdout
//!   carries `key=value` lines.
//! - Strict validation (the default) fails with FACTS_INVALID on an
//!   out-of-range month; `--permissive` analyzes the same file.
//! - Strict validation refuses a file with unparseable rows.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

const CSV: &str = "\
Month,Department,Total_Spend,Basket_Count,Transaction_Count,Avg_Spend,Season
1,GROCERY,100,5,10,10,Winter
4,GROCERY,60,2,2,30,Spring
4,FOOD,30,3,3,10,Spring
7,FOOD,40,2,4,10,Summer
";

fn rta() -> Command {
    let mut cmd = Command::cargo_bin("rta").unwrap();
    cmd.env("RUST_LOG", "warn");
    cmd
}

#[test]
fn analyze_prints_analysis_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("seasonal.csv");
    fs::write(&input, CSV).unwrap();

    let out = rta()
        .args(["analyze", "--input"])
        .arg(&input)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let months = v["monthlyTrends"].as_array().unwrap();
    assert_eq!(months.len(), 12);
    assert_eq!(months[3]["monthName"], "April");
    assert_eq!(months[3]["metrics"]["averageSpend"], 18.0);

    let depts = v["departmentTrends"].as_array().unwrap();
    assert_eq!(depts[0]["department"], "GROCERY");
    assert_eq!(depts[1]["department"], "FOOD");

    let summary = v["seasonalSummary"].as_object().unwrap();
    for key in ["Winter", "Spring", "Summer", "Fall"] {
        assert!(summary.contains_key(key), "missing {key}");
    }
}

#[test]
fn sorted_department_order_flag() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("seasonal.csv");
    fs::write(&input, CSV).unwrap();

    let out = rta()
        .args(["analyze", "--department-order", "sorted", "--input"])
        .arg(&input)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["departmentTrends"][0]["department"], "FOOD");
}

#[test]
fn analyze_writes_artifacts_with_out_dir() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("seasonal.csv");
    let exports = dir.path().join("exports");
    fs::write(&input, CSV).unwrap();

    let out = rta()
        .args(["analyze", "--input"])
        .arg(&input)
        .arg("--out-dir")
        .arg(&exports)
        .assert()
        .success()
        .stdout(predicate::str::contains("analysis_id="))
        .stdout(predicate::str::contains("facts=4 rejected=0 departments=2"))
        .stdout(predicate::str::contains("quality_clean=true"))
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8(out).unwrap();
    let id = stdout
        .lines()
        .find_map(|l| l.strip_prefix("analysis_id="))
        .unwrap();
    let analysis_dir = exports.join(id);
    for f in [
        "manifest.json",
        "seasonal_analysis.json",
        "data_quality.json",
        "monthly_trends.csv",
        "department_trends.csv",
        "chart_series.json",
    ] {
        assert!(analysis_dir.join(f).is_file(), "missing {f}");
    }
}

#[test]
fn strict_rejects_out_of_range_month_and_permissive_accepts() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("seasonal.csv");
    fs::write(
        &input,
        format!("{CSV}13,FOOD,5,1,1,5,Winter\n"),
    )
    .unwrap();

    rta()
        .args(["analyze", "--input"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("FACTS_INVALID"))
        .stderr(predicate::str::contains("month 13"));

    rta()
        .args(["analyze", "--permissive", "--input"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("monthlyTrends"));
}

#[test]
fn strict_refuses_unparseable_rows() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("seasonal.csv");
    fs::write(&input, format!("{CSV}9,FOOD,abc,1,1,5,Fall\n")).unwrap();

    rta()
        .args(["analyze", "--input"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("FACTS_REJECTED"));
}

#[test]
fn config_layer_sets_validation_mode() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("seasonal.csv");
    let cfg = dir.path().join("analysis.yaml");
    fs::write(&input, format!("{CSV}0,FOOD,5,1,1,5,Winter\n")).unwrap();
    fs::write(&cfg, "analysis:\n  validation: permissive\n").unwrap();

    rta()
        .args(["analyze", "--input"])
        .arg(&input)
        .arg("--config")
        .arg(&cfg)
        .assert()
        .success();

    // The flag beats the config layer.
    rta()
        .args(["analyze", "--strict", "--input"])
        .arg(&input)
        .arg("--config")
        .arg(&cfg)
        .assert()
        .failure();
}
