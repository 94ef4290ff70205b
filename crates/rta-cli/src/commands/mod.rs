//! Command handler modules for the `rta` binary.
//!
//! Shared plumbing (config loading, flag overrides, the analyze-and-report
//! tail used by both `analyze` and `fetch`) lives here.

pub mod analyze;
pub mod fetch;
pub mod households;
pub mod ingest;

use anyhow::{bail, Context, Result};
use rta_config::{
    report_unused_keys, AnalysisSettings, ConfigMode, LoadedConfig, UnusedKeyPolicy,
};
use rta_ingest::{build_quality_report, LoadedFacts, SourceFormat};
use rta_seasonal::{analyze_checked, DepartmentOrder, ValidationMode};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::AnalysisFlags;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Load config layers (none is fine) and resolve the typed settings with CLI
/// flags applied on top. Unused keys are warnings.
pub fn load_settings(
    flags: &AnalysisFlags,
    mode: ConfigMode,
) -> Result<(LoadedConfig, AnalysisSettings)> {
    let loaded = if flags.config_paths.is_empty() {
        LoadedConfig::empty()?
    } else {
        rta_config::load_layered_yaml(&flags.config_paths)?
    };

    let unused = report_unused_keys(mode, &loaded.config_json, UnusedKeyPolicy::Warn)?;
    for ptr in &unused.unused_leaf_pointers {
        tracing::warn!(mode = %unused.mode, pointer = %ptr, "unused config key");
    }

    let mut settings = AnalysisSettings::from_config_json(&loaded.config_json)?;
    apply_flags(&mut settings, flags)?;
    Ok((loaded, settings))
}

fn apply_flags(settings: &mut AnalysisSettings, flags: &AnalysisFlags) -> Result<()> {
    if let Some(raw) = &flags.department_order {
        settings.department_order = parse_department_order(raw)?;
    }
    if flags.strict {
        settings.validation = ValidationMode::Strict;
    }
    if flags.permissive {
        settings.validation = ValidationMode::Permissive;
    }
    Ok(())
}

pub fn parse_department_order(raw: &str) -> Result<DepartmentOrder> {
    match DepartmentOrder::parse(raw) {
        Some(o) => Ok(o),
        None => bail!(
            "invalid --department-order '{}'. expected one of: first-seen | sorted",
            raw
        ),
    }
}

/// Explicit flag, then config, then `None` (infer from extension).
pub fn resolve_format(flag: Option<&str>, settings: &AnalysisSettings) -> Result<Option<SourceFormat>> {
    flag.or(settings.ingest_format.as_deref())
        .map(SourceFormat::parse)
        .transpose()
}

// ---------------------------------------------------------------------------
// Analyze + report
// ---------------------------------------------------------------------------

/// Where the facts came from, for logs and the manifest.
pub struct FactOrigin<'a> {
    pub source: &'a str,
    pub source_ref: &'a str,
}

/// Validate, aggregate, then print JSON to stdout or write artifacts.
pub fn analyze_and_report(
    loaded: LoadedFacts,
    origin: FactOrigin<'_>,
    config: &LoadedConfig,
    settings: &AnalysisSettings,
    flags: &AnalysisFlags,
) -> Result<()> {
    let options = settings.analysis_options();

    if options.validation == ValidationMode::Strict && !loaded.rejected.is_empty() {
        let first = &loaded.rejected[0];
        bail!(
            "FACTS_REJECTED: {} row(s) could not be parsed from {}; first: row={} field={} raw={:?}",
            loaded.rejected.len(),
            origin.source_ref,
            first.row,
            first.field,
            first.raw
        );
    }

    let quality = build_quality_report(&loaded.records, &loaded.rejected);
    if !quality.is_clean() {
        tracing::warn!(
            duplicates = quality.duplicates.len(),
            season_mismatches = quality.season_mismatches.len(),
            out_of_range_months = quality.out_of_range_months.len(),
            rejected_rows = quality.rejected_rows.len(),
            "fact batch has data-quality issues"
        );
    }

    let analysis = analyze_checked(&options, &loaded.records)
        .with_context(|| format!("analysis of {} failed", origin.source_ref))?;
    tracing::info!(
        facts = loaded.records.len(),
        departments = analysis.department_trends.len(),
        department_order = options.department_order.as_str(),
        validation = options.validation.as_str(),
        "seasonal analysis complete"
    );

    let exports_root: Option<PathBuf> = match (&flags.out_dir, flags.export) {
        (Some(dir), _) => Some(dir.clone()),
        (None, true) => Some(PathBuf::from(&settings.exports_root)),
        (None, false) => None,
    };

    let Some(root) = exports_root else {
        let json =
            serde_json::to_string_pretty(&analysis).context("serialize analysis failed")?;
        println!("{json}");
        return Ok(());
    };

    let out = rta_artifacts::write_analysis_artifacts(rta_artifacts::WriteAnalysisArtifactsArgs {
        exports_root: Path::new(&root),
        analysis_id: Uuid::new_v4(),
        source: origin.source,
        source_ref: origin.source_ref,
        config_hash: &config.config_hash,
        department_order: options.department_order.as_str(),
        validation: options.validation.as_str(),
        analysis: &analysis,
        quality: &quality,
    })?;

    println!("analysis_id={}", out.manifest.analysis_id);
    println!("analysis_dir={}", out.analysis_dir.display());
    println!("source={}", origin.source);
    println!("config_hash={}", config.config_hash);
    println!(
        "facts={} rejected={} departments={}",
        loaded.records.len(),
        loaded.rejected.len(),
        analysis.department_trends.len()
    );
    println!("quality_clean={}", quality.is_clean());
    println!("manifest_path={}", out.manifest_path.display());
    Ok(())
}
