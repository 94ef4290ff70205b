//! `rta analyze`: local fact export → seasonal analysis.

use anyhow::{Context, Result};
use rta_config::ConfigMode;
use rta_ingest::{FileFactSource, SeasonalFactSource};
use std::path::Path;

use super::{analyze_and_report, load_settings, resolve_format, FactOrigin};
use crate::AnalysisFlags;

pub async fn analyze_file(input: &Path, format: Option<&str>, flags: &AnalysisFlags) -> Result<()> {
    let (config, settings) = load_settings(flags, ConfigMode::Offline)?;
    let format = resolve_format(format, &settings)?;

    let source = FileFactSource::resolve(input, format)?;
    let loaded = source
        .fetch_facts()
        .await
        .with_context(|| format!("load facts failed: {}", input.display()))?;

    let source_ref = input.display().to_string();
    analyze_and_report(
        loaded,
        FactOrigin {
            source: source.source_name(),
            source_ref: &source_ref,
        },
        &config,
        &settings,
        flags,
    )
}
