//! `rta fetch`: dashboard API → seasonal analysis.
//!
//! The bearer token comes from the env var named by `/source/token_env`
//! (default `RTA_DASHBOARD_TOKEN`) and is never printed.

use anyhow::{Context, Result};
use rta_config::{resolve_secrets, AnalysisSettings, ConfigMode};
use rta_ingest::source::DEFAULT_TIMEOUT_SECS;
use rta_ingest::{DashboardApiSource, SeasonalFactSource};
use std::time::Duration;

use super::{analyze_and_report, load_settings, FactOrigin};
use crate::AnalysisFlags;

pub async fn fetch_and_analyze(
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    flags: &AnalysisFlags,
) -> Result<()> {
    let (config, settings) = load_settings(flags, ConfigMode::Remote)?;

    let base_url = base_url
        .or_else(|| settings.source_base_url.clone())
        .context("no dashboard base URL: pass --base-url or set /source/base_url")?;
    let timeout = request_timeout(timeout_secs, &settings);

    let secrets = resolve_secrets(&config.config_json, ConfigMode::Remote)?;
    tracing::debug!(secrets = ?secrets, "secrets resolved");

    let source = DashboardApiSource::with_timeout(&base_url, secrets.dashboard_token, timeout)?;
    let loaded = source
        .fetch_facts()
        .await
        .with_context(|| format!("fetch from {} failed", source.endpoint_url()))?;

    let source_ref = source.endpoint_url();
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

/// Flag, then `/source/timeout_secs`, then the client default.
fn request_timeout(flag: Option<u64>, settings: &AnalysisSettings) -> Duration {
    Duration::from_secs(
        flag.or(settings.source_timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS),
    )
}
