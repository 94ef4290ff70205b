//! Pluggable async fact sources.
//!
//! A [`SeasonalFactSource`] yields one batch of facts. Two implementations:
//! - [`FileFactSource`]: a local CSV/JSON export
//! - [`DashboardApiSource`]: `GET {base_url}/api/analytics/seasonal`
//!
//! The bearer token is handed in by the caller and is never logged.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ingest_csv::{self, CsvIngestError};
use crate::ingest_json::{self, JsonIngestError};
use crate::{LoadedFacts, SourceFormat};

pub const SEASONAL_ENDPOINT: &str = "/api/analytics/seasonal";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum SourceError {
    /// Connect, timeout or other transport failure.
    Transport(String),
    /// Non-success HTTP status, or an error envelope in the body.
    Api { status: u16, message: String },
    /// Body or file contents could not be decoded.
    Decode(String),
    Io(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Transport(m) => write!(f, "SOURCE_TRANSPORT: {m}"),
            SourceError::Api { status, message } => {
                write!(f, "SOURCE_API: status={status} message={message}")
            }
            SourceError::Decode(m) => write!(f, "SOURCE_DECODE: {m}"),
            SourceError::Io(m) => write!(f, "SOURCE_IO: {m}"),
        }
    }
}

impl std::error::Error for SourceError {}

impl From<CsvIngestError> for SourceError {
    fn from(e: CsvIngestError) -> Self {
        match e {
            CsvIngestError::Io(m) => SourceError::Io(m),
            other => SourceError::Decode(other.to_string()),
        }
    }
}

impl From<JsonIngestError> for SourceError {
    fn from(e: JsonIngestError) -> Self {
        match e {
            JsonIngestError::Io(m) => SourceError::Io(m),
            JsonIngestError::Decode(m) => SourceError::Decode(m),
            upstream @ JsonIngestError::Upstream { .. } => SourceError::Api {
                status: 200,
                message: upstream.to_string(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

#[async_trait::async_trait]
pub trait SeasonalFactSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    async fn fetch_facts(&self) -> Result<LoadedFacts, SourceError>;
}

// ---------------------------------------------------------------------------
// File source
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FileFactSource {
    path: PathBuf,
    format: SourceFormat,
}

impl FileFactSource {
    pub fn new(path: impl Into<PathBuf>, format: SourceFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Infer the format from the file extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, SourceError> {
        Self::resolve(path, None)
    }

    /// `format` wins over the extension; one of the two must resolve.
    pub fn resolve(
        path: impl Into<PathBuf>,
        format: Option<SourceFormat>,
    ) -> Result<Self, SourceError> {
        let path = path.into();
        let format = format
            .or_else(|| SourceFormat::from_path(&path))
            .ok_or_else(|| {
                SourceError::Decode(format!(
                    "cannot infer format for '{}'; pass --format csv|json",
                    path.display()
                ))
            })?;
        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }
}

#[async_trait::async_trait]
impl SeasonalFactSource for FileFactSource {
    fn source_name(&self) -> &'static str {
        "file"
    }

    async fn fetch_facts(&self) -> Result<LoadedFacts, SourceError> {
        let src = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SourceError::Io(format!("read '{}': {e}", self.path.display())))?;

        let loaded = match self.format {
            SourceFormat::Csv => ingest_csv::parse_csv_str(&src)?,
            SourceFormat::Json => ingest_json::parse_json_str(&src)?,
        };

        tracing::info!(
            path = %self.path.display(),
            format = self.format.as_str(),
            facts = loaded.records.len(),
            rejected = loaded.rejected.len(),
            "fact export loaded"
        );
        Ok(loaded)
    }
}

// ---------------------------------------------------------------------------
// Dashboard API source
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct DashboardApiSource {
    http: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl fmt::Debug for DashboardApiSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DashboardApiSource")
            .field("base_url", &self.base_url)
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl DashboardApiSource {
    pub fn new(base_url: impl Into<String>, bearer_token: Option<String>) -> Result<Self, SourceError> {
        Self::with_timeout(
            base_url,
            bearer_token,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        bearer_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Transport(format!("http client build failed: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            bearer_token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            SEASONAL_ENDPOINT
        )
    }
}

#[async_trait::async_trait]
impl SeasonalFactSource for DashboardApiSource {
    fn source_name(&self) -> &'static str {
        "dashboard_api"
    }

    async fn fetch_facts(&self) -> Result<LoadedFacts, SourceError> {
        let url = self.endpoint_url();
        tracing::info!(url = %url, "fetching seasonal facts");

        let mut req = self.http.get(&url);
        if let Some(token) = &self.bearer_token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| SourceError::Transport(format!("read body: {e}")))?;

        if !status.is_success() {
            // Prefer the envelope's message when the body carries one.
            let message = match ingest_json::parse_json_str(&body) {
                Err(JsonIngestError::Upstream { error, .. }) => error,
                _ => body.chars().take(200).collect(),
            };
            tracing::warn!(status = status.as_u16(), "seasonal endpoint returned error");
            return Err(SourceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let loaded = ingest_json::parse_json_str(&body).map_err(|e| match e {
            upstream @ JsonIngestError::Upstream { .. } => SourceError::Api {
                status: status.as_u16(),
                message: upstream.to_string(),
            },
            other => SourceError::from(other),
        })?;

        tracing::info!(
            facts = loaded.records.len(),
            rejected = loaded.rejected.len(),
            "seasonal facts fetched"
        );
        Ok(loaded)
    }
}
