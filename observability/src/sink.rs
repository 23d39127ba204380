//! # Progress Sinks
//!
//! Destinations for per-step progress records, selected once from
//! `logging.recipient`:
//! - `local`: [`LocalProgressSink`] appends plain text to `logging_path`
//! - an http(s) URL: [`RemoteProgressSink`] POSTs one JSON record per call
//!
//! A failing local write is an I/O error and fatal to the run. Remote
//! delivery problems are logged and otherwise ignored so a flaky receiver
//! never stops training.

use crate::error::{SinkError, SinkResult};
use crate::report::{render_report, render_summary};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use config::{LoggingConfig, Recipient};
use mol_core::{RunResult, StepReport};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

const REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Records one training step.
    async fn report(&self, report: &StepReport) -> SinkResult<()>;

    /// Records the end of a run.
    async fn finish(&self, result: &RunResult) -> SinkResult<()>;
}

/// Builds the sink named by `logging.recipient`.
pub fn sink_from_config(logging: &LoggingConfig) -> SinkResult<Box<dyn ProgressSink>> {
    match logging.recipient() {
        Recipient::Local => Ok(Box::new(LocalProgressSink::new(&logging.logging_path)?)),
        Recipient::Remote(url) => Ok(Box::new(RemoteProgressSink::new(
            url,
            &logging.sender,
            logging.job_id.as_deref().unwrap_or_default(),
        )?)),
    }
}

pub struct LocalProgressSink {
    path: PathBuf,
}

impl LocalProgressSink {
    /// Creates the parent directory and opens the log for appending, so an
    /// unwritable path fails before any work starts.
    pub fn new(path: impl Into<PathBuf>) -> SinkResult<Self> {
        let path = path.into();
        let write_error = |e: std::io::Error| SinkError::Write {
            path: path.display().to_string(),
            reason: e.to_string(),
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(write_error)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn append(&self, text: &str) -> SinkResult<()> {
        let write_error = |e: std::io::Error| SinkError::Write {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        };
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(write_error)?;
        file.write_all(text.as_bytes()).await.map_err(write_error)?;
        file.flush().await.map_err(write_error)?;
        Ok(())
    }
}

#[async_trait]
impl ProgressSink for LocalProgressSink {
    async fn report(&self, report: &StepReport) -> SinkResult<()> {
        let mut text = render_report(report);
        text.push('\n');
        self.append(&text).await
    }

    async fn finish(&self, result: &RunResult) -> SinkResult<()> {
        self.append(&render_summary(result)).await
    }
}

/// JSON body of every remote POST.
#[derive(Debug, Serialize)]
struct RemoteRecord<'a, T: Serialize> {
    sender: &'a str,
    job_id: &'a str,
    kind: &'static str,
    sent_at: DateTime<Utc>,
    payload: &'a T,
}

pub struct RemoteProgressSink {
    client: reqwest::Client,
    url: reqwest::Url,
    sender: String,
    job_id: String,
}

impl RemoteProgressSink {
    pub fn new(url: &str, sender: &str, job_id: &str) -> SinkResult<Self> {
        let invalid = |reason: String| SinkError::InvalidRecipient {
            recipient: url.to_string(),
            reason,
        };
        let url = reqwest::Url::parse(url).map_err(|e| invalid(e.to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(REMOTE_TIMEOUT)
            .build()
            .map_err(|e| invalid(e.to_string()))?;
        Ok(Self {
            client,
            url,
            sender: sender.to_string(),
            job_id: job_id.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn post<T: Serialize + Sync>(&self, kind: &'static str, payload: &T) -> SinkResult<()> {
        let body = serde_json::to_vec(&RemoteRecord {
            sender: &self.sender,
            job_id: &self.job_id,
            kind,
            sent_at: Utc::now(),
            payload,
        })?;
        let response = self
            .client
            .post(self.url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await;
        match response {
            Ok(response) if response.status().is_success() => {
                debug!(url = %self.url, kind, "Delivered progress record");
            }
            Ok(response) => {
                warn!(url = %self.url, kind, status = %response.status(), "Progress receiver rejected record");
            }
            Err(e) => {
                warn!(url = %self.url, kind, error = %e, "Progress receiver unreachable");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ProgressSink for RemoteProgressSink {
    async fn report(&self, report: &StepReport) -> SinkResult<()> {
        self.post("step", report).await
    }

    async fn finish(&self, result: &RunResult) -> SinkResult<()> {
        self.post("result", result).await
    }
}
