//! Survey response exports
//!
//! Exporting is a three-step long-running operation: start the export, poll
//! its progress until a file id appears, then download the file.

use super::iso_datetime;
use crate::client::{QualtricsClient, segment};
use crate::error::Result;
use crate::transport::RequestBody;
use crate::validate::parse_result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::debug;

/// File format of a response export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Tsv,
    Spss,
    Json,
    Ndjson,
    Xml,
}

impl ExportFormat {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Spss => "spss",
            ExportFormat::Json => "json",
            ExportFormat::Ndjson => "ndjson",
            ExportFormat::Xml => "xml",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for a response export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponsesOptions {
    pub survey_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub format: ExportFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compress: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_labels: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// Any further export filters, passed through verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
}

impl ExportResponsesOptions {
    /// Csv export of every response recorded between `start_date` and `end_date`
    pub fn new(
        survey_id: impl Into<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Self {
        Self {
            survey_id: survey_id.into(),
            start_date,
            end_date,
            format: ExportFormat::default(),
            compress: None,
            use_labels: None,
            limit: None,
            extra: Map::new(),
            bearer_token: None,
        }
    }

    fn body(&self) -> Value {
        let mut body = self.extra.clone();
        body.insert("startDate".into(), iso_datetime(&self.start_date).into());
        body.insert("endDate".into(), iso_datetime(&self.end_date).into());
        body.insert("format".into(), self.format.as_str().into());
        if let Some(compress) = self.compress {
            body.insert("compress".into(), compress.into());
        }
        if let Some(use_labels) = self.use_labels {
            body.insert("useLabels".into(), use_labels.into());
        }
        if let Some(limit) = self.limit {
            body.insert("limit".into(), limit.into());
        }
        Value::Object(body)
    }
}

/// Response to starting an export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportStarted {
    pub progress_id: String,
    pub percent_complete: f64,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
}

/// Progress snapshot of a running export
///
/// `file_id` is only present once the export has finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportProgress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    pub percent_complete: f64,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
}

impl ExportProgress {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.percent_complete >= 100.0
    }
}

impl QualtricsClient {
    /// Start exporting responses for a survey
    pub async fn start_response_export(
        &self,
        options: &ExportResponsesOptions,
    ) -> Result<ExportStarted> {
        let route = self.route(&format!(
            "surveys/{}/export-responses",
            segment(&options.survey_id)
        ));
        debug!(survey_id = %options.survey_id, format = %options.format, "Starting response export");

        let response = self
            .post(
                route,
                RequestBody::Json(options.body()),
                options.bearer_token.as_deref(),
            )
            .await?;
        parse_result(response, "Start Export Response")
    }

    /// Progress of an export started with [`start_response_export`](Self::start_response_export)
    pub async fn get_response_export_progress(
        &self,
        survey_id: &str,
        progress_id: &str,
        bearer_token: Option<&str>,
    ) -> Result<ExportProgress> {
        let route = self.route(&format!(
            "surveys/{}/export-responses/{}",
            segment(survey_id),
            segment(progress_id)
        ));
        let response = self.get(route, bearer_token).await?;
        parse_result(response, "File Progress Response")
    }

    /// Download a finished export. The payload is returned untouched.
    pub async fn get_response_export_file(
        &self,
        survey_id: &str,
        file_id: &str,
        bearer_token: Option<&str>,
    ) -> Result<Vec<u8>> {
        let route = self.route(&format!(
            "surveys/{}/export-responses/{}/file",
            segment(survey_id),
            segment(file_id)
        ));
        self.get_raw(route, bearer_token).await
    }
}
