//! Progress stream messages.
//!
//! The job stream mixes explicitly typed events with untyped job snapshots and
//! bare `{"error": ...}` payloads. [`ProgressEvent::parse`] folds all of them
//! into one enum so consumers match exhaustively.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{error_message_from_value, UiError, UiResult};
use crate::types::{FileStatus, JobSnapshot};

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// One file moved through analysis.
    AnalysisProgress { file: FileStatus, total_files: Option<u64> },
    /// Analysis finished for every file; `auto_upload` tells whether an upload phase follows.
    AnalysisComplete { auto_upload: bool },
    /// The server switches the job into its upload phase.
    AutoUploadStarting,
    /// Untyped snapshot of the upload phase.
    Snapshot(JobSnapshot),
    Error { message: String },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TypedEvent {
    AnalysisProgress {
        file: FileStatus,
        #[serde(default)]
        total_files: Option<u64>,
    },
    AnalysisComplete {
        #[serde(default)]
        auto_upload: bool,
    },
    AutoUploadStarting,
    Error {
        #[serde(default)]
        message: Option<String>,
    },
}

impl ProgressEvent {
    pub fn parse(text: &str) -> UiResult<Self> {
        let v: Value = serde_json::from_str(text)?;
        if !v.is_object() {
            return Err(UiError::Decode("progress message is not a JSON object".into()));
        }

        // An explicit error field wins over everything else.
        if v.get("error").map(|e| !e.is_null()).unwrap_or(false) {
            let message = error_message_from_value(&v).unwrap_or_else(|| "Unknown server error".into());
            return Ok(ProgressEvent::Error { message });
        }

        if v.get("type").is_some() {
            let typed: TypedEvent = serde_json::from_value(v)?;
            return Ok(match typed {
                TypedEvent::AnalysisProgress { file, total_files } => {
                    ProgressEvent::AnalysisProgress { file, total_files }
                }
                TypedEvent::AnalysisComplete { auto_upload } => ProgressEvent::AnalysisComplete { auto_upload },
                TypedEvent::AutoUploadStarting => ProgressEvent::AutoUploadStarting,
                TypedEvent::Error { message } => ProgressEvent::Error {
                    message: message.unwrap_or_else(|| "Unknown server error".into()),
                },
            });
        }

        if v.get("job_id").is_some() && v.get("status").is_some() {
            let snapshot: JobSnapshot = serde_json::from_value(v)?;
            return Ok(ProgressEvent::Snapshot(snapshot));
        }

        Err(UiError::Decode("unrecognized progress message".into()))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ProgressEvent::AnalysisProgress { .. } => "analysis_progress",
            ProgressEvent::AnalysisComplete { .. } => "analysis_complete",
            ProgressEvent::AutoUploadStarting => "auto_upload_starting",
            ProgressEvent::Snapshot(_) => "snapshot",
            ProgressEvent::Error { .. } => "error",
        }
    }
}
