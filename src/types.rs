//! Wire types shared with the backend API.
//!
//! These mirror the JSON bodies of the upload manager's HTTP endpoints and the
//! payloads carried by its push streams. Unknown fields are ignored so the
//! client keeps working when the server grows new ones.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------- FILE / JOB STATUS ----------------------

/// Per-file processing state as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileState {
    Pending,
    Analyzing,
    Ready,
    Uploading,
    Completed,
    Skipped,
    Failed,
}

impl FileState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileState::Pending => "pending",
            FileState::Analyzing => "analyzing",
            FileState::Ready => "ready",
            FileState::Uploading => "uploading",
            FileState::Completed => "completed",
            FileState::Skipped => "skipped",
            FileState::Failed => "failed",
        }
    }

    /// States that show an animated spinner while the server works on the file.
    pub fn is_active(&self) -> bool {
        matches!(self, FileState::Analyzing | FileState::Uploading)
    }

    /// Analysis has produced a verdict for this file.
    pub fn analysis_done(&self) -> bool {
        !matches!(self, FileState::Pending | FileState::Analyzing)
    }

    pub fn is_final(&self) -> bool {
        matches!(self, FileState::Completed | FileState::Skipped | FileState::Failed)
    }
}

/// Last known state of one file of the current job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileStatus {
    pub filename: String,
    pub status: FileState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_duplicate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size_formatted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
}

impl FileStatus {
    pub fn new(filename: impl Into<String>, status: FileState) -> Self {
        Self {
            filename: filename.into(),
            status,
            progress_percent: None,
            is_duplicate: None,
            error_message: None,
            file_size_formatted: None,
            file_size: None,
        }
    }

    pub fn duplicate(&self) -> bool {
        self.is_duplicate.unwrap_or(false)
    }

    /// `status` or `status:dup`; decides row rebuild vs. in-place update.
    pub fn composite_status(&self) -> String {
        if self.duplicate() {
            format!("{}:dup", self.status.as_str())
        } else {
            self.status.as_str().to_string()
        }
    }
}

/// Server-side job state carried by untyped progress snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Queued,
    Running,
    Analyzing,
    Uploading,
    Completed,
    Failed,
    #[serde(alias = "canceled")]
    Cancelled,
    #[serde(other)]
    Other,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed | JobState::Cancelled)
    }
}

/// Untyped job snapshot pushed while an upload is running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub job_id: String,
    pub status: JobState,
    #[serde(default)]
    pub progress_percent: f64,
    #[serde(default)]
    pub files: Vec<FileStatus>,
    #[serde(default)]
    pub files_completed: Option<u64>,
    #[serde(default)]
    pub total_files: Option<u64>,
    #[serde(default)]
    pub uploaded_bytes: Option<u64>,
    #[serde(default)]
    pub total_bytes: Option<u64>,
    #[serde(default)]
    pub eta_seconds: Option<f64>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Overall progress as rendered in the header bar. `progress_percent` is already
/// weighted into the 0..=100 band of the whole two-phase flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallProgress {
    pub progress_percent: f64,
    pub files_completed: u64,
    pub total_files: u64,
    pub uploaded_bytes: u64,
    pub total_bytes: u64,
    pub eta_seconds: Option<f64>,
}

/// Response of `GET /api/jobs/active`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveJob {
    pub job_id: String,
    pub status: JobState,
    /// "analysis" or "upload"
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub files: Vec<FileStatus>,
}

// ---------------------- FOLDERS ----------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderEntry {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub mcap_count: Option<u64>,
    #[serde(default)]
    pub modified: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub size_formatted: Option<String>,
    #[serde(default)]
    pub modified: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickLink {
    pub name: String,
    pub path: String,
}

/// Response of `GET /api/folders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderListing {
    #[serde(default)]
    pub folders: Vec<FolderEntry>,
    #[serde(default)]
    pub files: Vec<FileEntry>,
    #[serde(default)]
    pub breadcrumbs: Vec<Breadcrumb>,
    #[serde(default)]
    pub quick_links: Vec<QuickLink>,
    pub current_path: String,
    #[serde(default)]
    pub parent_path: Option<String>,
    #[serde(default)]
    pub mcap_count: u64,
}

// ---------------------- SCANS ----------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanFolderRequest {
    pub path: String,
    pub recursive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannedFile {
    pub path: String,
    pub name: String,
    /// Directory of the file relative to the scanned root ("" for the root itself).
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub size_formatted: Option<String>,
    #[serde(default)]
    pub modified: Option<String>,
    #[serde(default)]
    pub already_uploaded: bool,
}

/// Response of `POST /api/scan-folder`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanFolderResponse {
    pub path: String,
    #[serde(default)]
    pub files: Vec<ScannedFile>,
}

/// Response of `POST /api/scan-folder/async`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsyncScanResponse {
    pub scan_id: String,
}

/// Events of the background folder scan stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FolderScanEvent {
    /// One directory was scanned; counts cover the directory's own files only.
    FolderScanned { folder: String, total_files: u64, uploaded_files: u64 },
    ScanComplete { total_files: u64, uploaded_files: u64 },
    Error { message: String },
}

// ---------------------- JOBS ----------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkAnalyzeRequest {
    pub file_paths: Vec<String>,
    pub pre_filter_only: bool,
    pub auto_upload: bool,
    pub skip_duplicates: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreFilterStats {
    pub total_files: u64,
    pub new_files: u64,
    pub duplicate_files: u64,
    #[serde(default)]
    pub total_size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkAnalyzeResponse {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub pre_filter: Option<PreFilterStats>,
    #[serde(default)]
    pub message: Option<String>,
}

// ---------------------- SETTINGS / SYSTEM ----------------------

/// Upload settings. Unknown keys are carried through untouched on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub s3_bucket: String,
    #[serde(default)]
    pub s3_prefix: String,
    #[serde(default)]
    pub aws_region: String,
    #[serde(default = "default_concurrency")]
    pub upload_concurrency: u32,
    #[serde(default)]
    pub skip_duplicates: bool,
    #[serde(default)]
    pub auto_upload: bool,
    #[serde(default)]
    pub default_folder: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_concurrency() -> u32 {
    4
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    #[serde(default)]
    pub build: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateCheck {
    pub current_version: String,
    #[serde(default)]
    pub latest_version: Option<String>,
    #[serde(default)]
    pub update_available: bool,
    #[serde(default)]
    pub release_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: u64,
    #[serde(default)]
    pub uploaded_files: u64,
    #[serde(default)]
    pub total_size: u64,
    #[serde(default)]
    pub last_sync: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheActionResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub affected: u64,
}

// ---------------------- LOGS ----------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warning),
            "error" => Some(LogLevel::Error),
            "critical" => Some(LogLevel::Critical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// RFC 3339 timestamp
    pub timestamp: String,
    pub level: LogLevel,
    #[serde(default)]
    pub source: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogStats {
    pub total: u64,
    #[serde(default)]
    pub by_level: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogFile {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub modified: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LogQuery {
    pub level: Option<LogLevel>,
    pub search: Option<String>,
    pub limit: Option<usize>,
}
