//! Typed client for the upload manager's HTTP API.
//!
//! The transport is a seam: reqwasm in the browser, reqwest natively, an
//! in-memory fake in tests. [`ApiClient`] only builds paths and bodies and
//! turns non-2xx responses into [`UiError::Http`] with the server's message.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{UiError, UiResult};
use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path and query, relative to the base URL.
    pub path: String,
    /// JSON body
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request. Implementations map transport failures to [`UiError::Network`]
/// and return every HTTP response, successful or not.
#[async_trait(?Send)]
pub trait HttpTransport {
    async fn send(&self, request: ApiRequest) -> UiResult<ApiResponse>;
}

pub mod routes {
    pub fn folders(path: Option<&str>) -> String {
        match path {
            Some(p) if !p.is_empty() => format!("/api/folders?path={}", urlencoding::encode(p)),
            _ => "/api/folders".to_string(),
        }
    }

    pub const SCAN_FOLDER: &str = "/api/scan-folder";
    pub const SCAN_FOLDER_ASYNC: &str = "/api/scan-folder/async";

    pub fn scan_events(scan_id: &str) -> String {
        format!("/api/scan-folder/{}/events", urlencoding::encode(scan_id))
    }

    pub fn scan_cancel(scan_id: &str) -> String {
        format!("/api/scan-folder/{}/cancel", urlencoding::encode(scan_id))
    }

    pub const BULK_ANALYZE: &str = "/api/bulk-analyze";
    pub const ACTIVE_JOB: &str = "/api/jobs/active";

    pub fn job_events(job_id: &str) -> String {
        format!("/api/jobs/{}/events", urlencoding::encode(job_id))
    }

    pub fn job_cancel(job_id: &str) -> String {
        format!("/api/jobs/{}/cancel", urlencoding::encode(job_id))
    }

    pub const SETTINGS: &str = "/api/settings";
    pub const VERSION: &str = "/api/version";
    pub const VERSION_CHECK: &str = "/api/version/check";
    pub const CACHE_STATS: &str = "/api/cache/stats";
    pub const CACHE_SYNC: &str = "/api/cache/sync";
    pub const CACHE_INVALIDATE: &str = "/api/cache/invalidate";
    pub const LOG_STATS: &str = "/api/logs/stats";
    pub const LOG_FILES: &str = "/api/logs/files";

    pub fn logs(q: &crate::types::LogQuery) -> String {
        let mut qs = vec![];
        if let Some(l) = q.level {
            qs.push(format!("level={}", l.as_str()));
        }
        if let Some(s) = q.search.as_deref().filter(|s| !s.trim().is_empty()) {
            qs.push(format!("search={}", urlencoding::encode(s.trim())));
        }
        if let Some(l) = q.limit {
            qs.push(format!("limit={}", l));
        }
        if qs.is_empty() {
            "/api/logs".to_string()
        } else {
            format!("/api/logs?{}", qs.join("&"))
        }
    }
}

pub struct ApiClient<T: HttpTransport> {
    transport: T,
}

impl<T: HttpTransport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn request<R: DeserializeOwned>(&self, method: Method, path: String, body: Option<String>) -> UiResult<R> {
        debug!(method = method.as_str(), path = %path, "api request");
        let resp = self.transport.send(ApiRequest { method, path, body }).await?;
        if !resp.is_success() {
            return Err(UiError::from_response(resp.status, &resp.body));
        }
        let body = if resp.body.trim().is_empty() { "null" } else { resp.body.as_str() };
        Ok(serde_json::from_str(body)?)
    }

    async fn get<R: DeserializeOwned>(&self, path: String) -> UiResult<R> {
        self.request(Method::Get, path, None).await
    }

    async fn post<B: Serialize, R: DeserializeOwned>(&self, path: String, body: &B) -> UiResult<R> {
        let json = serde_json::to_string(body)?;
        self.request(Method::Post, path, Some(json)).await
    }

    async fn post_empty<R: DeserializeOwned>(&self, path: String) -> UiResult<R> {
        self.request(Method::Post, path, None).await
    }

    pub async fn list_folders(&self, path: Option<&str>) -> UiResult<FolderListing> {
        self.get(routes::folders(path)).await
    }

    pub async fn scan_folder(&self, req: &ScanFolderRequest) -> UiResult<ScanFolderResponse> {
        self.post(routes::SCAN_FOLDER.to_string(), req).await
    }

    pub async fn start_async_scan(&self, req: &ScanFolderRequest) -> UiResult<AsyncScanResponse> {
        self.post(routes::SCAN_FOLDER_ASYNC.to_string(), req).await
    }

    pub async fn cancel_scan(&self, scan_id: &str) -> UiResult<()> {
        let _: serde_json::Value = self.post_empty(routes::scan_cancel(scan_id)).await?;
        Ok(())
    }

    pub async fn bulk_analyze(&self, req: &BulkAnalyzeRequest) -> UiResult<BulkAnalyzeResponse> {
        self.post(routes::BULK_ANALYZE.to_string(), req).await
    }

    pub async fn cancel_job(&self, job_id: &str) -> UiResult<()> {
        let _: serde_json::Value = self.post_empty(routes::job_cancel(job_id)).await?;
        Ok(())
    }

    /// `None` when no job is running.
    pub async fn active_job(&self) -> UiResult<Option<ActiveJob>> {
        self.get(routes::ACTIVE_JOB.to_string()).await
    }

    pub async fn get_settings(&self) -> UiResult<Settings> {
        self.get(routes::SETTINGS.to_string()).await
    }

    pub async fn save_settings(&self, settings: &Settings) -> UiResult<Settings> {
        let json = serde_json::to_string(settings)?;
        self.request(Method::Put, routes::SETTINGS.to_string(), Some(json)).await
    }

    pub async fn version(&self) -> UiResult<VersionInfo> {
        self.get(routes::VERSION.to_string()).await
    }

    pub async fn check_update(&self) -> UiResult<UpdateCheck> {
        self.get(routes::VERSION_CHECK.to_string()).await
    }

    pub async fn cache_stats(&self) -> UiResult<CacheStats> {
        self.get(routes::CACHE_STATS.to_string()).await
    }

    pub async fn sync_cache(&self) -> UiResult<CacheActionResponse> {
        self.post_empty(routes::CACHE_SYNC.to_string()).await
    }

    pub async fn invalidate_cache(&self) -> UiResult<CacheActionResponse> {
        self.post_empty(routes::CACHE_INVALIDATE.to_string()).await
    }

    pub async fn logs(&self, query: &LogQuery) -> UiResult<Vec<LogEntry>> {
        self.get(routes::logs(query)).await
    }

    pub async fn log_stats(&self) -> UiResult<LogStats> {
        self.get(routes::LOG_STATS.to_string()).await
    }

    pub async fn log_files(&self) -> UiResult<Vec<LogFile>> {
        self.get(routes::LOG_FILES.to_string()).await
    }
}
