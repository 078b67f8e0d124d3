//! End-to-end tests of the native transport against an in-process mock of the
//! upload manager (axum, real sockets, real SSE).

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::convert::Infallible;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::response::sse::{Event, KeepAlive, Sse};
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use chrono::Utc;
    use serde_json::{json, Value};
    use tokio::sync::mpsc::UnboundedReceiver;

    use crate::api::ApiClient;
    use crate::browser::FolderBrowser;
    use crate::completion::{CompletionOutcome, CompletionSummary};
    use crate::config::UiConfig;
    use crate::native::{ReqwestTransport, SseConnector, StreamEnvelope};
    use crate::progress::{ConsumerOutcome, TickScheduler};
    use crate::scan::ScanUpdate;
    use crate::state::Session;
    use crate::types::ScanFolderRequest;
    use crate::upload::{self, JobStart, UploadOptions};

    fn job_script() -> Vec<Value> {
        vec![
            json!({"type": "analysis_progress", "file": {"filename": "a.mcap", "status": "ready"}, "total_files": 2}),
            json!({"type": "analysis_progress", "file": {"filename": "b.mcap", "status": "ready"}, "total_files": 2}),
            json!({"type": "analysis_complete", "auto_upload": true}),
            json!({"type": "auto_upload_starting"}),
            json!({
                "job_id": "job-1", "status": "uploading", "progress_percent": 50.0,
                "files": [{"filename": "a.mcap", "status": "completed", "file_size": 1000}]
            }),
            json!({
                "job_id": "job-1", "status": "completed", "progress_percent": 100.0,
                "files": [
                    {"filename": "a.mcap", "status": "completed", "file_size": 1000},
                    {"filename": "b.mcap", "status": "completed", "file_size": 500, "is_duplicate": true}
                ]
            }),
        ]
    }

    fn scan_script() -> Vec<Value> {
        vec![
            json!({"type": "folder_scanned", "folder": "/data/sub1", "total_files": 4, "uploaded_files": 4}),
            json!({"type": "folder_scanned", "folder": "/data/sub2", "total_files": 3, "uploaded_files": 0}),
            json!({"type": "scan_complete", "total_files": 7, "uploaded_files": 4}),
        ]
    }

    fn sse_of(script: Vec<Value>) -> Response {
        let events: Vec<Result<Event, Infallible>> =
            script.into_iter().map(|v| Ok(Event::default().data(v.to_string()))).collect();
        Sse::new(tokio_stream::iter(events))
            .keep_alive(KeepAlive::new().interval(Duration::from_secs(10)).text("keep-alive"))
            .into_response()
    }

    async fn folders(Query(q): Query<HashMap<String, String>>) -> Response {
        match q.get("path").map(|s| s.as_str()) {
            Some("/missing") => (StatusCode::NOT_FOUND, Json(json!({"detail": "Folder not found"}))).into_response(),
            Some(p) => Json(json!({"current_path": p, "folders": []})).into_response(),
            None => Json(json!({
                "current_path": "/data",
                "folders": [{"name": "sub1", "path": "/data/sub1"}, {"name": "sub2", "path": "/data/sub2"}]
            }))
            .into_response(),
        }
    }

    async fn bulk_analyze(Json(body): Json<Value>) -> Response {
        if body["file_paths"].as_array().map(|a| a.is_empty()).unwrap_or(true) {
            return (StatusCode::BAD_REQUEST, Json(json!({"error": "file_paths is empty"}))).into_response();
        }
        Json(json!({"job_id": "job-1"})).into_response()
    }

    async fn job_events(Path(job_id): Path<String>) -> Response {
        if job_id != "job-1" {
            return (StatusCode::NOT_FOUND, Json(json!({"detail": "Job not found"}))).into_response();
        }
        sse_of(job_script())
    }

    async fn scan_events(Path(_scan_id): Path<String>) -> Response {
        sse_of(scan_script())
    }

    async fn spawn_server() -> String {
        let app = Router::new()
            .route("/api/folders", get(folders))
            .route("/api/bulk-analyze", post(bulk_analyze))
            .route("/api/jobs/{job_id}/events", get(job_events))
            .route("/api/scan-folder/async", post(|| async { Json(json!({"scan_id": "scan-1"})) }))
            .route("/api/scan-folder/{scan_id}/events", get(scan_events));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    struct Harness {
        api: ApiClient<ReqwestTransport>,
        session: Session<SseConnector, TickScheduler>,
        events: UnboundedReceiver<StreamEnvelope>,
    }

    async fn harness() -> Harness {
        let base = spawn_server().await;
        let api = ApiClient::new(ReqwestTransport::new(&base, Duration::from_secs(5)).unwrap());
        let (connector, events) = SseConnector::new(&base).unwrap();
        let session = Session::new(Arc::new(UiConfig::default()), connector, TickScheduler::new());
        Harness { api, session, events }
    }

    /// Pump progress messages until a terminal outcome.
    async fn run_job(h: &mut Harness) -> Result<CompletionSummary, String> {
        let pump = async {
            loop {
                let env = h.events.recv().await.expect("event channel closed");
                if Some(env.stream_id) != h.session.progress.connection_id() {
                    continue;
                }
                match h.session.handle_progress(env.message, Utc::now()) {
                    ConsumerOutcome::Finished(summary) => return Ok(summary),
                    ConsumerOutcome::Failed(message) => return Err(message),
                    ConsumerOutcome::Continue | ConsumerOutcome::Ignored => {}
                }
            }
        };
        tokio::time::timeout(Duration::from_secs(10), pump).await.expect("job did not finish")
    }

    #[tokio::test]
    async fn test_upload_job_end_to_end() {
        let mut h = harness().await;
        let start = upload::request_job(
            &h.api,
            vec!["/data/a.mcap".into(), "/data/b.mcap".into()],
            UploadOptions { auto_upload: true, ..Default::default() },
        )
        .await
        .unwrap();
        let JobStart::Started { job_id, files, .. } = start else {
            panic!("expected a job");
        };
        h.session.begin_job(&job_id, &files, Utc::now()).unwrap();

        let summary = run_job(&mut h).await.unwrap();
        assert_eq!(summary.outcome, CompletionOutcome::Completed);
        assert_eq!(summary.counts.completed, 2);
        assert_eq!(summary.counts.duplicates, 1);
        assert_eq!(summary.uploaded_bytes, 1000);
        assert!(!h.session.progress.is_open());
        assert!(h.session.completion_table.is_some());
    }

    #[tokio::test]
    async fn test_unknown_job_stream_fails_once() {
        let mut h = harness().await;
        h.session.begin_job("job-404", &["x.mcap".into()], Utc::now()).unwrap();
        let err = run_job(&mut h).await.unwrap_err();
        assert_eq!(err, "Connection to server lost");
        assert!(!h.session.progress.is_open());
    }

    #[tokio::test]
    async fn test_server_error_body_reaches_caller() {
        let h = harness().await;
        let req = crate::types::BulkAnalyzeRequest {
            file_paths: vec![],
            pre_filter_only: false,
            auto_upload: false,
            skip_duplicates: false,
        };
        let err = h.api.bulk_analyze(&req).await.unwrap_err();
        assert_eq!(err.to_string(), "file_paths is empty (HTTP 400)");
    }

    #[tokio::test]
    async fn test_missing_folder_falls_back_to_root() {
        let h = harness().await;
        let mut browser = FolderBrowser::new(50);
        browser.open(&h.api, Some("/missing")).await.unwrap();
        assert_eq!(browser.current_path(), Some("/data"));
        assert_eq!(browser.rows().len(), 2);
    }

    #[tokio::test]
    async fn test_background_scan_badges() {
        let mut h = harness().await;
        h.session.browser.open(&h.api, None).await.unwrap();
        let resp = h
            .api
            .start_async_scan(&ScanFolderRequest { path: "/data".into(), recursive: true })
            .await
            .unwrap();
        h.session.scan.attach("/data", &resp.scan_id).unwrap();
        h.session.browser.mark_scanning();

        let pump = async {
            loop {
                let env = h.events.recv().await.expect("event channel closed");
                if Some(env.stream_id) != h.session.scan.connection_id() {
                    continue;
                }
                if let ScanUpdate::Complete { upload_enabled, .. } = h.session.handle_scan(env.message) {
                    return upload_enabled;
                }
            }
        };
        let upload_enabled = tokio::time::timeout(Duration::from_secs(10), pump).await.unwrap();

        assert!(upload_enabled);
        assert_eq!(h.session.browser.row("sub1").unwrap().badge.unwrap().label(), "✓ all uploaded");
        assert_eq!(h.session.browser.row("sub2").unwrap().badge.unwrap().label(), "3 mcap");
    }
}
