#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use crate::api::{routes, Method};
    use crate::config::UiConfig;
    use crate::error::UiError;
    use crate::progress::{ConsumerOutcome, Phase, TickScheduler};
    use crate::state::{Session, PANEL_COMPLETION, PANEL_ERROR, PANEL_PROGRESS};
    use crate::stream::StreamMessage;
    use crate::tests::fakes::{FakeConnector, FakeTransport};
    use crate::types::ScanFolderResponse;
    use crate::upload::{self, JobStart, UploadOptions};

    fn session() -> (Session<FakeConnector, TickScheduler>, FakeConnector) {
        let conn = FakeConnector::new();
        let s = Session::new(Arc::new(UiConfig::default()), conn.clone(), TickScheduler::new());
        (s, conn)
    }

    #[tokio::test]
    async fn test_request_job_sends_paths_and_returns_basenames() {
        let transport = FakeTransport::new();
        transport.on(Method::Post, routes::BULK_ANALYZE, 200, r#"{"job_id":"job-7"}"#);
        let api = transport.client();

        let start = upload::request_job(
            &api,
            vec!["/data/run/a.mcap".into(), "C:\\logs\\b.mcap".into()],
            UploadOptions { auto_upload: true, ..Default::default() },
        )
        .await
        .unwrap();
        assert_eq!(
            start,
            JobStart::Started { job_id: "job-7".into(), files: vec!["a.mcap".into(), "b.mcap".into()], pre_filter: None }
        );

        let requests = transport.requests.borrow();
        let body: serde_json::Value = serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["auto_upload"], json!(true));
        assert_eq!(body["pre_filter_only"], json!(false));
        assert_eq!(body["file_paths"][1], json!("C:\\logs\\b.mcap"));
    }

    #[tokio::test]
    async fn test_request_job_without_files_sends_nothing() {
        let transport = FakeTransport::new();
        let err = upload::request_job(&transport.client(), vec![], UploadOptions::default()).await.unwrap_err();
        assert!(matches!(err, UiError::Validation { .. }));
        assert!(transport.request_paths().is_empty());
    }

    #[tokio::test]
    async fn test_pre_filter_only_returns_stats() {
        let transport = FakeTransport::new();
        transport.on(
            Method::Post,
            routes::BULK_ANALYZE,
            200,
            r#"{"pre_filter":{"total_files":3,"new_files":2,"duplicate_files":1,"total_size":300}}"#,
        );
        let opts = UploadOptions { pre_filter_only: true, ..Default::default() };
        let start = upload::request_job(&transport.client(), vec!["/a.mcap".into()], opts).await.unwrap();
        match start {
            JobStart::PreFilter(stats) => assert_eq!(stats.new_files, 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_job_id_is_an_error() {
        let transport = FakeTransport::new();
        transport.on(Method::Post, routes::BULK_ANALYZE, 200, r#"{"message":"queue full"}"#);
        let err = upload::request_job(&transport.client(), vec!["/a.mcap".into()], UploadOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Decode error: queue full");
    }

    #[tokio::test]
    async fn test_server_error_message_is_surfaced() {
        let transport = FakeTransport::new();
        transport.on(Method::Post, routes::BULK_ANALYZE, 400, r#"{"error":{"message":"Bucket not configured"}}"#);
        let err = upload::request_job(&transport.client(), vec!["/a.mcap".into()], UploadOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Bucket not configured (HTTP 400)");
    }

    #[tokio::test]
    async fn test_find_active_job_skips_terminal_jobs() {
        let transport = FakeTransport::new();
        transport.on(Method::Get, routes::ACTIVE_JOB, 200, r#"{"job_id":"j1","status":"completed"}"#);
        assert_eq!(upload::find_active_job(&transport.client()).await.unwrap(), None);

        let transport = FakeTransport::new();
        transport.on(Method::Get, routes::ACTIVE_JOB, 200, "null");
        assert_eq!(upload::find_active_job(&transport.client()).await.unwrap(), None);

        let transport = FakeTransport::new();
        transport.on(Method::Get, routes::ACTIVE_JOB, 200, r#"{"job_id":"j2","status":"uploading","phase":"upload"}"#);
        let job = upload::find_active_job(&transport.client()).await.unwrap().unwrap();
        assert_eq!(job.job_id, "j2");
    }

    #[test]
    fn test_begin_job_seeds_pending_rows_and_shows_progress() {
        let (mut s, conn) = session();
        s.begin_job("job-1", &["a.mcap".into(), "b.mcap".into()], Utc::now()).unwrap();
        s.progress.flush();

        assert_eq!(conn.opened_paths(), vec!["/api/jobs/job-1/events".to_string()]);
        assert_eq!(s.progress.reconciler().rows().len(), 2);
        assert_eq!(s.progress.reconciler().rendered_status("a.mcap"), Some("pending"));
        assert!(s.panels.is_visible(PANEL_PROGRESS));
        assert_eq!(s.job_id.as_deref(), Some("job-1"));
    }

    #[test]
    fn test_second_job_replaces_first_connection() {
        let (mut s, conn) = session();
        s.begin_job("job-1", &["a.mcap".into()], Utc::now()).unwrap();
        s.begin_job("job-2", &["b.mcap".into()], Utc::now()).unwrap();
        assert_eq!(conn.open_count(), 1);
        assert_eq!(conn.closed_count(), 1);
        assert!(s.progress.reconciler().latest_statuses().iter().all(|f| f.filename == "b.mcap"));
    }

    #[test]
    fn test_finished_job_shows_completion_with_elapsed_time() {
        let (mut s, _conn) = session();
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
        s.begin_job("job-1", &["a.mcap".into()], start).unwrap();

        let done = json!({
            "job_id": "job-1",
            "status": "completed",
            "progress_percent": 100.0,
            "files": [{"filename": "a.mcap", "status": "completed", "file_size": 10}]
        })
        .to_string();
        let outcome = s.handle_progress(StreamMessage::Data(done), start + chrono::Duration::seconds(42));
        assert!(matches!(outcome, ConsumerOutcome::Finished(_)));

        let summary = s.completion.as_ref().unwrap();
        assert_eq!(summary.elapsed_text(), "42s");
        assert_eq!(s.completion_table.as_ref().unwrap().rows().len(), 1);
        assert!(s.panels.is_visible(PANEL_COMPLETION));
        assert!(!s.panels.is_visible(PANEL_PROGRESS));
        assert_eq!(s.notifications.len(), 1);
    }

    #[test]
    fn test_server_error_shows_error_panel() {
        let (mut s, _conn) = session();
        s.begin_job("job-1", &["a.mcap".into()], Utc::now()).unwrap();
        let outcome = s.handle_progress(StreamMessage::Data(r#"{"error":"disk full"}"#.into()), Utc::now());
        assert_eq!(outcome, ConsumerOutcome::Failed("disk full".into()));
        assert!(s.panels.is_visible(PANEL_ERROR));
        assert_eq!(s.panels.text(PANEL_ERROR), Some("disk full"));
        assert!(s.completion.is_none());
    }

    #[test]
    fn test_resume_in_upload_phase() {
        let (mut s, _conn) = session();
        let job = serde_json::from_value(json!({
            "job_id": "j2",
            "status": "uploading",
            "files": [
                {"filename": "a.mcap", "status": "completed"},
                {"filename": "b.mcap", "status": "ready"}
            ]
        }))
        .unwrap();
        s.resume_job(&job, Utc::now()).unwrap();
        s.progress.flush();
        assert_eq!(s.progress.phase(), Phase::Upload);
        assert_eq!(
            s.progress.reconciler().rows().get("b.mcap").unwrap().row.queue_label.as_deref(),
            Some("Queued (1 of 1)")
        );
    }

    #[test]
    fn test_cancel_closes_stream_and_forgets_job() {
        let (mut s, conn) = session();
        s.begin_job("job-1", &["a.mcap".into()], Utc::now()).unwrap();
        s.cancel_job_locally();
        assert_eq!(conn.open_count(), 0);
        assert!(s.job_id.is_none());
        assert_eq!(
            s.handle_progress(StreamMessage::Data(r#"{"type":"auto_upload_starting"}"#.into()), Utc::now()),
            ConsumerOutcome::Ignored
        );
    }

    #[test]
    fn test_empty_scan_result_notifies_warning() {
        let (mut s, _conn) = session();
        let err = s.set_scan_result(ScanFolderResponse { path: "/x".into(), files: vec![] }).unwrap_err();
        assert!(matches!(err, UiError::Validation { .. }));
        assert_eq!(s.notifications.iter().next().unwrap().message, "No .mcap files found in /x");
        assert!(s.review.is_none());
    }

    #[test]
    fn test_reset_closes_every_stream() {
        let (mut s, conn) = session();
        s.begin_job("job-1", &["a.mcap".into()], Utc::now()).unwrap();
        s.scan.attach("/data", "scan-1").unwrap();
        assert_eq!(conn.open_count(), 2);
        s.reset();
        assert_eq!(conn.open_count(), 0);
        assert!(s.job_id.is_none());
        assert!(s.scan.scan_id().is_none());
    }
}
