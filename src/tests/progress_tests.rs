#[cfg(test)]
mod tests {
    use crate::metrics::Metrics;
    use crate::progress::{FrameScheduler, Phase, PhaseWeights, ProgressReconciler, RowChange, TickScheduler};
    use crate::types::{FileState, FileStatus, OverallProgress};

    fn status(name: &str, state: FileState) -> FileStatus {
        FileStatus::new(name, state)
    }

    fn uploading(name: &str, pct: f64) -> FileStatus {
        let mut s = status(name, FileState::Uploading);
        s.progress_percent = Some(pct);
        s
    }

    fn reconciler() -> (ProgressReconciler, TickScheduler) {
        (ProgressReconciler::new(Metrics::new()), TickScheduler::new())
    }

    #[test]
    fn test_last_write_wins_within_one_frame() {
        let (mut r, mut sched) = reconciler();
        r.queue_file_update(status("a.mcap", FileState::Pending), &mut sched);
        r.queue_file_update(status("a.mcap", FileState::Analyzing), &mut sched);
        let mut failed = status("a.mcap", FileState::Failed);
        failed.error_message = Some("corrupt header".into());
        r.queue_file_update(failed, &mut sched);

        let report = r.flush();
        assert_eq!(report.rebuilt, 1);
        let row = &r.rows().get("a.mcap").unwrap().row;
        assert_eq!(row.badge.label, "Failed");
        assert_eq!(row.error_text.as_deref(), Some("corrupt header"));
        assert_eq!(r.rendered_status("a.mcap"), Some("failed"));
    }

    #[test]
    fn test_overwritten_updates_are_counted_in_metrics() {
        let metrics = Metrics::new();
        let mut r = ProgressReconciler::new(metrics.clone());
        let mut sched = TickScheduler::new();
        r.queue_file_update(status("a.mcap", FileState::Pending), &mut sched);
        r.queue_file_update(status("a.mcap", FileState::Analyzing), &mut sched);
        r.queue_file_update(status("b.mcap", FileState::Pending), &mut sched);
        assert_eq!(metrics.get_snapshot().updates_superseded, 1);
    }

    #[test]
    fn test_queue_calls_coalesce_into_one_frame() {
        let (mut r, mut sched) = reconciler();
        for i in 0..50 {
            r.queue_file_update(status(&format!("f{}.mcap", i), FileState::Pending), &mut sched);
            r.queue_progress_snapshot(OverallProgress { progress_percent: i as f64, ..Default::default() }, &mut sched);
        }
        assert_eq!(sched.requests(), 1);
        assert!(sched.take_request());
        r.flush();

        r.queue_file_update(status("f0.mcap", FileState::Analyzing), &mut sched);
        assert_eq!(sched.requests(), 2);
    }

    #[test]
    fn test_empty_flush_is_noop() {
        let (mut r, mut sched) = reconciler();
        r.queue_file_update(status("a.mcap", FileState::Pending), &mut sched);
        r.flush();
        let revision = r.revision();

        let report = r.flush();
        assert!(report.is_noop());
        assert_eq!(r.revision(), revision);
    }

    #[test]
    fn test_snapshot_slot_keeps_only_newest() {
        let (mut r, mut sched) = reconciler();
        r.queue_progress_snapshot(
            OverallProgress { progress_percent: 10.0, files_completed: 1, total_files: 10, ..Default::default() },
            &mut sched,
        );
        r.queue_progress_snapshot(
            OverallProgress { progress_percent: 20.0, files_completed: 2, total_files: 10, ..Default::default() },
            &mut sched,
        );
        let report = r.flush();
        assert!(report.overall_applied);
        let overall = r.overall().unwrap();
        assert_eq!(overall.percent_text, "20.0%");
        assert_eq!(overall.files_text, "2 / 10 files");
    }

    #[test]
    fn test_queue_labels_follow_table_order() {
        let (mut r, mut sched) = reconciler();
        r.queue_file_update(status("a.mcap", FileState::Pending), &mut sched);
        r.queue_file_update(status("b.mcap", FileState::Analyzing), &mut sched);
        r.queue_file_update(status("c.mcap", FileState::Pending), &mut sched);
        r.queue_file_update(status("d.mcap", FileState::Pending), &mut sched);
        let report = r.flush();
        assert_eq!(report.queued, Some(3));

        let labels: Vec<Option<String>> = r.rows().iter().map(|k| k.row.queue_label.clone()).collect();
        assert_eq!(
            labels,
            vec![
                Some("Queued (1 of 3)".to_string()),
                None,
                Some("Queued (2 of 3)".to_string()),
                Some("Queued (3 of 3)".to_string()),
            ]
        );

        // a starts analyzing: everyone behind it moves up
        r.queue_file_update(status("a.mcap", FileState::Analyzing), &mut sched);
        r.flush();
        assert_eq!(r.rows().get("a.mcap").unwrap().row.queue_label, None);
        assert_eq!(r.rows().get("c.mcap").unwrap().row.queue_label.as_deref(), Some("Queued (1 of 2)"));
        assert_eq!(r.rows().get("d.mcap").unwrap().row.queue_label.as_deref(), Some("Queued (2 of 2)"));
    }

    #[test]
    fn test_upload_phase_queues_ready_files() {
        let (mut r, mut sched) = reconciler();
        r.queue_file_update(status("a.mcap", FileState::Ready), &mut sched);
        r.queue_file_update(status("b.mcap", FileState::Pending), &mut sched);
        r.flush();
        assert_eq!(r.rows().get("a.mcap").unwrap().row.queue_label, None);
        assert_eq!(r.rows().get("b.mcap").unwrap().row.queue_label.as_deref(), Some("Queued (1 of 1)"));

        r.set_phase(Phase::Upload, &mut sched);
        let report = r.flush();
        assert_eq!(report.queued, Some(1));
        assert_eq!(r.rows().get("a.mcap").unwrap().row.queue_label.as_deref(), Some("Queued (1 of 1)"));
        assert_eq!(r.rows().get("b.mcap").unwrap().row.queue_label, None);
    }

    #[test]
    fn test_duplicate_ready_file_still_counts_as_queued() {
        let (mut r, mut sched) = reconciler();
        r.set_phase(Phase::Upload, &mut sched);
        r.queue_file_update(status("a.mcap", FileState::Ready), &mut sched);
        let mut dup = status("b.mcap", FileState::Ready);
        dup.is_duplicate = Some(true);
        r.queue_file_update(dup, &mut sched);
        r.queue_file_update(status("c.mcap", FileState::Ready), &mut sched);

        let report = r.flush();
        assert_eq!(report.queued, Some(3));
        assert_eq!(r.rendered_status("b.mcap"), Some("ready:dup"));
        assert_eq!(r.rows().get("a.mcap").unwrap().row.queue_label.as_deref(), Some("Queued (1 of 3)"));
        assert_eq!(r.rows().get("b.mcap").unwrap().row.queue_label.as_deref(), Some("Queued (2 of 3)"));
        assert_eq!(r.rows().get("c.mcap").unwrap().row.queue_label.as_deref(), Some("Queued (3 of 3)"));
    }

    #[test]
    fn test_known_files_counts_rendered_and_buffered_once() {
        let (mut r, mut sched) = reconciler();
        r.queue_file_update(status("a.mcap", FileState::Pending), &mut sched);
        r.flush();
        r.queue_file_update(status("a.mcap", FileState::Analyzing), &mut sched);
        r.queue_file_update(status("b.mcap", FileState::Pending), &mut sched);
        assert_eq!(r.rows().len(), 1);
        assert_eq!(r.known_files(), 2);
    }

    #[test]
    fn test_progress_update_keeps_badge_identity() {
        let (mut r, mut sched) = reconciler();
        r.queue_file_update(uploading("a.mcap", 10.0), &mut sched);
        r.flush();
        let before = r.rows().get("a.mcap").unwrap().clone();
        assert!(before.row.badge.spinner);

        r.queue_file_update(uploading("a.mcap", 55.0), &mut sched);
        let report = r.flush();
        assert_eq!(report.updated, 1);
        assert_eq!(report.rebuilt, 0);

        let after = r.rows().get("a.mcap").unwrap();
        assert_eq!(after.identity, before.identity);
        assert_eq!(after.row.badge, before.row.badge);
        assert_eq!(after.row.bar_percent, Some(55.0));
        assert_eq!(after.row.progress_text, "55.0%");
    }

    #[test]
    fn test_duplicate_flag_forces_rebuild() {
        let (mut r, mut sched) = reconciler();
        r.queue_file_update(status("a.mcap", FileState::Ready), &mut sched);
        r.flush();
        let identity = r.rows().get("a.mcap").unwrap().identity;

        let mut dup = status("a.mcap", FileState::Ready);
        dup.is_duplicate = Some(true);
        r.queue_file_update(dup, &mut sched);
        assert_eq!(r.flush().rebuilt, 1);

        let row = r.rows().get("a.mcap").unwrap();
        assert_ne!(row.identity, identity);
        assert_eq!(row.row.badge.label, "Duplicate");
        assert_eq!(r.rendered_status("a.mcap"), Some("ready:dup"));
    }

    #[test]
    fn test_apply_file_status_reports_unchanged() {
        use crate::progress::rows::apply_file_status;
        use crate::view::KeyedTable;
        use std::collections::HashMap;

        let mut rows = KeyedTable::new();
        let mut cache = HashMap::new();
        assert_eq!(apply_file_status(&mut rows, &mut cache, &uploading("a.mcap", 5.0)), RowChange::Rebuilt);
        assert_eq!(apply_file_status(&mut rows, &mut cache, &uploading("a.mcap", 5.0)), RowChange::Unchanged);
        assert_eq!(apply_file_status(&mut rows, &mut cache, &uploading("a.mcap", 6.0)), RowChange::Updated);
    }

    #[test]
    fn test_latest_statuses_include_unflushed() {
        let (mut r, mut sched) = reconciler();
        r.seed(&[status("a.mcap", FileState::Pending), status("b.mcap", FileState::Pending)]);
        r.queue_file_update(status("b.mcap", FileState::Completed), &mut sched);
        r.queue_file_update(status("c.mcap", FileState::Failed), &mut sched);

        let latest: Vec<(String, FileState)> =
            r.latest_statuses().into_iter().map(|s| (s.filename, s.status)).collect();
        assert_eq!(
            latest,
            vec![
                ("a.mcap".to_string(), FileState::Pending),
                ("b.mcap".to_string(), FileState::Completed),
                ("c.mcap".to_string(), FileState::Failed),
            ]
        );
    }

    #[test]
    fn test_phase_weighting() {
        let w = PhaseWeights::default();
        assert_eq!(w.overall(Phase::Analysis, 5.0 / 10.0), 35.0);
        assert_eq!(w.overall(Phase::Upload, 50.0 / 100.0), 85.0);
        assert_eq!(w.overall(Phase::Upload, 1.5), 100.0);
        assert_eq!(w.overall(Phase::Analysis, f64::NAN), 0.0);
    }

    #[test]
    fn test_phase_weights_must_sum_to_100() {
        assert!(PhaseWeights::new(60.0, 40.0).is_ok());
        assert!(PhaseWeights::new(60.0, 30.0).is_err());
        assert!(PhaseWeights::new(-10.0, 110.0).is_err());
    }

    #[test]
    fn test_boxed_scheduler_forwards() {
        let mut boxed: Box<TickScheduler> = Box::new(TickScheduler::new());
        boxed.request_frame();
        assert!(boxed.is_requested());
    }
}
