#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::browser::FolderBrowser;
    use crate::scan::{Counts, FolderBadge, ScanAggregator, ScanSession, ScanUpdate};
    use crate::tests::fakes::FakeConnector;
    use crate::types::{FolderEntry, FolderListing, FolderScanEvent};

    fn scanned(folder: &str, total: u64, uploaded: u64) -> String {
        json!({"type": "folder_scanned", "folder": folder, "total_files": total, "uploaded_files": uploaded})
            .to_string()
    }

    fn listing(root: &str, children: &[&str]) -> FolderListing {
        FolderListing {
            folders: children
                .iter()
                .map(|c| FolderEntry {
                    name: c.to_string(),
                    path: format!("{}/{}", root, c),
                    mcap_count: None,
                    modified: None,
                })
                .collect(),
            files: Vec::new(),
            breadcrumbs: Vec::new(),
            quick_links: Vec::new(),
            current_path: root.to_string(),
            parent_path: None,
            mcap_count: 0,
        }
    }

    #[test]
    fn test_badge_labels() {
        assert_eq!(FolderBadge::from_counts(Counts { total: 0, uploaded: 0 }).label(), "no mcap");
        assert_eq!(FolderBadge::from_counts(Counts { total: 4, uploaded: 4 }).label(), "✓ all uploaded");
        assert_eq!(FolderBadge::from_counts(Counts { total: 3, uploaded: 0 }).label(), "3 mcap");
        assert_eq!(FolderBadge::from_counts(Counts { total: 5, uploaded: 2 }).label(), "3 of 5 mcap new");
        assert_eq!(FolderBadge::Scanning.label(), "scanning…");
    }

    #[test]
    fn test_two_subfolder_scan_scenario() {
        let conn = FakeConnector::new();
        let mut session = ScanSession::new(conn.clone());
        let mut browser = FolderBrowser::new(50);
        browser.set_listing(listing("/data", &["sub1", "sub2"]));

        session.attach("/data", "scan-1").unwrap();
        browser.mark_scanning();
        assert_eq!(conn.opened_paths(), vec!["/api/scan-folder/scan-1/events".to_string()]);

        for msg in [
            scanned("/data/sub1", 4, 4),
            scanned("/data/sub2", 3, 0),
            json!({"type": "scan_complete", "total_files": 7, "uploaded_files": 4}).to_string(),
        ] {
            let update = session.handle_message(&msg);
            browser.apply_scan_update(&update);
        }

        assert_eq!(browser.row("sub1").unwrap().badge.unwrap().label(), "✓ all uploaded");
        assert_eq!(browser.row("sub2").unwrap().badge.unwrap().label(), "3 mcap");
        assert!(browser.upload_enabled());
        assert!(!session.is_streaming());
        assert_eq!(conn.open_count(), 0);
    }

    #[test]
    fn test_badge_update_touches_one_row() {
        let mut browser = FolderBrowser::new(50);
        browser.set_listing(listing("/data", &["a", "b"]));
        let before_b = browser.rows().get("b").unwrap().identity;
        let rev = browser.rows().revision();

        let changed = browser.apply_scan_update(&ScanUpdate::Badge {
            child: "a".into(),
            badge: FolderBadge::Pending { pending: 1, total: 1 },
        });
        assert!(changed);
        assert_eq!(browser.rows().get("b").unwrap().identity, before_b);
        assert!(browser.rows().revision() > rev);
        assert_eq!(browser.row("b").unwrap().badge, None);
    }

    #[test]
    fn test_nested_folders_sum_into_child() {
        let mut agg = ScanAggregator::new("/data/");
        agg.ingest(FolderScanEvent::FolderScanned { folder: "/data/sub1".into(), total_files: 2, uploaded_files: 0 });
        let update = agg.ingest(FolderScanEvent::FolderScanned {
            folder: "/data/sub1/deeper/more".into(),
            total_files: 3,
            uploaded_files: 1,
        });
        assert_eq!(
            update,
            ScanUpdate::Badge { child: "sub1".into(), badge: FolderBadge::Pending { pending: 4, total: 5 } }
        );

        // a re-report of the same folder replaces its counts
        agg.ingest(FolderScanEvent::FolderScanned {
            folder: "/data/sub1/deeper/more".into(),
            total_files: 3,
            uploaded_files: 3,
        });
        assert_eq!(agg.child_counts("sub1"), Some(Counts { total: 5, uploaded: 3 }));
    }

    #[test]
    fn test_windows_and_relative_paths() {
        let mut agg = ScanAggregator::new("C:\\logs");
        let update = agg.ingest(FolderScanEvent::FolderScanned {
            folder: "C:\\logs\\run7".into(),
            total_files: 1,
            uploaded_files: 0,
        });
        assert!(matches!(update, ScanUpdate::Badge { ref child, .. } if child == "run7"));

        let update = agg.ingest(FolderScanEvent::FolderScanned { folder: "./run8/x".into(), total_files: 2, uploaded_files: 2 });
        assert!(matches!(update, ScanUpdate::Badge { ref child, .. } if child == "run8"));
    }

    #[test]
    fn test_folder_outside_root_with_shared_prefix_is_ignored() {
        let mut agg = ScanAggregator::new("/data");
        let update = agg.ingest(FolderScanEvent::FolderScanned { folder: "/database/x".into(), total_files: 3, uploaded_files: 0 });
        assert_eq!(update, ScanUpdate::Ignored);
        assert_eq!(agg.child_counts("database"), None);
        assert_eq!(agg.totals(), Counts::default());
    }

    #[test]
    fn test_reopening_scanned_folder_keeps_badges() {
        let mut session = ScanSession::new(FakeConnector::new());
        let mut browser = FolderBrowser::new(50);
        browser.set_listing(listing("/data", &["sub1", "sub2"]));
        session.attach("/data", "scan-1").unwrap();
        browser.mark_scanning();
        let update = session.handle_message(&scanned("/data/sub1", 4, 4));
        browser.apply_scan_update(&update);

        // same folder listed again, scan keeps running
        browser.set_listing(listing("/data", &["sub1", "sub2"]));
        assert!(!session.needs_restart("/data"));
        browser.restore_scan(session.aggregator().unwrap());
        assert_eq!(browser.row("sub1").unwrap().badge, Some(FolderBadge::AllUploaded { total: 4 }));
        assert_eq!(browser.row("sub2").unwrap().badge, Some(FolderBadge::Scanning));

        for msg in [
            scanned("/data/sub2", 3, 0),
            json!({"type": "scan_complete", "total_files": 7, "uploaded_files": 4}).to_string(),
        ] {
            let update = session.handle_message(&msg);
            browser.apply_scan_update(&update);
        }
        assert_eq!(browser.row("sub1").unwrap().badge, Some(FolderBadge::AllUploaded { total: 4 }));
        assert_eq!(browser.row("sub2").unwrap().badge, Some(FolderBadge::Pending { pending: 3, total: 3 }));
    }

    #[test]
    fn test_restore_scan_skips_other_folder() {
        let mut session = ScanSession::new(FakeConnector::new());
        let mut browser = FolderBrowser::new(50);
        session.attach("/data", "scan-1").unwrap();
        session.handle_message(&scanned("/data/a", 1, 0));
        browser.set_listing(listing("/other", &["a"]));
        browser.restore_scan(session.aggregator().unwrap());
        assert_eq!(browser.row("a").unwrap().badge, None);
    }

    #[test]
    fn test_root_files_are_tracked_separately() {
        let mut agg = ScanAggregator::new("/data");
        let update = agg.ingest(FolderScanEvent::FolderScanned { folder: "/data".into(), total_files: 2, uploaded_files: 1 });
        assert_eq!(update, ScanUpdate::RootFiles(Counts { total: 2, uploaded: 1 }));
        assert_eq!(agg.totals(), Counts { total: 2, uploaded: 1 });
    }

    #[test]
    fn test_complete_with_nothing_pending_disables_upload() {
        let mut agg = ScanAggregator::new("/data");
        let update = agg.ingest(FolderScanEvent::ScanComplete { total_files: 4, uploaded_files: 4 });
        assert_eq!(update, ScanUpdate::Complete { totals: Counts { total: 4, uploaded: 4 }, upload_enabled: false });
    }

    #[test]
    fn test_restart_returns_previous_scan_and_closes_stream() {
        let conn = FakeConnector::new();
        let mut session = ScanSession::new(conn.clone());
        assert_eq!(session.attach("/data", "scan-1").unwrap(), None);
        assert!(!session.needs_restart("/data/"));
        assert!(session.needs_restart("/other"));

        let previous = session.attach("/other", "scan-2").unwrap();
        assert_eq!(previous.as_deref(), Some("scan-1"));
        assert_eq!(conn.closed_count(), 1);
        assert_eq!(conn.open_count(), 1);
        assert_eq!(session.scan_id(), Some("scan-2"));
    }

    #[test]
    fn test_messages_after_complete_are_ignored() {
        let mut session = ScanSession::new(FakeConnector::new());
        session.attach("/data", "scan-1").unwrap();
        session.handle_message(&json!({"type": "scan_complete", "total_files": 1, "uploaded_files": 0}).to_string());
        assert_eq!(session.handle_message(&scanned("/data/a", 1, 0)), ScanUpdate::Ignored);
    }

    #[test]
    fn test_malformed_scan_message_is_ignored() {
        let mut session = ScanSession::new(FakeConnector::new());
        session.attach("/data", "scan-1").unwrap();
        assert_eq!(session.handle_message("nonsense"), ScanUpdate::Ignored);
        assert!(session.is_streaming());
    }

    #[test]
    fn test_scan_error_clears_scanning_badges() {
        let conn = FakeConnector::new();
        let mut session = ScanSession::new(conn.clone());
        let mut browser = FolderBrowser::new(50);
        browser.set_listing(listing("/data", &["a"]));
        session.attach("/data", "scan-1").unwrap();
        browser.mark_scanning();

        let update = session.handle_message(&json!({"type": "error", "message": "permission denied"}).to_string());
        assert_eq!(update, ScanUpdate::Failed("permission denied".into()));
        browser.apply_scan_update(&update);
        assert_eq!(browser.row("a").unwrap().badge, None);
        assert_eq!(conn.open_count(), 0);
        assert_eq!(session.scan_id(), None);
    }

    #[test]
    fn test_transport_error_reported_once() {
        let mut session = ScanSession::new(FakeConnector::new());
        session.attach("/data", "scan-1").unwrap();
        assert!(matches!(session.handle_transport_error("reset"), ScanUpdate::Failed(_)));
        assert_eq!(session.handle_transport_error("reset"), ScanUpdate::Ignored);
    }
}
