//! Background folder scan: per-child-folder aggregation of upload status.
//!
//! The server walks the selected folder recursively and reports every scanned
//! directory with its own file counts. We fold those into running totals per
//! immediate child of the browsed folder so the folder list can show one
//! badge per row, updated individually as results stream in.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::api::routes;
use crate::error::UiResult;
use crate::stream::{StreamConnector, StreamHandle};
use crate::types::FolderScanEvent;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub total: u64,
    pub uploaded: u64,
}

impl Counts {
    pub fn pending(&self) -> u64 {
        self.total.saturating_sub(self.uploaded)
    }

    fn add(&mut self, other: Counts) {
        self.total += other.total;
        self.uploaded += other.uploaded;
    }

    fn sub(&mut self, other: Counts) {
        self.total = self.total.saturating_sub(other.total);
        self.uploaded = self.uploaded.saturating_sub(other.uploaded);
    }
}

/// Upload status badge of one folder row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderBadge {
    Scanning,
    Empty,
    AllUploaded { total: u64 },
    Pending { pending: u64, total: u64 },
}

impl FolderBadge {
    pub fn from_counts(c: Counts) -> Self {
        if c.total == 0 {
            FolderBadge::Empty
        } else if c.pending() == 0 {
            FolderBadge::AllUploaded { total: c.total }
        } else {
            FolderBadge::Pending { pending: c.pending(), total: c.total }
        }
    }

    pub fn label(&self) -> String {
        match *self {
            FolderBadge::Scanning => "scanning…".to_string(),
            FolderBadge::Empty => "no mcap".to_string(),
            FolderBadge::AllUploaded { .. } => "✓ all uploaded".to_string(),
            FolderBadge::Pending { pending, total } if pending == total => format!("{} mcap", total),
            FolderBadge::Pending { pending, total } => format!("{} of {} mcap new", pending, total),
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            FolderBadge::Scanning => "badge-muted",
            FolderBadge::Empty => "badge-muted",
            FolderBadge::AllUploaded { .. } => "badge-success",
            FolderBadge::Pending { .. } => "badge-info",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanUpdate {
    /// Targeted badge update for one child folder row.
    Badge { child: String, badge: FolderBadge },
    /// Files directly inside the browsed folder changed.
    RootFiles(Counts),
    Complete { totals: Counts, upload_enabled: bool },
    Failed(String),
    Ignored,
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/").trim_end_matches('/').to_string()
}

/// `/x` or a drive path like `C:/x`, after normalization.
fn is_absolute(path: &str) -> bool {
    let b = path.as_bytes();
    path.starts_with('/') || (b.len() >= 2 && b[0].is_ascii_alphabetic() && b[1] == b':')
}

enum Placement {
    Root,
    Child(String),
    Outside,
}

/// Folds `folder_scanned` events into per-child totals.
#[derive(Debug)]
pub struct ScanAggregator {
    root: String,
    folders: HashMap<String, Counts>,
    children: HashMap<String, Counts>,
    root_files: Counts,
    totals: Option<Counts>,
}

impl ScanAggregator {
    pub fn new(root: &str) -> Self {
        Self {
            root: normalize(root),
            folders: HashMap::new(),
            children: HashMap::new(),
            root_files: Counts::default(),
            totals: None,
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Whether `path` names the scanned folder.
    pub fn is_root(&self, path: &str) -> bool {
        self.root == normalize(path)
    }

    /// Place a reported folder relative to the root. Absolute paths must lie under
    /// the root; relative paths are taken as relative to it.
    fn place(&self, folder: &str) -> Placement {
        let folder = normalize(folder);
        let rel = if !self.root.is_empty() && folder == self.root {
            ""
        } else if let Some(rest) = folder.strip_prefix(&format!("{}/", self.root)) {
            rest
        } else if is_absolute(&folder) {
            return Placement::Outside;
        } else {
            folder.trim_start_matches("./")
        };
        match rel.split('/').find(|s| !s.is_empty() && *s != ".") {
            Some(child) => Placement::Child(child.to_string()),
            None => Placement::Root,
        }
    }

    pub fn ingest(&mut self, event: FolderScanEvent) -> ScanUpdate {
        match event {
            FolderScanEvent::FolderScanned { folder, total_files, uploaded_files } => {
                let counts = Counts { total: total_files, uploaded: uploaded_files.min(total_files) };
                let placement = self.place(&folder);
                if let Placement::Outside = placement {
                    warn!(root = %self.root, %folder, "scanned folder outside the scan root ignored");
                    return ScanUpdate::Ignored;
                }
                let previous = self.folders.insert(normalize(&folder), counts).unwrap_or_default();
                match placement {
                    Placement::Child(child) => {
                        let sum = self.children.entry(child.clone()).or_default();
                        sum.sub(previous);
                        sum.add(counts);
                        let badge = FolderBadge::from_counts(*sum);
                        ScanUpdate::Badge { child, badge }
                    }
                    _ => {
                        self.root_files.sub(previous);
                        self.root_files.add(counts);
                        ScanUpdate::RootFiles(self.root_files)
                    }
                }
            }
            FolderScanEvent::ScanComplete { total_files, uploaded_files } => {
                let totals = Counts { total: total_files, uploaded: uploaded_files.min(total_files) };
                self.totals = Some(totals);
                ScanUpdate::Complete { totals, upload_enabled: totals.pending() > 0 }
            }
            FolderScanEvent::Error { message } => ScanUpdate::Failed(message),
        }
    }

    pub fn child_counts(&self, child: &str) -> Option<Counts> {
        self.children.get(child).copied()
    }

    pub fn badge_for(&self, child: &str) -> Option<FolderBadge> {
        self.child_counts(child).map(FolderBadge::from_counts)
    }

    pub fn root_files(&self) -> Counts {
        self.root_files
    }

    /// Sum of everything seen so far, or the server's final totals once complete.
    pub fn totals(&self) -> Counts {
        self.totals.unwrap_or_else(|| {
            let mut c = self.root_files;
            for v in self.children.values() {
                c.add(*v);
            }
            c
        })
    }

    pub fn is_complete(&self) -> bool {
        self.totals.is_some()
    }
}

/// Owns the background scan stream of the currently browsed folder.
pub struct ScanSession<C: StreamConnector> {
    connector: C,
    handle: Option<C::Handle>,
    scan_id: Option<String>,
    aggregator: Option<ScanAggregator>,
}

impl<C: StreamConnector> ScanSession<C> {
    pub fn new(connector: C) -> Self {
        Self { connector, handle: None, scan_id: None, aggregator: None }
    }

    /// Whether browsing `root` needs a fresh scan.
    pub fn needs_restart(&self, root: &str) -> bool {
        match &self.aggregator {
            Some(agg) => !agg.is_root(root),
            None => true,
        }
    }

    /// Drop the running scan and all aggregation. Closes the stream unconditionally
    /// and returns the old scan id so the caller can cancel it server-side.
    pub fn reset(&mut self) -> Option<String> {
        if let Some(mut h) = self.handle.take() {
            h.close();
            debug!(connection = h.id(), "scan stream closed");
        }
        self.aggregator = None;
        self.scan_id.take()
    }

    /// Start listening to the scan `scan_id` of `root`. Any previous scan is reset.
    pub fn attach(&mut self, root: &str, scan_id: &str) -> UiResult<Option<String>> {
        let previous = self.reset();
        let handle = self.connector.open(&routes::scan_events(scan_id))?;
        info!(root, scan_id, "folder scan attached");
        self.handle = Some(handle);
        self.scan_id = Some(scan_id.to_string());
        self.aggregator = Some(ScanAggregator::new(root));
        Ok(previous)
    }

    pub fn handle_message(&mut self, text: &str) -> ScanUpdate {
        let Some(agg) = self.aggregator.as_mut() else {
            return ScanUpdate::Ignored;
        };
        if agg.is_complete() {
            return ScanUpdate::Ignored;
        }
        let event: FolderScanEvent = match serde_json::from_str(text) {
            Ok(ev) => ev,
            Err(e) => {
                warn!(error = %e, "malformed scan event ignored");
                return ScanUpdate::Ignored;
            }
        };
        let update = agg.ingest(event);
        match &update {
            ScanUpdate::Complete { totals, upload_enabled } => {
                info!(total = totals.total, uploaded = totals.uploaded, upload_enabled, "folder scan complete");
                self.close_stream();
            }
            ScanUpdate::Failed(message) => {
                warn!(%message, "folder scan failed");
                self.close_stream();
                // A failed scan leaves no aggregation behind.
                self.aggregator = None;
                self.scan_id = None;
            }
            _ => {}
        }
        update
    }

    /// Transport failure: the stream is gone, badges stay as they are.
    pub fn handle_transport_error(&mut self, detail: &str) -> ScanUpdate {
        if self.handle.is_none() {
            return ScanUpdate::Ignored;
        }
        warn!(detail, "folder scan stream lost");
        self.close_stream();
        ScanUpdate::Failed("Folder scan connection lost".to_string())
    }

    fn close_stream(&mut self) {
        if let Some(mut h) = self.handle.take() {
            h.close();
        }
    }

    pub fn scan_id(&self) -> Option<&str> {
        self.scan_id.as_deref()
    }

    pub fn aggregator(&self) -> Option<&ScanAggregator> {
        self.aggregator.as_ref()
    }

    pub fn is_streaming(&self) -> bool {
        self.handle.as_ref().map(|h| h.is_open()).unwrap_or(false)
    }

    pub fn connection_id(&self) -> Option<u64> {
        self.handle.as_ref().map(|h| h.id())
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }
}
