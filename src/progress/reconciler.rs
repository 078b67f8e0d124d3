use std::collections::HashMap;

use tracing::debug;

use super::buffer::{PendingUpdates, SnapshotSlot};
use super::queue::recompute_queue_labels;
use super::rows::{apply_file_status, FileRow, RowChange};
use super::scheduler::FrameScheduler;
use super::weights::Phase;
use crate::format::{fmt_bytes, fmt_eta, fmt_percent};
use crate::metrics::Metrics;
use crate::types::{FileStatus, OverallProgress};
use crate::view::KeyedTable;

/// Rendered overall progress header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverallDisplay {
    pub percent: f64,
    pub percent_text: String,
    pub files_text: String,
    pub bytes_text: String,
    pub eta_text: String,
    pub phase_label: String,
}

impl OverallDisplay {
    pub fn from_snapshot(s: &OverallProgress, phase: Phase) -> Self {
        let bytes_text = if s.total_bytes > 0 {
            format!("{} / {}", fmt_bytes(s.uploaded_bytes), fmt_bytes(s.total_bytes))
        } else {
            String::new()
        };
        Self {
            percent: s.progress_percent.clamp(0.0, 100.0),
            percent_text: fmt_percent(s.progress_percent),
            files_text: format!("{} / {} files", s.files_completed, s.total_files),
            bytes_text,
            eta_text: match phase {
                Phase::Upload => fmt_eta(s.eta_seconds),
                Phase::Analysis => String::new(),
            },
            phase_label: phase.label().to_string(),
        }
    }
}

/// What one flush did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub rebuilt: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Number of queued files after relabeling, if relabeling ran.
    pub queued: Option<usize>,
    pub overall_applied: bool,
}

impl FlushReport {
    pub fn is_noop(&self) -> bool {
        self.rebuilt == 0 && self.updated == 0 && self.unchanged == 0 && self.queued.is_none() && !self.overall_applied
    }
}

/// Buffers incoming progress and applies it to the view at most once per frame.
pub struct ProgressReconciler {
    pending: PendingUpdates,
    snapshot: SnapshotSlot,
    flush_scheduled: bool,
    relabel_needed: bool,
    rows: KeyedTable<FileRow>,
    cache: HashMap<String, String>,
    overall: Option<OverallDisplay>,
    overall_revision: u64,
    phase: Phase,
    metrics: Metrics,
}

impl ProgressReconciler {
    pub fn new(metrics: Metrics) -> Self {
        Self {
            pending: PendingUpdates::new(),
            snapshot: SnapshotSlot::default(),
            flush_scheduled: false,
            relabel_needed: false,
            rows: KeyedTable::new(),
            cache: HashMap::new(),
            overall: None,
            overall_revision: 0,
            phase: Phase::Analysis,
            metrics,
        }
    }

    /// Drop every buffer and rendered row; used when a new job connects.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.snapshot.clear();
        self.flush_scheduled = false;
        self.relabel_needed = false;
        self.rows.clear();
        self.cache.clear();
        if self.overall.take().is_some() {
            self.overall_revision += 1;
        }
        self.phase = Phase::Analysis;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Switch the phase; queue labels follow on the next flush.
    pub fn set_phase(&mut self, phase: Phase, scheduler: &mut dyn FrameScheduler) {
        if self.phase != phase {
            self.phase = phase;
            self.relabel_needed = true;
            self.schedule(scheduler);
        }
    }

    /// Render the job's initial file list right away (no frame wait).
    pub fn seed(&mut self, files: &[FileStatus]) {
        for f in files {
            apply_file_status(&mut self.rows, &mut self.cache, f);
        }
        recompute_queue_labels(&mut self.rows, self.phase);
    }

    pub fn queue_file_update(&mut self, status: FileStatus, scheduler: &mut dyn FrameScheduler) {
        if self.pending.get(&status.filename).is_some() {
            self.metrics.inc_superseded();
        }
        self.pending.upsert(status);
        self.schedule(scheduler);
    }

    pub fn queue_progress_snapshot(&mut self, snapshot: OverallProgress, scheduler: &mut dyn FrameScheduler) {
        self.snapshot.put(snapshot);
        self.schedule(scheduler);
    }

    fn schedule(&mut self, scheduler: &mut dyn FrameScheduler) {
        if !self.flush_scheduled {
            self.flush_scheduled = true;
            scheduler.request_frame();
        }
    }

    pub fn flush_scheduled(&self) -> bool {
        self.flush_scheduled
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty() || !self.snapshot.is_empty() || self.relabel_needed
    }

    /// Apply buffered file updates, relabel the queue once, then apply the overall snapshot.
    pub fn flush(&mut self) -> FlushReport {
        self.flush_scheduled = false;
        let mut report = FlushReport::default();
        if !self.has_pending() {
            return report;
        }

        let updates = self.pending.drain();
        for status in &updates {
            match apply_file_status(&mut self.rows, &mut self.cache, status) {
                RowChange::Rebuilt => report.rebuilt += 1,
                RowChange::Updated => report.updated += 1,
                RowChange::Unchanged => report.unchanged += 1,
            }
        }

        if !updates.is_empty() || self.relabel_needed {
            report.queued = Some(recompute_queue_labels(&mut self.rows, self.phase));
            self.relabel_needed = false;
        }

        if let Some(snapshot) = self.snapshot.take() {
            let display = OverallDisplay::from_snapshot(&snapshot, self.phase);
            if self.overall.as_ref() != Some(&display) {
                self.overall = Some(display);
                self.overall_revision += 1;
            }
            report.overall_applied = true;
        }

        self.metrics.inc_flushes();
        self.metrics.add_rebuilt(report.rebuilt as u64);
        self.metrics.add_updated(report.updated as u64);
        debug!(
            rebuilt = report.rebuilt,
            updated = report.updated,
            queued = ?report.queued,
            "progress flush"
        );
        report
    }

    /// Distinct files seen so far, rendered or still buffered.
    pub fn known_files(&self) -> usize {
        self.rows.len() + self.pending.keys().filter(|k| !self.rows.contains(k)).count()
    }

    pub fn rows(&self) -> &KeyedTable<FileRow> {
        &self.rows
    }

    pub fn overall(&self) -> Option<&OverallDisplay> {
        self.overall.as_ref()
    }

    /// Composite status last rendered for `filename`.
    pub fn rendered_status(&self, filename: &str) -> Option<&str> {
        self.cache.get(filename).map(|s| s.as_str())
    }

    /// Changes whenever anything visible changed.
    pub fn revision(&self) -> u64 {
        self.rows.revision() + self.overall_revision
    }

    /// Most recent status per file, rendered rows overlaid with unflushed updates,
    /// in table order (files only seen in the buffer come last).
    pub fn latest_statuses(&self) -> Vec<FileStatus> {
        let mut out: Vec<FileStatus> = self
            .rows
            .iter()
            .map(|r| self.pending.get(&r.key).cloned().unwrap_or_else(|| r.row.latest.clone()))
            .collect();
        out.extend(self.pending.iter().filter(|s| !self.rows.contains(&s.filename)).cloned());
        out
    }
}
