use std::collections::HashMap;

use crate::format::fmt_percent;
use crate::types::{FileState, FileStatus};
use crate::view::KeyedTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Neutral,
    Busy,
    Success,
    Warning,
    Danger,
}

impl BadgeTone {
    pub fn css_class(&self) -> &'static str {
        match self {
            BadgeTone::Neutral => "badge badge-neutral",
            BadgeTone::Busy => "badge badge-busy",
            BadgeTone::Success => "badge badge-success",
            BadgeTone::Warning => "badge badge-warning",
            BadgeTone::Danger => "badge badge-danger",
        }
    }
}

/// Status badge of a file row. Built once per composite status.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusBadge {
    pub label: &'static str,
    pub tone: BadgeTone,
    pub spinner: bool,
}

impl StatusBadge {
    pub fn for_status(status: FileState, duplicate: bool) -> Self {
        let (label, tone) = match (status, duplicate) {
            (FileState::Pending, _) => ("Pending", BadgeTone::Neutral),
            (FileState::Analyzing, _) => ("Analyzing", BadgeTone::Busy),
            (FileState::Ready, false) => ("Ready", BadgeTone::Neutral),
            (FileState::Ready, true) => ("Duplicate", BadgeTone::Warning),
            (FileState::Uploading, _) => ("Uploading", BadgeTone::Busy),
            (FileState::Completed, false) => ("Uploaded", BadgeTone::Success),
            (FileState::Completed, true) => ("Duplicate", BadgeTone::Success),
            (FileState::Skipped, false) => ("Skipped", BadgeTone::Warning),
            (FileState::Skipped, true) => ("Duplicate (skipped)", BadgeTone::Warning),
            (FileState::Failed, _) => ("Failed", BadgeTone::Danger),
        };
        Self { label, tone, spinner: status.is_active() }
    }
}

/// One rendered line of the progress table.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRow {
    pub filename: String,
    pub badge: StatusBadge,
    /// Progress bar width in percent, `None` hides the bar.
    pub bar_percent: Option<f64>,
    pub progress_text: String,
    pub size_text: String,
    pub error_text: Option<String>,
    /// "Queued (i of N)" while the file waits for the current phase.
    pub queue_label: Option<String>,
    /// Last status applied to this row, pending updates excluded.
    pub latest: FileStatus,
}

impl FileRow {
    pub fn build(status: &FileStatus) -> Self {
        let mut row = Self {
            filename: status.filename.clone(),
            badge: StatusBadge::for_status(status.status, status.duplicate()),
            bar_percent: None,
            progress_text: String::new(),
            size_text: status.file_size_formatted.clone().unwrap_or_default(),
            error_text: status.error_message.clone(),
            queue_label: None,
            latest: status.clone(),
        };
        row.set_progress(status);
        row
    }

    fn set_progress(&mut self, status: &FileStatus) {
        match (status.status, status.progress_percent) {
            (FileState::Completed, _) => {
                self.bar_percent = Some(100.0);
                self.progress_text = fmt_percent(100.0);
            }
            (s, Some(p)) if s.is_active() => {
                self.bar_percent = Some(p.clamp(0.0, 100.0));
                self.progress_text = fmt_percent(p);
            }
            _ => {
                self.bar_percent = None;
                self.progress_text.clear();
            }
        }
    }

    /// Minimal update for an unchanged composite status: bar width, percentage,
    /// size and error text. Returns whether anything visible changed.
    pub fn apply_progress(&mut self, status: &FileStatus) -> bool {
        let before = (self.bar_percent, self.progress_text.clone(), self.size_text.clone(), self.error_text.clone());
        self.set_progress(status);
        if let Some(size) = &status.file_size_formatted {
            self.size_text = size.clone();
        }
        if status.error_message.is_some() {
            self.error_text = status.error_message.clone();
        }
        self.latest = status.clone();
        before != (self.bar_percent, self.progress_text.clone(), self.size_text.clone(), self.error_text.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowChange {
    /// Composite status changed (or new row): markup rebuilt.
    Rebuilt,
    /// Same composite status, bar/text updated in place.
    Updated,
    /// Nothing visible changed.
    Unchanged,
}

/// Apply one file status to the table according to the cached composite status.
pub fn apply_file_status(
    rows: &mut KeyedTable<FileRow>,
    cache: &mut HashMap<String, String>,
    status: &FileStatus,
) -> RowChange {
    let composite = status.composite_status();
    let unchanged = rows.contains(&status.filename)
        && cache.get(&status.filename).map(|c| c == &composite).unwrap_or(false);

    if unchanged {
        let changed = rows.update_in_place(&status.filename, |row| row.apply_progress(status));
        return if changed { RowChange::Updated } else { RowChange::Unchanged };
    }

    let mut row = FileRow::build(status);
    // keep the queue label until the next recompute
    if let Some(existing) = rows.get(&status.filename) {
        row.queue_label = existing.row.queue_label.clone();
    }
    rows.replace(&status.filename, row);
    cache.insert(status.filename.clone(), composite);
    RowChange::Rebuilt
}
