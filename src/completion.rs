//! Completion summary shown once a job reaches a terminal state.

use chrono::{DateTime, Utc};

use crate::format::{fmt_bytes, fmt_duration};
use crate::sorting::{sort_rows, SortConfig, SortDirection, SortKey, SortableRow};
use crate::types::{FileState, FileStatus, JobState};
use crate::view::Pagination;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    Completed,
    Failed,
    Cancelled,
    /// Analysis ran without a following upload phase.
    AnalysisFinished,
}

impl CompletionOutcome {
    pub fn from_job_state(state: JobState) -> Self {
        match state {
            JobState::Failed => CompletionOutcome::Failed,
            JobState::Cancelled => CompletionOutcome::Cancelled,
            _ => CompletionOutcome::Completed,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CompletionOutcome::Completed => "Upload complete",
            CompletionOutcome::Failed => "Upload failed",
            CompletionOutcome::Cancelled => "Upload cancelled",
            CompletionOutcome::AnalysisFinished => "Analysis complete",
        }
    }
}

/// Files per final status. Anything not final yet counts as `unfinished`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub unfinished: usize,
    pub duplicates: usize,
}

impl StatusCounts {
    pub fn tally<'a>(statuses: impl IntoIterator<Item = &'a FileStatus>) -> Self {
        let mut c = StatusCounts::default();
        for s in statuses {
            match s.status {
                FileState::Completed => c.completed += 1,
                FileState::Failed => c.failed += 1,
                FileState::Skipped => c.skipped += 1,
                _ => c.unfinished += 1,
            }
            if s.duplicate() {
                c.duplicates += 1;
            }
        }
        c
    }

    pub fn total(&self) -> usize {
        self.completed + self.failed + self.skipped + self.unfinished
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRow {
    pub filename: String,
    pub status: FileState,
    pub size: Option<u64>,
    pub size_text: String,
    pub duplicate: bool,
    pub error: Option<String>,
}

impl From<&FileStatus> for CompletionRow {
    fn from(s: &FileStatus) -> Self {
        let size_text = s
            .file_size_formatted
            .clone()
            .or_else(|| s.file_size.map(fmt_bytes))
            .unwrap_or_default();
        Self {
            filename: s.filename.clone(),
            status: s.status,
            size: s.file_size,
            size_text,
            duplicate: s.duplicate(),
            error: s.error_message.clone(),
        }
    }
}

impl SortableRow for CompletionRow {
    fn sort_key(&self, column: &str) -> SortKey {
        match column {
            "filename" => SortKey::text(&self.filename),
            "status" => SortKey::text(self.status.as_str()),
            "size" => self.size.map(|s| SortKey::Number(s as f64)).unwrap_or(SortKey::Missing),
            "duplicate" => SortKey::Number(if self.duplicate { 1.0 } else { 0.0 }),
            "error" => self.error.as_deref().map(SortKey::text).unwrap_or(SortKey::Missing),
            _ => SortKey::Missing,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSummary {
    pub job_id: String,
    pub outcome: CompletionOutcome,
    /// Server error text for failed jobs.
    pub message: Option<String>,
    pub counts: StatusCounts,
    /// Bytes of files that ended up uploaded (duplicates excluded).
    pub uploaded_bytes: u64,
    pub elapsed_seconds: Option<f64>,
    pub rows: Vec<CompletionRow>,
}

impl CompletionSummary {
    pub fn from_statuses(
        job_id: &str,
        outcome: CompletionOutcome,
        statuses: Vec<FileStatus>,
        message: Option<String>,
    ) -> Self {
        let counts = StatusCounts::tally(&statuses);
        let uploaded_bytes = statuses
            .iter()
            .filter(|s| s.status == FileState::Completed && !s.duplicate())
            .filter_map(|s| s.file_size)
            .sum();
        Self {
            job_id: job_id.to_string(),
            outcome,
            message,
            counts,
            uploaded_bytes,
            elapsed_seconds: None,
            rows: statuses.iter().map(CompletionRow::from).collect(),
        }
    }

    /// Record the elapsed time between job start and `finished_at`.
    pub fn with_elapsed(mut self, started_at: DateTime<Utc>, finished_at: DateTime<Utc>) -> Self {
        let ms = (finished_at - started_at).num_milliseconds().max(0);
        self.elapsed_seconds = Some(ms as f64 / 1000.0);
        self
    }

    /// One-line summary: `3 uploaded, 1 failed, 2 skipped`.
    pub fn headline(&self) -> String {
        let uploaded_label = match self.outcome {
            CompletionOutcome::AnalysisFinished => "completed",
            _ => "uploaded",
        };
        format!(
            "{} {}, {} failed, {} skipped",
            self.counts.completed, uploaded_label, self.counts.failed, self.counts.skipped
        )
    }

    pub fn bytes_text(&self) -> String {
        fmt_bytes(self.uploaded_bytes)
    }

    pub fn elapsed_text(&self) -> String {
        self.elapsed_seconds.map(fmt_duration).unwrap_or_else(|| "—".to_string())
    }
}

pub const COMPLETION_COLUMNS: [&str; 5] = ["filename", "status", "size", "duplicate", "error"];

/// Sortable, paginated file table of a completion summary.
#[derive(Debug, Clone)]
pub struct CompletionTable {
    rows: Vec<CompletionRow>,
    sort: SortConfig,
    pagination: Pagination,
}

impl CompletionTable {
    pub fn new(summary: &CompletionSummary, page_size: usize) -> Self {
        let mut table = Self {
            rows: summary.rows.clone(),
            sort: SortConfig::new("filename", SortDirection::Asc),
            pagination: Pagination::new(page_size),
        };
        table.pagination.set_total(table.rows.len());
        sort_rows(&mut table.rows, &table.sort);
        table
    }

    /// Header click. Sorting jumps back to the first page.
    pub fn toggle_sort(&mut self, column: &str) {
        self.sort.toggle(column);
        sort_rows(&mut self.rows, &self.sort);
        self.pagination.reset();
    }

    pub fn sort(&self) -> &SortConfig {
        &self.sort
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn pagination_mut(&mut self) -> &mut Pagination {
        &mut self.pagination
    }

    pub fn page_rows(&self) -> &[CompletionRow] {
        self.pagination.slice(&self.rows)
    }

    /// All rows in the current sort order.
    pub fn rows(&self) -> &[CompletionRow] {
        &self.rows
    }

    pub fn to_csv(&self) -> String {
        to_csv(&self.rows)
    }
}

fn escape_csv(s: &str) -> String {
    s.chars()
        .flat_map(|c| match c {
            '"' => vec!['"', '"'],
            '\n' | '\r' => vec![' '],
            c if c.is_control() => vec![' '],
            c => vec![c],
        })
        .collect()
}

/// CSV export: `filename,status,size,duplicate,error`, text fields always quoted.
pub fn to_csv(rows: &[CompletionRow]) -> String {
    let mut out = String::from("filename,status,size,duplicate,error\n");
    for r in rows {
        out.push_str(&format!(
            "\"{}\",{},{},{},\"{}\"\n",
            escape_csv(&r.filename),
            r.status.as_str(),
            r.size.map(|s| s.to_string()).unwrap_or_default(),
            if r.duplicate { "yes" } else { "no" },
            escape_csv(r.error.as_deref().unwrap_or("")),
        ));
    }
    out
}

/// `upload_<job-prefix>_<YYYYmmdd_HHMMSS>.csv`
pub fn csv_filename(job_id: &str, at: DateTime<Utc>) -> String {
    let short: String = job_id.chars().filter(|c| c.is_ascii_alphanumeric()).take(8).collect();
    let short = if short.is_empty() { "job".to_string() } else { short };
    format!("upload_{}_{}.csv", short, at.format("%Y%m%d_%H%M%S"))
}
