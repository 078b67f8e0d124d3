//! Plain-text rendering of the view models for the terminal.

use crate::browser::{FolderBrowser, ReviewLine, ReviewTable};
use crate::completion::{CompletionSummary, CompletionTable};
use crate::format::fmt_bytes;
use crate::logs::LogViewer;
use crate::progress::ProgressReconciler;
use crate::types::{LogStats, PreFilterStats};

pub fn overall_line(reconciler: &ProgressReconciler) -> Option<String> {
    let o = reconciler.overall()?;
    let mut parts = vec![format!("[{}] {}", o.phase_label, o.percent_text), o.files_text.clone()];
    if !o.bytes_text.is_empty() {
        parts.push(o.bytes_text.clone());
    }
    if !o.eta_text.is_empty() {
        parts.push(o.eta_text.clone());
    }
    Some(parts.join(" | "))
}

pub fn file_lines(reconciler: &ProgressReconciler) -> Vec<String> {
    reconciler
        .rows()
        .iter()
        .map(|k| {
            let r = &k.row;
            let mut line = format!("  {:<44} {:<20}", r.filename, r.badge.label);
            if !r.progress_text.is_empty() {
                line.push_str(&format!(" {:>6}", r.progress_text));
            }
            if let Some(q) = &r.queue_label {
                line.push_str(&format!(" {}", q));
            }
            if let Some(e) = &r.error_text {
                line.push_str(&format!(" ({})", e));
            }
            line.trim_end().to_string()
        })
        .collect()
}

pub fn summary_lines(summary: &CompletionSummary, table: &CompletionTable) -> Vec<String> {
    let mut out = vec![
        format!("{}: {}", summary.outcome.title(), summary.headline()),
        format!("Uploaded {} in {}", summary.bytes_text(), summary.elapsed_text()),
    ];
    if let Some(m) = &summary.message {
        out.push(format!("Error: {}", m));
    }
    for r in table.page_rows() {
        let dup = if r.duplicate { " (duplicate)" } else { "" };
        out.push(format!("  {:<44} {:<10} {:>10}{}", r.filename, r.status.as_str(), r.size_text, dup));
    }
    if table.pagination().page_count() > 1 {
        out.push(format!("  {}", table.pagination().label()));
    }
    out
}

pub fn folder_lines(browser: &FolderBrowser) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(path) = browser.current_path() {
        out.push(path.to_string());
    }
    if !browser.breadcrumbs().is_empty() {
        let crumbs: Vec<&str> = browser.breadcrumbs().iter().map(|b| b.name.as_str()).collect();
        out.push(format!("  {}", crumbs.join(" / ")));
    }
    for k in browser.page_rows() {
        let r = &k.row;
        let badge = r.badge.map(|b| b.label()).unwrap_or_default();
        out.push(format!("  {:<40} {}", format!("{}/", r.name), badge).trim_end().to_string());
    }
    for f in browser.files() {
        out.push(format!("  {:<40} {:>10}", f.name, f.size_formatted.clone().unwrap_or_else(|| fmt_bytes(f.size))));
    }
    if browser.pagination().page_count() > 1 {
        out.push(format!("  {}", browser.pagination().label()));
    }
    let links: Vec<String> = browser.quick_links().iter().map(|q| format!("{} ({})", q.name, q.path)).collect();
    if !links.is_empty() {
        out.push(format!("  Quick links: {}", links.join(", ")));
    }
    out
}

pub fn review_lines(table: &ReviewTable) -> Vec<String> {
    let mut out = vec![format!("{}: {}", table.root(), table.summary_text())];
    for line in table.page_lines() {
        match line {
            ReviewLine::Group(g) => {
                let c = g.counts();
                let marker = if g.expanded { "▾" } else { "▸" };
                out.push(format!("{} {} ({} files, {} new)", marker, g.title(), c.total, c.pending()));
            }
            ReviewLine::File(f) => {
                let mark = if f.selected { "[x]" } else { "[ ]" };
                let status = if f.file.already_uploaded { "uploaded" } else { "new" };
                out.push(format!("    {} {:<40} {:>10} {}", mark, f.file.name, fmt_bytes(f.file.size), status));
            }
        }
    }
    out
}

pub fn pre_filter_lines(stats: &PreFilterStats) -> Vec<String> {
    vec![
        format!("Files:      {}", stats.total_files),
        format!("New:        {}", stats.new_files),
        format!("Duplicates: {}", stats.duplicate_files),
        format!("Size:       {}", fmt_bytes(stats.total_size)),
    ]
}

pub fn log_lines(viewer: &LogViewer) -> Vec<String> {
    viewer
        .page_entries()
        .iter()
        .map(|e| {
            let src = e.source.as_deref().map(|s| format!(" [{}]", s)).unwrap_or_default();
            format!("{} {:<8}{} {}", e.timestamp, e.level.as_str().to_uppercase(), src, e.message)
        })
        .collect()
}

pub fn log_stats_line(stats: &LogStats) -> String {
    let levels: Vec<String> = stats.by_level.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    format!("{} entries ({})", stats.total, levels.join(", "))
}
