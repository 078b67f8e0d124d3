//! Log viewer over the server's log endpoints.

use crate::api::{ApiClient, HttpTransport};
use crate::error::UiResult;
use crate::sorting::SortDirection;
use crate::types::{LogEntry, LogFile, LogLevel, LogQuery, LogStats};
use crate::view::Pagination;

#[derive(Debug, Clone)]
pub struct LogViewer {
    query: LogQuery,
    entries: Vec<LogEntry>,
    order: SortDirection,
    pagination: Pagination,
    pub stats: Option<LogStats>,
    pub files: Vec<LogFile>,
}

impl LogViewer {
    pub fn new(page_size: usize, default_limit: usize) -> Self {
        Self {
            query: LogQuery { level: None, search: None, limit: Some(default_limit) },
            entries: Vec::new(),
            order: SortDirection::Desc,
            pagination: Pagination::new(page_size),
            stats: None,
            files: Vec::new(),
        }
    }

    pub fn query(&self) -> &LogQuery {
        &self.query
    }

    pub fn set_level(&mut self, level: Option<LogLevel>) {
        self.query.level = level;
    }

    pub fn set_search(&mut self, search: &str) {
        let s = search.trim();
        self.query.search = if s.is_empty() { None } else { Some(s.to_string()) };
    }

    pub async fn refresh<T: HttpTransport>(&mut self, api: &ApiClient<T>) -> UiResult<()> {
        let entries = api.logs(&self.query).await?;
        self.set_entries(entries);
        Ok(())
    }

    pub async fn load_stats<T: HttpTransport>(&mut self, api: &ApiClient<T>) -> UiResult<()> {
        self.stats = Some(api.log_stats().await?);
        Ok(())
    }

    pub async fn load_files<T: HttpTransport>(&mut self, api: &ApiClient<T>) -> UiResult<()> {
        self.files = api.log_files().await?;
        Ok(())
    }

    /// Replace the entries. The server filter is applied again locally so a
    /// server ignoring a parameter still shows what the user asked for.
    pub fn set_entries(&mut self, entries: Vec<LogEntry>) {
        let search = self.query.search.as_ref().map(|s| s.to_lowercase());
        self.entries = entries
            .into_iter()
            .filter(|e| self.query.level.map(|l| e.level == l).unwrap_or(true))
            .filter(|e| match &search {
                Some(s) => {
                    e.message.to_lowercase().contains(s)
                        || e.source.as_deref().map(|src| src.to_lowercase().contains(s)).unwrap_or(false)
                }
                None => true,
            })
            .collect();
        self.apply_order();
        self.pagination.set_total(self.entries.len());
        self.pagination.reset();
    }

    fn apply_order(&mut self) {
        // RFC 3339 timestamps order lexicographically.
        match self.order {
            SortDirection::Asc => self.entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
            SortDirection::Desc => self.entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
        }
    }

    /// Flip newest-first / oldest-first.
    pub fn toggle_order(&mut self) {
        self.order = self.order.flipped();
        self.apply_order();
        self.pagination.reset();
    }

    pub fn order(&self) -> SortDirection {
        self.order
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn page_entries(&self) -> &[LogEntry] {
        self.pagination.slice(&self.entries)
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn pagination_mut(&mut self) -> &mut Pagination {
        &mut self.pagination
    }

    /// Count for one level from the loaded stats.
    pub fn level_count(&self, level: LogLevel) -> u64 {
        self.stats
            .as_ref()
            .and_then(|s| s.by_level.get(level.as_str()).copied())
            .unwrap_or(0)
    }
}

pub fn level_css_class(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Debug => "log-debug",
        LogLevel::Info => "log-info",
        LogLevel::Warning => "log-warning",
        LogLevel::Error | LogLevel::Critical => "log-error",
    }
}
