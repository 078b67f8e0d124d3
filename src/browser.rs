//! Folder browser and scan review table.

use tracing::{info, warn};

use crate::api::{ApiClient, HttpTransport};
use crate::error::{UiError, UiResult};
use crate::format::fmt_bytes;
use crate::scan::{Counts, FolderBadge, ScanAggregator, ScanUpdate};
use crate::sorting::{sort_rows, SortConfig, SortDirection, SortKey, SortableRow};
use crate::storage::{KeyValueStore, LAST_FOLDER_KEY};
use crate::types::{Breadcrumb, FileEntry, FolderListing, QuickLink, ScanFolderResponse, ScannedFile};
use crate::view::{Keyed, KeyedTable, Pagination};

#[derive(Debug, Clone, PartialEq)]
pub struct FolderRow {
    pub name: String,
    pub path: String,
    pub mcap_count: Option<u64>,
    pub modified: Option<String>,
    pub badge: Option<FolderBadge>,
}

/// Paginated directory navigation with per-row scan badges.
///
/// Rows are keyed by folder name (unique within one listing) so scan results
/// update exactly one row.
#[derive(Debug)]
pub struct FolderBrowser {
    listing: Option<FolderListing>,
    rows: KeyedTable<FolderRow>,
    pagination: Pagination,
    upload_enabled: bool,
    root_files: Counts,
}

impl FolderBrowser {
    pub fn new(per_page: usize) -> Self {
        Self {
            listing: None,
            rows: KeyedTable::new(),
            pagination: Pagination::new(per_page),
            upload_enabled: false,
            root_files: Counts::default(),
        }
    }

    /// Folder to show first: the remembered one, else the configured default.
    pub fn initial_path(store: &dyn KeyValueStore, default_folder: Option<&str>) -> Option<String> {
        match store.get(LAST_FOLDER_KEY) {
            Ok(Some(p)) if !p.trim().is_empty() => Some(p),
            Ok(_) => default_folder.filter(|p| !p.trim().is_empty()).map(|p| p.to_string()),
            Err(e) => {
                warn!(error = %e, "could not read last folder");
                default_folder.map(|p| p.to_string())
            }
        }
    }

    /// Load `path` (or the server's root when `None`). A failing non-root path is
    /// retried once against the root before the error is returned.
    pub async fn open<T: HttpTransport>(&mut self, api: &ApiClient<T>, path: Option<&str>) -> UiResult<()> {
        let mut target = path.map(|p| p.to_string());
        let mut retried = false;
        loop {
            match api.list_folders(target.as_deref()).await {
                Ok(listing) => {
                    info!(path = %listing.current_path, folders = listing.folders.len(), "folder listed");
                    self.set_listing(listing);
                    return Ok(());
                }
                Err(e) if !retried && target.is_some() => {
                    warn!(path = ?target, error = %e, "folder unavailable, falling back to root");
                    retried = true;
                    target = None;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub fn set_listing(&mut self, listing: FolderListing) {
        self.rows.clear();
        for f in &listing.folders {
            self.rows.replace(
                &f.name,
                FolderRow {
                    name: f.name.clone(),
                    path: f.path.clone(),
                    mcap_count: f.mcap_count,
                    modified: f.modified.clone(),
                    badge: None,
                },
            );
        }
        self.pagination.set_total(listing.folders.len());
        self.pagination.reset();
        self.upload_enabled = listing.mcap_count > 0;
        self.root_files = Counts::default();
        self.listing = Some(listing);
    }

    /// Mark every row as being scanned; called when a background scan starts.
    pub fn mark_scanning(&mut self) {
        let keys: Vec<String> = self.rows.keys().map(|k| k.to_string()).collect();
        for k in keys {
            self.rows.update_in_place(&k, |r| {
                let changed = r.badge != Some(FolderBadge::Scanning);
                r.badge = Some(FolderBadge::Scanning);
                changed
            });
        }
    }

    /// Re-apply what the scan of this folder has reported so far after the listing
    /// was reloaded. Rows without results yet show as scanning.
    pub fn restore_scan(&mut self, agg: &ScanAggregator) {
        if !self.current_path().map(|p| agg.is_root(p)).unwrap_or(false) {
            return;
        }
        let fallback = if agg.is_complete() { FolderBadge::Empty } else { FolderBadge::Scanning };
        let keys: Vec<String> = self.rows.keys().map(|k| k.to_string()).collect();
        for k in keys {
            let badge = agg.badge_for(&k).unwrap_or(fallback);
            self.rows.update_in_place(&k, |r| {
                let changed = r.badge != Some(badge);
                r.badge = Some(badge);
                changed
            });
        }
        self.root_files = agg.root_files();
        if agg.is_complete() {
            self.upload_enabled = agg.totals().pending() > 0;
        }
    }

    /// Apply one scan update. Badge updates touch only the affected row.
    pub fn apply_scan_update(&mut self, update: &ScanUpdate) -> bool {
        match update {
            ScanUpdate::Badge { child, badge } => self.rows.update_in_place(child, |r| {
                let changed = r.badge != Some(*badge);
                r.badge = Some(*badge);
                changed
            }),
            ScanUpdate::RootFiles(c) => {
                self.root_files = *c;
                true
            }
            ScanUpdate::Complete { upload_enabled, .. } => {
                self.upload_enabled = *upload_enabled;
                let keys: Vec<String> = self.rows.keys().map(|k| k.to_string()).collect();
                for k in keys {
                    self.rows.update_in_place(&k, |r| {
                        if matches!(r.badge, None | Some(FolderBadge::Scanning)) {
                            r.badge = Some(FolderBadge::Empty);
                            true
                        } else {
                            false
                        }
                    });
                }
                true
            }
            ScanUpdate::Failed(_) => {
                let keys: Vec<String> = self.rows.keys().map(|k| k.to_string()).collect();
                for k in keys {
                    self.rows.update_in_place(&k, |r| {
                        if r.badge == Some(FolderBadge::Scanning) {
                            r.badge = None;
                            true
                        } else {
                            false
                        }
                    });
                }
                true
            }
            ScanUpdate::Ignored => false,
        }
    }

    /// Remember `path` as the folder to upload from.
    pub fn remember(store: &mut dyn KeyValueStore, path: &str) -> UiResult<()> {
        store.set(LAST_FOLDER_KEY, path)
    }

    pub fn listing(&self) -> Option<&FolderListing> {
        self.listing.as_ref()
    }

    pub fn current_path(&self) -> Option<&str> {
        self.listing.as_ref().map(|l| l.current_path.as_str())
    }

    pub fn parent_path(&self) -> Option<&str> {
        self.listing.as_ref().and_then(|l| l.parent_path.as_deref())
    }

    pub fn breadcrumbs(&self) -> &[Breadcrumb] {
        self.listing.as_ref().map(|l| l.breadcrumbs.as_slice()).unwrap_or(&[])
    }

    pub fn quick_links(&self) -> &[QuickLink] {
        self.listing.as_ref().map(|l| l.quick_links.as_slice()).unwrap_or(&[])
    }

    pub fn files(&self) -> &[FileEntry] {
        self.listing.as_ref().map(|l| l.files.as_slice()).unwrap_or(&[])
    }

    pub fn rows(&self) -> &KeyedTable<FolderRow> {
        &self.rows
    }

    pub fn row(&self, name: &str) -> Option<&FolderRow> {
        self.rows.get(name).map(|k| &k.row)
    }

    /// Folder rows of the current page.
    pub fn page_rows(&self) -> Vec<&Keyed<FolderRow>> {
        let r = self.pagination.range();
        self.rows.iter().skip(r.start).take(r.len()).collect()
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn next_page(&mut self) -> bool {
        self.pagination.next()
    }

    pub fn prev_page(&mut self) -> bool {
        self.pagination.prev()
    }

    pub fn upload_enabled(&self) -> bool {
        self.upload_enabled
    }

    pub fn root_files(&self) -> Counts {
        self.root_files
    }
}

// ---------------------- REVIEW TABLE ----------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewFile {
    pub file: ScannedFile,
    pub selected: bool,
}

impl SortableRow for ReviewFile {
    fn sort_key(&self, column: &str) -> SortKey {
        match column {
            "name" => SortKey::text(&self.file.name),
            "size" => SortKey::Number(self.file.size as f64),
            "modified" => self.file.modified.as_deref().map(SortKey::text).unwrap_or(SortKey::Missing),
            "status" => SortKey::text(if self.file.already_uploaded { "uploaded" } else { "new" }),
            _ => SortKey::Missing,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewGroup {
    /// Folder relative to the scanned root, "" for the root itself.
    pub folder: String,
    pub files: Vec<ReviewFile>,
    pub expanded: bool,
}

impl ReviewGroup {
    pub fn title(&self) -> &str {
        if self.folder.is_empty() {
            "(this folder)"
        } else {
            &self.folder
        }
    }

    pub fn counts(&self) -> Counts {
        Counts {
            total: self.files.len() as u64,
            uploaded: self.files.iter().filter(|f| f.file.already_uploaded).count() as u64,
        }
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.file.size).sum()
    }
}

/// One visible line of the review table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReviewLine<'a> {
    Group(&'a ReviewGroup),
    File(&'a ReviewFile),
}

pub const REVIEW_COLUMNS: [&str; 4] = ["name", "size", "modified", "status"];

/// Scan results grouped per folder, ready for selection before an upload.
#[derive(Debug, Clone)]
pub struct ReviewTable {
    root: String,
    groups: Vec<ReviewGroup>,
    sort: SortConfig,
    pagination: Pagination,
}

impl ReviewTable {
    /// Build from a scan. New files start selected, uploaded ones not.
    /// An empty scan is a validation failure.
    pub fn from_scan(resp: ScanFolderResponse, page_size: usize) -> UiResult<Self> {
        if resp.files.is_empty() {
            return Err(UiError::validation("path", format!("No .mcap files found in {}", resp.path)));
        }
        let mut groups: Vec<ReviewGroup> = Vec::new();
        for file in resp.files {
            let selected = !file.already_uploaded;
            let item = ReviewFile { file, selected };
            match groups.iter_mut().find(|g| g.folder == item.file.folder) {
                Some(g) => g.files.push(item),
                None => groups.push(ReviewGroup { folder: item.file.folder.clone(), files: vec![item], expanded: false }),
            }
        }
        groups.sort_by(|a, b| a.folder.to_lowercase().cmp(&b.folder.to_lowercase()));
        if groups.len() == 1 {
            groups[0].expanded = true;
        }

        let mut table = Self {
            root: resp.path,
            groups,
            sort: SortConfig::new("name", SortDirection::Asc),
            pagination: Pagination::new(page_size),
        };
        table.resort();
        table.refresh_total();
        Ok(table)
    }

    fn resort(&mut self) {
        for g in &mut self.groups {
            sort_rows(&mut g.files, &self.sort);
        }
    }

    fn refresh_total(&mut self) {
        let total = self.line_count();
        self.pagination.set_total(total);
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn groups(&self) -> &[ReviewGroup] {
        &self.groups
    }

    pub fn toggle_sort(&mut self, column: &str) {
        self.sort.toggle(column);
        self.resort();
    }

    pub fn sort(&self) -> &SortConfig {
        &self.sort
    }

    pub fn toggle_group(&mut self, folder: &str) -> bool {
        let Some(g) = self.groups.iter_mut().find(|g| g.folder == folder) else {
            return false;
        };
        g.expanded = !g.expanded;
        self.refresh_total();
        true
    }

    pub fn expand_all(&mut self) {
        self.groups.iter_mut().for_each(|g| g.expanded = true);
        self.refresh_total();
    }

    pub fn collapse_all(&mut self) {
        self.groups.iter_mut().for_each(|g| g.expanded = false);
        self.refresh_total();
    }

    fn files_mut(&mut self) -> impl Iterator<Item = &mut ReviewFile> {
        self.groups.iter_mut().flat_map(|g| g.files.iter_mut())
    }

    pub fn files(&self) -> impl Iterator<Item = &ReviewFile> {
        self.groups.iter().flat_map(|g| g.files.iter())
    }

    pub fn toggle_file(&mut self, path: &str) -> bool {
        match self.files_mut().find(|f| f.file.path == path) {
            Some(f) => {
                f.selected = !f.selected;
                true
            }
            None => false,
        }
    }

    pub fn select_all(&mut self, selected: bool) {
        self.files_mut().for_each(|f| f.selected = selected);
    }

    pub fn select_only_new(&mut self) {
        self.files_mut().for_each(|f| f.selected = !f.file.already_uploaded);
    }

    /// Selected paths in display order.
    pub fn selected_paths(&self) -> Vec<String> {
        self.files().filter(|f| f.selected).map(|f| f.file.path.clone()).collect()
    }

    pub fn selected_count(&self) -> usize {
        self.files().filter(|f| f.selected).count()
    }

    pub fn selected_bytes(&self) -> u64 {
        self.files().filter(|f| f.selected).map(|f| f.file.size).sum()
    }

    pub fn counts(&self) -> Counts {
        let mut c = Counts::default();
        for g in &self.groups {
            let gc = g.counts();
            c.total += gc.total;
            c.uploaded += gc.uploaded;
        }
        c
    }

    /// `12 new, 30 already uploaded (4.2 GB selected)`
    pub fn summary_text(&self) -> String {
        let c = self.counts();
        format!(
            "{} new, {} already uploaded ({} selected)",
            c.pending(),
            c.uploaded,
            fmt_bytes(self.selected_bytes())
        )
    }

    fn line_count(&self) -> usize {
        self.groups.iter().map(|g| 1 + if g.expanded { g.files.len() } else { 0 }).sum()
    }

    /// Group headers and the files of expanded groups, current page only.
    pub fn page_lines(&self) -> Vec<ReviewLine<'_>> {
        let r = self.pagination.range();
        self.groups
            .iter()
            .flat_map(|g| {
                let files: Box<dyn Iterator<Item = ReviewLine<'_>>> = if g.expanded {
                    Box::new(g.files.iter().map(ReviewLine::File))
                } else {
                    Box::new(std::iter::empty())
                };
                std::iter::once(ReviewLine::Group(g)).chain(files)
            })
            .skip(r.start)
            .take(r.len())
            .collect()
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn pagination_mut(&mut self) -> &mut Pagination {
        &mut self.pagination
    }
}
