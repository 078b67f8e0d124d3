use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::http::ReqwestTransport;
use super::render;
use super::sse::{SseConnector, StreamEnvelope};
use crate::api::ApiClient;
use crate::browser::FolderBrowser;
use crate::completion::csv_filename;
use crate::config::UiConfig;
use crate::progress::{ConsumerOutcome, TickScheduler};
use crate::scan::ScanUpdate;
use crate::state::Session;
use crate::storage::JsonFileStore;
use crate::types::{LogLevel, ScanFolderRequest};
use crate::upload::{self, JobStart, UploadOptions};

/// Terminal client: one session, one event channel, everything on the current task.
pub struct Client {
    config: Arc<UiConfig>,
    api: ApiClient<ReqwestTransport>,
    session: Session<SseConnector, TickScheduler>,
    events: mpsc::UnboundedReceiver<StreamEnvelope>,
    store: JsonFileStore,
}

impl Client {
    pub fn new(config: Arc<UiConfig>) -> anyhow::Result<Self> {
        let transport =
            ReqwestTransport::new(&config.api.base_url, Duration::from_millis(config.api.request_timeout_ms))?;
        let (connector, events) = SseConnector::new(&config.api.base_url)?;
        let store = JsonFileStore::open(&config.persistence.state_file)
            .with_context(|| format!("opening state file {}", config.persistence.state_file))?;
        let session = Session::new(config.clone(), connector, TickScheduler::new());
        Ok(Self { config, api: ApiClient::new(transport), session, events, store })
    }

    /// `path`, else the remembered folder, else the server's root.
    fn resolve_path(&self, path: Option<&str>) -> Option<String> {
        path.map(|p| p.to_string()).or_else(|| FolderBrowser::initial_path(&self.store, None))
    }

    pub async fn browse(&mut self, path: Option<&str>) -> anyhow::Result<()> {
        let target = self.resolve_path(path);
        self.session.browser.open(&self.api, target.as_deref()).await?;
        for line in render::folder_lines(&self.session.browser) {
            println!("{}", line);
        }

        if let Err(e) = self.start_background_scan().await {
            self.session.report(&e);
            return Ok(());
        }

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        loop {
            tokio::select! {
                Some(env) = self.events.recv() => {
                    if Some(env.stream_id) != self.session.scan.connection_id() {
                        debug!(stream_id = env.stream_id, "message from closed stream dropped");
                        continue;
                    }
                    match self.session.handle_scan(env.message) {
                        ScanUpdate::Badge { child, badge } => println!("  {}/ -> {}", child, badge.label()),
                        ScanUpdate::Complete { totals, upload_enabled } => {
                            println!(
                                "Scan complete: {} files, {} already uploaded{}",
                                totals.total,
                                totals.uploaded,
                                if upload_enabled { "" } else { " (nothing to upload)" }
                            );
                            break;
                        }
                        ScanUpdate::Failed(message) => {
                            println!("Scan failed: {}", message);
                            break;
                        }
                        ScanUpdate::RootFiles(_) | ScanUpdate::Ignored => {}
                    }
                }
                _ = &mut ctrl_c => {
                    if let Some(scan_id) = self.session.scan.reset() {
                        if let Err(e) = self.api.cancel_scan(&scan_id).await {
                            warn!(error = %e, "scan cancel failed");
                        }
                    }
                    println!("Scan cancelled");
                    break;
                }
            }
        }
        Ok(())
    }

    /// Cancel the previous background scan (best effort) and start one for the current folder.
    async fn start_background_scan(&mut self) -> crate::error::UiResult<()> {
        let Some(root) = self.session.browser.current_path().map(|p| p.to_string()) else {
            return Ok(());
        };
        if !self.session.scan.needs_restart(&root) && self.session.scan.is_streaming() {
            self.session.restore_scan_badges();
            return Ok(());
        }
        if let Some(previous) = self.session.scan.reset() {
            if let Err(e) = self.api.cancel_scan(&previous).await {
                warn!(scan_id = %previous, error = %e, "could not cancel previous scan");
            }
        }
        let resp = self.api.start_async_scan(&ScanFolderRequest { path: root.clone(), recursive: true }).await?;
        self.session.scan.attach(&root, &resp.scan_id)?;
        self.session.browser.mark_scanning();
        Ok(())
    }

    pub async fn upload(
        &mut self,
        path: Option<&str>,
        opts: UploadOptions,
        include_uploaded: bool,
        export: Option<PathBuf>,
    ) -> anyhow::Result<()> {
        let root = self
            .resolve_path(path)
            .ok_or_else(|| anyhow!("no folder given and no folder remembered"))?;
        let resp = self.api.scan_folder(&ScanFolderRequest { path: root.clone(), recursive: true }).await?;
        self.session.set_scan_result(resp)?;

        let paths = {
            let Some(review) = self.session.review.as_mut() else {
                return Ok(());
            };
            if include_uploaded {
                review.select_all(true);
            }
            for line in render::review_lines(review) {
                println!("{}", line);
            }
            review.selected_paths()
        };
        if paths.is_empty() {
            println!("Nothing new to upload.");
            return Ok(());
        }
        if let Err(e) = FolderBrowser::remember(&mut self.store, &root) {
            warn!(error = %e, "could not remember folder");
        }

        match upload::request_job(&self.api, paths, opts).await? {
            JobStart::PreFilter(stats) => {
                for line in render::pre_filter_lines(&stats) {
                    println!("{}", line);
                }
                self.session.pre_filter = Some(stats);
                Ok(())
            }
            JobStart::Started { job_id, files, pre_filter } => {
                if let Some(stats) = &pre_filter {
                    for line in render::pre_filter_lines(stats) {
                        println!("{}", line);
                    }
                }
                self.session.pre_filter = pre_filter;
                self.session.begin_job(&job_id, &files, Utc::now())?;
                println!("Job {} started ({} files)", job_id, files.len());
                self.run_job(export.as_deref()).await
            }
        }
    }

    pub async fn resume(&mut self, export: Option<PathBuf>) -> anyhow::Result<()> {
        let Some(job) = upload::find_active_job(&self.api).await? else {
            println!("No active job.");
            return Ok(());
        };
        self.session.resume_job(&job, Utc::now())?;
        println!("Reconnected to job {}", job.job_id);
        self.run_job(export.as_deref()).await
    }

    /// Pump progress messages, flush on every requested tick, stop on a terminal outcome.
    async fn run_job(&mut self, export: Option<&Path>) -> anyhow::Result<()> {
        let mut tick = tokio::time::interval(Duration::from_millis(self.config.progress.frame_interval_ms));
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                Some(env) = self.events.recv() => {
                    if Some(env.stream_id) != self.session.progress.connection_id() {
                        debug!(stream_id = env.stream_id, "message from closed stream dropped");
                        continue;
                    }
                    match self.session.handle_progress(env.message, Utc::now()) {
                        ConsumerOutcome::Finished(_) => return self.finish_job(export),
                        ConsumerOutcome::Failed(message) => {
                            self.print_files();
                            bail!(message);
                        }
                        ConsumerOutcome::Continue | ConsumerOutcome::Ignored => {}
                    }
                }
                _ = tick.tick() => {
                    if self.session.progress.scheduler_mut().take_request() {
                        let report = self.session.progress.flush();
                        if report.overall_applied {
                            if let Some(line) = render::overall_line(self.session.progress.reconciler()) {
                                println!("{}", line);
                            }
                        }
                    }
                }
                _ = &mut ctrl_c => {
                    if let Some(job_id) = self.session.job_id.clone() {
                        if let Err(e) = upload::cancel_job(&self.api, &job_id).await {
                            warn!(error = %e, "server-side cancel failed");
                        }
                    }
                    self.session.cancel_job_locally();
                    println!("Job cancelled.");
                    return Ok(());
                }
            }
        }
    }

    fn print_files(&self) {
        for line in render::file_lines(self.session.progress.reconciler()) {
            println!("{}", line);
        }
    }

    fn finish_job(&mut self, export: Option<&Path>) -> anyhow::Result<()> {
        let (Some(summary), Some(table)) = (&self.session.completion, &self.session.completion_table) else {
            return Ok(());
        };
        for line in render::summary_lines(summary, table) {
            println!("{}", line);
        }
        debug!(metrics = ?self.session.progress.metrics().get_snapshot(), "progress metrics");

        if let Some(target) = export {
            let file = if target.is_dir() { target.join(csv_filename(&summary.job_id, Utc::now())) } else { target.to_path_buf() };
            std::fs::write(&file, table.to_csv()).with_context(|| format!("writing {}", file.display()))?;
            info!(path = %file.display(), "completion CSV exported");
            println!("Exported {}", file.display());
        }
        Ok(())
    }

    pub async fn settings(
        &mut self,
        sets: &[String],
        check_update: bool,
        sync_cache: bool,
        invalidate_cache: bool,
    ) -> anyhow::Result<()> {
        let form = &mut self.session.settings;
        form.load(&self.api).await?;
        for assignment in sets {
            let (key, value) = assignment
                .split_once('=')
                .ok_or_else(|| anyhow!("expected key=value, got '{}'", assignment))?;
            form.set_field(key.trim(), value)?;
        }
        if form.is_dirty() {
            form.save(&self.api).await?;
            println!("Settings saved.");
        }
        if let Some(s) = form.draft() {
            println!("s3_bucket:          {}", s.s3_bucket);
            println!("s3_prefix:          {}", s.s3_prefix);
            println!("aws_region:         {}", s.aws_region);
            println!("upload_concurrency: {}", s.upload_concurrency);
            println!("skip_duplicates:    {}", s.skip_duplicates);
            println!("auto_upload:        {}", s.auto_upload);
            println!("default_folder:     {}", s.default_folder.as_deref().unwrap_or("-"));
        }

        if let Err(e) = form.load_version(&self.api).await {
            warn!(error = %e, "version unavailable");
        }
        if let Some(v) = &form.version {
            println!("version:            {}", v.version);
        }
        if check_update {
            form.check_update(&self.api).await?;
            if let Some(text) = form.update_text() {
                println!("{}", text);
            }
        }
        if sync_cache {
            let r = form.sync_cache(&self.api).await?;
            println!("Cache synced ({} entries)", r.affected);
        }
        if invalidate_cache {
            let r = form.invalidate_cache(&self.api).await?;
            println!("Cache invalidated ({} entries)", r.affected);
        }
        if form.cache.is_none() {
            form.refresh_cache(&self.api).await?;
        }
        if let Some(c) = &form.cache {
            println!(
                "cache:              {} entries, {} uploaded, last sync {}",
                c.total_entries,
                c.uploaded_files,
                c.last_sync.as_deref().unwrap_or("never")
            );
        }
        Ok(())
    }

    pub async fn logs(&mut self, level: Option<LogLevel>, search: Option<&str>, files: bool) -> anyhow::Result<()> {
        let viewer = &mut self.session.logs;
        viewer.set_level(level);
        viewer.set_search(search.unwrap_or(""));
        viewer.refresh(&self.api).await?;
        viewer.load_stats(&self.api).await?;
        if let Some(stats) = &viewer.stats {
            println!("{}", render::log_stats_line(stats));
        }
        for line in render::log_lines(viewer) {
            println!("{}", line);
        }
        if viewer.pagination().page_count() > 1 {
            println!("{} ({} entries)", viewer.pagination().label(), viewer.entries().len());
        }
        if files {
            viewer.load_files(&self.api).await?;
            for f in &viewer.files {
                println!("  {:<40} {:>10}", f.name, crate::format::fmt_bytes(f.size));
            }
        }
        Ok(())
    }
}
