use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::browser::{FolderBrowser, ReviewTable};
use crate::completion::{CompletionSummary, CompletionTable};
use crate::config::UiConfig;
use crate::error::{UiError, UiResult};
use crate::logs::LogViewer;
use crate::notify::Notifications;
use crate::progress::{ConsumerOutcome, FrameScheduler, ProgressConsumer};
use crate::scan::{ScanSession, ScanUpdate};
use crate::settings::SettingsForm;
use crate::stream::{StreamConnector, StreamMessage};
use crate::types::{ActiveJob, PreFilterStats, ScanFolderResponse};
use crate::upload;
use crate::view::Panels;

pub const PANEL_REVIEW: &str = "review";
pub const PANEL_PROGRESS: &str = "progress";
pub const PANEL_COMPLETION: &str = "completion";
pub const PANEL_ERROR: &str = "error";

/// Everything one page session knows.
///
/// Constructed once per page load (or CLI invocation) and handed to whatever
/// needs it; torn down on navigation. There is no global state and no locking:
/// all mutation happens through `&mut self` on one thread.
pub struct Session<C: StreamConnector + Clone, S: FrameScheduler> {
    /// The client configuration.
    pub config: Arc<UiConfig>,
    /// Job the progress view belongs to.
    ///
    /// Set once per user-initiated start or resume, cleared on cancel/reset.
    pub job_id: Option<String>,
    /// Wall-clock start of the current job, for the elapsed time in the summary.
    pub job_started_at: Option<DateTime<Utc>>,
    /// The live progress stream and its render buffers.
    pub progress: ProgressConsumer<C, S>,
    /// The background folder scan of the browsed folder.
    pub scan: ScanSession<C>,
    pub browser: FolderBrowser,
    /// Result of the last recursive scan, grouped for review.
    pub review: Option<ReviewTable>,
    pub pre_filter: Option<PreFilterStats>,
    pub completion: Option<CompletionSummary>,
    pub completion_table: Option<CompletionTable>,
    pub settings: SettingsForm,
    pub logs: LogViewer,
    pub notifications: Notifications,
    pub panels: Panels,
}

impl<C: StreamConnector + Clone, S: FrameScheduler> Session<C, S> {
    pub fn new(config: Arc<UiConfig>, connector: C, scheduler: S) -> Self {
        let progress = ProgressConsumer::new(connector.clone(), scheduler, config.phase_weights());
        Self {
            job_id: None,
            job_started_at: None,
            progress,
            scan: ScanSession::new(connector),
            browser: FolderBrowser::new(config.browser.folders_per_page),
            review: None,
            pre_filter: None,
            completion: None,
            completion_table: None,
            settings: SettingsForm::new(),
            logs: LogViewer::new(config.logs.page_size, config.logs.default_limit),
            notifications: Notifications::default(),
            panels: Panels::new(),
            config,
        }
    }

    /// Surface an error as a toast. Validation problems are warnings, the rest errors.
    pub fn report(&mut self, err: &UiError) {
        warn!(error = %err, "operation failed");
        self.notifications.report(err);
    }

    /// Store a scan result for review. An empty scan only notifies.
    pub fn set_scan_result(&mut self, resp: ScanFolderResponse) -> UiResult<()> {
        match ReviewTable::from_scan(resp, self.config.browser.review_page_size) {
            Ok(table) => {
                self.review = Some(table);
                self.pre_filter = None;
                self.panels.show(PANEL_REVIEW);
                Ok(())
            }
            Err(e) => {
                self.report(&e);
                Err(e)
            }
        }
    }

    /// Switch the page over to a job that was just started.
    pub fn begin_job(&mut self, job_id: &str, files: &[String], now: DateTime<Utc>) -> UiResult<()> {
        self.completion = None;
        self.completion_table = None;
        upload::attach_job(&mut self.progress, job_id, files)?;
        self.job_id = Some(job_id.to_string());
        self.job_started_at = Some(now);
        self.panels.hide(PANEL_REVIEW);
        self.panels.hide(PANEL_COMPLETION);
        self.panels.hide(PANEL_ERROR);
        self.panels.show(PANEL_PROGRESS);
        Ok(())
    }

    /// Re-attach to a job that was still running on the server.
    pub fn resume_job(&mut self, job: &ActiveJob, now: DateTime<Utc>) -> UiResult<()> {
        self.completion = None;
        self.completion_table = None;
        upload::attach_active(&mut self.progress, job)?;
        self.job_id = Some(job.job_id.clone());
        // The real start is unknown; elapsed time counts from the reconnect.
        self.job_started_at = Some(now);
        self.panels.show(PANEL_PROGRESS);
        self.notifications.info(format!("Reconnected to running job {}", job.job_id));
        Ok(())
    }

    /// Route one progress stream message and react to terminal outcomes.
    pub fn handle_progress(&mut self, message: StreamMessage, now: DateTime<Utc>) -> ConsumerOutcome {
        let outcome = self.progress.handle(message);
        match &outcome {
            ConsumerOutcome::Finished(summary) => {
                let summary = match self.job_started_at {
                    Some(start) => summary.clone().with_elapsed(start, now),
                    None => summary.clone(),
                };
                info!(job_id = %summary.job_id, headline = %summary.headline(), "showing completion summary");
                match &summary.message {
                    Some(msg) => {
                        self.notifications.error(msg.clone());
                    }
                    None => {
                        self.notifications.success(format!("{}: {}", summary.outcome.title(), summary.headline()));
                    }
                }
                self.completion_table = Some(CompletionTable::new(&summary, self.config.completion.page_size));
                self.completion = Some(summary);
                self.panels.hide(PANEL_PROGRESS);
                self.panels.show(PANEL_COMPLETION);
            }
            ConsumerOutcome::Failed(message) => {
                self.notifications.error(message.clone());
                self.panels.set_text(PANEL_ERROR, message.clone());
                self.panels.show(PANEL_ERROR);
            }
            ConsumerOutcome::Continue | ConsumerOutcome::Ignored => {}
        }
        outcome
    }

    /// Route one folder scan message into the browser's badges.
    pub fn handle_scan(&mut self, message: StreamMessage) -> ScanUpdate {
        let update = match message {
            StreamMessage::Data(text) => self.scan.handle_message(&text),
            StreamMessage::Error(detail) => self.scan.handle_transport_error(&detail),
        };
        self.browser.apply_scan_update(&update);
        if let ScanUpdate::Failed(message) = &update {
            self.notifications.warning(message.clone());
        }
        update
    }

    /// The browsed folder was reloaded while its scan keeps running.
    pub fn restore_scan_badges(&mut self) {
        if let Some(agg) = self.scan.aggregator() {
            self.browser.restore_scan(agg);
        }
    }

    /// Local half of a job cancel: close the stream and forget the job.
    pub fn cancel_job_locally(&mut self) {
        self.progress.cancel();
        if let Some(job_id) = self.job_id.take() {
            self.notifications.info(format!("Job {} cancelled", job_id));
        }
        self.job_started_at = None;
        self.panels.hide(PANEL_PROGRESS);
    }

    /// Leave the page: close every stream and drop per-page state.
    pub fn reset(&mut self) {
        self.progress.disconnect();
        self.scan.reset();
        self.job_id = None;
        self.job_started_at = None;
        self.review = None;
        self.pre_filter = None;
        self.completion = None;
        self.completion_table = None;
    }
}
