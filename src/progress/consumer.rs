use std::collections::HashSet;

use tracing::{debug, error, info, warn};

use super::reconciler::{FlushReport, ProgressReconciler};
use super::scheduler::FrameScheduler;
use super::weights::{Phase, PhaseWeights};
use crate::api::routes;
use crate::completion::{CompletionOutcome, CompletionSummary};
use crate::error::UiResult;
use crate::events::ProgressEvent;
use crate::metrics::Metrics;
use crate::stream::{StreamConnector, StreamHandle, StreamMessage};
use crate::types::{FileStatus, JobSnapshot, OverallProgress};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Finished,
    ServerError,
    TransportLost,
    Cancelled,
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Open,
    Closed(CloseReason),
}

/// Result of handing one message to the consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsumerOutcome {
    /// Buffered; a flush is scheduled.
    Continue,
    /// Dropped: malformed, stale, or the stream is already closed.
    Ignored,
    /// Terminal status reached; delivered exactly once per job.
    Finished(CompletionSummary),
    /// Server-reported error or lost connection; the stream is closed.
    Failed(String),
}

/// Owns the single live progress connection and translates its messages into
/// reconciler updates.
pub struct ProgressConsumer<C: StreamConnector, S: FrameScheduler> {
    connector: C,
    scheduler: S,
    connection: Option<C::Handle>,
    job_id: Option<String>,
    state: StreamState,
    weights: PhaseWeights,
    reconciler: ProgressReconciler,
    analyzed: HashSet<String>,
    expected_total: Option<u64>,
    awaiting_upload: bool,
    metrics: Metrics,
}

impl<C: StreamConnector, S: FrameScheduler> ProgressConsumer<C, S> {
    pub fn new(connector: C, scheduler: S, weights: PhaseWeights) -> Self {
        let metrics = Metrics::new();
        Self {
            connector,
            scheduler,
            connection: None,
            job_id: None,
            state: StreamState::Idle,
            weights,
            reconciler: ProgressReconciler::new(metrics.clone()),
            analyzed: HashSet::new(),
            expected_total: None,
            awaiting_upload: false,
            metrics,
        }
    }

    /// Open the progress stream for `job_id`.
    ///
    /// Calling again for the job that is already streaming is a no-op. Any other
    /// connection is closed first and all buffers of the previous job are dropped.
    pub fn connect(&mut self, job_id: &str) -> UiResult<()> {
        if self.state == StreamState::Open && self.job_id.as_deref() == Some(job_id) {
            if self.connection.as_ref().map(|c| c.is_open()).unwrap_or(false) {
                debug!(job_id, "progress stream already open");
                return Ok(());
            }
        }

        self.close_connection();
        self.reconciler.reset();
        self.analyzed.clear();
        self.expected_total = None;
        self.awaiting_upload = false;
        self.job_id = Some(job_id.to_string());
        self.state = StreamState::Idle;

        let handle = self.connector.open(&routes::job_events(job_id))?;
        self.metrics.inc_opened();
        info!(job_id, connection = handle.id(), "progress stream opened");
        self.connection = Some(handle);
        self.state = StreamState::Open;
        Ok(())
    }

    /// Render the job's file list before the first event arrives.
    pub fn seed_files(&mut self, files: &[FileStatus]) {
        if self.expected_total.is_none() {
            self.expected_total = Some(files.len() as u64);
        }
        self.reconciler.seed(files);
    }

    /// Start directly in the upload phase (resuming a job that is past analysis).
    pub fn resume_in_upload_phase(&mut self) {
        self.reconciler.set_phase(Phase::Upload, &mut self.scheduler);
    }

    pub fn handle(&mut self, message: StreamMessage) -> ConsumerOutcome {
        match message {
            StreamMessage::Data(text) => self.handle_message(&text),
            StreamMessage::Error(detail) => self.handle_transport_error(&detail),
        }
    }

    pub fn handle_message(&mut self, text: &str) -> ConsumerOutcome {
        if self.state != StreamState::Open {
            debug!("progress message after close dropped");
            return ConsumerOutcome::Ignored;
        }
        self.metrics.inc_events();

        let event = match ProgressEvent::parse(text) {
            Ok(ev) => ev,
            Err(e) => {
                self.metrics.inc_malformed();
                warn!(error = %e, "malformed progress message ignored");
                return ConsumerOutcome::Ignored;
            }
        };

        match event {
            ProgressEvent::AnalysisProgress { file, total_files } => {
                self.on_analysis_progress(file, total_files);
                ConsumerOutcome::Continue
            }
            ProgressEvent::AnalysisComplete { auto_upload } => {
                let total = self.total_files();
                self.queue_overall(OverallProgress {
                    progress_percent: self.weights.overall(Phase::Analysis, 1.0),
                    files_completed: self.analyzed.len() as u64,
                    total_files: total,
                    ..Default::default()
                });
                if auto_upload {
                    self.awaiting_upload = true;
                    ConsumerOutcome::Continue
                } else {
                    self.finish(CompletionOutcome::AnalysisFinished, None)
                }
            }
            ProgressEvent::AutoUploadStarting => {
                self.awaiting_upload = false;
                self.reconciler.set_phase(Phase::Upload, &mut self.scheduler);
                let total = self.total_files();
                self.queue_overall(OverallProgress {
                    progress_percent: self.weights.prior(Phase::Upload),
                    total_files: total,
                    ..Default::default()
                });
                info!(job_id = ?self.job_id, "upload phase started");
                ConsumerOutcome::Continue
            }
            ProgressEvent::Snapshot(snapshot) => self.on_snapshot(snapshot),
            ProgressEvent::Error { message } => {
                error!(job_id = ?self.job_id, %message, "server reported job error");
                self.close(CloseReason::ServerError);
                ConsumerOutcome::Failed(message)
            }
        }
    }

    /// The transport failed. Closes the stream; only the first failure is reported.
    pub fn handle_transport_error(&mut self, detail: &str) -> ConsumerOutcome {
        if self.state != StreamState::Open {
            return ConsumerOutcome::Ignored;
        }
        error!(job_id = ?self.job_id, detail, "progress stream lost");
        self.close(CloseReason::TransportLost);
        ConsumerOutcome::Failed("Connection to server lost".to_string())
    }

    fn on_analysis_progress(&mut self, file: FileStatus, total_files: Option<u64>) {
        if let Some(t) = total_files {
            self.expected_total = Some(t);
        }
        if file.status.analysis_done() {
            self.analyzed.insert(file.filename.clone());
        } else {
            self.analyzed.remove(&file.filename);
        }
        self.reconciler.queue_file_update(file, &mut self.scheduler);

        let total = self.total_files();
        let done = self.analyzed.len() as u64;
        let fraction = if total == 0 { 0.0 } else { done as f64 / total as f64 };
        self.queue_overall(OverallProgress {
            progress_percent: self.weights.overall(Phase::Analysis, fraction),
            files_completed: done,
            total_files: total,
            ..Default::default()
        });
    }

    fn on_snapshot(&mut self, snapshot: JobSnapshot) -> ConsumerOutcome {
        if self.job_id.as_deref() != Some(snapshot.job_id.as_str()) {
            warn!(expected = ?self.job_id, got = %snapshot.job_id, "snapshot for another job ignored");
            return ConsumerOutcome::Ignored;
        }
        // Untyped snapshots always describe the upload phase.
        if self.reconciler.phase() == Phase::Analysis {
            self.reconciler.set_phase(Phase::Upload, &mut self.scheduler);
        }

        let files_done = snapshot.files.iter().filter(|f| f.status.is_final()).count() as u64;
        let file_count = snapshot.files.len() as u64;
        for f in snapshot.files {
            self.reconciler.queue_file_update(f, &mut self.scheduler);
        }

        let total = snapshot.total_files.unwrap_or_else(|| file_count.max(self.total_files()));
        self.queue_overall(OverallProgress {
            progress_percent: self.weights.overall(Phase::Upload, snapshot.progress_percent / 100.0),
            files_completed: snapshot.files_completed.unwrap_or(files_done),
            total_files: total,
            uploaded_bytes: snapshot.uploaded_bytes.unwrap_or(0),
            total_bytes: snapshot.total_bytes.unwrap_or(0),
            eta_seconds: snapshot.eta_seconds,
        });

        if snapshot.status.is_terminal() {
            let outcome = CompletionOutcome::from_job_state(snapshot.status);
            return self.finish(outcome, snapshot.error_message);
        }
        ConsumerOutcome::Continue
    }

    fn queue_overall(&mut self, snapshot: OverallProgress) {
        self.reconciler.queue_progress_snapshot(snapshot, &mut self.scheduler);
    }

    fn total_files(&self) -> u64 {
        self.expected_total.unwrap_or(self.reconciler.known_files() as u64)
    }

    /// Terminal status: render the final frame, close, build the summary.
    fn finish(&mut self, outcome: CompletionOutcome, message: Option<String>) -> ConsumerOutcome {
        self.reconciler.flush();
        let job_id = self.job_id.clone().unwrap_or_default();
        let summary = CompletionSummary::from_statuses(&job_id, outcome, self.reconciler.latest_statuses(), message);
        info!(
            job_id = %job_id,
            outcome = ?summary.outcome,
            completed = summary.counts.completed,
            failed = summary.counts.failed,
            skipped = summary.counts.skipped,
            "job finished"
        );
        self.close(CloseReason::Finished);
        ConsumerOutcome::Finished(summary)
    }

    fn close_connection(&mut self) {
        if let Some(mut conn) = self.connection.take() {
            conn.close();
            self.metrics.inc_closed();
            debug!(connection = conn.id(), "progress stream closed");
        }
    }

    fn close(&mut self, reason: CloseReason) {
        self.close_connection();
        self.state = StreamState::Closed(reason);
    }

    /// User cancelled the job; the server-side cancel is the caller's business.
    pub fn cancel(&mut self) {
        if self.state == StreamState::Open {
            info!(job_id = ?self.job_id, "progress stream cancelled");
        }
        self.close(CloseReason::Cancelled);
    }

    /// Leaving the page: close without reporting anything.
    pub fn disconnect(&mut self) {
        self.close(CloseReason::Disconnected);
    }

    /// Frame callback. Flushes buffered updates; a no-op when nothing is pending.
    pub fn flush(&mut self) -> FlushReport {
        self.reconciler.flush()
    }

    pub fn reconciler(&self) -> &ProgressReconciler {
        &self.reconciler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == StreamState::Open
    }

    /// Id of the live connection, for discarding messages from closed ones.
    pub fn connection_id(&self) -> Option<u64> {
        self.connection.as_ref().map(|c| c.id())
    }

    pub fn phase(&self) -> Phase {
        self.reconciler.phase()
    }

    pub fn awaiting_upload(&self) -> bool {
        self.awaiting_upload
    }

    pub fn weights(&self) -> PhaseWeights {
        self.weights
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}
