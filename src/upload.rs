//! Starting, cancelling and resuming analysis/upload jobs.
//!
//! The async halves only talk to the API; attaching a job to the progress
//! consumer is synchronous so the web UI never holds a borrow across an await.

use tracing::{info, warn};

use crate::api::{ApiClient, HttpTransport};
use crate::error::{UiError, UiResult};
use crate::progress::{FrameScheduler, ProgressConsumer};
use crate::stream::StreamConnector;
use crate::types::{ActiveJob, BulkAnalyzeRequest, FileState, FileStatus, JobState, PreFilterStats};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadOptions {
    pub auto_upload: bool,
    pub skip_duplicates: bool,
    pub pre_filter_only: bool,
}

/// Result of `bulk-analyze`.
#[derive(Debug, Clone, PartialEq)]
pub enum JobStart {
    /// A job runs on the server; its files are listed in submission order.
    Started { job_id: String, files: Vec<String>, pre_filter: Option<PreFilterStats> },
    /// `pre_filter_only`: statistics only, no job.
    PreFilter(PreFilterStats),
}

fn file_name(path: &str) -> String {
    path.rsplit(['/', '\\']).next().unwrap_or(path).to_string()
}

pub async fn request_job<T: HttpTransport>(
    api: &ApiClient<T>,
    paths: Vec<String>,
    opts: UploadOptions,
) -> UiResult<JobStart> {
    if paths.is_empty() {
        return Err(UiError::validation("files", "No files selected"));
    }
    let files: Vec<String> = paths.iter().map(|p| file_name(p)).collect();
    let req = BulkAnalyzeRequest {
        file_paths: paths,
        pre_filter_only: opts.pre_filter_only,
        auto_upload: opts.auto_upload,
        skip_duplicates: opts.skip_duplicates,
    };
    let resp = api.bulk_analyze(&req).await?;

    if opts.pre_filter_only {
        let stats = resp
            .pre_filter
            .ok_or_else(|| UiError::Decode("pre-filter response carried no statistics".into()))?;
        info!(total = stats.total_files, new = stats.new_files, "pre-filter finished");
        return Ok(JobStart::PreFilter(stats));
    }

    let job_id = resp
        .job_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| UiError::Decode(resp.message.unwrap_or_else(|| "bulk-analyze returned no job_id".into())))?;
    info!(%job_id, files = files.len(), auto_upload = opts.auto_upload, "job started");
    Ok(JobStart::Started { job_id, files, pre_filter: resp.pre_filter })
}

/// Connect the consumer to a freshly started job and render its files as pending.
pub fn attach_job<C: StreamConnector, S: FrameScheduler>(
    consumer: &mut ProgressConsumer<C, S>,
    job_id: &str,
    files: &[String],
) -> UiResult<()> {
    consumer.connect(job_id)?;
    let seed: Vec<FileStatus> = files.iter().map(|f| FileStatus::new(f.clone(), FileState::Pending)).collect();
    consumer.seed_files(&seed);
    Ok(())
}

pub async fn cancel_job<T: HttpTransport>(api: &ApiClient<T>, job_id: &str) -> UiResult<()> {
    api.cancel_job(job_id).await?;
    info!(job_id, "job cancelled");
    Ok(())
}

/// The job still running on the server, if any. Terminal jobs are ignored.
pub async fn find_active_job<T: HttpTransport>(api: &ApiClient<T>) -> UiResult<Option<ActiveJob>> {
    match api.active_job().await? {
        Some(job) if !job.status.is_terminal() => Ok(Some(job)),
        Some(job) => {
            warn!(job_id = %job.job_id, status = ?job.status, "active job already finished");
            Ok(None)
        }
        None => Ok(None),
    }
}

/// Re-attach to a job found via [`find_active_job`].
pub fn attach_active<C: StreamConnector, S: FrameScheduler>(
    consumer: &mut ProgressConsumer<C, S>,
    job: &ActiveJob,
) -> UiResult<()> {
    consumer.connect(&job.job_id)?;
    let uploading = job.phase.as_deref() == Some("upload") || job.status == JobState::Uploading;
    if uploading {
        consumer.resume_in_upload_phase();
    }
    consumer.seed_files(&job.files);
    info!(job_id = %job.job_id, uploading, "resumed active job");
    Ok(())
}
