use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::http::{join_url, map_reqwest_error};
use crate::error::{UiError, UiResult};
use crate::sse::SseParser;
use crate::stream::{StreamConnector, StreamHandle, StreamMessage};

/// A stream message tagged with the connection it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamEnvelope {
    pub stream_id: u64,
    pub message: StreamMessage,
}

/// Opens SSE connections on background tasks; all of them report into one channel.
#[derive(Clone)]
pub struct SseConnector {
    client: reqwest::Client,
    base_url: String,
    tx: mpsc::UnboundedSender<StreamEnvelope>,
    next_id: Arc<AtomicU64>,
}

impl SseConnector {
    pub fn new(base_url: &str) -> UiResult<(Self, mpsc::UnboundedReceiver<StreamEnvelope>)> {
        // No overall timeout: the stream lives as long as the job.
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(map_reqwest_error)?;
        let (tx, rx) = mpsc::unbounded_channel();
        Ok((Self { client, base_url: base_url.to_string(), tx, next_id: Arc::new(AtomicU64::new(1)) }, rx))
    }
}

pub struct SseHandle {
    id: u64,
    cancel: CancellationToken,
}

impl StreamHandle for SseHandle {
    fn id(&self) -> u64 {
        self.id
    }

    fn close(&mut self) {
        self.cancel.cancel();
    }

    fn is_open(&self) -> bool {
        !self.cancel.is_cancelled()
    }
}

impl StreamConnector for SseConnector {
    type Handle = SseHandle;

    fn open(&mut self, path: &str) -> UiResult<SseHandle> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        let url = join_url(&self.base_url, path);
        let task_cancel = cancel.clone();
        let client = self.client.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = task_cancel.cancelled() => {
                    debug!(stream_id = id, "sse reader cancelled");
                }
                err = read_stream(client, url, id, tx.clone()) => {
                    if task_cancel.is_cancelled() {
                        return;
                    }
                    let detail = err.to_string();
                    warn!(stream_id = id, %detail, "sse stream ended");
                    let _ = tx.send(StreamEnvelope { stream_id: id, message: StreamMessage::Error(detail) });
                }
            }
        });

        Ok(SseHandle { id, cancel })
    }
}

/// Read events until the stream ends; the returned error says why it ended.
async fn read_stream(
    client: reqwest::Client,
    url: String,
    id: u64,
    tx: mpsc::UnboundedSender<StreamEnvelope>,
) -> UiError {
    let resp = match client.get(&url).header(reqwest::header::ACCEPT, "text/event-stream").send().await {
        Ok(r) => r,
        Err(e) => return map_reqwest_error(e),
    };
    let status = resp.status().as_u16();
    if !resp.status().is_success() {
        let body = resp.text().await.unwrap_or_default();
        return UiError::from_response(status, &body);
    }

    let mut parser = SseParser::new();
    let mut pending: Vec<u8> = Vec::new();
    let mut body = resp.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => return map_reqwest_error(e),
        };
        pending.extend_from_slice(&chunk);
        // Decode only up to the last newline so multi-byte characters never split.
        let Some(cut) = pending.iter().rposition(|b| *b == b'\n') else {
            continue;
        };
        let complete: Vec<u8> = pending.drain(..=cut).collect();
        let text = String::from_utf8_lossy(&complete);
        for ev in parser.feed(&text) {
            if tx.send(StreamEnvelope { stream_id: id, message: StreamMessage::Data(ev.data) }).is_err() {
                return UiError::Stream("receiver dropped".into());
            }
        }
    }
    UiError::Stream("connection closed by server".into())
}
