//! # Wolkenlift Client Library
//!
//! Client side of Wolkenlift, an upload manager that moves large `.mcap` log
//! files into cloud object storage. The server does the heavy lifting (analysis,
//! deduplication, uploads); this crate browses folders, starts jobs and keeps a
//! live view of their progress from the server's push streams.
//!
//! The core is platform-neutral and builds for `wasm32-unknown-unknown` (the
//! Dioxus web UI in `webui/`) as well as natively (the terminal client behind
//! the `native` feature).
//!
//! ## Core Components
//!
//! - [`progress`]: progress stream consumer, frame-batched reconciliation, queue labels
//! - [`scan`]: background folder scan aggregation per child folder
//! - [`browser`]: folder navigation and the scan review table
//! - [`upload`]: starting, cancelling and resuming jobs
//! - [`completion`]: completion summary, sortable table, CSV export
//! - [`settings`] / [`logs`]: settings page and log viewer
//! - [`api`]: typed HTTP client over a pluggable transport
//! - [`state`]: the per-page [`state::Session`]
//! - [`config`], [`error`], [`metrics`]: ambient plumbing
//!
//! ## Seams
//!
//! Platform specifics sit behind four traits: [`api::HttpTransport`],
//! [`stream::StreamConnector`], [`progress::FrameScheduler`] and
//! [`storage::KeyValueStore`].

pub mod api;
pub mod browser;
pub mod completion;
pub mod config;
pub mod error;
pub mod events;
pub mod format;
pub mod logs;
pub mod metrics;
pub mod notify;
pub mod progress;
pub mod scan;
pub mod settings;
pub mod sorting;
pub mod sse;
pub mod state;
pub mod storage;
pub mod stream;
pub mod types;
pub mod upload;
pub mod view;

#[cfg(feature = "native")]
pub mod native;

#[cfg(test)]
mod tests;
