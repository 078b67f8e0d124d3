//! Unit and integration tests for the Wolkenlift client.
//!
//! ## Test Modules
//!
//! - **fakes**: in-memory connector and HTTP transport used by the unit tests
//! - **progress_tests**: render buffering, coalescing, queue labels, phase weights
//! - **consumer_tests**: progress stream lifecycle and message handling
//! - **scan_tests**: background folder scan aggregation and badges
//! - **browser_tests**: folder navigation fallback and the review table
//! - **upload_tests**: job start/resume/cancel and the page session
//! - **completion_tests**: summary, sortable table, CSV export
//! - **settings_tests**, **logs_tests**: settings form and log viewer
//! - **format_tests**, **error_tests**, **config_tests**, **events_tests**, **storage_tests**
//! - **integration_tests**: reqwest + SSE against an axum mock server (native only)
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test
//! cargo test consumer_tests
//! ```


pub mod progress_tests;
pub mod scan_tests;
pub mod upload_tests;
pub mod settings_tests;
pub mod format_tests;
pub mod config_tests;
pub mod storage_tests;
#[cfg(feature = "native")]
pub mod integration_tests;
