//! Native (tokio) platform glue for the terminal client.

pub mod driver;
pub mod http;
pub mod render;
pub mod sse;

pub use driver::Client;
pub use http::ReqwestTransport;
pub use sse::{SseConnector, SseHandle, StreamEnvelope};
