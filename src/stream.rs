//! Server push channel seam.
//!
//! The browser backs this with `EventSource`, the native client with a reqwest
//! body stream read on a tokio task. Messages are fed back into the owning
//! consumer by the platform glue; the traits here only cover opening and
//! closing, which is where the "one live connection" rule is enforced.

use crate::error::UiResult;

/// A live push connection.
pub trait StreamHandle {
    /// Unique per opened connection; lets platform glue drop messages of closed streams.
    fn id(&self) -> u64;
    /// Close immediately. Must be idempotent.
    fn close(&mut self);
    fn is_open(&self) -> bool;
}

/// Opens push connections for a path below the API base URL.
pub trait StreamConnector {
    type Handle: StreamHandle;

    fn open(&mut self, path: &str) -> UiResult<Self::Handle>;
}

/// Raw input from a push connection, as delivered by platform glue.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    Data(String),
    /// Transport failed or the server hung up.
    Error(String),
}
