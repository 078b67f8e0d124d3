//! Job progress pipeline.
//!
//! Stream messages go through [`ProgressConsumer`], which buffers per-file
//! updates and the overall snapshot in a [`ProgressReconciler`]. The reconciler
//! asks a [`FrameScheduler`] for one frame per batch and applies everything in
//! a single [`flush`](ProgressReconciler::flush): rows first, then queue labels,
//! then the overall header.

pub mod buffer;
pub mod consumer;
pub mod queue;
pub mod reconciler;
pub mod rows;
pub mod scheduler;
pub mod weights;

pub use consumer::{CloseReason, ConsumerOutcome, ProgressConsumer, StreamState};
pub use reconciler::{FlushReport, OverallDisplay, ProgressReconciler};
pub use rows::{BadgeTone, FileRow, RowChange, StatusBadge};
pub use scheduler::{FrameScheduler, TickScheduler};
pub use weights::{Phase, PhaseWeights};
