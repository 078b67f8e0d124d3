/// "Run before the next paint" primitive.
///
/// The reconciler calls [`request_frame`](FrameScheduler::request_frame) at most
/// once per pending flush; the implementation must eventually call back into
/// the reconciler's `flush`. In the browser this is `requestAnimationFrame`, in
/// the native client a fixed-rate tick.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// Scheduler for render loops that flush on their own fixed tick.
///
/// Only records that a frame was asked for; the loop polls [`take_request`](Self::take_request).
#[derive(Debug, Default)]
pub struct TickScheduler {
    requested: bool,
    requests: u64,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_request(&mut self) -> bool {
        std::mem::take(&mut self.requested)
    }

    pub fn is_requested(&self) -> bool {
        self.requested
    }

    /// Frames requested since creation.
    pub fn requests(&self) -> u64 {
        self.requests
    }
}

impl FrameScheduler for TickScheduler {
    fn request_frame(&mut self) {
        self.requested = true;
        self.requests += 1;
    }
}

impl<S: FrameScheduler + ?Sized> FrameScheduler for Box<S> {
    fn request_frame(&mut self) {
        (**self).request_frame()
    }
}
