//! Frame scheduling, decoupled from the host's refresh primitive.
//!
//! A [`Scheduler`] hands out one-shot frame requests. [`FrameLoop`] keeps at
//! most one request outstanding and only asks for the next frame once the
//! current one has finished, so frames never overlap. [`ManualScheduler`]
//! is the deterministic stand-in used by tests and the CLI.

use fog_core::error::EngineError;

/// Identifies one requested frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

pub trait Scheduler {
    /// Requests a single callback at the next display refresh.
    fn request_frame(&mut self) -> Result<FrameHandle, EngineError>;

    /// Cancels a pending request. Unknown or already-delivered handles are
    /// ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Scheduler driven by hand: requested frames queue up until
/// [`ManualScheduler::take_pending`] delivers them.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: Vec<FrameHandle>,
    cancelled: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every outstanding request, oldest first.
    pub fn take_pending(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Number of requests cancelled before delivery.
    pub fn cancelled_count(&self) -> usize {
        self.cancelled
    }
}

impl Scheduler for ManualScheduler {
    fn request_frame(&mut self) -> Result<FrameHandle, EngineError> {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.push(handle);
        Ok(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let before = self.pending.len();
        self.pending.retain(|&h| h != handle);
        self.cancelled += before - self.pending.len();
    }
}

/// Start/stop state machine over a [`Scheduler`].
#[derive(Debug)]
pub struct FrameLoop<S: Scheduler> {
    scheduler: S,
    pending: Option<FrameHandle>,
    running: bool,
}

impl<S: Scheduler> FrameLoop<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            pending: None,
            running: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Requests the first frame. Starting a running loop does nothing.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.running {
            return Ok(());
        }
        self.pending = Some(self.scheduler.request_frame()?);
        self.running = true;
        log::debug!("frame loop started");
        Ok(())
    }

    /// Cancels the outstanding request before returning.
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
        if self.running {
            log::debug!("frame loop stopped");
        }
        self.running = false;
    }

    /// Runs `frame` for the delivered request `handle`, then requests the
    /// next one.
    ///
    /// Only the outstanding request is honoured. Callbacks arriving while
    /// stopped, or carrying a handle from an earlier run, are ignored and
    /// return `Ok(false)`.
    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        frame: impl FnOnce(),
    ) -> Result<bool, EngineError> {
        if !self.running || self.pending != Some(handle) {
            log::trace!("ignored stale frame callback {}", handle.0);
            return Ok(false);
        }
        self.pending = None;
        frame();
        match self.scheduler.request_frame() {
            Ok(handle) => {
                self.pending = Some(handle);
                Ok(true)
            }
            Err(e) => {
                self.running = false;
                Err(e)
            }
        }
    }
}

impl<S: Scheduler> Drop for FrameLoop<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
