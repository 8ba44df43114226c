//! `requestAnimationFrame` as a [`Scheduler`].

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use fog_core::error::EngineError;
use fog_engine::{FrameHandle, Scheduler};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Window;

/// The frame callback, installed after the scheduler is built because the
/// callback itself needs a handle to the state that owns the scheduler.
pub type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// The request the browser will deliver next. `requestAnimationFrame` does
/// not pass its id to the callback, so the scheduler records it here and
/// the callback takes it on delivery.
pub type ArmedFrame = Rc<Cell<Option<FrameHandle>>>;

pub struct RafScheduler {
    window: Window,
    callback: FrameCallback,
    armed: ArmedFrame,
}

impl RafScheduler {
    pub fn new(window: Window, callback: FrameCallback, armed: ArmedFrame) -> Self {
        Self {
            window,
            callback,
            armed,
        }
    }
}

impl Scheduler for RafScheduler {
    fn request_frame(&mut self) -> Result<FrameHandle, EngineError> {
        let callback = self.callback.borrow();
        let closure = callback
            .as_ref()
            .ok_or_else(|| EngineError::Scheduler("frame callback not installed".into()))?;
        let id = self
            .window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .map_err(|e| EngineError::Scheduler(format!("requestAnimationFrame: {e:?}")))?;
        let handle = FrameHandle(id as u64);
        self.armed.set(Some(handle));
        Ok(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.armed.get() == Some(handle) {
            self.armed.set(None);
        }
        if let Err(e) = self.window.cancel_animation_frame(handle.0 as i32) {
            log::warn!("cancelAnimationFrame({}) failed: {e:?}", handle.0);
        }
    }
}
