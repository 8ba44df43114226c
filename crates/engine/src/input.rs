//! Shared spotlight input.
//!
//! The embedding screen writes the spotlight (pointer moves, toggles) while
//! the frame loop reads it. Readers take one [`SpotlightInput::snapshot`] at
//! the start of a tick and use that copy for the whole frame, so a write
//! landing mid-frame is only seen by the next one.

use std::sync::{Arc, PoisonError, RwLock};

use fog_core::error::EngineError;
use fog_core::spotlight::SpotlightState;
use glam::DVec2;

/// Cloneable handle to the current [`SpotlightState`].
#[derive(Debug, Clone)]
pub struct SpotlightInput {
    state: Arc<RwLock<SpotlightState>>,
}

impl SpotlightInput {
    pub fn new(state: SpotlightState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Copy of the state as of now.
    pub fn snapshot(&self) -> SpotlightState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn move_to(&self, center: DVec2) {
        self.update(|s| s.center = center);
    }

    pub fn set_active(&self, active: bool) {
        self.update(|s| s.active = active);
    }

    /// Returns `EngineError::InvalidConfig` and leaves the state unchanged
    /// unless `radius` is finite and positive.
    pub fn set_radius(&self, radius: f64) -> Result<(), EngineError> {
        let current = self.snapshot();
        let next = SpotlightState::new(current.center, radius, current.active)?;
        self.update(|s| s.radius = next.radius);
        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut SpotlightState)) {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }
}
