//! Panel lifecycle: `Constructing → Ready → Destroyed`.
//!
//! The state is shared between the panel and the observer it registers on the
//! host, so whichever side is destroyed first wins the transition and the other
//! side sees `Destroyed` and does nothing.

use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Constructing,
    Ready,
    Destroyed,
}

/// Who initiated the destruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyCause {
    Disposed,
    HostDestroyed,
}

#[derive(Debug)]
pub(crate) struct Lifecycle {
    /// State and destroy cause change together under one lock.
    inner: Mutex<(PanelState, Option<DestroyCause>)>,
}

impl Lifecycle {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new((PanelState::Constructing, None)),
        })
    }

    pub(crate) fn state(&self) -> PanelState {
        self.inner.lock().0
    }

    pub(crate) fn cause(&self) -> Option<DestroyCause> {
        self.inner.lock().1
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.state() != PanelState::Destroyed
    }

    /// Constructing → Ready. No effect once destroyed.
    pub(crate) fn mark_ready(&self) {
        let mut inner = self.inner.lock();
        if inner.0 == PanelState::Constructing {
            inner.0 = PanelState::Ready;
        }
    }

    /// Move to `Destroyed`. Returns true only for the call that performed the
    /// transition; every later call is a no-op returning false.
    pub(crate) fn begin_destroy(&self, cause: DestroyCause) -> bool {
        let mut inner = self.inner.lock();
        if inner.0 == PanelState::Destroyed {
            return false;
        }
        *inner = (PanelState::Destroyed, Some(cause));
        tracing::debug!(?cause, "panel destroyed");
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
