//! Indexing run state: an IDLE/RUNNING phase plus a cooperative stop flag

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

const IDLE: u8 = 0;
const RUNNING: u8 = 1;

/// Cloneable handle polled by crawl tasks
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn set(&self, stopped: bool) {
        self.0.store(stopped, Ordering::SeqCst);
    }
}

/// Shared state machine guarding the single full-indexing run
#[derive(Debug, Default)]
pub struct IndexingState {
    phase: AtomicU8,
    stop: StopToken,
}

impl IndexingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move IDLE -> RUNNING and clear the stop flag; false if already running
    pub fn try_begin(&self) -> bool {
        let won = self
            .phase
            .compare_exchange(IDLE, RUNNING, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if won {
            self.stop.set(false);
        }
        won
    }

    /// Request a stop of the current run; false if nothing is running
    pub fn request_stop(&self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.stop.set(true);
        true
    }

    /// Return to IDLE
    pub fn finish(&self) {
        self.phase.store(IDLE, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.phase.load(Ordering::SeqCst) == RUNNING
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.is_stopped()
    }

    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }
}
