//! Roster lock - the advisory mutex over roster mutation
//!
//! Acquisition never blocks: a second caller gets a busy error carrying
//! the holder's reason string, which is surfaced verbatim to the user.
//! Release happens on guard drop, so every exit path including panics and
//! early `?` returns unlocks. Readers never take this lock; they use
//! roster snapshots.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::error::{ServiceError, ServiceResult};

/// Advisory lock carrying the holder's reason
#[derive(Debug, Clone, Default)]
pub struct RosterLock {
    holder: Arc<Mutex<Option<String>>>,
}

/// Held lock; dropping releases
#[derive(Debug)]
pub struct RosterGuard {
    holder: Arc<Mutex<Option<String>>>,
}

impl RosterLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to take the lock, recording why
    ///
    /// # Errors
    /// Returns `ServiceError::Busy` with the current holder's reason if the
    /// lock is already held.
    pub fn lock(&self, reason: &str) -> ServiceResult<RosterGuard> {
        let mut slot = self.holder.lock();
        if let Some(held) = slot.as_ref() {
            return Err(ServiceError::busy(held.clone()));
        }
        *slot = Some(reason.to_string());
        debug!(reason, "Roster lock acquired");
        Ok(RosterGuard {
            holder: Arc::clone(&self.holder),
        })
    }

    /// The current holder's reason, if held
    pub fn holder(&self) -> Option<String> {
        self.holder.lock().clone()
    }
}

impl Drop for RosterGuard {
    fn drop(&mut self) {
        let mut slot = self.holder.lock();
        debug!(reason = slot.as_deref(), "Roster lock released");
        *slot = None;
    }
}
