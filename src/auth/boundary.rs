//! Login boundary: the "go log in again" side of an unauthorized response.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tracing::warn;

/// Destination the client falls back to when the backend rejects a session.
///
/// The API client calls [`LoginBoundary::enter`] after clearing the stored
/// token, unless [`LoginBoundary::is_active`] reports that the application
/// is already there.
pub trait LoginBoundary: Send + Sync {
    /// Whether the application is already at the login boundary.
    fn is_active(&self) -> bool;

    /// Move the application to the login boundary.
    fn enter(&self);
}

/// Default boundary for headless use: records the state and logs a hint.
#[derive(Debug, Default)]
pub struct LogBoundary {
    active: AtomicBool,
    entered: AtomicU64,
}

impl LogBoundary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave the boundary, e.g. once a fresh token has been stored.
    pub fn leave(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    /// How many times the boundary has been entered.
    pub fn times_entered(&self) -> u64 {
        self.entered.load(Ordering::SeqCst)
    }
}

impl LoginBoundary for LogBoundary {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        self.active.store(true, Ordering::SeqCst);
        self.entered.fetch_add(1, Ordering::SeqCst);
        warn!("Session is no longer valid; run `inkpost session set-token <TOKEN>` to sign in again");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_boundary_enter_and_leave() {
        let boundary = LogBoundary::new();
        assert!(!boundary.is_active());
        boundary.enter();
        assert!(boundary.is_active());
        assert_eq!(boundary.times_entered(), 1);
        boundary.leave();
        assert!(!boundary.is_active());
        assert_eq!(boundary.times_entered(), 1);
    }
}
