#![forbid(unsafe_code)]

//! Singleton coordinator for hover tooltips.
//!
//! One [`SingletonRegistry`] exists per rendering root. It remembers which
//! hover session, if any, is currently visible. Claiming evicts the previous
//! holder; the caller must close the evicted session in the same turn, before
//! the claimant is shown.

use crate::session::SessionId;

/// Registry of the single visible hover session.
#[derive(Debug, Clone, Default)]
pub struct SingletonRegistry {
    active: Option<SessionId>,
}

impl SingletonRegistry {
    /// Create an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self { active: None }
    }

    /// Register `session` as the active hover session.
    ///
    /// Returns the previously active session when it differs from `session`;
    /// that session has been deregistered and must be forced closed.
    pub fn claim(&mut self, session: SessionId) -> Option<SessionId> {
        let evicted = self.active.replace(session).filter(|&prev| prev != session);
        match evicted {
            Some(prev) => tracing::debug!(
                target: "tiptrig.coordinator",
                claimant = %session,
                evicted = %prev,
                "hover claim evicted previous session"
            ),
            None => tracing::debug!(
                target: "tiptrig.coordinator",
                claimant = %session,
                "hover claim"
            ),
        }
        evicted
    }

    /// Deregister `session` if it is the active one. Returns whether it was.
    pub fn release(&mut self, session: SessionId) -> bool {
        if self.active != Some(session) {
            return false;
        }
        self.active = None;
        tracing::debug!(target: "tiptrig.coordinator", session = %session, "hover release");
        true
    }

    /// The active hover session.
    #[inline]
    #[must_use]
    pub const fn active(&self) -> Option<SessionId> {
        self.active
    }

    /// Whether `session` is the active hover session.
    #[inline]
    #[must_use]
    pub fn is_active(&self, session: SessionId) -> bool {
        self.active == Some(session)
    }
}
