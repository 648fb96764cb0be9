#![forbid(unsafe_code)]

//! Per-root event loop owner.
//!
//! [`TooltipRoot`] holds every session mounted under one rendering root, the
//! timer queue that drives hover debounce, and the root's
//! [`SingletonRegistry`]. All work happens synchronously on the caller's
//! thread: `dispatch` applies an input event, `advance` moves the virtual
//! clock and fires due timers one at a time.
//!
//! # Invariants
//!
//! 1. At most one hover session is visible at any point between calls.
//! 2. An evicted session is hidden before the claimant is shown, within the
//!    same call.
//! 3. After `unmount` returns, no timer can touch the unmounted session.
//! 4. `drain_changes` reports visibility flips in the order they happened.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use tiptrig::{Event, PointerKind, RootConfig, TooltipRoot, TriggerConfig};
//!
//! let mut root = TooltipRoot::new(RootConfig::default());
//! let tip = root.mount(TriggerConfig::hover());
//!
//! root.dispatch(tip, &Event::Pointer(PointerKind::Over)).unwrap();
//! assert!(!root.is_visible(tip));
//!
//! root.advance(Duration::from_millis(400));
//! assert!(root.is_visible(tip));
//! ```

use std::time::Duration;

use ahash::AHashMap;
use thiserror::Error;
use tiptrig_core::config::{ConfigError, RootConfig, TriggerConfig, TriggerMode};
use tiptrig_core::event::Event;
use tiptrig_core::timer::{TimerHandle, TimerQueue};

use crate::coordinator::SingletonRegistry;
use crate::machine::{Effect, Input, TipState};
use crate::session::{SessionId, TimerFired, TooltipSession, VisibilityChange};

/// Errors returned by [`TooltipRoot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TooltipError {
    /// The id was never mounted here or has been unmounted.
    #[error("unknown tooltip session {0}")]
    UnknownSession(SessionId),
}

/// Owner of all tooltip sessions under one rendering root.
pub struct TooltipRoot {
    config: RootConfig,
    now: Duration,
    timers: TimerQueue<TimerFired>,
    registry: SingletonRegistry,
    sessions: AHashMap<SessionId, TooltipSession>,
    next_id: u64,
    changes: Vec<VisibilityChange>,
}

impl std::fmt::Debug for TooltipRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TooltipRoot")
            .field("now", &self.now)
            .field("sessions", &self.sessions.len())
            .field("timers", &self.timers.len())
            .field("active_hover", &self.registry.active())
            .finish()
    }
}

impl Default for TooltipRoot {
    fn default() -> Self {
        Self::new(RootConfig::default())
    }
}

impl TooltipRoot {
    /// Create an empty root.
    #[must_use]
    pub fn new(config: RootConfig) -> Self {
        Self {
            config,
            now: Duration::ZERO,
            timers: TimerQueue::new(),
            registry: SingletonRegistry::new(),
            sessions: AHashMap::new(),
            next_id: 1,
            changes: Vec::new(),
        }
    }

    /// Root configuration.
    #[must_use]
    pub const fn config(&self) -> &RootConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Mount a trigger + tooltip pair after validating its delay overrides.
    pub fn try_mount(&mut self, config: TriggerConfig) -> Result<SessionId, ConfigError> {
        Ok(self.mount(config.checked()?))
    }

    /// Mount a trigger + tooltip pair. It starts closed.
    ///
    /// Delay overrides are taken as given; use [`Self::try_mount`] for
    /// configs that come from outside the program.
    pub fn mount(&mut self, config: TriggerConfig) -> SessionId {
        let id = SessionId::from_raw(self.next_id);
        self.next_id += 1;
        self.sessions
            .insert(id, TooltipSession::new(id, &config, &self.config.policy));
        tracing::debug!(target: "tiptrig.session", session = %id, mode = %config.mode, "mounted");
        id
    }

    /// Unmount a session: cancel its timer and release any hover claim.
    ///
    /// Returns `false` if the session was already gone.
    pub fn unmount(&mut self, id: SessionId) -> bool {
        if !self.sessions.contains_key(&id) {
            return false;
        }
        self.apply(id, Input::Teardown);
        self.sessions.remove(&id);
        tracing::debug!(target: "tiptrig.session", session = %id, "unmounted");
        true
    }

    /// Unmount every session.
    pub fn unmount_all(&mut self) {
        let mut ids: Vec<SessionId> = self.sessions.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            self.unmount(id);
        }
    }

    /// Register a callback invoked with the new visibility on every flip.
    pub fn on_open_change(
        &mut self,
        id: SessionId,
        listener: impl FnMut(bool) + 'static,
    ) -> Result<(), TooltipError> {
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(TooltipError::UnknownSession(id))?;
        session.add_listener(Box::new(listener));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Deliver a raw trigger event to session `id`.
    pub fn dispatch(&mut self, id: SessionId, event: &Event) -> Result<(), TooltipError> {
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(TooltipError::UnknownSession(id))?;
        let Some(intent) = session.binding_mut().process(event) else {
            tracing::trace!(target: "tiptrig.session", session = %id, event = event.name(), "no intent");
            return Ok(());
        };
        tracing::trace!(
            target: "tiptrig.session",
            session = %id,
            event = event.name(),
            intent = intent.name(),
            "intent"
        );
        self.apply(id, Input::Intent(intent));
        Ok(())
    }

    /// Move the virtual clock forward by `by`, firing due timers.
    pub fn advance(&mut self, by: Duration) {
        self.advance_to(self.now.saturating_add(by));
    }

    /// Move the virtual clock to `target`, firing due timers in order.
    ///
    /// Targets in the past are clamped to the current time.
    pub fn advance_to(&mut self, target: Duration) {
        let target = target.max(self.now);
        loop {
            match self.timers.next_deadline() {
                Some(deadline) if deadline <= target => {
                    self.now = self.now.max(deadline);
                    if let Some((handle, fired)) = self.timers.pop_due(self.now) {
                        self.fire(handle, fired);
                    }
                }
                _ => break,
            }
        }
        self.now = target;
    }

    fn fire(&mut self, handle: TimerHandle, fired: TimerFired) {
        let Some(session) = self.sessions.get_mut(&fired.session) else {
            return;
        };
        if session.take_fired(handle) {
            self.apply(fired.session, fired.input());
        }
    }

    // -----------------------------------------------------------------------
    // Transition plumbing
    // -----------------------------------------------------------------------

    fn apply(&mut self, id: SessionId, input: Input) {
        let Some(session) = self.sessions.get_mut(&id) else {
            return;
        };
        let mode = session.mode();
        let effects = session.step(input, &mut self.timers, self.now);

        for effect in effects {
            match effect {
                Effect::Claim => {
                    if let Some(evicted) = self.registry.claim(id) {
                        self.apply(evicted, Input::Evicted);
                    }
                }
                Effect::Release => {
                    self.registry.release(id);
                }
                Effect::Show => {
                    if mode == TriggerMode::Click && self.config.exclusive_click {
                        self.close_other_clicks(id);
                    }
                    self.set_visible(id, true);
                }
                Effect::Hide => self.set_visible(id, false),
                Effect::StartOpenTimer | Effect::StartCloseTimer | Effect::CancelTimer => {}
            }
        }
    }

    fn close_other_clicks(&mut self, id: SessionId) {
        let mut others: Vec<SessionId> = self
            .sessions
            .values()
            .filter(|s| s.id() != id && s.mode() == TriggerMode::Click && s.is_visible())
            .map(TooltipSession::id)
            .collect();
        others.sort_unstable();
        for other in others {
            self.apply(other, Input::Evicted);
        }
    }

    fn set_visible(&mut self, id: SessionId, visible: bool) {
        let Some(session) = self.sessions.get_mut(&id) else {
            return;
        };
        if session.set_visible(visible) {
            self.changes.push(VisibilityChange {
                session: id,
                visible,
                at: self.now,
            });
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Current virtual time.
    #[inline]
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Whether session `id` is visible. Unknown ids are not visible.
    #[must_use]
    pub fn is_visible(&self, id: SessionId) -> bool {
        self.sessions.get(&id).is_some_and(TooltipSession::is_visible)
    }

    /// State of session `id`.
    #[must_use]
    pub fn state(&self, id: SessionId) -> Option<TipState> {
        self.sessions.get(&id).map(TooltipSession::state)
    }

    /// Mode of session `id`.
    #[must_use]
    pub fn mode(&self, id: SessionId) -> Option<TriggerMode> {
        self.sessions.get(&id).map(TooltipSession::mode)
    }

    /// Borrow session `id`.
    #[must_use]
    pub fn session(&self, id: SessionId) -> Option<&TooltipSession> {
        self.sessions.get(&id)
    }

    /// Every visible session, in mount order.
    #[must_use]
    pub fn visible_sessions(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self
            .sessions
            .values()
            .filter(|s| s.is_visible())
            .map(TooltipSession::id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// The hover session currently holding exclusive visibility.
    #[inline]
    #[must_use]
    pub const fn active_hover(&self) -> Option<SessionId> {
        self.registry.active()
    }

    /// Number of mounted sessions.
    #[inline]
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of pending timers.
    #[inline]
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Take the visibility flips recorded since the last call.
    pub fn drain_changes(&mut self) -> Vec<VisibilityChange> {
        std::mem::take(&mut self.changes)
    }
}
