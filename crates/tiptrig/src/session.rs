#![forbid(unsafe_code)]

//! One trigger + tooltip pairing.
//!
//! A [`TooltipSession`] owns its binding, its state, and at most one pending
//! timer. Timer effects are carried out here; effects that reach beyond the
//! session (coordinator claims, visibility notifications) are handed back to
//! the owning root in order.

use std::time::Duration;

use tiptrig_core::config::{Delays, TooltipPolicy, TriggerConfig, TriggerMode};
use tiptrig_core::timer::{TimerHandle, TimerQueue};

use crate::binding::TriggerBinding;
use crate::machine::{Effect, Input, TipState, transition};

/// Identifier of a mounted session, unique within its root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Build an id from its raw value.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tip#{}", self.0)
    }
}

/// Which delayed transition a timer drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    Open,
    Close,
}

/// Payload stored in the root's timer queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub session: SessionId,
    pub kind: TimerKind,
}

impl TimerFired {
    /// The machine input this expiry maps to.
    #[must_use]
    pub const fn input(self) -> Input {
        match self.kind {
            TimerKind::Open => Input::OpenElapsed,
            TimerKind::Close => Input::CloseElapsed,
        }
    }
}

/// A visibility flip, reported to the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityChange {
    pub session: SessionId,
    pub visible: bool,
    /// Virtual time of the flip.
    pub at: Duration,
}

type OpenChangeFn = Box<dyn FnMut(bool)>;

/// Runtime state of one trigger + tooltip pairing.
pub struct TooltipSession {
    id: SessionId,
    mode: TriggerMode,
    delays: Delays,
    binding: TriggerBinding,
    state: TipState,
    visible: bool,
    pending_timer: Option<TimerHandle>,
    listeners: Vec<OpenChangeFn>,
}

impl std::fmt::Debug for TooltipSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TooltipSession")
            .field("id", &self.id)
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("visible", &self.visible)
            .field("pending_timer", &self.pending_timer)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl TooltipSession {
    pub(crate) fn new(id: SessionId, config: &TriggerConfig, policy: &TooltipPolicy) -> Self {
        Self {
            id,
            mode: config.mode,
            delays: config.resolve(policy),
            binding: TriggerBinding::new(config.mode),
            state: TipState::Closed,
            visible: false,
            pending_timer: None,
            listeners: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    #[inline]
    #[must_use]
    pub const fn mode(&self) -> TriggerMode {
        self.mode
    }

    #[inline]
    #[must_use]
    pub const fn state(&self) -> TipState {
        self.state
    }

    /// Whether the tooltip is currently rendered.
    #[inline]
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    #[inline]
    #[must_use]
    pub const fn delays(&self) -> Delays {
        self.delays
    }

    /// Handle of the outstanding timer, if any.
    #[inline]
    #[must_use]
    pub const fn pending_timer(&self) -> Option<TimerHandle> {
        self.pending_timer
    }

    #[inline]
    #[must_use]
    pub const fn binding(&self) -> &TriggerBinding {
        &self.binding
    }

    pub(crate) fn binding_mut(&mut self) -> &mut TriggerBinding {
        &mut self.binding
    }

    pub(crate) fn add_listener(&mut self, listener: OpenChangeFn) {
        self.listeners.push(listener);
    }

    /// Run `input` through the machine. Timer effects are applied against
    /// `timers`; the remaining effects are returned in order for the owner.
    pub(crate) fn step(
        &mut self,
        input: Input,
        timers: &mut TimerQueue<TimerFired>,
        now: Duration,
    ) -> Vec<Effect> {
        let t = transition(self.mode, self.state, input);
        if t.changed() {
            tracing::debug!(
                target: "tiptrig.session",
                session = %self.id,
                mode = %self.mode,
                from = t.from.name(),
                to = t.to.name(),
                "transition"
            );
        }
        self.state = t.to;

        let mut external = Vec::with_capacity(t.effects.len());
        for effect in t.effects {
            match effect {
                Effect::StartOpenTimer => self.restart_timer(timers, now, TimerKind::Open),
                Effect::StartCloseTimer => self.restart_timer(timers, now, TimerKind::Close),
                Effect::CancelTimer => self.cancel_timer(timers),
                Effect::Claim | Effect::Release | Effect::Show | Effect::Hide => {
                    external.push(effect);
                }
            }
        }
        external
    }

    /// Mark a fired timer as consumed. Returns `false` for stale handles.
    pub(crate) fn take_fired(&mut self, handle: TimerHandle) -> bool {
        if self.pending_timer == Some(handle) {
            self.pending_timer = None;
            true
        } else {
            false
        }
    }

    /// Flip the rendered flag and notify listeners. Returns whether it changed.
    pub(crate) fn set_visible(&mut self, visible: bool) -> bool {
        if self.visible == visible {
            return false;
        }
        self.visible = visible;
        for listener in &mut self.listeners {
            listener(visible);
        }
        true
    }

    fn restart_timer(&mut self, timers: &mut TimerQueue<TimerFired>, now: Duration, kind: TimerKind) {
        self.cancel_timer(timers);
        let delay = match kind {
            TimerKind::Open => self.delays.open,
            TimerKind::Close => self.delays.close,
        };
        let payload = TimerFired {
            session: self.id,
            kind,
        };
        self.pending_timer = Some(timers.schedule(now, delay, payload));
    }

    fn cancel_timer(&mut self, timers: &mut TimerQueue<TimerFired>) {
        if let Some(handle) = self.pending_timer.take() {
            timers.cancel(handle);
        }
    }
}
