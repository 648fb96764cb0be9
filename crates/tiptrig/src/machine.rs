#![forbid(unsafe_code)]

//! Tooltip visibility state machine.
//!
//! A pure transition function: `(mode, state, input) -> (state, effects)`.
//! It never touches timers, the coordinator, or the rendering layer; the
//! caller performs the returned [`Effect`]s in order.
//!
//! # States
//!
//! ```text
//!            RequestOpen              OpenElapsed
//!   Closed ──────────────▶ OpenPending ───────────▶ Open
//!     ▲                        │                   │  ▲
//!     │        RequestClose    │      RequestClose │  │ RequestOpen
//!     ├────────────────────────┘                   ▼  │
//!     │               CloseElapsed / Evicted   ClosePending
//!     └────────────────────────────────────────────┘
//! ```
//!
//! `OpenPending` and `ClosePending` occur in hover mode only. Click and focus
//! modes move between `Closed` and `Open` synchronously.
//!
//! # Invariants
//!
//! 1. `Show` is emitted exactly when a transition enters a visible state from
//!    a hidden one, and `Hide` exactly on the reverse.
//! 2. In hover mode `Claim` precedes `Show`, so an evicted session is hidden
//!    before the claiming session becomes visible.
//! 3. `Teardown` always lands in `Closed` and always cancels the timer.
//! 4. Inputs that do not apply to the current state produce no effects.

use tiptrig_core::config::TriggerMode;

use crate::binding::Intent;

/// Logical visibility state of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TipState {
    /// Hidden, nothing pending.
    #[default]
    Closed,
    /// Hidden, open timer running.
    OpenPending,
    /// Visible, nothing pending.
    Open,
    /// Visible, close timer running.
    ClosePending,
}

impl TipState {
    /// Whether the tooltip is rendered in this state.
    #[inline]
    #[must_use]
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::Open | Self::ClosePending)
    }

    /// Whether a timer is expected to be running in this state.
    #[inline]
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::OpenPending | Self::ClosePending)
    }

    /// Short label used in log fields.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::OpenPending => "open_pending",
            Self::Open => "open",
            Self::ClosePending => "close_pending",
        }
    }
}

/// Everything that can drive a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// An intent from the trigger binding.
    Intent(Intent),
    /// The open timer expired.
    OpenElapsed,
    /// The close timer expired.
    CloseElapsed,
    /// Another session took exclusive visibility; close now.
    Evicted,
    /// The trigger is being unmounted.
    Teardown,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Cancel any pending timer and start the open timer.
    StartOpenTimer,
    /// Cancel any pending timer and start the close timer.
    StartCloseTimer,
    /// Cancel any pending timer.
    CancelTimer,
    /// Take exclusive hover visibility from the coordinator.
    Claim,
    /// Give up exclusive hover visibility, if held.
    Release,
    /// Tooltip became visible.
    Show,
    /// Tooltip became hidden.
    Hide,
}

/// Result of applying one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: TipState,
    pub to: TipState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn stay(state: TipState) -> Self {
        Self {
            from: state,
            to: state,
            effects: Vec::new(),
        }
    }

    fn to(from: TipState, to: TipState, effects: &[Effect]) -> Self {
        Self {
            from,
            to,
            effects: effects.to_vec(),
        }
    }

    /// Whether the state changed.
    #[inline]
    #[must_use]
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Apply `input` to a session in `state` running in `mode`.
#[must_use]
pub fn transition(mode: TriggerMode, state: TipState, input: Input) -> Transition {
    if input == Input::Teardown {
        return teardown(mode, state);
    }
    match mode {
        TriggerMode::Hover => hover(state, input),
        TriggerMode::Click => click(state, input),
        TriggerMode::Focus => focus(state, input),
    }
}

fn teardown(mode: TriggerMode, state: TipState) -> Transition {
    let mut effects = vec![Effect::CancelTimer];
    if state.is_visible() {
        effects.push(Effect::Hide);
    }
    if mode == TriggerMode::Hover {
        effects.push(Effect::Release);
    }
    Transition {
        from: state,
        to: TipState::Closed,
        effects,
    }
}

fn hover(state: TipState, input: Input) -> Transition {
    use Effect::*;
    use TipState::*;

    match (state, input) {
        (Closed, Input::Intent(Intent::RequestOpen)) => {
            Transition::to(state, OpenPending, &[StartOpenTimer])
        }
        // Still visible: drop the close timer, no re-announcement.
        (ClosePending, Input::Intent(Intent::RequestOpen)) => {
            Transition::to(state, Open, &[CancelTimer])
        }
        (OpenPending, Input::Intent(Intent::RequestClose)) => {
            Transition::to(state, Closed, &[CancelTimer])
        }
        (Open, Input::Intent(Intent::RequestClose)) => {
            Transition::to(state, ClosePending, &[StartCloseTimer])
        }
        (OpenPending, Input::OpenElapsed) => Transition::to(state, Open, &[Claim, Show]),
        (ClosePending, Input::CloseElapsed) => Transition::to(state, Closed, &[Hide, Release]),
        (Open | ClosePending, Input::Evicted) => {
            Transition::to(state, Closed, &[CancelTimer, Hide])
        }
        _ => Transition::stay(state),
    }
}

fn click(state: TipState, input: Input) -> Transition {
    use Effect::*;
    use TipState::*;

    match (state, input) {
        (Closed, Input::Intent(Intent::Toggle)) => Transition::to(state, Open, &[Show]),
        (Open, Input::Intent(Intent::Toggle | Intent::Dismiss)) | (Open, Input::Evicted) => {
            Transition::to(state, Closed, &[Hide])
        }
        _ => Transition::stay(state),
    }
}

fn focus(state: TipState, input: Input) -> Transition {
    use Effect::*;
    use TipState::*;

    match (state, input) {
        (Closed, Input::Intent(Intent::RequestOpen)) => Transition::to(state, Open, &[Show]),
        (Open, Input::Intent(Intent::RequestClose | Intent::Dismiss)) | (Open, Input::Evicted) => {
            Transition::to(state, Closed, &[Hide])
        }
        _ => Transition::stay(state),
    }
}
