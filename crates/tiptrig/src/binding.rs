#![forbid(unsafe_code)]

//! Trigger binding: raw trigger events to intents.
//!
//! [`TriggerBinding`] wraps one trigger element and translates the raw
//! [`Event`]s it receives into [`Intent`]s according to the trigger's
//! [`TriggerMode`].
//!
//! | Mode  | Raw event                               | Intent        |
//! |-------|-----------------------------------------|---------------|
//! | Click | press                                   | `Toggle`      |
//! | Click | `Escape` while focused                  | `Dismiss`     |
//! | Click | Alt + arrow while focused               | `Dismiss`     |
//! | Hover | pointer enter / over                    | `RequestOpen` |
//! | Hover | pointer leave / out                     | `RequestClose`|
//! | Focus | focus gained                            | `RequestOpen` |
//! | Focus | focus lost                              | `RequestClose`|
//! | Focus | `Escape` while focused                  | `Dismiss`     |
//!
//! # Invariants
//!
//! 1. Only `KeyEventKind::Press` key events produce intents.
//! 2. Dismiss keys are ignored while the trigger does not hold focus.
//! 3. Every pointer arrival produces `RequestOpen` and every departure
//!    `RequestClose`; repeats are absorbed by the state machine, so a trigger
//!    whose tooltip was evicted reopens on the next arrival.
//!
//! Events on the tooltip body are never routed here, so hovering the tooltip
//! itself does not keep it open.

use tiptrig_core::config::TriggerMode;
use tiptrig_core::event::{Event, KeyCode, KeyEvent, KeyEventKind};

/// Normalized action derived from raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Open, possibly after a delay.
    RequestOpen,
    /// Close, possibly after a delay.
    RequestClose,
    /// Flip between open and closed.
    Toggle,
    /// Close now, from the keyboard.
    Dismiss,
}

impl Intent {
    /// Short label used in log fields.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RequestOpen => "request_open",
            Self::RequestClose => "request_close",
            Self::Toggle => "toggle",
            Self::Dismiss => "dismiss",
        }
    }
}

/// Per-trigger translator from raw events to intents.
#[derive(Debug, Clone)]
pub struct TriggerBinding {
    mode: TriggerMode,
    focused: bool,
    hovered: bool,
}

impl TriggerBinding {
    /// Create a binding for a trigger in `mode`.
    #[must_use]
    pub const fn new(mode: TriggerMode) -> Self {
        Self {
            mode,
            focused: false,
            hovered: false,
        }
    }

    /// Process one raw event, returning the intent it maps to (if any).
    pub fn process(&mut self, event: &Event) -> Option<Intent> {
        match *event {
            Event::Focus(gained) => {
                self.focused = gained;
                match (self.mode, gained) {
                    (TriggerMode::Focus, true) => Some(Intent::RequestOpen),
                    (TriggerMode::Focus, false) => Some(Intent::RequestClose),
                    _ => None,
                }
            }
            Event::Press => {
                // Activating a control moves focus to it.
                self.focused = true;
                (self.mode == TriggerMode::Click).then_some(Intent::Toggle)
            }
            Event::Pointer(kind) => {
                let arriving = kind.is_arrival();
                self.hovered = arriving;
                if self.mode != TriggerMode::Hover {
                    return None;
                }
                Some(if arriving {
                    Intent::RequestOpen
                } else {
                    Intent::RequestClose
                })
            }
            Event::Key(key) => self.on_key(key),
        }
    }

    fn on_key(&self, key: KeyEvent) -> Option<Intent> {
        if key.kind != KeyEventKind::Press || !self.focused {
            return None;
        }
        match self.mode {
            TriggerMode::Click if key.code == KeyCode::Escape => Some(Intent::Dismiss),
            TriggerMode::Click if key.alt() && key.is_arrow() => Some(Intent::Dismiss),
            TriggerMode::Focus if key.code == KeyCode::Escape => Some(Intent::Dismiss),
            _ => None,
        }
    }

    /// The trigger's activation mode.
    #[inline]
    #[must_use]
    pub const fn mode(&self) -> TriggerMode {
        self.mode
    }

    /// Whether the trigger currently holds focus.
    #[inline]
    #[must_use]
    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    /// Whether the pointer is currently over the trigger.
    #[inline]
    #[must_use]
    pub const fn is_hovered(&self) -> bool {
        self.hovered
    }
}
