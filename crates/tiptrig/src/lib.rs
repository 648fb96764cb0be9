#![forbid(unsafe_code)]

//! Trigger-controlled tooltip visibility.
//!
//! # Role in tiptrig
//! This crate decides when a tooltip anchored to a trigger becomes visible
//! and when it is dismissed. It does not render anything: the rendering
//! layer reads [`TooltipRoot::is_visible`] or drains
//! [`TooltipRoot::drain_changes`] and mounts or unmounts the tooltip node.
//!
//! # Primary responsibilities
//! - **TriggerBinding**: raw trigger events to [`Intent`]s per [`TriggerMode`].
//! - **State machine**: pure `(mode, state, input) -> (state, effects)`.
//! - **SingletonRegistry**: at most one visible hover tooltip per root.
//! - **TooltipRoot**: owns sessions, the timer queue, and the registry for
//!   one rendering root; drives everything from `dispatch` and `advance`.
//!
//! # How it fits in the system
//! Input arrives as [`tiptrig_core::event::Event`]. Hover debounce is backed
//! by [`tiptrig_core::timer::TimerQueue`] on a virtual clock advanced by the
//! host loop, so the whole pipeline is deterministic under test.

pub mod binding;
pub mod coordinator;
pub mod machine;
pub mod root;
pub mod session;

pub use binding::{Intent, TriggerBinding};
pub use coordinator::SingletonRegistry;
pub use machine::{Effect, Input, TipState, Transition, transition};
pub use root::{TooltipError, TooltipRoot};
pub use session::{SessionId, TooltipSession, VisibilityChange};

pub use tiptrig_core::config::{
    ConfigError, Delays, RootConfig, TooltipPolicy, TriggerConfig, TriggerMode,
};
pub use tiptrig_core::event::{Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, PointerKind};
