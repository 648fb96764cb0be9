#![forbid(unsafe_code)]

//! Core: input events, timers, and configuration for tiptrig.
//!
//! # Role in tiptrig
//! `tiptrig-core` is the leaf layer. It owns the canonical raw events a
//! trigger can receive, the deterministic timer queue that backs hover
//! debounce, and the configuration types loaded at startup.
//!
//! # How it fits in the system
//! The `tiptrig` crate consumes [`event::Event`] values, schedules delayed
//! transitions on a [`timer::TimerQueue`], and reads delays from
//! [`config::RootConfig`]. Nothing in this crate knows about tooltip state.

pub mod config;
pub mod event;
pub mod timer;

pub use config::{ConfigError, RootConfig, TooltipPolicy, TriggerConfig, TriggerMode};
pub use event::{Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, PointerKind};
pub use timer::{TimerHandle, TimerQueue};
