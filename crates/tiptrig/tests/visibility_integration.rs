#![forbid(unsafe_code)]

//! Integration tests for tooltip visibility across modes and sessions.
//!
//! # Invariants tested
//!
//! 1. Nothing is visible before any interaction.
//! 2. Click toggles synchronously; Escape and Alt+Arrow dismiss.
//! 3. Hover opens and closes only after the configured delays.
//! 4. At most one hover tooltip is visible per root, and an evicted tooltip
//!    is hidden in the same step the claimant is shown.
//! 5. Click and focus tooltips are independent of hover exclusivity.
//! 6. Roots do not share their registries.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tiptrig::{
    Event, KeyCode, KeyEvent, Modifiers, PointerKind, RootConfig, SessionId, TipState,
    TooltipPolicy, TooltipRoot, TriggerConfig, TriggerMode,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const OVER: Event = Event::Pointer(PointerKind::Over);
const OUT: Event = Event::Pointer(PointerKind::Out);

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn alt(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code).with_modifiers(Modifiers::ALT))
}

fn hover_open(root: &mut TooltipRoot, id: SessionId) {
    root.dispatch(id, &OVER).unwrap();
    root.advance(ms(400));
}

fn visible_hover_count(root: &TooltipRoot) -> usize {
    root.visible_sessions()
        .into_iter()
        .filter(|&id| root.mode(id) == Some(TriggerMode::Hover))
        .count()
}

// ===========================================================================
// Click
// ===========================================================================

#[test]
fn click_press_opens_and_closes() {
    let mut root = TooltipRoot::default();
    let tip = root.mount(TriggerConfig::click());
    assert!(!root.is_visible(tip));

    root.dispatch(tip, &Event::Press).unwrap();
    assert!(root.is_visible(tip));

    root.dispatch(tip, &Event::Press).unwrap();
    assert!(!root.is_visible(tip));
    assert_eq!(root.pending_timers(), 0);
}

#[test]
fn click_escape_dismisses() {
    let mut root = TooltipRoot::default();
    let tip = root.mount(TriggerConfig::click());
    root.dispatch(tip, &Event::Press).unwrap();
    root.dispatch(tip, &Event::key(KeyCode::Escape)).unwrap();
    assert!(!root.is_visible(tip));

    // Next press opens again rather than toggling a stale state.
    root.dispatch(tip, &Event::Press).unwrap();
    assert!(root.is_visible(tip));
}

#[test]
fn click_alt_arrow_down_dismisses() {
    let mut root = TooltipRoot::default();
    let tip = root.mount(TriggerConfig::click());
    root.dispatch(tip, &Event::Press).unwrap();
    root.dispatch(tip, &alt(KeyCode::Down)).unwrap();
    assert!(!root.is_visible(tip));
}

#[test]
fn click_dismiss_ignored_after_blur() {
    let mut root = TooltipRoot::default();
    let tip = root.mount(TriggerConfig::click());
    root.dispatch(tip, &Event::Press).unwrap();
    root.dispatch(tip, &Event::Focus(false)).unwrap();
    root.dispatch(tip, &Event::key(KeyCode::Escape)).unwrap();
    assert!(root.is_visible(tip));
}

#[test]
fn click_tooltips_coexist_by_default() {
    let mut root = TooltipRoot::default();
    let one = root.mount(TriggerConfig::click());
    let two = root.mount(TriggerConfig::click());
    root.dispatch(one, &Event::Press).unwrap();
    root.dispatch(two, &Event::Press).unwrap();
    assert_eq!(root.visible_sessions(), vec![one, two]);
    assert_eq!(root.active_hover(), None);
}

#[test]
fn exclusive_click_closes_previous() {
    let mut root = TooltipRoot::new(RootConfig::default().with_exclusive_click(true));
    let one = root.mount(TriggerConfig::click());
    let two = root.mount(TriggerConfig::click());
    root.dispatch(one, &Event::Press).unwrap();
    root.drain_changes();

    root.dispatch(two, &Event::Press).unwrap();
    assert!(!root.is_visible(one));
    assert!(root.is_visible(two));
    let flips: Vec<(SessionId, bool)> = root
        .drain_changes()
        .into_iter()
        .map(|c| (c.session, c.visible))
        .collect();
    assert_eq!(flips, vec![(one, false), (two, true)]);
}

#[test]
fn exclusive_click_leaves_hover_alone() {
    let mut root = TooltipRoot::new(RootConfig::default().with_exclusive_click(true));
    let hover = root.mount(TriggerConfig::hover());
    let click = root.mount(TriggerConfig::click());
    hover_open(&mut root, hover);
    root.dispatch(click, &Event::Press).unwrap();
    assert_eq!(root.visible_sessions(), vec![hover, click]);
}

// ===========================================================================
// Hover
// ===========================================================================

#[test]
fn hover_scenario_with_default_delays() {
    let mut root = TooltipRoot::default();
    let tip = root.mount(TriggerConfig::hover());
    assert!(root.visible_sessions().is_empty());

    root.dispatch(tip, &OVER).unwrap();
    root.advance(ms(400));
    assert!(root.is_visible(tip));

    root.dispatch(tip, &OUT).unwrap();
    root.advance(ms(400));
    assert!(!root.is_visible(tip));
}

#[test]
fn hover_quick_pass_never_shows() {
    let mut root = TooltipRoot::default();
    let tip = root.mount(TriggerConfig::hover());
    root.dispatch(tip, &OVER).unwrap();
    root.advance(ms(150));
    root.dispatch(tip, &OUT).unwrap();
    root.advance(ms(1000));
    assert!(!root.is_visible(tip));
    assert!(root.drain_changes().is_empty());
    assert_eq!(root.active_hover(), None);
}

#[test]
fn hover_reentry_during_close_delay_keeps_tooltip() {
    let mut root = TooltipRoot::default();
    let tip = root.mount(TriggerConfig::hover());
    hover_open(&mut root, tip);
    root.drain_changes();

    root.dispatch(tip, &OUT).unwrap();
    root.advance(ms(100));
    root.dispatch(tip, &OVER).unwrap();
    root.advance(ms(1000));
    assert!(root.is_visible(tip));
    assert_eq!(root.state(tip), Some(TipState::Open));
    assert!(root.drain_changes().is_empty(), "no flicker");
    assert_eq!(root.active_hover(), Some(tip));
}

#[test]
fn hover_mutual_exclusion() {
    let mut root = TooltipRoot::default();
    let one = root.mount(TriggerConfig::hover());
    let two = root.mount(TriggerConfig::hover());

    hover_open(&mut root, one);
    assert!(root.is_visible(one));

    root.dispatch(one, &OUT).unwrap();
    root.dispatch(two, &OVER).unwrap();
    root.advance(ms(400));

    assert!(!root.is_visible(one));
    assert!(root.is_visible(two));
    assert_eq!(root.active_hover(), Some(two));
}

#[test]
fn hover_exclusion_without_leaving_first() {
    // Pointer never leaves the first trigger (overlapping triggers).
    let mut root = TooltipRoot::default();
    let one = root.mount(TriggerConfig::hover());
    let two = root.mount(TriggerConfig::hover());
    hover_open(&mut root, one);

    root.dispatch(two, &OVER).unwrap();
    for _ in 0..40 {
        root.advance(ms(10));
        assert!(visible_hover_count(&root) <= 1);
    }
    assert!(root.is_visible(two));
    assert_eq!(root.state(one), Some(TipState::Closed));
}

#[test]
fn evicted_trigger_reopens_on_next_hover() {
    let mut root = TooltipRoot::default();
    let one = root.mount(TriggerConfig::hover());
    let two = root.mount(TriggerConfig::hover());
    hover_open(&mut root, one);
    hover_open(&mut root, two);
    assert_eq!(root.state(one), Some(TipState::Closed));

    // Pointer comes back over the first trigger without ever leaving it.
    root.dispatch(two, &OUT).unwrap();
    root.dispatch(one, &OVER).unwrap();
    assert_eq!(root.state(one), Some(TipState::OpenPending));
    root.advance(ms(400));

    assert_eq!(root.state(one), Some(TipState::Open));
    assert!(root.is_visible(one));
    assert!(!root.is_visible(two));
    assert_eq!(root.active_hover(), Some(one));
}

#[test]
fn per_trigger_delays_override_policy() {
    let policy = TooltipPolicy {
        open_delay_ms: 1000,
        close_delay_ms: 1000,
    };
    let mut root = TooltipRoot::new(RootConfig::default().with_policy(policy));
    let slow = root.mount(TriggerConfig::hover());
    let fast = root.mount(
        TriggerConfig::hover()
            .with_open_delay_ms(0)
            .with_close_delay_ms(0),
    );

    root.dispatch(fast, &OVER).unwrap();
    root.advance(Duration::ZERO);
    assert!(root.is_visible(fast));
    root.dispatch(fast, &OUT).unwrap();
    root.advance(Duration::ZERO);
    assert!(!root.is_visible(fast));

    root.dispatch(slow, &OVER).unwrap();
    root.advance(ms(999));
    assert!(!root.is_visible(slow));
    root.advance(ms(1));
    assert!(root.is_visible(slow));
}

#[test]
fn unmounting_active_hover_frees_the_slot() {
    let mut root = TooltipRoot::default();
    let one = root.mount(TriggerConfig::hover());
    let two = root.mount(TriggerConfig::hover());
    hover_open(&mut root, one);
    root.unmount(one);
    assert_eq!(root.active_hover(), None);

    hover_open(&mut root, two);
    assert_eq!(root.active_hover(), Some(two));
    assert_eq!(root.visible_sessions(), vec![two]);
}

#[test]
fn unmounting_non_active_hover_keeps_active() {
    let mut root = TooltipRoot::default();
    let one = root.mount(TriggerConfig::hover());
    let two = root.mount(TriggerConfig::hover());
    hover_open(&mut root, one);
    root.dispatch(two, &OVER).unwrap();
    root.unmount(two);
    root.advance(ms(1000));
    assert_eq!(root.active_hover(), Some(one));
    assert!(root.is_visible(one));
}

// ===========================================================================
// Focus
// ===========================================================================

#[test]
fn focus_shows_and_blur_hides_without_delay() {
    let mut root = TooltipRoot::default();
    let tip = root.mount(TriggerConfig::focus());
    root.dispatch(tip, &Event::Focus(true)).unwrap();
    assert!(root.is_visible(tip));
    root.dispatch(tip, &Event::Focus(false)).unwrap();
    assert!(!root.is_visible(tip));
    assert_eq!(root.pending_timers(), 0);
}

#[test]
fn focus_escape_dismisses_until_refocus() {
    let mut root = TooltipRoot::default();
    let tip = root.mount(TriggerConfig::focus());
    root.dispatch(tip, &Event::Focus(true)).unwrap();
    root.dispatch(tip, &Event::key(KeyCode::Escape)).unwrap();
    assert!(!root.is_visible(tip));

    root.dispatch(tip, &Event::Focus(false)).unwrap();
    root.dispatch(tip, &Event::Focus(true)).unwrap();
    assert!(root.is_visible(tip));
}

// ===========================================================================
// Mixed
// ===========================================================================

#[test]
fn hover_and_click_coexist() {
    let mut root = TooltipRoot::default();
    let hover = root.mount(TriggerConfig::hover());
    let click = root.mount(TriggerConfig::click());
    let focus = root.mount(TriggerConfig::focus());

    root.dispatch(click, &Event::Press).unwrap();
    root.dispatch(focus, &Event::Focus(true)).unwrap();
    hover_open(&mut root, hover);
    assert_eq!(root.visible_sessions(), vec![hover, click, focus]);
}

#[test]
fn roots_are_isolated() {
    let mut left = TooltipRoot::default();
    let mut right = TooltipRoot::default();
    let a = left.mount(TriggerConfig::hover());
    let b = right.mount(TriggerConfig::hover());
    hover_open(&mut left, a);
    hover_open(&mut right, b);
    assert!(left.is_visible(a));
    assert!(right.is_visible(b));
}

#[test]
fn listeners_receive_open_and_close() {
    let mut root = TooltipRoot::default();
    let tip = root.mount(TriggerConfig::hover());
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    root.on_open_change(tip, move |open| sink.borrow_mut().push(open))
        .unwrap();

    hover_open(&mut root, tip);
    root.dispatch(tip, &OUT).unwrap();
    root.advance(ms(400));
    assert_eq!(*log.borrow(), vec![true, false]);
}

#[test]
fn evicted_listener_fires_before_claimant_listener() {
    let mut root = TooltipRoot::default();
    let one = root.mount(TriggerConfig::hover());
    let two = root.mount(TriggerConfig::hover());
    let log = Rc::new(RefCell::new(Vec::new()));
    for (name, id) in [("one", one), ("two", two)] {
        let sink = Rc::clone(&log);
        root.on_open_change(id, move |open| sink.borrow_mut().push((name, open)))
            .unwrap();
    }

    hover_open(&mut root, one);
    hover_open(&mut root, two);
    assert_eq!(
        *log.borrow(),
        vec![("one", true), ("one", false), ("two", true)]
    );
}

#[test]
fn unmount_all_hides_everything() {
    let mut root = TooltipRoot::default();
    let hover = root.mount(TriggerConfig::hover());
    let click = root.mount(TriggerConfig::click());
    hover_open(&mut root, hover);
    root.dispatch(click, &Event::Press).unwrap();
    root.drain_changes();

    root.unmount_all();
    assert_eq!(root.session_count(), 0);
    assert_eq!(root.active_hover(), None);
    let hidden: Vec<SessionId> = root.drain_changes().into_iter().map(|c| c.session).collect();
    assert_eq!(hidden, vec![hover, click]);
}

#[test]
fn transitions_are_logged() {
    let subscriber = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .finish();
    tracing::subscriber::with_default(subscriber, || {
        let mut root = TooltipRoot::default();
        let one = root.mount(TriggerConfig::hover());
        let two = root.mount(TriggerConfig::hover());
        hover_open(&mut root, one);
        hover_open(&mut root, two);
        assert!(root.is_visible(two));
    });
}
