#![forbid(unsafe_code)]

//! Test harness: a simulated rendering layer for tiptrig.
//!
//! [`Screen`] renders a list of triggers into a flat node tree the way a
//! host toolkit would: every trigger is a `button` node, and its tooltip is a
//! `tooltip` node that exists only while the session is visible. Queries and
//! event helpers mirror DOM testing libraries so scenarios read the same as
//! their browser counterparts.
//!
//! ```
//! use tiptrig_harness::{Role, Screen, TriggerSpec};
//!
//! let mut screen = Screen::render([TriggerSpec::hover("Trigger", "content")]);
//! assert!(screen.query_by_role(Role::Tooltip).is_none());
//!
//! screen.mouse_over("Trigger").unwrap();
//! screen.wait(400);
//! assert!(screen.get_by_text("content").is_ok());
//!
//! screen.mouse_out("Trigger").unwrap();
//! screen.wait(400);
//! assert!(screen.query_by_text("content").is_none());
//! ```
//!
//! # Limitations
//!
//! Events fired at a tooltip node are accepted and dropped: the tooltip body
//! does not keep its tooltip open.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tiptrig::{
    Event, KeyEvent, PointerKind, RootConfig, SessionId, TooltipError, TooltipRoot,
    TriggerConfig,
};

// ============================================================================
// Nodes
// ============================================================================

/// Accessible role of a rendered node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Button,
    Tooltip,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Button => "button",
            Self::Tooltip => "tooltip",
        })
    }
}

/// A rendered node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub role: Role,
    pub text: String,
    #[serde(skip)]
    pub session: SessionId,
}

/// One trigger + tooltip pair to render.
#[derive(Debug, Clone)]
pub struct TriggerSpec {
    pub label: String,
    pub content: String,
    pub config: TriggerConfig,
}

impl TriggerSpec {
    /// Pair with an explicit trigger config.
    pub fn new(label: impl Into<String>, content: impl Into<String>, config: TriggerConfig) -> Self {
        Self {
            label: label.into(),
            content: content.into(),
            config,
        }
    }

    pub fn hover(label: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(label, content, TriggerConfig::hover())
    }

    pub fn click(label: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(label, content, TriggerConfig::click())
    }

    pub fn focus(label: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(label, content, TriggerConfig::focus())
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Query and event-routing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// No node matched.
    #[error("unable to find a node with {0}")]
    NotFound(String),
    /// More than one node matched a single-node query.
    #[error("found {count} nodes with {what}")]
    Multiple { what: String, count: usize },
    /// The root rejected the event.
    #[error(transparent)]
    Tooltip(#[from] TooltipError),
}

// ============================================================================
// Screen
// ============================================================================

#[derive(Debug)]
struct Mounted {
    session: SessionId,
    label: String,
    content: String,
}

/// A rendered set of triggers over one [`TooltipRoot`].
#[derive(Debug)]
pub struct Screen {
    root: TooltipRoot,
    mounted: Vec<Mounted>,
}

impl Screen {
    /// Render `specs` under a root with default configuration.
    pub fn render(specs: impl IntoIterator<Item = TriggerSpec>) -> Self {
        Self::render_with(RootConfig::default(), specs)
    }

    /// Render `specs` under a root with `config`.
    pub fn render_with(config: RootConfig, specs: impl IntoIterator<Item = TriggerSpec>) -> Self {
        let mut root = TooltipRoot::new(config);
        let mounted = specs
            .into_iter()
            .map(|spec| Mounted {
                session: root.mount(spec.config),
                label: spec.label,
                content: spec.content,
            })
            .collect();
        Self { root, mounted }
    }

    /// The underlying root.
    #[must_use]
    pub fn root(&self) -> &TooltipRoot {
        &self.root
    }

    /// Current node tree: every button, then every visible tooltip, in mount order.
    #[must_use]
    pub fn nodes(&self) -> Vec<Node> {
        let buttons = self.mounted.iter().map(|m| Node {
            role: Role::Button,
            text: m.label.clone(),
            session: m.session,
        });
        let tooltips = self
            .mounted
            .iter()
            .filter(|m| self.root.is_visible(m.session))
            .map(|m| Node {
                role: Role::Tooltip,
                text: m.content.clone(),
                session: m.session,
            });
        buttons.chain(tooltips).collect()
    }

    /// Whether `node` is still rendered.
    #[must_use]
    pub fn is_in_document(&self, node: &Node) -> bool {
        self.nodes().contains(node)
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// All nodes with `role`.
    #[must_use]
    pub fn get_all_by_role(&self, role: Role) -> Vec<Node> {
        self.nodes().into_iter().filter(|n| n.role == role).collect()
    }

    /// Exactly one node with `role`.
    pub fn get_by_role(&self, role: Role) -> Result<Node, QueryError> {
        single(self.get_all_by_role(role), || format!("role {role:?}"))
    }

    /// The node with `role`, if exactly one exists.
    #[must_use]
    pub fn query_by_role(&self, role: Role) -> Option<Node> {
        self.get_by_role(role).ok()
    }

    /// Exactly one node whose text is `text`.
    pub fn get_by_text(&self, text: &str) -> Result<Node, QueryError> {
        let matches = self.nodes().into_iter().filter(|n| n.text == text).collect();
        single(matches, || format!("text {text:?}"))
    }

    /// The node whose text is `text`, if exactly one exists.
    #[must_use]
    pub fn query_by_text(&self, text: &str) -> Option<Node> {
        self.get_by_text(text).ok()
    }

    // ------------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------------

    /// Fire `event` at the node whose text is `text`.
    pub fn fire(&mut self, text: &str, event: Event) -> Result<(), QueryError> {
        let node = self.get_by_text(text)?;
        tracing::debug!(
            target: "tiptrig.harness",
            node = %text,
            role = %node.role,
            event = event.name(),
            "fire"
        );
        match node.role {
            Role::Button => self.root.dispatch(node.session, &event)?,
            Role::Tooltip => {}
        }
        Ok(())
    }

    /// Press / click activation.
    pub fn press(&mut self, text: &str) -> Result<(), QueryError> {
        self.fire(text, Event::Press)
    }

    pub fn mouse_enter(&mut self, text: &str) -> Result<(), QueryError> {
        self.fire(text, Event::Pointer(PointerKind::Enter))
    }

    pub fn mouse_over(&mut self, text: &str) -> Result<(), QueryError> {
        self.fire(text, Event::Pointer(PointerKind::Over))
    }

    pub fn mouse_leave(&mut self, text: &str) -> Result<(), QueryError> {
        self.fire(text, Event::Pointer(PointerKind::Leave))
    }

    pub fn mouse_out(&mut self, text: &str) -> Result<(), QueryError> {
        self.fire(text, Event::Pointer(PointerKind::Out))
    }

    pub fn focus(&mut self, text: &str) -> Result<(), QueryError> {
        self.fire(text, Event::Focus(true))
    }

    pub fn blur(&mut self, text: &str) -> Result<(), QueryError> {
        self.fire(text, Event::Focus(false))
    }

    pub fn key_down(&mut self, text: &str, key: KeyEvent) -> Result<(), QueryError> {
        self.fire(text, Event::Key(key))
    }

    /// Let `ms` milliseconds of virtual time pass.
    pub fn wait(&mut self, ms: u64) {
        tracing::debug!(target: "tiptrig.harness", ms, "wait");
        self.root.advance(Duration::from_millis(ms));
    }

    /// Unmount every trigger.
    pub fn cleanup(&mut self) {
        self.root.unmount_all();
        self.mounted.clear();
    }

    /// Serialize the node tree as JSON, for snapshot-style assertions.
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.nodes())
    }
}

fn single(mut nodes: Vec<Node>, what: impl FnOnce() -> String) -> Result<Node, QueryError> {
    match nodes.len() {
        0 => Err(QueryError::NotFound(what())),
        1 => Ok(nodes.remove(0)),
        count => Err(QueryError::Multiple {
            what: what(),
            count,
        }),
    }
}
