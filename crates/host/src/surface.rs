//! Host surface contract.
//!
//! The reconciler never inspects host objects; it only holds their
//! [`HostKey`]s and drives them through this fixed operation set. Any retained
//! surface (a display tree, a terminal buffer, a scene graph) can sit behind
//! it.
//!
//! Contract:
//! - `create_*` returns a fresh, detached key; keys are never reused.
//! - `append_child` requires a detached child; a node has at most one parent.
//! - `remove_child` detaches the child and its subtree; the subtree stays
//!   allocated and is only reattached when a failed commit is rolled back.
//! - `insert_before` with `before: None` is `append_child`.
//! - Text nodes expose their content as the `nodeValue` attribute.
//! - Listener identity is handler identity (`Handler::same`). Every
//!   `add_listener` is a registration of its own; `remove_listener` drops one.

use core_types::HostKey;
use element::{Handler, PropValue};
use std::fmt;

pub trait HostSurface {
    fn create_element(&mut self, name: &str) -> Result<HostKey, HostError>;

    fn create_text(&mut self) -> Result<HostKey, HostError>;

    fn append_child(&mut self, parent: HostKey, child: HostKey) -> Result<(), HostError>;

    fn remove_child(&mut self, parent: HostKey, child: HostKey) -> Result<(), HostError>;

    /// Attach a detached `child` under `parent` ahead of `before`, which must
    /// already be a child of `parent`.
    fn insert_before(
        &mut self,
        parent: HostKey,
        child: HostKey,
        before: Option<HostKey>,
    ) -> Result<(), HostError>;

    /// The node after `node` in its parent's child list; `None` for the last
    /// child and for detached nodes.
    fn next_sibling(&self, node: HostKey) -> Result<Option<HostKey>, HostError>;

    fn set_attribute(
        &mut self,
        node: HostKey,
        name: &str,
        value: &PropValue,
    ) -> Result<(), HostError>;

    /// Reset an attribute to its empty/default state.
    fn remove_attribute(&mut self, node: HostKey, name: &str) -> Result<(), HostError>;

    fn add_listener(
        &mut self,
        node: HostKey,
        event: &str,
        handler: &Handler,
    ) -> Result<(), HostError>;

    fn remove_listener(
        &mut self,
        node: HostKey,
        event: &str,
        handler: &Handler,
    ) -> Result<(), HostError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostError {
    InvalidKey(HostKey),
    MissingKey(HostKey),
    WrongNodeKind(HostKey),
    InvalidParent(HostKey),
    AlreadyAttached { child: HostKey },
    NotAChild { parent: HostKey, child: HostKey },
    InvalidSibling { parent: HostKey, before: HostKey },
    CycleDetected { parent: HostKey, child: HostKey },
    UnknownListener { node: HostKey, event: String },
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::InvalidKey(key) => write!(f, "invalid host key {}", key.0),
            HostError::MissingKey(key) => write!(f, "unknown host key {}", key.0),
            HostError::WrongNodeKind(key) => {
                write!(f, "operation not supported by host node {}", key.0)
            }
            HostError::InvalidParent(key) => write!(f, "host node {} cannot have children", key.0),
            HostError::AlreadyAttached { child } => {
                write!(f, "host node {} already has a parent", child.0)
            }
            HostError::NotAChild { parent, child } => {
                write!(f, "host node {} is not a child of {}", child.0, parent.0)
            }
            HostError::InvalidSibling { parent, before } => {
                write!(f, "host node {} is not a child of {}", before.0, parent.0)
            }
            HostError::CycleDetected { parent, child } => write!(
                f,
                "appending {} under {} would create a cycle",
                child.0, parent.0
            ),
            HostError::UnknownListener { node, event } => {
                write!(f, "no matching {event:?} listener on host node {}", node.0)
            }
        }
    }
}

impl std::error::Error for HostError {}
