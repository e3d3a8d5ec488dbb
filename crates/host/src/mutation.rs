//! Record of host surface calls, in the order they were made.
//!
//! The memory surface appends one entry per successful operation. Tests read
//! the log to assert ordering (removals before insertions) and mutation counts
//! (idempotent re-renders produce no attribute or structural entries).

use core_types::HostKey;
use element::{Handler, PropValue};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
pub enum HostMutation {
    CreateElement {
        key: HostKey,
        name: Arc<str>,
    },
    CreateText {
        key: HostKey,
    },
    AppendChild {
        parent: HostKey,
        child: HostKey,
    },
    RemoveChild {
        parent: HostKey,
        child: HostKey,
    },
    InsertBefore {
        parent: HostKey,
        child: HostKey,
        before: HostKey,
    },
    SetAttribute {
        key: HostKey,
        name: Arc<str>,
        value: PropValue,
    },
    RemoveAttribute {
        key: HostKey,
        name: Arc<str>,
    },
    AddListener {
        key: HostKey,
        event: Arc<str>,
        handler: Handler,
    },
    RemoveListener {
        key: HostKey,
        event: Arc<str>,
        handler: Handler,
    },
}

impl HostMutation {
    pub fn is_create(&self) -> bool {
        matches!(
            self,
            HostMutation::CreateElement { .. } | HostMutation::CreateText { .. }
        )
    }

    /// Append/insert/remove: changes the shape of the attached tree.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            HostMutation::AppendChild { .. }
                | HostMutation::RemoveChild { .. }
                | HostMutation::InsertBefore { .. }
        )
    }

    /// Attribute and listener changes on an existing node.
    pub fn is_patch(&self) -> bool {
        matches!(
            self,
            HostMutation::SetAttribute { .. }
                | HostMutation::RemoveAttribute { .. }
                | HostMutation::AddListener { .. }
                | HostMutation::RemoveListener { .. }
        )
    }
}
