//! Arena-backed in-memory host surface.
//!
//! Nodes are stored in a flat `Vec`; `HostKey(n)` addresses slot `n - 1`.
//! Detached nodes stay in the arena, so a key is valid for the lifetime of the
//! surface. Slot 1 is the container created by [`MemorySurface::new`].
//!
//! Invariants:
//! - A node has at most one parent and appears once in that parent's child list.
//! - Only element nodes have children or listeners.
//! - The mutation log only records operations that succeeded.

use crate::mutation::HostMutation;
use crate::node::HostNode;
use crate::surface::{HostError, HostSurface};
use core_types::HostKey;
use element::{Event, Handler, NODE_VALUE, PropValue};
use std::sync::Arc;

const LOG_TARGET: &str = "host.memory";

/// Default name of the container element.
pub const CONTAINER_NAME: &str = "root";

pub struct MemorySurface {
    nodes: Vec<NodeRecord>,
    container: HostKey,
    log: Vec<HostMutation>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::with_container(CONTAINER_NAME)
    }

    /// Creates a surface whose container element is named `name`. The container
    /// is not recorded in the mutation log.
    pub fn with_container(name: &str) -> Self {
        let mut surface = Self {
            nodes: Vec::new(),
            container: HostKey::INVALID,
            log: Vec::new(),
        };
        surface.container = surface.push(NodeKind::Element {
            name: Arc::from(name),
            attributes: Vec::new(),
        });
        surface
    }

    pub fn container(&self) -> HostKey {
        self.container
    }

    /// Total allocated nodes, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn mutations(&self) -> &[HostMutation] {
        &self.log
    }

    pub fn take_mutations(&mut self) -> Vec<HostMutation> {
        std::mem::take(&mut self.log)
    }

    pub fn clear_mutations(&mut self) {
        self.log.clear();
    }

    pub fn parent_of(&self, key: HostKey) -> Option<HostKey> {
        self.record(key).ok().and_then(|r| r.parent)
    }

    pub fn children_of(&self, key: HostKey) -> &[HostKey] {
        self.record(key).map(|r| r.children.as_slice()).unwrap_or(&[])
    }

    pub fn text(&self, key: HostKey) -> Option<&str> {
        match &self.record(key).ok()?.kind {
            NodeKind::Text { text } => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    pub fn name(&self, key: HostKey) -> Option<&str> {
        match &self.record(key).ok()?.kind {
            NodeKind::Element { name, .. } => Some(name),
            NodeKind::Text { .. } => None,
        }
    }

    pub fn attribute(&self, key: HostKey, name: &str) -> Option<&PropValue> {
        match &self.record(key).ok()?.kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| &**k == name)
                .map(|(_, v)| v),
            NodeKind::Text { .. } => None,
        }
    }

    pub fn listener_count(&self, key: HostKey, event: &str) -> usize {
        self.record(key)
            .map(|r| {
                r.listeners
                    .iter()
                    .filter(|(name, _)| &**name == event)
                    .count()
            })
            .unwrap_or(0)
    }

    /// True if `key` is the container or reachable from it through parent links.
    pub fn is_attached(&self, key: HostKey) -> bool {
        let mut current = Some(key);
        while let Some(k) = current {
            if k == self.container {
                return true;
            }
            current = self.parent_of(k);
        }
        false
    }

    /// Invokes every listener registered on `key` for `event.name`, in
    /// registration order. No bubbling. Returns the number of handlers called.
    pub fn dispatch(&self, key: HostKey, event: &Event) -> Result<usize, HostError> {
        let record = self.record(key)?;
        let handlers: Vec<Handler> = record
            .listeners
            .iter()
            .filter(|(name, _)| *name == event.name)
            .map(|(_, handler)| handler.clone())
            .collect();
        log::trace!(
            target: LOG_TARGET,
            "dispatch {} on {} to {} listener(s)",
            event.name,
            key.0,
            handlers.len()
        );
        for handler in &handlers {
            handler.call(event);
        }
        Ok(handlers.len())
    }

    /// Copies the subtree rooted at `key` into a plain [`HostNode`] tree.
    pub fn materialize(&self, key: HostKey) -> Result<HostNode, HostError> {
        let record = self.record(key)?;
        let node = match &record.kind {
            NodeKind::Element { name, attributes } => HostNode::Element {
                key,
                name: name.to_string(),
                attributes: attributes
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                listeners: record
                    .listeners
                    .iter()
                    .map(|(event, _)| event.to_string())
                    .collect(),
                children: record
                    .children
                    .iter()
                    .map(|child| self.materialize(*child))
                    .collect::<Result<Vec<_>, _>>()?,
            },
            NodeKind::Text { text } => HostNode::Text {
                key,
                text: text.clone(),
            },
        };
        Ok(node)
    }

    pub fn materialize_container(&self) -> Result<HostNode, HostError> {
        self.materialize(self.container)
    }

    fn push(&mut self, kind: NodeKind) -> HostKey {
        self.nodes.push(NodeRecord {
            kind,
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
        });
        HostKey(self.nodes.len() as u32)
    }

    fn index(&self, key: HostKey) -> Result<usize, HostError> {
        if !key.is_valid() {
            return Err(HostError::InvalidKey(key));
        }
        let index = (key.0 - 1) as usize;
        if index >= self.nodes.len() {
            return Err(HostError::MissingKey(key));
        }
        Ok(index)
    }

    fn record(&self, key: HostKey) -> Result<&NodeRecord, HostError> {
        let index = self.index(key)?;
        Ok(&self.nodes[index])
    }

    fn record_mut(&mut self, key: HostKey) -> Result<&mut NodeRecord, HostError> {
        let index = self.index(key)?;
        Ok(&mut self.nodes[index])
    }

    /// Shared checks of `append_child` and `insert_before`; `before: None`
    /// appends.
    fn attach(
        &mut self,
        parent: HostKey,
        child: HostKey,
        before: Option<HostKey>,
    ) -> Result<(), HostError> {
        if !self.record(parent)?.allows_children() {
            return Err(HostError::InvalidParent(parent));
        }
        if self.record(child)?.parent.is_some() {
            log::warn!(target: LOG_TARGET, "attach of attached node {}", child.0);
            return Err(HostError::AlreadyAttached { child });
        }
        if self.is_descendant(child, parent) {
            return Err(HostError::CycleDetected { parent, child });
        }
        let siblings = &mut self.record_mut(parent)?.children;
        match before {
            None => siblings.push(child),
            Some(before) => {
                let pos = siblings
                    .iter()
                    .position(|k| *k == before)
                    .ok_or(HostError::InvalidSibling { parent, before })?;
                siblings.insert(pos, child);
            }
        }
        self.record_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn is_descendant(&self, ancestor: HostKey, maybe_descendant: HostKey) -> bool {
        let mut current = Some(maybe_descendant);
        while let Some(k) = current {
            if k == ancestor {
                return true;
            }
            current = self.parent_of(k);
        }
        false
    }
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl HostSurface for MemorySurface {
    fn create_element(&mut self, name: &str) -> Result<HostKey, HostError> {
        let name: Arc<str> = Arc::from(name);
        let key = self.push(NodeKind::Element {
            name: Arc::clone(&name),
            attributes: Vec::new(),
        });
        self.log.push(HostMutation::CreateElement { key, name });
        Ok(key)
    }

    fn create_text(&mut self) -> Result<HostKey, HostError> {
        let key = self.push(NodeKind::Text {
            text: String::new(),
        });
        self.log.push(HostMutation::CreateText { key });
        Ok(key)
    }

    fn append_child(&mut self, parent: HostKey, child: HostKey) -> Result<(), HostError> {
        self.attach(parent, child, None)?;
        self.log.push(HostMutation::AppendChild { parent, child });
        Ok(())
    }

    fn insert_before(
        &mut self,
        parent: HostKey,
        child: HostKey,
        before: Option<HostKey>,
    ) -> Result<(), HostError> {
        let Some(before) = before else {
            return self.append_child(parent, child);
        };
        self.attach(parent, child, Some(before))?;
        self.log.push(HostMutation::InsertBefore {
            parent,
            child,
            before,
        });
        Ok(())
    }

    fn next_sibling(&self, node: HostKey) -> Result<Option<HostKey>, HostError> {
        let Some(parent) = self.record(node)?.parent else {
            return Ok(None);
        };
        let siblings = &self.record(parent)?.children;
        Ok(siblings
            .iter()
            .position(|k| *k == node)
            .and_then(|pos| siblings.get(pos + 1))
            .copied())
    }

    fn remove_child(&mut self, parent: HostKey, child: HostKey) -> Result<(), HostError> {
        if self.record(child)?.parent != Some(parent) {
            log::warn!(
                target: LOG_TARGET,
                "remove of {} which is not a child of {}",
                child.0,
                parent.0
            );
            return Err(HostError::NotAChild { parent, child });
        }
        self.record_mut(parent)?.children.retain(|k| *k != child);
        self.record_mut(child)?.parent = None;
        self.log.push(HostMutation::RemoveChild { parent, child });
        Ok(())
    }

    fn set_attribute(
        &mut self,
        node: HostKey,
        name: &str,
        value: &PropValue,
    ) -> Result<(), HostError> {
        if value.is_handler() {
            return Err(HostError::WrongNodeKind(node));
        }
        match &mut self.record_mut(node)?.kind {
            NodeKind::Element { attributes, .. } => {
                match attributes.iter_mut().find(|(k, _)| &**k == name) {
                    Some(slot) => slot.1 = value.clone(),
                    None => attributes.push((Arc::from(name), value.clone())),
                }
            }
            NodeKind::Text { text } if name == NODE_VALUE => {
                *text = value.to_string();
            }
            NodeKind::Text { .. } => return Err(HostError::WrongNodeKind(node)),
        }
        self.log.push(HostMutation::SetAttribute {
            key: node,
            name: Arc::from(name),
            value: value.clone(),
        });
        Ok(())
    }

    fn remove_attribute(&mut self, node: HostKey, name: &str) -> Result<(), HostError> {
        match &mut self.record_mut(node)?.kind {
            NodeKind::Element { attributes, .. } => {
                attributes.retain(|(k, _)| &**k != name);
            }
            NodeKind::Text { text } if name == NODE_VALUE => text.clear(),
            NodeKind::Text { .. } => return Err(HostError::WrongNodeKind(node)),
        }
        self.log.push(HostMutation::RemoveAttribute {
            key: node,
            name: Arc::from(name),
        });
        Ok(())
    }

    fn add_listener(
        &mut self,
        node: HostKey,
        event: &str,
        handler: &Handler,
    ) -> Result<(), HostError> {
        let record = self.record_mut(node)?;
        if !record.allows_children() {
            return Err(HostError::WrongNodeKind(node));
        }
        let event: Arc<str> = Arc::from(event);
        record.listeners.push((Arc::clone(&event), handler.clone()));
        self.log.push(HostMutation::AddListener {
            key: node,
            event,
            handler: handler.clone(),
        });
        Ok(())
    }

    fn remove_listener(
        &mut self,
        node: HostKey,
        event: &str,
        handler: &Handler,
    ) -> Result<(), HostError> {
        let record = self.record_mut(node)?;
        let Some(pos) = record
            .listeners
            .iter()
            .position(|(name, h)| &**name == event && h.same(handler))
        else {
            return Err(HostError::UnknownListener {
                node,
                event: event.to_string(),
            });
        };
        let (event, _) = record.listeners.remove(pos);
        self.log.push(HostMutation::RemoveListener {
            key: node,
            event,
            handler: handler.clone(),
        });
        Ok(())
    }
}

struct NodeRecord {
    kind: NodeKind,
    parent: Option<HostKey>,
    children: Vec<HostKey>,
    listeners: Vec<(Arc<str>, Handler)>,
}

impl NodeRecord {
    fn allows_children(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. })
    }
}

enum NodeKind {
    Element {
        name: Arc<str>,
        attributes: Vec<(Arc<str>, PropValue)>,
    },
    Text {
        text: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn container_is_first_slot_and_unlogged() {
        let surface = MemorySurface::new();
        assert_eq!(surface.container(), HostKey(1));
        assert_eq!(surface.name(surface.container()), Some(CONTAINER_NAME));
        assert!(surface.mutations().is_empty());
    }

    #[test]
    fn append_and_remove_maintain_parent_links() {
        let mut surface = MemorySurface::new();
        let root = surface.container();
        let div = surface.create_element("div").unwrap();
        let text = surface.create_text().unwrap();
        surface.append_child(root, div).unwrap();
        surface.append_child(div, text).unwrap();
        assert_eq!(surface.children_of(root), &[div]);
        assert_eq!(surface.parent_of(text), Some(div));
        assert!(surface.is_attached(text));

        surface.remove_child(root, div).unwrap();
        assert!(surface.children_of(root).is_empty());
        assert!(!surface.is_attached(text));
        // The detached subtree is kept intact.
        assert_eq!(surface.parent_of(text), Some(div));
    }

    #[test]
    fn structural_errors() {
        let mut surface = MemorySurface::new();
        let root = surface.container();
        let a = surface.create_element("a").unwrap();
        let b = surface.create_element("b").unwrap();
        let t = surface.create_text().unwrap();
        surface.append_child(root, a).unwrap();
        surface.append_child(a, b).unwrap();

        assert_eq!(
            surface.append_child(root, b),
            Err(HostError::AlreadyAttached { child: b })
        );
        assert_eq!(surface.append_child(t, b), Err(HostError::InvalidParent(t)));
        surface.remove_child(a, b).unwrap();
        assert_eq!(
            surface.append_child(a, root),
            Err(HostError::CycleDetected {
                parent: a,
                child: root
            })
        );
        assert_eq!(
            surface.remove_child(root, b),
            Err(HostError::NotAChild {
                parent: root,
                child: b
            })
        );
        assert_eq!(
            surface.append_child(HostKey::INVALID, b),
            Err(HostError::InvalidKey(HostKey::INVALID))
        );
        assert_eq!(
            surface.append_child(HostKey(99), b),
            Err(HostError::MissingKey(HostKey(99)))
        );
    }

    #[test]
    fn cycle_is_rejected() {
        let mut surface = MemorySurface::new();
        let a = surface.create_element("a").unwrap();
        let b = surface.create_element("b").unwrap();
        surface.append_child(a, b).unwrap();
        assert_eq!(
            surface.append_child(b, a),
            Err(HostError::CycleDetected { parent: b, child: a })
        );
        assert_eq!(
            surface.append_child(a, a),
            Err(HostError::CycleDetected { parent: a, child: a })
        );
    }

    #[test]
    fn text_nodes_use_node_value() {
        let mut surface = MemorySurface::new();
        let t = surface.create_text().unwrap();
        surface
            .set_attribute(t, NODE_VALUE, &PropValue::from("Hi"))
            .unwrap();
        assert_eq!(surface.text(t), Some("Hi"));
        assert_eq!(
            surface.set_attribute(t, "id", &PropValue::from("x")),
            Err(HostError::WrongNodeKind(t))
        );
        surface.remove_attribute(t, NODE_VALUE).unwrap();
        assert_eq!(surface.text(t), Some(""));
    }

    #[test]
    fn attributes_replace_in_place() {
        let mut surface = MemorySurface::new();
        let div = surface.create_element("div").unwrap();
        surface
            .set_attribute(div, "id", &PropValue::from("a"))
            .unwrap();
        surface
            .set_attribute(div, "title", &PropValue::from("t"))
            .unwrap();
        surface
            .set_attribute(div, "id", &PropValue::from("b"))
            .unwrap();
        let node = surface.materialize(div).unwrap();
        match node {
            HostNode::Element { attributes, .. } => assert_eq!(
                attributes,
                vec![
                    ("id".to_string(), "b".to_string()),
                    ("title".to_string(), "t".to_string())
                ]
            ),
            HostNode::Text { .. } => panic!("expected element"),
        }
        surface.remove_attribute(div, "id").unwrap();
        assert_eq!(surface.attribute(div, "id"), None);
        assert_eq!(surface.attribute(div, "title"), Some(&PropValue::from("t")));
    }

    #[test]
    fn listeners_dispatch_and_remove_by_identity() {
        let mut surface = MemorySurface::new();
        let button = surface.create_element("button").unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let h1 = Handler::new(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        });
        let h2 = Handler::new(|_| {});

        surface.add_listener(button, "click", &h1).unwrap();
        assert_eq!(surface.listener_count(button, "click"), 1);

        assert_eq!(surface.dispatch(button, &Event::new("click")).unwrap(), 1);
        assert_eq!(surface.dispatch(button, &Event::new("input")).unwrap(), 0);
        assert_eq!(hits.load(Ordering::Relaxed), 1);

        assert_eq!(
            surface.remove_listener(button, "click", &h2),
            Err(HostError::UnknownListener {
                node: button,
                event: "click".to_string()
            })
        );
        surface.remove_listener(button, "click", &h1).unwrap();
        assert_eq!(surface.listener_count(button, "click"), 0);

        let text = surface.create_text().unwrap();
        assert_eq!(
            surface.add_listener(text, "click", &h1),
            Err(HostError::WrongNodeKind(text))
        );
    }

    #[test]
    fn repeated_registrations_are_counted() {
        let mut surface = MemorySurface::new();
        let button = surface.create_element("button").unwrap();
        let shared = Handler::new(|_| {});

        surface.add_listener(button, "click", &shared).unwrap();
        surface.add_listener(button, "click", &shared).unwrap();
        assert_eq!(surface.listener_count(button, "click"), 2);
        assert_eq!(surface.dispatch(button, &Event::new("click")).unwrap(), 2);

        surface.remove_listener(button, "click", &shared).unwrap();
        assert_eq!(surface.listener_count(button, "click"), 1);
        surface.remove_listener(button, "click", &shared).unwrap();
        assert_eq!(surface.listener_count(button, "click"), 0);
        assert!(surface.remove_listener(button, "click", &shared).is_err());
    }

    #[test]
    fn insert_before_and_next_sibling() {
        let mut surface = MemorySurface::new();
        let root = surface.container();
        let a = surface.create_element("a").unwrap();
        let b = surface.create_element("b").unwrap();
        let c = surface.create_element("c").unwrap();
        surface.append_child(root, a).unwrap();
        surface.append_child(root, c).unwrap();

        assert_eq!(surface.next_sibling(a), Ok(Some(c)));
        assert_eq!(surface.next_sibling(c), Ok(None));
        assert_eq!(surface.next_sibling(b), Ok(None));

        surface.insert_before(root, b, Some(c)).unwrap();
        assert_eq!(surface.children_of(root), &[a, b, c]);
        assert_eq!(surface.next_sibling(a), Ok(Some(b)));

        let d = surface.create_element("d").unwrap();
        assert_eq!(
            surface.insert_before(a, d, Some(c)),
            Err(HostError::InvalidSibling {
                parent: a,
                before: c
            })
        );
        assert_eq!(surface.parent_of(d), None);
        surface.insert_before(root, d, None).unwrap();
        assert_eq!(surface.children_of(root), &[a, b, c, d]);

        let log = surface.take_mutations();
        let inserts: Vec<_> = log
            .iter()
            .filter(|m| matches!(m, HostMutation::InsertBefore { .. }))
            .collect();
        assert_eq!(
            inserts,
            vec![&HostMutation::InsertBefore {
                parent: root,
                child: b,
                before: c
            }]
        );
        assert!(matches!(log.last(), Some(HostMutation::AppendChild { child, .. }) if *child == d));
    }

    #[test]
    fn log_records_successful_calls_only() {
        let mut surface = MemorySurface::new();
        let root = surface.container();
        let div = surface.create_element("div").unwrap();
        surface.append_child(root, div).unwrap();
        let _ = surface.append_child(root, div);
        let log = surface.take_mutations();
        assert_eq!(log.len(), 2);
        assert!(log[0].is_create());
        assert!(log[1].is_structural());
        assert!(surface.mutations().is_empty());
    }
}
