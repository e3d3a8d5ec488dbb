//! Host surface adapter: the only code that turns props into host calls.
//!
//! Prop classification:
//! - `children` never reaches the host (it is not part of `Props::iter`).
//! - Event keys (`onClick`, ...) become listeners under the lower-cased event
//!   name.
//! - Everything else is an attribute; `nodeValue` on a text node is its text.
//!
//! Patch order is fixed: stale listeners out, new listeners in, stale
//! attributes out, new attributes in.

use core_types::HostKey;
use element::{Handler, PropValue, Props, Tag, event_name, is_event_key};
use host::{HostError, HostSurface};
use std::ops::AddAssign;

/// Host calls issued by one `patch_props`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PatchCounts {
    pub listeners_removed: usize,
    pub listeners_added: usize,
    pub attributes_removed: usize,
    pub attributes_set: usize,
}

impl PatchCounts {
    pub fn total(&self) -> usize {
        self.listeners_removed + self.listeners_added + self.attributes_removed + self.attributes_set
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl AddAssign for PatchCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.listeners_removed += rhs.listeners_removed;
        self.listeners_added += rhs.listeners_added;
        self.attributes_removed += rhs.attributes_removed;
        self.attributes_set += rhs.attributes_set;
    }
}

/// Create a detached host object for `tag` and apply `props` to it as a patch
/// from empty props, so listeners present on first render are registered.
pub fn materialize<S: HostSurface + ?Sized>(
    surface: &mut S,
    tag: &Tag,
    props: &Props,
) -> Result<HostKey, HostError> {
    let key = match tag {
        Tag::Text => surface.create_text()?,
        Tag::Host(name) => surface.create_element(name)?,
    };
    patch_props(surface, key, &Props::empty(), props)?;
    Ok(key)
}

pub fn patch_props<S: HostSurface + ?Sized>(
    surface: &mut S,
    node: HostKey,
    prev: &Props,
    next: &Props,
) -> Result<PatchCounts, HostError> {
    patch_props_recorded(surface, node, prev, next, &mut |_| {})
}

/// [`patch_props`] that reports the inverse of every host call that succeeded.
pub(crate) fn patch_props_recorded<S, F>(
    surface: &mut S,
    node: HostKey,
    prev: &Props,
    next: &Props,
    record: &mut F,
) -> Result<PatchCounts, HostError>
where
    S: HostSurface + ?Sized,
    F: FnMut(Revert),
{
    let mut counts = PatchCounts::default();

    for (key, value) in prev.iter().filter(|(key, _)| is_event_key(key)) {
        if !changed(next.get(key), value) {
            continue;
        }
        if let (Some(event), Some(handler)) = (event_name(key), value.as_handler()) {
            surface.remove_listener(node, &event, handler)?;
            record(Revert::AddListener {
                node,
                event,
                handler: handler.clone(),
            });
            counts.listeners_removed += 1;
        }
    }

    for (key, value) in next.iter().filter(|(key, _)| is_event_key(key)) {
        if !changed(prev.get(key), value) {
            continue;
        }
        if let (Some(event), Some(handler)) = (event_name(key), value.as_handler()) {
            surface.add_listener(node, &event, handler)?;
            record(Revert::RemoveListener {
                node,
                event,
                handler: handler.clone(),
            });
            counts.listeners_added += 1;
        }
    }

    for (key, value) in prev.iter().filter(|(key, _)| !is_event_key(key)) {
        if !next.contains_key(key) {
            surface.remove_attribute(node, key)?;
            record(Revert::SetAttribute {
                node,
                name: key.to_string(),
                value: value.clone(),
            });
            counts.attributes_removed += 1;
        }
    }

    for (key, value) in next.iter().filter(|(key, _)| !is_event_key(key)) {
        let old = prev.get(key);
        if changed(old, value) {
            surface.set_attribute(node, key, value)?;
            record(match old {
                Some(old) => Revert::SetAttribute {
                    node,
                    name: key.to_string(),
                    value: old.clone(),
                },
                None => Revert::RemoveAttribute {
                    node,
                    name: key.to_string(),
                },
            });
            counts.attributes_set += 1;
        }
    }

    Ok(counts)
}

/// Inverse of one host call made during a commit. Replaying a commit's
/// reverts newest first puts the surface back where the commit found it.
#[derive(Clone, Debug)]
pub(crate) enum Revert {
    Detach {
        parent: HostKey,
        child: HostKey,
    },
    Reattach {
        parent: HostKey,
        child: HostKey,
        before: Option<HostKey>,
    },
    AddListener {
        node: HostKey,
        event: String,
        handler: Handler,
    },
    RemoveListener {
        node: HostKey,
        event: String,
        handler: Handler,
    },
    SetAttribute {
        node: HostKey,
        name: String,
        value: PropValue,
    },
    RemoveAttribute {
        node: HostKey,
        name: String,
    },
}

impl Revert {
    pub(crate) fn apply<S: HostSurface + ?Sized>(&self, surface: &mut S) -> Result<(), HostError> {
        match self {
            Revert::Detach { parent, child } => surface.remove_child(*parent, *child),
            Revert::Reattach {
                parent,
                child,
                before,
            } => surface.insert_before(*parent, *child, *before),
            Revert::AddListener {
                node,
                event,
                handler,
            } => surface.add_listener(*node, event, handler),
            Revert::RemoveListener {
                node,
                event,
                handler,
            } => surface.remove_listener(*node, event, handler),
            Revert::SetAttribute { node, name, value } => {
                surface.set_attribute(*node, name, value)
            }
            Revert::RemoveAttribute { node, name } => surface.remove_attribute(*node, name),
        }
    }
}

fn changed(other: Option<&PropValue>, value: &PropValue) -> bool {
    other.is_none_or(|other| !other.same(value))
}
