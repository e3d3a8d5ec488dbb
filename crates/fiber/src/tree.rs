//! Fiber arenas.
//!
//! One [`FiberTree`] per render pass. Structural links (`parent`, `child`,
//! `sibling`) are indices into the same arena; `alternate` is an index into
//! the arena of the previously committed pass, recorded in
//! `alternate_generation`. Fibers never reference another tree through
//! structural links, so there are no ownership cycles.
//!
//! Invariants:
//! - `FiberId::ROOT` is the synthetic container fiber; every other fiber has
//!   exactly one parent.
//! - `child` is the first child only; the remaining children hang off the
//!   `sibling` chain.
//! - `dom`, once set, is never replaced.

use core_types::HostKey;
use element::{Props, Tag};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FiberId(pub(crate) u32);

impl FiberId {
    pub const ROOT: FiberId = FiberId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectTag {
    Placement,
    Update,
    Deletion,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FiberKind {
    /// Synthetic fiber holding the container host object.
    Root,
    Host(Tag),
}

#[derive(Clone, Debug)]
pub struct Fiber {
    pub(crate) kind: FiberKind,
    pub(crate) props: Arc<Props>,
    pub(crate) dom: Option<HostKey>,
    pub(crate) parent: Option<FiberId>,
    pub(crate) child: Option<FiberId>,
    pub(crate) sibling: Option<FiberId>,
    pub(crate) alternate: Option<FiberId>,
    pub(crate) effect: Option<EffectTag>,
}

impl Fiber {
    pub(crate) fn placement(tag: Tag, props: Arc<Props>, parent: FiberId) -> Self {
        Self {
            kind: FiberKind::Host(tag),
            props,
            dom: None,
            parent: Some(parent),
            child: None,
            sibling: None,
            alternate: None,
            effect: Some(EffectTag::Placement),
        }
    }

    pub(crate) fn update(
        tag: Tag,
        props: Arc<Props>,
        parent: FiberId,
        dom: Option<HostKey>,
        alternate: FiberId,
    ) -> Self {
        Self {
            kind: FiberKind::Host(tag),
            props,
            dom,
            parent: Some(parent),
            child: None,
            sibling: None,
            alternate: Some(alternate),
            effect: Some(EffectTag::Update),
        }
    }

    pub fn kind(&self) -> &FiberKind {
        &self.kind
    }

    /// Element tag; `None` for the root fiber.
    pub fn tag(&self) -> Option<&Tag> {
        match &self.kind {
            FiberKind::Root => None,
            FiberKind::Host(tag) => Some(tag),
        }
    }

    pub fn props(&self) -> &Arc<Props> {
        &self.props
    }

    pub fn dom(&self) -> Option<HostKey> {
        self.dom
    }

    pub fn parent(&self) -> Option<FiberId> {
        self.parent
    }

    pub fn child(&self) -> Option<FiberId> {
        self.child
    }

    pub fn sibling(&self) -> Option<FiberId> {
        self.sibling
    }

    pub fn alternate(&self) -> Option<FiberId> {
        self.alternate
    }

    pub fn effect(&self) -> Option<EffectTag> {
        self.effect
    }

    pub(crate) fn describe(&self) -> String {
        match &self.kind {
            FiberKind::Root => "#root".to_string(),
            FiberKind::Host(tag) => tag.name().to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FiberTree {
    generation: u64,
    alternate_generation: Option<u64>,
    fibers: Vec<Fiber>,
}

impl FiberTree {
    /// `{dom: container, props: {children: [element]}, alternate: previous root}`
    pub(crate) fn with_root(
        generation: u64,
        container: HostKey,
        props: Props,
        previous: Option<&FiberTree>,
    ) -> Self {
        let root = Fiber {
            kind: FiberKind::Root,
            props: Arc::new(props),
            dom: container.is_valid().then_some(container),
            parent: None,
            child: None,
            sibling: None,
            alternate: previous.map(|_| FiberId::ROOT),
            effect: None,
        };
        Self {
            generation,
            alternate_generation: previous.map(FiberTree::generation),
            fibers: vec![root],
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Generation of the tree this tree's `alternate` links point into.
    pub fn alternate_generation(&self) -> Option<u64> {
        self.alternate_generation
    }

    pub fn root(&self) -> &Fiber {
        &self.fibers[FiberId::ROOT.index()]
    }

    pub fn get(&self, id: FiberId) -> Option<&Fiber> {
        self.fibers.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.fibers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fibers.is_empty()
    }

    pub(crate) fn fiber(&self, id: FiberId) -> &Fiber {
        &self.fibers[id.index()]
    }

    pub(crate) fn fiber_mut(&mut self, id: FiberId) -> &mut Fiber {
        &mut self.fibers[id.index()]
    }

    pub(crate) fn push(&mut self, fiber: Fiber) -> FiberId {
        let id = FiberId(self.fibers.len() as u32);
        self.fibers.push(fiber);
        id
    }

    /// Pre-order successor: first child, else the nearest sibling found walking
    /// up from `id` (inclusive). `None` once the walk reaches the root.
    pub fn next_unit(&self, id: FiberId) -> Option<FiberId> {
        let fiber = self.get(id)?;
        if let Some(child) = fiber.child {
            return Some(child);
        }
        let mut current = Some(id);
        while let Some(cursor) = current {
            let fiber = self.get(cursor)?;
            if let Some(sibling) = fiber.sibling {
                return Some(sibling);
            }
            current = fiber.parent;
        }
        None
    }

    pub fn children(&self, id: FiberId) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(id).and_then(Fiber::child),
        }
    }

    /// Linked fibers in pre-order, starting at the root. Fibers that were
    /// created but are not reachable (none in a finished pass) are skipped.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            tree: self,
            next: Some(FiberId::ROOT),
        }
    }

    pub fn depth(&self, id: FiberId) -> usize {
        let mut depth = 0;
        let mut current = self.get(id).and_then(Fiber::parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.get(parent).and_then(Fiber::parent);
        }
        depth
    }
}

pub struct Children<'a> {
    tree: &'a FiberTree,
    next: Option<FiberId>,
}

impl<'a> Iterator for Children<'a> {
    type Item = (FiberId, &'a Fiber);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let fiber = self.tree.get(id)?;
        self.next = fiber.sibling;
        Some((id, fiber))
    }
}

pub struct Preorder<'a> {
    tree: &'a FiberTree,
    next: Option<FiberId>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = (FiberId, &'a Fiber);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let fiber = self.tree.get(id)?;
        self.next = self.tree.next_unit(id);
        Some((id, fiber))
    }
}
