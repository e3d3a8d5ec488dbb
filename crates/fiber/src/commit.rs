//! Commit: turn a finished work tree into host mutations.
//!
//! Planning is pure and validates every fiber first; only a complete plan is
//! applied. Plan order:
//! 1. every queued deletion, in queue order (remove from the parent's host
//!    object; the subtree goes with it);
//! 2. the work tree in pre-order from `root.child`: PLACEMENT appends at the
//!    end of the parent's host children, UPDATE patches the reused host object.
//!
//! Deleted fibers are excised only; their descendants and siblings are not
//! visited.
//!
//! Applying is all or nothing: a host error mid-apply rolls back the calls
//! already made, including a removed node's position among its siblings.

use crate::adapter::{PatchCounts, Revert, patch_props_recorded};
use crate::error::RenderError;
use crate::tree::{EffectTag, Fiber, FiberId, FiberTree};
use core_types::{CommitVersion, HostKey};
use element::Props;
use host::HostSurface;
use std::sync::Arc;

const LOG_TARGET: &str = "fiber.commit";

#[derive(Clone, Debug)]
pub(crate) enum CommitOp {
    Remove {
        parent: HostKey,
        child: HostKey,
    },
    Append {
        parent: HostKey,
        child: HostKey,
    },
    Patch {
        node: HostKey,
        prev: Arc<Props>,
        next: Arc<Props>,
    },
}

/// What one commit did to the host surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommitSummary {
    pub version: CommitVersion,
    pub removed: usize,
    pub placed: usize,
    pub updated: usize,
    pub patch: PatchCounts,
}

impl CommitSummary {
    /// No structural change and no prop delta. Updated fibers with identical
    /// props still count as no-ops.
    pub fn is_noop(&self) -> bool {
        self.removed == 0 && self.placed == 0 && self.patch.is_empty()
    }
}

pub(crate) fn plan_commit(
    wip: &FiberTree,
    current: Option<&FiberTree>,
    deletions: &[FiberId],
) -> Result<Vec<CommitOp>, RenderError> {
    let mut ops = Vec::with_capacity(deletions.len() + wip.len());

    for &id in deletions {
        let tree = current.ok_or(RenderError::StaleAlternate { fiber: id })?;
        let fiber = tree
            .get(id)
            .ok_or(RenderError::StaleAlternate { fiber: id })?;
        let child = host_of(fiber, id)?;
        let parent = parent_host(tree, fiber, id)?;
        ops.push(CommitOp::Remove { parent, child });
    }

    let mut cursor = wip.root().child();
    while let Some(id) = cursor {
        let fiber = wip.fiber(id);
        debug_assert_ne!(fiber.effect(), Some(EffectTag::Deletion));
        match fiber.effect() {
            Some(EffectTag::Placement) => {
                let child = host_of(fiber, id)?;
                let parent = parent_host(wip, fiber, id)?;
                ops.push(CommitOp::Append { parent, child });
            }
            Some(EffectTag::Update) => {
                let node = host_of(fiber, id)?;
                let prev = fiber
                    .alternate()
                    .and_then(|alternate| current?.get(alternate))
                    .ok_or(RenderError::StaleAlternate { fiber: id })?;
                ops.push(CommitOp::Patch {
                    node,
                    prev: Arc::clone(prev.props()),
                    next: Arc::clone(fiber.props()),
                });
            }
            Some(EffectTag::Deletion) | None => {}
        }
        cursor = wip.next_unit(id);
    }

    Ok(ops)
}

/// Apply a plan. If a host call fails, every call already made is undone in
/// reverse order before the error is returned, so the surface still shows the
/// previously committed tree.
pub(crate) fn apply_commit<S: HostSurface + ?Sized>(
    surface: &mut S,
    ops: &[CommitOp],
    version: CommitVersion,
) -> Result<CommitSummary, RenderError> {
    let mut journal = Vec::new();
    match apply_ops(surface, ops, version, &mut journal) {
        Ok(summary) => {
            log::debug!(
                target: LOG_TARGET,
                "commit v{}: {} removed, {} placed, {} updated, {} prop calls",
                version.0,
                summary.removed,
                summary.placed,
                summary.updated,
                summary.patch.total()
            );
            Ok(summary)
        }
        Err(err) => {
            log::warn!(target: LOG_TARGET, "commit v{} failed: {err}", version.0);
            roll_back(surface, journal);
            Err(err)
        }
    }
}

fn apply_ops<S: HostSurface + ?Sized>(
    surface: &mut S,
    ops: &[CommitOp],
    version: CommitVersion,
    journal: &mut Vec<Revert>,
) -> Result<CommitSummary, RenderError> {
    let mut summary = CommitSummary {
        version,
        ..CommitSummary::default()
    };
    for op in ops {
        match op {
            CommitOp::Remove { parent, child } => {
                let before = surface.next_sibling(*child)?;
                surface.remove_child(*parent, *child)?;
                journal.push(Revert::Reattach {
                    parent: *parent,
                    child: *child,
                    before,
                });
                summary.removed += 1;
            }
            CommitOp::Append { parent, child } => {
                surface.append_child(*parent, *child)?;
                journal.push(Revert::Detach {
                    parent: *parent,
                    child: *child,
                });
                summary.placed += 1;
            }
            CommitOp::Patch { node, prev, next } => {
                summary.patch +=
                    patch_props_recorded(surface, *node, prev, next, &mut |revert| {
                        journal.push(revert)
                    })?;
                summary.updated += 1;
            }
        }
    }
    Ok(summary)
}

fn roll_back<S: HostSurface + ?Sized>(surface: &mut S, journal: Vec<Revert>) {
    let calls = journal.len();
    let mut failed = 0;
    for revert in journal.into_iter().rev() {
        if let Err(err) = revert.apply(surface) {
            failed += 1;
            log::error!(target: LOG_TARGET, "rollback of {revert:?} failed: {err}");
        }
    }
    if failed == 0 {
        log::debug!(target: LOG_TARGET, "rolled back {calls} host call(s)");
    }
}

fn host_of(fiber: &Fiber, id: FiberId) -> Result<HostKey, RenderError> {
    fiber.dom().ok_or_else(|| detached(fiber, id))
}

fn parent_host(tree: &FiberTree, fiber: &Fiber, id: FiberId) -> Result<HostKey, RenderError> {
    fiber
        .parent()
        .and_then(|parent| tree.get(parent))
        .and_then(Fiber::dom)
        .ok_or_else(|| detached(fiber, id))
}

fn detached(fiber: &Fiber, id: FiberId) -> RenderError {
    log::error!(target: LOG_TARGET, "fiber {} <{}> is detached", id.0, fiber.describe());
    RenderError::DetachedFiber {
        fiber: id,
        tag: fiber.describe(),
    }
}
