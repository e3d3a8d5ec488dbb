//! Positional child diff.
//!
//! New elements are paired with the alternate's child chain index by index.
//! There are no keys: a reordered list repatches in place and an insertion in
//! the middle shows up as a run of type changes.
//!
//! Per index:
//! - same tag: UPDATE, reusing the old host object;
//! - element without a same-tag partner: PLACEMENT, no host object yet;
//! - old fiber without a same-tag partner: queued for deletion.
//!
//! Both branches can fire for one index (`span` -> `p`). The previous
//! generation is never written to.

use crate::error::RenderError;
use crate::tree::{Fiber, FiberId, FiberTree};
use element::Element;
use std::sync::Arc;

const LOG_TARGET: &str = "fiber.reconcile";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ReconcileCounts {
    pub updates: usize,
    pub placements: usize,
    pub deletions: usize,
}

pub(crate) fn reconcile_children(
    wip: &mut FiberTree,
    current: Option<&FiberTree>,
    parent: FiberId,
    elements: &[Element],
    deletions: &mut Vec<FiberId>,
) -> Result<ReconcileCounts, RenderError> {
    let mut old = match wip.fiber(parent).alternate {
        Some(alternate) => previous_fiber(current, alternate, parent)?.child,
        None => None,
    };
    let mut counts = ReconcileCounts::default();
    let mut previous: Option<FiberId> = None;
    let mut index = 0;

    while index < elements.len() || old.is_some() {
        let element = elements.get(index);
        let old_fiber = match old {
            Some(id) => Some((id, previous_fiber(current, id, parent)?)),
            None => None,
        };

        let same_type = match (element, old_fiber) {
            (Some(element), Some((_, fiber))) => fiber.tag() == Some(element.tag()),
            _ => false,
        };

        let mut created = None;
        if let Some(element) = element {
            let fiber = match old_fiber {
                Some((old_id, old_fiber)) if same_type => {
                    counts.updates += 1;
                    Fiber::update(
                        element.tag().clone(),
                        Arc::clone(element.props()),
                        parent,
                        old_fiber.dom,
                        old_id,
                    )
                }
                _ => {
                    counts.placements += 1;
                    Fiber::placement(element.tag().clone(), Arc::clone(element.props()), parent)
                }
            };
            created = Some(wip.push(fiber));
        }

        if let Some((old_id, _)) = old_fiber.filter(|_| !same_type) {
            counts.deletions += 1;
            deletions.push(old_id);
        }

        old = old_fiber.and_then(|(_, fiber)| fiber.sibling);

        if let Some(id) = created {
            match previous {
                None => wip.fiber_mut(parent).child = Some(id),
                Some(prev) => wip.fiber_mut(prev).sibling = Some(id),
            }
            previous = Some(id);
        }
        index += 1;
    }

    log::trace!(
        target: LOG_TARGET,
        "fiber {} <{}>: {} update, {} placement, {} deletion",
        parent.0,
        wip.fiber(parent).describe(),
        counts.updates,
        counts.placements,
        counts.deletions
    );
    Ok(counts)
}

fn previous_fiber(
    current: Option<&FiberTree>,
    id: FiberId,
    parent: FiberId,
) -> Result<&Fiber, RenderError> {
    current
        .and_then(|tree| tree.get(id))
        .ok_or(RenderError::StaleAlternate { fiber: parent })
}
