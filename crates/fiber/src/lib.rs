//! # fiber
//!
//! Incremental reconciler for retained host surfaces.
//!
//! A render request turns an [`element::Element`] tree into a fiber tree one
//! unit at a time, diffing each fiber's children against the previously
//! committed tree by position. Reconciliation can be paused whenever the
//! caller's [`Deadline`] runs low; nothing reaches the host surface until the
//! whole tree is reconciled, at which point [`RenderRoot`] commits removals
//! first and then placements and prop patches in pre-order.
//!
//! ```text
//! render(element) -> work(deadline)* -> commit -> current tree
//! ```
//!
//! Host access goes through [`host::HostSurface`] only.

pub mod adapter;
mod commit;
mod error;
mod reconcile;
mod scheduler;
mod shared;
mod tree;

pub use adapter::PatchCounts;
pub use commit::CommitSummary;
pub use error::RenderError;
pub use scheduler::{
    Deadline, IdleDeadline, RenderRoot, RenderStats, SchedulerConfig, Unbounded, WorkStatus,
};
pub use shared::SharedRenderRoot;
pub use tree::{Children, EffectTag, Fiber, FiberId, FiberKind, FiberTree, Preorder};
