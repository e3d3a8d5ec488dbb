//! Interruptible render scheduling for one host container.
//!
//! A [`RenderRoot`] owns the committed tree, the in-progress tree, the
//! deletion queue and the next unit of work. The embedding drives it:
//! `render` queues a pass and returns immediately, `work` performs units until
//! the deadline runs low and commits once the traversal is complete.
//!
//! Suspension happens only between units and never during commit. A `render`
//! issued mid-pass discards the pass and restarts from the committed tree;
//! host objects the discarded pass already created are left detached.

use crate::adapter;
use crate::commit::{CommitSummary, apply_commit, plan_commit};
use crate::error::RenderError;
use crate::reconcile::reconcile_children;
use crate::tree::{EffectTag, FiberId, FiberKind, FiberTree};
use core_types::{CommitVersion, HostKey};
use element::{Element, Props};
use host::HostSurface;
use std::sync::Arc;
use std::time::{Duration, Instant};

const LOG_TARGET: &str = "fiber.scheduler";

/// Time left in the current idle period.
pub trait Deadline {
    fn time_remaining(&self) -> Duration;
}

impl<F: Fn() -> Duration> Deadline for F {
    fn time_remaining(&self) -> Duration {
        self()
    }
}

/// Wall-clock deadline.
#[derive(Clone, Copy, Debug)]
pub struct IdleDeadline {
    until: Instant,
}

impl IdleDeadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            until: Instant::now() + budget,
        }
    }

    pub fn at(until: Instant) -> Self {
        Self { until }
    }
}

impl Deadline for IdleDeadline {
    fn time_remaining(&self) -> Duration {
        self.until.saturating_duration_since(Instant::now())
    }
}

/// Never runs out; used by `flush`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unbounded;

impl Deadline for Unbounded {
    fn time_remaining(&self) -> Duration {
        Duration::MAX
    }
}

#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Yield once less than this much time remains after a unit.
    pub yield_threshold: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            yield_threshold: Duration::from_millis(1),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub units: u64,
    pub slices: u64,
    pub yields: u64,
    pub commits: u64,
    /// Passes discarded by a newer `render` or by an error.
    pub abandoned: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkStatus {
    /// Nothing queued.
    Idle,
    /// Out of time; call `work` again.
    Yielded,
    Committed(CommitSummary),
}

pub struct RenderRoot {
    container: HostKey,
    config: SchedulerConfig,
    current: Option<FiberTree>,
    wip: Option<FiberTree>,
    next_unit: Option<FiberId>,
    deletions: Vec<FiberId>,
    generation: u64,
    version: CommitVersion,
    stats: RenderStats,
}

impl RenderRoot {
    pub fn new(container: HostKey, config: SchedulerConfig) -> Self {
        Self {
            container,
            config,
            current: None,
            wip: None,
            next_unit: None,
            deletions: Vec::new(),
            generation: 0,
            version: CommitVersion::INITIAL,
            stats: RenderStats::default(),
        }
    }

    /// Queue a pass rendering `element` as the container's only child.
    pub fn render(&mut self, element: Element) {
        if self.wip.is_some() {
            self.abandon("superseded");
        }
        self.generation += 1;
        let wip = FiberTree::with_root(
            self.generation,
            self.container,
            Props::from_children(vec![element]),
            self.current.as_ref(),
        );
        log::trace!(target: LOG_TARGET, "render queued, generation {}", self.generation);
        self.wip = Some(wip);
        self.deletions.clear();
        self.next_unit = Some(FiberId::ROOT);
    }

    /// Perform units until `deadline` runs low, then commit if the traversal
    /// finished. Errors abort the pass and leave the committed tree as it was.
    pub fn work<S, D>(&mut self, surface: &mut S, deadline: &D) -> Result<WorkStatus, RenderError>
    where
        S: HostSurface + ?Sized,
        D: Deadline + ?Sized,
    {
        if self.wip.is_none() {
            return Ok(WorkStatus::Idle);
        }
        self.stats.slices += 1;
        let result = self.run_slice(surface, deadline);
        #[cfg(feature = "debug-stats")]
        log::trace!(target: LOG_TARGET, "slice done: {:?}", self.stats);
        if result.is_err() {
            self.abandon("failed");
        }
        result
    }

    /// Perform exactly one unit of work without committing. Returns whether
    /// units remain.
    pub fn step<S: HostSurface + ?Sized>(&mut self, surface: &mut S) -> Result<bool, RenderError> {
        let Some(unit) = self.next_unit else {
            return Ok(false);
        };
        match self.perform_unit_of_work(surface, unit) {
            Ok(next) => {
                self.next_unit = next;
                Ok(next.is_some())
            }
            Err(err) => {
                self.abandon("failed");
                Err(err)
            }
        }
    }

    /// Run the queued pass to completion.
    pub fn flush<S: HostSurface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> Result<Option<CommitSummary>, RenderError> {
        loop {
            match self.work(surface, &Unbounded)? {
                WorkStatus::Idle => return Ok(None),
                WorkStatus::Yielded => continue,
                WorkStatus::Committed(summary) => return Ok(Some(summary)),
            }
        }
    }

    pub fn container(&self) -> HostKey {
        self.container
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Last committed tree.
    pub fn current(&self) -> Option<&FiberTree> {
        self.current.as_ref()
    }

    pub fn work_in_progress(&self) -> Option<&FiberTree> {
        self.wip.as_ref()
    }

    /// Fibers of the committed tree queued for removal by the current pass.
    pub fn pending_deletions(&self) -> &[FiberId] {
        &self.deletions
    }

    pub fn next_unit(&self) -> Option<FiberId> {
        self.next_unit
    }

    pub fn is_pending(&self) -> bool {
        self.wip.is_some()
    }

    pub fn version(&self) -> CommitVersion {
        self.version
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    fn run_slice<S, D>(&mut self, surface: &mut S, deadline: &D) -> Result<WorkStatus, RenderError>
    where
        S: HostSurface + ?Sized,
        D: Deadline + ?Sized,
    {
        let mut should_yield = false;
        while let Some(unit) = self.next_unit {
            if should_yield {
                break;
            }
            self.next_unit = self.perform_unit_of_work(surface, unit)?;
            should_yield = deadline.time_remaining() < self.config.yield_threshold;
        }

        if self.next_unit.is_some() {
            self.stats.yields += 1;
            return Ok(WorkStatus::Yielded);
        }
        self.commit_root(surface).map(WorkStatus::Committed)
    }

    /// Materialize the fiber if needed, reconcile its children, return the
    /// pre-order successor.
    fn perform_unit_of_work<S: HostSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        id: FiberId,
    ) -> Result<Option<FiberId>, RenderError> {
        let Some(wip) = self.wip.as_mut() else {
            return Ok(None);
        };

        let fiber = wip.fiber(id);
        if let (None, FiberKind::Host(tag)) = (fiber.dom, &fiber.kind) {
            let dom = adapter::materialize(surface, tag, &fiber.props)?;
            wip.fiber_mut(id).dom = Some(dom);
        }

        let props = Arc::clone(&wip.fiber(id).props);
        reconcile_children(
            wip,
            self.current.as_ref(),
            id,
            props.children(),
            &mut self.deletions,
        )?;
        self.stats.units += 1;
        Ok(wip.next_unit(id))
    }

    fn commit_root<S: HostSurface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> Result<CommitSummary, RenderError> {
        let Some(wip) = self.wip.take() else {
            return Ok(CommitSummary {
                version: self.version,
                ..CommitSummary::default()
            });
        };
        let deletions = std::mem::take(&mut self.deletions);
        let ops = plan_commit(&wip, self.current.as_ref(), &deletions)?;
        let version = self.version.next();
        let summary = apply_commit(surface, &ops, version)?;

        self.current = Some(wip);
        self.version = version;
        self.stats.commits += 1;
        Ok(summary)
    }

    fn abandon(&mut self, reason: &str) {
        let leaked = self.wip.as_ref().map_or(0, |wip| {
            wip.preorder()
                .filter(|(_, fiber)| {
                    fiber.effect() == Some(EffectTag::Placement) && fiber.dom().is_some()
                })
                .count()
        });
        if leaked > 0 {
            log::warn!(
                target: LOG_TARGET,
                "pass {reason}: {leaked} detached host object(s) left behind"
            );
        } else {
            log::debug!(target: LOG_TARGET, "pass {reason}");
        }
        self.wip = None;
        self.next_unit = None;
        self.deletions.clear();
        self.stats.abandoned += 1;
    }
}
