use crate::commit::CommitSummary;
use crate::error::RenderError;
use crate::scheduler::{Deadline, RenderRoot, WorkStatus};
use element::Element;
use host::HostSurface;
use std::cell::RefCell;
use std::rc::Rc;

/// Single-threaded shared handle to a [`RenderRoot`].
///
/// Host callbacks that hold a clone can request renders. A request made while
/// the root is inside `work`, `flush` or a commit fails with
/// [`RenderError::SchedulerReentry`] instead of corrupting the pass.
#[derive(Clone)]
pub struct SharedRenderRoot(Rc<RefCell<RenderRoot>>);

impl SharedRenderRoot {
    pub fn new(root: RenderRoot) -> Self {
        Self(Rc::new(RefCell::new(root)))
    }

    pub fn render(&self, element: Element) -> Result<(), RenderError> {
        let mut root = self
            .0
            .try_borrow_mut()
            .map_err(|_| RenderError::SchedulerReentry)?;
        root.render(element);
        Ok(())
    }

    pub fn work<S, D>(&self, surface: &mut S, deadline: &D) -> Result<WorkStatus, RenderError>
    where
        S: HostSurface + ?Sized,
        D: Deadline + ?Sized,
    {
        let mut root = self
            .0
            .try_borrow_mut()
            .map_err(|_| RenderError::SchedulerReentry)?;
        root.work(surface, deadline)
    }

    pub fn flush<S: HostSurface + ?Sized>(
        &self,
        surface: &mut S,
    ) -> Result<Option<CommitSummary>, RenderError> {
        let mut root = self
            .0
            .try_borrow_mut()
            .map_err(|_| RenderError::SchedulerReentry)?;
        root.flush(surface)
    }

    /// Read access to the root; fails while it is busy.
    pub fn with<R>(&self, f: impl FnOnce(&RenderRoot) -> R) -> Result<R, RenderError> {
        let root = self
            .0
            .try_borrow()
            .map_err(|_| RenderError::SchedulerReentry)?;
        Ok(f(&root))
    }
}
