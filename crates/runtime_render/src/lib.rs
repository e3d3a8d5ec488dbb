//! Render runtime thread.
//!
//! Owns one [`MemorySurface`] and one [`RenderRoot`] per mounted surface.
//! Each turn of the loop drains the command channel, then gives every surface
//! with a pending pass one time slice. With nothing pending it blocks on the
//! channel. Commits are reported with a materialized copy of the host tree.

use bus::{RenderCommand, RenderEvent};
use core_types::{HostKey, SurfaceId};
use element::Event;
use fiber::{IdleDeadline, RenderError, RenderRoot, SchedulerConfig, WorkStatus};
use host::{HostError, MemorySurface};
use std::collections::HashMap;
use std::fmt;
use std::ops::ControlFlow;
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const LOG_TARGET: &str = "runtime.render";

#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Time budget of one slice per surface.
    pub slice: Duration,
    pub scheduler: SchedulerConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            slice: Duration::from_millis(5),
            scheduler: SchedulerConfig::default(),
        }
    }
}

#[derive(Debug)]
pub enum RuntimeError {
    UnknownSurface(SurfaceId),
    AlreadyMounted(SurfaceId),
    Render(RenderError),
    Host(HostError),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::UnknownSurface(id) => write!(f, "surface {id} is not mounted"),
            RuntimeError::AlreadyMounted(id) => write!(f, "surface {id} is already mounted"),
            RuntimeError::Render(err) => write!(f, "render failed: {err}"),
            RuntimeError::Host(err) => write!(f, "host error: {err}"),
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RuntimeError::Render(err) => Some(err),
            RuntimeError::Host(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RenderError> for RuntimeError {
    fn from(err: RenderError) -> Self {
        RuntimeError::Render(err)
    }
}

impl From<HostError> for RuntimeError {
    fn from(err: HostError) -> Self {
        RuntimeError::Host(err)
    }
}

struct SurfaceState {
    surface: MemorySurface,
    root: RenderRoot,
}

struct Runtime {
    surfaces: HashMap<SurfaceId, SurfaceState>,
    evt_tx: Sender<RenderEvent>,
    config: RuntimeConfig,
}

pub fn start_render_runtime(
    cmd_rx: Receiver<RenderCommand>,
    evt_tx: Sender<RenderEvent>,
    config: RuntimeConfig,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut runtime = Runtime {
            surfaces: HashMap::new(),
            evt_tx,
            config,
        };
        runtime.run(&cmd_rx);
        log::debug!(target: LOG_TARGET, "render runtime stopped");
    })
}

impl Runtime {
    fn run(&mut self, cmd_rx: &Receiver<RenderCommand>) {
        loop {
            if !self.has_pending_work() {
                let Ok(cmd) = cmd_rx.recv() else {
                    return;
                };
                if self.handle(cmd).is_break() {
                    return;
                }
            }
            loop {
                match cmd_rx.try_recv() {
                    Ok(cmd) => {
                        if self.handle(cmd).is_break() {
                            return;
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    // Finish pending passes; the next blocking recv ends the loop.
                    Err(TryRecvError::Disconnected) => break,
                }
            }
            self.run_slices();
        }
    }

    fn has_pending_work(&self) -> bool {
        self.surfaces.values().any(|state| state.root.is_pending())
    }

    fn handle(&mut self, cmd: RenderCommand) -> ControlFlow<()> {
        let result = match cmd {
            RenderCommand::Mount { surface_id } => self.mount(surface_id),
            RenderCommand::Render {
                surface_id,
                element,
            } => self.state(surface_id).map(|state| {
                log::trace!(target: LOG_TARGET, "render queued for surface {surface_id}");
                state.root.render(element);
            }),
            RenderCommand::Dispatch {
                surface_id,
                target,
                event,
            } => self.dispatch(surface_id, target, &event),
            RenderCommand::Unmount { surface_id } => match self.surfaces.remove(&surface_id) {
                Some(state) => {
                    log::debug!(
                        target: LOG_TARGET,
                        "unmounted surface {surface_id} at v{} (pending pass: {})",
                        state.root.version().0,
                        state.root.is_pending()
                    );
                    Ok(())
                }
                None => Err((surface_id, RuntimeError::UnknownSurface(surface_id))),
            },
            RenderCommand::Shutdown => return ControlFlow::Break(()),
        };
        if let Err((surface_id, err)) = result {
            self.fail(surface_id, &err);
        }
        ControlFlow::Continue(())
    }

    fn mount(&mut self, surface_id: SurfaceId) -> Result<(), (SurfaceId, RuntimeError)> {
        if self.surfaces.contains_key(&surface_id) {
            return Err((surface_id, RuntimeError::AlreadyMounted(surface_id)));
        }
        let surface = MemorySurface::new();
        let container = surface.container();
        let root = RenderRoot::new(container, self.config.scheduler.clone());
        self.surfaces
            .insert(surface_id, SurfaceState { surface, root });
        log::debug!(target: LOG_TARGET, "mounted surface {surface_id}");
        let _ = self.evt_tx.send(RenderEvent::Mounted {
            surface_id,
            container,
        });
        Ok(())
    }

    fn dispatch(
        &mut self,
        surface_id: SurfaceId,
        target: HostKey,
        event: &Event,
    ) -> Result<(), (SurfaceId, RuntimeError)> {
        let state = self.state(surface_id)?;
        let handlers = state
            .surface
            .dispatch(target, event)
            .map_err(|err| (surface_id, RuntimeError::from(err)))?;
        let _ = self.evt_tx.send(RenderEvent::Dispatched {
            surface_id,
            target,
            handlers,
        });
        Ok(())
    }

    fn state(
        &mut self,
        surface_id: SurfaceId,
    ) -> Result<&mut SurfaceState, (SurfaceId, RuntimeError)> {
        self.surfaces
            .get_mut(&surface_id)
            .ok_or((surface_id, RuntimeError::UnknownSurface(surface_id)))
    }

    fn run_slices(&mut self) {
        let mut failures: Vec<(SurfaceId, RuntimeError)> = Vec::new();
        for (&surface_id, state) in self.surfaces.iter_mut() {
            if !state.root.is_pending() {
                continue;
            }
            let deadline = IdleDeadline::after(self.config.slice);
            match state.root.work(&mut state.surface, &deadline) {
                Ok(WorkStatus::Committed(summary)) => match state.surface.materialize_container() {
                    Ok(tree) => {
                        let _ = self.evt_tx.send(RenderEvent::Committed {
                            surface_id,
                            summary,
                            tree,
                        });
                    }
                    Err(err) => failures.push((surface_id, RuntimeError::from(err))),
                },
                Ok(WorkStatus::Yielded | WorkStatus::Idle) => {}
                Err(err) => failures.push((surface_id, RuntimeError::from(err))),
            }
        }
        for (surface_id, err) in failures {
            self.fail(surface_id, &err);
        }
    }

    fn fail(&self, surface_id: SurfaceId, err: &RuntimeError) {
        log::error!(target: LOG_TARGET, "surface {surface_id}: {err}");
        let _ = self.evt_tx.send(RenderEvent::Failed {
            surface_id,
            error: err.to_string(),
        });
    }
}
