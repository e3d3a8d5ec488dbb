use core_types::{HostKey, SurfaceId};
use element::{Element, Event};
use fiber::CommitSummary;
use host::HostNode;
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug)]
pub enum RenderCommand {
    Mount {
        surface_id: SurfaceId,
    },
    Render {
        surface_id: SurfaceId,
        element: Element,
    },
    Dispatch {
        surface_id: SurfaceId,
        target: HostKey,
        event: Event,
    },
    Unmount {
        surface_id: SurfaceId,
    },
    Shutdown,
}

#[derive(Debug)]
pub enum RenderEvent {
    Mounted {
        surface_id: SurfaceId,
        container: HostKey,
    },
    Committed {
        surface_id: SurfaceId,
        summary: CommitSummary,
        tree: HostNode,
    },
    Dispatched {
        surface_id: SurfaceId,
        target: HostKey,
        handlers: usize,
    },
    Failed {
        surface_id: SurfaceId,
        error: String,
    },
}

pub struct Bus {
    pub cmd_tx: Sender<RenderCommand>,
    pub evt_rx: Receiver<RenderEvent>,
    pub evt_tx: Sender<RenderEvent>, // shareable for runtimes
}

impl Bus {
    /// Returns the bus and the command receiver for the runtime thread.
    pub fn new() -> (Self, Receiver<RenderCommand>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (evt_tx, evt_rx) = mpsc::channel();
        (
            Self {
                cmd_tx,
                evt_rx,
                evt_tx,
            },
            cmd_rx,
        )
    }
}
