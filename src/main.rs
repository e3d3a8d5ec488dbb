use bus::{Bus, RenderCommand, RenderEvent};
use core_types::{HostKey, SurfaceId};
use element::{Element, Event, Handler, InvalidElementError};
use host::{HostNode, HostSnapshot};
use runtime_render::{RuntimeConfig, start_render_runtime};
use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const SURFACE: SurfaceId = 1;
const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

fn sample_tree() -> Result<Element, InvalidElementError> {
    let inner = Element::builder("div")
        .child(Element::builder("h1").child("There").build()?)
        .child(Element::builder("h3").child("is").build()?)
        .child(Element::builder("h6").child("loop...").build()?)
        .build()?;
    Element::builder("div")
        .child(Element::builder("div").child(inner).build()?)
        .child(Element::builder("h1").child("Hello World!").build()?)
        .build()
}

fn counter_tree(clicks: u64, on_click: &Handler) -> Result<Element, InvalidElementError> {
    Element::builder("div")
        .prop("id", "counter")
        .child(Element::builder("h1").child("Hello World!").build()?)
        .child(
            Element::builder("p")
                .child(format!("Clicked {clicks} times"))
                .build()?,
        )
        .child(
            Element::builder("button")
                .prop("onClick", on_click.clone())
                .child("Click")
                .build()?,
        )
        .build()
}

fn find_element(node: &HostNode, name: &str) -> Option<HostKey> {
    if node.name() == Some(name) {
        return Some(node.key());
    }
    node.children()
        .iter()
        .find_map(|child| find_element(child, name))
}

fn wait_for(bus: &Bus, want: &str) -> Result<RenderEvent, Box<dyn Error>> {
    let event = bus.evt_rx.recv_timeout(EVENT_TIMEOUT)?;
    match event {
        RenderEvent::Failed { surface_id, error } => {
            Err(format!("surface {surface_id} failed while waiting for {want}: {error}").into())
        }
        event => Ok(event),
    }
}

fn wait_for_commit(bus: &Bus, json: bool) -> Result<HostNode, Box<dyn Error>> {
    match wait_for(bus, "commit")? {
        RenderEvent::Committed { summary, tree, .. } => {
            log::info!(
                "commit v{}: {} placed, {} removed, {} updated",
                summary.version.0,
                summary.placed,
                summary.removed,
                summary.updated
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&tree)?);
            } else {
                println!("{}\n", HostSnapshot::new(&tree));
            }
            Ok(tree)
        }
        other => Err(format!("expected a commit, got {other:?}").into()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let json = std::env::args().skip(1).any(|arg| arg == "--json");

    let (bus, cmd_rx) = Bus::new();
    let runtime = start_render_runtime(cmd_rx, bus.evt_tx.clone(), RuntimeConfig::default());

    let clicks = Arc::new(AtomicU64::new(0));
    let on_click = {
        let clicks = Arc::clone(&clicks);
        Handler::new(move |_| {
            clicks.fetch_add(1, Ordering::SeqCst);
        })
    };

    bus.cmd_tx.send(RenderCommand::Mount {
        surface_id: SURFACE,
    })?;
    if let RenderEvent::Mounted { container, .. } = wait_for(&bus, "mount")? {
        log::info!("surface {SURFACE} mounted on host node {}", container.0);
    }

    bus.cmd_tx.send(RenderCommand::Render {
        surface_id: SURFACE,
        element: sample_tree()?,
    })?;
    wait_for_commit(&bus, json)?;

    bus.cmd_tx.send(RenderCommand::Render {
        surface_id: SURFACE,
        element: counter_tree(0, &on_click)?,
    })?;
    let tree = wait_for_commit(&bus, json)?;

    let button = find_element(&tree, "button").ok_or("no button in committed tree")?;
    bus.cmd_tx.send(RenderCommand::Dispatch {
        surface_id: SURFACE,
        target: button,
        event: Event::new("click"),
    })?;
    if let RenderEvent::Dispatched { handlers, .. } = wait_for(&bus, "dispatch")? {
        log::info!("click reached {handlers} handler(s)");
    }

    bus.cmd_tx.send(RenderCommand::Render {
        surface_id: SURFACE,
        element: counter_tree(clicks.load(Ordering::SeqCst), &on_click)?,
    })?;
    wait_for_commit(&bus, json)?;

    bus.cmd_tx.send(RenderCommand::Shutdown)?;
    runtime
        .join()
        .map_err(|_| "render runtime panicked")?;
    Ok(())
}
