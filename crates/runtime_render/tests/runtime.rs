use bus::{Bus, RenderCommand, RenderEvent};
use core_types::HostKey;
use element::{Element, Event};
use host::HostNode;
use runtime_render::{RuntimeConfig, start_render_runtime};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

fn next_event(bus: &Bus) -> RenderEvent {
    bus.evt_rx
        .recv_timeout(TIMEOUT)
        .unwrap_or_else(|err| panic!("no render event: {err}"))
}

fn committed_tree(bus: &Bus) -> HostNode {
    match next_event(bus) {
        RenderEvent::Committed { tree, .. } => tree,
        other => panic!("expected a commit, got {other:?}"),
    }
}

fn mount(bus: &Bus, surface_id: u64) -> HostKey {
    bus.cmd_tx.send(RenderCommand::Mount { surface_id }).unwrap();
    match next_event(bus) {
        RenderEvent::Mounted {
            surface_id: id,
            container,
        } => {
            assert_eq!(id, surface_id);
            container
        }
        other => panic!("expected mount, got {other:?}"),
    }
}

#[test]
fn mount_render_dispatch_shutdown() {
    let (bus, cmd_rx) = Bus::new();
    let runtime = start_render_runtime(cmd_rx, bus.evt_tx.clone(), RuntimeConfig::default());

    let container = mount(&bus, 1);
    let clicks = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&clicks);
    let button = Element::builder("button")
        .handler("onClick", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .child("Go")
        .build()
        .unwrap();
    bus.cmd_tx
        .send(RenderCommand::Render {
            surface_id: 1,
            element: button,
        })
        .unwrap();

    let tree = committed_tree(&bus);
    assert_eq!(tree.key(), container);
    let button = &tree.children()[0];
    assert_eq!(button.name(), Some("button"));
    assert_eq!(button.children()[0].text(), Some("Go"));

    bus.cmd_tx
        .send(RenderCommand::Dispatch {
            surface_id: 1,
            target: button.key(),
            event: Event::new("click"),
        })
        .unwrap();
    match next_event(&bus) {
        RenderEvent::Dispatched { handlers, .. } => assert_eq!(handlers, 1),
        other => panic!("expected dispatch, got {other:?}"),
    }
    assert_eq!(clicks.load(Ordering::SeqCst), 1);

    bus.cmd_tx.send(RenderCommand::Shutdown).unwrap();
    runtime.join().unwrap();
}

#[test]
fn latest_render_wins_and_surfaces_are_isolated() {
    let (bus, cmd_rx) = Bus::new();
    let runtime = start_render_runtime(cmd_rx, bus.evt_tx.clone(), RuntimeConfig::default());
    mount(&bus, 1);
    mount(&bus, 2);

    let text = |s: &str| Element::builder("p").child(s).build().unwrap();
    bus.cmd_tx
        .send(RenderCommand::Render {
            surface_id: 1,
            element: text("one"),
        })
        .unwrap();
    let first = committed_tree(&bus);
    assert_eq!(first.children()[0].children()[0].text(), Some("one"));

    bus.cmd_tx
        .send(RenderCommand::Render {
            surface_id: 2,
            element: text("other"),
        })
        .unwrap();
    match next_event(&bus) {
        RenderEvent::Committed {
            surface_id,
            summary,
            tree,
        } => {
            assert_eq!(surface_id, 2);
            assert_eq!(summary.placed, 2);
            assert_eq!(tree.count(), 3);
        }
        other => panic!("expected a commit, got {other:?}"),
    }

    bus.cmd_tx
        .send(RenderCommand::Render {
            surface_id: 1,
            element: text("two"),
        })
        .unwrap();
    let second = committed_tree(&bus);
    assert_eq!(second.children()[0].children()[0].text(), Some("two"));

    drop(bus.cmd_tx);
    runtime.join().unwrap();
}

#[test]
fn unknown_surface_reports_failure() {
    let (bus, cmd_rx) = Bus::new();
    let runtime = start_render_runtime(cmd_rx, bus.evt_tx.clone(), RuntimeConfig::default());

    bus.cmd_tx
        .send(RenderCommand::Render {
            surface_id: 7,
            element: Element::builder("div").build().unwrap(),
        })
        .unwrap();
    match next_event(&bus) {
        RenderEvent::Failed { surface_id, error } => {
            assert_eq!(surface_id, 7);
            assert!(error.contains("not mounted"), "{error}");
        }
        other => panic!("expected failure, got {other:?}"),
    }

    mount(&bus, 7);
    bus.cmd_tx.send(RenderCommand::Mount { surface_id: 7 }).unwrap();
    assert!(matches!(next_event(&bus), RenderEvent::Failed { surface_id: 7, .. }));

    bus.cmd_tx.send(RenderCommand::Unmount { surface_id: 7 }).unwrap();
    bus.cmd_tx
        .send(RenderCommand::Dispatch {
            surface_id: 7,
            target: HostKey(1),
            event: Event::new("click"),
        })
        .unwrap();
    assert!(matches!(next_event(&bus), RenderEvent::Failed { surface_id: 7, .. }));

    bus.cmd_tx.send(RenderCommand::Shutdown).unwrap();
    runtime.join().unwrap();
}
