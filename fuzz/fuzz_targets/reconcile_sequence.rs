#![no_main]

use element::{Element, Handler};
use fiber::{RenderRoot, SchedulerConfig, WorkStatus};
use host::{HostSnapshot, MemorySurface};
use libfuzzer_sys::fuzz_target;
use std::time::Duration;

const TAGS: [&str; 4] = ["div", "span", "p", "ul"];
const MAX_DEPTH: usize = 4;
const MAX_CHILDREN: usize = 4;
const MAX_TREES: usize = 8;

struct Bytes<'a> {
    data: &'a [u8],
    at: usize,
}

impl Bytes<'_> {
    fn next(&mut self) -> u8 {
        let b = self.data.get(self.at).copied().unwrap_or(0);
        self.at += 1;
        b
    }

    fn exhausted(&self) -> bool {
        self.at >= self.data.len()
    }
}

fn build(bytes: &mut Bytes<'_>, depth: usize, handlers: &[Handler; 2]) -> Element {
    let b = bytes.next();
    if depth >= MAX_DEPTH || b & 0x80 != 0 {
        return element::build_text_element(i64::from(b & 0x0f));
    }
    let mut builder = Element::builder(TAGS[(b & 0x03) as usize]);
    if b & 0x04 != 0 {
        builder = builder.prop("class", if b & 0x08 != 0 { "a" } else { "b" });
    }
    if b & 0x10 != 0 {
        builder = builder.prop("onClick", handlers[usize::from(b & 0x20 != 0)].clone());
    }
    let children = (bytes.next() as usize) % (MAX_CHILDREN + 1);
    for _ in 0..children {
        builder = builder.child(build(bytes, depth + 1, handlers));
    }
    builder.build().unwrap_or_else(|err| panic!("generated invalid element: {err}"))
}

/// Snapshot lines, sorted. Placements append at the end of the parent, so
/// sibling order may differ from a fresh render; depth and content may not.
fn sorted_lines(surface: &MemorySurface) -> Vec<String> {
    let mut lines = HostSnapshot::new(&surface.materialize_container().unwrap())
        .as_lines()
        .to_vec();
    lines.sort();
    lines
}

fuzz_target!(|data: &[u8]| {
    let handlers = [Handler::new(|_| {}), Handler::new(|_| {})];
    let mut bytes = Bytes { data, at: 0 };
    let mut surface = MemorySurface::new();
    let mut root = RenderRoot::new(surface.container(), SchedulerConfig::default());
    let no_time = || Duration::ZERO;

    let mut last = None;
    for _ in 0..MAX_TREES {
        if bytes.exhausted() {
            break;
        }
        let sliced = bytes.next() & 1 == 1;
        let tree = build(&mut bytes, 0, &handlers);
        root.render(tree.clone());
        if sliced {
            while let WorkStatus::Yielded = root.work(&mut surface, &no_time).unwrap() {}
        } else {
            root.flush(&mut surface).unwrap();
        }
        assert_eq!(surface.children_of(surface.container()).len(), 1);
        last = Some(tree);
    }

    // Same nodes at the same depths as a fresh render of the final tree.
    if let Some(tree) = last {
        let mut fresh = MemorySurface::new();
        let mut fresh_root = RenderRoot::new(fresh.container(), SchedulerConfig::default());
        fresh_root.render(tree);
        fresh_root.flush(&mut fresh).unwrap();
        assert_eq!(sorted_lines(&surface), sorted_lines(&fresh));
    }
});
