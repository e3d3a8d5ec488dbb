use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use element::{Element, Handler};
use fiber::{RenderRoot, SchedulerConfig};
use host::MemorySurface;

const SMALL_ROWS: usize = 64;
const LARGE_ROWS: usize = 5_000;

fn make_table(rows: usize, label: &str, handler: &Handler) -> Element {
    let body = (0..rows).map(|i| {
        Element::builder("tr")
            .prop("class", if i % 2 == 0 { "even" } else { "odd" })
            .child(Element::builder("td").child(i as i64).build().unwrap())
            .child(
                Element::builder("td")
                    .prop("onClick", handler.clone())
                    .child(label)
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap()
    });
    Element::builder("table")
        .child(Element::builder("tbody").children(body).build().unwrap())
        .build()
        .unwrap()
}

fn mounted(tree: Element) -> (MemorySurface, RenderRoot) {
    let mut surface = MemorySurface::new();
    let mut root = RenderRoot::new(surface.container(), SchedulerConfig::default());
    root.render(tree);
    root.flush(&mut surface).unwrap();
    (surface, root)
}

fn bench_first_render_small(c: &mut Criterion) {
    let handler = Handler::new(|_| {});
    let tree = make_table(SMALL_ROWS, "edit", &handler);
    c.bench_function("bench_first_render_small", |b| {
        b.iter(|| {
            let (surface, _) = mounted(black_box(tree.clone()));
            black_box(surface.node_count());
        });
    });
}

fn bench_first_render_large(c: &mut Criterion) {
    let handler = Handler::new(|_| {});
    let tree = make_table(LARGE_ROWS, "edit", &handler);
    c.bench_function("bench_first_render_large", |b| {
        b.iter(|| {
            let (surface, _) = mounted(black_box(tree.clone()));
            black_box(surface.node_count());
        });
    });
}

fn bench_rerender_identical_large(c: &mut Criterion) {
    let handler = Handler::new(|_| {});
    let tree = make_table(LARGE_ROWS, "edit", &handler);
    c.bench_function("bench_rerender_identical_large", |b| {
        b.iter_batched(
            || mounted(tree.clone()),
            |(mut surface, mut root)| {
                root.render(black_box(tree.clone()));
                let summary = root.flush(&mut surface).unwrap();
                black_box(summary);
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_rerender_text_change_large(c: &mut Criterion) {
    let handler = Handler::new(|_| {});
    let before = make_table(LARGE_ROWS, "edit", &handler);
    let after = make_table(LARGE_ROWS, "save", &handler);
    c.bench_function("bench_rerender_text_change_large", |b| {
        b.iter_batched(
            || mounted(before.clone()),
            |(mut surface, mut root)| {
                root.render(black_box(after.clone()));
                let summary = root.flush(&mut surface).unwrap();
                black_box(summary);
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    bench_first_render_small,
    bench_first_render_large,
    bench_rerender_identical_large,
    bench_rerender_text_change_large
);
criterion_main!(benches);
