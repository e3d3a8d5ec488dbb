pub mod render_cases;

use host::{HostSnapshot, MemorySurface};

pub const RENDER_CASES_FORMAT_V1: &str = "render-cases-v1";

/// Snapshot lines of everything under the surface's container, container
/// line included.
pub fn snapshot_lines(surface: &MemorySurface) -> Vec<String> {
    let tree = surface
        .materialize_container()
        .unwrap_or_else(|err| panic!("failed to materialize container: {err}"));
    HostSnapshot::new(&tree).as_lines().to_vec()
}

#[track_caller]
pub fn assert_snapshot(label: &str, expected: &[String], actual: &[String]) {
    if expected != actual {
        panic!(
            "snapshot mismatch for {label}\n{}",
            diff_lines(expected, actual)
        );
    }
}

pub fn diff_lines(expected: &[String], actual: &[String]) -> String {
    use std::fmt::Write;

    let max = expected.len().max(actual.len());
    let missing = "<missing>";
    let line = |lines: &[String], i: usize| -> String {
        lines.get(i).map(String::as_str).unwrap_or(missing).to_string()
    };
    let mismatch = (0..max).find(|&i| line(expected, i) != line(actual, i));

    let mut out = String::new();
    match mismatch {
        Some(i) => {
            let start = i.saturating_sub(2);
            let end = (i + 3).min(max);
            let _ = writeln!(
                &mut out,
                "first mismatch at line {} (showing {}..={}):",
                i + 1,
                start + 1,
                end
            );
            for at in start..end {
                let marker = if at == i { ">" } else { " " };
                let _ = writeln!(&mut out, "{marker} {:>4}  expected: {}", at + 1, line(expected, at));
                let _ = writeln!(&mut out, "{marker} {:>4}    actual: {}", at + 1, line(actual, at));
            }
        }
        None => {
            let _ = writeln!(&mut out, "no differing line");
        }
    }
    let _ = writeln!(
        &mut out,
        "expected {} lines, actual {} lines",
        expected.len(),
        actual.len()
    );
    out
}
