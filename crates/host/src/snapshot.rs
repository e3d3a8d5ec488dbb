use crate::node::HostNode;
use std::fmt::{self, Write};

/// Deterministic line-based rendering of a host tree for test comparisons.
/// Not a stable format.
///
/// Rules:
/// - One line per node, two spaces of indent per depth level.
/// - Elements render as `<name attr="value" @event>`; attribute and listener
///   order is the host order.
/// - Text renders as a quoted, escaped string.
/// - Host keys are omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSnapshot {
    lines: Vec<String>,
}

impl HostSnapshot {
    pub fn new(root: &HostNode) -> Self {
        let mut lines = Vec::new();
        walk_snapshot(root, 0, &mut lines);
        Self { lines }
    }

    pub fn as_lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for HostSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i != 0 {
                f.write_str("\n")?;
            }
            f.write_str(line)?;
        }
        Ok(())
    }
}

fn walk_snapshot(node: &HostNode, depth: usize, out: &mut Vec<String>) {
    let mut line = "  ".repeat(depth);
    match node {
        HostNode::Element {
            name,
            attributes,
            listeners,
            children,
            ..
        } => {
            line.push('<');
            line.push_str(name);
            for (key, value) in attributes {
                let _ = write!(&mut line, " {key}=\"{}\"", escape_text(value));
            }
            for event in listeners {
                let _ = write!(&mut line, " @{event}");
            }
            line.push('>');
            out.push(line);
            for child in children {
                walk_snapshot(child, depth + 1, out);
            }
        }
        HostNode::Text { text, .. } => {
            let _ = write!(&mut line, "\"{}\"", escape_text(text));
            out.push(line);
        }
    }
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch < ' ' => {
                let _ = write!(&mut out, "\\u{{{:02X}}}", ch as u32);
            }
            _ => out.push(ch),
        }
    }
    out
}
