//! Developer Experience Tools
//!
//! [`TreePrinter`] dumps a tree one node per line, indented by depth, with
//! ranges and (for tokens) the source text. Useful when a test's
//! S-expression comparison fails and positions matter.

use super::tree::Node;
use std::fmt::Write;

/// Parse tree pretty printer
pub struct TreePrinter {
    /// Indentation string
    indent: String,
    /// Maximum depth to print
    max_depth: Option<usize>,
    /// Include literal tokens such as keywords and punctuation
    anonymous: bool,
}

impl TreePrinter {
    /// Create a new tree printer
    pub fn new() -> Self {
        Self {
            indent: "  ".to_string(),
            max_depth: None,
            anonymous: true,
        }
    }

    /// Set the indentation string
    pub fn indent(mut self, indent: &str) -> Self {
        self.indent = indent.to_string();
        self
    }

    /// Set the maximum depth to print
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Print only named nodes
    pub fn named_only(mut self) -> Self {
        self.anonymous = false;
        self
    }

    /// Print `node` and its descendants
    pub fn print(&self, node: Node<'_>, source: &[u8]) -> String {
        let mut output = String::new();
        let mut pending = vec![(node, 0)];
        while let Some((node, depth)) = pending.pop() {
            if !self.print_node(node, source, depth, &mut output) {
                continue;
            }
            let mark = pending.len();
            pending.extend(
                node.children()
                    .filter(|child| self.anonymous || child.is_named())
                    .map(|child| (child, depth + 1)),
            );
            pending[mark..].reverse();
        }
        output
    }

    /// Write one line for `node`; returns whether its children follow
    fn print_node(&self, node: Node<'_>, source: &[u8], depth: usize, output: &mut String) -> bool {
        let indent = self.indent.repeat(depth);
        if let Some(max) = self.max_depth {
            if depth > max {
                let _ = writeln!(output, "{}...", indent);
                return false;
            }
        }

        let _ = write!(output, "{}{} {}", indent, node.kind(), node.range());
        if node.child_count() == 0 {
            let end = node.end_byte().min(source.len());
            let start = node.start_byte().min(end);
            let _ = write!(
                output,
                " {:?}",
                String::from_utf8_lossy(&source[start..end])
            );
        }
        if node.has_changes() {
            output.push_str(" *");
        }
        output.push('\n');
        true
    }
}

impl Default for TreePrinter {
    fn default() -> Self {
        Self::new()
    }
}
