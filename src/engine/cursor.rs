//! # Cursor API for Tree Navigation
//!
//! A [`TreeCursor`] keeps the path from the node it started on to the
//! current node. Moving down, across or up only pushes, replaces or pops one
//! frame, and the path is allocated once for the height of the tree, so a
//! full traversal never allocates.
//!
//! ## Usage
//!
//! ```rust
//! use signet::engine::Parser;
//! use signet::ocaml_interface;
//!
//! let tree = Parser::new(ocaml_interface::language())
//!     .parse(b"val x : int", None)
//!     .unwrap();
//! let mut cursor = tree.walk();
//!
//! assert!(cursor.goto_first_child());
//! assert_eq!(cursor.node().kind(), "value_specification");
//! assert!(cursor.goto_first_child());
//! let mut kinds = vec![cursor.node().kind()];
//! while cursor.goto_next_sibling() {
//!     kinds.push(cursor.node().kind());
//! }
//! assert_eq!(kinds, ["val", "lowercase_identifier", ":", "type_constructor_path"]);
//! assert!(cursor.goto_parent());
//! assert_eq!(cursor.depth(), 1);
//! ```

use super::point::Length;
use super::tree::Node;

/// A frame in the cursor's navigation stack
#[derive(Debug, Clone, Copy)]
struct CursorFrame<'tree> {
    node: Node<'tree>,
    /// Index among the parent's children
    child_index: usize,
}

/// Stateful depth-first navigation over a [`Tree`](super::Tree)
#[derive(Debug, Clone)]
pub struct TreeCursor<'tree> {
    /// Navigation stack (starting node at index 0)
    stack: Vec<CursorFrame<'tree>>,
}

impl<'tree> TreeCursor<'tree> {
    /// Create a cursor on `node`
    pub fn new(node: Node<'tree>) -> Self {
        let mut stack = Vec::with_capacity(node.subtree().depth().max(1));
        stack.push(CursorFrame {
            node,
            child_index: 0,
        });
        Self { stack }
    }

    fn current(&self) -> &CursorFrame<'tree> {
        // The starting frame is never popped
        &self.stack[self.stack.len() - 1]
    }

    /// The current node
    pub fn node(&self) -> Node<'tree> {
        self.current().node
    }

    /// Distance from the starting node
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    /// Restart at `node`, keeping the allocation
    pub fn reset(&mut self, node: Node<'tree>) {
        self.stack.clear();
        self.stack.reserve(node.subtree().depth());
        self.stack.push(CursorFrame {
            node,
            child_index: 0,
        });
    }

    /// Move to the first child
    ///
    /// Returns `false` and stays put when the node has no children.
    pub fn goto_first_child(&mut self) -> bool {
        match self.node().child(0) {
            Some(child) => {
                self.stack.push(CursorFrame {
                    node: child,
                    child_index: 0,
                });
                true
            }
            None => false,
        }
    }

    /// Move to the next sibling
    ///
    /// Returns `false` at the last child or at the starting node.
    pub fn goto_next_sibling(&mut self) -> bool {
        if self.stack.len() < 2 {
            return false;
        }
        let current = *self.current();
        let parent = self.stack[self.stack.len() - 2].node;
        let next_index = current.child_index + 1;
        let Some(sibling) = parent.subtree().children().get(next_index) else {
            return false;
        };
        let padded_start = current.node_padded_end();
        let last = self.stack.len() - 1;
        self.stack[last] = CursorFrame {
            node: Node::new(parent.tree(), sibling, padded_start),
            child_index: next_index,
        };
        true
    }

    /// Move to the parent
    ///
    /// Returns `false` at the starting node.
    pub fn goto_parent(&mut self) -> bool {
        if self.stack.len() < 2 {
            return false;
        }
        self.stack.pop();
        true
    }
}

impl CursorFrame<'_> {
    fn node_padded_end(&self) -> Length {
        self.node.padded_start() + self.node.subtree().total_size()
    }
}
