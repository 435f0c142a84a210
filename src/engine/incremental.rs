//! Incremental Parsing Support
//!
//! Re-parsing after an edit happens in two steps:
//!
//! 1. [`Tree::edit`](super::Tree::edit) applies an [`InputEdit`] to the old
//!    tree. Only nodes whose dependency range touches the edited bytes are
//!    copied and marked as changed; every other subtree is shared with the
//!    old tree.
//! 2. [`Parser::parse`](super::Parser::parse) walks the edited tree with a
//!    [`ReusableNode`] cursor and shifts unchanged subtrees whole.
//!
//! ```text
//!  old text:  val a : int\nval b : int
//!  edit:                          ^^^ -> bool
//!
//!  compilation_unit*            (* = has_changes, copied)
//!  ├── value_specification      shared, reused whole
//!  └── value_specification*
//!      ├── lowercase_identifier shared
//!      └── type_constructor_path*
//! ```
//!
//! # Usage
//!
//! ```rust
//! use signet::engine::{InputEdit, Parser};
//! use signet::ocaml_interface;
//!
//! let mut parser = Parser::new(ocaml_interface::language());
//! let old = b"val a : int\nval b : int";
//! let tree = parser.parse(old, None).unwrap();
//!
//! let edit = InputEdit::replace(old, 20, 23, b"bool");
//! let tree = tree.edit(&edit).unwrap();
//! let tree = parser.parse(b"val a : int\nval b : bool", Some(&tree)).unwrap();
//! assert!(parser.last_stats().reused_nodes > 0);
//! # assert!(!tree.has_error());
//! ```

use super::error::{Error, Result};
use super::language::Language;
use super::point::{Length, Point};
use super::subtree::{Subtree, NO_PARSE_STATE};
use std::sync::Arc;

/// A change to the text, in old-text coordinates up to `old_end` and
/// new-text coordinates for `new_end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputEdit {
    /// Byte offset where the change starts
    pub start_byte: usize,
    /// End of the replaced text in the old input
    pub old_end_byte: usize,
    /// End of the inserted text in the new input
    pub new_end_byte: usize,
    /// Point of `start_byte`
    pub start_position: Point,
    /// Point of `old_end_byte` in the old input
    pub old_end_position: Point,
    /// Point of `new_end_byte` in the new input
    pub new_end_position: Point,
}

impl InputEdit {
    /// Create an edit from explicit offsets and points
    #[inline]
    pub fn new(
        start_byte: usize,
        old_end_byte: usize,
        new_end_byte: usize,
        start_position: Point,
        old_end_position: Point,
        new_end_position: Point,
    ) -> Self {
        Self {
            start_byte,
            old_end_byte,
            new_end_byte,
            start_position,
            old_end_position,
            new_end_position,
        }
    }

    /// Edit replacing `old_text[start..old_end]` with `replacement`
    ///
    /// Points are computed from the old text.
    pub fn replace(old_text: &[u8], start: usize, old_end: usize, replacement: &[u8]) -> Self {
        let start_position = Point::from_offset(old_text, start);
        let old_end_position = Point::from_offset(old_text, old_end.max(start));
        let new_end = Length::new(start, start_position) + Length::of(replacement);
        Self::new(
            start,
            old_end.max(start),
            new_end.bytes,
            start_position,
            old_end_position,
            new_end.extent,
        )
    }

    /// Edit inserting `text` at `offset`
    #[inline]
    pub fn insert(old_text: &[u8], offset: usize, text: &[u8]) -> Self {
        Self::replace(old_text, offset, offset, text)
    }

    /// Edit deleting `old_text[start..end]`
    #[inline]
    pub fn delete(old_text: &[u8], start: usize, end: usize) -> Self {
        Self::replace(old_text, start, end, b"")
    }

    /// Change in length
    #[inline]
    pub fn delta(&self) -> isize {
        self.new_end_byte as isize - self.old_end_byte as isize
    }

    /// Replaced range in the old text
    #[inline]
    pub fn old_range(&self) -> std::ops::Range<usize> {
        self.start_byte..self.old_end_byte
    }

    /// Start as a length from the beginning of the text
    #[inline]
    pub fn start(&self) -> Length {
        Length::new(self.start_byte, self.start_position)
    }

    /// Old end as a length from the beginning of the old text
    #[inline]
    pub fn old_end(&self) -> Length {
        Length::new(self.old_end_byte, self.old_end_position)
    }

    /// New end as a length from the beginning of the new text
    #[inline]
    pub fn new_end(&self) -> Length {
        Length::new(self.new_end_byte, self.new_end_position)
    }

    /// Map an old-text position to the new text
    ///
    /// Positions inside the replaced range collapse onto its new end.
    pub fn translate(&self, position: Length) -> Length {
        if position.bytes <= self.start_byte {
            position
        } else if position.bytes <= self.old_end_byte {
            self.new_end()
        } else {
            self.new_end() + (position - self.old_end())
        }
    }

    /// Check the edit against the length of the text it applies to
    pub fn validate(&self, text_len: usize) -> Result<()> {
        if self.start_byte > self.old_end_byte {
            return Err(Error::invalid_edit(format!(
                "start {} is after old end {}",
                self.start_byte, self.old_end_byte
            )));
        }
        if self.old_end_byte > text_len {
            return Err(Error::invalid_edit(format!(
                "old end {} is past the end of the text ({} bytes)",
                self.old_end_byte, text_len
            )));
        }
        if self.start_byte > self.new_end_byte {
            return Err(Error::invalid_edit(format!(
                "start {} is after new end {}",
                self.start_byte, self.new_end_byte
            )));
        }
        Ok(())
    }

    /// Length of the text after the edit, given its length before
    pub(crate) fn apply_to_length(&self, text_len: Length) -> Length {
        self.new_end() + (text_len - self.old_end())
    }
}

#[inline]
fn later(a: Length, b: Length) -> Length {
    if a.bytes >= b.bytes {
        a
    } else {
        b
    }
}

/// Apply `edit` to `node`, whose padding begins at `padded_start`
///
/// Nodes whose range `[padded_start, end + lookahead_bytes]` misses the edit
/// are returned as-is; the rest are copied with `has_changes` set and their
/// extents translated. The walk keeps its own stack, so tree depth is not
/// limited by the thread's stack.
pub(crate) fn edit_subtree(
    node: &Arc<Subtree>,
    padded_start: Length,
    edit: &InputEdit,
) -> Arc<Subtree> {
    let mut stack: Vec<EditFrame> = Vec::new();
    let mut finished = begin_edit(node, padded_start, edit, &mut stack);

    while let Some(frame) = stack.last_mut() {
        if let Some(child) = finished.take() {
            frame.edited.children.push(child);
        }
        match frame.source.children.get(frame.edited.children.len()).cloned() {
            Some(child) => {
                let child_start = frame.position;
                frame.position = frame.position + child.total_size();
                finished = begin_edit(&child, child_start, edit, &mut stack);
            }
            None => finished = stack.pop().map(EditFrame::finish),
        }
    }

    finished.unwrap_or_else(|| Arc::clone(node))
}

/// An interior node whose children are being edited
struct EditFrame {
    source: Arc<Subtree>,
    /// Copy of `source` collecting the edited children
    edited: Subtree,
    /// Absolute padded start of the next child
    position: Length,
}

impl EditFrame {
    fn finish(mut self) -> Arc<Subtree> {
        let total = self
            .edited
            .children
            .iter()
            .fold(Length::ZERO, |total, child| total + child.total_size());
        self.edited.padding = self
            .edited
            .children
            .first()
            .map_or(Length::ZERO, |first| first.padding);
        self.edited.size = total - self.edited.padding;
        Arc::new(self.edited)
    }
}

/// Edit `node` if it is a leaf or untouched; otherwise push a frame for its
/// children and return `None`
fn begin_edit(
    node: &Arc<Subtree>,
    padded_start: Length,
    edit: &InputEdit,
    stack: &mut Vec<EditFrame>,
) -> Option<Arc<Subtree>> {
    let start = padded_start + node.padding;
    let end = start + node.size;
    if end.bytes + node.lookahead_bytes < edit.start_byte || padded_start.bytes > edit.old_end_byte
    {
        return Some(Arc::clone(node));
    }

    let mut edited = Subtree::clone(node);
    edited.has_changes = true;

    if node.children.is_empty() {
        let new_padded_start = edit.translate(padded_start);
        let new_start = later(edit.translate(start), new_padded_start);
        let new_end = later(edit.translate(end), new_start);
        edited.padding = new_start - new_padded_start;
        edited.size = new_end - new_start;
        return Some(Arc::new(edited));
    }

    edited.children = Vec::with_capacity(node.children.len());
    stack.push(EditFrame {
        source: Arc::clone(node),
        edited,
        position: padded_start,
    });
    None
}

/// One level of the [`ReusableNode`] path
#[derive(Debug, Clone)]
struct PathEntry {
    node: Arc<Subtree>,
    /// Absolute position where the node's padding begins
    start: Length,
    /// Index of the node among its parent's children
    child_index: usize,
}

/// Document-order cursor over the old tree, offering subtrees that may be
/// shifted whole
#[derive(Debug)]
pub(crate) struct ReusableNode {
    language: &'static Language,
    path: Vec<PathEntry>,
}

impl ReusableNode {
    pub fn new(root: Arc<Subtree>, language: &'static Language) -> Self {
        let mut path = Vec::with_capacity(root.depth());
        path.push(PathEntry {
            node: root,
            start: Length::ZERO,
            child_index: 0,
        });
        Self { language, path }
    }

    /// Move past the current node to the next one in document order
    pub fn advance(&mut self) {
        while let Some(current) = self.path.pop() {
            let Some(parent) = self.path.last() else {
                return;
            };
            let next = current.child_index + 1;
            if let Some(sibling) = parent.node.children.get(next) {
                let sibling = Arc::clone(sibling);
                self.path.push(PathEntry {
                    node: sibling,
                    start: current.start + current.node.total_size(),
                    child_index: next,
                });
                return;
            }
        }
    }

    fn descend(&mut self) {
        let Some(current) = self.path.last() else {
            return;
        };
        let Some(first) = current.node.children.first() else {
            return;
        };
        let entry = PathEntry {
            node: Arc::clone(first),
            start: current.start,
            child_index: 0,
        };
        self.path.push(entry);
    }

    /// The largest reusable subtree whose padding begins exactly at `position`
    ///
    /// Skips everything that ends at or before `position`. Returns `None`
    /// when the next old node starts after it.
    pub fn candidate_at(&mut self, position: usize) -> Option<Arc<Subtree>> {
        while let Some(current) = self.path.last() {
            let start = current.start.bytes;
            let end = start + current.node.total_size().bytes;
            let childless = current.node.children.is_empty();

            if start > position {
                return None;
            }
            if start == position && self.is_reusable(&current.node) {
                return Some(Arc::clone(&current.node));
            }
            if (start < position && end <= position) || childless {
                self.advance();
            } else {
                self.descend();
            }
        }
        None
    }

    fn is_reusable(&self, node: &Subtree) -> bool {
        !node.leaf
            && !node.children.is_empty()
            && node.symbol != self.language.error_symbol()
            && self.language.is_visible(node.symbol)
            && !node.has_changes
            && !node.has_error
            && !node.fragile
            && node.parse_state != NO_PARSE_STATE
            && !node.total_size().is_empty()
            && node.first_leaf().is_some_and(|leaf| !leaf.extra)
    }
}
