//! Syntax Trees
//!
//! A [`Tree`] owns the root [`Subtree`] plus what is needed to re-parse it:
//! the language, the length of the text it describes and the scanner state
//! at end of input. [`Node`] is a cheap `Copy` view that adds the absolute
//! position a subtree has in this particular tree.

use super::cursor::TreeCursor;
use super::error::{Diagnostic, DiagnosticKind, Result};
use super::incremental::{edit_subtree, InputEdit};
use super::language::{Language, Symbol};
use super::point::{Length, Point, Range};
use super::scanner::ScannerState;
use super::subtree::Subtree;
use std::fmt;
use std::sync::Arc;

/// An immutable syntax tree
#[derive(Clone)]
pub struct Tree {
    root: Arc<Subtree>,
    language: &'static Language,
    text_len: Length,
    final_state: ScannerState,
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("language", &self.language.name())
            .field("text_len", &self.text_len.bytes)
            .field("has_error", &self.root.has_error())
            .finish()
    }
}

impl Tree {
    pub(crate) fn new(
        root: Arc<Subtree>,
        language: &'static Language,
        text_len: Length,
        final_state: ScannerState,
    ) -> Self {
        Self {
            root,
            language,
            text_len,
            final_state,
        }
    }

    /// The root node
    pub fn root_node(&self) -> Node<'_> {
        Node::new(self, &self.root, Length::ZERO)
    }

    /// A cursor positioned on the root node
    pub fn walk(&self) -> TreeCursor<'_> {
        TreeCursor::new(self.root_node())
    }

    /// Apply an edit, returning a tree whose positions describe the new text
    ///
    /// Nodes touched by the edit are copied and marked as changed; the rest
    /// are shared with `self`.
    pub fn edit(&self, edit: &InputEdit) -> Result<Tree> {
        edit.validate(self.text_len.bytes)?;
        Ok(Tree {
            root: edit_subtree(&self.root, Length::ZERO, edit),
            language: self.language,
            text_len: edit.apply_to_length(self.text_len),
            final_state: self.final_state.clone(),
        })
    }

    /// Language the tree was parsed with
    pub fn language(&self) -> &'static Language {
        self.language
    }

    /// Length of the text the tree describes
    pub fn text_len(&self) -> Length {
        self.text_len
    }

    /// Scanner state at end of input
    ///
    /// Idle unless the input ended inside a comment or string.
    pub fn final_scanner_state(&self) -> &ScannerState {
        &self.final_state
    }

    /// Whether the tree contains any error node
    pub fn has_error(&self) -> bool {
        self.root.has_error()
    }

    /// S-expression of the named nodes
    pub fn to_sexp(&self) -> String {
        self.root_node().to_sexp()
    }

    /// Every error in document order
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        if self.root.has_error() {
            collect_diagnostics(self.root_node(), &mut out);
        }
        out
    }

    pub(crate) fn root_subtree(&self) -> &Arc<Subtree> {
        &self.root
    }
}

fn collect_diagnostics(root: Node<'_>, out: &mut Vec<Diagnostic>) {
    let mut pending = vec![root];
    while let Some(node) = pending.pop() {
        if let Some(kind) = node.error_token_kind() {
            out.push(Diagnostic {
                kind,
                range: node.range(),
            });
            continue;
        }
        if node.is_error() {
            let only_bad_tokens = node
                .children()
                .all(|child| child.error_token_kind().is_some());
            if !only_bad_tokens {
                out.push(Diagnostic {
                    kind: DiagnosticKind::SyntaxError,
                    range: node.range(),
                });
            }
        }
        let mark = pending.len();
        pending.extend(
            node.children()
                .filter(|child| child.has_error() || child.error_token_kind().is_some()),
        );
        pending[mark..].reverse();
    }
}

/// A node in a [`Tree`]
#[derive(Clone, Copy)]
pub struct Node<'tree> {
    tree: &'tree Tree,
    subtree: &'tree Arc<Subtree>,
    /// Absolute position where the node's padding begins
    padded_start: Length,
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree)
            && Arc::ptr_eq(self.subtree, other.subtree)
            && self.padded_start == other.padded_start
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{Node {} {}}}", self.kind(), self.range())
    }
}

impl<'tree> Node<'tree> {
    pub(crate) fn new(tree: &'tree Tree, subtree: &'tree Arc<Subtree>, padded_start: Length) -> Self {
        Self {
            tree,
            subtree,
            padded_start,
        }
    }

    /// The underlying subtree
    #[inline]
    pub fn subtree(&self) -> &'tree Subtree {
        self.subtree
    }

    #[inline]
    pub(crate) fn tree(&self) -> &'tree Tree {
        self.tree
    }

    /// Absolute position where the node's padding begins
    #[inline]
    pub(crate) fn padded_start(&self) -> Length {
        self.padded_start
    }

    #[inline]
    fn language(&self) -> &'static Language {
        self.tree.language
    }

    /// Kind name
    pub fn kind(&self) -> &'static str {
        self.language().symbol_name(self.subtree.symbol())
    }

    /// Symbol id
    pub fn kind_id(&self) -> Symbol {
        self.subtree.symbol()
    }

    /// Named nodes appear in S-expressions; literal tokens do not
    pub fn is_named(&self) -> bool {
        self.language().is_named(self.subtree.symbol())
    }

    /// Whether this is an extra (comment)
    pub fn is_extra(&self) -> bool {
        self.subtree.is_extra()
    }

    /// Whether this is an `ERROR` node
    pub fn is_error(&self) -> bool {
        self.subtree.symbol() == self.language().error_symbol()
    }

    /// Whether this node is or contains an error
    pub fn has_error(&self) -> bool {
        self.subtree.has_error()
    }

    /// Whether an edit touched this node
    pub fn has_changes(&self) -> bool {
        self.subtree.has_changes()
    }

    /// Diagnostic kind when this node is an error token
    fn error_token_kind(&self) -> Option<DiagnosticKind> {
        if self.subtree.is_leaf() {
            DiagnosticKind::from_token_kind(self.kind())
        } else {
            None
        }
    }

    #[inline]
    fn start(&self) -> Length {
        self.padded_start + self.subtree.padding()
    }

    #[inline]
    fn end(&self) -> Length {
        self.start() + self.subtree.size()
    }

    /// Start byte offset, excluding padding
    pub fn start_byte(&self) -> usize {
        self.start().bytes
    }

    /// End byte offset
    pub fn end_byte(&self) -> usize {
        self.end().bytes
    }

    /// Start point
    pub fn start_position(&self) -> Point {
        self.start().extent
    }

    /// End point
    pub fn end_position(&self) -> Point {
        self.end().extent
    }

    /// Byte and point range
    pub fn range(&self) -> Range {
        Range::from_lengths(self.start(), self.end())
    }

    /// Number of children, named or not
    pub fn child_count(&self) -> usize {
        self.subtree.children().len()
    }

    /// Child by index
    pub fn child(&self, index: usize) -> Option<Node<'tree>> {
        let subtree: &'tree Subtree = self.subtree;
        let children = subtree.children();
        let child = children.get(index)?;
        let start = children[..index]
            .iter()
            .fold(self.padded_start, |position, sibling| {
                position + sibling.total_size()
            });
        Some(Node::new(self.tree, child, start))
    }

    /// All children in order
    pub fn children(&self) -> impl ExactSizeIterator<Item = Node<'tree>> + 'tree {
        let tree = self.tree;
        let subtree: &'tree Subtree = self.subtree;
        let mut position = self.padded_start;
        subtree.children().iter().map(move |child| {
            let node = Node::new(tree, child, position);
            position = position + child.total_size();
            node
        })
    }

    /// Number of named children
    pub fn named_child_count(&self) -> usize {
        self.children().filter(|child| child.is_named()).count()
    }

    /// Named child by index among the named children
    pub fn named_child(&self, index: usize) -> Option<Node<'tree>> {
        self.children().filter(|child| child.is_named()).nth(index)
    }

    /// Parent node, found by descending from the root
    pub fn parent(&self) -> Option<Node<'tree>> {
        find_parent(self.tree.root_node(), self)
    }

    /// Index of this node among its parent's children
    fn index_in_parent(&self, parent: &Node<'tree>) -> Option<usize> {
        parent.children().position(|child| child == *self)
    }

    /// Following sibling
    pub fn next_sibling(&self) -> Option<Node<'tree>> {
        let parent = self.parent()?;
        let index = self.index_in_parent(&parent)?;
        parent.child(index + 1)
    }

    /// Preceding sibling
    pub fn prev_sibling(&self) -> Option<Node<'tree>> {
        let parent = self.parent()?;
        let index = self.index_in_parent(&parent)?;
        parent.child(index.checked_sub(1)?)
    }

    /// Source text of the node
    pub fn utf8_text<'a>(&self, source: &'a [u8]) -> std::result::Result<&'a str, std::str::Utf8Error> {
        let end = self.end_byte().min(source.len());
        let start = self.start_byte().min(end);
        std::str::from_utf8(&source[start..end])
    }

    /// S-expression of the named nodes in this subtree
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        write_sexp(*self, &mut out);
        out
    }
}

fn find_parent<'tree>(root: Node<'tree>, target: &Node<'tree>) -> Option<Node<'tree>> {
    let target_start = target.padded_start.bytes;
    let target_end = target_start + target.subtree.total_size().bytes;
    let mut pending = vec![root];
    while let Some(node) = pending.pop() {
        let mark = pending.len();
        for child in node.children() {
            if child == *target {
                return Some(node);
            }
            let start = child.padded_start.bytes;
            let end = start + child.subtree.total_size().bytes;
            if start <= target_start && target_end <= end && child.child_count() > 0 {
                pending.push(child);
            }
            if start > target_end {
                break;
            }
        }
        pending[mark..].reverse();
    }
    None
}

enum SexpStep<'tree> {
    Open { node: Node<'tree>, nested: bool },
    Close,
}

fn write_sexp(root: Node<'_>, out: &mut String) {
    let mut steps = vec![SexpStep::Open {
        node: root,
        nested: false,
    }];
    while let Some(step) = steps.pop() {
        let (node, nested) = match step {
            SexpStep::Open { node, nested } => (node, nested),
            SexpStep::Close => {
                out.push(')');
                continue;
            }
        };
        if nested {
            out.push(' ');
        }
        out.push('(');
        out.push_str(node.kind());
        steps.push(SexpStep::Close);

        let mark = steps.len();
        steps.extend(
            node.children()
                .filter(|child| child.is_named())
                .map(|child| SexpStep::Open {
                    node: child,
                    nested: true,
                }),
        );
        steps[mark..].reverse();
    }
}
