//! Syntax Nodes
//!
//! A [`Subtree`] is an immutable syntax node shared through `Arc`. Nodes never
//! point at their parent, so a re-parse can hand unchanged subtrees to a new
//! tree without copying them and without creating cycles.
//!
//! Extents are relative: `padding` is the whitespace before the node and
//! `size` the node itself. A node's absolute position is the sum of the
//! total sizes of everything before it, which is what lets an edit leave the
//! nodes after it untouched.
//!
//! Besides shape, every node records what the incremental re-parser needs:
//! the automaton state its first token was shifted in, the scanner state
//! before its first token and after its last one, and how many bytes past
//! its end the parse looked before the node was complete.

use super::language::{Language, StateId, Symbol};
use super::point::Length;
use super::scanner::{ScannerState, Token};
use std::sync::Arc;

/// Marker for nodes that were never shifted from a known state
pub const NO_PARSE_STATE: StateId = StateId::MAX;

/// An immutable, reference-counted syntax node
#[derive(Debug, Clone)]
pub struct Subtree {
    pub(crate) symbol: Symbol,
    pub(crate) padding: Length,
    pub(crate) size: Length,
    pub(crate) lookahead_bytes: usize,
    pub(crate) parse_state: StateId,
    pub(crate) leaf: bool,
    pub(crate) extra: bool,
    pub(crate) has_changes: bool,
    pub(crate) has_error: bool,
    pub(crate) fragile: bool,
    pub(crate) depth: u32,
    pub(crate) scan_start: ScannerState,
    pub(crate) scan_end: ScannerState,
    pub(crate) children: Vec<Arc<Subtree>>,
}

impl Subtree {
    /// Build a leaf from a scanned token
    pub(crate) fn leaf(token: Token, parse_state: StateId, language: &Language) -> Self {
        Self {
            symbol: token.symbol,
            padding: token.padding,
            size: token.size,
            lookahead_bytes: token.lookahead_bytes,
            parse_state,
            leaf: true,
            extra: language.is_extra(token.symbol),
            has_changes: false,
            has_error: false,
            fragile: false,
            depth: 1,
            scan_start: token.scan_start,
            scan_end: token.scan_end,
            children: Vec::new(),
        }
    }

    /// Build an interior node
    ///
    /// Hidden children are replaced by their own children. `start` is the
    /// absolute position where the node's padding begins and
    /// `dependency_end` the furthest absolute byte the reduction looked at.
    /// `scan_state` is used as both scanner states when there are no
    /// children.
    pub(crate) fn node(
        language: &Language,
        symbol: Symbol,
        children: Vec<Arc<Subtree>>,
        start: Length,
        dependency_end: usize,
        parse_state: StateId,
        scan_state: &ScannerState,
    ) -> Self {
        let error_symbol = language.error_symbol();
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            if !child.leaf && child.symbol != error_symbol && !language.is_visible(child.symbol) {
                flat.extend(child.children.iter().cloned());
            } else {
                flat.push(child);
            }
        }

        let mut total = Length::ZERO;
        let mut dependency = dependency_end;
        let mut depth = 0;
        let mut has_error = symbol == error_symbol;
        for child in &flat {
            total = total + child.total_size();
            dependency = dependency.max(start.bytes + total.bytes + child.lookahead_bytes);
            depth = depth.max(child.depth);
            has_error |= child.has_error || child.symbol == error_symbol;
        }

        let (padding, scan_start, scan_end) = match (flat.first(), flat.last()) {
            (Some(first), Some(last)) => (
                first.padding,
                first.scan_start.clone(),
                last.scan_end.clone(),
            ),
            _ => (Length::ZERO, scan_state.clone(), scan_state.clone()),
        };
        let end = start.bytes + total.bytes;

        Self {
            symbol,
            padding,
            size: total - padding,
            lookahead_bytes: dependency.saturating_sub(end),
            parse_state,
            leaf: false,
            extra: false,
            has_changes: false,
            has_error,
            fragile: false,
            depth: depth + 1,
            scan_start,
            scan_end,
            children: flat,
        }
    }

    /// Grammar symbol
    #[inline]
    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    /// Whitespace before the node
    #[inline]
    pub fn padding(&self) -> Length {
        self.padding
    }

    /// Extent of the node, excluding padding
    #[inline]
    pub fn size(&self) -> Length {
        self.size
    }

    /// Padding plus size
    #[inline]
    pub fn total_size(&self) -> Length {
        self.padding + self.size
    }

    /// Bytes past the end the parse depended on
    #[inline]
    pub fn lookahead_bytes(&self) -> usize {
        self.lookahead_bytes
    }

    /// Automaton state the node's first token was shifted in
    #[inline]
    pub fn parse_state(&self) -> StateId {
        self.parse_state
    }

    /// Whether this is a token
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.leaf
    }

    /// Whether this is an extra (comment)
    #[inline]
    pub fn is_extra(&self) -> bool {
        self.extra
    }

    /// Whether an edit touched this node
    #[inline]
    pub fn has_changes(&self) -> bool {
        self.has_changes
    }

    /// Whether this node is or contains an error
    #[inline]
    pub fn has_error(&self) -> bool {
        self.has_error
    }

    /// Whether the node was completed after error recovery rearranged the
    /// stack around it
    #[inline]
    pub fn is_fragile(&self) -> bool {
        self.fragile
    }

    /// Height of the subtree (a leaf has depth 1)
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth as usize
    }

    /// Scanner state before the first token
    #[inline]
    pub fn scan_start(&self) -> &ScannerState {
        &self.scan_start
    }

    /// Scanner state after the last token
    #[inline]
    pub fn scan_end(&self) -> &ScannerState {
        &self.scan_end
    }

    /// Child nodes
    #[inline]
    pub fn children(&self) -> &[Arc<Subtree>] {
        &self.children
    }

    /// First token of the subtree, if any
    pub fn first_leaf(&self) -> Option<&Subtree> {
        let mut node = self;
        while !node.leaf {
            node = node.children.first()?;
        }
        Some(node)
    }
}

impl Drop for Subtree {
    // Unlinks uniquely owned descendants one at a time, so dropping a
    // deep tree does not recurse once per level
    fn drop(&mut self) {
        if self.children.is_empty() {
            return;
        }
        let mut pending = std::mem::take(&mut self.children);
        while let Some(child) = pending.pop() {
            if let Ok(mut node) = Arc::try_unwrap(child) {
                pending.append(&mut node.children);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::point::Point;
    use crate::ocaml_interface::{self, symbols::*};

    fn token(symbol: Symbol, at: usize, padding: usize, size: usize, lookahead: usize) -> Token {
        Token {
            symbol,
            position: Length::new(at, Point::new(0, at)),
            padding: Length::new(padding, Point::new(0, padding)),
            size: Length::new(size, Point::new(0, size)),
            lookahead_bytes: lookahead,
            scan_start: ScannerState::new(),
            scan_end: ScannerState::new(),
        }
    }

    #[test]
    fn test_node_extent_from_children() {
        let language = ocaml_interface::language();
        // "  x y" as two identifiers
        let a = Arc::new(Subtree::leaf(token(LIDENT, 0, 2, 1, 1), 7, language));
        let b = Arc::new(Subtree::leaf(token(LIDENT, 3, 1, 1, 1), 9, language));
        let node = Subtree::node(
            language,
            TYPE_CONSTRUCTOR_PATH,
            vec![a, b],
            Length::ZERO,
            5,
            7,
            &ScannerState::new(),
        );
        assert_eq!(node.padding().bytes, 2);
        assert_eq!(node.size().bytes, 3);
        assert_eq!(node.total_size().bytes, 5);
        // Last child peeked one byte past the end
        assert_eq!(node.lookahead_bytes(), 1);
        assert_eq!(node.parse_state(), 7);
        assert_eq!(node.depth(), 2);
        assert!(!node.has_error());
        assert_eq!(node.first_leaf().map(|l| l.symbol()), Some(LIDENT));
    }

    #[test]
    fn test_hidden_children_are_spliced() {
        let language = ocaml_interface::language();
        let a = Arc::new(Subtree::leaf(token(LIDENT, 0, 0, 1, 1), 0, language));
        let hidden = Arc::new(Subtree::node(
            language,
            AUX_SIMPLE_TYPE,
            vec![a],
            Length::ZERO,
            0,
            0,
            &ScannerState::new(),
        ));
        let outer = Subtree::node(
            language,
            PARENTHESIZED_TYPE,
            vec![hidden],
            Length::ZERO,
            0,
            0,
            &ScannerState::new(),
        );
        assert_eq!(outer.children().len(), 1);
        assert!(outer.children()[0].is_leaf());
    }

    #[test]
    fn test_error_nodes_mark_ancestors() {
        let language = ocaml_interface::language();
        let bad = Arc::new(Subtree::leaf(token(INVALID_CHARACTER, 0, 0, 1, 0), 0, language));
        let error = Arc::new(Subtree::node(
            language,
            ERROR,
            vec![bad],
            Length::ZERO,
            0,
            0,
            &ScannerState::new(),
        ));
        assert!(error.has_error());
        let root = Subtree::node(
            language,
            COMPILATION_UNIT,
            vec![error],
            Length::ZERO,
            0,
            0,
            &ScannerState::new(),
        );
        assert!(root.has_error());
        assert_eq!(root.children()[0].symbol(), ERROR);
    }

    #[test]
    fn test_dropping_deep_chain() {
        let language = ocaml_interface::language();
        let mut node = Arc::new(Subtree::leaf(token(LIDENT, 0, 0, 1, 0), 0, language));
        for _ in 0..200_000 {
            node = Arc::new(Subtree::node(
                language,
                PARENTHESIZED_TYPE,
                vec![node],
                Length::ZERO,
                0,
                0,
                &ScannerState::new(),
            ));
        }
        assert_eq!(node.depth(), 200_001);

        // A shared inner node outlives the root
        let mut inner = &node;
        for _ in 0..100_000 {
            inner = &inner.children()[0];
        }
        let inner = Arc::clone(inner);
        drop(node);
        assert_eq!(Arc::strong_count(&inner), 1);
        assert_eq!(inner.depth(), 100_001);
    }

    #[test]
    fn test_empty_node_takes_scan_state() {
        let language = ocaml_interface::language();
        let state = ScannerState::from_bytes(&[2]);
        let node = Subtree::node(
            language,
            COMPILATION_UNIT,
            Vec::new(),
            Length::new(4, Point::new(0, 4)),
            5,
            0,
            &state,
        );
        assert_eq!(node.total_size(), Length::ZERO);
        assert_eq!(node.lookahead_bytes(), 1);
        assert_eq!(node.scan_start(), &state);
        assert!(node.first_leaf().is_none());
    }
}
