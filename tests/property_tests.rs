//! Property-based tests using proptest
//!
//! These tests check invariants that must hold for every input: parsing never
//! fails on malformed text, node ranges nest, and an incremental re-parse is
//! indistinguishable from parsing the new text from scratch.

use proptest::prelude::*;
use signet::engine::{InputEdit, Node, Parser, Range, Tree};
use signet::ocaml_interface;

/// Kind and range of every node, in preorder
fn shape(tree: &Tree) -> Vec<(&'static str, Range)> {
    let mut out = Vec::new();
    let mut cursor = tree.walk();
    'walk: loop {
        let node = cursor.node();
        out.push((node.kind(), node.range()));
        if cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                break 'walk;
            }
        }
    }
    out
}

fn check_containment(node: Node<'_>) -> Result<(), TestCaseError> {
    prop_assert!(node.start_byte() <= node.end_byte());
    if let (Some(first), Some(last)) = (node.children().next(), node.children().last()) {
        prop_assert_eq!(first.start_byte(), node.start_byte(), "{} does not start at its first child", node.kind());
        prop_assert_eq!(last.end_byte(), node.end_byte(), "{} does not end at its last child", node.kind());
    }
    let mut previous_end = node.start_byte();
    for child in node.children() {
        prop_assert!(child.start_byte() >= previous_end, "{} overlaps its sibling", child.kind());
        prop_assert!(child.end_byte() <= node.end_byte(), "{} escapes {}", child.kind(), node.kind());
        prop_assert!(child.start_position() <= child.end_position());
        previous_end = child.end_byte();
        check_containment(child)?;
    }
    Ok(())
}

/// Source fragments that combine into plausible, and often broken, interfaces
fn fragment() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "val x : int\n",
        "val f : 'a -> 'a list\n",
        "type t = A | B of int\n",
        "type r = { mutable x : int; y : string }\n",
        "module M : sig val y : bool end\n",
        "module type S = sig type t end\n",
        "exception E of int * string\n",
        "external g : int -> int = \"g\"\n",
        "open M.N\n",
        "(* comment (* nested *) *)\n",
        "(* open ",
        " *)",
        "\"str",
        "{|q|}",
        "{id|x|id}",
        "val ( + ) : int -> int -> int\n",
        "$",
        " ",
        "\n",
        "end",
        "sig",
        ":",
    ])
}

fn document() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment(), 0..12).prop_map(|parts| parts.concat())
}

fn parse(text: &[u8]) -> Tree {
    Parser::new(ocaml_interface::language())
        .parse(text, None)
        .unwrap()
}

// =============================================================================
// Totality
// =============================================================================

proptest! {
    /// Any byte sequence parses to a tree covering the input
    #[test]
    fn test_any_bytes_parse(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let tree = parse(&bytes);
        prop_assert_eq!(tree.text_len().bytes, bytes.len());
        prop_assert!(tree.root_node().end_byte() <= bytes.len());
        prop_assert_eq!(tree.root_node().kind(), "compilation_unit");
    }

    /// Every node lies inside its parent and siblings never overlap
    #[test]
    fn test_ranges_nest(text in document()) {
        let tree = parse(text.as_bytes());
        check_containment(tree.root_node())?;
    }

    /// Parsing the same text twice gives the same tree
    #[test]
    fn test_parse_is_deterministic(text in document()) {
        let first = parse(text.as_bytes());
        let second = parse(text.as_bytes());
        prop_assert_eq!(shape(&first), shape(&second));
        prop_assert_eq!(first.final_scanner_state(), second.final_scanner_state());
    }
}

// =============================================================================
// Incremental Equivalence
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Re-parsing after an edit equals parsing the new text from scratch
    #[test]
    fn test_incremental_matches_fresh(
        text in document(),
        start in 0usize..512,
        len in 0usize..16,
        replacement in prop::collection::vec(fragment(), 0..3),
    ) {
        let old = text.as_bytes();
        let start = start.min(old.len());
        let old_end = (start + len).min(old.len());
        let replacement = replacement.concat();

        let mut new = old[..start].to_vec();
        new.extend_from_slice(replacement.as_bytes());
        new.extend_from_slice(&old[old_end..]);

        let mut parser = Parser::new(ocaml_interface::language());
        let old_tree = parser.parse(old, None).unwrap();
        let edited = old_tree
            .edit(&InputEdit::replace(old, start, old_end, replacement.as_bytes()))
            .unwrap();
        let incremental = parser.parse(&new, Some(&edited)).unwrap();
        let fresh = parse(&new);

        prop_assert_eq!(incremental.to_sexp(), fresh.to_sexp());
        prop_assert_eq!(shape(&incremental), shape(&fresh));
        prop_assert_eq!(incremental.final_scanner_state(), fresh.final_scanner_state());
    }

    /// Re-parsing unchanged text against its own tree changes nothing
    #[test]
    fn test_reparse_without_edit_is_identity(text in document()) {
        let mut parser = Parser::new(ocaml_interface::language());
        let tree = parser.parse(text.as_bytes(), None).unwrap();
        let again = parser.parse(text.as_bytes(), Some(&tree)).unwrap();
        prop_assert_eq!(shape(&tree), shape(&again));
        prop_assert_eq!(tree.final_scanner_state(), again.final_scanner_state());
    }
}
