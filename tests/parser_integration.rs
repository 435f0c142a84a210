//! Integration tests for the OCaml interface parser
//!
//! These tests cover full parses through the public API:
//! - Declarations of every kind
//! - Scanner state for comments and strings
//! - Error recovery and diagnostics
//! - Tree navigation

use signet::engine::{DiagnosticKind, InputEdit, Node, Parser, Tree};
use signet::ocaml_interface;

fn parse(text: &str) -> Tree {
    Parser::new(ocaml_interface::language())
        .parse(text.as_bytes(), None)
        .unwrap()
}

fn count_kind(node: Node<'_>, kind: &str) -> usize {
    let own = usize::from(node.kind() == kind);
    own + node.children().map(|child| count_kind(child, kind)).sum::<usize>()
}

fn find_kind<'tree>(node: Node<'tree>, kind: &str) -> Option<Node<'tree>> {
    if node.kind() == kind {
        return Some(node);
    }
    node.children().find_map(|child| find_kind(child, kind))
}

// ============================================================================
// Declarations
// ============================================================================

#[test]
fn test_type_with_parameters() {
    assert_eq!(
        parse("type ('a, 'b) t = 'a list").to_sexp(),
        "(compilation_unit (type_definition (type_binding (type_parameters \
         (type_variable) (type_variable)) (lowercase_identifier) \
         (constructed_type (type_variable) (type_constructor_path (lowercase_identifier))))))"
    );
}

#[test]
fn test_variant_type() {
    assert_eq!(
        parse("type t = A | B of int").to_sexp(),
        "(compilation_unit (type_definition (type_binding (lowercase_identifier) \
         (variant_declaration (constructor_declaration (capitalized_identifier)) \
         (constructor_declaration (capitalized_identifier) \
         (type_constructor_path (lowercase_identifier)))))))"
    );
}

#[test]
fn test_record_type() {
    assert_eq!(
        parse("type t = { mutable x : int; y : string }").to_sexp(),
        "(compilation_unit (type_definition (type_binding (lowercase_identifier) \
         (record_declaration (field_declaration (lowercase_identifier) \
         (type_constructor_path (lowercase_identifier))) \
         (field_declaration (lowercase_identifier) \
         (type_constructor_path (lowercase_identifier)))))))"
    );
}

#[test]
fn test_exception_with_tuple() {
    assert_eq!(
        parse("exception E of int * string").to_sexp(),
        "(compilation_unit (exception_definition (constructor_declaration \
         (capitalized_identifier) (tuple_type (type_constructor_path (lowercase_identifier)) \
         (type_constructor_path (lowercase_identifier))))))"
    );
}

#[test]
fn test_labeled_arguments() {
    assert_eq!(
        parse("val f : ?x:int -> y:int -> int").to_sexp(),
        "(compilation_unit (value_specification (lowercase_identifier) \
         (function_type (labeled_argument (lowercase_identifier) \
         (type_constructor_path (lowercase_identifier))) \
         (function_type (labeled_argument (lowercase_identifier) \
         (type_constructor_path (lowercase_identifier))) \
         (type_constructor_path (lowercase_identifier))))))"
    );
}

#[test]
fn test_external() {
    assert_eq!(
        parse("external f : int -> int = \"f\"").to_sexp(),
        "(compilation_unit (external (lowercase_identifier) \
         (function_type (type_constructor_path (lowercase_identifier)) \
         (type_constructor_path (lowercase_identifier))) (string)))"
    );
}

#[test]
fn test_operator_name() {
    assert_eq!(
        parse("val ( + ) : int -> int -> int").to_sexp(),
        "(compilation_unit (value_specification (parenthesized_operator (operator)) \
         (function_type (type_constructor_path (lowercase_identifier)) \
         (function_type (type_constructor_path (lowercase_identifier)) \
         (type_constructor_path (lowercase_identifier))))))"
    );
}

#[test]
fn test_module_paths() {
    assert_eq!(
        parse("open M.N").to_sexp(),
        "(compilation_unit (open_module (module_path (module_path \
         (capitalized_identifier)) (capitalized_identifier))))"
    );
    assert_eq!(
        parse("module type S = sig end").to_sexp(),
        "(compilation_unit (module_type_definition (capitalized_identifier) (signature)))"
    );
}

#[test]
fn test_whitespace_is_padding() {
    let tree = parse("  val x : int  ");
    let item = tree.root_node().child(0).unwrap();
    assert_eq!(item.kind(), "value_specification");
    assert_eq!(item.start_byte(), 2);
    assert_eq!(item.end_byte(), 13);
    assert_eq!(tree.text_len().bytes, 15);
}

#[test]
fn test_positions_across_lines() {
    let source = "module M : sig\n  type t\n  val compare : t -> t -> int\nend";
    let tree = parse(source);
    assert!(!tree.has_error());

    let decl = find_kind(tree.root_node(), "value_specification").unwrap();
    assert_eq!(decl.start_position().row, 2);
    assert_eq!(decl.start_position().column, 2);
    assert_eq!(decl.utf8_text(source.as_bytes()).unwrap(), "val compare : t -> t -> int");
    assert_eq!(decl.parent().unwrap().kind(), "signature");
}

// ============================================================================
// Scanner State
// ============================================================================

#[test]
fn test_balanced_nested_comments_leave_idle_state() {
    let tree = parse("(* a (* b *) c *) val x : int");
    assert!(!tree.has_error());
    assert!(tree.final_scanner_state().is_idle());
    assert_eq!(tree.root_node().child(0).unwrap().kind(), "comment");
}

#[test]
fn test_missing_comment_close_spans_to_eof() {
    let source = "(* a (* b *) c val x : int";
    let tree = parse(source);
    assert_eq!(count_kind(tree.root_node(), "unterminated_comment"), 1);

    let token = find_kind(tree.root_node(), "unterminated_comment").unwrap();
    assert_eq!(token.start_byte(), 0);
    assert_eq!(token.end_byte(), source.len());
    assert_eq!(tree.final_scanner_state().as_bytes(), &[1, 1, 0, 0, 0]);
}

#[test]
fn test_string_inside_comment_hides_close() {
    let tree = parse("val s : string\n(* \"str *) val t : int");
    assert_eq!(
        tree.to_sexp(),
        "(compilation_unit (value_specification (lowercase_identifier) \
         (type_constructor_path (lowercase_identifier))) (ERROR (unterminated_comment)))"
    );
}

// ============================================================================
// Error Recovery
// ============================================================================

#[test]
fn test_unterminated_string_after_module() {
    let source = "module M : sig val x : int end \"abc";
    let tree = parse(source);
    let root = tree.root_node();

    let kinds: Vec<&str> = root.children().map(|child| child.kind()).collect();
    assert_eq!(kinds, ["module_definition", "ERROR"]);

    let error = root.child(1).unwrap();
    assert_eq!(error.start_byte(), source.find('"').unwrap());
    assert_eq!(error.end_byte(), source.len());
    assert_eq!(error.child(0).unwrap().kind(), "unterminated_string");
    assert_eq!(tree.final_scanner_state().as_bytes(), &[2]);
}

#[test]
fn test_error_stays_local() {
    let tree = parse("val a : int\n$\nval b : bool");
    let root = tree.root_node();
    assert_eq!(count_kind(root, "ERROR"), 1);

    let error = root.child(1).unwrap();
    assert!(error.is_error());
    assert_eq!((error.start_byte(), error.end_byte()), (12, 13));

    assert_eq!(root.child(0).unwrap().to_sexp(), parse("val a : int").root_node().child(0).unwrap().to_sexp());
    assert_eq!(root.child(2).unwrap().to_sexp(), parse("val b : bool").root_node().child(0).unwrap().to_sexp());
}

#[test]
fn test_quoted_string_in_type_position() {
    assert_eq!(
        parse("val x : {|hi|}").to_sexp(),
        "(compilation_unit (ERROR (lowercase_identifier) (quoted_string)))"
    );
}

#[test]
fn test_unterminated_quoted_string_after_error() {
    let source = "module M : sig end {id|abc";
    let tree = parse(source);
    assert_eq!(
        tree.to_sexp(),
        "(compilation_unit (module_definition (capitalized_identifier) (signature)) \
         (ERROR (unterminated_string)))"
    );

    let token = find_kind(tree.root_node(), "unterminated_string").unwrap();
    assert_eq!(token.start_byte(), source.find('{').unwrap());
    assert_eq!(token.end_byte(), source.len());
    assert_eq!(tree.final_scanner_state().as_bytes(), &[3, b'i', b'd']);

    let kinds: Vec<DiagnosticKind> = tree.diagnostics().iter().map(|d| d.kind).collect();
    assert!(kinds.contains(&DiagnosticKind::UnterminatedString));
}

#[test]
fn test_diagnostics() {
    let tree = parse("val a : int\n$\nval b : bool (* open");
    let diagnostics = tree.diagnostics();
    let kinds: Vec<DiagnosticKind> = diagnostics.iter().map(|d| d.kind).collect();
    assert!(kinds.contains(&DiagnosticKind::InvalidCharacter));
    assert!(kinds.contains(&DiagnosticKind::UnterminatedComment));

    let invalid = diagnostics
        .iter()
        .find(|d| d.kind == DiagnosticKind::InvalidCharacter)
        .unwrap();
    assert_eq!(invalid.range.start_byte, 12);
    assert_eq!(invalid.range.start_point.row, 1);
}

#[test]
fn test_well_formed_input_has_no_diagnostics() {
    let tree = parse("type t = A | B of int\nval f : t -> int");
    assert!(tree.diagnostics().is_empty());
}

// ============================================================================
// Tree Navigation
// ============================================================================

#[test]
fn test_cursor_preorder_matches_recursion() {
    fn preorder(node: Node<'_>, out: &mut Vec<&'static str>) {
        out.push(node.kind());
        for child in node.children() {
            preorder(child, out);
        }
    }

    let tree = parse("module M : sig val x : int list option end");
    let mut expected = Vec::new();
    preorder(tree.root_node(), &mut expected);

    let mut walked = Vec::new();
    let mut cursor = tree.walk();
    'walk: loop {
        walked.push(cursor.node().kind());
        if cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                break 'walk;
            }
        }
    }
    assert_eq!(walked, expected);
}

#[test]
fn test_siblings_and_named_children() {
    let tree = parse("val x : int\nval y : int");
    let root = tree.root_node();
    let first = root.named_child(0).unwrap();
    let second = first.next_sibling().unwrap();
    assert_eq!(second.prev_sibling(), Some(first));
    assert_eq!(root.named_child_count(), 2);
    assert!(second.next_sibling().is_none());
}

// ============================================================================
// Deep Trees
// ============================================================================

#[test]
fn test_deeply_nested_arrow_chain() {
    const LEVELS: usize = 100_000;
    let source = format!("val f : {}a", "a -> ".repeat(LEVELS));
    let mut parser = Parser::new(ocaml_interface::language());
    let tree = parser.parse(source.as_bytes(), None).unwrap();
    assert!(!tree.has_error());
    assert!(tree.root_node().subtree().depth() > LEVELS);
    assert_eq!(tree.to_sexp().matches("(function_type").count(), LEVELS);
    assert!(tree.diagnostics().is_empty());

    // Follow the last child down to the final `a`
    let mut cursor = tree.walk();
    let mut depth = 0;
    while cursor.goto_first_child() {
        while cursor.goto_next_sibling() {}
        depth += 1;
    }
    assert_eq!(depth, LEVELS + 3);
    let last = cursor.node();
    assert_eq!(last.kind(), "lowercase_identifier");
    assert_eq!(last.end_byte(), source.len());
    let path = last.parent().unwrap();
    assert_eq!(path.kind(), "type_constructor_path");
    assert_eq!(path.parent().unwrap().kind(), "function_type");

    let edit = InputEdit::insert(source.as_bytes(), 8, b"b -> ");
    let edited = tree.edit(&edit).unwrap();
    let new_source = format!("val f : b -> {}", &source[8..]);
    let reparsed = parser.parse(new_source.as_bytes(), Some(&edited)).unwrap();
    assert!(!reparsed.has_error());
    assert_eq!(reparsed.to_sexp().matches("(function_type").count(), LEVELS + 1);
    assert!(parser.last_stats().reused_nodes > 0);

    drop(reparsed);
    drop(edited);
    drop(tree);
}

#[test]
fn test_error_deep_inside_arrow_chain() {
    const LEVELS: usize = 100_000;
    let source = format!("val f : {}$ a", "a -> ".repeat(LEVELS));
    let tree = parse(&source);
    assert!(tree.has_error());

    let diagnostics = tree.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::InvalidCharacter);
    assert_eq!(diagnostics[0].range.start_byte, source.find('$').unwrap());
}
