//! Signet - Incremental LR Parsing Engine
//!
//! Signet turns source bytes into concrete syntax trees using precompiled LR
//! automaton tables and a hand-written stateful scanner. It provides:
//! - A table-driven walker with bounded error recovery (malformed input
//!   yields `ERROR` nodes, never a failed parse)
//! - Immutable, reference-counted trees with byte and row/column ranges
//! - Incremental re-parsing that reuses unchanged subtrees after an edit
//! - An allocation-free tree cursor
//! - A bundled OCaml interface (`.mli`) language
//! - A C ABI for use from other languages
//!
//! ## Quick Start
//!
//! ```rust
//! use signet::engine::{InputEdit, Parser};
//! use signet::ocaml_interface;
//!
//! let mut parser = Parser::new(ocaml_interface::language());
//! let old_text = b"val x : int";
//! let tree = parser.parse(old_text, None).unwrap();
//! assert_eq!(
//!     tree.to_sexp(),
//!     "(compilation_unit (value_specification (lowercase_identifier) \
//!      (type_constructor_path (lowercase_identifier))))"
//! );
//!
//! // Rename `x` to `count` and re-parse, reusing what did not change
//! let edit = InputEdit::replace(old_text, 4, 5, b"count");
//! let edited = tree.edit(&edit).unwrap();
//! let new_tree = parser.parse(b"val count : int", Some(&edited)).unwrap();
//! assert!(!new_tree.has_error());
//! ```
//!
//! ## Walking a Tree
//!
//! ```rust
//! use signet::engine::Parser;
//! use signet::ocaml_interface;
//!
//! let tree = Parser::new(ocaml_interface::language())
//!     .parse(b"open M.N", None)
//!     .unwrap();
//! let mut cursor = tree.walk();
//! assert!(cursor.goto_first_child());
//! assert_eq!(cursor.node().kind(), "open_module");
//! ```
//!
//! ## Feature Flags
//!
//! - `logging` - Enable debug logging using the `log` crate
//! - `parallel` - Parse batches of inputs on the rayon thread pool

// Lint configuration for production quality
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all)]
#![allow(clippy::new_without_default)]
#![allow(clippy::module_inception)]

// Prelude module for convenient imports
pub mod prelude;

// Language-independent engine
pub mod engine;

// Bundled languages
pub mod ocaml_interface;

/// Re-export commonly used types for convenience
pub use engine::{
    // Developer tools
    debug::TreePrinter,
    // Incremental parsing
    incremental::InputEdit,
    Diagnostic,
    DiagnosticKind,
    Error,
    Language,
    Node,
    Parser,
    ParserConfig,
    Point,
    Range,
    Result,
    Tree,
    TreeCursor,
};
