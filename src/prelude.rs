//! Prelude module for convenient imports
//!
//! Importing this module with a wildcard import brings the core types into
//! scope:
//!
//! ```
//! use signet::prelude::*;
//!
//! let mut parser = Parser::new(ocaml_interface::language());
//! let tree = parser.parse(b"module type S = sig end", None).unwrap();
//! assert!(!tree.has_error());
//! ```
//!
//! # Re-exported Items
//!
//! ## Core Types
//! - [`Parser`] - Table-driven parser
//! - [`ParserConfig`] - Parser limits and options
//! - [`Tree`] - Immutable syntax tree
//! - [`Node`] - Borrowed view of one node
//! - [`TreeCursor`] - Tree navigation
//! - [`Language`] - Automaton tables plus scanner
//!
//! ## Incremental Parsing
//! - [`InputEdit`] - Description of a text change
//!
//! ## Error Handling
//! - [`Error`] - API misuse errors
//! - [`Diagnostic`] - A syntax error found in a tree

// ============================================================================
// Core Types
// ============================================================================

pub use crate::engine::{Language, Node, Parser, ParserConfig, Point, Range, Tree, TreeCursor};

// ============================================================================
// Incremental Parsing
// ============================================================================

pub use crate::engine::InputEdit;

// ============================================================================
// Error Handling
// ============================================================================

pub use crate::engine::{Diagnostic, DiagnosticKind, Error, Result};

// ============================================================================
// Languages
// ============================================================================

pub use crate::ocaml_interface;
