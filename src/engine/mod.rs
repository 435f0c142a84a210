//! Incremental LR engine
//!
//! Everything here is language-independent: a [`Language`] supplies the
//! tables and the [`Scanner`], and the engine turns bytes into a [`Tree`].
//!
//! # Module Organization
//!
//! ## Core Types
//! - [`Parser`] - Table-driven walker with error recovery
//! - [`Tree`] / [`Node`] - Immutable syntax trees and borrowed node views
//! - [`TreeCursor`] - Allocation-free tree navigation
//! - [`Language`] - Loaded automaton tables
//!
//! ## Lexing
//! - [`scanner`] - The scanner contract and token production
//!
//! ## Incremental Parsing
//! - [`incremental`] - Edits and subtree reuse
//!
//! ## Developer Tools
//! - [`debug`] - Tree dumps
//!
//! ## Bindings
//! - [`c_ffi`] - C ABI

/// Logging macros - no-op when logging feature is disabled
#[cfg(not(feature = "logging"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

/// Logging macros - use log crate when logging feature is enabled
#[cfg(feature = "logging")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "logging"))]
macro_rules! log_trace {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "logging")]
macro_rules! log_trace {
    ($($arg:tt)*) => { log::trace!($($arg)*) };
}

// ============================================================================
// Module Declarations
// ============================================================================

pub mod cursor;
pub mod debug;
pub mod error;
pub mod incremental;
pub mod language;
pub mod parser;
pub mod point;
pub mod scanner;
pub mod subtree;
pub mod tree;

mod stack;

// Parallel parsing (always available, uses rayon when feature is enabled)
pub mod parallel;

// C ABI for external language bindings
pub mod c_ffi;

// ============================================================================
// Core Types
// ============================================================================

pub use cursor::TreeCursor;
pub use language::{Language, ParseAction, Production, StateId, Symbol, SymbolInfo};
pub use parser::{IncrementalStats, Parser, ParserConfig};
pub use point::{Length, Point, Range};
pub use subtree::{Subtree, NO_PARSE_STATE};
pub use tree::{Node, Tree};

// ============================================================================
// Error Handling
// ============================================================================

pub use error::{Diagnostic, DiagnosticKind, Error, Result};

// ============================================================================
// Lexing
// ============================================================================

pub use scanner::{next_token, InputCursor, Scanner, ScannerState, Token, ValidSymbols};

// ============================================================================
// Incremental Parsing
// ============================================================================

pub use incremental::InputEdit;

// ============================================================================
// Developer Tools
// ============================================================================

pub use debug::TreePrinter;

// ============================================================================
// Parallel Parsing
// ============================================================================

pub use parallel::{parse_batch_parallel, parse_batch_with_config, ParallelConfig};
