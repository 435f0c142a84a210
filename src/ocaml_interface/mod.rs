//! OCaml interface (`.mli`) language
//!
//! The automaton tables in `grammars/ocaml_interface.json` are embedded at
//! compile time and loaded on first use; the [`OcamlInterfaceScanner`]
//! handles comments, strings and operator names.
//!
//! ```rust
//! use signet::engine::Parser;
//! use signet::ocaml_interface;
//!
//! let mut parser = Parser::new(ocaml_interface::language());
//! let tree = parser.parse(b"type t = A | B of int", None).unwrap();
//! assert!(!tree.has_error());
//! ```

pub mod scanner;
pub mod symbols;

pub use scanner::OcamlInterfaceScanner;

use crate::engine::{Language, Result};
use once_cell::sync::Lazy;

const TABLES: &str = include_str!("../../grammars/ocaml_interface.json");

static LANGUAGE: Lazy<Result<Language>> =
    Lazy::new(|| Language::from_json(TABLES, OcamlInterfaceScanner));

/// The OCaml interface language
///
/// # Panics
///
/// Panics if the embedded tables fail to load, which only happens if the
/// crate was built from a corrupted `grammars/ocaml_interface.json`.
pub fn language() -> &'static Language {
    match try_language() {
        Ok(language) => language,
        Err(e) => panic!("embedded OCaml interface tables are invalid: {}", e),
    }
}

/// The OCaml interface language, or the error the embedded tables produced
pub fn try_language() -> std::result::Result<&'static Language, &'static crate::engine::Error> {
    Lazy::force(&LANGUAGE).as_ref()
}
