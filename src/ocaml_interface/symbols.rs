//! Symbol ids of the bundled OCaml interface grammar.
//!
//! Generated together with `grammars/ocaml_interface.json`; the ids index
//! the `symbols` array of that table. Each constant is named after the
//! symbol it stands for.

#![allow(missing_docs)]

use crate::engine::Symbol;

// Terminals
pub const END_OF_INPUT: Symbol = 0;
pub const ERROR: Symbol = 1;
pub const COMMENT: Symbol = 2;
pub const LIDENT: Symbol = 3;
pub const UIDENT: Symbol = 4;
pub const TYPE_VARIABLE: Symbol = 5;
pub const STRING: Symbol = 6;
pub const QUOTED_STRING: Symbol = 7;
pub const OPERATOR: Symbol = 8;
pub const UNTERMINATED_COMMENT: Symbol = 9;
pub const UNTERMINATED_STRING: Symbol = 10;
pub const UNMATCHED_COMMENT_CLOSE: Symbol = 11;
pub const INVALID_CHARACTER: Symbol = 12;
pub const KW_AND: Symbol = 13;
pub const KW_END: Symbol = 14;
pub const KW_EXCEPTION: Symbol = 15;
pub const KW_EXTERNAL: Symbol = 16;
pub const KW_INCLUDE: Symbol = 17;
pub const KW_MODULE: Symbol = 18;
pub const KW_MUTABLE: Symbol = 19;
pub const KW_OF: Symbol = 20;
pub const KW_OPEN: Symbol = 21;
pub const KW_SIG: Symbol = 22;
pub const KW_TYPE: Symbol = 23;
pub const KW_VAL: Symbol = 24;
pub const COLON: Symbol = 25;
pub const EQUAL: Symbol = 26;
pub const BAR: Symbol = 27;
pub const ARROW: Symbol = 28;
pub const STAR: Symbol = 29;
pub const LPAREN: Symbol = 30;
pub const RPAREN: Symbol = 31;
pub const COMMA: Symbol = 32;
pub const DOT: Symbol = 33;
pub const LBRACE: Symbol = 34;
pub const RBRACE: Symbol = 35;
pub const SEMICOLON: Symbol = 36;
pub const QUESTION: Symbol = 37;

// Nonterminals
pub const COMPILATION_UNIT: Symbol = 38;
pub const AUX_ITEMS: Symbol = 39;
pub const AUX_ITEM: Symbol = 40;
pub const VALUE_SPECIFICATION: Symbol = 41;
pub const EXTERNAL: Symbol = 42;
pub const AUX_STRINGS: Symbol = 43;
pub const AUX_STRING_LITERAL: Symbol = 44;
pub const AUX_VALUE_NAME: Symbol = 45;
pub const PARENTHESIZED_OPERATOR: Symbol = 46;
pub const TYPE_DEFINITION: Symbol = 47;
pub const AUX_TYPE_BINDINGS: Symbol = 48;
pub const TYPE_BINDING: Symbol = 49;
pub const TYPE_PARAMETERS: Symbol = 50;
pub const AUX_TYPE_VARIABLES: Symbol = 51;
pub const VARIANT_DECLARATION: Symbol = 52;
pub const AUX_CONSTRUCTORS: Symbol = 53;
pub const CONSTRUCTOR_DECLARATION: Symbol = 54;
pub const RECORD_DECLARATION: Symbol = 55;
pub const AUX_FIELDS: Symbol = 56;
pub const FIELD_DECLARATION: Symbol = 57;
pub const AUX_TYPE: Symbol = 58;
pub const FUNCTION_TYPE: Symbol = 59;
pub const LABELED_ARGUMENT: Symbol = 60;
pub const TUPLE_TYPE: Symbol = 61;
pub const AUX_SIMPLE_TYPE: Symbol = 62;
pub const CONSTRUCTED_TYPE: Symbol = 63;
pub const AUX_TYPES: Symbol = 64;
pub const PARENTHESIZED_TYPE: Symbol = 65;
pub const TYPE_CONSTRUCTOR_PATH: Symbol = 66;
pub const MODULE_PATH: Symbol = 67;
pub const EXCEPTION_DEFINITION: Symbol = 68;
pub const MODULE_DEFINITION: Symbol = 69;
pub const AUX_MODULE_PARAMETERS: Symbol = 70;
pub const MODULE_PARAMETER: Symbol = 71;
pub const MODULE_TYPE_DEFINITION: Symbol = 72;
pub const AUX_MODULE_TYPE: Symbol = 73;
pub const SIGNATURE: Symbol = 74;
pub const MODULE_TYPE_PATH: Symbol = 75;
pub const OPEN_MODULE: Symbol = 76;
pub const INCLUDE_MODULE_TYPE: Symbol = 77;

/// Number of symbols in the grammar.
pub const SYMBOL_COUNT: usize = 78;
