//! C ABI for Signet
//!
//! A stable C ABI for parsing from C, C++, Python or anything else that can
//! call C functions. Parsers, trees and cursors are opaque heap handles;
//! languages are static and never freed.
//!
//! # Example (C)
//!
//! ```c
//! #include <signet.h>
//!
//! int main() {
//!     const SignetLanguage* lang = signet_language_ocaml_interface();
//!     SignetParser* parser = signet_parser_new(lang);
//!
//!     const char* src = "val x : int";
//!     SignetTree* tree = NULL;
//!     if (signet_parse(parser, (const uint8_t*)src, strlen(src), NULL, &tree) == SIGNET_OK) {
//!         SignetTreeCursor* cursor = signet_tree_cursor_new(tree);
//!         while (signet_tree_cursor_goto_first_child(cursor) == 1) {
//!             printf("%s\n", signet_tree_cursor_node_kind(cursor));
//!         }
//!         signet_tree_cursor_free(cursor);
//!         signet_tree_free(tree);
//!     }
//!
//!     signet_parser_free(parser);
//!     return 0;
//! }
//! ```
//!
//! # Conventions
//!
//! - Offsets are 0-based UTF-8 byte counts; points are (row, column in bytes).
//! - Functions returning `c_int` return [`SIGNET_OK`] (or 1/0 for yes/no
//!   queries) on success and a negative `SIGNET_ERROR_*` code otherwise.
//!   Null handles are reported, never dereferenced.
//!
//! # Memory Management
//!
//! - Use `signet_parser_free()` to free parsers
//! - Use `signet_tree_free()` to free trees
//! - Use `signet_tree_cursor_free()` to free cursors, before their tree

use std::ffi::CString;
use std::os::raw::{c_char, c_int};
use std::ptr;

use super::cursor::TreeCursor;
use super::error::Error;
use super::incremental::InputEdit;
use super::language::Language;
use super::parser::Parser;
use super::point::Point;
use super::tree::Tree;
use crate::ocaml_interface;

// ============================================================================
// Opaque Types
// ============================================================================

/// Opaque handle to a language
pub type SignetLanguage = Language;

/// Opaque handle to a parser
pub struct SignetParser {
    parser: Parser,
}

/// Opaque handle to a syntax tree
pub struct SignetTree {
    tree: Tree,
}

/// Opaque handle to a tree cursor
pub struct SignetTreeCursor {
    cursor: TreeCursor<'static>,
    /// NUL-terminated kind names, indexed by symbol
    kind_names: Vec<CString>,
}

// ============================================================================
// Plain Data Types
// ============================================================================

/// A (row, column) position
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignetPoint {
    /// Row (0-based)
    pub row: usize,
    /// Column in bytes (0-based)
    pub column: usize,
}

impl From<Point> for SignetPoint {
    fn from(point: Point) -> Self {
        Self {
            row: point.row,
            column: point.column,
        }
    }
}

impl From<SignetPoint> for Point {
    fn from(point: SignetPoint) -> Self {
        Point::new(point.row, point.column)
    }
}

/// Byte and point extent of a node
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignetRange {
    /// Start byte offset
    pub start_byte: usize,
    /// End byte offset
    pub end_byte: usize,
    /// Start point
    pub start_point: SignetPoint,
    /// End point
    pub end_point: SignetPoint,
}

/// A text edit
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignetInputEdit {
    /// Byte offset where the change starts
    pub start_byte: usize,
    /// End of the replaced text in the old input
    pub old_end_byte: usize,
    /// End of the inserted text in the new input
    pub new_end_byte: usize,
    /// Point of `start_byte`
    pub start_point: SignetPoint,
    /// Point of `old_end_byte`
    pub old_end_point: SignetPoint,
    /// Point of `new_end_byte`
    pub new_end_point: SignetPoint,
}

impl From<SignetInputEdit> for InputEdit {
    fn from(edit: SignetInputEdit) -> Self {
        InputEdit::new(
            edit.start_byte,
            edit.old_end_byte,
            edit.new_end_byte,
            edit.start_point.into(),
            edit.old_end_point.into(),
            edit.new_end_point.into(),
        )
    }
}

// ============================================================================
// Error Codes
// ============================================================================

/// Success
pub const SIGNET_OK: c_int = 0;
/// Null pointer passed
pub const SIGNET_ERROR_NULL_POINTER: c_int = -1;
/// Edit does not fit the tree
pub const SIGNET_ERROR_INVALID_EDIT: c_int = -2;
/// Tree belongs to another language
pub const SIGNET_ERROR_LANGUAGE_MISMATCH: c_int = -3;
/// Tree does not describe the input
pub const SIGNET_ERROR_STALE_TREE: c_int = -4;
/// Input exceeds the configured limit
pub const SIGNET_ERROR_INPUT_TOO_LARGE: c_int = -5;
/// Language tables are malformed
pub const SIGNET_ERROR_INVALID_LANGUAGE: c_int = -6;

fn error_code(error: &Error) -> c_int {
    match error {
        Error::InvalidEdit { .. } => SIGNET_ERROR_INVALID_EDIT,
        Error::LanguageMismatch { .. } => SIGNET_ERROR_LANGUAGE_MISMATCH,
        Error::StaleTree { .. } => SIGNET_ERROR_STALE_TREE,
        Error::InputTooLarge { .. } => SIGNET_ERROR_INPUT_TOO_LARGE,
        Error::InvalidLanguage { .. } => SIGNET_ERROR_INVALID_LANGUAGE,
    }
}

// ============================================================================
// Language Functions
// ============================================================================

/// The bundled OCaml interface language
///
/// The returned pointer is static and must not be freed.
#[no_mangle]
pub extern "C" fn signet_language_ocaml_interface() -> *const SignetLanguage {
    ocaml_interface::language() as *const Language
}

// ============================================================================
// Parser Functions
// ============================================================================

/// Create a parser for `language`
///
/// Returns null if `language` is null.
///
/// # Safety
///
/// - `language` must be a pointer returned by a `signet_language_*` function
/// - The returned pointer must be freed with `signet_parser_free`
#[no_mangle]
pub unsafe extern "C" fn signet_parser_new(language: *const SignetLanguage) -> *mut SignetParser {
    if language.is_null() {
        return ptr::null_mut();
    }
    let language: &'static Language = &*language;
    Box::into_raw(Box::new(SignetParser {
        parser: Parser::new(language),
    }))
}

/// Free a parser
///
/// # Safety
///
/// - `parser` must be a valid pointer returned by `signet_parser_new`
/// - The pointer must not be used after this call
#[no_mangle]
pub unsafe extern "C" fn signet_parser_free(parser: *mut SignetParser) {
    if !parser.is_null() {
        let _ = Box::from_raw(parser);
    }
}

/// Parse `input_len` bytes at `input`, optionally reusing an edited tree
///
/// # Safety
///
/// - `parser` must be a valid pointer returned by `signet_parser_new`
/// - `input` must point to `input_len` readable bytes (it may be null when
///   `input_len` is 0)
/// - `old_tree` must be null or a valid tree handle
/// - `tree_out` must be a valid pointer to a `SignetTree*`; on success the
///   tree it receives must be freed with `signet_tree_free`
#[no_mangle]
pub unsafe extern "C" fn signet_parse(
    parser: *mut SignetParser,
    input: *const u8,
    input_len: usize,
    old_tree: *const SignetTree,
    tree_out: *mut *mut SignetTree,
) -> c_int {
    if parser.is_null() || tree_out.is_null() || (input.is_null() && input_len > 0) {
        return SIGNET_ERROR_NULL_POINTER;
    }

    let input = if input_len == 0 {
        &[][..]
    } else {
        std::slice::from_raw_parts(input, input_len)
    };
    let old_tree = old_tree.as_ref().map(|handle| &handle.tree);

    match (*parser).parser.parse(input, old_tree) {
        Ok(tree) => {
            *tree_out = Box::into_raw(Box::new(SignetTree { tree }));
            SIGNET_OK
        }
        Err(error) => error_code(&error),
    }
}

// ============================================================================
// Tree Functions
// ============================================================================

/// Apply an edit, producing a new tree to pass to `signet_parse`
///
/// The original tree is left unchanged and must still be freed.
///
/// # Safety
///
/// - `tree` must be a valid tree handle
/// - `edit` must point to a valid `SignetInputEdit`
/// - `tree_out` must be a valid pointer to a `SignetTree*`; on success the
///   tree it receives must be freed with `signet_tree_free`
#[no_mangle]
pub unsafe extern "C" fn signet_tree_edit(
    tree: *const SignetTree,
    edit: *const SignetInputEdit,
    tree_out: *mut *mut SignetTree,
) -> c_int {
    if tree.is_null() || edit.is_null() || tree_out.is_null() {
        return SIGNET_ERROR_NULL_POINTER;
    }

    match (*tree).tree.edit(&InputEdit::from(*edit)) {
        Ok(edited) => {
            *tree_out = Box::into_raw(Box::new(SignetTree { tree: edited }));
            SIGNET_OK
        }
        Err(error) => error_code(&error),
    }
}

/// Free a tree
///
/// # Safety
///
/// - `tree` must be a valid pointer returned by `signet_parse` or
///   `signet_tree_edit`
/// - No cursor created from it may be used after this call
#[no_mangle]
pub unsafe extern "C" fn signet_tree_free(tree: *mut SignetTree) {
    if !tree.is_null() {
        let _ = Box::from_raw(tree);
    }
}

// ============================================================================
// Cursor Functions
// ============================================================================

/// Create a cursor on the root of `tree`
///
/// Returns null if `tree` is null.
///
/// # Safety
///
/// - `tree` must be a valid tree handle that outlives the cursor
/// - The returned pointer must be freed with `signet_tree_cursor_free`
#[no_mangle]
pub unsafe extern "C" fn signet_tree_cursor_new(tree: *const SignetTree) -> *mut SignetTreeCursor {
    if tree.is_null() {
        return ptr::null_mut();
    }
    let tree: &'static Tree = &(*tree).tree;
    let language = tree.language();
    let kind_names = (0..language.symbol_count())
        .map(|symbol| CString::new(language.symbol_name(symbol as u16)).unwrap_or_default())
        .collect();

    Box::into_raw(Box::new(SignetTreeCursor {
        cursor: tree.walk(),
        kind_names,
    }))
}

/// Free a cursor
///
/// # Safety
///
/// - `cursor` must be a valid pointer returned by `signet_tree_cursor_new`
/// - The pointer must not be used after this call
#[no_mangle]
pub unsafe extern "C" fn signet_tree_cursor_free(cursor: *mut SignetTreeCursor) {
    if !cursor.is_null() {
        let _ = Box::from_raw(cursor);
    }
}

/// Move to the first child; 1 if moved, 0 if the node has no children
///
/// # Safety
///
/// - `cursor` must be null or a valid cursor handle
#[no_mangle]
pub unsafe extern "C" fn signet_tree_cursor_goto_first_child(cursor: *mut SignetTreeCursor) -> c_int {
    match cursor.as_mut() {
        Some(handle) => c_int::from(handle.cursor.goto_first_child()),
        None => SIGNET_ERROR_NULL_POINTER,
    }
}

/// Move to the next sibling; 1 if moved, 0 at the last child
///
/// # Safety
///
/// - `cursor` must be null or a valid cursor handle
#[no_mangle]
pub unsafe extern "C" fn signet_tree_cursor_goto_next_sibling(
    cursor: *mut SignetTreeCursor,
) -> c_int {
    match cursor.as_mut() {
        Some(handle) => c_int::from(handle.cursor.goto_next_sibling()),
        None => SIGNET_ERROR_NULL_POINTER,
    }
}

/// Move to the parent; 1 if moved, 0 at the root
///
/// # Safety
///
/// - `cursor` must be null or a valid cursor handle
#[no_mangle]
pub unsafe extern "C" fn signet_tree_cursor_goto_parent(cursor: *mut SignetTreeCursor) -> c_int {
    match cursor.as_mut() {
        Some(handle) => c_int::from(handle.cursor.goto_parent()),
        None => SIGNET_ERROR_NULL_POINTER,
    }
}

/// Kind name of the current node
///
/// Returns null if `cursor` is null. The string lives as long as the cursor
/// and must not be freed.
///
/// # Safety
///
/// - `cursor` must be null or a valid cursor handle
#[no_mangle]
pub unsafe extern "C" fn signet_tree_cursor_node_kind(
    cursor: *const SignetTreeCursor,
) -> *const c_char {
    let Some(handle) = cursor.as_ref() else {
        return ptr::null();
    };
    let symbol = handle.cursor.node().kind_id() as usize;
    handle
        .kind_names
        .get(symbol)
        .map_or(ptr::null(), |name| name.as_ptr())
}

/// Write the current node's range to `range_out`
///
/// # Safety
///
/// - `cursor` must be null or a valid cursor handle
/// - `range_out` must be null or point to writable memory for a `SignetRange`
#[no_mangle]
pub unsafe extern "C" fn signet_tree_cursor_node_range(
    cursor: *const SignetTreeCursor,
    range_out: *mut SignetRange,
) -> c_int {
    let Some(handle) = cursor.as_ref() else {
        return SIGNET_ERROR_NULL_POINTER;
    };
    if range_out.is_null() {
        return SIGNET_ERROR_NULL_POINTER;
    }
    let range = handle.cursor.node().range();
    *range_out = SignetRange {
        start_byte: range.start_byte,
        end_byte: range.end_byte,
        start_point: range.start_point.into(),
        end_point: range.end_point.into(),
    };
    SIGNET_OK
}

/// 1 if the current node is an `ERROR` node, 0 otherwise
///
/// # Safety
///
/// - `cursor` must be null or a valid cursor handle
#[no_mangle]
pub unsafe extern "C" fn signet_tree_cursor_node_is_error(cursor: *const SignetTreeCursor) -> c_int {
    match cursor.as_ref() {
        Some(handle) => c_int::from(handle.cursor.node().is_error()),
        None => SIGNET_ERROR_NULL_POINTER,
    }
}

// ============================================================================
// Version Functions
// ============================================================================

/// Get the library version
///
/// Returns a static string like "0.1.0" that must not be freed.
#[no_mangle]
pub extern "C" fn signet_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    unsafe fn parse(parser: *mut SignetParser, text: &str, old: *const SignetTree) -> (c_int, *mut SignetTree) {
        let mut tree: *mut SignetTree = ptr::null_mut();
        let rc = signet_parse(parser, text.as_ptr(), text.len(), old, &mut tree);
        (rc, tree)
    }

    #[test]
    fn test_version() {
        let version = signet_version();
        let version_str = unsafe { CStr::from_ptr(version) }.to_str().unwrap();
        assert_eq!(version_str, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_parse_and_walk() {
        unsafe {
            let parser = signet_parser_new(signet_language_ocaml_interface());
            assert!(!parser.is_null());
            let (rc, tree) = parse(parser, "val x : int", ptr::null());
            assert_eq!(rc, SIGNET_OK);

            let cursor = signet_tree_cursor_new(tree);
            let kind = CStr::from_ptr(signet_tree_cursor_node_kind(cursor));
            assert_eq!(kind.to_str().unwrap(), "compilation_unit");

            assert_eq!(signet_tree_cursor_goto_first_child(cursor), 1);
            assert_eq!(signet_tree_cursor_goto_first_child(cursor), 1);
            assert_eq!(signet_tree_cursor_goto_next_sibling(cursor), 1);
            let kind = CStr::from_ptr(signet_tree_cursor_node_kind(cursor));
            assert_eq!(kind.to_str().unwrap(), "lowercase_identifier");

            let mut range = SignetRange::default();
            assert_eq!(signet_tree_cursor_node_range(cursor, &mut range), SIGNET_OK);
            assert_eq!((range.start_byte, range.end_byte), (4, 5));
            assert_eq!(range.start_point, SignetPoint { row: 0, column: 4 });
            assert_eq!(signet_tree_cursor_node_is_error(cursor), 0);

            assert_eq!(signet_tree_cursor_goto_parent(cursor), 1);
            assert_eq!(signet_tree_cursor_goto_parent(cursor), 1);
            assert_eq!(signet_tree_cursor_goto_parent(cursor), 0);

            signet_tree_cursor_free(cursor);
            signet_tree_free(tree);
            signet_parser_free(parser);
        }
    }

    #[test]
    fn test_edit_and_reparse() {
        unsafe {
            let parser = signet_parser_new(signet_language_ocaml_interface());
            let (_, tree) = parse(parser, "val x : int", ptr::null());

            let edit = SignetInputEdit {
                start_byte: 8,
                old_end_byte: 11,
                new_end_byte: 12,
                start_point: SignetPoint { row: 0, column: 8 },
                old_end_point: SignetPoint { row: 0, column: 11 },
                new_end_point: SignetPoint { row: 0, column: 12 },
            };
            let mut edited: *mut SignetTree = ptr::null_mut();
            assert_eq!(signet_tree_edit(tree, &edit, &mut edited), SIGNET_OK);

            let (rc, reparsed) = parse(parser, "val x : bool", edited);
            assert_eq!(rc, SIGNET_OK);
            assert_eq!((*reparsed).tree.to_sexp(), (*tree).tree.to_sexp());

            // The unedited tree no longer matches the text
            let (rc, _) = parse(parser, "val x : bool", tree);
            assert_eq!(rc, SIGNET_ERROR_STALE_TREE);

            let bad = SignetInputEdit {
                old_end_byte: 40,
                ..edit
            };
            let mut out: *mut SignetTree = ptr::null_mut();
            assert_eq!(signet_tree_edit(tree, &bad, &mut out), SIGNET_ERROR_INVALID_EDIT);
            assert!(out.is_null());

            signet_tree_free(reparsed);
            signet_tree_free(edited);
            signet_tree_free(tree);
            signet_parser_free(parser);
        }
    }

    #[test]
    fn test_null_handles() {
        unsafe {
            assert!(signet_parser_new(ptr::null()).is_null());
            assert!(signet_tree_cursor_new(ptr::null()).is_null());
            let mut tree: *mut SignetTree = ptr::null_mut();
            assert_eq!(
                signet_parse(ptr::null_mut(), ptr::null(), 0, ptr::null(), &mut tree),
                SIGNET_ERROR_NULL_POINTER
            );
            assert_eq!(signet_tree_cursor_goto_first_child(ptr::null_mut()), SIGNET_ERROR_NULL_POINTER);
            assert_eq!(signet_tree_cursor_node_is_error(ptr::null()), SIGNET_ERROR_NULL_POINTER);
            assert!(signet_tree_cursor_node_kind(ptr::null()).is_null());
            signet_parser_free(ptr::null_mut());
            signet_tree_free(ptr::null_mut());
            signet_tree_cursor_free(ptr::null_mut());
        }
    }

    #[test]
    fn test_empty_input_without_buffer() {
        unsafe {
            let parser = signet_parser_new(signet_language_ocaml_interface());
            let mut tree: *mut SignetTree = ptr::null_mut();
            assert_eq!(signet_parse(parser, ptr::null(), 0, ptr::null(), &mut tree), SIGNET_OK);
            assert_eq!((*tree).tree.to_sexp(), "(compilation_unit)");
            signet_tree_free(tree);
            signet_parser_free(parser);
        }
    }
}
