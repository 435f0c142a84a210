//! Scanner Interface
//!
//! A language plugs its hand-written lexer into the engine through the
//! [`Scanner`] trait. The walker pulls one token at a time, passing the set of
//! symbols the current automaton state can accept, so the same text may lex
//! differently depending on grammar context.
//!
//! Scanner state is an explicit [`ScannerState`] value rather than hidden
//! mutable state: it is captured before and after every token and stored in
//! the tree, which lets a re-parse check byte-for-byte that lexing would
//! resume identically at a reused subtree.

use super::language::Symbol;
use super::point::{Length, Point};

/// Serialized scanner state
///
/// Empty means the scanner is idle between tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ScannerState(Vec<u8>);

impl ScannerState {
    /// The idle state
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Restore a state from its serialized bytes
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    /// Serialized bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Whether the scanner is between tokens
    pub fn is_idle(&self) -> bool {
        self.0.is_empty()
    }

    /// Replace the contents
    pub fn set(&mut self, bytes: &[u8]) {
        self.0.clear();
        self.0.extend_from_slice(bytes);
    }

    /// Reset to idle
    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Symbols the automaton can accept in the current state
#[derive(Debug, Clone, Copy)]
pub struct ValidSymbols<'a>(&'a [bool]);

impl<'a> ValidSymbols<'a> {
    /// Wrap a per-symbol flag slice
    pub fn new(flags: &'a [bool]) -> Self {
        Self(flags)
    }

    /// Whether `symbol` is acceptable
    #[inline]
    pub fn contains(&self, symbol: Symbol) -> bool {
        self.0.get(symbol as usize).copied().unwrap_or(false)
    }
}

/// Read position over the input handed to a [`Scanner`]
///
/// Tracks the furthest byte inspected so the walker knows how far past a
/// token's end its lexing depended on the text.
#[derive(Debug)]
pub struct InputCursor<'a> {
    input: &'a [u8],
    position: Length,
    token_start: Length,
    furthest: usize,
}

impl<'a> InputCursor<'a> {
    /// Create a cursor at an absolute position
    pub fn new(input: &'a [u8], position: Length) -> Self {
        Self {
            input,
            position,
            token_start: position,
            furthest: position.bytes,
        }
    }

    /// Byte at the cursor, `None` at end of input
    #[inline]
    pub fn peek(&mut self) -> Option<u8> {
        self.peek_at(0)
    }

    /// Byte `n` positions ahead of the cursor
    #[inline]
    pub fn peek_at(&mut self, n: usize) -> Option<u8> {
        let index = self.position.bytes + n;
        self.furthest = self.furthest.max(index + 1);
        self.input.get(index).copied()
    }

    /// Move past one byte
    #[inline]
    pub fn advance(&mut self) {
        if let Some(&byte) = self.input.get(self.position.bytes) {
            self.position.bytes += 1;
            if byte == b'\n' {
                self.position.extent = Point::new(self.position.extent.row + 1, 0);
            } else {
                self.position.extent.column += 1;
            }
        }
    }

    /// Move past `n` bytes
    pub fn advance_by(&mut self, n: usize) {
        let target = (self.position.bytes + n).min(self.input.len());
        self.advance_to(target);
    }

    /// Jump forward to an absolute byte offset, counting newlines on the way
    pub fn advance_to(&mut self, offset: usize) {
        let offset = offset.min(self.input.len());
        if offset <= self.position.bytes {
            return;
        }
        let skipped = &self.input[self.position.bytes..offset];
        let newlines = memchr::memchr_iter(b'\n', skipped).count();
        self.position.extent = match memchr::memrchr(b'\n', skipped) {
            Some(last) => Point::new(
                self.position.extent.row + newlines,
                skipped.len() - last - 1,
            ),
            None => Point::new(
                self.position.extent.row,
                self.position.extent.column + skipped.len(),
            ),
        };
        self.position.bytes = offset;
        self.furthest = self.furthest.max(offset);
    }

    /// Unconsumed input
    ///
    /// Reading this slice is not recorded as inspection; a scanner that
    /// searches it must move with [`advance_to`](Self::advance_to) or
    /// [`peek`](Self::peek) over whatever its decision relied on.
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.position.bytes.min(self.input.len())..]
    }

    /// Input consumed between `start` and the cursor
    pub fn slice_from(&self, start: usize) -> &'a [u8] {
        &self.input[start.min(self.position.bytes)..self.position.bytes]
    }

    /// Total input length
    pub fn input_len(&self) -> usize {
        self.input.len()
    }

    /// Mark the current position as the start of the token (after padding)
    #[inline]
    pub fn mark_token_start(&mut self) {
        self.token_start = self.position;
    }

    /// Whether the cursor is at end of input
    #[inline]
    pub fn at_end(&mut self) -> bool {
        self.peek().is_none()
    }

    /// Current absolute position
    #[inline]
    pub fn position(&self) -> Length {
        self.position
    }

    /// Current byte offset
    #[inline]
    pub fn offset(&self) -> usize {
        self.position.bytes
    }

    /// Start of the current token
    #[inline]
    pub fn token_start(&self) -> Length {
        self.token_start
    }

    /// One past the furthest byte inspected
    #[inline]
    pub fn furthest(&self) -> usize {
        self.furthest
    }
}

/// A hand-written lexer for one language
pub trait Scanner: Send + Sync {
    /// Scan one token starting at the cursor
    ///
    /// The scanner skips padding, calls [`InputCursor::mark_token_start`]
    /// and advances past the token. `None` means end of input.
    fn scan(
        &self,
        cursor: &mut InputCursor<'_>,
        state: &mut ScannerState,
        valid: ValidSymbols<'_>,
    ) -> Option<Symbol>;
}

/// A token produced by [`next_token`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token kind
    pub symbol: Symbol,
    /// Absolute position where scanning began (start of padding)
    pub position: Length,
    /// Skipped whitespace before the token
    pub padding: Length,
    /// Extent of the token text
    pub size: Length,
    /// Bytes past the token end the scanner looked at
    pub lookahead_bytes: usize,
    /// Scanner state before the token
    pub scan_start: ScannerState,
    /// Scanner state after the token
    pub scan_end: ScannerState,
}

impl Token {
    /// Absolute start, excluding padding
    pub fn start(&self) -> Length {
        self.position + self.padding
    }

    /// Absolute end
    pub fn end(&self) -> Length {
        self.start() + self.size
    }

    /// Start byte offset
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
}

/// Pull one token from `scanner` at `position`
///
/// At end of input the token is a zero-sized `eof_symbol` placed after any
/// trailing padding.
pub fn next_token(
    scanner: &dyn Scanner,
    input: &[u8],
    position: Length,
    state: &ScannerState,
    valid: ValidSymbols<'_>,
    eof_symbol: Symbol,
) -> Token {
    let mut cursor = InputCursor::new(input, position);
    let mut scan_end = state.clone();
    let symbol = scanner.scan(&mut cursor, &mut scan_end, valid);

    let start = cursor.token_start();
    let (symbol, end) = match symbol {
        Some(symbol) => (symbol, cursor.position()),
        None => (eof_symbol, start),
    };

    Token {
        symbol,
        position,
        padding: start - position,
        size: end - start,
        lookahead_bytes: cursor.furthest().saturating_sub(end.bytes),
        scan_start: state.clone(),
        scan_end,
    }
}
