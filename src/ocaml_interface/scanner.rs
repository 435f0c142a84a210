//! OCaml interface scanner
//!
//! Hand-written lexer for `.mli` files. The parts a regular lexer cannot do
//! live here: nested `(* ... *)` comments with a depth counter, `{id|...|id}`
//! quoted strings whose closing tag must match, and operator characters that
//! lex as one `operator` token only where the grammar accepts an operator
//! name (`val ( +. ) : ...`).
//!
//! State encoding (see [`ScannerState`]):
//!
//! | bytes              | meaning                         |
//! |--------------------|---------------------------------|
//! | empty              | idle                            |
//! | `1, depth: u32 le` | inside `depth` nested comments  |
//! | `2`                | inside a `"` string             |
//! | `3, tag...`        | inside a `{tag|` quoted string  |
//!
//! A non-idle state only survives a token that ran into end of input.

use super::symbols::*;
use crate::engine::{InputCursor, Scanner, ScannerState, Symbol, ValidSymbols};

const MODE_COMMENT: u8 = 1;
const MODE_STRING: u8 = 2;
const MODE_QUOTED: u8 = 3;

/// Scanner for the OCaml interface grammar
#[derive(Debug, Clone, Copy, Default)]
pub struct OcamlInterfaceScanner;

enum Mode {
    Idle,
    Comment(u32),
    String,
    Quoted(Vec<u8>),
}

impl Mode {
    fn decode(state: &ScannerState) -> Mode {
        match state.as_bytes() {
            [MODE_COMMENT, a, b, c, d] => match u32::from_le_bytes([*a, *b, *c, *d]) {
                0 => Mode::Idle,
                depth => Mode::Comment(depth),
            },
            [MODE_STRING] => Mode::String,
            [MODE_QUOTED, tag @ ..] => Mode::Quoted(tag.to_vec()),
            _ => Mode::Idle,
        }
    }
}

fn save_comment(state: &mut ScannerState, depth: u32) {
    let mut bytes = [MODE_COMMENT, 0, 0, 0, 0];
    bytes[1..].copy_from_slice(&depth.to_le_bytes());
    state.set(&bytes);
}

fn save_quoted(state: &mut ScannerState, tag: &[u8]) {
    let mut bytes = Vec::with_capacity(tag.len() + 1);
    bytes.push(MODE_QUOTED);
    bytes.extend_from_slice(tag);
    state.set(&bytes);
}

#[inline]
fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | 0x0c)
}

#[inline]
fn is_ident_char(byte: Option<u8>) -> bool {
    matches!(byte, Some(b) if b.is_ascii_alphanumeric() || b == b'_' || b == b'\'')
}

#[inline]
fn is_operator_char(byte: u8) -> bool {
    matches!(
        byte,
        b'!' | b'$'
            | b'%'
            | b'&'
            | b'*'
            | b'+'
            | b'-'
            | b'.'
            | b'/'
            | b':'
            | b'<'
            | b'='
            | b'>'
            | b'?'
            | b'@'
            | b'^'
            | b'|'
            | b'~'
    )
}

fn keyword(word: &[u8]) -> Option<Symbol> {
    Some(match word {
        b"and" => KW_AND,
        b"end" => KW_END,
        b"exception" => KW_EXCEPTION,
        b"external" => KW_EXTERNAL,
        b"include" => KW_INCLUDE,
        b"module" => KW_MODULE,
        b"mutable" => KW_MUTABLE,
        b"of" => KW_OF,
        b"open" => KW_OPEN,
        b"sig" => KW_SIG,
        b"type" => KW_TYPE,
        b"val" => KW_VAL,
        _ => return None,
    })
}

/// Skip the body of a `"` string after its opening quote; false at EOF
fn skip_string(cursor: &mut InputCursor<'_>) -> bool {
    loop {
        let rest = cursor.remaining();
        match memchr::memchr2(b'\\', b'"', rest) {
            None => {
                cursor.advance_by(rest.len());
                cursor.peek();
                return false;
            }
            Some(index) => {
                cursor.advance_by(index);
                let byte = cursor.peek();
                cursor.advance();
                if byte == Some(b'\\') {
                    if cursor.peek().is_none() {
                        return false;
                    }
                    cursor.advance();
                } else {
                    return true;
                }
            }
        }
    }
}

/// At `{`, the tag of a `{tag|` opener, without consuming anything
fn quoted_tag(cursor: &mut InputCursor<'_>) -> Option<Vec<u8>> {
    let mut tag = Vec::new();
    let mut n = 1;
    loop {
        match cursor.peek_at(n) {
            Some(b) if b.is_ascii_lowercase() || b == b'_' => {
                tag.push(b);
                n += 1;
            }
            Some(b'|') => return Some(tag),
            _ => return None,
        }
    }
}

/// Skip to just past `|tag}`; false at EOF
fn skip_quoted(cursor: &mut InputCursor<'_>, tag: &[u8]) -> bool {
    loop {
        let rest = cursor.remaining();
        let Some(index) = memchr::memchr(b'|', rest) else {
            cursor.advance_by(rest.len());
            cursor.peek();
            return false;
        };
        cursor.advance_by(index);

        let closes = tag
            .iter()
            .enumerate()
            .all(|(i, &b)| cursor.peek_at(i + 1) == Some(b))
            && cursor.peek_at(tag.len() + 1) == Some(b'}');
        if closes {
            cursor.advance_by(tag.len() + 2);
            return true;
        }
        cursor.advance();
    }
}

/// Scan a comment body at `depth`; returns the depth left open at EOF (0 if closed)
fn scan_comment(cursor: &mut InputCursor<'_>, mut depth: u32) -> u32 {
    loop {
        let rest = cursor.remaining();
        let special = memchr::memchr3(b'(', b'*', b'"', rest);
        let brace = memchr::memchr(b'{', &rest[..special.unwrap_or(rest.len())]);
        match brace.or(special) {
            Some(index) => cursor.advance_by(index),
            None => cursor.advance_by(rest.len()),
        }

        match cursor.peek() {
            None => return depth,
            Some(b'(') if cursor.peek_at(1) == Some(b'*') => {
                cursor.advance_by(2);
                depth += 1;
            }
            Some(b'*') if cursor.peek_at(1) == Some(b')') => {
                cursor.advance_by(2);
                depth -= 1;
                if depth == 0 {
                    return 0;
                }
            }
            Some(b'"') => {
                cursor.advance();
                if !skip_string(cursor) {
                    return depth;
                }
            }
            Some(b'{') => match quoted_tag(cursor) {
                Some(tag) => {
                    cursor.advance_by(tag.len() + 2);
                    if !skip_quoted(cursor, &tag) {
                        return depth;
                    }
                }
                None => cursor.advance(),
            },
            Some(_) => cursor.advance(),
        }
    }
}

impl OcamlInterfaceScanner {
    fn finish_comment(cursor: &mut InputCursor<'_>, state: &mut ScannerState, depth: u32) -> Symbol {
        match scan_comment(cursor, depth) {
            0 => {
                state.clear();
                COMMENT
            }
            open => {
                save_comment(state, open);
                UNTERMINATED_COMMENT
            }
        }
    }

    fn finish_string(cursor: &mut InputCursor<'_>, state: &mut ScannerState) -> Symbol {
        if skip_string(cursor) {
            state.clear();
            STRING
        } else {
            state.set(&[MODE_STRING]);
            UNTERMINATED_STRING
        }
    }

    fn finish_quoted(cursor: &mut InputCursor<'_>, state: &mut ScannerState, tag: &[u8]) -> Symbol {
        if skip_quoted(cursor, tag) {
            state.clear();
            QUOTED_STRING
        } else {
            save_quoted(state, tag);
            UNTERMINATED_STRING
        }
    }

    /// Resume a construct that a previous token left open
    fn resume(cursor: &mut InputCursor<'_>, state: &mut ScannerState, mode: Mode) -> Option<Symbol> {
        cursor.mark_token_start();
        if cursor.at_end() {
            return None;
        }
        Some(match mode {
            Mode::Comment(depth) => Self::finish_comment(cursor, state, depth),
            Mode::String => Self::finish_string(cursor, state),
            Mode::Quoted(tag) => Self::finish_quoted(cursor, state, &tag),
            Mode::Idle => return None,
        })
    }

    fn scan_operator(cursor: &mut InputCursor<'_>, valid: ValidSymbols<'_>, first: u8) -> Symbol {
        if valid.contains(OPERATOR) {
            while matches!(cursor.peek(), Some(b) if is_operator_char(b)) {
                cursor.advance();
            }
            return OPERATOR;
        }
        if first == b'-' && cursor.peek_at(1) == Some(b'>') {
            cursor.advance_by(2);
            return ARROW;
        }
        cursor.advance();
        match first {
            b':' => COLON,
            b'=' => EQUAL,
            b'|' => BAR,
            b'*' => STAR,
            b'.' => DOT,
            b'?' => QUESTION,
            _ => INVALID_CHARACTER,
        }
    }

    /// Consume one UTF-8 sequence (or a single stray byte)
    fn scan_invalid(cursor: &mut InputCursor<'_>, first: u8) -> Symbol {
        let width = match first {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => 1,
        };
        let complete =
            (1..width).all(|i| matches!(cursor.peek_at(i), Some(b) if (0x80..0xC0).contains(&b)));
        cursor.advance_by(if complete { width } else { 1 });
        INVALID_CHARACTER
    }
}

impl Scanner for OcamlInterfaceScanner {
    fn scan(
        &self,
        cursor: &mut InputCursor<'_>,
        state: &mut ScannerState,
        valid: ValidSymbols<'_>,
    ) -> Option<Symbol> {
        match Mode::decode(state) {
            Mode::Idle => state.clear(),
            mode => return Self::resume(cursor, state, mode),
        }

        while matches!(cursor.peek(), Some(b) if is_whitespace(b)) {
            cursor.advance();
        }
        cursor.mark_token_start();
        let first = cursor.peek()?;

        let symbol = match first {
            b'(' if cursor.peek_at(1) == Some(b'*') && cursor.peek_at(2) != Some(b')') => {
                cursor.advance_by(2);
                Self::finish_comment(cursor, state, 1)
            }
            b'*' if cursor.peek_at(1) == Some(b')') => {
                cursor.advance_by(2);
                UNMATCHED_COMMENT_CLOSE
            }
            b'"' => {
                cursor.advance();
                Self::finish_string(cursor, state)
            }
            b'{' => {
                let tag = if valid.contains(QUOTED_STRING) {
                    quoted_tag(cursor)
                } else {
                    None
                };
                match tag {
                    Some(tag) => {
                        cursor.advance_by(tag.len() + 2);
                        Self::finish_quoted(cursor, state, &tag)
                    }
                    None => {
                        cursor.advance();
                        LBRACE
                    }
                }
            }
            b'\'' => match cursor.peek_at(1) {
                Some(b) if b.is_ascii_alphabetic() || b == b'_' => {
                    cursor.advance();
                    while is_ident_char(cursor.peek()) {
                        cursor.advance();
                    }
                    TYPE_VARIABLE
                }
                _ => {
                    cursor.advance();
                    INVALID_CHARACTER
                }
            },
            b'a'..=b'z' | b'_' => {
                let start = cursor.offset();
                while is_ident_char(cursor.peek()) {
                    cursor.advance();
                }
                keyword(cursor.slice_from(start)).unwrap_or(LIDENT)
            }
            b'A'..=b'Z' => {
                while is_ident_char(cursor.peek()) {
                    cursor.advance();
                }
                UIDENT
            }
            b if is_operator_char(b) => Self::scan_operator(cursor, valid, b),
            b'(' | b')' | b',' | b'}' | b';' => {
                cursor.advance();
                match first {
                    b'(' => LPAREN,
                    b')' => RPAREN,
                    b',' => COMMA,
                    b'}' => RBRACE,
                    _ => SEMICOLON,
                }
            }
            _ => Self::scan_invalid(cursor, first),
        };
        Some(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{next_token, Length, Token};

    fn all_valid() -> Vec<bool> {
        vec![true; SYMBOL_COUNT]
    }

    fn without_operator() -> Vec<bool> {
        let mut valid = all_valid();
        valid[OPERATOR as usize] = false;
        valid
    }

    fn lex_all(input: &[u8], valid: &[bool]) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut position = Length::ZERO;
        let mut state = ScannerState::new();
        loop {
            let token = next_token(
                &OcamlInterfaceScanner,
                input,
                position,
                &state,
                ValidSymbols::new(valid),
                END_OF_INPUT,
            );
            position = token.end();
            state = token.scan_end.clone();
            let done = token.symbol == END_OF_INPUT;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    fn kinds(input: &[u8], valid: &[bool]) -> Vec<Symbol> {
        lex_all(input, valid).iter().map(|t| t.symbol).collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds(b"val x_1' : Foo.t", &without_operator()),
            vec![KW_VAL, LIDENT, COLON, UIDENT, DOT, LIDENT, END_OF_INPUT]
        );
        assert_eq!(
            kinds(b"module type sig end", &without_operator()),
            vec![KW_MODULE, KW_TYPE, KW_SIG, KW_END, END_OF_INPUT]
        );
    }

    #[test]
    fn test_type_variables_and_invalid_quote() {
        assert_eq!(
            kinds(b"'a ' 'b", &without_operator()),
            vec![TYPE_VARIABLE, INVALID_CHARACTER, TYPE_VARIABLE, END_OF_INPUT]
        );
    }

    #[test]
    fn test_nested_comment() {
        let tokens = lex_all(b"(* a (* b *) \"*)\" c *) x", &without_operator());
        assert_eq!(tokens[0].symbol, COMMENT);
        assert_eq!(tokens[0].end_byte(), 22);
        assert!(tokens[0].scan_end.is_idle());
        assert_eq!(tokens[1].symbol, LIDENT);
    }

    #[test]
    fn test_paren_star_paren_is_not_a_comment() {
        assert_eq!(
            kinds(b"(*)", &without_operator()),
            vec![LPAREN, STAR, RPAREN, END_OF_INPUT]
        );
    }

    #[test]
    fn test_unterminated_comment_keeps_depth() {
        let tokens = lex_all(b"(* a (* b *)", &without_operator());
        assert_eq!(tokens[0].symbol, UNTERMINATED_COMMENT);
        assert_eq!(tokens[0].end_byte(), 12);
        assert_eq!(tokens[0].scan_end.as_bytes(), &[MODE_COMMENT, 1, 0, 0, 0]);
        // End of input leaves the open depth in place
        assert_eq!(tokens[1].symbol, END_OF_INPUT);
        assert_eq!(tokens[1].scan_end, tokens[0].scan_end);
    }

    #[test]
    fn test_unmatched_comment_close() {
        assert_eq!(
            kinds(b"x *) y", &without_operator()),
            vec![LIDENT, UNMATCHED_COMMENT_CLOSE, LIDENT, END_OF_INPUT]
        );
    }

    #[test]
    fn test_strings() {
        let tokens = lex_all(br#""a\"b" "open"#, &without_operator());
        assert_eq!(tokens[0].symbol, STRING);
        assert_eq!(tokens[0].end_byte(), 6);
        assert_eq!(tokens[1].symbol, UNTERMINATED_STRING);
        assert_eq!(tokens[1].start_byte(), 7);
        assert_eq!(tokens[1].end_byte(), 12);
        assert_eq!(tokens[1].scan_end.as_bytes(), &[MODE_STRING]);
    }

    #[test]
    fn test_quoted_string_only_where_valid() {
        let tokens = lex_all(b"{id|a |x} b|id} ", &all_valid());
        assert_eq!(tokens[0].symbol, QUOTED_STRING);
        assert_eq!(tokens[0].end_byte(), 15);

        assert_eq!(
            kinds(b"{id|", &without_quoted()),
            vec![LBRACE, LIDENT, BAR, END_OF_INPUT]
        );
    }

    fn without_quoted() -> Vec<bool> {
        let mut valid = without_operator();
        valid[QUOTED_STRING as usize] = false;
        valid
    }

    #[test]
    fn test_unterminated_quoted_string_saves_tag() {
        let tokens = lex_all(b"{xy|abc|x}", &all_valid());
        assert_eq!(tokens[0].symbol, UNTERMINATED_STRING);
        assert_eq!(tokens[0].end_byte(), 10);
        assert_eq!(tokens[0].scan_end.as_bytes(), b"\x03xy");
    }

    #[test]
    fn test_operator_context() {
        let mut valid = without_operator();
        assert_eq!(
            kinds(b"-> * +", &valid),
            vec![ARROW, STAR, INVALID_CHARACTER, END_OF_INPUT]
        );
        valid[OPERATOR as usize] = true;
        let tokens = lex_all(b"+. ->", &valid);
        assert_eq!(tokens[0].symbol, OPERATOR);
        assert_eq!(tokens[0].end_byte(), 2);
        assert_eq!(tokens[1].symbol, OPERATOR);
    }

    #[test]
    fn test_utf8_sequences() {
        let tokens = lex_all("é x".as_bytes(), &without_operator());
        assert_eq!(tokens[0].symbol, INVALID_CHARACTER);
        assert_eq!(tokens[0].end_byte(), 2);

        assert_eq!(
            kinds(b"\xff\xfe", &without_operator()),
            vec![INVALID_CHARACTER, INVALID_CHARACTER, END_OF_INPUT]
        );
    }

    #[test]
    fn test_points_across_lines() {
        let tokens = lex_all(b"val\n  x", &without_operator());
        assert_eq!(tokens[1].start_position(), crate::engine::Point::new(1, 2));
        assert_eq!(tokens[1].padding.bytes, 3);
    }

    #[test]
    fn test_lookahead_of_identifier() {
        let tokens = lex_all(b"abc def", &without_operator());
        assert_eq!(tokens[0].lookahead_bytes, 1);
    }

    #[test]
    fn test_resume_comment_from_state() {
        let mut state = ScannerState::new();
        save_comment(&mut state, 2);
        let valid = without_operator();
        let token = next_token(
            &OcamlInterfaceScanner,
            b"x *) y *) z",
            Length::ZERO,
            &state,
            ValidSymbols::new(&valid),
            END_OF_INPUT,
        );
        assert_eq!(token.symbol, COMMENT);
        assert_eq!(token.end_byte(), 9);
        assert!(token.scan_end.is_idle());
    }
}
