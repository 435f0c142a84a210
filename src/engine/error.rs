//! Error types
//!
//! Malformed input never produces an [`Error`]: lexical problems become error
//! tokens and syntax problems become `ERROR` nodes, both reported through
//! [`Diagnostic`]s. [`Error`] is reserved for misuse at the API boundary.

use super::point::{Point, Range};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors returned by the parser and tree APIs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An edit that does not fit the tree it is applied to
    #[error("invalid edit: {reason}")]
    InvalidEdit {
        /// Why the edit was rejected
        reason: String,
    },

    /// The previous tree was produced for a different language
    #[error("tree was parsed with language `{tree}`, parser uses `{parser}`")]
    LanguageMismatch {
        /// Language of the parser
        parser: &'static str,
        /// Language of the tree
        tree: &'static str,
    },

    /// The previous tree does not describe the text being parsed
    #[error("previous tree covers {tree_len} bytes but input has {input_len}")]
    StaleTree {
        /// Text length the tree was edited to
        tree_len: usize,
        /// Length of the new input
        input_len: usize,
    },

    /// Input exceeds the configured maximum size
    #[error("input too large: {input_size} bytes (max: {max_size} bytes)")]
    InputTooLarge {
        /// Size of the input in bytes
        input_size: usize,
        /// Maximum allowed size
        max_size: usize,
    },

    /// Language tables failed to load or validate
    #[error("invalid language tables: {reason}")]
    InvalidLanguage {
        /// Reason why the tables are invalid
        reason: String,
    },
}

impl Error {
    /// Create an invalid edit error
    pub fn invalid_edit(reason: impl Into<String>) -> Self {
        Self::InvalidEdit {
            reason: reason.into(),
        }
    }

    /// Create an invalid language error
    pub fn invalid_language(reason: impl Into<String>) -> Self {
        Self::InvalidLanguage {
            reason: reason.into(),
        }
    }
}

/// Result alias for the parser and tree APIs
pub type Result<T> = std::result::Result<T, Error>;

/// What kind of damage an error node marks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// End of input inside a comment
    UnterminatedComment,
    /// End of input inside a string or quoted string
    UnterminatedString,
    /// A comment close marker with no open comment
    UnmatchedCommentClose,
    /// A byte sequence that starts no token
    InvalidCharacter,
    /// Tokens that do not fit the grammar at this point
    SyntaxError,
}

impl DiagnosticKind {
    /// Map an error token kind name to a diagnostic kind
    pub fn from_token_kind(kind: &str) -> Option<Self> {
        match kind {
            "unterminated_comment" => Some(Self::UnterminatedComment),
            "unterminated_string" => Some(Self::UnterminatedString),
            "unmatched_comment_close" => Some(Self::UnmatchedCommentClose),
            "invalid_character" => Some(Self::InvalidCharacter),
            _ => None,
        }
    }

    /// Human readable description
    pub fn message(&self) -> &'static str {
        match self {
            Self::UnterminatedComment => "unterminated comment",
            Self::UnterminatedString => "unterminated string literal",
            Self::UnmatchedCommentClose => "comment close without matching open",
            Self::InvalidCharacter => "invalid character",
            Self::SyntaxError => "syntax error",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// One problem found in the input, located by its error node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Kind of problem
    pub kind: DiagnosticKind,
    /// Range of the offending node or token
    pub range: Range,
}

impl Diagnostic {
    /// Start point, for "line:column" style reporting
    pub fn start_point(&self) -> Point {
        self.range.start_point
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at line {}, column {}",
            self.kind,
            self.range.start_point.row + 1,
            self.range.start_point.column + 1
        )
    }
}
