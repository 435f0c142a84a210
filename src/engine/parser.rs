//! Table-driven LR Walker
//!
//! The [`Parser`] pulls tokens from the language's scanner, consults the
//! action table of the state on top of the stack and shifts, reduces or
//! accepts. Malformed input is never an error: when the table has no action
//! the walker scans ahead for a token some stack state can continue with and
//! wraps everything in between into an `ERROR` node.
//!
//! Given the previous tree (already edited), the walker offers unchanged
//! subtrees from it at each token boundary and shifts them whole when the
//! automaton and scanner are provably in the same situation as when the
//! subtree was built.

use super::error::{Error, Result};
use super::incremental::ReusableNode;
use super::language::{Language, ParseAction, Symbol};
use super::point::Length;
use super::scanner::{next_token, ScannerState, Token, ValidSymbols};
use super::stack::ParseStack;
use super::subtree::{Subtree, NO_PARSE_STATE};
use super::tree::Tree;
use std::collections::VecDeque;
use std::sync::Arc;

/// Default maximum input size (100 MB)
pub const DEFAULT_MAX_INPUT_SIZE: usize = 100 * 1024 * 1024;

/// Default number of tokens examined ahead of an error
pub const DEFAULT_MAX_RECOVERY_LOOKAHEAD: usize = 32;

/// Configuration options for the parser
///
/// # Example
///
/// ```rust
/// use signet::engine::ParserConfig;
///
/// let config = ParserConfig::new()
///     .with_max_input_size(10 * 1024 * 1024)
///     .with_max_recovery_lookahead(8);
/// assert!(config.reuse_subtrees);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ParserConfig {
    /// Maximum allowed input size in bytes
    pub max_input_size: usize,

    /// How many tokens error recovery may skip before giving up on a
    /// resynchronization point
    pub max_recovery_lookahead: usize,

    /// Reuse unchanged subtrees of the previous tree
    pub reuse_subtrees: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_input_size: DEFAULT_MAX_INPUT_SIZE,
            max_recovery_lookahead: DEFAULT_MAX_RECOVERY_LOOKAHEAD,
            reuse_subtrees: true,
        }
    }
}

impl ParserConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum input size
    pub fn with_max_input_size(mut self, size: usize) -> Self {
        self.max_input_size = size;
        self
    }

    /// Set the recovery lookahead cap
    pub fn with_max_recovery_lookahead(mut self, tokens: usize) -> Self {
        self.max_recovery_lookahead = tokens;
        self
    }

    /// Enable or disable subtree reuse
    pub fn with_reuse_subtrees(mut self, reuse: bool) -> Self {
        self.reuse_subtrees = reuse;
        self
    }
}

/// Counters from the most recent parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IncrementalStats {
    /// Subtrees shifted whole from the previous tree
    pub reused_nodes: usize,
    /// Bytes covered by reused subtrees
    pub reused_bytes: usize,
    /// Tokens produced by the scanner
    pub relexed_tokens: usize,
    /// Error recoveries performed
    pub recoveries: usize,
}

/// Incremental parser for one language
///
/// # Example
///
/// ```rust
/// use signet::engine::{InputEdit, Parser};
/// use signet::ocaml_interface;
///
/// let mut parser = Parser::new(ocaml_interface::language());
/// let old = b"val x : int";
/// let tree = parser.parse(old, None).unwrap();
///
/// let new = b"val x : bool";
/// let edit = InputEdit::replace(old, 8, 11, b"bool");
/// let edited = tree.edit(&edit).unwrap();
/// let tree = parser.parse(new, Some(&edited)).unwrap();
/// assert!(!tree.has_error());
/// ```
#[derive(Debug)]
pub struct Parser {
    language: &'static Language,
    config: ParserConfig,
    last_stats: IncrementalStats,
}

impl Parser {
    /// Create a parser with default configuration
    pub fn new(language: &'static Language) -> Self {
        Self::with_config(language, ParserConfig::default())
    }

    /// Create a parser with custom configuration
    pub fn with_config(language: &'static Language, config: ParserConfig) -> Self {
        Self {
            language,
            config,
            last_stats: IncrementalStats::default(),
        }
    }

    /// Language this parser produces trees for
    pub fn language(&self) -> &'static Language {
        self.language
    }

    /// Current configuration
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Counters from the most recent successful parse
    pub fn last_stats(&self) -> IncrementalStats {
        self.last_stats
    }

    /// Parse `input`, reusing what it can of `old_tree`
    ///
    /// `old_tree` must already have every edit applied that turns its text
    /// into `input`. The result is identical to parsing `input` from scratch.
    pub fn parse(&mut self, input: &[u8], old_tree: Option<&Tree>) -> Result<Tree> {
        if input.len() > self.config.max_input_size {
            return Err(Error::InputTooLarge {
                input_size: input.len(),
                max_size: self.config.max_input_size,
            });
        }

        let reuse = match old_tree {
            Some(tree) => {
                if !std::ptr::eq(tree.language(), self.language) {
                    return Err(Error::LanguageMismatch {
                        parser: self.language.name(),
                        tree: tree.language().name(),
                    });
                }
                if tree.text_len().bytes != input.len() {
                    return Err(Error::StaleTree {
                        tree_len: tree.text_len().bytes,
                        input_len: input.len(),
                    });
                }
                if self.config.reuse_subtrees {
                    Some(ReusableNode::new(tree.root_subtree().clone(), self.language))
                } else {
                    None
                }
            }
            None => None,
        };

        let mut walker = Walker::new(self.language, input, reuse, &self.config);
        let tree = walker.run()?;
        self.last_stats = walker.stats;

        log_debug!(
            "Parse finished: {} bytes, {} nodes reused, {} tokens lexed, {} recoveries",
            input.len(),
            walker.stats.reused_nodes,
            walker.stats.relexed_tokens,
            walker.stats.recoveries
        );
        Ok(tree)
    }
}

/// State of one parse
struct Walker<'a> {
    language: &'static Language,
    input: &'a [u8],
    stack: ParseStack,
    /// Absolute position after the last consumed token
    position: Length,
    /// Scanner state at `position`
    scan_state: ScannerState,
    /// Lexed but unconsumed tokens; the front is the lookahead
    buffer: VecDeque<Token>,
    reuse: Option<ReusableNode>,
    /// Old subtree that starts with the current lookahead
    candidate: Option<Arc<Subtree>>,
    max_recovery_lookahead: usize,
    stats: IncrementalStats,
}

impl<'a> Walker<'a> {
    fn new(
        language: &'static Language,
        input: &'a [u8],
        reuse: Option<ReusableNode>,
        config: &ParserConfig,
    ) -> Self {
        Self {
            language,
            input,
            stack: ParseStack::new(language.start_state()),
            position: Length::ZERO,
            scan_state: ScannerState::new(),
            buffer: VecDeque::with_capacity(4),
            reuse,
            candidate: None,
            max_recovery_lookahead: config.max_recovery_lookahead,
            stats: IncrementalStats::default(),
        }
    }

    fn run(&mut self) -> Result<Tree> {
        loop {
            let (symbol, dependency) = self.lookahead();
            let state = self.stack.top().state;

            if self.language.is_extra(symbol) {
                let token = self.consume();
                let leaf = Subtree::leaf(token, NO_PARSE_STATE, self.language);
                self.stack.push(state, Arc::new(leaf), self.position, false);
                continue;
            }

            match self.language.action(state, symbol) {
                None => {
                    if self.recover() {
                        return Ok(self.finish());
                    }
                }
                Some(ParseAction::Shift { state: next, .. }) => {
                    if self.shift_candidate() {
                        continue;
                    }
                    let token = self.consume();
                    let leaf = Subtree::leaf(token, state, self.language);
                    self.stack.push(next, Arc::new(leaf), self.position, false);
                }
                Some(ParseAction::Reduce { production, .. }) => {
                    self.reduce(production, dependency)?;
                }
                Some(ParseAction::Accept { .. }) => return Ok(self.finish()),
            }
        }
    }

    /// Scan one token at `at` in `lex_mode`
    fn lex(&self, at: Length, state: &ScannerState, lex_mode: usize) -> Token {
        next_token(
            self.language.scanner(),
            self.input,
            at,
            state,
            ValidSymbols::new(self.language.valid_symbols(lex_mode)),
            self.language.eof_symbol(),
        )
    }

    /// Make sure a lookahead token exists; returns its symbol and the
    /// furthest byte it depended on
    fn lookahead(&mut self) -> (Symbol, usize) {
        if self.buffer.is_empty() {
            self.candidate = None;
            let lex_mode = self.language.lex_mode(self.stack.top().state);
            let candidate = match self.reuse.as_mut() {
                Some(reuse) => reuse.candidate_at(self.position.bytes),
                None => None,
            };

            let token = self.lex(self.position, &self.scan_state, lex_mode);
            self.stats.relexed_tokens += 1;

            if let Some(candidate) = candidate {
                let matches = candidate.first_leaf().is_some_and(|first| {
                    first.symbol() == token.symbol
                        && first.padding().bytes == token.padding.bytes
                        && first.size().bytes == token.size.bytes
                }) && candidate.scan_start() == &self.scan_state;

                if matches {
                    self.candidate = Some(candidate);
                } else {
                    log_debug!(
                        "Rejected reuse of {} at byte {}: first token or scanner state differs",
                        self.language.symbol_name(candidate.symbol()),
                        self.position.bytes
                    );
                }
            }
            self.buffer.push_back(token);
        }

        match self.buffer.front() {
            Some(token) => (token.symbol, token.end_byte() + token.lookahead_bytes),
            None => (self.language.eof_symbol(), self.position.bytes),
        }
    }

    /// Take the next token and advance past it
    fn consume(&mut self) -> Token {
        let token = match self.buffer.pop_front() {
            Some(token) => token,
            None => {
                let lex_mode = self.language.lex_mode(self.stack.top().state);
                self.stats.relexed_tokens += 1;
                self.lex(self.position, &self.scan_state, lex_mode)
            }
        };
        self.position = token.end();
        self.scan_state = token.scan_end.clone();
        token
    }

    /// Shift the pending reuse candidate whole, if the automaton is in the
    /// state it was originally built in
    fn shift_candidate(&mut self) -> bool {
        let Some(candidate) = self.candidate.take() else {
            return false;
        };
        let state = self.stack.top().state;
        if candidate.parse_state() != state || self.buffer.len() != 1 {
            log_trace!(
                "Candidate {} was built in state {}, now in {}",
                self.language.symbol_name(candidate.symbol()),
                candidate.parse_state(),
                state
            );
            return false;
        }
        let Some(target) = self.language.goto(state, candidate.symbol()) else {
            return false;
        };

        self.buffer.clear();
        self.position = self.position + candidate.total_size();
        self.scan_state = candidate.scan_end().clone();
        if let Some(reuse) = self.reuse.as_mut() {
            reuse.advance();
        }
        self.stats.reused_nodes += 1;
        self.stats.reused_bytes += candidate.total_size().bytes;

        log_trace!(
            "Reused {} ending at byte {}",
            self.language.symbol_name(candidate.symbol()),
            self.position.bytes
        );
        self.stack.push(target, candidate, self.position, false);
        true
    }

    fn reduce(&mut self, production: u16, dependency: usize) -> Result<()> {
        let production = self.language.production(production);
        let (trailing, popped) = self.stack.pop_reduction(production.child_count, self.language);

        let below = self.stack.top();
        let (below_state, below_end) = (below.state, below.end);
        let scan_state = trailing
            .first()
            .and_then(|entry| entry.node.as_ref())
            .map(|node| node.scan_start().clone())
            .unwrap_or_else(|| self.scan_state.clone());
        let fragile = popped.iter().any(|entry| entry.fragile);
        let end = popped.last().map_or(below_end, |entry| entry.end);

        let children = popped.into_iter().filter_map(|entry| entry.node).collect();
        let mut node = Subtree::node(
            self.language,
            production.lhs,
            children,
            below_end,
            dependency,
            below_state,
            &scan_state,
        );
        node.fragile = fragile;

        let target = self.language.goto(below_state, production.lhs).ok_or_else(|| {
            Error::invalid_language(format!(
                "no goto from state {} on {}",
                below_state,
                self.language.symbol_name(production.lhs)
            ))
        })?;

        self.stack.push(target, Arc::new(node), end, fragile);
        for entry in trailing {
            if let Some(node) = entry.node {
                self.stack.push(target, node, entry.end, entry.fragile);
            }
        }
        Ok(())
    }

    /// Find a resynchronization point after a token with no action
    ///
    /// Returns true when the input ran out without one and the parse must
    /// end here.
    fn recover(&mut self) -> bool {
        self.candidate = None;
        self.stats.recoveries += 1;
        self.relex_lookahead();

        let language = self.language;
        let eof = language.eof_symbol();
        let error_mode = language.error_lex_mode();
        let top = self.stack.len() - 1;

        let mut skip = 0;
        loop {
            while self.buffer.len() <= skip {
                let (at, state) = match self.buffer.back() {
                    Some(last) if last.symbol == eof => break,
                    Some(last) => (last.end(), last.scan_end.clone()),
                    None => (self.position, self.scan_state.clone()),
                };
                let token = self.lex(at, &state, error_mode);
                self.stats.relexed_tokens += 1;
                self.buffer.push_back(token);
            }
            let Some(symbol) = self.buffer.get(skip).map(|token| token.symbol) else {
                break;
            };

            if !language.is_extra(symbol) {
                for index in (0..=top).rev() {
                    let entry = self.stack.get(index);
                    if entry.is_extra(language) || !language.has_action(entry.state, symbol) {
                        continue;
                    }
                    // Resuming in place would fail again
                    if index == top && skip == 0 {
                        continue;
                    }
                    log_debug!(
                        "Recovered at byte {}: popped {} entries, skipped {} tokens, resuming on {}",
                        self.position.bytes,
                        top - index,
                        skip,
                        language.symbol_name(symbol)
                    );
                    self.apply_recovery(index, skip);
                    return false;
                }
            }

            if symbol == eof || skip >= self.max_recovery_lookahead {
                break;
            }
            skip += 1;
        }

        if self.buffer.front().is_some_and(|token| token.symbol == eof) {
            log_debug!("No state accepts end of input; wrapping the stack in an error");
            self.apply_recovery(0, 0);
            return true;
        }

        log_debug!(
            "No resynchronization point within {} tokens at byte {}; skipping one token",
            self.max_recovery_lookahead,
            self.position.bytes
        );
        self.apply_recovery(top, 1);
        false
    }

    /// Lex the lookahead again in the error lex mode, where every token kind
    /// is valid
    ///
    /// Only a lookahead scanned from an idle state is redone. Tokens behind
    /// it are dropped when the new token ends elsewhere.
    fn relex_lookahead(&mut self) {
        let Some(front) = self.buffer.front() else {
            return;
        };
        if !front.scan_start.is_idle() {
            return;
        }
        let token = self.lex(self.position, &front.scan_start, self.language.error_lex_mode());
        let same_extent = token.end() == front.end() && token.scan_end == front.scan_end;
        self.stats.relexed_tokens += 1;

        if token.symbol != front.symbol {
            log_trace!(
                "Relexed {} as {} for recovery",
                self.language.symbol_name(front.symbol),
                self.language.symbol_name(token.symbol)
            );
        }
        if same_extent {
            self.buffer.pop_front();
        } else {
            self.buffer.clear();
        }
        self.buffer.push_front(token);
    }

    /// Wrap the entries above `index` and the next `skip` tokens in an
    /// `ERROR` node
    fn apply_recovery(&mut self, index: usize, skip: usize) {
        let language = self.language;
        let error_symbol = language.error_symbol();

        let popped = self.stack.split_above(index);
        self.stack.mark_fragile();

        let mut children: Vec<Arc<Subtree>> = Vec::with_capacity(popped.len() + skip);
        let mut add = |node: Arc<Subtree>| {
            if node.symbol() == error_symbol && !node.is_leaf() {
                children.extend(node.children().iter().cloned());
            } else {
                children.push(node);
            }
        };
        for entry in popped {
            if let Some(node) = entry.node {
                add(node);
            }
        }
        for _ in 0..skip {
            let token = self.consume();
            add(Arc::new(Subtree::leaf(token, NO_PARSE_STATE, language)));
        }
        if children.is_empty() {
            return;
        }

        let below = self.stack.top();
        let (below_state, below_end) = (below.state, below.end);
        let dependency = match self.buffer.front() {
            Some(token) => token.end_byte() + token.lookahead_bytes,
            None => self.position.bytes,
        };
        let node = Subtree::node(
            language,
            error_symbol,
            children,
            below_end,
            dependency,
            below_state,
            &self.scan_state,
        );
        self.stack.push(below_state, Arc::new(node), self.position, false);
    }

    /// Assemble the root from whatever is on the stack
    fn finish(&mut self) -> Tree {
        let eof = self.consume();
        let dependency = eof.end_byte() + eof.lookahead_bytes;
        let language = self.language;
        let root_symbol = language.root_symbol();

        let mut children = Vec::new();
        for entry in self.stack.drain() {
            let splice = !entry.is_extra(language);
            if let Some(node) = entry.node {
                if splice && node.symbol() == root_symbol {
                    children.extend(node.children().iter().cloned());
                } else {
                    children.push(node);
                }
            }
        }

        let root = Subtree::node(
            language,
            root_symbol,
            children,
            Length::ZERO,
            dependency,
            language.start_state(),
            &ScannerState::new(),
        );
        Tree::new(
            Arc::new(root),
            language,
            self.position,
            self.scan_state.clone(),
        )
    }
}
