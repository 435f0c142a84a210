//! Language Tables
//!
//! A [`Language`] is the read-only output of the offline grammar compiler:
//! symbol metadata, productions, lexical modes and the LR automaton, paired
//! with the hand-written [`Scanner`] that lexes for it. Tables are loaded once
//! from JSON and shared by reference between every parser and tree that uses
//! them.
//!
//! # JSON Format
//!
//! ```json
//! {
//!     "name": "ocaml_interface",
//!     "version": 1,
//!     "start_state": 0, "eof_symbol": 0, "error_symbol": 1, "error_lex_mode": 46,
//!     "symbols": [{"name": "comment", "terminal": true, "named": true, "visible": true, "extra": true}],
//!     "productions": [{"lhs": 38, "child_count": 1, "precedence": 0}],
//!     "lex_modes": [[0, 2, 15]],
//!     "states": [{"lex_mode": 0,
//!                 "actions": [[0, [{"kind": "reduce", "production": 2, "precedence": 0}]]],
//!                 "gotos": [[38, 1]]}]
//! }
//! ```
//!
//! A table cell may list several actions. The walker takes the one with the
//! highest precedence; ties go to the earliest listed. That choice is made
//! once here, at load time.

use super::error::{Error, Result};
use super::scanner::Scanner;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Grammar symbol id
pub type Symbol = u16;

/// Automaton state id
pub type StateId = u16;

const NO_STATE: StateId = StateId::MAX;

/// Metadata for one grammar symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    /// Kind name shown in trees
    pub name: String,
    /// Produced by the scanner rather than by a reduction
    pub terminal: bool,
    /// Named (as opposed to literal punctuation/keyword)
    pub named: bool,
    /// Hidden symbols are spliced into their parent
    pub visible: bool,
    /// May appear anywhere (comments)
    pub extra: bool,
}

/// One production `lhs -> child_count symbols`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Production {
    /// Left-hand side nonterminal
    pub lhs: Symbol,
    /// Number of right-hand side symbols
    pub child_count: usize,
    /// Precedence assigned by the grammar
    #[serde(default)]
    pub precedence: i32,
}

/// An automaton action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ParseAction {
    /// Consume the lookahead and move to `state`
    Shift {
        /// Target state
        state: StateId,
        /// Conflict resolution weight
        #[serde(default)]
        precedence: i32,
    },
    /// Pop the production's children and push its left-hand side
    Reduce {
        /// Production index
        production: u16,
        /// Conflict resolution weight
        #[serde(default)]
        precedence: i32,
    },
    /// Input is complete
    Accept {
        /// Conflict resolution weight
        #[serde(default)]
        precedence: i32,
    },
}

impl ParseAction {
    /// Precedence used for conflict resolution
    pub fn precedence(&self) -> i32 {
        match *self {
            ParseAction::Shift { precedence, .. }
            | ParseAction::Reduce { precedence, .. }
            | ParseAction::Accept { precedence } => precedence,
        }
    }
}

/// Serialized state row
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StateRow {
    lex_mode: usize,
    actions: Vec<(Symbol, Vec<ParseAction>)>,
    gotos: Vec<(Symbol, StateId)>,
}

/// Serialized table set
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LanguageTables {
    name: String,
    version: u32,
    start_state: StateId,
    eof_symbol: Symbol,
    error_symbol: Symbol,
    error_lex_mode: usize,
    symbols: Vec<SymbolInfo>,
    productions: Vec<Production>,
    lex_modes: Vec<Vec<Symbol>>,
    states: Vec<StateRow>,
}

/// Loaded, validated language definition
pub struct Language {
    name: String,
    version: u32,
    start_state: StateId,
    eof_symbol: Symbol,
    error_symbol: Symbol,
    error_lex_mode: usize,
    symbols: Vec<SymbolInfo>,
    productions: Vec<Production>,
    /// `lex_modes[m][symbol]` is true when the symbol may be scanned in mode `m`
    lex_modes: Vec<Vec<bool>>,
    state_lex_modes: Vec<usize>,
    /// Every listed action, `state * symbol_count + symbol`
    actions: Vec<Vec<ParseAction>>,
    /// Resolved action per cell
    resolved: Vec<Option<ParseAction>>,
    gotos: Vec<StateId>,
    by_name: HashMap<String, Symbol>,
    scanner: Box<dyn Scanner>,
}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("symbols", &self.symbols.len())
            .field("states", &self.state_lex_modes.len())
            .finish_non_exhaustive()
    }
}

impl Language {
    /// Load and validate tables from JSON, pairing them with their scanner
    pub fn from_json(json: &str, scanner: impl Scanner + 'static) -> Result<Self> {
        let tables: LanguageTables =
            serde_json::from_str(json).map_err(|e| Error::invalid_language(e.to_string()))?;
        Self::from_tables(tables, Box::new(scanner))
    }

    fn from_tables(tables: LanguageTables, scanner: Box<dyn Scanner>) -> Result<Self> {
        let symbol_count = tables.symbols.len();
        let state_count = tables.states.len();
        if symbol_count == 0 || state_count == 0 {
            return Err(Error::invalid_language("empty symbol or state table"));
        }
        if symbol_count >= Symbol::MAX as usize || state_count >= NO_STATE as usize {
            return Err(Error::invalid_language("table too large"));
        }

        let check_symbol = |sym: Symbol, what: &str| -> Result<()> {
            if (sym as usize) < symbol_count {
                Ok(())
            } else {
                Err(Error::invalid_language(format!(
                    "{} refers to unknown symbol {}",
                    what, sym
                )))
            }
        };
        let check_state = |state: StateId, what: &str| -> Result<()> {
            if (state as usize) < state_count {
                Ok(())
            } else {
                Err(Error::invalid_language(format!(
                    "{} refers to unknown state {}",
                    what, state
                )))
            }
        };

        check_symbol(tables.eof_symbol, "eof_symbol")?;
        check_symbol(tables.error_symbol, "error_symbol")?;
        check_state(tables.start_state, "start_state")?;
        if tables.error_lex_mode >= tables.lex_modes.len() {
            return Err(Error::invalid_language("error_lex_mode out of range"));
        }
        if tables.productions.is_empty() {
            return Err(Error::invalid_language("missing start production"));
        }

        for (index, production) in tables.productions.iter().enumerate() {
            check_symbol(production.lhs, "production")?;
            if tables.symbols[production.lhs as usize].terminal {
                return Err(Error::invalid_language(format!(
                    "production {} has a terminal left-hand side",
                    index
                )));
            }
        }

        let mut lex_modes = Vec::with_capacity(tables.lex_modes.len());
        for mode in &tables.lex_modes {
            let mut valid = vec![false; symbol_count];
            for &sym in mode {
                check_symbol(sym, "lex mode")?;
                valid[sym as usize] = true;
            }
            lex_modes.push(valid);
        }

        let cells = state_count * symbol_count;
        let mut actions = vec![Vec::new(); cells];
        let mut resolved = vec![None; cells];
        let mut gotos = vec![NO_STATE; cells];
        let mut state_lex_modes = Vec::with_capacity(state_count);

        for (state, row) in tables.states.iter().enumerate() {
            if row.lex_mode >= lex_modes.len() {
                return Err(Error::invalid_language(format!(
                    "state {} uses unknown lex mode {}",
                    state, row.lex_mode
                )));
            }
            state_lex_modes.push(row.lex_mode);

            for (sym, list) in &row.actions {
                check_symbol(*sym, "action")?;
                for action in list {
                    match *action {
                        ParseAction::Shift { state: target, .. } => check_state(target, "shift")?,
                        ParseAction::Reduce { production, .. } => {
                            if production as usize >= tables.productions.len() {
                                return Err(Error::invalid_language(format!(
                                    "reduce refers to unknown production {}",
                                    production
                                )));
                            }
                        }
                        ParseAction::Accept { .. } => {}
                    }
                }
                let cell = state * symbol_count + *sym as usize;
                resolved[cell] = resolve(list);
                actions[cell] = list.clone();
            }

            for (sym, target) in &row.gotos {
                check_symbol(*sym, "goto")?;
                check_state(*target, "goto")?;
                gotos[state * symbol_count + *sym as usize] = *target;
            }
        }

        let mut by_name = HashMap::with_capacity(symbol_count);
        for (index, info) in tables.symbols.iter().enumerate() {
            by_name.entry(info.name.clone()).or_insert(index as Symbol);
        }

        Ok(Self {
            name: tables.name,
            version: tables.version,
            start_state: tables.start_state,
            eof_symbol: tables.eof_symbol,
            error_symbol: tables.error_symbol,
            error_lex_mode: tables.error_lex_mode,
            symbols: tables.symbols,
            productions: tables.productions,
            lex_modes,
            state_lex_modes,
            actions,
            resolved,
            gotos,
            by_name,
            scanner,
        })
    }

    /// The scanner that lexes for these tables
    pub fn scanner(&self) -> &dyn Scanner {
        self.scanner.as_ref()
    }

    /// Symbol of the tree root (left-hand side of the start production)
    pub fn root_symbol(&self) -> Symbol {
        self.productions[0].lhs
    }

    /// Language name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Table format version
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Number of symbols
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Number of automaton states
    pub fn state_count(&self) -> usize {
        self.state_lex_modes.len()
    }

    /// Initial automaton state
    pub fn start_state(&self) -> StateId {
        self.start_state
    }

    /// End-of-input symbol
    pub fn eof_symbol(&self) -> Symbol {
        self.eof_symbol
    }

    /// Symbol used for error nodes
    pub fn error_symbol(&self) -> Symbol {
        self.error_symbol
    }

    /// Metadata for a symbol
    pub fn symbol_info(&self, symbol: Symbol) -> &SymbolInfo {
        &self.symbols[symbol as usize]
    }

    /// Kind name of a symbol
    pub fn symbol_name(&self, symbol: Symbol) -> &str {
        self.symbols
            .get(symbol as usize)
            .map(|info| info.name.as_str())
            .unwrap_or("")
    }

    /// Look a symbol up by kind name
    pub fn symbol_for_name(&self, name: &str) -> Option<Symbol> {
        self.by_name.get(name).copied()
    }

    /// Whether a symbol is named
    pub fn is_named(&self, symbol: Symbol) -> bool {
        self.symbols[symbol as usize].named
    }

    /// Whether a symbol appears in trees (hidden symbols are spliced away)
    pub fn is_visible(&self, symbol: Symbol) -> bool {
        self.symbols[symbol as usize].visible
    }

    /// Whether a symbol is an extra
    pub fn is_extra(&self, symbol: Symbol) -> bool {
        self.symbols[symbol as usize].extra
    }

    /// Whether a symbol is a terminal
    pub fn is_terminal(&self, symbol: Symbol) -> bool {
        self.symbols[symbol as usize].terminal
    }

    /// Production by index
    pub fn production(&self, index: u16) -> Production {
        self.productions[index as usize]
    }

    /// Lex mode used when the automaton is in `state`
    pub fn lex_mode(&self, state: StateId) -> usize {
        self.state_lex_modes[state as usize]
    }

    /// Lex mode used while scanning ahead during error recovery
    pub fn error_lex_mode(&self) -> usize {
        self.error_lex_mode
    }

    /// Valid-token flags of a lex mode, indexed by symbol
    pub fn valid_symbols(&self, lex_mode: usize) -> &[bool] {
        &self.lex_modes[lex_mode]
    }

    /// Every action listed for a cell, in table order
    pub fn actions(&self, state: StateId, symbol: Symbol) -> &[ParseAction] {
        &self.actions[self.cell(state, symbol)]
    }

    /// The action the walker takes for a cell
    #[inline]
    pub fn action(&self, state: StateId, symbol: Symbol) -> Option<ParseAction> {
        self.resolved[self.cell(state, symbol)]
    }

    /// Whether the cell has any action
    #[inline]
    pub fn has_action(&self, state: StateId, symbol: Symbol) -> bool {
        self.resolved[self.cell(state, symbol)].is_some()
    }

    /// Successor state after reducing to `symbol` in `state`
    #[inline]
    pub fn goto(&self, state: StateId, symbol: Symbol) -> Option<StateId> {
        match self.gotos[self.cell(state, symbol)] {
            NO_STATE => None,
            target => Some(target),
        }
    }

    #[inline]
    fn cell(&self, state: StateId, symbol: Symbol) -> usize {
        state as usize * self.symbols.len() + symbol as usize
    }
}

/// Highest precedence wins; the first listed wins a tie
fn resolve(actions: &[ParseAction]) -> Option<ParseAction> {
    let mut best: Option<ParseAction> = None;
    for action in actions {
        match best {
            Some(current) if current.precedence() >= action.precedence() => {}
            _ => best = Some(*action),
        }
    }
    best
}
