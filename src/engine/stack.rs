//! Parse stack
//!
//! Ordered `(state, node)` pairs over a bottom sentinel that holds the start
//! state. Extras (comments) and recovered `ERROR` nodes sit on the stack
//! without changing the automaton state, so reductions count only the other
//! entries.

use super::language::{Language, StateId};
use super::point::Length;
use super::subtree::Subtree;
use std::sync::Arc;

/// One stack slot
#[derive(Debug, Clone)]
pub(crate) struct StackEntry {
    pub state: StateId,
    pub node: Option<Arc<Subtree>>,
    /// Absolute position just after this entry
    pub end: Length,
    /// Present on the stack while error recovery ran
    pub fragile: bool,
}

impl StackEntry {
    /// Extras and `ERROR` nodes do not take part in the automaton
    pub fn is_extra(&self, language: &Language) -> bool {
        match &self.node {
            Some(node) => node.is_extra() || node.symbol() == language.error_symbol(),
            None => false,
        }
    }
}

/// The automaton stack
#[derive(Debug)]
pub(crate) struct ParseStack {
    entries: Vec<StackEntry>,
}

impl ParseStack {
    pub fn new(start_state: StateId) -> Self {
        let mut entries = Vec::with_capacity(64);
        entries.push(StackEntry {
            state: start_state,
            node: None,
            end: Length::ZERO,
            fragile: false,
        });
        Self { entries }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn top(&self) -> &StackEntry {
        // The bottom sentinel is never popped
        &self.entries[self.entries.len() - 1]
    }

    #[inline]
    pub fn get(&self, index: usize) -> &StackEntry {
        &self.entries[index]
    }

    pub fn push(&mut self, state: StateId, node: Arc<Subtree>, end: Length, fragile: bool) {
        self.entries.push(StackEntry {
            state,
            node: Some(node),
            end,
            fragile,
        });
    }

    /// Pop the entries of a reduction with `child_count` children
    ///
    /// Returns `(trailing, popped)`: extras above the last child, which the
    /// caller pushes back after the new node, and the children themselves
    /// with interleaved extras, both in stack order.
    pub fn pop_reduction(
        &mut self,
        child_count: usize,
        language: &Language,
    ) -> (Vec<StackEntry>, Vec<StackEntry>) {
        let mut trailing = Vec::new();
        while self.entries.len() > 1 && self.top().is_extra(language) {
            if let Some(entry) = self.entries.pop() {
                trailing.push(entry);
            }
        }
        trailing.reverse();

        let mut popped = Vec::with_capacity(child_count);
        let mut counted = 0;
        while counted < child_count && self.entries.len() > 1 {
            if let Some(entry) = self.entries.pop() {
                if !entry.is_extra(language) {
                    counted += 1;
                }
                popped.push(entry);
            }
        }
        popped.reverse();
        (trailing, popped)
    }

    /// Remove every entry above `index`
    pub fn split_above(&mut self, index: usize) -> Vec<StackEntry> {
        self.entries.split_off((index + 1).min(self.entries.len()))
    }

    /// Mark every entry except the sentinel as fragile
    pub fn mark_fragile(&mut self) {
        for entry in self.entries.iter_mut().skip(1) {
            entry.fragile = true;
        }
    }

    /// Remove and return everything above the sentinel
    pub fn drain(&mut self) -> Vec<StackEntry> {
        self.entries.split_off(1)
    }
}
