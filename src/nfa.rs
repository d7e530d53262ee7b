//! Explicit nondeterministic automata.
//!
//! [`ExplicitAutomaton`] is the narrow interface the converter needs from an
//! explicit-transition automaton engine. [`Nfa`] is a small implementation
//! backed by ordered maps, good enough for tests and for the demo program.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

pub type State = usize;
pub type Symbol = usize;

/// Explicit automaton with states `0..num_states()` and `usize` symbols.
pub trait ExplicitAutomaton: Clone {
    /// Create an automaton with `num_states` states and no transitions.
    fn with_states(num_states: usize) -> Self;

    fn num_states(&self) -> usize;

    /// Initial states, in ascending order.
    fn initial_states(&self) -> Vec<State>;

    fn is_final(&self, state: State) -> bool;

    /// Symbols on the outgoing transitions of `state`, in ascending order.
    fn used_symbols(&self, state: State) -> Vec<Symbol>;

    /// Targets of `state` under `symbol`, in ascending order.
    fn successors(&self, state: State, symbol: Symbol) -> Vec<State>;

    fn add_transition(&mut self, source: State, symbol: Symbol, target: State);

    fn add_initial_state(&mut self, state: State);

    fn add_final_state(&mut self, state: State);

    /// Replace several initial states with a single fresh one.
    ///
    /// The new state copies the outgoing transitions of every initial state
    /// and is final if any of them is.
    fn unify_initial_states(&mut self);

    /// Largest number of targets of any `(state, symbol)` pair.
    fn nondeterminism_level(&self) -> usize {
        (0..self.num_states())
            .flat_map(|state| {
                self.used_symbols(state)
                    .into_iter()
                    .map(move |symbol| (state, symbol))
            })
            .map(|(state, symbol)| self.successors(state, symbol).len())
            .max()
            .unwrap_or(0)
    }

    /// All symbols used anywhere, in ascending order.
    fn alphabet(&self) -> Vec<Symbol> {
        let symbols: BTreeSet<Symbol> = (0..self.num_states())
            .flat_map(|state| self.used_symbols(state))
            .collect();
        symbols.into_iter().collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Nfa {
    num_states: usize,
    initial: BTreeSet<State>,
    finals: BTreeSet<State>,
    delta: BTreeMap<State, BTreeMap<Symbol, BTreeSet<State>>>,
}

impl Nfa {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fresh state and return it.
    pub fn add_state(&mut self) -> State {
        self.num_states += 1;
        self.num_states - 1
    }

    /// All transitions as `(source, symbol, target)`, in ascending order.
    pub fn transitions(&self) -> impl Iterator<Item = (State, Symbol, State)> + '_ {
        self.delta.iter().flat_map(|(&source, post)| {
            post.iter()
                .flat_map(move |(&symbol, targets)| targets.iter().map(move |&target| (source, symbol, target)))
        })
    }

    pub fn num_transitions(&self) -> usize {
        self.delta.values().flat_map(|post| post.values()).map(|targets| targets.len()).sum()
    }

    pub fn final_states(&self) -> impl Iterator<Item = State> + '_ {
        self.finals.iter().copied()
    }

    /// Check whether the automaton accepts `word`.
    pub fn accepts(&self, word: &[Symbol]) -> bool {
        let mut current: BTreeSet<State> = self.initial.clone();
        for &symbol in word {
            current = current
                .iter()
                .filter_map(|state| self.delta.get(state))
                .filter_map(|post| post.get(&symbol))
                .flatten()
                .copied()
                .collect();
            if current.is_empty() {
                return false;
            }
        }
        current.iter().any(|state| self.finals.contains(state))
    }

    fn ensure_state(&mut self, state: State) {
        if state >= self.num_states {
            self.num_states = state + 1;
        }
    }
}

impl ExplicitAutomaton for Nfa {
    fn with_states(num_states: usize) -> Self {
        Self {
            num_states,
            ..Self::default()
        }
    }

    fn num_states(&self) -> usize {
        self.num_states
    }

    fn initial_states(&self) -> Vec<State> {
        self.initial.iter().copied().collect()
    }

    fn is_final(&self, state: State) -> bool {
        self.finals.contains(&state)
    }

    fn used_symbols(&self, state: State) -> Vec<Symbol> {
        self.delta
            .get(&state)
            .map(|post| post.keys().copied().collect())
            .unwrap_or_default()
    }

    fn successors(&self, state: State, symbol: Symbol) -> Vec<State> {
        self.delta
            .get(&state)
            .and_then(|post| post.get(&symbol))
            .map(|targets| targets.iter().copied().collect())
            .unwrap_or_default()
    }

    fn add_transition(&mut self, source: State, symbol: Symbol, target: State) {
        self.ensure_state(source.max(target));
        self.delta
            .entry(source)
            .or_default()
            .entry(symbol)
            .or_default()
            .insert(target);
    }

    fn add_initial_state(&mut self, state: State) {
        self.ensure_state(state);
        self.initial.insert(state);
    }

    fn add_final_state(&mut self, state: State) {
        self.ensure_state(state);
        self.finals.insert(state);
    }

    fn unify_initial_states(&mut self) {
        if self.initial.len() <= 1 {
            return;
        }

        let unified = self.add_state();
        debug!("unify_initial_states: {} initial states into {}", self.initial.len(), unified);

        let initial = std::mem::take(&mut self.initial);
        let mut post: BTreeMap<Symbol, BTreeSet<State>> = BTreeMap::new();
        for state in initial.iter() {
            if let Some(p) = self.delta.get(state) {
                for (&symbol, targets) in p.iter() {
                    post.entry(symbol).or_default().extend(targets.iter().copied());
                }
            }
        }
        if !post.is_empty() {
            self.delta.insert(unified, post);
        }
        if initial.iter().any(|state| self.finals.contains(state)) {
            self.finals.insert(unified);
        }
        self.initial.insert(unified);
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn example() -> Nfa {
        // (ab)* over {a = 0, b = 1}, with an extra nondeterministic branch on `a`.
        let mut nfa = Nfa::with_states(3);
        nfa.add_initial_state(0);
        nfa.add_final_state(0);
        nfa.add_transition(0, 0, 1);
        nfa.add_transition(0, 0, 2);
        nfa.add_transition(1, 1, 0);
        nfa
    }

    #[test]
    fn test_queries() {
        let nfa = example();
        assert_eq!(nfa.num_states(), 3);
        assert_eq!(nfa.initial_states(), vec![0]);
        assert!(nfa.is_final(0));
        assert!(!nfa.is_final(1));
        assert_eq!(nfa.used_symbols(0), vec![0]);
        assert_eq!(nfa.used_symbols(2), Vec::<Symbol>::new());
        assert_eq!(nfa.successors(0, 0), vec![1, 2]);
        assert_eq!(nfa.successors(0, 1), Vec::<State>::new());
        assert_eq!(nfa.num_transitions(), 3);
        assert_eq!(nfa.alphabet(), vec![0, 1]);
        assert_eq!(nfa.nondeterminism_level(), 2);
    }

    #[test]
    fn test_transitions_are_sorted() {
        let mut nfa = Nfa::new();
        nfa.add_transition(1, 5, 0);
        nfa.add_transition(0, 7, 1);
        nfa.add_transition(0, 2, 1);
        let transitions: Vec<_> = nfa.transitions().collect();
        assert_eq!(transitions, vec![(0, 2, 1), (0, 7, 1), (1, 5, 0)]);
        assert_eq!(nfa.num_states(), 2);
    }

    #[test]
    fn test_accepts() {
        let nfa = example();
        assert!(nfa.accepts(&[]));
        assert!(nfa.accepts(&[0, 1]));
        assert!(nfa.accepts(&[0, 1, 0, 1]));
        assert!(!nfa.accepts(&[0]));
        assert!(!nfa.accepts(&[1]));
        assert!(!nfa.accepts(&[0, 1, 1]));
    }

    #[test]
    fn test_unify_initial_states() {
        let mut nfa = Nfa::with_states(4);
        nfa.add_initial_state(0);
        nfa.add_initial_state(1);
        nfa.add_final_state(1);
        nfa.add_final_state(3);
        nfa.add_transition(0, 0, 2);
        nfa.add_transition(1, 0, 3);
        nfa.add_transition(1, 1, 3);
        let before = nfa.clone();

        nfa.unify_initial_states();
        assert_eq!(nfa.num_states(), 5);
        assert_eq!(nfa.initial_states(), vec![4]);
        assert!(nfa.is_final(4));
        assert_eq!(nfa.successors(4, 0), vec![2, 3]);
        assert_eq!(nfa.successors(4, 1), vec![3]);

        for word in [vec![], vec![0], vec![1], vec![0, 0], vec![1, 1]] {
            assert_eq!(nfa.accepts(&word), before.accepts(&word), "word {:?}", word);
        }
    }

    #[test]
    fn test_unify_single_initial_state_is_noop() {
        let mut nfa = example();
        nfa.unify_initial_states();
        assert_eq!(nfa, example());
    }

    #[test]
    fn test_no_initial_state() {
        let mut nfa = Nfa::with_states(2);
        nfa.add_final_state(1);
        nfa.add_transition(0, 0, 1);
        assert!(!nfa.accepts(&[]));
        assert!(!nfa.accepts(&[0]));
        assert_eq!(Nfa::new().nondeterminism_level(), 0);
    }
}
