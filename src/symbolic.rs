//! Symbolic deterministic automata over a shared multi-terminal BDD.
//!
//! This is the counterpart of the explicit [`Nfa`][crate::nfa::Nfa]: a
//! complete DFA whose letters are bit vectors. Every state owns one pointer
//! into a [`SharedManager`]; following the bits of a letter from that pointer
//! ends in a leaf holding the successor state.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use log::debug;

use crate::exchange::{Entry, NodeManager};
use crate::nfa::State;
use crate::types::{Bit, BitVector, Value};

/// Acceptance marker of a symbolic state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum Status {
    Reject = -1,
    DontKnow = 0,
    Accept = 1,
}

impl Status {
    /// Status with accept and reject swapped.
    pub fn negate(self) -> Self {
        match self {
            Status::Reject => Status::Accept,
            Status::DontKnow => Status::DontKnow,
            Status::Accept => Status::Reject,
        }
    }
}

impl From<Status> for i8 {
    fn from(status: Status) -> Self {
        status as i8
    }
}

/// Pointer into a [`SharedManager`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BddPtr(u32);

impl BddPtr {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for BddPtr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "&{}", self.0)
    }
}

/// Hash-consed table of leaves and inner nodes, shared by all states.
#[derive(Debug, Clone, Default)]
pub struct SharedManager {
    entries: Vec<Entry<BddPtr>>,
    unique: HashMap<Entry<BddPtr>, BddPtr>,
}

impl SharedManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&mut self, entry: Entry<BddPtr>) -> BddPtr {
        if let Some(&ptr) = self.unique.get(&entry) {
            return ptr;
        }
        let index = u32::try_from(self.entries.len()).unwrap_or_else(|_| panic!("Shared manager is full"));
        let ptr = BddPtr(index);
        self.entries.push(entry);
        self.unique.insert(entry, ptr);
        ptr
    }
}

impl NodeManager for SharedManager {
    type Ptr = BddPtr;

    fn find_leaf(&mut self, value: Value) -> BddPtr {
        self.find(Entry::Leaf { value })
    }

    fn find_node(&mut self, low: BddPtr, high: BddPtr, level: usize) -> BddPtr {
        self.find(Entry::Inner { level, low, high })
    }

    fn entry(&self, ptr: BddPtr) -> Entry<BddPtr> {
        self.entries[ptr.index()]
    }
}

/// Complete deterministic automaton with symbolic transitions.
#[derive(Debug, Clone)]
pub struct SymbolicDfa {
    num_vars: usize,
    manager: SharedManager,
    initial: State,
    statuses: Vec<Status>,
    behaviours: Vec<BddPtr>,
}

impl SymbolicDfa {
    /// Create an automaton whose state `i` behaves as `behaviours[i]`.
    ///
    /// The initial state is `0` and every state rejects until told otherwise.
    pub fn new(num_vars: usize, manager: SharedManager, behaviours: Vec<BddPtr>) -> Self {
        debug!("SymbolicDfa::new(num_vars = {}, states = {})", num_vars, behaviours.len());
        assert!(
            behaviours.iter().all(|ptr| ptr.index() < manager.len()),
            "Behaviour pointers should belong to the manager"
        );
        let statuses = vec![Status::Reject; behaviours.len()];
        Self {
            num_vars,
            manager,
            initial: 0,
            statuses,
            behaviours,
        }
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn num_states(&self) -> usize {
        self.behaviours.len()
    }

    pub fn manager(&self) -> &SharedManager {
        &self.manager
    }

    pub fn initial(&self) -> State {
        self.initial
    }

    pub fn set_initial(&mut self, state: State) {
        assert!(state < self.num_states(), "State {} is out of range", state);
        self.initial = state;
    }

    pub fn status(&self, state: State) -> Status {
        self.statuses[state]
    }

    pub fn set_status(&mut self, state: State, status: Status) {
        assert!(state < self.num_states(), "State {} is out of range", state);
        self.statuses[state] = status;
    }

    pub fn statuses(&self) -> &[Status] {
        &self.statuses
    }

    pub fn behaviour(&self, state: State) -> BddPtr {
        self.behaviours[state]
    }

    pub fn behaviours(&self) -> &[BddPtr] {
        &self.behaviours
    }

    /// The state reached from `state` by reading the letter `bits`.
    pub fn successor(&self, state: State, bits: &[Bit]) -> State {
        assert_eq!(
            bits.len(),
            self.num_vars,
            "Letter length should match the number of variables"
        );
        let mut ptr = self.behaviours[state];
        loop {
            match self.manager.entry(ptr) {
                Entry::Leaf { value } => return value,
                Entry::Inner { level, low, high } => ptr = if bits[level] { high } else { low },
            }
        }
    }

    /// Check whether the automaton ends in an accepting state after reading `word`.
    pub fn accepts(&self, word: &[BitVector]) -> bool {
        let last = word
            .iter()
            .fold(self.initial, |state, letter| self.successor(state, letter));
        self.status(last) == Status::Accept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HI, LO};

    #[test]
    fn test_manager_is_canonical() {
        let mut manager = SharedManager::new();
        let a = manager.find_leaf(0);
        let b = manager.find_leaf(1);
        assert_ne!(a, b);
        assert_eq!(manager.find_leaf(0), a);

        let n = manager.find_node(a, b, 0);
        assert_eq!(manager.find_node(a, b, 0), n);
        assert_ne!(manager.find_node(b, a, 0), n);
        assert_eq!(manager.len(), 4);
        assert_eq!(manager.entry(n), Entry::Inner { level: 0, low: a, high: b });
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(i8::from(Status::Reject), -1);
        assert_eq!(i8::from(Status::DontKnow), 0);
        assert_eq!(i8::from(Status::Accept), 1);
        assert_eq!(Status::Accept.negate(), Status::Reject);
        assert_eq!(Status::DontKnow.negate(), Status::DontKnow);
    }

    /// Parity of `1` letters over a single variable.
    fn parity() -> SymbolicDfa {
        let mut manager = SharedManager::new();
        let even = manager.find_leaf(0);
        let odd = manager.find_leaf(1);
        let from_even = manager.find_node(even, odd, 0);
        let from_odd = manager.find_node(odd, even, 0);
        let mut dfa = SymbolicDfa::new(1, manager, vec![from_even, from_odd]);
        dfa.set_status(0, Status::Accept);
        dfa
    }

    #[test]
    fn test_successor() {
        let dfa = parity();
        assert_eq!(dfa.num_states(), 2);
        assert_eq!(dfa.successor(0, &[LO]), 0);
        assert_eq!(dfa.successor(0, &[HI]), 1);
        assert_eq!(dfa.successor(1, &[HI]), 0);
    }

    #[test]
    fn test_accepts() {
        let dfa = parity();
        assert!(dfa.accepts(&[]));
        assert!(dfa.accepts(&[vec![HI], vec![LO], vec![HI]]));
        assert!(!dfa.accepts(&[vec![HI], vec![LO]]));
    }

    #[test]
    #[should_panic(expected = "Letter length")]
    fn test_successor_wrong_length() {
        parity().successor(0, &[LO, LO]);
    }
}
