//! Conversion between explicit NFAs and symbolic DFAs.
//!
//! The symbolic engine only handles complete deterministic automata over
//! bit-vector letters. An explicit NFA is brought into that shape by
//! encoding each transition `(source, symbol, target)` as a path
//!
//! ```text
//! root `source` --[symbol bits][choice bits]--> terminal `target`
//! ```
//!
//! in one multi-rooted [`MtRobdd`], where the choice bits number the targets
//! of a nondeterministic `(source, symbol)` pair. The reduced and completed
//! diagram is then handed to the symbolic engine; every letter missing from
//! the NFA leads into a fresh rejecting sink state.
//!
//! ```
//! use mtbdd_bridge::convert::EncodedNfa;
//! use mtbdd_bridge::nfa::{ExplicitAutomaton, Nfa};
//!
//! let mut nfa = Nfa::with_states(2);
//! nfa.add_initial_state(0);
//! nfa.add_final_state(1);
//! nfa.add_transition(0, 'a' as usize, 1);
//! nfa.add_transition(1, 'b' as usize, 1);
//!
//! let encoded = EncodedNfa::from_explicit(&nfa).unwrap();
//! assert_eq!(encoded.num_vars(), 1);
//! assert!(encoded.is_deterministic());
//!
//! let back: Nfa = encoded.to_explicit().unwrap();
//! assert!(back.accepts(&['a' as usize, 'b' as usize]));
//! assert!(!back.accepts(&['b' as usize]));
//! ```

use std::collections::HashSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use log::{debug, trace};

use crate::codec::{binary_code, bit_width, AlphabetCodec};
use crate::dot::DotConfig;
use crate::error::{Error, Result};
use crate::mtrobdd::MtRobdd;
use crate::nfa::{ExplicitAutomaton, State, Symbol};
use crate::symbolic::{SharedManager, Status, SymbolicDfa};
use crate::timing::Timings;
use crate::types::{BitVector, Value};

/// An explicit NFA held as a symbolic DFA, together with its letter encoding.
#[derive(Debug, Clone)]
pub struct EncodedNfa {
    dfa: SymbolicDfa,
    codec: AlphabetCodec,
    num_nondet_vars: usize,
    nondeterminism_level: usize,
    num_states: usize,
}

impl EncodedNfa {
    /// Encode `nfa`, with its used symbols in ascending order as alphabet.
    pub fn from_explicit<A: ExplicitAutomaton>(nfa: &A) -> Result<Self> {
        Self::from_explicit_timed(nfa, None, &mut Timings::new())
    }

    /// Encode `nfa` over the given alphabet. The i-th symbol gets the code of `i`.
    ///
    /// Fails with [`Error::UnknownSymbol`] if a transition uses a symbol
    /// outside `alphabet`, and with [`Error::DuplicateSymbol`] if `alphabet`
    /// lists a symbol twice.
    pub fn from_explicit_with_alphabet<A: ExplicitAutomaton>(nfa: &A, alphabet: &[Symbol]) -> Result<Self> {
        Self::from_explicit_timed(nfa, Some(alphabet), &mut Timings::new())
    }

    /// Like [`from_explicit_with_alphabet`][Self::from_explicit_with_alphabet],
    /// recording the duration of each phase into `timings`.
    pub fn from_explicit_timed<A: ExplicitAutomaton>(
        nfa: &A,
        alphabet: Option<&[Symbol]>,
        timings: &mut Timings,
    ) -> Result<Self> {
        let mut nfa = nfa.clone();
        if nfa.initial_states().len() > 1 {
            nfa.unify_initial_states();
        }
        let num_states = nfa.num_states();
        let initial = nfa.initial_states().first().copied();

        let symbols = match alphabet {
            Some(order) => {
                let mut seen = HashSet::with_capacity(order.len());
                if let Some(&symbol) = order.iter().find(|&&symbol| !seen.insert(symbol)) {
                    return Err(Error::DuplicateSymbol(symbol));
                }
                order.to_vec()
            }
            None => nfa.alphabet(),
        };
        let nondeterminism_level = nfa.nondeterminism_level();
        let num_nondet_vars = bit_width(nondeterminism_level);
        let mut num_alphabet_vars = bit_width(symbols.len());
        if num_alphabet_vars + num_nondet_vars == 0 && !symbols.is_empty() {
            // A path needs at least one variable to tell the symbol from the sink.
            num_alphabet_vars = 1;
        }
        let num_vars = num_alphabet_vars + num_nondet_vars;
        debug!(
            "from_explicit: {} states, {} symbols, nondeterminism level {}, {} + {} variables",
            num_states,
            symbols.len(),
            nondeterminism_level,
            num_alphabet_vars,
            num_nondet_vars
        );
        let codec = AlphabetCodec::with_width(symbols, num_alphabet_vars);

        let mut bdd = MtRobdd::new(num_vars);
        {
            let _guard = timings.scope("insert");
            let mut bits = Vec::with_capacity(num_vars);
            for source in 0..num_states {
                for symbol in nfa.used_symbols(source) {
                    let code = codec.encode(symbol)?;
                    for (choice, target) in nfa.successors(source, symbol).into_iter().enumerate() {
                        bits.clear();
                        bits.extend_from_slice(code);
                        bits.extend(binary_code(choice, num_nondet_vars));
                        bdd.insert_path(source, &bits, target);
                    }
                }
            }
        }

        {
            let _guard = timings.scope("reduce");
            let sink = num_states;
            // Without an initial state the sink has to exist, to become the initial one.
            let names = 0..num_states + usize::from(initial.is_none());
            bdd.trim()
                .remove_redundant_tests()
                .make_complete(sink, true)
                .complete_roots(names, sink);
        }
        debug!("from_explicit: diagram has {} nodes, {} roots", bdd.size(), bdd.num_roots());

        let mut manager = SharedManager::new();
        let behaviours = {
            let _guard = timings.scope("export");
            bdd.export(&mut manager)?
        };

        let mut dfa = SymbolicDfa::new(num_vars, manager, behaviours);
        dfa.set_initial(initial.unwrap_or(num_states));
        for state in 0..num_states {
            if nfa.is_final(state) {
                dfa.set_status(state, Status::Accept);
            }
        }

        Ok(Self {
            dfa,
            codec,
            num_nondet_vars,
            nondeterminism_level,
            num_states,
        })
    }

    /// Decode the symbolic DFA back into an explicit automaton.
    ///
    /// Every state of the DFA, sink included, becomes a state of the result.
    /// Letters whose symbol bits encode no symbol are dropped; choice bits are
    /// ignored, so nondeterministic choices come back as plain transitions.
    pub fn to_explicit<A: ExplicitAutomaton>(&self) -> Result<A> {
        let bdd = self.diagram()?;
        let num_alphabet_vars = self.num_alphabet_vars();

        let mut aut = A::with_states(self.dfa.num_states());
        aut.add_initial_state(self.dfa.initial());
        for state in 0..self.dfa.num_states() {
            if self.dfa.status(state) == Status::Accept {
                aut.add_final_state(state);
            }
        }

        for (source, root) in bdd.roots() {
            for (bits, target) in bdd.bit_strings(root) {
                match self.codec.decode(&bits[..num_alphabet_vars]) {
                    Ok(symbol) => aut.add_transition(source, symbol, target),
                    Err(e) if e.is_lookup() => trace!("to_explicit: skipping {} -> {}: {}", source, target, e),
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(aut)
    }

    /// Import the behaviours of all states into a fresh diagram.
    pub fn diagram(&self) -> Result<MtRobdd> {
        MtRobdd::import(self.num_vars(), self.dfa.manager(), self.dfa.behaviours())
    }

    pub fn to_dot(&self) -> Result<String> {
        Ok(self.diagram()?.to_dot_with_config(&self.dot_config())?)
    }

    pub fn save_as_dot(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        self.diagram()?.write_dot(BufWriter::new(file), &self.dot_config())?;
        Ok(())
    }

    fn dot_config(&self) -> DotConfig {
        DotConfig {
            sink_value: Some(self.sink()),
            ..DotConfig::default()
        }
    }

    pub fn dfa(&self) -> &SymbolicDfa {
        &self.dfa
    }

    pub fn codec(&self) -> &AlphabetCodec {
        &self.codec
    }

    pub fn num_vars(&self) -> usize {
        self.dfa.num_vars()
    }

    pub fn num_alphabet_vars(&self) -> usize {
        self.codec.width()
    }

    pub fn num_nondet_vars(&self) -> usize {
        self.num_nondet_vars
    }

    pub fn nondeterminism_level(&self) -> usize {
        self.nondeterminism_level
    }

    pub fn is_deterministic(&self) -> bool {
        self.nondeterminism_level <= 1
    }

    /// Number of states of the explicit automaton, after unifying its initial states.
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// Value of the sink state.
    pub fn sink(&self) -> Value {
        self.num_states
    }

    /// Encode `symbol` as a full letter, with all choice bits low.
    pub fn encode_letter(&self, symbol: Symbol) -> Result<BitVector> {
        let mut letter = self.codec.encode(symbol)?.to_vec();
        letter.resize(self.num_vars(), false);
        Ok(letter)
    }

    /// The DFA state reached by reading `word` from the initial state.
    ///
    /// Only meaningful for deterministic automata, where no choice bits exist.
    pub fn run(&self, word: &[Symbol]) -> Result<State> {
        let mut state = self.dfa.initial();
        for &symbol in word {
            state = self.dfa.successor(state, &self.encode_letter(symbol)?);
        }
        Ok(state)
    }
}
