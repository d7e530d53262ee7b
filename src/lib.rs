//! # mtbdd-bridge: explicit NFAs as symbolic DFAs
//!
//! **`mtbdd-bridge`** moves automata between two worlds:
//!
//! - an **explicit** nondeterministic automaton, with states `0..n`, arbitrary
//!   `usize` symbols and any number of targets per `(state, symbol)` pair;
//! - a **symbolic** deterministic automaton, in which every state owns a root
//!   in one shared multi-terminal BDD, letters are bit vectors, and every
//!   letter leads somewhere.
//!
//! The bridge between them is a **multi-terminal reduced ordered binary
//! decision diagram** ([`MtRobdd`][crate::mtrobdd::MtRobdd]). Each transition
//! becomes one path `[symbol bits][choice bits] → target` below the root of its
//! source state. The diagram is reduced to canonical form, completed with a
//! sink state, and then handed over node by node.
//!
//! ## Key Features
//!
//! - **Canonical Storage**: Nodes are hash-consed in a [`NodeStore`][crate::storage::NodeStore]; two equal nodes never coexist.
//! - **Lightweight Handles**: Nodes are addressed by copyable [`NodeId`][crate::node::NodeId] handles into the store.
//! - **Lazy Decoding**: [`bit_strings`][crate::mtrobdd::MtRobdd::bit_strings] expands don't-care levels on the fly.
//! - **Narrow Interfaces**: Both engines are reached through small traits,
//!   [`ExplicitAutomaton`][crate::nfa::ExplicitAutomaton] and [`NodeManager`][crate::exchange::NodeManager].
//!
//! ## Basic Usage
//!
//! ```rust
//! use mtbdd_bridge::convert::EncodedNfa;
//! use mtbdd_bridge::nfa::{ExplicitAutomaton, Nfa};
//!
//! // 1. An NFA over {0, 1, 2} with a nondeterministic choice on symbol 0
//! let mut nfa = Nfa::with_states(3);
//! nfa.add_initial_state(0);
//! nfa.add_final_state(2);
//! nfa.add_transition(0, 0, 1);
//! nfa.add_transition(0, 0, 2);
//! nfa.add_transition(1, 1, 2);
//! nfa.add_transition(2, 2, 0);
//!
//! // 2. Encode it: 2 symbol bits, 1 choice bit
//! let encoded = EncodedNfa::from_explicit(&nfa).unwrap();
//! assert_eq!(encoded.num_alphabet_vars(), 2);
//! assert_eq!(encoded.num_nondet_vars(), 1);
//!
//! // 3. The symbolic DFA has one extra (sink) state
//! assert_eq!(encoded.dfa().num_states(), 4);
//!
//! // 4. Decode it back; the language is unchanged
//! let back: Nfa = encoded.to_explicit().unwrap();
//! for word in [vec![0], vec![0, 1], vec![0, 2, 0], vec![1], vec![0, 0]] {
//!     assert_eq!(back.accepts(&word), nfa.accepts(&word));
//! }
//! ```
//!
//! ## Core Components
//!
//! - **[`mtrobdd`]**: The diagram itself: path insertion, trimming, reduction and completion.
//! - **[`paths`]**: Enumeration and counting of all concrete paths.
//! - **[`exchange`]**: Flat node tables, export to and import from other managers.
//! - **[`codec`]**: Binary codes of symbols and nondeterministic choices.
//! - **[`convert`]**: The explicit ⇄ symbolic converter.
//! - **[`dot`]**: Visualization using Graphviz.

pub mod codec;
pub mod convert;
pub mod dot;
pub mod error;
pub mod exchange;
pub mod mtrobdd;
pub mod nfa;
pub mod node;
pub mod paths;
pub mod storage;
pub mod symbolic;
pub mod timing;
pub mod types;
