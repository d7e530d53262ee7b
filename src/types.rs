//! Scalar types shared by the diagram, the codec and the converter.
//!
//! Root names and terminal values both live in the automaton state space,
//! so they are plain `usize` aliases. Levels get a newtype to keep them
//! apart from state numbers in signatures.

use std::fmt;

/// A terminal value (a target state, or [`SINK_VALUE`]).
pub type Value = usize;

/// The name of a root (a source state, or the sink).
pub type NodeName = usize;

/// A single decision bit. `false` follows the low edge, `true` the high edge.
pub type Bit = bool;

/// A full assignment of all diagram variables, most significant first.
pub type BitVector = Vec<Bit>;

pub const LO: Bit = false;
pub const HI: Bit = true;

/// Reserved value for the sink terminal when the caller has no better choice.
pub const SINK_VALUE: Value = usize::MAX - 1;

/// Index of a diagram variable, counted from the roots.
///
/// A diagram over `n` variables tests levels `0..n` in increasing order
/// along every path; terminals sit below all of them, at depth `n`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Level(u32);

impl Level {
    /// # Panics
    ///
    /// Panics if `index` does not fit into `u32`.
    pub fn new(index: usize) -> Self {
        let index = u32::try_from(index).unwrap_or_else(|_| panic!("Level {} is too large", index));
        Level(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// Renders bits as a `0`/`1` string, e.g. `[true, false]` as `"10"`.
pub fn bits_to_string(bits: &[Bit]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}
