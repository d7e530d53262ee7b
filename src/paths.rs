//! Iterator over all concrete paths of a diagram.
//!
//! A reduced diagram skips levels whose bit does not matter. Decoding has to
//! undo that: every skipped run of `g` levels stands for all `2^g` bit
//! combinations, and each of them is emitted as its own full-length path.
//!
//! # Example
//!
//! ```
//! use mtbdd_bridge::mtrobdd::MtRobdd;
//!
//! let mut bdd = MtRobdd::new(3);
//! for bits in [[true, false, false], [true, false, true], [true, true, false], [true, true, true]] {
//!     bdd.insert_path(1, &bits, 2);
//! }
//! bdd.trim().remove_redundant_tests();
//!
//! // One test is left, yet all four strings come back.
//! let root = bdd.root(1).unwrap();
//! assert_eq!(bdd.size(), 2);
//! assert_eq!(bdd.bit_strings(root).count(), 4);
//! assert_eq!(bdd.count_bit_strings(root).to_string(), "4");
//! ```
//!
//! # Performance
//!
//! The iterator walks the diagram depth-first with an explicit stack, so its
//! memory use is bounded by the number of variables, not by the number of
//! paths. The number of paths itself can be exponential in the number of
//! variables; use [`MtRobdd::count_bit_strings`] to check before enumerating.

use std::collections::HashMap;

use num_bigint::BigUint;

use crate::mtrobdd::MtRobdd;
use crate::node::{Node, NodeId};
use crate::types::{BitVector, NodeName, Value, HI, LO};

impl MtRobdd {
    /// Returns an iterator over all `(bits, value)` paths below `root`.
    ///
    /// Paths come out in ascending binary order of `bits`.
    pub fn bit_strings(&self, root: NodeId) -> BitStrings<'_> {
        BitStrings::new(self, root)
    }

    /// Like [`bit_strings`][Self::bit_strings], starting at the root named `name`.
    ///
    /// Returns `None` if there is no such root.
    pub fn bit_strings_from(&self, name: NodeName) -> Option<BitStrings<'_>> {
        self.root(name).map(|root| self.bit_strings(root))
    }

    /// Collects all paths below `root`.
    pub fn all_bit_strings(&self, root: NodeId) -> Vec<(BitVector, Value)> {
        self.bit_strings(root).collect()
    }

    /// Counts the paths below `root` without enumerating them.
    pub fn count_bit_strings(&self, root: NodeId) -> BigUint {
        let mut cache = HashMap::new();
        let count = self._count_bit_strings(root, &mut cache);
        count << self.depth(root)
    }

    /// Number of paths from `node` down to a terminal, counting from the level of `node`.
    fn _count_bit_strings(&self, node: NodeId, cache: &mut HashMap<NodeId, BigUint>) -> BigUint {
        if let Some(count) = cache.get(&node) {
            return count.clone();
        }

        let count = match *self.node(node) {
            Node::Terminal { .. } => BigUint::from(1u32),
            Node::Inner { level, low, high } => {
                let mut count = BigUint::ZERO;
                for child in [low, high].into_iter().flatten() {
                    let gap = self.depth(child) - level.index() - 1;
                    count += self._count_bit_strings(child, cache) << gap;
                }
                count
            }
        };

        cache.insert(node, count.clone());
        count
    }
}

/// Frame on the exploration stack.
#[derive(Debug)]
struct StackFrame {
    /// The node the path currently points at.
    node: NodeId,
    /// Bits fixed so far. Its length is the level the path has reached.
    prefix: BitVector,
}

/// An iterator over all concrete paths below a root.
///
/// Created by [`MtRobdd::bit_strings()`]. See its documentation for details.
pub struct BitStrings<'a> {
    bdd: &'a MtRobdd,
    stack: Vec<StackFrame>,
}

impl<'a> BitStrings<'a> {
    pub fn new(bdd: &'a MtRobdd, root: NodeId) -> Self {
        BitStrings {
            bdd,
            stack: vec![StackFrame {
                node: root,
                prefix: BitVector::with_capacity(bdd.num_vars()),
            }],
        }
    }

    /// Push a frame for `node` whose prefix is `prefix` extended by `bit`.
    fn push(&mut self, node: NodeId, prefix: &BitVector, bit: bool) {
        let mut prefix = prefix.clone();
        prefix.push(bit);
        self.stack.push(StackFrame { node, prefix });
    }
}

impl Iterator for BitStrings<'_> {
    type Item = (BitVector, Value);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let StackFrame { node, prefix } = self.stack.pop()?;
            let depth = self.bdd.depth(node);
            assert!(
                prefix.len() <= depth,
                "Variable order violated: node {} at level {} reached after {} bits",
                node,
                depth,
                prefix.len()
            );

            if prefix.len() < depth {
                // Don't-care bit: branch on both values, low explored first.
                self.push(node, &prefix, HI);
                self.push(node, &prefix, LO);
                continue;
            }

            match *self.bdd.node(node) {
                Node::Terminal { value } => return Some((prefix, value)),
                Node::Inner { low, high, .. } => {
                    if let Some(high) = high {
                        self.push(high, &prefix, HI);
                    }
                    if let Some(low) = low {
                        self.push(low, &prefix, LO);
                    }
                }
            }
        }
    }
}
