//! Multi-terminal reduced ordered binary decision diagram.
//!
//! An [`MtRobdd`] owns a canonical [`NodeStore`] and a map of named roots.
//! Each root stands for the transition behaviour of one automaton state:
//! following the bits of an encoded letter from the root leads to a terminal
//! whose value is the target state.
//!
//! # Building a diagram
//!
//! Diagrams are built one path at a time with [`MtRobdd::insert_path`], then
//! brought into canonical shape by the reduction pipeline:
//!
//! 1. [`MtRobdd::trim`] drops nodes no root can reach,
//! 2. [`MtRobdd::remove_redundant_tests`] elides tests whose outcome does not matter,
//! 3. [`MtRobdd::make_complete`] routes every missing edge into a sink terminal.
//!
//! ```
//! use mtbdd_bridge::mtrobdd::MtRobdd;
//!
//! let mut bdd = MtRobdd::new(2);
//! bdd.insert_path(0, &[false, false], 1);
//! bdd.insert_path(0, &[false, true], 1);
//! bdd.trim().remove_redundant_tests().make_complete(9, true);
//!
//! let root = bdd.root(0).unwrap();
//! let paths = bdd.all_bit_strings(root);
//! assert_eq!(paths.len(), 4);
//! assert!(paths.contains(&(vec![false, true], 1)));
//! assert!(paths.contains(&(vec![true, true], 9)));
//! ```
//!
//! Levels are 0-indexed; terminals conceptually sit at level `num_vars`.
//! A level missing along a path is a don't-care.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Debug;

use log::debug;

use crate::node::{Node, NodeId};
use crate::storage::NodeStore;
use crate::types::{bits_to_string, Bit, Level, NodeName, Value};

#[derive(Clone)]
pub struct MtRobdd {
    pub(crate) num_vars: usize,
    pub(crate) store: NodeStore,
    pub(crate) roots: BTreeMap<NodeName, NodeId>,
}

impl MtRobdd {
    /// Create an empty diagram over `num_vars` variables.
    pub fn new(num_vars: usize) -> Self {
        Self {
            num_vars,
            store: NodeStore::new(),
            roots: BTreeMap::new(),
        }
    }
}

impl Default for MtRobdd {
    fn default() -> Self {
        MtRobdd::new(0)
    }
}

impl Debug for MtRobdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MtRobdd")
            .field("num_vars", &self.num_vars)
            .field("size", &self.store.len())
            .field("roots", &self.roots.len())
            .finish()
    }
}

impl MtRobdd {
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Number of live nodes.
    pub fn size(&self) -> usize {
        self.store.len()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        self.store.node(id)
    }

    /// Iterate over all live nodes in store order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.store.iter()
    }

    pub fn num_roots(&self) -> usize {
        self.roots.len()
    }

    /// Get the root node of `name`, or `None` if there is no such root.
    pub fn root(&self, name: NodeName) -> Option<NodeId> {
        self.roots.get(&name).copied()
    }

    /// Iterate over `(name, root)` pairs in ascending name order.
    pub fn roots(&self) -> impl Iterator<Item = (NodeName, NodeId)> + '_ {
        self.roots.iter().map(|(&name, &id)| (name, id))
    }

    /// Point the root `name` at an existing node.
    pub fn set_root(&mut self, name: NodeName, node: NodeId) {
        assert!(self.store.contains(node), "Node {} is not in the diagram", node);
        self.roots.insert(name, node);
    }

    /// Level at which `node` sits: its tested level, or `num_vars` for terminals.
    pub(crate) fn depth(&self, node: NodeId) -> usize {
        self.node(node).level().map_or(self.num_vars, Level::index)
    }

    /// Get or create the inner node `(level, low, high)`.
    pub fn mk_node(&mut self, level: usize, low: Option<NodeId>, high: Option<NodeId>) -> NodeId {
        debug!(
            "mk(level = {}, low = {:?}, high = {:?})",
            level, low, high
        );

        assert!(
            level < self.num_vars,
            "Variable index {} is out of range 0..{}",
            level,
            self.num_vars
        );

        self.store.put(Node::Inner {
            level: Level::new(level),
            low,
            high,
        })
    }

    /// Get or create the terminal node carrying `value`.
    pub fn mk_terminal(&mut self, value: Value) -> NodeId {
        self.store.put(Node::Terminal { value })
    }

    /// Insert a single root-to-terminal path into the root `name`.
    ///
    /// Paths of the same root may be inserted in any order; inserting a path
    /// that already leads somewhere redirects it to `value`.
    ///
    /// # Panics
    ///
    /// Panics if `bits` is empty or its length differs from the number of variables.
    pub fn insert_path(&mut self, name: NodeName, bits: &[Bit], value: Value) -> NodeId {
        debug!(
            "insert_path(name = {}, bits = {}, value = {})",
            name,
            bits_to_string(bits),
            value
        );

        assert!(!bits.is_empty(), "Bit vector should not be empty");
        assert_eq!(
            bits.len(),
            self.num_vars,
            "Bit vector length should match the number of variables"
        );

        let root = self.root(name);
        let new_root = self.insert_path_(root, 0, bits, value);
        self.roots.insert(name, new_root);
        new_root
    }

    fn insert_path_(&mut self, src: Option<NodeId>, level: usize, bits: &[Bit], value: Value) -> NodeId {
        if level == self.num_vars {
            return self.mk_terminal(value);
        }

        let bit = bits[level];

        let Some(src) = src else {
            // Nothing here yet: grow a fresh single-branch chain.
            let child = self.insert_path_(None, level + 1, bits, value);
            return if bit {
                self.mk_node(level, None, Some(child))
            } else {
                self.mk_node(level, Some(child), None)
            };
        };

        let (low, high) = if self.depth(src) == level {
            let node = self.node(src);
            (node.low(), node.high())
        } else {
            // `src` tests a deeper level (or is a terminal): this level is a don't-care.
            (Some(src), Some(src))
        };

        let (new_low, new_high) = if bit {
            (low, Some(self.insert_path_(high, level + 1, bits, value)))
        } else {
            (Some(self.insert_path_(low, level + 1, bits, value)), high)
        };

        if new_low == low && new_high == high {
            return src;
        }

        self.mk_node(level, new_low, new_high)
    }

    /// Collect all nodes reachable from the given nodes.
    pub fn descendants(&self, nodes: impl IntoIterator<Item = NodeId>) -> HashSet<NodeId> {
        let mut visited = HashSet::new();
        let mut stack = Vec::from_iter(nodes);

        while let Some(node) = stack.pop() {
            if visited.insert(node) {
                stack.extend(self.node(node).children());
            }
        }

        visited
    }

    /// Drop every node that is not reachable from some root.
    pub fn trim(&mut self) -> &mut Self {
        let alive = self.descendants(self.roots.values().copied());
        let dropped = self.store.retain(|id| alive.contains(&id));
        debug!("trim: dropped {} nodes, {} alive", dropped, alive.len());
        self
    }

    /// Replace every test whose two outcomes coincide by that outcome.
    pub fn remove_redundant_tests(&mut self) -> &mut Self {
        let mut cache = HashMap::new();
        let roots: Vec<(NodeName, NodeId)> = self.roots().collect();
        for (name, root) in roots {
            let new_root = self.remove_redundant_(root, &mut cache);
            self.roots.insert(name, new_root);
        }
        debug!("remove_redundant_tests: {} nodes processed", cache.len());
        self.trim()
    }

    fn remove_redundant_(&mut self, node: NodeId, cache: &mut HashMap<NodeId, NodeId>) -> NodeId {
        if let Some(&res) = cache.get(&node) {
            return res;
        }

        let current = *self.node(node);
        let res = match current {
            Node::Terminal { .. } => node,
            Node::Inner { level, low, high } => {
                let low = low.map(|low| self.remove_redundant_(low, cache));
                let high = high.map(|high| self.remove_redundant_(high, cache));
                match (low, high) {
                    (Some(low), Some(high)) if low == high => low,
                    _ => self.mk_node(level.index(), low, high),
                }
            }
        };

        cache.insert(node, res);
        res
    }

    /// Route every missing edge into a single sink terminal carrying `sink_value`.
    ///
    /// With `complete_terminal_nodes`, every terminal value that is not a root
    /// name gets a root pointing at the sink (a state without outgoing
    /// transitions loops in the sink). The sink itself becomes the root
    /// `sink_value` if it was used at all.
    ///
    /// # Panics
    ///
    /// Panics if some edge is missing and `sink_value` is already the value of
    /// a terminal: filling edges with that terminal could merge or collapse nodes.
    pub fn make_complete(&mut self, sink_value: Value, complete_terminal_nodes: bool) -> &mut Self {
        debug!(
            "make_complete(sink_value = {}, complete_terminal_nodes = {})",
            sink_value, complete_terminal_nodes
        );

        assert!(
            self.is_complete() || self.nodes().all(|(_, node)| node.value() != Some(sink_value)),
            "Sink value {} is already a terminal value",
            sink_value
        );

        let mut sink = None;
        let ids: Vec<NodeId> = self.store.ids().collect();

        for id in ids {
            let node = *self.node(id);
            match node {
                Node::Terminal { value } => {
                    if complete_terminal_nodes && !self.roots.contains_key(&value) {
                        let s = *sink.get_or_insert_with(|| self.store.put(Node::Terminal { value: sink_value }));
                        self.roots.insert(value, s);
                    }
                }
                Node::Inner { level, low, high } => {
                    if low.is_some() && high.is_some() {
                        continue;
                    }
                    let s = *sink.get_or_insert_with(|| self.store.put(Node::Terminal { value: sink_value }));
                    self.store.replace(
                        id,
                        Node::Inner {
                            level,
                            low: low.or(Some(s)),
                            high: high.or(Some(s)),
                        },
                    );
                }
            }
        }

        if let Some(s) = sink {
            self.roots.insert(sink_value, s);
        }
        self
    }

    /// Point every name in `names` that has no root yet at the sink terminal.
    ///
    /// The sink also becomes the root `sink_value` if it was used.
    pub fn complete_roots(&mut self, names: impl IntoIterator<Item = NodeName>, sink_value: Value) -> &mut Self {
        let mut sink = None;
        for name in names {
            if !self.roots.contains_key(&name) {
                let s = *sink.get_or_insert_with(|| self.store.put(Node::Terminal { value: sink_value }));
                self.roots.insert(name, s);
            }
        }
        if let Some(s) = sink {
            debug!("complete_roots: sink {} used", s);
            self.roots.insert(sink_value, s);
        }
        self
    }

    /// Check that every inner node has both children.
    pub fn is_complete(&self) -> bool {
        self.nodes()
            .all(|(_, node)| node.is_terminal() || (node.low().is_some() && node.high().is_some()))
    }

    /// Check that no inner node has two equal children.
    pub fn is_reduced(&self) -> bool {
        self.nodes().all(|(_, node)| match (node.low(), node.high()) {
            (Some(low), Some(high)) => low != high,
            _ => true,
        })
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::types::{HI, LO};

    #[test]
    fn test_mk_node_is_canonical() {
        let mut bdd = MtRobdd::new(2);
        let a = bdd.mk_terminal(1);
        let b = bdd.mk_terminal(2);
        let x = bdd.mk_node(1, Some(a), Some(b));
        let y = bdd.mk_node(1, Some(a), Some(b));
        assert_eq!(x, y);
        assert_eq!(bdd.mk_terminal(1), a);
        let p = bdd.mk_node(0, Some(x), None);
        let q = bdd.mk_node(0, Some(y), None);
        assert_eq!(p, q);
        assert_eq!(bdd.size(), 4);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_mk_node_level_out_of_range() {
        let mut bdd = MtRobdd::new(2);
        bdd.mk_node(2, None, None);
    }

    #[test]
    fn test_insert_single_path() {
        let mut bdd = MtRobdd::new(2);
        let root = bdd.insert_path(0, &[LO, LO], 1);

        assert_eq!(bdd.root(0), Some(root));
        assert_eq!(bdd.size(), 3);

        let node = *bdd.node(root);
        assert_eq!(node.level(), Some(Level::new(0)));
        assert_eq!(node.high(), None);
        let next = *bdd.node(node.low().unwrap());
        assert_eq!(next.level(), Some(Level::new(1)));
        assert_eq!(next.high(), None);
        assert_eq!(bdd.node(next.low().unwrap()).value(), Some(1));
    }

    #[test]
    fn test_insert_keeps_opposite_branch() {
        let mut bdd = MtRobdd::new(2);
        let first = bdd.insert_path(0, &[LO, HI], 1);
        let low_before = bdd.node(first).low();

        let root = bdd.insert_path(0, &[HI, LO], 2);
        assert_ne!(root, first);
        assert_eq!(bdd.node(root).low(), low_before);
        assert!(bdd.node(root).high().is_some());
    }

    #[test]
    fn test_insert_existing_path_is_noop() {
        let mut bdd = MtRobdd::new(3);
        let r1 = bdd.insert_path(0, &[HI, LO, HI], 4);
        let size = bdd.size();
        let r2 = bdd.insert_path(0, &[HI, LO, HI], 4);
        assert_eq!(r1, r2);
        assert_eq!(bdd.size(), size);
    }

    #[test]
    fn test_insert_order_does_not_matter() {
        let paths = [
            (vec![LO, LO], 1),
            (vec![LO, HI], 2),
            (vec![HI, HI], 1),
        ];

        let mut forward = MtRobdd::new(2);
        for (bits, value) in paths.iter() {
            forward.insert_path(0, bits, *value);
        }
        forward.trim();

        let mut backward = MtRobdd::new(2);
        for (bits, value) in paths.iter().rev() {
            backward.insert_path(0, bits, *value);
        }
        backward.trim();

        let mut a = forward.all_bit_strings(forward.root(0).unwrap());
        let mut b = backward.all_bit_strings(backward.root(0).unwrap());
        a.sort();
        b.sort();
        assert_eq!(a, b);
        assert_eq!(forward.size(), backward.size());
    }

    #[test]
    fn test_shared_subdiagrams() {
        let mut bdd = MtRobdd::new(2);
        let r0 = bdd.insert_path(0, &[HI, LO], 5);
        let r1 = bdd.insert_path(1, &[HI, LO], 5);
        assert_eq!(r0, r1);
        assert_eq!(bdd.num_roots(), 2);
        assert_eq!(bdd.size(), 3);
    }

    #[test]
    #[should_panic(expected = "Bit vector should not be empty")]
    fn test_insert_empty_path() {
        let mut bdd = MtRobdd::new(0);
        bdd.insert_path(0, &[], 1);
    }

    #[test]
    #[should_panic(expected = "Bit vector length should match the number of variables")]
    fn test_insert_wrong_length() {
        let mut bdd = MtRobdd::new(3);
        bdd.insert_path(0, &[LO, HI], 1);
    }

    #[test]
    fn test_trim_drops_unreachable_nodes() {
        let mut bdd = MtRobdd::new(2);
        bdd.insert_path(0, &[LO, LO], 1);
        // The previous chain of root 0 becomes garbage after this insertion.
        bdd.insert_path(0, &[HI, HI], 2);
        let before = bdd.size();
        bdd.trim();
        assert!(bdd.size() < before);

        let alive = bdd.descendants(bdd.roots().map(|(_, id)| id));
        assert_eq!(alive.len(), bdd.size());
    }

    #[test]
    fn test_trim_is_idempotent() {
        let mut bdd = MtRobdd::new(3);
        bdd.insert_path(0, &[LO, LO, LO], 1);
        bdd.insert_path(0, &[HI, LO, HI], 2);
        bdd.insert_path(1, &[HI, HI, HI], 0);
        bdd.trim();
        let once: Vec<(NodeId, Node)> = bdd.nodes().map(|(id, n)| (id, *n)).collect();
        bdd.trim();
        let twice: Vec<(NodeId, Node)> = bdd.nodes().map(|(id, n)| (id, *n)).collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_remove_redundant_tests_collapses_levels() {
        let mut bdd = MtRobdd::new(3);
        bdd.insert_path(1, &[HI, LO, LO], 2);
        bdd.insert_path(1, &[HI, LO, HI], 2);
        bdd.insert_path(1, &[HI, HI, LO], 2);
        bdd.insert_path(1, &[HI, HI, HI], 2);
        bdd.trim().remove_redundant_tests();

        // Only the test on level 0 survives, its high edge leads to the terminal.
        let root = bdd.root(1).unwrap();
        let node = *bdd.node(root);
        assert_eq!(node.level(), Some(Level::new(0)));
        assert_eq!(node.low(), None);
        let terminal = node.high().unwrap();
        assert_eq!(bdd.node(terminal).value(), Some(2));
        assert_eq!(bdd.size(), 2);
        assert!(bdd.is_reduced());

        let mut paths = bdd.all_bit_strings(root);
        paths.sort();
        assert_eq!(
            paths,
            vec![
                (vec![HI, LO, LO], 2),
                (vec![HI, LO, HI], 2),
                (vec![HI, HI, LO], 2),
                (vec![HI, HI, HI], 2),
            ]
        );
    }

    #[test]
    fn test_remove_redundant_tests_to_terminal_root() {
        let mut bdd = MtRobdd::new(1);
        bdd.insert_path(0, &[LO], 3);
        bdd.insert_path(0, &[HI], 3);
        bdd.trim().remove_redundant_tests();

        let root = bdd.root(0).unwrap();
        assert_eq!(bdd.node(root).value(), Some(3));
        assert_eq!(bdd.size(), 1);
    }

    #[test]
    fn test_remove_redundant_tests_is_noop_when_reduced() {
        let mut bdd = MtRobdd::new(3);
        bdd.insert_path(0, &[LO, LO, LO], 1);
        bdd.insert_path(0, &[LO, LO, HI], 1);
        bdd.insert_path(0, &[HI, HI, LO], 2);
        bdd.insert_path(1, &[LO, HI, HI], 1);
        bdd.trim().remove_redundant_tests();

        let nodes: Vec<(NodeId, Node)> = bdd.nodes().map(|(id, n)| (id, *n)).collect();
        let roots: Vec<_> = bdd.roots().collect();
        bdd.remove_redundant_tests();
        assert_eq!(nodes, bdd.nodes().map(|(id, n)| (id, *n)).collect::<Vec<_>>());
        assert_eq!(roots, bdd.roots().collect::<Vec<_>>());
    }

    #[test]
    fn test_make_complete() {
        let mut bdd = MtRobdd::new(2);
        bdd.insert_path(0, &[LO, LO], 1);
        bdd.insert_path(0, &[HI, HI], 0);
        bdd.trim().remove_redundant_tests().make_complete(7, true);

        assert!(bdd.is_complete());
        // Terminal 1 had no root, so it now points to the sink, as does the sink itself.
        let sink = bdd.root(7).unwrap();
        assert_eq!(bdd.node(sink).value(), Some(7));
        assert_eq!(bdd.root(1), Some(sink));
        for (_, node) in bdd.nodes() {
            if let Some(value) = node.value() {
                assert!(bdd.root(value).is_some());
            }
        }

        // Exactly one sink terminal.
        let sinks = bdd.nodes().filter(|(_, n)| n.value() == Some(7)).count();
        assert_eq!(sinks, 1);
    }

    #[test]
    #[should_panic(expected = "Sink value 9 is already a terminal value")]
    fn test_make_complete_sink_collides_with_terminal() {
        let mut bdd = MtRobdd::new(2);
        bdd.insert_path(0, &[LO, LO], 1);
        bdd.insert_path(1, &[LO, LO], 1);
        bdd.insert_path(1, &[LO, HI], 9);
        bdd.trim().remove_redundant_tests().make_complete(9, false);
    }

    #[test]
    #[should_panic(expected = "Sink value 5 is already a terminal value")]
    fn test_make_complete_sink_would_collapse_a_test() {
        let mut bdd = MtRobdd::new(1);
        bdd.insert_path(0, &[LO], 5);
        bdd.make_complete(5, false);
    }

    #[test]
    fn test_make_complete_twice() {
        let mut bdd = MtRobdd::new(1);
        bdd.insert_path(0, &[LO], 1);
        bdd.make_complete(5, false);
        let size = bdd.size();
        bdd.make_complete(5, false);
        assert_eq!(bdd.size(), size);
        assert!(bdd.is_reduced());
    }

    #[test]
    fn test_make_complete_without_terminal_roots() {
        let mut bdd = MtRobdd::new(1);
        bdd.insert_path(0, &[LO], 1);
        bdd.make_complete(5, false);
        assert!(bdd.is_complete());
        assert_eq!(bdd.root(1), None);
        assert!(bdd.root(5).is_some());
    }

    #[test]
    fn test_make_complete_unused_sink() {
        let mut bdd = MtRobdd::new(1);
        bdd.insert_path(0, &[LO], 0);
        bdd.insert_path(0, &[HI], 0);
        bdd.trim().remove_redundant_tests().make_complete(5, true);
        assert_eq!(bdd.root(5), None);
        assert_eq!(bdd.num_roots(), 1);
        assert_eq!(bdd.size(), 1);
    }

    #[test]
    fn test_complete_roots() {
        let mut bdd = MtRobdd::new(1);
        bdd.insert_path(0, &[LO], 0);
        bdd.make_complete(3, true);
        bdd.complete_roots(0..3, 3);

        let sink = bdd.root(3).unwrap();
        assert_eq!(bdd.root(1), Some(sink));
        assert_eq!(bdd.root(2), Some(sink));
        assert_eq!(bdd.num_roots(), 4);
        let sinks = bdd.nodes().filter(|(_, n)| n.value() == Some(3)).count();
        assert_eq!(sinks, 1);
    }
}
