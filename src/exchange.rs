//! Node table exchange with external BDD managers.
//!
//! Another engine only sees a diagram through a [`NodeManager`]: it can look
//! up (or create) leaves and inner nodes, and tell what a pointer stands for.
//! Between the two sides sits a flat, position-indexed [`NodeTable`] in which
//! children are positions instead of handles.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::hash::Hash;

use log::debug;

use crate::error::{Error, Result};
use crate::mtrobdd::MtRobdd;
use crate::node::{Node, NodeId};
use crate::types::{Level, NodeName, Value};

/// One node as seen by a manager, with children of pointer type `P`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Entry<P> {
    Leaf { value: Value },
    Inner { level: usize, low: P, high: P },
}

/// Access to a shared BDD manager of another engine.
pub trait NodeManager {
    type Ptr: Copy + Eq + Hash + Debug;

    /// Get or create the leaf holding `value`.
    fn find_leaf(&mut self, value: Value) -> Self::Ptr;

    /// Get or create the inner node testing `level`.
    fn find_node(&mut self, low: Self::Ptr, high: Self::Ptr, level: usize) -> Self::Ptr;

    fn entry(&self, ptr: Self::Ptr) -> Entry<Self::Ptr>;
}

/// Flat snapshot of a complete diagram.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeTable {
    pub entries: Vec<Entry<usize>>,
    pub roots: BTreeMap<NodeName, usize>,
}

fn alloc_table<T>(entries: usize) -> Result<Vec<T>> {
    let mut table = Vec::new();
    table
        .try_reserve_exact(entries)
        .map_err(|source| Error::Allocation { entries, source })?;
    Ok(table)
}

impl MtRobdd {
    /// Flatten the diagram into a [`NodeTable`].
    ///
    /// Positions follow the store order.
    ///
    /// # Panics
    ///
    /// Panics if an inner node lacks a child: only complete diagrams can be
    /// exported.
    pub fn to_node_table(&self) -> Result<NodeTable> {
        assert!(self.is_complete(), "Diagram should be complete before export");

        let position: HashMap<NodeId, usize> = self.nodes().enumerate().map(|(pos, (id, _))| (id, pos)).collect();
        let mut entries = alloc_table(position.len())?;

        for (_, node) in self.nodes() {
            let entry = match *node {
                Node::Terminal { value } => Entry::Leaf { value },
                Node::Inner {
                    level,
                    low: Some(low),
                    high: Some(high),
                } => Entry::Inner {
                    level: level.index(),
                    low: position[&low],
                    high: position[&high],
                },
                Node::Inner { .. } => unreachable!("completeness was checked"),
            };
            entries.push(entry);
        }

        let roots = self.roots().map(|(name, root)| (name, position[&root])).collect();
        Ok(NodeTable { entries, roots })
    }

    /// Rebuild the diagram inside `manager`.
    ///
    /// Returns one pointer per root, indexed by root name.
    ///
    /// # Panics
    ///
    /// Panics if the diagram is not complete, or if its root names are not
    /// exactly `0..num_roots()`.
    pub fn export<M: NodeManager>(&self, manager: &mut M) -> Result<Vec<M::Ptr>> {
        debug!("export: {} nodes, {} roots", self.size(), self.num_roots());
        let table = self.to_node_table()?;
        assert!(
            table.roots.keys().copied().eq(0..table.roots.len()),
            "Root names should be 0..{}",
            table.roots.len()
        );

        let mut built: Vec<Option<M::Ptr>> = alloc_table(table.entries.len())?;
        built.resize(table.entries.len(), None);

        Ok(table
            .roots
            .values()
            .map(|&pos| build(&table, pos, manager, &mut built))
            .collect())
    }

    /// Read the diagrams below `roots` back from `manager`.
    ///
    /// The root `roots[i]` gets the name `i`.
    ///
    /// # Panics
    ///
    /// Panics if a level is out of range, or if some child does not test a
    /// strictly deeper level than its parent.
    pub fn import<M: NodeManager>(num_vars: usize, manager: &M, roots: &[M::Ptr]) -> Result<Self> {
        // Mark every reachable pointer and give it a position.
        let mut position: HashMap<M::Ptr, usize> = HashMap::new();
        let mut order: Vec<M::Ptr> = Vec::new();
        let mut stack: Vec<M::Ptr> = roots.iter().rev().copied().collect();
        while let Some(ptr) = stack.pop() {
            if position.contains_key(&ptr) {
                continue;
            }
            position.insert(ptr, order.len());
            order.push(ptr);
            if let Entry::Inner { low, high, .. } = manager.entry(ptr) {
                stack.push(high);
                stack.push(low);
            }
        }
        debug!("import: {} nodes, {} roots", order.len(), roots.len());

        let mut table: Vec<Entry<usize>> = alloc_table(order.len())?;
        for &ptr in order.iter() {
            table.push(match manager.entry(ptr) {
                Entry::Leaf { value } => Entry::Leaf { value },
                Entry::Inner { level, low, high } => {
                    assert!(
                        level < num_vars,
                        "Variable index {} is out of range 0..{}",
                        level,
                        num_vars
                    );
                    Entry::Inner {
                        level,
                        low: position[&low],
                        high: position[&high],
                    }
                }
            });
        }

        for (pos, entry) in table.iter().enumerate() {
            if let Entry::Inner { level, low, high } = *entry {
                for child in [low, high] {
                    if let Entry::Inner { level: below, .. } = table[child] {
                        assert!(
                            level < below,
                            "Variable order violated: node at level {} has a child at level {} (position {})",
                            level,
                            below,
                            pos
                        );
                    }
                }
            }
        }

        // Placeholders first, so children can be referenced before they are filled.
        let mut bdd = MtRobdd::new(num_vars);
        let ids: Vec<NodeId> = table.iter().map(|_| bdd.store.reserve()).collect();
        for (pos, entry) in table.iter().enumerate() {
            let node = match *entry {
                Entry::Leaf { value } => Node::Terminal { value },
                Entry::Inner { level, low, high } => Node::Inner {
                    level: Level::new(level),
                    low: Some(ids[low]),
                    high: Some(ids[high]),
                },
            };
            bdd.store.replace(ids[pos], node);
        }

        for (name, root) in roots.iter().enumerate() {
            bdd.roots.insert(name, ids[position[root]]);
        }
        Ok(bdd)
    }
}

/// Construct the node at `pos` in `manager`, children first.
fn build<M: NodeManager>(table: &NodeTable, pos: usize, manager: &mut M, built: &mut [Option<M::Ptr>]) -> M::Ptr {
    if let Some(ptr) = built[pos] {
        return ptr;
    }
    let ptr = match table.entries[pos] {
        Entry::Leaf { value } => manager.find_leaf(value),
        Entry::Inner { level, low, high } => {
            let low = build(table, low, manager, built);
            let high = build(table, high, manager, built);
            manager.find_node(low, high, level)
        }
    };
    built[pos] = Some(ptr);
    ptr
}
