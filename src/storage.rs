//! Canonical node store.
//!
//! Nodes live in a plain `Vec` of slots indexed by [`NodeId`], and a unique
//! table maps every registered node to its handle:
//!
//! ```text
//! data[0] → Some(Terminal { value: 1 })
//! data[1] → Some(Inner { level: x1, low: None, high: @0 })
//! data[2] → None                               (freed by a sweep)
//! unique  → { Terminal{1} ↦ @0, Inner{x1, -, @0} ↦ @1 }
//! ```
//!
//! [`NodeStore::put`] first probes the unique table, so the store never holds
//! two registered nodes with the same `(level, low, high, value)`.
//! Freed slots are reused lowest-first by later allocations.

use std::collections::HashMap;
use std::ops::Index;

use crate::node::{Node, NodeId};
use crate::types::Level;

#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    data: Vec<Option<Node>>,
    unique: HashMap<Node, NodeId>,
    /// Index of the first *possibly* free slot.
    min_free: usize,
    /// Number of occupied slots.
    real_size: usize,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.real_size
    }

    pub fn is_empty(&self) -> bool {
        self.real_size == 0
    }

    /// Number of slots, occupied or not.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        matches!(self.data.get(id.index()), Some(Some(_)))
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.data.get(id.index()).and_then(|slot| slot.as_ref())
    }

    /// Get the node behind a handle.
    ///
    /// # Panics
    ///
    /// Panics if the slot is not occupied.
    pub fn node(&self, id: NodeId) -> &Node {
        self.get(id)
            .unwrap_or_else(|| panic!("Node {} is not occupied", id))
    }

    /// Look up the handle of a registered node equal to `node`.
    pub fn find(&self, node: &Node) -> Option<NodeId> {
        self.unique.get(node).copied()
    }

    /// Put a node into the store and return its canonical handle.
    pub fn put(&mut self, node: Node) -> NodeId {
        if let Some(&id) = self.unique.get(&node) {
            // The node already exists.
            return id;
        }
        let id = self.add(node);
        self.unique.insert(node, id);
        id
    }

    /// Allocate a new slot and return its index.
    fn alloc(&mut self) -> usize {
        let index = (self.min_free..self.data.len())
            .find(|&i| self.data[i].is_none())
            .unwrap_or_else(|| {
                self.data.push(None);
                self.data.len() - 1
            });

        if index > u32::MAX as usize {
            panic!("Node store is full");
        }

        self.min_free = index + 1;
        self.real_size += 1;
        index
    }

    /// Store a node without registering it in the unique table.
    fn add(&mut self, node: Node) -> NodeId {
        let index = self.alloc();
        self.data[index] = Some(node);
        NodeId::new(index as u32)
    }

    /// Allocate a placeholder slot, to be filled later with [`replace`][Self::replace].
    ///
    /// Placeholders are invisible to [`find`][Self::find] until filled.
    pub(crate) fn reserve(&mut self) -> NodeId {
        self.add(Node::Inner {
            level: Level::new(0),
            low: None,
            high: None,
        })
    }

    /// Overwrite the node behind `id` and re-key the unique table.
    ///
    /// If an equal node is already registered under another handle, that
    /// handle stays the canonical one.
    pub(crate) fn replace(&mut self, id: NodeId, node: Node) {
        let old = *self.node(id);
        if self.unique.get(&old) == Some(&id) {
            self.unique.remove(&old);
        }
        self.data[id.index()] = Some(node);
        self.unique.entry(node).or_insert(id);
    }

    /// Drop every node for which `keep` returns `false`.
    ///
    /// Returns the number of dropped nodes.
    pub fn retain(&mut self, mut keep: impl FnMut(NodeId) -> bool) -> usize {
        let mut dropped = 0;
        for index in 0..self.data.len() {
            let id = NodeId::new(index as u32);
            let Some(node) = self.data[index] else {
                continue;
            };
            if keep(id) {
                continue;
            }
            if self.unique.get(&node) == Some(&id) {
                self.unique.remove(&node);
            }
            self.data[index] = None;
            self.min_free = self.min_free.min(index);
            self.real_size -= 1;
            dropped += 1;
        }
        dropped
    }

    /// Iterate over all live nodes in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.data
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|node| (NodeId::new(i as u32), node)))
    }

    /// Iterate over the handles of all live nodes in slot order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.iter().map(|(id, _)| id)
    }
}

impl Index<NodeId> for NodeStore {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Self::Output {
        self.node(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inner(level: usize, low: Option<NodeId>, high: Option<NodeId>) -> Node {
        Node::Inner {
            level: Level::new(level),
            low,
            high,
        }
    }

    #[test]
    fn test_put_reuses_equal_nodes() {
        let mut store = NodeStore::new();
        let a = store.put(Node::Terminal { value: 1 });
        let b = store.put(Node::Terminal { value: 1 });
        let c = store.put(Node::Terminal { value: 2 });
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_put_compares_child_handles() {
        let mut store = NodeStore::new();
        let t1 = store.put(Node::Terminal { value: 1 });
        let t2 = store.put(Node::Terminal { value: 2 });
        let x = store.put(inner(0, Some(t1), Some(t2)));
        let y = store.put(inner(0, Some(t1), Some(t2)));
        let z = store.put(inner(0, Some(t2), Some(t1)));
        assert_eq!(x, y);
        assert_ne!(x, z);
        assert_eq!(store.find(&inner(0, Some(t1), Some(t2))), Some(x));
    }

    #[test]
    fn test_retain_frees_slots_for_reuse() {
        let mut store = NodeStore::new();
        let a = store.put(Node::Terminal { value: 1 });
        let b = store.put(Node::Terminal { value: 2 });
        let c = store.put(Node::Terminal { value: 3 });

        let dropped = store.retain(|id| id != b);
        assert_eq!(dropped, 1);
        assert_eq!(store.len(), 2);
        assert!(!store.contains(b));
        assert!(store.contains(a) && store.contains(c));
        assert_eq!(store.find(&Node::Terminal { value: 2 }), None);

        // The freed slot is reused.
        let d = store.put(Node::Terminal { value: 4 });
        assert_eq!(d, b);
        assert_eq!(store.capacity(), 3);
    }

    #[test]
    fn test_reserve_and_replace() {
        let mut store = NodeStore::new();
        let p = store.reserve();
        assert_eq!(store.find(&inner(0, None, None)), None);

        store.replace(p, Node::Terminal { value: 9 });
        assert_eq!(store[p], Node::Terminal { value: 9 });
        assert_eq!(store.put(Node::Terminal { value: 9 }), p);
    }

    #[test]
    fn test_replace_rekeys() {
        let mut store = NodeStore::new();
        let t = store.put(Node::Terminal { value: 0 });
        let n = store.put(inner(0, Some(t), None));
        store.replace(n, inner(0, Some(t), Some(t)));
        assert_eq!(store.find(&inner(0, Some(t), None)), None);
        assert_eq!(store.find(&inner(0, Some(t), Some(t))), Some(n));
    }

    #[test]
    #[should_panic(expected = "is not occupied")]
    fn test_node_of_freed_slot() {
        let mut store = NodeStore::new();
        let a = store.put(Node::Terminal { value: 1 });
        store.retain(|_| false);
        store.node(a);
    }
}
