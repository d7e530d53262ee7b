use std::fmt::{Display, Formatter};

use crate::types::{Bit, Level, Value};

/// Handle of a node inside a [`NodeStore`][crate::storage::NodeStore].
///
/// Handles replace pointer identity: two handles are equal iff they denote
/// the same node of the same store.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Return the slot index of the node.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// A decision diagram node.
///
/// Inner nodes may miss a child until the diagram is completed.
/// Equality and hashing look at child *handles* only.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Node {
    Terminal {
        value: Value,
    },
    Inner {
        level: Level,
        low: Option<NodeId>,
        high: Option<NodeId>,
    },
}

impl Node {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Node::Terminal { .. })
    }

    pub fn is_inner(&self) -> bool {
        matches!(self, Node::Inner { .. })
    }

    /// Level tested by an inner node, `None` for terminals.
    pub fn level(&self) -> Option<Level> {
        match *self {
            Node::Inner { level, .. } => Some(level),
            Node::Terminal { .. } => None,
        }
    }

    /// Value carried by a terminal, `None` for inner nodes.
    pub fn value(&self) -> Option<Value> {
        match *self {
            Node::Terminal { value } => Some(value),
            Node::Inner { .. } => None,
        }
    }

    pub fn low(&self) -> Option<NodeId> {
        match *self {
            Node::Inner { low, .. } => low,
            Node::Terminal { .. } => None,
        }
    }

    pub fn high(&self) -> Option<NodeId> {
        match *self {
            Node::Inner { high, .. } => high,
            Node::Terminal { .. } => None,
        }
    }

    /// Child followed when the tested variable equals `bit`.
    pub fn child(&self, bit: Bit) -> Option<NodeId> {
        if bit {
            self.high()
        } else {
            self.low()
        }
    }

    /// Both children, low first.
    pub fn children(&self) -> impl Iterator<Item = NodeId> {
        [self.low(), self.high()].into_iter().flatten()
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let show = |child: Option<NodeId>| child.map_or("-".to_string(), |c| c.to_string());
        match *self {
            Node::Terminal { value } => write!(f, "[{}]", value),
            Node::Inner { level, low, high } => {
                write!(f, "({}, low = {}, high = {})", level, show(low), show(high))
            }
        }
    }
}
