//! Counter handle

use crate::error::Result;
use crate::handles::{ChildHandle, Node};
use crate::operation::Operation;
use crate::root::Root;
use crate::types::{Kind, Path};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counter {
    node: Node,
}

impl ChildHandle for Counter {
    const KIND: Kind = Kind::Counter;

    fn from_node(node: Node) -> Self {
        Self { node }
    }

    fn node(&self) -> &Node {
        &self.node
    }
}

impl Counter {
    /// Handle on a root counter.
    pub fn new(root: Root) -> Self {
        Self::from_node(Node::new(root, Path::root()))
    }

    /// Current value; 0 if never written.
    pub fn value(&self) -> Result<i64> {
        Ok(self.node.read(Kind::Counter)?.as_counter().unwrap_or(0))
    }

    pub fn read(&self) -> Result<i64> {
        self.value()
    }

    pub fn increment(&self) -> Result<()> {
        self.increment_by(1)
    }

    pub fn increment_by(&self, amount: i64) -> Result<()> {
        self.node.apply(Operation::increment(amount))
    }

    pub fn decrement(&self) -> Result<()> {
        self.decrement_by(1)
    }

    pub fn decrement_by(&self, amount: i64) -> Result<()> {
        self.node.apply(Operation::decrement(amount))
    }
}
