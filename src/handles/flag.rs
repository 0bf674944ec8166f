//! Flag handle. Flags only exist as map entries.

use crate::error::Result;
use crate::handles::{ChildHandle, Node};
use crate::operation::Operation;
use crate::types::Kind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    node: Node,
}

impl ChildHandle for Flag {
    const KIND: Kind = Kind::Flag;

    fn from_node(node: Node) -> Self {
        Self { node }
    }

    fn node(&self) -> &Node {
        &self.node
    }
}

impl Flag {
    /// Current value; false if never written.
    pub fn get(&self) -> Result<bool> {
        Ok(self.node.read(Kind::Flag)?.as_flag().unwrap_or(false))
    }

    pub fn set(&self, value: bool) -> Result<()> {
        self.node.apply(Operation::Flag(value))
    }

    pub fn enable(&self) -> Result<()> {
        self.set(true)
    }

    pub fn disable(&self) -> Result<()> {
        self.set(false)
    }
}
