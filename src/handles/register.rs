//! Register handle. Registers only exist as map entries.

use crate::error::Result;
use crate::handles::{ChildHandle, Node};
use crate::operation::Operation;
use crate::types::Kind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    node: Node,
}

impl ChildHandle for Register {
    const KIND: Kind = Kind::Register;

    fn from_node(node: Node) -> Self {
        Self { node }
    }

    fn node(&self) -> &Node {
        &self.node
    }
}

impl Register {
    /// Current value; empty string if never written.
    pub fn get(&self) -> Result<String> {
        Ok(self
            .node
            .read(Kind::Register)?
            .as_register()
            .unwrap_or_default()
            .to_string())
    }

    pub fn set(&self, value: impl Into<String>) -> Result<()> {
        self.node.apply(Operation::Register(value.into()))
    }
}
