//! Set handle

use crate::error::Result;
use crate::handles::{ChildHandle, Node};
use crate::operation::{Operation, SetOp};
use crate::root::Root;
use crate::types::{Kind, Path};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Set {
    node: Node,
}

impl ChildHandle for Set {
    const KIND: Kind = Kind::Set;

    fn from_node(node: Node) -> Self {
        Self { node }
    }

    fn node(&self) -> &Node {
        &self.node
    }
}

impl Set {
    /// Handle on a root set.
    pub fn new(root: Root) -> Self {
        Self::from_node(Node::new(root, Path::root()))
    }

    /// Current members; empty if never written.
    pub fn members(&self) -> Result<BTreeSet<String>> {
        Ok(self
            .node
            .read(Kind::Set)?
            .as_set()
            .cloned()
            .unwrap_or_default())
    }

    pub fn read(&self) -> Result<BTreeSet<String>> {
        self.members()
    }

    pub fn contains(&self, member: &str) -> Result<bool> {
        Ok(self.members()?.contains(member))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.members()?.is_empty())
    }

    pub fn add(&self, member: impl Into<String>) -> Result<()> {
        self.node.apply(Operation::Set(SetOp::adding(member)))
    }

    /// Remove `member`. Inside a batch, removing a member that was only
    /// added earlier in the same batch cancels that addition instead.
    pub fn remove(&self, member: impl Into<String>) -> Result<()> {
        let member = member.into();
        if self.node.withdraw_addition(&member)? {
            return Ok(());
        }
        self.node.apply(Operation::Set(SetOp::removing(member)))
    }
}
