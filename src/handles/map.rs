//! Map handle and typed child accessors
//!
//! ```text
//! map.maps().get("a").maps().get("b").counters().get("c").increment()
//! ```
//! builds the path `a(map).b(map).c(counter)` and submits one nested
//! operation through the root of `map`.

use crate::error::Result;
use crate::handles::{ChildHandle, Counter, Flag, Handle, Node, Register, Set};
use crate::operation::{MapOp, Operation};
use crate::root::Root;
use crate::types::{Kind, Path, Segment};
use std::collections::BTreeSet;
use std::marker::PhantomData;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Map {
    node: Node,
}

impl ChildHandle for Map {
    const KIND: Kind = Kind::Map;

    fn from_node(node: Node) -> Self {
        Self { node }
    }

    fn node(&self) -> &Node {
        &self.node
    }
}

impl Map {
    /// Handle on a root map.
    pub fn new(root: Root) -> Self {
        Self::from_node(Node::new(root, Path::root()))
    }

    /// Which entries exist and their kinds. Values are read through the
    /// entry handles.
    pub fn read(&self) -> Result<BTreeSet<Segment>> {
        let value = self.node.read(Kind::Map)?;
        Ok(value
            .as_map()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default())
    }

    /// Handles for every existing entry.
    pub fn entries(&self) -> Result<Vec<Handle>> {
        Ok(self
            .read()?
            .into_iter()
            .map(|segment| Handle::from_node(segment.kind, self.node.child(segment.kind, segment.name)))
            .collect())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    pub fn counters(&self) -> Accessor<Counter> {
        Accessor::new(self.node.clone())
    }

    pub fn sets(&self) -> Accessor<Set> {
        Accessor::new(self.node.clone())
    }

    pub fn registers(&self) -> Accessor<Register> {
        Accessor::new(self.node.clone())
    }

    pub fn flags(&self) -> Accessor<Flag> {
        Accessor::new(self.node.clone())
    }

    pub fn maps(&self) -> Accessor<Map> {
        Accessor::new(self.node.clone())
    }
}

/// Entries of one kind within a map, keyed by name
#[derive(Debug, Clone)]
pub struct Accessor<H> {
    map: Node,
    _kind: PhantomData<fn() -> H>,
}

impl<H: ChildHandle> Accessor<H> {
    fn new(map: Node) -> Self {
        Self {
            map,
            _kind: PhantomData,
        }
    }

    /// Handle for the entry `name`. Creating the handle does not touch the
    /// backend; the entry need not exist yet.
    pub fn get(&self, name: impl Into<String>) -> H {
        H::from_node(self.map.child(H::KIND, name))
    }

    pub fn contains(&self, name: &str) -> Result<bool> {
        let segment = Segment::new(H::KIND, name);
        Ok(self.entries()?.contains(&segment))
    }

    /// Names of existing entries of this kind, in order.
    pub fn names(&self) -> Result<Vec<String>> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|segment| segment.kind == H::KIND)
            .map(|segment| segment.name)
            .collect())
    }

    /// Remove the entry from the map. Inside a batch this wins over any
    /// update to the same entry in that batch.
    pub fn remove(&self, name: impl Into<String>) -> Result<()> {
        let segment = Segment::new(H::KIND, name);
        self.map.apply(Operation::Map(MapOp::removing(segment)))
    }

    fn entries(&self) -> Result<BTreeSet<Segment>> {
        Map::from_node(self.map.clone()).read()
    }
}
