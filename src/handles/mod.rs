//! Handles
//!
//! A handle is a root reference plus a path. Handles are cheap to create and
//! two handles with the same location address the same node: neither holds a
//! copy of the value, and all reads and writes go through the shared [`Root`].

pub mod counter;
pub mod flag;
pub mod map;
pub mod register;
pub mod set;

pub use counter::Counter;
pub use flag::Flag;
pub use map::{Accessor, Map};
pub use register::Register;
pub use set::Set;

use crate::error::Result;
use crate::operation::Operation;
use crate::root::Root;
use crate::types::{Kind, Location, Path};
use crate::value::Value;

/// Root reference and path shared by every handle type
#[derive(Debug, Clone)]
pub struct Node {
    root: Root,
    path: Path,
}

impl Node {
    pub(crate) fn new(root: Root, path: Path) -> Self {
        Self { root, path }
    }

    pub fn root(&self) -> &Root {
        &self.root
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn location(&self) -> Location {
        Location {
            root: self.root.id().clone(),
            path: self.path.clone(),
        }
    }

    pub(crate) fn child(&self, kind: Kind, name: impl Into<String>) -> Node {
        Node {
            root: self.root.clone(),
            path: self.path.child(kind, name),
        }
    }

    pub(crate) fn read(&self, kind: Kind) -> Result<Value> {
        self.root.read(&self.path, kind)
    }

    pub(crate) fn apply(&self, op: Operation) -> Result<()> {
        self.root.apply(self.path.clone(), op)
    }

    pub(crate) fn withdraw_addition(&self, member: &str) -> Result<bool> {
        self.root.withdraw_addition(&self.path, member)
    }
}

/// Equal locations are the same node. Two equal nodes may still sit on
/// separate [`Root`] states with their own cache and batch slot; use
/// [`Root::same_root`] to tell those apart.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.root.id() == other.root.id() && self.path == other.path
    }
}

impl Eq for Node {}

/// A handle type that can live inside a map
pub trait ChildHandle: Sized {
    const KIND: Kind;

    fn from_node(node: Node) -> Self;

    fn node(&self) -> &Node;

    fn location(&self) -> Location {
        self.node().location()
    }

    /// Open a batch on this handle's root. An inner map's batch is the
    /// outermost root's batch.
    fn batch<T, F>(&self, body: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        self.node().root().batch(|_| body(self))
    }
}

/// Any handle, tagged by kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handle {
    Counter(Counter),
    Set(Set),
    Register(Register),
    Flag(Flag),
    Map(Map),
}

impl Handle {
    pub(crate) fn from_node(kind: Kind, node: Node) -> Handle {
        match kind {
            Kind::Counter => Handle::Counter(Counter::from_node(node)),
            Kind::Set => Handle::Set(Set::from_node(node)),
            Kind::Register => Handle::Register(Register::from_node(node)),
            Kind::Flag => Handle::Flag(Flag::from_node(node)),
            Kind::Map => Handle::Map(Map::from_node(node)),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Handle::Counter(_) => Kind::Counter,
            Handle::Set(_) => Kind::Set,
            Handle::Register(_) => Kind::Register,
            Handle::Flag(_) => Kind::Flag,
            Handle::Map(_) => Kind::Map,
        }
    }

    pub fn location(&self) -> Location {
        match self {
            Handle::Counter(h) => h.location(),
            Handle::Set(h) => h.location(),
            Handle::Register(h) => h.location(),
            Handle::Flag(h) => h.location(),
            Handle::Map(h) => h.location(),
        }
    }

    /// Name of the entry within its parent map; `None` for a root handle.
    pub fn name(&self) -> Option<String> {
        self.location().path.last().map(|s| s.name.clone())
    }
}
