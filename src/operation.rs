//! Operation shapes and their composition rules
//!
//! Several mutations aimed at the same path inside one submission collapse
//! into a single operation:
//! - counters sum their deltas
//! - set members keep whichever of add/remove was registered last
//! - registers and flags keep the last value
//! - map entry removal beats any update of the same entry
//!
//! Operations on different paths never interact.

use crate::error::{CrdtError, Result};
use crate::types::{Kind, Path, Segment};
use std::collections::{BTreeMap, BTreeSet};

/// Net change to a counter. Kept wider than the counter itself so that
/// intermediate sums inside a batch stay exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterOp {
    pub delta: i128,
}

/// Additions and removals for one set. The two sides are kept disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetOp {
    adds: BTreeSet<String>,
    removes: BTreeSet<String>,
}

impl SetOp {
    pub fn adding(member: impl Into<String>) -> Self {
        let mut op = SetOp::default();
        op.add(member);
        op
    }

    pub fn removing(member: impl Into<String>) -> Self {
        let mut op = SetOp::default();
        op.remove(member);
        op
    }

    pub fn add(&mut self, member: impl Into<String>) {
        let member = member.into();
        self.removes.remove(&member);
        self.adds.insert(member);
    }

    pub fn remove(&mut self, member: impl Into<String>) {
        let member = member.into();
        self.adds.remove(&member);
        self.removes.insert(member);
    }

    pub fn adds(&self) -> &BTreeSet<String> {
        &self.adds
    }

    pub fn removes(&self) -> &BTreeSet<String> {
        &self.removes
    }

    /// Take back a pending addition without registering a removal.
    pub(crate) fn withdraw(&mut self, member: &str) -> bool {
        self.adds.remove(member)
    }

    /// Apply `later` on top of this one. Its sides are disjoint, so
    /// replaying them in either order gives last-action-wins per member.
    fn merge(&mut self, later: SetOp) {
        for member in later.adds {
            self.add(member);
        }
        for member in later.removes {
            self.remove(member);
        }
    }
}

/// Entry removals and nested child operations for one map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapOp {
    removes: BTreeSet<Segment>,
    updates: BTreeMap<Segment, Operation>,
}

impl MapOp {
    pub fn removing(segment: Segment) -> Self {
        let mut op = MapOp::default();
        op.removes.insert(segment);
        op
    }

    pub fn removes(&self) -> &BTreeSet<Segment> {
        &self.removes
    }

    pub fn updates(&self) -> &BTreeMap<Segment, Operation> {
        &self.updates
    }

    pub fn update_for(&self, segment: &Segment) -> Option<&Operation> {
        self.updates.get(segment)
    }

    /// Drop the entry, discarding any pending update to it.
    pub fn remove(&mut self, segment: Segment) {
        self.updates.remove(&segment);
        self.removes.insert(segment);
    }

    /// Compose `op` into the entry at `segment`. Ignored if the entry is
    /// being removed in this submission.
    pub fn update(&mut self, segment: Segment, op: Operation, at: &Path) -> Result<()> {
        if self.removes.contains(&segment) {
            return Ok(());
        }
        let child_path = at.child(segment.kind, segment.name.clone());
        if op.kind() != segment.kind {
            return Err(CrdtError::TypeMismatch {
                path: child_path,
                expected: segment.kind,
                found: op.kind(),
            });
        }
        match self.updates.get_mut(&segment) {
            Some(existing) => existing.merge(op, &child_path)?,
            None => {
                self.updates.insert(segment, op);
            }
        }
        Ok(())
    }

    fn merge(&mut self, later: MapOp, at: &Path) -> Result<()> {
        for segment in later.removes {
            self.remove(segment);
        }
        for (segment, op) in later.updates {
            self.update(segment, op, at)?;
        }
        Ok(())
    }

    fn prune(&mut self) {
        for op in self.updates.values_mut() {
            op.prune();
        }
        self.updates.retain(|_, op| !op.is_noop());
    }
}

/// A pending mutation against one node, possibly a tree of nested map updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Counter(CounterOp),
    Set(SetOp),
    Register(String),
    Flag(bool),
    Map(MapOp),
}

impl Operation {
    pub fn increment(delta: i64) -> Self {
        Operation::Counter(CounterOp {
            delta: i128::from(delta),
        })
    }

    pub fn decrement(amount: i64) -> Self {
        Operation::Counter(CounterOp {
            delta: -i128::from(amount),
        })
    }

    pub fn kind(&self) -> Kind {
        match self {
            Operation::Counter(_) => Kind::Counter,
            Operation::Set(_) => Kind::Set,
            Operation::Register(_) => Kind::Register,
            Operation::Flag(_) => Kind::Flag,
            Operation::Map(_) => Kind::Map,
        }
    }

    /// Wrap `op` in map updates so that it addresses `path` from the root.
    pub fn nest(path: &Path, op: Operation) -> Operation {
        path.segments().iter().rev().fold(op, |inner, segment| {
            let mut map = MapOp::default();
            map.updates.insert(segment.clone(), inner);
            Operation::Map(map)
        })
    }

    /// Compose a later-registered operation into this one. `at` is only used
    /// to name the location in a type mismatch.
    pub fn merge(&mut self, later: Operation, at: &Path) -> Result<()> {
        match (self, later) {
            (Operation::Counter(a), Operation::Counter(b)) => {
                a.delta = a
                    .delta
                    .checked_add(b.delta)
                    .ok_or_else(|| CrdtError::CounterOverflow { path: at.clone() })?;
            }
            (Operation::Set(a), Operation::Set(b)) => a.merge(b),
            (Operation::Register(a), Operation::Register(b)) => *a = b,
            (Operation::Flag(a), Operation::Flag(b)) => *a = b,
            (Operation::Map(a), Operation::Map(b)) => a.merge(b, at)?,
            (current, later) => {
                return Err(CrdtError::TypeMismatch {
                    path: at.clone(),
                    expected: current.kind(),
                    found: later.kind(),
                })
            }
        }
        Ok(())
    }

    /// True when submitting this operation would change nothing.
    pub fn is_noop(&self) -> bool {
        match self {
            Operation::Counter(op) => op.delta == 0,
            Operation::Set(op) => op.adds.is_empty() && op.removes.is_empty(),
            Operation::Register(_) | Operation::Flag(_) => false,
            Operation::Map(op) => {
                op.removes.is_empty() && op.updates.values().all(Operation::is_noop)
            }
        }
    }

    /// Remove no-op children from map updates, recursively.
    pub fn prune(&mut self) {
        if let Operation::Map(map) = self {
            map.prune();
        }
    }

    /// Removals are only meaningful relative to an observed state, so the
    /// backend needs the causal context of the snapshot they came from.
    pub fn needs_context(&self) -> bool {
        match self {
            Operation::Set(op) => !op.removes.is_empty(),
            Operation::Map(op) => {
                !op.removes.is_empty() || op.updates.values().any(Operation::needs_context)
            }
            _ => false,
        }
    }

    /// Follow map updates down `path` to the operation registered there.
    pub fn at(&self, path: &Path) -> Option<&Operation> {
        let mut current = self;
        for segment in path.segments() {
            match current {
                Operation::Map(map) => current = map.updates.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }
}
