//! Value snapshots
//!
//! A fetched root arrives as one [`Value`] tree. Handles never hold their own
//! copy; they project their sub-value out of the root snapshot by path.

use crate::error::{CrdtError, Result};
use crate::types::{Kind, Path, Segment};
use std::collections::{BTreeMap, BTreeSet};

/// Snapshot of one CRDT node as last seen on the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Counter(i64),
    Set(BTreeSet<String>),
    Register(String),
    Flag(bool),
    Map(BTreeMap<Segment, Value>),
}

impl Value {
    /// The empty value of a kind, used for locations that were never written.
    pub fn identity(kind: Kind) -> Value {
        match kind {
            Kind::Counter => Value::Counter(0),
            Kind::Set => Value::Set(BTreeSet::new()),
            Kind::Register => Value::Register(String::new()),
            Kind::Flag => Value::Flag(false),
            Kind::Map => Value::Map(BTreeMap::new()),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Counter(_) => Kind::Counter,
            Value::Set(_) => Kind::Set,
            Value::Register(_) => Kind::Register,
            Value::Flag(_) => Kind::Flag,
            Value::Map(_) => Kind::Map,
        }
    }

    /// Walk `path` from this value and return the node it addresses.
    ///
    /// `Ok(None)` means some step is absent; callers substitute the identity.
    /// A non-map on the way, or a final node of another kind than `expected`,
    /// is a type mismatch.
    pub fn project(&self, path: &Path, expected: Kind) -> Result<Option<&Value>> {
        let mut current = self;
        let mut walked = Path::root();

        for segment in path.segments() {
            let entries = match current {
                Value::Map(entries) => entries,
                other => {
                    return Err(CrdtError::TypeMismatch {
                        path: walked,
                        expected: Kind::Map,
                        found: other.kind(),
                    })
                }
            };
            walked = walked.child(segment.kind, segment.name.clone());
            match entries.get(segment) {
                Some(child) if child.kind() == segment.kind => current = child,
                Some(child) => {
                    return Err(CrdtError::TypeMismatch {
                        path: walked,
                        expected: segment.kind,
                        found: child.kind(),
                    })
                }
                None => return Ok(None),
            }
        }

        if current.kind() != expected {
            return Err(CrdtError::TypeMismatch {
                path: walked,
                expected,
                found: current.kind(),
            });
        }
        Ok(Some(current))
    }

    pub fn as_counter(&self) -> Option<i64> {
        match self {
            Value::Counter(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&BTreeSet<String>> {
        match self {
            Value::Set(members) => Some(members),
            _ => None,
        }
    }

    pub fn as_register(&self) -> Option<&str> {
        match self {
            Value::Register(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Value::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<Segment, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }
}
