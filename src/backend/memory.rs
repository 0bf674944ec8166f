//! In-process backend
//!
//! Keeps one value tree per root and applies submitted operations in arrival
//! order. The causal context is a per-root version number that advances on
//! every accepted submission.

use crate::backend::{Backend, Fetched};
use crate::error::BackendError;
use crate::operation::Operation;
use crate::types::{Ack, CausalContext, Kind, RootId};
use crate::value::Value;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Record of one accepted submission
#[derive(Debug, Clone)]
pub struct Submission {
    pub root: RootId,
    pub kind: Kind,
    pub context: Option<CausalContext>,
    pub operation: Operation,
    pub submitted_at: DateTime<Utc>,
}

struct StoredObject {
    value: Value,
    version: u64,
}

#[derive(Default)]
struct MemoryState {
    objects: HashMap<RootId, StoredObject>,
    fetch_calls: usize,
    submissions: Vec<Submission>,
    strict_context: bool,
    offline: bool,
}

/// Backend holding all roots in memory
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

fn encode_version(version: u64) -> CausalContext {
    CausalContext(version.to_be_bytes().to_vec())
}

fn decode_version(context: &CausalContext) -> Option<u64> {
    let bytes: [u8; 8] = context.as_bytes().try_into().ok()?;
    Some(u64::from_be_bytes(bytes))
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject submissions whose context is not the current version.
    pub fn with_strict_context(self) -> Self {
        self.state.lock().strict_context = true;
        self
    }

    /// Simulate a transport outage: every call fails with `Unavailable`.
    pub fn set_available(&self, available: bool) {
        self.state.lock().offline = !available;
    }

    /// Store a value directly, bypassing operations.
    pub fn insert(&self, root: RootId, value: Value) {
        let mut state = self.state.lock();
        let version = state.objects.get(&root).map_or(0, |o| o.version) + 1;
        state.objects.insert(root, StoredObject { value, version });
    }

    pub fn value_of(&self, root: &RootId) -> Option<Value> {
        self.state.lock().objects.get(root).map(|o| o.value.clone())
    }

    pub fn fetch_calls(&self) -> usize {
        self.state.lock().fetch_calls
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.state.lock().submissions.clone()
    }
}

impl Backend for MemoryBackend {
    fn fetch(&self, root: &RootId, _kind: Kind) -> Result<Fetched, BackendError> {
        let mut state = self.state.lock();
        if state.offline {
            return Err(BackendError::Unavailable(format!("fetch {}: offline", root)));
        }
        state.fetch_calls += 1;
        Ok(match state.objects.get(root) {
            Some(object) => Fetched {
                value: Some(object.value.clone()),
                context: Some(encode_version(object.version)),
            },
            None => Fetched {
                value: None,
                context: Some(encode_version(0)),
            },
        })
    }

    fn submit(
        &self,
        root: &RootId,
        kind: Kind,
        context: Option<&CausalContext>,
        operation: &Operation,
    ) -> Result<Ack, BackendError> {
        let mut state = self.state.lock();
        if state.offline {
            return Err(BackendError::Unavailable(format!("submit {}: offline", root)));
        }
        if operation.kind() != kind {
            return Err(BackendError::Rejected(format!(
                "{} operation sent to {} {}",
                operation.kind(),
                kind,
                root
            )));
        }

        let current = state.objects.get(root).map_or(0, |o| o.version);
        if operation.needs_context() && context.is_none() {
            return Err(BackendError::Rejected(format!(
                "removal on {} requires a causal context",
                root
            )));
        }
        if state.strict_context {
            if let Some(ctx) = context {
                if decode_version(ctx) != Some(current) {
                    return Err(BackendError::StaleContext(format!(
                        "{} is at version {}",
                        root, current
                    )));
                }
            }
        }

        let mut value = state
            .objects
            .get(root)
            .map(|o| o.value.clone())
            .unwrap_or_else(|| Value::identity(kind));
        apply(&mut value, operation)?;

        let version = current + 1;
        state
            .objects
            .insert(root.clone(), StoredObject { value, version });
        state.submissions.push(Submission {
            root: root.clone(),
            kind,
            context: context.cloned(),
            operation: operation.clone(),
            submitted_at: Utc::now(),
        });
        Ok(Ack {
            context: Some(encode_version(version)),
        })
    }
}

fn apply(value: &mut Value, operation: &Operation) -> Result<(), BackendError> {
    match (value, operation) {
        (Value::Counter(n), Operation::Counter(op)) => {
            let next = i64::try_from(i128::from(*n) + op.delta).map_err(|_| {
                BackendError::Rejected(format!("counter at {} cannot move by {}", n, op.delta))
            })?;
            *n = next;
        }
        (Value::Set(members), Operation::Set(op)) => {
            members.extend(op.adds().iter().cloned());
            for member in op.removes() {
                members.remove(member);
            }
        }
        (Value::Register(current), Operation::Register(next)) => *current = next.clone(),
        (Value::Flag(current), Operation::Flag(next)) => *current = *next,
        (Value::Map(entries), Operation::Map(op)) => {
            for segment in op.removes() {
                entries.remove(segment);
            }
            for (segment, child) in op.updates() {
                if !entries.contains_key(segment) && !creates_entry(child) {
                    continue;
                }
                let entry = entries
                    .entry(segment.clone())
                    .or_insert_with(|| Value::identity(segment.kind));
                apply(entry, child)?;
            }
        }
        (value, operation) => {
            return Err(BackendError::Rejected(format!(
                "cannot apply {} operation to {} value",
                operation.kind(),
                value.kind()
            )))
        }
    }
    Ok(())
}

/// Whether applying `operation` to an absent entry brings it into existence.
/// Removals from something that was never written leave it absent.
fn creates_entry(operation: &Operation) -> bool {
    match operation {
        Operation::Counter(op) => op.delta != 0,
        Operation::Set(op) => !op.adds().is_empty(),
        Operation::Register(_) | Operation::Flag(_) => true,
        Operation::Map(op) => op.updates().values().any(creates_entry),
    }
}
