//! Root state
//!
//! Every handle reached from one root datatype shares a single [`Root`]: the
//! cached snapshot, the causal context it came with, and the batch slot. A
//! nested handle finds its root by holding a clone of this shared reference
//! and its own path; the root never points back at handles.
//!
//! A root is not meant to be mutated from several threads at once. The lock
//! inside only makes the shared state safe to reach from cloned handles.

use crate::backend::Backend;
use crate::batch::{BatchPhase, PendingTable};
use crate::error::{CrdtError, Result};
use crate::operation::Operation;
use crate::types::{CausalContext, Kind, Path, RootId};
use crate::value::Value;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Last fetched state of the root
struct Snapshot {
    /// `None` when the root has never been written.
    value: Option<Value>,
    context: Option<CausalContext>,
}

#[derive(Default)]
struct RootState {
    snapshot: Option<Snapshot>,
    batch: BatchPhase,
}

struct RootInner {
    id: RootId,
    kind: Kind,
    backend: Arc<dyn Backend>,
    state: Mutex<RootState>,
}

/// Shared reference to one root datatype and its cache, context and batch slot
#[derive(Clone)]
pub struct Root {
    inner: Arc<RootInner>,
}

impl fmt::Debug for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Root")
            .field("id", &self.inner.id)
            .field("kind", &self.inner.kind)
            .finish()
    }
}

/// Returns the batch slot to idle however the batch scope is left,
/// including a panic in the body.
struct BatchGuard<'a> {
    root: &'a Root,
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.root.inner.state.lock();
        if !matches!(state.batch, BatchPhase::Idle) {
            debug!(root = %self.root.inner.id, from = state.batch.name(), "Batch closed");
        }
        state.batch = BatchPhase::Idle;
    }
}

impl Root {
    pub fn new(backend: Arc<dyn Backend>, id: RootId, kind: Kind) -> Self {
        Self {
            inner: Arc::new(RootInner {
                id,
                kind,
                backend,
                state: Mutex::new(RootState::default()),
            }),
        }
    }

    pub fn id(&self) -> &RootId {
        &self.inner.id
    }

    pub fn kind(&self) -> Kind {
        self.inner.kind
    }

    /// True if both refer to the same root state, not merely equal ids.
    pub fn same_root(&self, other: &Root) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Read the node at `path` from the cached snapshot, fetching the root
    /// first if nothing is cached. Absent nodes read as the identity of `kind`.
    pub fn read(&self, path: &Path, kind: Kind) -> Result<Value> {
        let mut state = self.inner.state.lock();
        let snapshot = self.cached_or_fetch(&mut state)?;
        let projected = match &snapshot.value {
            Some(value) => value.project(path, kind)?.cloned(),
            None => None,
        };
        Ok(projected.unwrap_or_else(|| Value::identity(kind)))
    }

    /// Whole root value, fetched if not cached.
    pub fn snapshot(&self) -> Result<Value> {
        self.read(&Path::root(), self.inner.kind)
    }

    /// Causal context of the cached snapshot, if any.
    pub fn context(&self) -> Option<CausalContext> {
        let state = self.inner.state.lock();
        state.snapshot.as_ref().and_then(|s| s.context.clone())
    }

    pub fn is_cached(&self) -> bool {
        self.inner.state.lock().snapshot.is_some()
    }

    /// Re-fetch unconditionally. The old snapshot is kept if the fetch fails.
    pub fn refresh(&self) -> Result<()> {
        let mut state = self.inner.state.lock();
        let snapshot = self.fetch()?;
        state.snapshot = Some(snapshot);
        Ok(())
    }

    /// Drop the cached snapshot and context; the next read fetches.
    pub fn invalidate(&self) {
        let mut state = self.inner.state.lock();
        if state.snapshot.take().is_some() {
            debug!(root = %self.inner.id, "Snapshot invalidated");
        }
    }

    pub fn is_batching(&self) -> bool {
        !matches!(self.inner.state.lock().batch, BatchPhase::Idle)
    }

    /// The operation the open batch would submit right now, if any.
    pub fn pending(&self) -> Result<Option<Operation>> {
        match &self.inner.state.lock().batch {
            BatchPhase::Open(table) => table.compose(),
            _ => Ok(None),
        }
    }

    /// Mutate the node at `path`.
    ///
    /// Inside a batch the operation is composed into the pending table.
    /// Otherwise it is nested to the root, submitted with the root context,
    /// and the cached snapshot is dropped.
    pub fn apply(&self, path: Path, op: Operation) -> Result<()> {
        let mut state = self.inner.state.lock();
        match &mut state.batch {
            BatchPhase::Open(table) => {
                debug!(root = %self.inner.id, path = %path, kind = %op.kind(), "Operation registered in batch");
                return table.register(path, op);
            }
            BatchPhase::Composing => {
                return Err(CrdtError::BatchMisuse(format!(
                    "write to {} on {} while its batch is being submitted",
                    path, self.inner.id
                )));
            }
            BatchPhase::Idle => {}
        }

        let op = Operation::nest(&path, op);
        self.submit(&mut state, op)
    }

    /// Inside an open batch, take back a pending addition of `member` to the
    /// set at `path` if the snapshot the batch reads from does not hold it.
    /// Returns true when the addition was withdrawn; the member is then
    /// absent before and after the batch and no removal needs registering.
    pub(crate) fn withdraw_addition(&self, path: &Path, member: &str) -> Result<bool> {
        let mut state = self.inner.state.lock();
        let pending = match &state.batch {
            BatchPhase::Open(table) => table.has_addition(path, member),
            _ => false,
        };
        if !pending {
            return Ok(false);
        }

        let snapshot = self.cached_or_fetch(&mut state)?;
        let observed = match &snapshot.value {
            Some(value) => value
                .project(path, Kind::Set)?
                .and_then(Value::as_set)
                .is_some_and(|members| members.contains(member)),
            None => false,
        };
        if observed {
            return Ok(false);
        }

        match &mut state.batch {
            BatchPhase::Open(table) => {
                debug!(root = %self.inner.id, path = %path, "Pending addition withdrawn");
                Ok(table.withdraw_addition(path, member))
            }
            _ => Ok(false),
        }
    }

    /// Run `body` with writes on this root accumulated, then submit them as
    /// one operation.
    ///
    /// Nothing is submitted if `body` fails or panics, or if the accumulated
    /// operations cancel out. Opening a batch while one is already open on
    /// this root fails with [`CrdtError::BatchMisuse`] and leaves the open
    /// batch as it was.
    pub fn batch<T, F>(&self, body: F) -> Result<T>
    where
        F: FnOnce(&Root) -> Result<T>,
    {
        {
            let mut state = self.inner.state.lock();
            if !matches!(state.batch, BatchPhase::Idle) {
                return Err(CrdtError::BatchMisuse(format!(
                    "a batch is already {} on {}",
                    state.batch.name(),
                    self.inner.id
                )));
            }
            state.batch = BatchPhase::Open(PendingTable::new());
            debug!(root = %self.inner.id, "Batch opened");
        }
        let _guard = BatchGuard { root: self };

        let output = match body(self) {
            Ok(output) => output,
            Err(e) => {
                warn!(root = %self.inner.id, error = %e, "Batch body failed, discarding pending operations");
                return Err(e);
            }
        };

        let mut state = self.inner.state.lock();
        let table = match std::mem::replace(&mut state.batch, BatchPhase::Composing) {
            BatchPhase::Open(table) => table,
            other => {
                return Err(CrdtError::BatchMisuse(format!(
                    "batch on {} was {} when its body returned",
                    self.inner.id,
                    other.name()
                )))
            }
        };

        match table.compose()? {
            Some(op) => {
                debug!(root = %self.inner.id, entries = table.len(), "Submitting batch");
                self.submit(&mut state, op)?;
            }
            None => debug!(root = %self.inner.id, "Batch composed to nothing, skipping submission"),
        }
        Ok(output)
    }

    fn cached_or_fetch<'s>(&self, state: &'s mut RootState) -> Result<&'s Snapshot> {
        let snapshot = match state.snapshot.take() {
            Some(snapshot) => snapshot,
            None => self.fetch()?,
        };
        Ok(state.snapshot.insert(snapshot))
    }

    fn fetch(&self) -> Result<Snapshot> {
        let fetched = self
            .inner
            .backend
            .fetch(&self.inner.id, self.inner.kind)
            .map_err(|e| {
                warn!(root = %self.inner.id, error = %e, "Fetch failed");
                CrdtError::from(e)
            })?;
        debug!(
            root = %self.inner.id,
            written = fetched.value.is_some(),
            "Fetched root"
        );
        Ok(Snapshot {
            value: fetched.value,
            context: fetched.context,
        })
    }

    /// Submit a root-addressed operation. The cache is dropped whatever the
    /// outcome, so the next read sees the backend's state.
    fn submit(&self, state: &mut RootState, op: Operation) -> Result<()> {
        if op.needs_context() && state.snapshot.is_none() {
            state.snapshot = Some(self.fetch()?);
        }
        let context = state.snapshot.take().and_then(|s| s.context);

        let result = self
            .inner
            .backend
            .submit(&self.inner.id, self.inner.kind, context.as_ref(), &op);
        match result {
            Ok(_ack) => {
                info!(root = %self.inner.id, kind = %op.kind(), "Operation submitted");
                Ok(())
            }
            Err(e) => {
                warn!(root = %self.inner.id, error = %e, "Submission failed");
                Err(e.into())
            }
        }
    }
}
