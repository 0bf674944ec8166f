//! Batch Context
//!
//! While a batch is open on a root, every write reached through that root is
//! registered here by path instead of being submitted. On close the table is
//! folded into a single operation tree rooted at the empty path.

use crate::error::Result;
use crate::operation::Operation;
use crate::types::Path;
use std::collections::BTreeMap;

/// Lifecycle of the batch slot on one root
#[derive(Debug, Default)]
pub(crate) enum BatchPhase {
    #[default]
    Idle,
    Open(PendingTable),
    /// Body returned; the table has been taken out and is being submitted.
    Composing,
}

impl BatchPhase {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            BatchPhase::Idle => "idle",
            BatchPhase::Open(_) => "open",
            BatchPhase::Composing => "composing",
        }
    }
}

/// Pending operations keyed by the path they were registered at
#[derive(Debug, Clone, Default)]
pub struct PendingTable {
    entries: BTreeMap<Path, Operation>,
}

impl PendingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `op` at `path`, composing it with anything already pending
    /// there. Fails without changing the entry if the kinds disagree.
    pub fn register(&mut self, path: Path, op: Operation) -> Result<()> {
        match self.entries.get_mut(&path) {
            Some(existing) => {
                let mut merged = existing.clone();
                merged.merge(op, &path)?;
                *existing = merged;
            }
            None => {
                self.entries.insert(path, op);
            }
        }
        Ok(())
    }

    /// True if the set operation pending at `path` adds `member`.
    pub fn has_addition(&self, path: &Path, member: &str) -> bool {
        matches!(self.entries.get(path), Some(Operation::Set(op)) if op.adds().contains(member))
    }

    /// Drop a pending addition of `member` at `path`, registering nothing in
    /// its place.
    pub fn withdraw_addition(&mut self, path: &Path, member: &str) -> bool {
        match self.entries.get_mut(path) {
            Some(Operation::Set(op)) => op.withdraw(member),
            _ => false,
        }
    }

    pub fn get(&self, path: &Path) -> Option<&Operation> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fold all entries into one operation addressed at the root.
    ///
    /// Entries at different paths are independent; a map entry removal
    /// suppresses updates beneath it. Returns `None` when everything cancels
    /// out.
    pub fn compose(&self) -> Result<Option<Operation>> {
        let mut composed: Option<Operation> = None;
        for (path, op) in &self.entries {
            let nested = Operation::nest(path, op.clone());
            match composed.as_mut() {
                Some(acc) => acc.merge(nested, &Path::root())?,
                None => composed = Some(nested),
            }
        }
        Ok(composed
            .map(|mut op| {
                op.prune();
                op
            })
            .filter(|op| !op.is_noop()))
    }
}
