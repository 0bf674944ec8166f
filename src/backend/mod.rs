//! Backend Port
//!
//! The only external surface of the handle layer. Implementations own wire
//! encoding, transport, retries and the server-side merge; the core only ever
//! calls them at root locations.

pub mod memory;

pub use memory::{MemoryBackend, Submission};

use crate::error::BackendError;
use crate::operation::Operation;
use crate::types::{Ack, CausalContext, Kind, RootId};
use crate::value::Value;

/// Result of fetching a root datatype
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    /// Full value tree, or `None` if the root was never written.
    pub value: Option<Value>,
    pub context: Option<CausalContext>,
}

/// Backend Port interface
pub trait Backend: Send + Sync {
    fn fetch(&self, root: &RootId, kind: Kind) -> Result<Fetched, BackendError>;

    /// Send exactly one operation tree for the root.
    ///
    /// `context` is the causal context of the snapshot the operation was
    /// derived from, if one was fetched.
    fn submit(
        &self,
        root: &RootId,
        kind: Kind,
        context: Option<&CausalContext>,
        operation: &Operation,
    ) -> Result<Ack, BackendError>;
}
