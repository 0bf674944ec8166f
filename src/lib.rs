//! Convergent: client-side handles over remotely stored CRDTs
//!
//! Counters, sets, registers, flags and maps nested to any depth live on a
//! backend that owns their real state and merge semantics. This crate keeps a
//! lazily fetched snapshot per root, lets callers navigate into nested
//! entries by path, and groups writes from anywhere under one root into a
//! single submission with [`Root::batch`].
//!
//! ```
//! use convergent::{ChildHandle, Client, ClientConfig, MemoryBackend};
//! use std::sync::Arc;
//!
//! # fn main() -> convergent::Result<()> {
//! let client = Client::new(Arc::new(MemoryBackend::new()), ClientConfig::default())?;
//! let profile = client.map("users", "ann");
//! profile.batch(|p| {
//!     p.registers().get("name").set("Ann")?;
//!     p.maps().get("stats").counters().get("logins").increment()
//! })?;
//! assert_eq!(profile.maps().get("stats").counters().get("logins").value()?, 1);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod handles;
pub mod logging;
pub mod operation;
pub mod root;
pub mod types;
pub mod value;

pub use backend::{Backend, Fetched, MemoryBackend};
pub use client::Client;
pub use config::{BucketTypes, ClientConfig, ConfigLoader};
pub use error::{BackendError, CrdtError, Result};
pub use handles::{Accessor, ChildHandle, Counter, Flag, Handle, Map, Register, Set};
pub use operation::{CounterOp, MapOp, Operation, SetOp};
pub use root::Root;
pub use types::{Ack, CausalContext, Kind, Location, Path, RootId, Segment};
pub use value::Value;
