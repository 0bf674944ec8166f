//! Client
//!
//! Entry point that turns `(bucket, key)` pairs into root handles, filling in
//! the bucket type configured for each datatype unless the caller overrides it.

use crate::backend::Backend;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::handles::{Counter, Map, Set};
use crate::root::Root;
use crate::types::{Kind, RootId};
use std::sync::Arc;

pub struct Client {
    backend: Arc<dyn Backend>,
    config: ClientConfig,
}

impl Client {
    /// Create a client over `backend`. The configuration is validated here
    /// so a bad bucket type fails before any handle is created.
    pub fn new(backend: Arc<dyn Backend>, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { backend, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Fresh root state for the given identity. Each call starts with an
    /// empty cache and no batch.
    pub fn root(&self, id: RootId, kind: Kind) -> Root {
        Root::new(self.backend.clone(), id, kind)
    }

    pub fn counter(&self, bucket: &str, key: &str) -> Counter {
        let bucket_type = self.config.bucket_types.counters.clone();
        self.counter_with_type(bucket, key, &bucket_type)
    }

    pub fn counter_with_type(&self, bucket: &str, key: &str, bucket_type: &str) -> Counter {
        Counter::new(self.root(RootId::new(bucket, key, bucket_type), Kind::Counter))
    }

    pub fn set(&self, bucket: &str, key: &str) -> Set {
        let bucket_type = self.config.bucket_types.sets.clone();
        self.set_with_type(bucket, key, &bucket_type)
    }

    pub fn set_with_type(&self, bucket: &str, key: &str, bucket_type: &str) -> Set {
        Set::new(self.root(RootId::new(bucket, key, bucket_type), Kind::Set))
    }

    pub fn map(&self, bucket: &str, key: &str) -> Map {
        let bucket_type = self.config.bucket_types.maps.clone();
        self.map_with_type(bucket, key, &bucket_type)
    }

    pub fn map_with_type(&self, bucket: &str, key: &str, bucket_type: &str) -> Map {
        Map::new(self.root(RootId::new(bucket, key, bucket_type), Kind::Map))
    }
}
