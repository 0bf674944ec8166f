//! Integration tests for the CRDT handle layer

mod batching;
mod cache_invalidation;
mod nested_maps;
mod test_utils;
