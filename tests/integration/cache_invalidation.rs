//! Snapshot caching, invalidation and causal context handling

use super::test_utils::{client, client_over};
use convergent::{ChildHandle, MemoryBackend};

#[test]
fn test_reads_share_one_fetch() {
    let (backend, client) = client();
    let map = client.map("bucket", "doc");

    map.counters().get("a").value().unwrap();
    map.sets().get("b").members().unwrap();
    map.maps().get("c").registers().get("d").get().unwrap();
    map.read().unwrap();

    assert_eq!(backend.fetch_calls(), 1);
}

#[test]
fn test_write_forces_refetch() {
    let (backend, client) = client();
    let counter = client.counter("bucket", "hits");

    counter.value().unwrap();
    assert_eq!(backend.fetch_calls(), 1);

    counter.increment().unwrap();
    counter.value().unwrap();
    assert_eq!(backend.fetch_calls(), 2);
}

#[test]
fn test_nested_write_invalidates_root() {
    let (backend, client) = client();
    let map = client.map("bucket", "doc");
    let deep = map.maps().get("a").maps().get("b");

    map.read().unwrap();
    deep.flags().get("f").enable().unwrap();
    assert!(!map.node().root().is_cached());

    assert!(deep.flags().get("f").get().unwrap());
    assert_eq!(backend.fetch_calls(), 2);
}

#[test]
fn test_batch_close_invalidates_once() {
    let (backend, client) = client();
    let map = client.map("bucket", "doc");

    map.batch(|m| {
        m.counters().get("x").value()?;
        m.counters().get("x").increment()?;
        m.counters().get("x").value()?;
        m.counters().get("y").increment()
    })
    .unwrap();
    assert_eq!(backend.fetch_calls(), 1);

    assert_eq!(map.counters().get("x").value().unwrap(), 1);
    assert_eq!(backend.fetch_calls(), 2);
}

#[test]
fn test_deep_write_carries_root_context() {
    let (backend, client) = client();
    let map = client.map("bucket", "doc");
    map.counters().get("seed").increment().unwrap();

    map.read().unwrap();
    let context = map.node().root().context();
    assert!(context.is_some());

    map.maps()
        .get("a")
        .maps()
        .get("b")
        .sets()
        .get("s")
        .add("x")
        .unwrap();

    let submissions = backend.submissions();
    assert_eq!(submissions.last().unwrap().context, context);
}

#[test]
fn test_explicit_refresh_picks_up_remote_change() {
    let (backend, client) = client();
    let mine = client.counter("bucket", "hits");
    let theirs = client.counter("bucket", "hits");

    assert_eq!(mine.value().unwrap(), 0);
    theirs.increment_by(7).unwrap();

    // separate roots: mine still holds its old snapshot
    assert_eq!(mine.value().unwrap(), 0);
    mine.node().root().refresh().unwrap();
    assert_eq!(mine.value().unwrap(), 7);
    assert_eq!(backend.fetch_calls(), 2);
}

#[test]
fn test_invalidate_drops_snapshot() {
    let (backend, client) = client_over(MemoryBackend::new());
    let set = client.set("bucket", "tags");
    set.members().unwrap();
    set.node().root().invalidate();
    set.members().unwrap();
    assert_eq!(backend.fetch_calls(), 2);
}
