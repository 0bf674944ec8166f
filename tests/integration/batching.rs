//! Batch scope behavior across nesting levels

use super::test_utils::{client, client_over};
use convergent::{ChildHandle, CrdtError, Kind, MemoryBackend, Operation, Path};

#[test]
fn test_nested_increment_is_one_submission() {
    let (backend, client) = client();
    let outer = client.map("bucket", "doc");

    outer
        .batch(|m| {
            m.maps()
                .get("a")
                .maps()
                .get("b")
                .counters()
                .get("c")
                .increment()
        })
        .unwrap();

    let submissions = backend.submissions();
    assert_eq!(submissions.len(), 1);

    let path = Path::root()
        .child(Kind::Map, "a")
        .child(Kind::Map, "b")
        .child(Kind::Counter, "c");
    assert_eq!(
        submissions[0].operation.at(&path),
        Some(&Operation::increment(1))
    );
}

#[test]
fn test_inner_map_batch_bubbles_to_root() {
    let (backend, client) = client();
    let outer = client.map("bucket", "doc");
    let inner = outer.maps().get("inner");

    inner
        .batch(|i| {
            i.registers().get("r").set("x")?;
            i.flags().get("f").enable()?;
            outer.counters().get("top").increment()
        })
        .unwrap();

    assert_eq!(backend.submissions().len(), 1);
    assert_eq!(inner.registers().get("r").get().unwrap(), "x");
    assert!(inner.flags().get("f").get().unwrap());
    assert_eq!(outer.counters().get("top").value().unwrap(), 1);
}

#[test]
fn test_second_batch_on_same_root_is_rejected() {
    let (backend, client) = client();
    let map = client.map("bucket", "doc");

    map.batch(|m| {
        m.counters().get("c").increment_by(2)?;
        let before = m.node().root().pending()?;

        let err = m
            .maps()
            .get("child")
            .batch(|c| c.counters().get("other").increment())
            .unwrap_err();
        assert!(matches!(err, CrdtError::BatchMisuse(_)));

        assert_eq!(m.node().root().pending()?, before);
        Ok(())
    })
    .unwrap();

    assert_eq!(backend.submissions().len(), 1);
    assert_eq!(map.counters().get("c").value().unwrap(), 2);
    assert!(!map.counters().contains("other").unwrap());
}

#[test]
fn test_batches_on_different_roots_are_independent() {
    let (backend, client) = client();
    let first = client.map("bucket", "one");
    let second = client.map("bucket", "two");

    first
        .batch(|f| {
            f.counters().get("c").increment()?;
            second.batch(|s| s.counters().get("c").increment_by(5))?;
            f.counters().get("c").increment()
        })
        .unwrap();

    assert_eq!(backend.submissions().len(), 2);
    assert_eq!(first.counters().get("c").value().unwrap(), 2);
    assert_eq!(second.counters().get("c").value().unwrap(), 5);
}

#[test]
fn test_failed_body_submits_nothing() {
    let (backend, client) = client();
    let map = client.map("bucket", "doc");

    let result: convergent::Result<()> = map.batch(|m| {
        m.counters().get("c").increment()?;
        m.registers().get("r").set("partial")?;
        Err(CrdtError::Rejected("caller gave up".into()))
    });

    assert!(result.is_err());
    assert!(backend.submissions().is_empty());
    assert!(!map.node().root().is_batching());
    assert!(map.read().unwrap().is_empty());
}

#[test]
fn test_failed_submission_aborts_batch() {
    let (backend, client) = client();
    let map = client.map("bucket", "doc");
    map.read().unwrap();
    backend.set_available(false);

    let err = map
        .batch(|m| m.counters().get("c").increment())
        .unwrap_err();
    assert!(matches!(err, CrdtError::BackendUnavailable(_)));
    assert!(!map.node().root().is_batching());

    backend.set_available(true);
    assert_eq!(map.counters().get("c").value().unwrap(), 0);
}

#[test]
fn test_reads_inside_batch_see_last_snapshot() {
    let (_backend, client) = client();
    let counter = client.counter("bucket", "hits");
    counter.increment_by(10).unwrap();

    counter
        .batch(|c| {
            assert_eq!(c.value()?, 10);
            c.increment_by(5)?;
            assert_eq!(c.value()?, 10);
            Ok(())
        })
        .unwrap();

    assert_eq!(counter.value().unwrap(), 15);
}

#[test]
fn test_add_then_remove_in_batch_leaves_no_addition() {
    let (backend, client) = client();
    let set = client.set("bucket", "tags");
    set.add("existing").unwrap();
    let before = set.members().unwrap();

    set.batch(|s| {
        s.add("m")?;
        s.remove("m")?;
        assert_eq!(s.node().root().pending()?, None);
        Ok(())
    })
    .unwrap();

    assert_eq!(set.members().unwrap(), before);
    assert_eq!(backend.submissions().len(), 1);
}

#[test]
fn test_add_then_remove_of_observed_member_still_removes() {
    let (backend, client) = client();
    let set = client.set("bucket", "tags");
    set.add("m").unwrap();

    set.batch(|s| {
        s.add("m")?;
        s.remove("m")?;
        match s.node().root().pending()? {
            Some(Operation::Set(op)) => {
                assert!(op.adds().is_empty());
                assert!(op.removes().contains("m"));
            }
            other => panic!("unexpected pending operation {:?}", other),
        }
        Ok(())
    })
    .unwrap();

    assert!(!set.contains("m").unwrap());
    assert_eq!(backend.submissions().len(), 2);
}

#[test]
fn test_add_then_remove_inside_map_submits_nothing() {
    let (backend, client) = client_over(MemoryBackend::new().with_strict_context());
    let map = client.map("bucket", "doc");

    map.batch(|m| {
        m.sets().get("tags").add("draft")?;
        m.sets().get("tags").remove("draft")
    })
    .unwrap();

    assert!(backend.submissions().is_empty());
    assert!(!map.sets().contains("tags").unwrap());
}

#[test]
fn test_cancelled_batch_submits_nothing() {
    let (backend, client) = client();
    let counter = client.counter("bucket", "hits");

    counter
        .batch(|c| {
            c.increment_by(3)?;
            c.decrement_by(3)
        })
        .unwrap();

    assert!(backend.submissions().is_empty());
}

#[test]
fn test_entry_removal_wins_over_update_in_batch() {
    let (_backend, client) = client();
    let map = client.map("bucket", "doc");
    map.counters().get("visits").increment().unwrap();

    map.batch(|m| {
        m.counters().remove("visits")?;
        m.counters().get("visits").increment_by(4)
    })
    .unwrap();
    assert!(!map.counters().contains("visits").unwrap());

    map.counters().get("visits").increment().unwrap();
    map.batch(|m| {
        m.counters().get("visits").increment_by(4)?;
        m.counters().remove("visits")
    })
    .unwrap();
    assert!(!map.counters().contains("visits").unwrap());
}

#[test]
fn test_batch_returns_body_output() {
    let (_backend, client) = client();
    let map = client.map("bucket", "doc");
    let names = map
        .batch(|m| {
            m.sets().get("s").add("a")?;
            Ok(vec!["s".to_string()])
        })
        .unwrap();
    assert_eq!(names, map.sets().names().unwrap());
}
