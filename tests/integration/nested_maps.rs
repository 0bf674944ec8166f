//! Navigation and mutation through nested maps

use super::test_utils::client;
use convergent::{ChildHandle, Handle, Kind, Segment, Value};

#[test]
fn test_straightforward_map_ops_bubble_up() {
    let (backend, client) = client();
    let map = client.map("bucket", "doc");

    map.maps().get("first").registers().get("second").set("good evening").unwrap();
    map.maps()
        .get("first")
        .maps()
        .get("third")
        .counters()
        .get("fourth")
        .increment()
        .unwrap();

    for submission in backend.submissions() {
        assert_eq!(submission.kind, Kind::Map);
        assert_eq!(submission.root.key, "doc");
    }

    let stored = backend.value_of(&map.location().root).unwrap();
    let entries = stored.as_map().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries.contains_key(&Segment::new(Kind::Map, "first")));
}

#[test]
fn test_register_and_flag_inside_map() {
    let (_backend, client) = client();
    let map = client.map("bucket", "doc");

    map.registers().get("title").set("draft").unwrap();
    map.registers().get("title").set("final").unwrap();
    map.flags().get("published").enable().unwrap();
    map.flags().get("published").disable().unwrap();

    assert_eq!(map.registers().get("title").get().unwrap(), "final");
    assert!(!map.flags().get("published").get().unwrap());
    assert!(map.flags().contains("published").unwrap());
}

#[test]
fn test_entries_are_tagged_handles() {
    let (_backend, client) = client();
    let map = client.map("bucket", "doc");
    map.sets().get("tags").add("x").unwrap();
    map.maps().get("child").counters().get("n").increment().unwrap();

    let entries = map.entries().unwrap();
    assert_eq!(entries.len(), 2);
    for entry in entries {
        match entry {
            Handle::Set(set) => assert!(set.contains("x").unwrap()),
            Handle::Map(child) => assert_eq!(child.counters().get("n").value().unwrap(), 1),
            other => panic!("unexpected entry {:?}", other.kind()),
        }
    }
}

#[test]
fn test_same_name_different_kinds_are_separate_entries() {
    let (_backend, client) = client();
    let map = client.map("bucket", "doc");

    map.counters().get("x").increment_by(3).unwrap();
    map.registers().get("x").set("three").unwrap();

    assert_eq!(map.counters().get("x").value().unwrap(), 3);
    assert_eq!(map.registers().get("x").get().unwrap(), "three");
    assert_eq!(map.read().unwrap().len(), 2);
}

#[test]
fn test_removing_nested_map_drops_its_children() {
    let (backend, client) = client();
    let map = client.map("bucket", "doc");
    map.maps().get("a").counters().get("c").increment().unwrap();
    map.maps().get("keep").flags().get("f").enable().unwrap();

    map.maps().remove("a").unwrap();

    assert_eq!(map.maps().names().unwrap(), vec!["keep".to_string()]);
    assert_eq!(map.maps().get("a").counters().get("c").value().unwrap(), 0);
    let stored = backend.value_of(&map.location().root).unwrap();
    assert_eq!(
        stored
            .as_map()
            .unwrap()
            .get(&Segment::new(Kind::Map, "keep"))
            .and_then(Value::as_map)
            .map(|m| m.len()),
        Some(1)
    );
}

#[test]
fn test_removals_under_unwritten_entries_create_nothing() {
    let (backend, client) = client();
    let map = client.map("bucket", "doc");

    map.maps().get("a").counters().remove("x").unwrap();
    map.sets().get("s").remove("ghost").unwrap();

    assert_eq!(backend.submissions().len(), 2);
    assert!(!map.maps().contains("a").unwrap());
    assert!(!map.sets().contains("s").unwrap());
    assert!(map.read().unwrap().is_empty());

    // a removal alongside a real write still lands the write
    map.maps()
        .get("a")
        .batch(|a| {
            a.counters().remove("x")?;
            a.registers().get("r").set("kept")
        })
        .unwrap();
    assert_eq!(map.maps().names().unwrap(), vec!["a".to_string()]);
    assert!(!map.maps().get("a").counters().contains("x").unwrap());
}
