use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use taskdeck_core::{ItemId, ListSnapshot, ListStore};

fn texts(snapshot: &ListSnapshot) -> Vec<&str> {
    snapshot.iter().map(|item| item.text()).collect()
}

#[test]
fn add_appends_open_items_in_order() {
    let mut store = ListStore::new();
    store.add("first");
    store.add("second");
    let snapshot = store.add("third");

    assert_eq!(texts(&snapshot), vec!["first", "second", "third"]);
    assert!(snapshot.iter().all(|item| !item.completed()));
}

#[test]
fn add_rejects_blank_text() {
    let mut store = ListStore::new();
    store.add("keep");

    assert_eq!(store.add("").len(), 1);
    assert_eq!(store.add("   ").len(), 1);
    assert_eq!(store.add("\t\n").len(), 1);
}

#[test]
fn add_stores_trimmed_text() {
    let mut store = ListStore::new();
    let snapshot = store.add("  Buy milk  ");
    assert_eq!(snapshot[0].text(), "Buy milk");
}

#[test]
fn ids_are_unique_across_many_adds() {
    let mut store = ListStore::new();
    for index in 0..500 {
        store.add(&format!("item {index}"));
    }
    let ids: HashSet<ItemId> = store.items().iter().map(|item| item.id()).collect();
    assert_eq!(ids.len(), 500);
}

#[test]
fn toggle_twice_restores_completed_flag() {
    let mut store = ListStore::new();
    let id = store.add("flip me")[0].id();

    assert!(store.toggle(id)[0].completed());
    assert!(!store.toggle(id)[0].completed());
}

#[test]
fn toggle_unknown_id_is_noop() {
    let mut store = ListStore::new();
    store.add("a");
    let before = store.snapshot();
    let after = store.toggle(ItemId::new_random());

    assert_eq!(before.len(), after.len());
    assert!(!after[0].completed());
}

#[test]
fn delete_removes_exactly_one_and_keeps_order() {
    let mut store = ListStore::new();
    store.add("a");
    let b = store.add("b")[1].id();
    store.add("c");

    let snapshot = store.delete(b);
    assert_eq!(texts(&snapshot), vec!["a", "c"]);
    assert!(store.get(b).is_none());
}

#[test]
fn delete_unknown_id_leaves_length() {
    let mut store = ListStore::new();
    store.add("a");
    assert_eq!(store.delete(ItemId::new_random()).len(), 1);
}

#[test]
fn mixed_operations_preserve_relative_order() {
    let mut store = ListStore::new();
    let ids: Vec<ItemId> = ["one", "two", "three", "four", "five"]
        .iter()
        .map(|text| store.add(text).last().expect("item added").id())
        .collect();

    store.toggle(ids[3]);
    store.delete(ids[1]);
    store.toggle(ids[0]);
    store.delete(ids[4]);
    store.add("six");

    assert_eq!(
        texts(&store.snapshot()),
        vec!["one", "three", "four", "six"]
    );
    assert_eq!(store.remaining_count(), 2);
}

#[test]
fn end_to_end_session() {
    let mut store = ListStore::new();

    let snapshot = store.add("Buy milk");
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].text(), "Buy milk");
    assert!(!snapshot[0].completed());
    let first = snapshot[0].id();

    assert!(store.toggle(first)[0].completed());

    let snapshot = store.add("Walk dog");
    assert_eq!(texts(&snapshot), vec!["Buy milk", "Walk dog"]);

    let snapshot = store.delete(first);
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].text(), "Walk dog");
    assert!(!snapshot[0].completed());
}

#[test]
fn subscribers_receive_each_changed_snapshot() {
    let mut store = ListStore::new();
    let seen = Arc::new(Mutex::new(Vec::<usize>::new()));
    let sink = Arc::clone(&seen);
    store.subscribe(move |snapshot| sink.lock().unwrap().push(snapshot.len()));

    let id = store.add("a")[0].id();
    store.add("  ");
    store.toggle(id);
    store.toggle(ItemId::new_random());
    store.delete(id);

    assert_eq!(*seen.lock().unwrap(), vec![1, 1, 0]);
}

#[test]
fn unsubscribe_stops_notifications() {
    let mut store = ListStore::new();
    let count = Arc::new(Mutex::new(0_u32));
    let sink = Arc::clone(&count);
    let subscription = store.subscribe(move |_| *sink.lock().unwrap() += 1);

    store.add("a");
    assert!(store.unsubscribe(subscription));
    assert!(!store.unsubscribe(subscription));
    store.add("b");

    assert_eq!(*count.lock().unwrap(), 1);
}

#[test]
fn published_snapshots_are_immutable() {
    let mut store = ListStore::new();
    let first = store.add("a");
    store.toggle(first[0].id());
    store.add("b");

    assert_eq!(first.len(), 1);
    assert!(!first[0].completed());
}
