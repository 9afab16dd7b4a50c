//! Ordered item store with snapshot subscriptions.
//!
//! # Responsibility
//! - Apply add/toggle/delete to the insertion-ordered item sequence.
//! - Notify subscribers with a fresh immutable snapshot after each change.
//!
//! # Invariants
//! - No two items share an `ItemId`.
//! - Order is insertion order; toggle never reorders or rebuilds siblings.
//! - Delete removes at most one item and keeps the rest in order.
//! - A call that changes nothing publishes nothing.

use crate::model::item::{validate_item_text, Item, ItemId};
use log::debug;
use std::sync::Arc;

/// Immutable view of the sequence at one point in time.
///
/// Untouched items keep the same `Arc` across snapshots, so callers can
/// detect what changed with `Arc::ptr_eq`.
pub type ListSnapshot = Arc<[Arc<Item>]>;

/// Snapshot listener callback.
pub type SnapshotListener = Box<dyn FnMut(&ListSnapshot) + Send>;

const MAX_SOURCE_ATTEMPTS: usize = 16;

/// Handle returned by [`ListStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Supplier of candidate item ids.
pub trait ItemIdSource: Send {
    fn next_id(&mut self) -> ItemId;
}

/// Default id source backed by random UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdSource;

impl ItemIdSource for RandomIdSource {
    fn next_id(&mut self) -> ItemId {
        ItemId::new_random()
    }
}

/// Session-scoped list of items.
pub struct ListStore {
    items: ListSnapshot,
    id_source: Box<dyn ItemIdSource>,
    listeners: Vec<(SubscriptionId, SnapshotListener)>,
    next_subscription: u64,
}

impl Default for ListStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ListStore {
    /// Creates an empty store using random ids.
    pub fn new() -> Self {
        Self::with_id_source(RandomIdSource)
    }

    /// Creates an empty store using the given id source.
    pub fn with_id_source(id_source: impl ItemIdSource + 'static) -> Self {
        Self {
            items: Arc::from(Vec::new()),
            id_source: Box::new(id_source),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Appends a new open item.
    ///
    /// Blank input (empty after trimming) is silently ignored. Stored text is
    /// the trimmed input.
    pub fn add(&mut self, raw_text: &str) -> ListSnapshot {
        if !validate_item_text(Some(raw_text)) {
            debug!("event=item_add module=store status=skipped reason=blank_text");
            return self.snapshot();
        }

        let id = self.fresh_id();
        let item = match Item::new(id, raw_text) {
            Ok(item) => item,
            Err(err) => {
                // Text was validated above and `fresh_id` never yields nil.
                debug!("event=item_add module=store status=skipped reason={err}");
                return self.snapshot();
            }
        };

        let mut next = Vec::with_capacity(self.items.len() + 1);
        next.extend(self.items.iter().cloned());
        next.push(Arc::new(item));
        debug!("event=item_add module=store status=ok id={id}");
        self.publish(next)
    }

    /// Inverts `completed` on the item with `id`; unknown ids are ignored.
    pub fn toggle(&mut self, id: ItemId) -> ListSnapshot {
        let Some(index) = self.position(id) else {
            debug!("event=item_toggle module=store status=skipped reason=not_found id={id}");
            return self.snapshot();
        };

        let mut next: Vec<Arc<Item>> = self.items.iter().cloned().collect();
        next[index] = Arc::new(next[index].toggled());
        debug!(
            "event=item_toggle module=store status=ok id={id} completed={}",
            next[index].completed()
        );
        self.publish(next)
    }

    /// Removes the item with `id`; unknown ids are ignored.
    pub fn delete(&mut self, id: ItemId) -> ListSnapshot {
        let Some(index) = self.position(id) else {
            debug!("event=item_delete module=store status=skipped reason=not_found id={id}");
            return self.snapshot();
        };

        let next: Vec<Arc<Item>> = self
            .items
            .iter()
            .enumerate()
            .filter(|(position, _)| *position != index)
            .map(|(_, item)| Arc::clone(item))
            .collect();
        debug!("event=item_delete module=store status=ok id={id}");
        self.publish(next)
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> ListSnapshot {
        Arc::clone(&self.items)
    }

    pub fn items(&self) -> &[Arc<Item>] {
        &self.items
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items
            .iter()
            .find(|item| item.id() == id)
            .map(|item| item.as_ref())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items not yet completed.
    pub fn remaining_count(&self) -> usize {
        self.items.iter().filter(|item| !item.completed()).count()
    }

    /// Registers a listener called with every new snapshot.
    ///
    /// The listener is not called for the current state.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&ListSnapshot) + Send + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// Draws a non-nil id not used by any current item.
    ///
    /// After `MAX_SOURCE_ATTEMPTS` unusable ids from the configured source,
    /// falls back to random ids so `add` always terminates.
    fn fresh_id(&mut self) -> ItemId {
        for _ in 0..MAX_SOURCE_ATTEMPTS {
            let candidate = self.id_source.next_id();
            if self.is_usable_id(candidate) {
                return candidate;
            }
            debug!("event=item_id_rejected module=store status=retry id={candidate}");
        }

        debug!("event=item_id_fallback module=store status=ok source=random");
        loop {
            let candidate = ItemId::new_random();
            if self.is_usable_id(candidate) {
                return candidate;
            }
        }
    }

    fn is_usable_id(&self, id: ItemId) -> bool {
        !id.is_nil() && self.position(id).is_none()
    }

    fn publish(&mut self, next: Vec<Arc<Item>>) -> ListSnapshot {
        self.items = Arc::from(next);
        let snapshot = self.snapshot();
        for (_, listener) in self.listeners.iter_mut() {
            listener(&snapshot);
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::{ItemIdSource, ListStore};
    use crate::model::item::ItemId;
    use std::sync::Arc;
    use uuid::Uuid;

    /// Yields the scripted ids in order, repeating the last one.
    struct ScriptedIds(Vec<u128>);

    impl ItemIdSource for ScriptedIds {
        fn next_id(&mut self) -> ItemId {
            let value = if self.0.len() > 1 {
                self.0.remove(0)
            } else {
                self.0[0]
            };
            ItemId::from_uuid(Uuid::from_u128(value))
        }
    }

    #[test]
    fn duplicate_ids_from_source_are_redrawn() {
        let mut store = ListStore::with_id_source(ScriptedIds(vec![1, 1, 1, 2]));
        store.add("first");
        let snapshot = store.add("second");
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].id(), ItemId::from_uuid(Uuid::from_u128(1)));
        assert_eq!(snapshot[1].id(), ItemId::from_uuid(Uuid::from_u128(2)));
    }

    /// Always yields the same id.
    struct ConstantIds(u128);

    impl ItemIdSource for ConstantIds {
        fn next_id(&mut self) -> ItemId {
            ItemId::from_uuid(Uuid::from_u128(self.0))
        }
    }

    #[test]
    fn constant_source_falls_back_to_random_ids() {
        let mut store = ListStore::with_id_source(ConstantIds(7));
        store.add("a");
        let snapshot = store.add("b");

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].id(), ItemId::from_uuid(Uuid::from_u128(7)));
        assert_ne!(snapshot[1].id(), snapshot[0].id());
        assert!(!snapshot[1].id().is_nil());
    }

    #[test]
    fn nil_ids_from_source_are_redrawn() {
        let mut store = ListStore::with_id_source(ScriptedIds(vec![0, 0, 3]));
        let snapshot = store.add("Buy milk");
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id(), ItemId::from_uuid(Uuid::from_u128(3)));
        assert_eq!(snapshot[0].text(), "Buy milk");
    }

    #[test]
    fn always_nil_source_still_adds_items() {
        let mut store = ListStore::with_id_source(ConstantIds(0));
        store.add("Buy milk");
        let snapshot = store.add("Walk dog");

        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.iter().all(|item| !item.id().is_nil()));
        assert_ne!(snapshot[0].id(), snapshot[1].id());
    }

    #[test]
    fn toggle_reuses_sibling_allocations() {
        let mut store = ListStore::new();
        store.add("a");
        store.add("b");
        let before = store.add("c");
        let after = store.toggle(before[1].id());

        assert!(Arc::ptr_eq(&before[0], &after[0]));
        assert!(!Arc::ptr_eq(&before[1], &after[1]));
        assert!(Arc::ptr_eq(&before[2], &after[2]));
    }

    #[test]
    fn no_op_returns_same_snapshot() {
        let mut store = ListStore::new();
        let before = store.add("only");
        let after = store.add("   ");
        assert!(Arc::ptr_eq(&before, &after));
    }
}
