//! In-memory item collection.
//!
//! The store is a cheap-to-clone handle around a `watch` channel: clones share
//! the same collection, and `subscribe()` hands observers a receiver that is
//! marked changed after every applied mutation.

use crate::models::Item;
use std::sync::Arc;
use tokio::sync::watch;

/// Authoritative local copy of the todo list.
#[derive(Clone)]
pub struct ItemStore {
    items: Arc<watch::Sender<Vec<Item>>>,
}

impl Default for ItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemStore {
    pub fn new() -> Self {
        Self::with_items(Vec::new())
    }

    pub fn with_items(items: Vec<Item>) -> Self {
        let (sender, _) = watch::channel(items);
        Self {
            items: Arc::new(sender),
        }
    }

    /// Snapshot of the current collection.
    pub fn list(&self) -> Vec<Item> {
        self.items.borrow().clone()
    }

    pub fn get(&self, id: &str) -> Option<Item> {
        self.items.borrow().iter().find(|item| item.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Number of items not yet completed.
    pub fn remaining_count(&self) -> usize {
        self.items
            .borrow()
            .iter()
            .filter(|item| !item.completed)
            .count()
    }

    /// Receiver notified after each mutation.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Item>> {
        self.items.subscribe()
    }

    /// Discard the collection and install `items` as-is.
    pub fn replace_all(&self, items: Vec<Item>) {
        self.items.send_replace(items);
    }

    /// Apply `updater` to the item with `id`. Returns false (and notifies
    /// nobody) when no such item exists.
    pub fn patch_one<F>(&self, id: &str, updater: F) -> bool
    where
        F: FnOnce(&mut Item),
    {
        self.items.send_if_modified(|items| {
            match items.iter_mut().find(|item| item.id == id) {
                Some(item) => {
                    updater(item);
                    true
                }
                None => false,
            }
        })
    }

    /// Remove the item with `id`. Returns false when it was not present.
    pub fn remove_one(&self, id: &str) -> bool {
        self.items.send_if_modified(|items| {
            let before = items.len();
            items.retain(|item| item.id != id);
            items.len() != before
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, completed: bool) -> Item {
        Item {
            id: id.to_string(),
            title: format!("todo {}", id),
            completed,
        }
    }

    fn three_items() -> Vec<Item> {
        vec![item("a", false), item("b", true), item("c", false)]
    }

    #[test]
    fn test_remaining_count_ignores_completed() {
        let store = ItemStore::with_items(three_items());
        assert_eq!(store.remaining_count(), 2);
    }

    #[test]
    fn test_replace_all_installs_verbatim() {
        let store = ItemStore::with_items(three_items());
        store.replace_all(vec![item("z", true)]);
        assert_eq!(store.list(), vec![item("z", true)]);
        assert_eq!(store.remaining_count(), 0);
    }

    #[test]
    fn test_patch_one_touches_only_target() {
        let store = ItemStore::with_items(three_items());
        assert!(store.patch_one("a", |item| item.completed = !item.completed));

        let items = store.list();
        assert!(items[0].completed);
        assert!(items[1].completed);
        assert!(!items[2].completed);
    }

    #[test]
    fn test_patch_missing_id_is_noop() {
        let store = ItemStore::with_items(three_items());
        assert!(!store.patch_one("missing", |item| item.completed = true));
        assert_eq!(store.list(), three_items());
    }

    #[test]
    fn test_remove_one() {
        let store = ItemStore::with_items(three_items());
        assert!(store.remove_one("b"));
        assert_eq!(store.len(), 2);
        assert!(store.get("b").is_none());
        assert!(!store.remove_one("b"));
    }

    #[test]
    fn test_clones_share_collection() {
        let store = ItemStore::new();
        let other = store.clone();
        store.replace_all(three_items());
        assert_eq!(other.len(), 3);
        assert!(!other.is_empty());
    }

    #[test]
    fn test_observers_see_mutations_but_not_noops() {
        let store = ItemStore::with_items(three_items());
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        store.remove_one("missing");
        assert!(!rx.has_changed().unwrap());

        store.remove_one("a");
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 2);

        store.replace_all(Vec::new());
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_empty());
    }
}
