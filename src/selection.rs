//! The selected values.
//!
//! The selection is owned by whoever embeds the widget. The widget never edits it in place:
//! it computes the next full list ([`SelectionList::toggled`], [`SelectionList::removed_at`])
//! and hands it to the owner as an [`Event::Change`](crate::tui::Event::Change), then waits for
//! the owner to supply it back.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::item::{AutofillItem, ItemId};

/// Ordered set of selected items, unique by id, in selection order
#[derive(Clone, Debug, Default)]
pub struct SelectionList(IndexMap<ItemId, Arc<dyn AutofillItem>>);

impl SelectionList {
    /// An empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of selected items
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing is selected
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Item at `index` in selection order
    pub fn get(&self, index: usize) -> Option<&Arc<dyn AutofillItem>> {
        self.0.get_index(index).map(|(_, item)| item)
    }

    /// Whether an item with this id is selected
    pub fn contains(&self, id: ItemId) -> bool {
        self.0.contains_key(&id)
    }

    /// Position of the item with this id
    pub fn index_of(&self, id: ItemId) -> Option<usize> {
        self.0.get_index_of(&id)
    }

    /// Selected items in selection order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn AutofillItem>> {
        self.0.values()
    }

    /// Selected ids in selection order
    pub fn ids(&self) -> Vec<ItemId> {
        self.0.keys().copied().collect()
    }

    /// The next selection after toggling `item`: removed if present, appended otherwise
    #[must_use]
    pub fn toggled(&self, item: &Arc<dyn AutofillItem>) -> Self {
        let mut next = self.clone();
        let id = item.id();
        if next.0.shift_remove(&id).is_none() {
            next.0.insert(id, item.clone());
        }
        trace!("toggled {id}: {:?} -> {:?}", self.ids(), next.ids());
        next
    }

    /// The next selection without the element at `index`, `None` when out of range
    #[must_use]
    pub fn removed_at(&self, index: usize) -> Option<Self> {
        if index >= self.len() {
            return None;
        }
        let mut next = self.clone();
        next.0.shift_remove_index(index);
        Some(next)
    }

    /// The next selection without the item with this id, `None` when it is not selected
    #[must_use]
    pub fn without(&self, id: ItemId) -> Option<Self> {
        self.index_of(id).and_then(|index| self.removed_at(index))
    }
}

impl FromIterator<Arc<dyn AutofillItem>> for SelectionList {
    /// Keeps the first occurrence of every id
    fn from_iter<T: IntoIterator<Item = Arc<dyn AutofillItem>>>(iter: T) -> Self {
        let mut map = IndexMap::new();
        for item in iter {
            map.entry(item.id()).or_insert(item);
        }
        Self(map)
    }
}

impl PartialEq for SelectionList {
    fn eq(&self, other: &Self) -> bool {
        self.0.keys().eq(other.0.keys())
    }
}

impl Eq for SelectionList {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::DefaultItem;

    fn item(id: ItemId) -> Arc<dyn AutofillItem> {
        Arc::new(DefaultItem::new(id, format!("item {id}")))
    }

    #[test]
    fn toggle_appends_then_removes() {
        let empty = SelectionList::new();
        let one = empty.toggled(&item(1));
        let two = one.toggled(&item(2));
        assert_eq!(two.ids(), vec![1, 2]);
        assert_eq!(two.toggled(&item(1)).ids(), vec![2]);
        // the source list is untouched
        assert_eq!(one.ids(), vec![1]);
    }

    #[test]
    fn toggle_sequences_never_duplicate() {
        let sequence = [3, 1, 3, 2, 1, 3, 4, 2, 2, 5, 1];
        let mut current = SelectionList::new();
        // mirror of the expected result, maintained by hand
        let mut expected: Vec<ItemId> = Vec::new();
        for id in sequence {
            current = current.toggled(&item(id));
            if let Some(pos) = expected.iter().position(|&e| e == id) {
                expected.remove(pos);
            } else {
                expected.push(id);
            }
            let mut ids = current.ids();
            assert_eq!(ids, expected);
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), current.len());
        }
    }

    #[test]
    fn repeated_toggle_without_resupply_is_not_idempotent() {
        let current = SelectionList::new();
        // both intents observe the same stale state, so they agree
        let a = current.toggled(&item(7));
        let b = current.toggled(&item(7));
        assert_eq!(a, b);
        assert!(a.contains(7));
        // observing the updated state flips it back
        assert!(!a.toggled(&item(7)).contains(7));
    }

    #[test]
    fn removed_at_out_of_range_is_noop() {
        let list: SelectionList = [item(1), item(2)].into_iter().collect();
        assert!(list.removed_at(2).is_none());
        assert_eq!(list.removed_at(0).map(|l| l.ids()), Some(vec![2]));
    }

    #[test]
    fn without_by_id() {
        let list: SelectionList = [item(1), item(2), item(3)].into_iter().collect();
        assert_eq!(list.without(2).map(|l| l.ids()), Some(vec![1, 3]));
        assert!(list.without(9).is_none());
    }

    #[test]
    fn from_iter_keeps_first_occurrence() {
        let first = item(1);
        let list: SelectionList = [first.clone(), item(2), item(1)].into_iter().collect();
        assert_eq!(list.ids(), vec![1, 2]);
        assert!(Arc::ptr_eq(list.get(0).unwrap(), &first));
    }
}
