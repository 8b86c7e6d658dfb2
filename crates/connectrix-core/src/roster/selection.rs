// ── Multi-select state ──

use indexmap::IndexSet;

use crate::model::{ClientId, ClientRecord};

/// Ids currently checked on the roster, in the order they were checked.
///
/// Equality compares membership, not check order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: IndexSet<ClientId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `id` if it is unchecked, uncheck it otherwise. Returns whether
    /// `id` is selected afterwards.
    pub fn toggle(&mut self, id: ClientId) -> bool {
        if self.ids.shift_remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// "Select all" checkbox. When the selection already equals the view's
    /// ids it is cleared; otherwise it becomes exactly the view's ids, so
    /// rows the view hides are never left selected.
    pub fn select_all<'a, I>(&mut self, view: I)
    where
        I: IntoIterator<Item = &'a ClientRecord>,
    {
        let visible: IndexSet<ClientId> = view.into_iter().map(|r| r.id.clone()).collect();
        if self.ids == visible {
            self.ids.clear();
        } else {
            self.ids = visible;
        }
    }

    pub fn contains(&self, id: &ClientId) -> bool {
        self.ids.contains(id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Keep only ids for which `keep` holds.
    pub fn retain(&mut self, mut keep: impl FnMut(&ClientId) -> bool) {
        self.ids.retain(|id| keep(id));
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClientId> {
        self.ids.iter()
    }

    pub fn to_vec(&self) -> Vec<ClientId> {
        self.ids.iter().cloned().collect()
    }
}

impl FromIterator<ClientId> for SelectionSet {
    fn from_iter<T: IntoIterator<Item = ClientId>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::memory::demo_clients;
    use pretty_assertions::assert_eq;

    fn id(n: u64) -> ClientId {
        ClientId::from(n)
    }

    #[test]
    fn toggle_is_symmetric_difference() {
        let mut sel = SelectionSet::new();
        assert!(sel.toggle(id(1)));
        assert!(sel.toggle(id(2)));
        assert!(!sel.toggle(id(1)));
        assert_eq!(sel.to_vec(), vec![id(2)]);
    }

    #[test]
    fn select_all_twice_clears_the_view() {
        let records = demo_clients();
        let view: Vec<&ClientRecord> = records.iter().take(2).collect();

        for start in [
            SelectionSet::new(),
            SelectionSet::from_iter([id(2)]),
            SelectionSet::from_iter([id(2), id(1)]),
        ] {
            let mut sel = start.clone();
            sel.select_all(view.iter().copied());
            sel.select_all(view.iter().copied());
            // Nothing from the view survives a second press.
            assert!(view.iter().all(|r| !sel.contains(&r.id)));
        }
    }

    #[test]
    fn select_all_drops_rows_outside_the_view() {
        let records = demo_clients();
        let mut sel = SelectionSet::from_iter([id(3)]);
        sel.select_all(&records[..2]);
        assert_eq!(sel.to_vec(), vec![id(1), id(2)]);
        sel.select_all(&records[..2]);
        assert!(sel.is_empty());
    }

    #[test]
    fn select_all_selects_view_then_clears() {
        let records = demo_clients();
        let mut sel = SelectionSet::new();
        sel.select_all(&records);
        assert_eq!(sel.to_vec(), vec![id(1), id(2), id(3)]);
        sel.select_all(&records);
        assert!(sel.is_empty());
    }

    #[test]
    fn select_all_compares_as_sets() {
        let records = demo_clients();
        let mut sel = SelectionSet::from_iter([id(3), id(2), id(1)]);
        sel.select_all(&records);
        assert!(sel.is_empty());
    }

    #[test]
    fn toggle_after_select_all_breaks_the_match() {
        let records = demo_clients();
        let mut sel = SelectionSet::new();
        sel.select_all(&records[..2]);
        sel.toggle(id(1));
        sel.select_all(&records[..2]);
        assert_eq!(sel.to_vec(), vec![id(1), id(2)]);
    }

    #[test]
    fn check_order_is_preserved() {
        let sel = SelectionSet::from_iter([id(3), id(1), id(2)]);
        let order: Vec<&str> = sel.iter().map(ClientId::as_str).collect();
        assert_eq!(order, vec!["3", "1", "2"]);
    }
}
