// ── Reactive record collection ──
//
// Insertion-ordered storage with push-based change notification via
// `watch` channels. Order is whatever the records service returned,
// followed by locally created records in creation order.

use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::watch;

use crate::model::{ClientId, ClientRecord};

/// Shared, immutable view of the collection at one version.
pub type Snapshot = Arc<Vec<Arc<ClientRecord>>>;

/// The roster's local copy of the subscriber records.
///
/// Every mutation bumps a version counter and rebuilds the snapshot that
/// subscribers receive.
pub(crate) struct RecordCollection {
    by_id: watch::Sender<IndexMap<ClientId, Arc<ClientRecord>>>,
    version: watch::Sender<u64>,
    snapshot: watch::Sender<Snapshot>,
}

impl RecordCollection {
    pub(crate) fn new() -> Self {
        let (by_id, _) = watch::channel(IndexMap::new());
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            by_id,
            version,
            snapshot,
        }
    }

    /// Replace the whole collection. Later duplicates of an id overwrite
    /// the earlier record but keep its position.
    pub(crate) fn replace(&self, records: Vec<ClientRecord>) {
        let map: IndexMap<ClientId, Arc<ClientRecord>> = records
            .into_iter()
            .map(|r| (r.id.clone(), Arc::new(r)))
            .collect();
        self.by_id.send_modify(|current| *current = map);
        self.changed();
    }

    /// Append a record, or overwrite in place if the id already exists.
    /// Returns `true` if the id was new.
    pub(crate) fn upsert(&self, record: ClientRecord) -> bool {
        let mut is_new = false;
        self.by_id.send_modify(|map| {
            is_new = map.insert(record.id.clone(), Arc::new(record)).is_none();
        });
        self.changed();
        is_new
    }

    /// Apply `f` to the record with `id`. Returns `false` (and changes
    /// nothing) when no such record exists.
    pub(crate) fn update(&self, id: &ClientId, f: impl FnOnce(&mut ClientRecord)) -> bool {
        let modified = self.by_id.send_if_modified(|map| match map.get_mut(id) {
            Some(slot) => {
                f(Arc::make_mut(slot));
                true
            }
            None => false,
        });
        if modified {
            self.changed();
        }
        modified
    }

    pub(crate) fn get(&self, id: &ClientId) -> Option<Arc<ClientRecord>> {
        self.by_id.borrow().get(id).cloned()
    }

    pub(crate) fn contains(&self, id: &ClientId) -> bool {
        self.by_id.borrow().contains_key(id)
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.subscribe()
    }

    pub(crate) fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.borrow().len()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn changed(&self) {
        let values: Vec<Arc<ClientRecord>> = self.by_id.borrow().values().cloned().collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
        self.version.send_modify(|v| *v += 1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::service::memory::demo_clients;
    use pretty_assertions::assert_eq;

    fn names(col: &RecordCollection) -> Vec<String> {
        col.snapshot().iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn replace_keeps_service_order() {
        let col = RecordCollection::new();
        let mut seed = demo_clients();
        seed.reverse();
        col.replace(seed);
        assert_eq!(names(&col), vec!["Mike Johnson", "Jane Smith", "John Doe"]);
        assert_eq!(col.version(), 1);
    }

    #[test]
    fn upsert_appends_new_ids() {
        let col = RecordCollection::new();
        col.replace(demo_clients());
        let mut extra = demo_clients().swap_remove(0);
        extra.id = ClientId::from(9u64);
        extra.name = "Late Arrival".into();

        assert!(col.upsert(extra));
        assert_eq!(col.len(), 4);
        assert_eq!(names(&col).last().map(String::as_str), Some("Late Arrival"));
    }

    #[test]
    fn update_mutates_one_record_in_place() {
        let col = RecordCollection::new();
        col.replace(demo_clients());
        let before = col.snapshot();

        assert!(col.update(&ClientId::from(1u64), |r| r.connected = false));
        assert!(!col.get(&ClientId::from(1u64)).unwrap().connected);
        // Earlier snapshots are untouched.
        assert!(before[0].connected);
    }

    #[test]
    fn update_of_unknown_id_is_a_no_op() {
        let col = RecordCollection::new();
        col.replace(demo_clients());
        let version = col.version();
        assert!(!col.update(&ClientId::from("404"), |r| r.connected = false));
        assert_eq!(col.version(), version);
    }

    #[test]
    fn subscribers_see_changes() {
        let col = RecordCollection::new();
        let mut rx = col.subscribe();
        col.replace(demo_clients());
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 3);
        assert!(col.contains(&ClientId::from(3u64)));
    }
}
