mod collection;

pub use collection::Snapshot;
pub(crate) use collection::RecordCollection;
