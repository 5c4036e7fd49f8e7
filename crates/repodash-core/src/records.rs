use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::RepoRecord;

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Shared handle to one repository record.
///
/// Each record is heap-allocated individually so a handle stays valid no
/// matter how the owning collection grows. All mutation replaces whole
/// field groups under the record's lock; readers clone the record in one
/// critical section and never observe a partial update.
#[derive(Debug, Clone)]
pub struct RecordHandle {
    cell: Arc<RwLock<RepoRecord>>,
}

impl RecordHandle {
    pub fn new(record: RepoRecord) -> Self {
        Self {
            cell: Arc::new(RwLock::new(record)),
        }
    }

    /// Consistent copy of the record as of one instant.
    pub fn snapshot(&self) -> RepoRecord {
        read(&self.cell).clone()
    }

    pub fn path(&self) -> std::path::PathBuf {
        read(&self.cell).path.clone()
    }

    pub fn is_out_of_sync(&self) -> bool {
        read(&self.cell).is_out_of_sync()
    }

    /// Overwrite the last-action status message. The message must be a
    /// single line; callers flatten captured output before writing.
    pub fn set_status_message(&self, message: String) {
        write(&self.cell).status_message = Some(message);
    }

    /// Replace every evaluated field as one unit. The record's path is the
    /// identity and must match; the status message is owned by the action
    /// workers and survives re-evaluation.
    pub fn apply_evaluation(&self, evaluated: RepoRecord) {
        let mut guard = write(&self.cell);
        debug_assert_eq!(guard.path, evaluated.path);
        let status_message = guard.status_message.take();
        *guard = evaluated;
        guard.status_message = status_message;
    }
}

/// Ordered, index-stable collection of repository records.
///
/// Appends happen only during the scan phase and are serialized through
/// the collection lock; positions never change afterwards, so a cursor
/// index stays meaningful for the whole session. The collection lock is
/// never held across evaluation or sync execution — only across the final
/// push or a snapshot clone.
#[derive(Debug, Default)]
pub struct RecordSet {
    entries: RwLock<Vec<RecordHandle>>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialized append; returns the stable handle for the new record.
    pub fn append(&self, record: RepoRecord) -> RecordHandle {
        let handle = RecordHandle::new(record);
        write(&self.entries).push(handle.clone());
        handle
    }

    pub fn len(&self) -> usize {
        read(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        read(&self.entries).is_empty()
    }

    pub fn get(&self, index: usize) -> Option<RecordHandle> {
        read(&self.entries).get(index).cloned()
    }

    /// Handles to every record, in insertion order.
    pub fn handles(&self) -> Vec<RecordHandle> {
        read(&self.entries).clone()
    }

    /// Ordered copy of all records, each cloned in its own consistent
    /// instant. Renderers work from this, never from live cells.
    pub fn snapshot(&self) -> Vec<RepoRecord> {
        let handles = self.handles();
        handles.iter().map(RecordHandle::snapshot).collect()
    }
}
