use std::collections::BTreeMap;

use serde::Serialize;

use super::PersistError;
use crate::ColumnFamily;

type Family = BTreeMap<Vec<u8>, Vec<u8>>;

/// One write inside a [`WriteBatch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchOp {
    Put {
        family: ColumnFamily,
        key: Vec<u8>,
        value: Vec<u8>,
    },
    Delete {
        family: ColumnFamily,
        key: Vec<u8>,
    },
}

/// Ordered writes applied atomically by [`KvStore::write`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, family: ColumnFamily, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.ops.push(BatchOp::Put {
            family,
            key: key.into(),
            value: value.into(),
        });
    }

    /// Put a JSON-encoded value.
    pub fn put_json<T: Serialize + ?Sized>(
        &mut self,
        family: ColumnFamily,
        key: impl Into<Vec<u8>>,
        value: &T,
    ) -> Result<(), PersistError> {
        let bytes = serde_json::to_vec(value)?;
        self.put(family, key, bytes);
        Ok(())
    }

    pub fn delete(&mut self, family: ColumnFamily, key: impl Into<Vec<u8>>) {
        self.ops.push(BatchOp::Delete {
            family,
            key: key.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }
}

impl IntoIterator for WriteBatch {
    type Item = BatchOp;
    type IntoIter = std::vec::IntoIter<BatchOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

/// Point-in-time, read-only copy of every column family.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    families: [Family; 8],
}

impl Snapshot {
    pub fn get(&self, family: ColumnFamily, key: &[u8]) -> Option<&[u8]> {
        self.families[family.index()].get(key).map(Vec::as_slice)
    }

    /// Records of one family in key order.
    pub fn iter(&self, family: ColumnFamily) -> impl Iterator<Item = (&[u8], &[u8])> + '_ {
        self.families[family.index()]
            .iter()
            .map(|(k, v)| (k.as_slice(), v.as_slice()))
    }

    pub fn len(&self, family: ColumnFamily) -> usize {
        self.families[family.index()].len()
    }
}

/// Column-family key/value backend.
pub trait KvStore {
    fn put(&mut self, family: ColumnFamily, key: &[u8], value: &[u8]) -> Result<(), PersistError>;

    fn get(&self, family: ColumnFamily, key: &[u8]) -> Result<Option<Vec<u8>>, PersistError>;

    fn delete(&mut self, family: ColumnFamily, key: &[u8]) -> Result<(), PersistError>;

    /// Apply every op of `batch` or none of them.
    fn write(&mut self, batch: WriteBatch) -> Result<(), PersistError>;

    fn snapshot(&self) -> Result<Snapshot, PersistError>;
}

/// In-process reference backend: one `BTreeMap` per family.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    families: [Family; 8],
    closed: bool,
    batches: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Further operations fail with [`PersistError::Closed`].
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Batches applied so far.
    pub fn batches_written(&self) -> u64 {
        self.batches
    }

    pub fn len(&self, family: ColumnFamily) -> usize {
        self.families[family.index()].len()
    }

    fn check_open(&self) -> Result<(), PersistError> {
        if self.closed {
            Err(PersistError::Closed)
        } else {
            Ok(())
        }
    }
}

impl KvStore for MemoryStore {
    fn put(&mut self, family: ColumnFamily, key: &[u8], value: &[u8]) -> Result<(), PersistError> {
        self.check_open()?;
        self.families[family.index()].insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn get(&self, family: ColumnFamily, key: &[u8]) -> Result<Option<Vec<u8>>, PersistError> {
        self.check_open()?;
        Ok(self.families[family.index()].get(key).cloned())
    }

    fn delete(&mut self, family: ColumnFamily, key: &[u8]) -> Result<(), PersistError> {
        self.check_open()?;
        self.families[family.index()].remove(key);
        Ok(())
    }

    fn write(&mut self, batch: WriteBatch) -> Result<(), PersistError> {
        // Nothing in an in-memory apply can fail once the store is open.
        self.check_open()?;
        for op in batch {
            match op {
                BatchOp::Put { family, key, value } => {
                    self.families[family.index()].insert(key, value);
                }
                BatchOp::Delete { family, key } => {
                    self.families[family.index()].remove(&key);
                }
            }
        }
        self.batches += 1;
        Ok(())
    }

    fn snapshot(&self) -> Result<Snapshot, PersistError> {
        self.check_open()?;
        Ok(Snapshot {
            families: self.families.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_applies_in_order() {
        let mut store = MemoryStore::new();
        let mut batch = WriteBatch::new();
        batch.put(ColumnFamily::Nodes, b"k".to_vec(), b"1".to_vec());
        batch.put(ColumnFamily::Nodes, b"k".to_vec(), b"2".to_vec());
        batch.delete(ColumnFamily::Links, b"k".to_vec());
        store.write(batch).unwrap();

        assert_eq!(store.get(ColumnFamily::Nodes, b"k").unwrap(), Some(b"2".to_vec()));
        assert_eq!(store.batches_written(), 1);
    }

    #[test]
    fn test_snapshot_is_point_in_time() {
        let mut store = MemoryStore::new();
        store.put(ColumnFamily::Metadata, b"a", b"1").unwrap();
        let snap = store.snapshot().unwrap();
        store.put(ColumnFamily::Metadata, b"a", b"2").unwrap();

        assert_eq!(snap.get(ColumnFamily::Metadata, b"a"), Some(&b"1"[..]));
        assert_eq!(store.get(ColumnFamily::Metadata, b"a").unwrap(), Some(b"2".to_vec()));
    }

    #[test]
    fn test_closed_store_rejects_everything() {
        let mut store = MemoryStore::new();
        store.close();
        assert!(matches!(store.put(ColumnFamily::Nodes, b"k", b"v"), Err(PersistError::Closed)));
        assert!(matches!(store.get(ColumnFamily::Nodes, b"k"), Err(PersistError::Closed)));
        assert!(matches!(store.write(WriteBatch::new()), Err(PersistError::Closed)));
        assert!(matches!(store.snapshot(), Err(PersistError::Closed)));
    }
}
