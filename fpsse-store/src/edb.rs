//! The encrypted database: a persistent `update_token -> masked_index` map.
//!
//! Insert-only under normal operation. Keys and values are opaque fixed-width
//! byte strings to this crate; `fpsse-crypto`'s `UPDATE_TOKEN_SIZE` and
//! `MASKED_INDEX_SIZE` constants fix their width for callers, but this crate
//! does not depend on `fpsse-crypto` to keep the storage layer generic.

use crate::error::Error;

/// A persistent `update_token -> masked_index` map.
pub trait Edb {
    /// Inserts or overwrites the masked index for `token`. Concurrent callers
    /// are serialized by the implementation.
    fn put(&self, token: impl AsRef<[u8]>, masked_index: impl AsRef<[u8]>) -> Result<(), Error>;

    /// Looks up the masked index for `token`.
    fn get(&self, token: impl AsRef<[u8]>) -> Result<Option<Vec<u8>>, Error>;

    /// Forces durability of all prior writes.
    fn flush(&self) -> Result<(), Error>;

    /// Count of stored entries. Best-effort under concurrent writers.
    fn approximate_size(&self) -> Result<usize, Error>;
}

/// An [`Edb`] backed by a `sled::Tree`.
///
/// Writes are serialized on an internal mutex to preserve the single-writer
/// discipline the scheme assumes; `sled` itself permits lock-free concurrent
/// reads, which this wrapper does not additionally restrict.
#[derive(Clone)]
pub struct SledEdb {
    tree: sled::Tree,
    write_lock: std::sync::Arc<std::sync::Mutex<()>>,
}

impl SledEdb {
    pub fn open(db: &sled::Db, tree_name: &str) -> Result<Self, Error> {
        let tree = db.open_tree(tree_name)?;
        Ok(Self {
            tree,
            write_lock: std::sync::Arc::new(std::sync::Mutex::new(())),
        })
    }
}

impl Edb for SledEdb {
    fn put(&self, token: impl AsRef<[u8]>, masked_index: impl AsRef<[u8]>) -> Result<(), Error> {
        let _guard = self.write_lock.lock().expect("edb write lock poisoned");
        self.tree.insert(token.as_ref(), masked_index.as_ref())?;
        Ok(())
    }

    fn get(&self, token: impl AsRef<[u8]>) -> Result<Option<Vec<u8>>, Error> {
        Ok(self.tree.get(token.as_ref())?.map(|v| v.to_vec()))
    }

    fn flush(&self) -> Result<(), Error> {
        self.tree.flush()?;
        Ok(())
    }

    fn approximate_size(&self) -> Result<usize, Error> {
        Ok(self.tree.len())
    }
}
