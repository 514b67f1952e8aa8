//! Persistent `keyword -> u32` counter map with atomic `get_and_increment`.
//!
//! Keyed by raw keyword bytes rather than the keyword's hash digest: the
//! counter map is client-local and never crosses the trust boundary, so
//! storing it under the plaintext keyword costs nothing and helps when
//! inspecting the store directly.

use crate::error::Error;

/// A persistent, thread-safe `keyword -> u32` counter.
pub trait CounterMap {
    /// Returns the current counter for `kw`, or `None` if never seen.
    fn get(&self, kw: impl AsRef<[u8]>) -> Result<Option<u32>, Error>;

    /// Atomically returns the current counter for `kw` and installs
    /// `counter + 1`. Absent keywords start at counter `0`.
    fn get_and_increment(&self, kw: impl AsRef<[u8]>) -> Result<u32, Error>;

    /// Count of distinct keywords. Best-effort under concurrent writers.
    fn approximate_size(&self) -> Result<usize, Error>;

    /// Forces durability of all prior writes.
    fn flush(&self) -> Result<(), Error>;
}

/// A [`CounterMap`] backed by a `sled::Tree`.
#[derive(Clone)]
pub struct SledCounterMap {
    tree: sled::Tree,
}

impl SledCounterMap {
    pub fn open(db: &sled::Db, tree_name: &str) -> Result<Self, Error> {
        let tree = db.open_tree(tree_name)?;
        Ok(Self { tree })
    }

    fn decode(bytes: &[u8]) -> Result<u32, Error> {
        let arr: [u8; 4] = bytes.try_into().map_err(|_| Error::WrongLength {
            expected: 4,
            got: bytes.len(),
        })?;
        Ok(u32::from_be_bytes(arr))
    }
}

impl CounterMap for SledCounterMap {
    fn get(&self, kw: impl AsRef<[u8]>) -> Result<Option<u32>, Error> {
        match self.tree.get(kw.as_ref())? {
            Some(v) => Ok(Some(Self::decode(&v)?)),
            None => Ok(None),
        }
    }

    fn get_and_increment(&self, kw: impl AsRef<[u8]>) -> Result<u32, Error> {
        let key = kw.as_ref();
        let mut err: Option<Error> = None;
        let prev = self.tree.fetch_and_update(key, |existing| {
            let current = match existing {
                None => 0u32,
                Some(bytes) => match Self::decode(bytes) {
                    Ok(c) => c,
                    Err(e) => {
                        err = Some(e);
                        0
                    }
                },
            };
            Some(current.wrapping_add(1).to_be_bytes().to_vec())
        })?;
        if let Some(e) = err {
            return Err(e);
        }
        match prev {
            None => Ok(0),
            Some(bytes) => Self::decode(&bytes),
        }
    }

    fn approximate_size(&self) -> Result<usize, Error> {
        Ok(self.tree.len())
    }

    fn flush(&self) -> Result<(), Error> {
        self.tree.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_tmp() -> (tempfile::TempDir, SledCounterMap) {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        let map = SledCounterMap::open(&db, "counters").unwrap();
        (dir, map)
    }

    #[test]
    fn absent_keyword_returns_none() {
        let (_dir, map) = open_tmp();
        assert_eq!(map.get(b"alpha").unwrap(), None);
    }

    #[test]
    fn increment_starts_at_zero_and_counts_up() {
        let (_dir, map) = open_tmp();
        assert_eq!(map.get_and_increment(b"alpha").unwrap(), 0);
        assert_eq!(map.get_and_increment(b"alpha").unwrap(), 1);
        assert_eq!(map.get_and_increment(b"alpha").unwrap(), 2);
        assert_eq!(map.get(b"alpha").unwrap(), Some(3));
    }

    #[test]
    fn keywords_are_independent() {
        let (_dir, map) = open_tmp();
        map.get_and_increment(b"alpha").unwrap();
        map.get_and_increment(b"alpha").unwrap();
        map.get_and_increment(b"beta").unwrap();
        assert_eq!(map.get(b"alpha").unwrap(), Some(2));
        assert_eq!(map.get(b"beta").unwrap(), Some(1));
    }

    #[test]
    fn approximate_size_counts_distinct_keywords() {
        let (_dir, map) = open_tmp();
        map.get_and_increment(b"alpha").unwrap();
        map.get_and_increment(b"beta").unwrap();
        map.get_and_increment(b"alpha").unwrap();
        assert_eq!(map.approximate_size().unwrap(), 2);
    }

    #[test]
    fn concurrent_increments_are_linearizable() {
        use std::sync::Arc;
        use std::thread;

        let (_dir, map) = open_tmp();
        let map = Arc::new(map);
        let mut handles = Vec::new();
        for _ in 0..8 {
            let map = Arc::clone(&map);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    map.get_and_increment(b"shared").unwrap();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(map.get(b"shared").unwrap(), Some(800));
    }
}
