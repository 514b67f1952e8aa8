//! The server façade: owns the EDB and the client's TDP public key, and
//! dispatches `update`/`search` to the storage and search-walk layers
//! (SPEC_FULL §4.5/§4.6).

use std::path::Path;
use std::sync::{Arc, RwLock};

use fpsse_crypto::TdpPublicKey;
use fpsse_store::{Edb, SledEdb};
use slog::{info, Logger};

use crate::error::Error;
use crate::search::{self, SearchOutcome, SearchParams};

const EDB_TREE: &str = "pairs";
const PUBLIC_KEY_FILE: &str = "tdp_pk.pub";

pub struct Server {
    edb: SledEdb,
    public_key: RwLock<Option<Arc<TdpPublicKey>>>,
    public_key_path: std::path::PathBuf,
    logger: Logger,
}

impl Server {
    /// Opens (or creates) the EDB directory at `storage`, restoring the
    /// client's TDP public key from a previous `setup` if one was persisted
    /// there, so a restarted server is immediately ready to search.
    pub fn open(storage: impl AsRef<Path>, logger: Logger) -> Result<Self, Error> {
        let storage = storage.as_ref();
        std::fs::create_dir_all(storage)?;
        let db = sled::open(storage.join("pairs.dat")).map_err(fpsse_store::Error::from)?;
        let edb = SledEdb::open(&db, EDB_TREE)?;
        let public_key_path = storage.join(PUBLIC_KEY_FILE);

        let public_key = match std::fs::read(&public_key_path) {
            Ok(bytes) => {
                let pk = TdpPublicKey::from_bytes(&bytes)
                    .map_err(|_| Error::MalformedRequest("stored TDP public key is corrupt".into()))?;
                info!(logger, "restored TDP public key from storage"; "path" => %public_key_path.display());
                Some(Arc::new(pk))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(Error::from(e)),
        };

        Ok(Self {
            edb,
            public_key: RwLock::new(public_key),
            public_key_path,
            logger,
        })
    }

    /// Installs the client's TDP public key and persists it under the
    /// storage directory. Fails if already set up.
    pub fn setup(&self, public_key_bytes: Vec<u8>) -> Result<(), Error> {
        let mut slot = self.public_key.write().expect("public key lock poisoned");
        if slot.is_some() {
            return Err(Error::AlreadySetUp);
        }
        let pk = TdpPublicKey::from_bytes(&public_key_bytes)
            .map_err(|_| Error::MalformedRequest("invalid TDP public key".into()))?;
        std::fs::write(&self.public_key_path, &public_key_bytes)?;
        *slot = Some(Arc::new(pk));
        info!(self.logger, "server set up"; "public_key_bytes" => public_key_bytes.len());
        Ok(())
    }

    /// Inserts a single `(update_token, masked_index)` pair into the EDB.
    pub fn update(&self, update_token: &[u8], masked_index: u64) -> Result<(), Error> {
        self.edb.put(update_token, masked_index.to_be_bytes())?;
        Ok(())
    }

    /// Flushes the EDB, e.g. at the end of a bulk-insert stream.
    pub fn flush(&self) -> Result<(), Error> {
        self.edb.flush()?;
        Ok(())
    }

    /// Runs a search walk using the stored public key.
    pub fn search(&self, params: SearchParams) -> Result<SearchOutcome, Error> {
        let pk = self
            .public_key
            .read()
            .expect("public key lock poisoned")
            .clone()
            .ok_or(Error::NotSetUp)?;
        search::search(&pk, &self.edb, &params, &self.logger)
    }

    pub fn is_set_up(&self) -> bool {
        self.public_key.read().expect("public key lock poisoned").is_some()
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }
}
