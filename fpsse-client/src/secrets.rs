//! Client secrets lifecycle: generation, on-disk layout, and loading.
//!
//! The secrets directory holds four entries: `tdp_sk.key` (RSA private key,
//! PKCS#1 DER), `derivation_master.key` and `rsa_prg.key` (raw key bytes, no
//! envelope), and `counters.dat/` (the counter map's `sled` store). This
//! mirrors the reference client's flat four-file contract exactly.

use std::path::{Path, PathBuf};

use fpsse_crypto::{Prf, Prg, TdpPrivateKey, TdpPublicKey, DERIVATION_KEY_SIZE};
use fpsse_store::{CounterMap, SledCounterMap};
use rand::RngCore;

use crate::error::Error;

const TDP_SK_FILE: &str = "tdp_sk.key";
const DERIVATION_MASTER_FILE: &str = "derivation_master.key";
const RSA_PRG_FILE: &str = "rsa_prg.key";
const COUNTERS_DIR: &str = "counters.dat";

const TDP_KEY_BITS: usize = 2048;
const PRG_KEY_SIZE: usize = 32;

/// The client's full set of secret key material plus the open counter store.
pub struct Secrets {
    pub tdp_sk: TdpPrivateKey,
    pub derivation_master: Prf,
    pub prg: Prg,
    pub counters: SledCounterMap,
}

impl Secrets {
    /// Generates fresh key material and writes the four-file layout to `dir`.
    /// Fails if `dir` already exists and is non-empty, leaving no partial
    /// state behind on failure.
    pub fn setup_new(dir: impl AsRef<Path>) -> Result<(Self, TdpPublicKey), Error> {
        let dir = dir.as_ref();
        if dir.exists() && dir.read_dir()?.next().is_some() {
            return Err(Error::SecretsAlreadyExist(dir.to_path_buf()));
        }
        std::fs::create_dir_all(dir)?;

        let mut rng = rand::rngs::OsRng;
        let tdp_sk = TdpPrivateKey::generate(&mut rng, TDP_KEY_BITS)?;
        let tdp_pk = tdp_sk.public_key();

        let mut mk_bytes = vec![0u8; DERIVATION_KEY_SIZE];
        rng.fill_bytes(&mut mk_bytes);
        let derivation_master = Prf::new(mk_bytes);

        let mut prg_bytes = vec![0u8; PRG_KEY_SIZE];
        rng.fill_bytes(&mut prg_bytes);
        let prg = Prg::new(prg_bytes);

        write_file(dir, TDP_SK_FILE, &tdp_sk.to_pkcs1_der()?)?;
        write_file(dir, DERIVATION_MASTER_FILE, derivation_master.key())?;
        write_file(dir, RSA_PRG_FILE, prg.key())?;

        let counters_path = dir.join(COUNTERS_DIR);
        let db = sled::open(&counters_path).map_err(fpsse_store::Error::from)?;
        let counters = SledCounterMap::open(&db, "counters").map_err(Error::from)?;

        Ok((
            Self {
                tdp_sk,
                derivation_master,
                prg,
                counters,
            },
            tdp_pk,
        ))
    }

    /// Loads previously-written key material and reopens the counter store.
    pub fn setup_from_directory(dir: impl AsRef<Path>) -> Result<Self, Error> {
        let dir = dir.as_ref();
        let tdp_sk_bytes = read_file(dir, TDP_SK_FILE)?;
        let tdp_sk = TdpPrivateKey::from_pkcs1_der(&tdp_sk_bytes)?;

        let mk_bytes = read_file(dir, DERIVATION_MASTER_FILE)?;
        let derivation_master = Prf::new(mk_bytes);

        let prg_bytes = read_file(dir, RSA_PRG_FILE)?;
        let prg = Prg::new(prg_bytes);

        let counters_path = dir.join(COUNTERS_DIR);
        let db = sled::open(&counters_path).map_err(fpsse_store::Error::from)?;
        let counters = SledCounterMap::open(&db, "counters").map_err(Error::from)?;

        Ok(Self {
            tdp_sk,
            derivation_master,
            prg,
            counters,
        })
    }
}

fn write_file(dir: &Path, name: &'static str, contents: &[u8]) -> Result<(), Error> {
    std::fs::write(dir.join(name), contents)?;
    Ok(())
}

fn read_file(dir: &Path, name: &'static str) -> Result<Vec<u8>, Error> {
    let path: PathBuf = dir.join(name);
    std::fs::read(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::MissingKeyFile(name)
        } else {
            Error::Io(e)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_new_then_reload_yields_same_keys() {
        let dir = tempfile::tempdir().unwrap();
        let secrets_dir = dir.path().join("secrets");
        let (secrets, pk) = Secrets::setup_new(&secrets_dir).unwrap();
        drop(secrets);

        let reloaded = Secrets::setup_from_directory(&secrets_dir).unwrap();
        assert_eq!(reloaded.tdp_sk.public_key().to_bytes(), pk.to_bytes());
    }

    #[test]
    fn setup_new_rejects_nonempty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let secrets_dir = dir.path().join("secrets");
        Secrets::setup_new(&secrets_dir).unwrap();
        let err = Secrets::setup_new(&secrets_dir).unwrap_err();
        assert!(matches!(err, Error::SecretsAlreadyExist(_)));
    }

    #[test]
    fn setup_from_directory_reports_missing_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Secrets::setup_from_directory(dir.path()).unwrap_err();
        assert!(matches!(err, Error::MissingKeyFile(_)));
    }
}
