//! Error type for the client crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("crypto primitive error: {0}")]
    Crypto(#[from] fpsse_crypto::Error),

    #[error("storage error: {0}")]
    Store(#[from] fpsse_store::Error),

    #[error("secrets directory error: {0}")]
    Io(#[from] std::io::Error),

    #[error("secrets directory already exists and is not empty: {0}")]
    SecretsAlreadyExist(std::path::PathBuf),

    #[error("secrets directory is missing required file {0}")]
    MissingKeyFile(&'static str),

    #[error("rpc transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("rpc call failed: {0}")]
    Rpc(#[from] tonic::Status),
}
