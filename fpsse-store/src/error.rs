//! Error type shared by the counter map and the EDB.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("storage engine error: {0}")]
    Sled(#[from] sled::Error),
    #[error("stored value has the wrong length for this map (expected {expected}, got {got})")]
    WrongLength { expected: usize, got: usize },
}
