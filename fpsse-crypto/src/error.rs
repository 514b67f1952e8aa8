//! Error type shared by every primitive in this crate.

use thiserror::Error;

/// Error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("malformed key material")]
    MalformedKey,
    #[error("byte string has the wrong length for this primitive (expected {expected}, got {got})")]
    WrongLength { expected: usize, got: usize },
    #[error("rsa key generation or operation failed: {0}")]
    Rsa(#[from] rsa::Error),
    #[error("could not sample a TDP-domain element from the given seed")]
    DomainSamplingFailed,
}
