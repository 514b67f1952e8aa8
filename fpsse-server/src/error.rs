//! Error type for the server crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("storage error: {0}")]
    Store(#[from] fpsse_store::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("server has already been set up")]
    AlreadySetUp,

    #[error("server has not been set up yet")]
    NotSetUp,

    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

impl From<Error> for tonic::Status {
    fn from(err: Error) -> Self {
        match err {
            Error::AlreadySetUp => tonic::Status::failed_precondition(err.to_string()),
            Error::NotSetUp => tonic::Status::failed_precondition(err.to_string()),
            Error::MalformedRequest(_) => tonic::Status::invalid_argument(err.to_string()),
            Error::Store(_) | Error::Io(_) => tonic::Status::internal(err.to_string()),
        }
    }
}
