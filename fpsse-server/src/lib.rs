//! Server-side pieces of the forward-private searchable encryption engine:
//! EDB ingestion, the parallel search walk, and the gRPC service wiring them
//! to the wire contract.

pub mod config;
pub mod error;
pub mod logging;
pub mod rpc;
pub mod search;
pub mod server;

pub use error::Error;
pub use rpc::FpsseService;
pub use search::{SearchOutcome, SearchParams};
pub use server::Server;
