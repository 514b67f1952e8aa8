//! Client-side pieces of the forward-private searchable encryption engine:
//! the cryptographic state machine, secrets lifecycle, RPC channel, and the
//! concurrent update driver.

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod rpc;
pub mod secrets;
pub mod state_machine;

pub use client::Client;
pub use error::Error;
pub use secrets::Secrets;
pub use state_machine::{SearchRequest, StateMachine, UpdateRequest};
