//! Persistent storage for the forward-private searchable encryption engine:
//! the client-side counter map and the server-side encrypted database (EDB).
//!
//! Both are specified as black-box thread-safe ordered maps; this crate backs
//! both with `sled`, an embedded, crash-safe, MVCC key-value store, and wraps
//! it behind the narrow typed interface the core needs rather than exposing
//! `sled` directly to callers.

pub mod counter_map;
pub mod edb;
pub mod error;

pub use counter_map::{CounterMap, SledCounterMap};
pub use edb::{Edb, SledEdb};
pub use error::Error;
