//! Network Module
//!
//! TCP connection handling and the blocking client.
//!
//! ## Architecture
//! - One `Client` owns one `Connection`
//! - One command in flight at a time, no pipelining
//! - No reconnect: a failed connection stays failed

mod connection;
mod client;

pub use connection::{Connection, ConnectionState};
pub use client::{normalize, Client, EMPTY_COMMAND_TEXT};
