//! # kvwire
//!
//! A minimal blocking client for RESP2 key-value servers with:
//! - One uniform, serializable `Reply` value for every reply type
//! - Connect with optional `AUTH`
//! - TCP keep-alive and TCP user timeout configuration
//! - Connection failures reported as a sentinel reply, never a panic
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Client::send_command                      │
//! │              (one blocking round trip per call)              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Connection                              │
//! │           (Unconnected / Connected / Errored)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Command   │          │  RawReply   │
//!   │  (encode)   │          │  (decode)   │
//!   └─────────────┘          └──────┬──────┘
//!                                   │ normalize
//!                                   ▼
//!                           ┌─────────────┐
//!                           │    Reply    │
//!                           └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use kvwire::Client;
//!
//! let mut client = Client::connect_with_auth("127.0.0.1", 6379, "default", "secret");
//! client.enable_keep_alive(0);
//!
//! let reply = client.send_command("GET greeting");
//! if reply.is_ok() {
//!     println!("greeting = {}", reply.text);
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod reply;
pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{WireError, Result};
pub use config::{ClientConfig, Credentials, KeepAlive};
pub use reply::{Reply, ReplyKind};
pub use network::{Client, ConnectionState};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of kvwire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
