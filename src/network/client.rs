//! Blocking Client
//!
//! Executes plain-text commands over one connection and normalizes every
//! reply into a [`Reply`].
//!
//! ## Failure model
//! - Unreachable server or broken transport: the connection-error sentinel
//!   ([`Reply::connection_error`]) is returned, never a Rust error.
//! - Server-side command errors (`-ERR ...`): an ordinary `Reply` with kind
//!   `Error`; the connection stays usable.
//! - Failed `AUTH`: logged only. The client keeps its connection state and
//!   further commands are still sent.
//!
//! Nothing is retried and the connection is never reopened.

use std::io::{Read, Write};
use std::net::TcpStream;

use crate::config::{ClientConfig, Credentials, KeepAlive};
use crate::network::connection::{Connection, ConnectionState};
use crate::protocol::{Command, RawReply};
use crate::reply::{Reply, ReplyKind};

/// Error text returned for a command line with no arguments
pub const EMPTY_COMMAND_TEXT: &str = "ERR empty command";

/// Blocking client owning exactly one connection
///
/// Not meant for concurrent use; wrap it in a mutex to share it.
pub struct Client<T = TcpStream> {
    host: String,
    port: u16,
    user: Option<String>,
    password: Option<String>,
    connection: Connection<T>,
}

impl Client<TcpStream> {
    /// Connect without authentication
    pub fn connect(host: impl Into<String>, port: u16) -> Self {
        let host = host.into();
        let connection = Connection::open(&host, port, None);
        Self::from_connection(host, port, None, connection)
    }

    /// Connect and send `AUTH <user> <password>`
    pub fn connect_with_auth(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let host = host.into();
        let connection = Connection::open(&host, port, None);
        Self::from_connection(
            host,
            port,
            Some(Credentials::new(user, password)),
            connection,
        )
    }

    /// Connect, apply socket options, then authenticate
    pub fn with_config(config: &ClientConfig) -> Self {
        let connection = Connection::open(&config.host, config.port, config.connect_timeout());
        let mut client = Self::assemble(
            config.host.clone(),
            config.port,
            config.credentials.as_ref(),
            connection,
        );
        if !client.is_connected(true) {
            return client;
        }

        match config.keep_alive {
            KeepAlive::Disabled => {}
            KeepAlive::PlatformDefault => client.enable_keep_alive(0),
            KeepAlive::Interval(secs) => client.enable_keep_alive(secs),
        }
        if let Some(timeout_ms) = config.tcp_user_timeout_ms {
            client.set_tcp_user_timeout(timeout_ms);
        }
        if let Some(credentials) = &config.credentials {
            client.authenticate(credentials);
        }

        client
    }

    /// Enable TCP keep-alive; `0` keeps the platform probe timings
    ///
    /// Failures are logged and otherwise ignored.
    pub fn enable_keep_alive(&mut self, interval_secs: u32) {
        if self.connection.transport().is_none() {
            tracing::debug!("Keep-alive not applied to {}: no socket", self.connection.peer_addr());
            return;
        }
        if let Err(e) = self.connection.enable_keep_alive(interval_secs) {
            tracing::warn!(
                "Failed to enable keep-alive on {}: {}",
                self.connection.peer_addr(),
                e
            );
        }
    }

    /// Set the TCP user timeout in milliseconds
    ///
    /// Failures are logged and otherwise ignored.
    pub fn set_tcp_user_timeout(&mut self, timeout_ms: u32) {
        if self.connection.transport().is_none() {
            tracing::debug!(
                "TCP user timeout not applied to {}: no socket",
                self.connection.peer_addr()
            );
            return;
        }
        if let Err(e) = self.connection.set_tcp_user_timeout(timeout_ms) {
            tracing::warn!(
                "Failed to set TCP user timeout on {}: {}",
                self.connection.peer_addr(),
                e
            );
        }
    }
}

impl<T: Read + Write> Client<T> {
    /// Build a client over an existing connection handle
    ///
    /// Authenticates when credentials are given and the connection is usable.
    pub fn from_connection(
        host: impl Into<String>,
        port: u16,
        credentials: Option<Credentials>,
        connection: Connection<T>,
    ) -> Self {
        let mut client = Self::assemble(host.into(), port, credentials.as_ref(), connection);
        if !client.is_connected(true) {
            return client;
        }

        if let Some(credentials) = &credentials {
            client.authenticate(credentials);
        }
        client
    }

    fn assemble(
        host: String,
        port: u16,
        credentials: Option<&Credentials>,
        connection: Connection<T>,
    ) -> Self {
        Self {
            host,
            port,
            user: credentials.and_then(|c| c.user.clone()),
            password: credentials.map(|c| c.password.clone()),
            connection,
        }
    }

    /// Send `AUTH` and report a rejection through the log
    ///
    /// A rejected `AUTH` does not change the connection state.
    fn authenticate(&mut self, credentials: &Credentials) {
        let reply = self.send_command(&credentials.auth_command());
        if reply.is_status() && reply.text == "OK" {
            tracing::debug!("Authorized on {}", self.connection.peer_addr());
        } else {
            tracing::warn!(
                "Authorization failed on {}: {}",
                self.connection.peer_addr(),
                reply.text
            );
        }
    }

    /// True only while the connection is open and error-free
    ///
    /// With `verbose`, a failed check is reported through the log.
    pub fn is_connected(&self, verbose: bool) -> bool {
        let connected = self.connection.is_usable();
        if !connected && verbose {
            tracing::error!(
                "Failed to connect to server {}: {}",
                self.connection.peer_addr(),
                self.connection.last_error().unwrap_or("unknown error")
            );
        }
        connected
    }

    /// Send a command line and block until its reply arrives
    ///
    /// The line is split on spaces and sent as-is; see [`Command::parse`].
    pub fn send_command(&mut self, command_text: &str) -> Reply {
        if !self.is_connected(true) {
            return Reply::connection_error();
        }

        let command = Command::parse(command_text);
        if command.is_empty() {
            return Reply::create(ReplyKind::Error, EMPTY_COMMAND_TEXT, 0, EMPTY_COMMAND_TEXT.len());
        }

        match self.connection.round_trip(&command) {
            Ok(raw) => normalize(&raw),
            Err(_) => Reply::connection_error(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn connection(&self) -> &Connection<T> {
        &self.connection
    }
}

/// Convert a raw reply into a [`Reply`]
///
/// Arrays are flattened one level only: each element becomes a scalar
/// `Reply`, so an element that is itself an array keeps its kind and length
/// but loses its elements.
pub fn normalize(raw: &RawReply) -> Reply {
    if raw.kind != ReplyKind::Array {
        return scalar(raw);
    }

    let elements = raw.elements.iter().map(scalar).collect();
    Reply::create_with_elements(raw.kind, payload_text(raw), raw.integer, raw.length, elements)
}

fn scalar(raw: &RawReply) -> Reply {
    Reply::create(raw.kind, payload_text(raw), raw.integer, raw.length)
}

/// Payload as text; the null marker becomes the empty string
///
/// Invalid UTF-8 is replaced with U+FFFD, so `text.len()` can differ from
/// the raw `length`.
fn payload_text(raw: &RawReply) -> String {
    raw.payload
        .as_ref()
        .map(|payload| String::from_utf8_lossy(payload).into_owned())
        .unwrap_or_default()
}
