//! Connection Handle
//!
//! Owns one transport and tracks whether it can still carry commands.
//!
//! ```text
//!   Unconnected            (socket could not be opened)
//!
//!   Connected ──transport error──▶ Errored
//! ```
//!
//! There is no way back to `Connected`; both other states are terminal.

use std::io::{self, BufReader, ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use socket2::{SockRef, TcpKeepalive};

use crate::error::{Result, WireError};
use crate::protocol::{read_reply, write_command, Command, RawReply};

/// Lifecycle state of a connection handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// The socket was never opened
    Unconnected,

    /// Open, no transport error observed
    Connected,

    /// A read or write failed; the handle is unusable
    Errored,
}

/// A single request/response transport
pub struct Connection<T> {
    /// Buffered transport; writes go to the inner handle
    stream: Option<BufReader<T>>,

    state: ConnectionState,

    /// Reason for the last transition out of `Connected`
    last_error: Option<String>,

    /// Peer address for logging
    peer_addr: String,
}

impl<T: Read + Write> Connection<T> {
    /// Wrap an already-open transport
    pub fn from_transport(transport: T, peer_addr: impl Into<String>) -> Self {
        Self {
            stream: Some(BufReader::new(transport)),
            state: ConnectionState::Connected,
            last_error: None,
            peer_addr: peer_addr.into(),
        }
    }

    /// A handle whose socket could not be opened
    pub fn unconnected(peer_addr: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            stream: None,
            state: ConnectionState::Unconnected,
            last_error: Some(reason.into()),
            peer_addr: peer_addr.into(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// True only in the `Connected` state
    pub fn is_usable(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// The underlying transport, if one was ever opened
    pub fn transport(&self) -> Option<&T> {
        self.stream.as_ref().map(BufReader::get_ref)
    }

    /// Send one command and block until its reply has been read
    ///
    /// Any failure moves the connection to `Errored`. Outside the
    /// `Connected` state the transport is not touched.
    pub fn round_trip(&mut self, command: &Command) -> Result<RawReply> {
        if !self.is_usable() {
            return Err(WireError::NotConnected(self.describe_failure()));
        }

        let result = match self.stream.as_mut() {
            Some(stream) => exchange(stream, command),
            None => Err(WireError::NotConnected("no transport".to_string())),
        };

        match result {
            Ok(reply) => {
                tracing::trace!(
                    "Received {:?} reply from {} ({} bytes/elements)",
                    reply.kind,
                    self.peer_addr,
                    reply.length
                );
                Ok(reply)
            }
            Err(e) => {
                self.mark_errored(&e);
                Err(e)
            }
        }
    }

    fn mark_errored(&mut self, error: &WireError) {
        tracing::warn!("Connection to {} failed: {}", self.peer_addr, error);
        self.state = ConnectionState::Errored;
        self.last_error = Some(error.to_string());
    }

    fn describe_failure(&self) -> String {
        let reason = self.last_error.as_deref().unwrap_or("unknown error");
        match self.state {
            ConnectionState::Unconnected => {
                format!("could not connect to {}: {}", self.peer_addr, reason)
            }
            ConnectionState::Errored => {
                format!("connection to {} errored: {}", self.peer_addr, reason)
            }
            ConnectionState::Connected => format!("connected to {}", self.peer_addr),
        }
    }
}

fn exchange<T: Read + Write>(stream: &mut BufReader<T>, command: &Command) -> Result<RawReply> {
    write_command(stream.get_mut(), command)?;
    read_reply(stream)
}

// =============================================================================
// TCP
// =============================================================================

impl Connection<TcpStream> {
    /// Open a TCP connection
    ///
    /// Never fails: an unreachable server yields an `Unconnected` handle.
    pub fn open(host: &str, port: u16, connect_timeout: Option<Duration>) -> Self {
        let peer_addr = format!("{}:{}", host, port);

        match connect_tcp(host, port, connect_timeout) {
            Ok(stream) => {
                // Disable Nagle's algorithm, every command is a single write
                if let Err(e) = stream.set_nodelay(true) {
                    tracing::debug!("Could not set TCP_NODELAY on {}: {}", peer_addr, e);
                }
                tracing::debug!("Connected to {}", peer_addr);
                Self::from_transport(stream, peer_addr)
            }
            Err(e) => {
                tracing::debug!("Connect to {} failed: {}", peer_addr, e);
                Self::unconnected(peer_addr, e.to_string())
            }
        }
    }

    fn socket(&self) -> Result<SockRef<'_>> {
        self.transport()
            .map(SockRef::from)
            .ok_or_else(|| WireError::NotConnected(format!("no socket for {}", self.peer_addr)))
    }

    /// Enable `SO_KEEPALIVE`
    ///
    /// With `interval_secs > 0` the idle time before the first probe is the
    /// interval, probes are sent every third of it and the connection is
    /// dropped after three unanswered probes (where the platform supports
    /// tuning these). With `0` the platform timings are kept.
    pub fn enable_keep_alive(&self, interval_secs: u32) -> Result<()> {
        let socket = self.socket()?;
        socket.set_keepalive(true)?;

        if interval_secs == 0 {
            return Ok(());
        }

        let keepalive = TcpKeepalive::new().with_time(Duration::from_secs(u64::from(interval_secs)));
        #[cfg(any(target_os = "linux", target_os = "android"))]
        let keepalive = keepalive
            .with_interval(Duration::from_secs(u64::from((interval_secs / 3).max(1))))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;

        Ok(())
    }

    /// Whether `SO_KEEPALIVE` is currently set
    pub fn keep_alive_enabled(&self) -> Result<bool> {
        Ok(self.socket()?.keepalive()?)
    }

    /// Set `TCP_USER_TIMEOUT`; `0` restores the system default
    pub fn set_tcp_user_timeout(&self, timeout_ms: u32) -> Result<()> {
        apply_user_timeout(&self.socket()?, timeout_ms)
    }

    /// Current `TCP_USER_TIMEOUT`, `None` for the system default
    #[cfg(any(target_os = "android", target_os = "fuchsia", target_os = "linux"))]
    pub fn tcp_user_timeout(&self) -> Result<Option<Duration>> {
        Ok(self.socket()?.tcp_user_timeout()?)
    }
}

#[cfg(any(target_os = "android", target_os = "fuchsia", target_os = "linux"))]
fn apply_user_timeout(socket: &SockRef<'_>, timeout_ms: u32) -> Result<()> {
    let timeout = (timeout_ms > 0).then(|| Duration::from_millis(u64::from(timeout_ms)));
    socket.set_tcp_user_timeout(timeout)?;
    Ok(())
}

#[cfg(not(any(target_os = "android", target_os = "fuchsia", target_os = "linux")))]
fn apply_user_timeout(_socket: &SockRef<'_>, _timeout_ms: u32) -> Result<()> {
    Err(WireError::Io(io::Error::new(
        ErrorKind::Unsupported,
        "TCP user timeout is not supported on this platform",
    )))
}

fn connect_tcp(host: &str, port: u16, timeout: Option<Duration>) -> io::Result<TcpStream> {
    let Some(timeout) = timeout else {
        return TcpStream::connect((host, port));
    };

    // connect_timeout takes a single address, so try each resolved one
    let mut last_error = None;
    for addr in (host, port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_error = Some(e),
        }
    }

    Err(last_error.unwrap_or_else(|| {
        io::Error::new(
            ErrorKind::InvalidInput,
            format!("could not resolve {}:{}", host, port),
        )
    }))
}
