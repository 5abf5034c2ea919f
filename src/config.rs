//! Configuration for kvwire clients
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

use crate::error::{Result, WireError};

/// Main configuration for a kvwire client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    // -------------------------------------------------------------------------
    // Target
    // -------------------------------------------------------------------------
    /// Server host name or IP address
    pub host: String,

    /// Server TCP port
    pub port: u16,

    // -------------------------------------------------------------------------
    // Authentication
    // -------------------------------------------------------------------------
    /// Credentials sent with `AUTH` right after connecting
    pub credentials: Option<Credentials>,

    // -------------------------------------------------------------------------
    // Socket Options
    // -------------------------------------------------------------------------
    /// TCP keep-alive behaviour
    pub keep_alive: KeepAlive,

    /// TCP user timeout (milliseconds), Linux-family only
    pub tcp_user_timeout_ms: Option<u32>,

    /// Connect timeout (milliseconds); `None` blocks until the OS gives up
    pub connect_timeout_ms: Option<u64>,
}

/// Username/password pair for `AUTH`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// ACL user; `None` sends the single-argument `AUTH <password>` form
    pub user: Option<String>,

    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            password: password.into(),
        }
    }

    /// Credentials for servers that only have a global password
    pub fn password_only(password: impl Into<String>) -> Self {
        Self {
            user: None,
            password: password.into(),
        }
    }

    /// The `AUTH` command line for these credentials
    pub fn auth_command(&self) -> String {
        match &self.user {
            Some(user) => format!("AUTH {} {}", user, self.password),
            None => format!("AUTH {}", self.password),
        }
    }
}

/// TCP keep-alive setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeepAlive {
    /// Leave `SO_KEEPALIVE` untouched
    #[default]
    Disabled,

    /// Enable `SO_KEEPALIVE` with the platform's probe timings
    PlatformDefault,

    /// Enable keep-alive with the given probe interval (seconds)
    Interval(u32),
}

impl KeepAlive {
    /// Map the `interval = 0` convention onto a setting
    pub fn from_interval(interval_secs: u32) -> Self {
        if interval_secs > 0 {
            KeepAlive::Interval(interval_secs)
        } else {
            KeepAlive::PlatformDefault
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            credentials: None,
            keep_alive: KeepAlive::Disabled,
            tcp_user_timeout_ms: None,
            connect_timeout_ms: None,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Connect timeout as a `Duration`, if one is configured
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    /// Reject settings that can never produce a connection
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(WireError::Config("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(WireError::Config("port must be non-zero".to_string()));
        }
        if self.connect_timeout_ms == Some(0) {
            return Err(WireError::Config(
                "connect timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the server host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Authenticate as `user` right after connecting
    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.credentials = Some(Credentials::new(user, password));
        self
    }

    /// Authenticate with a password only
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.credentials = Some(Credentials::password_only(password));
        self
    }

    /// Set the keep-alive behaviour
    pub fn keep_alive(mut self, keep_alive: KeepAlive) -> Self {
        self.config.keep_alive = keep_alive;
        self
    }

    /// Set the TCP user timeout (in milliseconds)
    pub fn tcp_user_timeout_ms(mut self, ms: u32) -> Self {
        self.config.tcp_user_timeout_ms = Some(ms);
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = Some(ms);
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

