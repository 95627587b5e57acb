//! Router login credentials.
//!
//! [`Credentials`] are immutable once built: the fields are private and only
//! exposed through getters, and every constructor validates its input.  The
//! private key itself is never held here, only the path to it; the key file
//! is read by the transport each time a session is opened.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Default SSH port used when the host string carries no `:port` suffix.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Validation errors raised when constructing domain entities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("SSH host must not be empty")]
    EmptyHost,
    #[error("SSH user must not be empty")]
    EmptyUser,
    #[error("SSH key path must not be empty")]
    EmptyKeyPath,
    #[error("invalid MAC address: '{0}'")]
    InvalidMac(String),
    #[error("invalid interface name: '{0}'")]
    InvalidInterface(String),
}

/// How to reach and authenticate against the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    host: String,
    username: String,
    private_key_path: PathBuf,
}

impl Credentials {
    /// Creates credentials after trimming and validating every field.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyHost`], [`DomainError::EmptyUser`] or
    /// [`DomainError::EmptyKeyPath`] when the corresponding field is blank.
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        private_key_path: impl Into<PathBuf>,
    ) -> Result<Self, DomainError> {
        let host = host.into().trim().to_string();
        let username = username.into().trim().to_string();
        let private_key_path = private_key_path.into();

        if host.is_empty() {
            return Err(DomainError::EmptyHost);
        }
        if username.is_empty() {
            return Err(DomainError::EmptyUser);
        }
        if private_key_path.as_os_str().is_empty() {
            return Err(DomainError::EmptyKeyPath);
        }

        Ok(Self {
            host,
            username,
            private_key_path,
        })
    }

    /// The host as configured, possibly including a `:port` suffix.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn private_key_path(&self) -> &Path {
        &self.private_key_path
    }

    /// Splits the configured host into a hostname and a port.
    ///
    /// `"router.lan:2222"` yields `("router.lan", 2222)`; a host without a
    /// numeric suffix (including bare IPv6 literals) uses port 22.  Bracketed
    /// IPv6 literals such as `"[fe80::1]:2222"` are unwrapped.
    pub fn host_and_port(&self) -> (String, u16) {
        if let Some(rest) = self.host.strip_prefix('[') {
            if let Some((addr, tail)) = rest.split_once(']') {
                let port = tail
                    .strip_prefix(':')
                    .and_then(|p| p.parse::<u16>().ok())
                    .unwrap_or(DEFAULT_SSH_PORT);
                return (addr.to_string(), port);
            }
        }

        // More than one colon without brackets is an IPv6 literal, not host:port.
        if self.host.matches(':').count() == 1 {
            if let Some((host, port)) = self.host.rsplit_once(':') {
                if let Ok(port) = port.parse::<u16>() {
                    return (host.to_string(), port);
                }
            }
        }

        (self.host.clone(), DEFAULT_SSH_PORT)
    }
}
