//! Remote session abstraction.
//!
//! A session is one authenticated channel to the router.  It is opened for a
//! single discovery run or a single wake, used sequentially, and closed.

use async_trait::async_trait;
use thiserror::Error;
use wakegate_core::{CommandOutput, Credentials, KeyLoadError};

/// Why a session could not be opened or a command could not run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("failed to load private key: {0}")]
    KeyLoad(#[from] KeyLoadError),

    #[error("cannot connect to {host}: {detail}")]
    Connect { host: String, detail: String },

    #[error("host key verification failed for {host}: {detail}")]
    HostKey { host: String, detail: String },

    #[error("authentication failed for {user}@{host}: {detail}")]
    Auth {
        user: String,
        host: String,
        detail: String,
    },

    #[error("command `{command}` failed: {detail}")]
    Exec { command: String, detail: String },

    #[error("session is closed")]
    Closed,

    #[error("SSH worker task failed: {0}")]
    Worker(String),
}

impl SessionError {
    /// `true` for errors raised while opening the session, before any
    /// command ran.
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            SessionError::KeyLoad(_)
                | SessionError::Connect { .. }
                | SessionError::HostKey { .. }
                | SessionError::Auth { .. }
        )
    }
}

/// An open, authenticated channel to the router.
///
/// Commands run in the order they are issued; a session is never shared
/// between tasks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteSession: Send {
    /// Runs `command` and captures its stdout, stderr and exit status.
    ///
    /// A nonzero exit status is not an error here; callers decide what it
    /// means.
    async fn execute(&mut self, command: &str) -> Result<CommandOutput, SessionError>;

    /// Closes the session.  Idempotent, never fails.
    async fn close(&mut self);
}

/// Opens sessions.  Implemented by the SSH transport and by test doubles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionConnector: Send + Sync {
    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn RemoteSession>, SessionError>;
}
