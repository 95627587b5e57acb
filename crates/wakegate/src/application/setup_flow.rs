//! SetupFlow: the operations a configuration front-end drives.
//!
//! # Lifecycle (for beginners)
//!
//! ```text
//! credentials ──► begin_discovery_session ──► DiscoverySession
//!                        │                        │ find_candidate / candidates / interfaces
//!                        │                        ▼
//!                        │                  finalize_selection ──► DeviceRecord (persisted)
//!                        ▼                                               │
//!              SetupError::{NoData, SshFailed}                           ▼
//!                                                             trigger_wake(record)
//! ```
//!
//! A front-end (the CLI in this crate) only ever sees the two opaque setup
//! error codes `no_data` and `ssh_failed`, plus human-readable wake errors.
//! The detailed causes are logged.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use wakegate_core::{CandidateDevice, Credentials, DeviceRecord, DomainError, WakeTarget};

use super::discover_devices::{discover, DiscoveryError, DiscoveryOptions, DiscoveryReport};
use super::remote::{SessionConnector, SessionError};
use super::wake_device::{wake, WakeOutcome};

/// Remediation shown when the router lacks `etherwake`.
pub const TOOL_MISSING_MESSAGE: &str =
    "etherwake command not found on remote host. Please install it (e.g., opkg install etherwake).";

/// Error surfaced by [`SetupFlow::begin_discovery_session`].
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("no devices or interfaces found on the router")]
    NoData,
    #[error("could not query the router over SSH")]
    SshFailed(#[source] SessionError),
}

impl SetupError {
    /// Stable code for front-ends.
    pub fn code(&self) -> &'static str {
        match self {
            SetupError::NoData => "no_data",
            SetupError::SshFailed(_) => "ssh_failed",
        }
    }
}

/// A pick that does not belong to the discovery session it was made in.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("device {0} was not discovered")]
    UnknownCandidate(String),
    #[error("interface {0} was not discovered")]
    UnknownInterface(String),
}

/// Error surfaced by [`SetupFlow::trigger_wake`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WakeError {
    #[error("invalid device configuration: {0}")]
    InvalidRecord(#[from] DomainError),
    #[error("{}", TOOL_MISSING_MESSAGE)]
    ToolMissing,
    #[error("etherwake failed: {0}")]
    CommandFailed(String),
    #[error("Failed to wake device: {0}")]
    Transport(SessionError),
}

/// Discovery results for one set of credentials, ready for the user to pick
/// from.
#[derive(Debug, Clone)]
pub struct DiscoverySession {
    credentials: Credentials,
    report: DiscoveryReport,
}

impl DiscoverySession {
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Ranked candidates.
    pub fn candidates(&self) -> &[CandidateDevice] {
        &self.report.candidates
    }

    /// Interface names; the first is the suggested default.
    pub fn interfaces(&self) -> &[String] {
        &self.report.interfaces
    }

    /// Resolves a user's pick given as a label, a MAC (any case, `:` or `-`)
    /// or a hostname (case-insensitive).  Exact label matches win.
    pub fn find_candidate(&self, query: &str) -> Option<&CandidateDevice> {
        let query = query.trim();
        if let Some(found) = self.candidates().iter().find(|c| c.label() == query) {
            return Some(found);
        }

        let as_mac = query.replace('-', ":").to_lowercase();
        self.candidates().iter().find(|c| {
            c.mac == as_mac
                || c.hostname
                    .as_deref()
                    .is_some_and(|name| name.eq_ignore_ascii_case(query))
        })
    }

    /// Turns the user's pick into the record to persist.
    ///
    /// # Errors
    ///
    /// [`SelectionError`] when `candidate` or `interface` was not part of
    /// this session's results.
    pub fn finalize_selection(
        &self,
        candidate: &CandidateDevice,
        interface: &str,
    ) -> Result<DeviceRecord, SelectionError> {
        if !self.candidates().iter().any(|c| c.mac == candidate.mac) {
            return Err(SelectionError::UnknownCandidate(candidate.mac.clone()));
        }
        if !self.interfaces().iter().any(|i| i == interface) {
            return Err(SelectionError::UnknownInterface(interface.to_string()));
        }

        Ok(DeviceRecord {
            ssh_host: self.credentials.host().to_string(),
            ssh_user: self.credentials.username().to_string(),
            ssh_key_path: self.credentials.private_key_path().display().to_string(),
            device_name: candidate.display_name.clone(),
            device_mac: candidate.mac.clone(),
            device_interface: interface.to_string(),
        })
    }
}

/// Entry point for configuration front-ends.
pub struct SetupFlow {
    connector: Arc<dyn SessionConnector>,
    options: DiscoveryOptions,
}

impl SetupFlow {
    pub fn new(connector: Arc<dyn SessionConnector>, options: DiscoveryOptions) -> Self {
        Self { connector, options }
    }

    /// Connects with `credentials`, runs discovery and closes the session.
    ///
    /// # Errors
    ///
    /// [`SetupError::NoData`] when the router has nothing to offer,
    /// [`SetupError::SshFailed`] for every other failure.
    pub async fn begin_discovery_session(
        &self,
        credentials: Credentials,
    ) -> Result<DiscoverySession, SetupError> {
        let host = credentials.host().to_string();

        let mut session = self.connector.connect(&credentials).await.map_err(|e| {
            warn!(host = %host, "SSH connection failed: {e}");
            SetupError::SshFailed(e)
        })?;

        let result = discover(session.as_mut(), &self.options).await;
        session.close().await;

        match result {
            Ok(report) => {
                info!(
                    host = %host,
                    candidates = report.candidates.len(),
                    "discovery session ready"
                );
                Ok(DiscoverySession {
                    credentials,
                    report,
                })
            }
            Err(DiscoveryError::NoData) => {
                warn!(host = %host, "router returned no usable data");
                Err(SetupError::NoData)
            }
            Err(DiscoveryError::Session(e)) => {
                warn!(host = %host, "discovery failed: {e}");
                Err(SetupError::SshFailed(e))
            }
        }
    }

    /// Wakes the device a persisted record describes.
    ///
    /// # Errors
    ///
    /// A [`WakeError`] whose message is meant to be shown to the user as is.
    pub async fn trigger_wake(&self, record: &DeviceRecord) -> Result<(), WakeError> {
        let target = WakeTarget::try_from(record)?;

        match wake(self.connector.as_ref(), &target).await {
            WakeOutcome::Success { .. } => Ok(()),
            WakeOutcome::ToolMissing => Err(WakeError::ToolMissing),
            WakeOutcome::RemoteCommandFailed(text) => Err(WakeError::CommandFailed(text)),
            WakeOutcome::TransportError(e) => Err(WakeError::Transport(e)),
        }
    }
}
