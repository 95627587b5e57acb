//! WakeDeviceUseCase: ask the router to send one magic packet.
//!
//! Each call opens its own session, runs `etherwake` exactly once and closes
//! the session again, whatever happened in between.  Nothing is cached or
//! retried: two calls send two packets.

use tracing::{error, info, warn};
use wakegate_core::command::wake_command;
use wakegate_core::{classify_wake, WakeClassification, WakeTarget};

use super::remote::{SessionConnector, SessionError};

/// Final result of a wake attempt.  Returned, never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WakeOutcome {
    /// `etherwake` exited 0.  `confirmed` when it printed `Sendto worked`.
    Success { confirmed: bool },
    /// The router has no `etherwake`.
    ToolMissing,
    /// `etherwake` failed for another reason.
    RemoteCommandFailed(String),
    /// The session could not be opened or the command could not run.
    TransportError(SessionError),
}

impl WakeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, WakeOutcome::Success { .. })
    }
}

/// Wakes `target` through the router described by its credentials.
pub async fn wake(connector: &dyn SessionConnector, target: &WakeTarget) -> WakeOutcome {
    let host = target.credentials().host();

    let mut session = match connector.connect(target.credentials()).await {
        Ok(session) => session,
        Err(e) => {
            error!(host, mac = target.mac(), "failed to wake device: {e}");
            return WakeOutcome::TransportError(e);
        }
    };

    let command = wake_command(target);
    let result = session.execute(&command).await;
    session.close().await;

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            error!(host, mac = target.mac(), "failed to wake device: {e}");
            return WakeOutcome::TransportError(e);
        }
    };

    match classify_wake(&output) {
        WakeClassification::Sent { confirmed } => {
            if confirmed {
                info!(
                    host,
                    mac = target.mac(),
                    interface = target.interface(),
                    "wake-on-LAN packet sent"
                );
            } else {
                info!(host, mac = target.mac(), "etherwake exited cleanly without confirmation");
            }
            WakeOutcome::Success { confirmed }
        }
        WakeClassification::ToolMissing => {
            warn!(host, "etherwake is not installed on the router");
            WakeOutcome::ToolMissing
        }
        WakeClassification::Failed(text) => {
            warn!(host, mac = target.mac(), exit_code = output.exit_code, "etherwake failed: {text}");
            WakeOutcome::RemoteCommandFailed(text)
        }
    }
}
