//! Scripted remote sessions for testing.
//!
//! Allows tests to stand in for a router without a network: each command is
//! answered from a table, and everything the code under test did (connects,
//! commands, closes) is recorded for later assertions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use wakegate_core::{CommandOutput, Credentials};

use crate::application::remote::{RemoteSession, SessionConnector, SessionError};

#[derive(Default)]
struct Script {
    responses: HashMap<String, Result<CommandOutput, SessionError>>,
    connect_error: Option<SessionError>,
    connected_hosts: Vec<String>,
    executed: Vec<String>,
    closes: usize,
}

/// A [`SessionConnector`] whose sessions answer from a fixed table.
///
/// Clones share the same script and the same recordings.
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    script: Arc<Mutex<Script>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `command` with `output` on every session.
    pub fn respond(self, command: impl Into<String>, output: CommandOutput) -> Self {
        self.lock().responses.insert(command.into(), Ok(output));
        self
    }

    /// Shorthand for a command that exits 0 with `stdout`.
    pub fn respond_ok(self, command: impl Into<String>, stdout: &str) -> Self {
        self.respond(command, CommandOutput::new(stdout, "", 0))
    }

    /// Fails `command` at the transport level.
    pub fn respond_with_error(self, command: impl Into<String>, error: SessionError) -> Self {
        self.lock().responses.insert(command.into(), Err(error));
        self
    }

    /// Makes every connection attempt fail with `error`.
    pub fn fail_connect(self, error: SessionError) -> Self {
        self.lock().connect_error = Some(error);
        self
    }

    /// Hosts passed to `connect`, in call order (failed attempts included).
    pub fn connected_hosts(&self) -> Vec<String> {
        self.lock().connected_hosts.clone()
    }

    /// Commands executed across all sessions, in order.
    pub fn executed(&self) -> Vec<String> {
        self.lock().executed.clone()
    }

    /// Number of sessions that were closed.
    pub fn closes(&self) -> usize {
        self.lock().closes
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SessionConnector for ScriptedConnector {
    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn RemoteSession>, SessionError> {
        let mut script = self.lock();
        script.connected_hosts.push(credentials.host().to_string());
        if let Some(error) = &script.connect_error {
            return Err(error.clone());
        }
        Ok(Box::new(ScriptedSession {
            connector: self.clone(),
            closed: false,
        }))
    }
}

/// A session handed out by [`ScriptedConnector`].
pub struct ScriptedSession {
    connector: ScriptedConnector,
    closed: bool,
}

#[async_trait]
impl RemoteSession for ScriptedSession {
    async fn execute(&mut self, command: &str) -> Result<CommandOutput, SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }
        let mut script = self.connector.lock();
        script.executed.push(command.to_string());
        script
            .responses
            .get(command)
            .cloned()
            .unwrap_or_else(|| {
                Err(SessionError::Exec {
                    command: command.to_string(),
                    detail: "no scripted response".to_string(),
                })
            })
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.connector.lock().closes += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials::new("192.168.1.1", "root", "/keys/id").unwrap()
    }

    #[tokio::test]
    async fn test_scripted_session_answers_and_records() {
        // Arrange
        let connector = ScriptedConnector::new().respond_ok("uname", "Linux\n");
        let mut session = connector.connect(&creds()).await.unwrap();

        // Act
        let output = session.execute("uname").await.unwrap();

        // Assert
        assert_eq!(output.stdout_text(), "Linux\n");
        assert_eq!(connector.executed(), vec!["uname".to_string()]);
        assert_eq!(connector.connected_hosts(), vec!["192.168.1.1".to_string()]);
    }

    #[tokio::test]
    async fn test_unscripted_command_is_exec_error() {
        let connector = ScriptedConnector::new();
        let mut session = connector.connect(&creds()).await.unwrap();

        let err = session.execute("reboot").await.unwrap_err();

        assert!(matches!(err, SessionError::Exec { .. }));
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_blocks_commands() {
        // Arrange
        let connector = ScriptedConnector::new().respond_ok("true", "");
        let mut session = connector.connect(&creds()).await.unwrap();

        // Act
        session.close().await;
        session.close().await;
        let result = session.execute("true").await;

        // Assert
        assert_eq!(connector.closes(), 1);
        assert_eq!(result.unwrap_err(), SessionError::Closed);
        assert!(connector.executed().is_empty());
    }

    #[tokio::test]
    async fn test_fail_connect() {
        let connector = ScriptedConnector::new().fail_connect(SessionError::Connect {
            host: "192.168.1.1".to_string(),
            detail: "no route to host".to_string(),
        });

        let result = connector.connect(&creds()).await;

        assert!(result.is_err());
        assert_eq!(connector.connected_hosts().len(), 1);
    }
}
