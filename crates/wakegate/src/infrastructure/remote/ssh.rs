//! SSH transport built on libssh2 (`ssh2` crate).
//!
//! libssh2 is a blocking library.  Every call that may touch the network
//! (TCP connect, handshake, authentication, exec, reads, disconnect) runs
//! inside `tokio::task::spawn_blocking`, so the async callers never block a
//! runtime worker.
//!
//! # Session ownership
//!
//! An [`SshSession`] keeps its `ssh2::Session` in an `Option`.  For each
//! command the session is moved onto the blocking pool and handed back when
//! the command finishes; a `None` therefore means "closed" (or lost to a
//! panicked worker), and further commands fail with
//! [`SessionError::Closed`].
//!
//! # Host keys
//!
//! | Policy       | Unknown host                | Mismatching known_hosts entry |
//! |--------------|-----------------------------|-------------------------------|
//! | `accept-new` | accepted for this session   | rejected                      |
//! | `strict`     | rejected                    | rejected                      |
//!
//! Accepted keys are never written to disk.  The SHA-256 fingerprint is
//! logged either way so the user can compare it with the router's.
//!
//! # Command output
//!
//! While a command runs the session is switched to non-blocking mode and
//! stdout and stderr are drained alternately until both reach EOF, bounded by
//! the command timeout.

use std::io::{self, Read};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use ssh2::{CheckResult, HashType, KnownHostFileKind, Session};
use tracing::{debug, info, warn};
use wakegate_core::{CommandOutput, Credentials, PrivateKey};

use super::keys::load_private_key;
use crate::application::remote::{RemoteSession, SessionConnector, SessionError};

/// How unknown router host keys are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostKeyPolicy {
    /// Trust an unseen key for the lifetime of the session.
    #[default]
    AcceptNew,
    /// Only accept keys listed in the configured known_hosts file.
    Strict,
}

/// Transport tunables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshOptions {
    /// Budget for TCP connect, handshake and authentication.
    pub connect_timeout: Duration,
    /// Budget for each blocking libssh2 call while a command runs.
    pub command_timeout: Duration,
    pub host_key_policy: HostKeyPolicy,
    pub known_hosts_file: Option<PathBuf>,
}

impl Default for SshOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            command_timeout: Duration::from_secs(30),
            host_key_policy: HostKeyPolicy::AcceptNew,
            known_hosts_file: None,
        }
    }
}

/// Opens authenticated SSH sessions with public key authentication.
#[derive(Debug, Clone, Default)]
pub struct SshConnector {
    options: SshOptions,
}

impl SshConnector {
    pub fn new(options: SshOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SshOptions {
        &self.options
    }
}

#[async_trait]
impl SessionConnector for SshConnector {
    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn RemoteSession>, SessionError> {
        let creds = credentials.clone();
        let options = self.options.clone();

        let session = tokio::task::spawn_blocking(move || open_session(&creds, &options))
            .await
            .map_err(|e| SessionError::Worker(e.to_string()))??;

        Ok(Box::new(SshSession {
            host: credentials.host().to_string(),
            session: Some(session),
        }))
    }
}

/// One open SSH connection to the router.
pub struct SshSession {
    host: String,
    session: Option<Session>,
}

impl SshSession {
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }
}

#[async_trait]
impl RemoteSession for SshSession {
    async fn execute(&mut self, command: &str) -> Result<CommandOutput, SessionError> {
        let session = self.session.take().ok_or(SessionError::Closed)?;
        let cmd = command.to_string();

        let (session, result) = tokio::task::spawn_blocking(move || {
            let result = run_command(&session, &cmd);
            (session, result)
        })
        .await
        .map_err(|e| SessionError::Worker(e.to_string()))?;

        self.session = Some(session);

        if let Ok(output) = &result {
            debug!(
                host = %self.host,
                command,
                exit_code = output.exit_code,
                stdout_bytes = output.stdout.len(),
                "remote command finished"
            );
        }
        result
    }

    async fn close(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let host = self.host.clone();

        let joined = tokio::task::spawn_blocking(move || {
            if let Err(e) = session.disconnect(None, "closing", None) {
                debug!(host = %host, "SSH disconnect: {e}");
            }
        })
        .await;

        if let Err(e) = joined {
            debug!(host = %self.host, "SSH disconnect task failed: {e}");
        }
        debug!(host = %self.host, "SSH session closed");
    }
}

// ── Blocking helpers (run on the blocking pool) ──────────────────────────────

fn open_session(credentials: &Credentials, options: &SshOptions) -> Result<Session, SessionError> {
    let label = credentials.host().to_string();
    let (host, port) = credentials.host_and_port();

    let key = load_private_key(credentials.private_key_path())?;

    let connect_err = |detail: String| SessionError::Connect {
        host: label.clone(),
        detail,
    };

    let tcp = connect_tcp(&host, port, options.connect_timeout).map_err(&connect_err)?;
    apply_socket_timeouts(&tcp, options.command_timeout).map_err(&connect_err)?;

    let mut sess = Session::new().map_err(|e| connect_err(format!("session init failed: {e}")))?;
    sess.set_tcp_stream(tcp);
    sess.set_timeout(millis(options.connect_timeout));
    sess.handshake()
        .map_err(|e| connect_err(format!("handshake failed: {e}")))?;

    verify_host_key(&sess, &host, port, options).map_err(|detail| SessionError::HostKey {
        host: label.clone(),
        detail,
    })?;

    let auth_err = |detail: String| SessionError::Auth {
        user: credentials.username().to_string(),
        host: label.clone(),
        detail,
    };
    authenticate(&sess, credentials.username(), &key, credentials.private_key_path())
        .map_err(|e| auth_err(e.to_string()))?;
    if !sess.authenticated() {
        return Err(auth_err("server did not accept the key".to_string()));
    }

    sess.set_timeout(millis(options.command_timeout));
    info!(host = %label, user = credentials.username(), "SSH session established");
    Ok(sess)
}

fn connect_tcp(host: &str, port: u16, timeout: Duration) -> Result<TcpStream, String> {
    let addrs = (host, port)
        .to_socket_addrs()
        .map_err(|e| format!("cannot resolve {host}:{port}: {e}"))?;

    let mut last_error = format!("{host}:{port} resolved to no addresses");
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                debug!(%addr, "TCP connect failed: {e}");
                last_error = format!("connect to {addr} failed: {e}");
            }
        }
    }
    Err(last_error)
}

fn apply_socket_timeouts(tcp: &TcpStream, timeout: Duration) -> Result<(), String> {
    tcp.set_read_timeout(Some(timeout))
        .map_err(|e| format!("cannot set socket read timeout: {e}"))?;
    tcp.set_write_timeout(Some(timeout))
        .map_err(|e| format!("cannot set socket write timeout: {e}"))
}

fn verify_host_key(sess: &Session, host: &str, port: u16, options: &SshOptions) -> Result<(), String> {
    let (key, _) = sess
        .host_key()
        .ok_or_else(|| "server sent no host key".to_string())?;
    let fingerprint = sess
        .host_key_hash(HashType::Sha256)
        .map(|hash| format!("SHA256:{}", STANDARD_NO_PAD.encode(hash)))
        .unwrap_or_else(|| "unavailable".to_string());

    let status = match &options.known_hosts_file {
        Some(path) => check_known_hosts(sess, path, host, port, key)?,
        None => CheckResult::NotFound,
    };

    match status {
        CheckResult::Match => {
            debug!(host, %fingerprint, "host key matches known_hosts");
            Ok(())
        }
        CheckResult::Mismatch => Err(format!(
            "host key {fingerprint} does not match the known_hosts entry"
        )),
        CheckResult::NotFound | CheckResult::Failure => match options.host_key_policy {
            HostKeyPolicy::AcceptNew => {
                info!(host, %fingerprint, "accepting host key for this session");
                Ok(())
            }
            HostKeyPolicy::Strict => Err(format!(
                "host key {fingerprint} is not in known_hosts and strict checking is enabled"
            )),
        },
    }
}

fn check_known_hosts(
    sess: &Session,
    path: &Path,
    host: &str,
    port: u16,
    key: &[u8],
) -> Result<CheckResult, String> {
    let mut known = sess
        .known_hosts()
        .map_err(|e| format!("cannot initialise known_hosts: {e}"))?;
    if let Err(e) = known.read_file(path, KnownHostFileKind::OpenSSH) {
        warn!(path = %path.display(), "cannot read known_hosts: {e}");
    }
    Ok(known.check_port(host, port, key))
}

#[cfg(unix)]
fn authenticate(sess: &Session, user: &str, key: &PrivateKey, _path: &Path) -> Result<(), ssh2::Error> {
    sess.userauth_pubkey_memory(user, None, &key.pem, None)
}

#[cfg(not(unix))]
fn authenticate(sess: &Session, user: &str, _key: &PrivateKey, path: &Path) -> Result<(), ssh2::Error> {
    sess.userauth_pubkey_file(user, None, path, None)
}

fn run_command(sess: &Session, command: &str) -> Result<CommandOutput, SessionError> {
    let exec_err = |detail: String| SessionError::Exec {
        command: command.to_string(),
        detail,
    };

    let mut channel = sess
        .channel_session()
        .map_err(|e| exec_err(format!("channel open failed: {e}")))?;
    channel
        .exec(command)
        .map_err(|e| exec_err(format!("exec failed: {e}")))?;

    // libssh2 reports 0 for "no timeout".
    let timeout = Some(sess.timeout()).filter(|ms| *ms > 0).map(|ms| Duration::from_millis(u64::from(ms)));
    sess.set_blocking(false);
    let streams = read_streams(&mut channel, timeout);
    sess.set_blocking(true);
    let (stdout, stderr) = streams.map_err(|e| exec_err(format!("read failed: {e}")))?;

    channel
        .wait_close()
        .map_err(|e| exec_err(format!("close failed: {e}")))?;
    let exit_code = channel
        .exit_status()
        .map_err(|e| exec_err(format!("no exit status: {e}")))?;

    Ok(CommandOutput {
        stdout,
        stderr,
        exit_code,
    })
}

/// The two output streams of a running command.
trait CommandStreams {
    fn read_stdout(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    fn read_stderr(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl CommandStreams for ssh2::Channel {
    fn read_stdout(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read(buf)
    }

    fn read_stderr(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stderr().read(buf)
    }
}

const IDLE_POLL: Duration = Duration::from_millis(10);

/// Reads both streams to EOF, alternating between them.
///
/// `WouldBlock` on one stream moves on to the other; when neither made
/// progress the loop sleeps for [`IDLE_POLL`].  Fails with `TimedOut` once
/// `timeout` has elapsed without both streams finishing.
fn read_streams<S: CommandStreams>(streams: &mut S, timeout: Option<Duration>) -> io::Result<(Vec<u8>, Vec<u8>)> {
    let deadline = timeout.map(|t| Instant::now() + t);
    let mut buf = [0u8; 8192];
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut stdout_done = false;
    let mut stderr_done = false;

    while !(stdout_done && stderr_done) {
        let mut progressed = false;
        if !stdout_done {
            progressed |= pump(streams.read_stdout(&mut buf), &buf, &mut stdout, &mut stdout_done)?;
        }
        if !stderr_done {
            progressed |= pump(streams.read_stderr(&mut buf), &buf, &mut stderr, &mut stderr_done)?;
        }

        if !progressed {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "command output timed out"));
            }
            std::thread::sleep(IDLE_POLL);
        }
    }

    Ok((stdout, stderr))
}

/// Applies one read result; returns whether anything changed.
fn pump(result: io::Result<usize>, buf: &[u8], sink: &mut Vec<u8>, done: &mut bool) -> io::Result<bool> {
    match result {
        Ok(0) => {
            *done = true;
            Ok(true)
        }
        Ok(n) => {
            sink.extend_from_slice(&buf[..n]);
            Ok(true)
        }
        Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted) => Ok(false),
        Err(e) => Err(e),
    }
}

fn millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}
