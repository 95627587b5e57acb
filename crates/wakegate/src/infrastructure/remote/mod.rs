//! Remote session infrastructure.
//!
//! - **`ssh`** – The production [`SessionConnector`](crate::application::remote::SessionConnector):
//!   libssh2 over a blocking TCP stream, every blocking call moved onto
//!   Tokio's blocking thread pool.
//! - **`keys`** – Reads the private key file and checks its encoding before
//!   any connection attempt.
//! - **`mock`** – A scripted connector that answers commands from a table,
//!   for tests that need a router without a network.

pub mod keys;
pub mod mock;
pub mod ssh;

pub use mock::{ScriptedConnector, ScriptedSession};
pub use ssh::{HostKeyPolicy, SshConnector, SshOptions, SshSession};
