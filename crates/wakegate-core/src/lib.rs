//! # wakegate-core
//!
//! Shared library for wakegate containing the domain entities, the parsers for
//! the router's command output, the remote command strings, and the rules that
//! turn a remote `etherwake` run into a wake outcome.
//!
//! This crate has zero dependencies on sockets, SSH, files or async runtimes.
//!
//! # Architecture overview (for beginners)
//!
//! wakegate wakes sleeping machines on a home network.  It does not craft the
//! Wake-on-LAN packet itself: it logs into the router over SSH and asks the
//! router to run `etherwake`, because the router sits on the same Ethernet
//! segment as the sleeping machine.
//!
//! This crate (`wakegate-core`) is the pure foundation.  It defines:
//!
//! - **`domain`** – Credentials, persisted device records, wake targets, and
//!   the candidate list built from what the router knows about its clients.
//!
//! - **`parse`** – Turns the raw text of `cat /tmp/dhcp.leases`,
//!   `ip neigh show` and `ubus call network.interface dump` into typed entries.
//!
//! - **`command`** – The exact remote command strings the router understands.
//!
//! - **`outcome`** – Captured remote output and the classification of an
//!   `etherwake` run (sent, tool missing, failed).
//!
//! - **`keys`** – Recognises the two supported private key encodings.

pub mod command;
pub mod domain;
pub mod keys;
pub mod outcome;
pub mod parse;

pub use domain::credentials::{Credentials, DomainError};
pub use domain::device::{build_candidates, CandidateDevice, LeaseEntry, NeighborEntry, SortKey};
pub use domain::target::{DeviceRecord, WakeTarget};
pub use keys::{parse_private_key, KeyFormat, KeyLoadError, PrivateKey};
pub use outcome::{classify_wake, CommandOutput, WakeClassification};
