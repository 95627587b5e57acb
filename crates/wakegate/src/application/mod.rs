//! Application layer use cases.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure business rules in `wakegate-core`) and the infrastructure (SSH,
//! files).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain objects to fulfil a user goal (e.g., "find the
//!   devices the router can see" or "wake this device").
//! - **Depend on abstractions** (the [`remote::RemoteSession`] and
//!   [`remote::SessionConnector`] traits) rather than on the SSH library, so
//!   tests can script the router's answers.
//! - **Contain no socket or file system access**.
//!
//! # Sub-modules
//!
//! - **`remote`** – The session traits and their error type.
//!
//! - **`discover_devices`** – Runs the three read-only router queries on one
//!   session and turns their output into a ranked candidate list.
//!
//! - **`wake_device`** – Opens a session, runs `etherwake` once, closes the
//!   session and classifies what happened.
//!
//! - **`setup_flow`** – The surface a configuration front-end drives: start a
//!   discovery session, turn a pick into a persisted record, trigger a wake.

pub mod discover_devices;
pub mod remote;
pub mod setup_flow;
pub mod wake_device;
