//! Infrastructure layer.
//!
//! Contains the OS-facing adapters: the SSH transport and private key
//! loading (`remote`), and TOML configuration persistence (`storage`).
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `wakegate_core`, but MUST NOT be imported by the `application` layer.

pub mod remote;
pub mod storage;
