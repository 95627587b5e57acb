//! Domain entities for wakegate.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! # What lives here?
//!
//! - **`credentials`** – How to log into the router (host, user, key path).
//! - **`device`** – Lease and neighbor entries reported by the router, and the
//!   ranked candidate list built from them.
//! - **`target`** – The persisted device record and the validated
//!   [`target::WakeTarget`] every wake action consumes.
//! - **`mac`** – MAC address and interface name validation.
//!
//! Code in the outer layers (the `wakegate` application and infrastructure)
//! depends on these types; nothing here depends on them.

pub mod credentials;
pub mod device;
pub mod mac;
pub mod target;
