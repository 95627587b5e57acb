//! Parsers for the raw text the router prints.
//!
//! Each parser is total: malformed lines are skipped, never reported, so a
//! half-garbled table still yields whatever entries it does contain.

pub mod interfaces;
pub mod leases;
pub mod neighbors;

pub use interfaces::{parse_interfaces, LOOPBACK_NAMES};
pub use leases::parse_leases;
pub use neighbors::parse_neighbors;
