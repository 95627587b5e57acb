//! Devices the router knows about, and the candidate list shown to the user.
//!
//! The router reports two independent views of its clients:
//!
//! - the DHCP lease table, which maps a MAC address to the hostname the
//!   client announced ([`LeaseEntry`]);
//! - the neighbor (ARP) table, which maps a MAC address to the IP address the
//!   router has recently talked to ([`NeighborEntry`]).
//!
//! Only devices present in the neighbor table become candidates.  The lease
//! table just decorates them with a name.
//!
//! # Ordering
//!
//! ```text
//! alpha   (aa:..)   ┐ named, by hostname (case-insensitive)
//! zeta    (cc:..)   ┘
//! 11:22:33:44:55:66 ┐ unnamed, by raw MAC string
//! ee:ff:00:11:22:33 ┘
//! ```
//!
//! Named devices are far easier to recognise, so they always come first.

use std::collections::HashMap;

/// One line of the DHCP lease table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseEntry {
    /// Lowercase MAC address.
    pub mac: String,
    /// Hostname exactly as written in the lease file.
    pub hostname: String,
}

/// One line of the neighbor table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborEntry {
    /// Lowercase MAC address.
    pub mac: String,
    /// IPv4 address the router associates with the MAC.
    pub ip: String,
}

/// Position of a candidate in the selection list.
///
/// The derived `Ord` compares the variant first (`Named` < `Unnamed`) and the
/// inner key second.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    /// Lowercased hostname.
    Named(String),
    /// Raw MAC string.
    Unnamed(String),
}

/// A device the user can pick as a wake target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateDevice {
    pub mac: String,
    /// Hostname when the lease table knows one, otherwise the MAC itself.
    pub display_name: String,
    pub hostname: Option<String>,
    pub ip: String,
    pub sort_key: SortKey,
}

impl CandidateDevice {
    /// Selection-list label: `"<mac> (<hostname>)"` or just `"<mac>"`.
    pub fn label(&self) -> String {
        match &self.hostname {
            Some(name) => format!("{} ({})", self.mac, name),
            None => self.mac.clone(),
        }
    }

    pub fn is_named(&self) -> bool {
        self.hostname.is_some()
    }
}

/// Joins neighbor entries against lease entries and ranks the result.
///
/// Every neighbor entry yields exactly one candidate.  When the lease table
/// lists the same MAC twice, the later line wins.
pub fn build_candidates(neighbors: &[NeighborEntry], leases: &[LeaseEntry]) -> Vec<CandidateDevice> {
    let hostnames: HashMap<&str, &str> = leases
        .iter()
        .map(|lease| (lease.mac.as_str(), lease.hostname.as_str()))
        .collect();

    let mut candidates: Vec<CandidateDevice> = neighbors
        .iter()
        .map(|neighbor| {
            let hostname = hostnames
                .get(neighbor.mac.as_str())
                .filter(|name| !name.is_empty())
                .map(|name| name.to_string());

            let sort_key = match &hostname {
                Some(name) => SortKey::Named(name.to_lowercase()),
                None => SortKey::Unnamed(neighbor.mac.clone()),
            };

            CandidateDevice {
                mac: neighbor.mac.clone(),
                display_name: hostname.clone().unwrap_or_else(|| neighbor.mac.clone()),
                hostname,
                ip: neighbor.ip.clone(),
                sort_key,
            }
        })
        .collect();

    // Stable sort: hostnames differing only in case keep their table order.
    candidates.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
    candidates
}
