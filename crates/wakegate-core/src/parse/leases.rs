//! `/tmp/dhcp.leases` parser.
//!
//! dnsmasq writes one lease per line:
//!
//! ```text
//! <expiry> <mac> <ip> <hostname> <client-id>
//! 1700000000 aa:bb:cc:dd:ee:ff 192.168.1.50 nas 01:aa:bb:cc:dd:ee:ff
//! ```
//!
//! Hostnames the client never announced show up as `*` and are kept verbatim.

use crate::domain::device::LeaseEntry;

/// Parses the lease table.  Lines with fewer than four fields are skipped.
///
/// Entries are returned in file order; consumers that key by MAC should let
/// later entries win.
pub fn parse_leases(raw: &str) -> Vec<LeaseEntry> {
    raw.lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 4 {
                return None;
            }
            Some(LeaseEntry {
                mac: fields[1].to_lowercase(),
                hostname: fields[3].to_string(),
            })
        })
        .collect()
}
