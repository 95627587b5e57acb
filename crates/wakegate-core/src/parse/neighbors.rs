//! `ip neigh show` parser.
//!
//! ```text
//! 192.168.1.50 lladdr aa:bb:cc:dd:ee:ff REACHABLE
//! 192.168.1.51 dev br-lan lladdr 11:22:33:44:55:66 STALE
//! 192.168.1.52  FAILED
//! ```
//!
//! Only lines that start with an IPv4 address and carry an `lladdr` are
//! entries; `FAILED`/`INCOMPLETE` rows and IPv6 rows are ignored.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::device::NeighborEntry;

const NEIGHBOR_PATTERN: &str = r"^(\d+\.\d+\.\d+\.\d+).*lladdr ([0-9a-fA-F:]{17})";

fn neighbor_line() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(NEIGHBOR_PATTERN).ok()).as_ref()
}

/// Parses the neighbor table, one entry per distinct MAC.
///
/// When the same MAC appears on several lines the last IP wins, but the
/// entry keeps the position of its first appearance.
pub fn parse_neighbors(raw: &str) -> Vec<NeighborEntry> {
    let mut entries: Vec<NeighborEntry> = Vec::new();
    let mut index_by_mac: HashMap<String, usize> = HashMap::new();
    let Some(pattern) = neighbor_line() else {
        return entries;
    };

    for line in raw.lines() {
        let Some(caps) = pattern.captures(line.trim_start()) else {
            continue;
        };
        let ip = caps[1].to_string();
        let mac = caps[2].to_lowercase();

        match index_by_mac.get(&mac) {
            Some(&i) => entries[i].ip = ip,
            None => {
                index_by_mac.insert(mac.clone(), entries.len());
                entries.push(NeighborEntry { mac, ip });
            }
        }
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reachable_entry() {
        let entries = parse_neighbors("192.168.1.50 lladdr AA:BB:CC:DD:EE:FF REACHABLE\n");
        assert_eq!(
            entries,
            vec![NeighborEntry {
                mac: "aa:bb:cc:dd:ee:ff".to_string(),
                ip: "192.168.1.50".to_string(),
            }]
        );
    }

    #[test]
    fn test_lines_without_lladdr_are_skipped() {
        let raw = "192.168.1.52  FAILED\n\
                   fe80::1 lladdr aa:bb:cc:dd:ee:01 router STALE\n\
                   garbage\n\
                   192.168.1.51 dev br-lan lladdr 11:22:33:44:55:66 STALE\n";
        let entries = parse_neighbors(raw);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].mac, "11:22:33:44:55:66");
        assert_eq!(entries[0].ip, "192.168.1.51");
    }

    #[test]
    fn test_duplicate_mac_keeps_last_ip() {
        let raw = "10.0.0.2 lladdr aa:bb:cc:dd:ee:ff STALE\n\
                   10.0.0.3 lladdr 11:22:33:44:55:66 STALE\n\
                   10.0.0.9 lladdr aa:bb:cc:dd:ee:ff REACHABLE\n";
        let entries = parse_neighbors(raw);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].mac, "aa:bb:cc:dd:ee:ff");
        assert_eq!(entries[0].ip, "10.0.0.9");
    }

    #[test]
    fn test_pattern_compiles() {
        assert!(neighbor_line().is_some());
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_neighbors("").is_empty());
    }
}
