//! Remote command strings.
//!
//! These are the only commands wakegate ever sends to the router.  The
//! discovery commands are read-only; the wake command emits one magic packet.

use crate::domain::target::WakeTarget;

/// DHCP lease table written by dnsmasq.
pub const LEASES_COMMAND: &str = "cat /tmp/dhcp.leases";

/// Logical interface dump, JSON on stdout.
pub const INTERFACES_COMMAND: &str = "ubus call network.interface dump";

/// Bridge whose neighbor table is queried during discovery.
pub const DEFAULT_BRIDGE: &str = "br-lan";

/// `ip neigh show dev <bridge>`.
pub fn neighbor_command(bridge: &str) -> String {
    format!("ip neigh show dev {bridge}")
}

/// `etherwake -D -i <interface> <mac>`.
///
/// `-D` makes etherwake print `Sendto worked` once the packet has left the
/// interface.  Both arguments come from a validated [`WakeTarget`].
pub fn wake_command(target: &WakeTarget) -> String {
    format!("etherwake -D -i {} {}", target.interface(), target.mac())
}
