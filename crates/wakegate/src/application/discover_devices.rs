//! DiscoverDevicesUseCase: what devices and interfaces can the router see?
//!
//! Three read-only queries run back to back on one session:
//!
//! ```text
//! cat /tmp/dhcp.leases              ─► hostnames by MAC
//! ip neigh show dev <bridge>        ─► MAC + IP of recently seen devices
//! ubus call network.interface dump  ─► layer-3 interface names
//! ```
//!
//! The neighbor table decides which devices are offered; the lease table
//! only names them.  Only stdout is consumed.  A query that exits nonzero is
//! not an error by itself: its (usually empty) stdout is parsed like any
//! other, and an empty result ends in [`DiscoveryError::NoData`].

use thiserror::Error;
use tracing::{debug, info};
use wakegate_core::command::{neighbor_command, DEFAULT_BRIDGE, INTERFACES_COMMAND, LEASES_COMMAND};
use wakegate_core::parse::{parse_interfaces, parse_leases, parse_neighbors};
use wakegate_core::{build_candidates, CandidateDevice};

use super::remote::{RemoteSession, SessionError};

/// Tunables for a discovery run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Bridge whose neighbor table is read.
    pub neighbor_bridge: String,
    /// Interface offered when the dump yields none.
    pub fallback_interface: String,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            neighbor_bridge: DEFAULT_BRIDGE.to_string(),
            fallback_interface: DEFAULT_BRIDGE.to_string(),
        }
    }
}

/// Result of a successful discovery run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Ranked: named devices by hostname, then unnamed devices by MAC.
    pub candidates: Vec<CandidateDevice>,
    /// Distinct interface names, never empty.
    pub interfaces: Vec<String>,
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The router answered but there is nothing to offer.
    #[error("the router reported no usable devices or interfaces")]
    NoData,

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Runs the discovery queries on `session` and builds the report.
///
/// The session is left open; closing it is the caller's job.
///
/// # Errors
///
/// - [`DiscoveryError::Session`] as soon as any query fails at the transport
///   level; later queries are not attempted.
/// - [`DiscoveryError::NoData`] when any raw output is blank, or when no
///   neighbor or no interface survives parsing.
pub async fn discover(
    session: &mut dyn RemoteSession,
    options: &DiscoveryOptions,
) -> Result<DiscoveryReport, DiscoveryError> {
    let leases_raw = run(session, LEASES_COMMAND).await?;
    let neighbors_raw = run(session, &neighbor_command(&options.neighbor_bridge)).await?;
    let dump_raw = run(session, INTERFACES_COMMAND).await?;

    if [&leases_raw, &neighbors_raw, &dump_raw]
        .iter()
        .any(|raw| raw.trim().is_empty())
    {
        debug!("discovery: at least one query returned no output");
        return Err(DiscoveryError::NoData);
    }

    let leases = parse_leases(&leases_raw);
    let neighbors = parse_neighbors(&neighbors_raw);
    let interfaces = parse_interfaces(&dump_raw, &options.fallback_interface);

    if neighbors.is_empty() || interfaces.is_empty() {
        debug!(
            neighbors = neighbors.len(),
            interfaces = interfaces.len(),
            "discovery: nothing to offer"
        );
        return Err(DiscoveryError::NoData);
    }

    let candidates = build_candidates(&neighbors, &leases);
    info!(
        leases = leases.len(),
        candidates = candidates.len(),
        interfaces = interfaces.len(),
        "discovery complete"
    );

    Ok(DiscoveryReport {
        candidates,
        interfaces,
    })
}

async fn run(session: &mut dyn RemoteSession, command: &str) -> Result<String, SessionError> {
    let output = session.execute(command).await?;
    if !output.success() {
        debug!(
            command,
            exit_code = output.exit_code,
            stderr = %output.stderr_text().trim(),
            "query exited nonzero"
        );
    }
    Ok(output.stdout_text())
}
