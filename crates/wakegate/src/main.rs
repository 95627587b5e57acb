//! wakegate command-line entry point.
//!
//! Wakes sleeping machines on a home network by asking an OpenWrt router,
//! over SSH, to send the Wake-on-LAN packet for them.
//!
//! # Usage
//!
//! ```text
//! wakegate [--config <PATH>] <COMMAND>
//!
//! Commands:
//!   discover  List the devices and interfaces the router can see
//!   add       Discover, pick a device and save it
//!   list      Show saved devices
//!   wake      Wake a saved device
//!   remove    Forget a saved device
//! ```
//!
//! A typical first run:
//!
//! ```text
//! wakegate discover --host 192.168.1.1 --key ~/.ssh/id_ed25519
//! wakegate add --host 192.168.1.1 --key ~/.ssh/id_ed25519 --device nas
//! wakegate wake nas
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable          | Description                                     |
//! |-------------------|-------------------------------------------------|
//! | `WAKEGATE_CONFIG` | Config file path (instead of the platform dir)  |
//! | `RUST_LOG`        | Log filter; wins over `settings.log_level`      |

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use wakegate::application::setup_flow::{DiscoverySession, SetupFlow};
use wakegate::infrastructure::remote::SshConnector;
use wakegate::infrastructure::storage::config::{config_file_path, load_config_from, save_config_to};
use wakegate_core::Credentials;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Wake LAN devices through an OpenWrt router.
#[derive(Debug, Parser)]
#[command(name = "wakegate", version)]
struct Cli {
    /// Configuration file.  Defaults to `config.toml` in the platform config
    /// directory.
    #[arg(long, global = true, env = "WAKEGATE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the devices and interfaces the router can see.
    Discover {
        #[command(flatten)]
        login: LoginArgs,
    },
    /// Discover, then save one device as a wake target.
    Add {
        #[command(flatten)]
        login: LoginArgs,
        /// Device to save: its label, MAC address or hostname.
        #[arg(long)]
        device: String,
        /// Interface to send the packet on.  Defaults to the first one found.
        #[arg(long)]
        interface: Option<String>,
    },
    /// Show saved devices.
    List,
    /// Wake a saved device.
    Wake {
        /// Name or MAC address of a saved device.
        device: String,
    },
    /// Forget a saved device.
    Remove {
        /// Name or MAC address of a saved device.
        device: String,
    },
}

/// How to log into the router.
#[derive(Debug, Args)]
struct LoginArgs {
    /// Router address, optionally with `:port`.
    #[arg(long)]
    host: String,
    /// SSH user.
    #[arg(long, default_value = "root")]
    user: String,
    /// Private key file (OpenSSH or PEM RSA, unencrypted).
    #[arg(long)]
    key: PathBuf,
}

impl LoginArgs {
    fn credentials(&self) -> anyhow::Result<Credentials> {
        Credentials::new(&self.host, &self.user, &self.key).context("invalid login arguments")
    }
}

fn resolve_config_path(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => config_file_path().context("pass --config or set WAKEGATE_CONFIG"),
    }
}

/// `RUST_LOG` wins, then the configured level, then `info`.
fn log_filter(configured_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// The requested interface, or the first discovered one.
fn pick_interface(session: &DiscoverySession, requested: Option<&str>) -> anyhow::Result<String> {
    match requested {
        Some(name) => Ok(name.to_string()),
        None => session
            .interfaces()
            .first()
            .cloned()
            .context("the router reported no interfaces"),
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = resolve_config_path(cli.config)?;
    let mut config = load_config_from(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&config.settings.log_level))
        .init();

    let flow = SetupFlow::new(
        Arc::new(SshConnector::new(config.settings.ssh_options())),
        config.settings.discovery_options(),
    );

    match cli.command {
        Command::Discover { login } => {
            let session = flow
                .begin_discovery_session(login.credentials()?)
                .await
                .map_err(|e| anyhow::anyhow!("discovery failed ({}): {e}", e.code()))?;

            println!("Devices:");
            for candidate in session.candidates() {
                println!("  {:<40} {}", candidate.label(), candidate.ip);
            }
            println!("Interfaces:");
            for interface in session.interfaces() {
                println!("  {interface}");
            }
        }

        Command::Add {
            login,
            device,
            interface,
        } => {
            let session = flow
                .begin_discovery_session(login.credentials()?)
                .await
                .map_err(|e| anyhow::anyhow!("discovery failed ({}): {e}", e.code()))?;

            let Some(candidate) = session.find_candidate(&device) else {
                bail!("no discovered device matches '{device}'");
            };
            let interface = pick_interface(&session, interface.as_deref())?;
            let record = session.finalize_selection(candidate, &interface)?;

            println!("Saved {} ({})", record.title(), record.unique_id());
            config.upsert_device(record);
            save_config_to(&config_path, &config)
                .with_context(|| format!("failed to save {}", config_path.display()))?;
        }

        Command::List => {
            if config.devices.is_empty() {
                println!("No devices configured.");
            }
            for record in &config.devices {
                println!("{}  [{}]", record.title(), record.unique_id());
            }
        }

        Command::Wake { device } => {
            let Some(record) = config.find_device(&device) else {
                bail!("no saved device matches '{device}'");
            };
            flow.trigger_wake(record).await?;
            info!(device = record.display_name(), "wake request delivered");
            println!("Sent wake-on-LAN packet to {}", record.display_name());
        }

        Command::Remove { device } => {
            let Some(record) = config.remove_device(&device) else {
                bail!("no saved device matches '{device}'");
            };
            save_config_to(&config_path, &config)
                .with_context(|| format!("failed to save {}", config_path.display()))?;
            println!("Removed {}", record.title());
        }
    }

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
