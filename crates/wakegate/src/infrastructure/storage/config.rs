//! TOML-based configuration persistence.
//!
//! Reads and writes [`AppConfig`] to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\Wakegate\config.toml`
//! - Linux:    `~/.config/wakegate/config.toml`
//! - macOS:    `~/Library/Application Support/Wakegate/config.toml`
//!
//! The CLI can point at any other file with `--config` (or the
//! `WAKEGATE_CONFIG` environment variable); [`load_config_from`] and
//! [`save_config_to`] take that path explicitly.
//!
//! # File layout
//!
//! ```toml
//! [settings]
//! version = "2"
//! log_level = "info"
//! connect_timeout_secs = 10
//! command_timeout_secs = 30
//! host_key_policy = "accept-new"
//! neighbor_bridge = "br-lan"
//! fallback_interface = "br-lan"
//!
//! [[devices]]
//! ssh_host = "192.168.1.1"
//! ssh_user = "root"
//! ssh_key_path = "/home/me/.ssh/id_ed25519"
//! device_name = "nas"
//! device_mac = "aa:bb:cc:dd:ee:ff"
//! device_interface = "br-lan"
//! ```
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent from the TOML file, so an empty
//! file (or none at all) is a valid configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wakegate_core::command::DEFAULT_BRIDGE;
use wakegate_core::domain::mac::normalize_mac;
use wakegate_core::DeviceRecord;

use crate::application::discover_devices::DiscoveryOptions;
use crate::infrastructure::remote::ssh::{HostKeyPolicy, SshOptions};

/// Schema version written to new files.
pub const CONFIG_VERSION: &str = "2";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub devices: Vec<DeviceRecord>,
}

/// Connection and discovery behaviour shared by every device.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Schema version string – bump when breaking changes are introduced.
    #[serde(default = "default_version")]
    pub version: String,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// TCP connect plus SSH handshake budget.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Budget for a single remote command.
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
    #[serde(default)]
    pub host_key_policy: HostKeyPolicy,
    /// OpenSSH `known_hosts` file to check router keys against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_hosts_file: Option<PathBuf>,
    /// Bridge whose neighbor table discovery reads.
    #[serde(default = "default_bridge")]
    pub neighbor_bridge: String,
    /// Interface offered when the router lists none.
    #[serde(default = "default_bridge")]
    pub fallback_interface: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_version() -> String {
    CONFIG_VERSION.to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_connect_timeout_secs() -> u64 {
    10
}
fn default_command_timeout_secs() -> u64 {
    30
}
fn default_bridge() -> String {
    DEFAULT_BRIDGE.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            log_level: default_log_level(),
            connect_timeout_secs: default_connect_timeout_secs(),
            command_timeout_secs: default_command_timeout_secs(),
            host_key_policy: HostKeyPolicy::default(),
            known_hosts_file: None,
            neighbor_bridge: default_bridge(),
            fallback_interface: default_bridge(),
        }
    }
}

impl Settings {
    pub fn ssh_options(&self) -> SshOptions {
        SshOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            command_timeout: Duration::from_secs(self.command_timeout_secs),
            host_key_policy: self.host_key_policy,
            known_hosts_file: self.known_hosts_file.clone(),
        }
    }

    pub fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            neighbor_bridge: self.neighbor_bridge.clone(),
            fallback_interface: self.fallback_interface.clone(),
        }
    }
}

// ── Device list ───────────────────────────────────────────────────────────────

/// MAC comparison key: normalised when valid, lowercased otherwise.
fn mac_key(mac: &str) -> String {
    normalize_mac(mac).unwrap_or_else(|| mac.trim().to_lowercase())
}

impl AppConfig {
    /// Adds `record`, replacing any device with the same MAC.
    ///
    /// Returns the replaced record, if any.
    pub fn upsert_device(&mut self, record: DeviceRecord) -> Option<DeviceRecord> {
        let key = mac_key(&record.device_mac);
        match self
            .devices
            .iter_mut()
            .find(|d| mac_key(&d.device_mac) == key)
        {
            Some(existing) => Some(std::mem::replace(existing, record)),
            None => {
                self.devices.push(record);
                None
            }
        }
    }

    /// Finds a device by MAC (any case or separator) or by name
    /// (case-insensitive).
    pub fn find_device(&self, query: &str) -> Option<&DeviceRecord> {
        self.position(query).map(|i| &self.devices[i])
    }

    /// Removes the device [`find_device`](Self::find_device) would return.
    pub fn remove_device(&mut self, query: &str) -> Option<DeviceRecord> {
        self.position(query).map(|i| self.devices.remove(i))
    }

    fn position(&self, query: &str) -> Option<usize> {
        let query = query.trim();
        let key = mac_key(query);
        self.devices
            .iter()
            .position(|d| mac_key(&d.device_mac) == key)
            .or_else(|| {
                self.devices
                    .iter()
                    .position(|d| d.device_name.eq_ignore_ascii_case(query))
            })
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads [`AppConfig`] from `path`, returning `AppConfig::default()` if the
/// file does not yet exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: AppConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Persists `config` to `path`.
///
/// Creates the parent directory if it does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Resolves the platform config base directory, including the `wakegate`
/// subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("Wakegate"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("wakegate"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("Wakegate")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn device(name: &str, mac: &str) -> DeviceRecord {
        DeviceRecord {
            ssh_host: "192.168.1.1".to_string(),
            ssh_user: "root".to_string(),
            ssh_key_path: "/home/me/.ssh/id_ed25519".to_string(),
            device_name: name.to_string(),
            device_mac: mac.to_string(),
            device_interface: "br-lan".to_string(),
        }
    }

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("wakegate_test_{}", Uuid::new_v4()))
    }

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_settings_defaults() {
        // Arrange / Act
        let settings = Settings::default();

        // Assert
        assert_eq!(settings.version, "2");
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.connect_timeout_secs, 10);
        assert_eq!(settings.command_timeout_secs, 30);
        assert_eq!(settings.host_key_policy, HostKeyPolicy::AcceptNew);
        assert_eq!(settings.neighbor_bridge, "br-lan");
        assert_eq!(settings.fallback_interface, "br-lan");
        assert!(settings.known_hosts_file.is_none());
    }

    #[test]
    fn test_empty_toml_is_default_config() {
        let cfg: AppConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_partial_settings_keep_other_defaults() {
        // Arrange
        let toml_str = r#"
[settings]
host_key_policy = "strict"
command_timeout_secs = 5
"#;

        // Act
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(cfg.settings.host_key_policy, HostKeyPolicy::Strict);
        assert_eq!(cfg.settings.command_timeout_secs, 5);
        assert_eq!(cfg.settings.connect_timeout_secs, 10);
    }

    #[test]
    fn test_unknown_host_key_policy_is_parse_error() {
        let result: Result<AppConfig, toml::de::Error> =
            toml::from_str("[settings]\nhost_key_policy = \"yolo\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_convert_to_runtime_options() {
        let mut settings = Settings::default();
        settings.connect_timeout_secs = 3;
        settings.neighbor_bridge = "br-guest".to_string();

        let ssh = settings.ssh_options();
        let discovery = settings.discovery_options();

        assert_eq!(ssh.connect_timeout, Duration::from_secs(3));
        assert_eq!(ssh.command_timeout, Duration::from_secs(30));
        assert_eq!(discovery.neighbor_bridge, "br-guest");
        assert_eq!(discovery.fallback_interface, "br-lan");
    }

    // ── Device list ───────────────────────────────────────────────────────────

    #[test]
    fn test_upsert_replaces_same_mac() {
        // Arrange
        let mut cfg = AppConfig::default();
        cfg.upsert_device(device("nas", "aa:bb:cc:dd:ee:ff"));

        // Act
        let replaced = cfg.upsert_device(device("storage", "AA:BB:CC:DD:EE:FF"));

        // Assert
        assert_eq!(replaced.map(|d| d.device_name), Some("nas".to_string()));
        assert_eq!(cfg.devices.len(), 1);
        assert_eq!(cfg.devices[0].device_name, "storage");
    }

    #[test]
    fn test_find_device_by_name_or_mac() {
        let mut cfg = AppConfig::default();
        cfg.upsert_device(device("NAS", "aa:bb:cc:dd:ee:ff"));
        cfg.upsert_device(device("tv", "11:22:33:44:55:66"));

        assert_eq!(cfg.find_device("nas").map(|d| d.device_mac.as_str()), Some("aa:bb:cc:dd:ee:ff"));
        assert_eq!(cfg.find_device("11-22-33-44-55-66").map(|d| d.device_name.as_str()), Some("tv"));
        assert!(cfg.find_device("printer").is_none());
    }

    #[test]
    fn test_remove_device() {
        let mut cfg = AppConfig::default();
        cfg.upsert_device(device("nas", "aa:bb:cc:dd:ee:ff"));

        assert!(cfg.remove_device("NAS").is_some());
        assert!(cfg.devices.is_empty());
        assert!(cfg.remove_device("nas").is_none());
    }

    // ── File round trip ───────────────────────────────────────────────────────

    #[test]
    fn test_load_config_returns_default_when_file_absent() {
        let path = scratch_dir().join("config.toml");

        let cfg = load_config_from(&path).expect("absent file is not an error");

        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_save_creates_parent_dirs_and_round_trips() {
        // Arrange
        let dir = scratch_dir();
        let path = dir.join("nested").join("config.toml");
        let mut cfg = AppConfig::default();
        cfg.settings.log_level = "debug".to_string();
        cfg.settings.known_hosts_file = Some(PathBuf::from("/home/me/.ssh/known_hosts"));
        cfg.upsert_device(device("nas", "aa:bb:cc:dd:ee:ff"));

        // Act
        save_config_to(&path, &cfg).expect("save");
        let loaded = load_config_from(&path).expect("load");

        // Assert
        assert_eq!(loaded, cfg);

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[[[ not valid toml").unwrap();

        let result = load_config_from(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        if let Ok(path) = config_file_path() {
            assert!(
                path.ends_with("config.toml"),
                "config file must be named config.toml, got {path:?}"
            );
        }
    }
}
