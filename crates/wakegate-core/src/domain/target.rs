//! Persisted device records and validated wake targets.
//!
//! A [`DeviceRecord`] is what gets written to the configuration file: plain
//! strings, exactly as chosen during setup.  Before anything is sent to the
//! router the record is turned into a [`WakeTarget`], whose construction
//! re-validates the MAC and the interface because both end up in a remote
//! shell command line.

use serde::{Deserialize, Serialize};

use super::credentials::{Credentials, DomainError};
use super::mac::{is_valid_interface_name, normalize_mac};

/// Title prefix of every configured device.
pub const TITLE_PREFIX: &str = "OpenWrt Wake-on-LAN";

/// Prefix of the stable per-device identifier.
pub const UNIQUE_ID_PREFIX: &str = "openwrt_wakeonlan_";

/// One configured wake target, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub ssh_host: String,
    pub ssh_user: String,
    pub ssh_key_path: String,
    pub device_name: String,
    pub device_mac: String,
    pub device_interface: String,
}

impl DeviceRecord {
    /// Name shown to the user; falls back to the MAC when no name is known.
    pub fn display_name(&self) -> &str {
        if self.device_name.is_empty() {
            &self.device_mac
        } else {
            &self.device_name
        }
    }

    /// `"OpenWrt Wake-on-LAN: <name> (<interface>)"`.
    pub fn title(&self) -> String {
        format!(
            "{}: {} ({})",
            TITLE_PREFIX,
            self.display_name(),
            self.device_interface
        )
    }

    /// Stable identifier derived from the MAC with the colons stripped.
    pub fn unique_id(&self) -> String {
        format!("{}{}", UNIQUE_ID_PREFIX, self.device_mac.replace(':', ""))
    }

    pub fn credentials(&self) -> Result<Credentials, DomainError> {
        Credentials::new(&self.ssh_host, &self.ssh_user, &self.ssh_key_path)
    }
}

/// Everything a single wake action needs.  Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WakeTarget {
    name: String,
    mac: String,
    interface: String,
    credentials: Credentials,
}

impl WakeTarget {
    /// # Errors
    ///
    /// [`DomainError::InvalidMac`] unless `mac` is six hex octets, and
    /// [`DomainError::InvalidInterface`] unless `interface` looks like a
    /// network interface name.
    pub fn new(
        name: impl Into<String>,
        mac: &str,
        interface: &str,
        credentials: Credentials,
    ) -> Result<Self, DomainError> {
        let mac = normalize_mac(mac).ok_or_else(|| DomainError::InvalidMac(mac.to_string()))?;
        let interface = interface.trim();
        if !is_valid_interface_name(interface) {
            return Err(DomainError::InvalidInterface(interface.to_string()));
        }

        Ok(Self {
            name: name.into(),
            mac,
            interface: interface.to_string(),
            credentials,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lowercase, colon-separated MAC.
    pub fn mac(&self) -> &str {
        &self.mac
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

impl TryFrom<&DeviceRecord> for WakeTarget {
    type Error = DomainError;

    fn try_from(record: &DeviceRecord) -> Result<Self, Self::Error> {
        let credentials = record.credentials()?;
        WakeTarget::new(
            record.display_name(),
            &record.device_mac,
            &record.device_interface,
            credentials,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> DeviceRecord {
        DeviceRecord {
            ssh_host: "192.168.1.1".to_string(),
            ssh_user: "root".to_string(),
            ssh_key_path: "/home/me/.ssh/id_ed25519".to_string(),
            device_name: "nas".to_string(),
            device_mac: "aa:bb:cc:dd:ee:ff".to_string(),
            device_interface: "br-lan".to_string(),
        }
    }

    #[test]
    fn test_title_and_unique_id() {
        let rec = record();
        assert_eq!(rec.title(), "OpenWrt Wake-on-LAN: nas (br-lan)");
        assert_eq!(rec.unique_id(), "openwrt_wakeonlan_aabbccddeeff");
    }

    #[test]
    fn test_display_name_falls_back_to_mac() {
        let mut rec = record();
        rec.device_name.clear();
        assert_eq!(rec.display_name(), "aa:bb:cc:dd:ee:ff");
        assert_eq!(rec.title(), "OpenWrt Wake-on-LAN: aa:bb:cc:dd:ee:ff (br-lan)");
    }

    #[test]
    fn test_wake_target_from_record() {
        // Arrange
        let mut rec = record();
        rec.device_mac = "AA-BB-CC-DD-EE-FF".to_string();

        // Act
        let target = WakeTarget::try_from(&rec).unwrap();

        // Assert
        assert_eq!(target.mac(), "aa:bb:cc:dd:ee:ff");
        assert_eq!(target.interface(), "br-lan");
        assert_eq!(target.name(), "nas");
        assert_eq!(target.credentials().username(), "root");
    }

    #[test]
    fn test_wake_target_rejects_bad_mac() {
        let mut rec = record();
        rec.device_mac = "not-a-mac".to_string();
        assert_eq!(
            WakeTarget::try_from(&rec).unwrap_err(),
            DomainError::InvalidMac("not-a-mac".to_string())
        );
    }

    #[test]
    fn test_wake_target_rejects_shell_metacharacters_in_interface() {
        let mut rec = record();
        rec.device_interface = "br-lan; reboot".to_string();
        assert!(matches!(
            WakeTarget::try_from(&rec),
            Err(DomainError::InvalidInterface(_))
        ));
    }

    #[test]
    fn test_wake_target_rejects_missing_credentials() {
        let mut rec = record();
        rec.ssh_host = String::new();
        assert_eq!(WakeTarget::try_from(&rec).unwrap_err(), DomainError::EmptyHost);
    }
}
