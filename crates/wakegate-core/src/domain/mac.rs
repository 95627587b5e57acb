//! MAC address and interface name validation.
//!
//! Both values end up as arguments of a remote shell command, so anything
//! persisted as a wake target must pass these checks first.

/// Normalises a MAC address to lowercase, colon-separated form.
///
/// Accepts six two-digit hex octets separated by `:` or `-`.  Returns `None`
/// for anything else.
pub fn normalize_mac(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let octets: Vec<&str> = raw.split(|c| c == ':' || c == '-').collect();
    if octets.len() != 6 {
        return None;
    }
    if !octets
        .iter()
        .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()))
    {
        return None;
    }
    Some(octets.join(":").to_ascii_lowercase())
}

/// Returns `true` for names that look like a Linux network interface.
///
/// Interface names are at most 15 bytes (`IFNAMSIZ - 1`) and, in practice on
/// OpenWrt, made of ASCII letters, digits, `.`, `-`, `_` and `@`.
pub fn is_valid_interface_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 15
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '@'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_mac_lowercases() {
        assert_eq!(
            normalize_mac("AA:BB:CC:DD:EE:0F").as_deref(),
            Some("aa:bb:cc:dd:ee:0f")
        );
    }

    #[test]
    fn test_normalize_mac_accepts_dashes() {
        assert_eq!(
            normalize_mac("aa-bb-cc-dd-ee-ff").as_deref(),
            Some("aa:bb:cc:dd:ee:ff")
        );
    }

    #[test]
    fn test_normalize_mac_rejects_malformed() {
        assert_eq!(normalize_mac("aa:bb:cc:dd:ee"), None);
        assert_eq!(normalize_mac("aa:bb:cc:dd:ee:fg"), None);
        assert_eq!(normalize_mac("aabb.ccdd.eeff"), None);
        assert_eq!(normalize_mac("aa:bb:cc:dd:ee:ff; reboot"), None);
    }

    #[test]
    fn test_interface_names() {
        assert!(is_valid_interface_name("br-lan"));
        assert!(is_valid_interface_name("eth0.2"));
        assert!(is_valid_interface_name("pppoe-wan"));
        assert!(!is_valid_interface_name(""));
        assert!(!is_valid_interface_name("br lan"));
        assert!(!is_valid_interface_name("eth0;reboot"));
        assert!(!is_valid_interface_name("a-very-long-interface"));
    }
}
