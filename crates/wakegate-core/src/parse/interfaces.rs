//! `ubus call network.interface dump` parser.
//!
//! The dump is a JSON object with an `interface` array; each element may carry
//! an `l3_device` naming the kernel device the logical interface runs on.

use serde_json::Value;

/// Device names never offered as wake interfaces.
pub const LOOPBACK_NAMES: [&str; 2] = ["lo", "loopback"];

/// Extracts the distinct layer-3 device names, in dump order.
///
/// Falls back to `[fallback]` when the text is not valid JSON, has no
/// `interface` array, or yields no usable name.
pub fn parse_interfaces(raw: &str, fallback: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();

    match serde_json::from_str::<Value>(raw) {
        Ok(dump) => {
            let devices = dump
                .get("interface")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(|iface| iface.get("l3_device").and_then(Value::as_str));

            for device in devices {
                if device.is_empty() || LOOPBACK_NAMES.contains(&device) {
                    continue;
                }
                if !names.iter().any(|n| n == device) {
                    names.push(device.to_string());
                }
            }
        }
        Err(e) => {
            tracing::debug!("interface dump is not valid JSON: {e}");
        }
    }

    if names.is_empty() {
        names.push(fallback.to_string());
    }
    names
}
