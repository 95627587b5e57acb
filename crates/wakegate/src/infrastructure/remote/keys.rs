//! Private key file loading.

use std::path::Path;

use tracing::debug;
use wakegate_core::{parse_private_key, KeyLoadError, PrivateKey};

/// Reads `path` and decodes it as an OpenSSH or PEM RSA private key.
///
/// Blocking; call it from the SSH worker thread.
///
/// # Errors
///
/// [`KeyLoadError::Read`] when the file cannot be read, otherwise whatever
/// [`parse_private_key`] reports.
pub fn load_private_key(path: &Path) -> Result<PrivateKey, KeyLoadError> {
    let text = std::fs::read_to_string(path).map_err(|e| KeyLoadError::Read {
        path: path.display().to_string(),
        detail: e.to_string(),
    })?;

    let key = parse_private_key(&text)?;
    debug!(
        path = %path.display(),
        format = %key.format,
        key_type = %key.key_type,
        "private key loaded"
    );
    Ok(key)
}
