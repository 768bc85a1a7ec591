//! SHA-256 fingerprints for content-addressed inputs.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 fingerprint of raw file contents as lowercase hex
pub fn compute_checksum(bytes: impl AsRef<[u8]>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes.as_ref());
    let result = hasher.finalize();
    format!("{:x}", result)
}
