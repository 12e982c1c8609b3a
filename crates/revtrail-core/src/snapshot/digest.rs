use sha2::{Digest, Sha256};

/// Compute the SHA256 digest of a canonical snapshot text.
///
/// Log events carry this digest in place of the snapshot itself.
///
/// ```
/// use revtrail_core::snapshot::snapshot_digest;
///
/// let digest = snapshot_digest("{\"id\":\"c-1\"}");
/// assert_eq!(digest.len(), 64);
/// ```
pub fn snapshot_digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
