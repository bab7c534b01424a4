use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of raw diff output (for staleness detection)
pub fn diff_hash(raw_diff: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_diff.as_bytes());
    format!("{:x}", hasher.finalize())
}
