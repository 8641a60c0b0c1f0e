//! Content fingerprints for migration files.
//!
//! Fingerprints are git blob ids: the SHA-1 of `blob <len>\0<bytes>`. The exact
//! migration that ran can be looked up in repository history with the value
//! stored in the ledger, and the id depends on content only, never on the
//! filename.

use sha1::{Digest, Sha1};

/// Compute the git blob fingerprint of `content`.
pub fn blob_fingerprint(content: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format!("blob {}\0", content.len()).as_bytes());
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
#[path = "checksum_test.rs"]
mod tests;
