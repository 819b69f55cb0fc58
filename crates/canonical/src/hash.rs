//! Digest of a canonical form.
//!
//! The digest binds the configuration version:
//!
//! ```text
//! SHA-256(version.to_be_bytes() || 0x00 || encoded_form_bytes)
//! ```
//!
//! so forms produced under different canonicalization versions never collide
//! silently, even for identical input.

use sha2::{Digest, Sha256};

/// Hash an encoded canonical form under a configuration version.
pub fn hash_form_bytes(version: u32, encoded: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(version.to_be_bytes());
    hasher.update([0u8]);
    hasher.update(encoded);
    hex::encode(hasher.finalize())
}
