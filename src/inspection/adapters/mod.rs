//! Adapter implementations of the inspection ports.

pub mod directory_photo;
pub mod memory;
pub mod postgres;

use std::fmt::Write as _;

/// Hex-encodes the sha256 digest of raw photo bytes.
pub(crate) fn hex_sha256(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};

    let digest = Sha256::digest(bytes);
    let mut encoded = String::with_capacity(digest.len() * 2);
    for byte in digest {
        // Writing into a String cannot fail.
        write!(encoded, "{byte:02x}").ok();
    }
    encoded
}
