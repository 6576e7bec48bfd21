//! # Hashing Utilities
//!
//! The ledger uses exactly one hash function: **SHA-512/256** (SHA-512 with
//! the FIPS 180-4 truncated-output IV, not a plain truncation of SHA-512).
//! It shows up in three places on the device side:
//!
//! - the 4-byte checksum trailing every textual address,
//! - the checksum word at the end of a 25-word account phrase,
//! - the transaction id, which is the hash of `"TX" || txn`.
//!
//! All three are derived here so nobody is tempted to grab plain SHA-256
//! by muscle memory.

use sha2::{Digest, Sha512_256};

use crate::identity::address::base32_encode;

/// Compute the SHA-512/256 digest of `data`.
///
/// # Example
///
/// ```
/// use sensorpay_protocol::crypto::sha512_256;
///
/// let digest = sha512_256(b"sensor telemetry");
/// assert_eq!(digest.len(), 32);
/// ```
pub fn sha512_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha512_256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Derive the ledger transaction id from the exact bytes that were signed
/// (prefix included).
///
/// The id is the unpadded Base32 rendering of the SHA-512/256 digest: 52
/// uppercase characters. The node computes the same value on acceptance,
/// which makes this a cheap cross-check against the id it returns.
pub fn transaction_id(prefixed_txn: &[u8]) -> String {
    base32_encode(&sha512_256(prefixed_txn))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha512_256_empty_input_vector() {
        // FIPS 180-4 example value for the empty message.
        assert_eq!(
            hex::encode(sha512_256(b"")),
            "c672b8d1ef56ed28ab87c3622c5114069bdd3ad7b8f9737498d0c01ecef0967a"
        );
    }

    #[test]
    fn sha512_256_abc_vector() {
        assert_eq!(
            hex::encode(sha512_256(b"abc")),
            "53048e2681941ef99b2e29b76b4c7dabe4c2d0c634fc6d46e0e2f13107e7af23"
        );
    }

    #[test]
    fn transaction_id_is_52_base32_chars() {
        let id = transaction_id(b"TX\x89\xa3amt\x01");
        assert_eq!(id.len(), 52);
        assert!(id
            .chars()
            .all(|c| c.is_ascii_uppercase() || ('2'..='7').contains(&c)));
    }

    #[test]
    fn transaction_id_depends_on_every_byte() {
        assert_ne!(transaction_id(b"TXabc"), transaction_id(b"TXabd"));
    }
}
