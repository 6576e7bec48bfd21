//! # Signing Primitive
//!
//! The client never implements Ed25519 itself. It consumes exactly two
//! operations, derive-public-key and detached-sign, through the
//! [`SigningPrimitive`] trait. [`Ed25519Primitive`] is the default adapter,
//! a thin wrapper over `ed25519-dalek` (RFC 8032, deterministic, constant
//! time where it matters).
//!
//! Hardware signers, secure elements, or test doubles plug in by
//! implementing the trait.
//!
//! ## Security considerations
//!
//! - Key bytes are never logged. If you add logging to this module, you
//!   will be asked to leave.
//! - The adapter rebuilds a `SigningKey` per call and lets it drop (and
//!   zeroize) immediately.

use ed25519_dalek::{Signer, SigningKey};
use thiserror::Error;

use crate::config::{ADDRESS_LENGTH, PRIVATE_KEY_LENGTH, SIGNATURE_LENGTH};

/// Errors surfaced by a signing primitive.
///
/// Intentionally vague: leaking details about key material through error
/// messages is a classic footgun.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    /// The public key handed to `sign` does not belong to the secret key.
    #[error("public key does not match the secret key")]
    KeypairMismatch,

    /// The message range to sign is empty; nothing was assembled yet.
    #[error("refusing to sign an empty message")]
    EmptyMessage,

    /// Any failure reported by an external signer (HSM, secure element, ...).
    #[error("signer failure: {0}")]
    Backend(String),
}

/// The two Ed25519 operations the client consumes.
///
/// Implementations must be deterministic for a given (key, message) pair;
/// the transaction id is derived from the signed bytes and the caller may
/// compare it against what the node reports.
pub trait SigningPrimitive {
    /// Derive the 32-byte public key (= binary account address) from a
    /// 32-byte secret seed.
    fn derive_public_key(&self, secret: &[u8; PRIVATE_KEY_LENGTH]) -> [u8; ADDRESS_LENGTH];

    /// Produce a detached 64-byte signature over `message`.
    fn sign(
        &self,
        secret: &[u8; PRIVATE_KEY_LENGTH],
        public: &[u8; ADDRESS_LENGTH],
        message: &[u8],
    ) -> Result<[u8; SIGNATURE_LENGTH], SigningError>;
}

/// Default [`SigningPrimitive`] backed by `ed25519-dalek`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Primitive;

impl SigningPrimitive for Ed25519Primitive {
    fn derive_public_key(&self, secret: &[u8; PRIVATE_KEY_LENGTH]) -> [u8; ADDRESS_LENGTH] {
        SigningKey::from_bytes(secret).verifying_key().to_bytes()
    }

    fn sign(
        &self,
        secret: &[u8; PRIVATE_KEY_LENGTH],
        public: &[u8; ADDRESS_LENGTH],
        message: &[u8],
    ) -> Result<[u8; SIGNATURE_LENGTH], SigningError> {
        if message.is_empty() {
            return Err(SigningError::EmptyMessage);
        }
        let signing_key = SigningKey::from_bytes(secret);
        // dalek derives the public half itself; a caller passing a stale or
        // foreign public key would otherwise get a signature nobody verifies.
        if signing_key.verifying_key().as_bytes() != public {
            return Err(SigningError::KeypairMismatch);
        }
        Ok(signing_key.sign(message).to_bytes())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
