//! # Cryptographic Primitives
//!
//! Thin, type-safe wrappers around audited implementations. Nothing here is
//! rolled by hand:
//!
//! - **Ed25519** for signatures, consumed through [`SigningPrimitive`] so a
//!   secure element can stand in for `ed25519-dalek`.
//! - **SHA-512/256** for checksums and transaction ids.

pub mod hash;
pub mod keys;

pub use hash::{sha512_256, transaction_id};
pub use keys::{Ed25519Primitive, SigningError, SigningPrimitive};
