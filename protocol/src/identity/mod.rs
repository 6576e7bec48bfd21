//! # Identity Module
//!
//! Who the device is on the ledger, and how to spell the other side.
//!
//! 1. **Mnemonic** — the 25-word phrase the operator flashes onto the
//!    device, and the bit-packing that turns it into a 32-byte Ed25519 seed.
//! 2. **Account** — seed, derived sender address, chosen receiver.
//! 3. **Address** — Base32 textual addresses (with their 4-byte checksum)
//!    and Base64 genesis hashes, decoded into fixed-size binary.
//!
//! All decoders fail closed and return owned values. There is nothing to
//! free and no half-filled output to trip over.

pub mod account;
pub mod address;
pub mod mnemonic;

pub use account::Account;
pub use address::{
    decode_address, decode_address_checked, decode_genesis_hash, encode_address, AddressError,
};
pub use mnemonic::{
    encode_mnemonic, recover_private_key, recover_private_key_checked, MnemonicError,
};
