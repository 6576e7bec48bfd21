//! Textual address and genesis hash codecs.
//!
//! A ledger address is the 32-byte Ed25519 public key followed by a 4-byte
//! checksum (the last 4 bytes of its SHA-512/256 digest), rendered as 58
//! characters of unpadded RFC 4648 Base32. Genesis hashes travel as plain
//! padded Base64.
//!
//! The Base32 decoder is forgiving about the things humans get wrong when
//! copying an address off a screen: lower case is accepted, the digits
//! `0`, `1` and `8` are read as `O`, `L` and `B`, and whitespace and `=`
//! padding are skipped. It is not forgiving about anything else: any other
//! character fails the whole decode, and no partial output is ever returned.
//!
//! [`decode_address`] drops the 4 checksum bytes without verifying them.
//! [`decode_address_checked`] verifies them.

use base64::{engine::general_purpose::STANDARD, Engine};
use thiserror::Error;

use crate::config::{ADDRESS_CHECKSUM_LENGTH, ADDRESS_LENGTH, GENESIS_HASH_LENGTH};
use crate::crypto::hash::sha512_256;

/// RFC 4648 Base32 alphabet.
const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Errors from address and genesis hash decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Nothing to decode.
    #[error("empty input")]
    Empty,

    /// A character outside the Base32 alphabet (after typo remapping).
    #[error("invalid base32 character {ch:?} at position {position}")]
    InvalidCharacter {
        /// Byte offset in the input.
        position: usize,
        /// The offending character.
        ch: char,
    },

    /// The decoded address is shorter than key + checksum.
    #[error("decoded address is {0} bytes, need at least 36")]
    TooShort(usize),

    /// The trailing 4 bytes do not match the key's digest.
    #[error("address checksum mismatch")]
    ChecksumMismatch,

    /// The genesis hash is not valid Base64.
    #[error("genesis hash is not valid base64")]
    InvalidGenesisHash,

    /// The genesis hash decoded to the wrong number of bytes.
    #[error("genesis hash decoded to {0} bytes, expected 32")]
    GenesisHashLength(usize),
}

// ---------------------------------------------------------------------------
// Base32
// ---------------------------------------------------------------------------

/// Decode forgiving Base32 into a fresh byte vector.
///
/// Bits are consumed 5 at a time and a byte is emitted whenever 8 are
/// available; trailing bits that do not fill a byte are discarded.
pub fn base32_decode(input: &str) -> Result<Vec<u8>, AddressError> {
    let mut out = Vec::with_capacity(input.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits_left = 0u32;

    for (position, ch) in input.char_indices() {
        if matches!(ch, ' ' | '\t' | '\r' | '\n' | '=') {
            continue;
        }
        let remapped = match ch {
            '0' => 'O',
            '1' => 'L',
            '8' => 'B',
            other => other.to_ascii_uppercase(),
        };
        let value = match remapped {
            'A'..='Z' => remapped as u32 - 'A' as u32,
            '2'..='7' => remapped as u32 - '2' as u32 + 26,
            _ => return Err(AddressError::InvalidCharacter { position, ch }),
        };

        buffer = (buffer << 5) | value;
        bits_left += 5;
        if bits_left >= 8 {
            out.push((buffer >> (bits_left - 8)) as u8);
            bits_left -= 8;
            buffer &= (1 << bits_left) - 1;
        }
    }

    Ok(out)
}

/// Encode bytes as unpadded, upper-case RFC 4648 Base32.
pub fn base32_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity((data.len() * 8 + 4) / 5);
    let mut buffer: u32 = 0;
    let mut bits = 0u32;

    for &byte in data {
        buffer = (buffer << 8) | byte as u32;
        bits += 8;
        while bits >= 5 {
            let index = (buffer >> (bits - 5)) & 0x1F;
            out.push(BASE32_ALPHABET[index as usize] as char);
            bits -= 5;
        }
        buffer &= (1 << bits) - 1;
    }
    if bits > 0 {
        let index = (buffer << (5 - bits)) & 0x1F;
        out.push(BASE32_ALPHABET[index as usize] as char);
    }

    out
}

// ---------------------------------------------------------------------------
// Addresses
// ---------------------------------------------------------------------------

/// Last 4 bytes of SHA-512/256(key).
fn address_checksum(key: &[u8; ADDRESS_LENGTH]) -> [u8; ADDRESS_CHECKSUM_LENGTH] {
    let digest = sha512_256(key);
    let mut checksum = [0u8; ADDRESS_CHECKSUM_LENGTH];
    checksum.copy_from_slice(&digest[digest.len() - ADDRESS_CHECKSUM_LENGTH..]);
    checksum
}

fn decode_with_checksum(
    address: &str,
) -> Result<([u8; ADDRESS_LENGTH], [u8; ADDRESS_CHECKSUM_LENGTH]), AddressError> {
    if address.trim().is_empty() {
        return Err(AddressError::Empty);
    }
    let decoded = base32_decode(address)?;
    if decoded.len() < ADDRESS_LENGTH + ADDRESS_CHECKSUM_LENGTH {
        return Err(AddressError::TooShort(decoded.len()));
    }

    let mut key = [0u8; ADDRESS_LENGTH];
    key.copy_from_slice(&decoded[..ADDRESS_LENGTH]);
    let mut checksum = [0u8; ADDRESS_CHECKSUM_LENGTH];
    checksum.copy_from_slice(&decoded[ADDRESS_LENGTH..ADDRESS_LENGTH + ADDRESS_CHECKSUM_LENGTH]);
    Ok((key, checksum))
}

/// Decode a textual address into its 32-byte binary form.
///
/// The 4 checksum bytes must be present but are not verified. Use
/// [`decode_address_checked`] when the address comes from a human.
pub fn decode_address(address: &str) -> Result<[u8; ADDRESS_LENGTH], AddressError> {
    decode_with_checksum(address).map(|(key, _)| key)
}

/// Decode a textual address and verify its trailing checksum.
pub fn decode_address_checked(address: &str) -> Result<[u8; ADDRESS_LENGTH], AddressError> {
    let (key, checksum) = decode_with_checksum(address)?;
    if checksum != address_checksum(&key) {
        return Err(AddressError::ChecksumMismatch);
    }
    Ok(key)
}

/// Render a 32-byte public key as a 58-character textual address.
pub fn encode_address(key: &[u8; ADDRESS_LENGTH]) -> String {
    let mut raw = [0u8; ADDRESS_LENGTH + ADDRESS_CHECKSUM_LENGTH];
    raw[..ADDRESS_LENGTH].copy_from_slice(key);
    raw[ADDRESS_LENGTH..].copy_from_slice(&address_checksum(key));
    base32_encode(&raw)
}

// ---------------------------------------------------------------------------
// Genesis hash
// ---------------------------------------------------------------------------

/// Decode a Base64 genesis hash into exactly 32 bytes.
pub fn decode_genesis_hash(hash_b64: &str) -> Result<[u8; GENESIS_HASH_LENGTH], AddressError> {
    if hash_b64.is_empty() {
        return Err(AddressError::Empty);
    }
    let decoded = STANDARD
        .decode(hash_b64)
        .map_err(|_| AddressError::InvalidGenesisHash)?;
    decoded
        .as_slice()
        .try_into()
        .map_err(|_| AddressError::GenesisHashLength(decoded.len()))
}
