//! # Account Phrase ↔ Private Key
//!
//! An account phrase is 25 words from the 2048-word BIP-39 English list.
//! Each word is an 11-bit index; the indexes are packed least-significant
//! bits first into a byte stream:
//!
//! ```text
//!   word 0  bits 0..11   ─┐
//!   word 1  bits 11..22   ├─ 24 words = 264 bits ⊇ 256-bit key
//!   ...                  ─┘
//!   word 24              ── checksum: low 11 bits of SHA-512/256(key)[0..2]
//! ```
//!
//! 25 × 11 = 275 bits yield 34 full bytes plus 3 residual bits. Only the
//! first 32 bytes are the key; the rest is checksum spill.
//!
//! [`recover_private_key`] is the core contract: it validates the shape of
//! the phrase and every word, and does **not** verify the checksum word.
//! [`recover_private_key_checked`] adds that verification on top and is
//! what you want when a human typed the phrase.
//!
//! Words are never echoed back in errors or logs; a position is enough to
//! find a typo and does not leak the phrase.

use bip39::Language;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::config::{
    MNEMONIC_BITS_PER_WORD, MNEMONIC_MIN_WORD_LEN, MNEMONIC_WORD_COUNT, PRIVATE_KEY_LENGTH,
};
use crate::crypto::hash::sha512_256;

/// Bytes produced by unpacking a full phrase: ceil(275 / 8).
const DECODED_LENGTH: usize = (MNEMONIC_WORD_COUNT * MNEMONIC_BITS_PER_WORD + 7) / 8;

/// Shortest input that could possibly hold 25 words and the 24 separators
/// between them.
const MIN_PHRASE_LENGTH: usize = MNEMONIC_WORD_COUNT * (MNEMONIC_MIN_WORD_LEN + 1) - 1;

const WORD_MASK: u32 = (1 << MNEMONIC_BITS_PER_WORD) - 1;

/// Why a phrase could not be turned into a key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MnemonicError {
    /// No phrase at all (empty or whitespace only).
    #[error("no mnemonic phrase given")]
    Empty,

    /// Too short to hold 25 words of at least 3 letters.
    #[error("mnemonic phrase is {0} characters, too short for 25 words")]
    TooShort(usize),

    /// No word separator anywhere in the input.
    #[error("mnemonic phrase contains no word separator")]
    NoDelimiter,

    /// A word is not in the reference list. `position` is 0-based.
    #[error("word #{position} is not in the reference word list")]
    InvalidWord {
        /// Index of the offending word in the phrase.
        position: usize,
    },

    /// More than 25 words.
    #[error("mnemonic phrase has more than 25 words")]
    TooManyWords,

    /// Fewer than 25 words.
    #[error("mnemonic phrase has {0} words, expected 25")]
    TooFewWords(usize),

    /// The 25th word does not match the key (checked recovery only).
    #[error("mnemonic checksum word does not match the key")]
    ChecksumMismatch,
}

/// The fixed reference list. Index = 11-bit value.
fn word_list() -> &'static [&'static str; 2048] {
    Language::English.word_list()
}

/// Linear scan for an exact match.
fn word_index(word: &str) -> Option<u16> {
    word_list()
        .iter()
        .position(|candidate| *candidate == word)
        .map(|i| i as u16)
}

/// Validate the phrase and map every word to its 11-bit index.
fn parse_indexes(phrase: &str) -> Result<[u16; MNEMONIC_WORD_COUNT], MnemonicError> {
    if phrase.trim().is_empty() {
        return Err(MnemonicError::Empty);
    }
    if phrase.len() < MIN_PHRASE_LENGTH {
        return Err(MnemonicError::TooShort(phrase.len()));
    }
    if !phrase.contains(char::is_whitespace) {
        return Err(MnemonicError::NoDelimiter);
    }

    let mut indexes = [0u16; MNEMONIC_WORD_COUNT];
    let mut count = 0usize;
    for (position, word) in phrase.split_whitespace().enumerate() {
        let index = word_index(word).ok_or(MnemonicError::InvalidWord { position })?;
        if count == MNEMONIC_WORD_COUNT {
            return Err(MnemonicError::TooManyWords);
        }
        indexes[count] = index;
        count += 1;
    }
    if count != MNEMONIC_WORD_COUNT {
        return Err(MnemonicError::TooFewWords(count));
    }
    Ok(indexes)
}

/// Pack 11-bit values into bytes, least-significant bits first.
fn pack_indexes(indexes: &[u16]) -> Zeroizing<Vec<u8>> {
    let mut out = Zeroizing::new(Vec::with_capacity(DECODED_LENGTH));
    let mut acc: u32 = 0;
    let mut bits = 0usize;
    for &index in indexes {
        acc |= (index as u32) << bits;
        bits += MNEMONIC_BITS_PER_WORD;
        while bits >= 8 {
            out.push((acc & 0xFF) as u8);
            acc >>= 8;
            bits -= 8;
        }
    }
    if bits != 0 {
        out.push((acc & 0xFF) as u8);
    }
    out
}

/// Unpack bytes into 11-bit values, least-significant bits first. A
/// partial trailing group is emitted zero-padded.
fn unpack_indexes(bytes: &[u8]) -> Vec<u16> {
    let mut out = Vec::with_capacity((bytes.len() * 8 + 10) / 11);
    let mut acc: u32 = 0;
    let mut bits = 0usize;
    for &byte in bytes {
        acc |= (byte as u32) << bits;
        bits += 8;
        if bits >= MNEMONIC_BITS_PER_WORD {
            out.push((acc & WORD_MASK) as u16);
            acc >>= MNEMONIC_BITS_PER_WORD;
            bits -= MNEMONIC_BITS_PER_WORD;
        }
    }
    if bits != 0 {
        out.push((acc & WORD_MASK) as u16);
    }
    out
}

/// Index of the checksum word for `key`.
fn checksum_index(key: &[u8; PRIVATE_KEY_LENGTH]) -> u16 {
    let digest = sha512_256(key);
    ((digest[0] as u16) | ((digest[1] as u16) << 8)) & WORD_MASK as u16
}

/// Recover the 32-byte private key from a 25-word phrase.
///
/// Words are separated by any run of whitespace. The checksum word must be
/// a valid list word but its value is not checked against the key.
///
/// # Example
///
/// ```
/// use sensorpay_protocol::identity::mnemonic::{encode_mnemonic, recover_private_key};
///
/// let phrase = encode_mnemonic(&[42u8; 32]);
/// let key = recover_private_key(&phrase).unwrap();
/// assert_eq!(*key, [42u8; 32]);
/// ```
pub fn recover_private_key(
    phrase: &str,
) -> Result<Zeroizing<[u8; PRIVATE_KEY_LENGTH]>, MnemonicError> {
    let indexes = parse_indexes(phrase)?;
    let decoded = pack_indexes(&indexes);

    let mut key = Zeroizing::new([0u8; PRIVATE_KEY_LENGTH]);
    key.copy_from_slice(&decoded[..PRIVATE_KEY_LENGTH]);
    Ok(key)
}

/// Like [`recover_private_key`], and additionally require the 25th word to
/// match the SHA-512/256 checksum of the recovered key.
pub fn recover_private_key_checked(
    phrase: &str,
) -> Result<Zeroizing<[u8; PRIVATE_KEY_LENGTH]>, MnemonicError> {
    let indexes = parse_indexes(phrase)?;
    let key = recover_private_key(phrase)?;
    if indexes[MNEMONIC_WORD_COUNT - 1] != checksum_index(&key) {
        return Err(MnemonicError::ChecksumMismatch);
    }
    Ok(key)
}

/// Render a private key as a 25-word phrase, checksum word included.
pub fn encode_mnemonic(key: &[u8; PRIVATE_KEY_LENGTH]) -> String {
    let list = word_list();
    let mut words: Vec<&str> = unpack_indexes(key)
        .into_iter()
        .map(|index| list[index as usize])
        .collect();
    words.push(list[checksum_index(key) as usize]);
    words.join(" ")
}
