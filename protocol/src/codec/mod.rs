//! # Codec Module
//!
//! The MessagePack subset a payment transaction needs, written straight
//! into a fixed-capacity buffer. No allocation happens after the buffer is
//! created, and nothing outside this subset is supported: fixmap, fixstr,
//! positive fixint, the sized signed and unsigned integers up to 32 bits,
//! float32, bin8 and bin16.
//!
//! Multi-byte values are big-endian, as MessagePack requires.

pub mod writer;

pub use writer::{CodecError, EncodingBuffer, Reservation};

// ---------------------------------------------------------------------------
// Format tags
// ---------------------------------------------------------------------------

pub(crate) const FIXMAP: u8 = 0x80;
pub(crate) const FIXSTR: u8 = 0xA0;
pub(crate) const BIN8: u8 = 0xC4;
pub(crate) const BIN16: u8 = 0xC5;
pub(crate) const FLOAT32: u8 = 0xCA;
pub(crate) const UINT8: u8 = 0xCC;
pub(crate) const UINT16: u8 = 0xCD;
pub(crate) const UINT32: u8 = 0xCE;
pub(crate) const INT8: u8 = 0xD0;
pub(crate) const INT16: u8 = 0xD1;
pub(crate) const INT32: u8 = 0xD2;

/// Largest entry count a fixmap can carry.
pub const FIXMAP_MAX_ENTRIES: usize = 15;

/// Longest string (in bytes) a fixstr can carry.
pub const FIXSTR_MAX_LEN: usize = 31;

/// Largest positive fixint.
pub const POSITIVE_FIXINT_MAX: u8 = 0x7F;
