//! Fixed-capacity MessagePack writer.
//!
//! [`EncodingBuffer`] is an arena: a byte region whose capacity is chosen
//! at creation and never grows, a write cursor, and a running content
//! length. Every primitive checks the full size of what it is about to
//! write before touching a byte, so a failed write leaves the buffer
//! exactly as it was.
//!
//! The cursor and the content length are deliberately decoupled. Content
//! can start anywhere: the transaction assembler reserves a blank header
//! at the front, writes the transaction after it, and later seeks back to
//! fill the header in. The content length only ever accumulates what the
//! primitives wrote, wherever they wrote it.

use thiserror::Error;

use super::{
    BIN16, BIN8, FIXMAP, FIXMAP_MAX_ENTRIES, FIXSTR, FIXSTR_MAX_LEN, FLOAT32, INT16, INT32, INT8,
    POSITIVE_FIXINT_MAX, UINT16, UINT32, UINT8,
};

/// Encoder misuse or exhaustion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The write would run past the fixed capacity.
    #[error("buffer too short: need {needed} bytes at offset {offset}, capacity {capacity}")]
    BufferTooShort {
        /// Where the write would start.
        offset: usize,
        /// Bytes the write needs.
        needed: usize,
        /// Fixed capacity of the buffer.
        capacity: usize,
    },

    /// Cursor moved (or a region addressed) outside the buffer.
    #[error("position {position} outside buffer of capacity {capacity}")]
    PositionOutOfRange {
        /// Requested position.
        position: usize,
        /// Fixed capacity of the buffer.
        capacity: usize,
    },

    /// Fixmap holds at most 15 entries.
    #[error("map with {0} entries does not fit a fixmap")]
    MapTooLarge(usize),

    /// Fixstr holds at most 31 bytes.
    #[error("string of {0} bytes does not fit a fixstr")]
    StringTooLong(usize),

    /// Blob longer than the chosen bin format allows.
    #[error("blob of {len} bytes exceeds the {max}-byte limit of its format")]
    BlobTooLong {
        /// Blob length.
        len: usize,
        /// Format limit.
        max: usize,
    },

    /// Positive fixint only covers 0..=127.
    #[error("{0} does not fit a positive fixint")]
    FixintOutOfRange(u8),
}

/// A reserved span at a known offset, to be filled in after the content
/// that follows it has been written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reservation {
    start: usize,
    len: usize,
}

impl Reservation {
    /// First reserved byte.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Reserved byte count.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false for a reservation that was actually made; present for
    /// symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last reserved byte, i.e. where the content begins.
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Fixed-capacity byte arena with a relocatable cursor.
#[derive(Debug, Clone)]
pub struct EncodingBuffer {
    bytes: Box<[u8]>,
    cursor: usize,
    content_len: usize,
}

impl EncodingBuffer {
    /// A zero-filled buffer that will never hold more than `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: vec![0u8; capacity].into_boxed_slice(),
            cursor: 0,
            content_len: 0,
        }
    }

    /// Fixed capacity.
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Where the next primitive writes.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Total bytes written by primitives so far, wherever they landed.
    pub fn content_len(&self) -> usize {
        self.content_len
    }

    /// True until the first primitive write.
    pub fn is_empty(&self) -> bool {
        self.content_len == 0
    }

    /// Move the cursor. Content length is not affected.
    pub fn seek(&mut self, position: usize) -> Result<(), CodecError> {
        if position >= self.capacity() {
            return Err(CodecError::PositionOutOfRange {
                position,
                capacity: self.capacity(),
            });
        }
        self.cursor = position;
        Ok(())
    }

    /// Skip `len` bytes at the cursor and hand back their location. The
    /// skipped bytes do not count as content until something is written
    /// into them.
    pub fn reserve(&mut self, len: usize) -> Result<Reservation, CodecError> {
        self.ensure(len)?;
        let reservation = Reservation {
            start: self.cursor,
            len,
        };
        self.cursor += len;
        Ok(reservation)
    }

    /// Overwrite bytes at `offset` without moving the cursor or counting
    /// them as content.
    pub fn patch(&mut self, offset: usize, data: &[u8]) -> Result<(), CodecError> {
        let end = self.region_end(offset, data.len())?;
        self.bytes[offset..end].copy_from_slice(data);
        Ok(())
    }

    /// Borrow `len` bytes starting at `offset`.
    pub fn region(&self, offset: usize, len: usize) -> Result<&[u8], CodecError> {
        let end = self.region_end(offset, len)?;
        Ok(&self.bytes[offset..end])
    }

    /// Borrow `content_len` bytes starting at `offset`; the view callers
    /// want once content has been laid out contiguously from `offset`.
    pub fn content_from(&self, offset: usize) -> Result<&[u8], CodecError> {
        self.region(offset, self.content_len)
    }

    // -----------------------------------------------------------------------
    // Primitives
    // -----------------------------------------------------------------------

    /// Fixmap header, 1 byte: `0x80 | entries`.
    pub fn write_map_header(&mut self, entries: usize) -> Result<(), CodecError> {
        if entries > FIXMAP_MAX_ENTRIES {
            return Err(CodecError::MapTooLarge(entries));
        }
        self.put(&[FIXMAP | entries as u8])
    }

    /// Fixstr: `0xA0 | len` followed by the raw UTF-8 bytes.
    pub fn write_str(&mut self, s: &str) -> Result<(), CodecError> {
        let raw = s.as_bytes();
        if raw.len() > FIXSTR_MAX_LEN {
            return Err(CodecError::StringTooLong(raw.len()));
        }
        self.put_parts(&[&[FIXSTR | raw.len() as u8], raw])
    }

    /// Positive fixint: the value itself, no tag.
    pub fn write_fixint(&mut self, value: u8) -> Result<(), CodecError> {
        if value > POSITIVE_FIXINT_MAX {
            return Err(CodecError::FixintOutOfRange(value));
        }
        self.put(&[value])
    }

    /// `0xCC` + 1 byte.
    pub fn write_u8(&mut self, value: u8) -> Result<(), CodecError> {
        self.put(&[UINT8, value])
    }

    /// `0xD0` + 1 byte, two's complement.
    pub fn write_i8(&mut self, value: i8) -> Result<(), CodecError> {
        self.put(&[INT8, value as u8])
    }

    /// `0xCD` + 2 bytes big-endian.
    pub fn write_u16(&mut self, value: u16) -> Result<(), CodecError> {
        self.put_parts(&[&[UINT16], &value.to_be_bytes()])
    }

    /// `0xD1` + 2 bytes big-endian.
    pub fn write_i16(&mut self, value: i16) -> Result<(), CodecError> {
        self.put_parts(&[&[INT16], &value.to_be_bytes()])
    }

    /// `0xCE` + 4 bytes big-endian.
    pub fn write_u32(&mut self, value: u32) -> Result<(), CodecError> {
        self.put_parts(&[&[UINT32], &value.to_be_bytes()])
    }

    /// `0xD2` + 4 bytes big-endian.
    pub fn write_i32(&mut self, value: i32) -> Result<(), CodecError> {
        self.put_parts(&[&[INT32], &value.to_be_bytes()])
    }

    /// `0xCA` + IEEE-754 single, big-endian.
    pub fn write_f32(&mut self, value: f32) -> Result<(), CodecError> {
        self.put_parts(&[&[FLOAT32], &value.to_be_bytes()])
    }

    /// Unsigned integer in the narrowest encoding: fixint, uint8, uint16,
    /// then uint32. Canonical encoders on the verifying side make the same
    /// choice, and a wider one would change the signed bytes.
    pub fn write_uint(&mut self, value: u32) -> Result<(), CodecError> {
        if value <= POSITIVE_FIXINT_MAX as u32 {
            self.write_fixint(value as u8)
        } else if value <= u8::MAX as u32 {
            self.write_u8(value as u8)
        } else if value <= u16::MAX as u32 {
            self.write_u16(value as u16)
        } else {
            self.write_u32(value)
        }
    }

    /// bin8: `0xC4`, 1-byte length, raw bytes. At most 255 bytes.
    pub fn write_bin8(&mut self, data: &[u8]) -> Result<(), CodecError> {
        if data.len() > u8::MAX as usize {
            return Err(CodecError::BlobTooLong {
                len: data.len(),
                max: u8::MAX as usize,
            });
        }
        self.put_parts(&[&[BIN8, data.len() as u8], data])
    }

    /// bin16: `0xC5`, 2-byte big-endian length, raw bytes. At most 65535 bytes.
    pub fn write_bin16(&mut self, data: &[u8]) -> Result<(), CodecError> {
        if data.len() > u16::MAX as usize {
            return Err(CodecError::BlobTooLong {
                len: data.len(),
                max: u16::MAX as usize,
            });
        }
        self.put_parts(&[&[BIN16], &(data.len() as u16).to_be_bytes(), data])
    }

    /// bin8 below 256 bytes, bin16 from 256 on. The boundary is part of
    /// the canonical form: the verifier re-encodes and compares.
    pub fn write_bin(&mut self, data: &[u8]) -> Result<(), CodecError> {
        if data.len() <= u8::MAX as usize {
            self.write_bin8(data)
        } else {
            self.write_bin16(data)
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn ensure(&self, needed: usize) -> Result<(), CodecError> {
        match self.cursor.checked_add(needed) {
            Some(end) if end <= self.capacity() => Ok(()),
            _ => Err(CodecError::BufferTooShort {
                offset: self.cursor,
                needed,
                capacity: self.capacity(),
            }),
        }
    }

    fn region_end(&self, offset: usize, len: usize) -> Result<usize, CodecError> {
        match offset.checked_add(len) {
            Some(end) if end <= self.capacity() => Ok(end),
            _ => Err(CodecError::PositionOutOfRange {
                position: offset.saturating_add(len),
                capacity: self.capacity(),
            }),
        }
    }

    fn put(&mut self, data: &[u8]) -> Result<(), CodecError> {
        self.put_parts(&[data])
    }

    /// All-or-nothing write of several slices back to back.
    fn put_parts(&mut self, parts: &[&[u8]]) -> Result<(), CodecError> {
        let total: usize = parts.iter().map(|p| p.len()).sum();
        self.ensure(total)?;
        for part in parts {
            let end = self.cursor + part.len();
            self.bytes[self.cursor..end].copy_from_slice(part);
            self.cursor = end;
        }
        self.content_len += total;
        Ok(())
    }
}
