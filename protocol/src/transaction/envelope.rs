//! The signed envelope: `{"sig": <64 bytes>, "txn": <transaction>}`.
//!
//! The envelope header has a fixed size, so the assembler leaves exactly
//! that many blank bytes in front of the transaction. Once the signature
//! exists the header is written into that gap and the whole envelope sits
//! contiguously at the start of the buffer. Nothing is copied.
//!
//! ```text
//! offset 0                                              73   75
//! | 0x82 | A3 "sig" | C4 40 <signature: 64 bytes> | A3 "txn" | <txn map ...>
//!                                                   ^^ "TX" lived here while signing
//! ```

use thiserror::Error;
use tracing::debug;

use super::builder::AssembledPayload;
use crate::codec::{CodecError, EncodingBuffer};
use crate::config::SIGNATURE_LENGTH;

/// Key of the signature entry.
pub const SIGNATURE_KEY: &str = "sig";

/// Key of the transaction entry.
pub const TRANSACTION_KEY: &str = "txn";

/// Bytes the envelope header occupies in front of the transaction:
/// fixmap(2), fixstr "sig", bin8 of the signature, fixstr "txn".
pub const ENVELOPE_HEADER_LEN: usize =
    1 + (1 + SIGNATURE_KEY.len()) + (2 + SIGNATURE_LENGTH) + (1 + TRANSACTION_KEY.len());

/// Failures while wrapping a signed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// The buffer does not hold exactly the assembled transaction, e.g. it
    /// was already wrapped or written to after assembly.
    #[error("buffer holds {found} content bytes, expected the {expected}-byte transaction")]
    UnexpectedContent {
        /// Transaction length recorded at assembly.
        expected: usize,
        /// Content length found in the buffer.
        found: usize,
    },

    /// The header did not end where the transaction begins.
    #[error("envelope header ended at {ended}, transaction starts at {expected}")]
    HeaderMisaligned {
        /// Where the transaction starts.
        expected: usize,
        /// Where the header writes stopped.
        ended: usize,
    },

    /// Encoder failure.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Write the envelope header over the reserved gap and return the whole
/// signed envelope.
pub fn wrap_signed<'a>(
    buf: &'a mut EncodingBuffer,
    payload: &AssembledPayload,
    signature: &[u8; SIGNATURE_LENGTH],
) -> Result<&'a [u8], EnvelopeError> {
    if buf.content_len() != payload.body_len() {
        return Err(EnvelopeError::UnexpectedContent {
            expected: payload.body_len(),
            found: buf.content_len(),
        });
    }

    let header = payload.header();
    buf.seek(header.start())?;
    buf.write_map_header(2)?;
    buf.write_str(SIGNATURE_KEY)?;
    buf.write_bin8(signature)?;
    buf.write_str(TRANSACTION_KEY)?;

    if buf.cursor() != header.end() {
        return Err(EnvelopeError::HeaderMisaligned {
            expected: header.end(),
            ended: buf.cursor(),
        });
    }

    debug!(envelope_len = buf.content_len(), "signed envelope ready");
    Ok(buf.content_from(header.start())?)
}
