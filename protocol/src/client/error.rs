//! Client-level error type and its coarse classification.
//!
//! Each layer keeps its own precise error. [`ClientError`] wraps them so
//! `?` works across the submission path, and [`ClientError::kind`] folds
//! them down to the ten [`ErrorKind`]s a device firmware actually branches
//! on.

use std::fmt;

use thiserror::Error;

use crate::codec::CodecError;
use crate::gateway::GatewayError;
use crate::identity::{AddressError, MnemonicError};
use crate::note::NoteError;
use crate::transaction::{AssemblyError, EnvelopeError, TransactionSigningError};

/// What went wrong, without the details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required input was empty.
    NullInput,
    /// An input was out of range or the wrong length.
    BadParam,
    /// The fixed-capacity buffer ran out of room.
    MemoryExhausted,
    /// Something that should not happen did, or the node answered oddly.
    GenericInternal,
    /// The node could not be reached, or answered with no data.
    NetworkError,
    /// The note could not be serialized.
    EncodingError,
    /// The encoder was driven out of order.
    BufferProtocolError,
    /// The signing primitive failed.
    SignatureError,
    /// The node refused the transaction.
    TransactionRejected,
    /// The note reached its size ceiling.
    NoteTooLong,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NullInput => "null input",
            Self::BadParam => "bad parameter",
            Self::MemoryExhausted => "memory exhausted",
            Self::GenericInternal => "internal error",
            Self::NetworkError => "network error",
            Self::EncodingError => "encoding error",
            Self::BufferProtocolError => "buffer protocol error",
            Self::SignatureError => "signature error",
            Self::TransactionRejected => "transaction rejected",
            Self::NoteTooLong => "note too long",
        };
        f.write_str(name)
    }
}

/// Every failure the client surfaces.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// An empty argument where a value is required.
    #[error("{0} must not be empty")]
    NullInput(&'static str),

    /// An argument rejected by the client itself.
    #[error("invalid {field}: {reason}")]
    BadParam {
        /// Which argument.
        field: &'static str,
        /// Why.
        reason: String,
    },

    /// Internal inconsistency.
    #[error("internal error: {0}")]
    Internal(String),

    #[error("address: {0}")]
    Address(#[from] AddressError),

    #[error("mnemonic: {0}")]
    Mnemonic(#[from] MnemonicError),

    #[error("note: {0}")]
    Note(#[from] NoteError),

    #[error("encoder: {0}")]
    Codec(#[from] CodecError),

    #[error("assembly: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("signing: {0}")]
    Signing(#[from] TransactionSigningError),

    #[error("envelope: {0}")]
    Envelope(#[from] EnvelopeError),

    #[error("gateway: {0}")]
    Gateway(#[from] GatewayError),
}

fn codec_kind(err: &CodecError) -> ErrorKind {
    match err {
        CodecError::BufferTooShort { .. } => ErrorKind::MemoryExhausted,
        _ => ErrorKind::BufferProtocolError,
    }
}

impl ClientError {
    /// Coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NullInput(_) => ErrorKind::NullInput,
            Self::BadParam { .. } => ErrorKind::BadParam,
            Self::Internal(_) => ErrorKind::GenericInternal,

            Self::Address(AddressError::Empty) => ErrorKind::NullInput,
            Self::Address(_) => ErrorKind::BadParam,

            Self::Mnemonic(MnemonicError::Empty) => ErrorKind::NullInput,
            Self::Mnemonic(_) => ErrorKind::BadParam,

            Self::Note(e) => match e {
                NoteError::EmptyLabel => ErrorKind::NullInput,
                NoteError::LabelTooLong(_)
                | NoteError::ValueTooLong(_)
                | NoteError::NonFiniteFloat(_) => ErrorKind::BadParam,
                NoteError::TooLong { .. } => ErrorKind::NoteTooLong,
                NoteError::Encoding(_) => ErrorKind::EncodingError,
            },

            Self::Codec(e) => codec_kind(e),

            Self::Assembly(e) => match e {
                AssemblyError::Codec(c) => codec_kind(c),
                AssemblyError::AmountTooSmall(_) => ErrorKind::BadParam,
                AssemblyError::NoteTooLarge(_) => ErrorKind::NoteTooLong,
                AssemblyError::MissingField(_)
                | AssemblyError::ZeroRound
                | AssemblyError::ZeroFee
                | AssemblyError::OutOfRange { .. } => ErrorKind::GenericInternal,
            },

            Self::Signing(e) => match e {
                TransactionSigningError::Signing(_) => ErrorKind::SignatureError,
                TransactionSigningError::Codec(c) => codec_kind(c),
                TransactionSigningError::NotAssembled { .. }
                | TransactionSigningError::HeaderTooSmall(_) => ErrorKind::BufferProtocolError,
            },

            Self::Envelope(e) => match e {
                EnvelopeError::Codec(c) => codec_kind(c),
                EnvelopeError::UnexpectedContent { .. } | EnvelopeError::HeaderMisaligned { .. } => {
                    ErrorKind::BufferProtocolError
                }
            },

            Self::Gateway(e) => match e {
                GatewayError::Transport { .. } | GatewayError::NoContent { .. } => {
                    ErrorKind::NetworkError
                }
                GatewayError::Rejected { .. } => ErrorKind::TransactionRejected,
                GatewayError::UnexpectedStatus { .. } | GatewayError::MalformedResponse { .. } => {
                    ErrorKind::GenericInternal
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SigningError;

    #[test]
    fn empty_inputs_are_null_input() {
        assert_eq!(ClientError::from(AddressError::Empty).kind(), ErrorKind::NullInput);
        assert_eq!(ClientError::from(MnemonicError::Empty).kind(), ErrorKind::NullInput);
        assert_eq!(ClientError::from(NoteError::EmptyLabel).kind(), ErrorKind::NullInput);
    }

    #[test]
    fn buffer_overflow_is_memory_exhausted() {
        let overflow = CodecError::BufferTooShort {
            offset: 0,
            needed: 10,
            capacity: 4,
        };
        assert_eq!(
            ClientError::from(overflow.clone()).kind(),
            ErrorKind::MemoryExhausted
        );
        assert_eq!(
            ClientError::from(AssemblyError::Codec(overflow)).kind(),
            ErrorKind::MemoryExhausted
        );
        assert_eq!(
            ClientError::from(CodecError::MapTooLarge(16)).kind(),
            ErrorKind::BufferProtocolError
        );
    }

    #[test]
    fn note_errors() {
        assert_eq!(
            ClientError::from(NoteError::LabelTooLong(32)).kind(),
            ErrorKind::BadParam
        );
        assert_eq!(
            ClientError::from(NoteError::TooLong { size: 1000, max: 1000 }).kind(),
            ErrorKind::NoteTooLong
        );
        assert_eq!(
            ClientError::from(NoteError::Encoding("x".into())).kind(),
            ErrorKind::EncodingError
        );
    }

    #[test]
    fn signing_errors() {
        assert_eq!(
            ClientError::from(TransactionSigningError::Signing(SigningError::KeypairMismatch))
                .kind(),
            ErrorKind::SignatureError
        );
        assert_eq!(
            ClientError::from(TransactionSigningError::NotAssembled {
                expected: 0,
                found: 0
            })
            .kind(),
            ErrorKind::BufferProtocolError
        );
    }

    #[test]
    fn gateway_status_mapping() {
        let kind = |e: GatewayError| ClientError::from(e).kind();
        assert_eq!(
            kind(GatewayError::NoContent { path: "/p" }),
            ErrorKind::NetworkError
        );
        assert_eq!(
            kind(GatewayError::Transport {
                path: "/p",
                message: "refused".into()
            }),
            ErrorKind::NetworkError
        );
        assert_eq!(
            kind(GatewayError::Rejected {
                message: "overspend".into()
            }),
            ErrorKind::TransactionRejected
        );
        assert_eq!(
            kind(GatewayError::UnexpectedStatus {
                path: "/p",
                status: 500
            }),
            ErrorKind::GenericInternal
        );
    }

    #[test]
    fn kind_display() {
        assert_eq!(ErrorKind::NoteTooLong.to_string(), "note too long");
    }
}
