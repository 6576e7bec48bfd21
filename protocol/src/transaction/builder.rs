//! Payment assembly via the builder pattern.
//!
//! [`PaymentBuilder`] collects the fields, [`PaymentTransaction`] holds a
//! validated payment, and [`PaymentTransaction::assemble`] writes it into an
//! [`EncodingBuffer`] in canonical form.
//!
//! Canonical form is what the verifying node re-derives before it checks
//! the signature, so it is not negotiable:
//!
//! - a single map, keys in byte-wise ascending order:
//!   `amt fee fv gen gh lv [note] rcv snd type`
//! - integers in their narrowest encoding
//! - `note` as bin8 below 256 bytes, bin16 from 256 on
//!
//! The map starts [`ENVELOPE_HEADER_LEN`] bytes into the buffer. The gap is
//! filled by the signer and then by the envelope, see
//! [`super::signing`] and [`super::envelope`].

use thiserror::Error;
use tracing::{debug, trace};

use super::envelope::ENVELOPE_HEADER_LEN;
use super::types::{TransactionParams, TransactionType};
use crate::codec::{CodecError, EncodingBuffer, Reservation};
use crate::config::{
    NetworkProfile, ADDRESS_LENGTH, GENESIS_HASH_LENGTH, MAX_NOTE_SIZE, MIN_PAYMENT_AMOUNT,
    VALIDITY_WINDOW_ROUNDS,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Reasons a payment cannot be built or written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    /// A required builder field was never set.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Payment below the minimum amount.
    #[error("payment amount {0} is below the minimum of {MIN_PAYMENT_AMOUNT}")]
    AmountTooSmall(u32),

    /// The node reported round zero.
    #[error("node reported round 0")]
    ZeroRound,

    /// The node reported a zero minimum fee.
    #[error("node reported a zero minimum fee")]
    ZeroFee,

    /// Round or fee too large for this encoder.
    #[error("{field} value {value} does not fit 32 bits")]
    OutOfRange {
        /// Which parameter.
        field: &'static str,
        /// Reported value.
        value: u64,
    },

    /// Note blob larger than the ceiling.
    #[error("note is {0} bytes, ceiling is {MAX_NOTE_SIZE}")]
    NoteTooLarge(usize),

    /// Encoder failure, most likely the buffer filling up.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

// ---------------------------------------------------------------------------
// PaymentTransaction
// ---------------------------------------------------------------------------

/// A validated, unsigned payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentTransaction {
    /// Amount in microunits.
    pub amount: u32,
    /// Fee in microunits.
    pub fee: u32,
    /// First valid round.
    pub first_valid: u32,
    /// Last valid round.
    pub last_valid: u32,
    /// Genesis id of the target network.
    pub genesis_id: String,
    /// Genesis hash of the target network.
    pub genesis_hash: [u8; GENESIS_HASH_LENGTH],
    /// Optional note blob, already preamble-prefixed.
    pub note: Option<Vec<u8>>,
    /// Receiving address.
    pub receiver: [u8; ADDRESS_LENGTH],
    /// Sending address.
    pub sender: [u8; ADDRESS_LENGTH],
    /// Always [`TransactionType::Payment`].
    pub tx_type: TransactionType,
}

/// Where an assembled transaction lives inside its buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssembledPayload {
    header: Reservation,
    body_len: usize,
}

impl AssembledPayload {
    /// The blank gap in front of the transaction.
    pub fn header(&self) -> Reservation {
        self.header
    }

    /// First byte of the transaction map.
    pub fn body_start(&self) -> usize {
        self.header.end()
    }

    /// Length of the transaction map.
    pub fn body_len(&self) -> usize {
        self.body_len
    }
}

impl PaymentTransaction {
    /// Entries in the transaction map: 9, or 10 with a note.
    pub fn field_count(&self) -> usize {
        if self.note.is_some() {
            10
        } else {
            9
        }
    }

    /// Write the canonical transaction into a fresh `buf`.
    ///
    /// The cursor ends right after the map; `buf.content_len()` equals the
    /// map length.
    pub fn assemble(&self, buf: &mut EncodingBuffer) -> Result<AssembledPayload, AssemblyError> {
        let header = buf.reserve(ENVELOPE_HEADER_LEN)?;
        trace!(header_len = header.len(), "envelope header reserved");

        buf.write_map_header(self.field_count())?;

        buf.write_str("amt")?;
        buf.write_uint(self.amount)?;

        buf.write_str("fee")?;
        buf.write_uint(self.fee)?;

        buf.write_str("fv")?;
        buf.write_uint(self.first_valid)?;

        buf.write_str("gen")?;
        buf.write_str(&self.genesis_id)?;

        buf.write_str("gh")?;
        buf.write_bin8(&self.genesis_hash)?;

        buf.write_str("lv")?;
        buf.write_uint(self.last_valid)?;

        if let Some(note) = &self.note {
            buf.write_str("note")?;
            buf.write_bin(note)?;
        }

        buf.write_str("rcv")?;
        buf.write_bin8(&self.receiver)?;

        buf.write_str("snd")?;
        buf.write_bin8(&self.sender)?;

        buf.write_str("type")?;
        buf.write_str(self.tx_type.as_str())?;

        let payload = AssembledPayload {
            header,
            body_len: buf.content_len(),
        };
        debug!(
            body_len = payload.body_len,
            fields = self.field_count(),
            first_valid = self.first_valid,
            last_valid = self.last_valid,
            "payment assembled"
        );
        Ok(payload)
    }
}

// ---------------------------------------------------------------------------
// PaymentBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`PaymentTransaction`].
///
/// # Example
///
/// ```rust
/// use sensorpay_protocol::config::{Network, NetworkProfile};
/// use sensorpay_protocol::transaction::{PaymentBuilder, TransactionParams};
///
/// let profile = NetworkProfile::for_network(Network::Testnet).unwrap();
/// let tx = PaymentBuilder::new()
///     .sender([1u8; 32])
///     .receiver([2u8; 32])
///     .amount(100_000)
///     .params(TransactionParams::new(1_000, 1_000))
///     .network(&profile)
///     .build()
///     .unwrap();
/// assert_eq!(tx.last_valid, 2_000);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PaymentBuilder {
    sender: Option<[u8; ADDRESS_LENGTH]>,
    receiver: Option<[u8; ADDRESS_LENGTH]>,
    amount: Option<u32>,
    params: Option<TransactionParams>,
    genesis: Option<(String, [u8; GENESIS_HASH_LENGTH])>,
    note: Option<Vec<u8>>,
}

impl PaymentBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sending address (the signer's public key).
    pub fn sender(mut self, address: [u8; ADDRESS_LENGTH]) -> Self {
        self.sender = Some(address);
        self
    }

    /// Receiving address.
    pub fn receiver(mut self, address: [u8; ADDRESS_LENGTH]) -> Self {
        self.receiver = Some(address);
        self
    }

    /// Amount in microunits.
    pub fn amount(mut self, amount: u32) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Round and fee from the node.
    pub fn params(mut self, params: TransactionParams) -> Self {
        self.params = Some(params);
        self
    }

    /// Genesis id and hash of the target network.
    pub fn network(mut self, profile: &NetworkProfile) -> Self {
        self.genesis = Some((profile.genesis_id().to_string(), *profile.genesis_hash()));
        self
    }

    /// Note blob. An empty blob means no note.
    pub fn note(mut self, note: Vec<u8>) -> Self {
        self.note = if note.is_empty() { None } else { Some(note) };
        self
    }

    /// Validate and produce the payment.
    pub fn build(self) -> Result<PaymentTransaction, AssemblyError> {
        let sender = self.sender.ok_or(AssemblyError::MissingField("sender"))?;
        let receiver = self.receiver.ok_or(AssemblyError::MissingField("receiver"))?;
        let amount = self.amount.ok_or(AssemblyError::MissingField("amount"))?;
        let params = self.params.ok_or(AssemblyError::MissingField("params"))?;
        let (genesis_id, genesis_hash) =
            self.genesis.ok_or(AssemblyError::MissingField("network"))?;

        if amount < MIN_PAYMENT_AMOUNT {
            return Err(AssemblyError::AmountTooSmall(amount));
        }
        if params.last_round == 0 {
            return Err(AssemblyError::ZeroRound);
        }
        if params.min_fee == 0 {
            return Err(AssemblyError::ZeroFee);
        }
        let fee = narrow("min-fee", params.min_fee)?;
        let first_valid = narrow("last-round", params.last_round)?;
        let last_valid = first_valid
            .checked_add(VALIDITY_WINDOW_ROUNDS)
            .ok_or(AssemblyError::OutOfRange {
                field: "last-round",
                value: params.last_round,
            })?;

        if let Some(note) = &self.note {
            if note.len() > MAX_NOTE_SIZE {
                return Err(AssemblyError::NoteTooLarge(note.len()));
            }
        }

        Ok(PaymentTransaction {
            amount,
            fee,
            first_valid,
            last_valid,
            genesis_id,
            genesis_hash,
            note: self.note,
            receiver,
            sender,
            tx_type: TransactionType::Payment,
        })
    }
}

fn narrow(field: &'static str, value: u64) -> Result<u32, AssemblyError> {
    u32::try_from(value).map_err(|_| AssemblyError::OutOfRange { field, value })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
