//! # Transaction Module
//!
//! Construction, signing and wrapping of payment transactions, all inside
//! one fixed-capacity buffer.
//!
//! ## Architecture
//!
//! ```text
//! types.rs    — TransactionType and the node's suggested parameters
//! builder.rs  — PaymentBuilder and canonical assembly behind a blank header
//! signing.rs  — "TX" prefix patch, Ed25519 signature, transaction id
//! envelope.rs — {"sig", "txn"} header written over the blank gap
//! ```
//!
//! ## Buffer Lifecycle
//!
//! 1. **Assemble** — [`PaymentTransaction::assemble`] reserves
//!    [`ENVELOPE_HEADER_LEN`] blank bytes and writes the map after them.
//! 2. **Sign** — [`sign_payload`] patches `"TX"` into the last two blank
//!    bytes and signs from there to the end of the map.
//! 3. **Wrap** — [`wrap_signed`] seeks to 0 and writes the envelope header,
//!    which ends exactly where the map begins. The buffer now holds the
//!    submittable envelope from offset 0.
//!
//! ## Design Decisions
//!
//! - All amounts, fees and rounds are `u32`. That is all the encoder
//!   supports, and a device paying more than 4294 units per reading has
//!   other problems.
//! - A buffer is single use. Signing or wrapping a buffer whose content
//!   length no longer matches the assembled transaction is refused.

pub mod builder;
pub mod envelope;
pub mod signing;
pub mod types;

pub use builder::{AssembledPayload, AssemblyError, PaymentBuilder, PaymentTransaction};
pub use envelope::{wrap_signed, EnvelopeError, ENVELOPE_HEADER_LEN};
pub use signing::{sign_payload, SignedPayload, TransactionSigningError};
pub use types::{TransactionParams, TransactionType};
