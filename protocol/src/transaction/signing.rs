//! In-place transaction signing.
//!
//! The ledger signs `"TX" || transaction`. Instead of copying the
//! transaction into a second buffer behind the prefix, the prefix is
//! patched into the last two bytes of the reserved header gap, right in
//! front of the map, and the signature is computed over that contiguous
//! span. The envelope later overwrites the prefix.
//!
//! The same span, hashed with SHA-512/256, is the transaction id.

use thiserror::Error;
use tracing::debug;

use super::builder::AssembledPayload;
use crate::codec::{CodecError, EncodingBuffer};
use crate::config::{SIGNATURE_LENGTH, TRANSACTION_SIGN_PREFIX};
use crate::crypto::hash::transaction_id;
use crate::crypto::keys::{SigningError, SigningPrimitive};
use crate::identity::Account;

/// Failures while signing an assembled transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionSigningError {
    /// Nothing assembled, or the buffer changed since assembly.
    #[error("buffer holds {found} content bytes, expected the {expected}-byte transaction")]
    NotAssembled {
        /// Transaction length recorded at assembly.
        expected: usize,
        /// Content length found in the buffer.
        found: usize,
    },

    /// The reserved header is too small for the prefix.
    #[error("reserved header of {0} bytes cannot hold the signing prefix")]
    HeaderTooSmall(usize),

    /// Buffer access failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The signing primitive failed.
    #[error(transparent)]
    Signing(#[from] SigningError),
}

/// Signature plus the id the ledger will assign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPayload {
    /// Ed25519 signature over `"TX" || transaction`.
    pub signature: [u8; SIGNATURE_LENGTH],
    /// Base32 SHA-512/256 of the same bytes.
    pub transaction_id: String,
}

/// Sign the transaction assembled in `buf` with `account`'s key.
pub fn sign_payload<S: SigningPrimitive>(
    buf: &mut EncodingBuffer,
    payload: &AssembledPayload,
    account: &Account,
    signer: &S,
) -> Result<SignedPayload, TransactionSigningError> {
    if payload.body_len() == 0 || buf.content_len() != payload.body_len() {
        return Err(TransactionSigningError::NotAssembled {
            expected: payload.body_len(),
            found: buf.content_len(),
        });
    }
    if payload.header().len() < TRANSACTION_SIGN_PREFIX.len() {
        return Err(TransactionSigningError::HeaderTooSmall(payload.header().len()));
    }

    let prefix_start = payload.body_start() - TRANSACTION_SIGN_PREFIX.len();
    buf.patch(prefix_start, TRANSACTION_SIGN_PREFIX)?;

    let message = buf.region(
        prefix_start,
        TRANSACTION_SIGN_PREFIX.len() + payload.body_len(),
    )?;
    let signature = signer.sign(account.private_key(), account.sender(), message)?;
    let transaction_id = transaction_id(message);

    debug!(
        signed_len = message.len(),
        txid = %transaction_id,
        "transaction signed"
    );
    Ok(SignedPayload {
        signature,
        transaction_id,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Network, NetworkProfile, MAX_SIGNED_TX_SIZE};
    use crate::crypto::keys::Ed25519Primitive;
    use crate::transaction::envelope::{wrap_signed, ENVELOPE_HEADER_LEN};
    use crate::transaction::{PaymentBuilder, TransactionParams};
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};

    const PHRASE: &str = "shadow market lounge gauge battle small crash funny supreme regular \
        obtain require control oil lend reward galaxy tuition elder owner flavor rural expose \
        absent sniff";

    fn account() -> Account {
        Account::from_mnemonic(PHRASE, &Ed25519Primitive).unwrap()
    }

    fn assembled(account: &Account) -> (EncodingBuffer, AssembledPayload) {
        let profile = NetworkProfile::for_network(Network::Testnet).unwrap();
        let tx = PaymentBuilder::new()
            .sender(*account.sender())
            .receiver(*account.receiver())
            .amount(100_000)
            .params(TransactionParams::new(1_000, 1_000))
            .network(&profile)
            .note(br#"sensor1:j{"t":255}"#.to_vec())
            .build()
            .unwrap();
        let mut buf = EncodingBuffer::with_capacity(MAX_SIGNED_TX_SIZE);
        let payload = tx.assemble(&mut buf).unwrap();
        (buf, payload)
    }

    struct FailingSigner;

    impl SigningPrimitive for FailingSigner {
        fn derive_public_key(&self, secret: &[u8; 32]) -> [u8; 32] {
            Ed25519Primitive.derive_public_key(secret)
        }

        fn sign(
            &self,
            _secret: &[u8; 32],
            _public: &[u8; 32],
            _message: &[u8],
        ) -> Result<[u8; 64], SigningError> {
            Err(SigningError::Backend("secure element unavailable".into()))
        }
    }

    #[test]
    fn prefix_sits_directly_before_the_body() {
        let account = account();
        let (mut buf, payload) = assembled(&account);
        sign_payload(&mut buf, &payload, &account, &Ed25519Primitive).unwrap();

        assert_eq!(
            buf.region(ENVELOPE_HEADER_LEN - 2, 2).unwrap(),
            TRANSACTION_SIGN_PREFIX
        );
        // The patch is not content.
        assert_eq!(buf.content_len(), payload.body_len());
    }

    #[test]
    fn signature_verifies_over_prefixed_body() {
        let account = account();
        let (mut buf, payload) = assembled(&account);
        let signed = sign_payload(&mut buf, &payload, &account, &Ed25519Primitive).unwrap();

        let mut message = b"TX".to_vec();
        message.extend_from_slice(buf.region(payload.body_start(), payload.body_len()).unwrap());

        let key = VerifyingKey::from_bytes(account.sender()).unwrap();
        key.verify(&message, &Signature::from_bytes(&signed.signature))
            .unwrap();
        assert_eq!(signed.transaction_id, transaction_id(&message));
        assert_eq!(signed.transaction_id.len(), 52);
    }

    #[test]
    fn envelope_overwrites_prefix_and_covers_whole_content() {
        let account = account();
        let (mut buf, payload) = assembled(&account);
        let signed = sign_payload(&mut buf, &payload, &account, &Ed25519Primitive).unwrap();
        let body = buf
            .region(payload.body_start(), payload.body_len())
            .unwrap()
            .to_vec();

        let envelope = wrap_signed(&mut buf, &payload, &signed.signature).unwrap();
        assert_eq!(envelope.len(), ENVELOPE_HEADER_LEN + body.len());
        assert_eq!(&envelope[..6], &[0x82, 0xA3, b's', b'i', b'g', 0xC4]);
        assert_eq!(envelope[6], 64);
        assert_eq!(&envelope[7..71], &signed.signature);
        assert_eq!(&envelope[71..75], b"\xA3txn");
        assert_eq!(&envelope[75..], &body[..]);
    }

    #[test]
    fn wrapping_twice_is_refused() {
        let account = account();
        let (mut buf, payload) = assembled(&account);
        let signed = sign_payload(&mut buf, &payload, &account, &Ed25519Primitive).unwrap();
        wrap_signed(&mut buf, &payload, &signed.signature).unwrap();
        assert!(matches!(
            wrap_signed(&mut buf, &payload, &signed.signature),
            Err(crate::transaction::EnvelopeError::UnexpectedContent { .. })
        ));
    }

    #[test]
    fn signing_a_wrapped_buffer_is_refused() {
        let account = account();
        let (mut buf, payload) = assembled(&account);
        let signed = sign_payload(&mut buf, &payload, &account, &Ed25519Primitive).unwrap();
        wrap_signed(&mut buf, &payload, &signed.signature).unwrap();
        assert!(matches!(
            sign_payload(&mut buf, &payload, &account, &Ed25519Primitive),
            Err(TransactionSigningError::NotAssembled { .. })
        ));
    }

    #[test]
    fn primitive_failure_surfaces() {
        let account = account();
        let (mut buf, payload) = assembled(&account);
        assert!(matches!(
            sign_payload(&mut buf, &payload, &account, &FailingSigner),
            Err(TransactionSigningError::Signing(SigningError::Backend(_)))
        ));
    }

    #[test]
    fn signing_is_deterministic() {
        let account = account();
        let (mut a, pa) = assembled(&account);
        let (mut b, pb) = assembled(&account);
        let sa = sign_payload(&mut a, &pa, &account, &Ed25519Primitive).unwrap();
        let sb = sign_payload(&mut b, &pb, &account, &Ed25519Primitive).unwrap();
        assert_eq!(sa, sb);
    }
}
