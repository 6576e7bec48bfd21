//! The device's signing identity.
//!
//! An [`Account`] is recovered once from the 25-word phrase and then never
//! changes: the private key and the sender address are fixed for the life
//! of the process. The only mutable piece is the receiver, which defaults
//! to the sender (payment to self costs nothing but the fee).

use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use super::address::{decode_address, encode_address, AddressError};
use super::mnemonic::{encode_mnemonic, recover_private_key, MnemonicError};
use crate::config::{ADDRESS_LENGTH, PRIVATE_KEY_LENGTH};
use crate::crypto::keys::SigningPrimitive;

/// Private key, sender address and receiver address.
///
/// Deliberately not `Clone` and not `Serialize`: copies of key material
/// should be a conscious act.
pub struct Account {
    private_key: Zeroizing<[u8; PRIVATE_KEY_LENGTH]>,
    sender: [u8; ADDRESS_LENGTH],
    receiver: [u8; ADDRESS_LENGTH],
}

impl Account {
    /// Recover the account from its phrase, deriving the public key with
    /// `primitive`.
    pub fn from_mnemonic<S: SigningPrimitive>(
        phrase: &str,
        primitive: &S,
    ) -> Result<Self, MnemonicError> {
        let private_key = recover_private_key(phrase)?;
        Ok(Self::from_private_key(private_key, primitive))
    }

    /// Build the account around an already-recovered private key.
    pub fn from_private_key<S: SigningPrimitive>(
        private_key: Zeroizing<[u8; PRIVATE_KEY_LENGTH]>,
        primitive: &S,
    ) -> Self {
        let sender = primitive.derive_public_key(&private_key);
        Self {
            private_key,
            sender,
            receiver: sender,
        }
    }

    /// A brand new account from the OS RNG, together with its phrase.
    ///
    /// The phrase is the only backup. Whoever calls this is responsible for
    /// showing it to a human exactly once.
    pub fn generate<S: SigningPrimitive>(primitive: &S) -> (Self, Zeroizing<String>) {
        let mut seed = Zeroizing::new([0u8; PRIVATE_KEY_LENGTH]);
        OsRng.fill_bytes(&mut seed[..]);
        let phrase = Zeroizing::new(encode_mnemonic(&seed));
        (Self::from_private_key(seed, primitive), phrase)
    }

    /// The 32-byte secret seed. Handle with care.
    pub fn private_key(&self) -> &[u8; PRIVATE_KEY_LENGTH] {
        &self.private_key
    }

    /// Binary sender address (= public key).
    pub fn sender(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.sender
    }

    /// Binary receiver address.
    pub fn receiver(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.receiver
    }

    /// Textual sender address, for humans and faucets.
    pub fn address(&self) -> String {
        encode_address(&self.sender)
    }

    /// Send future payments to `address` instead of to self.
    pub fn set_receiver(&mut self, address: &str) -> Result<(), AddressError> {
        self.receiver = decode_address(address)?;
        Ok(())
    }

    /// Send future payments back to self.
    pub fn reset_receiver(&mut self) {
        self.receiver = self.sender;
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret key material, not even partially.
        f.debug_struct("Account")
            .field("sender", &encode_address(&self.sender))
            .field("receiver", &encode_address(&self.receiver))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::Ed25519Primitive;

    const PHRASE: &str = "shadow market lounge gauge battle small crash funny supreme regular \
        obtain require control oil lend reward galaxy tuition elder owner flavor rural expose \
        absent sniff";

    const PHRASE_ADDRESS: &str = "MT3WLS4GKJLZZ6CYFZPRUGR2PSSXXC5ABO72CB45AKNCGSUCSCVNWDKOUY";

    #[test]
    fn known_phrase_yields_known_address() {
        let account = Account::from_mnemonic(PHRASE, &Ed25519Primitive).unwrap();
        assert_eq!(account.address(), PHRASE_ADDRESS);
        assert_eq!(
            hex::encode(account.sender()),
            "64f765cb8652579cf8582e5f1a1a3a7ca57b8ba00bbfa1079d029a234a8290aa"
        );
    }

    #[test]
    fn receiver_defaults_to_sender() {
        let account = Account::from_mnemonic(PHRASE, &Ed25519Primitive).unwrap();
        assert_eq!(account.receiver(), account.sender());
    }

    #[test]
    fn receiver_can_be_redirected_and_reset() {
        let mut account = Account::from_mnemonic(PHRASE, &Ed25519Primitive).unwrap();
        let zero = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ";
        account.set_receiver(zero).unwrap();
        assert_eq!(account.receiver(), &[0u8; 32]);
        account.reset_receiver();
        assert_eq!(account.receiver(), account.sender());
    }

    #[test]
    fn generated_account_round_trips_through_its_phrase() {
        let (account, phrase) = Account::generate(&Ed25519Primitive);
        let recovered = Account::from_mnemonic(&phrase, &Ed25519Primitive).unwrap();
        assert_eq!(recovered.sender(), account.sender());
        assert_eq!(recovered.private_key(), account.private_key());
    }

    #[test]
    fn debug_output_hides_the_private_key() {
        let account = Account::from_mnemonic(PHRASE, &Ed25519Primitive).unwrap();
        let rendered = format!("{:?}", account);
        assert!(rendered.contains(PHRASE_ADDRESS));
        assert!(!rendered.contains("260ea208"));
    }
}
