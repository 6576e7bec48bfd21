//! # Protocol Configuration & Constants
//!
//! Every magic number the device client relies on lives here. If you're
//! hardcoding a constant somewhere else, you're doing it wrong.
//!
//! Most of these values are dictated by the ledger itself (genesis hashes,
//! the "TX" signing prefix, the 1000-byte note ceiling). Changing them does
//! not make the ledger agree with you; it just makes your signatures fail.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Network Identifiers
// ---------------------------------------------------------------------------

/// Genesis id of the public test network.
pub const TESTNET_GENESIS_ID: &str = "testnet-v1.0";

/// Base64 genesis hash of the public test network.
pub const TESTNET_GENESIS_HASH: &str = "SGO1GKSzyE7IEPItTxCByw9x8FmnrCDexi9/cOUJOiI=";

/// Public REST gateway for the test network. No API token required.
pub const TESTNET_API_ENDPOINT: &str = "https://testnet-api.algonode.cloud";

/// Genesis id of the main network. Real money lives here.
pub const MAINNET_GENESIS_ID: &str = "mainnet-v1.0";

/// Base64 genesis hash of the main network.
pub const MAINNET_GENESIS_HASH: &str = "wGHE2Pwdvd7S12BL5FaOP20EGYesN73ktiC1qzkkit8=";

/// Public REST gateway for the main network.
pub const MAINNET_API_ENDPOINT: &str = "https://mainnet-api.algonode.cloud";

/// Longest genesis id the transaction schema accepts.
pub const MAX_GENESIS_ID_CHARS: usize = 12;

/// Longest REST base URL accepted by the endpoint override.
pub const MAX_API_ENDPOINT_CHARS: usize = 128;

/// Longest API token accepted by the token setter.
pub const MAX_API_TOKEN_CHARS: usize = 32;

/// Header carrying the API token, for gateways that want one.
pub const API_TOKEN_HEADER: &str = "X-Algo-API-Token";

// ---------------------------------------------------------------------------
// REST Gateway
// ---------------------------------------------------------------------------

/// Path of the suggested-parameters query (current round, minimum fee).
pub const TRANSACTION_PARAMS_PATH: &str = "/v2/transactions/params";

/// Path the signed envelope is POSTed to.
pub const SUBMIT_TRANSACTION_PATH: &str = "/v2/transactions";

/// MIME type of the signed envelope.
pub const SUBMIT_CONTENT_TYPE: &str = "application/msgpack";

/// Connect timeout for both gateway calls.
pub const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Whole-request timeout for both gateway calls.
pub const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Length cap applied to the transaction id returned by the gateway.
pub const TRANSACTION_ID_MAX_CHARS: usize = 64;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Ed25519 secret key (seed) length.
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// Ed25519 public key length. The public key *is* the binary address.
pub const ADDRESS_LENGTH: usize = 32;

/// Trailing checksum bytes carried by a decoded textual address.
pub const ADDRESS_CHECKSUM_LENGTH: usize = 4;

/// Characters in a textual (Base32, unpadded) address.
pub const ADDRESS_TEXT_LENGTH: usize = 58;

/// Ed25519 signature length. Always 64 bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// Length of a decoded genesis hash.
pub const GENESIS_HASH_LENGTH: usize = 32;

/// Domain-separation prefix prepended to a transaction before signing.
pub const TRANSACTION_SIGN_PREFIX: &[u8; 2] = b"TX";

// ---------------------------------------------------------------------------
// Mnemonic Parameters
// ---------------------------------------------------------------------------

/// Words in an account phrase: 24 key words plus 1 checksum word.
pub const MNEMONIC_WORD_COUNT: usize = 25;

/// Shortest word in the reference list.
pub const MNEMONIC_MIN_WORD_LEN: usize = 3;

/// Bits of entropy carried by each word (2048-entry list).
pub const MNEMONIC_BITS_PER_WORD: usize = 11;

// ---------------------------------------------------------------------------
// Transaction Limits
// ---------------------------------------------------------------------------

/// Rounds a transaction stays valid for, counted from the first valid round.
pub const VALIDITY_WINDOW_ROUNDS: u32 = 1_000;

/// Hard ceiling on the note field, preamble included.
pub const MAX_NOTE_SIZE: usize = 1_000;

/// Longest note label, short string value, or application name.
pub const MAX_LABEL_LENGTH: usize = 31;

/// Capacity of the buffer a signed envelope is built in. The largest
/// payment with a full note measures a little over 1250 bytes.
pub const MAX_SIGNED_TX_SIZE: usize = 1_280;

/// Smallest payment the client will emit, in microunits.
pub const MIN_PAYMENT_AMOUNT: u32 = 1;

/// Payment emitted when the caller does not pick one, in microunits.
pub const DEFAULT_PAYMENT_AMOUNT: u32 = 100_000;

// ---------------------------------------------------------------------------
// Network Selection
// ---------------------------------------------------------------------------

/// Ledger network the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Network {
    /// The free public test network. The default, because mistakes are free here.
    #[default]
    Testnet,
    /// The main network.
    Mainnet,
}

/// Raised when a network name does not parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown network {0:?}, expected \"testnet\" or \"mainnet\"")]
pub struct UnknownNetwork(pub String);

impl Network {
    /// Genesis id written into the `gen` field.
    pub fn genesis_id(self) -> &'static str {
        match self {
            Network::Testnet => TESTNET_GENESIS_ID,
            Network::Mainnet => MAINNET_GENESIS_ID,
        }
    }

    /// Base64 genesis hash written (decoded) into the `gh` field.
    pub fn genesis_hash_b64(self) -> &'static str {
        match self {
            Network::Testnet => TESTNET_GENESIS_HASH,
            Network::Mainnet => MAINNET_GENESIS_HASH,
        }
    }

    /// Default public REST gateway.
    pub fn api_endpoint(self) -> &'static str {
        match self {
            Network::Testnet => TESTNET_API_ENDPOINT,
            Network::Mainnet => MAINNET_API_ENDPOINT,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Testnet => write!(f, "testnet"),
            Network::Mainnet => write!(f, "mainnet"),
        }
    }
}

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            other => Err(UnknownNetwork(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// NetworkProfile
// ---------------------------------------------------------------------------

/// Everything a transaction needs to know about the network it targets.
///
/// Built once per [`Network`] selection; read-only afterwards (the REST
/// base URL can be overridden for private gateways).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkProfile {
    network: Network,
    genesis_hash: [u8; GENESIS_HASH_LENGTH],
    api_base: String,
}

impl NetworkProfile {
    /// Builds the profile for `network`, decoding its genesis hash.
    pub fn for_network(network: Network) -> Result<Self, crate::identity::AddressError> {
        let genesis_hash = crate::identity::decode_genesis_hash(network.genesis_hash_b64())?;
        Ok(Self {
            network,
            genesis_hash,
            api_base: network.api_endpoint().to_string(),
        })
    }

    /// Which network this profile describes.
    pub fn network(&self) -> Network {
        self.network
    }

    /// The `gen` string.
    pub fn genesis_id(&self) -> &'static str {
        self.network.genesis_id()
    }

    /// The decoded `gh` bytes.
    pub fn genesis_hash(&self) -> &[u8; GENESIS_HASH_LENGTH] {
        &self.genesis_hash
    }

    /// REST base URL, without trailing slash.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Points the profile at a different gateway. Trailing slashes are dropped
    /// so paths can be appended verbatim.
    pub fn set_api_base(&mut self, url: &str) {
        self.api_base = url.trim_end_matches('/').to_string();
    }
}
