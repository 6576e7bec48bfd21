//! [`TelemetryClient`]: the public surface a device firmware talks to.

use tracing::{debug, info, warn};

use super::error::ClientError;
use super::stage::SubmissionStage;
use crate::codec::EncodingBuffer;
use crate::config::{
    Network, NetworkProfile, ADDRESS_TEXT_LENGTH, DEFAULT_PAYMENT_AMOUNT, MAX_API_ENDPOINT_CHARS,
    MAX_API_TOKEN_CHARS, MAX_SIGNED_TX_SIZE, MIN_PAYMENT_AMOUNT,
};
use crate::crypto::keys::{Ed25519Primitive, SigningPrimitive};
use crate::gateway::{fetch_params, submit_transaction, HttpClient};
use crate::identity::Account;
use crate::note::{NoteDocument, NoteValue};
use crate::transaction::{sign_payload, wrap_signed, PaymentBuilder};

/// A sensor's ledger client.
///
/// Holds the account, the target network, and the telemetry waiting to go
/// out with the next payment. Each [`submit`](Self::submit) turns the
/// pending telemetry into one signed payment and posts it.
///
/// Telemetry is **not** cleared by a submission. Call
/// [`clear_note`](Self::clear_note) when the next payment should carry only
/// fresh readings.
///
/// # Example
///
/// ```rust,no_run
/// use sensorpay_protocol::client::TelemetryClient;
/// use sensorpay_protocol::gateway::ReqwestHttpClient;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let phrase = std::env::var("SENSORPAY_MNEMONIC")?;
/// let mut client = TelemetryClient::new("sensor1", &phrase, ReqwestHttpClient::new()?)?;
/// client.add_u16("t", 255)?;
/// client.add_f32("h", 55.5)?;
/// let txid = client.submit()?;
/// println!("{}", txid);
/// # Ok(())
/// # }
/// ```
pub struct TelemetryClient<H: HttpClient, S: SigningPrimitive = Ed25519Primitive> {
    account: Account,
    signer: S,
    http: H,
    profile: NetworkProfile,
    api_endpoint_override: Option<String>,
    api_token: Option<String>,
    payment_amount: u32,
    note: NoteDocument,
    transaction_id: String,
    failed_stage: Option<SubmissionStage>,
}

impl<H: HttpClient> TelemetryClient<H> {
    /// Client for `app_name` using the account behind `mnemonic`, signing
    /// with the built-in Ed25519 implementation.
    pub fn new(app_name: &str, mnemonic: &str, http: H) -> Result<Self, ClientError> {
        Self::with_signer(app_name, mnemonic, http, Ed25519Primitive)
    }
}

impl<H: HttpClient, S: SigningPrimitive> TelemetryClient<H, S> {
    /// Client with a caller-supplied signing primitive.
    pub fn with_signer(
        app_name: &str,
        mnemonic: &str,
        http: H,
        signer: S,
    ) -> Result<Self, ClientError> {
        let note = NoteDocument::new(app_name)?;
        let account = Account::from_mnemonic(mnemonic, &signer)?;
        let profile = network_profile(Network::default())?;

        info!(
            app = app_name,
            address = %account.address(),
            network = %profile.network(),
            "telemetry client ready"
        );

        Ok(Self {
            account,
            signer,
            http,
            profile,
            api_endpoint_override: None,
            api_token: None,
            payment_amount: DEFAULT_PAYMENT_AMOUNT,
            note,
            transaction_id: String::new(),
            failed_stage: None,
        })
    }

    // -----------------------------------------------------------------------
    // Settings
    // -----------------------------------------------------------------------

    /// Pay `address` instead of the device's own account.
    ///
    /// The address must be the full 58-character form. Its checksum is not
    /// verified; see [`crate::identity::decode_address_checked`] for that.
    pub fn set_destination_address(&mut self, address: &str) -> Result<(), ClientError> {
        if address.is_empty() {
            return Err(ClientError::NullInput("destination address"));
        }
        if address.len() != ADDRESS_TEXT_LENGTH {
            return Err(ClientError::BadParam {
                field: "destination address",
                reason: format!(
                    "expected {} characters, got {}",
                    ADDRESS_TEXT_LENGTH,
                    address.len()
                ),
            });
        }
        self.account.set_receiver(address)?;
        debug!(receiver = address, "destination address set");
        Ok(())
    }

    /// Switch network. A custom endpoint set earlier stays in effect.
    pub fn set_network(&mut self, network: Network) -> Result<(), ClientError> {
        let mut profile = network_profile(network)?;
        if let Some(url) = &self.api_endpoint_override {
            profile.set_api_base(url);
        }
        self.profile = profile;
        info!(%network, api = self.profile.api_base(), "network selected");
        Ok(())
    }

    /// Talk to a gateway other than the network's public default.
    pub fn set_api_endpoint(&mut self, url: &str) -> Result<(), ClientError> {
        if url.is_empty() {
            return Err(ClientError::NullInput("API endpoint"));
        }
        if url.len() > MAX_API_ENDPOINT_CHARS {
            return Err(ClientError::BadParam {
                field: "API endpoint",
                reason: format!("longer than {} characters", MAX_API_ENDPOINT_CHARS),
            });
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ClientError::BadParam {
                field: "API endpoint",
                reason: "must start with http:// or https://".into(),
            });
        }
        self.profile.set_api_base(url);
        self.api_endpoint_override = Some(url.to_string());
        info!(api = self.profile.api_base(), "API endpoint overridden");
        Ok(())
    }

    /// Token sent with every request, for gateways that require one.
    pub fn set_api_token(&mut self, token: &str) -> Result<(), ClientError> {
        if token.is_empty() {
            return Err(ClientError::NullInput("API token"));
        }
        if token.len() > MAX_API_TOKEN_CHARS {
            return Err(ClientError::BadParam {
                field: "API token",
                reason: format!("longer than {} characters", MAX_API_TOKEN_CHARS),
            });
        }
        self.api_token = Some(token.to_string());
        debug!("API token set");
        Ok(())
    }

    /// Amount paid with each submission, in microunits.
    pub fn set_payment_amount(&mut self, amount: u32) -> Result<(), ClientError> {
        if amount < MIN_PAYMENT_AMOUNT {
            return Err(ClientError::BadParam {
                field: "payment amount",
                reason: format!("must be at least {}", MIN_PAYMENT_AMOUNT),
            });
        }
        self.payment_amount = amount;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Telemetry
    // -----------------------------------------------------------------------

    pub fn add_i8(&mut self, label: &str, value: i8) -> Result<(), ClientError> {
        self.add(label, NoteValue::I8(value))
    }

    pub fn add_u8(&mut self, label: &str, value: u8) -> Result<(), ClientError> {
        self.add(label, NoteValue::U8(value))
    }

    pub fn add_i16(&mut self, label: &str, value: i16) -> Result<(), ClientError> {
        self.add(label, NoteValue::I16(value))
    }

    pub fn add_u16(&mut self, label: &str, value: u16) -> Result<(), ClientError> {
        self.add(label, NoteValue::U16(value))
    }

    pub fn add_i32(&mut self, label: &str, value: i32) -> Result<(), ClientError> {
        self.add(label, NoteValue::I32(value))
    }

    pub fn add_u32(&mut self, label: &str, value: u32) -> Result<(), ClientError> {
        self.add(label, NoteValue::U32(value))
    }

    /// NaN and infinities are refused.
    pub fn add_f32(&mut self, label: &str, value: f32) -> Result<(), ClientError> {
        self.add(label, NoteValue::F32(value))
    }

    /// Strings are limited to 31 bytes.
    pub fn add_text(&mut self, label: &str, value: &str) -> Result<(), ClientError> {
        self.add(label, NoteValue::Text(value.to_string()))
    }

    /// Store any typed value.
    ///
    /// A [`NoteTooLong`](super::ErrorKind::NoteTooLong) failure still stores
    /// the field; the document stays over budget until cleared.
    pub fn add(&mut self, label: &str, value: NoteValue) -> Result<(), ClientError> {
        self.note.insert(label, value).map_err(ClientError::from)
    }

    /// Forget all pending telemetry.
    pub fn clear_note(&mut self) {
        self.note.clear();
        debug!("note cleared");
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Pending telemetry.
    pub fn note(&self) -> &NoteDocument {
        &self.note
    }

    /// The device account.
    pub fn account(&self) -> &Account {
        &self.account
    }

    /// Textual address of the device account.
    pub fn address(&self) -> String {
        self.account.address()
    }

    /// Current network.
    pub fn network(&self) -> Network {
        self.profile.network()
    }

    /// REST base URL in use.
    pub fn api_endpoint(&self) -> &str {
        self.profile.api_base()
    }

    /// Amount paid with each submission.
    pub fn payment_amount(&self) -> u32 {
        self.payment_amount
    }

    /// Id of the last accepted transaction, empty before the first.
    /// A failed submission leaves it unchanged.
    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    /// Stage the last submission stopped at, `None` after a success.
    ///
    /// A failure at a stage where
    /// [`crosses_network`](SubmissionStage::crosses_network) holds may succeed
    /// on a later attempt. A local failure repeats until the inputs change.
    pub fn failed_stage(&self) -> Option<SubmissionStage> {
        self.failed_stage
    }

    // -----------------------------------------------------------------------
    // Submission
    // -----------------------------------------------------------------------

    /// Build, sign and post one payment carrying the pending telemetry.
    ///
    /// Blocks for up to two HTTP round trips. Returns the transaction id
    /// assigned by the node. Nothing is retried.
    pub fn submit(&mut self) -> Result<String, ClientError> {
        let mut stage = SubmissionStage::NoteReady;
        match self.run_submission(&mut stage) {
            Ok(tx_id) => {
                self.transaction_id = tx_id.clone();
                self.failed_stage = None;
                debug!(stage = %stage, "stage reached");
                Ok(tx_id)
            }
            Err(err) => {
                self.failed_stage = Some(stage);
                warn!(
                    stage = %stage,
                    network = stage.crosses_network(),
                    kind = %err.kind(),
                    error = %err,
                    "submission aborted"
                );
                Err(err)
            }
        }
    }

    /// Runs every stage up to `Submitted`. `stage` always names the stage
    /// being worked towards, so on error it is the one that failed.
    fn run_submission(&self, stage: &mut SubmissionStage) -> Result<String, ClientError> {
        let note = if self.note.is_empty() {
            Vec::new()
        } else {
            self.note.to_note_bytes()?
        };
        advance(stage);

        let params = fetch_params(
            &self.http,
            self.profile.api_base(),
            self.api_token.as_deref(),
        )?;
        advance(stage);

        let tx = PaymentBuilder::new()
            .sender(*self.account.sender())
            .receiver(*self.account.receiver())
            .amount(self.payment_amount)
            .params(params)
            .network(&self.profile)
            .note(note)
            .build()?;
        let mut buf = EncodingBuffer::with_capacity(MAX_SIGNED_TX_SIZE);
        let payload = tx.assemble(&mut buf)?;
        advance(stage);

        let signed = sign_payload(&mut buf, &payload, &self.account, &self.signer)?;
        advance(stage);

        let envelope = wrap_signed(&mut buf, &payload, &signed.signature)?;
        advance(stage);

        let tx_id = submit_transaction(
            &self.http,
            self.profile.api_base(),
            self.api_token.as_deref(),
            envelope,
        )?;
        if tx_id != signed.transaction_id {
            warn!(
                node = %tx_id,
                local = %signed.transaction_id,
                "node transaction id differs from locally derived id"
            );
        }
        advance(stage);

        Ok(tx_id)
    }
}

fn advance(stage: &mut SubmissionStage) {
    debug!(stage = %stage, "stage reached");
    if let Some(next) = stage.next() {
        *stage = next;
    }
}

fn network_profile(network: Network) -> Result<NetworkProfile, ClientError> {
    NetworkProfile::for_network(network).map_err(|e| ClientError::Internal(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ErrorKind;
    use crate::config::{MAINNET_API_ENDPOINT, TESTNET_API_ENDPOINT};
    use crate::gateway::HttpResponse;
    use std::cell::RefCell;

    const PHRASE: &str = "shadow market lounge gauge battle small crash funny supreme regular \
        obtain require control oil lend reward galaxy tuition elder owner flavor rural expose \
        absent sniff";

    const ZERO_ADDRESS: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ";

    #[derive(Debug, thiserror::Error)]
    #[error("offline")]
    struct Offline;

    /// Answers GET and POST from fixed responses and keeps the posted body.
    struct Scripted {
        get: HttpResponse,
        post: HttpResponse,
        posted: RefCell<Option<Vec<u8>>>,
        urls: RefCell<Vec<String>>,
    }

    impl Scripted {
        fn ok() -> Self {
            Self {
                get: HttpResponse::new(200, r#"{"last-round":1000,"min-fee":1000}"#),
                post: HttpResponse::new(200, r#"{"txId":"ABC123"}"#),
                posted: RefCell::new(None),
                urls: RefCell::new(Vec::new()),
            }
        }
    }

    impl HttpClient for Scripted {
        type Error = Offline;

        fn get(&self, url: &str, _headers: &[(&str, &str)]) -> Result<HttpResponse, Offline> {
            self.urls.borrow_mut().push(url.to_string());
            Ok(self.get.clone())
        }

        fn post(
            &self,
            url: &str,
            _headers: &[(&str, &str)],
            body: Vec<u8>,
        ) -> Result<HttpResponse, Offline> {
            self.urls.borrow_mut().push(url.to_string());
            *self.posted.borrow_mut() = Some(body);
            Ok(self.post.clone())
        }
    }

    fn client() -> TelemetryClient<Scripted> {
        TelemetryClient::new("sensor1", PHRASE, Scripted::ok()).unwrap()
    }

    #[test]
    fn construction_validates_inputs() {
        let kind = |app: &str, phrase: &str| {
            TelemetryClient::new(app, phrase, Scripted::ok())
                .err()
                .map(|e| e.kind())
        };
        assert_eq!(kind("", PHRASE), Some(ErrorKind::NullInput));
        assert_eq!(kind(&"a".repeat(32), PHRASE), Some(ErrorKind::BadParam));
        assert_eq!(kind("sensor1", ""), Some(ErrorKind::NullInput));
        assert_eq!(kind("sensor1", "not a phrase"), Some(ErrorKind::BadParam));
        assert_eq!(kind("sensor1", PHRASE), None);
    }

    #[test]
    fn defaults() {
        let c = client();
        assert_eq!(c.network(), Network::Testnet);
        assert_eq!(c.api_endpoint(), TESTNET_API_ENDPOINT);
        assert_eq!(c.payment_amount(), DEFAULT_PAYMENT_AMOUNT);
        assert_eq!(c.transaction_id(), "");
        assert_eq!(c.account().receiver(), c.account().sender());
    }

    #[test]
    fn destination_must_be_58_chars() {
        let mut c = client();
        assert_eq!(
            c.set_destination_address("").unwrap_err().kind(),
            ErrorKind::NullInput
        );
        assert_eq!(
            c.set_destination_address("AAAA").unwrap_err().kind(),
            ErrorKind::BadParam
        );
        let bad_char = format!("{}!", &ZERO_ADDRESS[..57]);
        assert_eq!(
            c.set_destination_address(&bad_char).unwrap_err().kind(),
            ErrorKind::BadParam
        );
        c.set_destination_address(ZERO_ADDRESS).unwrap();
        assert_eq!(c.account().receiver(), &[0u8; 32]);
    }

    #[test]
    fn endpoint_override_survives_network_switch() {
        let mut c = client();
        c.set_network(Network::Mainnet).unwrap();
        assert_eq!(c.api_endpoint(), MAINNET_API_ENDPOINT);

        c.set_api_endpoint("http://127.0.0.1:4001/").unwrap();
        c.set_network(Network::Testnet).unwrap();
        assert_eq!(c.api_endpoint(), "http://127.0.0.1:4001");
        assert_eq!(c.network(), Network::Testnet);
    }

    #[test]
    fn endpoint_and_token_limits() {
        let mut c = client();
        assert_eq!(c.set_api_endpoint("").unwrap_err().kind(), ErrorKind::NullInput);
        assert_eq!(
            c.set_api_endpoint("ftp://node").unwrap_err().kind(),
            ErrorKind::BadParam
        );
        let long = format!("http://{}", "a".repeat(MAX_API_ENDPOINT_CHARS));
        assert_eq!(c.set_api_endpoint(&long).unwrap_err().kind(), ErrorKind::BadParam);

        c.set_api_token(&"t".repeat(MAX_API_TOKEN_CHARS)).unwrap();
        assert_eq!(
            c.set_api_token(&"t".repeat(MAX_API_TOKEN_CHARS + 1))
                .unwrap_err()
                .kind(),
            ErrorKind::BadParam
        );
        assert_eq!(c.set_api_token("").unwrap_err().kind(), ErrorKind::NullInput);
    }

    #[test]
    fn payment_amount_minimum() {
        let mut c = client();
        assert_eq!(c.set_payment_amount(0).unwrap_err().kind(), ErrorKind::BadParam);
        c.set_payment_amount(1).unwrap();
        assert_eq!(c.payment_amount(), 1);
    }

    #[test]
    fn submit_records_transaction_id_and_keeps_note() {
        let mut c = client();
        c.add_u16("t", 255).unwrap();
        c.add_f32("h", 55.5).unwrap();

        assert_eq!(c.submit().unwrap(), "ABC123");
        assert_eq!(c.transaction_id(), "ABC123");
        assert_eq!(c.note().len(), 2);

        let urls = c.http.urls.borrow();
        assert_eq!(urls[0], format!("{}/v2/transactions/params", TESTNET_API_ENDPOINT));
        assert_eq!(urls[1], format!("{}/v2/transactions", TESTNET_API_ENDPOINT));
    }

    #[test]
    fn submit_without_telemetry_has_no_note_field() {
        let mut c = client();
        c.submit().unwrap();
        let posted = c.http.posted.borrow().clone().unwrap();
        assert!(!posted.windows(5).any(|w| w == b"\xA4note"));
        // fixmap(9) right after the 75-byte envelope header.
        assert_eq!(posted[75], 0x89);
    }

    #[test]
    fn failed_submit_leaves_previous_id() {
        let mut c = client();
        c.submit().unwrap();
        c.http.post = HttpResponse::new(400, r#"{"message":"overspend"}"#);
        let err = c.submit().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransactionRejected);
        assert_eq!(c.transaction_id(), "ABC123");
        assert_eq!(c.failed_stage(), Some(SubmissionStage::Submitted));
        assert!(c.failed_stage().unwrap().crosses_network());

        c.http.post = HttpResponse::new(200, r#"{"txId":"DEF456"}"#);
        assert_eq!(c.submit().unwrap(), "DEF456");
        assert_eq!(c.failed_stage(), None);
    }

    #[test]
    fn over_budget_note_blocks_submission() {
        let mut c = client();
        for i in 0..20 {
            let _ = c.add_text(&format!("{:0>31}", i), &"v".repeat(31));
        }
        let err = c.submit().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoteTooLong);
        assert!(c.http.urls.borrow().is_empty());
        assert_eq!(c.failed_stage(), Some(SubmissionStage::NoteReady));
        assert!(!c.failed_stage().unwrap().crosses_network());

        c.clear_note();
        assert!(c.submit().is_ok());
    }
}
