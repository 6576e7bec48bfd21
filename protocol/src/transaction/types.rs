//! Value types shared by the assembler, the signer and the gateway.

use serde::Deserialize;
use std::fmt;

// ---------------------------------------------------------------------------
// TransactionType
// ---------------------------------------------------------------------------

/// Transaction kinds this client can emit. Payments only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransactionType {
    /// Single-asset payment, `"pay"` on the wire.
    #[default]
    Payment,
}

impl TransactionType {
    /// Value of the `type` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Payment => "pay",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TransactionParams
// ---------------------------------------------------------------------------

/// Suggested parameters as reported by the node.
///
/// Only the two fields the assembler needs are read; everything else in the
/// node's response is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TransactionParams {
    /// Latest round the node knows about. Becomes the first valid round.
    #[serde(rename = "last-round")]
    pub last_round: u64,

    /// Minimum fee per transaction, in microunits.
    #[serde(rename = "min-fee")]
    pub min_fee: u64,
}

impl TransactionParams {
    /// Parameters from known values, for callers that skip the node query.
    pub fn new(last_round: u64, min_fee: u64) -> Self {
        Self {
            last_round,
            min_fee,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_type_wire_name() {
        assert_eq!(TransactionType::Payment.as_str(), "pay");
        assert_eq!(TransactionType::default().to_string(), "pay");
    }

    #[test]
    fn params_parse_from_node_json() {
        let body = r#"{
            "consensus-version": "https://github.com/algorandfoundation/specs/tree/abc",
            "fee": 0,
            "genesis-hash": "SGO1GKSzyE7IEPItTxCByw9x8FmnrCDexi9/cOUJOiI=",
            "genesis-id": "testnet-v1.0",
            "last-round": 31415926,
            "min-fee": 1000
        }"#;
        let params: TransactionParams = serde_json::from_str(body).unwrap();
        assert_eq!(params, TransactionParams::new(31_415_926, 1_000));
    }

    #[test]
    fn params_missing_field_is_an_error() {
        assert!(serde_json::from_str::<TransactionParams>(r#"{"last-round": 5}"#).is_err());
    }
}
