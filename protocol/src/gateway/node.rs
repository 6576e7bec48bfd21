//! The two REST calls against the node.
//!
//! | Call                   | 200          | 204       | 400        | other      | transport |
//! |------------------------|--------------|-----------|------------|------------|-----------|
//! | [`fetch_params`]       | parse params | NoContent | Unexpected | Unexpected | Transport |
//! | [`submit_transaction`] | parse txId   | NoContent | Rejected   | Unexpected | Transport |
//!
//! Nothing is retried. A failure is reported once and the caller decides.

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::http::HttpClient;
use crate::config::{
    API_TOKEN_HEADER, SUBMIT_CONTENT_TYPE, SUBMIT_TRANSACTION_PATH, TRANSACTION_ID_MAX_CHARS,
    TRANSACTION_PARAMS_PATH,
};
use crate::transaction::TransactionParams;

/// Longest slice of a rejection body kept in the error.
const MAX_REJECTION_MESSAGE: usize = 200;

/// Failures talking to the node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The request never got a response.
    #[error("transport failure on {path}: {message}")]
    Transport {
        /// Request path.
        path: &'static str,
        /// Transport error text.
        message: String,
    },

    /// HTTP 204: the node answered with no data.
    #[error("node returned no content for {path}")]
    NoContent {
        /// Request path.
        path: &'static str,
    },

    /// HTTP 400 on submit: the node refused the transaction.
    #[error("node rejected the transaction: {message}")]
    Rejected {
        /// The node's explanation, if it gave one.
        message: String,
    },

    /// Any status the client has no handling for.
    #[error("unexpected HTTP status {status} from {path}")]
    UnexpectedStatus {
        /// Request path.
        path: &'static str,
        /// Status code.
        status: u16,
    },

    /// A 200 response whose body could not be understood.
    #[error("malformed response from {path}: {message}")]
    MalformedResponse {
        /// Request path.
        path: &'static str,
        /// Parser error text.
        message: String,
    },
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(rename = "txId")]
    tx_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

fn token_header(api_token: Option<&str>) -> Option<(&'static str, &str)> {
    api_token
        .filter(|t| !t.is_empty())
        .map(|t| (API_TOKEN_HEADER, t))
}

/// `GET <api_base>/v2/transactions/params`.
pub fn fetch_params<H: HttpClient>(
    http: &H,
    api_base: &str,
    api_token: Option<&str>,
) -> Result<TransactionParams, GatewayError> {
    let path = TRANSACTION_PARAMS_PATH;
    let url = format!("{}{}", api_base, path);
    let headers: Vec<(&str, &str)> = token_header(api_token).into_iter().collect();

    debug!(%url, "fetching transaction params");
    let resp = http.get(&url, &headers).map_err(|e| {
        warn!(%url, error = %e, "params request failed");
        GatewayError::Transport {
            path,
            message: e.to_string(),
        }
    })?;

    match resp.status {
        200 => {
            let params: TransactionParams =
                serde_json::from_slice(&resp.body).map_err(|e| GatewayError::MalformedResponse {
                    path,
                    message: e.to_string(),
                })?;
            debug!(
                last_round = params.last_round,
                min_fee = params.min_fee,
                "transaction params received"
            );
            Ok(params)
        }
        204 => Err(GatewayError::NoContent { path }),
        status => {
            warn!(status, "params request returned unexpected status");
            Err(GatewayError::UnexpectedStatus { path, status })
        }
    }
}

/// `POST <api_base>/v2/transactions` with the signed envelope. Returns the
/// transaction id the node assigned, capped at 64 characters.
pub fn submit_transaction<H: HttpClient>(
    http: &H,
    api_base: &str,
    api_token: Option<&str>,
    envelope: &[u8],
) -> Result<String, GatewayError> {
    let path = SUBMIT_TRANSACTION_PATH;
    let url = format!("{}{}", api_base, path);
    let mut headers: Vec<(&str, &str)> = vec![("Content-Type", SUBMIT_CONTENT_TYPE)];
    headers.extend(token_header(api_token));

    info!(%url, bytes = envelope.len(), "submitting transaction");
    let resp = http.post(&url, &headers, envelope.to_vec()).map_err(|e| {
        warn!(%url, error = %e, "submit request failed");
        GatewayError::Transport {
            path,
            message: e.to_string(),
        }
    })?;

    match resp.status {
        200 => {
            let parsed: SubmitResponse =
                serde_json::from_slice(&resp.body).map_err(|e| GatewayError::MalformedResponse {
                    path,
                    message: e.to_string(),
                })?;
            let tx_id: String = parsed.tx_id.chars().take(TRANSACTION_ID_MAX_CHARS).collect();
            info!(txid = %tx_id, "transaction accepted");
            Ok(tx_id)
        }
        204 => Err(GatewayError::NoContent { path }),
        400 => {
            let message = rejection_message(&resp.body);
            warn!(%message, "transaction rejected");
            Err(GatewayError::Rejected { message })
        }
        status => {
            warn!(status, "submit returned unexpected status");
            Err(GatewayError::UnexpectedStatus { path, status })
        }
    }
}

/// The node's `{"message": ...}` if present, else the raw body, shortened.
fn rejection_message(body: &[u8]) -> String {
    let text = match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(parsed) => parsed.message,
        Err(_) => String::from_utf8_lossy(body).into_owned(),
    };
    text.chars().take(MAX_REJECTION_MESSAGE).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
