//! # Gateway Module
//!
//! The node's REST interface, as far as a sensor needs it: ask for the
//! current round and minimum fee, then post a signed envelope and read
//! back the transaction id.
//!
//! Transport is pluggable through [`HttpClient`]; [`ReqwestHttpClient`] is
//! the blocking default with 5-second connect and request timeouts.

pub mod http;
pub mod node;

pub use http::{HttpClient, HttpResponse, ReqwestHttpClient, ReqwestHttpError};
pub use node::{fetch_params, submit_transaction, GatewayError};
