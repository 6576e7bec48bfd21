//! Minimal blocking HTTP client abstraction.
//!
//! The gateway only ever needs a GET and a POST, each returning a status
//! code and a body. [`HttpClient`] exposes exactly that, so the submission
//! path can be driven by `reqwest` on a real device and by an in-memory
//! stub in tests.

use thiserror::Error;

use crate::config::{HTTP_CONNECT_TIMEOUT, HTTP_REQUEST_TIMEOUT};

/// A blocking HTTP client for the two gateway calls.
pub trait HttpClient {
    /// Transport-level failure (DNS, connect, TLS, timeout, ...).
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send a GET request.
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, Self::Error>;

    /// Send a POST request with `body`.
    fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: Vec<u8>,
    ) -> Result<HttpResponse, Self::Error>;
}

impl<H: HttpClient + ?Sized> HttpClient for &H {
    type Error = H::Error;

    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, Self::Error> {
        (**self).get(url, headers)
    }

    fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: Vec<u8>,
    ) -> Result<HttpResponse, Self::Error> {
        (**self).post(url, headers, body)
    }
}

/// Status code and body; all the gateway looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub status: u16,

    /// The response body bytes.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Response with a JSON (or any text) body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// reqwest
// ---------------------------------------------------------------------------

/// Error type for the reqwest-based HTTP client.
#[derive(Debug, Error)]
#[error("HTTP request failed: {0}")]
pub struct ReqwestHttpError(#[from] reqwest::Error);

/// A blocking [`reqwest`]-backed implementation of [`HttpClient`].
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    inner: reqwest::blocking::Client,
}

impl ReqwestHttpClient {
    /// Client with the standard gateway timeouts.
    pub fn new() -> Result<Self, ReqwestHttpError> {
        let inner = reqwest::blocking::Client::builder()
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .timeout(HTTP_REQUEST_TIMEOUT)
            .user_agent(concat!("sensorpay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { inner })
    }

    fn send(
        builder: reqwest::blocking::RequestBuilder,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, ReqwestHttpError> {
        let builder = headers
            .iter()
            .fold(builder, |b, &(name, value)| b.header(name, value));
        let resp = builder.send()?;
        let status = resp.status().as_u16();
        let body = resp.bytes()?.to_vec();
        Ok(HttpResponse { status, body })
    }
}

impl HttpClient for ReqwestHttpClient {
    type Error = ReqwestHttpError;

    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, Self::Error> {
        Self::send(self.inner.get(url), headers)
    }

    fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: Vec<u8>,
    ) -> Result<HttpResponse, Self::Error> {
        Self::send(self.inner.post(url).body(body), headers)
    }
}
