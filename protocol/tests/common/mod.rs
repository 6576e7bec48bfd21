//! Shared helpers for the integration tests: a stub node and a small
//! MessagePack reader for the subset the client emits.

#![allow(dead_code)]

use std::cell::RefCell;

use sensorpay_protocol::gateway::{HttpClient, HttpResponse};

/// 25-word phrase with a valid checksum word. Test network only.
pub const PHRASE: &str = "shadow market lounge gauge battle small crash funny supreme regular \
    obtain require control oil lend reward galaxy tuition elder owner flavor rural expose \
    absent sniff";

/// Address belonging to [`PHRASE`].
pub const PHRASE_ADDRESS: &str = "MT3WLS4GKJLZZ6CYFZPRUGR2PSSXXC5ABO72CB45AKNCGSUCSCVNWDKOUY";

/// The all-zero address.
pub const ZERO_ADDRESS: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ";

// ---------------------------------------------------------------------------
// Stub node
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
#[error("stub transport failure")]
pub struct StubTransportError;

/// A recorded request.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: &'static str,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

/// In-memory node. `None` for a response means the transport fails.
///
/// The submit response sits in a `RefCell` so a test can change the node's
/// answer between two submissions from the same client.
pub struct StubNode {
    pub params: Option<HttpResponse>,
    pub submit: RefCell<Option<HttpResponse>>,
    pub requests: RefCell<Vec<Request>>,
}

impl StubNode {
    /// Node reporting `round` and `fee`, accepting with `tx_id`.
    pub fn new(round: u64, fee: u64, tx_id: &str) -> Self {
        Self {
            params: Some(HttpResponse::new(
                200,
                format!(r#"{{"last-round":{},"min-fee":{},"fee":0}}"#, round, fee),
            )),
            submit: RefCell::new(Some(HttpResponse::new(
                200,
                format!(r#"{{"txId":"{}"}}"#, tx_id),
            ))),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_params_response(mut self, response: Option<HttpResponse>) -> Self {
        self.params = response;
        self
    }

    pub fn with_submit_response(self, response: Option<HttpResponse>) -> Self {
        self.set_submit_response(response);
        self
    }

    /// Answer every later POST with `response`.
    pub fn set_submit_response(&self, response: Option<HttpResponse>) {
        *self.submit.borrow_mut() = response;
    }

    /// Body of the last POST, if any.
    pub fn last_posted(&self) -> Option<Vec<u8>> {
        self.requests
            .borrow()
            .iter()
            .rev()
            .find(|r| r.method == "POST")
            .and_then(|r| r.body.clone())
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    fn record(
        &self,
        method: &'static str,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<Vec<u8>>,
    ) {
        self.requests.borrow_mut().push(Request {
            method,
            url: url.to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body,
        });
    }
}

impl HttpClient for StubNode {
    type Error = StubTransportError;

    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, Self::Error> {
        self.record("GET", url, headers, None);
        self.params.clone().ok_or(StubTransportError)
    }

    fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: Vec<u8>,
    ) -> Result<HttpResponse, Self::Error> {
        self.record("POST", url, headers, Some(body));
        self.submit.borrow().clone().ok_or(StubTransportError)
    }
}

// ---------------------------------------------------------------------------
// MessagePack reader
// ---------------------------------------------------------------------------

/// A decoded value. Scalars keep their format tag so width choices can be
/// asserted.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    UInt { value: u64, tag: u8 },
    Int { value: i64, tag: u8 },
    Float(f32),
    Str(String),
    Bin { data: Vec<u8>, tag: u8 },
    Map(Vec<(String, Value)>),
}

impl Value {
    pub fn as_map(&self) -> &[(String, Value)] {
        match self {
            Value::Map(entries) => entries,
            other => panic!("expected map, got {:?}", other),
        }
    }

    pub fn as_uint(&self) -> u64 {
        match self {
            Value::UInt { value, .. } => *value,
            other => panic!("expected uint, got {:?}", other),
        }
    }

    pub fn tag(&self) -> u8 {
        match self {
            Value::UInt { tag, .. } | Value::Int { tag, .. } | Value::Bin { tag, .. } => *tag,
            other => panic!("no tag recorded for {:?}", other),
        }
    }

    pub fn as_bin(&self) -> &[u8] {
        match self {
            Value::Bin { data, .. } => data,
            other => panic!("expected bin, got {:?}", other),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Value::Str(s) => s,
            other => panic!("expected str, got {:?}", other),
        }
    }

    /// Look up a map entry.
    pub fn get(&self, key: &str) -> &Value {
        self.as_map()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
            .unwrap_or_else(|| panic!("key {:?} missing", key))
    }

    pub fn keys(&self) -> Vec<&str> {
        self.as_map().iter().map(|(k, _)| k.as_str()).collect()
    }
}

/// Decode one value from the front of `bytes`, returning it and the number
/// of bytes consumed.
pub fn decode(bytes: &[u8]) -> (Value, usize) {
    let tag = bytes[0];
    let be = |n: usize| -> u64 {
        bytes[1..1 + n]
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
    };
    match tag {
        0x00..=0x7F => (
            Value::UInt {
                value: u64::from(tag),
                tag,
            },
            1,
        ),
        0x80..=0x8F => {
            let count = usize::from(tag & 0x0F);
            let mut offset = 1;
            let mut entries = Vec::with_capacity(count);
            for _ in 0..count {
                let (key, used) = decode(&bytes[offset..]);
                offset += used;
                let (value, used) = decode(&bytes[offset..]);
                offset += used;
                entries.push((key.as_str().to_string(), value));
            }
            (Value::Map(entries), offset)
        }
        0xA0..=0xBF => {
            let len = usize::from(tag & 0x1F);
            let s = String::from_utf8(bytes[1..1 + len].to_vec()).unwrap();
            (Value::Str(s), 1 + len)
        }
        0xC4 => {
            let len = be(1) as usize;
            (
                Value::Bin {
                    data: bytes[2..2 + len].to_vec(),
                    tag,
                },
                2 + len,
            )
        }
        0xC5 => {
            let len = be(2) as usize;
            (
                Value::Bin {
                    data: bytes[3..3 + len].to_vec(),
                    tag,
                },
                3 + len,
            )
        }
        0xCA => {
            let raw = [bytes[1], bytes[2], bytes[3], bytes[4]];
            (Value::Float(f32::from_be_bytes(raw)), 5)
        }
        0xCC => (Value::UInt { value: be(1), tag }, 2),
        0xCD => (Value::UInt { value: be(2), tag }, 3),
        0xCE => (Value::UInt { value: be(4), tag }, 5),
        0xD0 => (
            Value::Int {
                value: i64::from(bytes[1] as i8),
                tag,
            },
            2,
        ),
        0xD1 => (
            Value::Int {
                value: i64::from(i16::from_be_bytes([bytes[1], bytes[2]])),
                tag,
            },
            3,
        ),
        0xD2 => (
            Value::Int {
                value: i64::from(i32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]])),
                tag,
            },
            5,
        ),
        other => panic!("unsupported tag 0x{:02X}", other),
    }
}

/// Decode a whole buffer that must hold exactly one value.
pub fn decode_all(bytes: &[u8]) -> Value {
    let (value, used) = decode(bytes);
    assert_eq!(used, bytes.len(), "trailing bytes after value");
    value
}
