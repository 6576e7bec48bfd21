// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # SensorPay Protocol — Core Library
//!
//! Lets a small sensing device pay its way onto a public ledger: every
//! submission is a real, signed payment transaction whose note carries the
//! device's latest readings as JSON. Dashboards and indexers pick the
//! readings back out of the chain; the ledger provides the timestamping,
//! the ordering and the tamper evidence for free (well, for the fee).
//!
//! The hard part is not the HTTP call. It is producing, byte for byte, the
//! canonical encoding the verifying node re-derives before it checks the
//! signature. One field out of order, one integer a byte too wide, and the
//! node throws the transaction away.
//!
//! ## Architecture
//!
//! - **config** — Protocol constants, networks and their genesis data.
//! - **crypto** — SHA-512/256 and the Ed25519 signing contract.
//! - **identity** — 25-word phrases, accounts, Base32 addresses.
//! - **codec** — The MessagePack subset, on a fixed-capacity buffer.
//! - **note** — The size-budgeted telemetry document.
//! - **transaction** — Canonical assembly, in-place signing, the envelope.
//! - **gateway** — The node's REST calls and the HTTP transport contract.
//! - **client** — [`TelemetryClient`], which drives a submission end to end.
//!
//! ## Design Philosophy
//!
//! 1. One buffer per submission, fixed size, never grown.
//! 2. The transaction is signed where it was written. No copies.
//! 3. Key material never reaches a log line or a `Debug` impl.
//! 4. Nothing is retried behind the caller's back.

pub mod client;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod gateway;
pub mod identity;
pub mod note;
pub mod transaction;

pub use client::{ClientError, ErrorKind, SubmissionStage, TelemetryClient};
pub use config::{Network, NetworkProfile};
pub use crypto::{Ed25519Primitive, SigningPrimitive};
pub use gateway::{HttpClient, HttpResponse, ReqwestHttpClient};
pub use identity::Account;
pub use note::{NoteDocument, NoteValue};
