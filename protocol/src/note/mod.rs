//! # Note Module
//!
//! Telemetry rides on each payment as the transaction's `note` blob: the
//! application name, a `:j` marker, then a flat JSON object of labeled
//! values. Indexers and dashboards key off the preamble to pick out the
//! device's transactions from everything else on the ledger.
//!
//! ```text
//! sensor1:j{"t":255,"h":55.5}
//! ```

pub mod document;

pub use document::{NoteDocument, NoteError, NoteValue, NOTE_FORMAT_SUFFIX};
