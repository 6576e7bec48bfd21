//! # Client Module
//!
//! [`TelemetryClient`] ties the rest of the crate together: it owns the
//! account and the pending note, and [`TelemetryClient::submit`] drives one
//! payment through every stage.
//!
//! ```text
//! NoteReady -> ParamsFetched -> Assembled -> Signed -> Enveloped -> Submitted -> Done
//!               (GET params)                                       (POST envelope)
//! ```
//!
//! Any failure stops the run at the stage it happened in and surfaces as a
//! [`ClientError`]; [`ClientError::kind`] gives the coarse [`ErrorKind`].

pub mod error;
pub mod stage;
pub mod telemetry;

pub use error::{ClientError, ErrorKind};
pub use stage::SubmissionStage;
pub use telemetry::TelemetryClient;
