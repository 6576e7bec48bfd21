//! Ordered, size-budgeted telemetry document.
//!
//! Labels keep the order they were first added in. Re-adding a label
//! overwrites its value where it stands. After every add the whole document
//! is re-measured, because the cost of a field depends on how its value
//! happens to print (a float can take 3 characters or 15).

use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{MAX_LABEL_LENGTH, MAX_NOTE_SIZE};

/// Marker between the application name and the JSON body.
pub const NOTE_FORMAT_SUFFIX: &str = ":j";

/// Errors raised while building the note.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NoteError {
    /// Empty label (or empty application name).
    #[error("label must not be empty")]
    EmptyLabel,

    /// Label longer than 31 bytes.
    #[error("label is {0} bytes, limit is 31")]
    LabelTooLong(usize),

    /// String value longer than 31 bytes.
    #[error("string value is {0} bytes, limit is 31")]
    ValueTooLong(usize),

    /// NaN or infinite float; JSON has no spelling for it.
    #[error("float value {0} is not finite")]
    NonFiniteFloat(f32),

    /// The note reached the size ceiling. The field that pushed it over is
    /// still in the document.
    #[error("note is {size} bytes, must stay below {max}")]
    TooLong {
        /// Preamble plus JSON body.
        size: usize,
        /// The ceiling.
        max: usize,
    },

    /// The JSON serializer failed.
    #[error("note serialization failed: {0}")]
    Encoding(String),
}

/// One typed telemetry value.
#[derive(Debug, Clone, PartialEq)]
pub enum NoteValue {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    F32(f32),
    Text(String),
}

impl Serialize for NoteValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NoteValue::I8(v) => serializer.serialize_i8(*v),
            NoteValue::U8(v) => serializer.serialize_u8(*v),
            NoteValue::I16(v) => serializer.serialize_i16(*v),
            NoteValue::U16(v) => serializer.serialize_u16(*v),
            NoteValue::I32(v) => serializer.serialize_i32(*v),
            NoteValue::U32(v) => serializer.serialize_u32(*v),
            // Single precision printing, so 55.5f32 reads "55.5" rather
            // than its widened f64 expansion.
            NoteValue::F32(v) => serializer.serialize_f32(*v),
            NoteValue::Text(v) => serializer.serialize_str(v),
        }
    }
}

/// Serializes the fields as a JSON object in insertion order.
struct Fields<'a>(&'a [(String, NoteValue)]);

impl Serialize for Fields<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, value) in self.0 {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

/// Labeled telemetry waiting to ride on the next transaction.
///
/// The document is never cleared behind the caller's back. Fields added
/// before one submission are still there for the next unless
/// [`NoteDocument::clear`] is called.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteDocument {
    app_name: String,
    fields: Vec<(String, NoteValue)>,
    json_len: usize,
}

impl NoteDocument {
    /// An empty document whose note will start with `"<app_name>:j"`.
    pub fn new(app_name: &str) -> Result<Self, NoteError> {
        check_label(app_name)?;
        let mut doc = Self {
            app_name: app_name.to_string(),
            fields: Vec::new(),
            json_len: 0,
        };
        doc.json_len = doc.measure()?;
        Ok(doc)
    }

    /// Application name written in the preamble.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when no field has been added since creation or the last clear.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Value currently stored under `label`.
    pub fn get(&self, label: &str) -> Option<&NoteValue> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, value)| value)
    }

    /// Length of `"<app_name>:j"`.
    pub fn preamble_len(&self) -> usize {
        self.app_name.len() + NOTE_FORMAT_SUFFIX.len()
    }

    /// Length of the JSON body alone.
    pub fn json_len(&self) -> usize {
        self.json_len
    }

    /// Total note length: preamble plus JSON body.
    pub fn serialized_len(&self) -> usize {
        self.preamble_len() + self.json_len
    }

    /// Insert or overwrite `label`.
    ///
    /// On [`NoteError::TooLong`] the field has already been stored; the
    /// document is over budget and the next submission will fail with it.
    pub fn insert(&mut self, label: &str, value: NoteValue) -> Result<(), NoteError> {
        check_label(label)?;
        match &value {
            NoteValue::Text(text) if text.len() > MAX_LABEL_LENGTH => {
                return Err(NoteError::ValueTooLong(text.len()));
            }
            NoteValue::F32(v) if !v.is_finite() => {
                return Err(NoteError::NonFiniteFloat(*v));
            }
            _ => {}
        }

        match self.fields.iter_mut().find(|(existing, _)| existing == label) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((label.to_string(), value)),
        }
        self.json_len = self.measure()?;

        let size = self.serialized_len();
        debug!(label, size, "note field stored");
        self.check_budget()
    }

    /// Drop every field. The application name stays.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.json_len = 2; // "{}"
    }

    /// Fails with [`NoteError::TooLong`] if the note is at or above the ceiling.
    pub fn check_budget(&self) -> Result<(), NoteError> {
        let size = self.serialized_len();
        if size >= MAX_NOTE_SIZE {
            warn!(size, max = MAX_NOTE_SIZE, "note over budget");
            return Err(NoteError::TooLong {
                size,
                max: MAX_NOTE_SIZE,
            });
        }
        Ok(())
    }

    /// The JSON body alone.
    pub fn to_json(&self) -> Result<String, NoteError> {
        serde_json::to_string(&Fields(&self.fields)).map_err(|e| NoteError::Encoding(e.to_string()))
    }

    /// The bytes that go into the transaction's `note` field.
    pub fn to_note_bytes(&self) -> Result<Vec<u8>, NoteError> {
        self.check_budget()?;
        let json = self.to_json()?;
        let mut out = Vec::with_capacity(self.preamble_len() + json.len());
        out.extend_from_slice(self.app_name.as_bytes());
        out.extend_from_slice(NOTE_FORMAT_SUFFIX.as_bytes());
        out.extend_from_slice(json.as_bytes());
        Ok(out)
    }

    fn measure(&self) -> Result<usize, NoteError> {
        self.to_json().map(|json| json.len())
    }
}

fn check_label(label: &str) -> Result<(), NoteError> {
    if label.is_empty() {
        return Err(NoteError::EmptyLabel);
    }
    if label.len() > MAX_LABEL_LENGTH {
        return Err(NoteError::LabelTooLong(label.len()));
    }
    Ok(())
}
