use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::TypeError;

/// What a block attests to.
///
/// The ledger never interprets a payload; it only hashes its canonical
/// JSON form. Maps are `BTreeMap`s so key order, and therefore the encoding,
/// is deterministic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    /// Marker carried by the first block of every ledger.
    Genesis {
        #[serde(default)]
        note: Option<String>,
    },
    /// A diagnostic event produced by the surrounding application.
    Diagnostic(DiagnosticRecord),
}

impl Payload {
    /// The genesis marker with no note.
    pub fn genesis() -> Self {
        Self::Genesis { note: None }
    }

    /// The genesis marker carrying an operator-supplied note.
    pub fn genesis_with_note(note: impl Into<String>) -> Self {
        Self::Genesis {
            note: Some(note.into()),
        }
    }

    /// Returns `true` for the genesis marker.
    pub fn is_genesis(&self) -> bool {
        matches!(self, Self::Genesis { .. })
    }

    /// The diagnostic record, if this payload carries one.
    pub fn as_diagnostic(&self) -> Option<&DiagnosticRecord> {
        match self {
            Self::Diagnostic(record) => Some(record),
            Self::Genesis { .. } => None,
        }
    }
}

impl From<DiagnosticRecord> for Payload {
    fn from(record: DiagnosticRecord) -> Self {
        Self::Diagnostic(record)
    }
}

/// One diagnostic event: who (anonymized), what was predicted, and how sure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticRecord {
    pub subject_id: String,
    pub label: String,
    pub confidence: Confidence,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl DiagnosticRecord {
    pub fn new(
        subject_id: impl Into<String>,
        label: impl Into<String>,
        confidence: impl Into<Confidence>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            label: label.into(),
            confidence: confidence.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Model confidence score.
///
/// Any `f64` can be held, but only finite values have a canonical encoding:
/// serializing NaN or an infinity fails instead of silently becoming `null`.
#[derive(Clone, Copy, PartialEq, PartialOrd, Deserialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl From<f64> for Confidence {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Confidence({})", self.0)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Confidence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if !self.0.is_finite() {
            return Err(serde::ser::Error::custom(TypeError::NonFiniteConfidence(
                self.0.to_string(),
            )));
        }
        // -0.0 == 0.0, so both must encode the same way.
        let value = if self.0 == 0.0 { 0.0 } else { self.0 };
        serializer.serialize_f64(value)
    }
}
