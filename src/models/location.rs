//! Location query model produced by the input normalizer

use serde::{Deserialize, Serialize};

/// How the canonical location string was obtained
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizationSource {
    /// Exact match in the static alias table
    Alias,
    /// Returned verbatim by the translation prompt
    Translated,
    /// Plain Latin input, passed through unchanged
    Passthrough,
    /// Translation was attempted and failed; the raw input is used
    TranslationFailed { reason: String },
}

/// A user-supplied location and its canonical form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationQuery {
    /// The string exactly as typed
    pub raw: String,
    /// Canonical name used for every downstream lookup
    pub canonical: String,
    /// Where `canonical` came from
    pub source: NormalizationSource,
}

impl LocationQuery {
    /// Create a query whose canonical form came from `source`
    #[must_use]
    pub fn new(raw: impl Into<String>, canonical: impl Into<String>, source: NormalizationSource) -> Self {
        Self {
            raw: raw.into(),
            canonical: canonical.into(),
            source,
        }
    }

    /// Create a query that keeps the input unchanged
    #[must_use]
    pub fn passthrough(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            canonical: raw.clone(),
            raw,
            source: NormalizationSource::Passthrough,
        }
    }

    /// User-facing warning, present only when translation failed
    #[must_use]
    pub fn warning(&self) -> Option<String> {
        match &self.source {
            NormalizationSource::TranslationFailed { reason } => Some(format!(
                "Could not translate '{}' ({reason}); using it as typed",
                self.raw
            )),
            _ => None,
        }
    }
}
