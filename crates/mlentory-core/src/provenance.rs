//! Provenance-wrapped fields.
//!
//! Extractors never hand bare values downstream. Each field of a raw
//! record becomes a sequence of [`Claim`]s recording the value together
//! with how, when, and how confidently it was obtained. A field observed
//! again later (say, by a curated lookup after an API fetch) gains another
//! claim; earlier claims are never replaced.
//!
//! The wrapper does not read the clock. Callers capture one timestamp per
//! extraction batch in an [`ExtractionContext`] so that every field of the
//! batch shares it.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

/// One provenance-tagged observation of a field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Raw value as observed. `Null` means "looked, found nothing".
    #[serde(rename = "data")]
    pub value: Value,
    pub extraction_method: String,
    pub confidence: f64,
    pub extraction_time: DateTime<Utc>,
}

/// Method, confidence, and timestamp shared by one extraction batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionContext {
    method: String,
    confidence: f64,
    timestamp: DateTime<Utc>,
}

impl ExtractionContext {
    pub fn new(
        method: impl Into<String>,
        confidence: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(CoreError::InvalidConfidence(confidence));
        }
        Ok(Self {
            method: method.into(),
            confidence,
            timestamp,
        })
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Build a claim for `value` under this context.
    pub fn claim(&self, value: Value) -> Claim {
        Claim {
            value,
            extraction_method: self.method.clone(),
            confidence: self.confidence,
            extraction_time: self.timestamp,
        }
    }
}

/// A record whose every field is a time-ordered claim sequence.
///
/// Serializes as a plain JSON object of `field -> [claim, ...]`, keeping
/// the field order of the raw record it was built from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WrappedRecord {
    fields: IndexMap<String, Vec<Claim>>,
}

impl WrappedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&[Claim]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Most recent claim for `field`.
    pub fn latest(&self, field: &str) -> Option<&Claim> {
        self.fields.get(field).and_then(|claims| claims.last())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[Claim])> {
        self.fields
            .iter()
            .map(|(name, claims)| (name.as_str(), claims.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Append a claim, keeping the sequence ordered by extraction time.
    ///
    /// Claims with equal timestamps keep arrival order.
    pub fn append_claim(&mut self, field: impl Into<String>, claim: Claim) {
        let claims = self.fields.entry(field.into()).or_default();
        let pos = claims.partition_point(|c| c.extraction_time <= claim.extraction_time);
        claims.insert(pos, claim);
    }

    /// Append every claim of `other` into this record.
    pub fn merge(&mut self, other: WrappedRecord) {
        for (field, claims) in other.fields {
            for claim in claims {
                self.append_claim(field.clone(), claim);
            }
        }
    }
}

/// Wrap every field of `raw` in a single claim under `ctx`.
pub fn wrap_record(raw: &Map<String, Value>, ctx: &ExtractionContext) -> WrappedRecord {
    let mut record = WrappedRecord::new();
    for (field, value) in raw {
        record.append_claim(field.clone(), ctx.claim(value.clone()));
    }
    record
}

/// Like [`wrap_record`], but every name in `expected` that `raw` lacks is
/// recorded with a `Null` claim.
pub fn wrap_expected(
    raw: &Map<String, Value>,
    expected: &[&str],
    ctx: &ExtractionContext,
) -> WrappedRecord {
    let mut record = wrap_record(raw, ctx);
    for field in expected {
        if record.get(field).is_none() {
            record.append_claim(*field, ctx.claim(Value::Null));
        }
    }
    record
}
