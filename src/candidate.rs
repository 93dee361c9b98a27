//! Candidate annotations and the entities they resolve into.

use serde::{Deserialize, Serialize};

use crate::{Assertion, CandidateError, Span};

/// A proposed entity annotation, possibly overlapping others.
///
/// Produced by a dictionary or model backend. `source_priority` orders
/// backends for tie-breaking: higher wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub span: Span,
    pub label: String,
    pub confidence: f64,
    pub source_priority: u32,
    /// Name of the backend that produced this candidate, for provenance only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Candidate {
    pub fn new(span: Span, label: impl Into<String>, confidence: f64, source_priority: u32) -> Self {
        Self {
            span,
            label: label.into(),
            confidence,
            source_priority,
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Check the candidate against the text it annotates.
    pub fn validate(&self, text: &str) -> Result<(), CandidateError> {
        self.span
            .validate(text)
            .map_err(|source| CandidateError::SpanBounds {
                label: self.label.clone(),
                source,
            })?;

        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(CandidateError::Confidence {
                label: self.label.clone(),
                span: self.span,
                confidence: self.confidence,
            });
        }

        Ok(())
    }
}

/// A candidate that survived conflict resolution.
///
/// The assertion is filled in exactly once by the context engine, which hands
/// back an annotated copy rather than editing in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub span: Span,
    /// The covered text.
    pub text: String,
    pub label: String,
    pub confidence: f64,
    pub source_priority: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assertion: Option<Assertion>,
}

impl Entity {
    /// Promote a validated candidate.
    pub(crate) fn from_candidate(candidate: Candidate, text: &str) -> Self {
        let covered = candidate.span.text(text).unwrap_or_default().to_string();
        Self {
            span: candidate.span,
            text: covered,
            label: candidate.label,
            confidence: candidate.confidence,
            source_priority: candidate.source_priority,
            source: candidate.source,
            assertion: None,
        }
    }

    /// A copy of this entity carrying `assertion`.
    pub fn annotated(&self, assertion: Assertion) -> Self {
        Self {
            assertion: Some(assertion),
            ..self.clone()
        }
    }

    /// The attached assertion, or the default when none was computed.
    pub fn assertion_or_default(&self) -> Assertion {
        self.assertion.unwrap_or_default()
    }
}
