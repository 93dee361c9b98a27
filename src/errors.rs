//! Error types for span handling.
//!
//! None of these are fatal: the resolver and the context engine record them
//! next to their output and keep going with the remaining items.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Span;

/// Why a span failed validation against its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpanBoundsReason {
    /// `start > end`
    Inverted,
    /// `end` is past the end of the text
    OutOfRange,
    /// `start == end`
    Empty,
    /// An offset falls inside a multi-byte character
    NotCharBoundary,
}

impl std::fmt::Display for SpanBoundsReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Inverted => "start is after end",
            Self::OutOfRange => "end is past the end of the text",
            Self::Empty => "span is empty",
            Self::NotCharBoundary => "offset is not on a character boundary",
        })
    }
}

/// A candidate or cue match references a span that does not fit the text.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("span {span} is invalid for text of length {text_len}: {reason}")]
pub struct SpanBoundsError {
    pub span: Span,
    pub text_len: usize,
    pub reason: SpanBoundsReason,
}

/// Problems that disqualify a candidate before conflict resolution.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum CandidateError {
    #[error("candidate {label:?}: {source}")]
    SpanBounds {
        label: String,
        #[source]
        source: SpanBoundsError,
    },

    #[error("candidate {label:?} at {span}: confidence {confidence} is outside [0, 1]")]
    Confidence {
        label: String,
        span: Span,
        confidence: f64,
    },
}

/// An entity span cannot be mapped onto the supplied token index.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum TokenAlignmentError {
    #[error("span {span} is not inside sentence {sentence}")]
    OutsideSentence { span: Span, sentence: Span },

    #[error("no token of sentence {sentence} covers span {span}")]
    NoCoveringToken { span: Span, sentence: Span },

    #[error("token {index} at {token} is empty or inverted")]
    EmptyToken { index: usize, token: Span },

    #[error("token {index} at {token} overlaps or precedes the token before it")]
    UnorderedToken { index: usize, token: Span },

    #[error("token {index} at {token} lies outside sentence {sentence}")]
    TokenOutsideSentence {
        index: usize,
        token: Span,
        sentence: Span,
    },
}
