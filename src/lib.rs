#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Span-level building blocks for clinical annotation.
//!
//! ## Core Types
//!
//! - [`Span`] - Half-open range into document text
//! - [`TokenIndex`] / [`TokenRange`] - Per-sentence tokens for distance in tokens
//! - [`Candidate`] - Proposed, possibly-overlapping entity annotation
//! - [`Entity`] - Resolved annotation with an optional [`Assertion`]
//! - [`ConflictResolver`] - Reduces candidates to a disjoint entity set
//! - [`SpanDisplay`] - Text rendering with underlined spans, for tests and debugging
//!
//! ## Example
//!
//! ```
//! use layered_clinical::{resolve, Candidate, Span};
//!
//! let text = "Patient reports chest pain.";
//! let resolution = resolve(
//!     text,
//!     vec![
//!         Candidate::new(Span::new(16, 26), "sign_symptom", 0.7, 1),
//!         Candidate::new(Span::new(22, 26), "sign_symptom", 0.6, 2),
//!     ],
//! );
//! assert_eq!(resolution.entities.len(), 1);
//! assert_eq!(resolution.entities[0].text, "chest pain");
//! ```

mod assertion;
mod candidate;
mod display;
mod errors;
mod resolver;
mod span;
mod token_index;

pub use assertion::{Assertion, Experiencer, Polarity, Temporality, Uncertainty};
pub use candidate::{Candidate, Entity};
pub use display::SpanDisplay;
pub use errors::{CandidateError, SpanBoundsError, SpanBoundsReason, TokenAlignmentError};
pub use resolver::{resolve, ConflictResolver, Resolution};
pub use span::Span;
pub use token_index::{TokenIndex, TokenRange};
