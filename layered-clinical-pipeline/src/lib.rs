//! End-to-end processing of clinical notes.
//!
//! A [`Pipeline`] runs four stages over each document:
//!
//! 1. [`Tokenizer`] splits the text into sentences of tokens
//! 2. [`CandidateSource`]s propose possibly-overlapping entity candidates
//! 3. the conflict resolver keeps a disjoint subset
//! 4. the context engine asserts polarity, uncertainty, temporality and
//!    experiencer for every entity, one sentence at a time
//!
//! Soft errors at any stage are recorded as [`Warning`]s on the
//! [`AnnotatedDocument`].
//!
//! ```
//! use layered_clinical::Polarity;
//! use layered_clinical_pipeline::Pipeline;
//!
//! let pipeline = Pipeline::clinical().unwrap();
//! let document = pipeline.process("note-1", "Patient denies chest pain.").unwrap();
//!
//! let chest_pain = &document.entities[0];
//! assert_eq!(chest_pain.text, "chest pain");
//! assert_eq!(chest_pain.assertion_or_default().polarity, Polarity::Negated);
//! ```

mod config;
mod document;
mod errors;
mod pipeline;
mod source;
mod tokenizer;

pub use config::{DictionaryConfig, PipelineConfig};
pub use document::AnnotatedDocument;
pub use errors::{PipelineError, PipelineResult, SourceError, Stage, Warning};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use source::{
    CandidateSource, DictionarySource, EntityType, ExternalModelSource, ModelBackend, Prediction,
    DICTIONARY_CONFIDENCE, DICTIONARY_PRIORITY, MODEL_CONFIDENCE, MODEL_PRIORITY,
};
pub use tokenizer::{RuleTokenizer, SentenceTokens, Tokenizer};
