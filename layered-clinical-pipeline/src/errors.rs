//! Error and warning types for document processing.

use std::fmt;

use layered_context::ConfigurationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Processing stage that produced a [`Warning`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Tokenization,
    CandidateGeneration,
    ConflictResolution,
    ContextAssertion,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tokenization => "tokenization",
            Self::CandidateGeneration => "candidate generation",
            Self::ConflictResolution => "conflict resolution",
            Self::ContextAssertion => "context assertion",
        };
        f.write_str(name)
    }
}

/// A soft error recorded against a document. Processing continues past it
/// unless the pipeline was built with `fail_on_error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub stage: Stage,
    pub message: String,
}

impl Warning {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage, self.message)
    }
}

/// A candidate source could not produce candidates for a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("source {source_name}: {message}")]
pub struct SourceError {
    pub source_name: String,
    pub message: String,
}

/// Hard failures: the pipeline could not be built, or a soft error was
/// escalated.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The cue rule table could not be built.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Failed to parse a pipeline configuration file.
    #[error("failed to parse pipeline config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Failed to read a pipeline configuration file.
    #[error("failed to read pipeline config from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A soft error while `fail_on_error` is set.
    #[error("document {doc_id}: {warning}")]
    Escalated { doc_id: String, warning: Warning },
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
