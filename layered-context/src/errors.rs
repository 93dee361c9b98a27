//! Error types for rule table construction.

use thiserror::Error;

/// A cue rule definition could not be compiled into a rule table.
///
/// Always fatal: no document can be processed without a valid table.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The pattern has no words to match.
    #[error("rule {index}: pattern is empty")]
    EmptyPattern { index: usize },

    /// A regex pattern failed to compile.
    #[error("rule {index}: invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        index: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A regex pattern can produce an empty match.
    #[error("rule {index}: pattern {pattern:?} can match the empty string")]
    MatchesEmpty { index: usize, pattern: String },

    /// An attribute-setting rule with `max_scope = 0` could never apply.
    #[error("rule {index}: pattern {pattern:?} has a max_scope of 0")]
    InvalidScope { index: usize, pattern: String },

    /// A rule that is not a terminator must set some attribute.
    #[error("rule {index}: pattern {pattern:?} has no category and is not a terminator")]
    MissingCategory { index: usize, pattern: String },

    /// Failed to parse a TOML rule file.
    #[error("failed to parse TOML rules: {0}")]
    Toml(#[from] toml::de::Error),

    /// Failed to parse a RON rule file.
    #[error("failed to parse RON rules: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// Failed to read a rule file.
    #[error("failed to read rules from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The rule file extension is neither `.toml` nor `.ron`.
    #[error("unsupported rule file format: {path}")]
    UnsupportedFormat { path: String },
}

/// Result type for rule table construction.
pub type ConfigResult<T> = Result<T, ConfigurationError>;
