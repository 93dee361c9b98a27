//! Per-sentence token index used to measure distances in tokens.

use serde::{Deserialize, Serialize};

use crate::{Span, TokenAlignmentError};

/// Inclusive range of token indexes within one sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenRange {
    pub first: usize,
    pub last: usize,
}

impl TokenRange {
    pub fn new(first: usize, last: usize) -> Self {
        Self { first, last }
    }

    /// Tokens from the end of `self` to the start of `later`.
    ///
    /// `None` unless `later` begins strictly after `self` ends. Adjacent
    /// ranges are one token apart.
    pub fn distance_to(&self, later: &TokenRange) -> Option<usize> {
        if later.first > self.last {
            Some(later.first - self.last)
        } else {
            None
        }
    }

    /// True when `self` lies strictly between `earlier` and `later`.
    pub fn is_between(&self, earlier: &TokenRange, later: &TokenRange) -> bool {
        self.first > earlier.last && self.last < later.first
    }
}

/// Ordered, non-overlapping tokens of a single sentence.
///
/// Built from the output of an external tokenizer. Construction checks the
/// ordering guarantees so that lookups can binary search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenIndex {
    sentence: Span,
    tokens: Vec<Span>,
}

impl TokenIndex {
    /// Create an index for `sentence` from its token spans.
    pub fn new(sentence: Span, tokens: Vec<Span>) -> Result<Self, TokenAlignmentError> {
        let mut previous_end = sentence.start;
        for (index, token) in tokens.iter().enumerate() {
            if token.is_empty() {
                return Err(TokenAlignmentError::EmptyToken {
                    index,
                    token: *token,
                });
            }
            if !sentence.contains(token) {
                return Err(TokenAlignmentError::TokenOutsideSentence {
                    index,
                    token: *token,
                    sentence,
                });
            }
            if token.start < previous_end {
                return Err(TokenAlignmentError::UnorderedToken {
                    index,
                    token: *token,
                });
            }
            previous_end = token.end;
        }

        Ok(Self { sentence, tokens })
    }

    /// Create an index whose sentence spans from the first to the last token.
    pub fn from_tokens(tokens: Vec<Span>) -> Result<Self, TokenAlignmentError> {
        let sentence = match (tokens.first(), tokens.last()) {
            (Some(first), Some(last)) => Span::new(first.start, last.end.max(first.start)),
            _ => Span::new(0, 0),
        };
        Self::new(sentence, tokens)
    }

    pub fn sentence(&self) -> Span {
        self.sentence
    }

    pub fn tokens(&self) -> &[Span] {
        &self.tokens
    }

    pub fn token(&self, index: usize) -> Option<Span> {
        self.tokens.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens overlapping `span`, as an inclusive range.
    ///
    /// Returns `None` when no token shares a character with `span`.
    pub fn covering(&self, span: Span) -> Option<TokenRange> {
        let first = self.tokens.partition_point(|token| token.end <= span.start);
        let past_last = self.tokens.partition_point(|token| token.start < span.end);
        if first < past_last {
            Some(TokenRange::new(first, past_last - 1))
        } else {
            None
        }
    }

    /// Map an entity span onto this sentence's tokens.
    pub fn align(&self, span: Span) -> Result<TokenRange, TokenAlignmentError> {
        if !self.sentence.contains(&span) {
            return Err(TokenAlignmentError::OutsideSentence {
                span,
                sentence: self.sentence,
            });
        }
        self.covering(span)
            .ok_or(TokenAlignmentError::NoCoveringToken {
                span,
                sentence: self.sentence,
            })
    }
}
