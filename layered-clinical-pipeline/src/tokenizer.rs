//! Sentence and word segmentation for clinical notes.

use std::collections::HashSet;

use layered_clinical::Span;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Raw token spans of one sentence, as produced by a [`Tokenizer`].
///
/// Nothing is validated here; the pipeline checks ordering when it builds a
/// `TokenIndex` from these spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceTokens {
    pub span: Span,
    pub tokens: Vec<Span>,
}

/// Splits a document into sentences of tokens.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<SentenceTokens>;
}

/// Abbreviations (lowercase, trailing period removed) after which a period
/// does not end a sentence.
static CLINICAL_ABBREVIATIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // titles and general
        "dr", "mr", "mrs", "ms", "prof", "vs", "etc", "inc", "ltd", "e.g", "i.e", "approx",
        // units
        "mg", "mcg", "ml", "cc", "cm", "mm", "kg", "lb", "oz",
        // dosing
        "b.i.d", "t.i.d", "q.i.d", "p.r.n", "p.o", "i.v", "i.m",
        // shorthand
        "pt", "pts", "dx", "hx", "tx", "sx", "rx", "fx", "bx", "c/o", "s/p", "w/o",
        // time and vitals
        "yr", "yrs", "mo", "mos", "wk", "wks", "d", "hr", "hrs", "min", "mins", "sec", "secs",
        "temp", "resp", "b.p", "h.r",
    ]
    .into_iter()
    .collect()
});

/// Rule-based tokenizer built on Unicode sentence and word boundaries.
///
/// Sentence boundaries that follow a known abbreviation ("Dr.", "b.i.d.")
/// are merged away. Word tokens are Unicode word-boundary segments with
/// whitespace dropped, so punctuation marks are tokens of their own.
#[derive(Debug, Clone, Default)]
pub struct RuleTokenizer {
    extra_abbreviations: HashSet<String>,
}

impl RuleTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_custom_abbreviations<S: AsRef<str>>(mut self, abbreviations: &[S]) -> Self {
        for abbreviation in abbreviations {
            let normalized = abbreviation.as_ref().trim_end_matches('.').to_lowercase();
            self.extra_abbreviations.insert(normalized);
        }
        self
    }

    fn is_abbreviation(&self, word: &str) -> bool {
        let normalized = word.trim_end_matches('.').to_lowercase();
        CLINICAL_ABBREVIATIONS.contains(normalized.as_str())
            || self.extra_abbreviations.contains(&normalized)
    }

    /// True when `segment` ends in a period that belongs to an abbreviation.
    fn ends_in_abbreviation(&self, segment: &str) -> bool {
        let trimmed = segment.trim_end();
        if !trimmed.ends_with('.') {
            return false;
        }
        trimmed
            .split_whitespace()
            .next_back()
            .map_or(false, |word| self.is_abbreviation(word))
    }
}

fn word_tokens(segment: &str, offset: usize) -> impl Iterator<Item = Span> + '_ {
    segment
        .split_word_bound_indices()
        .filter(|(_, word)| !word.chars().all(char::is_whitespace))
        .map(move |(start, word)| Span::new(offset + start, offset + start + word.len()))
}

impl Tokenizer for RuleTokenizer {
    fn tokenize(&self, text: &str) -> Vec<SentenceTokens> {
        let mut sentences: Vec<SentenceTokens> = Vec::new();
        let mut pending: Vec<Span> = Vec::new();

        for (start, segment) in text.split_sentence_bound_indices() {
            pending.extend(word_tokens(segment, start));

            if self.ends_in_abbreviation(segment) {
                continue;
            }
            if let (Some(first), Some(last)) = (pending.first(), pending.last()) {
                sentences.push(SentenceTokens {
                    span: Span::new(first.start, last.end),
                    tokens: std::mem::take(&mut pending),
                });
            }
        }

        if let (Some(first), Some(last)) = (pending.first(), pending.last()) {
            sentences.push(SentenceTokens {
                span: Span::new(first.start, last.end),
                tokens: pending,
            });
        }

        sentences
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence_texts<'t>(text: &'t str, tokenizer: &RuleTokenizer) -> Vec<&'t str> {
        tokenizer
            .tokenize(text)
            .iter()
            .map(|s| &text[s.span.start..s.span.end])
            .collect()
    }

    #[test]
    fn test_sentences_and_tokens() {
        let text = "Patient denies chest pain. Mother has diabetes.";
        let sentences = RuleTokenizer::new().tokenize(text);

        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].span, Span::new(0, 26));
        assert_eq!(
            sentences[0].tokens,
            vec![
                Span::new(0, 7),
                Span::new(8, 14),
                Span::new(15, 20),
                Span::new(21, 25),
                Span::new(25, 26),
            ]
        );
        assert_eq!(sentences[1].span, Span::new(27, 47));
    }

    #[test]
    fn test_abbreviations_do_not_end_sentences() {
        let tokenizer = RuleTokenizer::new();
        assert_eq!(
            sentence_texts("Seen by Dr. Smith today. No fever.", &tokenizer),
            vec!["Seen by Dr. Smith today.", "No fever."]
        );
        assert_eq!(
            sentence_texts("Aspirin 81 mg b.i.d. Denies chest pain.", &tokenizer),
            vec!["Aspirin 81 mg b.i.d. Denies chest pain."]
        );
    }

    #[test]
    fn test_custom_abbreviations() {
        let text = "Seen in Cardiol. Clinic today.";
        assert_eq!(sentence_texts(text, &RuleTokenizer::new()).len(), 2);

        let tokenizer = RuleTokenizer::new().with_custom_abbreviations(&["Cardiol."]);
        assert_eq!(sentence_texts(text, &tokenizer), vec![text]);
    }

    #[test]
    fn test_line_breaks_end_sentences() {
        let text = "HPI: cough\nDenies fever.";
        assert_eq!(
            sentence_texts(text, &RuleTokenizer::new()),
            vec!["HPI: cough", "Denies fever."]
        );
    }

    #[test]
    fn test_blank_text() {
        assert!(RuleTokenizer::new().tokenize("").is_empty());
        assert!(RuleTokenizer::new().tokenize("  \n ").is_empty());
    }
}
