//! Span conflict resolution.
//!
//! Turns overlapping candidates into a non-overlapping entity set with a
//! single left-to-right sweep. Candidates are compared whole; a losing
//! candidate is dropped, never clipped.
//!
//! Overlap ranking, strongest first:
//! 1. higher confidence
//! 2. longer span, counted in characters
//! 3. higher source priority
//! 4. earlier start, then earlier position in the input

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{Candidate, CandidateError, Entity};

/// Output of [`resolve`]: the surviving entities plus every candidate that
/// was rejected during validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Pairwise-disjoint entities sorted by start offset.
    pub entities: Vec<Entity>,
    /// Candidates that never took part in resolution.
    pub rejected: Vec<CandidateError>,
}

/// A validated candidate with its stable input position.
struct Ranked {
    candidate: Candidate,
    char_len: usize,
    order: usize,
}

impl Ranked {
    /// `Greater` when `self` should be kept over `other`.
    fn preference(&self, other: &Ranked) -> Ordering {
        self.candidate
            .confidence
            .total_cmp(&other.candidate.confidence)
            .then(self.char_len.cmp(&other.char_len))
            .then(
                self.candidate
                    .source_priority
                    .cmp(&other.candidate.source_priority),
            )
            .then(other.candidate.span.start.cmp(&self.candidate.span.start))
            .then(other.order.cmp(&self.order))
    }
}

/// Stateless conflict resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictResolver;

impl ConflictResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve `candidates` annotating `text` into disjoint entities.
    pub fn resolve(&self, text: &str, candidates: Vec<Candidate>) -> Resolution {
        let mut rejected = Vec::new();
        let mut ranked: Vec<Ranked> = Vec::with_capacity(candidates.len());

        for (order, candidate) in candidates.into_iter().enumerate() {
            match candidate.validate(text) {
                Ok(()) => ranked.push(Ranked {
                    char_len: candidate.span.char_len(text),
                    candidate,
                    order,
                }),
                Err(err) => rejected.push(err),
            }
        }

        // Stable: equal (start, end) pairs keep their input order.
        ranked.sort_by(|a, b| {
            a.candidate
                .span
                .start
                .cmp(&b.candidate.span.start)
                .then(b.candidate.span.end.cmp(&a.candidate.span.end))
        });

        let mut accepted: Vec<Ranked> = Vec::with_capacity(ranked.len());
        for challenger in ranked {
            match accepted.last_mut() {
                Some(current) if current.candidate.span.overlaps(&challenger.candidate.span) => {
                    if challenger.preference(current) == Ordering::Greater {
                        *current = challenger;
                    }
                }
                _ => accepted.push(challenger),
            }
        }

        let entities = accepted
            .into_iter()
            .map(|ranked| Entity::from_candidate(ranked.candidate, text))
            .collect();

        Resolution { entities, rejected }
    }
}

/// Resolve `candidates` annotating `text` into disjoint entities.
///
/// Shorthand for [`ConflictResolver::resolve`].
pub fn resolve(text: &str, candidates: Vec<Candidate>) -> Resolution {
    ConflictResolver::new().resolve(text, candidates)
}
