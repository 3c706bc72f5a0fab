//! Ranking: score every listing, keep the positives, order and bound them.

use super::query::ParsedQuery;
use super::scoring::{FieldIndex, Gate, Verdict, score};
use super::vocabulary::Vocabularies;
use crate::listing::Listing;

/// Upper bound on the number of results a search returns.
pub const MAX_RESULTS: usize = 12;

/// Queries shorter than this (normalized, in characters) skip the free-token gate.
pub const GATE_MIN_CHARS: usize = 3;

/// A listing paired with its scoring outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate<'a> {
    pub listing: &'a Listing,
    pub verdict: Verdict,
}

/// Every listing's verdict under the gate a search settles on.
#[derive(Debug, Clone, PartialEq)]
pub struct Explanation<'a> {
    /// [`Gate::Open`] for short queries, [`Gate::Strict`] normally, and
    /// [`Gate::Relaxed`] when the strict pass produced no positive score.
    pub gate: Gate,
    /// One entry per listing, in source order.
    pub candidates: Vec<ScoredCandidate<'a>>,
}

/// Ranks listings for a parsed query, best first, at most `limit`
/// (itself capped at [`MAX_RESULTS`]).
///
/// Runs a strict pass where every free token must match; if that leaves nothing
/// and the query is long enough to be gated, runs again requiring only one free
/// token to match. Ties keep source order.
pub fn rank<'a>(
    parsed: &ParsedQuery,
    listings: &'a [Listing],
    vocab: &Vocabularies,
    limit: usize,
) -> Vec<&'a Listing> {
    if parsed.is_empty() {
        return Vec::new();
    }

    let limit = limit.min(MAX_RESULTS);
    let explanation = explain(parsed, listings, vocab);

    let mut ranked: Vec<(&Listing, f64)> = explanation
        .candidates
        .iter()
        .filter_map(|candidate| {
            if let Verdict::Rejected(reason) = candidate.verdict {
                tracing::trace!("Rejected '{}': {:?}", candidate.listing.id, reason);
            }
            candidate
                .verdict
                .positive()
                .map(|score| (candidate.listing, score))
        })
        .collect();

    // `sort_by` is stable, so equal scores keep source order.
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(limit);

    tracing::debug!(
        "Ranked {} of {} listings for '{}' ({:?} gate)",
        ranked.len(),
        listings.len(),
        parsed.normalized,
        explanation.gate
    );

    ranked.into_iter().map(|(listing, _)| listing).collect()
}

/// Scores every listing with the same gate selection [`rank`] uses, keeping
/// rejections.
pub fn explain<'a>(
    parsed: &ParsedQuery,
    listings: &'a [Listing],
    vocab: &Vocabularies,
) -> Explanation<'a> {
    let fields: Vec<FieldIndex> = listings
        .iter()
        .map(|listing| FieldIndex::build(listing, vocab))
        .collect();

    let gated = parsed.normalized.chars().count() >= GATE_MIN_CHARS;
    let gate = if gated { Gate::Strict } else { Gate::Open };
    let candidates = score_with(parsed, listings, &fields, gate);

    if gated
        && !candidates
            .iter()
            .any(|candidate| candidate.verdict.positive().is_some())
    {
        tracing::debug!(
            "No strict matches for '{}', relaxing gate",
            parsed.normalized
        );
        return Explanation {
            gate: Gate::Relaxed,
            candidates: score_with(parsed, listings, &fields, Gate::Relaxed),
        };
    }

    Explanation { gate, candidates }
}

/// Scores every listing under one gate without filtering, in source order.
pub fn score_all<'a>(
    parsed: &ParsedQuery,
    listings: &'a [Listing],
    vocab: &Vocabularies,
    gate: Gate,
) -> Vec<ScoredCandidate<'a>> {
    let fields: Vec<FieldIndex> = listings
        .iter()
        .map(|listing| FieldIndex::build(listing, vocab))
        .collect();
    score_with(parsed, listings, &fields, gate)
}

fn score_with<'a>(
    parsed: &ParsedQuery,
    listings: &'a [Listing],
    fields: &[FieldIndex],
    gate: Gate,
) -> Vec<ScoredCandidate<'a>> {
    listings
        .iter()
        .zip(fields)
        .map(|(listing, fields)| ScoredCandidate {
            listing,
            verdict: score(listing, fields, parsed, gate),
        })
        .collect()
}
