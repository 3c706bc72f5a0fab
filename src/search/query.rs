//! Free-text query parsing.
//!
//! Turns a raw query such as `"apto bocagrande 3h2b con piscina"` into residual
//! free tokens plus a structured [`Constraints`] set:
//!
//! 1. normalize the query
//! 2. detect multi-word vocabulary phrases and cut them out
//! 3. split what remains on whitespace
//! 4. consume numeric shorthand tokens (`3h`, `2banos`, `3h2b1g`)
//! 5. resolve single tokens against the feature, then the type vocabulary

use super::normalize::{collapse_whitespace, normalize};
use super::vocabulary::{Phrase, Vocabularies};
use crate::listing::Attribute;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// A whole token made of `<digits><unit>` segments.
static SHORTHAND_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[0-9]+[a-z]+)+$").expect("valid shorthand pattern"));

/// One `<digits><unit>` segment inside a shorthand token.
static SHORTHAND_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)([a-z]+)").expect("valid segment pattern"));

/// Which vocabulary a detected phrase came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhraseKind {
    Feature,
    Type,
}

/// A vocabulary term recognized in the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectedPhrase {
    pub kind: PhraseKind,
    /// Canonical tag the matched text resolves to.
    pub tag: String,
    /// Normalized text that matched.
    pub matched: String,
}

/// Structured requirements extracted from a query.
///
/// Numeric constraints are minimums: `3h` means at least three bedrooms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Constraints {
    pub min_bedrooms: Option<u32>,
    pub min_bathrooms: Option<u32>,
    pub min_parking: Option<u32>,
    /// Canonical type tag; the last type mentioned wins.
    pub property_type: Option<String>,
    /// Canonical feature tags.
    pub features: BTreeSet<String>,
}

impl Constraints {
    /// The minimum set for an attribute, if any.
    pub const fn minimum(&self, attribute: Attribute) -> Option<u32> {
        match attribute {
            Attribute::Bedrooms => self.min_bedrooms,
            Attribute::Bathrooms => self.min_bathrooms,
            Attribute::Parking => self.min_parking,
        }
    }

    /// Raises a minimum to `value`; repeated mentions keep the strictest.
    fn raise(&mut self, attribute: Attribute, value: u32) {
        let slot = match attribute {
            Attribute::Bedrooms => &mut self.min_bedrooms,
            Attribute::Bathrooms => &mut self.min_bathrooms,
            Attribute::Parking => &mut self.min_parking,
        };
        *slot = Some(slot.map_or(value, |current| current.max(value)));
    }

    pub fn is_empty(&self) -> bool {
        self.min_bedrooms.is_none()
            && self.min_bathrooms.is_none()
            && self.min_parking.is_none()
            && self.property_type.is_none()
            && self.features.is_empty()
    }
}

/// Result of parsing a raw query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedQuery {
    /// The whole query after normalization.
    pub normalized: String,
    pub phrases: Vec<DetectedPhrase>,
    /// Tokens that matched no vocabulary entry and no shorthand pattern.
    pub tokens: Vec<String>,
    pub constraints: Constraints,
}

impl ParsedQuery {
    /// True for an empty or whitespace-only query: callers should skip the search.
    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    fn record(&mut self, kind: PhraseKind, tag: &str, matched: &str) {
        match kind {
            PhraseKind::Feature => {
                self.constraints.features.insert(tag.to_string());
            }
            PhraseKind::Type => self.constraints.property_type = Some(tag.to_string()),
        }
        self.phrases.push(DetectedPhrase {
            kind,
            tag: tag.to_string(),
            matched: matched.to_string(),
        });
    }
}

/// Parses a raw query against the given vocabularies.
pub fn parse(raw: &str, vocab: &Vocabularies) -> ParsedQuery {
    let normalized = normalize(raw);
    let mut parsed = ParsedQuery {
        normalized,
        ..ParsedQuery::default()
    };
    if parsed.is_empty() {
        return parsed;
    }

    let remainder = extract_phrases(&mut parsed, vocab);

    for token in remainder.split_whitespace() {
        if apply_shorthand(token, &mut parsed.constraints) {
            continue;
        }

        if let Some(tag) = vocab.features.lookup(token) {
            parsed.record(PhraseKind::Feature, tag, token);
        } else if let Some(tag) = vocab.types.lookup(token) {
            parsed.record(PhraseKind::Type, tag, token);
        } else {
            parsed.tokens.push(token.to_string());
        }
    }

    tracing::debug!(
        "Parsed query '{}': {} phrases, free tokens {:?}, constraints {:?}",
        parsed.normalized,
        parsed.phrases.len(),
        parsed.tokens,
        parsed.constraints
    );

    parsed
}

/// Records every multi-word phrase found in the normalized query and returns
/// the query with those phrases cut out.
///
/// Detection always runs against the untouched normalized query, so a phrase is
/// found no matter which other phrases precede it. Only the returned remainder
/// is mutated.
///
/// Matching is whole-word: a variant must be bounded by spaces or the ends of
/// the query, so `"micasa campestre"` does not contain `"casa campestre"`.
fn extract_phrases(parsed: &mut ParsedQuery, vocab: &Vocabularies) -> String {
    // Padding makes every match land on word boundaries.
    let haystack = format!(" {} ", parsed.normalized);
    let mut working = haystack.clone();

    let candidates = vocab
        .features
        .phrases()
        .iter()
        .map(|phrase| (PhraseKind::Feature, phrase))
        .chain(
            vocab
                .types
                .phrases()
                .iter()
                .map(|phrase| (PhraseKind::Type, phrase)),
        );

    for (kind, Phrase { variant, tag }) in candidates {
        let needle = format!(" {variant} ");
        if !haystack.contains(&needle) {
            continue;
        }
        parsed.record(kind, tag, variant);
        while working.contains(&needle) {
            working = working.replacen(&needle, " ", 1);
        }
    }

    collapse_whitespace(&working)
}

/// Applies a numeric shorthand token (`3h`, `2b`, `1g`, `3hab2banos`) to the
/// constraints. Returns false, leaving the constraints untouched, when the token
/// is not shorthand.
fn apply_shorthand(token: &str, constraints: &mut Constraints) -> bool {
    if !SHORTHAND_TOKEN.is_match(token) {
        return false;
    }

    let mut updates = Vec::new();
    for captures in SHORTHAND_SEGMENT.captures_iter(token) {
        let attribute = match captures[2].chars().next() {
            Some('h') => Attribute::Bedrooms,
            Some('b') => Attribute::Bathrooms,
            Some('g') => Attribute::Parking,
            _ => return false,
        };
        let Ok(value) = captures[1].parse::<u32>() else {
            return false;
        };
        updates.push((attribute, value));
    }

    for (attribute, value) in updates {
        constraints.raise(attribute, value);
    }
    true
}
