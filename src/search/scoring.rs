//! Search relevance scoring for individual listings.
//!
//! Each listing is flattened into a [`FieldIndex`] of normalized fields, then
//! scored against a [`ParsedQuery`]:
//! - free tokens add a fixed weight per field they appear in
//! - required features and the required type add flat bonuses
//! - a character-subsequence similarity breaks ties between near-misses
//! - numeric minimums reject outright when the listing's value is known and lower

use super::normalize::{normalize, normalize_opt};
use super::query::ParsedQuery;
use super::vocabulary::Vocabularies;
use crate::listing::{Attribute, Listing};
use std::collections::BTreeSet;

pub const TITLE_WEIGHT: f64 = 55.0;
pub const NEIGHBORHOOD_WEIGHT: f64 = 45.0;
pub const ID_WEIGHT: f64 = 40.0;
pub const CITY_WEIGHT: f64 = 35.0;
/// Amenity matches are the strongest relevance signal.
pub const FEATURES_WEIGHT: f64 = 65.0;
pub const TYPE_WEIGHT: f64 = 15.0;
pub const REQUIRED_FEATURE_BONUS: f64 = 80.0;
pub const REQUIRED_TYPE_BONUS: f64 = 50.0;
pub const FUZZY_SCALE: f64 = 20.0;

/// Normalized, searchable view of one listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldIndex {
    pub title: String,
    pub city: String,
    pub neighborhood: String,
    pub id: String,
    pub kind: String,
    /// Canonical type tag, when the listing's type resolves through the vocabulary.
    pub canonical_kind: Option<String>,
    pub description: String,
    /// Explicit feature labels plus every variant of every inferred feature tag,
    /// so a substring search for any synonym hits.
    pub features: String,
}

impl FieldIndex {
    pub fn build(listing: &Listing, vocab: &Vocabularies) -> Self {
        let kind = normalize(&listing.kind);
        let canonical_kind = vocab
            .types
            .lookup(&kind)
            .or_else(|| kind.split(' ').find_map(|token| vocab.types.lookup(token)))
            .map(str::to_string);

        Self {
            title: normalize(&listing.title),
            city: normalize(&listing.city),
            neighborhood: normalize_opt(listing.neighborhood.as_deref()),
            id: normalize(&listing.id),
            kind,
            canonical_kind,
            description: normalize_opt(listing.description.as_deref()),
            features: features_string(listing, vocab),
        }
    }

    /// Fields a free token may match to pass the gate.
    fn gate_fields(&self) -> [&str; 6] {
        [
            self.title.as_str(),
            self.neighborhood.as_str(),
            self.city.as_str(),
            self.id.as_str(),
            self.kind.as_str(),
            self.features.as_str(),
        ]
    }

    fn matches_any_field(&self, token: &str) -> bool {
        self.gate_fields().iter().any(|field| field.contains(token))
    }

    /// All fields joined, used by the fuzzy subsequence term.
    fn combined(&self) -> String {
        [
            self.title.as_str(),
            self.neighborhood.as_str(),
            self.city.as_str(),
            self.id.as_str(),
            self.kind.as_str(),
            self.description.as_str(),
            self.features.as_str(),
        ]
        .iter()
        .filter(|field| !field.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// Builds the features string: explicit labels, then each inferred canonical tag
/// expanded to all its variants.
///
/// A label infers a tag only when the whole label is a variant, or when it
/// contains a multi-word variant on word boundaries. Single words inside a
/// longer label never infer a tag ("juegos al aire libre" is not air
/// conditioning).
fn features_string(listing: &Listing, vocab: &Vocabularies) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut tags: BTreeSet<String> = listing
        .amenities
        .iter()
        .map(|amenity| amenity.tag().to_string())
        .collect();

    for label in &listing.features {
        let label = normalize(label);
        if label.is_empty() {
            continue;
        }

        if let Some(tag) = vocab.features.lookup(&label) {
            tags.insert(tag.to_string());
        } else {
            let padded = format!(" {label} ");
            for phrase in vocab.features.phrases() {
                if padded.contains(&format!(" {} ", phrase.variant)) {
                    tags.insert(phrase.tag.clone());
                }
            }
        }
        parts.push(label);
    }

    for tag in tags {
        let variants = vocab.features.variants(&tag);
        if variants.is_empty() {
            parts.push(tag);
        } else {
            parts.extend(variants.iter().cloned());
        }
    }

    parts.join(" ")
}

/// How strictly free tokens must match before a listing is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// No gate; used for very short queries.
    Open,
    /// Every free token must hit some field.
    Strict,
    /// At least one free token must hit some field.
    Relaxed,
}

impl Gate {
    fn admits(self, fields: &FieldIndex, tokens: &[String]) -> bool {
        match self {
            Self::Open => true,
            Self::Strict => tokens.iter().all(|token| fields.matches_any_field(token)),
            Self::Relaxed => tokens.iter().any(|token| fields.matches_any_field(token)),
        }
    }
}

/// Why a listing was excluded regardless of its textual relevance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Free tokens did not satisfy the gate.
    GateMiss,
    /// A known numeric attribute is below the query's minimum.
    BelowMinimum {
        attribute: Attribute,
        minimum: u32,
        actual: u32,
    },
}

/// Outcome of scoring one listing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    Scored(f64),
    Rejected(Rejection),
}

impl Verdict {
    /// The score if the listing should appear in results (score above zero).
    pub fn positive(self) -> Option<f64> {
        match self {
            Self::Scored(score) if score > 0.0 => Some(score),
            _ => None,
        }
    }
}

/// Scores one listing against a parsed query.
pub fn score(
    listing: &Listing,
    fields: &FieldIndex,
    parsed: &ParsedQuery,
    gate: Gate,
) -> Verdict {
    if !gate.admits(fields, &parsed.tokens) {
        return Verdict::Rejected(Rejection::GateMiss);
    }

    // Unknown values are not checked: missing data is not a violation.
    for attribute in Attribute::ALL {
        if let (Some(minimum), Some(actual)) = (
            parsed.constraints.minimum(attribute),
            listing.attribute(attribute),
        ) && actual < minimum
        {
            return Verdict::Rejected(Rejection::BelowMinimum {
                attribute,
                minimum,
                actual,
            });
        }
    }

    let mut total = 0.0;

    for token in &parsed.tokens {
        for (field, weight) in [
            (&fields.title, TITLE_WEIGHT),
            (&fields.neighborhood, NEIGHBORHOOD_WEIGHT),
            (&fields.id, ID_WEIGHT),
            (&fields.city, CITY_WEIGHT),
            (&fields.features, FEATURES_WEIGHT),
            (&fields.kind, TYPE_WEIGHT),
        ] {
            if field.contains(token.as_str()) {
                total += weight;
            }
        }
    }

    for tag in &parsed.constraints.features {
        if fields.features.contains(tag.as_str()) {
            total += REQUIRED_FEATURE_BONUS;
        }
    }

    if let Some(required) = &parsed.constraints.property_type
        && fields.canonical_kind.as_ref() == Some(required)
    {
        total += REQUIRED_TYPE_BONUS;
    }

    total += subsequence_ratio(&parsed.normalized, &fields.combined()) * FUZZY_SCALE;

    Verdict::Scored(total)
}

/// Fraction of the query's non-whitespace characters that appear, in order, in
/// `text`. Matching is greedy left to right.
pub fn subsequence_ratio(query: &str, text: &str) -> f64 {
    let needle: Vec<char> = query.chars().filter(|c| !c.is_whitespace()).collect();
    if needle.is_empty() {
        return 0.0;
    }

    let mut haystack = text.chars();
    let mut matched = 0usize;
    for wanted in &needle {
        if haystack.any(|c| c == *wanted) {
            matched += 1;
        } else {
            break;
        }
    }

    matched as f64 / needle.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::Amenity;
    use crate::search::query::parse;
    use assert2::{check, let_assert};
    use rstest::{fixture, rstest};

    #[fixture]
    fn vocab() -> Vocabularies {
        let_assert!(Ok(vocab) = Vocabularies::builtin());
        vocab
    }

    fn sample() -> Listing {
        Listing {
            neighborhood: Some("Bocagrande".to_string()),
            kind: "Apartamento".to_string(),
            bedrooms: Some(3),
            features: vec!["Piscina climatizada".to_string()],
            ..Listing::new("CTG-101", "Apartamento con vista", "Cartagena")
        }
    }

    #[rstest]
    #[case("abc", "aXbXc", 1.0)]
    #[case("abc", "acb", 2.0 / 3.0)]
    #[case("a b", "ab", 1.0)]
    #[case("xyz", "abc", 0.0)]
    #[case("", "abc", 0.0)]
    fn test_subsequence_ratio(#[case] query: &str, #[case] text: &str, #[case] expected: f64) {
        check!((subsequence_ratio(query, text) - expected).abs() < 1e-9);
    }

    #[rstest]
    fn test_field_index_expands_feature_synonyms(vocab: Vocabularies) {
        let mut listing = sample();
        listing.amenities.insert(Amenity::OceanView);
        let fields = FieldIndex::build(&listing, &vocab);

        check!(fields.features.contains("piscina climatizada"));
        check!(fields.features.contains("ocean view"));
        check!(fields.canonical_kind.as_deref() == Some("apartamento"));
        check!(fields.neighborhood == "bocagrande");
    }

    #[rstest]
    fn test_whole_label_expands_to_synonyms(vocab: Vocabularies) {
        let listing = Listing {
            features: vec!["Piscina".to_string()],
            ..Listing::new("L0", "Loft", "Cartagena")
        };
        let fields = FieldIndex::build(&listing, &vocab);
        check!(fields.features.contains("pool"));
        check!(fields.features.contains("alberca"));
    }

    #[rstest]
    fn test_single_word_inside_label_infers_nothing(vocab: Vocabularies) {
        let outdoor = Listing {
            features: vec!["Juegos al aire libre".to_string()],
            ..Listing::new("OUT", "Casa campestre", "Turbaco")
        };
        let plain = Listing::new("PLAIN", "Casa campestre", "Turbaco");
        let parsed = parse("aire acondicionado", &vocab);

        let outdoor_fields = FieldIndex::build(&outdoor, &vocab);
        check!(!outdoor_fields.features.contains("acondicionado"));
        check!(!outdoor_fields.features.contains("climatizado"));

        let_assert!(
            Verdict::Scored(outdoor_score) = score(&outdoor, &outdoor_fields, &parsed, Gate::Strict)
        );
        let plain_fields = FieldIndex::build(&plain, &vocab);
        let_assert!(
            Verdict::Scored(plain_score) = score(&plain, &plain_fields, &parsed, Gate::Strict)
        );
        check!(outdoor_score < REQUIRED_FEATURE_BONUS);
        check!(plain_score < REQUIRED_FEATURE_BONUS);
    }

    #[rstest]
    fn test_explicit_english_feature_resolves(vocab: Vocabularies) {
        let listing = Listing {
            features: vec!["Gym".to_string(), "sea view terrace".to_string()],
            ..Listing::new("L1", "Loft", "Cartagena")
        };
        let fields = FieldIndex::build(&listing, &vocab);
        check!(fields.features.contains("gimnasio"));
        check!(fields.features.contains("vista al mar"));
        check!(!fields.features.contains("terraza"));
    }

    #[rstest]
    fn test_score_adds_field_weights(vocab: Vocabularies) {
        let listing = sample();
        let fields = FieldIndex::build(&listing, &vocab);
        let parsed = parse("bocagrande", &vocab);

        let_assert!(Verdict::Scored(score) = score(&listing, &fields, &parsed, Gate::Strict));
        let fuzzy = subsequence_ratio("bocagrande", &fields.combined()) * FUZZY_SCALE;
        check!((score - (NEIGHBORHOOD_WEIGHT + fuzzy)).abs() < 1e-9);
    }

    #[rstest]
    fn test_required_feature_and_type_bonuses(vocab: Vocabularies) {
        let listing = sample();
        let fields = FieldIndex::build(&listing, &vocab);
        let parsed = parse("apartamento piscina", &vocab);

        let_assert!(Some(score) = score(&listing, &fields, &parsed, Gate::Strict).positive());
        check!(score >= REQUIRED_FEATURE_BONUS + REQUIRED_TYPE_BONUS);
    }

    #[rstest]
    fn test_strict_gate_requires_every_token(vocab: Vocabularies) {
        let listing = sample();
        let fields = FieldIndex::build(&listing, &vocab);
        let parsed = parse("bocagrande medellin", &vocab);

        check!(
            score(&listing, &fields, &parsed, Gate::Strict)
                == Verdict::Rejected(Rejection::GateMiss)
        );
        check!(
            score(&listing, &fields, &parsed, Gate::Relaxed)
                .positive()
                .is_some()
        );
    }

    #[rstest]
    fn test_minimum_violation_is_a_rejection(vocab: Vocabularies) {
        let listing = sample();
        let fields = FieldIndex::build(&listing, &vocab);
        let parsed = parse("bocagrande 4h", &vocab);

        check!(
            score(&listing, &fields, &parsed, Gate::Strict)
                == Verdict::Rejected(Rejection::BelowMinimum {
                    attribute: Attribute::Bedrooms,
                    minimum: 4,
                    actual: 3,
                })
        );
    }

    #[rstest]
    fn test_unknown_attribute_is_not_checked(vocab: Vocabularies) {
        let listing = Listing {
            bedrooms: None,
            ..sample()
        };
        let fields = FieldIndex::build(&listing, &vocab);
        let parsed = parse("bocagrande 4h 9b", &vocab);

        check!(
            score(&listing, &fields, &parsed, Gate::Strict)
                .positive()
                .is_some()
        );
    }
}
