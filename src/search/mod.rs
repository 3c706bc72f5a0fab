//! Smart property search: query parsing, synonym expansion and ranking.
//!
//! The engine is synchronous and holds no mutable state, so a single
//! [`SmartSearch`] can be shared across concurrent searches.

pub mod normalize;
pub mod query;
pub mod rank;
pub mod scoring;
pub mod vocabulary;

pub use normalize::normalize;
pub use query::{Constraints, DetectedPhrase, ParsedQuery, PhraseKind};
pub use rank::{Explanation, MAX_RESULTS, ScoredCandidate};
pub use scoring::{Gate, Rejection, Verdict};
pub use vocabulary::{SynonymTable, Vocabularies, Vocabulary};

use crate::error::VocabularyError;
use crate::listing::Listing;

/// Search engine over an in-memory slice of listings.
#[derive(Debug, Clone)]
pub struct SmartSearch {
    vocab: Vocabularies,
    limit: usize,
}

impl SmartSearch {
    /// Builds the engine with the built-in Spanish/English vocabularies.
    pub fn new() -> Result<Self, VocabularyError> {
        Ok(Self::with_vocabularies(Vocabularies::builtin()?))
    }

    /// Builds the engine around custom vocabularies.
    pub fn with_vocabularies(vocab: Vocabularies) -> Self {
        Self {
            vocab,
            limit: MAX_RESULTS,
        }
    }

    /// Lowers the number of results returned; values above [`MAX_RESULTS`] are capped.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.min(MAX_RESULTS);
        self
    }

    pub const fn limit(&self) -> usize {
        self.limit
    }

    pub const fn vocabularies(&self) -> &Vocabularies {
        &self.vocab
    }

    pub fn parse(&self, raw: &str) -> ParsedQuery {
        query::parse(raw, &self.vocab)
    }

    /// Ranks listings for an already parsed query.
    pub fn rank<'a>(&self, parsed: &ParsedQuery, listings: &'a [Listing]) -> Vec<&'a Listing> {
        rank::rank(parsed, listings, &self.vocab, self.limit)
    }

    /// Parses and ranks in one step. An empty query returns no results.
    pub fn search<'a>(&self, raw: &str, listings: &'a [Listing]) -> Vec<&'a Listing> {
        self.search_with_limit(raw, listings, self.limit)
    }

    /// Like [`search`](Self::search) with a per-call limit, still capped at [`MAX_RESULTS`].
    pub fn search_with_limit<'a>(
        &self,
        raw: &str,
        listings: &'a [Listing],
        limit: usize,
    ) -> Vec<&'a Listing> {
        let parsed = self.parse(raw);
        if parsed.is_empty() {
            return Vec::new();
        }
        rank::rank(&parsed, listings, &self.vocab, limit)
    }

    /// Every listing's verdict under the gate [`rank`](Self::rank) would use,
    /// rejections included.
    pub fn explain<'a>(&self, parsed: &ParsedQuery, listings: &'a [Listing]) -> Explanation<'a> {
        rank::explain(parsed, listings, &self.vocab)
    }
}
