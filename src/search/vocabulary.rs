//! Synonym vocabularies for amenities and property types.
//!
//! A [`Vocabulary`] maps every normalized variant (synonym, translation, common
//! misspelling) to the canonical tag it stands for. Feature and type vocabularies
//! are built separately and never share an index.

use super::normalize::normalize;
use crate::error::VocabularyError;
use ahash::AHashMap;

/// Canonical tag followed by its declared variants.
pub type SynonymTable<'a> = &'a [(&'a str, &'a [&'a str])];

/// Amenity synonyms, Spanish canonical tags with Spanish and English variants.
pub const FEATURE_SYNONYMS: SynonymTable<'static> = &[
    (
        "piscina",
        &["pool", "swimming pool", "piscinas", "alberca", "pileta"],
    ),
    ("balcon", &["balcony", "balcones", "balconies"]),
    ("ascensor", &["elevator", "elevador", "lift", "ascensores"]),
    ("gimnasio", &["gym", "gimnasios", "fitness", "fitness center"]),
    (
        "parqueadero",
        &[
            "parking",
            "parqueaderos",
            "parqueo",
            "garaje",
            "garage",
            "estacionamiento",
            "cochera",
        ],
    ),
    ("terraza", &["terrace", "terrazas", "rooftop", "azotea"]),
    (
        "vista al mar",
        &[
            "ocean view",
            "ocean-view",
            "sea view",
            "vista mar",
            "frente al mar",
            "oceanfront",
            "beachfront",
        ],
    ),
    ("amoblado", &["furnished", "amoblada", "amueblado", "amueblada"]),
    (
        "mascotas",
        &[
            "pet friendly",
            "pet-friendly",
            "pets allowed",
            "pets",
            "mascota",
            "se aceptan mascotas",
        ],
    ),
    (
        "aire acondicionado",
        &["air conditioning", "aire", "climatizado", "ac"],
    ),
    (
        "porteria",
        &["doorman", "concierge", "vigilancia", "seguridad", "security"],
    ),
    ("bbq", &["barbecue", "asador", "parrilla", "zona bbq", "grill"]),
    ("jardin", &["garden", "jardines", "zonas verdes", "green areas"]),
    ("estudio", &["study", "home office"]),
    (
        "deposito",
        &["storage room", "cuarto util", "depositos", "bodega privada"],
    ),
];

/// Property type synonyms.
pub const TYPE_SYNONYMS: SynonymTable<'static> = &[
    (
        "apartamento",
        &[
            "apartment",
            "apartamentos",
            "apto",
            "departamento",
            "depto",
            "flat",
            "condo",
        ],
    ),
    ("casa", &["house", "home", "casas", "vivienda", "chalet", "villa"]),
    ("lote", &["lot", "lotes", "terreno", "land", "parcela", "solar"]),
    ("oficina", &["office", "oficinas", "consultorio"]),
    (
        "local",
        &[
            "local comercial",
            "locales",
            "commercial space",
            "store",
            "shop",
            "retail",
        ],
    ),
    (
        "apartaestudio",
        &["aparta estudio", "studio", "studio apartment", "loft", "monoambiente"],
    ),
    (
        "finca",
        &["farm", "hacienda", "casa campestre", "country house", "ranch", "quinta"],
    ),
    ("bodega", &["warehouse", "bodegas", "galpon", "nave industrial"]),
    ("penthouse", &["pent house", "ph", "atico"]),
];

/// A multi-word variant and the tag it resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrase {
    pub variant: String,
    pub tag: String,
}

/// Immutable reverse lookup from normalized variant to canonical tag.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    name: &'static str,
    /// normalized variant → canonical tag
    index: AHashMap<String, String>,
    /// canonical tag → normalized variants, tag first
    variants: AHashMap<String, Vec<String>>,
    /// Canonical tags in table order
    tags: Vec<String>,
    /// Multi-word variants, longest first
    phrases: Vec<Phrase>,
}

impl Vocabulary {
    /// Builds a vocabulary from a synonym table.
    ///
    /// Fails if two different canonical tags claim the same normalized variant,
    /// or if any tag or variant normalizes to nothing.
    pub fn build(name: &'static str, table: SynonymTable<'_>) -> Result<Self, VocabularyError> {
        let mut index: AHashMap<String, String> = AHashMap::new();
        let mut variants: AHashMap<String, Vec<String>> = AHashMap::new();
        let mut tags = Vec::with_capacity(table.len());
        let mut phrases = Vec::new();

        for (raw_tag, raw_variants) in table {
            let tag = normalize(raw_tag);
            if tag.is_empty() {
                return Err(VocabularyError::EmptyVariant {
                    vocabulary: name,
                    tag: (*raw_tag).to_string(),
                    raw: (*raw_tag).to_string(),
                });
            }
            if !variants.contains_key(&tag) {
                tags.push(tag.clone());
            }

            for raw in std::iter::once(raw_tag).chain(raw_variants.iter()) {
                let variant = normalize(raw);
                if variant.is_empty() {
                    return Err(VocabularyError::EmptyVariant {
                        vocabulary: name,
                        tag: tag.clone(),
                        raw: (*raw).to_string(),
                    });
                }

                match index.get(&variant) {
                    Some(existing) if *existing != tag => {
                        return Err(VocabularyError::OverlappingVariant {
                            vocabulary: name,
                            variant,
                            first: existing.clone(),
                            second: tag,
                        });
                    }
                    // Same tag listed twice (e.g. "ocean view" and "ocean-view")
                    Some(_) => {}
                    None => {
                        if variant.contains(' ') {
                            phrases.push(Phrase {
                                variant: variant.clone(),
                                tag: tag.clone(),
                            });
                        }
                        variants
                            .entry(tag.clone())
                            .or_default()
                            .push(variant.clone());
                        index.insert(variant, tag.clone());
                    }
                }
            }
        }

        // Longest phrases are removed from the query first so a shorter phrase
        // never splits a longer one.
        phrases.sort_by(|a, b| b.variant.len().cmp(&a.variant.len()));

        tracing::debug!(
            "Built {} vocabulary: {} tags, {} variants, {} phrases",
            name,
            tags.len(),
            index.len(),
            phrases.len()
        );

        Ok(Self {
            name,
            index,
            variants,
            tags,
            phrases,
        })
    }

    /// Vocabulary name, used in logs and errors.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Resolves an already-normalized variant to its canonical tag.
    pub fn lookup(&self, normalized: &str) -> Option<&str> {
        self.index.get(normalized).map(String::as_str)
    }

    /// Resolves arbitrary text, normalizing it first.
    pub fn resolve(&self, text: &str) -> Option<&str> {
        self.lookup(&normalize(text))
    }

    /// All normalized variants of a canonical tag, the tag itself first.
    pub fn variants(&self, tag: &str) -> &[String] {
        self.variants.get(tag).map_or(&[], Vec::as_slice)
    }

    /// Canonical tags in declaration order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Multi-word variants, longest first.
    pub fn phrases(&self) -> &[Phrase] {
        &self.phrases
    }

    /// Number of distinct variants.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// The feature and type vocabularies used together by the parser and scorer.
#[derive(Debug, Clone)]
pub struct Vocabularies {
    pub features: Vocabulary,
    pub types: Vocabulary,
}

impl Vocabularies {
    /// Builds both vocabularies from custom tables.
    pub fn new(
        features: SynonymTable<'_>,
        types: SynonymTable<'_>,
    ) -> Result<Self, VocabularyError> {
        Ok(Self {
            features: Vocabulary::build("feature", features)?,
            types: Vocabulary::build("type", types)?,
        })
    }

    /// Builds the built-in Spanish/English vocabularies.
    pub fn builtin() -> Result<Self, VocabularyError> {
        Self::new(FEATURE_SYNONYMS, TYPE_SYNONYMS)
    }
}
