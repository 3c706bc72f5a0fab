//! Property listing model and the adapter from loosely-typed source records.
//!
//! Listing files in the wild spell the same attribute several ways
//! (`bedrooms`, `habitaciones`, `rooms`) and mix value types (`"3"`, `3`,
//! `"si"`, `true`). [`RawListing`] absorbs all of that at the boundary and
//! [`Listing::from_raw`] produces the one shape the search engine reads.

use crate::search::normalize::normalize;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

/// Boolean amenity flags a listing can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Amenity {
    Pool,
    Balcony,
    Elevator,
    Gym,
    Parking,
    Terrace,
    OceanView,
    Furnished,
    PetFriendly,
}

impl Amenity {
    pub const ALL: [Self; 9] = [
        Self::Pool,
        Self::Balcony,
        Self::Elevator,
        Self::Gym,
        Self::Parking,
        Self::Terrace,
        Self::OceanView,
        Self::Furnished,
        Self::PetFriendly,
    ];

    /// Canonical feature tag for this amenity in the built-in vocabulary.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Pool => "piscina",
            Self::Balcony => "balcon",
            Self::Elevator => "ascensor",
            Self::Gym => "gimnasio",
            Self::Parking => "parqueadero",
            Self::Terrace => "terraza",
            Self::OceanView => "vista al mar",
            Self::Furnished => "amoblado",
            Self::PetFriendly => "mascotas",
        }
    }
}

/// Numeric attributes that queries can put a minimum on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Bedrooms,
    Bathrooms,
    Parking,
}

impl Attribute {
    pub const ALL: [Self; 3] = [Self::Bedrooms, Self::Bathrooms, Self::Parking];
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bedrooms => write!(f, "bedrooms"),
            Self::Bathrooms => write!(f, "bathrooms"),
            Self::Parking => write!(f, "parking"),
        }
    }
}

/// A property listing in its canonical shape.
///
/// The engine only ever reads listings; they are produced by the data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Stable identifier, also the navigation key for a selected result.
    pub id: String,
    pub title: String,
    pub city: String,
    pub neighborhood: Option<String>,
    /// Property type as written by the source (e.g. "Apartamento").
    #[serde(rename = "type")]
    pub kind: String,
    pub price: Option<f64>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub parking: Option<u32>,
    #[serde(default)]
    pub amenities: BTreeSet<Amenity>,
    /// Free-form feature labels (e.g. "Piscina climatizada").
    #[serde(default)]
    pub features: Vec<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl Listing {
    /// Creates a listing with only the required text fields set.
    pub fn new(id: impl Into<String>, title: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            city: city.into(),
            neighborhood: None,
            kind: String::new(),
            price: None,
            bedrooms: None,
            bathrooms: None,
            parking: None,
            amenities: BTreeSet::new(),
            features: Vec::new(),
            description: None,
            image: None,
        }
    }

    /// Value of a numeric attribute, `None` when the source did not say.
    pub const fn attribute(&self, attribute: Attribute) -> Option<u32> {
        match attribute {
            Attribute::Bedrooms => self.bedrooms,
            Attribute::Bathrooms => self.bathrooms,
            Attribute::Parking => self.parking,
        }
    }

    /// Maps a raw source record to a listing.
    ///
    /// Returns `None` when the record has no usable identifier.
    pub fn from_raw(raw: RawListing) -> Option<Self> {
        let id = raw.id.as_ref().and_then(value_text)?;

        let mut amenities = BTreeSet::new();
        for (amenity, flag) in [
            (Amenity::Pool, &raw.pool),
            (Amenity::Balcony, &raw.balcony),
            (Amenity::Elevator, &raw.elevator),
            (Amenity::Gym, &raw.gym),
            (Amenity::Terrace, &raw.terrace),
            (Amenity::OceanView, &raw.ocean_view),
            (Amenity::Furnished, &raw.furnished),
            (Amenity::PetFriendly, &raw.pet_friendly),
        ] {
            if flag.as_ref().is_some_and(truthy) {
                amenities.insert(amenity);
            }
        }

        // `parking` is either a count or a yes/no flag depending on the source.
        let parking = raw.parking.as_ref().and_then(value_count);
        let has_parking = match (&raw.parking, parking) {
            (_, Some(count)) => count > 0,
            (Some(value), None) => truthy(value),
            (None, None) => false,
        };
        if has_parking {
            amenities.insert(Amenity::Parking);
        }

        Some(Self {
            id,
            title: raw.title.as_ref().and_then(value_text).unwrap_or_default(),
            city: raw.city.as_ref().and_then(value_text).unwrap_or_default(),
            neighborhood: raw.neighborhood.as_ref().and_then(value_text),
            kind: raw.kind.as_ref().and_then(value_text).unwrap_or_default(),
            price: raw.price.as_ref().and_then(value_price),
            bedrooms: raw.bedrooms.as_ref().and_then(value_count),
            bathrooms: raw.bathrooms.as_ref().and_then(value_count),
            parking,
            amenities,
            features: raw.features.as_ref().map(value_list).unwrap_or_default(),
            description: raw.description.as_ref().and_then(value_text),
            image: raw.image.as_ref().and_then(first_text),
        })
    }
}

/// A listing record as found in source files, before normalization.
///
/// Every field is optional and accepts the alternative spellings seen in
/// Spanish and English catalogs. When a record carries more than one spelling
/// of the same attribute, the first non-null one in [`RawListing::from_map`]'s
/// key order wins; the others are ignored.
#[derive(Debug, Default, Clone)]
pub struct RawListing {
    pub id: Option<Value>,
    pub title: Option<Value>,
    pub city: Option<Value>,
    pub neighborhood: Option<Value>,
    pub kind: Option<Value>,
    pub price: Option<Value>,
    pub bedrooms: Option<Value>,
    pub bathrooms: Option<Value>,
    pub parking: Option<Value>,
    pub pool: Option<Value>,
    pub balcony: Option<Value>,
    pub elevator: Option<Value>,
    pub gym: Option<Value>,
    pub terrace: Option<Value>,
    pub ocean_view: Option<Value>,
    pub furnished: Option<Value>,
    pub pet_friendly: Option<Value>,
    pub features: Option<Value>,
    pub description: Option<Value>,
    pub image: Option<Value>,
}

impl RawListing {
    /// Picks each attribute from the record's keys, trying spellings in order.
    pub fn from_map(mut record: Map<String, Value>) -> Self {
        let mut take = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| record.remove(*key).filter(|value| !value.is_null()))
        };

        Self {
            id: take(&["id", "codigo", "code", "ref", "slug"]),
            title: take(&["title", "titulo", "name", "nombre"]),
            city: take(&["city", "ciudad"]),
            neighborhood: take(&["neighborhood", "barrio", "sector", "zona"]),
            kind: take(&["type", "tipo", "kind", "property_type"]),
            price: take(&["price", "precio"]),
            bedrooms: take(&["bedrooms", "habitaciones", "rooms", "beds", "alcobas"]),
            bathrooms: take(&["bathrooms", "banos", "baños", "baths"]),
            parking: take(&["parking", "parqueaderos", "parqueadero", "garajes", "garage"]),
            pool: take(&["pool", "piscina"]),
            balcony: take(&["balcony", "balcon", "balcón"]),
            elevator: take(&["elevator", "ascensor"]),
            gym: take(&["gym", "gimnasio"]),
            terrace: take(&["terrace", "terraza"]),
            ocean_view: take(&[
                "ocean_view",
                "ocean-view",
                "oceanView",
                "vista_al_mar",
                "vista_mar",
            ]),
            furnished: take(&["furnished", "amoblado", "amueblado"]),
            pet_friendly: take(&["pet_friendly", "pet-friendly", "petFriendly", "mascotas"]),
            features: take(&["features", "caracteristicas", "amenities", "tags"]),
            description: take(&["description", "descripcion"]),
            image: take(&["image", "imagen", "img", "images", "imagenes"]),
        }
    }
}

impl<'de> Deserialize<'de> for RawListing {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::<String, Value>::deserialize(deserializer).map(Self::from_map)
    }
}

/// Non-empty text from a string or number.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First text found in a string or an array of strings.
fn first_text(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => items.iter().find_map(value_text),
        other => value_text(other),
    }
}

/// Non-negative count from a number or a string like `"3"` or `"3 habitaciones"`.
fn value_count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f.floor() as u64)
            })
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => {
            let digits: String = s
                .trim()
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            digits.parse().ok()
        }
        _ => None,
    }
}

/// Price from a number or a formatted string like `"$350.000.000"`.
fn value_price(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let digits: String = s.chars().filter(char::is_ascii_digit).collect();
            digits.parse().ok()
        }
        _ => None,
    }
}

/// Whether a flag value means "yes".
fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !matches!(
            normalize(s).as_str(),
            "" | "no" | "false" | "0" | "n" | "ninguno" | "none"
        ),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Null => false,
    }
}

/// Feature labels from an array or a delimited string.
fn value_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(value_text).collect(),
        Value::String(s) => s
            .split([',', ';', '|'])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;
    use serde_json::json;

    fn adapt(value: Value) -> Option<Listing> {
        let raw: RawListing = serde_json::from_value(value).ok()?;
        Listing::from_raw(raw)
    }

    #[test]
    fn test_spanish_field_names() {
        let_assert!(
            Some(listing) = adapt(json!({
                "codigo": "CTG-101",
                "titulo": "Apartamento frente al mar",
                "ciudad": "Cartagena",
                "barrio": "Bocagrande",
                "tipo": "Apartamento",
                "precio": "$850.000.000",
                "habitaciones": "3",
                "baños": 2,
                "parqueaderos": 1,
                "piscina": "si",
                "caracteristicas": "Piscina, Gimnasio; BBQ"
            }))
        );
        check!(listing.id == "CTG-101");
        check!(listing.neighborhood.as_deref() == Some("Bocagrande"));
        check!(listing.kind == "Apartamento");
        check!(listing.price == Some(850_000_000.0));
        check!(listing.bedrooms == Some(3));
        check!(listing.bathrooms == Some(2));
        check!(listing.parking == Some(1));
        check!(listing.amenities.contains(&Amenity::Pool));
        check!(listing.amenities.contains(&Amenity::Parking));
        check!(listing.features == vec!["Piscina", "Gimnasio", "BBQ"]);
    }

    #[test]
    fn test_english_field_names() {
        let_assert!(
            Some(listing) = adapt(json!({
                "id": 42,
                "name": "Beach house",
                "city": "Santa Marta",
                "type": "house",
                "price": 420000.5,
                "rooms": 4,
                "baths": 3.0,
                "garage": true,
                "oceanView": true,
                "petFriendly": false,
                "images": ["a.jpg", "b.jpg"]
            }))
        );
        check!(listing.id == "42");
        check!(listing.bedrooms == Some(4));
        check!(listing.bathrooms == Some(3));
        check!(listing.parking.is_none());
        check!(listing.amenities.contains(&Amenity::Parking));
        check!(listing.amenities.contains(&Amenity::OceanView));
        check!(!listing.amenities.contains(&Amenity::PetFriendly));
        check!(listing.image.as_deref() == Some("a.jpg"));
    }

    #[test]
    fn test_missing_id_is_skipped() {
        check!(adapt(json!({"title": "Sin codigo"})).is_none());
        check!(adapt(json!({"id": "  "})).is_none());
    }

    #[test]
    fn test_missing_counts_stay_unknown() {
        let_assert!(Some(listing) = adapt(json!({"id": "L1", "habitaciones": null})));
        check!(listing.bedrooms.is_none());
        check!(listing.attribute(Attribute::Bedrooms).is_none());
        check!(listing.amenities.is_empty());
    }

    #[rstest]
    #[case(json!(true), true)]
    #[case(json!(false), false)]
    #[case(json!(1), true)]
    #[case(json!(0), false)]
    #[case(json!("Sí"), true)]
    #[case(json!("no"), false)]
    #[case(json!(""), false)]
    #[case(json!(null), false)]
    fn test_truthy(#[case] value: Value, #[case] expected: bool) {
        check!(truthy(&value) == expected);
    }

    #[test]
    fn test_repeated_spellings_keep_the_first() {
        let_assert!(
            Some(listing) = adapt(json!({
                "id": "A",
                "codigo": "CTG-9",
                "features": ["Piscina"],
                "amenities": ["Gimnasio"],
                "image": "a.jpg",
                "images": ["b.jpg", "c.jpg"],
                "bedrooms": null,
                "habitaciones": 2
            }))
        );
        check!(listing.id == "A");
        check!(listing.features == vec!["Piscina"]);
        check!(listing.image.as_deref() == Some("a.jpg"));
        check!(listing.bedrooms == Some(2));
    }

    #[test]
    fn test_non_object_record_is_rejected() {
        check!(serde_json::from_value::<RawListing>(json!(["id", "A"])).is_err());
    }

    #[test]
    fn test_zero_parking_count_is_not_an_amenity() {
        let_assert!(Some(listing) = adapt(json!({"id": "L2", "parking": 0})));
        check!(listing.parking == Some(0));
        check!(!listing.amenities.contains(&Amenity::Parking));
    }
}
