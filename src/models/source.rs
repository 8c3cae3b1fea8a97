use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Country, Language, ResponseStatus, SortType, SourceCategory};

/// A publisher as listed by the `/sources` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub id: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub category: SourceCategory,
    pub language: Language,
    pub country: Country,
    pub available_sort_orders: Vec<SortType>,
}

#[derive(Deserialize)]
struct RawSource {
    id: String,
    name: String,
    description: String,
    url: String,
    category: SourceCategory,
    language: Language,
    country: Country,
    #[serde(rename = "sortBysAvailable")]
    sort_bys_available: Vec<String>,
}

impl Source {
    /// Build a source from one JSON object.
    ///
    /// Unknown sort orders are dropped; any other missing or invalid field
    /// rejects the whole record.
    pub fn from_json(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        let raw: RawSource = serde_json::from_value(value.clone()).ok()?;
        Some(Self {
            id: raw.id,
            name: raw.name,
            description: raw.description,
            url: raw.url,
            category: raw.category,
            language: raw.language,
            country: raw.country,
            available_sort_orders: raw
                .sort_bys_available
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect(),
        })
    }

    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "description": self.description,
            "url": self.url,
            "category": self.category.as_str(),
            "language": self.language.as_str(),
            "country": self.country.as_str(),
            "sortBysAvailable": self
                .available_sort_orders
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>(),
        })
    }

    pub fn selection(&self) -> SelectedSource {
        SelectedSource {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Envelope returned by the `/sources` endpoint.
#[derive(Debug, Clone)]
pub struct SourceResponse {
    pub status: ResponseStatus,
    pub sources: Vec<Source>,
}

#[derive(Deserialize)]
struct RawSourceResponse {
    status: ResponseStatus,
    sources: Vec<Map<String, Value>>,
}

impl SourceResponse {
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let raw: RawSourceResponse = serde_json::from_slice(bytes).ok()?;
        Some(Self {
            status: raw.status,
            sources: raw
                .sources
                .into_iter()
                .filter_map(|obj| Source::from_json(&Value::Object(obj)))
                .collect(),
        })
    }
}

/// The part of a source the news screen needs: the id to fetch with and
/// the name to group articles under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectedSource {
    pub id: String,
    pub name: String,
}

impl SelectedSource {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
