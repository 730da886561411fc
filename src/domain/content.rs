use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Artwork used when neither the source page nor the enrichment index has one.
pub const PLACEHOLDER_POSTER: &str = "https://via.placeholder.com/300x450?text=No+Image";

const DEFAULT_POSTER_SHAPE: &str = "poster";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Movie,
    Series,
}

impl ContentType {
    pub const ALL: [ContentType; 2] = [ContentType::Movie, ContentType::Series];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Movie => "movie",
            ContentType::Series => "series",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown content type: {0}")]
pub struct ParseContentTypeError(pub String);

impl FromStr for ContentType {
    type Err = ParseContentTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "movie" => Ok(ContentType::Movie),
            "series" => Ok(ContentType::Series),
            other => Err(ParseContentTypeError(other.to_string())),
        }
    }
}

/// One catalog entry, serialized in the shape the addon client expects for metas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub name: String,
    #[serde(default)]
    pub release_info: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(default = "default_poster_shape")]
    pub poster_shape: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub genres: Vec<String>,
    /// Set when the record is persisted; all records of one refresh share it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_poster_shape() -> String {
    DEFAULT_POSTER_SHAPE.to_string()
}

impl ContentRecord {
    pub fn new(id: impl Into<String>, content_type: ContentType, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content_type,
            name: name.into(),
            release_info: String::new(),
            poster: None,
            poster_shape: default_poster_shape(),
            description: String::new(),
            genres: Vec::new(),
            created_at: None,
        }
    }

    /// A record without a non-empty id must never be persisted.
    #[must_use]
    pub fn has_identity(&self) -> bool {
        !self.id.trim().is_empty()
    }

    #[must_use]
    pub fn stamped(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }
}
