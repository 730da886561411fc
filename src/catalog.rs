//! Catalog protocol surface: the addon manifest and the catalogs it lists.

use serde::Serialize;

use crate::domain::ContentType;

pub const MANIFEST_ID: &str = "org.top10catalog.netflix";
pub const MANIFEST_NAME: &str = "Netflix Top 10";
const MANIFEST_DESCRIPTION: &str = "Weekly Netflix Top 10 films and series, with genre picks";

/// A catalog advertised in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogDefinition {
    pub id: &'static str,
    pub content_type: ContentType,
    pub name: &'static str,
}

// Ids are part of installed clients' URLs and must stay stable.
pub const CATALOGS: [CatalogDefinition; 2] = [
    CatalogDefinition {
        id: "my-custom-list",
        content_type: ContentType::Movie,
        name: "Netflix Top 10",
    },
    CatalogDefinition {
        id: "my-custom-series",
        content_type: ContentType::Series,
        name: "Netflix Top 10 Series",
    },
];

/// Looks up the catalog served for `(content_type, id)`.
pub fn resolve_catalog(content_type: &str, id: &str) -> Option<&'static CatalogDefinition> {
    let content_type = content_type.parse::<ContentType>().ok()?;
    CATALOGS
        .iter()
        .find(|catalog| catalog.content_type == content_type && catalog.id == id)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: &'static str,
    pub version: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub resources: Vec<&'static str>,
    pub types: Vec<ContentType>,
    pub catalogs: Vec<ManifestCatalog>,
    pub id_prefixes: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManifestCatalog {
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub id: &'static str,
    pub name: &'static str,
    pub extra: Vec<ManifestExtra>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestExtra {
    pub name: &'static str,
    pub is_required: bool,
}

impl Manifest {
    #[must_use]
    pub fn build() -> Self {
        let catalogs = CATALOGS
            .iter()
            .map(|catalog| ManifestCatalog {
                content_type: catalog.content_type,
                id: catalog.id,
                name: catalog.name,
                extra: ["skip", "search"]
                    .into_iter()
                    .map(|name| ManifestExtra {
                        name,
                        is_required: false,
                    })
                    .collect(),
            })
            .collect();

        Self {
            id: MANIFEST_ID,
            version: env!("CARGO_PKG_VERSION"),
            name: MANIFEST_NAME,
            description: MANIFEST_DESCRIPTION,
            resources: vec!["catalog"],
            types: ContentType::ALL.to_vec(),
            catalogs,
            id_prefixes: vec!["tt"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_matches_type_and_id_together() {
        assert_eq!(
            resolve_catalog("movie", "my-custom-list").map(|c| c.content_type),
            Some(ContentType::Movie)
        );
        assert!(resolve_catalog("series", "my-custom-list").is_none());
        assert!(resolve_catalog("anime", "my-custom-list").is_none());
        assert!(resolve_catalog("series", "my-custom-series").is_some());
    }

    #[test]
    fn manifest_lists_both_catalogs_with_optional_extras() {
        let json = serde_json::to_value(Manifest::build()).unwrap();

        assert_eq!(json["resources"], serde_json::json!(["catalog"]));
        assert_eq!(json["types"], serde_json::json!(["movie", "series"]));
        assert_eq!(json["idPrefixes"], serde_json::json!(["tt"]));
        assert_eq!(json["catalogs"][1]["type"], "series");
        assert_eq!(json["catalogs"][0]["extra"][1]["name"], "search");
        assert_eq!(json["catalogs"][0]["extra"][1]["isRequired"], false);
    }
}
