//! Client for the IMDb suggestion index used to enrich scraped titles.
//!
//! One GET per title with a bounded timeout. Any failure is reported as
//! `Unavailable` and never aborts a refresh.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::{EnrichmentOutcome, EnrichmentRecord};
use crate::port::EnrichmentLookup;

pub const DEFAULT_BASE_URL: &str = "https://v3.sg.media-imdb.com/suggestion/x/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct SuggestionResponse {
    #[serde(default)]
    d: Vec<Suggestion>,
}

#[derive(Debug, Deserialize)]
struct Suggestion {
    #[serde(default)]
    id: String,
    #[serde(default)]
    y: Option<i32>,
    #[serde(default)]
    i: Option<SuggestionImage>,
    #[serde(default)]
    s: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SuggestionImage {
    #[serde(rename = "imageUrl")]
    image_url: Option<String>,
}

impl From<Suggestion> for EnrichmentRecord {
    fn from(suggestion: Suggestion) -> Self {
        Self {
            id: suggestion.id,
            year: suggestion.y.map(|y| y.to_string()),
            poster_url: suggestion.i.and_then(|i| i.image_url),
            synopsis: suggestion.s.filter(|s| !s.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SuggestionClient {
    client: Client,
    base_url: Url,
}

impl SuggestionClient {
    /// # Errors
    /// Returns an error when the base URL does not parse or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build suggestion HTTP client")?;
        let base_url = Url::parse(base_url).context("invalid suggestion base URL")?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("suggestion base URL cannot carry a path: {base_url}");
        }

        Ok(Self { client, base_url })
    }

    fn lookup_url(&self, title: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&format!("{title}.json"));
        }
        url.query_pairs_mut().append_pair("includeVideos", "1");
        url
    }

    /// Best match for `title`, or `None` when the index has no candidates.
    async fn lookup(&self, title: &str) -> Result<Option<EnrichmentRecord>> {
        let url = self.lookup_url(title);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("suggestion request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("suggestion index returned status {status}");
        }

        let body = response
            .json::<SuggestionResponse>()
            .await
            .context("failed to decode suggestion response")?;

        Ok(body
            .d
            .into_iter()
            .next()
            .filter(|best| !best.id.trim().is_empty())
            .map(EnrichmentRecord::from))
    }
}

#[async_trait]
impl EnrichmentLookup for SuggestionClient {
    async fn resolve(&self, title: &str) -> EnrichmentOutcome {
        let title = title.trim();
        if title.is_empty() {
            return EnrichmentOutcome::NoMatch;
        }

        match self.lookup(title).await {
            Ok(Some(record)) => {
                debug!(%title, id = %record.id, "title enriched");
                EnrichmentOutcome::Matched(record)
            }
            Ok(None) => {
                debug!(%title, "no suggestion for title");
                EnrichmentOutcome::NoMatch
            }
            Err(error) => {
                let reason = format!("{error:#}");
                warn!(%title, error = %reason, "enrichment lookup failed");
                EnrichmentOutcome::Unavailable(reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, timeout: Duration) -> SuggestionClient {
        SuggestionClient::new(&format!("{}/suggestion/x/", server.uri()), timeout)
            .expect("client should build")
    }

    #[tokio::test]
    async fn resolve_takes_first_candidate() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "d": [
                {
                    "id": "tt13443470",
                    "l": "Wednesday",
                    "y": 2022,
                    "s": "Jenna Ortega, Hunter Doohan",
                    "i": { "imageUrl": "https://m.media-amazon.com/images/wednesday.jpg", "height": 1500, "width": 1013 }
                },
                { "id": "tt0000001", "l": "Wednesday (other)" }
            ]
        });
        Mock::given(method("GET"))
            .and(path("/suggestion/x/Wednesday.json"))
            .and(query_param("includeVideos", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let outcome = client(&server, DEFAULT_TIMEOUT).resolve("Wednesday").await;

        assert_eq!(
            outcome,
            EnrichmentOutcome::Matched(EnrichmentRecord {
                id: "tt13443470".into(),
                year: Some("2022".into()),
                poster_url: Some("https://m.media-amazon.com/images/wednesday.jpg".into()),
                synopsis: Some("Jenna Ortega, Hunter Doohan".into()),
            })
        );
    }

    #[tokio::test]
    async fn empty_result_set_is_no_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "d": [] })))
            .mount(&server)
            .await;

        let outcome = client(&server, DEFAULT_TIMEOUT).resolve("Nothing").await;

        assert_eq!(outcome, EnrichmentOutcome::NoMatch);
    }

    #[tokio::test]
    async fn error_status_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let outcome = client(&server, DEFAULT_TIMEOUT).resolve("Wednesday").await;

        assert!(matches!(outcome, EnrichmentOutcome::Unavailable(_)));
        assert!(outcome.into_match().is_none());
    }

    #[tokio::test]
    async fn slow_index_times_out_as_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "d": [{ "id": "tt1" }] }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let outcome = client(&server, Duration::from_millis(50)).resolve("Slow").await;

        assert!(matches!(outcome, EnrichmentOutcome::Unavailable(_)));
    }

    #[test]
    fn lookup_url_percent_encodes_title() {
        let client = SuggestionClient::new(DEFAULT_BASE_URL, DEFAULT_TIMEOUT).unwrap();
        let url = client.lookup_url("Squid Game: The Challenge");

        assert_eq!(
            url.as_str(),
            "https://v3.sg.media-imdb.com/suggestion/x/Squid%20Game:%20The%20Challenge.json?includeVideos=1"
        );
    }
}
