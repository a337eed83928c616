use crate::helpers::http_client::{HttpClient, HttpClientError};
use log::{debug, error, warn};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// YouTube Data API v3 search endpoint
pub const YOUTUBE_SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";
/// Prefix of the short watch links posted in replies
pub const YOUTUBE_SHORT_LINK: &str = "https://youtu.be/";
/// Reply when no video was found
pub const NO_RESULTS: &str = "No YouTube results found.";
/// Appended to [`NO_RESULTS`] when no API key is configured
pub const NO_API_KEY_HINT: &str = " (is the API key set?)";

#[derive(Debug, Error)]
pub enum YoutubeError {
    #[error("No YouTube API key configured")]
    MissingApiKey,

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] HttpClientError),

    #[error("Invalid search response: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    #[serde(default)]
    title: String,
}

/// First video found for a query
#[derive(Debug, Clone, PartialEq)]
pub struct Video {
    pub id: String,
    pub title: Option<String>,
}

impl Video {
    pub fn link(&self) -> String {
        format!("{}{}", YOUTUBE_SHORT_LINK, self.id)
    }
}

/// Looks up videos for tracks through the YouTube search API
#[derive(Debug, Clone)]
pub struct YoutubeClient {
    api_key: String,
    search_url: String,
    http: Box<dyn HttpClient>,
}

impl YoutubeClient {
    pub fn new(api_key: &str, http: Box<dyn HttpClient>) -> Self {
        Self::with_search_url(api_key, YOUTUBE_SEARCH_URL, http)
    }

    pub fn with_search_url(api_key: &str, search_url: &str, http: Box<dyn HttpClient>) -> Self {
        Self {
            api_key: api_key.trim().to_string(),
            search_url: search_url.to_string(),
            http,
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn search_request_url(&self, query: &str) -> Result<Url, YoutubeError> {
        let url = Url::parse_with_params(
            &self.search_url,
            &[
                ("q", query),
                ("part", "snippet"),
                ("maxResults", "1"),
                ("order", "relevance"),
                ("key", self.api_key.as_str()),
                ("safeSearch", "none"),
            ],
        )?;
        Ok(url)
    }

    /// First search result for `query`, `None` when the search found nothing usable
    pub fn lookup(&self, query: &str) -> Result<Option<Video>, YoutubeError> {
        if !self.has_api_key() {
            return Err(YoutubeError::MissingApiKey);
        }

        let url = self.search_request_url(query)?;
        let value = self.http.get_json(url.as_str())?;
        let response: SearchResponse = serde_json::from_value(value)?;

        let video = response.items.into_iter().next().and_then(|item| {
            let title = item.snippet.map(|s| s.title).filter(|t| !t.is_empty());
            item.id.video_id.filter(|id| !id.is_empty()).map(|id| Video { id, title })
        });
        match &video {
            Some(v) => debug!("YouTube result for '{}': {} ({:?})", query, v.id, v.title),
            None => debug!("No YouTube result for '{}'", query),
        }
        Ok(video)
    }

    /// Watch link for the first result, or a fallback text. Never fails.
    pub fn search(&self, query: &str) -> String {
        match self.lookup(query) {
            Ok(Some(video)) => video.link(),
            Ok(None) => NO_RESULTS.to_string(),
            Err(YoutubeError::MissingApiKey) => {
                error!("YouTube search requested but no API key is configured");
                format!("{}{}", NO_RESULTS, NO_API_KEY_HINT)
            }
            Err(e) => {
                warn!("YouTube search for '{}' failed: {}", query, e);
                NO_RESULTS.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::http_client::mock::MockHttpClient;

    const ONE_RESULT: &str = r#"{
        "kind": "youtube#searchListResponse",
        "items": [
            {
                "kind": "youtube#searchResult",
                "id": { "kind": "youtube#video", "videoId": "dQw4w9WgXcQ" },
                "snippet": { "title": "Never Gonna Give You Up" }
            }
        ]
    }"#;

    fn client(key: &str, http: &MockHttpClient) -> YoutubeClient {
        YoutubeClient::new(key, Box::new(http.clone()))
    }

    #[test]
    fn test_first_result_link() {
        let http = MockHttpClient::new();
        http.respond(YOUTUBE_SEARCH_URL, ONE_RESULT);

        let youtube = client("KEY", &http);
        assert_eq!(youtube.search("Never Gonna Give You Up by Rick Astley"), "https://youtu.be/dQw4w9WgXcQ");

        let requests = http.requests();
        assert_eq!(requests.len(), 1);
        let url = Url::parse(&requests[0]).unwrap();
        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(params.contains(&("q".to_string(), "Never Gonna Give You Up by Rick Astley".to_string())));
        assert!(params.contains(&("maxResults".to_string(), "1".to_string())));
        assert!(params.contains(&("key".to_string(), "KEY".to_string())));
        assert!(params.contains(&("safeSearch".to_string(), "none".to_string())));
    }

    #[test]
    fn test_missing_key_short_circuits() {
        let http = MockHttpClient::new();
        http.respond(YOUTUBE_SEARCH_URL, ONE_RESULT);

        let youtube = client("  ", &http);
        assert_eq!(youtube.search("anything"), "No YouTube results found. (is the API key set?)");
        assert!(http.requests().is_empty());
    }

    #[test]
    fn test_empty_items() {
        let http = MockHttpClient::new();
        http.respond(YOUTUBE_SEARCH_URL, r#"{"items": []}"#);
        assert_eq!(client("KEY", &http).search("nothing"), NO_RESULTS);
    }

    #[test]
    fn test_item_without_video_id() {
        let http = MockHttpClient::new();
        http.respond(
            YOUTUBE_SEARCH_URL,
            r#"{"items": [{"id": {"kind": "youtube#channel", "channelId": "UC1"}}]}"#,
        );
        assert_eq!(client("KEY", &http).search("a channel"), NO_RESULTS);
    }

    #[test]
    fn test_failures_are_absorbed() {
        let http = MockHttpClient::new();
        http.respond(YOUTUBE_SEARCH_URL, "<html>quota exceeded</html>");
        assert_eq!(client("KEY", &http).search("broken json"), NO_RESULTS);

        let http = MockHttpClient::new();
        http.fail_status(YOUTUBE_SEARCH_URL, 403);
        assert_eq!(client("KEY", &http).search("forbidden"), NO_RESULTS);

        let http = MockHttpClient::new();
        http.fail_transport(YOUTUBE_SEARCH_URL);
        assert_eq!(client("KEY", &http).search("offline"), NO_RESULTS);
    }

    #[test]
    fn test_lookup_returns_title() {
        let http = MockHttpClient::new();
        http.respond(YOUTUBE_SEARCH_URL, ONE_RESULT);
        let video = client("KEY", &http).lookup("rick").unwrap().unwrap();
        assert_eq!(video.id, "dQw4w9WgXcQ");
        assert_eq!(video.title.as_deref(), Some("Never Gonna Give You Up"));
    }

    #[test]
    fn test_lookup_rejects_non_json_body() {
        let http = MockHttpClient::new();
        http.respond(YOUTUBE_SEARCH_URL, "<html>quota exceeded</html>");
        let result = client("KEY", &http).lookup("rick");
        assert!(matches!(result, Err(YoutubeError::Http(HttpClientError::ParseError(_)))));

        let http = MockHttpClient::new();
        http.respond(YOUTUBE_SEARCH_URL, "  ");
        let result = client("KEY", &http).lookup("rick");
        assert!(matches!(result, Err(YoutubeError::Http(HttpClientError::EmptyResponse))));
    }
}
