use crate::helpers::http_client::HttpClientError;
use crate::helpers::identity_store::StoreError;
use log::debug;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use thiserror::Error;
use url::Url;

/// Deprecated 1.0 web service, still serving plain-text charts and profile XML
pub const LASTFM_API_1_0: &str = "http://ws.audioscrobbler.com/1.0/user";
/// 2.0 web service root
pub const LASTFM_API_2_0: &str = "http://ws.audioscrobbler.com/2.0/";
/// Public user pages, scraped for the recent tracks
pub const LASTFM_USER_PAGE: &str = "https://www.last.fm/user";

/// Error types for Last.fm lookups
#[derive(Debug, Error)]
pub enum LastfmError {
    /// Last.fm answered 4xx: unknown user or method
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parsing error: {0}")]
    Parse(String),

    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Identity store error: {0}")]
    Store(#[from] StoreError),
}

impl From<HttpClientError> for LastfmError {
    fn from(err: HttpClientError) -> Self {
        if err.is_client_error() {
            LastfmError::NotFound(err.to_string())
        } else {
            match err {
                HttpClientError::ParseError(msg) => LastfmError::Parse(msg),
                HttpClientError::EmptyResponse => LastfmError::Parse("empty response".to_string()),
                other => LastfmError::Network(other.to_string()),
            }
        }
    }
}

/// Methods of the plain-text 1.0 web service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LegacyMethod {
    Friends,
    Neighbours,
    Profile,
    RecentTracks,
    Tags,
    TopAlbums,
    TopArtists,
    TopTracks,
}

/// Builds the Last.fm URLs used by the commands
#[derive(Debug, Clone)]
pub struct LastfmEndpoints {
    api_1_0: String,
    api_2_0: String,
    user_page: String,
    api_key: String,
}

impl Default for LastfmEndpoints {
    fn default() -> Self {
        Self::new(LASTFM_API_1_0, LASTFM_API_2_0, LASTFM_USER_PAGE, "")
    }
}

impl LastfmEndpoints {
    pub fn new(api_1_0: &str, api_2_0: &str, user_page: &str, api_key: &str) -> Self {
        Self {
            api_1_0: api_1_0.to_string(),
            api_2_0: api_2_0.to_string(),
            user_page: user_page.to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// `<api_1_0>/<id>/<method>.txt`
    pub fn legacy_method_url(&self, id: &str, method: LegacyMethod) -> Result<Url, LastfmError> {
        join_segments(&self.api_1_0, &[id, &format!("{}.txt", method)])
    }

    /// `<api_1_0>/<id>/profile.xml`
    pub fn profile_xml_url(&self, id: &str) -> Result<Url, LastfmError> {
        join_segments(&self.api_1_0, &[id, "profile.xml"])
    }

    /// `<user_page>/<id>`
    pub fn user_page_url(&self, id: &str) -> Result<Url, LastfmError> {
        join_segments(&self.user_page, &[id])
    }

    /// user.getrecenttracks on the 2.0 web service, newest track only
    pub fn recent_tracks_url(&self, id: &str) -> Result<Url, LastfmError> {
        self.api_2_0_url(&[("method", "user.getrecenttracks"), ("user", id), ("limit", "1")])
    }

    /// tasteometer.compare on the 2.0 web service
    pub fn tasteometer_url(&self, user1: &str, user2: &str, limit: usize) -> Result<Url, LastfmError> {
        let limit = limit.to_string();
        self.api_2_0_url(&[
            ("method", "tasteometer.compare"),
            ("type1", "user"),
            ("type2", "user"),
            ("value1", user1),
            ("value2", user2),
            ("limit", &limit),
        ])
    }

    fn api_2_0_url(&self, params: &[(&str, &str)]) -> Result<Url, LastfmError> {
        let mut url = Url::parse(&self.api_2_0)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("api_key", &self.api_key);
            for (name, value) in params {
                query.append_pair(name, value);
            }
        }
        debug!("Built Last.fm 2.0 URL for {:?}", params.first().map(|(_, v)| *v));
        Ok(url)
    }
}

/// Append percent-encoded path segments to a base URL
fn join_segments(base: &str, segments: &[&str]) -> Result<Url, LastfmError> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| LastfmError::Parse(format!("{} cannot be a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
