use crate::data::{RecentTrack, TrackTime};
use crate::helpers::lastfm::{LastfmEndpoints, LastfmError};
use crate::helpers::sanitize::printable;
use crate::parsers::{find, first_text, parse_xml};
use log::debug;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use url::Url;

/// Marker the user page shows instead of a time for the track being played
pub const SCROBBLING_NOW: &str = "Scrobbling now";

/// Where the most recent track is read from
///
/// Last.fm retired parts of its web service over time; the user page is the
/// source that still works without an API key, the web service gives the album.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TrackSource {
    /// user.getrecenttracks XML from the 2.0 web service
    #[serde(alias = "api_xml")]
    Api,
    /// Scraped public user page
    #[default]
    #[serde(alias = "profile_page")]
    Page,
}

impl TrackSource {
    /// URL this source fetches for a user
    pub fn url(&self, endpoints: &LastfmEndpoints, id: &str) -> Result<Url, LastfmError> {
        match self {
            TrackSource::Api => endpoints.recent_tracks_url(id),
            TrackSource::Page => endpoints.user_page_url(id),
        }
    }

    /// Extract the most recent track from a document fetched from [`TrackSource::url`]
    pub fn parse(&self, document: &str) -> Result<RecentTrack, LastfmError> {
        match self {
            TrackSource::Api => parse_api_xml(document),
            TrackSource::Page => Ok(parse_user_page(document)),
        }
    }
}

/// Parse a `<recenttracks>` document, newest track first.
///
/// Artist and title are required; a track without them is a parse error.
/// An empty or missing album is reported as `None`.
pub fn parse_api_xml(document: &str) -> Result<RecentTrack, LastfmError> {
    let doc = parse_xml(document)?;
    let recent = find(doc.root_element(), "recenttracks")
        .ok_or_else(|| LastfmError::Parse("Missing <recenttracks> element".to_string()))?;
    let user = recent.attribute("user").unwrap_or_default();

    let track = match recent.children().find(|n| n.has_tag_name("track")) {
        Some(track) => track,
        None => {
            debug!("No tracks in recent tracks of {}", user);
            return Ok(RecentTrack::empty(user));
        }
    };

    let now_playing = track.attribute("nowplaying") == Some("true");
    let time = if now_playing {
        None
    } else {
        let uts = find(track, "date")
            .and_then(|date| date.attribute("uts"))
            .ok_or_else(|| LastfmError::Parse("Missing <date uts> of played track".to_string()))?;
        let uts = uts
            .trim()
            .parse::<i64>()
            .map_err(|e| LastfmError::Parse(format!("Invalid timestamp '{}': {}", uts, e)))?;
        Some(TrackTime::Timestamp(uts))
    };

    let artist = first_text(track, "artist")
        .ok_or_else(|| LastfmError::Parse("Missing <artist> of recent track".to_string()))?;
    let title = first_text(track, "name")
        .ok_or_else(|| LastfmError::Parse("Missing <name> of recent track".to_string()))?;
    let album = first_text(track, "album");

    Ok(RecentTrack {
        user: user.to_string(),
        now_playing,
        artist: Some(artist),
        title: Some(title),
        album,
        time,
    })
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

static USER_NAME: Lazy<Selector> = Lazy::new(|| {
    selector("#content > header > div:nth-of-type(2) > div > div:nth-of-type(2) > div:nth-of-type(1) > h1")
});

static TRACK_TITLE: Lazy<Selector> = Lazy::new(|| {
    selector("#recent-tracks-section > table > tbody > tr:nth-of-type(1) > td:nth-of-type(3) > span > a")
});

static TRACK_ARTIST: Lazy<Selector> = Lazy::new(|| {
    selector(
        "#recent-tracks-section > table > tbody > tr:nth-of-type(1) > td:nth-of-type(3) > span > span:nth-of-type(2) > a",
    )
});

static TRACK_TIME: Lazy<Selector> = Lazy::new(|| {
    selector("#recent-tracks-section > table > tbody > tr:nth-of-type(1) > td:nth-of-type(4) > span")
});

/// Concatenated direct text children of every element matching `selector`
fn direct_text(document: &Html, selector: &Selector) -> String {
    let raw: String = document
        .select(selector)
        .flat_map(|element| element.children().filter_map(|child| child.value().as_text().map(|t| t.to_string())))
        .collect();
    printable(&raw)
}

/// Scrape the most recent track from a Last.fm user page.
///
/// Cells are found by their position in the recent tracks table, so a
/// redesign of the page shows up as empty fields rather than an error.
/// The page has no album.
pub fn parse_user_page(document: &str) -> RecentTrack {
    let html = Html::parse_document(document);

    let user = direct_text(&html, &USER_NAME);
    let title = direct_text(&html, &TRACK_TITLE);
    let artist = direct_text(&html, &TRACK_ARTIST);
    let time = direct_text(&html, &TRACK_TIME);

    let now_playing = time == SCROBBLING_NOW;
    debug!(
        "Scraped user page: user='{}' title='{}' artist='{}' time='{}'",
        user, title, artist, time
    );

    let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };
    RecentTrack {
        user,
        now_playing,
        artist: non_empty(artist),
        title: non_empty(title),
        album: None,
        time: if now_playing { None } else { non_empty(time).map(TrackTime::Text) },
    }
}
