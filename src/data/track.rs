use serde::{Deserialize, Serialize};

/// When the most recent track was played
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackTime {
    /// Unix timestamp in seconds, as reported by the web service
    Timestamp(i64),
    /// Relative or absolute time text, as shown on the profile page
    Text(String),
}

/// The most recent track of a Last.fm user
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecentTrack {
    /// Display name of the listener
    pub user: String,
    /// The track is still playing and has no timestamp yet
    pub now_playing: bool,
    pub artist: Option<String>,
    pub title: Option<String>,
    /// Only known when the web service was queried
    pub album: Option<String>,
    pub time: Option<TrackTime>,
}

impl RecentTrack {
    /// A user without any scrobbles
    pub fn empty(user: &str) -> Self {
        RecentTrack {
            user: user.to_string(),
            ..Default::default()
        }
    }

    /// True if there is a track to announce
    pub fn has_track(&self) -> bool {
        self.title.as_deref().map_or(false, |t| !t.is_empty())
    }

    /// Search query used to look up a video for this track
    pub fn search_query(&self) -> String {
        format!(
            "{} by {}",
            self.title.as_deref().unwrap_or_default(),
            self.artist.as_deref().unwrap_or_default()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_track() {
        let track = RecentTrack::empty("USER");
        assert_eq!(track.user, "USER");
        assert!(!track.now_playing);
        assert!(!track.has_track());
        assert_eq!(track.artist, None);
        assert_eq!(track.album, None);
        assert_eq!(track.time, None);
    }

    #[test]
    fn test_search_query() {
        let track = RecentTrack {
            user: "USER".into(),
            artist: Some("Aretha Franklin".into()),
            title: Some("Respect".into()),
            ..Default::default()
        };
        assert!(track.has_track());
        assert_eq!(track.search_query(), "Respect by Aretha Franklin");
    }
}
