use std::any::Any;
use std::str::FromStr;

use crate::config::BotConfig;
use crate::data::RecentTrack;
use crate::helpers::http_client::{new_http_client, HttpClient};
use crate::helpers::identity_store::IdentityStore;
use crate::helpers::lastfm::{LastfmEndpoints, LastfmError, LegacyMethod};
use crate::helpers::sanitize::safe_truncate;
use crate::helpers::timeago::format_time_ago;
use crate::helpers::youtube::YoutubeClient;
use crate::parsers::legacy::parse_list;
use crate::parsers::profile::parse_profile;
use crate::parsers::tasteometer::parse_comparison;
use crate::plugins::command::{help_reply, BotCommand};
use crate::plugins::plugin::Plugin;
use log::{debug, error, info, warn};

/// Where replies and errors of a command go
pub trait ChatContext {
    fn reply(&mut self, text: &str);

    fn error(&mut self, text: &str);
}

/// The chat message a command came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub nick: String,
    pub channel: Option<String>,
}

impl Message {
    pub fn new(nick: &str, channel: Option<&str>) -> Self {
        Self {
            nick: nick.to_string(),
            channel: channel.map(str::to_string),
        }
    }
}

/// Last.fm commands: chart listings, now playing, profiles and taste comparison
pub struct LastfmPlugin {
    name: String,
    version: String,
    config: BotConfig,
    endpoints: LastfmEndpoints,
    http: Box<dyn HttpClient>,
    /// `None` when video links are disabled
    youtube: Option<YoutubeClient>,
    store: IdentityStore,
}

impl LastfmPlugin {
    pub fn new(config: BotConfig, http: Box<dyn HttpClient>, store: IdentityStore) -> Self {
        let endpoints = LastfmEndpoints::new(
            &config.lastfm.api_1_0_url,
            &config.lastfm.api_2_0_url,
            &config.lastfm.user_page_url,
            &config.lastfm.api_key,
        );
        let youtube = if config.youtube.enabled {
            Some(YoutubeClient::with_search_url(
                &config.youtube.api_key,
                &config.youtube.search_url,
                http.clone(),
            ))
        } else {
            info!("YouTube links disabled by configuration");
            None
        };

        Self {
            name: "lastfm".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            config,
            endpoints,
            http,
            youtube,
            store,
        }
    }

    /// Open the identity store and HTTP client described by the configuration
    pub fn from_config(config: BotConfig) -> Result<Self, LastfmError> {
        let store = IdentityStore::open(&config.database.directory)?;
        let http = new_http_client(config.http.timeout_secs);
        Ok(Self::new(config, http, store))
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Parse a chat line and run the command it names
    pub fn handle_line(&mut self, ctx: &mut dyn ChatContext, msg: &Message, line: &str) {
        match BotCommand::parse(line) {
            Ok(command) => self.handle(ctx, msg, &command),
            Err(e) => {
                debug!("Rejected command line '{}' from {}: {}", line, msg.nick, e);
                ctx.error(&e.to_string());
            }
        }
    }

    pub fn handle(&mut self, ctx: &mut dyn ChatContext, msg: &Message, command: &BotCommand) {
        debug!("{} from {} on {:?}: {:?}", command.name(), msg.nick, msg.channel, command);
        match command {
            BotCommand::Lastfm { method, id } => self.legacy_method(ctx, msg, method, id.as_deref()),
            BotCommand::NowPlaying { id } => self.now_playing(ctx, msg, id.as_deref()),
            BotCommand::Set { id } => self.set_user_id(ctx, msg, id),
            BotCommand::Profile { id } => self.profile(ctx, msg, id.as_deref()),
            BotCommand::Compare { user1, user2 } => self.compare(ctx, msg, user1, user2.as_deref()),
            BotCommand::Help { command } => match help_reply(command.as_deref()) {
                Ok(text) => self.reply(ctx, &text),
                Err(e) => ctx.error(&e.to_string()),
            },
        }
    }

    fn reply(&self, ctx: &mut dyn ChatContext, text: &str) {
        match self.config.reply_max_chars {
            Some(max) => ctx.reply(safe_truncate(text, max)),
            None => ctx.reply(text),
        }
    }

    /// Stored Last.fm ID for a nick; store failures count as no entry
    fn stored_id(&self, nick: &str) -> Option<String> {
        match self.store.get(nick) {
            Ok(id) => id,
            Err(e) => {
                warn!("Identity lookup for {} failed: {}", nick, e);
                None
            }
        }
    }

    /// Explicit ID, else the caller's stored ID, else the caller's nick
    pub fn resolve_id(&self, msg: &Message, explicit: Option<&str>) -> String {
        match explicit {
            Some(id) => id.to_string(),
            None => self.stored_id(&msg.nick).unwrap_or_else(|| msg.nick.clone()),
        }
    }

    /// Like [`LastfmPlugin::resolve_id`], but an explicit ID may itself be a registered nick
    pub fn resolve_listener_id(&self, msg: &Message, explicit: Option<&str>) -> String {
        match explicit {
            Some(id) => match self.stored_id(id) {
                Some(stored) => {
                    debug!("Resolved nick {} to Last.fm ID {}", id, stored);
                    stored
                }
                None => id.to_string(),
            },
            None => self.resolve_id(msg, None),
        }
    }

    fn fetch(&self, url: &url::Url) -> Result<String, LastfmError> {
        debug!("Fetching {}", url);
        Ok(self.http.get_text(url.as_str())?)
    }

    /// `lastfm <method> [<id>]`
    fn legacy_method(&mut self, ctx: &mut dyn ChatContext, msg: &Message, method: &str, id: Option<&str>) {
        let method = method.to_lowercase();
        let id = self.resolve_id(msg, id);
        let unknown = format!("Unknown ID ({}) or unknown method ({})", msg.nick, method);

        let result = LegacyMethod::from_str(&method)
            .map_err(|_| LastfmError::UnknownMethod(method.clone()))
            .and_then(|m| self.endpoints.legacy_method_url(&id, m))
            .and_then(|url| self.fetch(&url));

        match result {
            Ok(body) => {
                let entries = parse_list(&body);
                let limit = self.config.max_results_for(msg.channel.as_deref());
                let shown: Vec<&str> = entries.iter().take(limit).map(String::as_str).collect();
                let text = format!(
                    "{}'s {}: {} (with a total number of {} entries)",
                    id,
                    method,
                    shown.join(", "),
                    entries.len()
                );
                self.reply(ctx, &text);
            }
            Err(LastfmError::UnknownMethod(_)) | Err(LastfmError::NotFound(_)) => ctx.error(&unknown),
            Err(e) => {
                warn!("lastfm {} for {} failed: {}", method, id, e);
                ctx.error(&format!("Failure: {}", e));
            }
        }
    }

    /// Watch link for a track, `None` when links are disabled
    fn video_link(&self, track: &RecentTrack) -> Option<String> {
        self.youtube.as_ref().map(|youtube| youtube.search(&track.search_query()))
    }

    /// Reply line for a track that has a title
    fn now_playing_text(&self, uid: &str, track: &RecentTrack) -> String {
        let user = if track.user.is_empty() { uid } else { track.user.as_str() };
        let title = track.title.as_deref().unwrap_or_default();
        let artist = track.artist.as_deref().unwrap_or_default();
        let album = track.album.as_ref().map(|a| format!(" [{}]", a)).unwrap_or_default();
        let link = self.video_link(track).map(|l| format!(" | {}", l)).unwrap_or_default();

        if track.now_playing {
            format!("{} is listening to \"{}\" by {}{}{}", user, title, artist, album, link)
        } else {
            let time = track
                .time
                .as_ref()
                .map(|t| format!(" {}", format_time_ago(t)))
                .unwrap_or_default();
            format!("{} listened to \"{}\" by {}{}{}{}", user, title, artist, album, time, link)
        }
    }

    /// `np [<id>]`
    fn now_playing(&mut self, ctx: &mut dyn ChatContext, msg: &Message, id: Option<&str>) {
        let uid = self.resolve_listener_id(msg, id);
        let source = self.config.lastfm.recent_tracks_source;

        let result = source
            .url(&self.endpoints, &uid)
            .and_then(|url| self.fetch(&url))
            .and_then(|body| source.parse(&body));

        match result {
            Ok(track) if !track.has_track() => {
                let text = format!("No information returned, it's possible user {} hasn't played anything.", uid);
                self.reply(ctx, &text);
            }
            Ok(track) => {
                let text = self.now_playing_text(&uid, &track);
                self.reply(ctx, &text);
            }
            Err(LastfmError::NotFound(_)) => ctx.error(&format!("LastFM: Unknown ID {}", uid)),
            Err(e) => {
                warn!("Recent track lookup for {} failed: {}", uid, e);
                ctx.error(&format!("Failure: {}", e));
            }
        }
    }

    /// `set <id>`, followed by the caller's profile
    fn set_user_id(&mut self, ctx: &mut dyn ChatContext, msg: &Message, id: &str) {
        if let Err(e) = self.store.set(&msg.nick, id) {
            error!("Could not store Last.fm ID for {}: {}", msg.nick, e);
            ctx.error(&format!("Failure: {}", e));
            return;
        }
        self.reply(ctx, "LastFM ID changed.");
        self.profile(ctx, msg, None);
    }

    /// `profile [<id>]`
    fn profile(&mut self, ctx: &mut dyn ChatContext, msg: &Message, id: Option<&str>) {
        let id = self.resolve_id(msg, id);

        let result = self
            .endpoints
            .profile_xml_url(&id)
            .and_then(|url| self.fetch(&url))
            .and_then(|body| parse_profile(&id, &body));

        match result {
            Ok(profile) => self.reply(ctx, &profile.to_string()),
            Err(LastfmError::NotFound(_)) => ctx.error(&format!("Unknown user ({})", id)),
            Err(e) => {
                warn!("Profile lookup for {} failed: {}", id, e);
                ctx.error(&format!("Failure: {}", e));
            }
        }
    }

    /// `compare <user1> [<user2>]`
    fn compare(&mut self, ctx: &mut dyn ChatContext, msg: &Message, user1: &str, user2: Option<&str>) {
        let user2 = self.resolve_id(msg, user2);
        let limit = self.config.max_results_for(msg.channel.as_deref());

        let result = self
            .endpoints
            .tasteometer_url(user1, &user2, limit)
            .and_then(|url| self.fetch(&url))
            .and_then(|body| parse_comparison(&body));

        match result {
            Ok(comparison) => {
                let text = format!(
                    "Result of comparison between {} and {}: score: {}, common artists: {}",
                    user1,
                    user2,
                    comparison.score_text(),
                    comparison.artists.join(", ")
                );
                self.reply(ctx, &text);
            }
            Err(e) => ctx.error(&format!("Failure: {}", e)),
        }
    }
}

impl Plugin for LastfmPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn init(&mut self) -> bool {
        if !self.store.is_open() {
            error!("Identity store at {:?} is not open", self.store.path());
            return false;
        }
        if !self.endpoints.has_api_key() {
            warn!("No Last.fm API key configured, compare and the web service track source will fail");
        }
        let known = match self.store.entries() {
            Ok(entries) => entries.len(),
            Err(e) => {
                error!("Cannot read identities from {:?}: {}", self.store.path(), e);
                return false;
            }
        };
        info!(
            "Last.fm plugin {} ready, recent tracks from {}, {} identities in {:?}",
            self.version,
            self.config.lastfm.recent_tracks_source,
            known,
            self.store.path()
        );
        true
    }

    fn flush(&mut self) -> bool {
        debug!("{} identity changes pending", self.store.pending_count());
        match self.store.flush() {
            Ok(0) => true,
            Ok(written) => {
                info!("Saved {} identity changes", written);
                true
            }
            Err(e) => {
                error!("Failed to save identities: {}", e);
                false
            }
        }
    }

    fn shutdown(&mut self) -> bool {
        info!("Shutting down Last.fm plugin");
        match self.store.close() {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to close identity store: {}", e);
                false
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
