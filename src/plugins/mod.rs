/// Plugin lifecycle trait
pub mod plugin;

/// Chat text to bot command parsing
pub mod command;

/// Last.fm command handlers
pub mod lastfm;

pub use command::{BotCommand, CommandError};
pub use lastfm::{ChatContext, LastfmPlugin, Message};
pub use plugin::Plugin;
