/// Track, profile and comparison data
pub mod data;

/// Configuration with support for the legacy top-level service layout
pub mod config;

/// Plugin lifecycle, command parsing and the Last.fm command handlers
pub mod plugins;

/// HTTP, identity store, time formatting and video lookup helpers
pub mod helpers;

/// Extractors for Last.fm XML, text and HTML documents
pub mod parsers;

/// Logging configuration and utilities
pub mod logging;

pub use crate::config::BotConfig;
pub use crate::plugins::{BotCommand, ChatContext, LastfmPlugin, Message, Plugin};
