use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use thiserror::Error;

/// Prefix the host may put in front of a command
pub const COMMAND_PREFIX: char = '!';

/// Names of the commands the plugin answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CommandName {
    Lastfm,
    #[strum(to_string = "np", serialize = "nowplaying")]
    Np,
    Set,
    Profile,
    Compare,
    Help,
}

impl CommandName {
    pub fn usage(&self) -> &'static str {
        match self {
            CommandName::Lastfm => "lastfm <method> [<id>]",
            CommandName::Np => "np [<id>]",
            CommandName::Set => "set <id>",
            CommandName::Profile => "profile [<id>]",
            CommandName::Compare => "compare <user1> [<user2>]",
            CommandName::Help => "help [<command>]",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CommandName::Lastfm => {
                "Lists Last.fm info where <method> is one of friends, neighbours, profile, recenttracks, \
                 tags, topalbums, topartists, toptracks."
            }
            CommandName::Np => "Announces the now playing track of <id>.",
            CommandName::Set => "Sets your Last.fm ID.",
            CommandName::Profile => "Prints the profile info of <id>.",
            CommandName::Compare => "Compares the taste of two users, <user2> defaults to you.",
            CommandName::Help => "Lists the commands or describes one of them.",
        }
    }

    /// Usage line followed by the description
    pub fn help_text(&self) -> String {
        let mut text = format!("{}: {}", self.usage(), self.description());
        if matches!(self, CommandName::Lastfm | CommandName::Np | CommandName::Profile) {
            text.push_str(" <id> defaults to your registered ID or your nick.");
        }
        text
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("No command given")]
    Empty,

    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Usage: {}", .0.usage())]
    Usage(CommandName),
}

/// A parsed chat command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// The method stays a string so an unknown one can be reported back
    Lastfm { method: String, id: Option<String> },
    NowPlaying { id: Option<String> },
    Set { id: String },
    Profile { id: Option<String> },
    Compare { user1: String, user2: Option<String> },
    Help { command: Option<String> },
}

impl BotCommand {
    pub fn name(&self) -> CommandName {
        match self {
            BotCommand::Lastfm { .. } => CommandName::Lastfm,
            BotCommand::NowPlaying { .. } => CommandName::Np,
            BotCommand::Set { .. } => CommandName::Set,
            BotCommand::Profile { .. } => CommandName::Profile,
            BotCommand::Compare { .. } => CommandName::Compare,
            BotCommand::Help { .. } => CommandName::Help,
        }
    }

    /// Parse a line like `!np czshadow` or `compare krf`
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let line = line.strip_prefix(COMMAND_PREFIX).unwrap_or(line);
        let mut words = line.split_whitespace();

        let word = words.next().ok_or(CommandError::Empty)?;
        let name = CommandName::from_str(word).map_err(|_| CommandError::Unknown(word.to_string()))?;
        let args: Vec<String> = words.map(str::to_string).collect();

        let usage = || CommandError::Usage(name);
        let mut args = args.into_iter();
        let (first, second, rest) = (args.next(), args.next(), args.next());
        if rest.is_some() {
            return Err(usage());
        }

        match name {
            CommandName::Lastfm => {
                let method = first.ok_or_else(usage)?;
                Ok(BotCommand::Lastfm { method, id: second })
            }
            CommandName::Compare => {
                let user1 = first.ok_or_else(usage)?;
                Ok(BotCommand::Compare { user1, user2: second })
            }
            _ if second.is_some() => Err(usage()),
            CommandName::Np => Ok(BotCommand::NowPlaying { id: first }),
            CommandName::Set => Ok(BotCommand::Set { id: first.ok_or_else(usage)? }),
            CommandName::Profile => Ok(BotCommand::Profile { id: first }),
            CommandName::Help => Ok(BotCommand::Help { command: first }),
        }
    }
}

/// Reply to `help [<command>]`
pub fn help_reply(command: Option<&str>) -> Result<String, CommandError> {
    match command {
        Some(word) => CommandName::from_str(word.trim_start_matches(COMMAND_PREFIX))
            .map(|name| name.help_text())
            .map_err(|_| CommandError::Unknown(word.to_string())),
        None => {
            let names: Vec<String> = CommandName::iter().map(|n| n.to_string()).collect();
            Ok(format!("Commands: {}", names.join(", ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            BotCommand::parse("lastfm TopArtists czshadow").unwrap(),
            BotCommand::Lastfm { method: "TopArtists".into(), id: Some("czshadow".into()) }
        );
        assert_eq!(BotCommand::parse("!np").unwrap(), BotCommand::NowPlaying { id: None });
        assert_eq!(
            BotCommand::parse("NowPlaying krf").unwrap(),
            BotCommand::NowPlaying { id: Some("krf".into()) }
        );
        assert_eq!(BotCommand::parse("set  krf ").unwrap(), BotCommand::Set { id: "krf".into() });
        assert_eq!(BotCommand::parse("profile").unwrap(), BotCommand::Profile { id: None });
        assert_eq!(
            BotCommand::parse("compare krf").unwrap(),
            BotCommand::Compare { user1: "krf".into(), user2: None }
        );
        assert_eq!(BotCommand::parse("help np").unwrap(), BotCommand::Help { command: Some("np".into()) });
        assert_eq!(BotCommand::parse("nowplaying").unwrap().name(), CommandName::Np);
        assert_eq!(BotCommand::parse("compare a b").unwrap().name().to_string(), "compare");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(BotCommand::parse("   "), Err(CommandError::Empty));
        assert_eq!(BotCommand::parse("!"), Err(CommandError::Empty));
        assert_eq!(BotCommand::parse("scrobble x"), Err(CommandError::Unknown("scrobble".into())));
        assert_eq!(BotCommand::parse("lastfm"), Err(CommandError::Usage(CommandName::Lastfm)));
        assert_eq!(BotCommand::parse("set"), Err(CommandError::Usage(CommandName::Set)));
        assert_eq!(BotCommand::parse("np a b"), Err(CommandError::Usage(CommandName::Np)));
        assert_eq!(BotCommand::parse("compare a b c"), Err(CommandError::Usage(CommandName::Compare)));
    }

    #[test]
    fn test_usage_message() {
        let err = BotCommand::parse("compare").unwrap_err();
        assert_eq!(err.to_string(), "Usage: compare <user1> [<user2>]");
    }

    #[test]
    fn test_help_reply() {
        assert_eq!(help_reply(None).unwrap(), "Commands: lastfm, np, set, profile, compare, help");
        assert!(help_reply(Some("np")).unwrap().starts_with("np [<id>]: Announces"));
        assert!(help_reply(Some("!set")).unwrap().starts_with("set <id>:"));
        assert!(help_reply(Some("dance")).is_err());
    }
}
