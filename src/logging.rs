use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use env_logger::{Builder, Target, WriteStyle};
use log::{debug, info, warn, LevelFilter};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Logging subsystems of the bot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LoggingSubsystem {
    /// Command-line host and startup
    Main,
    /// Last.fm endpoints and command handlers
    Lastfm,
    /// YouTube video lookup
    Youtube,
    /// Identity database
    Store,
    /// HTTP client operations
    Http,
    /// XML and HTML extractors
    Parsers,
    /// Plugin lifecycle and command parsing
    Plugins,
    /// Third-party dependencies
    #[strum(to_string = "deps", serialize = "dependencies")]
    #[serde(rename = "deps", alias = "dependencies")]
    Dependencies,
}

impl LoggingSubsystem {
    /// Module prefixes covered by this subsystem
    pub fn module_prefixes(&self) -> &'static [&'static str] {
        match self {
            LoggingSubsystem::Main => &["lastfmbot"],
            LoggingSubsystem::Lastfm => &["lastfmbot::helpers::lastfm", "lastfmbot::plugins::lastfm"],
            LoggingSubsystem::Youtube => &["lastfmbot::helpers::youtube"],
            LoggingSubsystem::Store => &["lastfmbot::helpers::identity_store", "rusqlite"],
            LoggingSubsystem::Http => &["lastfmbot::helpers::http_client", "ureq", "rustls"],
            LoggingSubsystem::Parsers => &["lastfmbot::parsers", "lastfmbot::helpers::timeago"],
            LoggingSubsystem::Plugins => &["lastfmbot::plugins"],
            LoggingSubsystem::Dependencies => &["html5ever", "selectors", "serde"],
        }
    }
}

/// Logging configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Global log level (off, error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Target for log output (stdout, stderr). Replies go to stdout, so stderr is the default.
    #[serde(default = "default_target")]
    pub target: String,

    #[serde(default = "default_timestamps")]
    pub timestamps: bool,

    #[serde(default = "default_colors")]
    pub colors: bool,

    /// Subsystem-specific log levels; unknown names are used as module paths
    #[serde(default, deserialize_with = "deserialize_subsystems")]
    pub subsystems: HashMap<String, String>,

    #[serde(default)]
    pub include_module_path: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_target() -> String {
    "stderr".to_string()
}

fn default_timestamps() -> bool {
    true
}

fn default_colors() -> bool {
    true
}

/// Subsystem map without comment keys (keys starting with underscore)
fn deserialize_subsystems<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw_map = HashMap::<String, String>::deserialize(deserializer)?;
    Ok(raw_map.into_iter().filter(|(key, _)| !key.starts_with('_')).collect())
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            target: default_target(),
            timestamps: default_timestamps(),
            colors: default_colors(),
            subsystems: HashMap::new(),
            include_module_path: false,
        }
    }
}

impl LoggingConfig {
    /// Load logging configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read logging config file: {}", e))?;
        Self::from_json(&content)
    }

    /// Load logging configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Failed to parse logging config: {}", e))
    }

    fn parse_log_level(level: &str) -> LevelFilter {
        LevelFilter::from_str(level).unwrap_or_else(|_| {
            eprintln!("Warning: Unknown log level '{}', defaulting to 'info'", level);
            LevelFilter::Info
        })
    }

    /// Module filters from the subsystem map, most specific path last.
    ///
    /// When several subsystems cover the same module the most verbose level wins.
    fn module_filters(&self) -> Vec<(String, LevelFilter)> {
        self.resolve_subsystems().0
    }

    /// Module filters plus one message per module whose level had to be resolved.
    /// The messages are logged once the logger is installed.
    fn resolve_subsystems(&self) -> (Vec<(String, LevelFilter)>, Vec<String>) {
        let mut resolved: HashMap<String, LevelFilter> = HashMap::new();
        let mut conflicts = Vec::new();
        for (name, level) in &self.subsystems {
            let level = Self::parse_log_level(level);
            let paths: Vec<String> = match LoggingSubsystem::from_str(name) {
                Ok(subsystem) => subsystem.module_prefixes().iter().map(|p| p.to_string()).collect(),
                Err(_) => vec![name.clone()],
            };
            for path in paths {
                match resolved.get(&path).copied() {
                    Some(existing) if existing != level => {
                        conflicts.push(format!(
                            "Conflicting log levels for module '{}': {} and {}, using the more verbose",
                            path, existing, level
                        ));
                        resolved.insert(path, existing.max(level));
                    }
                    _ => {
                        resolved.insert(path, level);
                    }
                }
            }
        }

        let mut filters: Vec<(String, LevelFilter)> = resolved.into_iter().collect();
        filters.sort_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        conflicts.sort();
        (filters, conflicts)
    }

    /// Filter string in env_logger syntax, e.g. `warn,lastfmbot::parsers=debug`
    pub fn build_filter_string(&self) -> String {
        let mut parts = vec![self.level.to_lowercase()];
        for (path, level) in self.module_filters() {
            parts.push(format!("{}={}", path, level.to_string().to_lowercase()));
        }
        parts.join(",")
    }

    /// Initialize the global logger with this configuration
    pub fn initialize_logger(&self) -> Result<(), String> {
        let filter_string = self.build_filter_string();
        let (filters, conflicts) = self.resolve_subsystems();

        let mut builder = Builder::new();
        builder.filter(None, Self::parse_log_level(&self.level));
        for (path, level) in filters {
            builder.filter(Some(&path), level);
        }
        // RUST_LOG wins over the file
        builder.parse_env("RUST_LOG");

        builder.write_style(if self.colors { WriteStyle::Auto } else { WriteStyle::Never });

        match self.target.to_lowercase().as_str() {
            "stdout" => {
                builder.target(Target::Stdout);
            }
            "stderr" => {
                builder.target(Target::Stderr);
            }
            other => return Err(format!("Unknown logging target: {}", other)),
        }

        let timestamps = self.timestamps;
        let include_module_path = self.include_module_path;
        builder.format(move |buf, record| {
            if timestamps {
                write!(buf, "[{}] ", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))?;
            }
            write!(buf, "[{}] ", record.level())?;
            if include_module_path {
                if let Some(module) = record.module_path() {
                    write!(buf, "[{}] ", module)?;
                }
            }
            writeln!(buf, "{}", record.args())
        });

        builder.try_init().map_err(|e| format!("Failed to initialize logger: {}", e))?;

        for conflict in &conflicts {
            warn!("{}", conflict);
        }
        debug!("Logging initialized with filter: {}", filter_string);
        Ok(())
    }
}

/// Initialize logging from an optional config file and the `--debug`/`--verbose` flags.
///
/// `--verbose` raises the bot's own modules to debug, `--debug` raises everything.
pub fn initialize_logging_with_args(config_file: Option<&Path>, debug_mode: bool, verbose_mode: bool) -> Result<(), String> {
    let mut config = match config_file {
        Some(path) if path.exists() => LoggingConfig::from_file(path)?,
        Some(path) => return Err(format!("Logging config file {:?} not found", path)),
        None => LoggingConfig::default(),
    };

    if debug_mode {
        config.level = "debug".to_string();
    } else if verbose_mode {
        config.subsystems.insert(LoggingSubsystem::Main.to_string(), "debug".to_string());
    }

    config.initialize_logger()?;
    if debug_mode {
        info!("Debug mode enabled via command line");
    } else if verbose_mode {
        info!("Verbose mode enabled via command line");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_defaults() {
        let config = LoggingConfig::from_json("{}").unwrap();
        assert_eq!(config.level, "warn");
        assert_eq!(config.target, "stderr");
        assert!(config.timestamps);
        assert_eq!(config.build_filter_string(), "warn");
    }

    #[test]
    fn test_subsystem_names() {
        for subsystem in LoggingSubsystem::iter() {
            let name = subsystem.to_string();
            assert_eq!(LoggingSubsystem::from_str(&name).unwrap(), subsystem);
            assert!(!subsystem.module_prefixes().is_empty());
        }
        assert_eq!(LoggingSubsystem::from_str("Dependencies").unwrap(), LoggingSubsystem::Dependencies);
    }

    #[test]
    fn test_filter_string_with_subsystems() {
        let config = LoggingConfig::from_json(
            r#"{"level": "info", "subsystems": {"youtube": "debug", "_comment": "ignored", "custom::module": "trace"}}"#,
        )
        .unwrap();
        assert_eq!(config.subsystems.len(), 2);
        assert_eq!(
            config.build_filter_string(),
            "info,custom::module=trace,lastfmbot::helpers::youtube=debug"
        );
    }

    #[test]
    fn test_conflicts_use_most_verbose_level() {
        let config = LoggingConfig::from_json(r#"{"subsystems": {"plugins": "error", "lastfm": "debug"}}"#).unwrap();
        let filters = config.module_filters();
        assert!(filters.contains(&("lastfmbot::plugins".to_string(), LevelFilter::Error)));
        assert!(filters.contains(&("lastfmbot::plugins::lastfm".to_string(), LevelFilter::Debug)));

        let config = LoggingConfig::from_json(r#"{"subsystems": {"plugins": "error", "lastfmbot::plugins": "trace"}}"#).unwrap();
        assert_eq!(config.module_filters(), vec![("lastfmbot::plugins".to_string(), LevelFilter::Trace)]);
    }

    #[test]
    fn test_conflicts_are_reported() {
        let config = LoggingConfig::from_json(r#"{"subsystems": {"plugins": "error", "lastfmbot::plugins": "trace"}}"#).unwrap();
        let (filters, conflicts) = config.resolve_subsystems();
        assert_eq!(filters, vec![("lastfmbot::plugins".to_string(), LevelFilter::Trace)]);
        assert_eq!(conflicts.len(), 1);
        assert!(conflicts[0].contains("'lastfmbot::plugins'"));

        let config = LoggingConfig::from_json(r#"{"subsystems": {"parsers": "debug"}}"#).unwrap();
        assert!(config.resolve_subsystems().1.is_empty());
    }

    #[test]
    fn test_unknown_level_defaults_to_info() {
        assert_eq!(LoggingConfig::parse_log_level("loud"), LevelFilter::Info);
        assert_eq!(LoggingConfig::parse_log_level("DEBUG"), LevelFilter::Debug);
    }
}
