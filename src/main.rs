use clap::{Arg, ArgAction, Command};
use lastfmbot::config::BotConfig;
use lastfmbot::logging;
use lastfmbot::plugins::{ChatContext, LastfmPlugin, Message, Plugin};
use log::{debug, error, info};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Prints replies to stdout and errors to stderr
struct ConsoleContext;

impl ChatContext for ConsoleContext {
    fn reply(&mut self, text: &str) {
        println!("{}", text);
    }

    fn error(&mut self, text: &str) {
        eprintln!("Error: {}", text);
    }
}

fn cli() -> Command {
    Command::new("lastfmbot")
        .about("Answers Last.fm chat commands from the command line or stdin")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("log-config")
                .long("log-config")
                .value_name("FILE")
                .help("Logging configuration file path")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("nick")
                .short('n')
                .long("nick")
                .value_name("NICK")
                .help("Nick the commands are sent as")
                .default_value("console"),
        )
        .arg(
            Arg::new("channel")
                .long("channel")
                .value_name("CHANNEL")
                .help("Channel the commands are sent to"),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .help("Log everything at debug level")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log the bot's own modules at debug level")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("command")
                .help("Command to run once, e.g. `np czshadow`; reads commands from stdin when omitted")
                .num_args(0..)
                .trailing_var_arg(true),
        )
}

fn load_config(path: Option<&PathBuf>) -> BotConfig {
    match path {
        Some(path) => match BotConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("{}", e);
                eprintln!("Error: {}", e);
                eprintln!("Cannot continue without a valid configuration file.");
                std::process::exit(1);
            }
        },
        None => {
            info!("No configuration file specified, using defaults");
            let mut config = BotConfig::default();
            config.apply_env_overrides();
            config
        }
    }
}

/// One command per line until EOF, flushing identities on the configured interval
fn run_interactive(plugin: &mut LastfmPlugin, msg: &Message, ctx: &mut ConsoleContext) {
    let flush_interval = Duration::from_secs(plugin.config().flush_interval_secs);
    let mut last_flush = Instant::now();

    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to read from stdin: {}", e);
                break;
            }
        };
        if !line.trim().is_empty() {
            plugin.handle_line(ctx, msg, &line);
        }

        if last_flush.elapsed() >= flush_interval {
            debug!("Periodic identity flush");
            plugin.flush();
            last_flush = Instant::now();
        }
    }
    debug!("End of input");
}

fn main() {
    let matches = cli().get_matches();

    let log_config = matches.get_one::<PathBuf>("log-config");
    if let Err(e) = logging::initialize_logging_with_args(
        log_config.map(PathBuf::as_path),
        matches.get_flag("debug"),
        matches.get_flag("verbose"),
    ) {
        eprintln!("Error: Failed to initialize logging configuration: {}", e);
        std::process::exit(1);
    }

    info!("lastfmbot {} starting", env!("CARGO_PKG_VERSION"));
    let config = load_config(matches.get_one::<PathBuf>("config"));

    let mut plugin = match LastfmPlugin::from_config(config) {
        Ok(plugin) => plugin,
        Err(e) => {
            error!("Failed to start Last.fm plugin: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    if !plugin.init() {
        eprintln!("Error: Last.fm plugin failed to initialize");
        std::process::exit(1);
    }

    let nick = matches.get_one::<String>("nick").map(String::as_str).unwrap_or("console");
    let channel = matches.get_one::<String>("channel").map(String::as_str);
    let msg = Message::new(nick, channel);
    let mut ctx = ConsoleContext;

    let command: Vec<&str> = matches
        .get_many::<String>("command")
        .map(|words| words.map(String::as_str).collect())
        .unwrap_or_default();

    if command.is_empty() {
        run_interactive(&mut plugin, &msg, &mut ctx);
    } else {
        plugin.handle_line(&mut ctx, &msg, &command.join(" "));
    }

    if !plugin.shutdown() {
        std::process::exit(1);
    }
}
