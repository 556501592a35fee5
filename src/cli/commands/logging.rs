use clap::{builder::ValueParser, Arg, ArgAction, Command};

pub const ARG_VERBOSITY: &str = "verbosity";

/// Level names accepted from `STUDYMATE_LOG_LEVEL`, quietest first.
const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// `-v` count, or a level name or number from the environment.
#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Repeat to raise verbosity: -v WARN, -vv INFO, -vvv DEBUG, -vvvv TRACE")
            .env("STUDYMATE_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(ValueParser::from(|level: &str| level_count(level))),
    )
}

fn level_count(level: &str) -> Result<u8, String> {
    let level = level.trim().to_lowercase();
    if let Some(count) = LEVELS.iter().position(|name| *name == level) {
        return u8::try_from(count).map_err(|err| err.to_string());
    }
    level
        .parse::<u8>()
        .ok()
        .filter(|count| *count <= 5)
        .ok_or_else(|| format!("invalid log level: {level}"))
}
