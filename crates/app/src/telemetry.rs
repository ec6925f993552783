//! Tracing setup for the binary.
//!
//! - `LOG_LEVEL` sets the filter, e.g. `debug` or `info,quiz=debug,progress=debug`.
//!   Unset, it is [`DEFAULT_FILTER`]: quiz and timer events at debug, the rest
//!   at info.
//! - `LOG_FORMAT=json` switches to structured JSON lines; anything else is the
//!   default human format.
//!
//! Logs go to stderr so they never interleave with the quiz prompts on stdout.

use tracing_subscriber::EnvFilter;

/// Directives keyed by the event targets used across the crates.
pub const DEFAULT_FILTER: &str = "info,quiz=debug,timer=debug";

pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn default_filter_parses_and_names_event_targets() {
        let filter = EnvFilter::try_new(DEFAULT_FILTER).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));

        let targets: Vec<_> = DEFAULT_FILTER
            .split(',')
            .filter_map(|d| d.split_once('='))
            .collect();
        assert_eq!(targets, [("quiz", "debug"), ("timer", "debug")]);
    }
}
