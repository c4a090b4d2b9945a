//! Logging initialisation.
//!
//! Structured logs go to stderr through `tracing`, either human-readable or
//! as newline-delimited JSON. `WARDEN_LOG_LEVEL` overrides the verbosity
//! chosen on the command line and accepts any `EnvFilter` directive.

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the log filter.
pub const LOG_LEVEL_ENV: &str = "WARDEN_LOG_LEVEL";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Human,
    /// Newline-delimited JSON.
    Json,
}

/// Maps `-v` repetitions to a tracing directive.
#[must_use]
pub const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber.
///
/// Returns `false` when a subscriber was already installed, which makes
/// repeated calls harmless.
pub fn init_logging(format: LogFormat, verbosity: u8) -> bool {
    let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .unwrap_or_else(|_| EnvFilter::new(verbosity_to_directive(verbosity)));
    let show_target = verbosity >= 2;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(show_target)
        .with_writer(std::io::stderr);
    let installed = match format {
        LogFormat::Human => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "warn")]
    #[case(1, "info")]
    #[case(2, "debug")]
    #[case(3, "trace")]
    #[case(u8::MAX, "trace")]
    fn verbosity_maps_to_directive(#[case] verbosity: u8, #[case] expected: &str) {
        assert_eq!(verbosity_to_directive(verbosity), expected);
    }

    #[test]
    fn repeated_initialisation_is_harmless() {
        init_logging(LogFormat::Human, 0);

        assert!(!init_logging(LogFormat::Json, 3));
    }
}
