//! Command-line and environment configuration.
//!
//! Every setting can be given as a flag; the deployment-specific ones also
//! fall back to environment variables, which the binary may load from a
//! `.env` file first.

use crate::lifecycle::adapters::DEFAULT_QUERY_TYPE;
use crate::lifecycle::domain::{AutoStopPolicy, LifecycleDomainError, ServerEndpoint};
use crate::lifecycle::services::MonitorSettings;
use crate::observability::LogFormat;
use camino::Utf8PathBuf;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while validating configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required value is blank.
    #[error("{0} must not be empty")]
    Missing(&'static str),

    /// A timer duration is zero.
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    /// Thresholds or the endpoint are inconsistent.
    #[error(transparent)]
    Invalid(#[from] LifecycleDomainError),
}

/// Keeps a dedicated game server running only while someone plays on it.
#[derive(Parser, Debug, Clone)]
#[command(name = "warden", version, about)]
pub struct Cli {
    /// Bot token used to post and edit channel messages.
    #[arg(long, env = "DISCORD_BOT_TOKEN", hide_env_values = true)]
    pub discord_token: String,

    /// Channel that receives status messages and announcements.
    #[arg(long, env = "CHANNEL_ID")]
    pub channel_id: String,

    /// Address players connect to and probes target.
    #[arg(long, env = "SERVER_IP", default_value = "127.0.0.1")]
    pub server_ip: String,

    /// Game port players connect to and probes target.
    #[arg(long, env = "SERVER_PORT", default_value = "26900")]
    pub server_port: String,

    /// Join password shown in the startup message.
    #[arg(long, env = "SERVER_PASSWORD", hide_env_values = true)]
    pub server_password: Option<String>,

    /// File persisting the status and startup message identifiers.
    #[arg(long, env = "WARDEN_HANDLES_FILE", default_value = "message_ids.json")]
    pub handles_file: Utf8PathBuf,

    /// Control script invoked as `<script> start` and `<script> stop`.
    #[arg(long, env = "WARDEN_SUPERVISOR", default_value = "./sdtdserver")]
    pub supervisor: PathBuf,

    /// Status query tool.
    #[arg(long, env = "WARDEN_QUERY_COMMAND", default_value = "gamedig")]
    pub query_command: PathBuf,

    /// Query protocol passed to the status tool.
    #[arg(long, env = "WARDEN_QUERY_TYPE", default_value = DEFAULT_QUERY_TYPE)]
    pub query_type: String,

    /// Upper bound on one status query.
    #[arg(long, env = "WARDEN_QUERY_TIMEOUT", default_value = "10s", value_parser = humantime::parse_duration)]
    pub query_timeout: Duration,

    /// Interval between main status checks.
    #[arg(long, default_value = "10s", value_parser = humantime::parse_duration)]
    pub check_interval: Duration,

    /// Interval between join countdown updates.
    #[arg(long, default_value = "3s", value_parser = humantime::parse_duration)]
    pub wait_player_interval: Duration,

    /// How long players get to join after a start.
    #[arg(long, default_value = "300s", value_parser = humantime::parse_duration)]
    pub player_wait: Duration,

    /// How long a start may take before it is abandoned.
    #[arg(long, default_value = "5m", value_parser = humantime::parse_duration)]
    pub start_timeout: Duration,

    /// Probe interval while a start is coming up.
    #[arg(long, default_value = "5s", value_parser = humantime::parse_duration)]
    pub start_poll_interval: Duration,

    /// Auto-stop suspension after adopting a running server; `0s` disables it.
    #[arg(long, default_value = "5m", value_parser = humantime::parse_duration)]
    pub startup_grace_period: Duration,

    /// Consecutive empty checks that trigger an automatic stop.
    #[arg(long, default_value_t = 7)]
    pub max_empty_checks: u32,

    /// Empty check on which the stop warning is posted.
    #[arg(long, default_value_t = 5)]
    pub warning_check: u32,

    /// Accept starts by signal only, without registering `/start`.
    #[arg(long, env = "WARDEN_DISABLE_SLASH_COMMANDS")]
    pub disable_slash_commands: bool,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Human)]
    pub log_format: LogFormat,
}

impl Cli {
    /// Validates the monitor-related settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a timer is zero or the thresholds or
    /// endpoint are invalid.
    pub fn monitor_settings(&self) -> Result<MonitorSettings, ConfigError> {
        let policy = AutoStopPolicy::new(
            self.max_empty_checks,
            self.warning_check,
            self.check_interval,
            self.player_wait,
            self.startup_grace_period,
        )?;
        let mut endpoint = ServerEndpoint::new(&self.server_ip, &self.server_port)?;
        if let Some(password) = &self.server_password {
            endpoint = endpoint.with_password(password.as_str());
        }

        let settings = MonitorSettings::new(policy, endpoint)
            .with_query_timeout(self.query_timeout)
            .with_wait_player_interval(self.wait_player_interval)
            .with_start_timeout(self.start_timeout)
            .with_start_poll_interval(self.start_poll_interval);
        if let Some(timer) = settings.zero_timer() {
            return Err(ConfigError::ZeroDuration(timer));
        }
        Ok(settings)
    }

    /// Returns the notification channel credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when the token or channel is blank.
    pub fn channel_credentials(&self) -> Result<(&str, &str), ConfigError> {
        let token = self.discord_token.trim();
        if token.is_empty() {
            return Err(ConfigError::Missing("discord token"));
        }
        let channel = self.channel_id.trim();
        if channel.is_empty() {
            return Err(ConfigError::Missing("channel id"));
        }
        Ok((token, channel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(extra: &[&str]) -> Cli {
        let mut args = vec!["warden", "--discord-token", "token", "--channel-id", "42"];
        args.extend_from_slice(extra);
        Cli::try_parse_from(args).expect("arguments should parse")
    }

    #[test]
    fn defaults_match_documented_values() {
        let settings = parse(&[]).monitor_settings().expect("defaults should be valid");

        assert_eq!(settings.policy(), &AutoStopPolicy::default());
        assert_eq!(settings.query_timeout(), Duration::from_secs(10));
        assert_eq!(settings.wait_player_interval(), Duration::from_secs(3));
        assert_eq!(settings.start_timeout(), Duration::from_secs(300));
        assert_eq!(settings.start_poll_interval(), Duration::from_secs(5));
    }

    #[test]
    fn durations_accept_humantime_syntax() {
        let cli = parse(&["--check-interval", "1m 30s", "--startup-grace-period", "0s"]);

        let settings = cli.monitor_settings().expect("settings should be valid");

        assert_eq!(settings.policy().check_interval(), Duration::from_secs(90));
        assert!(settings.policy().grace_period().is_zero());
    }

    #[test]
    fn password_flows_into_endpoint() {
        let cli = parse(&["--server-ip", "203.0.113.7", "--server-password", "hunter2"]);

        let settings = cli.monitor_settings().expect("settings should be valid");

        assert_eq!(settings.endpoint().host(), "203.0.113.7");
        assert_eq!(settings.endpoint().password(), Some("hunter2"));
    }

    #[rstest]
    #[case(&["--warning-check", "7"])]
    #[case(&["--warning-check", "0"])]
    #[case(&["--max-empty-checks", "0"])]
    #[case(&["--check-interval", "0s"])]
    #[case(&["--start-timeout", "0s"])]
    #[case(&["--server-port", " "])]
    fn inconsistent_settings_are_rejected(#[case] extra: &[&str]) {
        let result = parse(extra).monitor_settings();

        assert!(result.is_err());
    }

    #[test]
    fn slash_commands_are_on_by_default() {
        assert!(!parse(&[]).disable_slash_commands);
        assert!(parse(&["--disable-slash-commands"]).disable_slash_commands);
    }

    #[test]
    fn zero_timer_is_named() {
        let result = parse(&["--wait-player-interval", "0s"]).monitor_settings();

        assert_eq!(
            result.err(),
            Some(ConfigError::ZeroDuration("wait player interval"))
        );
    }

    #[test]
    fn blank_token_is_rejected() {
        let cli = Cli::try_parse_from(["warden", "--discord-token", " ", "--channel-id", "42"])
            .expect("arguments should parse");

        assert_eq!(
            cli.channel_credentials(),
            Err(ConfigError::Missing("discord token"))
        );
    }

    #[test]
    fn malformed_duration_fails_to_parse() {
        let result = Cli::try_parse_from([
            "warden",
            "--discord-token",
            "token",
            "--channel-id",
            "42",
            "--player-wait",
            "soon",
        ]);

        assert!(result.is_err());
    }
}
