//! Command-line and environment configuration
//!
//! Every option can come from a flag or from an `ACT_*` variable; a `.env`
//! file in the working directory is read before parsing.

use crate::logging::LogFormat;
use clap::{value_parser, Arg, ArgMatches, Command};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address
    pub bind: SocketAddr,
    /// TOML file with the spreadsheet id and service-account key
    pub secrets: PathBuf,
    /// Act template
    pub template: PathBuf,
    /// Reference snapshot time-to-live
    pub cache_ttl: Duration,
    /// Idle time after which a session is dropped
    pub session_idle: Duration,
    /// Log output format
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8501)),
            secrets: PathBuf::from("secrets.toml"),
            template: PathBuf::from("template.docx"),
            cache_ttl: act_sheets::DEFAULT_TTL,
            session_idle: Duration::from_secs(30 * 60),
            log_format: LogFormat::Text,
        }
    }
}

/// Command-line definition
#[must_use]
pub fn command() -> Command {
    Command::new("act-server")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Non-conformity act generator")
        .arg(
            Arg::new("bind")
                .long("bind")
                .env("ACT_BIND")
                .default_value("0.0.0.0:8501")
                .value_parser(value_parser!(SocketAddr))
                .help("Listen address"),
        )
        .arg(
            Arg::new("secrets")
                .long("secrets")
                .env("ACT_SECRETS")
                .default_value("secrets.toml")
                .value_parser(value_parser!(PathBuf))
                .help("Secrets file with spreadsheet_id and [gcp_service_account]"),
        )
        .arg(
            Arg::new("template")
                .long("template")
                .env("ACT_TEMPLATE")
                .default_value("template.docx")
                .value_parser(value_parser!(PathBuf))
                .help("DOCX template of the act"),
        )
        .arg(
            Arg::new("cache-ttl")
                .long("cache-ttl")
                .env("ACT_CACHE_TTL_SECS")
                .default_value("60")
                .value_parser(value_parser!(u64).range(1..))
                .help("Seconds a reference snapshot stays fresh"),
        )
        .arg(
            Arg::new("session-idle")
                .long("session-idle")
                .env("ACT_SESSION_IDLE_SECS")
                .default_value("1800")
                .value_parser(value_parser!(u64).range(1..))
                .help("Seconds of inactivity before a session is dropped"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .env("ACT_LOG_FORMAT")
                .default_value("text")
                .value_parser(["text", "json"])
                .help("Log output format"),
        )
}

impl ServerConfig {
    /// Read configuration from parsed arguments
    #[must_use]
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let defaults = Self::default();
        let secs = |name: &str, fallback: Duration| {
            matches
                .get_one::<u64>(name)
                .map_or(fallback, |s| Duration::from_secs(*s))
        };
        Self {
            bind: matches
                .get_one::<SocketAddr>("bind")
                .copied()
                .unwrap_or(defaults.bind),
            secrets: matches
                .get_one::<PathBuf>("secrets")
                .cloned()
                .unwrap_or(defaults.secrets),
            template: matches
                .get_one::<PathBuf>("template")
                .cloned()
                .unwrap_or(defaults.template),
            cache_ttl: secs("cache-ttl", defaults.cache_ttl),
            session_idle: secs("session-idle", defaults.session_idle),
            log_format: matches
                .get_one::<String>("log-format")
                .map_or(defaults.log_format, |f| LogFormat::parse(f)),
        }
    }

    /// Parse process arguments and environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_matches(&command().get_matches())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn command_is_well_formed() {
        command().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let matches = command()
            .try_get_matches_from([
                "act-server",
                "--bind",
                "127.0.0.1:9000",
                "--template",
                "act.docx",
                "--cache-ttl",
                "5",
                "--log-format",
                "json",
            ])
            .unwrap();
        let config = ServerConfig::from_matches(&matches);
        assert_eq!(config.bind, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.template, PathBuf::from("act.docx"));
        assert_eq!(config.cache_ttl, Duration::from_secs(5));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.secrets, PathBuf::from("secrets.toml"));
    }

    #[test]
    fn zero_ttl_is_rejected() {
        assert!(command()
            .try_get_matches_from(["act-server", "--cache-ttl", "0"])
            .is_err());
    }
}
