//! CLI argument parsing module
//!
//! Every setting can come from a flag or from the environment variable the
//! watcher has always been deployed with. Values are collected raw here and
//! validated by `daemon::config`.

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

/// Raw settings as given on the command line or in the environment
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub api_url: Option<String>,
    pub api_token: Option<String>,
    pub check_interval: Option<String>,
    pub off_duration: Option<String>,
    pub media_names: Option<Vec<String>>,
    pub webhook_url: Option<String>,
    pub state_dir: Option<PathBuf>,
    pub once: bool,
}

pub fn build_command() -> Command {
    Command::new("zbxwatch")
        .version(env!("ZBXWATCH_VERSION"))
        .long_version(concat!(env!("ZBXWATCH_VERSION"), " (", env!("GIT_HASH"), ")"))
        .about("Re-enable disabled Zabbix media types and report user group changes")
        .long_about(
            "Polls a Zabbix server, re-enables media types that stay disabled longer than \
             the configured threshold, and reports user group changes to a webhook.",
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .env("ZBXWATCH_CONFIG")
                .help("TOML configuration file")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .value_name("URL")
                .env("ZABBIX_API_URL")
                .help("Zabbix frontend base URL"),
        )
        .arg(
            Arg::new("api-token")
                .long("api-token")
                .value_name("TOKEN")
                .env("ZABBIX_API_TOKEN")
                .hide_env_values(true)
                .help("Zabbix API token"),
        )
        .arg(
            Arg::new("check-interval")
                .long("check-interval")
                .value_name("DURATION")
                .env("MEDIA_CHECK_INTERVAL")
                .help("Pause between checks (minutes, or e.g. \"90s\", \"1h 30m\")"),
        )
        .arg(
            Arg::new("off-duration")
                .long("off-duration")
                .value_name("DURATION")
                .env("MEDIA_OFF_DURATION")
                .help("How long a media type may stay disabled before it is re-enabled"),
        )
        .arg(
            Arg::new("media-names")
                .long("media-names")
                .value_name("NAMES")
                .env("MEDIA_NAMES")
                .value_delimiter(',')
                .action(ArgAction::Append)
                .help("Comma-separated media type names to watch (default: all)"),
        )
        .arg(
            Arg::new("webhook-url")
                .long("webhook-url")
                .value_name("URL")
                .env("MM_WEBHOOK_URL")
                .help("Incoming webhook for alerts; alerts are only logged when unset"),
        )
        .arg(
            Arg::new("state-dir")
                .long("state-dir")
                .value_name("DIR")
                .env("ZBXWATCH_STATE_DIR")
                .help("Directory holding the state files")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("once")
                .long("once")
                .help("Run a single check cycle and exit")
                .action(ArgAction::SetTrue),
        )
}

/// Parse the process arguments
pub fn parse_args() -> CliArgs {
    args_from_matches(&build_command().get_matches())
}

pub fn args_from_matches(matches: &ArgMatches) -> CliArgs {
    let string = |id: &str| matches.get_one::<String>(id).cloned();

    CliArgs {
        config_path: matches.get_one::<PathBuf>("config").cloned(),
        api_url: string("api-url"),
        api_token: string("api-token"),
        check_interval: string("check-interval"),
        off_duration: string("off-duration"),
        media_names: matches
            .get_many::<String>("media-names")
            .map(|values| values.cloned().collect()),
        webhook_url: string("webhook-url"),
        state_dir: matches.get_one::<PathBuf>("state-dir").cloned(),
        once: matches.get_flag("once"),
    }
}
