//! Configuration management for the watcher
//!
//! Settings are merged from three layers, highest precedence first:
//! command-line flags, environment variables (both handled by clap), and an
//! optional TOML file. The merged result is validated once at startup.

use crate::cli::CliArgs;
use crate::models::{Result, WatchError};
use crate::monitor::RemediationSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// On-disk TOML layout
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub zabbix: ZabbixSettings,
    #[serde(default)]
    pub media: MediaSettings,
    #[serde(default)]
    pub notify: NotifySettings,
    #[serde(default)]
    pub state: StateSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZabbixSettings {
    pub api_url: Option<String>,
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MediaSettings {
    pub check_interval: Option<DurationSetting>,
    pub off_duration: Option<DurationSetting>,
    pub names: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotifySettings {
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateSettings {
    pub dir: Option<PathBuf>,
}

/// A duration written either as whole minutes or as a humantime string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DurationSetting {
    Minutes(u64),
    Text(String),
}

impl ConfigFile {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            WatchError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
            .map_err(|e| WatchError::Configuration(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Validated watcher configuration
#[derive(Debug, Clone)]
pub struct WatcherConfiguration {
    /// Frontend base URL without trailing slash
    pub api_url: String,
    pub api_token: String,
    /// Pause between the end of one cycle and the start of the next
    pub check_interval: Duration,
    /// How long a channel may stay disabled before it is re-enabled
    pub off_duration: Duration,
    /// Channel names to watch; empty watches all
    pub media_names: Vec<String>,
    pub webhook_url: Option<String>,
    pub state_dir: PathBuf,
    /// Run a single cycle and exit
    pub run_once: bool,
}

impl WatcherConfiguration {
    /// Merge command-line/environment settings with the optional config file
    pub fn resolve(args: CliArgs) -> Result<Self> {
        let file = match &args.config_path {
            Some(path) => ConfigFile::load_from_file(path)?,
            None => ConfigFile::default(),
        };
        Self::from_sources(args, file)
    }

    pub fn from_sources(args: CliArgs, file: ConfigFile) -> Result<Self> {
        let api_url = args
            .api_url
            .or(file.zabbix.api_url)
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| missing("API URL", "--api-url", "ZABBIX_API_URL"))?;
        validate_url("API URL", &api_url)?;

        let check_interval = match args.check_interval {
            Some(raw) => parse_duration("check interval", &raw)?,
            None => file
                .media
                .check_interval
                .map(|value| value.to_duration("check interval"))
                .transpose()?
                .ok_or_else(|| missing("check interval", "--check-interval", "MEDIA_CHECK_INTERVAL"))?,
        };
        if check_interval.is_zero() {
            return Err(WatchError::Configuration(
                "check interval must be greater than zero".to_string(),
            ));
        }

        let off_duration = match args.off_duration {
            Some(raw) => parse_duration("off duration", &raw)?,
            None => file
                .media
                .off_duration
                .map(|value| value.to_duration("off duration"))
                .transpose()?
                .ok_or_else(|| missing("off duration", "--off-duration", "MEDIA_OFF_DURATION"))?,
        };

        let media_names = args
            .media_names
            .or(file.media.names)
            .unwrap_or_default()
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        let webhook_url = args
            .webhook_url
            .or(file.notify.webhook_url)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        if let Some(url) = &webhook_url {
            validate_url("webhook URL", url)?;
        }

        Ok(Self {
            api_url,
            api_token: args.api_token.or(file.zabbix.api_token).unwrap_or_default(),
            check_interval,
            off_duration,
            media_names,
            webhook_url,
            state_dir: args
                .state_dir
                .or(file.state.dir)
                .unwrap_or_else(|| PathBuf::from(".")),
            run_once: args.once,
        })
    }

    pub fn remediation_settings(&self) -> RemediationSettings {
        RemediationSettings {
            off_duration: self.off_duration,
            media_names: self.media_names.clone(),
        }
    }

    /// Settings summary safe for logs: no token, webhook reported as used/unused
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "api_url": self.api_url,
            "check_interval": humantime::format_duration(self.check_interval).to_string(),
            "off_duration": humantime::format_duration(self.off_duration).to_string(),
            "media_names": self.media_names,
            "webhook_used": self.webhook_url.is_some(),
            "state_dir": self.state_dir.display().to_string(),
        })
    }
}

impl DurationSetting {
    fn to_duration(&self, name: &str) -> Result<Duration> {
        match self {
            DurationSetting::Minutes(minutes) => from_minutes(name, *minutes),
            DurationSetting::Text(text) => parse_duration(name, text),
        }
    }
}

/// Parse a duration: a bare integer is minutes, anything else goes through
/// humantime ("90s", "1h 30m").
pub fn parse_duration(name: &str, raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    if let Ok(minutes) = raw.parse::<u64>() {
        return from_minutes(name, minutes);
    }
    humantime::parse_duration(raw)
        .map_err(|e| WatchError::Configuration(format!("invalid {} '{}': {}", name, raw, e)))
}

fn from_minutes(name: &str, minutes: u64) -> Result<Duration> {
    minutes
        .checked_mul(60)
        .map(Duration::from_secs)
        .ok_or_else(|| {
            WatchError::Configuration(format!("invalid {} '{}': duration too large", name, minutes))
        })
}

fn validate_url(name: &str, url: &str) -> Result<()> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| WatchError::Configuration(format!("invalid {} '{}': {}", name, url, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(WatchError::Configuration(format!(
            "invalid {} '{}': unsupported scheme '{}'",
            name, url, other
        ))),
    }
}

fn missing(name: &str, flag: &str, env: &str) -> WatchError {
    WatchError::Configuration(format!("{} is required (set {} or {})", name, flag, env))
}
