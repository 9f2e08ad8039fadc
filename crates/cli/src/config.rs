//! Configuration loading.
//!
//! Values come from a TOML file (optional) and are overridden by command-line
//! flags or their environment variables. The merged result is validated once
//! at startup; the server never starts with an incomplete configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use pipeline::{KeywordRule, RuleSet};
use serde::Deserialize;
use thiserror::Error;

/// Address used when none is configured.
pub const DEFAULT_ADDRESS: &str = ":6789";

const DEFAULT_CONFIG_PATH: &str = "issuewarden.toml";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Command-line arguments. Every flag can also be set through its env var.
#[derive(Debug, Default, Parser)]
#[command(name = "issuewarden", version, about = "GitHub issue triage bot")]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, short, env = "ISSUEWARDEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Repository owner.
    #[arg(long, env = "ISSUEWARDEN_OWNER")]
    pub owner: Option<String>,

    /// Repository name.
    #[arg(long, env = "ISSUEWARDEN_REPO")]
    pub repo: Option<String>,

    /// GitHub access token.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Listen address, e.g. `:6789` or `127.0.0.1:8080`.
    #[arg(long, env = "ISSUEWARDEN_HTTP_LISTEN")]
    pub http_listen: Option<String>,

    /// GitHub API root.
    #[arg(long, env = "ISSUEWARDEN_API_BASE")]
    pub api_base: Option<String>,

    /// Secret used to verify `X-Hub-Signature-256`.
    #[arg(long, env = "ISSUEWARDEN_WEBHOOK_SECRET", hide_env_values = true)]
    pub webhook_secret: Option<String>,

    /// Log output format.
    #[arg(long, env = "ISSUEWARDEN_LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,

    /// OTLP collector endpoint; span export is disabled when unset.
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

/// Contents of the TOML configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub access_token: Option<String>,
    pub http_listen: Option<String>,
    pub api_base: Option<String>,
    pub webhook_secret: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub body_limit_bytes: Option<usize>,
    pub log_format: Option<LogFormat>,
    pub otlp_endpoint: Option<String>,
    /// Set to `false` to drop the built-in keyword rules.
    pub builtin_rules: Option<bool>,
    /// Extra keyword rules, evaluated after the built-in ones.
    pub rules: Vec<KeywordRule>,
}

/// Configuration errors, all fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Missing required setting `{0}`")]
    Missing(&'static str),

    #[error("Invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub owner: String,
    pub repo: String,
    pub access_token: String,
    pub http_listen: String,
    pub api_base: String,
    pub webhook_secret: Option<String>,
    pub request_timeout: Duration,
    pub body_limit: usize,
    pub log_format: LogFormat,
    pub otlp_endpoint: Option<String>,
    pub builtin_rules: bool,
    pub rules: Vec<KeywordRule>,
}

impl Config {
    /// Loads the file named by `cli` (or the default path) and applies overrides.
    ///
    /// A missing default file is not an error; a missing explicit file is.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => read_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                read_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => FileConfig::default(),
        };
        Self::resolve(file, cli)
    }

    /// Merges `file` with the overrides in `cli` and validates the result.
    pub fn resolve(file: FileConfig, cli: &Cli) -> Result<Self, ConfigError> {
        let pick = |flag: &Option<String>, value: Option<String>| {
            flag.clone().or(value).filter(|v| !v.trim().is_empty())
        };

        let owner = pick(&cli.owner, file.owner).ok_or(ConfigError::Missing("owner"))?;
        let repo = pick(&cli.repo, file.repo).ok_or(ConfigError::Missing("repo"))?;
        let access_token =
            pick(&cli.access_token, file.access_token).ok_or(ConfigError::Missing("access_token"))?;
        let http_listen = normalise_address(
            &pick(&cli.http_listen, file.http_listen).unwrap_or_else(|| DEFAULT_ADDRESS.to_owned()),
        );
        let api_base = pick(&cli.api_base, file.api_base)
            .unwrap_or_else(|| github::DEFAULT_API_BASE.to_owned());
        if !api_base.starts_with("http://") && !api_base.starts_with("https://") {
            return Err(ConfigError::Invalid {
                field: "api_base",
                reason: format!("`{api_base}` is not an http(s) URL"),
            });
        }

        let timeout_secs = file.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "request_timeout_secs",
                reason: "must be greater than zero".to_owned(),
            });
        }
        let body_limit = file.body_limit_bytes.unwrap_or(listener::DEFAULT_BODY_LIMIT);
        if body_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "body_limit_bytes",
                reason: "must be greater than zero".to_owned(),
            });
        }

        Ok(Self {
            owner,
            repo,
            access_token,
            http_listen,
            api_base,
            webhook_secret: pick(&cli.webhook_secret, file.webhook_secret),
            request_timeout: Duration::from_secs(timeout_secs),
            body_limit,
            log_format: cli.log_format.or(file.log_format).unwrap_or_default(),
            otlp_endpoint: pick(&cli.otlp_endpoint, file.otlp_endpoint),
            builtin_rules: file.builtin_rules.unwrap_or(true),
            rules: file.rules,
        })
    }

    /// Builds the rule registry: built-in rules first, then configured ones.
    pub fn rule_set(&self) -> RuleSet {
        let base = if self.builtin_rules {
            RuleSet::default_rules()
        } else {
            RuleSet::new()
        };
        self.rules
            .iter()
            .cloned()
            .fold(base, |set, rule| set.with_rule(rule))
    }
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_owned(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_owned(),
        source,
    })
}

/// Turns a port-only address such as `:6789` into a bindable `0.0.0.0:6789`.
pub fn normalise_address(address: &str) -> String {
    if address.starts_with(':') {
        format!("0.0.0.0{address}")
    } else {
        address.to_owned()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
