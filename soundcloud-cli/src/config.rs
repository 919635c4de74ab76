//! Layered CLI configuration: defaults, then `<home>/config.toml`, then
//! `SOUNDCLOUD_*` environment variables.

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use soundcloud_api::DEFAULT_API_ENDPOINT;
use soundcloud_auth::RedirectMatching;
use thiserror::Error;

pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8976/callback";

pub const ENV_HOME: &str = "SOUNDCLOUD_HOME";
pub const ENV_CLIENT_ID: &str = "SOUNDCLOUD_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "SOUNDCLOUD_CLIENT_SECRET";
pub const ENV_REDIRECT_URI: &str = "SOUNDCLOUD_REDIRECT_URI";
pub const ENV_API_BASE_URL: &str = "SOUNDCLOUD_API_BASE_URL";
pub const ENV_REQUIRE_NETWORK: &str = "SOUNDCLOUD_REQUIRE_NETWORK";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config.toml: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{0} is not configured; set it in config.toml or the environment")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("could not determine home directory")]
    NoHome,
}

/// On-disk shape of `config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigToml {
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: Option<String>,
    api_base_url: Option<String>,
    require_network: Option<bool>,
    redirect_matching: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub home: PathBuf,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub api_base_url: String,
    pub require_network: bool,
    pub redirect_matching: RedirectMatching,
}

impl Config {
    /// Loads from `home` with overrides from the process environment.
    pub fn load(home: PathBuf) -> Result<Self, ConfigError> {
        Self::load_with_env(home, |key| std::env::var(key).ok())
    }

    pub fn load_with_env<F>(home: PathBuf, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = read_config_toml(&home.join(CONFIG_FILE))?;

        let require_network = match env(ENV_REQUIRE_NETWORK) {
            Some(raw) => parse_bool(ENV_REQUIRE_NETWORK, &raw)?,
            None => file.require_network.unwrap_or(false),
        };
        let redirect_matching = match file.redirect_matching.as_deref() {
            None | Some("contains") => RedirectMatching::Contains,
            Some("exact") => RedirectMatching::Exact,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "redirect_matching",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            home,
            client_id: env(ENV_CLIENT_ID).or(file.client_id),
            client_secret: env(ENV_CLIENT_SECRET).or(file.client_secret),
            redirect_uri: env(ENV_REDIRECT_URI)
                .or(file.redirect_uri)
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
            api_base_url: env(ENV_API_BASE_URL)
                .or(file.api_base_url)
                .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string()),
            require_network,
            redirect_matching,
        })
    }

    pub fn client_id(&self) -> Result<&str, ConfigError> {
        self.client_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(ConfigError::Missing("client_id"))
    }

    pub fn client_secret(&self) -> Result<&str, ConfigError> {
        self.client_secret
            .as_deref()
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("client_secret"))
    }
}

fn read_config_toml(path: &Path) -> Result<ConfigToml, ConfigError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(ConfigToml::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        }),
    }
}

/// Resolves the CLI home: `explicit`, else `$SOUNDCLOUD_HOME`, else
/// `~/.soundcloud`.
pub fn find_home(explicit: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    if let Ok(home) = std::env::var(ENV_HOME) {
        if !home.is_empty() {
            return Ok(PathBuf::from(home));
        }
    }
    dirs::home_dir()
        .map(|home| home.join(".soundcloud"))
        .ok_or(ConfigError::NoHome)
}
