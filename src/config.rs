use serde::{Deserialize, Serialize};
use std::env::VarError;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::providers::anthropic::DEFAULT_API_BASE;
use crate::providers::{ModelConfig, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TIMEOUT};
use crate::warn;

pub(crate) const API_KEY_ENV_VAR: &str = "ANTHROPIC_API_KEY";
pub(crate) const API_BASE_ENV_VAR: &str = "ANTHROPIC_BASE_URL";

#[derive(thiserror::Error, Debug)]
pub(crate) enum Error {
    #[error("failed to read config \"{}\": {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config \"{}\": {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no API key found, either add it to the config or define {}", API_KEY_ENV_VAR)]
    MissingApiKey,

    #[error("failed to parse {0}, it is not valid unicode")]
    MalformedEnvVar(&'static str),
}

#[derive(Deserialize, Serialize, Default, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Keybindings {
    #[default]
    Emacs,
    Vi,
}

#[derive(Deserialize, Serialize, Default, Debug)]
pub(crate) struct Anthropic {
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
}

#[derive(Deserialize, Serialize, Default, Debug)]
pub(crate) struct Config {
    #[serde(default)]
    pub keybindings: Keybindings,
    #[serde(default)]
    pub anthropic: Anthropic,
}

/// Command-line values which take precedence over the config file
#[derive(Default)]
pub(crate) struct Overrides {
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
}

fn get_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME");

    if let Some(home) = home {
        let home = PathBuf::from(home);

        const USER_PATHS: [&str; 2] = [
            ".config/compliance-advisor/config.toml",
            ".compliance-advisor.toml",
        ];

        for &path in USER_PATHS.iter() {
            let fullpath = home.join(path);

            if fullpath.exists() {
                return Some(fullpath);
            }
        }
    }

    let system_config = PathBuf::from("/etc/compliance-advisor.toml");

    if system_config.exists() {
        Some(system_config)
    } else {
        None
    }
}

fn extra_fields_helper<'a>(
    path: &mut Vec<&'a str>,
    user_config: &'a toml::Table,
    config: &'a toml::Table,
    extra: &mut Vec<String>,
) {
    for (user_key, user_value) in user_config {
        path.push(user_key);

        match (user_value, config.get(user_key)) {
            (toml::Value::Table(user_value), Some(toml::Value::Table(config_value))) => {
                extra_fields_helper(path, user_value, config_value, extra)
            }
            (_, Some(_)) => {}
            (_, None) => extra.push(path.join(".")),
        }

        path.pop();
    }
}

/// Dotted paths of the keys in `raw_config` that `config` does not use
fn extra_fields(config: &Config, raw_config: &str) -> Vec<String> {
    let user_config: toml::Table = match toml::from_str(raw_config) {
        Ok(table) => table,
        Err(_) => return Vec::new(),
    };

    let config: toml::Table = match toml::Value::try_from(config) {
        Ok(toml::Value::Table(table)) => table,
        _ => return Vec::new(),
    };

    let mut path = Vec::new();
    let mut extra = Vec::new();

    extra_fields_helper(&mut path, &user_config, &config, &mut extra);

    extra
}

fn parse_config(path: &Path, raw_config: &str) -> Result<Config, Error> {
    let mut config: Config = toml::from_str(raw_config).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    for key in extra_fields(&config, raw_config) {
        warn!("config contains extraneous key \"{}\", ignoring", key);
    }

    if config.anthropic.timeout_secs == Some(0) {
        warn!(
            "anthropic.timeout_secs must be positive, using the default of {} seconds",
            DEFAULT_TIMEOUT.as_secs()
        );

        config.anthropic.timeout_secs = None;
    }

    Ok(config)
}

/// Reads the config at `config`, or at the first default location that
/// exists. Without either, the defaults are used.
pub(crate) fn read_config(config: Option<PathBuf>) -> Result<Config, Error> {
    let config_path = config.or_else(get_config_path);

    match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "reading config");

            let raw_config = std::fs::read_to_string(&path).map_err(|source| Error::Read {
                path: path.clone(),
                source,
            })?;

            parse_config(&path, &raw_config)
        }
        None => Ok(Config::default()),
    }
}

fn env_var<F>(lookup: &F, name: &'static str) -> Result<Option<String>, Error>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    match lookup(name) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(Error::MalformedEnvVar(name)),
    }
}

impl Config {
    /// The API key from the config, falling back to the environment
    pub(crate) fn api_key<F>(&self, lookup: F) -> Result<String, Error>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let api_key = match &self.anthropic.api_key {
            Some(api_key) => Some(api_key.clone()),
            None => env_var(&lookup, API_KEY_ENV_VAR)?,
        };

        match api_key {
            Some(api_key) if !api_key.trim().is_empty() => Ok(api_key),
            _ => Err(Error::MissingApiKey),
        }
    }

    pub(crate) fn api_base<F>(&self, lookup: F) -> Result<String, Error>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        if let Some(api_base) = &self.anthropic.api_base {
            return Ok(api_base.clone());
        }

        Ok(env_var(&lookup, API_BASE_ENV_VAR)?.unwrap_or_else(|| DEFAULT_API_BASE.to_string()))
    }

    pub(crate) fn model_config(&self, overrides: Overrides) -> ModelConfig {
        let anthropic = &self.anthropic;

        ModelConfig {
            model: overrides
                .model
                .or_else(|| anthropic.model.clone())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: overrides
                .max_tokens
                .or(anthropic.max_tokens)
                .unwrap_or(DEFAULT_MAX_TOKENS),
            timeout: anthropic
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
        }
    }
}
