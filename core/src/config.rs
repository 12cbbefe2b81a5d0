//! Layered console configuration.
//!
//! Precedence, lowest to highest:
//! 1. Built-in defaults
//! 2. `config.toml` in the warden home (`$WARDEN_HOME`, else `~/.warden`)
//! 3. `WARDEN_*` environment variables
//! 4. Command-line overrides
//!
//! ```no_run
//! use warden_core::config::ConfigLoader;
//!
//! let config = ConfigLoader::new().load()?;
//! # Ok::<(), warden_core::config::ConfigError>(())
//! ```

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TOAST_TTL_MS: u64 = 3_000;

const ENV_HOME: &str = "WARDEN_HOME";
const ENV_BASE_URL: &str = "WARDEN_BASE_URL";
const ENV_ACTIONS: &str = "WARDEN_ACTIONS";
const ENV_TOAST_TTL_MS: &str = "WARDEN_TOAST_TTL_MS";
const ENV_LOG_DIR: &str = "WARDEN_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Base url of the player backend, without a trailing slash.
    pub base_url: String,
    /// Whether ban action controls are rendered on the record view.
    pub actions_enabled: bool,
    pub toast_ttl_ms: u64,
    /// Where the TUI writes its log file. `None` disables file logging.
    pub log_dir: Option<PathBuf>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            actions_enabled: false,
            toast_ttl_ms: DEFAULT_TOAST_TTL_MS,
            log_dir: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for ${var}: '{value}' (expected {expected})")]
    InvalidEnvValue {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Values supplied on the command line. `None` leaves lower layers alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub actions_enabled: Option<bool>,
    pub config_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    base_url: Option<String>,
    actions_enabled: Option<bool>,
    toast_ttl_ms: Option<u64>,
    log_dir: Option<PathBuf>,
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

pub struct ConfigLoader {
    home: Option<PathBuf>,
    env: EnvLookup,
    overrides: ConfigOverrides,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            home: None,
            env: Box::new(|name| std::env::var(name).ok()),
            overrides: ConfigOverrides::default(),
        }
    }

    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Replace the environment lookup, mainly so tests do not depend on the
    /// process environment.
    pub fn with_env<F>(mut self, env: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Box::new(env);
        self
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// `$WARDEN_HOME`, falling back to `~/.warden`.
    pub fn resolve_home(&self) -> Option<PathBuf> {
        if let Some(home) = &self.home {
            return Some(home.clone());
        }
        if let Some(home) = (self.env)(ENV_HOME).filter(|v| !v.is_empty()) {
            return Some(PathBuf::from(home));
        }
        dirs::home_dir().map(|home| home.join(".warden"))
    }

    pub fn load(&self) -> Result<ConsoleConfig, ConfigError> {
        let home = self.resolve_home();
        let mut config = ConsoleConfig {
            log_dir: home.as_ref().map(|home| home.join("log")),
            ..ConsoleConfig::default()
        };

        match (&self.overrides.config_path, &home) {
            (Some(explicit), _) => {
                let file = read_file_config(explicit)?;
                apply_file(&mut config, file);
            }
            (None, Some(home)) => {
                let path = home.join(CONFIG_FILE_NAME);
                if path.exists() {
                    let file = read_file_config(&path)?;
                    apply_file(&mut config, file);
                }
            }
            (None, None) => {}
        }

        self.apply_env(&mut config)?;
        self.apply_overrides(&mut config);
        config.base_url = config.base_url.trim_end_matches('/').to_string();

        tracing::debug!(?config, "loaded console configuration");
        Ok(config)
    }

    fn apply_env(&self, config: &mut ConsoleConfig) -> Result<(), ConfigError> {
        if let Some(base_url) = (self.env)(ENV_BASE_URL).filter(|v| !v.is_empty()) {
            config.base_url = base_url;
        }
        if let Some(value) = (self.env)(ENV_ACTIONS) {
            config.actions_enabled = parse_bool(ENV_ACTIONS, &value)?;
        }
        if let Some(value) = (self.env)(ENV_TOAST_TTL_MS) {
            config.toast_ttl_ms =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidEnvValue {
                        var: ENV_TOAST_TTL_MS,
                        value: value.clone(),
                        expected: "milliseconds",
                    })?;
        }
        if let Some(log_dir) = (self.env)(ENV_LOG_DIR).filter(|v| !v.is_empty()) {
            config.log_dir = Some(PathBuf::from(log_dir));
        }
        Ok(())
    }

    fn apply_overrides(&self, config: &mut ConsoleConfig) {
        if let Some(base_url) = &self.overrides.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(actions_enabled) = self.overrides.actions_enabled {
            config.actions_enabled = actions_enabled;
        }
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_file(config: &mut ConsoleConfig, file: FileConfig) {
    if let Some(base_url) = file.base_url {
        config.base_url = base_url;
    }
    if let Some(actions_enabled) = file.actions_enabled {
        config.actions_enabled = actions_enabled;
    }
    if let Some(ttl) = file.toast_ttl_ms {
        config.toast_ttl_ms = ttl;
    }
    if let Some(log_dir) = file.log_dir {
        config.log_dir = Some(log_dir);
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidEnvValue {
            var,
            value: value.to_string(),
            expected: "a boolean",
        }),
    }
}
