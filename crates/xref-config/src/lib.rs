//! Configuration management for xref.
//!
//! Parses `xref.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `templates.phabricator_base_url`
//! - every value of `templates.link_map`

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the long-name-in-nav flag.
    pub use_longname_in_nav: Option<bool>,
    /// Override the ticket base URL.
    pub phabricator_base_url: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "xref.toml";

/// Default base URL for ticket autolinking.
pub const DEFAULT_PHABRICATOR_BASE_URL: &str = "https://phabricator.wikimedia.org/";

/// Default ticket identifier prefix.
pub const DEFAULT_TICKET_PREFIX: &str = "T";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Template options consumed by the publishing pipeline.
    pub templates: TemplatesConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Template options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Show full long names instead of short names in the navigation sidebar.
    #[serde(alias = "useLongnameInNav")]
    pub use_longname_in_nav: bool,
    /// Base URL for ticket autolinking. Only used when it is an absolute URL.
    #[serde(alias = "phabricatorBaseUrl", alias = "phabricator")]
    pub phabricator_base_url: String,
    /// Uppercase prefix of ticket identifiers (`T` matches `T12345`).
    #[serde(alias = "ticketPrefix")]
    pub ticket_prefix: String,
    /// Long name to external URL mapping, registered before any doclet.
    #[serde(alias = "linkMap")]
    pub link_map: BTreeMap<String, String>,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            use_longname_in_nav: false,
            phabricator_base_url: DEFAULT_PHABRICATOR_BASE_URL.to_owned(),
            ticket_prefix: DEFAULT_TICKET_PREFIX.to_owned(),
            link_map: BTreeMap::new(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`templates.phabricator_base_url`").
        field: String,
        /// Error message (e.g., "${`TICKET_HOST`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `xref.toml` in current directory and parents.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let discovered = if config_path.is_none() {
            std::env::current_dir()
                .ok()
                .and_then(|cwd| Self::discover_config(&cwd))
        } else {
            None
        };

        let mut config = match (config_path, discovered) {
            (Some(path), _) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Self::load_from_file(path)?
            }
            (None, Some(found)) => Self::load_from_file(&found)?,
            (None, None) => Self::default(),
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(flag) = settings.use_longname_in_nav {
            self.templates.use_longname_in_nav = flag;
        }
        if let Some(base) = &settings.phabricator_base_url {
            self.templates.phabricator_base_url.clone_from(base);
        }
    }

    /// Search for config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// The ticket base URL is deliberately not checked here: a non-absolute
    /// value disables ticket autolinking instead of failing the run.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let prefix = &self.templates.ticket_prefix;
        require_non_empty(prefix, "templates.ticket_prefix")?;
        if !prefix.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ConfigError::Validation(format!(
                "templates.ticket_prefix must be uppercase ASCII letters, got {prefix:?}"
            )));
        }

        for (longname, url) in &self.templates.link_map {
            require_non_empty(longname, "templates.link_map key")?;
            require_non_empty(url, &format!("templates.link_map.{longname}"))?;
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.templates.phabricator_base_url = expand::expand_env(
            &self.templates.phabricator_base_url,
            "templates.phabricator_base_url",
        )?;

        for (longname, url) in &mut self.templates.link_map {
            *url = expand::expand_env(url, &format!("templates.link_map.{longname}"))?;
        }

        Ok(())
    }
}
