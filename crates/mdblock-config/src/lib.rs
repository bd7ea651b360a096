//! Configuration management for mdblock.
//!
//! Parses `mdblock.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `fetch.base_url` supports environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdblock.toml";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override minimum heading level.
    pub hmin: Option<u32>,
    /// Override heading link symbol (`Some("")` for self links).
    pub hlinks: Option<String>,
    /// Force sanitization of rendered output.
    pub untrusted: Option<bool>,
    /// Override GFM extensions flag.
    pub gfm: Option<bool>,
    /// Override fetch timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Override base URL for relative `src` values.
    pub base_url: Option<String>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default element rendering options.
    pub render: RenderConfig,
    /// Parser options.
    pub parser: ParserConfig,
    /// Remote content fetching.
    pub fetch: FetchConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// `[render]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Minimum heading level.
    pub hmin: u32,
    /// Heading link symbol. Absent disables links, empty links the heading text.
    pub hlinks: Option<String>,
    /// Sanitize rendered output.
    pub untrusted: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            hmin: 1,
            hlinks: None,
            untrusted: false,
        }
    }
}

/// `[parser]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Enable tables, strikethrough and task lists.
    pub gfm: bool,
    /// Reject markdown inputs larger than this many bytes.
    pub max_input_bytes: Option<usize>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            gfm: true,
            max_input_bytes: None,
        }
    }
}

/// `[fetch]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Base URL relative `src` values resolve against.
    pub base_url: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            base_url: None,
        }
    }
}

impl FetchConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Parsed base URL, if configured.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the value is not an absolute URL.
    pub fn base_url(&self) -> Result<Option<Url>, ConfigError> {
        self.base_url
            .as_deref()
            .map(|raw| {
                Url::parse(raw).map_err(|e| {
                    ConfigError::Validation(format!("fetch.base_url is not a valid URL: {e}"))
                })
            })
            .transpose()
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
        /// Config field path (e.g., "`fetch.base_url`").
        field: String,
        /// Error message (e.g., "${`DOCS_BASE_URL`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdblock.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values. The merged result is validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails
    /// or a value is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let discovered = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Some(path.to_path_buf())
            }
            None => std::env::current_dir()
                .ok()
                .and_then(|cwd| Self::discover_from(&cwd)),
        };

        let mut config = match discovered {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(hmin) = settings.hmin {
            self.render.hmin = hmin;
        }
        if let Some(hlinks) = &settings.hlinks {
            self.render.hlinks = Some(hlinks.clone());
        }
        if let Some(untrusted) = settings.untrusted {
            self.render.untrusted = untrusted;
        }
        if let Some(gfm) = settings.gfm {
            self.parser.gfm = gfm;
        }
        if let Some(timeout_secs) = settings.timeout_secs {
            self.fetch.timeout_secs = timeout_secs;
        }
        if let Some(base_url) = &settings.base_url {
            self.fetch.base_url = Some(base_url.clone());
        }
    }

    /// Search for config file in `start` and its parents.
    fn discover_from(start: &Path) -> Option<PathBuf> {
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
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render.hmin == 0 {
            return Err(ConfigError::Validation(
                "render.hmin must be at least 1".to_owned(),
            ));
        }
        if self.parser.max_input_bytes == Some(0) {
            return Err(ConfigError::Validation(
                "parser.max_input_bytes must be greater than 0".to_owned(),
            ));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "fetch.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        self.fetch.base_url()?;
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.expand_env_vars_with(|name| std::env::var(name).ok())
    }

    fn expand_env_vars_with(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(raw) = self.fetch.base_url.take() {
            self.fetch.base_url = Some(expand_field("fetch.base_url", raw, &lookup)?);
        }
        Ok(())
    }
}

/// Expand `${VAR}` and `${VAR:-default}` in one field value.
///
/// Values without `${` are returned as-is, so a bare `$` in a URL survives.
fn expand_field(
    field: &str,
    raw: String,
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    if !raw.contains("${") {
        return Ok(raw);
    }
    shellexpand::env_with_context(&raw, |name| match lookup(name) {
        Some(value) => Ok(Some(value)),
        None => Err(name.to_owned()),
    })
    .map(Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.render.hmin, 1);
        assert_eq!(config.render.hlinks, None);
        assert!(!config.render.untrusted);
        assert!(config.parser.gfm);
        assert_eq!(config.parser.max_input_bytes, None);
        assert_eq!(config.fetch.timeout(), Duration::from_secs(30));
        assert!(config.config_path.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r##"
[render]
hmin = 2
hlinks = "#"
untrusted = true

[parser]
gfm = false
max_input_bytes = 1048576

[fetch]
timeout_secs = 5
base_url = "https://docs.example.com/md/"
"##;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.render.hmin, 2);
        assert_eq!(config.render.hlinks.as_deref(), Some("#"));
        assert!(config.render.untrusted);
        assert!(!config.parser.gfm);
        assert_eq!(config.parser.max_input_bytes, Some(1_048_576));
        assert_eq!(config.fetch.timeout_secs, 5);
        assert_eq!(
            config.fetch.base_url().unwrap().unwrap().as_str(),
            "https://docs.example.com/md/"
        );
    }

    #[test]
    fn test_empty_hlinks_means_self_link() {
        let config: Config = toml::from_str("[render]\nhlinks = \"\"").unwrap();
        assert_eq!(config.render.hlinks.as_deref(), Some(""));
    }

    #[test]
    fn test_validate_hmin_zero() {
        let config: Config = toml::from_str("[render]\nhmin = 0").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("render.hmin"));
    }

    #[test]
    fn test_validate_timeout_zero() {
        let config: Config = toml::from_str("[fetch]\ntimeout_secs = 0").unwrap();
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::Validation(_)
        ));
    }

    #[test]
    fn test_validate_max_input_bytes_zero() {
        let config: Config = toml::from_str("[parser]\nmax_input_bytes = 0").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_base_url() {
        let config: Config = toml::from_str("[fetch]\nbase_url = \"not a url\"").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("fetch.base_url"));
    }

    #[test]
    fn test_negative_hmin_is_a_parse_error() {
        assert!(toml::from_str::<Config>("[render]\nhmin = -1").is_err());
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default();
        let overrides = CliSettings {
            hmin: Some(3),
            hlinks: Some(String::new()),
            untrusted: Some(true),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.render.hmin, 3);
        assert_eq!(config.render.hlinks.as_deref(), Some(""));
        assert!(config.render.untrusted);
        assert!(config.parser.gfm); // Unchanged
        assert_eq!(config.fetch.timeout_secs, 30); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config: Config = toml::from_str("[render]\nhmin = 4").unwrap();
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.render.hmin, 4);
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[render]\nhmin = 2\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.render.hmin, 2);
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_validates_cli_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();

        let overrides = CliSettings {
            hmin: Some(0),
            ..Default::default()
        };
        assert!(Config::load(Some(&path), Some(&overrides)).is_err());
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[render\nhmin = ").unwrap();
        assert!(matches!(
            Config::load(Some(&path), None).unwrap_err(),
            ConfigError::Parse(_)
        ));
    }

    #[test]
    fn test_discover_in_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&config_path, "[render]\nhmin = 2\n").unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(Config::discover_from(&nested), Some(config_path));
    }

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: std::collections::HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    fn with_base_url(raw: &str) -> Config {
        let mut config = Config::default();
        config.fetch.base_url = Some(raw.to_owned());
        config
    }

    #[test]
    fn test_expand_base_url_host() {
        let mut config = with_base_url("https://${DOCS_HOST}/md/");
        config
            .expand_env_vars_with(env(&[("DOCS_HOST", "docs.example.com")]))
            .unwrap();
        assert_eq!(
            config.fetch.base_url.as_deref(),
            Some("https://docs.example.com/md/")
        );
    }

    #[test]
    fn test_expand_base_url_prefers_set_value_over_default() {
        let mut config = with_base_url("${DOCS_BASE:-file:///srv/docs/}");
        config
            .expand_env_vars_with(env(&[("DOCS_BASE", "https://cdn.test/")]))
            .unwrap();
        assert_eq!(config.fetch.base_url.as_deref(), Some("https://cdn.test/"));

        let mut config = with_base_url("${DOCS_BASE:-file:///srv/docs/}");
        config.expand_env_vars_with(env(&[])).unwrap();
        assert_eq!(config.fetch.base_url.as_deref(), Some("file:///srv/docs/"));
    }

    #[test]
    fn test_expand_unset_var_names_field() {
        let mut config = with_base_url("${DOCS_BASE}");
        let err = config.expand_env_vars_with(env(&[])).unwrap_err();
        let ConfigError::EnvVar { field, message } = err else {
            panic!("expected EnvVar, got {err:?}");
        };
        assert_eq!(field, "fetch.base_url");
        assert_eq!(message, "${DOCS_BASE} not set");
    }

    #[test]
    fn test_dollar_without_braces_is_kept() {
        let mut config = with_base_url("https://example.com/$latest/");
        config.expand_env_vars_with(env(&[])).unwrap();
        assert_eq!(
            config.fetch.base_url.as_deref(),
            Some("https://example.com/$latest/")
        );
    }

    #[test]
    fn test_load_expands_base_url() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MDBLOCK_TEST_BASE");
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            "[fetch]\nbase_url = \"${MDBLOCK_TEST_BASE:-https://fallback.test/}\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(
            config.fetch.base_url.as_deref(),
            Some("https://fallback.test/")
        );
    }
}
