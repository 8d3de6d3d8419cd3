//! Configuration management for wikisync.
//!
//! Parses `wikisync.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories. The file is
//! optional: every Confluence setting defaults to an environment variable
//! reference, so a run without a file reads its credentials from the
//! environment.
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
//! - `confluence.base_url` (default `${CONFLUENCE_BASE_URL}`)
//! - `confluence.username` (default `${CONFLUENCE_USERNAME}`)
//! - `confluence.api_token` (default `${CONFLUENCE_API_TOKEN}`)
//! - `confluence.space_key` (default `${SPACE_KEY}`)
//! - `sync.source_dir`
//! - `sync.version_message`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the directory scanned for documents.
    pub source_dir: Option<PathBuf>,
    /// Override the failure policy.
    pub continue_on_error: Option<bool>,
    /// Override the worker pool size.
    pub workers: Option<usize>,
    /// Override the minimum hierarchy depth.
    pub min_depth: Option<usize>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "wikisync.toml";

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default markdown written to pages that only group other pages.
const DEFAULT_PLACEHOLDER: &str = "This page groups related documents.";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Confluence connection settings.
    pub confluence: ConfluenceConfig,
    /// Filename hierarchy settings.
    pub hierarchy: HierarchyConfig,
    /// Synchronization settings (paths are relative strings from TOML).
    sync: SyncConfigRaw,

    /// Resolved synchronization settings (set after loading).
    #[serde(skip)]
    pub sync_resolved: SyncConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Confluence connection configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ConfluenceConfig {
    /// Confluence base URL (trailing slash stripped after loading).
    pub base_url: String,
    /// Username for HTTP Basic authentication.
    pub username: String,
    /// API token used as the Basic authentication password.
    pub api_token: String,
    /// Key of the space that holds the page tree.
    pub space_key: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ConfluenceConfig {
    fn default() -> Self {
        Self {
            base_url: "${CONFLUENCE_BASE_URL}".to_owned(),
            username: "${CONFLUENCE_USERNAME}".to_owned(),
            api_token: "${CONFLUENCE_API_TOKEN}".to_owned(),
            space_key: "${SPACE_KEY}".to_owned(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ConfluenceConfig {
    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.base_url, "confluence.base_url")?;
        require_http_url(&self.base_url, "confluence.base_url")?;
        require_non_empty(&self.username, "confluence.username")?;
        require_non_empty(&self.api_token, "confluence.api_token")?;
        require_non_empty(&self.space_key, "confluence.space_key")?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "confluence.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Filename hierarchy configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HierarchyConfig {
    /// Minimum number of `_`-separated segments a filename must have.
    pub min_depth: usize,
    /// Segments beyond this depth are ignored. `None` keeps every segment.
    pub max_depth: Option<usize>,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            min_depth: 2,
            max_depth: None,
        }
    }
}

/// Raw sync configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SyncConfigRaw {
    source_dir: Option<String>,
    extensions: Option<Vec<String>>,
    placeholder: Option<String>,
    placeholders: Option<Vec<String>>,
    continue_on_error: Option<bool>,
    workers: Option<usize>,
    version_message: Option<String>,
}

/// Resolved synchronization configuration with absolute paths.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Directory scanned recursively for documents.
    pub source_dir: PathBuf,
    /// File extensions (without dot) treated as documents.
    pub extensions: Vec<String>,
    /// Markdown content written to ancestor pages.
    pub placeholder: String,
    /// Per-level ancestor content, outermost first. Levels past the end of
    /// the list use `placeholder`.
    pub placeholders: Vec<String>,
    /// Whether a failed document is skipped (true) or aborts the run (false).
    pub continue_on_error: bool,
    /// Number of worker threads for leaf pages.
    pub workers: usize,
    /// Version comment attached to page updates.
    pub version_message: Option<String>,
}

impl SyncConfig {
    /// Ancestor content for a 1-based hierarchy level.
    #[must_use]
    pub fn placeholder_for(&self, level: usize) -> &str {
        level
            .checked_sub(1)
            .and_then(|index| self.placeholders.get(index))
            .unwrap_or(&self.placeholder)
    }

    fn with_base(base: &Path) -> Self {
        Self {
            source_dir: base.to_path_buf(),
            extensions: default_extensions(),
            placeholder: DEFAULT_PLACEHOLDER.to_owned(),
            placeholders: Vec::new(),
            continue_on_error: true,
            workers: 1,
            version_message: None,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::with_base(Path::new("."))
    }
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_owned(), "txt".to_owned()]
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
        /// Config field path (e.g., "`confluence.api_token`").
        field: String,
        /// Error message (e.g., "${`CONFLUENCE_API_TOKEN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `wikisync.toml` in current directory and parents,
    /// falling back to defaults (environment variables only).
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// a referenced environment variable is unset, or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        Self::load_with_lookup(config_path, cli_settings, &expand::process_env)
    }

    /// Load configuration resolving `${VAR}` references through `lookup`
    /// instead of the process environment.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`].
    pub fn load_with_lookup(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
        lookup: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path, lookup)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered, lookup)?
        } else {
            let cwd = std::env::current_dir()?;
            let mut config = Self::default_with_base(&cwd);
            config.expand_env_vars(lookup)?;
            config.resolve_paths(&cwd);
            config
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration text, expand variables and resolve paths
    /// relative to `base_dir`. Does not validate.
    ///
    /// # Errors
    ///
    /// Returns error if parsing fails or a referenced variable is unset.
    pub fn parse(
        content: &str,
        base_dir: &Path,
        lookup: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env_vars(lookup)?;
        config.resolve_paths(base_dir);
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.sync_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(continue_on_error) = settings.continue_on_error {
            self.sync_resolved.continue_on_error = continue_on_error;
        }
        if let Some(workers) = settings.workers {
            self.sync_resolved.workers = workers;
        }
        if let Some(min_depth) = settings.min_depth {
            self.hierarchy.min_depth = min_depth;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
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

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            confluence: ConfluenceConfig::default(),
            hierarchy: HierarchyConfig::default(),
            sync: SyncConfigRaw::default(),
            sync_resolved: SyncConfig::with_base(base),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(
        path: &Path,
        lookup: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::parse(&content, config_dir, lookup)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.confluence.validate()?;
        self.validate_hierarchy()?;
        self.validate_sync()?;
        Ok(())
    }

    fn validate_hierarchy(&self) -> Result<(), ConfigError> {
        let min = self.hierarchy.min_depth;
        if !(2..=3).contains(&min) {
            return Err(ConfigError::Validation(format!(
                "hierarchy.min_depth must be 2 or 3, got {min}"
            )));
        }
        if let Some(max) = self.hierarchy.max_depth
            && max < min
        {
            return Err(ConfigError::Validation(format!(
                "hierarchy.max_depth ({max}) cannot be less than hierarchy.min_depth ({min})"
            )));
        }
        Ok(())
    }

    fn validate_sync(&self) -> Result<(), ConfigError> {
        if self.sync_resolved.workers == 0 {
            return Err(ConfigError::Validation(
                "sync.workers must be greater than 0".to_owned(),
            ));
        }
        if self.sync_resolved.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "sync.extensions cannot be empty".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self, lookup: expand::Lookup<'_>) -> Result<(), ConfigError> {
        let confluence = &mut self.confluence;
        confluence.base_url = expand::expand_env(&confluence.base_url, "confluence.base_url", lookup)?
            .trim_end_matches('/')
            .to_owned();
        confluence.username = expand::expand_env(&confluence.username, "confluence.username", lookup)?;
        confluence.api_token =
            expand::expand_env(&confluence.api_token, "confluence.api_token", lookup)?;
        confluence.space_key =
            expand::expand_env(&confluence.space_key, "confluence.space_key", lookup)?;

        if let Some(ref dir) = self.sync.source_dir {
            self.sync.source_dir = Some(expand::expand_env(dir, "sync.source_dir", lookup)?);
        }
        if let Some(ref message) = self.sync.version_message {
            self.sync.version_message =
                Some(expand::expand_env(message, "sync.version_message", lookup)?);
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let raw = &self.sync;
        self.sync_resolved = SyncConfig {
            source_dir: config_dir.join(raw.source_dir.as_deref().unwrap_or(".")),
            extensions: raw
                .extensions
                .as_ref()
                .map(|exts| {
                    exts.iter()
                        .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                        .collect()
                })
                .unwrap_or_else(default_extensions),
            placeholder: raw
                .placeholder
                .clone()
                .unwrap_or_else(|| DEFAULT_PLACEHOLDER.to_owned()),
            placeholders: raw.placeholders.clone().unwrap_or_default(),
            continue_on_error: raw.continue_on_error.unwrap_or(true),
            workers: raw.workers.unwrap_or(1),
            version_message: raw.version_message.clone(),
        };
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn full_env() -> impl Fn(&str) -> Option<String> {
        let map: HashMap<&str, &str> = HashMap::from([
            ("CONFLUENCE_BASE_URL", "https://wiki.example.com/"),
            ("CONFLUENCE_USERNAME", "bot@example.com"),
            ("CONFLUENCE_API_TOKEN", "secret-token"),
            ("SPACE_KEY", "DOCS"),
        ]);
        move |name| map.get(name).map(|v| (*v).to_owned())
    }

    fn empty_env() -> impl Fn(&str) -> Option<String> {
        |_| None
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.confluence.base_url, "${CONFLUENCE_BASE_URL}");
        assert_eq!(config.confluence.timeout_secs, 30);
        assert_eq!(config.hierarchy.min_depth, 2);
        assert_eq!(config.hierarchy.max_depth, None);
        assert_eq!(config.sync_resolved.source_dir, PathBuf::from("/test"));
        assert_eq!(config.sync_resolved.extensions, vec!["md", "txt"]);
        assert!(config.sync_resolved.continue_on_error);
        assert_eq!(config.sync_resolved.workers, 1);
    }

    #[test]
    fn test_parse_minimal_config_reads_environment() {
        let config = Config::parse("", Path::new("/project"), &full_env()).unwrap();
        assert_eq!(config.confluence.base_url, "https://wiki.example.com");
        assert_eq!(config.confluence.username, "bot@example.com");
        assert_eq!(config.confluence.api_token, "secret-token");
        assert_eq!(config.confluence.space_key, "DOCS");
        config.validate().unwrap();
    }

    #[test]
    fn test_missing_environment_is_error() {
        let err = Config::parse("", Path::new("/project"), &empty_env()).unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("CONFLUENCE_BASE_URL"));
    }

    #[test]
    fn test_parse_literal_confluence_config() {
        let toml = r#"
[confluence]
base_url = "https://confluence.example.com/wiki/"
username = "alice"
api_token = "token123"
space_key = "ENG"
timeout_secs = 10
"#;
        let config = Config::parse(toml, Path::new("/project"), &empty_env()).unwrap();
        assert_eq!(config.confluence.base_url, "https://confluence.example.com/wiki");
        assert_eq!(config.confluence.username, "alice");
        assert_eq!(config.confluence.space_key, "ENG");
        assert_eq!(config.confluence.timeout_secs, 10);
    }

    #[test]
    fn test_parse_sync_and_hierarchy() {
        let toml = r##"
[confluence]
base_url = "https://wiki.example.com"
username = "u"
api_token = "t"
space_key = "S"

[hierarchy]
min_depth = 3
max_depth = 3

[sync]
source_dir = "docs"
extensions = [".MD"]
placeholder = "Index"
placeholders = ["# Main documentation", "# Platform content"]
continue_on_error = false
workers = 4
version_message = "synced"
"##;
        let config = Config::parse(toml, Path::new("/project"), &empty_env()).unwrap();
        assert_eq!(config.hierarchy.min_depth, 3);
        assert_eq!(config.hierarchy.max_depth, Some(3));
        assert_eq!(config.sync_resolved.source_dir, PathBuf::from("/project/docs"));
        assert_eq!(config.sync_resolved.extensions, vec!["md"]);
        assert_eq!(config.sync_resolved.placeholder, "Index");
        assert_eq!(config.sync_resolved.placeholder_for(1), "# Main documentation");
        assert_eq!(config.sync_resolved.placeholder_for(2), "# Platform content");
        assert_eq!(config.sync_resolved.placeholder_for(3), "Index");
        assert!(!config.sync_resolved.continue_on_error);
        assert_eq!(config.sync_resolved.workers, 4);
        assert_eq!(config.sync_resolved.version_message.as_deref(), Some("synced"));
        config.validate().unwrap();
    }

    #[test]
    fn test_placeholder_defaults() {
        let sync = SyncConfig::default();
        assert!(sync.placeholders.is_empty());
        assert_eq!(sync.placeholder_for(1), DEFAULT_PLACEHOLDER);
        assert_eq!(sync.placeholder_for(4), DEFAULT_PLACEHOLDER);
    }

    #[test]
    fn test_validate_rejects_non_http_url() {
        let toml = r#"
[confluence]
base_url = "wiki.example.com"
username = "u"
api_token = "t"
space_key = "S"
"#;
        let config = Config::parse(toml, Path::new("/p"), &empty_env()).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn test_validate_rejects_bad_depths() {
        let mut config = Config::parse("", Path::new("/p"), &full_env()).unwrap();
        config.hierarchy.min_depth = 1;
        assert!(config.validate().is_err());

        config.hierarchy.min_depth = 3;
        config.hierarchy.max_depth = Some(2);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_depth"));
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let mut config = Config::parse("", Path::new("/p"), &full_env()).unwrap();
        config.apply_cli_settings(&CliSettings {
            workers: Some(0),
            ..Default::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::parse("", Path::new("/p"), &full_env()).unwrap();
        config.apply_cli_settings(&CliSettings {
            source_dir: Some(PathBuf::from("/custom/docs")),
            continue_on_error: Some(false),
            workers: Some(8),
            min_depth: Some(3),
        });
        assert_eq!(config.sync_resolved.source_dir, PathBuf::from("/custom/docs"));
        assert!(!config.sync_resolved.continue_on_error);
        assert_eq!(config.sync_resolved.workers, 8);
        assert_eq!(config.hierarchy.min_depth, 3);
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let err = Config::load_with_lookup(
            Some(Path::new("/nonexistent/wikisync.toml")),
            None,
            &full_env(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wikisync.toml");
        std::fs::write(&path, "[sync]\nsource_dir = \"content\"\n").unwrap();

        let config = Config::load_with_lookup(Some(&path), None, &full_env()).unwrap();
        assert_eq!(config.sync_resolved.source_dir, dir.path().join("content"));
        assert_eq!(config.config_path, Some(path));
    }
}
