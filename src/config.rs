//! Configuration for the default feed author.
//!
//! The default author stands in whenever a feed is created without one. It is
//! read from an optional TOML file and can be overridden from the environment.
//! A missing file yields `Config::default()`. Unknown keys are accepted but
//! logged, since they are usually typos.
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Environment variable overriding [`AuthorConfig::name`].
pub const ENV_AUTHOR_NAME: &str = "ATOMIZE_AUTHOR_NAME";
/// Environment variable overriding [`AuthorConfig::email`].
pub const ENV_AUTHOR_EMAIL: &str = "ATOMIZE_AUTHOR_EMAIL";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-014: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Name and email used for a feed's author when none is given.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AuthorConfig {
    pub name: String,
    /// Omitted from the rendered author when `None`.
    pub email: Option<String>,
}

impl Default for AuthorConfig {
    fn default() -> Self {
        Self {
            name: "Anonymous".to_string(),
            email: None,
        }
    }
}

impl AuthorConfig {
    pub fn new(name: impl Into<String>, email: Option<String>) -> Self {
        Self {
            name: name.into(),
            email,
        }
    }
}

/// Top-level configuration.
///
/// ```toml
/// [author]
/// name = "Jane Doe"
/// email = "jane@example.org"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub author: AuthorConfig,
}

impl Config {
    /// SEC-014: Maximum config file size (64 KiB).
    const MAX_FILE_SIZE: u64 = 65_536;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted (serde default behavior), logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // SEC-014: Check file size before reading
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text. Blank text yields the defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            tracing::debug!("Config is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for (key, value) in &raw {
                match (key.as_str(), value) {
                    ("author", toml::Value::Table(author)) => {
                        for sub in author.keys() {
                            if !["name", "email"].contains(&sub.as_str()) {
                                tracing::warn!(
                                    key = %format!("author.{sub}"),
                                    "Unknown key in config file, ignoring"
                                );
                            }
                        }
                    }
                    ("author", _) => {}
                    _ => tracing::warn!(key = %key, "Unknown key in config file, ignoring"),
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        tracing::info!(author = %config.author.name, "Loaded configuration");
        Ok(config)
    }

    /// Applies `ATOMIZE_AUTHOR_NAME` / `ATOMIZE_AUTHOR_EMAIL` from the process
    /// environment. Env vars take precedence over the config file.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary lookup, keyed like the environment.
    /// Empty values are ignored.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(name) = lookup(ENV_AUTHOR_NAME).filter(|v| !v.trim().is_empty()) {
            self.author.name = name;
        }
        if let Some(email) = lookup(ENV_AUTHOR_EMAIL).filter(|v| !v.trim().is_empty()) {
            self.author.email = Some(email);
        }
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.author.name, "Anonymous");
        assert!(config.author.email.is_none());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/atomize_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_empty_file_returns_default() {
        let dir = std::env::temp_dir().join("atomize_config_test_empty");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "   \n  ").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let dir = std::env::temp_dir().join("atomize_config_test_full");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            "[author]\nname = \"Jane Doe\"\nemail = \"jane@example.org\"\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.author.name, "Jane Doe");
        assert_eq!(config.author.email.as_deref(), Some("jane@example.org"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let config = Config::from_toml("[author]\nemail = \"x@example.org\"\n").unwrap();
        assert_eq!(config.author.name, "Anonymous");
        assert_eq!(config.author.email.as_deref(), Some("x@example.org"));
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let err = Config::from_toml("this is not [valid toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_wrong_type_returns_error() {
        assert!(Config::from_toml("[author]\nname = 42\n").is_err());
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let config =
            Config::from_toml("theme = \"dark\"\n[author]\nname = \"J\"\nnickname = \"j\"\n")
                .unwrap();
        assert_eq!(config.author.name, "J");
    }

    #[test]
    fn test_too_large_file_rejected() {
        let dir = std::env::temp_dir().join("atomize_config_test_too_large");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "#".repeat(65_537)).unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_overrides_take_precedence() {
        let config = Config::from_toml("[author]\nname = \"File Name\"\n")
            .unwrap()
            .with_overrides_from(|key| match key {
                ENV_AUTHOR_NAME => Some("Env Name".to_string()),
                ENV_AUTHOR_EMAIL => Some("env@example.org".to_string()),
                _ => None,
            });
        assert_eq!(config.author.name, "Env Name");
        assert_eq!(config.author.email.as_deref(), Some("env@example.org"));
    }

    #[test]
    fn test_blank_overrides_ignored() {
        let config = Config::default().with_overrides_from(|_| Some("  ".to_string()));
        assert_eq!(config, Config::default());
    }
}
