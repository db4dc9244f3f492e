//! Sticky element configuration

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Class added to the wrapper that holds a sticky element's original children
pub const CONTENT_CLASS: &str = "sticky-content";

const DEFAULT_STUCK_CLASS: &str = "stuck";
const DEFAULT_UNSTUCK_CLASS: &str = "unstuck";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Per-element configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StickyConfig {
    /// Class added to the element while it is stuck
    #[serde(alias = "stuckClass")]
    pub stuck_class: String,

    /// Class added to the element once a newer element supersedes it
    #[serde(alias = "unstuckClass")]
    pub unstuck_class: String,

    /// Pin the content with `position: fixed; top: 0; left: 0; right: 0`
    #[serde(alias = "useDefaultStyle")]
    pub use_default_style: bool,
}

impl Default for StickyConfig {
    fn default() -> Self {
        Self {
            stuck_class: DEFAULT_STUCK_CLASS.to_string(),
            unstuck_class: DEFAULT_UNSTUCK_CLASS.to_string(),
            use_default_style: true,
        }
    }
}

/// Partial configuration supplied for a single element
///
/// Unset fields fall back to the base configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StickyOverrides {
    #[serde(alias = "stuckClass", skip_serializing_if = "Option::is_none")]
    pub stuck_class: Option<String>,

    #[serde(alias = "unstuckClass", skip_serializing_if = "Option::is_none")]
    pub unstuck_class: Option<String>,

    #[serde(alias = "useDefaultStyle", skip_serializing_if = "Option::is_none")]
    pub use_default_style: Option<bool>,
}

impl StickyConfig {
    /// Parse configuration from TOML. Missing fields take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        Ok(config.sanitize())
    }

    /// Load configuration from a file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(config) => {
                    tracing::info!(?path, ?config, "loaded sticky configuration");
                    return config;
                }
                Err(e) => {
                    tracing::warn!(?path, error = %e, "failed to parse sticky config");
                }
            },
            Err(e) => {
                tracing::warn!(?path, error = %e, "failed to read sticky config");
            }
        }

        tracing::info!("using default sticky configuration");
        Self::default()
    }

    /// Merge per-element overrides over this configuration
    pub fn merged(&self, overrides: &StickyOverrides) -> Self {
        Self {
            stuck_class: overrides
                .stuck_class
                .clone()
                .unwrap_or_else(|| self.stuck_class.clone()),
            unstuck_class: overrides
                .unstuck_class
                .clone()
                .unwrap_or_else(|| self.unstuck_class.clone()),
            use_default_style: overrides.use_default_style.unwrap_or(self.use_default_style),
        }
        .sanitize()
    }

    /// Replace unusable class names with the defaults.
    ///
    /// A class name must be non-empty and contain no whitespace.
    pub fn sanitize(mut self) -> Self {
        if !is_valid_class(&self.stuck_class) {
            tracing::warn!(class = %self.stuck_class, "invalid stuck class, using default");
            self.stuck_class = DEFAULT_STUCK_CLASS.to_string();
        }
        if !is_valid_class(&self.unstuck_class) {
            tracing::warn!(class = %self.unstuck_class, "invalid unstuck class, using default");
            self.unstuck_class = DEFAULT_UNSTUCK_CLASS.to_string();
        }
        self
    }
}

fn is_valid_class(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = StickyConfig::default();

        assert_eq!(config.stuck_class, "stuck");
        assert_eq!(config.unstuck_class, "unstuck");
        assert!(config.use_default_style);
    }

    #[test]
    fn empty_overrides_keep_base() {
        let base = StickyConfig::default();
        assert_eq!(base.merged(&StickyOverrides::default()), base);
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let overrides = StickyOverrides {
            stuck_class: Some("custom-sticky-style".to_string()),
            use_default_style: Some(false),
            ..Default::default()
        };

        let merged = StickyConfig::default().merged(&overrides);

        assert_eq!(merged.stuck_class, "custom-sticky-style");
        assert_eq!(merged.unstuck_class, "unstuck");
        assert!(!merged.use_default_style);
    }

    #[test]
    fn merged_overrides_are_sanitized() {
        let overrides = StickyOverrides {
            unstuck_class: Some("two words".to_string()),
            ..Default::default()
        };

        let merged = StickyConfig::default().merged(&overrides);
        assert_eq!(merged.unstuck_class, "unstuck");
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config = StickyConfig::from_toml_str("stuck_class = \"pinned\"").unwrap();

        assert_eq!(config.stuck_class, "pinned");
        assert_eq!(config.unstuck_class, "unstuck");
        assert!(config.use_default_style);
    }

    #[test]
    fn camel_case_keys_accepted() {
        let toml = r#"
            stuckClass = "pinned"
            useDefaultStyle = false
        "#;

        let config = StickyConfig::from_toml_str(toml).unwrap();

        assert_eq!(config.stuck_class, "pinned");
        assert!(!config.use_default_style);
    }

    #[test]
    fn empty_class_falls_back_to_default() {
        let config = StickyConfig::from_toml_str("stuck_class = \"\"").unwrap();
        assert_eq!(config.stuck_class, "stuck");
    }

    #[test]
    fn invalid_toml_returns_error() {
        let result = StickyConfig::from_toml_str("this is not valid { toml [");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let config = StickyConfig::load(Path::new("/nonexistent/sticky/config.toml"));
        assert_eq!(config, StickyConfig::default());
    }

    #[test]
    fn load_reads_file_and_falls_back_on_parse_error() {
        let dir = std::env::temp_dir().join(format!("sticky-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let good = dir.join("good.toml");
        std::fs::write(&good, "unstuckClass = \"retired\"\n").unwrap();
        let config = StickyConfig::load(&good);
        assert_eq!(config.unstuck_class, "retired");
        assert_eq!(config.stuck_class, "stuck");

        let bad = dir.join("bad.toml");
        std::fs::write(&bad, "stuck_class = [").unwrap();
        assert_eq!(StickyConfig::load(&bad), StickyConfig::default());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn overrides_toml_roundtrip() {
        let overrides = StickyOverrides {
            unstuck_class: Some("retired".to_string()),
            ..Default::default()
        };

        let text = toml::to_string(&overrides).expect("Failed to serialize");
        let parsed: StickyOverrides = toml::from_str(&text).expect("Failed to deserialize");

        assert_eq!(parsed, overrides);
    }
}
