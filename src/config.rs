//! Options persistence
//!
//! Stores user preferences in `~/.config/format-on-save/config.yaml`.
//! Every field has a default, so a partial file only overrides what it names.
//!
//! ```yaml
//! enable_tab_to_space: true
//! enable_unify_line_break: true
//! line_break: crlf
//! enable_unify_end_of_file: true
//! enable_format_tool: true
//! filter:
//!   deny: ["*.min.js", "vendor"]
//! tools:
//!   format:
//!     program: clang-format
//!     args: ["--assume-filename={path}"]
//! languages:
//!   Markdown:
//!     tab_width: 2
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::filter::FilterConfig;
use crate::model::{LanguageId, DEFAULT_TAB_WIDTH};
use crate::tools::ToolsConfig;

/// Per-language overrides of the document settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageSettings {
    #[serde(default)]
    pub tab_width: Option<usize>,
    #[serde(default)]
    pub insert_tabs: Option<bool>,
}

/// Format-on-save options, fixed for the duration of one save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOnSaveConfig {
    /// Convert tabs to spaces
    #[serde(default = "default_true")]
    pub enable_tab_to_space: bool,

    /// Rewrite every line terminator to `line_break`
    #[serde(default = "default_true")]
    pub enable_unify_line_break: bool,

    /// Target line break: `lf` or `crlf`
    #[serde(default = "default_line_break")]
    pub line_break: String,

    /// Leave exactly one trailing blank line
    #[serde(default = "default_true")]
    pub enable_unify_end_of_file: bool,

    /// Run the external sort/organize tool
    #[serde(default)]
    pub enable_sort_tool: bool,

    /// Run the external format tool
    #[serde(default)]
    pub enable_format_tool: bool,

    /// Default tab width for documents
    #[serde(default = "default_tab_width")]
    pub tab_width: usize,

    /// Keep literal tabs (disables tab expansion for matching documents)
    #[serde(default)]
    pub insert_tabs: bool,

    /// Filter for the whitespace and line-ending rules
    #[serde(default)]
    pub filter: FilterConfig,

    /// Filter for the format tool
    #[serde(default)]
    pub format_filter: FilterConfig,

    /// Filter for the sort tool
    #[serde(default = "default_sort_filter")]
    pub sort_filter: FilterConfig,

    /// Languages that get a second tab expansion pass after formatting,
    /// for formatters known to reintroduce tabs
    #[serde(default)]
    pub legacy_retab_languages: Vec<String>,

    /// Programs backing the external tools
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Per-language settings keyed by language name (e.g. "C/C++")
    #[serde(default)]
    pub languages: BTreeMap<String, LanguageSettings>,
}

fn default_true() -> bool {
    true
}

fn default_line_break() -> String {
    "lf".to_string()
}

fn default_tab_width() -> usize {
    DEFAULT_TAB_WIDTH
}

fn default_sort_filter() -> FilterConfig {
    FilterConfig::allow_only(&["*.cs"])
}

impl Default for FormatOnSaveConfig {
    fn default() -> Self {
        Self {
            enable_tab_to_space: true,
            enable_unify_line_break: true,
            line_break: default_line_break(),
            enable_unify_end_of_file: true,
            enable_sort_tool: false,
            enable_format_tool: false,
            tab_width: default_tab_width(),
            insert_tabs: false,
            filter: FilterConfig::default(),
            format_filter: FilterConfig::default(),
            sort_filter: default_sort_filter(),
            legacy_retab_languages: Vec::new(),
            tools: ToolsConfig::default(),
            languages: BTreeMap::new(),
        }
    }
}

/// Errors that can occur when loading or saving options
#[derive(Debug, Clone)]
pub enum ConfigError {
    NoConfigDir,
    IoError(String),
    ParseError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoConfigDir => write!(f, "No config directory available"),
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl FormatOnSaveConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // An empty file is a valid, all-defaults config
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = crate::config_paths::config_file().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Save config to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::ParseError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            ConfigError::IoError(format!("Failed to write config to {}: {}", path.display(), e))
        })?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Settings override for a language, if one is configured
    pub fn language_settings(&self, language: LanguageId) -> Option<&LanguageSettings> {
        self.languages
            .iter()
            .find(|(name, _)| language.matches_name(name))
            .map(|(_, settings)| settings)
    }

    /// Effective tab width for a language
    pub fn tab_width_for(&self, language: LanguageId) -> usize {
        self.language_settings(language)
            .and_then(|s| s.tab_width)
            .unwrap_or(self.tab_width)
    }

    /// Effective literal-tabs setting for a language
    pub fn insert_tabs_for(&self, language: LanguageId) -> bool {
        self.language_settings(language)
            .and_then(|s| s.insert_tabs)
            .unwrap_or(self.insert_tabs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FormatOnSaveConfig::default();
        assert!(config.enable_tab_to_space);
        assert!(config.enable_unify_line_break);
        assert!(config.enable_unify_end_of_file);
        assert!(!config.enable_sort_tool);
        assert!(!config.enable_format_tool);
        assert_eq!(config.line_break, "lf");
        assert_eq!(config.tab_width, 4);
        assert_eq!(config.sort_filter.allow, vec!["*.cs".to_string()]);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(
            FormatOnSaveConfig::from_yaml("").unwrap(),
            FormatOnSaveConfig::default()
        );
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let config = FormatOnSaveConfig::from_yaml("line_break: crlf\ntab_width: 2\n").unwrap();
        assert_eq!(config.line_break, "crlf");
        assert_eq!(config.tab_width, 2);
        assert!(config.enable_tab_to_space);
        assert_eq!(config.sort_filter, default_sort_filter());
    }

    #[test]
    fn test_invalid_yaml_is_parse_error() {
        let result = FormatOnSaveConfig::from_yaml("tab_width: [not a number");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_language_overrides() {
        let yaml = r#"
tab_width: 4
languages:
  Markdown:
    tab_width: 2
  c/c++:
    insert_tabs: true
"#;
        let config = FormatOnSaveConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.tab_width_for(LanguageId::Markdown), 2);
        assert_eq!(config.tab_width_for(LanguageId::Rust), 4);
        assert!(config.insert_tabs_for(LanguageId::Cpp));
        assert_eq!(config.tab_width_for(LanguageId::Cpp), 4);
        assert!(!config.insert_tabs_for(LanguageId::Markdown));
    }
}
