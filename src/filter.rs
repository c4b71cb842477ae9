//! Allow/deny path filtering for individual rules
//!
//! A rule applies to a document when no deny pattern matches its path and,
//! if any allow patterns are configured, at least one of them matches.
//! A pattern matches when it matches the full path, the file name, or any
//! single path component (so `target` excludes everything under a
//! `target/` directory).

use std::path::Path;

use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::model::Document;

/// Decides whether a rule applies to a document
pub trait FilterPolicy {
    fn is_allowed(&self, document: &Document) -> bool;
}

impl<F> FilterPolicy for F
where
    F: Fn(&Document) -> bool,
{
    fn is_allowed(&self, document: &Document) -> bool {
        self(document)
    }
}

/// Allow/deny pattern lists as written in the options file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub allow: Vec<String>,
    #[serde(default)]
    pub deny: Vec<String>,
}

impl FilterConfig {
    pub fn allow_only(patterns: &[&str]) -> Self {
        Self {
            allow: patterns.iter().map(|p| p.to_string()).collect(),
            deny: Vec::new(),
        }
    }
}

/// Errors raised while compiling filter patterns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    InvalidPattern { pattern: String, message: String },
}

impl std::fmt::Display for FilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterError::InvalidPattern { pattern, message } => {
                write!(f, "Invalid filter pattern '{}': {}", pattern, message)
            }
        }
    }
}

impl std::error::Error for FilterError {}

/// Compiled glob allow/deny filter
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    allow: Vec<Pattern>,
    deny: Vec<Pattern>,
}

impl PathFilter {
    /// A filter that allows every document
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn new(allow: &[String], deny: &[String]) -> Result<Self, FilterError> {
        Ok(Self {
            allow: compile(allow)?,
            deny: compile(deny)?,
        })
    }

    pub fn from_config(config: &FilterConfig) -> Result<Self, FilterError> {
        Self::new(&config.allow, &config.deny)
    }

    /// Check a path against the allow/deny lists
    pub fn is_path_allowed(&self, path: &Path) -> bool {
        if self.deny.iter().any(|p| matches_path(p, path)) {
            return false;
        }
        self.allow.is_empty() || self.allow.iter().any(|p| matches_path(p, path))
    }
}

impl FilterPolicy for PathFilter {
    fn is_allowed(&self, document: &Document) -> bool {
        self.is_path_allowed(&document.path)
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>, FilterError> {
    patterns
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(|p| {
            Pattern::new(p).map_err(|e| FilterError::InvalidPattern {
                pattern: p.to_string(),
                message: e.msg.to_string(),
            })
        })
        .collect()
}

fn matches_path(pattern: &Pattern, path: &Path) -> bool {
    let options = glob::MatchOptions {
        case_sensitive: !cfg!(windows),
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };

    // Full path, with separators normalized so patterns can use '/'
    let full = path.to_string_lossy().replace('\\', "/");
    if pattern.matches_with(&full, options) {
        return true;
    }

    path.components().any(|component| match component {
        std::path::Component::Normal(part) => {
            pattern.matches_with(&part.to_string_lossy(), options)
        }
        _ => false,
    })
}
