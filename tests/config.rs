//! Configuration system tests
//!
//! Tests for config paths, options loading/saving and document resolution.

use std::io::Write;
use std::path::Path;

use format_on_save::config::{ConfigError, FormatOnSaveConfig};
use format_on_save::config_paths;
use format_on_save::filter::{FilterError, PathFilter};
use format_on_save::model::LanguageId;
use format_on_save::pipeline::Pipeline;
use format_on_save::source::{DocumentSource, FileDocumentSource};

// ========================================================================
// Config Paths Tests
// ========================================================================

#[test]
fn test_config_dir_contains_app_name() {
    if let Some(dir) = config_paths::config_dir() {
        assert!(dir.to_string_lossy().contains("format-on-save"));
    }
}

#[test]
fn test_config_file_ends_with_yaml() {
    if let Some(path) = config_paths::config_file() {
        assert!(path.to_string_lossy().ends_with("config.yaml"));
    }
}

#[test]
fn test_config_file_is_inside_config_dir() {
    if let (Some(dir), Some(file)) = (config_paths::config_dir(), config_paths::config_file()) {
        assert!(file.starts_with(&dir));
    }
}

// ========================================================================
// Options File Tests
// ========================================================================

#[test]
fn test_save_and_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.yaml");

    let mut config = FormatOnSaveConfig::default();
    config.line_break = "crlf".to_string();
    config.enable_format_tool = true;
    config.legacy_retab_languages = vec!["CSharp".to_string()];
    config.save_to(&path).unwrap();

    let loaded = FormatOnSaveConfig::load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = FormatOnSaveConfig::load_from(&dir.path().join("missing.yaml"));
    assert!(matches!(result, Err(ConfigError::IoError(_))));
}

#[test]
fn test_full_options_file() {
    let yaml = r#"
enable_tab_to_space: true
enable_unify_line_break: true
line_break: crlf
enable_unify_end_of_file: false
enable_sort_tool: true
enable_format_tool: true
tab_width: 2
filter:
  deny: ["*.min.js", "vendor"]
format_filter:
  allow: ["*.cs", "*.cpp"]
tools:
  format:
    program: clang-format
    args: ["--assume-filename={path}"]
languages:
  Markdown:
    tab_width: 4
"#;
    let config = FormatOnSaveConfig::from_yaml(yaml).unwrap();
    assert_eq!(config.line_break, "crlf");
    assert!(!config.enable_unify_end_of_file);
    assert_eq!(config.filter.deny.len(), 2);
    assert_eq!(config.format_filter.allow.len(), 2);
    // Untouched sort filter keeps its default
    assert_eq!(config.sort_filter.allow, vec!["*.cs".to_string()]);
    let format = config.tools.format.as_ref().unwrap();
    assert_eq!(format.program, "clang-format");
    assert!(config.tools.sort.is_none());
    assert_eq!(config.tab_width_for(LanguageId::Markdown), 4);
    assert_eq!(config.tab_width_for(LanguageId::CSharp), 2);

    assert!(Pipeline::from_config(&config).is_ok());
}

#[test]
fn test_invalid_filter_pattern_rejected() {
    let config = FormatOnSaveConfig::from_yaml("filter:\n  deny: [\"[unclosed\"]\n").unwrap();
    assert!(matches!(
        Pipeline::from_config(&config),
        Err(FilterError::InvalidPattern { .. })
    ));
}

// ========================================================================
// Filter Tests
// ========================================================================

#[test]
fn test_deny_wins_over_allow() {
    let filter = PathFilter::new(&["*.js".to_string()], &["*.min.js".to_string()]).unwrap();
    assert!(filter.is_path_allowed(Path::new("src/app.js")));
    assert!(!filter.is_path_allowed(Path::new("dist/app.min.js")));
    assert!(!filter.is_path_allowed(Path::new("src/app.ts")));
}

#[test]
fn test_directory_component_pattern() {
    let filter = PathFilter::new(&[], &["vendor".to_string()]).unwrap();
    assert!(!filter.is_path_allowed(Path::new("project/vendor/lib/a.cs")));
    assert!(filter.is_path_allowed(Path::new("project/src/a.cs")));
}

// ========================================================================
// Document Source Tests
// ========================================================================

#[test]
fn test_file_source_uses_options() {
    let config = FormatOnSaveConfig::from_yaml(
        "tab_width: 3\nlanguages:\n  C/C++:\n    insert_tabs: true\n",
    )
    .unwrap();
    let source = FileDocumentSource::new(&config);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("main.cpp");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "int main() {{}}").unwrap();
    drop(file);

    let document = source.resolve(&path).unwrap();
    assert_eq!(document.language, LanguageId::Cpp);
    assert_eq!(document.tab_width, 3);
    assert!(document.insert_tabs);
}

#[test]
fn test_file_source_skips_directories() {
    let source = FileDocumentSource::new(&FormatOnSaveConfig::default());
    let dir = tempfile::tempdir().unwrap();
    assert!(source.resolve(dir.path()).is_none());
}
