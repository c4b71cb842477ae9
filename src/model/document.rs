//! Document model - identity and per-document settings of a buffer being saved

use std::path::{Path, PathBuf};

use super::language::LanguageId;

/// Default tab width when neither the options file nor a language override sets one
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// A text document delivered by the host for one save event.
///
/// Immutable for the duration of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Path to the file on disk; the document's identity
    pub path: PathBuf,
    /// Detected language
    pub language: LanguageId,
    /// Tab width in columns (must be positive for tab expansion)
    pub tab_width: usize,
    /// Host setting: keep literal tabs instead of converting them to spaces
    pub insert_tabs: bool,
}

impl Document {
    /// Create a document for a path, detecting its language from the extension
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let language = LanguageId::from_path(&path);
        Self {
            path,
            language,
            tab_width: DEFAULT_TAB_WIDTH,
            insert_tabs: false,
        }
    }

    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width;
        self
    }

    pub fn with_insert_tabs(mut self, insert_tabs: bool) -> Self {
        self.insert_tabs = insert_tabs;
        self
    }

    pub fn with_language(mut self, language: LanguageId) -> Self {
        self.language = language;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the display name for this document (the file name)
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_detects_language() {
        let doc = Document::new("src/widget.cpp");
        assert_eq!(doc.language, LanguageId::Cpp);
        assert_eq!(doc.tab_width, DEFAULT_TAB_WIDTH);
        assert!(!doc.insert_tabs);
    }

    #[test]
    fn test_builders() {
        let doc = Document::new("notes.txt")
            .with_tab_width(8)
            .with_insert_tabs(true)
            .with_language(LanguageId::Markdown);
        assert_eq!(doc.tab_width, 8);
        assert!(doc.insert_tabs);
        assert_eq!(doc.language, LanguageId::Markdown);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(Document::new("/tmp/a/b.rs").display_name(), "b.rs");
    }
}
