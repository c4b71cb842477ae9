//! Document sources - resolve a host handle into a [`Document`]

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

use crate::config::FormatOnSaveConfig;
use crate::model::{Document, LanguageId};

/// Files above this size are never treated as documents (50 MB)
const MAX_DOCUMENT_BYTES: u64 = 50 * 1024 * 1024;

/// Leading bytes scanned for NUL when sniffing binary content
const SNIFF_BYTES: u64 = 8 * 1024;

/// Resolves host handles to documents.
///
/// Returns `None` when the handle does not refer to a plain-text document;
/// such items are skipped silently.
pub trait DocumentSource {
    type Handle: ?Sized;

    fn resolve(&self, handle: &Self::Handle) -> Option<Document>;
}

/// Resolves file-system paths, taking tab settings from the options
#[derive(Debug, Clone)]
pub struct FileDocumentSource {
    config: FormatOnSaveConfig,
}

impl FileDocumentSource {
    pub fn new(config: &FormatOnSaveConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Build the document for a path without checking the file itself
    pub fn document_for(&self, path: &Path) -> Document {
        let language = LanguageId::from_path(path);
        Document::new(path)
            .with_language(language)
            .with_tab_width(self.config.tab_width_for(language))
            .with_insert_tabs(self.config.insert_tabs_for(language))
    }
}

impl DocumentSource for FileDocumentSource {
    type Handle = Path;

    fn resolve(&self, path: &Path) -> Option<Document> {
        match not_plain_text(path) {
            None => Some(self.document_for(path)),
            Some(reason) => {
                tracing::debug!("Not a text document {}: {}", path.display(), reason);
                None
            }
        }
    }
}

/// Why `path` cannot be a plain-text document, if it cannot
fn not_plain_text(path: &Path) -> Option<String> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) => return Some(e.to_string()),
    };
    if !metadata.is_file() {
        return Some("not a regular file".to_string());
    }
    if metadata.len() > MAX_DOCUMENT_BYTES {
        return Some(format!("{} bytes is over the size limit", metadata.len()));
    }
    match starts_with_binary(path) {
        Ok(false) => None,
        Ok(true) => Some("binary content".to_string()),
        Err(e) => Some(e.to_string()),
    }
}

/// NUL bytes near the start are rare in text and common in binaries
fn starts_with_binary(path: &Path) -> io::Result<bool> {
    let mut head = Vec::with_capacity(SNIFF_BYTES as usize);
    File::open(path)?.take(SNIFF_BYTES).read_to_end(&mut head)?;
    Ok(head.contains(&0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_document_for_applies_language_settings() {
        let config = FormatOnSaveConfig::from_yaml(
            "tab_width: 8\nlanguages:\n  Markdown:\n    tab_width: 2\n    insert_tabs: true\n",
        )
        .unwrap();
        let source = FileDocumentSource::new(&config);

        let md = source.document_for(Path::new("README.md"));
        assert_eq!(md.language, LanguageId::Markdown);
        assert_eq!(md.tab_width, 2);
        assert!(md.insert_tabs);

        let rs = source.document_for(Path::new("lib.rs"));
        assert_eq!(rs.tab_width, 8);
        assert!(!rs.insert_tabs);
    }

    #[test]
    fn test_resolve_text_file() {
        let mut temp = tempfile::Builder::new().suffix(".cs").tempfile().unwrap();
        writeln!(temp, "class A {{}}").unwrap();
        temp.flush().unwrap();

        let source = FileDocumentSource::new(&FormatOnSaveConfig::default());
        let doc = source.resolve(temp.path()).unwrap();
        assert_eq!(doc.language, LanguageId::CSharp);
        assert_eq!(doc.path, temp.path());
    }

    #[test]
    fn test_resolve_empty_file() {
        let temp = NamedTempFile::new().unwrap();
        let source = FileDocumentSource::new(&FormatOnSaveConfig::default());
        assert!(source.resolve(temp.path()).is_some());
    }

    #[test]
    fn test_resolve_rejects_directory() {
        let source = FileDocumentSource::new(&FormatOnSaveConfig::default());
        let dir = tempfile::tempdir().unwrap();
        assert!(source.resolve(dir.path()).is_none());
    }

    #[test]
    fn test_resolve_rejects_binary() {
        let source = FileDocumentSource::new(&FormatOnSaveConfig::default());
        let mut binary = NamedTempFile::new().unwrap();
        binary.write_all(&[0x7f, b'E', b'L', b'F', 0, 0]).unwrap();
        binary.flush().unwrap();
        assert!(starts_with_binary(binary.path()).unwrap());
        assert!(source.resolve(binary.path()).is_none());
    }

    #[test]
    fn test_resolve_rejects_missing_file() {
        let source = FileDocumentSource::new(&FormatOnSaveConfig::default());
        assert!(source.resolve(Path::new("/nonexistent/file.txt")).is_none());
        assert!(not_plain_text(Path::new("/nonexistent/file.txt")).is_some());
    }

    #[test]
    fn test_nul_past_sniff_window_is_text() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(&vec![b'a'; SNIFF_BYTES as usize]).unwrap();
        temp.write_all(&[0]).unwrap();
        temp.flush().unwrap();
        assert!(!starts_with_binary(temp.path()).unwrap());
    }
}
