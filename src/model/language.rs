//! Language identification for documents

use std::path::Path;

/// Supported language identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LanguageId {
    #[default]
    PlainText,
    CSharp,
    Cpp,
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Json,
    Yaml,
    Toml,
    Xml,
    Html,
    Css,
    Markdown,
    Shell,
}

impl LanguageId {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "cs" => LanguageId::CSharp,
            "c" | "h" | "cc" | "cpp" | "cxx" | "hpp" | "hh" | "hxx" | "inl" => LanguageId::Cpp,
            "rs" => LanguageId::Rust,
            "py" | "pyi" => LanguageId::Python,
            "js" | "mjs" | "cjs" | "jsx" => LanguageId::JavaScript,
            "ts" | "tsx" | "mts" | "cts" => LanguageId::TypeScript,
            "json" => LanguageId::Json,
            "yaml" | "yml" => LanguageId::Yaml,
            "toml" => LanguageId::Toml,
            "xml" | "xaml" | "csproj" | "props" | "targets" => LanguageId::Xml,
            "html" | "htm" => LanguageId::Html,
            "css" => LanguageId::Css,
            "md" | "markdown" => LanguageId::Markdown,
            "sh" | "bash" | "zsh" => LanguageId::Shell,
            _ => LanguageId::PlainText,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(LanguageId::PlainText)
    }

    /// Get display name for the language
    ///
    /// This is also the name used to refer to a language in the options file.
    pub fn display_name(&self) -> &'static str {
        match self {
            LanguageId::PlainText => "Plain Text",
            LanguageId::CSharp => "CSharp",
            LanguageId::Cpp => "C/C++",
            LanguageId::Rust => "Rust",
            LanguageId::Python => "Python",
            LanguageId::JavaScript => "JavaScript",
            LanguageId::TypeScript => "TypeScript",
            LanguageId::Json => "JSON",
            LanguageId::Yaml => "YAML",
            LanguageId::Toml => "TOML",
            LanguageId::Xml => "XML",
            LanguageId::Html => "HTML",
            LanguageId::Css => "CSS",
            LanguageId::Markdown => "Markdown",
            LanguageId::Shell => "Shell",
        }
    }

    /// Case-insensitive comparison against a configured language name
    pub fn matches_name(&self, name: &str) -> bool {
        self.display_name().eq_ignore_ascii_case(name.trim())
    }
}

impl std::fmt::Display for LanguageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
