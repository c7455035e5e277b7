//! Surface syntax detection and tree-sitter grammar loading

use serde::{Deserialize, Serialize};
use std::path::Path;
use tree_sitter::Language;

use crate::error::{Result, ScanError};

/// The two surface syntaxes of the .NET language family the engine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceSyntax {
    CSharp,
    VisualBasic,
}

impl SurfaceSyntax {
    /// Detect the syntax from a file path extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ScanError::UnsupportedLanguage {
                extension: "none".to_string(),
            })?;

        Self::from_extension(ext)
    }

    /// Detect the syntax from a file extension string
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_lowercase().as_str() {
            "cs" | "csx" => Ok(Self::CSharp),
            "vb" => Ok(Self::VisualBasic),
            _ => Err(ScanError::UnsupportedLanguage {
                extension: ext.to_string(),
            }),
        }
    }

    /// Get the canonical name of the syntax
    pub fn name(&self) -> &'static str {
        match self {
            Self::CSharp => "csharp",
            Self::VisualBasic => "vb",
        }
    }

    /// Common file extensions for this syntax
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::CSharp => &["cs", "csx"],
            Self::VisualBasic => &["vb"],
        }
    }

    /// Whether identifiers compare case-sensitively
    pub fn is_case_sensitive(&self) -> bool {
        matches!(self, Self::CSharp)
    }

    /// The tree-sitter grammar for syntaxes parsed through tree-sitter
    ///
    /// Visual Basic is parsed by the in-crate front end and has no grammar.
    pub fn tree_sitter_language(&self) -> Option<Language> {
        match self {
            Self::CSharp => Some(tree_sitter_c_sharp::LANGUAGE.into()),
            Self::VisualBasic => None,
        }
    }

    /// Check whether a path has one of the supported extensions
    pub fn is_supported(path: &Path) -> bool {
        Self::from_path(path).is_ok()
    }
}

impl std::fmt::Display for SurfaceSyntax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
