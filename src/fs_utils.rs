//! Source file discovery
//!
//! Directory walks respect `.gitignore`, skip .NET build output (`bin`,
//! `obj`) and hidden directories, and apply the configured exclude globs.
//! Explicit file arguments are taken as given.

use ignore::overrides::{Override, OverrideBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Result, ScanError};
use crate::lang::SurfaceSyntax;

/// Directory names never descended into
const SKIPPED_DIRECTORIES: &[&str] = &["bin", "obj", "node_modules", "packages", "TestResults"];

/// Options for a directory walk
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Glob patterns to exclude, gitignore syntax
    pub exclude: Vec<String>,
    pub max_depth: Option<usize>,
}

/// Collect the C# and Visual Basic files under the given paths
///
/// Results are sorted and deduplicated so runs are reproducible.
pub fn collect_source_files(paths: &[PathBuf], options: &WalkOptions) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            if SurfaceSyntax::is_supported(path) {
                files.push(path.clone());
            } else {
                return Err(ScanError::UnsupportedLanguage {
                    extension: path
                        .extension()
                        .and_then(|e| e.to_str())
                        .unwrap_or("none")
                        .to_string(),
                });
            }
        } else if path.is_dir() {
            files.extend(walk_directory(path, options)?);
        } else {
            return Err(ScanError::FileNotFound {
                path: path.display().to_string(),
            });
        }
    }

    files.sort();
    files.dedup();
    debug!(count = files.len(), "collected source files");
    Ok(files)
}

fn walk_directory(root: &Path, options: &WalkOptions) -> Result<Vec<PathBuf>> {
    let overrides = build_overrides(root, &options.exclude)?;

    let mut builder = WalkBuilder::new(root);
    builder
        .git_ignore(true)
        .git_global(false)
        .git_exclude(true)
        .follow_links(false)
        .hidden(true)
        .max_depth(options.max_depth)
        .overrides(overrides)
        .filter_entry(|entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(is_dir
                && entry.depth() > 0
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| SKIPPED_DIRECTORIES.contains(&name)))
        });

    let mut files = Vec::new();
    for entry in builder.build() {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if entry.file_type().is_some_and(|t| t.is_file()) && SurfaceSyntax::is_supported(path) {
                    files.push(path.to_path_buf());
                }
            }
            Err(e) => warn!(error = %e, "skipping unreadable entry"),
        }
    }
    Ok(files)
}

/// Exclude globs become ignore overrides (`!pattern`)
fn build_overrides(root: &Path, exclude: &[String]) -> Result<Override> {
    let mut builder = OverrideBuilder::new(root);
    for pattern in exclude {
        builder
            .add(&format!("!{}", pattern))
            .map_err(|e| ScanError::Config {
                message: format!("invalid exclude pattern '{}': {}", pattern, e),
            })?;
    }
    builder.build().map_err(|e| ScanError::Config {
        message: format!("invalid exclude patterns: {}", e),
    })
}

/// Label a file relative to the directory it was found under
pub fn display_path(path: &Path, roots: &[PathBuf]) -> String {
    roots
        .iter()
        .filter(|root| root.is_dir())
        .find_map(|root| path.strip_prefix(root).ok())
        .unwrap_or(path)
        .display()
        .to_string()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "class C { }").unwrap();
    }

    #[test]
    fn test_collects_supported_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/A.cs");
        touch(dir.path(), "src/B.vb");
        touch(dir.path(), "src/readme.md");
        touch(dir.path(), "obj/Debug/Gen.cs");
        touch(dir.path(), "bin/Release/Gen.vb");

        let files = collect_source_files(&[dir.path().to_path_buf()], &WalkOptions::default()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| display_path(f, &[dir.path().to_path_buf()]))
            .collect();
        assert_eq!(names, vec!["src/A.cs", "src/B.vb"]);
    }

    #[test]
    fn test_exclude_globs() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "App/Main.cs");
        touch(dir.path(), "App/Generated/Proxy.cs");

        let options = WalkOptions {
            exclude: vec!["**/Generated/**".to_string()],
            max_depth: None,
        };
        let files = collect_source_files(&[dir.path().to_path_buf()], &options).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("App/Main.cs"));
    }

    #[test]
    fn test_max_depth() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Top.cs");
        touch(dir.path(), "a/b/Deep.cs");

        let options = WalkOptions {
            exclude: Vec::new(),
            max_depth: Some(1),
        };
        let files = collect_source_files(&[dir.path().to_path_buf()], &options).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("Top.cs"));
    }

    #[test]
    fn test_explicit_paths() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "One.cs");
        let file = dir.path().join("One.cs");

        let files = collect_source_files(&[file.clone(), file.clone()], &WalkOptions::default()).unwrap();
        assert_eq!(files, vec![file]);

        let missing = collect_source_files(&[dir.path().join("Nope.cs")], &WalkOptions::default());
        assert!(matches!(missing, Err(ScanError::FileNotFound { .. })));

        touch(dir.path(), "notes.txt");
        let unsupported = collect_source_files(&[dir.path().join("notes.txt")], &WalkOptions::default());
        assert!(matches!(unsupported, Err(ScanError::UnsupportedLanguage { .. })));
    }

    #[test]
    fn test_invalid_exclude_is_config_error() {
        let dir = TempDir::new().unwrap();
        let options = WalkOptions {
            exclude: vec!["a[".to_string()],
            max_depth: None,
        };
        let result = collect_source_files(&[dir.path().to_path_buf()], &options);
        assert!(matches!(result, Err(ScanError::Config { .. })));
    }
}
