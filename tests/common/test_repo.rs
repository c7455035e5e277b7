//! TestRepo builder for CLI and end-to-end tests

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

use super::fixtures;

/// Builder for creating temporary project trees
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Create a new empty test repository
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Get the path to the test repository root
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Add a source file with the given content
    pub fn add_file(&self, relative_path: &str, content: &str) -> &Self {
        let full_path = self.dir.path().join(relative_path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        self
    }

    /// Write a `secscan.toml` at the repository root
    pub fn with_config(&self, content: &str) -> &Self {
        self.add_file("secscan.toml", content)
    }

    /// One vulnerable file per syntax plus a clean one
    pub fn with_vulnerable_project(&self) -> &Self {
        self.add_file("src/Login.cs", fixtures::CSHARP_NETWORK_CREDENTIAL)
            .add_file("src/Keys.vb", fixtures::VB_PASSWORD_DERIVE_BYTES)
            .add_file("src/Clean.cs", fixtures::CSHARP_CLEAN)
    }

    /// Path to the built `secscan` binary
    pub fn binary() -> PathBuf {
        PathBuf::from(env!("CARGO_BIN_EXE_secscan"))
    }

    /// Run the secscan CLI inside the repository
    ///
    /// The user config directory is pointed into the repository so a
    /// developer's own configuration never leaks into tests.
    pub fn run_cli(&self, args: &[&str]) -> std::io::Result<Output> {
        Command::new(Self::binary())
            .current_dir(self.path())
            .env("XDG_CONFIG_HOME", self.path().join(".config"))
            .env("HOME", self.path())
            .env_remove("SECSCAN_CONFIG")
            .env_remove("RUST_LOG")
            .args(args)
            .output()
    }

    /// Run CLI and expect success, return stdout
    pub fn run_cli_success(&self, args: &[&str]) -> String {
        let output = self.run_cli(args).expect("Failed to run CLI");
        assert!(
            output.status.success(),
            "CLI command {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// Run CLI and expect a specific exit code, return (stdout, stderr)
    pub fn run_cli_with_code(&self, args: &[&str], code: i32) -> (String, String) {
        let output = self.run_cli(args).expect("Failed to run CLI");
        assert_eq!(
            output.status.code(),
            Some(code),
            "CLI command {:?} exited with {:?}; stderr: {}",
            args,
            output.status.code(),
            String::from_utf8_lossy(&output.stderr)
        );
        (
            String::from_utf8_lossy(&output.stdout).to_string(),
            String::from_utf8_lossy(&output.stderr).to_string(),
        )
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}
