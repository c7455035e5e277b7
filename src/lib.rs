//! secscan-engine: static security analysis for C# and Visual Basic
//!
//! The crate reports security anti-patterns, such as hardcoded credentials
//! passed to sensitive constructors and setters, in the two surface syntaxes
//! of the .NET language family. Rules are written once against the
//! [`SyntaxHelper`] capability set and run unchanged over either syntax.
//!
//! # Layers
//!
//! - [`frontend`]: C# (tree-sitter) and Visual Basic (in-crate parser) trees,
//!   each with a [`SyntaxHelper`] implementation
//! - [`semantic`]: the [`SemanticModel`] boundary and the import-scope
//!   [`Binder`]
//! - [`rules`]: the rule catalog
//! - [`engine`]: candidate enumeration, literal evaluation and suppression
//! - [`commands`]: the `secscan` CLI handlers
//!
//! # Example
//!
//! ```
//! use secscan_engine::{analyze_source, Analyzer, RuleCatalog, SurfaceSyntax};
//!
//! let source = r#"
//! using System.Net;
//! class C {
//!     void M() { var c = new NetworkCredential("user", "hunter2"); }
//! }
//! "#;
//!
//! let analyzer = Analyzer::new(RuleCatalog::builtin());
//! let diagnostics = analyze_source(source, SurfaceSyntax::CSharp, "C.cs", &analyzer)?;
//! assert_eq!(diagnostics[0].id, "SCS0015");
//! # Ok::<(), secscan_engine::ScanError>(())
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod diagnostic;
pub mod engine;
pub mod error;
pub mod frontend;
pub mod fs_utils;
pub mod lang;
pub mod rules;
pub mod semantic;
pub mod syntax;

pub use cli::{Cli, OutputFormat};
pub use config::SecscanConfig;
pub use diagnostic::{DiagnosticContext, DiagnosticResult, Location, Severity};
pub use engine::{Analyzer, CancellationToken};
pub use error::{Result, ScanError};
pub use frontend::csharp::{CSharpSyntaxHelper, CSharpTree};
pub use frontend::vb::{VbSyntaxHelper, VbTree};
pub use frontend::{analyze_file, analyze_source};
pub use lang::SurfaceSyntax;
pub use rules::{RuleCatalog, RuleCatalogEntry};
pub use semantic::{Binder, SemanticModel, Symbol};
pub use syntax::{CallKind, SyntaxHelper, SyntaxNodeKind};
