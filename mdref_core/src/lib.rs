//! `mdref_core` is the core library of the mdref markdown include engine.
//! Directives live in HTML comments, so processed files stay valid markdown
//! and the markers survive every rewrite.
//!
//! ## Directives
//!
//! ```markdown
//! <!-- var(version)="1.2.0" -->
//! <!-- begin-var(version) -->1.2.0<!-- end-var -->
//!
//! <!-- begin-ref(install) -->
//! cargo install mdref
//! <!-- end-ref -->
//! <!-- begin-include(install) --><!-- end-include -->
//!
//! <!-- include-file(snippets/usage.md) -->
//! ```
//!
//! ## Processing Pipeline
//!
//! ```text
//! Markdown file
//!   -> Lexer (HTML comments tokenized with logos into DirectiveTokens)
//!   -> BlockScanner (pairs begin/end markers of one kind)
//!   -> Collectors (ReferenceMap and VariableMap from the surrounding files)
//!   -> Rewriter (include-file, then begin-var, then begin-include)
//!   -> Orchestrator (backup and atomic write)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: `mdref.toml` discovery and parsing.
//! - [`files`]: BOM-aware reads, atomic writes, backups and include lookup.
//! - [`path_resolver`]: probing search folders and their ancestors for a
//!   file.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use mdref_core::ProcessOptions;
//! use mdref_core::process_file;
//!
//! let report = process_file(Path::new("readme.md"), &ProcessOptions::default()).unwrap();
//! if report.changed {
//! 	println!("updated {}", report.path.display());
//! }
//! ```

pub use config::*;
pub use error::*;
pub use lexer::escape_value;
pub use lexer::is_valid_name;
pub use lexer::strip_comments;
pub use lexer::tokenize;
pub use lexer::unescape_value;
pub use maps::*;
pub use orchestrator::*;
pub use parser::*;
pub use refs::*;
pub use rewriter::*;
pub use scope::*;
pub use tokens::*;
pub use vars::*;

pub mod config;
#[allow(unused_assignments)]
mod error;
pub mod files;
mod lexer;
mod maps;
mod orchestrator;
mod parser;
pub mod path_resolver;
mod refs;
mod rewriter;
mod scope;
mod tokens;
mod vars;
