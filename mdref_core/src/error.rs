use miette::Diagnostic;
use thiserror::Error;

use crate::BlockKind;

/// The kind of key whose lookup or declaration failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
	/// A `begin-ref` reference name.
	Reference,
	/// A `var` variable name.
	Variable,
	/// An `include-file` target.
	File,
}

impl std::fmt::Display for KeyKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Reference => write!(f, "reference"),
			Self::Variable => write!(f, "variable"),
			Self::File => write!(f, "include file"),
		}
	}
}

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum MdrefError {
	#[error(transparent)]
	#[diagnostic(code(mdref::io_error))]
	Io(#[from] std::io::Error),

	#[error("invalid input: {0}")]
	#[diagnostic(code(mdref::validation))]
	Validation(String),

	#[error("not found: `{0}`")]
	#[diagnostic(
		code(mdref::not_found),
		help("check the path and the configured search folders")
	)]
	NotFound(String),

	#[error("missing `<!-- end-{kind} -->` for `begin-{kind}({name})` opened on line {line}")]
	#[diagnostic(
		code(mdref::missing_end_marker),
		help("add `<!-- end-{kind} -->` after the block content")
	)]
	MissingEndMarker {
		kind: BlockKind,
		name: String,
		line: usize,
	},

	#[error("duplicate {kind} `{name}`")]
	#[diagnostic(
		code(mdref::duplicate_key),
		help("each {kind} name must be unique within its scope")
	)]
	DuplicateKey { kind: KeyKind, name: String },

	#[error("unresolved {kind} `{name}`")]
	#[diagnostic(
		code(mdref::unresolved_key),
		help("declare the {kind} in a scanned file or run with `--ignore-missing`")
	)]
	UnresolvedKey { kind: KeyKind, name: String },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(mdref::config_parse),
		help("check that mdref.toml is valid TOML")
	)]
	ConfigParse(String),

	#[error("symlink cycle detected at: `{path}`")]
	#[diagnostic(
		code(mdref::symlink_cycle),
		help("remove the circular symlink or exclude this path")
	)]
	SymlinkCycle { path: String },
}

impl MdrefError {
	pub(crate) fn validation(message: impl Into<String>) -> Self {
		Self::Validation(message.into())
	}
}

pub type MdrefResult<T> = Result<T, MdrefError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
