use std::fmt::Display;
use std::ops::Range;

use serde::Deserialize;
use serde::Serialize;

/// The families of paired block directives.
///
/// Each family has a `begin-<kind>(name)` opening marker and a bare
/// `end-<kind>` closing marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
	/// `<!-- begin-ref(name) -->…<!-- end-ref -->`
	Ref,
	/// `<!-- begin-var(name) -->…<!-- end-var -->`
	Var,
	/// `<!-- begin-include(name) -->…<!-- end-include -->`
	Include,
}

impl BlockKind {
	/// All block kinds, in keyword lookup order.
	pub const ALL: [BlockKind; 3] = [BlockKind::Ref, BlockKind::Var, BlockKind::Include];

	/// The keyword of the opening marker, e.g. `begin-ref`.
	pub fn begin_keyword(self) -> &'static str {
		match self {
			Self::Ref => "begin-ref",
			Self::Var => "begin-var",
			Self::Include => "begin-include",
		}
	}

	/// The keyword of the closing marker, e.g. `end-ref`.
	pub fn end_keyword(self) -> &'static str {
		match self {
			Self::Ref => "end-ref",
			Self::Var => "end-var",
			Self::Include => "end-include",
		}
	}

	pub(crate) fn from_begin_keyword(keyword: &str) -> Option<Self> {
		Self::ALL
			.into_iter()
			.find(|kind| kind.begin_keyword() == keyword)
	}

	pub(crate) fn from_end_keyword(keyword: &str) -> Option<Self> {
		Self::ALL
			.into_iter()
			.find(|kind| kind.end_keyword() == keyword)
	}
}

impl Display for BlockKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Ref => write!(f, "ref"),
			Self::Var => write!(f, "var"),
			Self::Include => write!(f, "include"),
		}
	}
}

/// A single recognized directive marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
	/// `<!-- var(name)="value" -->`. The value is kept exactly as written
	/// between the quotes, escapes included.
	Var {
		name: String,
		quote: char,
		raw_value: String,
		/// Byte span of the quoted value, quotes included.
		value_span: Range<usize>,
	},
	/// `<!-- begin-<kind>(name) -->`
	Begin { kind: BlockKind, name: String },
	/// `<!-- end-<kind> -->`
	End { kind: BlockKind },
	/// `<!-- include-file(name) ... -->`
	IncludeFile { name: String },
}

/// A directive together with the byte span of the whole HTML comment that
/// holds it (`<!--` through `-->`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveToken {
	pub directive: Directive,
	pub span: Range<usize>,
}

impl DirectiveToken {
	/// The block name when this token opens a block of `kind`.
	pub fn opening_name(&self, kind: BlockKind) -> Option<&str> {
		match &self.directive {
			Directive::Begin {
				kind: token_kind,
				name,
			} if *token_kind == kind => Some(name),
			_ => None,
		}
	}

	/// Whether this token closes a block of `kind`.
	pub fn is_closing(&self, kind: BlockKind) -> bool {
		matches!(&self.directive, Directive::End { kind: token_kind } if *token_kind == kind)
	}
}

/// 1-indexed line number of a byte offset in `source`.
pub fn line_of(source: &str, offset: usize) -> usize {
	let end = offset.min(source.len());
	source.as_bytes()[..end]
		.iter()
		.filter(|byte| **byte == b'\n')
		.count()
		+ 1
}
