//! Single forward pass rewrites of `begin-include`, `begin-var` and
//! `include-file` directives.

use serde::Deserialize;
use serde::Serialize;

use crate::KeyKind;
use crate::MdrefError;
use crate::MdrefResult;
use crate::ReferenceMap;
use crate::VariableMap;
use crate::lexer::tokenize;
use crate::parser::BlockScanner;
use crate::tokens::BlockKind;
use crate::tokens::Directive;

/// Default line prefix of [`BoxFormatter`].
pub const DEFAULT_BOX_PREFIX: &str = "> ";

/// Renders the content of an included file before it replaces the
/// `include-file` marker.
pub trait IncludeFormatter {
	fn format(&self, content: &str) -> String;
}

/// Inserts file content verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawFormatter;

impl IncludeFormatter for RawFormatter {
	fn format(&self, content: &str) -> String {
		content.to_string()
	}
}

/// Prefixes every line of the content, rendering it as a quoted box.
/// Blank lines get the prefix with trailing whitespace removed.
#[derive(Debug, Clone)]
pub struct BoxFormatter {
	pub prefix: String,
}

impl Default for BoxFormatter {
	fn default() -> Self {
		Self::new(DEFAULT_BOX_PREFIX)
	}
}

impl BoxFormatter {
	pub fn new(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
		}
	}
}

impl IncludeFormatter for BoxFormatter {
	fn format(&self, content: &str) -> String {
		let blank = self.prefix.trim_end();
		let mut boxed = content
			.lines()
			.map(|line| {
				if line.trim().is_empty() {
					blank.to_string()
				} else {
					format!("{}{line}", self.prefix)
				}
			})
			.collect::<Vec<_>>()
			.join("\n");

		if content.ends_with('\n') {
			boxed.push('\n');
		}

		boxed
	}
}

/// How included files are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncludeMode {
	#[default]
	Raw,
	Box,
}

impl IncludeMode {
	/// The formatter for this mode. `box_prefix` only applies to
	/// [`IncludeMode::Box`].
	pub fn formatter(self, box_prefix: &str) -> Box<dyn IncludeFormatter> {
		match self {
			Self::Raw => Box::new(RawFormatter),
			Self::Box => Box::new(BoxFormatter::new(box_prefix)),
		}
	}
}

/// Replace the body of every `begin-include(name)` block with the content of
/// reference `name`.
pub fn apply_refs(text: &str, refs: &ReferenceMap, error_if_missing: bool) -> MdrefResult<String> {
	apply_blocks(
		text,
		BlockKind::Include,
		KeyKind::Reference,
		|name| refs.get(name).map(String::as_str),
		error_if_missing,
	)
}

/// Replace the body of every `begin-var(name)` block with the value of
/// variable `name`.
pub fn apply_vars(text: &str, vars: &VariableMap, error_if_missing: bool) -> MdrefResult<String> {
	apply_blocks(
		text,
		BlockKind::Var,
		KeyKind::Variable,
		|name| vars.get(name).map(String::as_str),
		error_if_missing,
	)
}

fn apply_blocks<'m>(
	text: &str,
	kind: BlockKind,
	key_kind: KeyKind,
	lookup: impl Fn(&str) -> Option<&'m str>,
	error_if_missing: bool,
) -> MdrefResult<String> {
	let mut scanner = BlockScanner::new(text, kind);
	let mut result = String::with_capacity(text.len());
	let mut cursor = 0;

	while let Some(opening) = scanner.next_opening() {
		let replacement = lookup(&opening.name);

		if replacement.is_none() {
			if error_if_missing {
				return Err(MdrefError::UnresolvedKey {
					kind: key_kind,
					name: opening.name,
				});
			}
			tracing::warn!(kind = %kind, name = %opening.name, "skipping unresolved block");
		}

		let block = scanner.close(opening)?;
		result.push_str(&text[cursor..block.opening.end]);
		match replacement {
			Some(content) => result.push_str(content),
			None => result.push_str(&text[block.body()]),
		}
		result.push_str(&text[block.closing.clone()]);
		cursor = block.closing.end;
	}

	result.push_str(&text[cursor..]);
	Ok(result)
}

/// Replace every `<!-- include-file(name) ... -->` marker with the content
/// returned by `resolve`, rendered through `formatter`.
///
/// A [`MdrefError::NotFound`] from `resolve` makes the marker unresolved: it
/// is an error when `error_if_missing` is set and otherwise the marker is
/// kept as written. Any other error is returned unchanged.
pub fn apply_include_files<F>(
	text: &str,
	resolve: F,
	formatter: &dyn IncludeFormatter,
	error_if_missing: bool,
) -> MdrefResult<String>
where
	F: Fn(&str) -> MdrefResult<String>,
{
	let mut result = String::with_capacity(text.len());
	let mut cursor = 0;

	for token in tokenize(text) {
		let Directive::IncludeFile { name } = &token.directive else {
			continue;
		};

		let content = match resolve(name) {
			Ok(content) => content,
			Err(MdrefError::NotFound(_)) if !error_if_missing => {
				tracing::warn!(name = %name, "skipping unresolved include file");
				continue;
			}
			Err(MdrefError::NotFound(_)) => {
				return Err(MdrefError::UnresolvedKey {
					kind: KeyKind::File,
					name: name.clone(),
				});
			}
			Err(error) => return Err(error),
		};

		result.push_str(&text[cursor..token.span.start]);
		result.push_str(&formatter.format(&content));
		cursor = token.span.end;
	}

	result.push_str(&text[cursor..]);
	Ok(result)
}
