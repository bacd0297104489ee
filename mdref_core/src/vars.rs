//! The variable store: `<!-- var(name)="value" -->` declarations read from
//! and written back into the markdown text itself.

use std::path::Path;

use crate::MdrefError;
use crate::MdrefResult;
use crate::VariableMap;
use crate::files::get_file_content;
use crate::lexer::escape_value;
use crate::lexer::is_valid_name;
use crate::lexer::tokenize;
use crate::lexer::unescape_value;
use crate::scope::Depth;
use crate::scope::ScanOptions;
use crate::scope::collect_files;
use crate::scope::normalize_line_endings;
use crate::scope::scope_root;
use crate::tokens::Directive;
use crate::tokens::DirectiveToken;

/// Collect every variable declaration in `text`, left to right, on top of
/// `previous`. Declaring a name twice is an error.
pub fn get_vars(text: &str, previous: Option<VariableMap>) -> MdrefResult<VariableMap> {
	let mut vars = previous.unwrap_or_default();

	for token in tokenize(text) {
		if let Directive::Var {
			name, raw_value, ..
		} = token.directive
		{
			vars.insert_unique(name, unescape_value(&raw_value))?;
		}
	}

	Ok(vars)
}

/// The decoded value of the first declaration of `name` in `text`.
pub fn get_var(text: &str, name: &str) -> Option<String> {
	tokenize(text)
		.into_iter()
		.find_map(|token| {
			match token.directive {
				Directive::Var {
					name: var_name,
					raw_value,
					..
				} if var_name == name => Some(unescape_value(&raw_value)),
				_ => None,
			}
		})
}

/// Set `name` to `value` in `text`.
///
/// Existing declarations keep their place and quote style; only the quoted
/// value is rewritten. A new declaration goes right after the last
/// `include-file` marker, or at the top of the text, followed by one blank
/// line.
pub fn set_var(text: &str, name: &str, value: &str) -> MdrefResult<String> {
	check_name(name)?;

	let tokens = tokenize(text);
	let declarations: Vec<(&DirectiveToken, char)> = tokens
		.iter()
		.filter_map(|token| {
			match &token.directive {
				Directive::Var {
					name: var_name,
					quote,
					..
				} if var_name == name => Some((token, *quote)),
				_ => None,
			}
		})
		.collect();

	if declarations.is_empty() {
		return Ok(insert_declaration(text, &tokens, name, value));
	}

	let mut result = String::with_capacity(text.len() + value.len());
	let mut cursor = 0;
	for (token, quote) in declarations {
		let Directive::Var { value_span, .. } = &token.directive else {
			continue;
		};
		result.push_str(&text[cursor..value_span.start]);
		result.push(quote);
		result.push_str(&escape_value(value, quote));
		result.push(quote);
		cursor = value_span.end;
	}
	result.push_str(&text[cursor..]);

	Ok(result)
}

/// Remove every declaration of `name` from `text`. Only the declaration
/// comments themselves are removed.
pub fn del_var(text: &str, name: &str) -> MdrefResult<String> {
	check_name(name)?;

	let mut result = String::with_capacity(text.len());
	let mut cursor = 0;
	for token in tokenize(text) {
		if matches!(&token.directive, Directive::Var { name: var_name, .. } if var_name == name) {
			result.push_str(&text[cursor..token.span.start]);
			cursor = token.span.end;
		}
	}
	result.push_str(&text[cursor..]);

	Ok(result)
}

/// Render a new declaration with double quotes.
pub fn format_declaration(name: &str, value: &str) -> String {
	format!("<!-- var({name})=\"{}\" -->", escape_value(value, '"'))
}

fn insert_declaration(text: &str, tokens: &[DirectiveToken], name: &str, value: &str) -> String {
	let declaration = format_declaration(name, value);
	let insert_at = tokens
		.iter()
		.rev()
		.find(|token| matches!(token.directive, Directive::IncludeFile { .. }))
		.map(|token| token.span.end);

	let (head, rest) = match insert_at {
		Some(offset) => text.split_at(offset),
		None => ("", text),
	};

	let mut result = String::with_capacity(text.len() + declaration.len() + 3);
	result.push_str(head);
	if !head.is_empty() {
		result.push('\n');
	}
	result.push_str(&declaration);
	if rest.is_empty() || rest.starts_with('\n') {
		result.push('\n');
	} else {
		result.push_str("\n\n");
	}
	result.push_str(rest);

	result
}

fn check_name(name: &str) -> MdrefResult<()> {
	if is_valid_name(name) {
		Ok(())
	} else {
		Err(MdrefError::validation(format!(
			"invalid variable name `{name}`: use letters, digits, `_`, `-`, `.` or `/`"
		)))
	}
}

/// Collect variable declarations from every file with extension `ext` under
/// `dir`, descending `depth` levels. Names must be unique across the scan.
pub fn get_vars_in_directory(
	dir: &Path,
	ext: &str,
	depth: Depth,
	previous: Option<VariableMap>,
) -> MdrefResult<VariableMap> {
	get_vars_in_directory_with_options(dir, depth, &ScanOptions::new(ext), previous)
}

/// Like [`get_vars_in_directory`] with full [`ScanOptions`].
pub fn get_vars_in_directory_with_options(
	dir: &Path,
	depth: Depth,
	options: &ScanOptions,
	previous: Option<VariableMap>,
) -> MdrefResult<VariableMap> {
	let mut vars = previous.unwrap_or_default();

	for file in collect_files(dir, depth, options)? {
		let content = normalize_line_endings(&get_file_content(&file)?.text);
		let before = vars.len();
		vars = get_vars(&content, Some(vars))?;
		tracing::debug!(
			file = %file.display(),
			count = vars.len() - before,
			"collected variables"
		);
	}

	Ok(vars)
}

/// Collect the variables visible from `file`, scoped the same way as
/// [`collect_refs_around`](crate::collect_refs_around).
pub fn get_vars_around(
	file: &Path,
	ext: &str,
	depth_up: usize,
	depth_down: Depth,
) -> MdrefResult<VariableMap> {
	get_vars_around_with_options(file, depth_up, depth_down, &ScanOptions::new(ext))
}

/// Like [`get_vars_around`] with full [`ScanOptions`].
pub fn get_vars_around_with_options(
	file: &Path,
	depth_up: usize,
	depth_down: Depth,
	options: &ScanOptions,
) -> MdrefResult<VariableMap> {
	let (root, depth) = scope_root(file, depth_up, depth_down);
	get_vars_in_directory_with_options(&root, depth, options, None)
}
