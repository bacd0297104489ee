//! Collection of `begin-ref` / `end-ref` blocks into a [`ReferenceMap`].

use std::path::Path;

use crate::KeyKind;
use crate::MdrefError;
use crate::MdrefResult;
use crate::ReferenceMap;
use crate::files::get_file_content;
use crate::lexer::strip_comments;
use crate::parser::BlockScanner;
use crate::scope::Depth;
use crate::scope::ScanOptions;
use crate::scope::collect_files;
use crate::scope::normalize_line_endings;
use crate::scope::scope_root;
use crate::tokens::BlockKind;

/// Collect every reference block in `text`, left to right, on top of
/// `previous`.
///
/// A name already present in the map is a duplicate and an opening marker
/// without an `end-ref` is a parse error. HTML comments inside a body are
/// dropped before the body is stored.
pub fn collect_refs(text: &str, previous: Option<ReferenceMap>) -> MdrefResult<ReferenceMap> {
	let mut refs = previous.unwrap_or_default();
	let mut scanner = BlockScanner::new(text, BlockKind::Ref);

	while let Some(opening) = scanner.next_opening() {
		if refs.contains_key(&opening.name) {
			return Err(MdrefError::DuplicateKey {
				kind: KeyKind::Reference,
				name: opening.name,
			});
		}

		let block = scanner.close(opening)?;
		let body = strip_comments(&text[block.body()]);
		refs.insert_unique(block.name, body)?;
	}

	Ok(refs)
}

/// Collect reference blocks from every file with extension `ext` under
/// `dir`, descending `depth` levels.
pub fn collect_refs_in_directory(
	dir: &Path,
	ext: &str,
	depth: Depth,
	previous: Option<ReferenceMap>,
) -> MdrefResult<ReferenceMap> {
	collect_refs_in_directory_with_options(dir, depth, &ScanOptions::new(ext), previous)
}

/// Like [`collect_refs_in_directory`] with full [`ScanOptions`].
pub fn collect_refs_in_directory_with_options(
	dir: &Path,
	depth: Depth,
	options: &ScanOptions,
	previous: Option<ReferenceMap>,
) -> MdrefResult<ReferenceMap> {
	let mut refs = previous.unwrap_or_default();

	for file in collect_files(dir, depth, options)? {
		let content = normalize_line_endings(&get_file_content(&file)?.text);
		let before = refs.len();
		refs = collect_refs(&content, Some(refs))?;
		tracing::debug!(
			file = %file.display(),
			count = refs.len() - before,
			"collected references"
		);
	}

	Ok(refs)
}

/// Collect the references visible from `file`: walk up `depth_up`
/// directories from its parent, then scan `depth_down` levels down from
/// there. Each step up widens a bounded `depth_down` by one level.
pub fn collect_refs_around(
	file: &Path,
	ext: &str,
	depth_up: usize,
	depth_down: Depth,
) -> MdrefResult<ReferenceMap> {
	collect_refs_around_with_options(file, depth_up, depth_down, &ScanOptions::new(ext))
}

/// Like [`collect_refs_around`] with full [`ScanOptions`].
pub fn collect_refs_around_with_options(
	file: &Path,
	depth_up: usize,
	depth_down: Depth,
	options: &ScanOptions,
) -> MdrefResult<ReferenceMap> {
	let (root, depth) = scope_root(file, depth_up, depth_down);
	collect_refs_in_directory_with_options(&root, depth, options, None)
}
