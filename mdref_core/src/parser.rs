use std::ops::Range;

use crate::MdrefError;
use crate::MdrefResult;
use crate::lexer::tokenize;
use crate::tokens::BlockKind;
use crate::tokens::DirectiveToken;
use crate::tokens::line_of;

/// An opening `begin-<kind>(name)` marker found by a [`BlockScanner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opening {
	pub name: String,
	/// Byte span of the opening comment.
	pub span: Range<usize>,
}

/// A fully matched block: opening marker, closing marker and the body
/// between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
	pub kind: BlockKind,
	pub name: String,
	/// Byte span of the opening comment.
	pub opening: Range<usize>,
	/// Byte span of the closing comment.
	pub closing: Range<usize>,
}

impl Block {
	/// Byte span of the content between the two markers.
	pub fn body(&self) -> Range<usize> {
		self.opening.end..self.closing.start
	}
}

/// Forward-only scanner over the blocks of one kind in a text buffer.
///
/// The scanner finds the next opening marker, then the first closing marker
/// after it. Markers of other kinds are ignored, and so is anything between
/// an opening and its closing marker.
pub struct BlockScanner<'a> {
	source: &'a str,
	kind: BlockKind,
	tokens: Vec<DirectiveToken>,
	cursor: usize,
}

impl<'a> BlockScanner<'a> {
	pub fn new(source: &'a str, kind: BlockKind) -> Self {
		Self {
			source,
			kind,
			tokens: tokenize(source),
			cursor: 0,
		}
	}

	/// Advance to the next opening marker of this scanner's kind.
	pub fn next_opening(&mut self) -> Option<Opening> {
		while let Some(token) = self.tokens.get(self.cursor) {
			self.cursor += 1;
			if let Some(name) = token.opening_name(self.kind) {
				return Some(Opening {
					name: name.to_string(),
					span: token.span.clone(),
				});
			}
		}

		None
	}

	/// Find the closing marker for `opening` and move past it.
	pub fn close(&mut self, opening: Opening) -> MdrefResult<Block> {
		while let Some(token) = self.tokens.get(self.cursor) {
			self.cursor += 1;
			if token.is_closing(self.kind) {
				return Ok(Block {
					kind: self.kind,
					name: opening.name,
					opening: opening.span,
					closing: token.span.clone(),
				});
			}
		}

		Err(MdrefError::MissingEndMarker {
			kind: self.kind,
			name: opening.name,
			line: line_of(self.source, opening.span.start),
		})
	}
}

/// Parse every block of `kind` in `source`, failing on the first opening
/// marker without a closing marker.
pub fn parse_blocks(source: &str, kind: BlockKind) -> MdrefResult<Vec<Block>> {
	let mut scanner = BlockScanner::new(source, kind);
	let mut blocks = Vec::new();

	while let Some(opening) = scanner.next_opening() {
		blocks.push(scanner.close(opening)?);
	}

	Ok(blocks)
}
