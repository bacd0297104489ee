use std::ops::Range;

use logos::Logos;

use crate::tokens::BlockKind;
use crate::tokens::Directive;
use crate::tokens::DirectiveToken;

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

/// Raw tokens produced by logos for the body of a single HTML comment.
#[derive(Logos, Debug, PartialEq)]
enum RawToken {
	#[token("(")]
	ParenOpen,
	#[token(")")]
	ParenClose,
	#[token("=")]
	Equals,
	#[regex(r"[ \t\r\n]+")]
	Whitespace,
	/// Keywords and names share one shape: `[A-Za-z0-9_./-]+`.
	#[regex(r"[A-Za-z0-9_./-]+")]
	Word,
	#[regex(r#""([^"\\]|\\.)*""#)]
	DoubleQuotedString,
	#[regex(r"'([^'\\]|\\.)*'")]
	SingleQuotedString,
}

/// A significant token with its text borrowed from the comment body.
#[derive(Debug)]
enum Lexeme<'a> {
	Word(&'a str),
	ParenOpen,
	ParenClose,
	Equals,
	Quoted {
		quote: char,
		inner: &'a str,
		span: Range<usize>,
	},
	Unknown,
}

/// Walks the logos token stream of one comment body and classifies it as a
/// directive. Whitespace is dropped; anything logos cannot match becomes
/// [`Lexeme::Unknown`] and invalidates every shape except the free-form tail
/// of `include-file`.
struct CommentWalker<'a> {
	/// The comment body, without the `<!--` and `-->` delimiters.
	body: &'a str,
	/// Byte offset of `body` in the whole document.
	offset: usize,
	lexemes: Vec<Lexeme<'a>>,
}

impl<'a> CommentWalker<'a> {
	fn new(body: &'a str, offset: usize) -> Self {
		Self {
			body,
			offset,
			lexemes: Vec::new(),
		}
	}

	fn process(&mut self) {
		for (result, span) in RawToken::lexer(self.body).spanned() {
			let slice = &self.body[span.clone()];
			let lexeme = match result {
				Ok(RawToken::Whitespace) => continue,
				Ok(RawToken::Word) => Lexeme::Word(slice),
				Ok(RawToken::ParenOpen) => Lexeme::ParenOpen,
				Ok(RawToken::ParenClose) => Lexeme::ParenClose,
				Ok(RawToken::Equals) => Lexeme::Equals,
				Ok(RawToken::DoubleQuotedString) => self.quoted('"', slice, span),
				Ok(RawToken::SingleQuotedString) => self.quoted('\'', slice, span),
				Err(()) => Lexeme::Unknown,
			};
			self.lexemes.push(lexeme);
		}
	}

	fn quoted(&self, quote: char, slice: &'a str, span: Range<usize>) -> Lexeme<'a> {
		Lexeme::Quoted {
			quote,
			inner: &slice[1..slice.len() - 1],
			span: (span.start + self.offset)..(span.end + self.offset),
		}
	}

	fn into_directive(self) -> Option<Directive> {
		match self.lexemes.as_slice() {
			[Lexeme::Word(keyword)] => {
				BlockKind::from_end_keyword(keyword).map(|kind| Directive::End { kind })
			}
			[
				Lexeme::Word("var"),
				Lexeme::ParenOpen,
				Lexeme::Word(name),
				Lexeme::ParenClose,
				Lexeme::Equals,
				Lexeme::Quoted { quote, inner, span },
			] => {
				Some(Directive::Var {
					name: (*name).to_string(),
					quote: *quote,
					raw_value: (*inner).to_string(),
					value_span: span.clone(),
				})
			}
			[
				Lexeme::Word("include-file"),
				Lexeme::ParenOpen,
				Lexeme::Word(name),
				Lexeme::ParenClose,
				..,
			] => {
				Some(Directive::IncludeFile {
					name: (*name).to_string(),
				})
			}
			[
				Lexeme::Word(keyword),
				Lexeme::ParenOpen,
				Lexeme::Word(name),
				Lexeme::ParenClose,
			] => {
				BlockKind::from_begin_keyword(keyword).map(|kind| {
					Directive::Begin {
						kind,
						name: (*name).to_string(),
					}
				})
			}
			_ => None,
		}
	}
}

/// Find the byte spans of all HTML comments in `source`, in order.
///
/// A comment ends at the first `-->` after its opener. When the body holds
/// another `<!--`, the innermost opener starts the comment. A `var`
/// declaration is the exception: its quoted value may hold `<!--` and `-->`,
/// so the comment ends at the first `-->` after the closing quote. An opener
/// without a closer ends the scan.
pub(crate) fn comment_spans(source: &str) -> Vec<Range<usize>> {
	let mut spans = Vec::new();
	let mut cursor = 0;

	while let Some(found) = source[cursor..].find(COMMENT_OPEN) {
		let mut open = cursor + found;
		if let Some(end) = var_declaration_end(source, open) {
			spans.push(open..end);
			cursor = end;
			continue;
		}

		let body_start = open + COMMENT_OPEN.len();
		let Some(close) = source[body_start..].find(COMMENT_CLOSE) else {
			break;
		};
		let close = body_start + close;

		let nested_var = source[body_start..close]
			.match_indices(COMMENT_OPEN)
			.map(|(index, _)| body_start + index)
			.find_map(|start| var_declaration_end(source, start).map(|end| start..end));
		if let Some(span) = nested_var {
			cursor = span.end;
			spans.push(span);
			continue;
		}

		if let Some(inner) = source[body_start..close].rfind(COMMENT_OPEN) {
			open = body_start + inner;
		}

		let end = close + COMMENT_CLOSE.len();
		spans.push(open..end);
		cursor = end;
	}

	spans
}

/// Match `<!-- var(name)=<quoted> -->` starting at `open` and return the
/// byte offset just past its `-->`.
fn var_declaration_end(source: &str, open: usize) -> Option<usize> {
	let bytes = source.as_bytes();
	let mut pos = skip_whitespace(bytes, open + COMMENT_OPEN.len());
	pos = expect_literal(bytes, pos, b"var")?;
	pos = expect_literal(bytes, skip_whitespace(bytes, pos), b"(")?;
	pos = skip_whitespace(bytes, pos);

	let name_start = pos;
	while bytes.get(pos).is_some_and(|byte| is_name_byte(*byte)) {
		pos += 1;
	}
	if pos == name_start {
		return None;
	}

	pos = expect_literal(bytes, skip_whitespace(bytes, pos), b")")?;
	pos = expect_literal(bytes, skip_whitespace(bytes, pos), b"=")?;
	pos = skip_whitespace(bytes, pos);

	let quote = *bytes.get(pos).filter(|byte| matches!(byte, b'"' | b'\''))?;
	pos += 1;
	loop {
		match *bytes.get(pos)? {
			b'\\' if bytes.get(pos + 1).is_some_and(|byte| *byte != b'\n') => pos += 2,
			b'\\' => return None,
			byte if byte == quote => break,
			_ => pos += 1,
		}
	}

	let pos = skip_whitespace(bytes, pos + 1);
	expect_literal(bytes, pos, COMMENT_CLOSE.as_bytes())
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
	while bytes
		.get(pos)
		.is_some_and(|byte| matches!(byte, b' ' | b'\t' | b'\r' | b'\n'))
	{
		pos += 1;
	}
	pos
}

fn expect_literal(bytes: &[u8], pos: usize, literal: &[u8]) -> Option<usize> {
	bytes
		.get(pos..)
		.filter(|rest| rest.starts_with(literal))
		.map(|_| pos + literal.len())
}

fn is_name_byte(byte: u8) -> bool {
	byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'.' | b'/' | b'-')
}

/// Tokenize `source` into the directive markers it contains, in document
/// order. HTML comments that are not directives are skipped.
pub fn tokenize(source: &str) -> Vec<DirectiveToken> {
	comment_spans(source)
		.into_iter()
		.filter_map(|span| {
			let body_start = span.start + COMMENT_OPEN.len();
			let body_end = span.end - COMMENT_CLOSE.len();
			let mut walker = CommentWalker::new(&source[body_start..body_end], body_start);
			walker.process();
			walker
				.into_directive()
				.map(|directive| DirectiveToken { directive, span })
		})
		.collect()
}

/// Remove every HTML comment from `source`. An unterminated opener and
/// everything after it is kept.
pub fn strip_comments(source: &str) -> String {
	let mut result = String::with_capacity(source.len());
	let mut cursor = 0;

	for span in comment_spans(source) {
		result.push_str(&source[cursor..span.start]);
		cursor = span.end;
	}

	result.push_str(&source[cursor..]);
	result
}

/// Whether `name` is a valid reference, variable or include-file name.
pub fn is_valid_name(name: &str) -> bool {
	!name.is_empty()
		&& name
			.chars()
			.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '/' | '-'))
}

/// Decode a raw variable value. `\"`, `\'`, `\\`, `\n` and `\t` are
/// recognized; any other backslash sequence is kept as written.
pub fn unescape_value(raw: &str) -> String {
	if !raw.contains('\\') {
		return raw.to_string();
	}

	let mut value = String::with_capacity(raw.len());
	let mut chars = raw.chars();

	while let Some(ch) = chars.next() {
		if ch != '\\' {
			value.push(ch);
			continue;
		}

		match chars.next() {
			Some('"') => value.push('"'),
			Some('\'') => value.push('\''),
			Some('\\') => value.push('\\'),
			Some('n') => value.push('\n'),
			Some('t') => value.push('\t'),
			Some(other) => {
				value.push('\\');
				value.push(other);
			}
			None => value.push('\\'),
		}
	}

	value
}

/// Encode a logical value for a declaration quoted with `quote`. This is the
/// inverse of [`unescape_value`]; the other quote character is left alone.
pub fn escape_value(value: &str, quote: char) -> String {
	let mut raw = String::with_capacity(value.len() + 2);

	for ch in value.chars() {
		match ch {
			'\\' => raw.push_str("\\\\"),
			'\n' => raw.push_str("\\n"),
			'\t' => raw.push_str("\\t"),
			ch if ch == quote => {
				raw.push('\\');
				raw.push(ch);
			}
			ch => raw.push(ch),
		}
	}

	raw
}
