//! Scan scopes: how far a directory walk reaches and which files it reads.

use std::collections::HashSet;
use std::fmt::Display;
use std::path::Path;
use std::path::PathBuf;

use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;
use serde::Deserialize;
use serde::Serialize;

use crate::MdrefError;
use crate::MdrefResult;

/// Default extension of scanned files.
pub const DEFAULT_EXTENSION: &str = "md";

/// How many directory levels a scan descends.
///
/// The integer form used in config files and on the command line is `-1`
/// for [`Depth::Unlimited`] and `n >= 0` for [`Depth::Levels`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Depth {
	/// Descend into every subdirectory.
	#[default]
	Unlimited,
	/// Descend at most this many levels; `0` scans the directory itself only.
	Levels(usize),
}

impl Depth {
	/// Whether the scan must stop at the current directory.
	pub fn is_exhausted(self) -> bool {
		self == Self::Levels(0)
	}

	/// The depth left for a subdirectory.
	#[must_use]
	pub fn descend(self) -> Self {
		match self {
			Self::Unlimited => Self::Unlimited,
			Self::Levels(levels) => Self::Levels(levels.saturating_sub(1)),
		}
	}

	/// The depth needed to keep the same reach from one directory higher.
	#[must_use]
	pub fn ascend(self) -> Self {
		match self {
			Self::Unlimited => Self::Unlimited,
			Self::Levels(levels) => Self::Levels(levels + 1),
		}
	}
}

impl TryFrom<i64> for Depth {
	type Error = MdrefError;

	fn try_from(value: i64) -> Result<Self, Self::Error> {
		match value {
			-1 => Ok(Self::Unlimited),
			levels if levels >= 0 => Ok(Self::Levels(levels as usize)),
			other => {
				Err(MdrefError::validation(format!(
					"depth must be -1 (unlimited) or a non-negative number, got {other}"
				)))
			}
		}
	}
}

impl From<Depth> for i64 {
	fn from(depth: Depth) -> Self {
		match depth {
			Depth::Unlimited => -1,
			Depth::Levels(levels) => levels as i64,
		}
	}
}

impl std::str::FromStr for Depth {
	type Err = MdrefError;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		let parsed: i64 = value
			.trim()
			.parse()
			.map_err(|_| MdrefError::validation(format!("invalid depth `{value}`")))?;
		Self::try_from(parsed)
	}
}

impl Display for Depth {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", i64::from(*self))
	}
}

/// Options controlling which files a directory scan reads.
#[derive(Debug, Clone)]
pub struct ScanOptions {
	/// File extension without the leading dot, e.g. `md` or `t.md`.
	pub extension: String,
	/// Gitignore-style patterns, relative to the scan root, for files and
	/// directories to skip.
	pub exclude_patterns: Vec<String>,
}

impl Default for ScanOptions {
	fn default() -> Self {
		Self::new(DEFAULT_EXTENSION)
	}
}

impl ScanOptions {
	pub fn new(extension: impl AsRef<str>) -> Self {
		Self {
			extension: normalize_extension(extension.as_ref()),
			exclude_patterns: Vec::new(),
		}
	}

	#[must_use]
	pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
		self.exclude_patterns = patterns;
		self
	}

	/// Whether `path` carries the configured extension.
	pub fn matches_extension(&self, path: &Path) -> bool {
		path.file_name()
			.and_then(|name| name.to_str())
			.and_then(|name| name.strip_suffix(self.extension.as_str()))
			.is_some_and(|stem| stem.len() > 1 && stem.ends_with('.'))
	}

	fn validate(&self) -> MdrefResult<()> {
		if self.extension.is_empty() {
			return Err(MdrefError::validation("file extension must not be empty"));
		}
		Ok(())
	}
}

/// Strip a leading dot so `.md` and `md` mean the same thing.
pub fn normalize_extension(extension: &str) -> String {
	extension.trim().trim_start_matches('.').to_string()
}

/// Walk up `depth_up` directories from the parent of `file`, widening a
/// bounded `depth_down` by one level per step so the scan still reaches the
/// same descendants. Relative paths are resolved against the current
/// directory first. Stops early at the filesystem root.
pub fn scope_root(file: &Path, depth_up: usize, depth_down: Depth) -> (PathBuf, Depth) {
	let file = std::path::absolute(file).unwrap_or_else(|_| file.to_path_buf());
	let mut dir = file
		.parent()
		.filter(|parent| !parent.as_os_str().is_empty())
		.map_or_else(|| PathBuf::from("."), Path::to_path_buf);

	let mut depth = depth_down;
	for _ in 0..depth_up {
		let Some(parent) = dir.parent() else {
			break;
		};
		dir = parent.to_path_buf();
		depth = depth.ascend();
	}

	(dir, depth)
}

/// Collect the files a scan of `root` reads, in visiting order: the matching
/// files of a directory sorted by name, then each subdirectory in sorted
/// order while depth remains.
pub fn collect_files(root: &Path, depth: Depth, options: &ScanOptions) -> MdrefResult<Vec<PathBuf>> {
	options.validate()?;
	if !root.is_dir() {
		return Err(MdrefError::NotFound(root.display().to_string()));
	}

	let exclude = build_exclude_matcher(root, &options.exclude_patterns)?;
	let mut files = Vec::new();
	let mut visited_dirs = HashSet::new();
	walk_dir(
		root,
		depth,
		options,
		&exclude,
		&mut files,
		&mut visited_dirs,
	)?;

	Ok(files)
}

fn build_exclude_matcher(root: &Path, patterns: &[String]) -> MdrefResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			MdrefError::ConfigParse(format!("invalid exclude pattern `{pattern}`: {e}"))
		})?;
	}
	builder
		.build()
		.map_err(|e| MdrefError::ConfigParse(format!("failed to build exclude rules: {e}")))
}

fn walk_dir(
	dir: &Path,
	depth: Depth,
	options: &ScanOptions,
	exclude: &Gitignore,
	files: &mut Vec<PathBuf>,
	visited_dirs: &mut HashSet<PathBuf>,
) -> MdrefResult<()> {
	// Detect symlink cycles by tracking canonical paths.
	let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
	if !visited_dirs.insert(canonical) {
		return Err(MdrefError::SymlinkCycle {
			path: dir.display().to_string(),
		});
	}

	let mut entries = std::fs::read_dir(dir)?
		.map(|entry| entry.map(|entry| entry.path()))
		.collect::<Result<Vec<_>, _>>()?;
	entries.sort();

	let mut subdirs = Vec::new();
	for path in entries {
		let is_dir = path.is_dir();
		if exclude.matched(&path, is_dir).is_ignore() {
			continue;
		}

		if is_dir {
			subdirs.push(path);
		} else if options.matches_extension(&path) {
			files.push(path);
		}
	}

	if depth.is_exhausted() {
		return Ok(());
	}

	for subdir in subdirs {
		walk_dir(
			&subdir,
			depth.descend(),
			options,
			exclude,
			files,
			visited_dirs,
		)?;
	}

	Ok(())
}

/// Normalize CRLF line endings to LF.
pub fn normalize_line_endings(content: &str) -> String {
	if content.contains('\r') {
		content.replace("\r\n", "\n").replace('\r', "\n")
	} else {
		content.to_string()
	}
}
