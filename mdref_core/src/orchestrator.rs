//! End to end processing of a single markdown file.

use std::path::Path;
use std::path::PathBuf;

use crate::IncludeMode;
use crate::MdrefConfig;
use crate::MdrefResult;
use crate::files::FileContent;
use crate::files::check_is_file_and_correct_path;
use crate::files::create_backup;
use crate::files::get_file_content;
use crate::files::get_file_content_to_include;
use crate::files::set_file_content;
use crate::refs::collect_refs_around_with_options;
use crate::rewriter::DEFAULT_BOX_PREFIX;
use crate::rewriter::apply_include_files;
use crate::rewriter::apply_refs;
use crate::rewriter::apply_vars;
use crate::scope::DEFAULT_EXTENSION;
use crate::scope::Depth;
use crate::scope::ScanOptions;
use crate::scope::normalize_extension;
use crate::vars::get_vars_around_with_options;

/// Options for [`process_file`] and [`render_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOptions {
	/// Copy the file to a timestamped backup before overwriting it.
	pub backup: bool,
	/// Extension of processed and scanned files.
	pub extension: String,
	/// Directories to climb above the file before scanning.
	pub depth_up: usize,
	/// Levels to descend from the scan root.
	pub depth_down: Depth,
	/// Fail on unresolved directives instead of leaving them untouched.
	pub error_if_missing: bool,
	pub include_mode: IncludeMode,
	pub box_prefix: String,
	/// Include search folders, relative to the processed file's directory.
	pub search_folders: Vec<PathBuf>,
	pub include_cwd: bool,
	/// Gitignore-style patterns skipped by the reference and variable scans.
	pub exclude_patterns: Vec<String>,
}

impl Default for ProcessOptions {
	fn default() -> Self {
		Self {
			backup: false,
			extension: DEFAULT_EXTENSION.to_string(),
			depth_up: 0,
			depth_down: Depth::Unlimited,
			error_if_missing: true,
			include_mode: IncludeMode::Raw,
			box_prefix: DEFAULT_BOX_PREFIX.to_string(),
			search_folders: Vec::new(),
			include_cwd: true,
			exclude_patterns: Vec::new(),
		}
	}
}

impl ProcessOptions {
	/// Build options from an optional config, falling back to defaults.
	pub fn from_config(config: Option<&MdrefConfig>) -> Self {
		let Some(config) = config else {
			return Self::default();
		};

		Self {
			backup: config.backup,
			extension: normalize_extension(&config.extension),
			depth_up: config.depth_up,
			depth_down: config.depth_down,
			error_if_missing: config.error_if_missing,
			include_mode: config.include.mode,
			box_prefix: config.include.box_prefix.clone(),
			search_folders: config.include.search_folders.clone(),
			include_cwd: config.include.include_cwd,
			exclude_patterns: config.exclude.patterns.clone(),
		}
	}

	fn scan_options(&self) -> ScanOptions {
		ScanOptions::new(&self.extension).with_exclude_patterns(self.exclude_patterns.clone())
	}
}

/// Outcome of [`process_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessReport {
	/// Absolute path of the processed file.
	pub path: PathBuf,
	/// Whether the file content changed and was written.
	pub changed: bool,
	/// Backup written before the file was overwritten.
	pub backup: Option<PathBuf>,
}

struct Rendered {
	path: PathBuf,
	original: FileContent,
	output: String,
}

/// Compute the processed content of `file` without writing anything.
pub fn render_file(file: &Path, options: &ProcessOptions) -> MdrefResult<String> {
	Ok(render(file, options)?.output)
}

/// Resolve every directive in `file` and write the result back.
///
/// Include files are expanded first, then variable blocks, then include
/// blocks. Nothing is written unless every step succeeds, and nothing is
/// written at all when the content is unchanged. The backup, when
/// requested, is taken right before the atomic write.
pub fn process_file(file: &Path, options: &ProcessOptions) -> MdrefResult<ProcessReport> {
	let Rendered {
		path,
		original,
		output,
	} = render(file, options)?;

	if output == original.text {
		tracing::debug!(path = %path.display(), "unchanged");
		return Ok(ProcessReport {
			path,
			changed: false,
			backup: None,
		});
	}

	let backup = if options.backup {
		Some(create_backup(&path)?)
	} else {
		None
	};
	set_file_content(&path, &output, original.bom)?;
	tracing::info!(path = %path.display(), "updated");

	Ok(ProcessReport {
		path,
		changed: true,
		backup,
	})
}

fn render(file: &Path, options: &ProcessOptions) -> MdrefResult<Rendered> {
	let path = check_is_file_and_correct_path(file, &options.extension)?;
	let original = get_file_content(&path)?;
	let dir = path
		.parent()
		.map_or_else(|| PathBuf::from("."), Path::to_path_buf);

	let mut search_folders = vec![dir.clone()];
	search_folders.extend(options.search_folders.iter().map(|folder| dir.join(folder)));
	let formatter = options.include_mode.formatter(&options.box_prefix);
	let text = apply_include_files(
		&original.text,
		|name| get_file_content_to_include(name, &search_folders, options.include_cwd),
		formatter.as_ref(),
		options.error_if_missing,
	)?;

	let scan = options.scan_options();
	let vars = get_vars_around_with_options(&path, options.depth_up, options.depth_down, &scan)?;
	let text = apply_vars(&text, &vars, options.error_if_missing)?;

	let refs = collect_refs_around_with_options(&path, options.depth_up, options.depth_down, &scan)?;
	let output = apply_refs(&text, &refs, options.error_if_missing)?;

	Ok(Rendered {
		path,
		original,
		output,
	})
}
