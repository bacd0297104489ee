use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::IncludeMode;
use crate::MdrefError;
use crate::MdrefResult;
use crate::rewriter::DEFAULT_BOX_PREFIX;
use crate::scope::DEFAULT_EXTENSION;
use crate::scope::Depth;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["mdref.toml", ".mdref.toml", ".config/mdref.toml"];

/// Configuration loaded from `mdref.toml`.
///
/// ```toml
/// extension = "md"
/// depth_up = 0
/// depth_down = -1
/// backup = false
/// error_if_missing = true
///
/// [include]
/// mode = "box"
/// box_prefix = "> "
/// search_folders = ["includes"]
/// include_cwd = true
///
/// [exclude]
/// patterns = ["drafts/", "*.draft.md"]
/// ```
///
/// Every key is optional. Command line flags take precedence over the
/// values here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MdrefConfig {
	/// Extension of the files that are processed and scanned, without the
	/// leading dot.
	#[serde(default = "default_extension")]
	pub extension: String,
	/// How many directories above a processed file the scan for references
	/// and variables starts.
	#[serde(default)]
	pub depth_up: usize,
	/// How many levels the scan descends from its starting directory. `-1`
	/// is unlimited.
	#[serde(default)]
	pub depth_down: Depth,
	/// Copy each file to a timestamped `.bak` file before rewriting it.
	#[serde(default)]
	pub backup: bool,
	/// Fail on unresolved references, variables and include files instead of
	/// leaving them untouched.
	#[serde(default = "default_true")]
	pub error_if_missing: bool,
	#[serde(default)]
	pub include: IncludeConfig,
	#[serde(default)]
	pub exclude: ExcludeConfig,
}

impl Default for MdrefConfig {
	fn default() -> Self {
		Self {
			extension: default_extension(),
			depth_up: 0,
			depth_down: Depth::Unlimited,
			backup: false,
			error_if_missing: true,
			include: IncludeConfig::default(),
			exclude: ExcludeConfig::default(),
		}
	}
}

/// Settings for `include-file` directives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IncludeConfig {
	/// How included content is rendered.
	#[serde(default)]
	pub mode: IncludeMode,
	/// Line prefix used by the `box` mode.
	#[serde(default = "default_box_prefix")]
	pub box_prefix: String,
	/// Folders searched for included files, relative to the directory of
	/// the file being processed. That directory itself is always searched
	/// first.
	#[serde(default)]
	pub search_folders: Vec<PathBuf>,
	/// Also search the current working directory, after the search folders.
	#[serde(default = "default_true")]
	pub include_cwd: bool,
}

impl Default for IncludeConfig {
	fn default() -> Self {
		Self {
			mode: IncludeMode::default(),
			box_prefix: default_box_prefix(),
			search_folders: Vec::new(),
			include_cwd: true,
		}
	}
}

/// Paths skipped by directory scans.
///
/// Patterns follow gitignore syntax, relative to the scan root, including
/// negation (`!pattern`) and directory markers (trailing `/`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExcludeConfig {
	#[serde(default)]
	pub patterns: Vec<String>,
}

fn default_extension() -> String {
	DEFAULT_EXTENSION.to_string()
}

fn default_box_prefix() -> String {
	DEFAULT_BOX_PREFIX.to_string()
}

fn default_true() -> bool {
	true
}

impl MdrefConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> MdrefResult<Option<MdrefConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::parse(&content)?;
		tracing::debug!(path = %config_path.display(), "loaded config");

		Ok(Some(config))
	}

	/// Parse config file contents.
	pub fn parse(content: &str) -> MdrefResult<MdrefConfig> {
		let config: MdrefConfig =
			toml::from_str(content).map_err(|e| MdrefError::ConfigParse(e.to_string()))?;

		if config.extension.trim().trim_start_matches('.').is_empty() {
			return Err(MdrefError::ConfigParse(
				"`extension` must not be empty".to_string(),
			));
		}

		Ok(config)
	}
}
