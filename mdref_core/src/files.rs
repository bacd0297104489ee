//! File helpers consumed by the engine: BOM-aware reads, atomic writes,
//! timestamped backups, path checks and sandboxed include lookup.

use std::io::Write;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use tempfile::Builder;

use crate::MdrefError;
use crate::MdrefResult;
use crate::path_resolver::find_regular_file;
use crate::scope::ScanOptions;

const BOM: char = '\u{feff}';

/// Text content of a file together with whether it started with a UTF-8
/// byte order mark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
	pub text: String,
	pub bom: bool,
}

/// Read a UTF-8 file, stripping and recording a leading byte order mark.
pub fn get_file_content(path: &Path) -> MdrefResult<FileContent> {
	let raw = std::fs::read_to_string(path).map_err(|e| not_found_or_io(path, e))?;

	Ok(match raw.strip_prefix(BOM) {
		Some(text) => {
			FileContent {
				text: text.to_string(),
				bom: true,
			}
		}
		None => FileContent { text: raw, bom: false },
	})
}

/// Atomically write `text` to `path`, prefixing a byte order mark when
/// `bom` is set. The content goes to a temporary file in the same directory
/// that is then renamed over the target, so readers never see a partial
/// write.
pub fn set_file_content(path: &Path, text: &str, bom: bool) -> MdrefResult<PathBuf> {
	let parent = path
		.parent()
		.filter(|parent| !parent.as_os_str().is_empty())
		.map_or_else(|| PathBuf::from("."), Path::to_path_buf);
	std::fs::create_dir_all(&parent)?;

	let mut tmp = Builder::new().prefix(".mdref").tempfile_in(&parent)?;
	if bom {
		write!(tmp.as_file_mut(), "{BOM}")?;
	}
	tmp.as_file_mut().write_all(text.as_bytes())?;
	tmp.as_file_mut().sync_all()?;

	#[cfg(unix)]
	{
		use std::os::unix::fs::PermissionsExt;
		if let Ok(metadata) = std::fs::metadata(path) {
			let mode = metadata.permissions().mode();
			let _ = std::fs::set_permissions(tmp.path(), std::fs::Permissions::from_mode(mode));
		}
	}

	tmp.persist(path).map_err(|e| MdrefError::Io(e.error))?;
	Ok(path.to_path_buf())
}

/// Copy `path` to `<stem>.<YYYYMMDD-HHMMSS>.bak[.<ext>]` next to it. A
/// numeric suffix keeps backups taken within the same second apart.
pub fn create_backup(path: &Path) -> MdrefResult<PathBuf> {
	if !path.is_file() {
		return Err(MdrefError::NotFound(path.display().to_string()));
	}

	let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
	let stem = path
		.file_stem()
		.map(|stem| stem.to_string_lossy().into_owned())
		.unwrap_or_default();
	let extension = path
		.extension()
		.map(|ext| format!(".{}", ext.to_string_lossy()))
		.unwrap_or_default();

	let mut backup = path.with_file_name(format!("{stem}.{stamp}.bak{extension}"));
	let mut counter = 1;
	while backup.exists() {
		backup = path.with_file_name(format!("{stem}.{stamp}-{counter}.bak{extension}"));
		counter += 1;
	}

	std::fs::copy(path, &backup)?;
	tracing::debug!(backup = %backup.display(), "created backup");

	Ok(backup)
}

/// Check that `path` is an existing file with extension `ext` and return its
/// absolute form.
pub fn check_is_file_and_correct_path(path: &Path, ext: &str) -> MdrefResult<PathBuf> {
	if !path.is_file() {
		return Err(MdrefError::NotFound(path.display().to_string()));
	}

	let options = ScanOptions::new(ext);
	if !options.matches_extension(path) {
		return Err(MdrefError::validation(format!(
			"`{}` does not have the `.{}` extension",
			path.display(),
			options.extension
		)));
	}

	Ok(path.canonicalize()?)
}

/// Read the target of an `include-file(name)` directive.
///
/// `name` must be a relative path without `..` components. Each search
/// folder is probed in order, then the current working directory when
/// `include_cwd` is set.
pub fn get_file_content_to_include<P: AsRef<Path>>(
	name: &str,
	search_folders: &[P],
	include_cwd: bool,
) -> MdrefResult<String> {
	check_include_name(name)?;

	let mut start_points: Vec<PathBuf> = search_folders
		.iter()
		.map(|folder| folder.as_ref().to_path_buf())
		.collect();
	if include_cwd {
		start_points.push(std::env::current_dir()?);
	}

	let no_subpaths: [&Path; 0] = [];
	let path = find_regular_file(name, &start_points, &no_subpaths, 0)?;
	Ok(get_file_content(&path)?.text)
}

fn check_include_name(name: &str) -> MdrefResult<()> {
	if name.trim().is_empty() {
		return Err(MdrefError::validation("include file name must not be empty"));
	}

	let path = Path::new(name);
	if path.is_absolute() || path.has_root() {
		return Err(MdrefError::validation(format!(
			"absolute include path `{name}` is not allowed"
		)));
	}

	if path
		.components()
		.any(|component| matches!(component, Component::ParentDir))
	{
		return Err(MdrefError::validation(format!(
			"include path `{name}` must not traverse parent directories"
		)));
	}

	Ok(())
}

fn not_found_or_io(path: &Path, error: std::io::Error) -> MdrefError {
	if error.kind() == std::io::ErrorKind::NotFound {
		MdrefError::NotFound(path.display().to_string())
	} else {
		MdrefError::Io(error)
	}
}
