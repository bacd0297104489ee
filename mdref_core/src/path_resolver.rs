use std::path::Path;
use std::path::PathBuf;

use crate::MdrefError;
use crate::MdrefResult;

/// Locate `name` by probing `start/../*level/relative/name` for every start
/// point, ancestor level `0..=max_up` and relative subpath, in that nesting
/// order. The first existing candidate wins.
///
/// Relative subpaths must be relative; an empty `relative_paths` list
/// probes the ancestor directories themselves.
pub fn find_file<S, R>(
	name: &str,
	start_points: &[S],
	relative_paths: &[R],
	max_up: usize,
) -> MdrefResult<PathBuf>
where
	S: AsRef<Path>,
	R: AsRef<Path>,
{
	probe(name, start_points, relative_paths, max_up, Path::exists)
}

/// Like [`find_file`], but only regular files count as a hit. A directory
/// named `name` does not hide a file in a later candidate.
pub fn find_regular_file<S, R>(
	name: &str,
	start_points: &[S],
	relative_paths: &[R],
	max_up: usize,
) -> MdrefResult<PathBuf>
where
	S: AsRef<Path>,
	R: AsRef<Path>,
{
	probe(name, start_points, relative_paths, max_up, Path::is_file)
}

fn probe<S, R>(
	name: &str,
	start_points: &[S],
	relative_paths: &[R],
	max_up: usize,
	accept: fn(&Path) -> bool,
) -> MdrefResult<PathBuf>
where
	S: AsRef<Path>,
	R: AsRef<Path>,
{
	if name.trim().is_empty() {
		return Err(MdrefError::validation("file name must not be empty"));
	}

	if let Some(absolute) = relative_paths
		.iter()
		.map(AsRef::as_ref)
		.find(|path| path.is_absolute() || path.has_root())
	{
		return Err(MdrefError::validation(format!(
			"search path `{}` must be relative",
			absolute.display()
		)));
	}

	let here = [Path::new("")];
	let relative_paths: Vec<&Path> = if relative_paths.is_empty() {
		here.to_vec()
	} else {
		relative_paths.iter().map(AsRef::as_ref).collect()
	};

	for start in start_points {
		let mut dir = start.as_ref().to_path_buf();

		for level in 0..=max_up {
			if level > 0 {
				dir.push("..");
			}
			for relative in &relative_paths {
				let candidate = dir.join(relative).join(name);
				tracing::trace!(candidate = %candidate.display(), level, "probing");
				if accept(&candidate) {
					return Ok(candidate);
				}
			}
		}
	}

	Err(MdrefError::NotFound(name.to_string()))
}
