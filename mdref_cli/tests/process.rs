mod common;

use mdref_core::AnyEmptyResult;
use predicates::prelude::*;

const DOC: &str = "<!-- var(version)=\"1.2.0\" -->\nVersion <!-- begin-var(version) \
                   -->0.0.0<!-- end-var -->\n\n<!-- begin-include(install) -->\nold\n<!-- \
                   end-include -->\n";

const PROCESSED: &str = "<!-- var(version)=\"1.2.0\" -->\nVersion <!-- begin-var(version) \
                         -->1.2.0<!-- end-var -->\n\n<!-- begin-include(install) -->\ncargo \
                         install mdref\n<!-- end-include -->\n";

fn write_project(root: &std::path::Path) -> std::io::Result<std::path::PathBuf> {
	std::fs::write(
		root.join("shared.md"),
		"<!-- begin-ref(install) -->\ncargo install mdref\n<!-- end-ref -->\n",
	)?;
	let doc = root.join("readme.md");
	std::fs::write(&doc, DOC)?;
	Ok(doc)
}

#[test]
fn process_updates_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let doc = write_project(tmp.path())?;

	common::mdref_cmd()
		.arg("process")
		.arg(&doc)
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("Updated 1 file(s)."));

	assert_eq!(std::fs::read_to_string(&doc)?, PROCESSED);

	common::mdref_cmd()
		.arg("process")
		.arg(&doc)
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("already up to date"));

	Ok(())
}

#[test]
fn process_dry_run_does_not_write() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let doc = write_project(tmp.path())?;

	common::mdref_cmd()
		.arg("process")
		.arg(&doc)
		.arg("--dry-run")
		.arg("--diff")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("Would update"))
		.stdout(predicate::str::contains("+cargo install mdref"))
		.stdout(predicate::str::contains("-old"));

	assert_eq!(std::fs::read_to_string(&doc)?, DOC);

	Ok(())
}

#[test]
fn process_writes_backup() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let doc = write_project(tmp.path())?;

	common::mdref_cmd()
		.arg("process")
		.arg(&doc)
		.arg("--backup")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	let backups: Vec<_> = std::fs::read_dir(tmp.path())?
		.filter_map(Result::ok)
		.map(|entry| entry.file_name().to_string_lossy().into_owned())
		.filter(|name| name.starts_with("readme.") && name.ends_with(".bak.md"))
		.collect();
	assert_eq!(backups.len(), 1);
	assert_eq!(
		std::fs::read_to_string(tmp.path().join(&backups[0]))?,
		DOC
	);

	Ok(())
}

#[test]
fn process_fails_on_unresolved_reference() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let doc = tmp.path().join("readme.md");
	let content = "<!-- begin-include(missing) -->\n<!-- end-include -->\n";
	std::fs::write(&doc, content)?;

	common::mdref_cmd()
		.arg("process")
		.arg(&doc)
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicate::str::contains("unresolved reference `missing`"))
		.stderr(predicate::str::contains("mdref::unresolved_key"));

	assert_eq!(std::fs::read_to_string(&doc)?, content);

	common::mdref_cmd()
		.arg("process")
		.arg(&doc)
		.arg("--ignore-missing")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("already up to date"));

	Ok(())
}

#[test]
fn process_reports_missing_end_marker() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let doc = tmp.path().join("readme.md");
	std::fs::write(&doc, "intro\n<!-- begin-ref(a) -->\nbody\n")?;

	common::mdref_cmd()
		.arg("process")
		.arg(&doc)
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicate::str::contains("opened on line 2"));

	Ok(())
}

#[test]
fn process_rejects_wrong_extension() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let doc = tmp.path().join("notes.txt");
	std::fs::write(&doc, "text")?;

	common::mdref_cmd()
		.arg("process")
		.arg(&doc)
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicate::str::contains("extension"));

	common::mdref_cmd()
		.arg("process")
		.arg(&doc)
		.arg("--ext")
		.arg("txt")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	Ok(())
}

#[test]
fn process_reads_config_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("mdref.toml"),
		"[include]\nmode = \"box\"\nsearch_folders = [\"snippets\"]\n",
	)?;
	std::fs::create_dir_all(tmp.path().join("snippets"))?;
	std::fs::write(tmp.path().join("snippets/note.md"), "Careful!\n")?;
	let doc = tmp.path().join("readme.md");
	std::fs::write(&doc, "<!-- include-file(note.md) -->\n")?;

	common::mdref_cmd()
		.arg("process")
		.arg(&doc)
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	assert_eq!(std::fs::read_to_string(&doc)?, "> Careful!\n\n");

	Ok(())
}

#[test]
fn invalid_config_is_reported() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join(".mdref.toml"), "depth_down = -5\n")?;
	let doc = tmp.path().join("readme.md");
	std::fs::write(&doc, "plain\n")?;

	common::mdref_cmd()
		.arg("process")
		.arg(&doc)
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicate::str::contains("failed to parse config file"));

	Ok(())
}

#[test]
fn process_requires_files() {
	common::mdref_cmd()
		.arg("process")
		.assert()
		.code(2);
}
