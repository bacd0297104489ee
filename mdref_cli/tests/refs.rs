mod common;

use mdref_core::AnyEmptyResult;
use predicates::prelude::*;

fn write_refs(root: &std::path::Path) -> std::io::Result<()> {
	std::fs::write(
		root.join("top.md"),
		"<!-- begin-ref(top) -->\none\ntwo\n<!-- end-ref -->\n",
	)?;
	std::fs::create_dir_all(root.join("nested"))?;
	std::fs::write(
		root.join("nested/child.md"),
		"<!-- begin-ref(child) -->C<!-- end-ref -->\n",
	)
}

#[test]
fn refs_lists_names() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_refs(tmp.path())?;

	common::mdref_cmd()
		.arg("refs")
		.arg(tmp.path())
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("top (3 line(s))"))
		.stdout(predicate::str::contains("child (1 line(s))"));

	Ok(())
}

#[test]
fn refs_respects_depth() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_refs(tmp.path())?;

	common::mdref_cmd()
		.arg("refs")
		.arg(tmp.path())
		.arg("--depth")
		.arg("0")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("top"))
		.stdout(predicate::str::contains("child").not());

	common::mdref_cmd()
		.arg("refs")
		.arg(tmp.path())
		.arg("--depth")
		.arg("-1")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("child"));

	Ok(())
}

#[test]
fn refs_outputs_json() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_refs(tmp.path())?;

	let output = common::mdref_cmd()
		.arg("refs")
		.arg(tmp.path())
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.output()?;
	assert!(output.status.success());

	let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(json["child"], "C");
	assert_eq!(json["top"], "\none\ntwo\n");

	Ok(())
}

#[test]
fn refs_reports_duplicates() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_refs(tmp.path())?;
	std::fs::write(
		tmp.path().join("nested/again.md"),
		"<!-- begin-ref(top) -->again<!-- end-ref -->\n",
	)?;

	common::mdref_cmd()
		.arg("refs")
		.arg(tmp.path())
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicate::str::contains("duplicate reference `top`"));

	Ok(())
}
