use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn mdref_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("mdref"));
	cmd.env("NO_COLOR", "1").env_remove("MDREF_LOG");
	cmd
}
