use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use mdref_core::Depth;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Resolve include, variable and reference directives in markdown files.",
	long_about = "mdref keeps markdown files in sync with shared content.\n\nDirectives live in \
	              HTML comments: `var(name)=\"value\"` declares a variable, \
	              `begin-var(name)`/`end-var` shows its value, `begin-ref(name)`/`end-ref` \
	              captures reusable content, `begin-include(name)`/`end-include` repeats it and \
	              `include-file(path)` pastes in a whole file.\n\nQuick start:\n  mdref process \
	              readme.md     Resolve every directive\n  mdref refs docs             List the \
	              references a directory defines\n  mdref vars list readme.md   Show declared \
	              variables"
)]
pub struct MdrefCli {
	#[command(subcommand)]
	pub command: Commands,

	/// Directory searched for `mdref.toml`. Defaults to the current
	/// directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output and debug logging.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Resolve every directive in the given files and write them back.
	///
	/// Include files are expanded first, then `begin-var` blocks, then
	/// `begin-include` blocks. References and variables are collected from
	/// the files around each processed file. A file is only written when
	/// every directive resolves and its content changed.
	Process(ProcessArgs),
	/// List the references defined under a directory.
	Refs {
		/// Directory to scan.
		dir: PathBuf,

		/// Levels to descend, `-1` for unlimited.
		#[arg(long, allow_negative_numbers = true)]
		depth: Option<Depth>,

		/// Output format.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Read and edit the variables declared in a file.
	Vars {
		#[command(subcommand)]
		command: VarsCommand,
	},
}

#[derive(Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct ProcessArgs {
	/// Markdown files to process.
	#[arg(required = true)]
	pub files: Vec<PathBuf>,

	/// Copy each file to a timestamped `.bak` file before overwriting it.
	#[arg(long, default_value_t = false)]
	pub backup: bool,

	/// Compute the result without writing any file.
	#[arg(long, default_value_t = false)]
	pub dry_run: bool,

	/// Print a line diff of the changes for each file.
	#[arg(long, default_value_t = false)]
	pub diff: bool,

	/// Extension of processed and scanned files.
	#[arg(long)]
	pub ext: Option<String>,

	/// Directories to climb above each file before scanning.
	#[arg(long)]
	pub depth_up: Option<usize>,

	/// Levels to descend when scanning, `-1` for unlimited.
	#[arg(long, allow_negative_numbers = true)]
	pub depth_down: Option<Depth>,

	/// Leave unresolved directives untouched instead of failing.
	#[arg(long, default_value_t = false)]
	pub ignore_missing: bool,
}

#[derive(Subcommand)]
pub enum VarsCommand {
	/// Print the value of one variable.
	Get { file: PathBuf, name: String },
	/// List every variable declared in the file.
	List {
		file: PathBuf,

		/// Output format.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Set a variable, adding a declaration when none exists.
	Set {
		file: PathBuf,
		name: String,
		value: String,
	},
	/// Remove every declaration of a variable.
	Del { file: PathBuf, name: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output.
	Text,
	/// JSON object of names to values.
	Json,
}
