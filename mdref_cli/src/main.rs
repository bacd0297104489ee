use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use mdref_cli::Commands;
use mdref_cli::MdrefCli;
use mdref_cli::OutputFormat;
use mdref_cli::ProcessArgs;
use mdref_cli::VarsCommand;
use mdref_core::Depth;
use mdref_core::KeyKind;
use mdref_core::MdrefConfig;
use mdref_core::MdrefError;
use mdref_core::ProcessOptions;
use mdref_core::ScanOptions;
use mdref_core::collect_refs_in_directory_with_options;
use mdref_core::del_var;
use mdref_core::escape_value;
use mdref_core::files::get_file_content;
use mdref_core::files::set_file_content;
use mdref_core::get_var;
use mdref_core::get_vars;
use mdref_core::normalize_extension;
use mdref_core::process_file;
use mdref_core::render_file;
use mdref_core::set_var;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

type CliResult = Result<(), Box<dyn std::error::Error>>;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = MdrefCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let filter = if args.verbose {
		EnvFilter::new("debug")
	} else {
		EnvFilter::try_from_env("MDREF_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
	};
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.init();

	let result = match &args.command {
		Commands::Process(process_args) => run_process(&args, process_args),
		Commands::Refs {
			dir,
			depth,
			format,
		} => run_refs(&args, dir, *depth, *format),
		Commands::Vars { command } => run_vars(command),
	};

	if let Err(e) = result {
		match e.downcast::<MdrefError>() {
			Ok(mdref_err) => {
				let report: miette::Report = (*mdref_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

fn resolve_root(args: &MdrefCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn load_config(args: &MdrefCli) -> Result<Option<MdrefConfig>, MdrefError> {
	MdrefConfig::load(&resolve_root(args))
}

fn run_process(args: &MdrefCli, process: &ProcessArgs) -> CliResult {
	let config = load_config(args)?;
	let mut options = ProcessOptions::from_config(config.as_ref());
	options.backup |= process.backup;
	if let Some(ext) = &process.ext {
		options.extension = normalize_extension(ext);
	}
	if let Some(depth_up) = process.depth_up {
		options.depth_up = depth_up;
	}
	if let Some(depth_down) = process.depth_down {
		options.depth_down = depth_down;
	}
	if process.ignore_missing {
		options.error_if_missing = false;
	}

	let mut updated = 0;
	for file in &process.files {
		if process.dry_run || process.diff {
			let current = get_file_content(file)?.text;
			let expected = render_file(file, &options)?;
			if current != expected {
				if process.dry_run {
					println!("Would update {}", file.display());
				}
				if process.diff {
					print_diff(&current, &expected);
				}
			} else if process.dry_run {
				println!("{} is up to date", file.display());
			}
			if process.dry_run {
				continue;
			}
		}

		let report = process_file(file, &options)?;
		if report.changed {
			updated += 1;
			match &report.backup {
				Some(backup) if args.verbose => {
					println!(
						"{} {} (backup: {})",
						colored!("Updated", green),
						file.display(),
						backup.display()
					);
				}
				_ => println!("{} {}", colored!("Updated", green), file.display()),
			}
		} else if args.verbose {
			println!("{} is up to date", file.display());
		}
	}

	if !process.dry_run {
		if updated == 0 {
			println!("All files are already up to date.");
		} else {
			println!("Updated {updated} file(s).");
		}
	}

	Ok(())
}

fn run_refs(args: &MdrefCli, dir: &Path, depth: Option<Depth>, format: OutputFormat) -> CliResult {
	let config = load_config(args)?;
	let options = ProcessOptions::from_config(config.as_ref());
	let scan = ScanOptions::new(&options.extension).with_exclude_patterns(options.exclude_patterns);
	let refs = collect_refs_in_directory_with_options(
		dir,
		depth.unwrap_or(options.depth_down),
		&scan,
		None,
	)?;

	match format {
		OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&refs)?),
		OutputFormat::Text if refs.is_empty() => println!("No references found."),
		OutputFormat::Text => {
			println!("{}", colored!("References:", bold));
			for (name, content) in refs.iter() {
				println!("  {name} ({} line(s))", content.lines().count());
			}
		}
	}

	Ok(())
}

fn run_vars(command: &VarsCommand) -> CliResult {
	match command {
		VarsCommand::Get { file, name } => {
			let text = get_file_content(file)?.text;
			let value = get_var(&text, name).ok_or_else(|| {
				MdrefError::UnresolvedKey {
					kind: KeyKind::Variable,
					name: name.clone(),
				}
			})?;
			println!("{value}");
		}
		VarsCommand::List { file, format } => {
			let vars = get_vars(&get_file_content(file)?.text, None)?;
			match format {
				OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&vars)?),
				OutputFormat::Text if vars.is_empty() => println!("No variables declared."),
				OutputFormat::Text => {
					for (name, value) in vars.iter() {
						println!("{name} = \"{}\"", escape_value(value, '"'));
					}
				}
			}
		}
		VarsCommand::Set { file, name, value } => {
			let content = get_file_content(file)?;
			let updated = set_var(&content.text, name, value)?;
			if updated != content.text {
				set_file_content(file, &updated, content.bom)?;
			}
			println!("Set `{name}` in {}", file.display());
		}
		VarsCommand::Del { file, name } => {
			let content = get_file_content(file)?;
			let updated = del_var(&content.text, name)?;
			if updated == content.text {
				println!("No declaration of `{name}` in {}", file.display());
			} else {
				set_file_content(file, &updated, content.bom)?;
				println!("Deleted `{name}` from {}", file.display());
			}
		}
	}

	Ok(())
}

/// Print a line diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				print!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				print!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				print!("   {change}");
			}
		}
	}
}
