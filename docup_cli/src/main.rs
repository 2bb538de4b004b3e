use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use docup_cli::Commands;
use docup_cli::DocupCli;
use docup_cli::OutputFormat;
use docup_core::ArchiveKind;
use docup_core::DocupConfig;
use docup_core::DocupError;
use docup_core::PreviewEntry;
use docup_core::ProcessorOptions;
use docup_core::RunStatistics;
use docup_core::UpdateMode;
use docup_core::UpdateProcessor;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

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
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
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
	let args = DocupCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	let result = match &args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Apply {
			updates_directory,
			updates_dir,
			dry_run,
			no_cleanup,
			ignore_errors,
			fail_fast,
			diff,
			format,
		}) => {
			let flags = ApplyFlags {
				updates_dir: updates_directory.clone().or_else(|| updates_dir.clone()),
				dry_run: *dry_run,
				cleanup: !*no_cleanup,
				ignore_errors: *ignore_errors,
				fail_fast: *fail_fast,
				diff: *diff,
				format: *format,
			};
			run_apply(&args, &flags)
		}
		Some(Commands::Modes) => {
			run_modes();
			Ok(())
		}
		None => {
			eprintln!("No subcommand specified. Run `docup --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<DocupError>() {
			Ok(docup_err) => {
				let report: miette::Report = (*docup_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr. `RUST_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_filter = if verbose {
		"docup_core=debug"
	} else {
		"docup_core=info"
	};
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.without_time()
		.try_init()
		.ok();
}

fn resolve_root(args: &DocupCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn print_section(title: &str) {
	println!();
	println!("{}", colored!(title, bold));
}

fn print_field(label: &str, value: impl std::fmt::Display) {
	println!("{label:<28} {value}");
}

struct ApplyFlags {
	updates_dir: Option<PathBuf>,
	dry_run: bool,
	cleanup: bool,
	ignore_errors: bool,
	fail_fast: bool,
	diff: bool,
	format: OutputFormat,
}

fn processor_options(
	root: &Path,
	flags: &ApplyFlags,
) -> Result<ProcessorOptions, Box<dyn std::error::Error>> {
	let config = DocupConfig::load(root)?;
	let mut options = ProcessorOptions::from_config(root, config.as_ref());

	if let Some(updates_dir) = &flags.updates_dir {
		options.updates_dir = root.join(updates_dir);
	}
	options.dry_run = flags.dry_run;
	options.cleanup = options.cleanup && flags.cleanup;
	if flags.fail_fast {
		options.continue_on_error = false;
	}

	Ok(options)
}

fn run_apply(args: &DocupCli, flags: &ApplyFlags) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let options = processor_options(&root, flags)?;
	let processor = UpdateProcessor::new(options);

	let stats = match processor.run() {
		Ok(stats) => stats,
		Err(DocupError::BatchAborted {
			file,
			reason,
			stats,
		}) => {
			match flags.format {
				OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
				OutputFormat::Text => print_errors(&stats),
			}
			eprintln!(
				"{} processing stopped at {file}: {reason}",
				colored!("error:", red)
			);
			process::exit(1);
		}
		Err(e) => return Err(e.into()),
	};

	match flags.format {
		OutputFormat::Json => {
			println!("{}", serde_json::to_string_pretty(&stats)?);
		}
		OutputFormat::Text => {
			print_apply_result(&stats, flags);
			if args.verbose || flags.dry_run {
				print_summary(&stats);
			}
		}
	}

	if stats.has_errors() {
		if flags.ignore_errors {
			eprintln!(
				"{} completed with {} error(s), continuing due to --ignore-errors",
				colored!("warning:", yellow),
				stats.errors.len()
			);
		} else {
			if matches!(flags.format, OutputFormat::Text) {
				print_errors(&stats);
			}
			process::exit(1);
		}
	}

	Ok(())
}

fn print_apply_result(stats: &RunStatistics, flags: &ApplyFlags) {
	if stats.total() == 0 {
		println!("No pending updates.");
		return;
	}

	if flags.dry_run {
		if stats.previews.is_empty() {
			println!("Dry run: no files would change.");
			return;
		}

		println!("Dry run: would update {} file(s):", stats.previews.len());
		for preview in &stats.previews {
			println!("  {} ({})", preview.target.display(), preview.descriptor);
			if flags.diff {
				print_diff(preview);
			}
		}
		return;
	}

	if stats.files_updated.is_empty() {
		if stats.has_errors() {
			println!("No documentation files were updated.");
		} else {
			println!("All documentation files are already up to date.");
		}
	} else {
		println!(
			"Updated {} file(s) from {} update(s).",
			stats.files_updated.len(),
			stats.files_processed
		);
	}
}

fn print_summary(stats: &RunStatistics) {
	print_section("Processing Summary");
	print_field("Files processed", stats.files_processed);
	print_field("Files unchanged", stats.files_unchanged);
	print_field("Files malformed", stats.files_malformed);
	print_field("Files failed", stats.files_failed);
	print_field("Changes made", stats.changes_made);
	print_field("Files updated", stats.files_updated.len());
	for path in &stats.files_updated {
		println!("{:<28} {}", "updated", path.display());
	}

	if !stats.errors.is_empty() {
		print_field("Errors", stats.errors.len());
		for error in &stats.errors {
			println!("  - {error}");
		}
	}
	if !stats.malformed_files.is_empty() {
		print_field("Malformed files", stats.malformed_files.join(", "));
	}
	if !stats.failed_files.is_empty() {
		print_field("Failed files", stats.failed_files.join(", "));
	}
}

fn print_errors(stats: &RunStatistics) {
	eprintln!();
	eprintln!("{} descriptor(s) could not be applied:", stats.errors.len());
	for error in &stats.errors {
		eprintln!("  {} {error}", colored!("error:", red));
	}
}

fn run_init(args: &DocupCli) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = DocupConfig::load(&root)?;
	let options = ProcessorOptions::from_config(&root, config.as_ref());

	if options.updates_dir.is_dir() {
		println!(
			"Updates directory already exists: {}",
			options.updates_dir.display()
		);
	}

	for kind in [
		ArchiveKind::Processed,
		ArchiveKind::Malformed,
		ArchiveKind::Failed,
	] {
		std::fs::create_dir_all(kind.dir(&options.updates_dir))?;
	}
	println!("Updates directory ready: {}", options.updates_dir.display());

	if let Some(config_path) = DocupConfig::resolve_path(&root) {
		println!("Config file already exists: {}", config_path.display());
	} else {
		let sample_config = "# docup configuration\n\n# Directory holding pending update \
		                     descriptors.\n# updates_dir = \".github/doc-updates\"\n\n# Archive \
		                     processed descriptors into processed/.\n# cleanup = true\n\n# Keep \
		                     going when a descriptor fails to apply.\n# continue_on_error = \
		                     true\n";

		std::fs::write(root.join("docup.toml"), sample_config)?;
		println!("Created docup.toml");

		println!();
		println!("Next steps:");
		println!(
			"  1. Add a descriptor such as {}/001-readme.json:",
			options.updates_dir.display()
		);
		println!(
			"     {{\"file\": \"README.md\", \"mode\": \"append\", \"content\": \"Hello\"}}"
		);
		println!("  2. Run `docup apply` to apply it");
	}

	Ok(())
}

fn run_modes() {
	println!("{}", colored!("Update modes:", bold));
	for mode in UpdateMode::ALL {
		let option = mode
			.required_option()
			.map_or_else(String::new, |option| format!(" [{option}]"));
		println!("  {:<28} {}", format!("{mode}{option}"), mode.description());
	}
}

/// Print a unified diff between the current and proposed text, colorized.
fn print_diff(preview: &PreviewEntry) {
	let diff = TextDiff::from_lines(&preview.current, &preview.proposed);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				print!("    {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				print!("    {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				print!("     {change}");
			}
		}
		if change.missing_newline() {
			println!();
		}
	}
}
