use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Apply queued JSON documentation updates to markdown files.",
	long_about = "docup processes small JSON update descriptors and applies them to documentation \
	              files.\n\nEach descriptor names a target file, an update mode and the content to \
	              insert. Descriptors are applied oldest-named first and archived into \
	              `processed/`, `malformed/` or `failed/` so one bad update never blocks the \
	              rest.\n\nQuick start:\n  docup init    Create the updates directory\n  docup \
	              apply   Apply pending updates\n  docup modes   List the available update modes"
)]
pub struct DocupCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Create the updates directory and a sample `docup.toml`.
	///
	/// Creates the updates directory with its `processed/`, `malformed/` and
	/// `failed/` archive folders. Existing files and folders are left
	/// untouched, so running it twice is safe.
	Init,
	/// Apply every pending update descriptor.
	///
	/// Reads `*.json` descriptors from the updates directory in name order,
	/// applies each one to its target file, and archives the descriptor by
	/// outcome. Exits with status 1 when any descriptor was malformed or
	/// failed, unless `--ignore-errors` is given.
	Apply {
		/// Directory with update files. Overrides `--updates-dir` and the
		/// config file.
		updates_directory: Option<PathBuf>,

		/// Directory containing update files, relative to the project root.
		/// Defaults to `updates_dir` from `docup.toml`, or
		/// `.github/doc-updates`.
		#[arg(long)]
		updates_dir: Option<PathBuf>,

		/// Show what would be updated without writing files or moving
		/// descriptors.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// Leave successfully processed descriptors in the updates directory
		/// instead of archiving them.
		#[arg(long, default_value_t = false)]
		no_cleanup: bool,

		/// Exit successfully even when some descriptors were malformed or
		/// failed.
		#[arg(long, default_value_t = false)]
		ignore_errors: bool,

		/// Stop at the first descriptor that fails to apply.
		#[arg(long, default_value_t = false, conflicts_with = "ignore_errors")]
		fail_fast: bool,

		/// With `--dry-run`, show a line diff of every change that would be
		/// written.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for the run summary. Use `text` for human-readable
		/// output or `json` for programmatic consumption.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// List the available update modes and their required options.
	Modes,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output of the run statistics.
	Json,
}
