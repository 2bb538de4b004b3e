use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::DocupError;
use crate::DocupResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["docup.toml", ".docup.toml", ".config/docup.toml"];

/// Default location of the updates directory, relative to the project root.
pub const DEFAULT_UPDATES_DIR: &str = ".github/doc-updates";

/// Configuration loaded from a `docup.toml` file.
///
/// ```toml
/// updates_dir = ".github/doc-updates"
/// cleanup = true
/// continue_on_error = true
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct DocupConfig {
	/// Directory holding pending descriptors, relative to the project root.
	#[serde(default = "default_updates_dir")]
	pub updates_dir: PathBuf,
	/// Move successfully processed descriptors into `processed/`. When
	/// `false` they stay in the updates directory.
	#[serde(default = "default_true")]
	pub cleanup: bool,
	/// Keep processing after a descriptor fails. When `false` the first
	/// failure stops the batch.
	#[serde(default = "default_true")]
	pub continue_on_error: bool,
}

impl Default for DocupConfig {
	fn default() -> Self {
		Self {
			updates_dir: default_updates_dir(),
			cleanup: true,
			continue_on_error: true,
		}
	}
}

fn default_updates_dir() -> PathBuf {
	PathBuf::from(DEFAULT_UPDATES_DIR)
}

fn default_true() -> bool {
	true
}

impl DocupConfig {
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
	pub fn load(root: &Path) -> DocupResult<Option<DocupConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config: DocupConfig =
			toml::from_str(&content).map_err(|e| DocupError::ConfigParse(e.to_string()))?;

		tracing::debug!(path = %config_path.display(), "loaded config");
		Ok(Some(config))
	}
}

/// Resolved settings for a single processing run.
#[derive(Debug, Clone)]
pub struct ProcessorOptions {
	/// Base directory for relative target paths.
	pub root: PathBuf,
	/// Directory holding pending descriptors.
	pub updates_dir: PathBuf,
	/// Archive processed descriptors.
	pub cleanup: bool,
	/// Compute every update without writing targets or moving descriptors.
	pub dry_run: bool,
	/// Isolate failed descriptors instead of stopping the batch.
	pub continue_on_error: bool,
}

impl ProcessorOptions {
	/// Options for `updates_dir` with relative targets resolved against the
	/// current directory.
	pub fn new(updates_dir: impl Into<PathBuf>) -> Self {
		Self {
			root: PathBuf::from("."),
			updates_dir: updates_dir.into(),
			cleanup: true,
			dry_run: false,
			continue_on_error: true,
		}
	}

	/// Build options for the project at `root`, applying `config` over the
	/// defaults. A relative `updates_dir` is resolved against `root`.
	pub fn from_config(root: &Path, config: Option<&DocupConfig>) -> Self {
		let config = config.cloned().unwrap_or_default();

		Self {
			root: root.to_path_buf(),
			updates_dir: root.join(config.updates_dir),
			cleanup: config.cleanup,
			dry_run: false,
			continue_on_error: config.continue_on_error,
		}
	}

	/// Resolve a descriptor's target path against the project root.
	pub fn resolve_target(&self, target: &Path) -> PathBuf {
		if target.is_absolute() {
			target.to_path_buf()
		} else {
			self.root.join(target)
		}
	}
}
