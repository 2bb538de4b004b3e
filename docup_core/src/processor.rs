use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;

use crate::ApplyMode;
use crate::ArchiveKind;
use crate::DocupError;
use crate::DocupResult;
use crate::ModeEngine;
use crate::ProcessorOptions;
use crate::Sidecar;
use crate::UpdateDescriptor;
use crate::archive_descriptor;
use crate::decode_text;
use crate::is_descriptor_file;

/// Terminal state of a single descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessingOutcome {
	/// The update changed its target.
	Processed,
	/// The update applied cleanly but left its target unchanged.
	Unchanged,
	/// The descriptor could not be parsed or validated.
	Malformed,
	/// Applying the update raised an error.
	Failed,
}

impl ProcessingOutcome {
	/// The archive directory a descriptor with this outcome is moved to.
	pub fn archive_kind(self) -> ArchiveKind {
		match self {
			Self::Processed | Self::Unchanged => ArchiveKind::Processed,
			Self::Malformed => ArchiveKind::Malformed,
			Self::Failed => ArchiveKind::Failed,
		}
	}
}

/// A change that a dry run would have written.
#[derive(Debug, Clone, Serialize)]
pub struct PreviewEntry {
	/// Target path as written in the descriptor.
	pub target: PathBuf,
	/// Name of the descriptor file that produced the change.
	pub descriptor: String,
	pub current: String,
	pub proposed: String,
}

/// Counters and messages accumulated over one run. Returned by
/// [`UpdateProcessor::run`] and never persisted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStatistics {
	pub files_processed: usize,
	pub files_unchanged: usize,
	pub files_malformed: usize,
	pub files_failed: usize,
	/// True once any target file was written.
	pub changes_made: bool,
	/// Target paths written during the run, without duplicates.
	pub files_updated: Vec<PathBuf>,
	/// Names of descriptors that were malformed.
	pub malformed_files: Vec<String>,
	/// Names of descriptors that failed to apply.
	pub failed_files: Vec<String>,
	pub errors: Vec<String>,
	/// Changes computed during a dry run.
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub previews: Vec<PreviewEntry>,
	/// Text a dry run would have written, keyed by resolved target path.
	#[serde(skip)]
	pub(crate) staged: BTreeMap<PathBuf, String>,
}

impl RunStatistics {
	/// Returns true if any descriptor was malformed or failed.
	pub fn has_errors(&self) -> bool {
		!self.errors.is_empty()
	}

	/// Total number of descriptors that reached a terminal outcome.
	pub fn total(&self) -> usize {
		self.files_processed + self.files_unchanged + self.files_malformed + self.files_failed
	}

	fn record_updated(&mut self, target: &Path) {
		self.changes_made = true;
		if !self.files_updated.iter().any(|path| path == target) {
			self.files_updated.push(target.to_path_buf());
		}
	}
}

/// Discovers update descriptors and routes each one through parse, validate,
/// apply and archive.
#[derive(Debug, Clone)]
pub struct UpdateProcessor<E = ModeEngine> {
	options: ProcessorOptions,
	engine: E,
}

impl UpdateProcessor {
	pub fn new(options: ProcessorOptions) -> Self {
		Self::with_engine(options, ModeEngine)
	}
}

impl<E: ApplyMode> UpdateProcessor<E> {
	pub fn with_engine(options: ProcessorOptions, engine: E) -> Self {
		Self { options, engine }
	}

	pub fn engine(&self) -> &E {
		&self.engine
	}

	/// Process every pending descriptor, oldest-named first.
	///
	/// A missing updates directory is not an error. Malformed descriptors never
	/// stop the batch; failed descriptors stop it only when
	/// `continue_on_error` is disabled, in which case
	/// [`DocupError::BatchAborted`] is returned after the failing descriptor
	/// has been archived. The error carries the statistics gathered up to
	/// that point.
	pub fn run(&self) -> DocupResult<RunStatistics> {
		let mut stats = RunStatistics::default();
		let updates_dir = &self.options.updates_dir;
		tracing::info!("processing documentation updates from {}", updates_dir.display());

		if !updates_dir.is_dir() {
			tracing::info!("updates directory does not exist: {}", updates_dir.display());
			return Ok(stats);
		}

		let descriptors = discover_descriptors(updates_dir)?;
		if descriptors.is_empty() {
			tracing::info!("no update files found");
			return Ok(stats);
		}

		tracing::info!("found {} update file(s)", descriptors.len());
		for descriptor in &descriptors {
			self.process_file(descriptor, &mut stats)?;
		}

		log_summary(&stats);
		Ok(stats)
	}

	/// Run the pipeline for a single descriptor file and record the outcome in
	/// `stats`.
	pub fn process_file(
		&self,
		path: &Path,
		stats: &mut RunStatistics,
	) -> DocupResult<ProcessingOutcome> {
		let name = file_name(path);
		tracing::debug!("processing {name}");

		let result = UpdateDescriptor::read(path)
			.and_then(|descriptor| self.apply_descriptor(&descriptor, &name, stats));

		let outcome = match result {
			Ok(outcome) => outcome,
			Err(error) if error.is_malformed() => {
				self.record_malformed(path, &name, &error, stats)?;
				return Ok(ProcessingOutcome::Malformed);
			}
			Err(error) => {
				self.record_failed(path, &name, &error, stats)?;
				if !self.options.continue_on_error {
					return Err(DocupError::BatchAborted {
						file: name,
						reason: error.to_string(),
						stats: Box::new(std::mem::take(stats)),
					});
				}
				return Ok(ProcessingOutcome::Failed);
			}
		};

		if self.options.dry_run {
			tracing::debug!("[dry run] would archive {name} to processed");
		} else if self.options.cleanup {
			archive_descriptor(&self.options.updates_dir, outcome.archive_kind(), path, None)?;
		}

		Ok(outcome)
	}

	fn apply_descriptor(
		&self,
		descriptor: &UpdateDescriptor,
		name: &str,
		stats: &mut RunStatistics,
	) -> DocupResult<ProcessingOutcome> {
		let target = self.options.resolve_target(&descriptor.target_path);
		tracing::info!(
			"updating {} (mode: {})",
			descriptor.target_path.display(),
			descriptor.mode
		);

		let current = self.read_target(&target, stats)?;
		let proposed = self.engine.apply(
			&current,
			&descriptor.mode,
			&descriptor.content,
			&descriptor.options,
		)?;

		if proposed == current {
			tracing::info!("no changes needed for {}", descriptor.target_path.display());
			stats.files_unchanged += 1;
			return Ok(ProcessingOutcome::Unchanged);
		}

		if self.options.dry_run {
			tracing::info!("[dry run] would update {}", descriptor.target_path.display());
			stats.staged.insert(target, proposed.clone());
			stats.previews.push(PreviewEntry {
				target: descriptor.target_path.clone(),
				descriptor: name.to_string(),
				current,
				proposed,
			});
		} else {
			std::fs::write(&target, &proposed).map_err(|e| target_error(&target, e))?;
			tracing::info!("updated {}", descriptor.target_path.display());
			stats.record_updated(&descriptor.target_path);
		}

		stats.files_processed += 1;
		Ok(ProcessingOutcome::Processed)
	}

	/// Read the target's current text. A missing target is created empty,
	/// except during a dry run where it is only treated as empty. A dry run
	/// sees the text staged by earlier descriptors of the same run.
	fn read_target(&self, target: &Path, stats: &RunStatistics) -> DocupResult<String> {
		if let Some(staged) = stats.staged.get(target).filter(|_| self.options.dry_run) {
			return Ok(staged.clone());
		}

		if target.exists() {
			let bytes = std::fs::read(target).map_err(|e| target_error(target, e))?;
			return Ok(decode_text(bytes));
		}

		if self.options.dry_run {
			return Ok(String::new());
		}

		if let Some(parent) = target.parent().filter(|parent| !parent.as_os_str().is_empty()) {
			std::fs::create_dir_all(parent).map_err(|e| target_error(target, e))?;
		}
		std::fs::write(target, "").map_err(|e| target_error(target, e))?;
		tracing::info!("created new file: {}", target.display());

		Ok(String::new())
	}

	fn record_malformed(
		&self,
		path: &Path,
		name: &str,
		error: &DocupError,
		stats: &mut RunStatistics,
	) -> DocupResult<()> {
		tracing::warn!("malformed file: {name} - {error}");
		stats.files_malformed += 1;
		stats.malformed_files.push(name.to_string());
		stats.errors.push(format!("Malformed file {name}: {error}"));

		if self.options.dry_run {
			tracing::warn!("[dry run] would move to malformed: {name}");
			return Ok(());
		}

		archive_descriptor(
			&self.options.updates_dir,
			ArchiveKind::Malformed,
			path,
			Some(&Sidecar::new(error.to_string())),
		)?;
		Ok(())
	}

	fn record_failed(
		&self,
		path: &Path,
		name: &str,
		error: &DocupError,
		stats: &mut RunStatistics,
	) -> DocupResult<()> {
		tracing::warn!("failed file: {name} - {error}");
		stats.files_failed += 1;
		stats.failed_files.push(name.to_string());
		stats.errors.push(format!("Failed file {name}: {error}"));

		if self.options.dry_run {
			tracing::warn!("[dry run] would move to failed: {name}");
			return Ok(());
		}

		archive_descriptor(
			&self.options.updates_dir,
			ArchiveKind::Failed,
			path,
			Some(&Sidecar::from_failure(error)),
		)?;
		Ok(())
	}
}

/// Process the descriptors in `updates_dir` with default options.
pub fn run(updates_dir: &Path) -> DocupResult<RunStatistics> {
	UpdateProcessor::new(ProcessorOptions::new(updates_dir)).run()
}

/// List the pending descriptors directly inside `updates_dir`, sorted by
/// name. Subdirectories (including the archives) are skipped.
pub fn discover_descriptors(updates_dir: &Path) -> DocupResult<Vec<PathBuf>> {
	let mut descriptors = Vec::new();

	for entry in std::fs::read_dir(updates_dir)? {
		let path = entry?.path();
		if is_descriptor_file(&path) {
			descriptors.push(path);
		}
	}

	descriptors.sort();
	Ok(descriptors)
}

fn file_name(path: &Path) -> String {
	path.file_name()
		.map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

fn target_error(target: &Path, source: std::io::Error) -> DocupError {
	DocupError::Target {
		path: target.display().to_string(),
		source,
	}
}

fn log_summary(stats: &RunStatistics) {
	tracing::info!(
		processed = stats.files_processed,
		unchanged = stats.files_unchanged,
		malformed = stats.files_malformed,
		failed = stats.files_failed,
		updated = stats.files_updated.len(),
		changes_made = stats.changes_made,
		"processing summary"
	);

	if !stats.malformed_files.is_empty() {
		tracing::warn!("malformed files: {}", stats.malformed_files.join(", "));
	}

	if !stats.failed_files.is_empty() {
		tracing::warn!("failed files: {}", stats.failed_files.join(", "));
	}
}
