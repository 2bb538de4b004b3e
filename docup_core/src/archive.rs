use std::fmt::Write as _;
use std::path::Path;
use std::path::PathBuf;

use chrono::DateTime;
use chrono::Local;

use crate::DocupError;
use crate::DocupResult;

/// Terminal archive location of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
	Processed,
	Malformed,
	Failed,
}

impl ArchiveKind {
	/// Name of the subdirectory inside the updates directory.
	pub fn dir_name(self) -> &'static str {
		match self {
			Self::Processed => "processed",
			Self::Malformed => "malformed",
			Self::Failed => "failed",
		}
	}

	pub fn dir(self, updates_dir: &Path) -> PathBuf {
		updates_dir.join(self.dir_name())
	}
}

/// Diagnostic written next to a malformed or failed descriptor.
#[derive(Debug, Clone)]
pub struct Sidecar {
	pub message: String,
	/// Source chain of the error, outermost cause first.
	pub causes: Vec<String>,
	/// Captured stack trace, recorded for failures only.
	pub stack_trace: Option<String>,
}

impl Sidecar {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			causes: Vec::new(),
			stack_trace: None,
		}
	}

	/// Build a failure sidecar with the error's source chain and the current
	/// stack trace.
	pub fn from_failure(error: &(dyn std::error::Error + 'static)) -> Self {
		let mut causes = Vec::new();
		let mut source = error.source();
		while let Some(cause) = source {
			causes.push(cause.to_string());
			source = cause.source();
		}

		Self {
			message: error.to_string(),
			causes,
			stack_trace: Some(std::backtrace::Backtrace::force_capture().to_string()),
		}
	}

	fn render(&self, file_name: &str, now: &DateTime<Local>) -> String {
		let mut out = String::new();
		let _ = writeln!(out, "File: {file_name}");
		let _ = writeln!(out, "Error: {}", self.message);
		let _ = writeln!(out, "Timestamp: {}", now.to_rfc3339());

		if !self.causes.is_empty() {
			out.push_str("Caused by:\n");
			for cause in &self.causes {
				let _ = writeln!(out, "  {cause}");
			}
		}

		if let Some(trace) = &self.stack_trace {
			let _ = write!(out, "Stack trace:\n{trace}");
		}

		out
	}
}

/// Move `descriptor` into the `kind` subdirectory of `updates_dir` under a
/// timestamp-prefixed name, writing `sidecar` alongside it when given.
/// Returns the archived path.
pub fn archive_descriptor(
	updates_dir: &Path,
	kind: ArchiveKind,
	descriptor: &Path,
	sidecar: Option<&Sidecar>,
) -> DocupResult<PathBuf> {
	let archive_dir = kind.dir(updates_dir);
	std::fs::create_dir_all(&archive_dir).map_err(|e| archive_error(&archive_dir, &e))?;

	let file_name = descriptor
		.file_name()
		.map(|name| name.to_string_lossy().into_owned())
		.unwrap_or_default();
	let stem = descriptor
		.file_stem()
		.map(|stem| stem.to_string_lossy().into_owned())
		.unwrap_or_default();

	let now = Local::now();
	let prefix = unique_prefix(&archive_dir, &now.format("%Y%m%d_%H%M%S").to_string(), &file_name);
	let archived = archive_dir.join(format!("{prefix}_{file_name}"));

	if let Some(sidecar) = sidecar {
		let sidecar_path = archive_dir.join(format!("{prefix}_{stem}_error.txt"));
		std::fs::write(&sidecar_path, sidecar.render(&file_name, &now))
			.map_err(|e| archive_error(&sidecar_path, &e))?;
	}

	std::fs::rename(descriptor, &archived).map_err(|e| archive_error(descriptor, &e))?;
	tracing::debug!(
		from = %descriptor.display(),
		to = %archived.display(),
		"archived descriptor to {}",
		kind.dir_name()
	);

	Ok(archived)
}

/// Pick a prefix so that `{prefix}_{file_name}` does not exist yet.
fn unique_prefix(archive_dir: &Path, timestamp: &str, file_name: &str) -> String {
	if !archive_dir.join(format!("{timestamp}_{file_name}")).exists() {
		return timestamp.to_string();
	}

	let mut counter = 1_usize;
	loop {
		let prefix = format!("{timestamp}_{counter}");
		if !archive_dir.join(format!("{prefix}_{file_name}")).exists() {
			return prefix;
		}
		counter += 1;
	}
}

fn archive_error(path: &Path, error: &std::io::Error) -> DocupError {
	DocupError::Archive {
		path: path.display().to_string(),
		reason: error.to_string(),
	}
}
