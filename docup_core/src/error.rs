use miette::Diagnostic;
use thiserror::Error;

use crate::RunStatistics;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum DocupError {
	#[error(transparent)]
	#[diagnostic(code(docup::io_error))]
	Io(#[from] std::io::Error),

	#[error("JSON parse error: {0}")]
	#[diagnostic(
		code(docup::invalid_json),
		help("update descriptors must be a single JSON object")
	)]
	InvalidJson(String),

	#[error("Missing required field: {0}")]
	#[diagnostic(
		code(docup::missing_field),
		help("every descriptor needs `file`, `mode` and `content`")
	)]
	MissingField(&'static str),

	#[error("invalid field `{field}`: {reason}")]
	#[diagnostic(code(docup::invalid_field))]
	InvalidField { field: &'static str, reason: String },

	#[error("Unknown update mode: {0}")]
	#[diagnostic(
		code(docup::unknown_mode),
		help(
			"available modes: append, prepend, replace, replace-section, insert-after, \
			 insert-before, changelog-entry, task-add, task-complete, update-badge"
		)
	)]
	UnknownMode(String),

	#[error("{mode} mode requires '{option}' option")]
	#[diagnostic(
		code(docup::missing_option),
		help("add `\"options\": {{ \"{option}\": \"...\" }}` to the descriptor")
	)]
	MissingOption { mode: String, option: &'static str },

	#[error("invalid match pattern: {0}")]
	#[diagnostic(code(docup::invalid_pattern))]
	InvalidPattern(String),

	#[error("Failed to apply update to {path}: {source}")]
	#[diagnostic(code(docup::target))]
	Target {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to archive `{path}`: {reason}")]
	#[diagnostic(
		code(docup::archive),
		help("check that the updates directory is writable")
	)]
	Archive { path: String, reason: String },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(docup::config_parse),
		help("check that docup.toml is valid TOML with `updates_dir`, `cleanup` and/or `continue_on_error`")
	)]
	ConfigParse(String),

	#[error("processing stopped at `{file}`: {reason}")]
	#[diagnostic(
		code(docup::batch_aborted),
		help("enable error isolation to keep processing after a failed descriptor")
	)]
	BatchAborted {
		file: String,
		reason: String,
		/// Statistics of the descriptors handled before the batch stopped.
		stats: Box<RunStatistics>,
	},
}

impl DocupError {
	/// Returns true for errors raised while reading or validating a descriptor,
	/// before any mode was applied.
	pub fn is_malformed(&self) -> bool {
		matches!(
			self,
			Self::InvalidJson(_) | Self::MissingField(_) | Self::InvalidField { .. }
		)
	}
}

pub type DocupResult<T> = Result<T, DocupError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
