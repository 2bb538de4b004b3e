use std::collections::BTreeMap;
use std::str::FromStr;

use crate::DocupError;

/// Mode-specific parameters attached to a descriptor, e.g. `section`,
/// `after`, `before`, `task_id` or `badge_name`.
pub type ModeOptions = BTreeMap<String, String>;

/// The content transformation applied by an update descriptor.
///
/// Modes are named in kebab-case inside descriptors (`"mode":
/// "replace-section"`); the snake_case spelling is accepted as an alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum UpdateMode {
	/// Add the content after the current text, separated by a newline.
	Append,
	/// Add the content before the current text, separated by a newline.
	Prepend,
	/// Replace the whole document with the content.
	Replace,
	/// Replace the body of a markdown section, or append the section.
	ReplaceSection,
	/// Insert the content after the first occurrence of an anchor.
	InsertAfter,
	/// Insert the content before the first occurrence of an anchor.
	InsertBefore,
	/// Add an entry under the `## [Unreleased]` changelog heading.
	ChangelogEntry,
	/// Append a checklist line.
	TaskAdd,
	/// Tick the first unchecked checklist line matching a task.
	TaskComplete,
	/// Append a badge to the document.
	UpdateBadge,
}

impl UpdateMode {
	pub const ALL: [UpdateMode; 10] = [
		Self::Append,
		Self::Prepend,
		Self::Replace,
		Self::ReplaceSection,
		Self::InsertAfter,
		Self::InsertBefore,
		Self::ChangelogEntry,
		Self::TaskAdd,
		Self::TaskComplete,
		Self::UpdateBadge,
	];

	/// The canonical name used in descriptors.
	pub fn name(self) -> &'static str {
		match self {
			Self::Append => "append",
			Self::Prepend => "prepend",
			Self::Replace => "replace",
			Self::ReplaceSection => "replace-section",
			Self::InsertAfter => "insert-after",
			Self::InsertBefore => "insert-before",
			Self::ChangelogEntry => "changelog-entry",
			Self::TaskAdd => "task-add",
			Self::TaskComplete => "task-complete",
			Self::UpdateBadge => "update-badge",
		}
	}

	/// The option this mode cannot run without, if any.
	///
	/// `task-complete` reads `task_id` when present but falls back to the
	/// content, so it has no required option.
	pub fn required_option(self) -> Option<&'static str> {
		match self {
			Self::ReplaceSection => Some("section"),
			Self::InsertAfter => Some("after"),
			Self::InsertBefore => Some("before"),
			Self::UpdateBadge => Some("badge_name"),
			Self::Append
			| Self::Prepend
			| Self::Replace
			| Self::ChangelogEntry
			| Self::TaskAdd
			| Self::TaskComplete => None,
		}
	}

	pub fn description(self) -> &'static str {
		match self {
			Self::Append => "append content to the end of the file",
			Self::Prepend => "prepend content to the start of the file",
			Self::Replace => "replace the whole file with the content",
			Self::ReplaceSection => "replace the body of the heading named by `section`",
			Self::InsertAfter => "insert content after the first occurrence of `after`",
			Self::InsertBefore => "insert content before the first occurrence of `before`",
			Self::ChangelogEntry => "add an entry under `## [Unreleased]`",
			Self::TaskAdd => "append a checklist line",
			Self::TaskComplete => "tick the first unchecked task matching `task_id` or the content",
			Self::UpdateBadge => "append a badge (requires `badge_name`)",
		}
	}
}

impl std::fmt::Display for UpdateMode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for UpdateMode {
	type Err = DocupError;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		let mode = match value {
			"append" => Self::Append,
			"prepend" => Self::Prepend,
			"replace" => Self::Replace,
			"replace-section" | "replace_section" => Self::ReplaceSection,
			"insert-after" | "insert_after" => Self::InsertAfter,
			"insert-before" | "insert_before" => Self::InsertBefore,
			"changelog-entry" | "changelog_entry" => Self::ChangelogEntry,
			"task-add" | "task_add" => Self::TaskAdd,
			"task-complete" | "task_complete" => Self::TaskComplete,
			"update-badge" | "update_badge" => Self::UpdateBadge,
			other => return Err(DocupError::UnknownMode(other.to_string())),
		};

		Ok(mode)
	}
}
