use std::sync::LazyLock;

use regex::Regex;

use crate::DocupError;
use crate::DocupResult;
use crate::ModeOptions;
use crate::UpdateMode;

/// A markdown heading of any level: up to six `#`, whitespace, then the
/// title. Trailing whitespace is not part of the title.
static HEADING: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?m)^#{1,6}[ \t]+([^\n]*?)[ \t\r]*$")
		.unwrap_or_else(|e| panic!("invalid heading pattern: {e}"))
});

static UNRELEASED_HEADING: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?m)^## \[Unreleased\][^\n]*\n?")
		.unwrap_or_else(|e| panic!("invalid unreleased pattern: {e}"))
});

static VERSION_HEADING: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?m)^## \[\d+\.\d+\.\d+\]")
		.unwrap_or_else(|e| panic!("invalid version pattern: {e}"))
});

/// Applies an update mode to the current text of a document.
///
/// The update processor is generic over this trait so the engine can be
/// swapped or observed.
pub trait ApplyMode {
	fn apply(
		&self,
		current: &str,
		mode: &str,
		content: &str,
		options: &ModeOptions,
	) -> DocupResult<String>;
}

/// The built-in mode engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModeEngine;

impl ApplyMode for ModeEngine {
	fn apply(
		&self,
		current: &str,
		mode: &str,
		content: &str,
		options: &ModeOptions,
	) -> DocupResult<String> {
		apply(current, mode, content, options)
	}
}

/// Compute the new text of a document from its current text and an update.
///
/// Fails with [`DocupError::UnknownMode`] for an unrecognized mode name and
/// [`DocupError::MissingOption`] when the mode's required option is absent or
/// empty.
pub fn apply(
	current: &str,
	mode: &str,
	content: &str,
	options: &ModeOptions,
) -> DocupResult<String> {
	let mode: UpdateMode = mode.parse()?;
	apply_mode(current, mode, content, options)
}

/// Same as [`apply`] with an already parsed mode.
pub fn apply_mode(
	current: &str,
	mode: UpdateMode,
	content: &str,
	options: &ModeOptions,
) -> DocupResult<String> {
	let result = match mode {
		UpdateMode::Append => {
			if current.is_empty() {
				content.to_string()
			} else {
				format!("{current}\n{content}")
			}
		}
		UpdateMode::Prepend => {
			if current.is_empty() {
				content.to_string()
			} else {
				format!("{content}\n{current}")
			}
		}
		UpdateMode::Replace => content.to_string(),
		UpdateMode::ReplaceSection => {
			let section = required_option(options, mode, "section")?;
			replace_section(current, section, content)
		}
		UpdateMode::InsertAfter => {
			let anchor = required_option(options, mode, "after")?;
			insert_after(current, anchor, content)
		}
		UpdateMode::InsertBefore => {
			let anchor = required_option(options, mode, "before")?;
			insert_before(current, anchor, content)
		}
		UpdateMode::ChangelogEntry => add_changelog_entry(current, content),
		UpdateMode::TaskAdd => format!("{current}\n{content}\n"),
		UpdateMode::TaskComplete => {
			let needle = options
				.get("task_id")
				.map(String::as_str)
				.filter(|id| !id.is_empty())
				.unwrap_or(content);
			complete_task(current, needle)?
		}
		UpdateMode::UpdateBadge => {
			// Only checks that a badge was named. Existing badges are not
			// located or replaced.
			required_option(options, mode, "badge_name")?;
			format!("{current}\n{content}\n")
		}
	};

	Ok(result)
}

fn required_option<'a>(
	options: &'a ModeOptions,
	mode: UpdateMode,
	option: &'static str,
) -> DocupResult<&'a str> {
	options
		.get(option)
		.map(String::as_str)
		.filter(|value| !value.is_empty())
		.ok_or_else(|| {
			DocupError::MissingOption {
				mode: mode.to_string(),
				option,
			}
		})
}

/// Replace every section titled `section` with `# {section}\n\n{body}\n`.
///
/// A section spans from its heading to the next heading of any level, or the
/// end of the text. When no heading carries the title, a new level-1 section
/// is appended.
pub fn replace_section(text: &str, section: &str, body: &str) -> String {
	let headings: Vec<(usize, &str)> = HEADING
		.captures_iter(text)
		.filter_map(|captures| {
			let start = captures.get(0)?.start();
			let title = captures.get(1)?.as_str();
			Some((start, title))
		})
		.collect();

	if !headings.iter().any(|(_, title)| *title == section) {
		return format!("{text}\n\n# {section}\n\n{body}\n");
	}

	let replacement = format!("# {section}\n\n{body}\n");
	let mut result = String::with_capacity(text.len() + replacement.len());
	let mut cursor = 0;

	for (index, (start, title)) in headings.iter().enumerate() {
		if *title != section {
			continue;
		}

		let end = headings.get(index + 1).map_or(text.len(), |(next, _)| *next);
		result.push_str(&text[cursor..*start]);
		result.push_str(&replacement);
		cursor = end;
	}

	result.push_str(&text[cursor..]);
	result
}

/// Insert `body` on a new line after the first occurrence of `anchor`, or
/// append it when the anchor is missing.
pub fn insert_after(text: &str, anchor: &str, body: &str) -> String {
	let Some(index) = text.find(anchor) else {
		return format!("{text}\n{body}");
	};

	let end = index + anchor.len();
	format!("{}\n{body}{}", &text[..end], &text[end..])
}

/// Insert `body` followed by a newline before the first occurrence of
/// `anchor`, or prepend it when the anchor is missing.
pub fn insert_before(text: &str, anchor: &str, body: &str) -> String {
	let Some(index) = text.find(anchor) else {
		return format!("{body}\n{text}");
	};

	format!("{}{body}\n{}", &text[..index], &text[index..])
}

/// Add `entry` directly below the `## [Unreleased]` heading.
///
/// Without an unreleased heading a new section is created in front of the
/// first `## [x.y.z]` heading, or at the end of the text.
pub fn add_changelog_entry(text: &str, entry: &str) -> String {
	if let Some(heading) = UNRELEASED_HEADING.find(text) {
		let (head, rest) = text.split_at(heading.end());
		let separator = if head.ends_with('\n') { "" } else { "\n" };
		return format!("{head}{separator}\n{entry}\n{rest}");
	}

	let section = format!("## [Unreleased]\n\n{entry}\n\n");
	match VERSION_HEADING.find(text) {
		Some(version) => {
			let (head, rest) = text.split_at(version.start());
			format!("{head}{section}{rest}")
		}
		None => format!("{text}\n{section}"),
	}
}

/// Tick the first unchecked checklist item (`- [ ] ...`) whose text after the
/// marker contains `needle`. Returns the text unchanged when nothing matches.
pub fn complete_task(text: &str, needle: &str) -> DocupResult<String> {
	let pattern = format!(r"- \[ \] [^\n]*{}", regex::escape(needle));
	let task = Regex::new(&pattern).map_err(|e| DocupError::InvalidPattern(e.to_string()))?;

	let Some(found) = task.find(text) else {
		return Ok(text.to_string());
	};

	// The match begins at `- `, so the marker sits at a fixed offset.
	let marker = found.start() + 2;
	let mut result = String::with_capacity(text.len());
	result.push_str(&text[..marker]);
	result.push_str("[x]");
	result.push_str(&text[marker + 3..]);
	Ok(result)
}
