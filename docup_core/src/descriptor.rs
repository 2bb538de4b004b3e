use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use crate::DocupError;
use crate::DocupResult;
use crate::ModeOptions;

/// File extension of pending update descriptors.
pub const DESCRIPTOR_EXTENSION: &str = "json";

/// Fields every descriptor must carry, in the order they are checked.
pub const REQUIRED_FIELDS: [&str; 3] = ["file", "mode", "content"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A single queued documentation update.
///
/// ```json
/// {
///   "file": "CHANGELOG.md",
///   "mode": "changelog-entry",
///   "content": "- fixed bug",
///   "options": {}
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDescriptor {
	/// Path of the document to edit, relative to the project root or
	/// absolute.
	#[serde(rename = "file")]
	pub target_path: PathBuf,
	/// Name of the update mode. Kept as written so an unknown mode fails when
	/// applied rather than when parsed.
	pub mode: String,
	/// The payload inserted or replaced by the mode.
	pub content: String,
	/// Mode-specific parameters.
	#[serde(default, deserialize_with = "deserialize_options")]
	pub options: ModeOptions,
}

impl UpdateDescriptor {
	/// Parse and validate a descriptor from raw JSON bytes.
	pub fn from_slice(bytes: &[u8]) -> DocupResult<Self> {
		let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
		let value: serde_json::Value =
			serde_json::from_slice(bytes).map_err(|e| DocupError::InvalidJson(e.to_string()))?;

		let Some(object) = value.as_object() else {
			return Err(DocupError::InvalidField {
				field: "descriptor",
				reason: "expected a JSON object".to_string(),
			});
		};

		for field in REQUIRED_FIELDS {
			if !object.contains_key(field) {
				return Err(DocupError::MissingField(field));
			}
		}

		for field in REQUIRED_FIELDS {
			if !object[field].is_string() {
				return Err(DocupError::InvalidField {
					field,
					reason: "expected a string".to_string(),
				});
			}
		}

		let descriptor: Self = serde_json::from_value(value).map_err(|e| {
			DocupError::InvalidField {
				field: "options",
				reason: e.to_string(),
			}
		})?;

		if descriptor.target_path.as_os_str().is_empty() {
			return Err(DocupError::InvalidField {
				field: "file",
				reason: "must not be empty".to_string(),
			});
		}

		Ok(descriptor)
	}

	/// Read and validate a descriptor file.
	///
	/// I/O failures are reported as [`DocupError::InvalidJson`] so an
	/// unreadable descriptor is treated the same as an unparsable one.
	pub fn read(path: &Path) -> DocupResult<Self> {
		let bytes = std::fs::read(path).map_err(|e| DocupError::InvalidJson(e.to_string()))?;
		Self::from_slice(&bytes)
	}
}

fn deserialize_options<'de, D>(deserializer: D) -> Result<ModeOptions, D::Error>
where
	D: Deserializer<'de>,
{
	Option::<ModeOptions>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Returns true when `path` names a pending descriptor file.
pub fn is_descriptor_file(path: &Path) -> bool {
	path.is_file()
		&& path
			.extension()
			.is_some_and(|extension| extension == DESCRIPTOR_EXTENSION)
}

/// Decode a target document. Invalid UTF-8 falls back to a single byte per
/// character (Latin-1) so every file can be read.
pub fn decode_text(bytes: Vec<u8>) -> String {
	match String::from_utf8(bytes) {
		Ok(text) => text,
		Err(error) => {
			tracing::debug!("target is not valid UTF-8, decoding as latin-1");
			error.into_bytes().into_iter().map(char::from).collect()
		}
	}
}
