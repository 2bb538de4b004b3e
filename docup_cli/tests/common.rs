#![allow(dead_code)]

use std::path::Path;
use std::path::PathBuf;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub const UPDATES_DIR: &str = ".github/doc-updates";

pub fn docup_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("docup"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("RUST_LOG");
	cmd
}

/// Write a descriptor into the default updates directory under `root`.
pub fn write_descriptor(root: &Path, name: &str, json: &str) -> std::io::Result<PathBuf> {
	let updates = root.join(UPDATES_DIR);
	std::fs::create_dir_all(&updates)?;
	let path = updates.join(name);
	std::fs::write(&path, json)?;
	Ok(path)
}

/// Names of the entries directly inside `dir`, sorted. Empty when `dir` is
/// missing.
pub fn entries(dir: &Path) -> Vec<String> {
	let Ok(read_dir) = std::fs::read_dir(dir) else {
		return Vec::new();
	};

	let mut names: Vec<String> = read_dir
		.filter_map(Result::ok)
		.map(|entry| entry.file_name().to_string_lossy().into_owned())
		.collect();
	names.sort();
	names
}
