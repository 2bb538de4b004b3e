mod common;

use common::UPDATES_DIR;
use docup_core::AnyEmptyResult;

#[test]
fn can_init() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::docup_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Updates directory ready"))
		.stdout(predicates::str::contains("Created docup.toml"));

	let updates = tmp.path().join(UPDATES_DIR);
	assert_eq!(
		common::entries(&updates),
		vec![
			"failed".to_string(),
			"malformed".to_string(),
			"processed".to_string()
		]
	);

	let config = std::fs::read_to_string(tmp.path().join("docup.toml"))?;
	assert!(config.contains("# updates_dir = \".github/doc-updates\""));
	assert!(config.contains("# continue_on_error = true"));

	Ok(())
}

#[test]
fn init_is_idempotent() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let config_path = tmp.path().join("docup.toml");
	std::fs::write(&config_path, "cleanup = false\n")?;
	std::fs::create_dir_all(tmp.path().join(UPDATES_DIR))?;
	std::fs::write(tmp.path().join(UPDATES_DIR).join("001-keep.json"), "{}")?;

	for _ in 0..2 {
		common::docup_cmd()
			.arg("init")
			.arg("--path")
			.arg(tmp.path())
			.assert()
			.success()
			.stdout(predicates::str::contains("already exists"));
	}

	assert_eq!(std::fs::read_to_string(&config_path)?, "cleanup = false\n");
	assert!(tmp.path().join(UPDATES_DIR).join("001-keep.json").exists());

	Ok(())
}

#[test]
fn init_uses_configured_updates_dir() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join(".docup.toml"), "updates_dir = \"queue\"\n")?;

	common::docup_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Config file already exists"));

	assert!(tmp.path().join("queue/processed").is_dir());
	assert!(!tmp.path().join("docup.toml").exists());

	Ok(())
}
