use std::error::Error;
use std::time::Duration;

use tempfile::TempDir;

use learnbench::config;
use learnbench::errors::LearnbenchError;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn missing_file_falls_back_to_defaults() -> TestResult {
    let cfg = config::load_or_default("definitely-missing-learnbench.toml")?;

    assert_eq!(cfg.runner.timeout_secs, 300);
    assert_eq!(cfg.runner.cargo_bin, "cargo");
    assert_eq!(cfg.progress.database.to_str(), Some("learnbench-progress.db"));

    Ok(())
}

#[test]
fn partial_files_keep_defaults_for_the_rest() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("Learnbench.toml");
    std::fs::write(
        &path,
        r#"
[runner]
timeout_secs = 10

[content]
dir = "my-content"
"#,
    )?;

    let cfg = config::load_and_validate(&path)?;
    assert_eq!(cfg.runner.timeout_secs, 10);
    assert_eq!(cfg.runner.cargo_bin, "cargo");
    assert_eq!(cfg.content.dir.to_str(), Some("my-content"));

    Ok(())
}

#[test]
fn zero_timeout_is_rejected() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("Learnbench.toml");
    std::fs::write(&path, "[runner]\ntimeout_secs = 0\n")?;

    let err = config::load_and_validate(&path).unwrap_err();
    assert!(matches!(err, LearnbenchError::ConfigError(_)));

    Ok(())
}

#[test]
fn empty_cargo_bin_is_rejected() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("Learnbench.toml");
    std::fs::write(&path, "[runner]\ncargo_bin = \"  \"\n")?;

    let err = config::load_and_validate(&path).unwrap_err();
    assert!(matches!(err, LearnbenchError::ConfigError(_)));

    Ok(())
}

#[test]
fn malformed_toml_is_a_toml_error() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("Learnbench.toml");
    std::fs::write(&path, "[runner\ntimeout_secs = 10\n")?;

    let err = config::load_and_validate(&path).unwrap_err();
    assert!(matches!(err, LearnbenchError::TomlError(_)));

    Ok(())
}

#[test]
fn runner_section_converts_to_limits() -> TestResult {
    let cfg = config::load_or_default("definitely-missing-learnbench.toml")?;
    let limits = cfg.runner.limits();

    assert_eq!(limits.timeout, Duration::from_secs(300));
    assert_eq!(limits.cargo_bin, "cargo");

    Ok(())
}
