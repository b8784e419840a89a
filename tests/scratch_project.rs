use std::error::Error;

use learnbench::runner::{RunMode, ScratchProject};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn run_mode_lays_out_a_binary_package() -> TestResult {
    let scratch = ScratchProject::create("fn main() { println!(\"hi\"); }", RunMode::Run)?;

    let manifest = std::fs::read_to_string(scratch.path().join("Cargo.toml"))?;
    assert!(manifest.contains("name = \"learner_code\""));

    let code = std::fs::read_to_string(scratch.path().join("src/main.rs"))?;
    assert!(code.contains("fn main()"));
    assert!(!scratch.path().join("src/lib.rs").exists());

    Ok(())
}

#[test]
fn test_mode_lays_out_a_library_package() -> TestResult {
    let scratch = ScratchProject::create("#[test]\nfn ok() {}\n", RunMode::Test)?;

    assert!(scratch.path().join("src/lib.rs").exists());
    assert!(!scratch.path().join("src/main.rs").exists());

    Ok(())
}

#[test]
fn scratch_dir_is_removed_on_drop() -> TestResult {
    let path = {
        let scratch = ScratchProject::create("fn main() {}", RunMode::Run)?;
        scratch.path().to_path_buf()
    };
    assert!(!path.exists());

    Ok(())
}
