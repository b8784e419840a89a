// src/runner/workspace.rs

//! Throwaway Cargo project scaffolding.
//!
//! Each job compiles in its own temp directory so concurrent-looking runs
//! (a superseded job that has not died yet plus its replacement) can never
//! fight over a `target/` directory. The directory is removed when the
//! [`ScratchProject`] is dropped.

use std::path::Path;

use anyhow::{Context, Result};
use tempfile::TempDir;

use super::RunMode;

const MANIFEST_TEMPLATE: &str = r#"[package]
name = "learner_code"
version = "0.1.0"
edition = "2021"

[dependencies]
"#;

/// A temp directory laid out as a minimal Cargo package holding one
/// submitted buffer.
#[derive(Debug)]
pub struct ScratchProject {
    dir: TempDir,
}

impl ScratchProject {
    /// Write the manifest and the submitted code under a fresh temp dir.
    ///
    /// Run mode places the buffer at `src/main.rs`; test mode at
    /// `src/lib.rs`.
    pub fn create(code: &str, mode: RunMode) -> Result<Self> {
        let dir = TempDir::new().context("creating scratch project dir")?;

        std::fs::write(dir.path().join("Cargo.toml"), MANIFEST_TEMPLATE)
            .context("writing scratch Cargo.toml")?;

        let src = dir.path().join("src");
        std::fs::create_dir(&src).context("creating scratch src dir")?;
        std::fs::write(src.join(mode.source_file()), code)
            .context("writing submitted code")?;

        Ok(Self { dir })
    }

    /// Root of the scratch package (where `cargo` should run).
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
