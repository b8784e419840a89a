// src/toolchain.rs

//! Host toolchain detection.
//!
//! Before offering run/test affordances the shell checks that the learner
//! actually has a Rust toolchain installed.

use std::process::Command;

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ToolchainStatus {
    pub installed: bool,
    pub cargo_version: Option<String>,
    pub rustc_version: Option<String>,
    pub rustup_version: Option<String>,
}

fn probe_version(cmd: &str) -> Option<String> {
    Command::new(cmd)
        .arg("--version")
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| {
            String::from_utf8(output.stdout)
                .ok()
                .map(|s| s.trim().to_string())
        })
}

/// Probe `cargo`, `rustc` and `rustup`. The toolchain counts as installed
/// when cargo and rustc are both present; rustup is informational.
pub fn detect() -> ToolchainStatus {
    let cargo_version = probe_version("cargo");
    let rustc_version = probe_version("rustc");
    let rustup_version = probe_version("rustup");

    let installed = cargo_version.is_some() && rustc_version.is_some();

    ToolchainStatus {
        installed,
        cargo_version,
        rustc_version,
        rustup_version,
    }
}
