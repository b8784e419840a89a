// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `learnbench`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "learnbench",
    version,
    about = "Interactive Rust learning bench: exercises, lessons and a cargo runner.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Learnbench.toml` in the current working directory. A missing
    /// file falls back to built-in defaults.
    #[arg(long, value_name = "PATH", default_value = "Learnbench.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `LEARNBENCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Compile and run a source file through the scratch-project runner.
    Run {
        /// Source file holding the code to run.
        file: PathBuf,

        /// Run `cargo test` instead of `cargo run`.
        #[arg(long)]
        test: bool,
    },

    /// Open an exercise, run it and record progress.
    Exercise {
        /// Exercise id, e.g. `variables1`.
        id: String,

        /// Use `cargo run` instead of `cargo test`.
        #[arg(long)]
        run: bool,

        /// Ignore any saved draft and start from the pristine source.
        #[arg(long)]
        pristine: bool,
    },

    /// Print the hint embedded in an exercise, if any.
    Hint {
        /// Exercise id, e.g. `variables1`.
        id: String,
    },

    /// Discard the saved draft for an exercise.
    Reset {
        /// Exercise id, e.g. `variables1`.
        id: String,
    },

    /// List the curriculum with recorded lesson progress.
    Lessons,

    /// Show lesson and exercise progress recorded so far.
    Progress,

    /// Check that the Rust toolchain is available on this machine.
    Doctor,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
