//! Package manager adapters.
//!
//! This module provides the [`SourceAdapter`] trait and implementations that
//! query a package manager for what it has installed.
//!
//! # Available Adapters
//!
//! | Adapter | Command | Platforms |
//! |---------|---------|-----------|
//! | [`PipAdapter`] | `python3 -m pip list` / `pip show` | All |
//! | [`NpmAdapter`] | `npm list -g --json` | All |
//! | [`CargoAdapter`] | `cargo install --list` | All |
//! | [`BrewAdapter`] | `brew list --versions` | macOS |
//!
//! # Example
//!
//! ```no_run
//! use pkgaudit::adapter::{all_adapters, SourceAdapter};
//! use pkgaudit::Platform;
//!
//! #[tokio::main]
//! async fn main() {
//!     for adapter in all_adapters() {
//!         if adapter.is_supported_on(Platform::current()) {
//!             match adapter.fetch().await {
//!                 Ok(records) => println!("{}: {} packages", adapter.name(), records.len()),
//!                 Err(e) => eprintln!("{}: {}", adapter.name(), e),
//!             }
//!         }
//!     }
//! }
//! ```

mod brew;
mod cargo;
mod npm;
mod pip;

pub use brew::BrewAdapter;
pub use cargo::CargoAdapter;
pub use npm::NpmAdapter;
pub use pip::PipAdapter;

use crate::model::{Manager, PackageRecord, Platform};
use async_trait::async_trait;
use std::io;
use std::process::{Output, Stdio};
use thiserror::Error;
use tokio::process::Command;

/// Ways an adapter can fail to list packages.
///
/// [`AdapterError::NotInstalled`] is an expected outcome on machines without
/// the manager and is skipped quietly; the other variants are reported as
/// warnings.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("{program} is not installed")]
    NotInstalled { program: String },

    #[error("failed to run `{command}`: {reason}")]
    ExecutionFailure { command: String, reason: String },

    #[error("could not parse `{command}` output: {reason}")]
    ParseFailure { command: String, reason: String },
}

impl AdapterError {
    pub fn is_not_installed(&self) -> bool {
        matches!(self, AdapterError::NotInstalled { .. })
    }

    pub(crate) fn parse(command: impl Into<String>, reason: impl ToString) -> Self {
        AdapterError::ParseFailure {
            command: command.into(),
            reason: reason.to_string(),
        }
    }
}

/// Lists the packages one package manager has installed.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Human-readable name of this adapter.
    fn name(&self) -> &'static str;

    /// The manager this adapter queries. Its id is the result key.
    fn manager(&self) -> Manager;

    /// Returns the platforms this adapter runs on.
    fn supported_platforms(&self) -> &[Platform];

    fn is_supported_on(&self, platform: Platform) -> bool {
        self.supported_platforms().contains(&platform)
    }

    /// Queries the package manager.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::NotInstalled`] if the manager's program cannot
    /// be found, and `ExecutionFailure`/`ParseFailure` if it runs but its
    /// result is unusable.
    async fn fetch(&self) -> Result<Vec<PackageRecord>, AdapterError>;
}

pub(crate) const ALL_PLATFORMS: &[Platform] = &[
    Platform::Linux,
    Platform::MacOS,
    Platform::Windows,
    Platform::Other,
];

/// Returns every registered adapter, in the order they are audited.
///
/// Use [`SourceAdapter::is_supported_on`] to check whether an adapter applies
/// to a platform.
pub fn all_adapters() -> Vec<Box<dyn SourceAdapter>> {
    vec![
        Box::new(PipAdapter::default()),
        Box::new(NpmAdapter),
        Box::new(CargoAdapter),
        Box::new(BrewAdapter),
    ]
}

/// Returns the adapter for a manager, if one exists.
pub fn get_adapter(manager: Manager) -> Option<Box<dyn SourceAdapter>> {
    all_adapters().into_iter().find(|a| a.manager() == manager)
}

/// Runs a command to completion and captures its output.
///
/// The child is killed if the returned future is dropped, so a caller-side
/// timeout does not leave it running.
pub(crate) async fn run_command(program: &str, args: &[&str]) -> Result<Output, AdapterError> {
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => AdapterError::NotInstalled {
                program: program.to_string(),
            },
            _ => AdapterError::ExecutionFailure {
                command: describe(program, args),
                reason: e.to_string(),
            },
        })
}

/// Fails with `ExecutionFailure` unless the command exited successfully.
pub(crate) fn require_success(
    program: &str,
    args: &[&str],
    output: &Output,
) -> Result<(), AdapterError> {
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let detail = stderr
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("no error output");

    Err(AdapterError::ExecutionFailure {
        command: describe(program, args),
        reason: format!("{} ({})", output.status, detail),
    })
}

/// Short form of a command line for messages.
pub(crate) fn describe(program: &str, args: &[&str]) -> String {
    const MAX_ARGS: usize = 4;

    let mut parts = vec![program];
    parts.extend(args.iter().take(MAX_ARGS));
    let mut line = parts.join(" ");
    if args.len() > MAX_ARGS {
        line.push_str(" ...");
    }
    line
}

/// Builds a captured command result for adapter tests.
#[cfg(test)]
pub(crate) fn captured_output(code: i32, stdout: &str, stderr: &str) -> Output {
    #[cfg(unix)]
    let status = {
        use std::os::unix::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(code << 8)
    };
    #[cfg(windows)]
    let status = {
        use std::os::windows::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(code as u32)
    };

    Output {
        status,
        stdout: stdout.as_bytes().to_vec(),
        stderr: stderr.as_bytes().to_vec(),
    }
}
