//! Heuristics for telling CLI tools apart from library packages.
//!
//! The checks run in a fixed order and stop at the first match:
//!
//! 1. The manager mostly ships tools (cargo, npm, brew, go, snap, flatpak).
//! 2. The install location sits under a `bin` directory.
//! 3. For pip only, the package name resolves to a program on `PATH`.
//!
//! Anything else is treated as a library. False positives and negatives
//! are expected; a pip distribution whose command is named differently
//! from the package will not be recognised.

use std::path::PathBuf;

use crate::model::PackageRecord;

/// Managers whose packages are assumed to be tools.
const TOOL_MANAGER_KEYWORDS: [&str; 6] = ["go", "cargo", "npm", "brew", "snap", "flatpak"];

/// Resolves a command name against the executable search path.
pub trait PathProbe {
    fn lookup(&self, name: &str) -> Option<PathBuf>;
}

/// Looks commands up on the process `PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPath;

impl PathProbe for SystemPath {
    fn lookup(&self, name: &str) -> Option<PathBuf> {
        which::which(name).ok()
    }
}

/// Decides whether a record looks like a runnable tool.
#[derive(Debug, Clone, Default)]
pub struct ExecutableClassifier<P = SystemPath> {
    probe: P,
}

impl ExecutableClassifier<SystemPath> {
    pub fn new() -> Self {
        Self { probe: SystemPath }
    }
}

impl<P: PathProbe> ExecutableClassifier<P> {
    pub fn with_probe(probe: P) -> Self {
        Self { probe }
    }

    pub fn is_executable(&self, record: &PackageRecord) -> bool {
        let source = record.source().to_lowercase();

        if TOOL_MANAGER_KEYWORDS.iter().any(|kw| source.contains(kw)) {
            return true;
        }

        if record.location().is_some_and(is_bin_location) {
            return true;
        }

        if source.contains("pip") && !record.name().is_empty() {
            return self.probe.lookup(record.name()).is_some();
        }

        false
    }
}

fn is_bin_location(location: &str) -> bool {
    location.contains("/bin/")
        || location.contains("\\bin\\")
        || location.ends_with("/bin")
        || location.ends_with("\\bin")
}
