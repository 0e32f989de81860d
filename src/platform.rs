//! Cross-platform path resolution.

use std::path::PathBuf;

/// Returns the configuration directory for pkgaudit.
///
/// Platform-specific locations:
/// - Linux: `~/.config/pkgaudit/`
/// - macOS: `~/Library/Application Support/pkgaudit/`
/// - Windows: `%APPDATA%\pkgaudit\`
///
/// Falls back to `./pkgaudit/` if no config directory can be determined.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pkgaudit")
}
