use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Package managers pkgaudit knows by name.
///
/// Records keep their source as a plain string, so managers outside this
/// list can still be represented. Only pip, npm, cargo and brew have
/// adapters; the rest are reserved identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Manager {
    Pip,
    Npm,
    Cargo,
    Brew,
    Winget,
    Apt,
    Yum,
    Snap,
    Flatpak,
}

impl Manager {
    pub const ALL: [Manager; 9] = [
        Manager::Pip,
        Manager::Npm,
        Manager::Cargo,
        Manager::Brew,
        Manager::Winget,
        Manager::Apt,
        Manager::Yum,
        Manager::Snap,
        Manager::Flatpak,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Manager::Pip => "pip",
            Manager::Npm => "npm",
            Manager::Cargo => "cargo",
            Manager::Brew => "brew",
            Manager::Winget => "winget",
            Manager::Apt => "apt",
            Manager::Yum => "yum",
            Manager::Snap => "snap",
            Manager::Flatpak => "flatpak",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Manager::Pip => "pip",
            Manager::Npm => "NPM",
            Manager::Cargo => "Cargo",
            Manager::Brew => "Homebrew",
            Manager::Winget => "WinGet",
            Manager::Apt => "APT",
            Manager::Yum => "YUM",
            Manager::Snap => "Snap",
            Manager::Flatpak => "Flatpak",
        }
    }

    /// Parses a manager id, accepting `homebrew` as an alias for `brew`.
    pub fn parse(s: &str) -> Option<Manager> {
        let lower = s.to_lowercase();
        if lower == "homebrew" {
            return Some(Manager::Brew);
        }
        Manager::ALL.into_iter().find(|m| m.as_str() == lower)
    }
}

impl std::fmt::Display for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<Manager> for String {
    fn from(manager: Manager) -> Self {
        manager.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    MacOS,
    Windows,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "macos") {
            Platform::MacOS
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Other
        }
    }

    /// The platform's native package manager, aliased as `system` in results.
    pub fn system_manager(&self) -> Option<Manager> {
        match self {
            Platform::MacOS => Some(Manager::Brew),
            _ => None,
        }
    }
}

/// Reasons a [`PackageRecord`] cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("Package name cannot be empty")]
    EmptyName,
    #[error("Package version cannot be empty")]
    EmptyVersion,
    #[error("Package manager cannot be empty")]
    EmptySource,
}

/// One installed package as reported by one package manager.
///
/// Records are immutable once handed out. Identity within an audit is the
/// `(source, name)` pair; the same name under two managers is two records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    name: String,
    version: String,
    source: String,
    location: Option<String>,
    size: Option<u64>,
    description: Option<String>,
}

impl PackageRecord {
    /// Creates a record, rejecting empty `name`, `version` or `source`.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<Self, RecordError> {
        let name = name.into();
        let version = version.into();
        let source = source.into();

        if name.is_empty() {
            return Err(RecordError::EmptyName);
        }
        if version.is_empty() {
            return Err(RecordError::EmptyVersion);
        }
        if source.is_empty() {
            return Err(RecordError::EmptySource);
        }

        Ok(Self {
            name,
            version,
            source,
            location: None,
            size: None,
            description: None,
        })
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}
