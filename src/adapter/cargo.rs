use super::{require_success, run_command, AdapterError, ALL_PLATFORMS};
use crate::model::{Manager, PackageRecord, Platform};
use async_trait::async_trait;
use tracing::debug;

/// Lists binaries installed with `cargo install`.
pub struct CargoAdapter;

#[async_trait]
impl super::SourceAdapter for CargoAdapter {
    fn name(&self) -> &'static str {
        "Cargo Installed Binaries"
    }

    fn manager(&self) -> Manager {
        Manager::Cargo
    }

    fn supported_platforms(&self) -> &[Platform] {
        ALL_PLATFORMS
    }

    async fn fetch(&self) -> Result<Vec<PackageRecord>, AdapterError> {
        let args = ["install", "--list"];
        let output = run_command("cargo", &args).await?;
        require_success("cargo", &args, &output)?;

        Ok(parse_install_list(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Parses `cargo install --list`.
///
/// Package lines look like `ripgrep v14.1.0:` (optionally followed by a
/// source in parentheses); the indented lines under them name binaries.
fn parse_install_list(stdout: &str) -> Vec<PackageRecord> {
    stdout
        .lines()
        .filter(|line| !line.starts_with(char::is_whitespace))
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let name = parts.next()?;
            let version = parts.next()?.trim_end_matches(':');

            match PackageRecord::new(name, version, Manager::Cargo) {
                Ok(record) => Some(record),
                Err(e) => {
                    debug!("Dropping cargo entry {:?}: {}", line, e);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_install_list() {
        let stdout = "\
bat v0.24.0:
    bat
cargo-edit v0.12.2 (https://github.com/killercup/cargo-edit#a1b2c3d4):
    cargo-add
    cargo-rm
ripgrep v14.1.0:
    rg
";
        let records = parse_install_list(stdout);
        let pairs: Vec<_> = records.iter().map(|r| (r.name(), r.version())).collect();
        assert_eq!(
            pairs,
            vec![
                ("bat", "v0.24.0"),
                ("cargo-edit", "v0.12.2"),
                ("ripgrep", "v14.1.0"),
            ]
        );
        assert!(records.iter().all(|r| r.source() == "cargo"));
    }

    #[test]
    fn test_parse_install_list_skips_malformed_lines() {
        let records = parse_install_list("lonely\n:\n\nfd-find v9.0.0:\n    fd\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), "fd-find");
    }
}
