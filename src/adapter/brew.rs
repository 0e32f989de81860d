use super::{require_success, run_command, AdapterError};
use crate::model::{Manager, PackageRecord, Platform};
use async_trait::async_trait;
use tracing::debug;

pub struct BrewAdapter;

#[async_trait]
impl super::SourceAdapter for BrewAdapter {
    fn name(&self) -> &'static str {
        "Homebrew Packages"
    }

    fn manager(&self) -> Manager {
        Manager::Brew
    }

    fn supported_platforms(&self) -> &[Platform] {
        &[Platform::MacOS]
    }

    async fn fetch(&self) -> Result<Vec<PackageRecord>, AdapterError> {
        let args = ["list", "--versions"];
        let output = run_command("brew", &args).await?;
        require_success("brew", &args, &output)?;

        Ok(parse_versions(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Parses `brew list --versions`: `name version [version...]` per line.
/// Only the first listed version is kept.
fn parse_versions(stdout: &str) -> Vec<PackageRecord> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let name = parts.next()?;
            let version = parts.next()?;

            PackageRecord::new(name, version, Manager::Brew)
                .map_err(|e| debug!("Dropping brew entry {:?}: {}", line, e))
                .ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_versions() {
        let stdout = "git 2.43.0\nopenssl@3 3.2.0_1 3.1.4\nwget 1.21.4\n";
        let records = parse_versions(stdout);

        let pairs: Vec<_> = records.iter().map(|r| (r.name(), r.version())).collect();
        assert_eq!(
            pairs,
            vec![("git", "2.43.0"), ("openssl@3", "3.2.0_1"), ("wget", "1.21.4")]
        );
        assert!(records.iter().all(|r| r.source() == "brew"));
    }

    #[test]
    fn test_parse_versions_skips_bare_names() {
        let records = parse_versions("orphan\n\njq 1.7.1\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), "jq");
    }
}
