use super::{require_success, run_command, AdapterError, ALL_PLATFORMS};
use crate::model::{Manager, PackageRecord, Platform};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::process::Output;
use tracing::debug;

pub struct NpmAdapter;

#[derive(Deserialize)]
struct NpmListOutput {
    dependencies: Option<BTreeMap<String, NpmPackage>>,
}

#[derive(Deserialize)]
struct NpmPackage {
    version: Option<String>,
    description: Option<String>,
}

#[async_trait]
impl super::SourceAdapter for NpmAdapter {
    fn name(&self) -> &'static str {
        "NPM Global Packages"
    }

    fn manager(&self) -> Manager {
        Manager::Npm
    }

    fn supported_platforms(&self) -> &[Platform] {
        ALL_PLATFORMS
    }

    async fn fetch(&self) -> Result<Vec<PackageRecord>, AdapterError> {
        let npm_cmd = if cfg!(target_os = "windows") { "npm.cmd" } else { "npm" };
        let args = ["list", "-g", "--json", "--depth=0"];

        let output = run_command(npm_cmd, &args).await?;
        records_from_output(npm_cmd, &args, &output)
    }
}

fn records_from_output(
    npm_cmd: &str,
    args: &[&str],
    output: &Output,
) -> Result<Vec<PackageRecord>, AdapterError> {
    // npm list exits 1 on peer dependency problems but still prints
    // valid JSON. Only fail if there is nothing to parse.
    if output.stdout.is_empty() {
        require_success(npm_cmd, args, output)?;
        return Ok(Vec::new());
    }

    parse_list(&String::from_utf8_lossy(&output.stdout))
        .map_err(|e| AdapterError::parse("npm list", e))
}

fn parse_list(stdout: &str) -> Result<Vec<PackageRecord>, serde_json::Error> {
    let npm_list: NpmListOutput = serde_json::from_str(stdout)?;

    let records = npm_list
        .dependencies
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(name, pkg)| {
            let record = PackageRecord::new(&name, pkg.version.unwrap_or_default(), Manager::Npm);
            match record {
                Ok(record) => Some(match pkg.description {
                    Some(desc) => record.with_description(desc),
                    None => record,
                }),
                Err(e) => {
                    debug!("Dropping npm entry {}: {}", name, e);
                    None
                }
            }
        })
        .collect();

    Ok(records)
}
