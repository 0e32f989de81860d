use super::{require_success, run_command, AdapterError, ALL_PLATFORMS};
use crate::model::{Manager, PackageRecord, Platform};
use async_trait::async_trait;
use serde::Deserialize;
use std::process::Output;
use tracing::debug;

/// Lists packages installed for a Python interpreter via `python -m pip`.
pub struct PipAdapter {
    python: String,
}

impl PipAdapter {
    pub fn with_python(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
        }
    }
}

impl Default for PipAdapter {
    fn default() -> Self {
        let python = if cfg!(target_os = "windows") { "python" } else { "python3" };
        Self::with_python(python)
    }
}

#[derive(Deserialize)]
struct PipListEntry {
    name: String,
}

#[async_trait]
impl super::SourceAdapter for PipAdapter {
    fn name(&self) -> &'static str {
        "pip Packages"
    }

    fn manager(&self) -> Manager {
        Manager::Pip
    }

    fn supported_platforms(&self) -> &[Platform] {
        ALL_PLATFORMS
    }

    async fn fetch(&self) -> Result<Vec<PackageRecord>, AdapterError> {
        let list_args = ["-m", "pip", "list", "--format=json"];
        let output = run_command(&self.python, &list_args).await?;
        check_list_status(&self.python, &list_args, &output)?;

        let names = parse_list(&String::from_utf8_lossy(&output.stdout))
            .map_err(|e| AdapterError::parse("pip list", e))?;
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let mut show_args = vec!["-m", "pip", "show"];
        show_args.extend(names.iter().map(String::as_str));
        let output = run_command(&self.python, &show_args).await?;

        // `pip show` exits non-zero when any one name is missing but still
        // prints the rest.
        if output.stdout.is_empty() {
            require_success(&self.python, &show_args, &output)?;
        }

        Ok(parse_show(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// An interpreter without the pip module counts as pip not being installed.
fn check_list_status(python: &str, args: &[&str], output: &Output) -> Result<(), AdapterError> {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !output.status.success() && stderr.contains("No module named pip") {
        return Err(AdapterError::NotInstalled {
            program: "pip".to_string(),
        });
    }
    require_success(python, args, output)
}

fn parse_list(stdout: &str) -> Result<Vec<String>, serde_json::Error> {
    let entries: Vec<PipListEntry> = serde_json::from_str(stdout)?;
    Ok(entries.into_iter().map(|e| e.name).collect())
}

/// Parses `pip show` output: `Key: value` blocks separated by `---` lines.
fn parse_show(stdout: &str) -> Vec<PackageRecord> {
    let mut records = Vec::new();
    let mut block = ShowBlock::default();

    for line in stdout.lines() {
        if line.trim() == "---" {
            records.extend(block.take().into_record());
            continue;
        }
        // continuation of a multi-line value
        if line.starts_with(char::is_whitespace) {
            continue;
        }

        let (key, value) = match line.split_once(':') {
            Some((key, value)) => (key.trim(), value.trim()),
            None => continue,
        };
        let value = (!value.is_empty()).then(|| value.to_string());

        match key {
            "Name" => block.name = value,
            "Version" => block.version = value,
            "Location" => block.location = value,
            "Summary" => block.summary = value,
            _ => {}
        }
    }
    records.extend(block.into_record());

    records
}

#[derive(Default)]
struct ShowBlock {
    name: Option<String>,
    version: Option<String>,
    location: Option<String>,
    summary: Option<String>,
}

impl ShowBlock {
    fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    fn into_record(self) -> Option<PackageRecord> {
        if self.name.is_none() && self.version.is_none() {
            return None;
        }

        let record = match PackageRecord::new(
            self.name.unwrap_or_default(),
            self.version.unwrap_or_default(),
            Manager::Pip,
        ) {
            Ok(record) => record,
            Err(e) => {
                debug!("Dropping pip entry: {}", e);
                return None;
            }
        };

        let record = match self.location {
            Some(location) => record.with_location(location),
            None => record,
        };
        Some(match self.summary {
            Some(summary) => record.with_description(summary),
            None => record,
        })
    }
}
