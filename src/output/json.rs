//! The on-disk export format.
//!
//! The document is a JSON object keyed by source name, in audit order. Each
//! value is a list of package objects with the fields `name`, `version`,
//! `manager`, `location`, `size` and `description`; the last three are
//! `null` when unknown.

use anyhow::{Context, Result};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::model::{AuditResult, PackageRecord, RecordError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedPackage {
    pub name: String,
    pub version: String,
    pub manager: String,
    pub location: Option<String>,
    pub size: Option<u64>,
    pub description: Option<String>,
}

impl From<&PackageRecord> for ExportedPackage {
    fn from(record: &PackageRecord) -> Self {
        Self {
            name: record.name().to_string(),
            version: record.version().to_string(),
            manager: record.source().to_string(),
            location: record.location().map(str::to_string),
            size: record.size(),
            description: record.description().map(str::to_string),
        }
    }
}

impl ExportedPackage {
    /// Rebuilds the record, applying the same validation as construction.
    pub fn into_record(self) -> Result<PackageRecord, RecordError> {
        let mut record = PackageRecord::new(self.name, self.version, self.manager)?;
        if let Some(location) = self.location {
            record = record.with_location(location);
        }
        if let Some(size) = self.size {
            record = record.with_size(size);
        }
        if let Some(description) = self.description {
            record = record.with_description(description);
        }
        Ok(record)
    }
}

/// An export document: source name to packages, order preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportDocument {
    sources: Vec<(String, Vec<ExportedPackage>)>,
}

impl ExportDocument {
    /// Builds the document from an (already filtered) audit result.
    ///
    /// Aliases such as `system` are written as their own key after the real
    /// sources. Empty sources are left out.
    pub fn from_result(result: &AuditResult) -> Self {
        let sources = result
            .entries()
            .filter(|(_, records)| !records.is_empty())
            .map(|(name, records)| {
                (
                    name.to_string(),
                    records.iter().map(ExportedPackage::from).collect(),
                )
            })
            .collect();

        Self { sources }
    }

    pub fn sources(&self) -> impl Iterator<Item = (&str, &[ExportedPackage])> {
        self.sources
            .iter()
            .map(|(name, pkgs)| (name.as_str(), pkgs.as_slice()))
    }

    pub fn get(&self, source: &str) -> Option<&[ExportedPackage]> {
        self.sources
            .iter()
            .find(|(name, _)| name == source)
            .map(|(_, pkgs)| pkgs.as_slice())
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("Invalid export document")
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = self.to_json_string()?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json_str(&content)
    }
}

impl Serialize for ExportDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sources.len()))?;
        for (name, packages) in &self.sources {
            map.serialize_entry(name, packages)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ExportDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DocumentVisitor;

        impl<'de> Visitor<'de> for DocumentVisitor {
            type Value = ExportDocument;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of source names to package lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut sources = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, packages)) =
                    access.next_entry::<String, Vec<ExportedPackage>>()?
                {
                    sources.push((name, packages));
                }
                Ok(ExportDocument { sources })
            }
        }

        deserializer.deserialize_map(DocumentVisitor)
    }
}

/// Writes the export file and reports where it went.
pub fn export_to_file(result: &AuditResult, path: &Path) -> Result<()> {
    ExportDocument::from_result(result).write_to(path)?;
    println!("\nResults exported to {}", path.display());
    Ok(())
}
