use std::sync::Arc;

use super::PackageRecord;

/// Result key under which the platform's native manager is aliased.
pub const SYSTEM_ALIAS: &str = "system";

#[derive(Debug, Clone)]
struct SourceEntry {
    name: String,
    records: Arc<[PackageRecord]>,
}

/// Installed packages grouped by the source that reported them.
///
/// Sources keep the order they were inserted in. Aliases are lookup
/// entries that resolve to an existing source and share its record list;
/// they never own a copy of it.
#[derive(Debug, Clone, Default)]
pub struct AuditResult {
    sources: Vec<SourceEntry>,
    aliases: Vec<(String, String)>,
}

impl AuditResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a source's records, replacing an existing source of the same
    /// name in place. An alias with the same name is dropped.
    pub fn insert(&mut self, source: impl Into<String>, records: Vec<PackageRecord>) {
        let source = source.into();
        let records: Arc<[PackageRecord]> = records.into();
        self.aliases.retain(|(alias, _)| *alias != source);

        match self.sources.iter_mut().find(|e| e.name == source) {
            Some(entry) => entry.records = records,
            None => self.sources.push(SourceEntry {
                name: source,
                records,
            }),
        }
    }

    /// Points `alias` at `target`'s records.
    ///
    /// Returns false, and records nothing, if `target` is not a source in
    /// this result or `alias` already names a source.
    pub fn add_alias(&mut self, alias: impl Into<String>, target: &str) -> bool {
        let alias = alias.into();
        if !self.contains_source(target) || self.contains_source(&alias) {
            return false;
        }

        self.aliases.retain(|(a, _)| *a != alias);
        self.aliases.push((alias, target.to_string()));
        true
    }

    /// Looks up a source or alias by name.
    pub fn get(&self, name: &str) -> Option<&[PackageRecord]> {
        self.entry(name).map(|e| &*e.records)
    }

    /// Returns the shared record list for a source or alias.
    pub fn shared(&self, name: &str) -> Option<Arc<[PackageRecord]>> {
        self.entry(name).map(|e| Arc::clone(&e.records))
    }

    pub fn alias_target(&self, alias: &str) -> Option<&str> {
        self.aliases
            .iter()
            .find(|(a, _)| a == alias)
            .map(|(_, t)| t.as_str())
    }

    /// Iterates real sources in insertion order. Aliases are not included.
    pub fn sources(&self) -> impl Iterator<Item = (&str, &[PackageRecord])> {
        self.sources.iter().map(|e| (e.name.as_str(), &*e.records))
    }

    /// Iterates `(alias, target)` pairs.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(a, t)| (a.as_str(), t.as_str()))
    }

    /// Iterates real sources followed by aliases, each with its records.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[PackageRecord])> {
        self.sources().chain(self.aliases.iter().filter_map(move |(alias, target)| {
            self.get(target).map(|records| (alias.as_str(), records))
        }))
    }

    /// All records across real sources, in source then insertion order.
    pub fn records(&self) -> impl Iterator<Item = &PackageRecord> {
        self.sources.iter().flat_map(|e| e.records.iter())
    }

    pub fn contains_source(&self, name: &str) -> bool {
        self.sources.iter().any(|e| e.name == name)
    }

    /// Number of real sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn total_records(&self) -> usize {
        self.sources.iter().map(|e| e.records.len()).sum()
    }

    fn entry(&self, name: &str) -> Option<&SourceEntry> {
        let name = self.alias_target(name).unwrap_or(name);
        self.sources.iter().find(|e| e.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, source: &str) -> PackageRecord {
        PackageRecord::new(name, "1.0", source).unwrap()
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut result = AuditResult::new();
        result.insert("pip", vec![record("requests", "pip")]);
        result.insert("cargo", vec![record("ripgrep", "cargo")]);
        result.insert("npm", vec![record("typescript", "npm")]);

        let names: Vec<_> = result.sources().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["pip", "cargo", "npm"]);
        assert_eq!(result.len(), 3);
        assert_eq!(result.total_records(), 3);
    }

    #[test]
    fn test_same_name_under_two_sources() {
        let mut result = AuditResult::new();
        result.insert("pip", vec![record("black", "pip")]);
        result.insert("brew", vec![record("black", "brew")]);

        let sources: Vec<_> = result.records().map(|r| r.source()).collect();
        assert_eq!(sources, vec!["pip", "brew"]);
    }

    #[test]
    fn test_alias_shares_records() {
        let mut result = AuditResult::new();
        result.insert("brew", vec![record("git", "brew")]);

        assert!(result.add_alias(SYSTEM_ALIAS, "brew"));
        assert_eq!(result.alias_target(SYSTEM_ALIAS), Some("brew"));

        let system = result.shared(SYSTEM_ALIAS).unwrap();
        let brew = result.shared("brew").unwrap();
        assert!(Arc::ptr_eq(&system, &brew));

        // aliases are not sources
        assert_eq!(result.len(), 1);
        assert_eq!(result.total_records(), 1);
        assert_eq!(result.entries().count(), 2);
    }

    #[test]
    fn test_alias_requires_existing_target() {
        let mut result = AuditResult::new();
        assert!(!result.add_alias(SYSTEM_ALIAS, "brew"));
        assert!(result.get(SYSTEM_ALIAS).is_none());
    }

    #[test]
    fn test_insert_replaces_alias_of_same_name() {
        let mut result = AuditResult::new();
        result.insert("brew", vec![record("git", "brew")]);
        assert!(result.add_alias(SYSTEM_ALIAS, "brew"));

        result.insert(SYSTEM_ALIAS, vec![record("coreutils", SYSTEM_ALIAS)]);

        assert_eq!(result.alias_target(SYSTEM_ALIAS), None);
        assert_eq!(result.get(SYSTEM_ALIAS).unwrap()[0].name(), "coreutils");
        assert_eq!(result.get("brew").unwrap()[0].name(), "git");
        assert_eq!(result.len(), 2);
        assert_eq!(result.entries().count(), 2);
    }

    #[test]
    fn test_empty_result() {
        let result = AuditResult::new();
        assert!(result.is_empty());
        assert_eq!(result.total_records(), 0);
        assert_eq!(result.records().count(), 0);
    }
}
