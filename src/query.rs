//! Read-only views over an [`AuditResult`].
//!
//! None of these functions modify their input. Aliases are not searched
//! separately, so a record shared under `system` is reported once.

use std::borrow::Borrow;

use crate::model::{AuditResult, PackageRecord};

/// Keeps the records that pass `predicate`.
///
/// Sources left with no records are dropped. Aliases survive when their
/// target does.
pub fn filter<F>(result: &AuditResult, predicate: F) -> AuditResult
where
    F: Fn(&PackageRecord) -> bool,
{
    let mut filtered = AuditResult::new();

    for (source, records) in result.sources() {
        let kept: Vec<PackageRecord> = records.iter().filter(|r| predicate(r)).cloned().collect();
        if !kept.is_empty() {
            filtered.insert(source, kept);
        }
    }

    for (alias, target) in result.aliases() {
        filtered.add_alias(alias, target);
    }

    filtered
}

/// Finds records whose name or description contains `term`, ignoring case.
///
/// `predicate` is checked first and gates every record. An empty term
/// matches everything that passes it. Matches come back in source order,
/// then in each source's original order.
pub fn search<'a, F>(result: &'a AuditResult, term: &str, predicate: F) -> Vec<&'a PackageRecord>
where
    F: Fn(&PackageRecord) -> bool,
{
    let term = term.to_lowercase();

    result
        .records()
        .filter(|r| predicate(r))
        .filter(|r| {
            r.name().to_lowercase().contains(&term)
                || r
                    .description()
                    .is_some_and(|d| d.to_lowercase().contains(&term))
        })
        .collect()
}

/// Sorts records by name, case-insensitively. Equal names keep their
/// relative order.
pub fn sort_by_name<R, I>(records: I) -> Vec<R>
where
    R: Borrow<PackageRecord>,
    I: IntoIterator<Item = R>,
{
    let mut records: Vec<R> = records.into_iter().collect();
    records.sort_by_cached_key(|r| {
        let record: &PackageRecord = r.borrow();
        record.name().to_lowercase()
    });
    records
}
