use crate::model::{AuditResult, PackageRecord};
use crate::query::sort_by_name;
use chrono::{DateTime, Local};
use std::fmt::Write;
use tabled::{settings::Style, Table, Tabled};

const DESCRIPTION_WIDTH: usize = 50;

#[derive(Tabled)]
struct PackageRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Description")]
    description: String,
}

#[derive(Tabled)]
struct SearchRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Manager")]
    manager: String,
}

pub fn print_summary(result: &AuditResult) {
    print!("{}", format_summary(result, Local::now()));
}

pub fn print_search_results(records: &[&PackageRecord], term: &str) {
    print!("{}", format_search_results(records, term));
}

/// Renders the audit summary: totals, then one table per source.
pub fn format_summary(result: &AuditResult, audited_at: DateTime<Local>) -> String {
    let mut out = String::new();
    let rule = "=".repeat(80);

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "SYSTEM PACKAGE AUDIT SUMMARY");
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "Total packages found: {}", result.total_records());
    let _ = writeln!(out, "Package managers detected: {}", result.len());
    let _ = writeln!(
        out,
        "Audit completed: {}",
        audited_at.format("%Y-%m-%d %H:%M:%S")
    );

    for (source, records) in result.sources() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{} ({} packages):",
            source.to_uppercase(),
            records.len()
        );

        let rows: Vec<PackageRow> = sort_by_name(records.iter())
            .into_iter()
            .map(|r| PackageRow {
                name: r.name().to_string(),
                version: r.version().to_string(),
                description: r
                    .description()
                    .map(|d| truncate(d, DESCRIPTION_WIDTH))
                    .unwrap_or_else(|| "-".to_string()),
            })
            .collect();

        let table = Table::new(rows).with(Style::rounded()).to_string();
        let _ = writeln!(out, "{}", table);
    }

    for (alias, target) in result.aliases() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{} -> {} (same packages)",
            alias.to_uppercase(),
            target.to_uppercase()
        );
    }

    out
}

pub fn format_search_results(records: &[&PackageRecord], term: &str) -> String {
    if records.is_empty() {
        return format!("\nNo packages found matching '{}'\n", term);
    }

    let rows: Vec<SearchRow> = records
        .iter()
        .map(|r| SearchRow {
            name: r.name().to_string(),
            version: r.version().to_string(),
            manager: r.source().to_string(),
        })
        .collect();

    format!(
        "\nFound {} package(s) matching '{}':\n{}\n",
        records.len(),
        term,
        Table::new(rows).with(Style::rounded())
    )
}

/// Shortens `s` to `max_len` characters, marking the cut with `...`.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SYSTEM_ALIAS;
    use chrono::TimeZone;

    fn audited_at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 50), "short");
        assert_eq!(truncate(&"a".repeat(60), 50), format!("{}...", "a".repeat(50)));
        // multi-byte characters are never split
        assert_eq!(truncate("ééééé", 3), "ééé...");
    }

    #[test]
    fn test_summary_lists_sources_sorted() {
        let mut result = AuditResult::new();
        result.insert(
            "cargo",
            vec![
                PackageRecord::new("ripgrep", "14.1.0", "cargo").unwrap(),
                PackageRecord::new("Bat", "0.24.0", "cargo").unwrap(),
            ],
        );
        result.insert(
            "brew",
            vec![PackageRecord::new("git", "2.43.0", "brew")
                .unwrap()
                .with_description("Distributed revision control system")],
        );
        result.add_alias(SYSTEM_ALIAS, "brew");

        let out = format_summary(&result, audited_at());

        assert!(out.contains("Total packages found: 3"));
        assert!(out.contains("Package managers detected: 2"));
        assert!(out.contains("Audit completed: 2024-03-01 12:30:00"));
        assert!(out.contains("CARGO (2 packages):"));
        assert!(out.contains("SYSTEM -> BREW"));
        assert!(out.contains("Distributed revision control system"));
        assert!(out.find("Bat").unwrap() < out.find("ripgrep").unwrap());
    }

    #[test]
    fn test_summary_of_empty_result() {
        let out = format_summary(&AuditResult::new(), audited_at());
        assert!(out.contains("Total packages found: 0"));
        assert!(out.contains("Package managers detected: 0"));
    }

    #[test]
    fn test_search_results() {
        let httpie = PackageRecord::new("httpie", "3.2.2", "pip").unwrap();
        let out = format_search_results(&[&httpie], "http");

        assert!(out.contains("Found 1 package(s) matching 'http':"));
        assert!(out.contains("httpie"));
        assert!(out.contains("pip"));

        let none = format_search_results(&[], "zzz");
        assert!(none.contains("No packages found matching 'zzz'"));
    }
}
