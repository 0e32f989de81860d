use async_trait::async_trait;
use pkgaudit::{
    output::ExportDocument, query, AdapterError, Aggregator, ExecutableClassifier, Manager,
    PackageRecord, PathProbe, Platform, SourceAdapter, SYSTEM_ALIAS,
};
use std::path::PathBuf;

struct StaticAdapter {
    manager: Manager,
    records: fn() -> Result<Vec<PackageRecord>, AdapterError>,
}

#[async_trait]
impl SourceAdapter for StaticAdapter {
    fn name(&self) -> &'static str {
        "static"
    }

    fn manager(&self) -> Manager {
        self.manager
    }

    fn supported_platforms(&self) -> &[Platform] {
        &[Platform::Linux, Platform::MacOS]
    }

    async fn fetch(&self) -> Result<Vec<PackageRecord>, AdapterError> {
        (self.records)()
    }
}

/// PATH where nothing resolves.
struct EmptyPath;

impl PathProbe for EmptyPath {
    fn lookup(&self, _name: &str) -> Option<PathBuf> {
        None
    }
}

fn cargo_records() -> Result<Vec<PackageRecord>, AdapterError> {
    Ok(vec![PackageRecord::new("ripgrep", "13.0", "cargo").unwrap()])
}

fn pip_records() -> Result<Vec<PackageRecord>, AdapterError> {
    Ok(vec![PackageRecord::new("requests", "2.25", "pip")
        .unwrap()
        .with_location("/usr/lib/site-packages")])
}

fn broken_npm() -> Result<Vec<PackageRecord>, AdapterError> {
    Err(AdapterError::ParseFailure {
        command: "npm list".to_string(),
        reason: "expected value at line 1 column 1".to_string(),
    })
}

fn flatpak_records() -> Result<Vec<PackageRecord>, AdapterError> {
    Ok(vec![PackageRecord::new("org.firefox.Firefox", "90.0", "flatpak").unwrap()])
}

fn brew_records() -> Result<Vec<PackageRecord>, AdapterError> {
    Ok(vec![PackageRecord::new("git", "2.43.0", "brew").unwrap()])
}

fn adapter(
    manager: Manager,
    records: fn() -> Result<Vec<PackageRecord>, AdapterError>,
) -> Box<dyn SourceAdapter> {
    Box::new(StaticAdapter { manager, records })
}

#[tokio::test]
async fn test_executables_view_keeps_only_tools() {
    let aggregator = Aggregator::new(vec![
        adapter(Manager::Cargo, cargo_records),
        adapter(Manager::Pip, pip_records),
        adapter(Manager::Npm, broken_npm),
    ])
    .with_platform(Platform::Linux);

    let result = aggregator.run().await;
    assert_eq!(result.len(), 2);

    let classifier = ExecutableClassifier::with_probe(EmptyPath);
    let executables = query::filter(&result, |r| classifier.is_executable(r));

    let names: Vec<_> = executables.records().map(|r| r.name()).collect();
    assert_eq!(names, vec!["ripgrep"]);
    assert!(executables.get("pip").is_none());
}

#[tokio::test]
async fn test_search_and_export_roundtrip() {
    let aggregator = Aggregator::new(vec![
        adapter(Manager::Flatpak, flatpak_records),
        adapter(Manager::Brew, brew_records),
        adapter(Manager::Pip, pip_records),
    ])
    .with_platform(Platform::MacOS);

    let result = aggregator.run().await;
    assert_eq!(result.alias_target(SYSTEM_ALIAS), Some("brew"));

    let found = query::search(&result, "fire", |_| true);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name(), "org.firefox.Firefox");

    let classifier = ExecutableClassifier::with_probe(EmptyPath);
    let filtered = query::filter(&result, |r| classifier.is_executable(r));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("system_packages.json");
    ExportDocument::from_result(&filtered).write_to(&path).unwrap();

    let parsed = ExportDocument::read_from(&path).unwrap();
    let keys: Vec<_> = parsed.sources().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["flatpak", "brew", SYSTEM_ALIAS]);

    let mut triples: Vec<_> = parsed
        .sources()
        .filter(|(k, _)| *k != SYSTEM_ALIAS)
        .flat_map(|(_, pkgs)| pkgs.iter())
        .map(|p| (p.name.clone(), p.version.clone(), p.manager.clone()))
        .collect();
    triples.sort();
    assert_eq!(
        triples,
        vec![
            ("git".to_string(), "2.43.0".to_string(), "brew".to_string()),
            (
                "org.firefox.Firefox".to_string(),
                "90.0".to_string(),
                "flatpak".to_string()
            ),
        ]
    );
}
