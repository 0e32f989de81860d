use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pkgaudit::{
    adapter::all_adapters,
    config::Config,
    model::{AuditResult, PackageRecord, Platform},
    output::{export_to_file, print_search_results, print_summary},
    query, Aggregator, ExecutableClassifier,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pkgaudit")]
#[command(
    author,
    version,
    about = "System package auditor: find out what you've installed"
)]
struct Cli {
    /// Show every package, not only ones that look like CLI tools
    #[arg(long, global = true, overrides_with = "executables")]
    all: bool,

    /// Only show packages that look like CLI tools (default)
    #[arg(long, global = true, overrides_with = "all")]
    executables: bool,

    /// Also export the results to a JSON file
    #[arg(long)]
    json: bool,

    /// Where to write the JSON export (default: system_packages.json)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Query package managers one at a time
    #[arg(long, global = true)]
    sequential: bool,

    /// Seconds to wait for each package manager
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search package names and descriptions
    Search {
        /// Text to look for (multiple words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        term: Vec<String>,
    },

    /// List package managers and whether they apply here
    ListSources,

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Ignoring config file: {:#}", e);
        Config::default()
    });

    if cli.sequential {
        config.parallel = false;
    }
    if let Some(secs) = cli.timeout {
        config.adapter_timeout_secs = secs;
    }

    let executables_only = if cli.all {
        false
    } else if cli.executables {
        true
    } else {
        config.executables_only
    };
    config.executables_only = executables_only;

    match cli.command {
        Some(Commands::Search { term }) => {
            let term = term.join(" ");
            let result = audit(&config).await;
            let classifier = ExecutableClassifier::new();

            let found = query::search(&result, &term, |r| {
                include_record(&config, &classifier, executables_only, r)
            });
            print_search_results(&found, &term);
            Ok(())
        }
        Some(Commands::ListSources) => {
            list_sources(&config);
            Ok(())
        }
        Some(Commands::Config { init, path }) => handle_config(&config, init, path),
        None => {
            let result = audit(&config).await;
            let classifier = ExecutableClassifier::new();

            let filtered = query::filter(&result, |r| {
                include_record(&config, &classifier, executables_only, r)
            });
            print_summary(&filtered);

            if cli.json {
                let path = cli
                    .output
                    .unwrap_or_else(|| PathBuf::from(&config.export_path));
                export_results(&filtered, &path);
            }
            Ok(())
        }
    }
}

/// Runs every package manager with a spinner on stderr.
async fn audit(config: &Config) -> AuditResult {
    let aggregator = Aggregator::from_config(config);

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Auditing package managers...");

    let result = aggregator.run().await;

    pb.finish_and_clear();
    result
}

fn include_record(
    config: &Config,
    classifier: &ExecutableClassifier,
    executables_only: bool,
    record: &PackageRecord,
) -> bool {
    if config.ignore.should_ignore_package(record.name()) {
        return false;
    }
    !executables_only || classifier.is_executable(record)
}

fn list_sources(config: &Config) {
    let platform = Platform::current();

    println!("Available sources:");
    println!();

    for adapter in all_adapters() {
        let manager = adapter.manager();
        let status = if config.is_manager_disabled(manager) {
            "disabled"
        } else if adapter.is_supported_on(platform) {
            "yes"
        } else {
            "no"
        };

        println!(
            "  {:<8} {:<26} [supported: {}]",
            manager.as_str(),
            adapter.name(),
            status
        );
    }

    if let Some(system) = platform.system_manager() {
        println!();
        println!("  'system' refers to {} on this platform", system.as_str());
    }
}

fn handle_config(config: &Config, init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
        } else {
            Config::default().save()?;
            println!("Created config file at: {}", config_path.display());
            println!();
            println!("{}", Config::generate_default_config());
        }
        return Ok(());
    }

    let origin = if config_path.exists() {
        config_path.display().to_string()
    } else {
        "built-in defaults, run 'pkgaudit config --init' to create a file".to_string()
    };
    print!("{}", describe_config(config, &origin));
    Ok(())
}

/// Effective settings after command-line overrides.
fn describe_config(config: &Config, origin: &str) -> String {
    fn list_or_none(items: &[String]) -> String {
        if items.is_empty() {
            "none".to_string()
        } else {
            items.join(", ")
        }
    }

    let filter = if config.executables_only {
        "executables only"
    } else {
        "all packages"
    };
    let mode = if config.parallel { "parallel" } else { "sequential" };
    let python = config.python.as_deref().unwrap_or("default interpreter");

    let mut out = format!("Settings from {}\n\n", origin);
    out.push_str(&format!("  {:<18} {}\n", "filter", filter));
    out.push_str(&format!("  {:<18} {}\n", "export path", config.export_path));
    out.push_str(&format!(
        "  {:<18} {}s per manager\n",
        "timeout", config.adapter_timeout_secs
    ));
    out.push_str(&format!("  {:<18} {}\n", "mode", mode));
    out.push_str(&format!("  {:<18} {}\n", "python", python));
    out.push_str(&format!(
        "  {:<18} {}\n",
        "disabled managers",
        list_or_none(&config.disabled_managers)
    ));
    out.push_str(&format!(
        "  {:<18} {}\n",
        "ignored packages",
        list_or_none(&config.ignore.packages)
    ));
    out
}

/// Writes the JSON export. A failed write is reported but does not fail
/// the audit.
fn export_results(result: &AuditResult, path: &Path) -> bool {
    match export_to_file(result, path) {
        Ok(()) => true,
        Err(e) => {
            warn!("Export failed: {:#}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_last_filter_flag_wins() {
        let cli = Cli::try_parse_from(["pkgaudit", "--all", "--executables"]).unwrap();
        assert!(cli.executables && !cli.all);

        let cli = Cli::try_parse_from(["pkgaudit", "--executables", "--all"]).unwrap();
        assert!(cli.all && !cli.executables);
    }

    #[test]
    fn test_search_joins_terms_and_accepts_trailing_flags() {
        let cli = Cli::try_parse_from(["pkgaudit", "search", "git", "lfs", "--all"]).unwrap();
        assert!(cli.all);
        match cli.command {
            Some(Commands::Search { term }) => assert_eq!(term.join(" "), "git lfs"),
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_search_requires_term() {
        assert!(Cli::try_parse_from(["pkgaudit", "search"]).is_err());
    }

    #[test]
    fn test_ignored_packages_are_excluded() {
        let config = Config {
            ignore: pkgaudit::config::IgnoreConfig {
                packages: vec!["setuptools*".to_string()],
            },
            ..Config::default()
        };
        let classifier = ExecutableClassifier::new();
        let record = PackageRecord::new("setuptools-scm", "8.0", "cargo").unwrap();
        let other = PackageRecord::new("ripgrep", "14.1.0", "cargo").unwrap();

        assert!(!include_record(&config, &classifier, false, &record));
        assert!(include_record(&config, &classifier, true, &other));
    }

    #[test]
    fn test_describe_config_shows_overrides() {
        let config = Config {
            disabled_managers: vec!["brew".to_string(), "npm".to_string()],
            parallel: false,
            adapter_timeout_secs: 5,
            ..Config::default()
        };

        let text = describe_config(&config, "/tmp/pkgaudit/config.toml");
        assert!(text.starts_with("Settings from /tmp/pkgaudit/config.toml"));
        assert!(text.contains("executables only"));
        assert!(text.contains("5s per manager"));
        assert!(text.contains("sequential"));
        assert!(text.contains("brew, npm"));
        assert!(text.contains("ignored packages"));
    }

    #[test]
    fn test_describe_config_defaults() {
        let text = describe_config(&Config::default(), "built-in defaults");
        assert!(text.contains("parallel"));
        assert!(text.contains("default interpreter"));
        assert!(text.contains("system_packages.json"));
    }

    #[test]
    fn test_unwritable_export_does_not_fail() {
        let dir = tempfile::tempdir().unwrap();
        let mut result = AuditResult::new();
        result.insert(
            "cargo",
            vec![PackageRecord::new("ripgrep", "14.1.0", "cargo").unwrap()],
        );

        let missing = dir.path().join("no-such-dir").join("out.json");
        assert!(!export_results(&result, &missing));

        let path = dir.path().join("out.json");
        assert!(export_results(&result, &path));
        assert!(path.exists());
    }
}
