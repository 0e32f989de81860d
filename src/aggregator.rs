//! Runs every applicable adapter and gathers their records.
//!
//! A failing adapter never stops the audit. Managers that are not installed
//! are skipped quietly, any other failure (including a timeout) is logged as
//! a warning, and the remaining adapters still run.

use std::time::{Duration, Instant};

use futures::future::join_all;
use tracing::{debug, warn};

use crate::adapter::{all_adapters, AdapterError, PipAdapter, SourceAdapter};
use crate::config::Config;
use crate::model::{AuditResult, Manager, PackageRecord, Platform, SYSTEM_ALIAS};

/// Default upper bound on a single adapter call.
pub const DEFAULT_ADAPTER_TIMEOUT: Duration = Duration::from_secs(30);

pub struct Aggregator {
    adapters: Vec<Box<dyn SourceAdapter>>,
    platform: Platform,
    timeout: Duration,
    parallel: bool,
}

impl Aggregator {
    pub fn new(adapters: Vec<Box<dyn SourceAdapter>>) -> Self {
        Self {
            adapters,
            platform: Platform::current(),
            timeout: DEFAULT_ADAPTER_TIMEOUT,
            parallel: true,
        }
    }

    /// Builds an aggregator over the registered adapters, minus any the
    /// config disables.
    pub fn from_config(config: &Config) -> Self {
        let adapters = all_adapters()
            .into_iter()
            .filter(|a| !config.is_manager_disabled(a.manager()))
            .map(|a| match (&config.python, a.manager()) {
                (Some(python), Manager::Pip) => {
                    Box::new(PipAdapter::with_python(python)) as Box<dyn SourceAdapter>
                }
                _ => a,
            })
            .collect();

        Self::new(adapters)
            .with_timeout(Duration::from_secs(config.adapter_timeout_secs))
            .sequential(!config.parallel)
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn sequential(mut self, sequential: bool) -> Self {
        self.parallel = !sequential;
        self
    }

    /// Adapters that apply to the configured platform, in audit order.
    pub fn active_adapters(&self) -> impl Iterator<Item = &dyn SourceAdapter> {
        let platform = self.platform;
        self.adapters
            .iter()
            .map(|a| a.as_ref())
            .filter(move |a| a.is_supported_on(platform))
    }

    /// Runs the audit. Always returns, possibly with no sources.
    pub async fn run(&self) -> AuditResult {
        let adapters: Vec<_> = self.active_adapters().collect();

        let outcomes = if self.parallel && adapters.len() > 1 {
            join_all(adapters.iter().map(|a| self.fetch_one(*a))).await
        } else {
            let mut outcomes = Vec::with_capacity(adapters.len());
            for adapter in &adapters {
                outcomes.push(self.fetch_one(*adapter).await);
            }
            outcomes
        };

        let mut result = AuditResult::new();
        for (adapter, outcome) in adapters.iter().zip(outcomes) {
            if let Some(records) = outcome {
                if !records.is_empty() {
                    result.insert(adapter.manager().as_str(), records);
                }
            }
        }

        if let Some(system) = self.platform.system_manager() {
            if result.add_alias(SYSTEM_ALIAS, system.as_str()) {
                debug!("Aliased {} as {}", system, SYSTEM_ALIAS);
            }
        }

        result
    }

    /// Fetches from one adapter, turning every failure into `None`.
    async fn fetch_one(&self, adapter: &dyn SourceAdapter) -> Option<Vec<PackageRecord>> {
        let started = Instant::now();
        let outcome = match tokio::time::timeout(self.timeout, adapter.fetch()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(AdapterError::ExecutionFailure {
                command: adapter.manager().to_string(),
                reason: format!("timed out after {:?}", self.timeout),
            }),
        };

        match outcome {
            Ok(records) => {
                debug!(
                    "{} returned {} packages in {:?}",
                    adapter.name(),
                    records.len(),
                    started.elapsed()
                );
                Some(records)
            }
            Err(e) if e.is_not_installed() => {
                debug!("Skipping {}: {}", adapter.name(), e);
                None
            }
            Err(e) => {
                warn!("Error auditing {}: {}", adapter.manager(), e);
                None
            }
        }
    }
}
