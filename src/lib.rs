pub mod adapter;
pub mod aggregator;
pub mod classifier;
pub mod config;
pub mod model;
pub mod output;
pub mod platform;
pub mod query;

pub use adapter::{AdapterError, SourceAdapter};
pub use aggregator::Aggregator;
pub use classifier::{ExecutableClassifier, PathProbe, SystemPath};
pub use config::Config;
pub use model::{AuditResult, Manager, PackageRecord, Platform, RecordError, SYSTEM_ALIAS};
