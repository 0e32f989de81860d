//! Core data types for installed packages and audit results.
//!
//! This module contains the fundamental types used throughout pkgaudit:
//!
//! - [`PackageRecord`] - One installed package reported by one manager
//! - [`Manager`] - The known package managers
//! - [`Platform`] - Operating system platform
//! - [`AuditResult`] - Records grouped by the manager that reported them
//!
//! # Example
//!
//! ```
//! use pkgaudit::{AuditResult, Manager, PackageRecord};
//!
//! let record = PackageRecord::new("ripgrep", "14.1.0", Manager::Cargo).unwrap();
//! let mut result = AuditResult::new();
//! result.insert("cargo", vec![record]);
//!
//! println!("Found {} packages", result.total_records());
//! ```

mod audit;
mod package;

pub use audit::*;
pub use package::*;
