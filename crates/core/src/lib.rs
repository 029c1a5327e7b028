//! # delivtab-core
//!
//! Ingestion engine for delivery-operations exports.
//!
//! This crate provides:
//! - Header normalization and logical column resolution
//! - Row categorization of delivery-task exports
//! - Metric and site-code column location in last-mile workbooks
//! - Best-sheet scoring and batch aggregation with per-file error records
//!
//! # Example
//!
//! ```no_run
//! use delivtab_core::{BatchAggregator, EngineConfig};
//!
//! let config = EngineConfig::default();
//! let batch = BatchAggregator::new(&config).unwrap();
//! let report = batch.count_rows(&["tasks_north.csv", "tasks_south.csv"]);
//! println!("completed: {}", report.totals.total_completed);
//! ```

/// Batch driver and reports.
pub mod batch;
/// Row categorization.
pub mod categorize;
/// Site-code column location.
pub mod codes;
/// Engine configuration.
pub mod config;
/// Error types and result aliases.
pub mod error;
/// Metric column location.
pub mod metric;
/// Text normalization.
pub mod normalize;
/// Header resolution.
pub mod resolve;
/// Best-sheet selection.
pub mod scorer;

pub use batch::{
    BatchAggregator, CountReport, FileCounts, FileError, FileKind, FileMetric, FileOutcome,
    FileSkip, MetricReport,
};
pub use categorize::{CategoryCounts, RowCategorizer};
pub use codes::CodeColumnLocator;
pub use config::{Category, CategoryRule, EngineConfig, MetricSpec, SiteCodeMap};
pub use error::{EngineError, EngineResult};
pub use metric::{ColumnMatch, MetricColumnLocator};
pub use resolve::HeaderResolver;
pub use scorer::{MetricExtraction, SheetScorer};
