//! Batch processing of export files.
//!
//! Each file is handled by a single-file function returning
//! [`EngineResult`]. The driver turns the result into a [`FileOutcome`] and
//! folds it into a report, so one bad file never stops the batch. Every input
//! file ends up in exactly one of the report's lists.

use crate::categorize::{CategoryCounts, RowCategorizer};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::resolve::HeaderResolver;
use crate::scorer::{MetricExtraction, SheetScorer};
use delivtab_sheet::{Book, TableDecoder};
use serde::Serialize;
use std::path::Path;

/// File kind, decided from the extension alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// `csv`, `txt`, `tsv`
    DelimitedText,
    /// `xlsx`, `xlsm`, `xlsb`, `xls`, `ods`
    Workbook,
    Other,
}

impl FileKind {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" | "txt" | "tsv" => FileKind::DelimitedText,
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => FileKind::Workbook,
            _ => FileKind::Other,
        }
    }
}

/// Result of processing one file.
#[derive(Debug)]
pub enum FileOutcome<T> {
    Done(T),
    Failed(EngineError),
    /// The file kind does not apply to the requested mode
    Skipped(String),
}

/// Category counts of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileCounts {
    pub file: String,
    #[serde(flatten)]
    pub counts: CategoryCounts,
}

/// Metric values of one workbook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileMetric {
    pub file: String,
    #[serde(flatten)]
    pub extraction: MetricExtraction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileError {
    pub file: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSkip {
    pub file: String,
    pub reason: String,
}

/// Row-aggregation report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CountReport {
    pub totals: CategoryCounts,
    pub per_file: Vec<FileCounts>,
    pub errors: Vec<FileError>,
    pub skipped: Vec<FileSkip>,
}

/// Metric-extraction report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricReport {
    pub results: Vec<FileMetric>,
    pub errors: Vec<FileError>,
    pub skipped: Vec<FileSkip>,
}

fn file_key(path: &Path) -> String {
    path.display().to_string()
}

/// Drives the engine over a list of files.
#[derive(Debug, Clone)]
pub struct BatchAggregator<'a> {
    categorizer: RowCategorizer<'a>,
    scorer: SheetScorer<'a>,
}

impl<'a> BatchAggregator<'a> {
    /// Create an aggregator; fails if `config` breaks a contract.
    pub fn new(config: &'a EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            categorizer: RowCategorizer::new(config),
            scorer: SheetScorer::new(config)?,
        })
    }

    /// Decode one delimited export and count its completed rows.
    pub fn count_file(&self, path: &Path) -> EngineResult<CategoryCounts> {
        let decoded = TableDecoder::decode_path(path)?;
        tracing::debug!(
            file = %path.display(),
            encoding = %decoded.encoding,
            delimiter = %char::from(decoded.delimiter),
            rows = decoded.sheet.row_count(),
            "decoded table"
        );
        let normalized = HeaderResolver::normalize(&decoded.sheet);
        self.categorizer.count(&normalized)
    }

    /// Read one workbook and extract the metric from its best sheet.
    pub fn extract_file(&self, path: &Path) -> EngineResult<MetricExtraction> {
        let book = Book::from_workbook(path)?;
        self.scorer.best_sheet(&book)
    }

    fn process<T>(
        path: &Path,
        wanted: FileKind,
        run: impl FnOnce(&Path) -> EngineResult<T>,
    ) -> FileOutcome<T> {
        let kind = FileKind::from_path(path);
        if kind != wanted {
            let reason = match wanted {
                FileKind::Workbook => "not a workbook",
                _ => "not a delimited text file",
            };
            tracing::debug!(file = %path.display(), reason, "skipping file");
            return FileOutcome::Skipped(reason.to_string());
        }

        match run(path) {
            Ok(value) => FileOutcome::Done(value),
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "failed to process file");
                FileOutcome::Failed(e)
            }
        }
    }

    /// Count completed rows across delimited exports.
    ///
    /// Totals are the sum of every successfully processed file.
    pub fn count_rows<P: AsRef<Path>>(&self, files: &[P]) -> CountReport {
        let mut report = CountReport::default();

        for path in files {
            let path = path.as_ref();
            let file = file_key(path);
            match Self::process(path, FileKind::DelimitedText, |p| self.count_file(p)) {
                FileOutcome::Done(counts) => {
                    report.totals += counts;
                    report.per_file.push(FileCounts { file, counts });
                }
                FileOutcome::Failed(e) => report.errors.push(FileError {
                    file,
                    error: e.to_string(),
                }),
                FileOutcome::Skipped(reason) => report.skipped.push(FileSkip { file, reason }),
            }
        }

        tracing::info!(
            files = files.len(),
            processed = report.per_file.len(),
            failed = report.errors.len(),
            skipped = report.skipped.len(),
            completed = report.totals.total_completed,
            "row counting finished"
        );
        report
    }

    /// Extract the metric from every workbook.
    pub fn extract_metric<P: AsRef<Path>>(&self, files: &[P]) -> MetricReport {
        let mut report = MetricReport::default();

        for path in files {
            let path = path.as_ref();
            let file = file_key(path);
            match Self::process(path, FileKind::Workbook, |p| self.extract_file(p)) {
                FileOutcome::Done(extraction) => {
                    report.results.push(FileMetric { file, extraction });
                }
                FileOutcome::Failed(e) => report.errors.push(FileError {
                    file,
                    error: e.to_string(),
                }),
                FileOutcome::Skipped(reason) => report.skipped.push(FileSkip { file, reason }),
            }
        }

        tracing::info!(
            files = files.len(),
            extracted = report.results.len(),
            failed = report.errors.len(),
            skipped = report.skipped.len(),
            "metric extraction finished"
        );
        report
    }
}
