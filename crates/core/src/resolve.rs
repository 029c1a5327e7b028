//! Resolution of semantic columns from header variants.
//!
//! A logical field ("status", "type") is described by an ordered list of
//! acceptable labels. Resolution runs two passes over the normalized header:
//! exact label match, then substring containment. The first pass is exhausted
//! before the second starts, so an exact match always wins.

use crate::error::{EngineError, EngineResult};
use crate::normalize::normalize_label;
use delivtab_sheet::Sheet;

/// One resolution pass: returns the matching column name, if any.
type Strategy = fn(columns: &[String], candidates: &[String]) -> Option<String>;

const STRATEGIES: [(&str, Strategy); 2] =
    [("exact", exact_match), ("substring", substring_match)];

/// Pass 1: the first candidate, in list order, equal to some column name.
fn exact_match(columns: &[String], candidates: &[String]) -> Option<String> {
    candidates
        .iter()
        .find(|candidate| columns.contains(candidate))
        .cloned()
}

/// Pass 2: the first column, in table order, containing any candidate.
fn substring_match(columns: &[String], candidates: &[String]) -> Option<String> {
    columns
        .iter()
        .find(|column| {
            candidates
                .iter()
                .any(|candidate| column.contains(candidate.as_str()))
        })
        .cloned()
}

/// Normalizes headers and resolves logical columns against them.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderResolver;

impl HeaderResolver {
    /// Return a working copy whose column names are normalized.
    ///
    /// The input sheet keeps its original headers for display.
    pub fn normalize(sheet: &Sheet) -> Sheet {
        let mut working = sheet.clone();
        working.map_column_names(normalize_label);
        working
    }

    /// Resolve `field` to a column of a normalized sheet.
    ///
    /// Candidates are normalized before comparison. An empty candidate list is
    /// a configuration defect and reported as [`EngineError::InvalidConfig`].
    pub fn resolve(sheet: &Sheet, field: &str, candidates: &[String]) -> EngineResult<String> {
        if candidates.is_empty() {
            return Err(EngineError::invalid_config(format!(
                "no candidate labels for column '{field}'"
            )));
        }

        let candidates: Vec<String> = candidates.iter().map(|c| normalize_label(c)).collect();
        let columns = sheet.column_names();

        for (pass, strategy) in STRATEGIES {
            if let Some(column) = strategy(columns, &candidates) {
                tracing::debug!(field, column = %column, pass, "resolved column");
                return Ok(column);
            }
        }

        Err(EngineError::column_not_found(field, &candidates, columns))
    }
}
