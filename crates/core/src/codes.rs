//! Location of the site-code column.

use crate::error::{EngineError, EngineResult};
use crate::metric::ColumnMatch;
use crate::normalize::normalize_code;
use delivtab_sheet::Sheet;
use regex::Regex;
use std::collections::HashSet;

struct CodeProbe<'a> {
    sheet: &'a Sheet,
    expected: &'a HashSet<String>,
    pattern: &'a Regex,
}

impl CodeProbe<'_> {
    fn values(&self, col: usize) -> impl Iterator<Item = String> + '_ {
        self.sheet
            .rows()
            .map(move |row| row.get(col).map(|c| normalize_code(&c.as_str())).unwrap_or_default())
    }
}

type Strategy = fn(&CodeProbe<'_>) -> Option<usize>;

const STRATEGIES: [(&str, Strategy); 2] =
    [("hit_count", hit_count), ("pattern_fallback", pattern_fallback)];

/// Column holding the most distinct expected codes; the leftmost wins a tie.
fn hit_count(probe: &CodeProbe<'_>) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for col in 0..probe.sheet.col_count() {
        let found: HashSet<String> = probe
            .values(col)
            .filter(|value| probe.expected.contains(value))
            .collect();
        let hits = found.len();
        if hits > best.map_or(0, |(_, count)| count) {
            best = Some((col, hits));
        }
    }
    best.map(|(col, _)| col)
}

/// First column with any value shaped like a site code.
fn pattern_fallback(probe: &CodeProbe<'_>) -> Option<usize> {
    (0..probe.sheet.col_count())
        .find(|&col| probe.values(col).any(|value| probe.pattern.is_match(&value)))
}

/// Finds the column that lists site codes.
#[derive(Debug, Clone)]
pub struct CodeColumnLocator {
    expected: HashSet<String>,
    pattern: Regex,
}

impl CodeColumnLocator {
    pub fn new<'c, I>(codes: I, pattern: Regex) -> Self
    where
        I: IntoIterator<Item = &'c str>,
    {
        Self {
            expected: codes.into_iter().map(normalize_code).collect(),
            pattern,
        }
    }

    pub fn locate(&self, sheet: &Sheet) -> EngineResult<ColumnMatch> {
        let probe = CodeProbe {
            sheet,
            expected: &self.expected,
            pattern: &self.pattern,
        };

        for (heuristic, strategy) in STRATEGIES {
            if let Some(index) = strategy(&probe) {
                let found = ColumnMatch::at(sheet, index);
                tracing::debug!(sheet = sheet.name(), column = %found.name, heuristic, "located code column");
                return Ok(found);
            }
        }

        let mut expected: Vec<String> = self.expected.iter().cloned().collect();
        expected.sort();
        Err(EngineError::CodeColumnNotFound {
            expected,
            available: sheet.column_names().to_vec(),
        })
    }
}
