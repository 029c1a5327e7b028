//! Location of the metric column in a last-mile workbook sheet.
//!
//! Metric headers drift between exports ("Доля доставок ПМ в срок, %",
//! "доля доставок последней мили в срок"), so the locator runs three
//! heuristics in order and takes the first hit:
//!
//! 1. `compact_exact`: compact header equals the compact target label.
//! 2. `compact_containment`: compact header is contained in the compact target
//!    or contains it.
//! 3. `keyword_score`: the first header containing at least
//!    [`MetricSpec::min_keyword_hits`] of the configured keyword stems.

use crate::config::MetricSpec;
use crate::error::{EngineError, EngineResult};
use crate::normalize::compact_label;
use delivtab_sheet::Sheet;

/// A column picked by one of the locators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMatch {
    /// Position in the sheet
    pub index: usize,
    /// Header as it appears in the sheet
    pub name: String,
}

impl ColumnMatch {
    pub(crate) fn at(sheet: &Sheet, index: usize) -> Self {
        Self {
            index,
            name: sheet.column_names()[index].clone(),
        }
    }
}

/// Compact headers and target shared by every strategy.
struct MetricProbe<'a> {
    headers: Vec<String>,
    target: String,
    keywords: Vec<String>,
    spec: &'a MetricSpec,
}

type Strategy = fn(&MetricProbe<'_>) -> Option<usize>;

const STRATEGIES: [(&str, Strategy); 3] = [
    ("compact_exact", compact_exact),
    ("compact_containment", compact_containment),
    ("keyword_score", keyword_score),
];

fn compact_exact(probe: &MetricProbe<'_>) -> Option<usize> {
    probe.headers.iter().position(|h| *h == probe.target)
}

fn compact_containment(probe: &MetricProbe<'_>) -> Option<usize> {
    probe.headers.iter().position(|h| {
        !h.is_empty() && (probe.target.contains(h.as_str()) || h.contains(probe.target.as_str()))
    })
}

fn keyword_score(probe: &MetricProbe<'_>) -> Option<usize> {
    probe.headers.iter().position(|h| {
        let hits = probe
            .keywords
            .iter()
            .filter(|keyword| h.contains(keyword.as_str()))
            .count();
        hits >= probe.spec.min_keyword_hits
    })
}

/// Finds the column holding the configured metric.
#[derive(Debug, Clone, Copy)]
pub struct MetricColumnLocator<'a> {
    spec: &'a MetricSpec,
}

impl<'a> MetricColumnLocator<'a> {
    pub fn new(spec: &'a MetricSpec) -> Self {
        Self { spec }
    }

    /// Locate the metric column among the raw headers of `sheet`.
    pub fn locate(&self, sheet: &Sheet) -> EngineResult<ColumnMatch> {
        let probe = MetricProbe {
            headers: sheet.column_names().iter().map(|h| compact_label(h)).collect(),
            target: compact_label(&self.spec.label),
            keywords: self
                .spec
                .keywords
                .iter()
                .map(|k| compact_label(k))
                .filter(|k| !k.is_empty())
                .collect(),
            spec: self.spec,
        };

        for (heuristic, strategy) in STRATEGIES {
            if let Some(index) = strategy(&probe) {
                let found = ColumnMatch::at(sheet, index);
                tracing::debug!(sheet = sheet.name(), column = %found.name, heuristic, "located metric column");
                return Ok(found);
            }
        }

        Err(EngineError::MetricNotFound {
            label: self.spec.label.clone(),
            available: sheet.column_names().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Sheet {
        Sheet::from_data(vec![names.to_vec()])
    }

    fn locate(names: &[&str]) -> EngineResult<ColumnMatch> {
        let spec = MetricSpec::default();
        MetricColumnLocator::new(&spec).locate(&header(names))
    }

    #[test]
    fn test_exact_label_with_noise() {
        let found = locate(&["Код", "  ДОЛЯ доставок последней мили, в срок "]).unwrap();
        assert_eq!(found.index, 1);
        assert_eq!(found.name, "  ДОЛЯ доставок последней мили, в срок ");
    }

    #[test]
    fn test_exact_beats_containment() {
        let found = locate(&[
            "Доля доставок последней мили в срок (план)",
            "Доля доставок последней мили в срок",
        ])
        .unwrap();
        assert_eq!(found.index, 1);
    }

    #[test]
    fn test_containment_either_direction() {
        let found = locate(&["Код", "Доставок последней мили"]).unwrap();
        assert_eq!(found.index, 1);

        let found = locate(&["Код", "Итого: доля доставок последней мили в срок, %"]).unwrap();
        assert_eq!(found.index, 1);
    }

    #[test]
    fn test_punctuation_only_header_never_matches() {
        let found = locate(&["—", "Доставок последней мили"]).unwrap();
        assert_eq!(found.index, 1);
    }

    #[test]
    fn test_keyword_threshold() {
        let found = locate(&["Код", "Доля доставок ПМ в срок, %"]).unwrap();
        assert_eq!(found.index, 1);

        let err = locate(&["Код", "Доставки ПМ"]).unwrap_err();
        assert!(matches!(err, EngineError::MetricNotFound { ref available, .. } if available.len() == 2));
    }

    #[test]
    fn test_multi_word_keywords() {
        let spec = MetricSpec {
            keywords: vec![
                "последней мили".to_string(),
                "в срок".to_string(),
                "доля доставок".to_string(),
            ],
            min_keyword_hits: 3,
            ..MetricSpec::default()
        };
        let sheet = header(&["Код", "Доля доставок ПМ: последней мили в срок"]);
        let found = MetricColumnLocator::new(&spec).locate(&sheet).unwrap();
        assert_eq!(found.index, 1);
    }

    #[test]
    fn test_yo_in_header() {
        let spec = MetricSpec {
            label: "Своевременность доставки (ёмкость)".to_string(),
            ..MetricSpec::default()
        };
        let sheet = header(&["Код", "СВОЕВРЕМЕННОСТЬ ДОСТАВКИ ЕМКОСТЬ"]);
        let found = MetricColumnLocator::new(&spec).locate(&sheet).unwrap();
        assert_eq!(found.index, 1);
    }
}
