//! Best-sheet selection for metric extraction.
//!
//! Every sheet of a workbook is probed with [`MetricColumnLocator`] and
//! [`CodeColumnLocator`]. A sheet scores one point per configured site whose
//! code row holds a non-blank metric value. The first sheet with the highest
//! score wins.

use crate::codes::CodeColumnLocator;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::metric::MetricColumnLocator;
use crate::normalize::normalize_code;
use delivtab_sheet::{Book, CellValue, Sheet};
use indexmap::IndexMap;
use serde::Serialize;

/// Metric values extracted from one sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricExtraction {
    pub sheet_name: String,
    /// Site name to value, in site-map order; `None` when no row matched
    pub values: IndexMap<String, Option<CellValue>>,
    #[serde(skip)]
    pub score: usize,
}

impl MetricExtraction {
    /// True when every configured site has a value.
    pub fn is_complete(&self) -> bool {
        self.score == self.values.len()
    }
}

/// Scores the sheets of a workbook against the configured metric and sites.
#[derive(Debug, Clone)]
pub struct SheetScorer<'a> {
    config: &'a EngineConfig,
    metric: MetricColumnLocator<'a>,
    codes: CodeColumnLocator,
}

impl<'a> SheetScorer<'a> {
    pub fn new(config: &'a EngineConfig) -> EngineResult<Self> {
        Ok(Self {
            config,
            metric: MetricColumnLocator::new(&config.metric),
            codes: CodeColumnLocator::new(config.sites.codes(), config.code_regex()?),
        })
    }

    /// Extract the metric from a single sheet.
    ///
    /// Fails when either the metric column or the code column cannot be found.
    pub fn extract(&self, sheet: &Sheet) -> EngineResult<MetricExtraction> {
        let metric = self.metric.locate(sheet)?;
        let code = self.codes.locate(sheet)?;

        let mut values = IndexMap::with_capacity(self.config.sites.len());
        let mut score = 0;
        for (site, site_code) in self.config.sites.iter() {
            let wanted = normalize_code(site_code);
            let value = sheet
                .rows()
                .find(|row| {
                    row.get(code.index)
                        .is_some_and(|cell| normalize_code(&cell.as_str()) == wanted)
                })
                .and_then(|row| row.get(metric.index))
                .filter(|cell| !cell.is_blank())
                .cloned();
            if value.is_some() {
                score += 1;
            }
            values.insert(site.to_string(), value);
        }

        Ok(MetricExtraction {
            sheet_name: sheet.name().to_string(),
            values,
            score,
        })
    }

    /// Pick the best sheet of `book`.
    ///
    /// Sheets where a locator fails are skipped. A sheet becomes the best only
    /// with a strictly higher score than the current best, and a sheet scoring
    /// zero never does. The scan stops as soon as a sheet has a value for
    /// every site.
    pub fn best_sheet(&self, book: &Book) -> EngineResult<MetricExtraction> {
        let max_score = self.config.sites.len();
        let mut best: Option<MetricExtraction> = None;

        for (name, sheet) in book.sheets() {
            let extraction = match self.extract(sheet) {
                Ok(extraction) => extraction,
                Err(e) => {
                    tracing::debug!(sheet = name, error = %e, "skipping sheet");
                    continue;
                }
            };
            tracing::debug!(sheet = name, score = extraction.score, "scored sheet");

            if extraction.score > best.as_ref().map_or(0, |b| b.score) {
                best = Some(extraction);
            }
            if best.as_ref().is_some_and(|b| b.score == max_score) {
                break;
            }
        }

        best.ok_or_else(|| EngineError::NoMetricData {
            sheets: book.sheet_names().into_iter().map(String::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const METRIC: &str = "Доля доставок последней мили в срок";

    fn sheet(name: &str, rows: Vec<Vec<CellValue>>) -> Sheet {
        let mut sheet = Sheet::from_data(rows);
        sheet.set_name(name);
        sheet
    }

    fn row(code: &str, value: impl Into<CellValue>) -> Vec<CellValue> {
        vec![CellValue::from(code), value.into()]
    }

    fn header() -> Vec<CellValue> {
        vec![CellValue::from("Код"), CellValue::from(METRIC)]
    }

    fn book(sheets: Vec<Sheet>) -> Book {
        let mut book = Book::new();
        for sheet in sheets {
            let name = sheet.name().to_string();
            book.add_sheet(&name, sheet).unwrap();
        }
        book
    }

    #[test]
    fn test_extract_from_single_sheet() {
        let config = EngineConfig::default();
        let scorer = SheetScorer::new(&config).unwrap();
        let s = sheet(
            "ПМ",
            vec![
                header(),
                row("MSK650", 0.95),
                row("msk963 ", 0.9),
                row("MSK1125", "н/д"),
                row("MSK1125", 0.5),
            ],
        );

        let extraction = scorer.extract(&s).unwrap();
        assert_eq!(extraction.sheet_name, "ПМ");
        assert_eq!(extraction.score, 3);
        assert_eq!(extraction.values["Люберцы"], Some(CellValue::Float(0.95)));
        assert_eq!(extraction.values["Мытищи"], Some(CellValue::Float(0.9)));
        assert_eq!(extraction.values["Подольск"], Some(CellValue::from("н/д")));
        assert_eq!(extraction.values["Химки"], None);
        assert_eq!(
            extraction.values.keys().collect::<Vec<_>>(),
            vec!["Люберцы", "Мытищи", "Подольск", "Химки"]
        );
        assert!(!extraction.is_complete());
    }

    #[test]
    fn test_blank_value_is_absent() {
        let config = EngineConfig::default();
        let scorer = SheetScorer::new(&config).unwrap();
        let s = sheet(
            "ПМ",
            vec![header(), row("MSK650", CellValue::Null), row("MSK963", "  ")],
        );

        let extraction = scorer.extract(&s).unwrap();
        assert_eq!(extraction.score, 0);
        assert!(extraction.values.values().all(Option::is_none));
    }

    #[test]
    fn test_strictly_better_later_sheet_wins() {
        let config = EngineConfig::default();
        let scorer = SheetScorer::new(&config).unwrap();
        let a = sheet("A", vec![header(), row("MSK650", 1.0), row("MSK963", 2.0)]);
        let b = sheet(
            "B",
            vec![
                header(),
                row("MSK650", 1.0),
                row("MSK963", 2.0),
                row("MSK1125", 3.0),
                row("MSK2469", 4.0),
            ],
        );

        let best = scorer.best_sheet(&book(vec![a, b])).unwrap();
        assert_eq!(best.sheet_name, "B");
        assert_eq!(best.score, 4);
        assert!(best.is_complete());
    }

    #[test]
    fn test_tie_keeps_first_sheet() {
        let config = EngineConfig::default();
        let scorer = SheetScorer::new(&config).unwrap();
        let a = sheet(
            "A",
            vec![header(), row("MSK650", 1.0), row("MSK963", 2.0), row("MSK1125", 3.0)],
        );
        let b = sheet(
            "B",
            vec![header(), row("MSK963", 2.0), row("MSK1125", 3.0), row("MSK2469", 4.0)],
        );

        let best = scorer.best_sheet(&book(vec![a, b])).unwrap();
        assert_eq!(best.sheet_name, "A");
        assert_eq!(best.score, 3);
    }

    #[test]
    fn test_sheets_without_columns_are_skipped() {
        let config = EngineConfig::default();
        let scorer = SheetScorer::new(&config).unwrap();
        let notes = sheet(
            "Заметки",
            vec![vec![CellValue::from("Комментарий")], vec![CellValue::from("текст")]],
        );
        let data = sheet("Данные", vec![header(), row("MSK2469", 0.7)]);

        let best = scorer.best_sheet(&book(vec![notes, data])).unwrap();
        assert_eq!(best.sheet_name, "Данные");
        assert_eq!(best.values["Химки"], Some(CellValue::Float(0.7)));
    }

    #[test]
    fn test_no_usable_sheet() {
        let config = EngineConfig::default();
        let scorer = SheetScorer::new(&config).unwrap();
        let notes = sheet("Заметки", vec![vec![CellValue::from("Комментарий")]]);

        let err = scorer.best_sheet(&book(vec![notes])).unwrap_err();
        assert!(matches!(err, EngineError::NoMetricData { ref sheets } if sheets == &["Заметки"]));
    }

    #[test]
    fn test_sheet_without_site_values_has_no_data() {
        let config = EngineConfig::default();
        let scorer = SheetScorer::new(&config).unwrap();
        let foreign = sheet("ПМ", vec![header(), row("MSK999", 0.5)]);
        let blank = sheet("Данные", vec![header(), row("MSK650", CellValue::Null)]);

        let err = scorer.best_sheet(&book(vec![foreign, blank])).unwrap_err();
        assert!(matches!(err, EngineError::NoMetricData { ref sheets } if sheets == &["ПМ", "Данные"]));
    }

    #[test]
    fn test_zero_score_sheet_does_not_shadow_later_data() {
        let config = EngineConfig::default();
        let scorer = SheetScorer::new(&config).unwrap();
        let foreign = sheet("A", vec![header(), row("MSK999", 0.5)]);
        let data = sheet("B", vec![header(), row("MSK963", 0.8)]);

        let best = scorer.best_sheet(&book(vec![foreign, data])).unwrap();
        assert_eq!(best.sheet_name, "B");
        assert_eq!(best.score, 1);
    }
}
