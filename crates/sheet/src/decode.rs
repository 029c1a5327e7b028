//! Decoding of delimited text whose encoding and delimiter are unknown.
//!
//! Exports arrive as UTF-8 (with or without a byte-order mark) or as legacy
//! Windows-1251, separated by commas, semicolons or tabs. The decoder walks a
//! fixed grid of encodings and delimiter strategies and keeps the first
//! combination that yields a well-formed table, so the same bytes always
//! decode the same way.

use crate::csv::CsvOptions;
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use encoding_rs::{UTF_8, WINDOWS_1251};
use std::fmt;
use std::path::Path;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Number of non-empty lines inspected when inferring the delimiter.
const SNIFF_LINES: usize = 20;

/// Delimiters considered by automatic inference, in tie-break order.
const SNIFF_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Text encodings tried by [`TableDecoder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8 with an optional byte-order mark
    Utf8Sig,
    /// Legacy Cyrillic single-byte code page
    Windows1251,
    /// UTF-8 without BOM handling
    Utf8,
}

impl TextEncoding {
    /// Encodings in the order they are attempted
    pub const SEARCH_ORDER: [TextEncoding; 3] = [
        TextEncoding::Utf8Sig,
        TextEncoding::Windows1251,
        TextEncoding::Utf8,
    ];

    /// Decode bytes strictly; `None` when the bytes are not valid in this encoding.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        let decoded = match self {
            TextEncoding::Utf8Sig => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                UTF_8.decode_without_bom_handling_and_without_replacement(body)
            }
            TextEncoding::Windows1251 => {
                WINDOWS_1251.decode_without_bom_handling_and_without_replacement(bytes)
            }
            TextEncoding::Utf8 => UTF_8.decode_without_bom_handling_and_without_replacement(bytes),
        };
        decoded.map(|text| text.into_owned())
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TextEncoding::Utf8Sig => "utf-8-sig",
            TextEncoding::Windows1251 => "windows-1251",
            TextEncoding::Utf8 => "utf-8",
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the field delimiter is chosen for one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterStrategy {
    /// Infer the delimiter from the leading lines
    Auto,
    /// Use this delimiter
    Fixed(u8),
}

impl DelimiterStrategy {
    /// Strategies in the order they are attempted for each encoding
    pub const SEARCH_ORDER: [DelimiterStrategy; 3] = [
        DelimiterStrategy::Auto,
        DelimiterStrategy::Fixed(b';'),
        DelimiterStrategy::Fixed(b','),
    ];
}

/// A table together with the combination that produced it
#[derive(Debug, Clone)]
pub struct DecodedTable {
    pub sheet: Sheet,
    pub encoding: TextEncoding,
    pub delimiter: u8,
}

/// Turns raw delimited-text bytes into a [`Sheet`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TableDecoder;

impl TableDecoder {
    /// Read a file and decode it, naming the sheet after the file stem
    pub fn decode_path<P: AsRef<Path>>(path: P) -> Result<DecodedTable> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let mut decoded = Self::decode(&bytes)?;
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            decoded.sheet.set_name(stem);
        }
        Ok(decoded)
    }

    /// Decode bytes into a table
    ///
    /// Tries every encoding in [`TextEncoding::SEARCH_ORDER`] with every
    /// strategy in [`DelimiterStrategy::SEARCH_ORDER`]; the first well-formed
    /// table wins. If none parses, one last plain UTF-8, comma-separated read
    /// is made and its error is returned.
    pub fn decode(bytes: &[u8]) -> Result<DecodedTable> {
        let mut attempts = 0;

        for encoding in TextEncoding::SEARCH_ORDER {
            let Some(text) = encoding.decode(bytes) else {
                attempts += DelimiterStrategy::SEARCH_ORDER.len();
                tracing::trace!("bytes are not valid {encoding}");
                continue;
            };

            for strategy in DelimiterStrategy::SEARCH_ORDER {
                attempts += 1;
                let delimiter = match strategy {
                    DelimiterStrategy::Fixed(delimiter) => delimiter,
                    DelimiterStrategy::Auto => match sniff_delimiter(&text) {
                        Some(delimiter) => delimiter,
                        None => {
                            tracing::trace!("no consistent delimiter in {encoding} text");
                            continue;
                        }
                    },
                };

                let options = CsvOptions::default().with_delimiter(delimiter);
                match Sheet::from_csv_str_with_options(&text, options) {
                    Ok(sheet) => {
                        tracing::debug!(
                            encoding = %encoding,
                            delimiter = %char::from(delimiter).escape_default(),
                            rows = sheet.row_count(),
                            cols = sheet.col_count(),
                            "decoded delimited table"
                        );
                        return Ok(DecodedTable {
                            sheet,
                            encoding,
                            delimiter,
                        });
                    }
                    Err(e) => {
                        tracing::trace!(
                            "{encoding} with delimiter {:?} rejected: {e}",
                            char::from(delimiter)
                        );
                    }
                }
            }
        }

        attempts += 1;
        let fallback = std::str::from_utf8(bytes)
            .map_err(|e| SheetError::Decode {
                attempts,
                last: format!("invalid UTF-8: {e}"),
            })
            .and_then(|text| {
                Sheet::from_csv_str(text).map_err(|e| SheetError::Decode {
                    attempts,
                    last: e.to_string(),
                })
            })?;

        Ok(DecodedTable {
            sheet: fallback,
            encoding: TextEncoding::Utf8,
            delimiter: CsvOptions::default().delimiter,
        })
    }
}

/// Infer the delimiter from the first non-empty lines
///
/// A candidate qualifies when it splits every sampled line into the same
/// number of fields, and that number is above one. Among qualifying
/// candidates the one producing the most fields wins; ties go to the earlier
/// candidate.
#[must_use]
pub fn sniff_delimiter(text: &str) -> Option<u8> {
    let sample: Vec<&str> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();
    if sample.is_empty() {
        return None;
    }
    let sample = sample.join("\n");

    let mut best: Option<(u8, usize)> = None;
    for candidate in SNIFF_CANDIDATES {
        let Some(width) = consistent_width(&sample, candidate) else {
            continue;
        };
        if width > 1 && best.map_or(true, |(_, best_width)| width > best_width) {
            best = Some((candidate, width));
        }
    }
    best.map(|(delimiter, _)| delimiter)
}

fn consistent_width(sample: &str, delimiter: u8) -> Option<usize> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(sample.as_bytes());

    let mut width = None;
    for record in reader.records() {
        let len = record.ok()?.len();
        match width {
            None => width = Some(len),
            Some(w) if w != len => return None,
            Some(_) => {}
        }
    }
    width
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_semicolon() {
        let text = "Статус задания;Тип Адреса\nВыполнено;П\nв обработке;Д\n";
        assert_eq!(sniff_delimiter(text), Some(b';'));
    }

    #[test]
    fn test_sniff_prefers_consistent_candidate() {
        // commas appear inside values but not on every line
        let text = "a;b;c\n1,5;2;3\n4;5;6,7\n";
        assert_eq!(sniff_delimiter(text), Some(b';'));
    }

    #[test]
    fn test_sniff_single_column_fails() {
        assert_eq!(sniff_delimiter("only\none\ncolumn\n"), None);
        assert_eq!(sniff_delimiter(""), None);
    }

    #[test]
    fn test_decode_utf8_with_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("Статус;Тип\nВыполнено;П\n".as_bytes());

        let decoded = TableDecoder::decode(&bytes).unwrap();
        assert_eq!(decoded.encoding, TextEncoding::Utf8Sig);
        assert_eq!(decoded.delimiter, b';');
        assert_eq!(decoded.sheet.column_names(), &["Статус", "Тип"]);
    }

    #[test]
    fn test_decode_windows_1251() {
        let (bytes, _, had_errors) = WINDOWS_1251.encode("Статус,Тип\nВыполнено,П\n");
        assert!(!had_errors);

        let decoded = TableDecoder::decode(&bytes).unwrap();
        assert_eq!(decoded.encoding, TextEncoding::Windows1251);
        assert_eq!(decoded.delimiter, b',');
        assert_eq!(decoded.sheet.column_names(), &["Статус", "Тип"]);
        assert_eq!(decoded.sheet.get(0, 0).unwrap().as_str(), "Выполнено");
    }

    #[test]
    fn test_decode_is_deterministic() {
        let bytes = "a;b\n1;2\n".as_bytes();
        let first = TableDecoder::decode(bytes).unwrap();
        let second = TableDecoder::decode(bytes).unwrap();
        assert_eq!(first.encoding, second.encoding);
        assert_eq!(first.delimiter, second.delimiter);
    }

    #[test]
    fn test_decode_failure_surfaces_last_error() {
        let result = TableDecoder::decode(b"");
        match result {
            Err(SheetError::Decode { attempts, last }) => {
                assert_eq!(attempts, 10);
                assert!(last.contains("header"), "unexpected message: {last}");
            }
            other => panic!("expected decode failure, got {other:?}"),
        }
    }
}
