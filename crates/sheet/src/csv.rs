use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use std::io::Read;

/// CSV reader options
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            delimiter: b',',
            quote: b'"',
        }
    }
}

impl CsvOptions {
    /// Set the delimiter
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl Sheet {
    /// Load a sheet from a CSV string
    pub fn from_csv_str(content: &str) -> Result<Self> {
        Self::from_csv_str_with_options(content, CsvOptions::default())
    }

    /// Load a sheet from a CSV string with custom options
    pub fn from_csv_str_with_options(content: &str, options: CsvOptions) -> Result<Self> {
        Self::from_csv_reader(content.as_bytes(), options)
    }

    /// Load a sheet from a reader
    ///
    /// The first record is the header. Records must all have the header's
    /// width; a ragged file is rejected rather than padded.
    pub fn from_csv_reader<R: Read>(reader: R, options: CsvOptions) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .flexible(false)
            .has_headers(false) // We handle headers ourselves
            .from_reader(reader);

        let mut records = csv_reader.records();
        let header: Vec<String> = match records.next() {
            Some(record) => record?.iter().map(str::to_string).collect(),
            None => return Err(SheetError::MissingHeader),
        };
        if header.iter().all(|name| name.trim().is_empty()) {
            return Err(SheetError::MissingHeader);
        }

        let mut data: Vec<Vec<CellValue>> = Vec::new();
        for result in records {
            let record = result?;
            let row: Vec<CellValue> = record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        CellValue::Null
                    } else {
                        CellValue::String(field.to_string())
                    }
                })
                .collect();
            data.push(row);
        }

        Sheet::from_rows("Sheet1", header, data)
    }
}
