use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use std::collections::HashMap;

/// A table with an ordered header and rows of uniform width (row-major storage)
///
/// The header is kept apart from the data rows, so `row_count` counts data
/// rows only.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    name: String,
    column_names: Vec<String>,
    column_index: HashMap<String, usize>,
    data: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Create a new empty sheet
    #[must_use]
    pub fn new() -> Self {
        Self::with_name("Sheet1")
    }

    /// Create a new empty sheet with a name
    #[must_use]
    pub fn with_name(name: &str) -> Self {
        Sheet {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Create a sheet from a header and data rows
    ///
    /// Short rows are padded with nulls; a row wider than the header is an error.
    pub fn from_rows(
        name: &str,
        column_names: Vec<String>,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<Self> {
        let width = column_names.len();
        let mut data = Vec::with_capacity(rows.len());
        for mut row in rows {
            if row.len() > width {
                return Err(SheetError::LengthMismatch {
                    expected: width,
                    actual: row.len(),
                });
            }
            row.resize(width, CellValue::Null);
            data.push(row);
        }

        let mut sheet = Sheet::with_name(name);
        sheet.data = data;
        sheet.index_columns(column_names);
        Ok(sheet)
    }

    /// Create a sheet from a 2D vector of values, using the first row as the header
    #[must_use]
    pub fn from_data<T: Into<CellValue>>(data: Vec<Vec<T>>) -> Self {
        let mut rows = data
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect::<Vec<CellValue>>());
        let header: Vec<String> = rows
            .next()
            .map(|row| row.iter().map(CellValue::as_str).collect())
            .unwrap_or_default();
        let width = header.len();
        let data = rows
            .map(|mut row| {
                row.resize(width, CellValue::Null);
                row
            })
            .collect();

        let mut sheet = Sheet::new();
        sheet.data = data;
        sheet.index_columns(header);
        sheet
    }

    /// Get the sheet name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Get the number of data rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Get the number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.column_names.len()
    }

    /// Check if the sheet has neither columns nor rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.column_names.is_empty() && self.data.is_empty()
    }

    // ===== Named Access =====

    /// Get column names in table order
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Rewrite every column name in place
    ///
    /// The column count never changes, so names stay aligned with the rows.
    /// When two columns end up sharing a name the last one wins for name
    /// lookups.
    pub fn map_column_names<F: FnMut(&str) -> String>(&mut self, f: F) {
        let names = self.column_names.iter().map(String::as_str).map(f).collect();
        self.index_columns(names);
    }

    fn index_columns(&mut self, names: Vec<String>) {
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            index.insert(name.clone(), i);
        }
        self.column_names = names;
        self.column_index = index;
    }

    /// Get the column index by name
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.column_index
            .get(name)
            .copied()
            .ok_or_else(|| SheetError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    // ===== Cell Access =====

    /// Get a cell value by row and column index (0-based, data rows only)
    pub fn get(&self, row: usize, col: usize) -> Result<&CellValue> {
        self.data
            .get(row)
            .and_then(|r| r.get(col))
            .ok_or(SheetError::IndexOutOfBounds {
                row,
                col,
                rows: self.row_count(),
                cols: self.col_count(),
            })
    }

    /// Get a cell value by row index and column name
    pub fn get_by_name(&self, row: usize, col_name: &str) -> Result<&CellValue> {
        let col = self.column_index(col_name)?;
        self.get(row, col)
    }

    // ===== Column Operations =====

    /// Iterate over a column by index (0-based)
    pub fn column(&self, index: usize) -> Result<impl Iterator<Item = &CellValue> + '_> {
        if index >= self.col_count() {
            return Err(SheetError::ColumnIndexOutOfBounds {
                index,
                count: self.col_count(),
            });
        }
        Ok(self.data.iter().map(move |row| &row[index]))
    }

    /// Iterate over a column by name
    pub fn column_by_name(&self, name: &str) -> Result<impl Iterator<Item = &CellValue> + '_> {
        let index = self.column_index(name)?;
        self.column(index)
    }

    // ===== Iteration =====

    /// Iterate over data rows
    pub fn rows(&self) -> impl Iterator<Item = &Vec<CellValue>> {
        self.data.iter()
    }
}
