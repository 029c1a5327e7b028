use crate::book::Book;
use crate::cell::CellValue;
use crate::error::Result;
use crate::sheet::Sheet;
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::DateTime(dt) => {
            // Excel stores dates as days since 1899-12-30
            CellValue::Float(dt.as_f64())
        }
        Data::DateTimeIso(s) => CellValue::String(s.clone()),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(format!("#ERROR: {e:?}")),
    }
}

/// Build a sheet from a worksheet range, taking its first row as the header
fn range_to_sheet(name: &str, range: &Range<Data>) -> Result<Sheet> {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Sheet::with_name(name));
    };

    let header: Vec<String> = header_row
        .iter()
        .map(|cell| data_to_cell_value(cell).as_str())
        .collect();
    let data: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(data_to_cell_value).collect())
        .collect();

    Sheet::from_rows(name, header, data)
}

impl Book {
    /// Load every sheet of a workbook (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`)
    ///
    /// Sheets keep workbook order. A sheet whose range cannot be read is
    /// logged and left out; the remaining sheets still load.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened as a workbook.
    pub fn from_workbook<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut workbook = open_workbook_auto(path)?;

        let book_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Book1");
        let mut book = Book::with_name(book_name);

        let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
        for sheet_name in sheet_names {
            let range = match workbook.worksheet_range(&sheet_name) {
                Ok(range) => range,
                Err(e) => {
                    tracing::warn!("skipping unreadable sheet '{sheet_name}' in {}: {e}", path.display());
                    continue;
                }
            };

            let sheet = range_to_sheet(&sheet_name, &range)?;
            book.add_sheet(&sheet_name, sheet)?;
        }

        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SheetError;
    use rust_xlsxwriter::Workbook;
    use tempfile::tempdir;

    #[test]
    fn test_from_workbook_reads_all_sheets_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.xlsx");

        let mut workbook = Workbook::new();
        let first = workbook.add_worksheet();
        first.set_name("Сводка").unwrap();
        first.write_string(0, 0, "Код").unwrap();
        first.write_string(0, 1, "Значение").unwrap();
        first.write_string(1, 0, "MSK650").unwrap();
        first.write_number(1, 1, 97.5).unwrap();
        let second = workbook.add_worksheet();
        second.set_name("Пусто").unwrap();
        workbook.save(&path).unwrap();

        let book = Book::from_workbook(&path).unwrap();
        assert_eq!(book.name(), "book");
        assert_eq!(book.sheet_names(), vec!["Сводка", "Пусто"]);

        let sheet = book.get_sheet("Сводка").unwrap();
        assert_eq!(sheet.column_names(), &["Код", "Значение"]);
        assert_eq!(sheet.row_count(), 1);
        assert_eq!(sheet.get(0, 1).unwrap(), &CellValue::Float(97.5));

        assert!(book.get_sheet("Пусто").unwrap().is_empty());
    }

    #[test]
    fn test_from_workbook_rejects_non_workbook() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a zip archive").unwrap();

        assert!(matches!(
            Book::from_workbook(&path),
            Err(SheetError::Workbook(_))
        ));
    }
}
