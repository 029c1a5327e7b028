use delivtab_sheet::{Book, CellValue, Sheet, SheetError, TableDecoder, TextEncoding};
use encoding_rs::WINDOWS_1251;
use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

// ===== Sheet Model Tests =====

#[test]
fn test_sheet_from_rows_pads_short_rows() {
    let sheet = Sheet::from_rows(
        "tasks",
        vec!["a".to_string(), "b".to_string(), "c".to_string()],
        vec![vec![CellValue::from("1")], vec![CellValue::from("2"), CellValue::Int(3)]],
    )
    .unwrap();

    assert_eq!(sheet.name(), "tasks");
    assert_eq!(sheet.row_count(), 2);
    assert_eq!(sheet.get(0, 2).unwrap(), &CellValue::Null);
    assert_eq!(sheet.get_by_name(1, "b").unwrap(), &CellValue::Int(3));
}

#[test]
fn test_sheet_from_rows_rejects_wide_rows() {
    let result = Sheet::from_rows(
        "tasks",
        vec!["a".to_string()],
        vec![vec![CellValue::Int(1), CellValue::Int(2)]],
    );
    assert!(matches!(
        result,
        Err(SheetError::LengthMismatch {
            expected: 1,
            actual: 2
        })
    ));
}

#[test]
fn test_column_lookup_errors() {
    let sheet = Sheet::from_data(vec![vec!["a", "b"], vec!["1", "2"]]);

    assert!(matches!(
        sheet.column_index("missing"),
        Err(SheetError::ColumnNotFound { .. })
    ));
    assert!(sheet.column(5).is_err());
    assert_eq!(
        sheet.column_by_name("b").unwrap().collect::<Vec<_>>(),
        vec![&CellValue::from("2")]
    );
}

#[test]
fn test_book_rejects_duplicate_sheet() {
    let mut book = Book::new();
    book.add_sheet("ПМ", Sheet::new()).unwrap();

    assert!(matches!(
        book.add_sheet("ПМ", Sheet::new()),
        Err(SheetError::SheetAlreadyExists { .. })
    ));
    assert!(matches!(
        book.get_sheet("КТ"),
        Err(SheetError::SheetNotFound { .. })
    ));
}

// ===== Delimited Text Tests =====

#[test]
fn test_decode_path_names_sheet_after_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks_north.csv");
    std::fs::write(&path, "Статус задания;Тип Адреса\nВыполнено;П\n").unwrap();

    let decoded = TableDecoder::decode_path(&path).unwrap();
    assert_eq!(decoded.sheet.name(), "tasks_north");
    assert_eq!(decoded.delimiter, b';');
    assert_eq!(decoded.encoding, TextEncoding::Utf8Sig);
}

#[test]
fn test_decode_legacy_semicolon_export() {
    let (bytes, _, _) = WINDOWS_1251.encode("Статус;Тип точки\nВыполнено;ПВЗ\nОтменено;П\n");

    let decoded = TableDecoder::decode(&bytes).unwrap();
    assert_eq!(decoded.encoding, TextEncoding::Windows1251);
    assert_eq!(decoded.delimiter, b';');
    assert_eq!(decoded.sheet.row_count(), 2);
    assert_eq!(decoded.sheet.get(0, 1).unwrap(), &CellValue::from("ПВЗ"));
}

#[test]
fn test_decode_quoted_fields() {
    let decoded = TableDecoder::decode(b"a,b\n\"x, y\",2\n").unwrap();
    assert_eq!(decoded.delimiter, b',');
    assert_eq!(decoded.sheet.get(0, 0).unwrap(), &CellValue::from("x, y"));
}

#[test]
fn test_decode_header_only_is_valid() {
    let decoded = TableDecoder::decode(b"a;b\n").unwrap();
    assert_eq!(decoded.sheet.row_count(), 0);
    assert_eq!(decoded.sheet.column_names(), &["a", "b"]);
}

#[test]
fn test_decode_ragged_input_fails() {
    let result = TableDecoder::decode(b"a;b,c\n1;2;3,4,5\n");
    assert!(matches!(result, Err(SheetError::Decode { .. })));
}

#[test]
fn test_decode_missing_file() {
    assert!(matches!(
        TableDecoder::decode_path("/definitely/not/here.csv"),
        Err(SheetError::Io(_))
    ));
}

// ===== Workbook Tests =====

#[test]
fn test_workbook_cell_types() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("types.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Код").unwrap();
    sheet.write_string(0, 1, "Доля").unwrap();
    sheet.write_string(0, 2, "Активен").unwrap();
    sheet.write_string(1, 0, "MSK650").unwrap();
    sheet.write_number(1, 1, 0.975).unwrap();
    sheet.write_boolean(1, 2, true).unwrap();
    sheet.write_string(2, 0, "MSK963").unwrap();
    workbook.save(&path).unwrap();

    let book = Book::from_workbook(&path).unwrap();
    assert_eq!(book.sheet_count(), 1);
    let (_, sheet) = book.sheets().next().unwrap();

    assert_eq!(sheet.column_names(), &["Код", "Доля", "Активен"]);
    assert_eq!(sheet.row_count(), 2);
    assert_eq!(sheet.get(0, 1).unwrap(), &CellValue::Float(0.975));
    assert_eq!(sheet.get(0, 2).unwrap(), &CellValue::Bool(true));
    assert!(sheet.get(1, 1).unwrap().is_blank());
}
