//! Sheet/Book module for delivtab
//!
//! Provides the table model used by the ingestion engine and the loaders that
//! fill it: a delimited-text decoder that copes with unknown encodings and
//! delimiters, and a workbook reader for every spreadsheet format calamine
//! understands.
//!
//! # Examples
//!
//! ## Creating a sheet from data
//!
//! ```
//! use delivtab_sheet::{CellValue, Sheet};
//!
//! let sheet = Sheet::from_data(vec![
//!     vec!["Статус задания", "Тип адреса"],
//!     vec!["Выполнено", "П"],
//! ]);
//!
//! assert_eq!(sheet.row_count(), 1);
//! assert_eq!(sheet.col_count(), 2);
//! assert_eq!(sheet.get(0, 1).unwrap(), &CellValue::from("П"));
//! ```
//!
//! ## Decoding a delimited export
//!
//! ```
//! use delivtab_sheet::{TableDecoder, TextEncoding};
//!
//! let decoded = TableDecoder::decode("a;b\n1;2\n".as_bytes()).unwrap();
//! assert_eq!(decoded.encoding, TextEncoding::Utf8Sig);
//! assert_eq!(decoded.delimiter, b';');
//! ```
//!
//! ## Loading a workbook
//!
//! ```no_run
//! use delivtab_sheet::Book;
//!
//! let book = Book::from_workbook("last_mile.xlsx").unwrap();
//! for (name, sheet) in book.sheets() {
//!     println!("{name}: {} rows", sheet.row_count());
//! }
//! ```

mod book;
mod cell;
mod csv;
mod decode;
mod error;
mod sheet;
mod workbook;

/// Re-export book type.
pub use book::Book;
/// Re-export cell value type.
pub use cell::CellValue;
/// Re-export CSV options.
pub use csv::CsvOptions;
/// Re-export the delimited-text decoder.
pub use decode::{sniff_delimiter, DecodedTable, DelimiterStrategy, TableDecoder, TextEncoding};
/// Re-export sheet error types.
pub use error::{Result, SheetError};
/// Re-export sheet type.
pub use sheet::Sheet;
