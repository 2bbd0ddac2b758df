//! Streaming writer for simple XLSX spreadsheet files.
//!
//! An `.xlsx` file is a zip archive of XML parts. This crate writes those
//! parts incrementally: worksheet rows are rendered as they arrive and
//! spooled per sheet, so resident memory is bounded by the current row
//! rather than the whole document.
//!
//! Buffered use goes through [`workbook::Sheet`]:
//!
//! ```no_run
//! use xlsxstream::workbook::{Cell, Column, Sheet};
//!
//! let mut sheet = Sheet::new(vec![
//!     Column::new("Amount", 10.0),
//!     Column::new("Name", 20.0),
//! ]);
//! let mut row = sheet.new_row();
//! row.cells[0] = Cell::number("10");
//! row.cells[1] = Cell::string("Apple");
//! sheet.append_row(row).unwrap();
//! sheet.save_to_file("out.xlsx").unwrap();
//! ```
//!
//! Streaming use opens a [`workbook::WorkbookWriter`] directly and feeds
//! row batches to its sheet writers.

pub mod error;
pub mod workbook;

pub use error::XlsxError;

pub type Result<T> = std::result::Result<T, error::XlsxError>;
