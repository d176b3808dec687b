//! # sheetgen-xlsx
//!
//! XLSX (Office Open XML) reader and writer for sheetgen workbooks.
//!
//! Covers the subset the conversion engine round-trips when merging into an
//! existing file: cell values, fonts, solid fills, alignment, number formats
//! and custom column widths.

pub mod error;
pub mod reader;
pub mod writer;

mod styles;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use writer::XlsxWriter;
