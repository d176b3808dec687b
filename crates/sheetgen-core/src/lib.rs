//! # sheetgen-core
//!
//! In-memory spreadsheet document model used by the sheetgen conversion
//! engine and its XLSX reader/writer.
//!
//! - [`CellValue`] and [`CellAddress`] for cell contents and addressing
//! - [`Style`] for the formatting subset sheetgen understands (font, fill,
//!   horizontal alignment, number format)
//! - [`Workbook`] and [`Worksheet`] for the document itself
//!
//! ## Example
//!
//! ```rust
//! use sheetgen_core::{CellValue, Workbook};
//!
//! let mut workbook = Workbook::empty();
//! let idx = workbook.add_worksheet_with_name("Empleados").unwrap();
//! let sheet = workbook.worksheet_mut(idx).unwrap();
//!
//! sheet.set_cell_value_at(0, 0, "Nombre").unwrap();
//! sheet.set_cell_value_at(0, 1, 42.0).unwrap();
//! assert_eq!(sheet.get_value_at(0, 1), CellValue::Number(42.0));
//! ```

pub mod cell;
pub mod error;
pub mod style;
pub mod workbook;
pub mod worksheet;

pub use cell::{CellAddress, CellData, CellStorage, CellValue};
pub use error::{Error, Result};
pub use style::{
    Alignment, Color, FillStyle, FontStyle, HorizontalAlignment, NumberFormat, Style, StylePool,
    VerticalAlignment,
};
pub use workbook::Workbook;
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
