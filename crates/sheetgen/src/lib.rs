//! # sheetgen
//!
//! Converts a declarative XML description of styled cells into an XLSX
//! spreadsheet.
//!
//! A source document declares a style table, column widths and one or more
//! sheets of cells:
//!
//! ```xml
//! <workbooks>
//!   <styles>
//!     <style id="1"><font>Calibri</font><size>12</size><bold>true</bold></style>
//!   </styles>
//!   <columns><column name="A" width="-1"/><column name="E" width="12"/></columns>
//!   <workbook name="Empleados">
//!     <cell row="1" column="A" text="Nombre" style="1"/>
//!     <cell row="2" column="A" text="Ana"/>
//!   </workbook>
//! </workbooks>
//! ```
//!
//! Two writer strategies share one pipeline:
//!
//! - [`Strategy::Direct`] writes text cells into an in-memory workbook and
//!   extends the output file when it already exists.
//! - [`Strategy::Batched`] streams rows to a constant-memory writer,
//!   writes numeric text as numbers and always creates a new file.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sheetgen::{convert, Strategy};
//!
//! let report = convert("datos.xml", "salida.xlsx", Strategy::Direct)?;
//! println!("{} cells in {:?}", report.cells_written(), report.output);
//! # Ok::<(), sheetgen::ConvertError>(())
//! ```

pub mod apply;
pub mod assembler;
pub mod cells;
pub mod coerce;
pub mod columns;
pub mod config;
pub mod context;
pub mod error;
pub mod materialize;
pub mod prelude;
pub mod source;
pub mod style_table;
pub mod uri;

pub use assembler::{convert, ConversionReport, DocumentAssembler, State};
pub use cells::{extract_sheets, CellDeclaration, SheetSpec, DEFAULT_SHEET_NAME};
pub use columns::{ColumnWidth, ColumnWidths};
pub use config::{LogConfig, LogFile, LogLevel, RunConfig};
pub use context::RunContext;
pub use error::{
    ConvertError, ErrorKind, ParseError, ParseErrorKind, Result, Stage, Warning, Warnings,
};
pub use materialize::{
    BatchedMaterializer, DirectMaterializer, OutputMode, SheetMaterializer, SheetSummary, Strategy,
};
pub use source::SourceDocument;
pub use style_table::{StyleAlignment, StyleDefinition, StyleTable};
pub use uri::{DataSource, ResolvedInput};

// Spreadsheet model and file format
pub use sheetgen_core::{CellAddress, CellValue, Color, Style, Workbook, Worksheet};
pub use sheetgen_xlsx::{XlsxError, XlsxReader, XlsxWriter};
