//! Prelude module - common imports for sheetgen users
//!
//! ```rust
//! use sheetgen::prelude::*;
//! ```

pub use crate::{
    convert,
    // Results
    ConversionReport,
    ConvertError,
    // Pipeline
    DocumentAssembler,
    OutputMode,
    RunConfig,
    RunContext,
    SheetMaterializer,
    Strategy,
    Warning,
    // Model and I/O
    Workbook,
    XlsxReader,
    XlsxWriter,
};
