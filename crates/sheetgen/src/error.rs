//! Conversion error types

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Pipeline stage a conversion was attempting when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Checking the source and parsing its structure
    Validate,
    /// Building the style table and column widths
    LoadStyles,
    /// Writing the declared sheets into the target
    ProcessSheets,
    /// Applying fixed and computed column widths
    FinalizeWidths,
    /// Writing the target document to storage
    Persist,
}

impl Stage {
    /// Stage name as it appears in messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Validate => "validate",
            Stage::LoadStyles => "load-styles",
            Stage::ProcessSheets => "process-sheets",
            Stage::FinalizeWidths => "finalize-widths",
            Stage::Persist => "persist",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fatal conversion failure: the stage that failed plus the cause
#[derive(Debug, Error)]
#[error("{stage} failed: {kind}")]
pub struct ConvertError {
    /// Stage that failed
    pub stage: Stage,
    /// Underlying cause
    #[source]
    pub kind: ErrorKind,
}

impl ConvertError {
    /// Create an error for a stage
    pub fn new(stage: Stage, kind: ErrorKind) -> Self {
        Self { stage, kind }
    }

    /// True for malformed-source failures
    pub fn is_parse_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Parse(_))
    }
}

/// Cause of a conversion failure
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Input document does not exist
    #[error("source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// Source structure is malformed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Reading the existing target document failed
    #[error("failed to load existing document '{}': {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: sheetgen_xlsx::XlsxError,
    },

    /// The spreadsheet model rejected an operation
    #[error("sheet error: {0}")]
    Sheet(#[from] sheetgen_core::Error),

    /// The streaming writer rejected a cell, format or sheet
    #[error("writer error: {0}")]
    Writer(#[from] rust_xlsxwriter::XlsxError),

    /// Writing the final document failed
    #[error("failed to persist '{}': {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A data source location could not be resolved
    #[error("data source error: {0}")]
    Source(String),
}

/// Malformed source structure, with the byte offset it was detected at
#[derive(Debug, Clone, PartialEq, Error)]
#[error("parse error at byte {position}: {kind}")]
pub struct ParseError {
    /// Byte offset in the source document
    pub position: usize,
    /// What was wrong
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(position: usize, kind: ParseErrorKind) -> Self {
        Self { position, kind }
    }
}

/// Kinds of malformed source structure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("malformed XML: {0}")]
    MalformedXml(String),

    #[error("<{element}> is missing required attribute '{attribute}'")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("invalid row '{0}': expected a positive integer")]
    InvalidRow(String),

    #[error("invalid column '{0}'")]
    InvalidColumn(String),

    #[error("invalid font size '{0}': expected a positive integer")]
    InvalidSize(String),

    #[error("invalid colour '{0}': expected 6 hex digits")]
    InvalidColor(String),

    #[error("invalid alignment '{0}': expected left, center, right or justify")]
    InvalidAlignment(String),

    #[error("document declares no <workbook> section")]
    MissingSheets,
}

/// Non-fatal anomaly, logged and reported but never aborting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A cell references a style id the table does not hold
    UnknownStyleReference {
        sheet: String,
        cell: String,
        style: String,
    },
    /// A column width entry was unusable and skipped
    InvalidColumnWidth { column: String, width: String },
    /// Numeric-looking text could not be converted and was kept as text
    NumericCoercionFailure {
        sheet: String,
        cell: String,
        text: String,
        reason: String,
    },
    /// A style entry without an id was skipped
    MissingStyleId { position: usize },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnknownStyleReference { sheet, cell, style } => write!(
                f,
                "{}!{} references unknown style '{}', left unformatted",
                sheet, cell, style
            ),
            Warning::InvalidColumnWidth { column, width } => write!(
                f,
                "column '{}' has invalid width '{}', entry skipped",
                column, width
            ),
            Warning::NumericCoercionFailure {
                sheet,
                cell,
                text,
                reason,
            } => write!(
                f,
                "{}!{} value '{}' kept as text: {}",
                sheet, cell, text, reason
            ),
            Warning::MissingStyleId { position } => {
                write!(f, "style at byte {} has no id, skipped", position)
            }
        }
    }
}

/// Warnings collected over one conversion run
#[derive(Debug, Default, Clone)]
pub struct Warnings {
    items: Vec<Warning>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and log it
    pub fn push(&mut self, warning: Warning) {
        tracing::warn!("{}", warning);
        self.items.push(warning);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_names_stage() {
        let err = ConvertError::new(
            Stage::Validate,
            ParseError::new(12, ParseErrorKind::InvalidRow("0".into())).into(),
        );
        assert!(err.is_parse_error());
        assert_eq!(
            err.to_string(),
            "validate failed: parse error at byte 12: invalid row '0': expected a positive integer"
        );
    }

    #[test]
    fn test_warnings_collect_in_order() {
        let mut warnings = Warnings::new();
        warnings.push(Warning::MissingStyleId { position: 3 });
        warnings.push(Warning::InvalidColumnWidth {
            column: "B".into(),
            width: "ancho".into(),
        });
        assert_eq!(warnings.len(), 2);
        assert!(matches!(
            warnings.iter().next(),
            Some(Warning::MissingStyleId { position: 3 })
        ));
    }
}
