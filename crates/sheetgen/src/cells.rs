//! Cell model extractor

use sheetgen_core::{CellAddress, NumberFormat, MAX_ROWS};

use crate::error::{ParseError, ParseErrorKind};
use crate::source::{Entry, RawSheet};

/// Sheet name used when a `<workbook>` declares none
pub const DEFAULT_SHEET_NAME: &str = "Hoja1";

/// One declared cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellDeclaration {
    /// 0-based row
    pub row: u32,
    /// 0-based column
    pub col: u16,
    /// Raw text value; may represent a number
    pub value: String,
    pub style: Option<String>,
    /// Declared number format; `None` for General
    pub number_format: Option<String>,
}

impl CellDeclaration {
    pub fn address(&self) -> CellAddress {
        CellAddress::new(self.row, self.col)
    }

    /// Build a declaration from a raw `<cell>` entry
    pub fn from_entry(entry: &Entry) -> Result<Self, ParseError> {
        let fail = |kind| ParseError::new(entry.position, kind);
        let missing = |attribute| {
            fail(ParseErrorKind::MissingAttribute {
                element: "cell",
                attribute,
            })
        };

        let raw_row = entry.get("row").ok_or_else(|| missing("row"))?;
        let row = CellAddress::parse_row_number(raw_row)
            .ok()
            .filter(|row| *row < MAX_ROWS)
            .ok_or_else(|| fail(ParseErrorKind::InvalidRow(raw_row.to_string())))?;

        let raw_col = entry.get("column").ok_or_else(|| missing("column"))?;
        let col = CellAddress::letters_to_column(raw_col)
            .map_err(|_| fail(ParseErrorKind::InvalidColumn(raw_col.to_string())))?;

        let value = entry
            .get("text")
            .or_else(|| entry.get("value"))
            .unwrap_or_default()
            .to_string();

        let style = entry
            .get("style")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let number_format = entry
            .get("format")
            .filter(|code| !NumberFormat::from_code(*code).is_general())
            .map(str::to_string);

        Ok(CellDeclaration {
            row,
            col,
            value,
            style,
            number_format,
        })
    }
}

/// One declared sheet and its cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSpec {
    pub name: String,
    pub cells: Vec<CellDeclaration>,
}

impl SheetSpec {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: Vec::new(),
        }
    }

    pub fn with_cell(mut self, cell: CellDeclaration) -> Self {
        self.cells.push(cell);
        self
    }
}

/// Extract typed sheets from raw `<workbook>` sections.
///
/// Sections whose names match case-insensitively are combined into the
/// first one, so each name produces exactly one target sheet.
pub fn extract_sheets(raw: &[RawSheet]) -> Result<Vec<SheetSpec>, ParseError> {
    if raw.is_empty() {
        return Err(ParseError::new(0, ParseErrorKind::MissingSheets));
    }

    let mut sheets: Vec<SheetSpec> = Vec::with_capacity(raw.len());
    for raw_sheet in raw {
        let name = raw_sheet
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_SHEET_NAME);

        let cells = raw_sheet
            .cells
            .iter()
            .map(CellDeclaration::from_entry)
            .collect::<Result<Vec<_>, _>>()?;

        let key = name.to_lowercase();
        match sheets.iter_mut().find(|s| s.name.to_lowercase() == key) {
            Some(existing) => existing.cells.extend(cells),
            None => sheets.push(SheetSpec {
                name: name.to_string(),
                cells,
            }),
        }
    }
    Ok(sheets)
}
