//! Direct-write materializer

use std::collections::{HashMap, HashSet};
use std::path::Path;

use sheetgen_core::{CellValue, Error as SheetError, Style, Workbook};
use sheetgen_xlsx::{XlsxReader, XlsxWriter};

use super::{commit_staging_file, staging_file, OutputMode, SheetMaterializer, SheetSummary, Strategy};
use crate::apply::{apply_number_format, ResolvedStyle};
use crate::cells::SheetSpec;
use crate::columns::{direct_auto_width, ColumnWidths};
use crate::error::{ErrorKind, Warning, Warnings};
use crate::style_table::StyleTable;

/// Writes cells one at a time into an in-memory [`Workbook`].
///
/// Values are written as text. Opening an existing file extends it: its
/// sheets and cells are kept and same-named sheets are written into.
#[derive(Debug)]
pub struct DirectMaterializer {
    workbook: Workbook,
    mode: OutputMode,
}

impl DirectMaterializer {
    /// Start from an empty document
    pub fn create() -> Self {
        Self {
            workbook: Workbook::empty(),
            mode: OutputMode::Created,
        }
    }

    /// Extend the document at `path` when it exists, otherwise start empty
    pub fn open_or_create(path: &Path) -> Result<Self, ErrorKind> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "creating new document");
            return Ok(Self::create());
        }

        let workbook = XlsxReader::read_file(path).map_err(|source| ErrorKind::Load {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(
            path = %path.display(),
            sheets = workbook.sheet_count(),
            "extending existing document"
        );
        Ok(Self {
            workbook,
            mode: OutputMode::Merged,
        })
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }
}

impl SheetMaterializer for DirectMaterializer {
    fn strategy(&self) -> Strategy {
        Strategy::Direct
    }

    fn mode(&self) -> OutputMode {
        self.mode
    }

    fn materialize(
        &mut self,
        sheet: &SheetSpec,
        styles: &StyleTable,
        _columns: &ColumnWidths,
        warnings: &mut Warnings,
    ) -> Result<SheetSummary, ErrorKind> {
        let (index, existed) = self.workbook.get_or_add_worksheet(&sheet.name)?;
        let sheet_count = self.workbook.sheet_count();
        let worksheet = self
            .workbook
            .worksheet_mut(index)
            .ok_or(SheetError::SheetOutOfBounds(index, sheet_count))?;

        if existed {
            tracing::info!(sheet = %sheet.name, cells = sheet.cells.len(), "writing into existing sheet");
        } else {
            tracing::info!(sheet = %sheet.name, cells = sheet.cells.len(), "sheet created");
        }

        let mut resolved: HashMap<&str, ResolvedStyle> = HashMap::new();
        // Repeated addresses overwrite, so count each one once
        let mut addresses: HashSet<(u32, u16)> = HashSet::with_capacity(sheet.cells.len());

        for cell in &sheet.cells {
            addresses.insert((cell.row, cell.col));
            worksheet.set_cell_value_at(cell.row, cell.col, CellValue::string(cell.value.as_str()))?;

            let definition = match cell.style.as_deref() {
                Some(id) => {
                    let definition = styles.get(id);
                    if definition.is_none() {
                        warnings.push(Warning::UnknownStyleReference {
                            sheet: sheet.name.clone(),
                            cell: cell.address().to_a1_string(),
                            style: id.to_string(),
                        });
                    }
                    definition
                }
                None => None,
            };

            if definition.is_none() && cell.number_format.is_none() {
                continue;
            }

            let base = worksheet
                .cell_style_at(cell.row, cell.col)
                .cloned()
                .unwrap_or_default();
            let mut style: Style = match definition {
                Some(def) => resolved
                    .entry(def.id.as_str())
                    .or_insert_with(|| ResolvedStyle::resolve(def))
                    .apply_to(&base),
                None => base,
            };
            if let Some(code) = cell.number_format.as_deref() {
                style = apply_number_format(&style, code);
            }
            worksheet.set_cell_style_at(cell.row, cell.col, &style)?;
        }

        Ok(SheetSummary {
            name: worksheet.name().to_string(),
            cells_written: addresses.len(),
            existed,
        })
    }

    fn finalize_widths(&mut self, columns: &ColumnWidths) -> Result<(), ErrorKind> {
        for worksheet in self.workbook.worksheets_mut() {
            let lengths = worksheet.max_rendered_len_by_column();
            for (&col, &len) in &lengths {
                if columns.fixed(col).is_none() {
                    worksheet.set_column_width(col, direct_auto_width(len));
                }
            }
            for (col, width) in columns.fixed_columns() {
                worksheet.set_column_width(col, width);
            }
            tracing::debug!(
                sheet = worksheet.name(),
                measured = lengths.len(),
                "column widths applied"
            );
        }
        Ok(())
    }

    fn persist(self: Box<Self>, path: &Path) -> Result<(), ErrorKind> {
        let mut staged = staging_file(path)?;
        XlsxWriter::write(&self.workbook, staged.as_file_mut()).map_err(|e| {
            ErrorKind::Persistence {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::Other, e),
            }
        })?;
        commit_staging_file(staged, path)
    }
}
