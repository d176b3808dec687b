//! Batched streaming materializer

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};
use sheetgen_core::Error as SheetError;

use super::{commit_staging_file, staging_file, OutputMode, SheetMaterializer, SheetSummary, Strategy};
use crate::apply::ResolvedStyle;
use crate::cells::{CellDeclaration, SheetSpec};
use crate::coerce::{coerce, CoercedValue};
use crate::columns::{batched_auto_width, ColumnWidths};
use crate::error::{ErrorKind, Warning, Warnings};
use crate::style_table::StyleTable;

/// Format cache key: style id and number format code
type FormatKey = (Option<String>, Option<String>);

/// Per-sheet bookkeeping kept until widths are finalized
struct SheetLayout {
    name: String,
    /// Longest raw text per auto-width column
    auto_lengths: BTreeMap<u16, usize>,
}

/// Streams cells row by row into a constant-memory writer.
///
/// Cells are grouped by row and written in row then column order. Plainly
/// numeric text is written as a number. The output is always a new
/// document; an existing file at the target is replaced.
pub struct BatchedMaterializer {
    workbook: Workbook,
    sheets: Vec<SheetLayout>,
    formats: HashMap<FormatKey, Format>,
    width_plan: Vec<(String, BTreeMap<u16, f64>)>,
}

impl BatchedMaterializer {
    pub fn new() -> Self {
        Self {
            workbook: Workbook::new(),
            sheets: Vec::new(),
            formats: HashMap::new(),
            width_plan: Vec::new(),
        }
    }

    /// Widths applied by [`finalize_widths`](SheetMaterializer::finalize_widths),
    /// per sheet in creation order
    pub fn width_plan(&self) -> &[(String, BTreeMap<u16, f64>)] {
        &self.width_plan
    }

    fn format_for(
        &mut self,
        sheet: &str,
        cell: &CellDeclaration,
        styles: &StyleTable,
        warnings: &mut Warnings,
    ) -> Option<Format> {
        let definition = match cell.style.as_deref() {
            Some(id) => match styles.get(id) {
                Some(def) => Some(def),
                None => {
                    warnings.push(Warning::UnknownStyleReference {
                        sheet: sheet.to_string(),
                        cell: cell.address().to_a1_string(),
                        style: id.to_string(),
                    });
                    None
                }
            },
            None => None,
        };
        if definition.is_none() && cell.number_format.is_none() {
            return None;
        }

        let key = (definition.map(|d| d.id.clone()), cell.number_format.clone());
        let format = self.formats.entry(key).or_insert_with(|| {
            let number_format = cell.number_format.as_deref();
            match definition {
                Some(def) => ResolvedStyle::resolve(def).to_format(number_format),
                None => Format::new().set_num_format(number_format.unwrap_or_default()),
            }
        });
        Some(format.clone())
    }
}

impl Default for BatchedMaterializer {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetMaterializer for BatchedMaterializer {
    fn strategy(&self) -> Strategy {
        Strategy::Batched
    }

    fn mode(&self) -> OutputMode {
        OutputMode::Created
    }

    fn materialize(
        &mut self,
        sheet: &SheetSpec,
        styles: &StyleTable,
        columns: &ColumnWidths,
        warnings: &mut Warnings,
    ) -> Result<SheetSummary, ErrorKind> {
        if self
            .sheets
            .iter()
            .any(|s| s.name.eq_ignore_ascii_case(&sheet.name))
        {
            return Err(SheetError::DuplicateSheetName(sheet.name.clone()).into());
        }

        // Later declarations of the same cell win
        let mut rows: BTreeMap<u32, BTreeMap<u16, &CellDeclaration>> = BTreeMap::new();
        for cell in &sheet.cells {
            rows.entry(cell.row).or_default().insert(cell.col, cell);
        }
        let cells_written: usize = rows.values().map(BTreeMap::len).sum();
        tracing::info!(
            sheet = %sheet.name,
            rows = rows.len(),
            cells = cells_written,
            "streaming sheet"
        );

        let auto_columns: Vec<u16> = columns.auto_columns().collect();
        let mut auto_lengths: BTreeMap<u16, usize> =
            auto_columns.iter().map(|&col| (col, 0)).collect();

        // Resolve formats up front so the worksheet borrow stays short
        let mut planned: Vec<(&CellDeclaration, Option<Format>)> = Vec::with_capacity(cells_written);
        for row in rows.values() {
            for &cell in row.values() {
                let format = self.format_for(&sheet.name, cell, styles, warnings);
                if let Some(len) = auto_lengths.get_mut(&cell.col) {
                    *len = (*len).max(cell.value.chars().count());
                }
                planned.push((cell, format));
            }
        }

        let worksheet = self.workbook.add_worksheet_with_constant_memory();
        worksheet.set_name(&sheet.name)?;
        for (cell, format) in &planned {
            write_cell(worksheet, &sheet.name, cell, format.as_ref(), warnings)?;
        }

        self.sheets.push(SheetLayout {
            name: sheet.name.clone(),
            auto_lengths,
        });

        Ok(SheetSummary {
            name: sheet.name.clone(),
            cells_written,
            existed: false,
        })
    }

    fn finalize_widths(&mut self, columns: &ColumnWidths) -> Result<(), ErrorKind> {
        self.width_plan.clear();
        for (index, layout) in self.sheets.iter().enumerate() {
            let mut widths: BTreeMap<u16, f64> = columns.fixed_columns().collect();
            for (&col, &len) in &layout.auto_lengths {
                widths.insert(col, batched_auto_width(len));
            }

            let worksheet = self.workbook.worksheet_from_index(index)?;
            for (&col, &width) in &widths {
                worksheet.set_column_width(col, width)?;
            }
            tracing::debug!(sheet = %layout.name, columns = widths.len(), "column widths applied");
            self.width_plan.push((layout.name.clone(), widths));
        }
        Ok(())
    }

    fn persist(mut self: Box<Self>, path: &Path) -> Result<(), ErrorKind> {
        let staged = staging_file(path)?;
        self.workbook.save_to_writer(staged.as_file())?;
        commit_staging_file(staged, path)
    }
}

fn write_cell(
    worksheet: &mut Worksheet,
    sheet: &str,
    cell: &CellDeclaration,
    format: Option<&Format>,
    warnings: &mut Warnings,
) -> Result<(), ErrorKind> {
    let (row, col) = (cell.row, cell.col);
    let number = match coerce(&cell.value) {
        Ok(CoercedValue::Integer(n)) => Some(n as f64),
        Ok(CoercedValue::Float(x)) => Some(x),
        Ok(CoercedValue::Text(_)) => None,
        Err(e) => {
            warnings.push(Warning::NumericCoercionFailure {
                sheet: sheet.to_string(),
                cell: cell.address().to_a1_string(),
                text: cell.value.clone(),
                reason: e.to_string(),
            });
            None
        }
    };

    match (number, format) {
        (Some(n), Some(f)) => worksheet.write_number_with_format(row, col, n, f)?,
        (Some(n), None) => worksheet.write_number(row, col, n)?,
        (None, Some(f)) => worksheet.write_string_with_format(row, col, cell.value.as_str(), f)?,
        (None, None) => worksheet.write_string(row, col, cell.value.as_str())?,
    };
    Ok(())
}
