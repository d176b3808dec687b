//! Worksheet: a named grid of cells

use std::collections::BTreeMap;

use crate::cell::{CellAddress, CellData, CellStorage, CellValue};
use crate::error::{Error, Result};
use crate::style::Style;
use crate::{MAX_COLS, MAX_ROWS};

/// A single worksheet
#[derive(Debug)]
pub struct Worksheet {
    name: String,
    cells: CellStorage,
}

impl Worksheet {
    /// Create a new empty worksheet
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: CellStorage::new(),
        }
    }

    /// Sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a cell by A1 address
    pub fn cell(&self, address: &str) -> Result<Option<&CellData>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.cells.get(addr.row, addr.col))
    }

    /// Get a cell by row/column
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&CellData> {
        self.cells.get(row, col)
    }

    /// Get a cell value by A1 address
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(address)?;
        Ok(self.get_value_at(addr.row, addr.col))
    }

    /// Get a cell value by row/column (empty if unset)
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.cells
            .get(row, col)
            .map(|c| c.value.clone())
            .unwrap_or_default()
    }

    /// Style of the cell, if it carries a non-default one
    pub fn cell_style_at(&self, row: u32, col: u16) -> Option<&Style> {
        let cell = self.cells.get(row, col)?;
        if cell.style_index == 0 {
            return None;
        }
        self.cells.style_pool().get(cell.style_index)
    }

    /// Style of the cell at an A1 address
    pub fn cell_style(&self, address: &str) -> Result<Option<&Style>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.cell_style_at(addr.row, addr.col))
    }

    /// Style stored at a pool index
    pub fn style_by_index(&self, style_index: u32) -> Option<&Style> {
        self.cells.style_pool().get(style_index)
    }

    /// Set a cell value by A1 address
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Set a cell value by row/column, keeping any existing style
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        check_bounds(row, col)?;
        self.cells.set_value(row, col, value.into());
        Ok(())
    }

    /// Set a cell style by A1 address
    pub fn set_cell_style(&mut self, address: &str, style: &Style) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_style_at(addr.row, addr.col, style)
    }

    /// Set a cell style by row/column
    pub fn set_cell_style_at(&mut self, row: u32, col: u16, style: &Style) -> Result<()> {
        check_bounds(row, col)?;
        let style_index = self.cells.style_pool_mut().get_or_insert(style.clone());
        self.cells.set_style(row, col, style_index);
        Ok(())
    }

    /// Get column width (default if not customized)
    pub fn column_width(&self, col: u16) -> f64 {
        self.cells.column_width(col)
    }

    /// Set custom column width
    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.cells.set_column_width(col, width);
    }

    /// Custom column widths
    pub fn custom_column_widths(&self) -> &BTreeMap<u16, f64> {
        self.cells.column_widths()
    }

    /// Number of stored cells
    pub fn cell_count(&self) -> usize {
        self.cells.cell_count()
    }

    /// Check if the sheet has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over all cells in row-major order
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.cells.iter()
    }

    /// Longest rendered value length per column, over cells holding a value
    pub fn max_rendered_len_by_column(&self) -> BTreeMap<u16, usize> {
        let mut lengths: BTreeMap<u16, usize> = BTreeMap::new();
        for (_, col, cell) in self.cells.iter() {
            if cell.value.is_empty() {
                continue;
            }
            let len = cell.value.rendered_len();
            let entry = lengths.entry(col).or_insert(0);
            *entry = (*entry).max(len);
        }
        lengths
    }
}

fn check_bounds(row: u32, col: u16) -> Result<()> {
    if row >= MAX_ROWS {
        return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
    }
    if col >= MAX_COLS {
        return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;

    #[test]
    fn test_values() {
        let mut ws = Worksheet::new("Hoja1");
        ws.set_cell_value("A1", "Nombre").unwrap();
        ws.set_cell_value_at(1, 0, 42.0).unwrap();

        assert_eq!(ws.get_value("A1").unwrap(), CellValue::string("Nombre"));
        assert_eq!(ws.get_value_at(1, 0), CellValue::Number(42.0));
        assert_eq!(ws.get_value_at(5, 5), CellValue::Empty);
        assert_eq!(ws.cell_count(), 2);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut ws = Worksheet::new("Hoja1");
        assert!(ws.set_cell_value_at(MAX_ROWS, 0, "x").is_err());
        assert!(ws.set_cell_value_at(0, MAX_COLS, "x").is_err());
    }

    #[test]
    fn test_styles() {
        let mut ws = Worksheet::new("Hoja1");
        let style = Style::new().bold(true).fill_color(Color::rgb(255, 0, 0));
        ws.set_cell_value("B2", "x").unwrap();
        ws.set_cell_style("B2", &style).unwrap();

        assert_eq!(ws.cell_style("B2").unwrap(), Some(&style));
        assert_eq!(ws.cell_style("A1").unwrap(), None);

        // value rewrite keeps the style
        ws.set_cell_value("B2", "y").unwrap();
        assert_eq!(ws.cell_style("B2").unwrap(), Some(&style));
    }

    #[test]
    fn test_max_rendered_len_by_column() {
        let mut ws = Worksheet::new("Hoja1");
        ws.set_cell_value("A1", "abc").unwrap();
        ws.set_cell_value("A2", "abcdefg").unwrap();
        ws.set_cell_value("A3", "ab").unwrap();
        ws.set_cell_value("C1", 12345.0).unwrap();
        ws.set_cell_style_at(0, 1, &Style::new().bold(true)).unwrap();

        let lengths = ws.max_rendered_len_by_column();
        assert_eq!(lengths.get(&0), Some(&7));
        assert_eq!(lengths.get(&1), None);
        assert_eq!(lengths.get(&2), Some(&5));
    }
}
