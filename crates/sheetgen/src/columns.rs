//! Column width resolver

use std::collections::BTreeMap;

use sheetgen_core::CellAddress;

use crate::error::{Warning, Warnings};
use crate::source::Entry;

/// Width value that asks for a width derived from content
pub const AUTO_WIDTH_SENTINEL: f64 = -1.0;

/// Upper bound of any computed width
pub const MAX_AUTO_WIDTH: f64 = 50.0;

/// Lower bound of widths computed by the batched writer
pub const BATCHED_MIN_AUTO_WIDTH: f64 = 8.0;

/// Configured width of one column
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnWidth {
    /// Fixed width in character units
    Fixed(f64),
    /// Derive from the longest rendered value in the column
    Auto,
}

/// Configured column widths, keyed by 0-based column index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnWidths {
    widths: BTreeMap<u16, ColumnWidth>,
}

impl ColumnWidths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw `<column name width>` entries.
    ///
    /// An entry with a missing or invalid name or an unusable width is
    /// skipped with a warning.
    pub fn build(entries: &[Entry], warnings: &mut Warnings) -> Self {
        let mut columns = Self::new();
        for entry in entries {
            let name = entry.get("name").map(str::trim).unwrap_or_default();
            let raw_width = entry.get("width").unwrap_or_default();
            let invalid = || Warning::InvalidColumnWidth {
                column: name.to_string(),
                width: raw_width.to_string(),
            };

            let Ok(col) = CellAddress::letters_to_column(name) else {
                tracing::debug!(position = entry.position, column = name, "unusable column name");
                warnings.push(invalid());
                continue;
            };
            match parse_width(raw_width) {
                Some(width) => columns.set(col, width),
                None => warnings.push(invalid()),
            }
        }
        tracing::debug!(columns = columns.len(), "column widths resolved");
        columns
    }

    pub fn set(&mut self, col: u16, width: ColumnWidth) {
        self.widths.insert(col, width);
    }

    pub fn get(&self, col: u16) -> Option<ColumnWidth> {
        self.widths.get(&col).copied()
    }

    /// Fixed width configured for a column
    pub fn fixed(&self, col: u16) -> Option<f64> {
        match self.get(col) {
            Some(ColumnWidth::Fixed(width)) => Some(width),
            _ => None,
        }
    }

    /// Columns configured with the auto sentinel
    pub fn auto_columns(&self) -> impl Iterator<Item = u16> + '_ {
        self.widths
            .iter()
            .filter(|(_, w)| matches!(w, ColumnWidth::Auto))
            .map(|(&col, _)| col)
    }

    /// Columns configured with a fixed width
    pub fn fixed_columns(&self) -> impl Iterator<Item = (u16, f64)> + '_ {
        self.widths.iter().filter_map(|(&col, w)| match w {
            ColumnWidth::Fixed(width) => Some((col, *width)),
            ColumnWidth::Auto => None,
        })
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }
}

fn parse_width(raw: &str) -> Option<ColumnWidth> {
    let width: f64 = raw.trim().parse().ok()?;
    if width == AUTO_WIDTH_SENTINEL {
        Some(ColumnWidth::Auto)
    } else if width.is_finite() && width > 0.0 {
        Some(ColumnWidth::Fixed(width))
    } else {
        None
    }
}

/// Auto width used by the direct writer: `min(len + 2, 50)`
pub fn direct_auto_width(max_len: usize) -> f64 {
    ((max_len + 2) as f64).min(MAX_AUTO_WIDTH)
}

/// Auto width used by the batched writer: `min(max(len + 2, 8), 50)`
pub fn batched_auto_width(max_len: usize) -> f64 {
    ((max_len + 2) as f64)
        .max(BATCHED_MIN_AUTO_WIDTH)
        .min(MAX_AUTO_WIDTH)
}
