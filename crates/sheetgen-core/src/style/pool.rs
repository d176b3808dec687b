//! Per-worksheet style interning

use super::Style;
use ahash::AHashMap;

/// Interned styles of one worksheet.
///
/// Styles loaded from an existing document and styles produced while writing
/// cells share one pool, so restyling many cells with the same definition
/// stores it once. Cells hold the returned index; index 0 is the default
/// style and is what an unstyled cell points at.
#[derive(Debug)]
pub struct StylePool {
    styles: Vec<Style>,
    indices: AHashMap<Style, u32>,
}

impl StylePool {
    pub fn new() -> Self {
        let mut pool = Self {
            styles: Vec::new(),
            indices: AHashMap::new(),
        };
        pool.get_or_insert(Style::default());
        pool
    }

    /// Index of `style`, interning it on first use
    pub fn get_or_insert(&mut self, style: Style) -> u32 {
        if let Some(&index) = self.indices.get(&style) {
            return index;
        }
        let index = self.styles.len() as u32;
        self.styles.push(style.clone());
        self.indices.insert(style, index);
        index
    }

    pub fn get(&self, index: u32) -> Option<&Style> {
        self.styles.get(index as usize)
    }

    /// Number of interned styles, default included
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// True when only the default style is present
    pub fn is_empty(&self) -> bool {
        self.styles.len() <= 1
    }
}

impl Default for StylePool {
    fn default() -> Self {
        Self::new()
    }
}
