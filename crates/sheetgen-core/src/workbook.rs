//! Workbook: an ordered collection of uniquely named worksheets

use crate::error::{Error, Result};
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

/// A spreadsheet document
///
/// Sheet names are unique, compared case-insensitively, at all times.
#[derive(Debug, Default)]
pub struct Workbook {
    worksheets: Vec<Worksheet>,
}

impl Workbook {
    /// Create a workbook with a single default sheet ("Sheet1")
    pub fn new() -> Self {
        let mut wb = Self::empty();
        wb.worksheets.push(Worksheet::new("Sheet1"));
        wb
    }

    /// Create a workbook with no sheets
    pub fn empty() -> Self {
        Self {
            worksheets: Vec::new(),
        }
    }

    /// Number of worksheets
    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    /// Check if the workbook has no sheets
    pub fn is_empty(&self) -> bool {
        self.worksheets.is_empty()
    }

    /// Get a worksheet by index
    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    /// Get a mutable worksheet by index
    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.worksheets.get_mut(index)
    }

    /// Index of the sheet with this exact name
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.worksheets.iter().position(|ws| ws.name() == name)
    }

    /// Index of the sheet whose name matches ignoring case
    ///
    /// This is the rule the duplicate check uses, so a name found here can
    /// never be added a second time.
    pub fn find_sheet(&self, name: &str) -> Option<usize> {
        let name_lower = name.to_lowercase();
        self.worksheets
            .iter()
            .position(|ws| ws.name().to_lowercase() == name_lower)
    }

    /// Sheet names in document order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.worksheets.iter().map(|ws| ws.name()).collect()
    }

    /// Iterate over all worksheets
    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.worksheets.iter()
    }

    /// Iterate over all worksheets mutably
    pub fn worksheets_mut(&mut self) -> impl Iterator<Item = &mut Worksheet> {
        self.worksheets.iter_mut()
    }

    /// Add a worksheet with a generated name ("SheetN")
    pub fn add_worksheet(&mut self) -> Result<usize> {
        let name = self.generate_sheet_name();
        self.add_worksheet_with_name(&name)
    }

    /// Add a worksheet with the given name
    pub fn add_worksheet_with_name(&mut self, name: &str) -> Result<usize> {
        self.validate_sheet_name(name)?;

        let index = self.worksheets.len();
        self.worksheets.push(Worksheet::new(name));
        Ok(index)
    }

    /// Index of the sheet named `name`, adding it when absent
    ///
    /// Returns the index and whether the sheet already existed.
    pub fn get_or_add_worksheet(&mut self, name: &str) -> Result<(usize, bool)> {
        match self.find_sheet(name) {
            Some(index) => Ok((index, true)),
            None => self.add_worksheet_with_name(name).map(|i| (i, false)),
        }
    }

    /// Validate a sheet name against the naming rules and existing sheets
    pub fn validate_sheet_name(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidSheetName("Sheet name cannot be empty".into()));
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name too long (max {} characters)",
                MAX_SHEET_NAME_LEN
            )));
        }

        const INVALID_CHARS: &[char] = &[':', '\\', '/', '?', '*', '[', ']'];
        if let Some(c) = INVALID_CHARS.iter().find(|c| name.contains(**c)) {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name cannot contain '{}'",
                c
            )));
        }

        if self.find_sheet(name).is_some() {
            return Err(Error::DuplicateSheetName(name.into()));
        }

        Ok(())
    }

    fn generate_sheet_name(&self) -> String {
        let mut n = self.worksheets.len() + 1;
        loop {
            let name = format!("Sheet{}", n);
            if self.find_sheet(&name).is_none() {
                return name;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_workbook() {
        let wb = Workbook::new();
        assert_eq!(wb.sheet_count(), 1);
        assert_eq!(wb.worksheet(0).unwrap().name(), "Sheet1");
        assert!(Workbook::empty().is_empty());
    }

    #[test]
    fn test_add_worksheet() {
        let mut wb = Workbook::empty();
        assert_eq!(wb.add_worksheet_with_name("Empleados").unwrap(), 0);
        assert_eq!(wb.add_worksheet().unwrap(), 1);
        assert_eq!(wb.sheet_names(), vec!["Empleados", "Sheet2"]);
    }

    #[test]
    fn test_duplicate_names_are_case_insensitive() {
        let mut wb = Workbook::empty();
        wb.add_worksheet_with_name("Empleados").unwrap();
        assert!(matches!(
            wb.add_worksheet_with_name("EMPLEADOS"),
            Err(Error::DuplicateSheetName(_))
        ));
        assert_eq!(wb.find_sheet("empleados"), Some(0));
        assert_eq!(wb.sheet_index("empleados"), None);
    }

    #[test]
    fn test_get_or_add_worksheet() {
        let mut wb = Workbook::empty();
        assert_eq!(wb.get_or_add_worksheet("Hoja1").unwrap(), (0, false));
        assert_eq!(wb.get_or_add_worksheet("Hoja1").unwrap(), (0, true));
        assert_eq!(wb.get_or_add_worksheet("Datos").unwrap(), (1, false));
        assert_eq!(wb.sheet_count(), 2);
    }

    #[test]
    fn test_invalid_sheet_names() {
        let wb = Workbook::empty();
        assert!(wb.validate_sheet_name("").is_err());
        assert!(wb.validate_sheet_name("a/b").is_err());
        assert!(wb.validate_sheet_name(&"x".repeat(32)).is_err());
        assert!(wb.validate_sheet_name(&"ñ".repeat(31)).is_ok());
    }
}
