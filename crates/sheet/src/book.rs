use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use indexmap::IndexMap;

/// A book containing multiple sheets (preserves workbook order)
#[derive(Debug, Clone)]
pub struct Book {
    name: String,
    sheets: IndexMap<String, Sheet>,
}

impl Book {
    /// Create a new empty book
    #[must_use]
    pub fn new() -> Self {
        Self::with_name("Book1")
    }

    /// Create a new empty book with a name
    #[must_use]
    pub fn with_name(name: &str) -> Self {
        Book {
            name: name.to_string(),
            sheets: IndexMap::new(),
        }
    }

    /// Get the book name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of sheets
    #[must_use]
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Check if the book is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Get all sheet names in order
    #[must_use]
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.keys().map(String::as_str).collect()
    }

    /// Get a sheet by name
    pub fn get_sheet(&self, name: &str) -> Result<&Sheet> {
        self.sheets
            .get(name)
            .ok_or_else(|| SheetError::SheetNotFound {
                name: name.to_string(),
            })
    }

    /// Add a sheet to the book
    pub fn add_sheet(&mut self, name: &str, sheet: Sheet) -> Result<()> {
        if self.sheets.contains_key(name) {
            return Err(SheetError::SheetAlreadyExists {
                name: name.to_string(),
            });
        }

        let mut sheet = sheet;
        sheet.set_name(name);
        self.sheets.insert(name.to_string(), sheet);
        Ok(())
    }

    /// Iterate over `(name, sheet)` pairs in order
    pub fn sheets(&self) -> impl Iterator<Item = (&str, &Sheet)> {
        self.sheets.iter().map(|(name, sheet)| (name.as_str(), sheet))
    }
}

impl Default for Book {
    fn default() -> Self {
        Self::new()
    }
}
