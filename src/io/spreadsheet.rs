//! Spreadsheet rows keyed by normalized position, matched to image file stems

use crate::io::configuration::{DATA_START_ROW, DEFAULT_POSITION_COLUMN};
use crate::io::error::{Result, invalid_parameter, spreadsheet_error};
use calamine::{Data, Range, Reader, open_workbook_auto};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Field values of one spreadsheet row, keyed by field name
pub type RowData = BTreeMap<String, String>;

/// Zero-based column indices used to read the sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    /// Column holding the position key
    pub position: usize,
    /// `(field name, column)` pairs read for every row
    pub fields: Vec<(String, usize)>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            position: DEFAULT_POSITION_COLUMN,
            fields: vec![
                ("supplier".to_string(), 19),
                ("kpp".to_string(), 21),
                ("inn".to_string(), 22),
                ("hyperlink".to_string(), 23),
            ],
        }
    }
}

/// Rows of a spreadsheet indexed by their position key
#[derive(Debug, Clone, Default)]
pub struct SheetIndex {
    rows: BTreeMap<String, RowData>,
}

impl SheetIndex {
    /// Open a workbook and index its first worksheet
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, cannot be parsed, or has no worksheets
    pub fn open(path: &Path, mapping: &ColumnMapping) -> Result<Self> {
        if !path.is_file() {
            return Err(spreadsheet_error(path, &"file not found"));
        }

        let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_error(path, &e))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| spreadsheet_error(path, &"workbook has no worksheets"))?
            .map_err(|e| spreadsheet_error(path, &e))?;

        let index = Self::from_range(&range, mapping);
        info!(
            path = %path.display(),
            records = index.len(),
            "Loaded spreadsheet"
        );
        Ok(index)
    }

    /// Index an in-memory cell range
    ///
    /// Reading starts at [`DATA_START_ROW`] and stops at the first row whose
    /// position cell is empty.
    pub fn from_range(range: &Range<Data>, mapping: &ColumnMapping) -> Self {
        let mut rows = BTreeMap::new();
        let mut row = DATA_START_ROW - 1;

        loop {
            let position = cell_text(range, row, mapping.position);
            if position.trim().is_empty() {
                break;
            }

            let key = normalize_position(&position);
            let data: RowData = mapping
                .fields
                .iter()
                .map(|(name, column)| (name.clone(), cell_text(range, row, *column)))
                .collect();

            if rows.insert(key.clone(), data).is_some() {
                debug!(key, row = row + 1, "Duplicate position, later row wins");
            }
            row += 1;
        }

        Self { rows }
    }

    /// Build an index directly from rows (useful when data comes from elsewhere)
    pub fn from_rows(rows: impl IntoIterator<Item = (String, RowData)>) -> Self {
        Self {
            rows: rows
                .into_iter()
                .map(|(key, data)| (normalize_position(&key), data))
                .collect(),
        }
    }

    /// Row whose key equals the stem of `file` (`1-1.png` -> `1-1`)
    pub fn lookup_for_file(&self, file: &Path) -> Option<&RowData> {
        let stem = file.file_stem()?.to_str()?;
        self.rows.get(stem)
    }

    /// Row stored under `key`
    pub fn get(&self, key: &str) -> Option<&RowData> {
        self.rows.get(key)
    }

    /// All position keys, sorted
    pub fn positions(&self) -> Vec<String> {
        self.rows.keys().cloned().collect()
    }

    /// Number of indexed rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows were indexed
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Normalize a position value: trim whitespace, `1.1` becomes `1-1`
pub fn normalize_position(position: &str) -> String {
    position.trim().replace('.', "-")
}

fn cell_text(range: &Range<Data>, row: usize, column: usize) -> String {
    let Ok(row) = u32::try_from(row) else {
        return String::new();
    };
    let Ok(column) = u32::try_from(column) else {
        return String::new();
    };

    match range.get_value((row, column)) {
        None | Some(Data::Empty) => String::new(),
        Some(Data::Float(value)) if value.fract() == 0.0 && value.abs() < 1e15 => {
            format!("{}", *value as i64)
        }
        Some(other) => other.to_string(),
    }
}

/// Convert a zero-based column index to its letter name (`0 -> A`, `26 -> AA`)
pub fn column_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut remaining = index + 1;
    while remaining > 0 {
        let digit = (remaining - 1) % 26;
        letters.push(char::from(b'A' + digit as u8));
        remaining = (remaining - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Convert a column letter name to its zero-based index (`A -> 0`, `aa -> 26`)
///
/// # Errors
///
/// Returns an error if `letters` is empty or contains non-alphabetic characters
pub fn column_index(letters: &str) -> Result<usize> {
    let trimmed = letters.trim();
    if trimmed.is_empty() {
        return Err(invalid_parameter("column", &letters, &"empty column name"));
    }

    let mut value: usize = 0;
    for ch in trimmed.chars() {
        if !ch.is_ascii_alphabetic() {
            return Err(invalid_parameter(
                "column",
                &letters,
                &"column names contain only letters A-Z",
            ));
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        value = value
            .checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| invalid_parameter("column", &letters, &"column name too long"))?;
    }
    Ok(value - 1)
}
