//! In-memory raw table read from the CSV export of the clinic spreadsheet.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::DataError;

/// Rows of optional string cells under a header.
///
/// A cell is `None` when it was empty or whitespace-only in the source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Build a table from a header and rows. Column names are trimmed and
    /// rows are padded or truncated to the header width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let columns: Vec<String> = columns.into_iter().map(|c| c.trim().to_string()).collect();
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, None);
                r
            })
            .collect();
        Self { columns, rows }
    }

    /// Convenience constructor for literal tables in tests and fixtures.
    pub fn from_strs(columns: &[&str], rows: &[Vec<&str>]) -> Self {
        let columns = columns.iter().map(|c| c.to_string()).collect();
        let rows = rows
            .iter()
            .map(|r| r.iter().map(|c| cell(c)).collect())
            .collect();
        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by its trimmed name.
    pub fn column_index(&self, name: &str) -> Result<usize, DataError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))
    }

    /// Fail on the first name in `names` that is not a column of this table.
    pub fn require_columns(&self, names: &[&str]) -> Result<(), DataError> {
        for name in names {
            self.column_index(name)?;
        }
        Ok(())
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(|c| c.as_deref())
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Vec<Option<String>>] {
        &mut self.rows
    }
}

fn cell(raw: &str) -> Option<String> {
    let t = raw.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

/// Read a CSV export whose header sits at the zero-based record `header_row`;
/// the records before it are spreadsheet preamble and are skipped.
pub fn read_csv<P: AsRef<Path>>(path: P, header_row: usize) -> Result<RawTable, DataError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let table = read_csv_from(file, header_row)?;
    log::info!(
        "Read {} rows x {} columns from {}",
        table.len(),
        table.columns().len(),
        path.display()
    );
    Ok(table)
}

/// Same as [`read_csv`] over any reader.
pub fn read_csv_from<R: Read>(reader: R, header_row: usize) -> Result<RawTable, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut header: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        if i < header_row {
            continue;
        }
        match header {
            None => header = Some(record.iter().map(|c| c.to_string()).collect()),
            Some(_) => rows.push(record.iter().map(cell).collect()),
        }
    }

    let columns = header.ok_or(DataError::MissingHeader { header_row })?;
    log::debug!("Columns in table: {columns:?}");
    Ok(RawTable::new(columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn header_offset_skips_preamble() {
        let csv = "Clinic export\nGenerated,2024-10-07\nFacility,Central\nNotes\n DOB ,Sex\n01/01/1990,F\n,M\n";
        let t = read_csv_from(csv.as_bytes(), 4).unwrap();
        assert_eq!(t.columns(), &["DOB".to_string(), "Sex".to_string()]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.get(0, 0), Some("01/01/1990"));
        assert_eq!(t.get(1, 0), None);
        assert_eq!(t.get(1, 1), Some("M"));
    }

    #[test]
    fn ragged_rows_are_padded() {
        let t = read_csv_from("a,b,c\n1\n1,2,3,4\n".as_bytes(), 0).unwrap();
        assert_eq!(t.rows()[0], vec![Some("1".to_string()), None, None]);
        assert_eq!(t.rows()[1].len(), 3);
    }

    #[test]
    fn header_past_end_is_error() {
        let err = read_csv_from("a,b\n".as_bytes(), 3).unwrap_err();
        assert!(matches!(err, DataError::MissingHeader { header_row: 3 }));
    }

    #[test]
    fn missing_column_is_named() {
        let t = RawTable::from_strs(&["Sex"], &[vec!["F"]]);
        let err = t.require_columns(&["Sex", "DOB"]).unwrap_err();
        assert_eq!(err.to_string(), "Column 'DOB' not found in the data");
    }
}
