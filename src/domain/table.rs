//! In-memory tabular dataset
//!
//! The unit of data flowing through the worker: an ordered sequence of
//! named, typed columns with row-major cells. The DataSource produces one,
//! every pipeline stage consumes one and produces a new one, and the
//! ArtifactSink serializes the final version as delimited text.

use crate::domain::errors::PorterError;
use crate::domain::result::Result;
use chrono::{DateTime, SecondsFormat, Utc};

/// One typed cell of a dataset
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Absent value; renders as an empty field in the artifact
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Cell {
    /// Whether this cell holds no value
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// The text content, if this is a text cell
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The timestamp, if this is a timestamp cell
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Cell::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Rendered form used in the delimited artifact
    ///
    /// Null renders as an empty field; timestamps render as RFC 3339 UTC.
    pub fn render(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Bool(b) => b.to_string(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Cell::Int(i)
    }
}

impl From<f64> for Cell {
    fn from(f: f64) -> Self {
        Cell::Float(f)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

impl From<DateTime<Utc>> for Cell {
    fn from(ts: DateTime<Utc>) -> Self {
        Cell::Timestamp(ts)
    }
}

impl From<Option<String>> for Cell {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(s) => Cell::Text(s),
            None => Cell::Null,
        }
    }
}

/// An in-memory table with named, typed columns
///
/// Row order is defined by the producer and preserved by operations unless
/// a stage documents otherwise. Column names are unique per table by
/// construction of the queries and stages that build them.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularDataset {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl TabularDataset {
    /// Create an empty dataset with the given column names
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Create a dataset from column names and pre-built rows
    ///
    /// # Errors
    ///
    /// Returns a transform error if any row's arity differs from the
    /// column count.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        let mut dataset = Self::new(columns);
        for row in rows {
            dataset.push_row(row)?;
        }
        Ok(dataset)
    }

    /// Column names, in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows, in order
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Append a row
    ///
    /// # Errors
    ///
    /// Returns a transform error if the row's arity differs from the
    /// column count.
    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(PorterError::Transform(format!(
                "row has {} cells but table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Index of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Index of a column that must exist
    ///
    /// # Errors
    ///
    /// Returns a transform error naming the missing column.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| PorterError::Transform(format!("unknown column '{name}'")))
    }

    /// Cell at (row, column)
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds, like slice indexing.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        &self.rows[row][col]
    }

    /// Serialize as delimited text: header row, one line per row
    ///
    /// An empty dataset still yields the header row, so an empty export
    /// produces a valid artifact.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if writing fails.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(Cell::render))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| PorterError::Serialization(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| PorterError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> TabularDataset {
        TabularDataset::from_rows(
            vec!["userid".to_string(), "response".to_string()],
            vec![
                vec!["u1".into(), "yes".into()],
                vec!["u2".into(), Cell::Null],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_push_row_arity_mismatch() {
        let mut table = TabularDataset::new(vec!["a".to_string(), "b".to_string()]);
        let err = table.push_row(vec!["only-one".into()]).unwrap_err();
        assert!(matches!(err, PorterError::Transform(_)));
    }

    #[test]
    fn test_column_lookup() {
        let table = sample();
        assert_eq!(table.column_index("response"), Some(1));
        assert_eq!(table.column_index("missing"), None);
        assert!(table.require_column("missing").is_err());
    }

    #[test]
    fn test_to_csv_with_nulls() {
        let csv = sample().to_csv().unwrap();
        assert_eq!(csv, "userid,response\nu1,yes\nu2,\n");
    }

    #[test]
    fn test_to_csv_empty_table_keeps_header() {
        let table = TabularDataset::new(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(table.to_csv().unwrap(), "a,b\n");
    }

    #[test]
    fn test_timestamp_rendering() {
        let ts = Utc.with_ymd_and_hms(2020, 1, 1, 12, 2, 0).unwrap();
        assert_eq!(Cell::Timestamp(ts).render(), "2020-01-01T12:02:00Z");
    }

    #[test]
    fn test_cell_conversions() {
        assert_eq!(Cell::from(None::<String>), Cell::Null);
        assert_eq!(Cell::from(Some("x".to_string())), Cell::Text("x".to_string()));
        assert_eq!(Cell::from(3i64), Cell::Int(3));
    }
}
