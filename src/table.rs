use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::fs::File;
use std::path::Path;

use crate::csv_reader::{self, CsvData};

/// Heading the host gives its row-label column
pub const LABEL_HEADING: &str = "Label";

/// Read-only access to a table of measurements.
///
/// Cells are addressed by column heading and zero-based row index.
/// Lookups never fail: absent cells read as NaN or the empty string.
pub trait TabularSource {
    fn column_headings(&self) -> &[String];

    fn row_count(&self) -> usize;

    /// Numeric value of a cell, NaN when missing or not a number
    fn numeric_value(&self, heading: &str, row: usize) -> f64;

    /// Row label, empty when the table has no label column
    fn label_value(&self, row: usize) -> String;

    fn string_value(&self, heading: &str, row: usize) -> String;

    /// Index of the label column, if the table has one
    fn label_column(&self) -> Option<usize>;

    fn column_index(&self, heading: &str) -> Option<usize> {
        self.column_headings().iter().position(|h| h == heading)
    }

    fn label_heading(&self) -> Option<&str> {
        self.label_column()
            .and_then(|idx| self.column_headings().get(idx))
            .map(|h| h.as_str())
    }
}

/// In-memory results table
#[derive(Debug, Clone)]
pub struct ResultsTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    label_index: Option<usize>,
}

impl ResultsTable {
    pub fn new(headers: Vec<String>, mut rows: Vec<Vec<String>>) -> Self {
        for row in &mut rows {
            row.resize(headers.len(), String::new());
        }
        let label_index = detect_label_column(&headers, &rows);
        Self {
            headers,
            rows,
            label_index,
        }
    }

    pub fn from_csv(csv: CsvData) -> Self {
        Self::new(csv.headers, csv.rows)
    }

    /// Load a table from a file, dispatching on the extension.
    ///
    /// `.csv` is comma-separated, `.tsv`/`.txt`/`.xls` are tab-separated (the
    /// host saves its results windows that way), `.json` is an array of objects.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "json" => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read '{}'", path.display()))?;
                let value: Value = serde_json::from_str(&text).context("Failed to parse JSON")?;
                Self::from_json(&value)
            }
            "csv" | "tsv" | "txt" | "xls" => {
                let delimiter = if ext == "csv" { b',' } else { b'\t' };
                let file = File::open(path)
                    .with_context(|| format!("Failed to open '{}'", path.display()))?;
                Ok(Self::from_csv(csv_reader::read_csv(file, delimiter)?))
            }
            other => anyhow::bail!("Unsupported table file extension: .{other}"),
        }
    }

    /// Create a table from a JSON array of objects.
    ///
    /// Headings are the union of every object's keys, in order of first
    /// appearance; objects lacking a key get an empty cell.
    pub fn from_json(value: &Value) -> Result<Self> {
        let array = value
            .as_array()
            .ok_or_else(|| anyhow!("Input data must be a JSON array of objects"))?;

        if array.is_empty() {
            return Err(anyhow!("Input data array is empty"));
        }

        let mut objects = Vec::with_capacity(array.len());
        let mut headers: Vec<String> = Vec::new();
        for item in array {
            let obj = item
                .as_object()
                .ok_or_else(|| anyhow!("Items in array must be objects"))?;
            for key in obj.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
            objects.push(obj);
        }

        let mut rows = Vec::with_capacity(objects.len());
        for obj in objects {
            let mut row = Vec::with_capacity(headers.len());
            for header in &headers {
                let cell = match obj.get(header) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    Some(Value::Bool(b)) => b.to_string(),
                    Some(Value::Null) | None => String::new(),
                    _ => return Err(anyhow!("Unsupported value type for field '{}'", header)),
                };
                row.push(cell);
            }
            rows.push(row);
        }

        Ok(Self::new(headers, rows))
    }

    fn cell(&self, heading: &str, row: usize) -> Option<&str> {
        let col = self.column_index(heading)?;
        self.rows.get(row).map(|r| r[col].as_str())
    }
}

impl TabularSource for ResultsTable {
    fn column_headings(&self) -> &[String] {
        &self.headers
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn numeric_value(&self, heading: &str, row: usize) -> f64 {
        self.cell(heading, row)
            .and_then(|c| c.trim().parse::<f64>().ok())
            .unwrap_or(f64::NAN)
    }

    fn label_value(&self, row: usize) -> String {
        match (self.label_index, self.rows.get(row)) {
            (Some(idx), Some(r)) => r[idx].clone(),
            _ => String::new(),
        }
    }

    fn string_value(&self, heading: &str, row: usize) -> String {
        self.cell(heading, row).unwrap_or_default().to_string()
    }

    fn label_column(&self) -> Option<usize> {
        self.label_index
    }
}

/// The label column is the one headed `Label`; failing that, a first column
/// holding text the host could not have written as a number.
fn detect_label_column(headers: &[String], rows: &[Vec<String>]) -> Option<usize> {
    if let Some(idx) = headers.iter().position(|h| h == LABEL_HEADING) {
        return Some(idx);
    }
    if headers.is_empty() {
        return None;
    }
    let first_is_text = rows.iter().any(|r| {
        let cell = r[0].trim();
        !cell.is_empty() && cell.parse::<f64>().is_err()
    });
    first_is_text.then_some(0)
}
