use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Scalar held by a cell. Absent values are represented by `Option::None`
/// at the use site.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    /// The value when it is stored as a number.
    pub fn number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(_) => None,
        }
    }

    /// Numeric reading of the value, parsing text when it looks like a number.
    pub fn parse_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Number(_) => None,
            CellValue::Text(s) => parse_number(s),
        }
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

/// Finite number parsed from trimmed text; empty text is not a number.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Cell {
    pub address: String,
    #[serde(default)]
    pub value: Option<CellValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

impl Cell {
    pub fn new(address: impl Into<String>, value: Option<CellValue>) -> Self {
        Self {
            address: address.into(),
            value,
            formula: None,
        }
    }

    /// Display form of the value, empty when absent.
    pub fn text(&self) -> String {
        self.value.as_ref().map(|v| v.to_string()).unwrap_or_default()
    }
}

/// A named rectangular grid. Row 0 is the header row by convention.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Build a table from raw values, assigning spreadsheet addresses.
    pub fn from_values(name: impl Into<String>, values: Vec<Vec<Option<CellValue>>>) -> Self {
        let rows = values
            .into_iter()
            .enumerate()
            .map(|(r, row)| {
                row.into_iter()
                    .enumerate()
                    .map(|(c, value)| Cell::new(cell_address(c, r), value))
                    .collect()
            })
            .collect();
        Self::new(name, rows)
    }

    pub fn header(&self) -> Option<&[Cell]> {
        self.rows.first().map(|r| r.as_slice())
    }

    pub fn data_rows(&self) -> &[Vec<Cell>] {
        if self.rows.is_empty() {
            &[]
        } else {
            &self.rows[1..]
        }
    }

    /// Header text for a column, falling back to the column letters.
    pub fn column_name(&self, column: usize) -> String {
        self.header()
            .and_then(|h| h.get(column))
            .map(Cell::text)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| column_letters(column))
    }

    pub fn value_at(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(|c| c.value.as_ref())
    }
}

/// Spreadsheet column letters for a zero-based index: 0 -> A, 26 -> AA.
pub fn column_letters(column: usize) -> String {
    let mut letters = Vec::new();
    let mut n = column + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// A1-style address for zero-based column and row indices.
pub fn cell_address(column: usize, row: usize) -> String {
    format!("{}{}", column_letters(column), row + 1)
}
