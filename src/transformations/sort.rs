use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use super::{cell_value, rebuild, split_header};
use crate::table::{CellValue, Table};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(format!("Unknown sort direction: {}", other)),
        }
    }
}

/// Stable sort of the data rows by the value in `column`.
///
/// Numeric values (including numeric text) compare numerically and sort
/// ahead of other text, which compares ordinally. Absent values sort last in
/// both directions; the direction flips only comparisons between present
/// values.
pub fn sort_table(table: &Table, column: usize, direction: SortDirection) -> Table {
    let Some((header, mut body)) = split_header(table) else {
        return table.clone();
    };

    body.sort_by(|a, b| compare_values(cell_value(a, column), cell_value(b, column), direction));
    rebuild(table, header, body)
}

fn compare_values(a: Option<&CellValue>, b: Option<&CellValue>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ordering = match (a.parse_number(), b.parse_number()) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => a.to_string().cmp(&b.to_string()),
            };
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        }
    }
}
