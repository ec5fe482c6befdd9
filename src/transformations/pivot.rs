use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use super::cell_value;
use crate::table::{CellValue, Table};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Sum,
    Average,
    Count,
}

impl Aggregation {
    pub fn label(&self) -> &'static str {
        match self {
            Aggregation::Sum => "SUM",
            Aggregation::Average => "AVERAGE",
            Aggregation::Count => "COUNT",
        }
    }

    fn finish(&self, sum: f64, count: usize) -> f64 {
        match self {
            Aggregation::Sum => sum,
            Aggregation::Average if count == 0 => 0.0,
            Aggregation::Average => sum / count as f64,
            Aggregation::Count => count as f64,
        }
    }
}

impl FromStr for Aggregation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sum" => Ok(Aggregation::Sum),
            "average" | "avg" | "mean" => Ok(Aggregation::Average),
            "count" => Ok(Aggregation::Count),
            other => Err(format!("Unknown aggregation: {}", other)),
        }
    }
}

/// Group data rows by the text of `group_column` and aggregate the numeric
/// values of `value_column`. Groups appear in first-seen order; non-numeric
/// values are skipped.
pub fn pivot_table(
    table: &Table,
    group_column: usize,
    value_column: usize,
    aggregation: Aggregation,
) -> Table {
    let mut groups: IndexMap<String, (f64, usize)> = IndexMap::new();

    for row in table.data_rows() {
        let key = cell_value(row, group_column)
            .map(|v| v.to_string())
            .unwrap_or_default();
        let entry = groups.entry(key).or_insert((0.0, 0));
        if let Some(n) = cell_value(row, value_column).and_then(CellValue::parse_number) {
            entry.0 += n;
            entry.1 += 1;
        }
    }

    debug!(
        "Pivoted {} rows of '{}' into {} groups",
        table.data_rows().len(),
        table.name,
        groups.len()
    );

    let mut values = Vec::with_capacity(groups.len() + 1);
    values.push(vec![
        Some(CellValue::Text(table.column_name(group_column))),
        Some(CellValue::Text(format!(
            "{} of {}",
            aggregation.label(),
            table.column_name(value_column)
        ))),
    ]);
    for (key, (sum, count)) in groups {
        values.push(vec![
            Some(CellValue::Text(key)),
            Some(CellValue::Number(aggregation.finish(sum, count))),
        ]);
    }

    Table::from_values(format!("{} pivot", table.name), values)
}
