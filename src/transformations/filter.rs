use std::convert::Infallible;
use std::str::FromStr;

use super::{cell_value, rebuild, split_header};
use crate::table::{parse_number, CellValue, Table};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterOperator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Contains,
    /// Unrecognized operator text; matches nothing.
    Unknown(String),
}

impl FilterOperator {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "=" | "==" | "equals" => FilterOperator::Equals,
            "!=" | "<>" | "notEquals" => FilterOperator::NotEquals,
            ">" | "greaterThan" => FilterOperator::GreaterThan,
            "<" | "lessThan" => FilterOperator::LessThan,
            ">=" | "greaterThanOrEqual" => FilterOperator::GreaterThanOrEqual,
            "<=" | "lessThanOrEqual" => FilterOperator::LessThanOrEqual,
            "contains" => FilterOperator::Contains,
            other => FilterOperator::Unknown(other.to_string()),
        }
    }

    pub fn matches(&self, cell: &CellValue, value: &str) -> bool {
        let numbers = cell.parse_number().zip(parse_number(value));
        match self {
            FilterOperator::Equals => match numbers {
                Some((a, b)) => a == b,
                None => cell.to_string() == value,
            },
            FilterOperator::NotEquals => match numbers {
                Some((a, b)) => a != b,
                None => cell.to_string() != value,
            },
            FilterOperator::GreaterThan => numbers.is_some_and(|(a, b)| a > b),
            FilterOperator::LessThan => numbers.is_some_and(|(a, b)| a < b),
            FilterOperator::GreaterThanOrEqual => numbers.is_some_and(|(a, b)| a >= b),
            FilterOperator::LessThanOrEqual => numbers.is_some_and(|(a, b)| a <= b),
            FilterOperator::Contains => cell
                .to_string()
                .to_lowercase()
                .contains(&value.to_lowercase()),
            FilterOperator::Unknown(_) => false,
        }
    }
}

impl FromStr for FilterOperator {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(FilterOperator::parse(s))
    }
}

/// Keep the data rows whose value in `column` is present and satisfies
/// `operator` against `value`.
pub fn filter_table(table: &Table, column: usize, operator: &FilterOperator, value: &str) -> Table {
    let Some((header, mut body)) = split_header(table) else {
        return table.clone();
    };

    body.retain(|row| cell_value(row, column).is_some_and(|cell| operator.matches(cell, value)));
    rebuild(table, header, body)
}
