//! Derived table views. Every transform takes the source table by reference
//! and returns a new table; row 0 is treated as the header and carried over
//! unchanged (pivot synthesizes its own).

mod filter;
mod pivot;
mod sort;

pub use filter::{filter_table, FilterOperator};
pub use pivot::{pivot_table, Aggregation};
pub use sort::{sort_table, SortDirection};

use crate::table::{Cell, CellValue, Table};

fn cell_value(row: &[Cell], column: usize) -> Option<&CellValue> {
    row.get(column).and_then(|c| c.value.as_ref())
}

/// Split a table into its header row and an owned copy of the data rows.
fn split_header(table: &Table) -> Option<(&Vec<Cell>, Vec<Vec<Cell>>)> {
    table
        .rows
        .split_first()
        .map(|(header, body)| (header, body.to_vec()))
}

fn rebuild(table: &Table, header: &[Cell], body: Vec<Vec<Cell>>) -> Table {
    let mut rows = Vec::with_capacity(body.len() + 1);
    rows.push(header.to_vec());
    rows.extend(body);
    Table::new(table.name.clone(), rows)
}
