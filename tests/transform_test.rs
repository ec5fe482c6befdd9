use sheetgraph::table::{CellValue, Table};
use sheetgraph::transformations::{
    filter_table, pivot_table, sort_table, Aggregation, FilterOperator, SortDirection,
};

fn create_test_table() -> Table {
    Table::from_values(
        "Budget",
        vec![
            vec![Some("Dept".into()), Some("Cost".into())],
            vec![Some("Marketing".into()), Some(120.0.into())],
            vec![Some("R&D".into()), Some("200".into())],
            vec![Some("Marketing".into()), Some(80.0.into())],
            vec![Some("Ops".into()), None],
            vec![Some("Sales".into()), Some(45.0.into())],
        ],
    )
}

fn column(table: &Table, col: usize) -> Vec<Option<String>> {
    table
        .data_rows()
        .iter()
        .map(|row| row.get(col).and_then(|c| c.value.as_ref()).map(|v| v.to_string()))
        .collect()
}

#[test]
fn test_header_always_first() {
    let table = create_test_table();
    let header = table.rows[0].clone();
    for direction in [SortDirection::Asc, SortDirection::Desc] {
        assert_eq!(sort_table(&table, 1, direction).rows[0], header);
    }
    assert_eq!(
        filter_table(&table, 0, &FilterOperator::Contains, "zzz").rows,
        vec![header]
    );
}

#[test]
fn test_sort_keeps_row_multiset() {
    let table = create_test_table();
    let sorted = sort_table(&table, 0, SortDirection::Desc);
    let mut original = column(&table, 0);
    let mut after = column(&sorted, 0);
    original.sort();
    after.sort();
    assert_eq!(original, after);
}

#[test]
fn test_sort_absent_last_both_directions() {
    let table = create_test_table();
    for direction in [SortDirection::Asc, SortDirection::Desc] {
        let sorted = sort_table(&table, 1, direction);
        assert_eq!(column(&sorted, 1).last(), Some(&None));
    }
}

#[test]
fn test_filter_keeps_only_matching_present_rows() {
    let table = create_test_table();
    let kept = filter_table(&table, 1, &FilterOperator::parse(">="), "100");
    assert_eq!(
        column(&kept, 0),
        vec![Some("Marketing".to_string()), Some("R&D".to_string())]
    );

    let none = filter_table(&table, 1, &FilterOperator::parse("~="), "100");
    assert!(none.data_rows().is_empty());
}

#[test]
fn test_pivot_sum_by_department() {
    let pivot = pivot_table(&create_test_table(), 0, 1, Aggregation::Sum);
    assert_eq!(pivot.column_name(1), "SUM of Cost");
    let rows: Vec<(String, Option<CellValue>)> = pivot
        .data_rows()
        .iter()
        .map(|r| (r[0].text(), r[1].value.clone()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("Marketing".to_string(), Some(CellValue::Number(200.0))),
            ("R&D".to_string(), Some(CellValue::Number(200.0))),
            ("Ops".to_string(), Some(CellValue::Number(0.0))),
            ("Sales".to_string(), Some(CellValue::Number(45.0))),
        ]
    );
}

#[test]
fn test_pivot_average_of_empty_group_is_zero() {
    let pivot = pivot_table(&create_test_table(), 0, 1, Aggregation::Average);
    let ops = pivot
        .data_rows()
        .iter()
        .find(|r| r[0].text() == "Ops")
        .unwrap();
    assert_eq!(ops[1].value, Some(CellValue::Number(0.0)));
}

#[test]
fn test_header_only_table_degenerates() {
    let table = Table::from_values("T", vec![vec![Some("A".into()), Some("B".into())]]);
    assert!(sort_table(&table, 0, SortDirection::Asc).data_rows().is_empty());
    assert!(pivot_table(&table, 0, 1, Aggregation::Count).data_rows().is_empty());
}

#[test]
fn test_desc_after_asc_reverses_present_rows() {
    let table = Table::from_values(
        "Mixed",
        vec![
            vec![Some("Id".into()), Some("Value".into())],
            vec![Some("r1".into()), Some("pear".into())],
            vec![Some("r2".into()), Some(12.0.into())],
            vec![Some("r3".into()), None],
            vec![Some("r4".into()), Some("7.5".into())],
            vec![Some("r5".into()), Some("apple".into())],
            vec![Some("r6".into()), None],
            vec![Some("r7".into()), Some((-3.0).into())],
        ],
    );

    let asc = sort_table(&table, 1, SortDirection::Asc);
    let desc = sort_table(&asc, 1, SortDirection::Desc);
    let asc_ids = column(&asc, 0);
    let desc_ids = column(&desc, 0);

    let present = 5;
    let mut reversed: Vec<Option<String>> = asc_ids[..present].to_vec();
    reversed.reverse();
    assert_eq!(desc_ids[..present], reversed[..]);

    for sorted in [&asc, &desc] {
        let tail = &column(sorted, 1)[present..];
        assert!(tail.iter().all(Option::is_none));
    }
    assert_eq!(
        asc_ids[..present],
        [
            Some("r7".to_string()),
            Some("r4".to_string()),
            Some("r2".to_string()),
            Some("r5".to_string()),
            Some("r1".to_string()),
        ]
    );
}
