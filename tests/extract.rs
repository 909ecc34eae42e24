mod common;

use chrono::{TimeZone, Utc};
use order_intake::extract::{Diagnostic, SkipReason, extract, extract_at};
use order_intake::io_utils::{open_csv_reader, read_table_from};
use order_intake::mapping::{ColumnMapping, FieldKey};
use order_intake::writeback::packed_updates;
use rust_decimal::Decimal;

use common::{ORDERS_SHEET, strings};

fn minimal_mapping() -> ColumnMapping {
    ColumnMapping::empty()
        .with(FieldKey::OrderNumber, "Order Number")
        .with(FieldKey::Sku, "SKU")
        .with(FieldKey::Quantity, "Qty")
        .with(FieldKey::FileDate, "Downloaded Date")
}

#[test]
fn unparseable_date_with_target_excludes_row() {
    let header = strings(&["Order Number", "SKU", "Qty", "Downloaded Date"]);
    let rows = vec![strings(&["", "", "abc", "not-a-date"])];
    let result = extract(&header, &rows, &minimal_mapping(), Some("2024-07-05"));
    assert!(result.lines.is_empty());
    assert_eq!(
        result.skipped_rows().collect::<Vec<_>>(),
        vec![(
            1,
            &SkipReason::UnparseableDate {
                raw: "not-a-date".to_string()
            }
        )]
    );
}

#[test]
fn missing_quantity_defaults_to_one_without_target() {
    let header = strings(&["Order Number", "SKU", "Downloaded Date"]);
    let rows = vec![strings(&["1001", "MUG-01", "whenever"])];
    let result = extract(&header, &rows, &minimal_mapping(), None);
    assert_eq!(result.lines.len(), 1);
    assert_eq!(result.lines[0].quantity, 1);
    assert_eq!(result.lines[0].business_date, None);
    assert!(result.diagnostics.contains(&Diagnostic::ConfigurationGap {
        field: FieldKey::Quantity,
        header: "Qty".to_string(),
    }));
}

#[test]
fn default_mapping_extracts_sheet_for_target_day() {
    let mut reader = open_csv_reader(ORDERS_SHEET.as_bytes(), b',');
    let table = read_table_from(&mut reader, encoding_rs::UTF_8).expect("table");
    let stamp = Utc.with_ymd_and_hms(2024, 7, 5, 7, 0, 0).unwrap();
    let result = extract_at(
        &table.header,
        &table.rows,
        &ColumnMapping::default(),
        Some("5/7/2024"),
        stamp,
    );

    let skus = result.lines.iter().map(|l| l.sku.as_str()).collect::<Vec<_>>();
    assert_eq!(skus, vec!["MUG-01", "CUP-02", "MUG-01", "PLATE-03"]);

    let jane = &result.lines[0];
    assert_eq!(jane.customer_name, "Jane Doe");
    assert_eq!(jane.buyer_postcode.as_deref(), Some("AB12CD"));
    assert_eq!(jane.order_value, Some(Decimal::new(1250, 2)));
    assert_eq!(jane.location, "A1");

    let sam = &result.lines[2];
    assert_eq!(sam.quantity, 1);
    assert_eq!(sam.order_value, None);

    let anonymous = &result.lines[3];
    assert_eq!(anonymous.order_number, "Row-4");
    assert_eq!(anonymous.customer_name, "Customer-4");
    assert_eq!(anonymous.location, "Unknown");
    assert_eq!(anonymous.quantity, 3);

    assert!(result.lines.iter().all(|l| l.file_date == stamp));
    assert_eq!(result.skipped_count(|r| *r == SkipReason::MissingSku), 1);
    assert_eq!(
        result.skipped_count(|r| matches!(r, SkipReason::DateMismatch { .. })),
        1
    );
    // Configured columns the sheet lacks are reported once, not per row.
    let gaps = result
        .diagnostics
        .iter()
        .filter(|d| matches!(d, Diagnostic::ConfigurationGap { .. }))
        .count();
    assert_eq!(gaps, 10);
}

#[test]
fn header_only_source_is_empty_not_an_error() {
    let header = strings(&["Order Number", "SKU"]);
    let result = extract(&header, &[], &minimal_mapping(), None);
    assert!(result.lines.is_empty());
    assert_eq!(result.summary(), vec!["source has no data rows".to_string()]);
}

#[test]
fn order_value_currency_text_is_stripped() {
    let mapping = minimal_mapping().with(FieldKey::OrderValue, "Value");
    let header = strings(&["SKU", "Value"]);
    let rows = vec![strings(&["A", "£1,234.50"]), strings(&["B", "N/A"])];
    let result = extract(&header, &rows, &mapping, None);
    assert_eq!(result.lines[0].order_value, Some(Decimal::new(123450, 2)));
    assert_eq!(result.lines[1].order_value, None);
}

#[test]
fn single_name_part_becomes_customer_name() {
    let mapping = minimal_mapping()
        .with(FieldKey::CustomerFirstName, "First")
        .with(FieldKey::CustomerLastName, "Last");
    let header = strings(&["Order Number", "First", "Last", "SKU"]);
    let rows = vec![
        strings(&["1001", "", "Doe", "MUG"]),
        strings(&["1002", "Jane", " ", "CUP"]),
    ];
    let result = extract(&header, &rows, &mapping, None);
    let names = result
        .lines
        .iter()
        .map(|l| l.customer_name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Doe", "Jane"]);
}

#[test]
fn order_date_is_used_when_file_date_is_unmapped() {
    let mapping = ColumnMapping::empty()
        .with(FieldKey::Sku, "SKU")
        .with(FieldKey::OrderDate, "Order Date");
    let header = strings(&["SKU", "Order Date"]);
    let rows = vec![
        strings(&["MUG", "05/07/2024"]),
        strings(&["CUP", "06/07/2024"]),
    ];
    let result = extract(&header, &rows, &mapping, Some("2024-07-05"));
    assert_eq!(result.lines.len(), 1);
    assert_eq!(result.lines[0].sku, "MUG");
    assert_eq!(result.lines[0].business_date.as_deref(), Some("2024-07-05"));
    // An unmapped field is not a gap.
    assert!(!result.diagnostics.iter().any(|d| matches!(
        d,
        Diagnostic::ConfigurationGap {
            field: FieldKey::FileDate,
            ..
        }
    )));
}

#[test]
fn blank_sheet_lines_keep_row_indices_and_write_back_rows() {
    let sheet = "Order Number,SKU\n1001,A\n\n1003,C\n";
    let mut reader = open_csv_reader(sheet.as_bytes(), b',');
    let table = read_table_from(&mut reader, encoding_rs::UTF_8).expect("table");
    let mut result = extract(&table.header, &table.rows, &minimal_mapping(), None);

    let positions = result
        .lines
        .iter()
        .map(|l| (l.sku.as_str(), l.row_index))
        .collect::<Vec<_>>();
    assert_eq!(positions, vec![("A", 1), ("C", 3)]);
    assert_eq!(
        result.skipped_rows().collect::<Vec<_>>(),
        vec![(2, &SkipReason::EmptyRow)]
    );

    for line in &mut result.lines {
        line.completed = true;
    }
    let packed_at = chrono::NaiveDate::from_ymd_opt(2024, 7, 5)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    let rows = packed_updates(&result.lines, "Alex", packed_at)
        .iter()
        .map(|u| u.sheet_row)
        .collect::<Vec<_>>();
    assert_eq!(rows, vec![2, 4]);
}
