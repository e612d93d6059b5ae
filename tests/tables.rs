use formdoc_pdf::layout::array::{ArrayStrategy, build_table, classify, is_numeric_column};
use formdoc_pdf::layout::table::{ColumnWidthPlan, MAX_COLUMN_SHARE, MIN_COLUMN_WIDTH};
use formdoc_pdf::model::SpecialHandling;
use formdoc_pdf::Value;
use proptest::prelude::*;
use proptest::test_runner::Config;
use serde_json::json;

const WIDTH: f32 = 481.9;

fn assert_plan(plan: &ColumnWidthPlan, columns: usize) {
    let widths = plan.widths();
    assert_eq!(widths.len(), columns);
    let sum: f32 = widths.iter().sum();
    assert!((sum - plan.table_width()).abs() < 0.01, "sum {sum} of {widths:?}");
    let (lo, hi) = plan.bounds();
    for w in widths {
        assert!(*w >= lo - 0.01 && *w <= hi + 0.01, "{w} outside [{lo}, {hi}]");
    }
}

#[test]
fn widths_fill_the_table_within_bounds() {
    let cases: Vec<(Vec<f32>, Vec<Vec<f32>>)> = vec![
        (vec![20.0, 30.0, 25.0], vec![vec![60.0, 15.0, 900.0]]),
        (vec![5.0, 5.0], vec![vec![5.0, 5.0]]),
        (vec![400.0, 10.0, 10.0], vec![]),
        (vec![50.0; 6], vec![vec![80.0, 10.0, 300.0, 10.0, 10.0, 10.0]; 3]),
    ];
    for (headers, rows) in cases {
        let plan = ColumnWidthPlan::compute(&headers, &rows, WIDTH);
        assert_plan(&plan, headers.len());
        let (lo, hi) = plan.bounds();
        assert_eq!(lo, MIN_COLUMN_WIDTH);
        assert_eq!(hi, WIDTH * MAX_COLUMN_SHARE);
    }
}

#[test]
fn wide_column_is_capped_at_half() {
    let plan = ColumnWidthPlan::compute(&[400.0, 10.0, 10.0], &[], 480.0);
    assert_plan(&plan, 3);
    assert!((plan.widths()[0] - 240.0).abs() < 0.01);
    assert!((plan.widths()[1] - 120.0).abs() < 0.01);
}

#[test]
fn single_column_takes_the_whole_width() {
    let plan = ColumnWidthPlan::compute(&[30.0], &[vec![12.0]], WIDTH);
    assert_plan(&plan, 1);
    assert!((plan.widths()[0] - WIDTH).abs() < 0.01);
}

#[test]
fn many_columns_share_evenly_when_minimum_is_infeasible() {
    let headers = vec![10.0; 20];
    let plan = ColumnWidthPlan::compute(&headers, &[], WIDTH);
    assert_plan(&plan, 20);
    for w in plan.widths() {
        assert!((w - WIDTH / 20.0).abs() < 0.01);
    }
}

#[test]
fn only_sampled_rows_drive_widths() {
    let mut rows = vec![vec![10.0, 10.0]; 10];
    rows.push(vec![400.0, 10.0]);
    let plan = ColumnWidthPlan::compute(&[10.0, 10.0], &rows, WIDTH);
    assert_plan(&plan, 2);
    assert!((plan.widths()[0] - plan.widths()[1]).abs() < 0.01);
}

/// Header widths, sampled cell widths and the table width of one table.
fn table_shape() -> impl Strategy<Value = (Vec<f32>, Vec<Vec<f32>>, f32)> {
    (1usize..=24, 100.0f32..900.0).prop_flat_map(|(columns, width)| {
        (
            prop::collection::vec(0.0f32..2000.0, columns),
            prop::collection::vec(prop::collection::vec(0.0f32..2000.0, columns), 0..14),
            Just(width),
        )
    })
}

proptest! {
    #![proptest_config(Config::with_cases(512))]
    #[test]
    fn any_plan_fills_its_table_within_bounds((headers, rows, width) in table_shape()) {
        let plan = ColumnWidthPlan::compute(&headers, &rows, width);
        let widths = plan.widths();
        prop_assert_eq!(widths.len(), headers.len());
        let sum: f32 = widths.iter().sum();
        prop_assert!((sum - width).abs() < 0.05, "sum {} of {:?} for {}", sum, widths, width);

        let even = width / headers.len() as f32;
        let (lo, hi) = plan.bounds();
        prop_assert_eq!(lo, MIN_COLUMN_WIDTH.min(even));
        prop_assert_eq!(hi, (width * MAX_COLUMN_SHARE).max(even));
        for w in widths {
            prop_assert!(*w >= lo - 0.05 && *w <= hi + 0.05, "{} outside [{}, {}]", w, lo, hi);
        }
    }

    #[test]
    fn single_column_always_spans_the_table(
        header in 0.0f32..2000.0,
        cells in prop::collection::vec(0.0f32..2000.0, 0..12),
        width in 100.0f32..900.0
    ) {
        let rows: Vec<Vec<f32>> = cells.into_iter().map(|c| vec![c]).collect();
        let plan = ColumnWidthPlan::compute(&[header], &rows, width);
        prop_assert!((plan.widths()[0] - width).abs() < 0.05);
    }

    #[test]
    fn crowded_tables_share_evenly(columns in 13usize..40, width in 100.0f32..480.0) {
        // Fewer than 40pt per column: the minimum cannot hold for anyone.
        prop_assume!(width / (columns as f32) < MIN_COLUMN_WIDTH);
        let headers = vec![500.0; columns];
        let plan = ColumnWidthPlan::compute(&headers, &[], width);
        let even = width / columns as f32;
        for w in plan.widths() {
            prop_assert!((w - even).abs() < 0.05);
        }
    }
}

fn items(value: serde_json::Value) -> Vec<Value> {
    match Value::from(value) {
        Value::Array(items) => items,
        other => panic!("not an array: {other:?}"),
    }
}

#[test]
fn array_classification() {
    let none = SpecialHandling::default();
    let people = items(json!([
        { "name": "A", "phone": "1" },
        { "name": "B", "phone": "2" }
    ]));
    assert_eq!(classify("witnesses", "Witnesses", &people, none), ArrayStrategy::Table);
    assert_eq!(classify("directors", "Director Info", &people, none), ArrayStrategy::Directors);
    let kyc = SpecialHandling { director_handling: true, ..none };
    assert_eq!(classify("people", "Director Info", &people, kyc), ArrayStrategy::Directors);
    assert_eq!(classify("people", "Director Info", &people, none), ArrayStrategy::Table);

    let ragged = items(json!([{ "name": "A" }, { "name": "B", "age": 3 }]));
    assert_eq!(classify("people", "People", &ragged, none), ArrayStrategy::Subsections);
    assert_eq!(classify("propertyItems", "Items", &ragged, none), ArrayStrategy::Table);

    let scalars = items(json!(["one", "two"]));
    assert_eq!(classify("keyholders", "Safe", &scalars, none), ArrayStrategy::Bullets);
    let blank = items(json!(["", null]));
    assert_eq!(classify("keyholders", "Safe", &blank, none), ArrayStrategy::Empty);
    assert_eq!(classify("keyholders", "Safe", &[], none), ArrayStrategy::Empty);
}

#[test]
fn table_without_numeric_columns_has_no_total() {
    let witnesses = items(json!([
        { "name": "Tunde", "address": "Ikeja", "phone": "0801" },
        { "name": "Bisi", "address": "Yaba", "phone": "0802" },
        { "name": "Chidi", "address": "Surulere", "phone": "0803" }
    ]));
    let table = build_table(&witnesses);
    assert_eq!(table.headers, ["Name", "Address", "Phone"]);
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rows[1], ["Bisi", "Yaba", "0802"]);
    assert!(table.total.is_none());
}

#[test]
fn numeric_columns_are_summed() {
    let property = items(json!([
        { "description": "Laptop", "quantity": 1, "value": 1000 },
        { "description": "Phone", "quantity": 2, "value": "2,500" },
        { "description": "Cash" }
    ]));
    assert!(is_numeric_column("quantity", &property));
    assert!(is_numeric_column("value", &property));
    assert!(!is_numeric_column("description", &property));

    let table = build_table(&property);
    assert_eq!(table.rows[0], ["Laptop", "1", "\u{20A6}1,000.00"]);
    assert_eq!(table.rows[2], ["Cash", "N/A", "N/A"]);
    let total = table.total.expect("total row");
    assert_eq!(total, ["TOTAL", "3", "\u{20A6}3,500.00"]);
}

#[test]
fn all_numeric_table_labels_its_first_total_cell() {
    let readings = items(json!([{ "hours": 2 }, { "hours": 3.5 }]));
    let table = build_table(&readings);
    assert_eq!(table.total.expect("total row"), ["TOTAL: 5.5"]);
}
