//! Structured layout of array and object field values.

use crate::blueprint::infer_field_type;
use crate::canvas::{Canvas, TextStyle};
use crate::format::{self, NOT_AVAILABLE, humanize_label};
use crate::model::{FieldSpec, FieldType, SpecialHandling, SubmissionRecord, Value};

use super::LayoutEngine;
use super::table::TableData;

/// Array keys known to hold tabular data even when item shapes differ.
const TABULAR_KEYS: &[&str] = &["earning", "schedule", "breakdown", "items", "statement", "particulars"];

/// Column keys whose values are money amounts.
const CURRENCY_KEYS: &[&str] = &[
    "amount", "value", "salary", "earning", "wage", "cost", "price", "total", "premium", "income",
];

const SUB_BLOCK_INDENT: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArrayStrategy {
    /// Nothing to show; a single "N/A" row.
    Empty,
    /// One labeled key/value sub-block per director.
    Directors,
    /// Bordered table over the union of item keys.
    Table,
    /// Numbered titled sub-sections for object items, bullets for scalars.
    Subsections,
    /// One bullet line per item.
    Bullets,
}

fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn is_directors_key(key: &str, section_title: &str, handling: SpecialHandling) -> bool {
    squash(key).contains("director")
        || (handling.director_handling && squash(section_title).contains("director"))
}

fn is_tabular_key(key: &str) -> bool {
    let key = squash(key);
    TABULAR_KEYS.iter().any(|k| key.contains(k))
}

pub fn is_currency_key(key: &str) -> bool {
    let key = squash(key);
    CURRENCY_KEYS.iter().any(|k| key.contains(k))
}

fn sorted_keys(record: &SubmissionRecord) -> Vec<&str> {
    let mut keys: Vec<&str> = record.keys().collect();
    keys.sort_unstable();
    keys
}

/// Pick the layout for an array field.
pub fn classify(key: &str, section_title: &str, items: &[Value], handling: SpecialHandling) -> ArrayStrategy {
    let items: Vec<&Value> = items.iter().filter(|v| !v.is_blank()).collect();
    if items.is_empty() {
        return ArrayStrategy::Empty;
    }
    let objects: Vec<&SubmissionRecord> = items.iter().filter_map(|v| v.as_object()).collect();
    if objects.is_empty() {
        return ArrayStrategy::Bullets;
    }
    if is_directors_key(key, section_title, handling) {
        return ArrayStrategy::Directors;
    }
    if objects.len() == items.len() {
        if is_tabular_key(key) {
            return ArrayStrategy::Table;
        }
        let first = sorted_keys(objects[0]);
        if !first.is_empty() && objects.iter().all(|o| sorted_keys(o) == first) {
            return ArrayStrategy::Table;
        }
    }
    ArrayStrategy::Subsections
}

/// Union of item keys in first-seen order.
pub fn table_columns(items: &[Value]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in items.iter().filter_map(Value::as_object) {
        for key in record.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.to_string());
            }
        }
    }
    columns
}

/// A column is numeric when every present value is a number, or its key
/// names money and some value parses as an amount.
pub fn is_numeric_column(key: &str, items: &[Value]) -> bool {
    let values: Vec<&Value> = items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|r| r.get(key))
        .filter(|v| !v.is_blank())
        .collect();
    if values.is_empty() {
        return false;
    }
    values.iter().all(|v| matches!(v, Value::Number(_)))
        || (is_currency_key(key) && values.iter().any(|v| format::parse_amount(v).is_some()))
}

fn cell_type(key: &str, value: &Value) -> FieldType {
    if is_currency_key(key) && !matches!(value, Value::Array(_) | Value::Object(_)) {
        FieldType::Currency
    } else {
        infer_field_type(key, value)
    }
}

pub fn format_cell(key: &str, value: Option<&Value>) -> String {
    match value {
        Some(v) => format::format_value(v, cell_type(key, v)),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Header labels, display rows and the aggregate row of an object array.
pub fn build_table(items: &[Value]) -> TableData {
    let columns = table_columns(items);
    let rows: Vec<Vec<String>> = items
        .iter()
        .filter_map(Value::as_object)
        .map(|record| columns.iter().map(|c| format_cell(c, record.get(c))).collect())
        .collect();

    let numeric: Vec<bool> = columns.iter().map(|c| is_numeric_column(c, items)).collect();
    let total = numeric.iter().any(|&n| n).then(|| {
        let label_col = numeric.iter().position(|&n| !n);
        columns
            .iter()
            .enumerate()
            .map(|(i, key)| {
                if numeric[i] {
                    let sum: f64 = items
                        .iter()
                        .filter_map(Value::as_object)
                        .filter_map(|r| r.get(key))
                        .filter_map(format::parse_amount)
                        .sum();
                    let text = if is_currency_key(key) {
                        format::format_amount(sum, Some(format::CURRENCY_SYMBOL))
                    } else {
                        format::format_number(sum)
                    };
                    if label_col.is_none() && i == 0 {
                        format!("TOTAL: {text}")
                    } else {
                        text
                    }
                } else if Some(i) == label_col {
                    "TOTAL".to_string()
                } else {
                    String::new()
                }
            })
            .collect()
    });

    TableData {
        headers: columns.iter().map(|c| humanize_label(c)).collect(),
        rows,
        total,
    }
}

/// Lay out an array-valued field according to `classify`.
pub(super) fn place_array<C: Canvas>(
    engine: &mut LayoutEngine<C>,
    field: &FieldSpec,
    items: &[Value],
    handling: SpecialHandling,
) {
    let strategy = classify(&field.key, &field.section_title, items, handling);
    log::debug!("Array field {}: {:?} ({} items)", field.key, strategy, items.len());
    match strategy {
        ArrayStrategy::Empty => engine.place_row(&field.label, NOT_AVAILABLE),
        ArrayStrategy::Directors => {
            let mut n = 0;
            for item in items.iter().filter(|v| !v.is_blank()) {
                n += 1;
                engine.place_subheading(&format!("Director {n}"));
                match item {
                    Value::Object(record) => place_object_rows(engine, record, SUB_BLOCK_INDENT),
                    other => engine.place_row_indented("Details", &format::inline_summary(other), SUB_BLOCK_INDENT),
                }
            }
        }
        ArrayStrategy::Table => {
            engine.place_caption(&field.label);
            engine.place_table(&build_table(items));
        }
        ArrayStrategy::Subsections => {
            engine.place_caption(&field.label);
            let singular = field.label.strip_suffix('s').unwrap_or(&field.label);
            let mut n = 0;
            for item in items.iter().filter(|v| !v.is_blank()) {
                match item {
                    Value::Object(record) => {
                        n += 1;
                        engine.place_subheading(&format!("{singular} {n}"));
                        place_object_rows(engine, record, SUB_BLOCK_INDENT);
                    }
                    other => engine.place_bullets(&[format::inline_summary(other)], super::VALUE_STYLE),
                }
            }
        }
        ArrayStrategy::Bullets => {
            engine.place_caption(&field.label);
            let lines: Vec<String> = items
                .iter()
                .filter(|v| !v.is_blank())
                .map(format::inline_summary)
                .collect();
            engine.place_bullets(&lines, super::VALUE_STYLE);
        }
    }
}

fn place_object_rows<C: Canvas>(engine: &mut LayoutEngine<C>, record: &SubmissionRecord, indent: f32) {
    if record.is_empty() {
        engine.place_row_indented("Details", NOT_AVAILABLE, indent);
    }
    for (key, value) in record.iter() {
        let text = match value {
            Value::Array(_) => format::inline_summary(value),
            Value::Object(_) if format::parse_date(value).is_none() => format::inline_summary(value),
            _ => format::format_value(value, cell_type(key, value)),
        };
        engine.place_row_indented(&humanize_label(key), &text, indent);
    }
}

/// Nested object field: caption plus an indented key/value sub-block.
pub(super) fn place_object<C: Canvas>(
    engine: &mut LayoutEngine<C>,
    label: &str,
    record: &SubmissionRecord,
    indent: f32,
) {
    engine.place_caption(label);
    place_object_rows(engine, record, indent + SUB_BLOCK_INDENT);
}

impl<C: Canvas> LayoutEngine<C> {
    /// Bold field label on its own line above structured content.
    pub(crate) fn place_caption(&mut self, label: &str) {
        let style = TextStyle::bold(9.0);
        self.ensure_space(14.0 + super::MIN_ROW_HEIGHT);
        self.canvas.set_style(style);
        self.canvas.draw_text(label, self.page.margin_left + super::CELL_INSET, self.cursor.y + 11.0);
        self.cursor.y += 15.0;
    }
}
