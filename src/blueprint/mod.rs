//! Blueprint resolution: which sections and fields a submission renders as.
//!
//! Resolution is total. An authored blueprint is used when the declared form
//! type (or the record's own `formType`/`collection`) names one, or when the
//! record carries keys characteristic of one. Anything else gets a generic
//! single-section blueprint synthesized from the record's keys.

mod catalog;

pub use catalog::catalog;

use crate::format::{humanize_label, is_privacy_field};
use crate::model::{Blueprint, FieldSpec, FieldType, SectionSpec, SpecialHandling, SubmissionRecord, Value};

pub const GENERIC_TITLE: &str = "Insurance Form";
pub const GENERIC_SECTION: &str = "Form Data";

/// Database and workflow bookkeeping keys. Never rendered.
pub const ADMIN_KEYS: &[&str] = &[
    "id",
    "_id",
    "formId",
    "status",
    "createdAt",
    "updatedAt",
    "submittedAt",
    "timestamp",
    "__v",
    "collection",
    "queueId",
    "requestId",
    "formType",
    "submittedBy",
];

/// Keys that hold uploaded-document references.
pub const FILE_KEYS: &[&str] = &[
    "rentAgreement",
    "demandNote",
    "quitNotice",
    "fireBrigadeReport",
    "picturesOfLoss",
    "policeReport",
    "additionalDocuments",
    "cacCertificate",
    "identification",
    "identificationDocument",
    "medicalReport",
    "estimateOfRepair",
];

pub fn is_admin_key(key: &str) -> bool {
    ADMIN_KEYS.contains(&key)
}

fn looks_like_file_url(value: &Value) -> bool {
    let is_url = |s: &str| {
        let s = s.trim();
        s.starts_with("gs://") || s.contains("firebasestorage.googleapis.com")
    };
    match value {
        Value::Text(s) => is_url(s),
        Value::Array(items) => !items.is_empty() && items.iter().all(|v| v.as_str().is_some_and(is_url)),
        _ => false,
    }
}

/// File-reference fields render as attachment entries, not inline values.
pub fn is_file_field(key: &str, value: Option<&Value>) -> bool {
    FILE_KEYS.contains(&key)
        || key.ends_with("Url")
        || key.ends_with("URL")
        || key.ends_with("_url")
        || value.is_some_and(looks_like_file_url)
}

/// Type tag for a synthesized field: runtime shape first, then key-name
/// substrings, then a length check for long free text.
pub fn infer_field_type(key: &str, value: &Value) -> FieldType {
    match value {
        Value::Array(_) => return FieldType::Array,
        Value::Object(_) => return FieldType::Object,
        Value::Bool(_) => return FieldType::Boolean,
        Value::Number(_) => return FieldType::Number,
        Value::Date(_) => return FieldType::Date,
        _ => {}
    }
    let lower = key.to_ascii_lowercase();
    if lower.contains("email") {
        FieldType::Email
    } else if lower.contains("date") {
        FieldType::Date
    } else if lower.contains("amount") || lower.contains("value") {
        FieldType::Currency
    } else if value.as_str().is_some_and(|s| s.chars().count() > 100) {
        FieldType::Textarea
    } else {
        FieldType::Text
    }
}

fn normalize_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

fn candidate_names(record: &SubmissionRecord, declared: Option<&str>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in [declared.map(str::to_string), record.text("formType"), record.text("collection")]
        .into_iter()
        .flatten()
    {
        let name = normalize_name(&name);
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

fn detect_by_heuristics(record: &SubmissionRecord, names: &[String]) -> Option<&'static str> {
    // Whole hyphen/underscore segments only: "currency" is not a rent form.
    let mentions = |word: &str| {
        names
            .iter()
            .any(|n| n.split(['-', '_']).any(|segment| segment.starts_with(word)))
    };
    if mentions("money") {
        return Some("money-insurance-claims");
    }
    if mentions("rent") {
        return Some("rent-assurance-claims");
    }
    let has_any = |keys: &[&str]| keys.iter().any(|k| record.contains_key(k));
    if has_any(&["moneyLocation", "amountInSafe", "discovererName"]) {
        Some("money-insurance-claims")
    } else if has_any(&["rentDueDate", "nameOfLandlord", "amountDefaulted"]) {
        Some("rent-assurance-claims")
    } else if has_any(&["registrationNumber", "vehicleUsage"]) {
        Some("motor-claims")
    } else if record.contains_key("premisesAddress") && record.contains_key("dateOfTheft") {
        Some("burglary-claims")
    } else {
        None
    }
}

/// Copy of an authored blueprint with bookkeeping and upload fields removed;
/// sections left empty are dropped.
fn authored(blueprint: &Blueprint) -> Blueprint {
    let sections = blueprint
        .sections
        .iter()
        .map(|section| SectionSpec {
            title: section.title.clone(),
            fields: section
                .fields
                .iter()
                .filter(|f| !is_admin_key(&f.key) && f.field_type != FieldType::File)
                .cloned()
                .collect(),
        })
        .filter(|section| !section.fields.is_empty())
        .collect();
    Blueprint {
        title: blueprint.title.clone(),
        sections,
        special_handling: blueprint.special_handling,
    }
}

/// Single-section blueprint enumerating the record's own renderable keys in
/// record order.
pub fn synthesize(record: &SubmissionRecord) -> Blueprint {
    let fields: Vec<FieldSpec> = record
        .iter()
        .filter(|(key, value)| !is_admin_key(key) && !is_file_field(key, Some(value)))
        .filter_map(|(key, value)| {
            let label = humanize_label(key);
            if is_privacy_field(key, &label) {
                return None;
            }
            Some(FieldSpec {
                key: key.to_string(),
                label,
                field_type: infer_field_type(key, value),
                section_title: GENERIC_SECTION.to_string(),
                conditional: None,
            })
        })
        .collect();
    let directors = fields.iter().any(|f| f.key == "directors");
    Blueprint {
        title: GENERIC_TITLE.to_string(),
        sections: vec![SectionSpec { title: GENERIC_SECTION.to_string(), fields }],
        special_handling: SpecialHandling { rent_assurance_note: false, director_handling: directors },
    }
}

/// Determine the blueprint for `record`. Never fails.
pub fn resolve(record: &SubmissionRecord, declared: Option<&str>) -> Blueprint {
    let names = candidate_names(record, declared);
    let table = catalog();

    if let Some(found) = names.iter().find_map(|n| table.get(n.as_str())) {
        log::debug!("Blueprint: exact match \"{}\"", found.title);
        return authored(found);
    }
    if let Some(name) = detect_by_heuristics(record, &names)
        && let Some(found) = table.get(name)
    {
        log::debug!("Blueprint: heuristic match {name}");
        return authored(found);
    }
    log::debug!("Blueprint: synthesizing from {} record keys", record.len());
    synthesize(record)
}

/// Canonical form-type name for `record`, used in filenames. Falls back to
/// a generic name when nothing is declared.
pub fn form_type_name(record: &SubmissionRecord, declared: Option<&str>) -> String {
    candidate_names(record, declared)
        .into_iter()
        .next()
        .unwrap_or_else(|| "form".to_string())
}
