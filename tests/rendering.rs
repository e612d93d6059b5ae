mod common;

use formdoc_pdf::canvas::{BLACK, WHITE};
use formdoc_pdf::config::PageGeometry;
use formdoc_pdf::render::{condition_met, document_filename, resolve_date, resolve_signer};
use formdoc_pdf::{RenderConfig, SubmissionRecord};
use serde_json::json;

use common::RecordingCanvas;

fn witness_record() -> SubmissionRecord {
    common::record(json!({
        "nameCompany": "Ngozi Eze",
        "agreeToDataPrivacy": true,
        "witnesses": [
            { "name": "Tunde", "address": "Ikeja", "phone": "0801" },
            { "name": "Bisi", "address": "Yaba", "phone": "0802" },
            { "name": "Chidi", "address": "Surulere", "phone": "0803" }
        ]
    }))
}

#[test]
fn generic_submission_fits_one_page() {
    let rec = common::record(json!({
        "companyName": "Acme Ltd",
        "natureOfBusiness": "Trade",
        "agreeToDataPrivacy": true
    }));
    let (doc, t) = common::render(&rec, Some("generic-form"));
    assert_eq!(doc.page_count, 1);
    assert_eq!(doc.page_breaks, 0);
    assert_eq!(doc.filename, "Acme-Ltd-generic-form.pdf");

    assert!(t.has("INSURANCE FORM"));
    assert!(t.has("Form Data"));
    let label = t.find("Company Name").expect("label");
    let value = t.find("Acme Ltd").expect("value");
    assert_eq!(label.baseline, value.baseline);
    assert!(label.bold);
    assert!(value.x > label.x);
    let nature = t.find("Nature Of Business").expect("label");
    assert_eq!(t.find("Trade").map(|op| op.baseline), Some(nature.baseline));
    assert!(!t.mentions("Agree To Data Privacy"));
    assert!(!t.mentions("Agree to Data Privacy"));
}

#[test]
fn stages_run_in_order() {
    let rec = common::record(json!({ "companyName": "Acme Ltd" }));
    let (_, t) = common::render(&rec, None);
    let order = [
        "NEM",
        "NEM Insurance Plc",
        "INSURANCE FORM",
        "Important Notice",
        "Form Data",
        "Data Privacy Statement",
        "Declaration",
        "Signature of Policyholder:",
        "Claims Procedure",
    ];
    let positions: Vec<usize> = order
        .iter()
        .map(|s| t.position(s).unwrap_or_else(|| panic!("missing {s}")))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
    assert_eq!(positions[0], 0);
}

#[test]
fn empty_record_still_renders() {
    let (doc, t) = common::render(&SubmissionRecord::new(), None);
    assert_eq!(doc.page_count, 1);
    assert_eq!(doc.filename, "submission-form.pdf");
    assert!(!t.has("Form Data"));
    assert!(t.has("Declaration"));
    assert!(t.has("Page 1"));
}

#[test]
fn long_records_paginate() {
    let rec = common::long_record(120);
    let (doc, t) = common::render(&rec, None);
    assert!(doc.page_count > 1);
    assert_eq!(doc.page_count, doc.page_breaks + 1);
    assert_eq!(t.pages, doc.page_count);

    for page in 1..=doc.page_count {
        let label = format!("Page {page}");
        assert_eq!(t.count(&label), 1, "{label}");
        assert_eq!(t.find(&label).map(|op| op.page), Some(page));
    }
    let company_footers = t.footers().filter(|op| op.text == "NEM Insurance Plc").count();
    assert_eq!(company_footers, doc.page_count);

    let bottom = PageGeometry::default().content_bottom();
    for op in t.body() {
        assert!(op.baseline <= bottom + 0.01, "{op:?} below the bottom margin");
    }

    let mut last_page = 0;
    for i in 1..=120 {
        let value = format!("value number {i}");
        let op = t.find(&value).unwrap_or_else(|| panic!("missing {value}"));
        assert_eq!(t.count(&value), 1);
        assert!(op.page >= last_page);
        last_page = op.page;
    }
}

#[test]
fn oversized_row_is_split_between_lines() {
    let story = vec!["claimant"; 4000].join(" ");
    let rec = common::record(json!({ "story": story }));
    let (doc, t) = common::render(&rec, None);
    assert!(doc.page_count >= 3);
    assert_eq!(doc.page_count, doc.page_breaks + 1);
    assert_eq!(t.count("Story"), 1);
    let bottom = PageGeometry::default().content_bottom();
    assert!(t.body().all(|op| op.baseline <= bottom + 0.01));
}

#[test]
fn conditional_fields_follow_their_trigger() {
    let hidden = common::record(json!({
        "doubtIntegrity": "no",
        "integrityExplanation": "Cashier vanished"
    }));
    let (_, t) = common::render(&hidden, Some("money-insurance-claims"));
    assert!(t.has("Doubt Employee Integrity"));
    assert!(!t.has("Integrity Explanation"));
    assert!(!t.mentions("Cashier vanished"));

    let shown = common::record(json!({
        "doubtIntegrity": "yes",
        "integrityExplanation": "Cashier vanished"
    }));
    let (_, t) = common::render(&shown, Some("money-insurance-claims"));
    assert!(t.has("Integrity Explanation"));
    assert!(t.has("Cashier vanished"));
}

#[test]
fn condition_matching() {
    let rec = common::record(json!({ "flag": false, "count": 2, "answer": "Yes" }));
    assert!(condition_met(&rec, "flag", "false"));
    assert!(!condition_met(&rec, "flag", "true"));
    assert!(condition_met(&rec, "count", "2"));
    assert!(condition_met(&rec, "answer", "Yes"));
    assert!(!condition_met(&rec, "answer", "yes"));
    assert!(!condition_met(&rec, "missing", ""));
}

#[test]
fn witnesses_render_as_a_table_without_total() {
    let (_, t) = common::render(&witness_record(), Some("motor-claims"));
    for name in ["Tunde", "Bisi", "Chidi"] {
        assert_eq!(t.count(name), 1, "{name}");
    }
    let headers = t
        .texts
        .iter()
        .filter(|op| op.color == WHITE && op.bold)
        .map(|op| op.text.as_str())
        .collect::<Vec<_>>();
    assert_eq!(headers[..3], ["Name", "Address", "Phone"]);
    assert_eq!(headers.len() % 3, 0);
    assert!(!t.has("TOTAL"));
    assert!(!t.mentions("Agree to Data Privacy"));
}

#[test]
fn property_items_get_a_total_row() {
    let rec = common::record(json!({
        "premisesAddress": "4 Marina",
        "dateOfTheft": "2024-05-01",
        "propertyItems": [
            { "description": "Laptop", "value": 1000 },
            { "description": "Phone", "value": "2,500" }
        ]
    }));
    let (_, t) = common::render(&rec, None);
    assert!(t.has("BURGLARY INSURANCE CLAIM"));
    assert!(t.has("TOTAL"));
    assert!(t.has("\u{20A6}3,500.00"));
}

#[test]
fn directors_get_numbered_blocks() {
    let rec = common::record(json!({
        "companyName": "Delta Holdings",
        "directors": [
            { "firstName": "Ada", "lastName": "Obi" },
            { "firstName": "Emeka", "lastName": "Nwosu" }
        ]
    }));
    let (_, t) = common::render(&rec, Some("corporate-kyc"));
    let first = t.position("Director 1").expect("Director 1");
    let second = t.position("Director 2").expect("Director 2");
    assert!(first < second);
    let ada = t.position("Ada").expect("Ada");
    assert!(first < ada && ada < second);
    assert!(t.has("First Name"));
}

#[test]
fn rent_claims_get_the_assurance_note_and_attachments() {
    let rec = common::record(json!({
        "nameOfInsured": "Kemi Bello",
        "address": "12 Allen Avenue",
        "amountDefaulted": 150000,
        "rentAgreement": "gs://bucket/agreement.pdf",
        "picturesOfLoss": ["gs://bucket/1.jpg", "gs://bucket/2.jpg"]
    }));
    let (doc, t) = common::render(&rec, Some("rent-assurance-claims"));
    assert!(t.has("Rent Assurance Claim Note"));
    assert!(t.mentions("\u{20A6}150,000.00"));
    assert!(t.has("Attachments"));
    assert_eq!(t.count("Rent Agreement"), 1);
    assert!(t.has("Pictures Of Loss 1"));
    assert!(t.has("Pictures Of Loss 2"));
    assert!(!t.mentions("gs://"));
    assert_eq!(doc.filename, "Kemi-Bello-rent-assurance-claims.pdf");

    let note = t.position("Rent Assurance Claim Note").expect("note");
    let procedure = t.position("Claims Procedure").expect("procedure");
    let declaration = t.position("Declaration").expect("declaration");
    assert!(declaration < note && note < procedure);

    let (_, money) = common::render(&rec, Some("money-insurance-claims"));
    assert!(!money.has("Rent Assurance Claim Note"));
}

#[test]
fn policy_box_shows_known_facts() {
    let rec = common::record(json!({
        "policyNumber": "POL-77",
        "periodOfCoverFrom": "2024-01-01",
        "companyName": "Acme Ltd"
    }));
    let (_, t) = common::render(&rec, None);
    assert!(t.has("Policy Number:"));
    assert!(t.has("01/01/2024 to _____________"));

    let (_, plain) = common::render(&common::record(json!({ "companyName": "Acme Ltd" })), None);
    assert!(!plain.has("Policy Number:"));
}

#[test]
fn boolean_fields_render_as_checkboxes() {
    let rec = common::record(json!({ "policeReported": true }));
    let (_, t) = common::render(&rec, Some("motor-claims"));
    assert!(t.has("Police Reported"));
    let filled = t.fills.iter().filter(|(_, _, color)| *color == BLACK).count();
    assert_eq!(filled, 1);
}

fn write_logo(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("formdoc-tests-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    image::RgbaImage::from_pixel(4, 2, image::Rgba([200, 10, 10, 128]))
        .save(&path)
        .unwrap();
    path
}

#[test]
fn logo_is_drawn_when_configured() {
    let config = RenderConfig {
        logo_path: Some(write_logo("drawn.png")),
        ..RenderConfig::default()
    };
    let rec = common::record(json!({ "companyName": "Acme Ltd" }));
    let (_, t) = common::render_on(&rec, None, &config, RecordingCanvas::new());
    assert_eq!(t.images.len(), 1);
    let (page, frame) = t.images[0];
    assert_eq!(page, 1);
    assert_eq!(frame.w, 70.0);
    assert_eq!(frame.h, 35.0);
    assert!(!t.has("NEM"));
}

#[test]
fn logo_failures_fall_back_to_a_text_mark() {
    let rec = common::record(json!({ "companyName": "Acme Ltd" }));

    let missing = RenderConfig {
        logo_path: Some(std::env::temp_dir().join("formdoc-no-such-logo.png")),
        ..RenderConfig::default()
    };
    let (_, t) = common::render_on(&rec, None, &missing, RecordingCanvas::new());
    assert!(t.images.is_empty());
    assert!(t.has("NEM"));

    let rejected = RenderConfig {
        logo_path: Some(write_logo("rejected.png")),
        ..RenderConfig::default()
    };
    let (_, t) = common::render_on(&rec, None, &rejected, RecordingCanvas::failing_images());
    assert!(t.images.is_empty());
    assert!(t.has("NEM"));
}

#[test]
fn signer_and_date() {
    let rec = common::record(json!({
        "fullName": "  Jane \u{0000} Doe ",
        "signatureDate": "2024-02-29"
    }));
    assert_eq!(resolve_signer(&rec).as_deref(), Some("Jane Doe"));
    assert_eq!(resolve_date(&rec), "29/02/2024");
    let (_, t) = common::render(&rec, None);
    assert!(t.has("29/02/2024"));

    assert_eq!(resolve_signer(&SubmissionRecord::new()), None);
    assert_eq!(resolve_date(&SubmissionRecord::new()).len(), 10);
}

#[test]
fn filenames() {
    let rec = common::record(json!({ "companyName": "Acme   Trading  Ltd" }));
    assert_eq!(document_filename(&rec, "motor-claims"), "Acme-Trading-Ltd-motor-claims.pdf");
    let rec = common::record(json!({ "firstName": "Ada", "lastName": "Obi" }));
    assert_eq!(document_filename(&rec, "form"), "Ada-Obi-form.pdf");
    assert_eq!(document_filename(&SubmissionRecord::new(), "form"), "submission-form.pdf");
}
