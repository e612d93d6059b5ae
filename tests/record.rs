use formdoc_pdf::{SubmissionRecord, Value};

#[test]
fn insertion_order_is_record_order() {
    let rec = SubmissionRecord::new()
        .with("zeta", "z")
        .with("alpha", 1i64)
        .with("mid", true);
    assert_eq!(rec.keys().collect::<Vec<_>>(), ["zeta", "alpha", "mid"]);
    assert_eq!(rec.len(), 3);
}

#[test]
fn replacing_a_key_keeps_its_position() {
    let rec = SubmissionRecord::new()
        .with("a", 1i64)
        .with("b", 2i64)
        .with("a", "three");
    assert_eq!(rec.keys().collect::<Vec<_>>(), ["a", "b"]);
    assert_eq!(rec.get("a"), Some(&Value::from("three")));

    let collected: SubmissionRecord = vec![
        ("x".to_string(), Value::Null),
        ("y".to_string(), Value::Bool(true)),
        ("x".to_string(), Value::Number(4.0)),
    ]
    .into_iter()
    .collect();
    assert_eq!(collected.keys().collect::<Vec<_>>(), ["x", "y"]);
    assert_eq!(collected.get("x"), Some(&Value::Number(4.0)));
}

#[test]
fn json_objects_keep_document_order() {
    let rec = SubmissionRecord::from_json_str(r#"{ "b": 1, "a": { "d": 2, "c": 3 }, "e": null }"#)
        .expect("record");
    assert_eq!(rec.keys().collect::<Vec<_>>(), ["b", "a", "e"]);
    let nested = rec.get("a").and_then(Value::as_object).expect("nested object");
    assert_eq!(nested.keys().collect::<Vec<_>>(), ["d", "c"]);
    assert_eq!(rec.text("b").as_deref(), Some("1"));
    assert!(rec.contains_key("e"));
    assert!(!rec.contains_key("f"));
}

#[test]
fn large_records_load_every_key() {
    let body: Vec<String> = (0..20_000).map(|i| format!("\"k{i}\": {i}")).collect();
    let rec = SubmissionRecord::from_json_str(&format!("{{{}}}", body.join(","))).expect("record");
    assert_eq!(rec.len(), 20_000);
    assert_eq!(rec.keys().next(), Some("k0"));
    assert_eq!(rec.keys().last(), Some("k19999"));
    assert_eq!(rec.get("k12345"), Some(&Value::Number(12345.0)));
}
