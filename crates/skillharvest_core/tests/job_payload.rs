use pretty_assertions::assert_eq;
use skillharvest_core::JobRecord;

#[test]
fn full_payload_parses() {
    let payload = r#"{
        "title": "Rust developer",
        "company_name": "Acme",
        "speciality": "rust",
        "description": "<p>Стек: Rust, PostgreSQL.</p>",
        "active": true
    }"#;

    let record: JobRecord = serde_json::from_str(payload).expect("parse");
    assert_eq!(record.title, "Rust developer");
    assert_eq!(record.company_name, "Acme");
    assert_eq!(record.speciality.as_deref(), Some("rust"));
    assert!(record.active);
    // The identifier comes from the request, never the payload.
    assert_eq!(record.id, 0);
}

#[test]
fn missing_fields_default() {
    let record: JobRecord = serde_json::from_str(r#"{"title": "X"}"#).expect("parse");
    assert_eq!(record.title, "X");
    assert_eq!(record.company_name, "");
    assert_eq!(record.speciality, None);
    assert_eq!(record.description, None);
    assert!(!record.active);
}

#[test]
fn null_optionals_parse_as_none() {
    let record: JobRecord =
        serde_json::from_str(r#"{"speciality": null, "description": null, "active": true}"#)
            .expect("parse");
    assert_eq!(record.speciality, None);
    assert_eq!(record.description, None);
    assert!(record.active);
}
