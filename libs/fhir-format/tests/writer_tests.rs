use ferrum_format::{to_json_string, to_json_value, to_xml_string};
use ferrum_model::datatype::{
    Boolean, Code, CodeableConcept, Coding, Extension, FhirDecimal, FhirString, Meta, Narrative,
    Quantity, Reference, Uri, Xhtml,
};
use ferrum_model::prelude::*;
use ferrum_model::resource::{Flag, Observation, ObservationComponent, Patient};
use rust_decimal::Decimal;
use serde_json::{json, Value};

const DIV: &str = r#"<div xmlns="http://www.w3.org/1999/xhtml">Latex allergy</div>"#;

fn flag() -> Flag {
    let patient = Patient::builder()
        .id("p1")
        .active(Boolean::of(true).unwrap())
        .build()
        .unwrap();
    Flag::builder()
        .id("f1")
        .text(
            Narrative::builder()
                .status(Code::of("generated").unwrap())
                .div(Xhtml::of(DIV).unwrap())
                .build()
                .unwrap(),
        )
        .contained([patient])
        .extension([Extension::builder()
            .url("http://example.org/fhir/StructureDefinition/priority")
            .value(Code::of("high").unwrap())
            .build()
            .unwrap()])
        .status(Code::of("active").unwrap())
        .code(
            CodeableConcept::builder()
                .text(FhirString::of("Latex allergy").unwrap())
                .build()
                .unwrap(),
        )
        .subject(Reference::to("#p1").unwrap())
        .build()
        .unwrap()
}

fn heart_rate() -> Observation {
    let bpm = Quantity::builder()
        .value(FhirDecimal::of(Decimal::new(72, 0)).unwrap())
        .unit(FhirString::of("beats/minute").unwrap())
        .system(Uri::of("http://unitsofmeasure.org").unwrap())
        .code(Code::of("/min").unwrap())
        .build()
        .unwrap();
    Observation::builder()
        .status(Code::of("final").unwrap())
        .code(
            CodeableConcept::builder()
                .coding([Coding::builder()
                    .system(Uri::of("http://loinc.org").unwrap())
                    .code(Code::of("8867-4").unwrap())
                    .build()
                    .unwrap()])
                .build()
                .unwrap(),
        )
        .value(bpm)
        .build()
        .unwrap()
}

#[test]
fn test_flag_json() {
    assert_eq!(
        to_json_value(&flag()),
        json!({
            "resourceType": "Flag",
            "id": "f1",
            "text": { "status": "generated", "div": DIV },
            "contained": [
                { "resourceType": "Patient", "id": "p1", "active": true }
            ],
            "extension": [
                {
                    "url": "http://example.org/fhir/StructureDefinition/priority",
                    "valueCode": "high"
                }
            ],
            "status": "active",
            "code": { "text": "Latex allergy" },
            "subject": { "reference": "#p1" }
        })
    );
}

#[test]
fn test_json_keeps_declared_order() {
    let json = to_json_string(&flag()).unwrap();
    let keys: Vec<String> = match serde_json::from_str::<Value>(&json).unwrap() {
        Value::Object(map) => map.keys().cloned().collect(),
        other => panic!("expected object, got {other}"),
    };
    assert_eq!(
        keys,
        vec!["resourceType", "id", "text", "contained", "extension", "status", "code", "subject"]
    );
}

#[test]
fn test_choice_suffix_in_json() {
    let value = to_json_value(&heart_rate());
    assert_eq!(
        value["valueQuantity"],
        json!({
            "value": 72,
            "unit": "beats/minute",
            "system": "http://unitsofmeasure.org",
            "code": "/min"
        })
    );
    assert!(value.get("value").is_none());
}

#[test]
fn test_primitive_metadata_in_json() {
    let tagged = Uri::builder()
        .id("second")
        .value("http://example.org/fhir/StructureDefinition/other")
        .build()
        .unwrap();
    let extension_only = Boolean::builder()
        .extension([Extension::builder()
            .url("http://hl7.org/fhir/StructureDefinition/data-absent-reason")
            .value(Code::of("unknown").unwrap())
            .build()
            .unwrap()])
        .build()
        .unwrap();
    let meta = Meta::builder()
        .profile([
            Uri::of("http://example.org/fhir/StructureDefinition/first").unwrap(),
            tagged,
        ])
        .build()
        .unwrap();
    let patient = Patient::builder()
        .meta(meta)
        .active(extension_only)
        .build()
        .unwrap();

    let value = to_json_value(&patient);
    assert_eq!(
        value["meta"]["profile"],
        json!([
            "http://example.org/fhir/StructureDefinition/first",
            "http://example.org/fhir/StructureDefinition/other"
        ])
    );
    assert_eq!(value["meta"]["_profile"], json!([null, { "id": "second" }]));
    assert!(value.get("active").is_none());
    assert_eq!(
        value["_active"]["extension"][0]["valueCode"],
        json!("unknown")
    );
}

#[test]
fn test_component_values_in_json() {
    let observation = Observation::builder()
        .status(Code::of("final").unwrap())
        .code(
            CodeableConcept::builder()
                .text(FhirString::of("Blood pressure").unwrap())
                .build()
                .unwrap(),
        )
        .component([ObservationComponent::builder()
            .code(
                CodeableConcept::builder()
                    .text(FhirString::of("Systolic").unwrap())
                    .build()
                    .unwrap(),
            )
            .value(FhirString::of("120 mmHg").unwrap())
            .build()
            .unwrap()])
        .build()
        .unwrap();
    let value = to_json_value(&observation);
    assert_eq!(value["component"][0]["valueString"], json!("120 mmHg"));
    assert_eq!(value["component"][0]["code"]["text"], json!("Systolic"));
}

#[test]
fn test_flag_xml() {
    let xml = to_xml_string(&flag()).unwrap();
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let root = doc.root_element();
    assert_eq!(root.tag_name().name(), "Flag");
    assert_eq!(root.tag_name().namespace(), Some("http://hl7.org/fhir"));

    let children: Vec<_> = root
        .children()
        .filter(|n| n.is_element())
        .map(|n| n.tag_name().name())
        .collect();
    assert_eq!(
        children,
        vec!["id", "text", "contained", "extension", "status", "code", "subject"]
    );

    let id = root.children().find(|n| n.has_tag_name("id")).unwrap();
    assert_eq!(id.attribute("value"), Some("f1"));

    let div = root
        .descendants()
        .find(|n| n.has_tag_name("div"))
        .unwrap();
    assert_eq!(div.tag_name().namespace(), Some("http://www.w3.org/1999/xhtml"));
    assert_eq!(div.text(), Some("Latex allergy"));

    let contained = root
        .children()
        .find(|n| n.has_tag_name("contained"))
        .unwrap();
    let patient = contained.first_element_child().unwrap();
    assert_eq!(patient.tag_name().name(), "Patient");
    let active = patient
        .children()
        .find(|n| n.has_tag_name("active"))
        .unwrap();
    assert_eq!(active.attribute("value"), Some("true"));

    let extension = root
        .children()
        .find(|n| n.has_tag_name("extension"))
        .unwrap();
    assert_eq!(
        extension.attribute("url"),
        Some("http://example.org/fhir/StructureDefinition/priority")
    );
    let value_code = extension.first_element_child().unwrap();
    assert_eq!(value_code.tag_name().name(), "valueCode");
    assert_eq!(value_code.attribute("value"), Some("high"));
}

#[test]
fn test_choice_suffix_in_xml() {
    let xml = to_xml_string(&heart_rate()).unwrap();
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let quantity = doc
        .descendants()
        .find(|n| n.has_tag_name("valueQuantity"))
        .unwrap();
    let value = quantity
        .children()
        .find(|n| n.has_tag_name("value"))
        .unwrap();
    assert_eq!(value.attribute("value"), Some("72"));
}

#[test]
fn test_primitive_metadata_in_xml() {
    let extension_only = Boolean::builder()
        .id("a1")
        .extension([Extension::builder()
            .url("http://hl7.org/fhir/StructureDefinition/data-absent-reason")
            .value(Code::of("unknown").unwrap())
            .build()
            .unwrap()])
        .build()
        .unwrap();
    let patient = Patient::builder().active(extension_only).build().unwrap();
    let xml = to_xml_string(&patient).unwrap();
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let active = doc
        .descendants()
        .find(|n| n.has_tag_name("active"))
        .unwrap();
    assert_eq!(active.attribute("id"), Some("a1"));
    assert_eq!(active.attribute("value"), None);
    assert_eq!(
        active.first_element_child().map(|n| n.tag_name().name()),
        Some("extension")
    );
}

#[test]
fn test_narrative_markup_survives_xml() {
    let div = r#"<div xmlns="http://www.w3.org/1999/xhtml"><p>Latex &amp; <b>rubber</b></p></div>"#;
    let narrative = Narrative::builder()
        .status(Code::of("generated").unwrap())
        .div(Xhtml::of(div).unwrap())
        .build()
        .unwrap();
    let flag = flag().to_builder().text(narrative).build().unwrap();

    let xml = to_xml_string(&flag).unwrap();
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let p = doc.descendants().find(|n| n.has_tag_name("p")).unwrap();
    assert_eq!(p.tag_name().namespace(), Some("http://www.w3.org/1999/xhtml"));
    assert_eq!(p.text(), Some("Latex & "));
    assert!(doc.descendants().any(|n| n.has_tag_name("b")));

    assert!(Xhtml::of("<div>a & b</div>").is_err());
}
