use ferrum_model::datatype::{
    Boolean, Code, CodeableConcept, Coding, DateTime, Extension, FhirString, Identifier, Narrative,
    Period, Reference, Uri, Xhtml,
};
use ferrum_model::prelude::*;
use ferrum_model::resource::{Flag, FlagBuilder, Observation, ObservationComponent, Patient};
use ferrum_model::{ModelConfig, ValidationError};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn concept(text: &str) -> CodeableConcept {
    CodeableConcept::builder()
        .text(FhirString::of(text).unwrap())
        .build()
        .unwrap()
}

fn loinc(code: &str) -> Coding {
    Coding::builder()
        .system(Uri::of("http://loinc.org").unwrap())
        .code(Code::of(code).unwrap())
        .build()
        .unwrap()
}

fn flag() -> FlagBuilder {
    Flag::builder()
        .status(Code::of("active").unwrap())
        .code(concept("Latex allergy"))
        .subject(Reference::to("Patient/example").unwrap())
}

#[test]
fn test_record_with_required_fields_and_subject_target() {
    let err = Flag::builder()
        .code(concept("Latex allergy"))
        .subject(Reference::to("Patient/example").unwrap())
        .build()
        .unwrap_err();
    assert!(matches!(err, ValidationError::MissingRequiredField { .. }));
    assert_eq!(err.field(), Some("status"));

    let ok = flag().build().unwrap();
    assert_eq!(ok.subject().target_type(), Some("Patient"));

    let err = flag()
        .subject(Reference::to("Medication/m1").unwrap())
        .build();
    assert!(err.is_ok(), "Medication is an allowed flag subject");

    let err = flag()
        .subject(Reference::to("Encounter/e1").unwrap())
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        ValidationError::DisallowedReferenceTargetType { .. }
    ));
    assert_eq!(err.field(), Some("subject"));
}

#[test]
fn test_every_required_flag_field_is_named() {
    let cases: Vec<(&str, FlagBuilder)> = vec![
        (
            "code",
            Flag::builder()
                .status(Code::of("active").unwrap())
                .subject(Reference::to("Patient/example").unwrap()),
        ),
        (
            "subject",
            Flag::builder()
                .status(Code::of("active").unwrap())
                .code(concept("x")),
        ),
    ];
    for (field, builder) in cases {
        let err = builder.build().unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingRequiredField {
                path: format!("Flag.{}", field)
            }
        );
    }
}

#[test]
fn test_untyped_references_pass() {
    for literal in [
        "http://example.org/fhir/Whatever/1",
        "urn:uuid:9d8e7f60-4b59-4b8c-9d1e-7fbc0d9e6a11",
        "#contained-1",
    ] {
        let built = flag().subject(Reference::to(literal).unwrap()).build();
        assert!(built.is_ok(), "{literal} should pass");
    }
}

#[test]
fn test_unknown_resource_type_in_literal_fails() {
    let err = flag()
        .subject(Reference::to("Patiente/example").unwrap())
        .build()
        .unwrap_err();
    assert_eq!(err.rule(), "reference-target");
}

#[test]
fn test_reference_checks_can_be_disabled() {
    let config = ModelConfig::builder().check_reference_types(false).build();
    let built = flag()
        .subject(Reference::to("Encounter/e1").unwrap())
        .build_with(&config);
    assert!(built.is_ok());
}

#[test]
fn test_null_list_member_is_rejected_with_index() {
    let err = flag()
        .identifier(vec![
            Some(
                Identifier::builder()
                    .value(FhirString::of("A-1").unwrap())
                    .build()
                    .unwrap(),
            ),
            None,
        ])
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::NullListElement {
            path: "Flag.identifier[1]".to_string()
        }
    );
}

#[test]
fn test_trusted_config_drops_null_members() {
    let built = flag()
        .category(vec![None, Some(concept("clinical")), None])
        .build_with(&ModelConfig::trusted())
        .unwrap();
    assert_eq!(built.category().len(), 1);
}

#[test]
fn test_trusted_config_still_requires_fields() {
    let err = Flag::builder()
        .code(concept("x"))
        .build_with(&ModelConfig::trusted())
        .unwrap_err();
    assert!(matches!(err, ValidationError::MissingRequiredField { .. }));
}

#[test]
fn test_append_and_replace_forms() {
    let built = flag()
        .category([concept("a")])
        .category([concept("b"), concept("c")])
        .build()
        .unwrap();
    assert_eq!(built.category().len(), 3);

    let replaced = built
        .to_builder()
        .set_category([concept("z")])
        .build()
        .unwrap();
    assert_eq!(replaced.category().len(), 1);
    assert_eq!(replaced.category()[0].text().and_then(|t| t.as_str()), Some("z"));

    let cleared = replaced
        .to_builder()
        .set_category(Vec::<CodeableConcept>::new())
        .build()
        .unwrap();
    assert!(cleared.category().is_empty());
}

#[test]
fn test_round_trip_through_builder() {
    let narrative = Narrative::builder()
        .status(Code::of("generated").unwrap())
        .div(Xhtml::of("<div xmlns=\"http://www.w3.org/1999/xhtml\">Latex allergy</div>").unwrap())
        .build()
        .unwrap();
    let original = flag()
        .id("f1")
        .text(narrative)
        .category([concept("clinical")])
        .period(
            Period::builder()
                .start(DateTime::of("2024-03-01").unwrap())
                .build()
                .unwrap(),
        )
        .extension([Extension::builder()
            .url("http://example.org/fhir/StructureDefinition/priority")
            .value(Code::of("high").unwrap())
            .build()
            .unwrap()])
        .build()
        .unwrap();

    let rebuilt = original.to_builder().build().unwrap();
    assert_eq!(rebuilt, original);
    assert_eq!(hash_of(&rebuilt), hash_of(&original));
}

#[test]
fn test_equal_staging_gives_equal_values() {
    let a = flag().build().unwrap();
    let b = flag().build().unwrap();
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));

    let changed = a
        .to_builder()
        .status(Code::of("inactive").unwrap())
        .build()
        .unwrap();
    assert_ne!(changed, a);
    assert_ne!(hash_of(&changed), hash_of(&a));
}

#[test]
fn test_vacuous_composites_are_rejected() {
    let err = CodeableConcept::builder().build().unwrap_err();
    assert_eq!(
        err,
        ValidationError::VacuousElement {
            type_name: "CodeableConcept"
        }
    );

    let err = CodeableConcept::builder().id("c1").build().unwrap_err();
    assert_eq!(err.rule(), "ele-1");

    let err = ObservationComponent::builder().build().unwrap_err();
    assert!(matches!(err, ValidationError::MissingRequiredField { .. }));
}

#[test]
fn test_primitive_lexical_rules() {
    assert!(Code::of(" padded").is_err());
    assert!(FhirString::of("   ").is_err());
    assert!(DateTime::of("2024-13-01").is_err());
    assert!(DateTime::of("2024-03-01T10:00:00").is_err());
    assert!(DateTime::of("2024-03-01T10:00:00+01:00").is_ok());

    let err = FhirString::of("bell\u{7}").unwrap_err();
    assert!(matches!(err, ValidationError::InvalidPrimitiveValue { type_name: "string", .. }));

    let lenient = ModelConfig::builder().check_control_chars(false).build();
    assert!(FhirString::builder()
        .value("bell\u{7}")
        .build_with(&lenient)
        .is_ok());
}

#[test]
fn test_observation_with_components() {
    let systolic = ObservationComponent::builder()
        .code(CodeableConcept::builder().coding([loinc("8480-6")]).build().unwrap())
        .value(FhirString::of("120 mmHg").unwrap())
        .build()
        .unwrap();
    let diastolic = ObservationComponent::builder()
        .code(CodeableConcept::builder().coding([loinc("8462-4")]).build().unwrap())
        .value(FhirString::of("80 mmHg").unwrap())
        .build()
        .unwrap();

    let observation = Observation::builder()
        .status(Code::of("final").unwrap())
        .code(CodeableConcept::builder().coding([loinc("85354-9")]).build().unwrap())
        .subject(Reference::to("Patient/example").unwrap())
        .effective(DateTime::of("2024-03-01T09:30:00Z").unwrap())
        .component([systolic, diastolic])
        .build()
        .unwrap();

    assert_eq!(observation.component().len(), 2);
    assert!(observation.component()[0].code().has_code("http://loinc.org", "8480-6"));
    assert_eq!(
        observation.effective().and_then(|e| e.as_date_time()).and_then(|d| d.as_str()),
        Some("2024-03-01T09:30:00Z")
    );
}

#[test]
fn test_observation_value_repeating_component_code() {
    let code = CodeableConcept::builder().coding([loinc("8480-6")]).build().unwrap();
    let component = ObservationComponent::builder()
        .code(code.clone())
        .value(Boolean::of(true).unwrap())
        .build()
        .unwrap();
    let err = Observation::builder()
        .status(Code::of("final").unwrap())
        .code(code)
        .value(Boolean::of(true).unwrap())
        .component([component])
        .build()
        .unwrap_err();
    assert_eq!(err.rule(), "obs-7");
}

#[test]
fn test_contained_resources_are_one_level_deep() {
    let practitioner_ref = Patient::builder()
        .id("gp")
        .active(Boolean::of(true).unwrap())
        .build()
        .unwrap();
    let patient = Patient::builder()
        .contained([practitioner_ref.clone()])
        .build()
        .unwrap();
    assert_eq!(patient.contained()[0].resource_type(), "Patient");

    let err = flag()
        .contained([patient])
        .build()
        .unwrap_err();
    assert_eq!(err.rule(), "dom-2");
    assert_eq!(err.path(), Some("Flag.contained[0]"));
}

#[test]
fn test_config_from_yaml() {
    let config = ModelConfig::from_yaml("validate: false\n").unwrap();
    assert!(!config.validate);
    assert!(config.check_reference_types);

    let err = flag()
        .subject(Reference::to("Encounter/e1").unwrap())
        .build_with(&config);
    assert!(err.is_ok());
}
