use crate::binding::Binding;
use crate::builder::{element_builder, Buildable, Builder};
use crate::config::ModelConfig;
use crate::datatype::{Code, CodeableConcept, FhirString, Period, Reference, Uri};
use crate::element::{element_capabilities, fingerprint, fingerprint_hash, ElementBase, ElementStaging};
use crate::error::Result;
use crate::validation::Validation;
use crate::visitor::{FieldDescriptor, FieldInfo, NodeKind, Schema, Slot};

const ASSIGNER_TARGETS: &[&str] = &["Organization"];

/// A business identifier: a value that is unique within a system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    fingerprint: u64,
    element: ElementBase,
    use_: Option<Code>,
    type_: Option<CodeableConcept>,
    system: Option<Uri>,
    value: Option<FhirString>,
    period: Option<Period>,
    assigner: Option<Box<Reference>>,
}

impl Identifier {
    pub fn use_(&self) -> Option<&Code> {
        self.use_.as_ref()
    }

    pub fn type_(&self) -> Option<&CodeableConcept> {
        self.type_.as_ref()
    }

    pub fn system(&self) -> Option<&Uri> {
        self.system.as_ref()
    }

    pub fn value(&self) -> Option<&FhirString> {
        self.value.as_ref()
    }

    pub fn period(&self) -> Option<&Period> {
        self.period.as_ref()
    }

    pub fn assigner(&self) -> Option<&Reference> {
        self.assigner.as_deref()
    }
}

fingerprint_hash!(Identifier);
element_capabilities!(Identifier);

impl Schema for Identifier {
    const TYPE_NAME: &'static str = "Identifier";
    const KIND: NodeKind = NodeKind::Datatype;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor {
            info: FieldInfo::attribute("id"),
            get: |i| Slot::attribute(i.element.id()),
        },
        FieldDescriptor {
            info: FieldInfo::element("extension").list(),
            get: |i| Slot::list(i.element.extension()),
        },
        FieldDescriptor {
            info: FieldInfo::element("use")
                .bound(Binding::required("http://hl7.org/fhir/ValueSet/identifier-use")),
            get: |i| Slot::node(i.use_.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("type")
                .bound(Binding::extensible("http://hl7.org/fhir/ValueSet/identifier-type")),
            get: |i| Slot::node(i.type_.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("system"),
            get: |i| Slot::node(i.system.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("value"),
            get: |i| Slot::node(i.value.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("period"),
            get: |i| Slot::node(i.period.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("assigner").references(ASSIGNER_TARGETS),
            get: |i| Slot::node(i.assigner.as_deref()),
        },
    ];
}

impl Buildable for Identifier {
    type Builder = IdentifierBuilder;
}

#[derive(Debug, Clone, Default)]
pub struct IdentifierBuilder {
    element: ElementStaging,
    use_: Option<Code>,
    type_: Option<CodeableConcept>,
    system: Option<Uri>,
    value: Option<FhirString>,
    period: Option<Period>,
    assigner: Option<Box<Reference>>,
}

element_builder!(IdentifierBuilder);

impl IdentifierBuilder {
    pub fn use_(mut self, use_: Code) -> Self {
        self.use_ = Some(use_);
        self
    }

    pub fn type_(mut self, type_: CodeableConcept) -> Self {
        self.type_ = Some(type_);
        self
    }

    pub fn system(mut self, system: Uri) -> Self {
        self.system = Some(system);
        self
    }

    pub fn value(mut self, value: FhirString) -> Self {
        self.value = Some(value);
        self
    }

    pub fn period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }

    pub fn assigner(mut self, assigner: Reference) -> Self {
        self.assigner = Some(Box::new(assigner));
        self
    }
}

impl Builder for IdentifierBuilder {
    type Target = Identifier;

    fn from_source(source: &Identifier) -> Self {
        Self {
            element: ElementStaging::from_base(&source.element),
            use_: source.use_.clone(),
            type_: source.type_.clone(),
            system: source.system.clone(),
            value: source.value.clone(),
            period: source.period.clone(),
            assigner: source.assigner.clone(),
        }
    }

    fn build_with(self, config: &ModelConfig) -> Result<Identifier> {
        let v = Validation::new(config, Identifier::TYPE_NAME);
        let element = self.element.build(&v)?;
        v.reference(self.assigner.as_deref(), "assigner", ASSIGNER_TARGETS)?;
        let fingerprint = fingerprint(&(
            &element,
            &self.use_,
            &self.type_,
            &self.system,
            &self.value,
            &self.period,
            &self.assigner,
        ));
        v.finish(Identifier {
            fingerprint,
            element,
            use_: self.use_,
            type_: self.type_,
            system: self.system,
            value: self.value,
            period: self.period,
            assigner: self.assigner,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assigner_must_be_organization() {
        let err = Identifier::builder()
            .value(FhirString::of("123").unwrap())
            .assigner(Reference::to("Patient/1").unwrap())
            .build()
            .unwrap_err();
        assert_eq!(err.rule(), "reference-target");
        assert_eq!(err.path(), Some("Identifier.assigner"));

        let ok = Identifier::builder()
            .system(Uri::of("urn:oid:1.2.36.146.595.217.0.1").unwrap())
            .value(FhirString::of("123").unwrap())
            .assigner(Reference::to("Organization/acme").unwrap())
            .build()
            .unwrap();
        assert_eq!(ok.assigner().and_then(|a| a.target_type()), Some("Organization"));
    }
}
