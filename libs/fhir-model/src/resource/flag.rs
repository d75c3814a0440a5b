use super::{domain_resource_capabilities, domain_resource_fields, DomainResourceBase, DomainResourceStaging};
use crate::binding::Binding;
use crate::builder::{append, domain_resource_builder, replace, Buildable, Builder};
use crate::config::ModelConfig;
use crate::datatype::{Code, CodeableConcept, Identifier, Period, Reference};
use crate::element::{fingerprint, fingerprint_hash, staged};
use crate::error::Result;
use crate::validation::Validation;
use crate::visitor::{FieldDescriptor, FieldInfo, NodeKind, Schema, Slot};

pub const FLAG_SUBJECT_TARGETS: &[&str] = &[
    "Patient",
    "Location",
    "Group",
    "Organization",
    "Practitioner",
    "PlanDefinition",
    "Medication",
    "Procedure",
];

pub const FLAG_AUTHOR_TARGETS: &[&str] = &[
    "Device",
    "Organization",
    "Patient",
    "Practitioner",
    "PractitionerRole",
];

const ENCOUNTER_TARGETS: &[&str] = &["Encounter"];

/// A prospective warning about a subject, e.g. "patient has a latex allergy".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    fingerprint: u64,
    base: DomainResourceBase,
    identifier: Vec<Identifier>,
    status: Code,
    category: Vec<CodeableConcept>,
    code: CodeableConcept,
    subject: Reference,
    period: Option<Period>,
    encounter: Option<Reference>,
    author: Option<Reference>,
}

impl Flag {
    pub fn identifier(&self) -> &[Identifier] {
        &self.identifier
    }

    /// `active | inactive | entered-in-error`
    pub fn status(&self) -> &Code {
        &self.status
    }

    pub fn category(&self) -> &[CodeableConcept] {
        &self.category
    }

    pub fn code(&self) -> &CodeableConcept {
        &self.code
    }

    pub fn subject(&self) -> &Reference {
        &self.subject
    }

    pub fn period(&self) -> Option<&Period> {
        self.period.as_ref()
    }

    pub fn encounter(&self) -> Option<&Reference> {
        self.encounter.as_ref()
    }

    pub fn author(&self) -> Option<&Reference> {
        self.author.as_ref()
    }
}

fingerprint_hash!(Flag);
domain_resource_capabilities!(Flag);

impl Schema for Flag {
    const TYPE_NAME: &'static str = "Flag";
    const KIND: NodeKind = NodeKind::Resource;
    const FIELDS: &'static [FieldDescriptor<Self>] = domain_resource_fields!(Flag;
        FieldDescriptor {
            info: FieldInfo::element("identifier").list(),
            get: |f| Slot::list(f.identifier.as_slice()),
        },
        FieldDescriptor {
            info: FieldInfo::element("status")
                .required()
                .bound(Binding::required("http://hl7.org/fhir/ValueSet/flag-status")),
            get: |f| Slot::node(Some(&f.status)),
        },
        FieldDescriptor {
            info: FieldInfo::element("category")
                .list()
                .bound(Binding::example("http://hl7.org/fhir/ValueSet/flag-category")),
            get: |f| Slot::list(f.category.as_slice()),
        },
        FieldDescriptor {
            info: FieldInfo::element("code")
                .required()
                .bound(Binding::example("http://hl7.org/fhir/ValueSet/flag-code")),
            get: |f| Slot::node(Some(&f.code)),
        },
        FieldDescriptor {
            info: FieldInfo::element("subject").required().references(FLAG_SUBJECT_TARGETS),
            get: |f| Slot::node(Some(&f.subject)),
        },
        FieldDescriptor {
            info: FieldInfo::element("period"),
            get: |f| Slot::node(f.period.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("encounter").references(ENCOUNTER_TARGETS),
            get: |f| Slot::node(f.encounter.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("author").references(FLAG_AUTHOR_TARGETS),
            get: |f| Slot::node(f.author.as_ref()),
        },
    );
}

impl Buildable for Flag {
    type Builder = FlagBuilder;
}

#[derive(Debug, Clone, Default)]
pub struct FlagBuilder {
    base: DomainResourceStaging,
    identifier: Vec<Option<Identifier>>,
    status: Option<Code>,
    category: Vec<Option<CodeableConcept>>,
    code: Option<CodeableConcept>,
    subject: Option<Reference>,
    period: Option<Period>,
    encounter: Option<Reference>,
    author: Option<Reference>,
}

domain_resource_builder!(FlagBuilder);

impl FlagBuilder {
    pub fn identifier<I, E>(mut self, identifier: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Option<Identifier>>,
    {
        append(&mut self.identifier, identifier);
        self
    }

    pub fn set_identifier<I, E>(mut self, identifier: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Option<Identifier>>,
    {
        replace(&mut self.identifier, identifier);
        self
    }

    pub fn status(mut self, status: Code) -> Self {
        self.status = Some(status);
        self
    }

    pub fn category<I, E>(mut self, category: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Option<CodeableConcept>>,
    {
        append(&mut self.category, category);
        self
    }

    pub fn set_category<I, E>(mut self, category: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Option<CodeableConcept>>,
    {
        replace(&mut self.category, category);
        self
    }

    pub fn code(mut self, code: CodeableConcept) -> Self {
        self.code = Some(code);
        self
    }

    pub fn subject(mut self, subject: Reference) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }

    pub fn encounter(mut self, encounter: Reference) -> Self {
        self.encounter = Some(encounter);
        self
    }

    pub fn author(mut self, author: Reference) -> Self {
        self.author = Some(author);
        self
    }
}

impl Builder for FlagBuilder {
    type Target = Flag;

    fn from_source(source: &Flag) -> Self {
        Self {
            base: DomainResourceStaging::from_base(&source.base),
            identifier: staged(&source.identifier),
            status: Some(source.status.clone()),
            category: staged(&source.category),
            code: Some(source.code.clone()),
            subject: Some(source.subject.clone()),
            period: source.period.clone(),
            encounter: source.encounter.clone(),
            author: source.author.clone(),
        }
    }

    fn build_with(self, config: &ModelConfig) -> Result<Flag> {
        let v = Validation::new(config, Flag::TYPE_NAME);
        let base = self.base.build(&v)?;
        let identifier = v.list(self.identifier, "identifier")?;
        let status = v.require(self.status, "status")?;
        let category = v.list(self.category, "category")?;
        let code = v.require(self.code, "code")?;
        let subject = v.require(self.subject, "subject")?;
        v.reference(Some(&subject), "subject", FLAG_SUBJECT_TARGETS)?;
        v.reference(self.encounter.as_ref(), "encounter", ENCOUNTER_TARGETS)?;
        v.reference(self.author.as_ref(), "author", FLAG_AUTHOR_TARGETS)?;
        let fingerprint = fingerprint(&(
            &base,
            &identifier,
            &status,
            &category,
            &code,
            &subject,
            &self.period,
            &self.encounter,
            &self.author,
        ));
        v.finish(Flag {
            fingerprint,
            base,
            identifier,
            status,
            category,
            code,
            subject,
            period: self.period,
            encounter: self.encounter,
            author: self.author,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::FhirString;
    use crate::error::ValidationError;

    fn code() -> CodeableConcept {
        CodeableConcept::builder()
            .text(FhirString::of("Latex allergy").unwrap())
            .build()
            .unwrap()
    }

    fn flag() -> FlagBuilder {
        Flag::builder()
            .status(Code::of("active").unwrap())
            .code(code())
            .subject(Reference::to("Patient/example").unwrap())
    }

    #[test]
    fn test_missing_status_is_named() {
        let err = Flag::builder()
            .code(code())
            .subject(Reference::to("Patient/example").unwrap())
            .build()
            .unwrap_err();
        assert_eq!(err.field(), Some("status"));
        assert!(matches!(err, ValidationError::MissingRequiredField { .. }));
    }

    #[test]
    fn test_subject_target_types() {
        assert!(flag().build().is_ok());

        let err = flag()
            .subject(Reference::to("Observation/o1").unwrap())
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::DisallowedReferenceTargetType { ref target, .. } if target == "Observation"
        ));
        assert_eq!(err.field(), Some("subject"));
    }

    #[test]
    fn test_encounter_must_be_encounter() {
        let err = flag()
            .encounter(Reference::to("Patient/example").unwrap())
            .build()
            .unwrap_err();
        assert_eq!(err.path(), Some("Flag.encounter"));
    }
}
