use super::{domain_resource_capabilities, domain_resource_fields, DomainResourceBase, DomainResourceStaging};
use crate::binding::Binding;
use crate::builder::{append, domain_resource_builder, replace, Buildable, Builder};
use crate::config::ModelConfig;
use crate::datatype::{Boolean, Code, Date, Identifier, Reference};
use crate::element::{fingerprint, fingerprint_hash, staged};
use crate::error::Result;
use crate::validation::Validation;
use crate::visitor::{FieldDescriptor, FieldInfo, NodeKind, Schema, Slot};

const MANAGING_ORGANIZATION_TARGETS: &[&str] = &["Organization"];

const GENERAL_PRACTITIONER_TARGETS: &[&str] = &["Organization", "Practitioner", "PractitionerRole"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patient {
    fingerprint: u64,
    base: DomainResourceBase,
    identifier: Vec<Identifier>,
    active: Option<Boolean>,
    gender: Option<Code>,
    birth_date: Option<Date>,
    general_practitioner: Vec<Reference>,
    managing_organization: Option<Reference>,
}

impl Patient {
    pub fn identifier(&self) -> &[Identifier] {
        &self.identifier
    }

    pub fn active(&self) -> Option<&Boolean> {
        self.active.as_ref()
    }

    /// `male | female | other | unknown`
    pub fn gender(&self) -> Option<&Code> {
        self.gender.as_ref()
    }

    pub fn birth_date(&self) -> Option<&Date> {
        self.birth_date.as_ref()
    }

    pub fn general_practitioner(&self) -> &[Reference] {
        &self.general_practitioner
    }

    pub fn managing_organization(&self) -> Option<&Reference> {
        self.managing_organization.as_ref()
    }
}

fingerprint_hash!(Patient);
domain_resource_capabilities!(Patient);

impl Schema for Patient {
    const TYPE_NAME: &'static str = "Patient";
    const KIND: NodeKind = NodeKind::Resource;
    const FIELDS: &'static [FieldDescriptor<Self>] = domain_resource_fields!(Patient;
        FieldDescriptor {
            info: FieldInfo::element("identifier").list(),
            get: |p| Slot::list(p.identifier.as_slice()),
        },
        FieldDescriptor {
            info: FieldInfo::element("active"),
            get: |p| Slot::node(p.active.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("gender")
                .bound(Binding::required("http://hl7.org/fhir/ValueSet/administrative-gender")),
            get: |p| Slot::node(p.gender.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("birthDate"),
            get: |p| Slot::node(p.birth_date.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("generalPractitioner")
                .list()
                .references(GENERAL_PRACTITIONER_TARGETS),
            get: |p| Slot::list(p.general_practitioner.as_slice()),
        },
        FieldDescriptor {
            info: FieldInfo::element("managingOrganization").references(MANAGING_ORGANIZATION_TARGETS),
            get: |p| Slot::node(p.managing_organization.as_ref()),
        },
    );
}

impl Buildable for Patient {
    type Builder = PatientBuilder;
}

#[derive(Debug, Clone, Default)]
pub struct PatientBuilder {
    base: DomainResourceStaging,
    identifier: Vec<Option<Identifier>>,
    active: Option<Boolean>,
    gender: Option<Code>,
    birth_date: Option<Date>,
    general_practitioner: Vec<Option<Reference>>,
    managing_organization: Option<Reference>,
}

domain_resource_builder!(PatientBuilder);

impl PatientBuilder {
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

    pub fn active(mut self, active: Boolean) -> Self {
        self.active = Some(active);
        self
    }

    pub fn gender(mut self, gender: Code) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn birth_date(mut self, birth_date: Date) -> Self {
        self.birth_date = Some(birth_date);
        self
    }

    pub fn general_practitioner<I, E>(mut self, practitioners: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Option<Reference>>,
    {
        append(&mut self.general_practitioner, practitioners);
        self
    }

    pub fn set_general_practitioner<I, E>(mut self, practitioners: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Option<Reference>>,
    {
        replace(&mut self.general_practitioner, practitioners);
        self
    }

    pub fn managing_organization(mut self, organization: Reference) -> Self {
        self.managing_organization = Some(organization);
        self
    }
}

impl Builder for PatientBuilder {
    type Target = Patient;

    fn from_source(source: &Patient) -> Self {
        Self {
            base: DomainResourceStaging::from_base(&source.base),
            identifier: staged(&source.identifier),
            active: source.active.clone(),
            gender: source.gender.clone(),
            birth_date: source.birth_date.clone(),
            general_practitioner: staged(&source.general_practitioner),
            managing_organization: source.managing_organization.clone(),
        }
    }

    fn build_with(self, config: &ModelConfig) -> Result<Patient> {
        let v = Validation::new(config, Patient::TYPE_NAME);
        let base = self.base.build(&v)?;
        let identifier = v.list(self.identifier, "identifier")?;
        let general_practitioner = v.list(self.general_practitioner, "generalPractitioner")?;
        v.references(
            &general_practitioner,
            "generalPractitioner",
            GENERAL_PRACTITIONER_TARGETS,
        )?;
        v.reference(
            self.managing_organization.as_ref(),
            "managingOrganization",
            MANAGING_ORGANIZATION_TARGETS,
        )?;
        let fingerprint = fingerprint(&(
            &base,
            &identifier,
            &self.active,
            &self.gender,
            &self.birth_date,
            &general_practitioner,
            &self.managing_organization,
        ));
        v.finish(Patient {
            fingerprint,
            base,
            identifier,
            active: self.active,
            gender: self.gender,
            birth_date: self.birth_date,
            general_practitioner,
            managing_organization: self.managing_organization,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{DomainResourceBuilder, ResourceBuilder};
    use crate::element::HasId;
    use crate::error::ValidationError;
    use crate::resource::DomainResource;

    #[test]
    fn test_empty_patient_is_vacuous() {
        let err = Patient::builder().build().unwrap_err();
        assert_eq!(err, ValidationError::VacuousElement { type_name: "Patient" });
    }

    #[test]
    fn test_id_alone_is_content() {
        let patient = Patient::builder().id("p1").build().unwrap();
        assert_eq!(patient.id(), Some("p1"));
    }

    #[test]
    fn test_managing_organization_target() {
        let err = Patient::builder()
            .managing_organization(Reference::to("Practitioner/x").unwrap())
            .build()
            .unwrap_err();
        assert_eq!(err.path(), Some("Patient.managingOrganization"));
    }

    #[test]
    fn test_contained_lookup() {
        let inner = Patient::builder().id("p2").build().unwrap();
        let patient = Patient::builder()
            .contained([inner])
            .general_practitioner([Reference::to("#p2").unwrap()])
            .active(Boolean::of(true).unwrap())
            .build()
            .unwrap();
        assert!(patient.find_contained("p2").is_some());
        assert!(patient.find_contained("p3").is_none());
    }

    #[test]
    fn test_nested_contained_rejected() {
        let leaf = Patient::builder().id("leaf").build().unwrap();
        let middle = Patient::builder().id("mid").contained([leaf]).build().unwrap();
        let err = Patient::builder()
            .active(Boolean::of(true).unwrap())
            .contained([middle])
            .build()
            .unwrap_err();
        assert!(matches!(err, ValidationError::NestedContainedResource { .. }));
        assert_eq!(err.path(), Some("Patient.contained[0]"));
    }
}
