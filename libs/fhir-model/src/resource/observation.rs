use super::{domain_resource_capabilities, domain_resource_fields, DomainResourceBase, DomainResourceStaging};
use crate::binding::Binding;
use crate::builder::{append, backbone_builder, domain_resource_builder, replace, Buildable, Builder};
use crate::config::ModelConfig;
use crate::datatype::{
    Annotation, Code, CodeableConcept, DataType, DataValue, Extension, Identifier, Instant,
    Reference,
};
use crate::element::{
    fingerprint, fingerprint_hash, staged, BackboneElementBase, BackboneElementStaging, HasExtensions,
    HasId, HasModifierExtensions,
};
use crate::error::Result;
use crate::validation::Validation;
use crate::visitor::{FieldDescriptor, FieldInfo, NodeKind, Schema, Slot};

const BASED_ON_TARGETS: &[&str] = &[
    "CarePlan",
    "DeviceRequest",
    "ImmunizationRecommendation",
    "MedicationRequest",
    "NutritionOrder",
    "ServiceRequest",
];

pub const OBSERVATION_SUBJECT_TARGETS: &[&str] = &["Patient", "Group", "Device", "Location"];

const ENCOUNTER_TARGETS: &[&str] = &["Encounter"];

const PERFORMER_TARGETS: &[&str] = &[
    "Practitioner",
    "PractitionerRole",
    "Organization",
    "CareTeam",
    "Patient",
    "RelatedPerson",
];

const HAS_MEMBER_TARGETS: &[&str] = &["Observation", "QuestionnaireResponse", "MolecularSequence"];

const DERIVED_FROM_TARGETS: &[&str] = &[
    "DocumentReference",
    "ImagingStudy",
    "Media",
    "QuestionnaireResponse",
    "Observation",
    "MolecularSequence",
];

pub const OBSERVATION_EFFECTIVE_TYPES: &[DataType] =
    &[DataType::DateTime, DataType::Period, DataType::Instant];

pub const OBSERVATION_VALUE_TYPES: &[DataType] = &[
    DataType::Quantity,
    DataType::CodeableConcept,
    DataType::String,
    DataType::Boolean,
    DataType::Integer,
    DataType::DateTime,
    DataType::Period,
];

const STATUS_BINDING: Binding = Binding::required("http://hl7.org/fhir/ValueSet/observation-status");
const CODE_BINDING: Binding = Binding::example("http://hl7.org/fhir/ValueSet/observation-codes");
const DATA_ABSENT_BINDING: Binding =
    Binding::extensible("http://hl7.org/fhir/ValueSet/data-absent-reason");
const INTERPRETATION_BINDING: Binding =
    Binding::extensible("http://hl7.org/fhir/ValueSet/observation-interpretation");

/// Measurements and simple assertions made about a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    fingerprint: u64,
    base: DomainResourceBase,
    identifier: Vec<Identifier>,
    based_on: Vec<Reference>,
    status: Code,
    category: Vec<CodeableConcept>,
    code: CodeableConcept,
    subject: Option<Reference>,
    focus: Vec<Reference>,
    encounter: Option<Reference>,
    effective: Option<DataValue>,
    issued: Option<Instant>,
    performer: Vec<Reference>,
    value: Option<DataValue>,
    data_absent_reason: Option<CodeableConcept>,
    interpretation: Vec<CodeableConcept>,
    note: Vec<Annotation>,
    body_site: Option<CodeableConcept>,
    method: Option<CodeableConcept>,
    has_member: Vec<Reference>,
    derived_from: Vec<Reference>,
    component: Vec<ObservationComponent>,
}

impl Observation {
    pub fn identifier(&self) -> &[Identifier] {
        &self.identifier
    }

    pub fn based_on(&self) -> &[Reference] {
        &self.based_on
    }

    /// `registered | preliminary | final | amended | ...`
    pub fn status(&self) -> &Code {
        &self.status
    }

    pub fn category(&self) -> &[CodeableConcept] {
        &self.category
    }

    pub fn code(&self) -> &CodeableConcept {
        &self.code
    }

    pub fn subject(&self) -> Option<&Reference> {
        self.subject.as_ref()
    }

    pub fn focus(&self) -> &[Reference] {
        &self.focus
    }

    pub fn encounter(&self) -> Option<&Reference> {
        self.encounter.as_ref()
    }

    /// `dateTime`, `Period` or `instant`.
    pub fn effective(&self) -> Option<&DataValue> {
        self.effective.as_ref()
    }

    pub fn issued(&self) -> Option<&Instant> {
        self.issued.as_ref()
    }

    pub fn performer(&self) -> &[Reference] {
        &self.performer
    }

    pub fn value(&self) -> Option<&DataValue> {
        self.value.as_ref()
    }

    pub fn data_absent_reason(&self) -> Option<&CodeableConcept> {
        self.data_absent_reason.as_ref()
    }

    pub fn interpretation(&self) -> &[CodeableConcept] {
        &self.interpretation
    }

    pub fn note(&self) -> &[Annotation] {
        &self.note
    }

    pub fn body_site(&self) -> Option<&CodeableConcept> {
        self.body_site.as_ref()
    }

    pub fn method(&self) -> Option<&CodeableConcept> {
        self.method.as_ref()
    }

    pub fn has_member(&self) -> &[Reference] {
        &self.has_member
    }

    pub fn derived_from(&self) -> &[Reference] {
        &self.derived_from
    }

    pub fn component(&self) -> &[ObservationComponent] {
        &self.component
    }
}

fingerprint_hash!(Observation);
domain_resource_capabilities!(Observation);

impl Schema for Observation {
    const TYPE_NAME: &'static str = "Observation";
    const KIND: NodeKind = NodeKind::Resource;
    const FIELDS: &'static [FieldDescriptor<Self>] = domain_resource_fields!(Observation;
        FieldDescriptor {
            info: FieldInfo::element("identifier").list(),
            get: |o| Slot::list(o.identifier.as_slice()),
        },
        FieldDescriptor {
            info: FieldInfo::element("basedOn").list().references(BASED_ON_TARGETS),
            get: |o| Slot::list(o.based_on.as_slice()),
        },
        FieldDescriptor {
            info: FieldInfo::element("status").required().bound(STATUS_BINDING),
            get: |o| Slot::node(Some(&o.status)),
        },
        FieldDescriptor {
            info: FieldInfo::element("category").list().bound(Binding::preferred(
                "http://hl7.org/fhir/ValueSet/observation-category",
            )),
            get: |o| Slot::list(o.category.as_slice()),
        },
        FieldDescriptor {
            info: FieldInfo::element("code").required().bound(CODE_BINDING),
            get: |o| Slot::node(Some(&o.code)),
        },
        FieldDescriptor {
            info: FieldInfo::element("subject").references(OBSERVATION_SUBJECT_TARGETS),
            get: |o| Slot::node(o.subject.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("focus").list(),
            get: |o| Slot::list(o.focus.as_slice()),
        },
        FieldDescriptor {
            info: FieldInfo::element("encounter").references(ENCOUNTER_TARGETS),
            get: |o| Slot::node(o.encounter.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::choice("effective", OBSERVATION_EFFECTIVE_TYPES),
            get: |o| Slot::choice(o.effective.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("issued"),
            get: |o| Slot::node(o.issued.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("performer").list().references(PERFORMER_TARGETS),
            get: |o| Slot::list(o.performer.as_slice()),
        },
        FieldDescriptor {
            info: FieldInfo::choice("value", OBSERVATION_VALUE_TYPES),
            get: |o| Slot::choice(o.value.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("dataAbsentReason").bound(DATA_ABSENT_BINDING),
            get: |o| Slot::node(o.data_absent_reason.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("interpretation").list().bound(INTERPRETATION_BINDING),
            get: |o| Slot::list(o.interpretation.as_slice()),
        },
        FieldDescriptor {
            info: FieldInfo::element("note").list(),
            get: |o| Slot::list(o.note.as_slice()),
        },
        FieldDescriptor {
            info: FieldInfo::element("bodySite"),
            get: |o| Slot::node(o.body_site.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("method"),
            get: |o| Slot::node(o.method.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("hasMember").list().references(HAS_MEMBER_TARGETS),
            get: |o| Slot::list(o.has_member.as_slice()),
        },
        FieldDescriptor {
            info: FieldInfo::element("derivedFrom").list().references(DERIVED_FROM_TARGETS),
            get: |o| Slot::list(o.derived_from.as_slice()),
        },
        FieldDescriptor {
            info: FieldInfo::element("component").list(),
            get: |o| Slot::list(o.component.as_slice()),
        },
    );
}

impl Buildable for Observation {
    type Builder = ObservationBuilder;
}

#[derive(Debug, Clone, Default)]
pub struct ObservationBuilder {
    base: DomainResourceStaging,
    identifier: Vec<Option<Identifier>>,
    based_on: Vec<Option<Reference>>,
    status: Option<Code>,
    category: Vec<Option<CodeableConcept>>,
    code: Option<CodeableConcept>,
    subject: Option<Reference>,
    focus: Vec<Option<Reference>>,
    encounter: Option<Reference>,
    effective: Option<DataValue>,
    issued: Option<Instant>,
    performer: Vec<Option<Reference>>,
    value: Option<DataValue>,
    data_absent_reason: Option<CodeableConcept>,
    interpretation: Vec<Option<CodeableConcept>>,
    note: Vec<Option<Annotation>>,
    body_site: Option<CodeableConcept>,
    method: Option<CodeableConcept>,
    has_member: Vec<Option<Reference>>,
    derived_from: Vec<Option<Reference>>,
    component: Vec<Option<ObservationComponent>>,
}

domain_resource_builder!(ObservationBuilder);

/// Append and replace setters for a repeating field.
macro_rules! list_setters {
    ($field:ident, $set:ident, $ty:ty) => {
        pub fn $field<I, E>(mut self, $field: I) -> Self
        where
            I: IntoIterator<Item = E>,
            E: Into<Option<$ty>>,
        {
            append(&mut self.$field, $field);
            self
        }

        pub fn $set<I, E>(mut self, $field: I) -> Self
        where
            I: IntoIterator<Item = E>,
            E: Into<Option<$ty>>,
        {
            replace(&mut self.$field, $field);
            self
        }
    };
}

impl ObservationBuilder {
    list_setters!(identifier, set_identifier, Identifier);
    list_setters!(based_on, set_based_on, Reference);
    list_setters!(category, set_category, CodeableConcept);
    list_setters!(focus, set_focus, Reference);
    list_setters!(performer, set_performer, Reference);
    list_setters!(interpretation, set_interpretation, CodeableConcept);
    list_setters!(note, set_note, Annotation);
    list_setters!(has_member, set_has_member, Reference);
    list_setters!(derived_from, set_derived_from, Reference);
    list_setters!(component, set_component, ObservationComponent);

    pub fn status(mut self, status: Code) -> Self {
        self.status = Some(status);
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

    pub fn encounter(mut self, encounter: Reference) -> Self {
        self.encounter = Some(encounter);
        self
    }

    pub fn effective(mut self, effective: impl Into<DataValue>) -> Self {
        self.effective = Some(effective.into());
        self
    }

    pub fn issued(mut self, issued: Instant) -> Self {
        self.issued = Some(issued);
        self
    }

    pub fn value(mut self, value: impl Into<DataValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn data_absent_reason(mut self, reason: CodeableConcept) -> Self {
        self.data_absent_reason = Some(reason);
        self
    }

    pub fn body_site(mut self, body_site: CodeableConcept) -> Self {
        self.body_site = Some(body_site);
        self
    }

    pub fn method(mut self, method: CodeableConcept) -> Self {
        self.method = Some(method);
        self
    }
}

impl Builder for ObservationBuilder {
    type Target = Observation;

    fn from_source(source: &Observation) -> Self {
        Self {
            base: DomainResourceStaging::from_base(&source.base),
            identifier: staged(&source.identifier),
            based_on: staged(&source.based_on),
            status: Some(source.status.clone()),
            category: staged(&source.category),
            code: Some(source.code.clone()),
            subject: source.subject.clone(),
            focus: staged(&source.focus),
            encounter: source.encounter.clone(),
            effective: source.effective.clone(),
            issued: source.issued.clone(),
            performer: staged(&source.performer),
            value: source.value.clone(),
            data_absent_reason: source.data_absent_reason.clone(),
            interpretation: staged(&source.interpretation),
            note: staged(&source.note),
            body_site: source.body_site.clone(),
            method: source.method.clone(),
            has_member: staged(&source.has_member),
            derived_from: staged(&source.derived_from),
            component: staged(&source.component),
        }
    }

    fn build_with(self, config: &ModelConfig) -> Result<Observation> {
        let v = Validation::new(config, Observation::TYPE_NAME);
        let base = self.base.build(&v)?;
        let identifier = v.list(self.identifier, "identifier")?;
        let based_on = v.list(self.based_on, "basedOn")?;
        let status = v.require(self.status, "status")?;
        let category = v.list(self.category, "category")?;
        let code = v.require(self.code, "code")?;
        let focus = v.list(self.focus, "focus")?;
        v.choice(self.effective.as_ref(), "effective", OBSERVATION_EFFECTIVE_TYPES)?;
        let performer = v.list(self.performer, "performer")?;
        v.choice(self.value.as_ref(), "value", OBSERVATION_VALUE_TYPES)?;
        let interpretation = v.list(self.interpretation, "interpretation")?;
        let note = v.list(self.note, "note")?;
        let has_member = v.list(self.has_member, "hasMember")?;
        let derived_from = v.list(self.derived_from, "derivedFrom")?;
        let component = v.list(self.component, "component")?;

        v.references(&based_on, "basedOn", BASED_ON_TARGETS)?;
        v.reference(self.subject.as_ref(), "subject", OBSERVATION_SUBJECT_TARGETS)?;
        v.reference(self.encounter.as_ref(), "encounter", ENCOUNTER_TARGETS)?;
        v.references(&performer, "performer", PERFORMER_TARGETS)?;
        v.references(&has_member, "hasMember", HAS_MEMBER_TARGETS)?;
        v.references(&derived_from, "derivedFrom", DERIVED_FROM_TARGETS)?;

        v.constraint(
            "obs-6",
            self.data_absent_reason.is_none() || self.value.is_none(),
            "dataAbsentReason",
            "dataAbsentReason SHALL only be present if Observation.value[x] is not present",
        )?;
        v.constraint(
            "obs-7",
            self.value.is_none() || component.iter().all(|c| c.code != code),
            "value",
            "If Observation.code is the same as an Observation.component.code then the value element associated with the code SHALL NOT be present",
        )?;

        let fingerprint = fingerprint(&(
            (&base, &identifier, &based_on, &status, &category, &code),
            (&self.subject, &focus, &self.encounter, &self.effective, &self.issued),
            (&performer, &self.value, &self.data_absent_reason, &interpretation, &note),
            (&self.body_site, &self.method, &has_member, &derived_from, &component),
        ));
        v.finish(Observation {
            fingerprint,
            base,
            identifier,
            based_on,
            status,
            category,
            code,
            subject: self.subject,
            focus,
            encounter: self.encounter,
            effective: self.effective,
            issued: self.issued,
            performer,
            value: self.value,
            data_absent_reason: self.data_absent_reason,
            interpretation,
            note,
            body_site: self.body_site,
            method: self.method,
            has_member,
            derived_from,
            component,
        })
    }
}

/// One of several results reported together in a single observation,
/// e.g. the systolic and diastolic parts of a blood pressure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationComponent {
    fingerprint: u64,
    backbone: BackboneElementBase,
    code: CodeableConcept,
    value: Option<DataValue>,
    data_absent_reason: Option<CodeableConcept>,
    interpretation: Vec<CodeableConcept>,
}

impl ObservationComponent {
    pub fn code(&self) -> &CodeableConcept {
        &self.code
    }

    pub fn value(&self) -> Option<&DataValue> {
        self.value.as_ref()
    }

    pub fn data_absent_reason(&self) -> Option<&CodeableConcept> {
        self.data_absent_reason.as_ref()
    }

    pub fn interpretation(&self) -> &[CodeableConcept] {
        &self.interpretation
    }
}

fingerprint_hash!(ObservationComponent);

impl HasId for ObservationComponent {
    fn id(&self) -> Option<&str> {
        self.backbone.element().id()
    }
}

impl HasExtensions for ObservationComponent {
    fn extension(&self) -> &[Extension] {
        self.backbone.element().extension()
    }
}

impl HasModifierExtensions for ObservationComponent {
    fn modifier_extension(&self) -> &[Extension] {
        self.backbone.modifier_extension()
    }
}

impl Schema for ObservationComponent {
    const TYPE_NAME: &'static str = "Observation.component";
    const KIND: NodeKind = NodeKind::Backbone;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor {
            info: FieldInfo::attribute("id"),
            get: |c| Slot::attribute(c.backbone.element().id()),
        },
        FieldDescriptor {
            info: FieldInfo::element("extension").list(),
            get: |c| Slot::list(c.backbone.element().extension()),
        },
        FieldDescriptor {
            info: FieldInfo::element("modifierExtension").list(),
            get: |c| Slot::list(c.backbone.modifier_extension()),
        },
        FieldDescriptor {
            info: FieldInfo::element("code").required().bound(CODE_BINDING),
            get: |c| Slot::node(Some(&c.code)),
        },
        FieldDescriptor {
            info: FieldInfo::choice("value", OBSERVATION_VALUE_TYPES),
            get: |c| Slot::choice(c.value.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("dataAbsentReason").bound(DATA_ABSENT_BINDING),
            get: |c| Slot::node(c.data_absent_reason.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("interpretation").list().bound(INTERPRETATION_BINDING),
            get: |c| Slot::list(c.interpretation.as_slice()),
        },
    ];
}

impl Buildable for ObservationComponent {
    type Builder = ObservationComponentBuilder;
}

#[derive(Debug, Clone, Default)]
pub struct ObservationComponentBuilder {
    backbone: BackboneElementStaging,
    code: Option<CodeableConcept>,
    value: Option<DataValue>,
    data_absent_reason: Option<CodeableConcept>,
    interpretation: Vec<Option<CodeableConcept>>,
}

backbone_builder!(ObservationComponentBuilder);

impl ObservationComponentBuilder {
    list_setters!(interpretation, set_interpretation, CodeableConcept);

    pub fn code(mut self, code: CodeableConcept) -> Self {
        self.code = Some(code);
        self
    }

    pub fn value(mut self, value: impl Into<DataValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn data_absent_reason(mut self, reason: CodeableConcept) -> Self {
        self.data_absent_reason = Some(reason);
        self
    }
}

impl Builder for ObservationComponentBuilder {
    type Target = ObservationComponent;

    fn from_source(source: &ObservationComponent) -> Self {
        Self {
            backbone: BackboneElementStaging::from_base(&source.backbone),
            code: Some(source.code.clone()),
            value: source.value.clone(),
            data_absent_reason: source.data_absent_reason.clone(),
            interpretation: staged(&source.interpretation),
        }
    }

    fn build_with(self, config: &ModelConfig) -> Result<ObservationComponent> {
        let v = Validation::new(config, ObservationComponent::TYPE_NAME);
        let backbone = self.backbone.build(&v)?;
        let code = v.require(self.code, "code")?;
        v.choice(self.value.as_ref(), "value", OBSERVATION_VALUE_TYPES)?;
        let interpretation = v.list(self.interpretation, "interpretation")?;
        let fingerprint = fingerprint(&(
            &backbone,
            &code,
            &self.value,
            &self.data_absent_reason,
            &interpretation,
        ));
        v.finish(ObservationComponent {
            fingerprint,
            backbone,
            code,
            value: self.value,
            data_absent_reason: self.data_absent_reason,
            interpretation,
        })
    }
}
