use crate::binding::Binding;
use crate::builder::{element_builder, Buildable, Builder};
use crate::config::ModelConfig;
use crate::datatype::{Coding, DataType, DataValue};
use crate::element::{element_capabilities, fingerprint, fingerprint_hash, ElementBase, ElementStaging};
use crate::error::Result;
use crate::validation::Validation;
use crate::visitor::{FieldDescriptor, FieldInfo, NodeKind, Schema, Slot};

const VALUE_TYPES: &[DataType] = &[
    DataType::CodeableConcept,
    DataType::Quantity,
    DataType::Reference,
];

pub const USAGE_CONTEXT_VALUE_TARGETS: &[&str] = &[
    "PlanDefinition",
    "ResearchStudy",
    "InsurancePlan",
    "HealthcareService",
    "Group",
    "Location",
    "Organization",
];

/// The setting a piece of content is intended for, as a coded aspect plus its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageContext {
    fingerprint: u64,
    element: ElementBase,
    code: Coding,
    value: DataValue,
}

impl UsageContext {
    pub fn code(&self) -> &Coding {
        &self.code
    }

    pub fn value(&self) -> &DataValue {
        &self.value
    }
}

fingerprint_hash!(UsageContext);
element_capabilities!(UsageContext);

impl Schema for UsageContext {
    const TYPE_NAME: &'static str = "UsageContext";
    const KIND: NodeKind = NodeKind::Datatype;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor {
            info: FieldInfo::attribute("id"),
            get: |u| Slot::attribute(u.element.id()),
        },
        FieldDescriptor {
            info: FieldInfo::element("extension").list(),
            get: |u| Slot::list(u.element.extension()),
        },
        FieldDescriptor {
            info: FieldInfo::element("code")
                .required()
                .bound(Binding::extensible("http://hl7.org/fhir/ValueSet/usage-context-type")),
            get: |u| Slot::node(Some(&u.code)),
        },
        FieldDescriptor {
            info: FieldInfo::choice("value", VALUE_TYPES)
                .required()
                .references(USAGE_CONTEXT_VALUE_TARGETS),
            get: |u| Slot::choice(Some(&u.value)),
        },
    ];
}

impl Buildable for UsageContext {
    type Builder = UsageContextBuilder;
}

#[derive(Debug, Clone, Default)]
pub struct UsageContextBuilder {
    element: ElementStaging,
    code: Option<Coding>,
    value: Option<DataValue>,
}

element_builder!(UsageContextBuilder);

impl UsageContextBuilder {
    pub fn code(mut self, code: Coding) -> Self {
        self.code = Some(code);
        self
    }

    pub fn value(mut self, value: impl Into<DataValue>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl Builder for UsageContextBuilder {
    type Target = UsageContext;

    fn from_source(source: &UsageContext) -> Self {
        Self {
            element: ElementStaging::from_base(&source.element),
            code: Some(source.code.clone()),
            value: Some(source.value.clone()),
        }
    }

    fn build_with(self, config: &ModelConfig) -> Result<UsageContext> {
        let v = Validation::new(config, UsageContext::TYPE_NAME);
        let element = self.element.build(&v)?;
        let code = v.require(self.code, "code")?;
        let value = v.require_choice(self.value, "value", VALUE_TYPES)?;
        v.choice_reference(Some(&value), "value", USAGE_CONTEXT_VALUE_TARGETS)?;
        let fingerprint = fingerprint(&(&element, &code, &value));
        v.finish(UsageContext {
            fingerprint,
            element,
            code,
            value,
        })
    }
}
