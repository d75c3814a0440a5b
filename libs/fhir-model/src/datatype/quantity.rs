use crate::binding::Binding;
use crate::builder::{element_builder, Buildable, Builder};
use crate::config::ModelConfig;
use crate::datatype::{Code, FhirDecimal, FhirString, Uri};
use crate::element::{element_capabilities, fingerprint, fingerprint_hash, ElementBase, ElementStaging};
use crate::error::Result;
use crate::validation::Validation;
use crate::visitor::{FieldDescriptor, FieldInfo, NodeKind, Schema, Slot};
use rust_decimal::Decimal;

/// A measured amount, optionally coded in a unit system such as UCUM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantity {
    fingerprint: u64,
    element: ElementBase,
    value: Option<FhirDecimal>,
    comparator: Option<Code>,
    unit: Option<FhirString>,
    system: Option<Uri>,
    code: Option<Code>,
}

impl Quantity {
    pub fn value(&self) -> Option<&FhirDecimal> {
        self.value.as_ref()
    }

    /// The raw decimal, skipping the element wrapper.
    pub fn decimal(&self) -> Option<Decimal> {
        self.value.as_ref().and_then(|v| v.value().copied())
    }

    pub fn comparator(&self) -> Option<&Code> {
        self.comparator.as_ref()
    }

    pub fn unit(&self) -> Option<&FhirString> {
        self.unit.as_ref()
    }

    pub fn system(&self) -> Option<&Uri> {
        self.system.as_ref()
    }

    pub fn code(&self) -> Option<&Code> {
        self.code.as_ref()
    }
}

fingerprint_hash!(Quantity);
element_capabilities!(Quantity);

impl Schema for Quantity {
    const TYPE_NAME: &'static str = "Quantity";
    const KIND: NodeKind = NodeKind::Datatype;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor {
            info: FieldInfo::attribute("id"),
            get: |q| Slot::attribute(q.element.id()),
        },
        FieldDescriptor {
            info: FieldInfo::element("extension").list(),
            get: |q| Slot::list(q.element.extension()),
        },
        FieldDescriptor {
            info: FieldInfo::element("value"),
            get: |q| Slot::node(q.value.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("comparator").bound(Binding::required(
                "http://hl7.org/fhir/ValueSet/quantity-comparator",
            )),
            get: |q| Slot::node(q.comparator.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("unit"),
            get: |q| Slot::node(q.unit.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("system"),
            get: |q| Slot::node(q.system.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("code"),
            get: |q| Slot::node(q.code.as_ref()),
        },
    ];
}

impl Buildable for Quantity {
    type Builder = QuantityBuilder;
}

#[derive(Debug, Clone, Default)]
pub struct QuantityBuilder {
    element: ElementStaging,
    value: Option<FhirDecimal>,
    comparator: Option<Code>,
    unit: Option<FhirString>,
    system: Option<Uri>,
    code: Option<Code>,
}

element_builder!(QuantityBuilder);

impl QuantityBuilder {
    pub fn value(mut self, value: FhirDecimal) -> Self {
        self.value = Some(value);
        self
    }

    pub fn comparator(mut self, comparator: Code) -> Self {
        self.comparator = Some(comparator);
        self
    }

    pub fn unit(mut self, unit: FhirString) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn system(mut self, system: Uri) -> Self {
        self.system = Some(system);
        self
    }

    pub fn code(mut self, code: Code) -> Self {
        self.code = Some(code);
        self
    }
}

impl Builder for QuantityBuilder {
    type Target = Quantity;

    fn from_source(source: &Quantity) -> Self {
        Self {
            element: ElementStaging::from_base(&source.element),
            value: source.value.clone(),
            comparator: source.comparator.clone(),
            unit: source.unit.clone(),
            system: source.system.clone(),
            code: source.code.clone(),
        }
    }

    fn build_with(self, config: &ModelConfig) -> Result<Quantity> {
        let v = Validation::new(config, Quantity::TYPE_NAME);
        let element = self.element.build(&v)?;
        v.constraint(
            "qty-3",
            self.code.is_none() || self.system.is_some(),
            "system",
            "If a code for the unit is present, the system SHALL also be present",
        )?;
        let fingerprint = fingerprint(&(
            &element,
            &self.value,
            &self.comparator,
            &self.unit,
            &self.system,
            &self.code,
        ));
        v.finish(Quantity {
            fingerprint,
            element,
            value: self.value,
            comparator: self.comparator,
            unit: self.unit,
            system: self.system,
            code: self.code,
        })
    }
}
