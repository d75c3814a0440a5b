use crate::builder::{element_builder, Buildable, Builder};
use crate::config::ModelConfig;
use crate::datatype::DateTime;
use crate::element::{element_capabilities, fingerprint, fingerprint_hash, ElementBase, ElementStaging};
use crate::error::Result;
use crate::validation::Validation;
use crate::visitor::{FieldDescriptor, FieldInfo, NodeKind, Schema, Slot};

/// A time range, open on either end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    fingerprint: u64,
    element: ElementBase,
    start: Option<DateTime>,
    end: Option<DateTime>,
}

impl Period {
    pub fn start(&self) -> Option<&DateTime> {
        self.start.as_ref()
    }

    pub fn end(&self) -> Option<&DateTime> {
        self.end.as_ref()
    }
}

fingerprint_hash!(Period);
element_capabilities!(Period);

impl Schema for Period {
    const TYPE_NAME: &'static str = "Period";
    const KIND: NodeKind = NodeKind::Datatype;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor {
            info: FieldInfo::attribute("id"),
            get: |p| Slot::attribute(p.element.id()),
        },
        FieldDescriptor {
            info: FieldInfo::element("extension").list(),
            get: |p| Slot::list(p.element.extension()),
        },
        FieldDescriptor {
            info: FieldInfo::element("start"),
            get: |p| Slot::node(p.start.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("end"),
            get: |p| Slot::node(p.end.as_ref()),
        },
    ];
}

impl Buildable for Period {
    type Builder = PeriodBuilder;
}

#[derive(Debug, Clone, Default)]
pub struct PeriodBuilder {
    element: ElementStaging,
    start: Option<DateTime>,
    end: Option<DateTime>,
}

element_builder!(PeriodBuilder);

impl PeriodBuilder {
    pub fn start(mut self, start: DateTime) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: DateTime) -> Self {
        self.end = Some(end);
        self
    }
}

impl Builder for PeriodBuilder {
    type Target = Period;

    fn from_source(source: &Period) -> Self {
        Self {
            element: ElementStaging::from_base(&source.element),
            start: source.start.clone(),
            end: source.end.clone(),
        }
    }

    fn build_with(self, config: &ModelConfig) -> Result<Period> {
        let v = Validation::new(config, Period::TYPE_NAME);
        let element = self.element.build(&v)?;
        let fingerprint = fingerprint(&(&element, &self.start, &self.end));
        v.finish(Period {
            fingerprint,
            element,
            start: self.start,
            end: self.end,
        })
    }
}
