use crate::builder::{element_builder, Buildable, Builder};
use crate::config::ModelConfig;
use crate::datatype::{DataType, DataValue, DateTime, Markdown};
use crate::element::{element_capabilities, fingerprint, fingerprint_hash, ElementBase, ElementStaging};
use crate::error::Result;
use crate::validation::Validation;
use crate::visitor::{FieldDescriptor, FieldInfo, NodeKind, Schema, Slot};

const AUTHOR_TYPES: &[DataType] = &[DataType::Reference, DataType::String];

pub const ANNOTATION_AUTHOR_TARGETS: &[&str] =
    &["Practitioner", "Patient", "RelatedPerson", "Organization"];

/// A text note with optional author and time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    fingerprint: u64,
    element: ElementBase,
    author: Option<DataValue>,
    time: Option<DateTime>,
    text: Markdown,
}

impl Annotation {
    /// `Reference` or `string`.
    pub fn author(&self) -> Option<&DataValue> {
        self.author.as_ref()
    }

    pub fn time(&self) -> Option<&DateTime> {
        self.time.as_ref()
    }

    pub fn text(&self) -> &Markdown {
        &self.text
    }
}

fingerprint_hash!(Annotation);
element_capabilities!(Annotation);

impl Schema for Annotation {
    const TYPE_NAME: &'static str = "Annotation";
    const KIND: NodeKind = NodeKind::Datatype;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor {
            info: FieldInfo::attribute("id"),
            get: |a| Slot::attribute(a.element.id()),
        },
        FieldDescriptor {
            info: FieldInfo::element("extension").list(),
            get: |a| Slot::list(a.element.extension()),
        },
        FieldDescriptor {
            info: FieldInfo::choice("author", AUTHOR_TYPES).references(ANNOTATION_AUTHOR_TARGETS),
            get: |a| Slot::choice(a.author.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("time"),
            get: |a| Slot::node(a.time.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("text").required(),
            get: |a| Slot::node(Some(&a.text)),
        },
    ];
}

impl Buildable for Annotation {
    type Builder = AnnotationBuilder;
}

#[derive(Debug, Clone, Default)]
pub struct AnnotationBuilder {
    element: ElementStaging,
    author: Option<DataValue>,
    time: Option<DateTime>,
    text: Option<Markdown>,
}

element_builder!(AnnotationBuilder);

impl AnnotationBuilder {
    pub fn author(mut self, author: impl Into<DataValue>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    pub fn text(mut self, text: Markdown) -> Self {
        self.text = Some(text);
        self
    }
}

impl Builder for AnnotationBuilder {
    type Target = Annotation;

    fn from_source(source: &Annotation) -> Self {
        Self {
            element: ElementStaging::from_base(&source.element),
            author: source.author.clone(),
            time: source.time.clone(),
            text: Some(source.text.clone()),
        }
    }

    fn build_with(self, config: &ModelConfig) -> Result<Annotation> {
        let v = Validation::new(config, Annotation::TYPE_NAME);
        let element = self.element.build(&v)?;
        v.choice(self.author.as_ref(), "author", AUTHOR_TYPES)?;
        v.choice_reference(self.author.as_ref(), "author", ANNOTATION_AUTHOR_TARGETS)?;
        let text = v.require(self.text, "text")?;
        let fingerprint = fingerprint(&(&element, &self.author, &self.time, &text));
        v.finish(Annotation {
            fingerprint,
            element,
            author: self.author,
            time: self.time,
            text,
        })
    }
}
