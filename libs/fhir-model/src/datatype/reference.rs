use crate::builder::{element_builder, Buildable, Builder};
use crate::config::ModelConfig;
use crate::datatype::{FhirString, Identifier, Uri};
use crate::element::{element_capabilities, fingerprint, fingerprint_hash, ElementBase, ElementStaging};
use crate::error::Result;
use crate::validation::{self, Validation};
use crate::visitor::{FieldDescriptor, FieldInfo, NodeKind, Schema, Slot};

/// A pointer from one resource to another.
///
/// A reference may carry a literal `reference` (`Patient/123`, `#p1`, an
/// absolute URL), an explicit target `type`, a logical `identifier`, or just
/// a `display` text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    fingerprint: u64,
    element: ElementBase,
    reference: Option<FhirString>,
    type_: Option<Uri>,
    identifier: Option<Box<Identifier>>,
    display: Option<FhirString>,
}

impl Reference {
    /// Shorthand for a reference holding only a literal.
    pub fn to(literal: impl Into<String>) -> Result<Self> {
        Self::builder()
            .reference(FhirString::of(literal.into())?)
            .build()
    }

    pub fn reference(&self) -> Option<&FhirString> {
        self.reference.as_ref()
    }

    pub fn type_(&self) -> Option<&Uri> {
        self.type_.as_ref()
    }

    pub fn identifier(&self) -> Option<&Identifier> {
        self.identifier.as_deref()
    }

    pub fn display(&self) -> Option<&FhirString> {
        self.display.as_ref()
    }

    /// Resource type this reference points at, when it can be told statically.
    pub fn target_type(&self) -> Option<&str> {
        validation::reference_target_type(self)
    }

    /// Whether the literal points into the enclosing resource's `contained`.
    pub fn is_local(&self) -> bool {
        self.reference
            .as_ref()
            .and_then(|r| r.as_str())
            .is_some_and(|r| r.starts_with('#'))
    }
}

fingerprint_hash!(Reference);
element_capabilities!(Reference);

impl Schema for Reference {
    const TYPE_NAME: &'static str = "Reference";
    const KIND: NodeKind = NodeKind::Datatype;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor {
            info: FieldInfo::attribute("id"),
            get: |r| Slot::attribute(r.element.id()),
        },
        FieldDescriptor {
            info: FieldInfo::element("extension").list(),
            get: |r| Slot::list(r.element.extension()),
        },
        FieldDescriptor {
            info: FieldInfo::element("reference"),
            get: |r| Slot::node(r.reference.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("type"),
            get: |r| Slot::node(r.type_.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("identifier"),
            get: |r| Slot::node(r.identifier.as_deref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("display"),
            get: |r| Slot::node(r.display.as_ref()),
        },
    ];
}

impl Buildable for Reference {
    type Builder = ReferenceBuilder;
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceBuilder {
    element: ElementStaging,
    reference: Option<FhirString>,
    type_: Option<Uri>,
    identifier: Option<Box<Identifier>>,
    display: Option<FhirString>,
}

element_builder!(ReferenceBuilder);

impl ReferenceBuilder {
    pub fn reference(mut self, reference: FhirString) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn type_(mut self, type_: Uri) -> Self {
        self.type_ = Some(type_);
        self
    }

    pub fn identifier(mut self, identifier: Identifier) -> Self {
        self.identifier = Some(Box::new(identifier));
        self
    }

    pub fn display(mut self, display: FhirString) -> Self {
        self.display = Some(display);
        self
    }
}

impl Builder for ReferenceBuilder {
    type Target = Reference;

    fn from_source(source: &Reference) -> Self {
        Self {
            element: ElementStaging::from_base(&source.element),
            reference: source.reference.clone(),
            type_: source.type_.clone(),
            identifier: source.identifier.clone(),
            display: source.display.clone(),
        }
    }

    fn build_with(self, config: &ModelConfig) -> Result<Reference> {
        let v = Validation::new(config, Reference::TYPE_NAME);
        let element = self.element.build(&v)?;
        let fingerprint = fingerprint(&(
            &element,
            &self.reference,
            &self.type_,
            &self.identifier,
            &self.display,
        ));
        v.finish(Reference {
            fingerprint,
            element,
            reference: self.reference,
            type_: self.type_,
            identifier: self.identifier,
            display: self.display,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_type_prefers_explicit_type() {
        let r = Reference::builder()
            .reference(FhirString::of("Patient/1").unwrap())
            .type_(Uri::of("Patient").unwrap())
            .build()
            .unwrap();
        assert_eq!(r.target_type(), Some("Patient"));

        let literal_only = Reference::to("Group/g1").unwrap();
        assert_eq!(literal_only.target_type(), Some("Group"));
    }

    #[test]
    fn test_local_and_absolute_have_no_static_type() {
        let local = Reference::to("#p1").unwrap();
        assert!(local.is_local());
        assert_eq!(local.target_type(), None);

        let absolute = Reference::to("http://example.org/fhir/Patient/1").unwrap();
        assert!(!absolute.is_local());
        assert_eq!(absolute.target_type(), None);
    }

    #[test]
    fn test_display_only_reference_builds() {
        let r = Reference::builder()
            .display(FhirString::of("Dr. Who").unwrap())
            .build()
            .unwrap();
        assert!(r.reference().is_none());
        assert_eq!(r.target_type(), None);
    }
}
