use crate::binding::Binding;
use crate::builder::{append, element_builder, replace, Buildable, Builder};
use crate::config::ModelConfig;
use crate::datatype::{Code, Coding, Id, Instant, Uri, Xhtml};
use crate::element::{
    element_capabilities, fingerprint, fingerprint_hash, staged, ElementBase, ElementStaging,
};
use crate::error::Result;
use crate::validation::Validation;
use crate::visitor::{FieldDescriptor, FieldInfo, NodeKind, Schema, Slot};

/// Resource metadata maintained by the infrastructure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meta {
    fingerprint: u64,
    element: ElementBase,
    version_id: Option<Id>,
    last_updated: Option<Instant>,
    source: Option<Uri>,
    profile: Vec<Uri>,
    security: Vec<Coding>,
    tag: Vec<Coding>,
}

impl Meta {
    pub fn version_id(&self) -> Option<&Id> {
        self.version_id.as_ref()
    }

    pub fn last_updated(&self) -> Option<&Instant> {
        self.last_updated.as_ref()
    }

    pub fn source(&self) -> Option<&Uri> {
        self.source.as_ref()
    }

    pub fn profile(&self) -> &[Uri] {
        &self.profile
    }

    pub fn security(&self) -> &[Coding] {
        &self.security
    }

    pub fn tag(&self) -> &[Coding] {
        &self.tag
    }
}

fingerprint_hash!(Meta);
element_capabilities!(Meta);

impl Schema for Meta {
    const TYPE_NAME: &'static str = "Meta";
    const KIND: NodeKind = NodeKind::Datatype;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor {
            info: FieldInfo::attribute("id"),
            get: |m| Slot::attribute(m.element.id()),
        },
        FieldDescriptor {
            info: FieldInfo::element("extension").list(),
            get: |m| Slot::list(m.element.extension()),
        },
        FieldDescriptor {
            info: FieldInfo::element("versionId"),
            get: |m| Slot::node(m.version_id.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("lastUpdated"),
            get: |m| Slot::node(m.last_updated.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("source"),
            get: |m| Slot::node(m.source.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("profile").list(),
            get: |m| Slot::list(m.profile.as_slice()),
        },
        FieldDescriptor {
            info: FieldInfo::element("security").list().bound(Binding::extensible(
                "http://hl7.org/fhir/ValueSet/security-labels",
            )),
            get: |m| Slot::list(m.security.as_slice()),
        },
        FieldDescriptor {
            info: FieldInfo::element("tag")
                .list()
                .bound(Binding::example("http://hl7.org/fhir/ValueSet/common-tags")),
            get: |m| Slot::list(m.tag.as_slice()),
        },
    ];
}

impl Buildable for Meta {
    type Builder = MetaBuilder;
}

#[derive(Debug, Clone, Default)]
pub struct MetaBuilder {
    element: ElementStaging,
    version_id: Option<Id>,
    last_updated: Option<Instant>,
    source: Option<Uri>,
    profile: Vec<Option<Uri>>,
    security: Vec<Option<Coding>>,
    tag: Vec<Option<Coding>>,
}

element_builder!(MetaBuilder);

impl MetaBuilder {
    pub fn version_id(mut self, version_id: Id) -> Self {
        self.version_id = Some(version_id);
        self
    }

    pub fn last_updated(mut self, last_updated: Instant) -> Self {
        self.last_updated = Some(last_updated);
        self
    }

    pub fn source(mut self, source: Uri) -> Self {
        self.source = Some(source);
        self
    }

    pub fn profile<I, E>(mut self, profile: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Option<Uri>>,
    {
        append(&mut self.profile, profile);
        self
    }

    pub fn set_profile<I, E>(mut self, profile: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Option<Uri>>,
    {
        replace(&mut self.profile, profile);
        self
    }

    pub fn security<I, E>(mut self, security: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Option<Coding>>,
    {
        append(&mut self.security, security);
        self
    }

    pub fn set_security<I, E>(mut self, security: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Option<Coding>>,
    {
        replace(&mut self.security, security);
        self
    }

    pub fn tag<I, E>(mut self, tag: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Option<Coding>>,
    {
        append(&mut self.tag, tag);
        self
    }

    pub fn set_tag<I, E>(mut self, tag: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Option<Coding>>,
    {
        replace(&mut self.tag, tag);
        self
    }
}

impl Builder for MetaBuilder {
    type Target = Meta;

    fn from_source(source: &Meta) -> Self {
        Self {
            element: ElementStaging::from_base(&source.element),
            version_id: source.version_id.clone(),
            last_updated: source.last_updated.clone(),
            source: source.source.clone(),
            profile: staged(&source.profile),
            security: staged(&source.security),
            tag: staged(&source.tag),
        }
    }

    fn build_with(self, config: &ModelConfig) -> Result<Meta> {
        let v = Validation::new(config, Meta::TYPE_NAME);
        let element = self.element.build(&v)?;
        let profile = v.list(self.profile, "profile")?;
        let security = v.list(self.security, "security")?;
        let tag = v.list(self.tag, "tag")?;
        let fingerprint = fingerprint(&(
            &element,
            &self.version_id,
            &self.last_updated,
            &self.source,
            &profile,
            &security,
            &tag,
        ));
        v.finish(Meta {
            fingerprint,
            element,
            version_id: self.version_id,
            last_updated: self.last_updated,
            source: self.source,
            profile,
            security,
            tag,
        })
    }
}

/// Human-readable summary of a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narrative {
    fingerprint: u64,
    element: ElementBase,
    status: Code,
    div: Xhtml,
}

impl Narrative {
    pub fn status(&self) -> &Code {
        &self.status
    }

    pub fn div(&self) -> &Xhtml {
        &self.div
    }
}

fingerprint_hash!(Narrative);
element_capabilities!(Narrative);

impl Schema for Narrative {
    const TYPE_NAME: &'static str = "Narrative";
    const KIND: NodeKind = NodeKind::Datatype;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor {
            info: FieldInfo::attribute("id"),
            get: |n| Slot::attribute(n.element.id()),
        },
        FieldDescriptor {
            info: FieldInfo::element("extension").list(),
            get: |n| Slot::list(n.element.extension()),
        },
        FieldDescriptor {
            info: FieldInfo::element("status")
                .required()
                .bound(Binding::required("http://hl7.org/fhir/ValueSet/narrative-status")),
            get: |n| Slot::node(Some(&n.status)),
        },
        FieldDescriptor {
            info: FieldInfo::element("div").required(),
            get: |n| Slot::node(Some(&n.div)),
        },
    ];
}

impl Buildable for Narrative {
    type Builder = NarrativeBuilder;
}

#[derive(Debug, Clone, Default)]
pub struct NarrativeBuilder {
    element: ElementStaging,
    status: Option<Code>,
    div: Option<Xhtml>,
}

element_builder!(NarrativeBuilder);

impl NarrativeBuilder {
    pub fn status(mut self, status: Code) -> Self {
        self.status = Some(status);
        self
    }

    pub fn div(mut self, div: Xhtml) -> Self {
        self.div = Some(div);
        self
    }
}

impl Builder for NarrativeBuilder {
    type Target = Narrative;

    fn from_source(source: &Narrative) -> Self {
        Self {
            element: ElementStaging::from_base(&source.element),
            status: Some(source.status.clone()),
            div: Some(source.div.clone()),
        }
    }

    fn build_with(self, config: &ModelConfig) -> Result<Narrative> {
        let v = Validation::new(config, Narrative::TYPE_NAME);
        let element = self.element.build(&v)?;
        let status = v.require(self.status, "status")?;
        let div = v.require(self.div, "div")?;
        let fingerprint = fingerprint(&(&element, &status, &div));
        v.finish(Narrative {
            fingerprint,
            element,
            status,
            div,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn test_narrative_requires_status_then_div() {
        let err = Narrative::builder().build().unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingRequiredField {
                path: "Narrative.status".to_string()
            }
        );

        let err = Narrative::builder()
            .status(Code::of("generated").unwrap())
            .build()
            .unwrap_err();
        assert_eq!(err.field(), Some("div"));
    }

    #[test]
    fn test_div_must_be_xhtml_div() {
        assert!(Xhtml::of("<p>nope</p>").is_err());
        assert!(Xhtml::of("<div>a & b</div>").is_err());
        assert!(Xhtml::of("<div>x</div><script>alert(1)</script><div>y</div>").is_err());
        let narrative = Narrative::builder()
            .status(Code::of("generated").unwrap())
            .div(Xhtml::of("<div xmlns=\"http://www.w3.org/1999/xhtml\">ok</div>").unwrap())
            .build()
            .unwrap();
        assert_eq!(narrative.status().as_str(), Some("generated"));
    }

    #[test]
    fn test_meta_lists() {
        let meta = Meta::builder()
            .version_id(Id::of("3").unwrap())
            .profile([Uri::of("http://example.org/StructureDefinition/p").unwrap()])
            .build()
            .unwrap();
        assert_eq!(meta.profile().len(), 1);
        assert!(meta.tag().is_empty());
    }
}
