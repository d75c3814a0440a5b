use crate::binding::Binding;
use crate::builder::{append, element_builder, replace, Buildable, Builder};
use crate::config::ModelConfig;
use crate::datatype::{Code, Coding, Instant, Reference};
use crate::element::{
    element_capabilities, fingerprint, fingerprint_hash, staged, ElementBase, ElementStaging,
};
use crate::error::Result;
use crate::validation::Validation;
use crate::visitor::{FieldDescriptor, FieldInfo, NodeKind, Schema, Slot};

pub const SIGNATURE_PARTY_TARGETS: &[&str] = &[
    "Practitioner",
    "PractitionerRole",
    "RelatedPerson",
    "Patient",
    "Device",
    "Organization",
];

const MIME_TYPES: &str = "http://hl7.org/fhir/ValueSet/mimetypes";

/// An electronic representation of a signature and its context.
///
/// The signature payload itself (`data`) is not modelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    fingerprint: u64,
    element: ElementBase,
    type_: Vec<Coding>,
    when: Instant,
    who: Reference,
    on_behalf_of: Option<Reference>,
    target_format: Option<Code>,
    sig_format: Option<Code>,
}

impl Signature {
    /// Why the signature was applied; never empty.
    pub fn type_(&self) -> &[Coding] {
        &self.type_
    }

    pub fn when(&self) -> &Instant {
        &self.when
    }

    pub fn who(&self) -> &Reference {
        &self.who
    }

    pub fn on_behalf_of(&self) -> Option<&Reference> {
        self.on_behalf_of.as_ref()
    }

    pub fn target_format(&self) -> Option<&Code> {
        self.target_format.as_ref()
    }

    pub fn sig_format(&self) -> Option<&Code> {
        self.sig_format.as_ref()
    }
}

fingerprint_hash!(Signature);
element_capabilities!(Signature);

impl Schema for Signature {
    const TYPE_NAME: &'static str = "Signature";
    const KIND: NodeKind = NodeKind::Datatype;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor {
            info: FieldInfo::attribute("id"),
            get: |s| Slot::attribute(s.element.id()),
        },
        FieldDescriptor {
            info: FieldInfo::element("extension").list(),
            get: |s| Slot::list(s.element.extension()),
        },
        FieldDescriptor {
            info: FieldInfo::element("type")
                .required()
                .list()
                .bound(Binding::preferred("http://hl7.org/fhir/ValueSet/signature-type")),
            get: |s| Slot::list(s.type_.as_slice()),
        },
        FieldDescriptor {
            info: FieldInfo::element("when").required(),
            get: |s| Slot::node(Some(&s.when)),
        },
        FieldDescriptor {
            info: FieldInfo::element("who")
                .required()
                .references(SIGNATURE_PARTY_TARGETS),
            get: |s| Slot::node(Some(&s.who)),
        },
        FieldDescriptor {
            info: FieldInfo::element("onBehalfOf").references(SIGNATURE_PARTY_TARGETS),
            get: |s| Slot::node(s.on_behalf_of.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("targetFormat").bound(Binding::required(MIME_TYPES)),
            get: |s| Slot::node(s.target_format.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("sigFormat").bound(Binding::required(MIME_TYPES)),
            get: |s| Slot::node(s.sig_format.as_ref()),
        },
    ];
}

impl Buildable for Signature {
    type Builder = SignatureBuilder;
}

#[derive(Debug, Clone, Default)]
pub struct SignatureBuilder {
    element: ElementStaging,
    type_: Vec<Option<Coding>>,
    when: Option<Instant>,
    who: Option<Reference>,
    on_behalf_of: Option<Reference>,
    target_format: Option<Code>,
    sig_format: Option<Code>,
}

element_builder!(SignatureBuilder);

impl SignatureBuilder {
    pub fn type_<I, E>(mut self, type_: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Option<Coding>>,
    {
        append(&mut self.type_, type_);
        self
    }

    pub fn set_type<I, E>(mut self, type_: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Option<Coding>>,
    {
        replace(&mut self.type_, type_);
        self
    }

    pub fn when(mut self, when: Instant) -> Self {
        self.when = Some(when);
        self
    }

    pub fn who(mut self, who: Reference) -> Self {
        self.who = Some(who);
        self
    }

    pub fn on_behalf_of(mut self, on_behalf_of: Reference) -> Self {
        self.on_behalf_of = Some(on_behalf_of);
        self
    }

    pub fn target_format(mut self, target_format: Code) -> Self {
        self.target_format = Some(target_format);
        self
    }

    pub fn sig_format(mut self, sig_format: Code) -> Self {
        self.sig_format = Some(sig_format);
        self
    }
}

impl Builder for SignatureBuilder {
    type Target = Signature;

    fn from_source(source: &Signature) -> Self {
        Self {
            element: ElementStaging::from_base(&source.element),
            type_: staged(&source.type_),
            when: Some(source.when.clone()),
            who: Some(source.who.clone()),
            on_behalf_of: source.on_behalf_of.clone(),
            target_format: source.target_format.clone(),
            sig_format: source.sig_format.clone(),
        }
    }

    fn build_with(self, config: &ModelConfig) -> Result<Signature> {
        let v = Validation::new(config, Signature::TYPE_NAME);
        let element = self.element.build(&v)?;
        let type_ = v.non_empty_list(self.type_, "type")?;
        let when = v.require(self.when, "when")?;
        let who = v.require(self.who, "who")?;
        v.reference(Some(&who), "who", SIGNATURE_PARTY_TARGETS)?;
        v.reference(self.on_behalf_of.as_ref(), "onBehalfOf", SIGNATURE_PARTY_TARGETS)?;
        let fingerprint = fingerprint(&(
            &element,
            &type_,
            &when,
            &who,
            &self.on_behalf_of,
            &self.target_format,
            &self.sig_format,
        ));
        v.finish(Signature {
            fingerprint,
            element,
            type_,
            when,
            who,
            on_behalf_of: self.on_behalf_of,
            target_format: self.target_format,
            sig_format: self.sig_format,
        })
    }
}
