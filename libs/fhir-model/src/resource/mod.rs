//! Resources
//!
//! Resources are composed from [`ResourceBase`] (logical id, metadata) and,
//! for domain resources, [`DomainResourceBase`] (narrative, contained
//! resources, extensions). Builders finalize the bases first and then run the
//! concrete type's own checks.

mod flag;
mod observation;
mod patient;

pub use flag::{Flag, FlagBuilder, FLAG_AUTHOR_TARGETS, FLAG_SUBJECT_TARGETS};
pub use observation::{
    Observation, ObservationBuilder, ObservationComponent, ObservationComponentBuilder,
    OBSERVATION_EFFECTIVE_TYPES, OBSERVATION_SUBJECT_TARGETS, OBSERVATION_VALUE_TYPES,
};
pub use patient::{Patient, PatientBuilder};

use crate::binding::Binding;
use crate::datatype::{Code, Extension, Meta, Narrative, Uri};
use crate::element::{staged, HasId, HasModifierExtensions};
use crate::error::Result;
use crate::validation::{check_id, Validation};
use crate::visitor::{FieldInfo, NodeKind, PrimitiveValue, Slot, Visitable};
use std::any::Any;

/// Capabilities shared by every resource.
pub trait Resource: HasId + Visitable {
    fn meta(&self) -> Option<&Meta>;

    fn implicit_rules(&self) -> Option<&Uri>;

    fn language(&self) -> Option<&Code>;

    fn resource_type(&self) -> &'static str {
        self.type_name()
    }
}

/// Capabilities shared by resources with narrative, contained resources and extensions.
pub trait DomainResource: Resource + HasModifierExtensions {
    fn text(&self) -> Option<&Narrative>;

    fn contained(&self) -> &[AnyResource];

    /// A contained resource by local id (the part after `#` in a local reference).
    fn find_contained(&self, id: &str) -> Option<&AnyResource> {
        self.contained().iter().find(|r| r.id() == Some(id))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResourceBase {
    pub(crate) id: Option<String>,
    pub(crate) meta: Option<Meta>,
    pub(crate) implicit_rules: Option<Uri>,
    pub(crate) language: Option<Code>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DomainResourceBase {
    pub(crate) resource: ResourceBase,
    pub(crate) text: Option<Narrative>,
    pub(crate) contained: Vec<AnyResource>,
    pub(crate) extension: Vec<Extension>,
    pub(crate) modifier_extension: Vec<Extension>,
}

const LANGUAGE_BINDING: Binding = Binding::preferred("http://hl7.org/fhir/ValueSet/languages");

impl DomainResourceBase {
    /// Field rows shared by every domain resource, in declared order.
    pub(crate) const ID: FieldInfo = FieldInfo::attribute("id");
    pub(crate) const META: FieldInfo = FieldInfo::element("meta");
    pub(crate) const IMPLICIT_RULES: FieldInfo = FieldInfo::element("implicitRules");
    pub(crate) const LANGUAGE: FieldInfo = FieldInfo::element("language").bound(LANGUAGE_BINDING);
    pub(crate) const TEXT: FieldInfo = FieldInfo::element("text");
    pub(crate) const CONTAINED: FieldInfo = FieldInfo::resources("contained");
    pub(crate) const EXTENSION: FieldInfo = FieldInfo::element("extension").list();
    pub(crate) const MODIFIER_EXTENSION: FieldInfo =
        FieldInfo::element("modifierExtension").list();

    pub(crate) fn id_slot(&self) -> Slot<'_> {
        Slot::attribute(self.resource.id.as_deref())
    }

    pub(crate) fn meta_slot(&self) -> Slot<'_> {
        Slot::node(self.resource.meta.as_ref())
    }

    pub(crate) fn implicit_rules_slot(&self) -> Slot<'_> {
        Slot::node(self.resource.implicit_rules.as_ref())
    }

    pub(crate) fn language_slot(&self) -> Slot<'_> {
        Slot::node(self.resource.language.as_ref())
    }

    pub(crate) fn text_slot(&self) -> Slot<'_> {
        Slot::node(self.text.as_ref())
    }

    pub(crate) fn contained_slot(&self) -> Slot<'_> {
        Slot::nodes(self.contained.iter().map(AnyResource::as_visitable).collect())
    }

    pub(crate) fn extension_slot(&self) -> Slot<'_> {
        Slot::list(self.extension.as_slice())
    }

    pub(crate) fn modifier_extension_slot(&self) -> Slot<'_> {
        Slot::list(self.modifier_extension.as_slice())
    }
}

/// Mutable staging for [`ResourceBase`].
#[derive(Debug, Clone, Default)]
pub struct ResourceStaging {
    pub(crate) id: Option<String>,
    pub(crate) meta: Option<Meta>,
    pub(crate) implicit_rules: Option<Uri>,
    pub(crate) language: Option<Code>,
}

impl ResourceStaging {
    pub(crate) fn from_base(base: &ResourceBase) -> Self {
        Self {
            id: base.id.clone(),
            meta: base.meta.clone(),
            implicit_rules: base.implicit_rules.clone(),
            language: base.language.clone(),
        }
    }

    pub(crate) fn build(self, v: &Validation<'_>) -> Result<ResourceBase> {
        if let Some(id) = &self.id {
            v.lexical("id", |_| check_id(id))?;
        }
        Ok(ResourceBase {
            id: self.id,
            meta: self.meta,
            implicit_rules: self.implicit_rules,
            language: self.language,
        })
    }
}

/// Mutable staging for [`DomainResourceBase`].
#[derive(Debug, Clone, Default)]
pub struct DomainResourceStaging {
    pub(crate) resource: ResourceStaging,
    pub(crate) text: Option<Narrative>,
    pub(crate) contained: Vec<Option<AnyResource>>,
    pub(crate) extension: Vec<Option<Extension>>,
    pub(crate) modifier_extension: Vec<Option<Extension>>,
}

impl DomainResourceStaging {
    pub(crate) fn from_base(base: &DomainResourceBase) -> Self {
        Self {
            resource: ResourceStaging::from_base(&base.resource),
            text: base.text.clone(),
            contained: staged(&base.contained),
            extension: staged(&base.extension),
            modifier_extension: staged(&base.modifier_extension),
        }
    }

    pub(crate) fn build(self, v: &Validation<'_>) -> Result<DomainResourceBase> {
        let resource = self.resource.build(v)?;
        let contained = v.list(self.contained, "contained")?;
        v.contained(&contained, "contained")?;
        Ok(DomainResourceBase {
            resource,
            text: self.text,
            contained,
            extension: v.list(self.extension, "extension")?,
            modifier_extension: v.list(self.modifier_extension, "modifierExtension")?,
        })
    }
}

/// Implements the resource capability traits for a type with a
/// `base: DomainResourceBase` field.
macro_rules! domain_resource_capabilities {
    ($ty:ty) => {
        impl $crate::element::HasId for $ty {
            fn id(&self) -> Option<&str> {
                self.base.resource.id.as_deref()
            }
        }

        impl $crate::element::HasExtensions for $ty {
            fn extension(&self) -> &[$crate::datatype::Extension] {
                &self.base.extension
            }
        }

        impl $crate::element::HasModifierExtensions for $ty {
            fn modifier_extension(&self) -> &[$crate::datatype::Extension] {
                &self.base.modifier_extension
            }
        }

        impl $crate::resource::Resource for $ty {
            fn meta(&self) -> Option<&$crate::datatype::Meta> {
                self.base.resource.meta.as_ref()
            }

            fn implicit_rules(&self) -> Option<&$crate::datatype::Uri> {
                self.base.resource.implicit_rules.as_ref()
            }

            fn language(&self) -> Option<&$crate::datatype::Code> {
                self.base.resource.language.as_ref()
            }
        }

        impl $crate::resource::DomainResource for $ty {
            fn text(&self) -> Option<&$crate::datatype::Narrative> {
                self.base.text.as_ref()
            }

            fn contained(&self) -> &[$crate::resource::AnyResource] {
                &self.base.contained
            }
        }
    };
}

/// A field table starting with the eight rows every domain resource shares,
/// followed by the type's own rows.
macro_rules! domain_resource_fields {
    ($ty:ty; $($row:expr),* $(,)?) => {
        &[
            $crate::visitor::FieldDescriptor::<$ty> {
                info: $crate::resource::DomainResourceBase::ID,
                get: |r| r.base.id_slot(),
            },
            $crate::visitor::FieldDescriptor::<$ty> {
                info: $crate::resource::DomainResourceBase::META,
                get: |r| r.base.meta_slot(),
            },
            $crate::visitor::FieldDescriptor::<$ty> {
                info: $crate::resource::DomainResourceBase::IMPLICIT_RULES,
                get: |r| r.base.implicit_rules_slot(),
            },
            $crate::visitor::FieldDescriptor::<$ty> {
                info: $crate::resource::DomainResourceBase::LANGUAGE,
                get: |r| r.base.language_slot(),
            },
            $crate::visitor::FieldDescriptor::<$ty> {
                info: $crate::resource::DomainResourceBase::TEXT,
                get: |r| r.base.text_slot(),
            },
            $crate::visitor::FieldDescriptor::<$ty> {
                info: $crate::resource::DomainResourceBase::CONTAINED,
                get: |r| r.base.contained_slot(),
            },
            $crate::visitor::FieldDescriptor::<$ty> {
                info: $crate::resource::DomainResourceBase::EXTENSION,
                get: |r| r.base.extension_slot(),
            },
            $crate::visitor::FieldDescriptor::<$ty> {
                info: $crate::resource::DomainResourceBase::MODIFIER_EXTENSION,
                get: |r| r.base.modifier_extension_slot(),
            },
            $($row),*
        ]
    };
}

pub(crate) use domain_resource_capabilities;
pub(crate) use domain_resource_fields;

/// Any concrete resource, e.g. a member of `contained`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnyResource {
    Flag(Box<Flag>),
    Observation(Box<Observation>),
    Patient(Box<Patient>),
}

impl AnyResource {
    pub fn as_visitable(&self) -> &dyn Visitable {
        match self {
            Self::Flag(r) => r.as_ref(),
            Self::Observation(r) => r.as_ref(),
            Self::Patient(r) => r.as_ref(),
        }
    }

    pub fn as_domain_resource(&self) -> &dyn DomainResource {
        match self {
            Self::Flag(r) => r.as_ref(),
            Self::Observation(r) => r.as_ref(),
            Self::Patient(r) => r.as_ref(),
        }
    }

    pub fn resource_type(&self) -> &'static str {
        self.as_visitable().type_name()
    }

    pub fn id(&self) -> Option<&str> {
        self.as_domain_resource().id()
    }

    pub fn contained(&self) -> &[AnyResource] {
        self.as_domain_resource().contained()
    }

    pub fn as_flag(&self) -> Option<&Flag> {
        match self {
            Self::Flag(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_observation(&self) -> Option<&Observation> {
        match self {
            Self::Observation(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_patient(&self) -> Option<&Patient> {
        match self {
            Self::Patient(r) => Some(r),
            _ => None,
        }
    }
}

impl From<Flag> for AnyResource {
    fn from(value: Flag) -> Self {
        Self::Flag(Box::new(value))
    }
}

impl From<Observation> for AnyResource {
    fn from(value: Observation) -> Self {
        Self::Observation(Box::new(value))
    }
}

impl From<Patient> for AnyResource {
    fn from(value: Patient) -> Self {
        Self::Patient(Box::new(value))
    }
}

/// Lets concrete resources go straight into `contained`.
macro_rules! staged_resource {
    ($($ty:ident),*) => {
        $(
            impl From<$ty> for Option<AnyResource> {
                fn from(value: $ty) -> Self {
                    Some(AnyResource::from(value))
                }
            }
        )*
    };
}

staged_resource!(Flag, Observation, Patient);

/// Lets a whole `AnyResource` be walked as a root.
impl Visitable for AnyResource {
    fn type_name(&self) -> &'static str {
        self.as_visitable().type_name()
    }

    fn node_kind(&self) -> NodeKind {
        NodeKind::Resource
    }

    fn for_each_field<'a>(&'a self, f: &mut dyn FnMut(&'static FieldInfo, Slot<'a>)) {
        self.as_visitable().for_each_field(f)
    }

    fn primitive_value(&self) -> Option<PrimitiveValue<'_>> {
        None
    }

    fn as_any(&self) -> &dyn Any {
        self.as_visitable().as_any()
    }
}
