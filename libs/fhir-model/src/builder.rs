//! Builder contracts
//!
//! Every schema type `T` has a mutable builder. `T::builder()` starts empty,
//! `value.to_builder()` starts from a copy of an existing value, and
//! [`Builder::build`] runs the type's checks and freezes the result.
//!
//! List setters come in two forms: the plain name appends, `set_*` replaces.
//! Both accept anything iterable over `T` or `Option<T>`; an absent member is
//! kept until build, where it is rejected (or dropped when validation is off).
//!
//! The inherited parts of a type (id, extensions, resource metadata) are set
//! through the capability traits in this module, so the same setter works on
//! every builder that has that part.

use crate::config::ModelConfig;
use crate::datatype::{Code, Extension, Meta, Narrative, Uri};
use crate::element::{BackboneElementStaging, ElementStaging};
use crate::error::Result;
use crate::resource::{AnyResource, DomainResourceStaging, ResourceStaging};

pub trait Builder: Default + Sized {
    type Target;

    /// A builder holding a copy of every field of `source`.
    fn from_source(source: &Self::Target) -> Self;

    /// Finalize using explicit settings.
    fn build_with(self, config: &ModelConfig) -> Result<Self::Target>;

    /// Finalize using the process-wide settings.
    fn build(self) -> Result<Self::Target> {
        self.build_with(&ModelConfig::current())
    }
}

/// Types constructed through a [`Builder`].
pub trait Buildable: Sized {
    type Builder: Builder<Target = Self>;

    fn builder() -> Self::Builder {
        Self::Builder::default()
    }

    fn to_builder(&self) -> Self::Builder {
        Self::Builder::from_source(self)
    }
}

pub(crate) fn append<T, I, E>(target: &mut Vec<Option<T>>, items: I)
where
    I: IntoIterator<Item = E>,
    E: Into<Option<T>>,
{
    target.extend(items.into_iter().map(Into::into));
}

pub(crate) fn replace<T, I, E>(target: &mut Vec<Option<T>>, items: I)
where
    I: IntoIterator<Item = E>,
    E: Into<Option<T>>,
{
    target.clear();
    append(target, items);
}

/// `extension` setters, shared by elements and domain resources.
pub trait ExtensibleBuilder: Sized {
    #[doc(hidden)]
    fn extension_staging(&mut self) -> &mut Vec<Option<Extension>>;

    fn extension<I, E>(mut self, extension: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Option<Extension>>,
    {
        append(self.extension_staging(), extension);
        self
    }

    fn set_extension<I, E>(mut self, extension: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Option<Extension>>,
    {
        replace(self.extension_staging(), extension);
        self
    }
}

/// `modifierExtension` setters.
pub trait ModifierExtensibleBuilder: ExtensibleBuilder {
    #[doc(hidden)]
    fn modifier_extension_staging(&mut self) -> &mut Vec<Option<Extension>>;

    fn modifier_extension<I, E>(mut self, extension: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Option<Extension>>,
    {
        append(self.modifier_extension_staging(), extension);
        self
    }

    fn set_modifier_extension<I, E>(mut self, extension: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Option<Extension>>,
    {
        replace(self.modifier_extension_staging(), extension);
        self
    }
}

/// Setters inherited from `Element`.
pub trait ElementBuilder: ExtensibleBuilder {
    #[doc(hidden)]
    fn element_staging(&mut self) -> &mut ElementStaging;

    fn id(mut self, id: impl Into<String>) -> Self {
        self.element_staging().id = Some(id.into());
        self
    }
}

/// Setters inherited from `BackboneElement`.
pub trait BackboneElementBuilder: ElementBuilder + ModifierExtensibleBuilder {
    #[doc(hidden)]
    fn backbone_staging(&mut self) -> &mut BackboneElementStaging;
}

/// Setters inherited from `Resource`.
pub trait ResourceBuilder: Sized {
    #[doc(hidden)]
    fn resource_staging(&mut self) -> &mut ResourceStaging;

    /// Logical id, `[A-Za-z0-9\-\.]{1,64}`.
    fn id(mut self, id: impl Into<String>) -> Self {
        self.resource_staging().id = Some(id.into());
        self
    }

    fn meta(mut self, meta: Meta) -> Self {
        self.resource_staging().meta = Some(meta);
        self
    }

    fn implicit_rules(mut self, implicit_rules: Uri) -> Self {
        self.resource_staging().implicit_rules = Some(implicit_rules);
        self
    }

    fn language(mut self, language: Code) -> Self {
        self.resource_staging().language = Some(language);
        self
    }
}

/// Setters inherited from `DomainResource`.
pub trait DomainResourceBuilder: ResourceBuilder + ModifierExtensibleBuilder {
    #[doc(hidden)]
    fn domain_staging(&mut self) -> &mut DomainResourceStaging;

    fn text(mut self, text: Narrative) -> Self {
        self.domain_staging().text = Some(text);
        self
    }

    fn contained<I, E>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Option<AnyResource>>,
    {
        append(&mut self.domain_staging().contained, resources);
        self
    }

    fn set_contained<I, E>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Option<AnyResource>>,
    {
        replace(&mut self.domain_staging().contained, resources);
        self
    }
}

/// Implements the element capability traits for a builder with an
/// `element: ElementStaging` field.
macro_rules! element_builder {
    ($ty:ty) => {
        impl $crate::builder::ExtensibleBuilder for $ty {
            fn extension_staging(&mut self) -> &mut Vec<Option<$crate::datatype::Extension>> {
                &mut self.element.extension
            }
        }

        impl $crate::builder::ElementBuilder for $ty {
            fn element_staging(&mut self) -> &mut $crate::element::ElementStaging {
                &mut self.element
            }
        }
    };
}

/// Same for a builder with a `backbone: BackboneElementStaging` field.
macro_rules! backbone_builder {
    ($ty:ty) => {
        impl $crate::builder::ExtensibleBuilder for $ty {
            fn extension_staging(&mut self) -> &mut Vec<Option<$crate::datatype::Extension>> {
                &mut self.backbone.element.extension
            }
        }

        impl $crate::builder::ModifierExtensibleBuilder for $ty {
            fn modifier_extension_staging(
                &mut self,
            ) -> &mut Vec<Option<$crate::datatype::Extension>> {
                &mut self.backbone.modifier_extension
            }
        }

        impl $crate::builder::ElementBuilder for $ty {
            fn element_staging(&mut self) -> &mut $crate::element::ElementStaging {
                &mut self.backbone.element
            }
        }

        impl $crate::builder::BackboneElementBuilder for $ty {
            fn backbone_staging(&mut self) -> &mut $crate::element::BackboneElementStaging {
                &mut self.backbone
            }
        }
    };
}

/// Same for a builder with a `base: DomainResourceStaging` field.
macro_rules! domain_resource_builder {
    ($ty:ty) => {
        impl $crate::builder::ExtensibleBuilder for $ty {
            fn extension_staging(&mut self) -> &mut Vec<Option<$crate::datatype::Extension>> {
                &mut self.base.extension
            }
        }

        impl $crate::builder::ModifierExtensibleBuilder for $ty {
            fn modifier_extension_staging(
                &mut self,
            ) -> &mut Vec<Option<$crate::datatype::Extension>> {
                &mut self.base.modifier_extension
            }
        }

        impl $crate::builder::ResourceBuilder for $ty {
            fn resource_staging(&mut self) -> &mut $crate::resource::ResourceStaging {
                &mut self.base.resource
            }
        }

        impl $crate::builder::DomainResourceBuilder for $ty {
            fn domain_staging(&mut self) -> &mut $crate::resource::DomainResourceStaging {
                &mut self.base
            }
        }
    };
}

pub(crate) use backbone_builder;
pub(crate) use domain_resource_builder;
pub(crate) use element_builder;
