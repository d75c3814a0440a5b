//! Immutable, validated FHIR element trees
//!
//! Every datatype and resource is an immutable value produced by a builder.
//! Builders stage fields (including absent list members), and `build()`
//! checks required fields, choice types, reference target types and the
//! type's own constraints before freezing the instance. Equality and hashing
//! are structural.
//!
//! ```
//! use ferrum_model::prelude::*;
//! use ferrum_model::datatype::{Code, CodeableConcept, FhirString, Reference};
//! use ferrum_model::resource::Flag;
//!
//! let flag = Flag::builder()
//!     .status(Code::of("active")?)
//!     .code(CodeableConcept::builder().text(FhirString::of("Latex allergy")?).build()?)
//!     .subject(Reference::to("Patient/example")?)
//!     .build()?;
//! assert_eq!(flag.subject().target_type(), Some("Patient"));
//! # Ok::<(), ferrum_model::ValidationError>(())
//! ```
//!
//! Traversal goes through [`visitor::Visitor`]: each node reports its fields
//! in declared order, which is what the serializers in `ferrum-format` and
//! [`binding::check_bindings`] build on.

#![forbid(unsafe_code)]

pub mod binding;
pub mod builder;
pub mod config;
pub mod datatype;
pub mod element;
pub mod error;
pub mod resource;
pub mod resource_types;
pub mod validation;
pub mod visitor;

pub use builder::{Buildable, Builder};
pub use config::{ConfigError, ModelConfig};
pub use error::{Result, ValidationError};
pub use resource::{AnyResource, DomainResource, Resource};
pub use resource_types::is_resource_type;
pub use visitor::{walk, FieldInfo, FieldKind, NodeKind, Slot, Visitable, Visitor};

/// Builder and capability traits, for `use ferrum_model::prelude::*`.
pub mod prelude {
    pub use crate::builder::{
        BackboneElementBuilder, Buildable, Builder, DomainResourceBuilder, ElementBuilder,
        ExtensibleBuilder, ModifierExtensibleBuilder, ResourceBuilder,
    };
    pub use crate::element::{HasExtensions, HasId, HasModifierExtensions};
    pub use crate::resource::{DomainResource, Resource};
    pub use crate::visitor::{Visitable, Visitor};
}
