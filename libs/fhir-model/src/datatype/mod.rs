//! General-purpose datatypes

mod annotation;
mod coding;
mod extension;
mod identifier;
mod meta;
mod period;
mod primitive;
mod quantity;
mod reference;
mod signature;
mod usage_context;
mod value;

pub use annotation::{Annotation, AnnotationBuilder, ANNOTATION_AUTHOR_TARGETS};
pub use coding::{CodeableConcept, CodeableConceptBuilder, Coding, CodingBuilder};
pub use extension::{Extension, ExtensionBuilder};
pub use identifier::{Identifier, IdentifierBuilder};
pub use meta::{Meta, MetaBuilder, Narrative, NarrativeBuilder};
pub use period::{Period, PeriodBuilder};
pub use primitive::{
    Boolean, BooleanKind, Code, CodeKind, Date, DateKind, DateTime, DateTimeKind, FhirDecimal,
    DecimalKind, FhirString, Id, IdKind, Instant, InstantKind, Integer, IntegerKind, Markdown,
    MarkdownKind, PositiveInt, PositiveIntKind, Primitive, PrimitiveBuilder, PrimitiveKind,
    StringKind, UnsignedInt, UnsignedIntKind, Uri, UriKind, Xhtml, XhtmlKind,
};
pub use quantity::{Quantity, QuantityBuilder};
pub use reference::{Reference, ReferenceBuilder};
pub use signature::{Signature, SignatureBuilder, SIGNATURE_PARTY_TARGETS};
pub use usage_context::{UsageContext, UsageContextBuilder, USAGE_CONTEXT_VALUE_TARGETS};
pub use value::{DataType, DataValue};
