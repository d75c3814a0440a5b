//! Primitive datatypes
//!
//! All primitives share one generic shape, [`Primitive<K>`]: the element base
//! plus an optional raw value. The marker `K` fixes the FHIR type name, the
//! Rust value type and the lexical rule applied at build time.

use crate::builder::{Buildable, Builder};
use crate::config::ModelConfig;
use crate::datatype::Extension;
use crate::element::{fingerprint, ElementBase, ElementStaging};
use crate::error::Result;
use crate::validation::{self, Validation};
use crate::visitor::{FieldDescriptor, FieldInfo, NodeKind, PrimitiveValue, Schema, Slot};
use rust_decimal::Decimal;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

pub trait PrimitiveKind:
    fmt::Debug + Clone + Copy + PartialEq + Eq + Hash + Send + Sync + 'static
{
    type Value: fmt::Debug + Clone + PartialEq + Eq + Hash + Send + Sync + 'static;

    const TYPE_NAME: &'static str;

    /// Lexical rule for the raw value; returns the failure message.
    fn check(value: &Self::Value, config: &ModelConfig) -> std::result::Result<(), String>;

    fn as_primitive(value: &Self::Value) -> PrimitiveValue<'_>;
}

macro_rules! string_kind {
    ($kind:ident, $name:literal, |$value:ident, $config:ident| $check:expr) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $kind;

        impl PrimitiveKind for $kind {
            type Value = String;

            const TYPE_NAME: &'static str = $name;

            fn check($value: &String, $config: &ModelConfig) -> std::result::Result<(), String> {
                $check
            }

            fn as_primitive(value: &String) -> PrimitiveValue<'_> {
                PrimitiveValue::String(value)
            }
        }
    };
}

string_kind!(StringKind, "string", |value, config| validation::check_string(value, config));
string_kind!(CodeKind, "code", |value, config| validation::check_code(value, config));
string_kind!(IdKind, "id", |value, _config| validation::check_id(value));
string_kind!(UriKind, "uri", |value, _config| validation::check_uri(value));
string_kind!(MarkdownKind, "markdown", |value, config| validation::check_string(value, config));
string_kind!(XhtmlKind, "xhtml", |value, _config| validation::check_xhtml(value));
string_kind!(DateKind, "date", |value, _config| validation::check_date(value));
string_kind!(DateTimeKind, "dateTime", |value, _config| validation::check_date_time(value));
string_kind!(InstantKind, "instant", |value, _config| validation::check_instant(value));

macro_rules! integer_kind {
    ($kind:ident, $name:literal, $min:expr) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $kind;

        impl PrimitiveKind for $kind {
            type Value = i32;

            const TYPE_NAME: &'static str = $name;

            fn check(value: &i32, _config: &ModelConfig) -> std::result::Result<(), String> {
                match $min {
                    Some(min) => validation::check_min(*value, min),
                    None => Ok(()),
                }
            }

            fn as_primitive(value: &i32) -> PrimitiveValue<'_> {
                PrimitiveValue::Integer(*value)
            }
        }
    };
}

integer_kind!(IntegerKind, "integer", None::<i32>);
integer_kind!(PositiveIntKind, "positiveInt", Some(1));
integer_kind!(UnsignedIntKind, "unsignedInt", Some(0));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BooleanKind;

impl PrimitiveKind for BooleanKind {
    type Value = bool;

    const TYPE_NAME: &'static str = "boolean";

    fn check(_value: &bool, _config: &ModelConfig) -> std::result::Result<(), String> {
        Ok(())
    }

    fn as_primitive(value: &bool) -> PrimitiveValue<'_> {
        PrimitiveValue::Boolean(*value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecimalKind;

impl PrimitiveKind for DecimalKind {
    type Value = Decimal;

    const TYPE_NAME: &'static str = "decimal";

    fn check(_value: &Decimal, _config: &ModelConfig) -> std::result::Result<(), String> {
        Ok(())
    }

    fn as_primitive(value: &Decimal) -> PrimitiveValue<'_> {
        PrimitiveValue::Decimal(value)
    }
}

pub type FhirString = Primitive<StringKind>;
pub type Code = Primitive<CodeKind>;
pub type Id = Primitive<IdKind>;
pub type Uri = Primitive<UriKind>;
pub type Markdown = Primitive<MarkdownKind>;
pub type Xhtml = Primitive<XhtmlKind>;
pub type Date = Primitive<DateKind>;
pub type DateTime = Primitive<DateTimeKind>;
pub type Instant = Primitive<InstantKind>;
pub type Boolean = Primitive<BooleanKind>;
pub type Integer = Primitive<IntegerKind>;
pub type PositiveInt = Primitive<PositiveIntKind>;
pub type UnsignedInt = Primitive<UnsignedIntKind>;
pub type FhirDecimal = Primitive<DecimalKind>;

/// A primitive element: an optional raw value plus id and extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Primitive<K: PrimitiveKind> {
    fingerprint: u64,
    element: ElementBase,
    value: Option<K::Value>,
    kind: PhantomData<K>,
}

impl<K: PrimitiveKind> Primitive<K> {
    /// Build a primitive holding just `value`, using the process-wide settings.
    pub fn of(value: impl Into<K::Value>) -> Result<Self> {
        Self::builder().value(value).build()
    }

    pub fn value(&self) -> Option<&K::Value> {
        self.value.as_ref()
    }
}

impl<K: PrimitiveKind<Value = String>> Primitive<K> {
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl<K: PrimitiveKind> Hash for Primitive<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.fingerprint);
    }
}

impl<K: PrimitiveKind> crate::element::HasId for Primitive<K> {
    fn id(&self) -> Option<&str> {
        self.element.id()
    }
}

impl<K: PrimitiveKind> crate::element::HasExtensions for Primitive<K> {
    fn extension(&self) -> &[Extension] {
        self.element.extension()
    }
}

impl<K: PrimitiveKind> Schema for Primitive<K> {
    const TYPE_NAME: &'static str = K::TYPE_NAME;
    const KIND: NodeKind = NodeKind::Primitive;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor {
            info: FieldInfo::attribute("id"),
            get: |p| Slot::attribute(p.element.id()),
        },
        FieldDescriptor {
            info: FieldInfo::element("extension").list(),
            get: |p| Slot::list(p.element.extension()),
        },
    ];

    fn raw_value(&self) -> Option<PrimitiveValue<'_>> {
        self.value.as_ref().map(K::as_primitive)
    }
}

impl<K: PrimitiveKind> Buildable for Primitive<K> {
    type Builder = PrimitiveBuilder<K>;
}

#[derive(Debug, Clone)]
pub struct PrimitiveBuilder<K: PrimitiveKind> {
    element: ElementStaging,
    value: Option<K::Value>,
}

impl<K: PrimitiveKind> Default for PrimitiveBuilder<K> {
    fn default() -> Self {
        Self {
            element: ElementStaging::default(),
            value: None,
        }
    }
}

impl<K: PrimitiveKind> PrimitiveBuilder<K> {
    pub fn value(mut self, value: impl Into<K::Value>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl<K: PrimitiveKind> crate::builder::ExtensibleBuilder for PrimitiveBuilder<K> {
    fn extension_staging(&mut self) -> &mut Vec<Option<Extension>> {
        &mut self.element.extension
    }
}

impl<K: PrimitiveKind> crate::builder::ElementBuilder for PrimitiveBuilder<K> {
    fn element_staging(&mut self) -> &mut ElementStaging {
        &mut self.element
    }
}

impl<K: PrimitiveKind> Builder for PrimitiveBuilder<K> {
    type Target = Primitive<K>;

    fn from_source(source: &Primitive<K>) -> Self {
        Self {
            element: ElementStaging::from_base(&source.element),
            value: source.value.clone(),
        }
    }

    fn build_with(self, config: &ModelConfig) -> Result<Primitive<K>> {
        let v = Validation::new(config, K::TYPE_NAME);
        let element = self.element.build(&v)?;
        if let Some(value) = &self.value {
            v.lexical(K::TYPE_NAME, |config| K::check(value, config))?;
        }
        let fingerprint = fingerprint(&(&element, &self.value));
        v.finish(Primitive {
            fingerprint,
            element,
            value: self.value,
            kind: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{ElementBuilder, ExtensibleBuilder};
    use crate::error::ValidationError;
    use crate::visitor::Visitable;

    #[test]
    fn test_of_validates_lexically() {
        assert!(Code::of("final").is_ok());
        let err = Code::of(" final").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidPrimitiveValue { type_name: "code", .. }
        ));
        assert!(PositiveInt::of(0).is_err());
        assert!(UnsignedInt::of(0).is_ok());
        assert!(Integer::of(-5).is_ok());
    }

    #[test]
    fn test_empty_primitive_is_vacuous() {
        let err = FhirString::builder().build().unwrap_err();
        assert_eq!(err, ValidationError::VacuousElement { type_name: "string" });

        let err = FhirString::builder().id("only-id").build().unwrap_err();
        assert_eq!(err.rule(), "ele-1");
    }

    #[test]
    fn test_extension_only_primitive_is_allowed() {
        let ext = Extension::builder()
            .url("http://hl7.org/fhir/StructureDefinition/data-absent-reason")
            .value(Code::of("unknown").unwrap())
            .build()
            .unwrap();
        let status = Code::builder().extension([ext]).build().unwrap();
        assert!(status.value().is_none());
        assert!(status.has_children());
    }

    #[test]
    fn test_trusted_config_skips_lexical_checks() {
        let raw = Code::builder()
            .value("  spaced  ")
            .build_with(&ModelConfig::trusted())
            .unwrap();
        assert_eq!(raw.as_str(), Some("  spaced  "));
    }

    #[test]
    fn test_equality_and_hash_follow_content() {
        use std::collections::HashSet;
        let a = FhirString::of("same").unwrap();
        let b = FhirString::of("same").unwrap();
        let c = FhirString::of("other").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        let set: HashSet<_> = [a.clone(), b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert_eq!(a.to_builder().build().unwrap(), a);
    }

    #[test]
    fn test_decimal_value() {
        let d = FhirDecimal::of(Decimal::new(1250, 2)).unwrap();
        assert_eq!(d.primitive_value(), Some(PrimitiveValue::Decimal(&Decimal::new(1250, 2))));
    }
}
