//! Choice (`[x]`) values

use super::{
    Annotation, Boolean, Code, CodeableConcept, Coding, Date, DateTime, FhirDecimal, FhirString,
    Id, Identifier, Instant, Integer, Markdown, Period, PositiveInt, Quantity, Reference, Uri,
    UnsignedInt,
};
use crate::visitor::Visitable;

/// The datatypes a choice field may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Boolean,
    Integer,
    PositiveInt,
    UnsignedInt,
    Decimal,
    String,
    Code,
    Id,
    Uri,
    Markdown,
    Date,
    DateTime,
    Instant,
    Coding,
    CodeableConcept,
    Quantity,
    Period,
    Reference,
    Identifier,
    Annotation,
}

impl DataType {
    pub const ALL: &'static [DataType] = &[
        DataType::Boolean,
        DataType::Integer,
        DataType::PositiveInt,
        DataType::UnsignedInt,
        DataType::Decimal,
        DataType::String,
        DataType::Code,
        DataType::Id,
        DataType::Uri,
        DataType::Markdown,
        DataType::Date,
        DataType::DateTime,
        DataType::Instant,
        DataType::Coding,
        DataType::CodeableConcept,
        DataType::Quantity,
        DataType::Period,
        DataType::Reference,
        DataType::Identifier,
        DataType::Annotation,
    ];

    /// FHIR type code (`dateTime`, `CodeableConcept`).
    pub const fn name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::PositiveInt => "positiveInt",
            Self::UnsignedInt => "unsignedInt",
            Self::Decimal => "decimal",
            Self::String => "string",
            Self::Code => "code",
            Self::Id => "id",
            Self::Uri => "uri",
            Self::Markdown => "markdown",
            Self::Date => "date",
            Self::DateTime => "dateTime",
            Self::Instant => "instant",
            Self::Coding => "Coding",
            Self::CodeableConcept => "CodeableConcept",
            Self::Quantity => "Quantity",
            Self::Period => "Period",
            Self::Reference => "Reference",
            Self::Identifier => "Identifier",
            Self::Annotation => "Annotation",
        }
    }

    /// Suffix appended to a choice field's name in serialized forms (`valueDateTime`).
    pub fn choice_suffix(self) -> String {
        let name = self.name();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            None => String::new(),
        }
    }
}

/// The value held by a choice field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataValue {
    Boolean(Boolean),
    Integer(Integer),
    PositiveInt(PositiveInt),
    UnsignedInt(UnsignedInt),
    Decimal(FhirDecimal),
    String(FhirString),
    Code(Code),
    Id(Id),
    Uri(Uri),
    Markdown(Markdown),
    Date(Date),
    DateTime(DateTime),
    Instant(Instant),
    Coding(Coding),
    CodeableConcept(CodeableConcept),
    Quantity(Quantity),
    Period(Period),
    Reference(Reference),
    Identifier(Identifier),
    Annotation(Box<Annotation>),
}

impl DataValue {
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Boolean(_) => DataType::Boolean,
            Self::Integer(_) => DataType::Integer,
            Self::PositiveInt(_) => DataType::PositiveInt,
            Self::UnsignedInt(_) => DataType::UnsignedInt,
            Self::Decimal(_) => DataType::Decimal,
            Self::String(_) => DataType::String,
            Self::Code(_) => DataType::Code,
            Self::Id(_) => DataType::Id,
            Self::Uri(_) => DataType::Uri,
            Self::Markdown(_) => DataType::Markdown,
            Self::Date(_) => DataType::Date,
            Self::DateTime(_) => DataType::DateTime,
            Self::Instant(_) => DataType::Instant,
            Self::Coding(_) => DataType::Coding,
            Self::CodeableConcept(_) => DataType::CodeableConcept,
            Self::Quantity(_) => DataType::Quantity,
            Self::Period(_) => DataType::Period,
            Self::Reference(_) => DataType::Reference,
            Self::Identifier(_) => DataType::Identifier,
            Self::Annotation(_) => DataType::Annotation,
        }
    }

    /// The held value as a visitable node.
    pub fn as_visitable(&self) -> &dyn Visitable {
        match self {
            Self::Boolean(v) => v,
            Self::Integer(v) => v,
            Self::PositiveInt(v) => v,
            Self::UnsignedInt(v) => v,
            Self::Decimal(v) => v,
            Self::String(v) => v,
            Self::Code(v) => v,
            Self::Id(v) => v,
            Self::Uri(v) => v,
            Self::Markdown(v) => v,
            Self::Date(v) => v,
            Self::DateTime(v) => v,
            Self::Instant(v) => v,
            Self::Coding(v) => v,
            Self::CodeableConcept(v) => v,
            Self::Quantity(v) => v,
            Self::Period(v) => v,
            Self::Reference(v) => v,
            Self::Identifier(v) => v,
            Self::Annotation(v) => v.as_ref(),
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Self::Reference(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_codeable_concept(&self) -> Option<&CodeableConcept> {
        match self {
            Self::CodeableConcept(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_quantity(&self) -> Option<&Quantity> {
        match self {
            Self::Quantity(q) => Some(q),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&FhirString> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date_time(&self) -> Option<&DateTime> {
        match self {
            Self::DateTime(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_period(&self) -> Option<&Period> {
        match self {
            Self::Period(p) => Some(p),
            _ => None,
        }
    }
}

macro_rules! data_value_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for DataValue {
                fn from(value: $ty) -> Self {
                    DataValue::$variant(value)
                }
            }
        )*
    };
}

data_value_from!(
    Boolean(Boolean),
    Integer(Integer),
    PositiveInt(PositiveInt),
    UnsignedInt(UnsignedInt),
    Decimal(FhirDecimal),
    String(FhirString),
    Code(Code),
    Id(Id),
    Uri(Uri),
    Markdown(Markdown),
    Date(Date),
    DateTime(DateTime),
    Instant(Instant),
    Coding(Coding),
    CodeableConcept(CodeableConcept),
    Quantity(Quantity),
    Period(Period),
    Reference(Reference),
    Identifier(Identifier),
);

impl From<Annotation> for DataValue {
    fn from(value: Annotation) -> Self {
        DataValue::Annotation(Box::new(value))
    }
}
