//! FHIR JSON and XML writers for `ferrum-model` trees.
//!
//! Both writers are [`Visitor`](ferrum_model::Visitor)s and follow the
//! official JSON/XML mapping rules used by HL7 FHIR:
//! - Resources carry their type (`resourceType` in JSON, the root tag in XML).
//! - Choice fields get the held type as suffix (`valueQuantity`).
//! - Primitive metadata (`id`, `extension`) goes into `_field` entries in JSON,
//!   aligned with the values for repeating fields.
//! - In XML, primitive values, element ids and extension urls are attributes,
//!   contained resources are wrapped in `<contained>`, and the narrative
//!   `div` is written through unchanged.

mod error;
mod json;
mod xml;

pub use error::{FormatError, Result};
pub use json::{to_json_string, to_json_value, JsonWriter};
pub use xml::{to_xml_string, XmlWriter};

use ferrum_model::{FieldInfo, FieldKind};

pub(crate) const FHIR_NS: &str = "http://hl7.org/fhir";
pub(crate) const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// Name of a field as written: choice fields get the held type appended.
pub(crate) fn element_name(field: &FieldInfo, type_name: &str) -> String {
    let FieldKind::Choice(types) = field.kind else {
        return field.name.to_string();
    };
    match types.iter().find(|t| t.name() == type_name) {
        Some(held) => format!("{}{}", field.name, held.choice_suffix()),
        None => field.name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrum_model::datatype::DataType;

    #[test]
    fn test_element_name_suffixes_choices_only() {
        const TYPES: &[DataType] = &[DataType::DateTime, DataType::Quantity];
        let choice = FieldInfo::choice("effective", TYPES);
        assert_eq!(element_name(&choice, "dateTime"), "effectiveDateTime");
        assert_eq!(element_name(&choice, "Quantity"), "effectiveQuantity");
        assert_eq!(element_name(&FieldInfo::element("code"), "CodeableConcept"), "code");
    }
}
