use crate::builder::{element_builder, Buildable, Builder};
use crate::config::ModelConfig;
use crate::datatype::{DataType, DataValue};
use crate::element::{element_capabilities, fingerprint, fingerprint_hash, ElementBase, ElementStaging};
use crate::error::Result;
use crate::validation::{check_uri, Validation};
use crate::visitor::{FieldDescriptor, FieldInfo, NodeKind, Schema, Slot};

/// Additional content defined by implementations, identified by `url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    fingerprint: u64,
    element: ElementBase,
    url: String,
    value: Option<DataValue>,
}

impl Extension {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn value(&self) -> Option<&DataValue> {
        self.value.as_ref()
    }
}

fingerprint_hash!(Extension);
element_capabilities!(Extension);

impl Schema for Extension {
    const TYPE_NAME: &'static str = "Extension";
    const KIND: NodeKind = NodeKind::Datatype;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor {
            info: FieldInfo::attribute("id"),
            get: |e| Slot::attribute(e.element.id()),
        },
        FieldDescriptor {
            info: FieldInfo::element("extension").list(),
            get: |e| Slot::list(e.element.extension()),
        },
        FieldDescriptor {
            info: FieldInfo::attribute("url").required(),
            get: |e| Slot::Attribute(&e.url),
        },
        FieldDescriptor {
            info: FieldInfo::choice("value", DataType::ALL),
            get: |e| Slot::choice(e.value.as_ref()),
        },
    ];
}

impl Buildable for Extension {
    type Builder = ExtensionBuilder;
}

#[derive(Debug, Clone, Default)]
pub struct ExtensionBuilder {
    element: ElementStaging,
    url: Option<String>,
    value: Option<DataValue>,
}

element_builder!(ExtensionBuilder);

impl ExtensionBuilder {
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn value(mut self, value: impl Into<DataValue>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl Builder for ExtensionBuilder {
    type Target = Extension;

    fn from_source(source: &Extension) -> Self {
        Self {
            element: ElementStaging::from_base(&source.element),
            url: Some(source.url.clone()),
            value: source.value.clone(),
        }
    }

    fn build_with(self, config: &ModelConfig) -> Result<Extension> {
        let v = Validation::new(config, Extension::TYPE_NAME);
        let element = self.element.build(&v)?;
        let url = v.require(self.url, "url")?;
        v.lexical("uri", |_| check_uri(&url))?;
        v.choice(self.value.as_ref(), "value", DataType::ALL)?;
        v.constraint(
            "ext-1",
            element.extension.is_empty() || self.value.is_none(),
            "value",
            "Must have either extensions or value[x], not both",
        )?;
        let fingerprint = fingerprint(&(&element, &url, &self.value));
        v.finish(Extension {
            fingerprint,
            element,
            url,
            value: self.value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ExtensibleBuilder;
    use crate::datatype::{Boolean, FhirString};
    use crate::element::HasExtensions;
    use crate::error::ValidationError;

    #[test]
    fn test_url_is_required() {
        let err = Extension::builder()
            .value(Boolean::of(true).unwrap())
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingRequiredField {
                path: "Extension.url".to_string()
            }
        );
    }

    #[test]
    fn test_url_only_extension_is_vacuous() {
        let err = Extension::builder()
            .url("http://example.org/flag")
            .build()
            .unwrap_err();
        assert_eq!(err.rule(), "ele-1");
    }

    #[test]
    fn test_nested_extensions_and_lookup() {
        let inner = Extension::builder()
            .url("part")
            .value(FhirString::of("a").unwrap())
            .build()
            .unwrap();
        let outer = Extension::builder()
            .url("http://example.org/complex")
            .extension([inner.clone(), inner])
            .build()
            .unwrap();
        assert_eq!(outer.extensions_by_url("part").len(), 2);
        assert!(outer.extensions_by_url("other").is_empty());
    }

    #[test]
    fn test_value_and_extensions_together_violate_ext_1() {
        let inner = Extension::builder()
            .url("part")
            .value(FhirString::of("a").unwrap())
            .build()
            .unwrap();
        let err = Extension::builder()
            .url("http://example.org/complex")
            .extension([inner])
            .value(Boolean::of(false).unwrap())
            .build()
            .unwrap_err();
        assert_eq!(err.rule(), "ext-1");
    }
}
