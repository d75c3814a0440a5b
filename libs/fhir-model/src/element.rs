//! Element capability contracts and the shared base parts
//!
//! Every schema type is built from one of two base parts: [`ElementBase`]
//! (local id plus extensions) for datatypes and primitives, or
//! [`BackboneElementBase`] for nested backbone components, which adds
//! modifier extensions. Resources use the bases in [`crate::resource`].

use crate::datatype::Extension;
use crate::error::Result;
use crate::validation::{check_string, Validation};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Anything carrying an optional local identifier.
pub trait HasId {
    fn id(&self) -> Option<&str>;
}

/// Anything carrying ordinary extensions.
pub trait HasExtensions: HasId {
    fn extension(&self) -> &[Extension];

    /// Extensions with the given url, in declared order.
    fn extensions_by_url(&self, url: &str) -> Vec<&Extension> {
        self.extension().iter().filter(|e| e.url() == url).collect()
    }
}

/// Anything carrying modifier extensions.
pub trait HasModifierExtensions: HasExtensions {
    fn modifier_extension(&self) -> &[Extension];

    fn modifier_extensions_by_url(&self, url: &str) -> Vec<&Extension> {
        self.modifier_extension()
            .iter()
            .filter(|e| e.url() == url)
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ElementBase {
    pub(crate) id: Option<String>,
    pub(crate) extension: Vec<Extension>,
}

impl ElementBase {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn extension(&self) -> &[Extension] {
        &self.extension
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BackboneElementBase {
    pub(crate) element: ElementBase,
    pub(crate) modifier_extension: Vec<Extension>,
}

impl BackboneElementBase {
    pub fn element(&self) -> &ElementBase {
        &self.element
    }

    pub fn modifier_extension(&self) -> &[Extension] {
        &self.modifier_extension
    }
}

/// Mutable staging for [`ElementBase`].
#[derive(Debug, Clone, Default)]
pub struct ElementStaging {
    pub(crate) id: Option<String>,
    pub(crate) extension: Vec<Option<Extension>>,
}

impl ElementStaging {
    pub(crate) fn from_base(base: &ElementBase) -> Self {
        Self {
            id: base.id.clone(),
            extension: staged(&base.extension),
        }
    }

    pub(crate) fn build(self, v: &Validation<'_>) -> Result<ElementBase> {
        if let Some(id) = &self.id {
            v.lexical("string", |config| check_string(id, config))?;
        }
        Ok(ElementBase {
            id: self.id,
            extension: v.list(self.extension, "extension")?,
        })
    }
}

/// Mutable staging for [`BackboneElementBase`].
#[derive(Debug, Clone, Default)]
pub struct BackboneElementStaging {
    pub(crate) element: ElementStaging,
    pub(crate) modifier_extension: Vec<Option<Extension>>,
}

impl BackboneElementStaging {
    pub(crate) fn from_base(base: &BackboneElementBase) -> Self {
        Self {
            element: ElementStaging::from_base(&base.element),
            modifier_extension: staged(&base.modifier_extension),
        }
    }

    pub(crate) fn build(self, v: &Validation<'_>) -> Result<BackboneElementBase> {
        Ok(BackboneElementBase {
            element: self.element.build(v)?,
            modifier_extension: v.list(self.modifier_extension, "modifierExtension")?,
        })
    }
}

/// Re-stage a frozen list so it can be edited again.
pub(crate) fn staged<T: Clone>(items: &[T]) -> Vec<Option<T>> {
    items.iter().cloned().map(Some).collect()
}

/// Memoized hash of an instance's fields, computed once at construction.
pub(crate) fn fingerprint<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Implements `HasId` and `HasExtensions` for a type with an `element: ElementBase` field.
macro_rules! element_capabilities {
    ($ty:ty) => {
        impl $crate::element::HasId for $ty {
            fn id(&self) -> Option<&str> {
                self.element.id()
            }
        }

        impl $crate::element::HasExtensions for $ty {
            fn extension(&self) -> &[$crate::datatype::Extension] {
                self.element.extension()
            }
        }
    };
}

/// Implements `Hash` from the memoized `fingerprint` field.
macro_rules! fingerprint_hash {
    ($ty:ty) => {
        impl ::std::hash::Hash for $ty {
            fn hash<H: ::std::hash::Hasher>(&self, state: &mut H) {
                state.write_u64(self.fingerprint);
            }
        }
    };
}

pub(crate) use element_capabilities;
pub(crate) use fingerprint_hash;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(fingerprint(&("a", 1)), fingerprint(&("a", 1)));
        assert_ne!(fingerprint(&("a", 1)), fingerprint(&("a", 2)));
    }

    #[test]
    fn test_staging_rejects_absent_extension() {
        let config = ModelConfig::default();
        let v = Validation::new(&config, "Coding");
        let staging = ElementStaging {
            id: None,
            extension: vec![None],
        };
        let err = staging.build(&v).unwrap_err();
        assert_eq!(err.path(), Some("Coding.extension[0]"));
    }

    #[test]
    fn test_staging_round_trips_base() {
        let base = ElementBase {
            id: Some("a1".to_string()),
            extension: Vec::new(),
        };
        let config = ModelConfig::default();
        let v = Validation::new(&config, "Coding");
        let rebuilt = ElementStaging::from_base(&base).build(&v).unwrap();
        assert_eq!(rebuilt, base);
    }
}
