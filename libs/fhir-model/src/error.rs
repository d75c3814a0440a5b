//! Error types for element model construction

use thiserror::Error;

/// An invariant violated while finalizing a builder.
///
/// Every variant carries the dotted path of the offending element
/// (`Flag.subject`, `Observation.component[1]`) or the type that failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required element: '{path}'")]
    MissingRequiredField { path: String },

    #[error("Invalid type: {actual} for choice element: '{path}' must be one of: {allowed:?}")]
    InvalidChoiceType {
        path: String,
        actual: &'static str,
        allowed: Vec<&'static str>,
    },

    #[error("Repeating element: '{path}' does not permit null elements")]
    NullListElement { path: String },

    #[error("Missing required element: '{path}' requires at least one item")]
    EmptyRequiredList { path: String },

    #[error("Invalid reference target for element: '{path}': {detail}")]
    DisallowedReferenceTargetType {
        path: String,
        target: String,
        detail: String,
    },

    #[error("ele-1: All FHIR elements must have a @value or children ({type_name})")]
    VacuousElement { type_name: &'static str },

    #[error("Invalid {type_name} value: {message}")]
    InvalidPrimitiveValue {
        type_name: &'static str,
        message: String,
    },

    #[error("dom-2: contained resource '{path}' must not contain nested resources")]
    NestedContainedResource { path: String },

    #[error("{key}: {description} ('{path}')")]
    ConstraintViolated {
        key: &'static str,
        path: String,
        description: &'static str,
    },
}

impl ValidationError {
    /// Dotted path of the offending element, when the rule is field scoped.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::MissingRequiredField { path }
            | Self::InvalidChoiceType { path, .. }
            | Self::NullListElement { path }
            | Self::EmptyRequiredList { path }
            | Self::DisallowedReferenceTargetType { path, .. }
            | Self::NestedContainedResource { path }
            | Self::ConstraintViolated { path, .. } => Some(path),
            Self::VacuousElement { .. } | Self::InvalidPrimitiveValue { .. } => None,
        }
    }

    /// Name of the offending field without the owning type or list index.
    pub fn field(&self) -> Option<&str> {
        let path = self.path()?;
        let last = path.rsplit('.').next().unwrap_or(path);
        Some(last.split('[').next().unwrap_or(last))
    }

    /// Short rule identifier, suitable for issue codes.
    pub fn rule(&self) -> &'static str {
        match self {
            Self::MissingRequiredField { .. } => "required",
            Self::InvalidChoiceType { .. } => "choice-type",
            Self::NullListElement { .. } => "null-list-element",
            Self::EmptyRequiredList { .. } => "empty-required-list",
            Self::DisallowedReferenceTargetType { .. } => "reference-target",
            Self::VacuousElement { .. } => "ele-1",
            Self::InvalidPrimitiveValue { .. } => "primitive-value",
            Self::NestedContainedResource { .. } => "dom-2",
            Self::ConstraintViolated { key, .. } => *key,
        }
    }
}

pub type Result<T> = std::result::Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_strips_type_and_index() {
        let err = ValidationError::NullListElement {
            path: "Observation.component[2]".to_string(),
        };
        assert_eq!(err.path(), Some("Observation.component[2]"));
        assert_eq!(err.field(), Some("component"));
        assert_eq!(err.rule(), "null-list-element");
    }

    #[test]
    fn test_display_names_field() {
        let err = ValidationError::MissingRequiredField {
            path: "Flag.status".to_string(),
        };
        assert_eq!(err.to_string(), "Missing required element: 'Flag.status'");
    }

    #[test]
    fn test_vacuous_has_no_path() {
        let err = ValidationError::VacuousElement {
            type_name: "Coding",
        };
        assert!(err.path().is_none());
        assert!(err.to_string().starts_with("ele-1"));
    }
}
