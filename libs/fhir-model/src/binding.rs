//! Terminology bindings
//!
//! Coded fields declare a [`Binding`] in their [`FieldInfo`](crate::FieldInfo).
//! Membership is never checked while building: [`check_bindings`] walks a
//! finished tree and asks a caller-supplied [`TerminologyService`] about each
//! bound code, reporting advisory [`BindingIssue`]s.

use crate::datatype::{Code, CodeableConcept, Coding};
use crate::visitor::{walk, FieldInfo, PathTracker, Visitable, Visitor};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingStrength {
    Required,
    Extensible,
    Preferred,
    Example,
}

impl fmt::Display for BindingStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "required"),
            Self::Extensible => write!(f, "extensible"),
            Self::Preferred => write!(f, "preferred"),
            Self::Example => write!(f, "example"),
        }
    }
}

/// A coded field's value set and binding strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Binding {
    pub value_set: &'static str,
    pub strength: BindingStrength,
}

impl Binding {
    pub const fn required(value_set: &'static str) -> Self {
        Self {
            value_set,
            strength: BindingStrength::Required,
        }
    }

    pub const fn extensible(value_set: &'static str) -> Self {
        Self {
            value_set,
            strength: BindingStrength::Extensible,
        }
    }

    pub const fn preferred(value_set: &'static str) -> Self {
        Self {
            value_set,
            strength: BindingStrength::Preferred,
        }
    }

    pub const fn example(value_set: &'static str) -> Self {
        Self {
            value_set,
            strength: BindingStrength::Example,
        }
    }
}

/// Answer from a [`TerminologyService`] membership query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipOutcome {
    Accept,
    Warn(String),
    Reject(String),
}

/// Value set membership lookups supplied by the caller.
pub trait TerminologyService {
    fn validate_code(&self, value_set: &str, system: Option<&str>, code: &str)
        -> MembershipOutcome;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    Error,
    Warning,
    Information,
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Information => write!(f, "information"),
        }
    }
}

/// A bound code that the terminology service did not accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingIssue {
    pub path: String,
    pub value_set: &'static str,
    pub strength: BindingStrength,
    pub severity: IssueSeverity,
    pub system: Option<String>,
    pub code: String,
    pub message: String,
}

impl BindingIssue {
    fn to_json(&self) -> Value {
        serde_json::json!({
            "severity": self.severity.to_string(),
            "code": "code-invalid",
            "diagnostics": self.message,
            "expression": [self.path],
        })
    }
}

/// Render issues as an `OperationOutcome` resource.
pub fn to_operation_outcome(issues: &[BindingIssue]) -> Value {
    serde_json::json!({
        "resourceType": "OperationOutcome",
        "issue": issues.iter().map(BindingIssue::to_json).collect::<Vec<_>>()
    })
}

/// Check every bound code under `root` against `service`.
///
/// Example bindings are skipped. A rejected code is an error under a
/// required binding, a warning under an extensible one and information under
/// a preferred one; a warning from the service stays a warning.
pub fn check_bindings(root: &dyn Visitable, service: &dyn TerminologyService) -> Vec<BindingIssue> {
    let mut checker = BindingChecker {
        service,
        paths: PathTracker::new(),
        bindings: Vec::new(),
        issues: Vec::new(),
    };
    walk(root, root.type_name(), None, &mut checker);
    checker.issues
}

struct BindingChecker<'s> {
    service: &'s dyn TerminologyService,
    paths: PathTracker,
    bindings: Vec<Option<Binding>>,
    issues: Vec<BindingIssue>,
}

impl BindingChecker<'_> {
    fn check_code(&mut self, binding: Binding, system: Option<&str>, code: &str) {
        let (severity, message) = match self.service.validate_code(binding.value_set, system, code) {
            MembershipOutcome::Accept => return,
            MembershipOutcome::Warn(message) => (IssueSeverity::Warning, message),
            MembershipOutcome::Reject(message) => {
                let severity = match binding.strength {
                    BindingStrength::Required => IssueSeverity::Error,
                    BindingStrength::Extensible => IssueSeverity::Warning,
                    BindingStrength::Preferred | BindingStrength::Example => {
                        IssueSeverity::Information
                    }
                };
                (severity, message)
            }
        };
        let path = self.paths.current();
        tracing::warn!(
            path = %path,
            value_set = binding.value_set,
            strength = %binding.strength,
            code,
            "{}",
            message
        );
        self.issues.push(BindingIssue {
            path,
            value_set: binding.value_set,
            strength: binding.strength,
            severity,
            system: system.map(str::to_string),
            code: code.to_string(),
            message,
        });
    }

    fn check_coding(&mut self, binding: Binding, coding: &Coding) {
        if let Some(code) = coding.code().and_then(Code::as_str) {
            let system = coding.system().and_then(|s| s.as_str());
            self.check_code(binding, system, code);
        }
    }

    /// Returns whether `node` was a coded value.
    fn check_node(&mut self, binding: Binding, node: &dyn Visitable) -> bool {
        let any = node.as_any();
        if let Some(code) = any.downcast_ref::<Code>() {
            if let Some(value) = code.as_str() {
                self.check_code(binding, None, value);
            }
            true
        } else if let Some(coding) = any.downcast_ref::<Coding>() {
            self.check_coding(binding, coding);
            true
        } else if let Some(concept) = any.downcast_ref::<CodeableConcept>() {
            for coding in concept.coding() {
                self.check_coding(binding, coding);
            }
            true
        } else {
            false
        }
    }
}

impl<'a> Visitor<'a> for BindingChecker<'_> {
    fn visit_start(&mut self, name: &str, index: Option<usize>, _node: &'a dyn Visitable) {
        self.paths.push(name, index);
    }

    fn visit(&mut self, _name: &str, _index: Option<usize>, node: &'a dyn Visitable) -> bool {
        match self.bindings.last().copied().flatten() {
            Some(binding) if binding.strength != BindingStrength::Example => {
                !self.check_node(binding, node)
            }
            _ => true,
        }
    }

    fn visit_end(&mut self, _name: &str, _index: Option<usize>, _node: &'a dyn Visitable) {
        self.paths.pop();
    }

    fn visit_field_start(&mut self, field: &'static FieldInfo) {
        self.bindings.push(field.binding);
    }

    fn visit_field_end(&mut self, _field: &'static FieldInfo) {
        self.bindings.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{Buildable, Builder};
    use crate::datatype::{FhirString, Uri};

    struct OnlyFinal;

    impl TerminologyService for OnlyFinal {
        fn validate_code(
            &self,
            _value_set: &str,
            _system: Option<&str>,
            code: &str,
        ) -> MembershipOutcome {
            if code == "final" {
                MembershipOutcome::Accept
            } else {
                MembershipOutcome::Reject(format!("'{}' is not in the value set", code))
            }
        }
    }

    #[test]
    fn test_unbound_codes_are_not_checked() {
        let concept = CodeableConcept::builder()
            .coding([Coding::builder()
                .system(Uri::of("http://loinc.org").unwrap())
                .code(Code::of("bogus").unwrap())
                .build()
                .unwrap()])
            .text(FhirString::of("x").unwrap())
            .build()
            .unwrap();
        assert!(check_bindings(&concept, &OnlyFinal).is_empty());
    }

    #[test]
    fn test_operation_outcome_shape() {
        let issue = BindingIssue {
            path: "Flag.status".to_string(),
            value_set: "http://hl7.org/fhir/ValueSet/flag-status",
            strength: BindingStrength::Required,
            severity: IssueSeverity::Error,
            system: None,
            code: "bogus".to_string(),
            message: "nope".to_string(),
        };
        let outcome = to_operation_outcome(&[issue]);
        assert_eq!(outcome["resourceType"], "OperationOutcome");
        assert_eq!(outcome["issue"][0]["severity"], "error");
        assert_eq!(outcome["issue"][0]["expression"][0], "Flag.status");
    }

    #[test]
    fn test_binding_constructors() {
        let b = Binding::extensible("http://example.org/vs");
        assert_eq!(b.strength, BindingStrength::Extensible);
        assert_eq!(b.strength.to_string(), "extensible");
    }
}
