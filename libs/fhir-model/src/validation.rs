//! Construction-time invariant checks
//!
//! Builders finalize through a [`Validation`], which carries the active
//! [`ModelConfig`] and the owning type name used to build field paths
//! (`Flag.subject`, `Observation.component[1]`). The first violated rule
//! aborts the build.
//!
//! The lexical checks for primitive values are plain functions returning the
//! failure message, so decoders can reuse them.

use crate::config::ModelConfig;
use crate::datatype::{DataType, DataValue, Reference};
use crate::error::{Result, ValidationError};
use crate::resource::AnyResource;
use crate::resource_types::is_resource_type;
use crate::visitor::{NodeKind, Visitable};
use regex::Regex;
use std::sync::OnceLock;

pub const MAX_STRING_LENGTH: usize = 1_048_576;
pub const MAX_ID_LENGTH: usize = 64;
const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

pub struct Validation<'a> {
    config: &'a ModelConfig,
    type_name: &'static str,
}

impl<'a> Validation<'a> {
    pub fn new(config: &'a ModelConfig, type_name: &'static str) -> Self {
        Self { config, type_name }
    }

    pub fn config(&self) -> &ModelConfig {
        self.config
    }

    pub fn enabled(&self) -> bool {
        self.config.validate
    }

    pub fn path(&self, field: &str) -> String {
        format!("{}.{}", self.type_name, field)
    }

    fn indexed(&self, field: &str, index: usize) -> String {
        format!("{}.{}[{}]", self.type_name, field, index)
    }

    fn fail(&self, error: ValidationError) -> ValidationError {
        tracing::debug!(type_name = self.type_name, rule = error.rule(), "{}", error);
        error
    }

    /// Required single-valued field. Enforced even with validation off.
    pub fn require<T>(&self, value: Option<T>, field: &str) -> Result<T> {
        value.ok_or_else(|| {
            self.fail(ValidationError::MissingRequiredField {
                path: self.path(field),
            })
        })
    }

    /// Freeze a staged list, rejecting absent members.
    ///
    /// With validation off absent members are dropped instead.
    pub fn list<T>(&self, staged: Vec<Option<T>>, field: &str) -> Result<Vec<T>> {
        if !self.enabled() {
            return Ok(staged.into_iter().flatten().collect());
        }
        let mut items = Vec::with_capacity(staged.len());
        for (index, item) in staged.into_iter().enumerate() {
            match item {
                Some(item) => items.push(item),
                None => {
                    return Err(self.fail(ValidationError::NullListElement {
                        path: self.indexed(field, index),
                    }))
                }
            }
        }
        Ok(items)
    }

    /// Like [`list`](Self::list), but at least one member is required.
    pub fn non_empty_list<T>(&self, staged: Vec<Option<T>>, field: &str) -> Result<Vec<T>> {
        let items = self.list(staged, field)?;
        if items.is_empty() {
            return Err(self.fail(ValidationError::EmptyRequiredList {
                path: self.path(field),
            }));
        }
        Ok(items)
    }

    /// Reject a choice value whose held type is not in `allowed`.
    pub fn choice(
        &self,
        value: Option<&DataValue>,
        field: &str,
        allowed: &'static [DataType],
    ) -> Result<()> {
        let Some(value) = value else {
            return Ok(());
        };
        if !self.enabled() || allowed.contains(&value.data_type()) {
            return Ok(());
        }
        Err(self.fail(ValidationError::InvalidChoiceType {
            path: self.path(field),
            actual: value.data_type().name(),
            allowed: allowed.iter().map(|t| t.name()).collect(),
        }))
    }

    pub fn require_choice(
        &self,
        value: Option<DataValue>,
        field: &str,
        allowed: &'static [DataType],
    ) -> Result<DataValue> {
        let value = self.require(value, field)?;
        self.choice(Some(&value), field, allowed)?;
        Ok(value)
    }

    /// Check a reference's target type against `targets` (empty = any).
    pub fn reference(
        &self,
        reference: Option<&Reference>,
        field: &str,
        targets: &[&str],
    ) -> Result<()> {
        match reference {
            Some(reference) => self.reference_at(reference, || self.path(field), targets),
            None => Ok(()),
        }
    }

    pub fn references(&self, references: &[Reference], field: &str, targets: &[&str]) -> Result<()> {
        for (index, reference) in references.iter().enumerate() {
            self.reference_at(reference, || self.indexed(field, index), targets)?;
        }
        Ok(())
    }

    /// Reference check for a choice field that currently holds a `Reference`.
    pub fn choice_reference(
        &self,
        value: Option<&DataValue>,
        field: &str,
        targets: &[&str],
    ) -> Result<()> {
        self.reference(value.and_then(DataValue::as_reference), field, targets)
    }

    fn reference_at(
        &self,
        reference: &Reference,
        path: impl FnOnce() -> String,
        targets: &[&str],
    ) -> Result<()> {
        if !self.config.reference_checks_enabled() {
            return Ok(());
        }
        match check_reference_target(reference, targets) {
            Ok(()) => Ok(()),
            Err((target, detail)) => Err(self.fail(ValidationError::DisallowedReferenceTargetType {
                path: path(),
                target,
                detail,
            })),
        }
    }

    /// Run a lexical check when validation is on.
    pub fn lexical(
        &self,
        type_name: &'static str,
        check: impl FnOnce(&ModelConfig) -> std::result::Result<(), String>,
    ) -> Result<()> {
        if !self.enabled() {
            return Ok(());
        }
        check(self.config).map_err(|message| {
            self.fail(ValidationError::InvalidPrimitiveValue { type_name, message })
        })
    }

    /// A named co-occurrence rule, e.g. `obs-6`.
    pub fn constraint(
        &self,
        key: &'static str,
        holds: bool,
        field: &str,
        description: &'static str,
    ) -> Result<()> {
        if !self.enabled() || holds {
            return Ok(());
        }
        Err(self.fail(ValidationError::ConstraintViolated {
            key,
            path: self.path(field),
            description,
        }))
    }

    /// Contained resources must not themselves contain resources.
    pub fn contained(&self, contained: &[AnyResource], field: &str) -> Result<()> {
        if !self.enabled() {
            return Ok(());
        }
        for (index, resource) in contained.iter().enumerate() {
            if !resource.contained().is_empty() {
                return Err(self.fail(ValidationError::NestedContainedResource {
                    path: self.indexed(field, index),
                }));
            }
        }
        Ok(())
    }

    /// Final check on a constructed node: it must carry a value or children.
    pub fn finish<T: Visitable>(&self, node: T) -> Result<T> {
        if self.enabled() && node.is_empty() {
            return Err(self.fail(ValidationError::VacuousElement {
                type_name: node.type_name(),
            }));
        }
        if node.node_kind() == NodeKind::Resource {
            tracing::debug!(resource_type = self.type_name, "resource built");
        } else {
            tracing::trace!(type_name = self.type_name, "element built");
        }
        Ok(node)
    }
}

/// Statically determinable target type of a reference, if any.
///
/// The explicit `type` wins. Otherwise a relative literal (`Patient/123`,
/// `Patient/123/_history/2`) or a conditional one (`Patient?identifier=x`)
/// names its type; local (`#p1`) and absolute references do not.
pub fn reference_target_type(reference: &Reference) -> Option<&str> {
    if let Some(explicit) = reference.type_().and_then(|t| t.as_str()) {
        return Some(explicit);
    }
    reference
        .reference()
        .and_then(|r| r.as_str())
        .and_then(literal_target_type)
}

/// Target type named by a literal reference string.
pub fn literal_target_type(literal: &str) -> Option<&str> {
    if literal.starts_with('#') || has_scheme(literal) {
        return None;
    }
    if let Some((resource_type, _)) = literal.split_once('?') {
        return Some(resource_type);
    }
    relative_reference_regex()
        .captures(literal)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn has_scheme(literal: &str) -> bool {
    match literal.find(':') {
        Some(colon) => {
            let scheme = &literal[..colon];
            !scheme.is_empty()
                && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

fn relative_reference_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Z][A-Za-z]+)/[A-Za-z0-9\-\.]{1,64}(/_history/[A-Za-z0-9\-\.]{1,64})?$")
            .expect("relative reference regex must compile")
    })
}

/// Returns the offending target and a description on failure.
fn check_reference_target(
    reference: &Reference,
    targets: &[&str],
) -> std::result::Result<(), (String, String)> {
    let explicit = reference.type_().and_then(|t| t.as_str());
    let literal = reference
        .reference()
        .and_then(|r| r.as_str())
        .and_then(literal_target_type);

    for candidate in explicit.iter().chain(literal.iter()) {
        if !is_resource_type(candidate) {
            return Err((
                candidate.to_string(),
                format!("'{}' is not a valid resource type", candidate),
            ));
        }
        if !targets.is_empty() && !targets.contains(candidate) {
            return Err((
                candidate.to_string(),
                format!(
                    "resource type found in reference value: '{}' is not allowed; allowed types are {:?}",
                    candidate, targets
                ),
            ));
        }
    }

    if let (Some(explicit), Some(literal)) = (explicit, literal) {
        if explicit != literal {
            return Err((
                explicit.to_string(),
                format!(
                    "resource type found in reference value: '{}' does not match type: '{}'",
                    literal, explicit
                ),
            ));
        }
    }
    Ok(())
}

/// Whitespace as the string rules see it: the White_Space characters minus
/// the no-break spaces and NEL, plus the information separators U+001C..U+001F.
fn is_whitespace_char(c: char) -> bool {
    match c {
        '\u{1C}'..='\u{1F}' => true,
        '\u{85}' | '\u{A0}' | '\u{2007}' | '\u{202F}' => false,
        c => c.is_whitespace(),
    }
}

/// Lexical rules of `string`.
///
/// The length limit counts characters, not bytes. Whitespace other than
/// space, tab, CR and LF is rejected whatever the control-character setting.
pub fn check_string(value: &str, config: &ModelConfig) -> std::result::Result<(), String> {
    if value.len() > MAX_STRING_LENGTH {
        let length = value.chars().count();
        if length > MAX_STRING_LENGTH {
            return Err(format!(
                "length: {} is greater than maximum allowed length: {}",
                length, MAX_STRING_LENGTH
            ));
        }
    }
    let mut visible = 0;
    for c in value.chars() {
        if is_whitespace_char(c) {
            if !matches!(c, ' ' | '\t' | '\r' | '\n') {
                return Err(format!(
                    "String value: '{}' is not valid with respect to pattern: [ \\r\\n\\t\\S]+",
                    value
                ));
            }
        } else {
            if config.check_control_chars && c.is_control() && (c as u32) < 0x20 {
                return Err("String value contains unsupported control characters".to_string());
            }
            visible += 1;
        }
    }
    if visible == 0 {
        return Err(
            "Trimmed String value length: 0 is less than minimum required length: 1".to_string(),
        );
    }
    Ok(())
}

pub fn check_code(value: &str, config: &ModelConfig) -> std::result::Result<(), String> {
    check_string(value, config)?;
    if value.starts_with(is_whitespace_char) || value.ends_with(is_whitespace_char) {
        return Err(format!(
            "Code value: '{}' must not begin or end with whitespace",
            value
        ));
    }
    let mut previous_space = false;
    for c in value.chars() {
        if is_whitespace_char(c) {
            if c != ' ' || previous_space {
                return Err(format!(
                    "Code value: '{}' must not contain consecutive or non-space whitespace",
                    value
                ));
            }
            previous_space = true;
        } else {
            previous_space = false;
        }
    }
    Ok(())
}

pub fn check_id(value: &str) -> std::result::Result<(), String> {
    if value.is_empty() || value.len() > MAX_ID_LENGTH {
        return Err(format!(
            "Id value: '{}' must be between 1 and {} characters",
            value, MAX_ID_LENGTH
        ));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.'))
    {
        return Err(format!(
            "Id value: '{}' is not valid with respect to pattern: [A-Za-z0-9\\-\\.]{{1,64}}",
            value
        ));
    }
    Ok(())
}

pub fn check_uri(value: &str) -> std::result::Result<(), String> {
    if value.len() > MAX_STRING_LENGTH {
        return Err(format!(
            "length: {} is greater than maximum allowed length: {}",
            value.len(),
            MAX_STRING_LENGTH
        ));
    }
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(format!("Uri value: '{}' must not contain whitespace", value));
    }
    Ok(())
}

pub fn check_min(value: i32, min: i32) -> std::result::Result<(), String> {
    if value < min {
        return Err(format!("value: {} is less than minimum: {}", value, min));
    }
    Ok(())
}

pub fn check_date(value: &str) -> std::result::Result<(), String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(
            r"^([0-9]([0-9]([0-9][1-9]|[1-9]0)|[1-9]00)|[1-9]000)(-(0[1-9]|1[0-2])(-(0[1-9]|[1-2][0-9]|3[0-1]))?)?$",
        )
        .expect("date regex must compile")
    });
    if re.is_match(value) {
        Ok(())
    } else {
        Err(format!("'{}' is not a valid date", value))
    }
}

pub fn check_date_time(value: &str) -> std::result::Result<(), String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(
            r"^([0-9]([0-9]([0-9][1-9]|[1-9]0)|[1-9]00)|[1-9]000)(-(0[1-9]|1[0-2])(-(0[1-9]|[1-2][0-9]|3[0-1])(T([01][0-9]|2[0-3]):[0-5][0-9]:([0-5][0-9]|60)(\.[0-9]{1,9})?(Z|(\+|-)((0[0-9]|1[0-3]):[0-5][0-9]|14:00)))?)?)?$",
        )
        .expect("dateTime regex must compile")
    });
    if re.is_match(value) {
        Ok(())
    } else {
        Err(format!("'{}' is not a valid dateTime", value))
    }
}

pub fn check_instant(value: &str) -> std::result::Result<(), String> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|_| ())
        .map_err(|e| format!("'{}' is not a valid instant: {}", value, e))
}

/// Narrative content: a well-formed XML document whose single root is an
/// XHTML `div`, free of `script` elements.
pub fn check_xhtml(value: &str) -> std::result::Result<(), String> {
    let doc = roxmltree::Document::parse(value.trim())
        .map_err(|e| format!("narrative is not well-formed XHTML: {}", e))?;
    if doc.root().children().filter(|n| n.is_element()).count() != 1 {
        return Err("narrative must be a single <div> element".to_string());
    }
    let root = doc.root_element();
    if root.tag_name().name() != "div" {
        return Err(format!(
            "narrative root element must be <div>, found <{}>",
            root.tag_name().name()
        ));
    }
    if !matches!(root.tag_name().namespace(), None | Some(XHTML_NAMESPACE)) {
        return Err("narrative <div> must be in the XHTML namespace".to_string());
    }
    if root.descendants().any(|n| n.is_element() && n.has_tag_name("script")) {
        return Err("narrative must not contain <script> elements".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ModelConfig {
        ModelConfig::default()
    }

    #[test]
    fn test_string_rules() {
        assert!(check_string("hello world", &cfg()).is_ok());
        assert!(check_string("line\nbreak\ttab", &cfg()).is_ok());
        assert!(check_string("   ", &cfg()).is_err());
        assert!(check_string("", &cfg()).is_err());
        assert!(check_string("form\u{000C}feed", &cfg()).is_err());
        assert!(check_string("bell\u{0007}", &cfg()).is_err());

        let lenient = ModelConfig::builder().check_control_chars(false).build();
        assert!(check_string("bell\u{0007}", &lenient).is_ok());
        assert!(check_string("unit\u{001F}separator", &lenient).is_err());
        assert!(check_string("file\u{001C}separator", &cfg()).is_err());
        assert!(check_string("no\u{00A0}break", &cfg()).is_ok());
    }

    #[test]
    fn test_string_length_counts_characters() {
        let wide = "é".repeat(MAX_STRING_LENGTH);
        assert!(wide.len() > MAX_STRING_LENGTH);
        assert!(check_string(&wide, &cfg()).is_ok());

        let too_long = "a".repeat(MAX_STRING_LENGTH + 1);
        assert!(check_string(&too_long, &cfg()).is_err());
    }

    #[test]
    fn test_code_rules() {
        assert!(check_code("final", &cfg()).is_ok());
        assert!(check_code("two words", &cfg()).is_ok());
        assert!(check_code(" final", &cfg()).is_err());
        assert!(check_code("final ", &cfg()).is_err());
        assert!(check_code("two  spaces", &cfg()).is_err());
        assert!(check_code("tab\tinside", &cfg()).is_err());
    }

    #[test]
    fn test_id_rules() {
        assert!(check_id("abc-123.x").is_ok());
        assert!(check_id("").is_err());
        assert!(check_id("has space").is_err());
        assert!(check_id(&"a".repeat(65)).is_err());
        assert!(check_id(&"a".repeat(64)).is_ok());
    }

    #[test]
    fn test_temporal_rules() {
        assert!(check_date("2024").is_ok());
        assert!(check_date("2024-02-29").is_ok());
        assert!(check_date("2024-13").is_err());
        assert!(check_date_time("2024-02-29T10:15:00Z").is_ok());
        assert!(check_date_time("2024-02-29T10:15:00.123+02:00").is_ok());
        assert!(check_date_time("2024-02-29T10:15").is_err());
        assert!(check_date_time("2024-02-29T10:15:00").is_err());
        assert!(check_instant("2024-02-29T10:15:00Z").is_ok());
        assert!(check_instant("2024-02-29").is_err());
    }

    #[test]
    fn test_xhtml_rules() {
        assert!(check_xhtml(r#"<div xmlns="http://www.w3.org/1999/xhtml"><p>ok &amp; fine</p></div>"#).is_ok());
        assert!(check_xhtml("<div>plain</div>").is_ok());

        assert!(check_xhtml("<div>a & b</div>").is_err());
        assert!(check_xhtml("<div><p>unclosed</div>").is_err());
        assert!(check_xhtml("<div>x</div><script>alert(1)</script><div>y</div>").is_err());
        assert!(check_xhtml("<divx>t</div>").is_err());
        assert!(check_xhtml("<divx>t</divx>").is_err());
        assert!(check_xhtml("<div><script>alert(1)</script></div>").is_err());
        assert!(check_xhtml(r#"<div xmlns="http://example.org">x</div>"#).is_err());
    }

    #[test]
    fn test_literal_target_type() {
        assert_eq!(literal_target_type("Patient/123"), Some("Patient"));
        assert_eq!(literal_target_type("Patient/123/_history/2"), Some("Patient"));
        assert_eq!(literal_target_type("Patient?identifier=x|1"), Some("Patient"));
        assert_eq!(literal_target_type("#p1"), None);
        assert_eq!(literal_target_type("http://example.org/fhir/Patient/1"), None);
        assert_eq!(literal_target_type("urn:uuid:0c3151bd-1cbf-4d64-b04d-cd9187a4c6e0"), None);
        assert_eq!(literal_target_type("not a reference"), None);
    }

    #[test]
    fn test_list_drops_absent_members_when_disabled() {
        let trusted = ModelConfig::trusted();
        let v = Validation::new(&trusted, "Flag");
        let items = v.list(vec![Some(1), None, Some(3)], "category").unwrap();
        assert_eq!(items, vec![1, 3]);

        let enabled = cfg();
        let v = Validation::new(&enabled, "Flag");
        let err = v.list(vec![Some(1), None], "category").unwrap_err();
        assert_eq!(err.path(), Some("Flag.category[1]"));
    }

    #[test]
    fn test_require_is_always_enforced() {
        let trusted = ModelConfig::trusted();
        let v = Validation::new(&trusted, "Flag");
        let err = v.require::<u8>(None, "status").unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingRequiredField {
                path: "Flag.status".to_string()
            }
        );
    }
}
