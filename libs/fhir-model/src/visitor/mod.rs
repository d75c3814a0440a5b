//! Visitor traversal protocol
//!
//! Every schema type publishes an ordered table of [`FieldDescriptor`]s
//! (name, kind, cardinality, allowed targets, binding, accessor). One walker,
//! [`walk`], drives any [`Visitor`] over any node from that table, so the
//! declared order lives in exactly one place per type.
//!
//! For each node the walker calls, in order:
//!
//! 1. [`Visitor::pre_visit`]: `false` skips the node and its subtree
//! 2. [`Visitor::visit_start`]
//! 3. [`Visitor::visit`]: `true` dispatches the node's populated fields in
//!    declared order, then the node's own primitive value
//! 4. [`Visitor::visit_end`]
//! 5. [`Visitor::post_visit`]
//!
//! Scalar fields are visited once with no index, list members once each with
//! a zero-based index, and choice fields under their declared name whatever
//! the held type.

mod collect;
mod path;

pub use collect::CollectingVisitor;
pub use path::{PathCollector, PathTracker};

use crate::binding::Binding;
use crate::datatype::{DataType, DataValue};
use rust_decimal::Decimal;
use std::any::Any;
use std::fmt;

/// Structural category of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Primitive,
    Datatype,
    Backbone,
    Resource,
}

/// How a field's content is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A raw string carried by the node itself (`Element.id`, `Extension.url`, `Resource.id`)
    Attribute,
    /// A datatype or backbone element
    Element,
    /// One value out of the listed datatypes
    Choice(&'static [DataType]),
    /// Resources held inline (`contained`)
    Resource,
}

/// Static description of one declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: &'static str,
    pub kind: FieldKind,
    pub min: usize,
    pub max: Option<usize>, // None = unbounded
    /// Allowed reference targets; empty means any resource type
    pub targets: &'static [&'static str],
    pub binding: Option<Binding>,
}

impl FieldInfo {
    const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            min: 0,
            max: Some(1),
            targets: &[],
            binding: None,
        }
    }

    pub const fn attribute(name: &'static str) -> Self {
        Self::new(name, FieldKind::Attribute)
    }

    pub const fn element(name: &'static str) -> Self {
        Self::new(name, FieldKind::Element)
    }

    pub const fn choice(name: &'static str, types: &'static [DataType]) -> Self {
        Self::new(name, FieldKind::Choice(types))
    }

    pub const fn resources(name: &'static str) -> Self {
        Self {
            max: None,
            ..Self::new(name, FieldKind::Resource)
        }
    }

    pub const fn required(self) -> Self {
        Self { min: 1, ..self }
    }

    pub const fn list(self) -> Self {
        Self { max: None, ..self }
    }

    pub const fn references(self, targets: &'static [&'static str]) -> Self {
        Self { targets, ..self }
    }

    pub const fn bound(self, binding: Binding) -> Self {
        Self {
            binding: Some(binding),
            ..self
        }
    }

    pub fn is_list(&self) -> bool {
        self.max != Some(1)
    }

    pub fn is_required(&self) -> bool {
        self.min > 0
    }

    pub fn is_choice(&self) -> bool {
        matches!(self.kind, FieldKind::Choice(_))
    }
}

/// The current content of one field, borrowed from its node.
pub enum Slot<'a> {
    Empty,
    Attribute(&'a str),
    Node(&'a dyn Visitable),
    List(Vec<&'a dyn Visitable>),
}

impl<'a> Slot<'a> {
    pub fn attribute(value: Option<&'a str>) -> Self {
        value.map_or(Slot::Empty, Slot::Attribute)
    }

    pub fn node<V: Visitable>(value: Option<&'a V>) -> Self {
        match value {
            Some(value) => Slot::Node(value),
            None => Slot::Empty,
        }
    }

    pub fn choice(value: Option<&'a DataValue>) -> Self {
        value.map_or(Slot::Empty, |value| Slot::Node(value.as_visitable()))
    }

    pub fn list<V: Visitable>(values: &'a [V]) -> Self {
        if values.is_empty() {
            return Slot::Empty;
        }
        Slot::List(values.iter().map(|v| v as &dyn Visitable).collect())
    }

    pub fn nodes(nodes: Vec<&'a dyn Visitable>) -> Self {
        if nodes.is_empty() {
            Slot::Empty
        } else {
            Slot::List(nodes)
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Slot::Empty => true,
            Slot::Attribute(_) | Slot::Node(_) => false,
            Slot::List(items) => items.is_empty(),
        }
    }
}

/// One row of a schema type's field table.
pub struct FieldDescriptor<T> {
    pub info: FieldInfo,
    pub get: for<'a> fn(&'a T) -> Slot<'a>,
}

/// The raw value carried by a primitive element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveValue<'a> {
    Boolean(bool),
    Integer(i32),
    Decimal(&'a Decimal),
    String(&'a str),
}

impl fmt::Display for PrimitiveValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Decimal(d) => write!(f, "{}", d),
            Self::String(s) => write!(f, "{}", s),
        }
    }
}

/// Declarative shape of a concrete schema type.
///
/// Implementing this is all a schema type needs to become [`Visitable`].
pub trait Schema: fmt::Debug + Send + Sync + Sized + 'static {
    const TYPE_NAME: &'static str;
    const KIND: NodeKind;
    const FIELDS: &'static [FieldDescriptor<Self>];

    fn raw_value(&self) -> Option<PrimitiveValue<'_>> {
        None
    }
}

/// Object-safe view of any node in an element tree.
pub trait Visitable: fmt::Debug + Send + Sync {
    fn type_name(&self) -> &'static str;

    fn node_kind(&self) -> NodeKind;

    /// Calls `f` once per declared field, in declared order, including empty ones.
    fn for_each_field<'a>(&'a self, f: &mut dyn FnMut(&'static FieldInfo, Slot<'a>));

    fn primitive_value(&self) -> Option<PrimitiveValue<'_>>;

    fn as_any(&self) -> &dyn Any;

    fn has_value(&self) -> bool {
        self.primitive_value().is_some()
    }

    /// Whether any child field is populated.
    ///
    /// Attributes only count on resources; an element carrying nothing but
    /// its local id is still empty.
    fn has_children(&self) -> bool {
        let counts_attributes = self.node_kind() == NodeKind::Resource;
        let mut populated = false;
        self.for_each_field(&mut |field, slot| {
            if field.kind == FieldKind::Attribute && !counts_attributes {
                return;
            }
            populated |= !slot.is_empty();
        });
        populated
    }

    fn is_empty(&self) -> bool {
        !self.has_value() && !self.has_children()
    }

    /// Walk this node as the root, named after its type.
    fn accept<'a, V>(&'a self, visitor: &mut V)
    where
        Self: Sized,
        V: Visitor<'a> + ?Sized,
    {
        walk(self, self.type_name(), None, visitor);
    }

    /// Walk this node as the value of `name` (at `index` within a list).
    fn accept_field<'a, V>(&'a self, name: &str, index: Option<usize>, visitor: &mut V)
    where
        Self: Sized,
        V: Visitor<'a> + ?Sized,
    {
        walk(self, name, index, visitor);
    }
}

impl<T: Schema> Visitable for T {
    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn node_kind(&self) -> NodeKind {
        T::KIND
    }

    fn for_each_field<'a>(&'a self, f: &mut dyn FnMut(&'static FieldInfo, Slot<'a>)) {
        for descriptor in T::FIELDS {
            f(&descriptor.info, (descriptor.get)(self));
        }
    }

    fn primitive_value(&self) -> Option<PrimitiveValue<'_>> {
        self.raw_value()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Callbacks invoked by [`walk`].
///
/// All methods have no-op defaults; the two gates default to `true`.
pub trait Visitor<'a> {
    fn pre_visit(&mut self, _node: &'a dyn Visitable) -> bool {
        true
    }

    fn visit_start(&mut self, _name: &str, _index: Option<usize>, _node: &'a dyn Visitable) {}

    /// Returns whether the node's fields should be dispatched.
    fn visit(&mut self, _name: &str, _index: Option<usize>, _node: &'a dyn Visitable) -> bool {
        true
    }

    /// Called before a populated field is dispatched (once per list, not per member).
    fn visit_field_start(&mut self, _field: &'static FieldInfo) {}

    fn visit_field_end(&mut self, _field: &'static FieldInfo) {}

    fn visit_attribute(&mut self, _name: &str, _value: &'a str) {}

    fn visit_value(&mut self, _name: &str, _index: Option<usize>, _value: &PrimitiveValue<'a>) {}

    fn visit_end(&mut self, _name: &str, _index: Option<usize>, _node: &'a dyn Visitable) {}

    fn post_visit(&mut self, _node: &'a dyn Visitable) {}
}

/// Drive `visitor` over `node` and its subtree in declared order.
pub fn walk<'a, V>(node: &'a dyn Visitable, name: &str, index: Option<usize>, visitor: &mut V)
where
    V: Visitor<'a> + ?Sized,
{
    if !visitor.pre_visit(node) {
        return;
    }
    visitor.visit_start(name, index, node);
    if visitor.visit(name, index, node) {
        node.for_each_field(&mut |field, slot| dispatch(field, slot, visitor));
        if let Some(value) = node.primitive_value() {
            visitor.visit_value(name, index, &value);
        }
    }
    visitor.visit_end(name, index, node);
    visitor.post_visit(node);
}

fn dispatch<'a, V>(field: &'static FieldInfo, slot: Slot<'a>, visitor: &mut V)
where
    V: Visitor<'a> + ?Sized,
{
    match slot {
        Slot::Empty => {}
        Slot::Attribute(value) => {
            visitor.visit_field_start(field);
            visitor.visit_attribute(field.name, value);
            visitor.visit_field_end(field);
        }
        Slot::Node(child) => {
            visitor.visit_field_start(field);
            walk(child, field.name, None, visitor);
            visitor.visit_field_end(field);
        }
        Slot::List(children) => {
            visitor.visit_field_start(field);
            for (index, child) in children.into_iter().enumerate() {
                walk(child, field.name, Some(index), visitor);
            }
            visitor.visit_field_end(field);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{Buildable, Builder, ExtensibleBuilder};
    use crate::datatype::{CodeableConcept, Coding, Extension, FhirString, Uri};

    fn coding(code: &str) -> Coding {
        Coding::builder()
            .system(Uri::of("http://loinc.org").unwrap())
            .code(crate::datatype::Code::of(code).unwrap())
            .build()
            .unwrap()
    }

    #[derive(Default)]
    struct Trace {
        events: Vec<String>,
        skip: Option<&'static str>,
    }

    impl<'a> Visitor<'a> for Trace {
        fn pre_visit(&mut self, node: &'a dyn Visitable) -> bool {
            self.skip != Some(node.type_name())
        }

        fn visit_start(&mut self, name: &str, index: Option<usize>, node: &'a dyn Visitable) {
            self.events
                .push(format!("start {} {:?} {}", name, index, node.type_name()));
        }

        fn visit_value(&mut self, name: &str, _index: Option<usize>, value: &PrimitiveValue<'a>) {
            self.events.push(format!("value {}={}", name, value));
        }

        fn visit_end(&mut self, name: &str, _index: Option<usize>, _node: &'a dyn Visitable) {
            self.events.push(format!("end {}", name));
        }
    }

    #[test]
    fn test_walk_visits_in_declared_order() {
        let concept = CodeableConcept::builder()
            .coding([coding("1234-5"), coding("9999-9")])
            .text(FhirString::of("Glucose").unwrap())
            .build()
            .unwrap();

        let mut trace = Trace::default();
        concept.accept(&mut trace);

        assert_eq!(trace.events[0], "start CodeableConcept None CodeableConcept");
        assert_eq!(trace.events[1], "start coding Some(0) Coding");
        let text_at = trace
            .events
            .iter()
            .position(|e| e == "start text None string")
            .unwrap();
        let second_coding_at = trace
            .events
            .iter()
            .position(|e| e == "start coding Some(1) Coding")
            .unwrap();
        assert!(second_coding_at < text_at);
        assert!(trace.events.contains(&"value text=Glucose".to_string()));
        assert_eq!(trace.events.last().unwrap(), "end CodeableConcept");
    }

    #[test]
    fn test_pre_visit_gate_skips_subtree() {
        let concept = CodeableConcept::builder()
            .coding([coding("1234-5")])
            .build()
            .unwrap();

        let mut trace = Trace {
            skip: Some("Coding"),
            ..Trace::default()
        };
        concept.accept(&mut trace);

        assert!(trace.events.iter().all(|e| !e.contains("coding")));
        assert!(trace.events.iter().all(|e| !e.contains("1234-5")));
    }

    #[test]
    fn test_has_children_ignores_element_attributes() {
        let concept = CodeableConcept::builder()
            .text(FhirString::of("x").unwrap())
            .build()
            .unwrap();
        assert!(concept.has_children());
        assert!(!concept.has_value());

        let ext = Extension::builder()
            .url("http://example.org/ext")
            .value(FhirString::of("v").unwrap())
            .build()
            .unwrap();
        let text = FhirString::builder()
            .extension([ext])
            .build()
            .unwrap();
        assert!(text.has_children());
        assert!(!text.has_value());
    }

    #[test]
    fn test_field_info_flags() {
        const TYPES: &[DataType] = &[DataType::String];
        let info = FieldInfo::choice("value", TYPES).required();
        assert!(info.is_required());
        assert!(info.is_choice());
        assert!(!info.is_list());
        assert!(FieldInfo::element("coding").list().is_list());
        assert!(FieldInfo::resources("contained").is_list());
    }
}
