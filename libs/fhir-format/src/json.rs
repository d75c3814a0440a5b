use crate::element_name;
use crate::error::Result;
use ferrum_model::visitor::PrimitiveValue;
use ferrum_model::{FieldInfo, FieldKind, NodeKind, Visitable, Visitor};
use serde_json::{Map, Number, Value};
use std::str::FromStr;

/// Serialize `root` to a FHIR JSON value.
pub fn to_json_value(root: &dyn Visitable) -> Value {
    let mut writer = JsonWriter::new();
    ferrum_model::walk(root, root.type_name(), None, &mut writer);
    writer.into_value()
}

/// Serialize `root` to pretty-printed FHIR JSON.
pub fn to_json_string(root: &dyn Visitable) -> Result<String> {
    let json = serde_json::to_string_pretty(&to_json_value(root))?;
    tracing::debug!(root = root.type_name(), bytes = json.len(), "serialized to JSON");
    Ok(json)
}

struct Frame {
    key: String,
    list: bool,
    kind: NodeKind,
    object: Map<String, Value>,
    value: Option<Value>,
}

impl Frame {
    fn insert(&mut self, key: &str, list: bool, value: Value, meta: Option<Value>) {
        let meta_key = format!("_{}", key);
        if !list {
            if !value.is_null() {
                self.object.insert(key.to_string(), value);
            }
            if let Some(meta) = meta {
                self.object.insert(meta_key, meta);
            }
            return;
        }

        let index = match self
            .object
            .entry(key.to_string())
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            Value::Array(items) => {
                items.push(value);
                items.len() - 1
            }
            _ => return,
        };
        if let Some(meta) = meta {
            if let Value::Array(metas) = self
                .object
                .entry(meta_key)
                .or_insert_with(|| Value::Array(Vec::new()))
            {
                metas.resize(index, Value::Null);
                metas.push(meta);
            }
        }
    }

    /// Pad the `_key` array of a repeating primitive to the value count.
    fn close_list(&mut self, key: &str) {
        let len = match self.object.get(key) {
            Some(Value::Array(items)) => items.len(),
            _ => return,
        };
        if let Some(Value::Array(metas)) = self.object.get_mut(&format!("_{}", key)) {
            metas.resize(len, Value::Null);
        }
    }
}

/// Visitor building a [`serde_json::Value`] in FHIR JSON form.
#[derive(Default)]
pub struct JsonWriter {
    frames: Vec<Frame>,
    fields: Vec<&'static FieldInfo>,
    root: Option<Value>,
}

impl JsonWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The finished document; `Null` if nothing was walked.
    pub fn into_value(self) -> Value {
        self.root.unwrap_or(Value::Null)
    }
}

fn primitive_to_json(value: &PrimitiveValue<'_>) -> Value {
    match value {
        PrimitiveValue::Boolean(b) => Value::Bool(*b),
        PrimitiveValue::Integer(i) => Value::Number((*i).into()),
        PrimitiveValue::Decimal(d) => Number::from_str(&d.to_string())
            .map(Value::Number)
            .unwrap_or_else(|_| Value::String(d.to_string())),
        PrimitiveValue::String(s) => Value::String(s.to_string()),
    }
}

impl<'a> Visitor<'a> for JsonWriter {
    fn visit_start(&mut self, name: &str, _index: Option<usize>, node: &'a dyn Visitable) {
        let (key, list) = match (self.frames.is_empty(), self.fields.last()) {
            (false, Some(field)) => (element_name(field, node.type_name()), field.is_list()),
            _ => (name.to_string(), false),
        };
        let mut object = Map::new();
        if node.node_kind() == NodeKind::Resource {
            object.insert(
                "resourceType".to_string(),
                Value::String(node.type_name().to_string()),
            );
        }
        self.frames.push(Frame {
            key,
            list,
            kind: node.node_kind(),
            object,
            value: None,
        });
    }

    fn visit_field_start(&mut self, field: &'static FieldInfo) {
        self.fields.push(field);
    }

    fn visit_field_end(&mut self, field: &'static FieldInfo) {
        self.fields.pop();
        if field.is_list() && field.kind != FieldKind::Attribute {
            if let Some(frame) = self.frames.last_mut() {
                frame.close_list(field.name);
            }
        }
    }

    fn visit_attribute(&mut self, name: &str, value: &'a str) {
        if let Some(frame) = self.frames.last_mut() {
            frame
                .object
                .insert(name.to_string(), Value::String(value.to_string()));
        }
    }

    fn visit_value(&mut self, _name: &str, _index: Option<usize>, value: &PrimitiveValue<'a>) {
        if let Some(frame) = self.frames.last_mut() {
            frame.value = Some(primitive_to_json(value));
        }
    }

    fn visit_end(&mut self, _name: &str, _index: Option<usize>, _node: &'a dyn Visitable) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        let (value, meta) = match frame.kind {
            NodeKind::Primitive => {
                let meta = (!frame.object.is_empty()).then(|| Value::Object(frame.object));
                (frame.value.unwrap_or(Value::Null), meta)
            }
            _ => (Value::Object(frame.object), None),
        };
        match self.frames.last_mut() {
            Some(parent) => parent.insert(&frame.key, frame.list, value, meta),
            None => {
                self.root = Some(match (value, meta) {
                    (Value::Null, Some(meta)) => meta,
                    (value, _) => value,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrum_model::datatype::{Code, Coding, FhirString, Uri};
    use ferrum_model::prelude::*;
    use serde_json::json;

    #[test]
    fn test_datatype_root_is_plain_object() {
        let coding = Coding::builder()
            .system(Uri::of("http://loinc.org").unwrap())
            .code(Code::of("8480-6").unwrap())
            .display(FhirString::of("Systolic blood pressure").unwrap())
            .build()
            .unwrap();
        assert_eq!(
            to_json_value(&coding),
            json!({
                "system": "http://loinc.org",
                "code": "8480-6",
                "display": "Systolic blood pressure"
            })
        );
    }

    #[test]
    fn test_list_metadata_is_padded() {
        let mut frame = Frame {
            key: "Meta".to_string(),
            list: false,
            kind: NodeKind::Datatype,
            object: Map::new(),
            value: None,
        };
        frame.insert("profile", true, json!("a"), Some(json!({"id": "p0"})));
        frame.insert("profile", true, json!("b"), None);
        frame.insert("profile", true, json!("c"), None);
        frame.close_list("profile");
        assert_eq!(
            Value::Object(frame.object),
            json!({
                "profile": ["a", "b", "c"],
                "_profile": [{"id": "p0"}, null, null]
            })
        );
    }
}
