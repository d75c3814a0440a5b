use crate::error::{FormatError, Result};
use crate::{element_name, FHIR_NS, XHTML_NS};
use ferrum_model::{FieldInfo, FieldKind, NodeKind, Slot, Visitable, Visitor};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

/// Serialize `root` to indented FHIR XML.
pub fn to_xml_string(root: &dyn Visitable) -> Result<String> {
    let mut writer = XmlWriter::new();
    ferrum_model::walk(root, root.type_name(), None, &mut writer);
    let xml = writer.finish()?;
    tracing::debug!(root = root.type_name(), bytes = xml.len(), "serialized to XML");
    Ok(xml)
}

struct Frame {
    name: String,
    kind: NodeKind,
    open: bool,
    wrapped: bool,
}

/// Visitor writing FHIR XML through `quick-xml`.
///
/// Write failures are kept and reported by [`finish`](Self::finish); once one
/// occurs the rest of the walk writes nothing.
pub struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
    frames: Vec<Frame>,
    fields: Vec<&'static FieldInfo>,
    error: Option<FormatError>,
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlWriter {
    pub fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2),
            frames: Vec::new(),
            fields: Vec::new(),
            error: None,
        }
    }

    pub fn finish(self) -> Result<String> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let bytes = self.writer.into_inner().into_inner();
        Ok(String::from_utf8(bytes)?)
    }

    fn emit(&mut self, event: Event<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.writer.write_event(event) {
            self.error = Some(e.into());
        }
    }

    /// `<name value="..."/>`, used for resource ids.
    fn emit_value_element(&mut self, name: &str, value: &str) {
        let mut elem = BytesStart::new(name);
        elem.push_attribute(("value", value));
        self.emit(Event::Empty(elem));
    }

    fn emit_xhtml(&mut self, div: &str) {
        let div = div.trim();
        let div = if div.contains(XHTML_NS) {
            div.to_string()
        } else {
            div.replacen("<div", &format!("<div xmlns=\"{}\"", XHTML_NS), 1)
        };
        self.emit(Event::Text(BytesText::from_escaped(div)));
    }
}

/// Attribute-kind fields of a non-resource node (`id`, `url`).
fn attributes<'a>(node: &'a dyn Visitable) -> Vec<(&'static str, &'a str)> {
    let mut found = Vec::new();
    node.for_each_field(&mut |field, slot| {
        if let (FieldKind::Attribute, Slot::Attribute(value)) = (field.kind, slot) {
            found.push((field.name, value));
        }
    });
    found
}

impl<'a> Visitor<'a> for XmlWriter {
    fn visit_start(&mut self, name: &str, _index: Option<usize>, node: &'a dyn Visitable) {
        let is_root = self.frames.is_empty();
        let field = if is_root { None } else { self.fields.last().copied() };
        let kind = node.node_kind();

        if kind == NodeKind::Resource {
            let wrapped = matches!(field, Some(f) if f.kind == FieldKind::Resource);
            if wrapped {
                let wrapper = field.map_or("contained", |f| f.name);
                self.emit(Event::Start(BytesStart::new(wrapper)));
            }
            let mut start = BytesStart::new(node.type_name());
            if is_root {
                start.push_attribute(("xmlns", FHIR_NS));
            }
            self.emit(Event::Start(start));
            self.frames.push(Frame {
                name: node.type_name().to_string(),
                kind,
                open: true,
                wrapped,
            });
            return;
        }

        let element = match field {
            Some(field) => element_name(field, node.type_name()),
            None => name.to_string(),
        };

        if node.type_name() == "xhtml" {
            if let Some(div) = node.primitive_value() {
                self.emit_xhtml(&div.to_string());
            }
            self.frames.push(Frame {
                name: element,
                kind,
                open: false,
                wrapped: false,
            });
            return;
        }

        let mut start = BytesStart::new(element.clone());
        if is_root {
            start.push_attribute(("xmlns", FHIR_NS));
        }
        for (attribute, value) in attributes(node) {
            start.push_attribute((attribute, value));
        }
        if let Some(value) = node.primitive_value() {
            start.push_attribute(("value", value.to_string().as_str()));
        }
        let open = node.has_children();
        if open {
            self.emit(Event::Start(start));
        } else {
            self.emit(Event::Empty(start));
        }
        self.frames.push(Frame {
            name: element,
            kind,
            open,
            wrapped: false,
        });
    }

    fn visit(&mut self, _name: &str, _index: Option<usize>, node: &'a dyn Visitable) -> bool {
        node.type_name() != "xhtml"
    }

    fn visit_field_start(&mut self, field: &'static FieldInfo) {
        self.fields.push(field);
    }

    fn visit_field_end(&mut self, _field: &'static FieldInfo) {
        self.fields.pop();
    }

    fn visit_attribute(&mut self, name: &str, value: &'a str) {
        // element attributes were written on the start tag
        if matches!(self.frames.last(), Some(frame) if frame.kind == NodeKind::Resource) {
            self.emit_value_element(name, value);
        }
    }

    fn visit_end(&mut self, _name: &str, _index: Option<usize>, _node: &'a dyn Visitable) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        if frame.open {
            self.emit(Event::End(BytesEnd::new(frame.name)));
        }
        if frame.wrapped {
            let wrapper = self.fields.last().map_or("contained", |f| f.name);
            self.emit(Event::End(BytesEnd::new(wrapper)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrum_model::datatype::{Code, Coding, Uri};
    use ferrum_model::prelude::*;

    #[test]
    fn test_datatype_root_gets_namespace() {
        let coding = Coding::builder()
            .id("c1")
            .system(Uri::of("http://loinc.org").unwrap())
            .code(Code::of("8480-6").unwrap())
            .build()
            .unwrap();
        let xml = to_xml_string(&coding).unwrap();
        assert!(xml.starts_with(r#"<Coding xmlns="http://hl7.org/fhir" id="c1">"#));
        assert!(xml.contains(r#"<system value="http://loinc.org"/>"#));
        assert!(xml.contains(r#"<code value="8480-6"/>"#));
    }
}
