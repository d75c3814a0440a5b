use crate::builder::{append, element_builder, replace, Buildable, Builder};
use crate::config::ModelConfig;
use crate::datatype::{Boolean, Code, FhirString, Uri};
use crate::element::{
    element_capabilities, fingerprint, fingerprint_hash, staged, ElementBase, ElementStaging,
};
use crate::error::Result;
use crate::validation::Validation;
use crate::visitor::{FieldDescriptor, FieldInfo, NodeKind, Schema, Slot};

/// A reference to a code defined by a terminology system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coding {
    fingerprint: u64,
    element: ElementBase,
    system: Option<Uri>,
    version: Option<FhirString>,
    code: Option<Code>,
    display: Option<FhirString>,
    user_selected: Option<Boolean>,
}

impl Coding {
    pub fn system(&self) -> Option<&Uri> {
        self.system.as_ref()
    }

    pub fn version(&self) -> Option<&FhirString> {
        self.version.as_ref()
    }

    pub fn code(&self) -> Option<&Code> {
        self.code.as_ref()
    }

    pub fn display(&self) -> Option<&FhirString> {
        self.display.as_ref()
    }

    pub fn user_selected(&self) -> Option<&Boolean> {
        self.user_selected.as_ref()
    }
}

fingerprint_hash!(Coding);
element_capabilities!(Coding);

impl Schema for Coding {
    const TYPE_NAME: &'static str = "Coding";
    const KIND: NodeKind = NodeKind::Datatype;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor {
            info: FieldInfo::attribute("id"),
            get: |c| Slot::attribute(c.element.id()),
        },
        FieldDescriptor {
            info: FieldInfo::element("extension").list(),
            get: |c| Slot::list(c.element.extension()),
        },
        FieldDescriptor {
            info: FieldInfo::element("system"),
            get: |c| Slot::node(c.system.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("version"),
            get: |c| Slot::node(c.version.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("code"),
            get: |c| Slot::node(c.code.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("display"),
            get: |c| Slot::node(c.display.as_ref()),
        },
        FieldDescriptor {
            info: FieldInfo::element("userSelected"),
            get: |c| Slot::node(c.user_selected.as_ref()),
        },
    ];
}

impl Buildable for Coding {
    type Builder = CodingBuilder;
}

#[derive(Debug, Clone, Default)]
pub struct CodingBuilder {
    element: ElementStaging,
    system: Option<Uri>,
    version: Option<FhirString>,
    code: Option<Code>,
    display: Option<FhirString>,
    user_selected: Option<Boolean>,
}

element_builder!(CodingBuilder);

impl CodingBuilder {
    pub fn system(mut self, system: Uri) -> Self {
        self.system = Some(system);
        self
    }

    pub fn version(mut self, version: FhirString) -> Self {
        self.version = Some(version);
        self
    }

    pub fn code(mut self, code: Code) -> Self {
        self.code = Some(code);
        self
    }

    pub fn display(mut self, display: FhirString) -> Self {
        self.display = Some(display);
        self
    }

    pub fn user_selected(mut self, user_selected: Boolean) -> Self {
        self.user_selected = Some(user_selected);
        self
    }
}

impl Builder for CodingBuilder {
    type Target = Coding;

    fn from_source(source: &Coding) -> Self {
        Self {
            element: ElementStaging::from_base(&source.element),
            system: source.system.clone(),
            version: source.version.clone(),
            code: source.code.clone(),
            display: source.display.clone(),
            user_selected: source.user_selected.clone(),
        }
    }

    fn build_with(self, config: &ModelConfig) -> Result<Coding> {
        let v = Validation::new(config, Coding::TYPE_NAME);
        let element = self.element.build(&v)?;
        let fingerprint = fingerprint(&(
            &element,
            &self.system,
            &self.version,
            &self.code,
            &self.display,
            &self.user_selected,
        ));
        v.finish(Coding {
            fingerprint,
            element,
            system: self.system,
            version: self.version,
            code: self.code,
            display: self.display,
            user_selected: self.user_selected,
        })
    }
}

/// A concept expressed as codings and/or text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeableConcept {
    fingerprint: u64,
    element: ElementBase,
    coding: Vec<Coding>,
    text: Option<FhirString>,
}

impl CodeableConcept {
    pub fn coding(&self) -> &[Coding] {
        &self.coding
    }

    pub fn text(&self) -> Option<&FhirString> {
        self.text.as_ref()
    }

    /// Whether any coding matches `system` and `code`.
    pub fn has_code(&self, system: &str, code: &str) -> bool {
        self.coding.iter().any(|c| {
            c.system().and_then(|s| s.as_str()) == Some(system)
                && c.code().and_then(|c| c.as_str()) == Some(code)
        })
    }
}

fingerprint_hash!(CodeableConcept);
element_capabilities!(CodeableConcept);

impl Schema for CodeableConcept {
    const TYPE_NAME: &'static str = "CodeableConcept";
    const KIND: NodeKind = NodeKind::Datatype;
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor {
            info: FieldInfo::attribute("id"),
            get: |c| Slot::attribute(c.element.id()),
        },
        FieldDescriptor {
            info: FieldInfo::element("extension").list(),
            get: |c| Slot::list(c.element.extension()),
        },
        FieldDescriptor {
            info: FieldInfo::element("coding").list(),
            get: |c| Slot::list(c.coding.as_slice()),
        },
        FieldDescriptor {
            info: FieldInfo::element("text"),
            get: |c| Slot::node(c.text.as_ref()),
        },
    ];
}

impl Buildable for CodeableConcept {
    type Builder = CodeableConceptBuilder;
}

#[derive(Debug, Clone, Default)]
pub struct CodeableConceptBuilder {
    element: ElementStaging,
    coding: Vec<Option<Coding>>,
    text: Option<FhirString>,
}

element_builder!(CodeableConceptBuilder);

impl CodeableConceptBuilder {
    pub fn coding<I, E>(mut self, coding: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Option<Coding>>,
    {
        append(&mut self.coding, coding);
        self
    }

    pub fn set_coding<I, E>(mut self, coding: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Option<Coding>>,
    {
        replace(&mut self.coding, coding);
        self
    }

    pub fn text(mut self, text: FhirString) -> Self {
        self.text = Some(text);
        self
    }
}

impl Builder for CodeableConceptBuilder {
    type Target = CodeableConcept;

    fn from_source(source: &CodeableConcept) -> Self {
        Self {
            element: ElementStaging::from_base(&source.element),
            coding: staged(&source.coding),
            text: source.text.clone(),
        }
    }

    fn build_with(self, config: &ModelConfig) -> Result<CodeableConcept> {
        let v = Validation::new(config, CodeableConcept::TYPE_NAME);
        let element = self.element.build(&v)?;
        let coding = v.list(self.coding, "coding")?;
        let fingerprint = fingerprint(&(&element, &coding, &self.text));
        v.finish(CodeableConcept {
            fingerprint,
            element,
            coding,
            text: self.text,
        })
    }
}
