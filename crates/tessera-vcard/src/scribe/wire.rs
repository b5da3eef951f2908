//! Format-specific intermediate values exchanged with scribes.
//!
//! The text syntax uses plain strings; the tree syntaxes share a small
//! element tree wrapped in [`XmlElement`] and [`HtmlElement`], and jCard
//! values wrap JSON arrays.

use serde_json::Value;

use crate::core::VCardDataType;

/// The xCard namespace.
pub const VCARD_NS: &str = "urn:ietf:params:xml:ns:vcard-4.0";

/// Name of the xCard element wrapping a property's parameters.
pub const PARAMETERS_ELEMENT: &str = "parameters";

/// A node of a parsed or generated tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// A generic element: local name, attributes and children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub namespace: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value.into(),
            None => self.attributes.push((name, value.into())),
        }
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    pub fn push_element(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }

    /// Child elements, in order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Child elements with the given local name (case-insensitive).
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements()
            .filter(move |e| e.name.eq_ignore_ascii_case(name))
    }

    /// Concatenated text of all descendants.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }

    /// Depth-first descendants (excluding `self`).
    #[must_use]
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        for child in self.elements() {
            out.push(child);
            out.extend(child.descendants());
        }
        out
    }
}

/// An xCard property element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement(Element);

impl XmlElement {
    /// Creates an empty element in the vCard namespace.
    #[must_use]
    pub fn new(local_name: impl Into<String>) -> Self {
        let mut element = Element::new(local_name);
        element.namespace = Some(VCARD_NS.to_string());
        Self(element)
    }

    #[must_use]
    pub fn from_element(element: Element) -> Self {
        Self(element)
    }

    #[must_use]
    pub fn element(&self) -> &Element {
        &self.0
    }

    #[must_use]
    pub fn into_element(self) -> Element {
        self.0
    }

    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.0.name
    }

    /// Appends `<name>value</name>`.
    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        let mut child = Element::new(name);
        child.namespace.clone_from(&self.0.namespace);
        child.push_text(value);
        self.0.push_element(child);
    }

    /// Appends one `<name>` child per value.
    pub fn append_all<I, S>(&mut self, name: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for value in values {
            self.append(name, value);
        }
    }

    /// Appends `<data-type>value</data-type>`, or `<unknown>` without a type.
    pub fn append_typed(&mut self, data_type: Option<&VCardDataType>, value: impl Into<String>) {
        let name = data_type.map_or("unknown", VCardDataType::name).to_string();
        self.append(&name, value);
    }

    /// Text of the first child named `name`.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<String> {
        self.0.elements_named(name).next().map(Element::text)
    }

    /// Texts of all children named `name`.
    #[must_use]
    pub fn all(&self, name: &str) -> Vec<String> {
        self.0.elements_named(name).map(Element::text).collect()
    }

    /// The first value child other than the parameters wrapper, with its
    /// data type (`None` for `<unknown>` and unregistered names).
    #[must_use]
    pub fn first_typed_value(&self) -> Option<(Option<VCardDataType>, String)> {
        self.0
            .elements()
            .find(|e| !e.name.eq_ignore_ascii_case(PARAMETERS_ELEMENT))
            .map(|e| {
                let data_type = (!e.name.eq_ignore_ascii_case("unknown"))
                    .then(|| VCardDataType::get(&e.name));
                (data_type, e.text())
            })
    }

    /// The first child whose name is one of `data_types`.
    #[must_use]
    pub fn first_of(&self, data_types: &[VCardDataType]) -> Option<(VCardDataType, String)> {
        self.0.elements().find_map(|e| {
            data_types
                .iter()
                .find(|dt| dt.name().eq_ignore_ascii_case(&e.name))
                .map(|dt| (dt.clone(), e.text()))
        })
    }
}

/// An hCard element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlElement(Element);

/// Elements whose URL-bearing attribute is the value of URI properties.
const URL_ATTRIBUTES: [(&str, &str); 6] = [
    ("a", "href"),
    ("area", "href"),
    ("link", "href"),
    ("img", "src"),
    ("object", "data"),
    ("audio", "src"),
];

impl HtmlElement {
    /// Creates `<tag class="class">`.
    #[must_use]
    pub fn new(tag: &str, class: &str) -> Self {
        let mut element = Element::new(tag.to_ascii_lowercase());
        element.set_attr("class", class);
        Self(element)
    }

    #[must_use]
    pub fn from_element(element: Element) -> Self {
        Self(element)
    }

    #[must_use]
    pub fn element(&self) -> &Element {
        &self.0
    }

    pub fn element_mut(&mut self) -> &mut Element {
        &mut self.0
    }

    #[must_use]
    pub fn into_element(self) -> Element {
        self.0
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.0.name
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.0.attr(name)
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        self.0.set_attr(name, value);
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.0.push_text(text);
    }

    /// Appends text, turning newlines into `<br>` elements.
    pub fn push_multiline(&mut self, text: &str) {
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.0.push_element(Element::new("br"));
            }
            if !line.is_empty() {
                self.0.push_text(line);
            }
        }
    }

    /// Appends `<tag class="class">text</tag>`.
    pub fn append_child(&mut self, tag: &str, class: &str, text: impl Into<String>) {
        let mut child = Self::new(tag, class);
        child.push_text(text);
        self.0.push_element(child.0);
    }

    #[must_use]
    pub fn classes(&self) -> Vec<String> {
        element_classes(&self.0)
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        has_class(&self.0, class)
    }

    /// Descendants carrying `class`, outermost first.
    #[must_use]
    pub fn with_class(&self, class: &str) -> Vec<Self> {
        self.0
            .descendants()
            .into_iter()
            .filter(|e| has_class(e, class))
            .cloned()
            .map(Self)
            .collect()
    }

    /// The text value of the element following hCard rules.
    ///
    /// `.value` descendants win; otherwise `abbr@title`, then the element's
    /// own text with `<br>` as a newline and whitespace collapsed.
    #[must_use]
    pub fn value(&self) -> String {
        let values = self.with_class("value");
        if !values.is_empty() {
            return values.iter().map(Self::value).collect::<String>();
        }
        if self.tag() == "abbr"
            && let Some(title) = self.attr("title")
        {
            return title.to_string();
        }
        let mut raw = String::new();
        html_text(&self.0, &mut raw);
        collapse_whitespace(&raw)
    }

    /// The URL-bearing attribute (`a@href`, `img@src`, `object@data`, ...)
    /// or, failing that, [`value`](Self::value).
    #[must_use]
    pub fn uri_value(&self) -> String {
        URL_ATTRIBUTES
            .iter()
            .find(|(tag, _)| *tag == self.tag())
            .and_then(|(_, attr)| self.attr(attr))
            .map_or_else(|| self.value(), str::to_string)
    }

    /// Lowercased values of `.type` descendants.
    #[must_use]
    pub fn types(&self) -> Vec<String> {
        self.with_class("type")
            .iter()
            .map(|t| t.value().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

pub(crate) fn element_classes(element: &Element) -> Vec<String> {
    element
        .attr("class")
        .map(|c| c.split_whitespace().map(str::to_ascii_lowercase).collect())
        .unwrap_or_default()
}

pub(crate) fn has_class(element: &Element, class: &str) -> bool {
    element
        .attr("class")
        .is_some_and(|c| c.split_whitespace().any(|x| x.eq_ignore_ascii_case(class)))
}

fn html_text(element: &Element, out: &mut String) {
    for child in &element.children {
        match child {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) if e.name == "br" => out.push('\n'),
            Node::Element(e) if e.name == "script" || e.name == "style" => {}
            Node::Element(e) => html_text(e, out),
        }
    }
}

/// Collapses runs of whitespace into one space per line and trims lines.
fn collapse_whitespace(raw: &str) -> String {
    raw.split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// The values of one jCard property after its name, parameters and type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JCardValue {
    values: Vec<Value>,
}

impl JCardValue {
    /// A single value.
    #[must_use]
    pub fn single(value: impl Into<Value>) -> Self {
        Self {
            values: vec![value.into()],
        }
    }

    /// Several text values (e.g. CATEGORIES).
    #[must_use]
    pub fn multi<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(|v| Value::String(v.into())).collect(),
        }
    }

    /// One structured value: components with zero, one or many texts.
    #[must_use]
    pub fn structured(components: Vec<Vec<String>>) -> Self {
        let array = components
            .into_iter()
            .map(|mut component| match component.len() {
                0 => Value::String(String::new()),
                1 => Value::String(component.remove(0)),
                _ => Value::Array(component.into_iter().map(Value::String).collect()),
            })
            .collect();
        Self {
            values: vec![Value::Array(array)],
        }
    }

    #[must_use]
    pub fn from_values(values: Vec<Value>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// The first value as text; arrays yield their first element.
    #[must_use]
    pub fn as_single(&self) -> String {
        self.values.first().map(scalar_text).unwrap_or_default()
    }

    /// Every value as text, flattening arrays.
    #[must_use]
    pub fn as_multi(&self) -> Vec<String> {
        let mut out = Vec::new();
        for value in &self.values {
            match value {
                Value::Array(items) => out.extend(items.iter().map(scalar_text)),
                other => out.push(scalar_text(other)),
            }
        }
        out
    }

    /// Components of a structured value.
    ///
    /// Accepts the array form, or several top-level values as components.
    #[must_use]
    pub fn as_structured(&self) -> Vec<Vec<String>> {
        let items: &[Value] = match self.values.as_slice() {
            [Value::Array(items)] => items,
            other => other,
        };
        items
            .iter()
            .map(|item| match item {
                Value::Array(values) => values
                    .iter()
                    .map(scalar_text)
                    .filter(|s| !s.is_empty())
                    .collect(),
                other => {
                    let text = scalar_text(other);
                    if text.is_empty() { Vec::new() } else { vec![text] }
                }
            })
            .collect()
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items.first().map(scalar_text).unwrap_or_default(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Object(_) => value.to_string(),
    }
}
