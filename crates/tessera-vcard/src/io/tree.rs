//! Element trees for xCard and hCard documents.
//!
//! Both syntaxes are read into the [`Element`] tree scribes work with and
//! written back from it. xCard is parsed strictly. hCard is HTML found in the
//! wild, so its parse closes unclosed tags, knows the void elements and keeps
//! unknown entities as literal text.

use std::borrow::Cow;
use std::io::Write;

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{VCardError, VCardResult};
use crate::scribe::wire::{Element, Node};

/// Name of the synthetic element holding a parsed document's top level.
pub(crate) const DOCUMENT: &str = "#document";

/// Deepest element nesting kept in a tree.
///
/// xCard deeper than this is an error. hCard elements past it are kept
/// empty, and their contents go to the deepest open element.
pub(crate) const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dialect {
    Xml,
    Html,
}

const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

struct Frame {
    element: Element,
    /// Namespace declarations made on this element, `""` for the default.
    namespaces: Vec<(String, String)>,
}

struct TreeBuilder {
    dialect: Dialect,
    stack: Vec<Frame>,
}

impl TreeBuilder {
    fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            stack: vec![Frame {
                element: Element::new(DOCUMENT),
                namespaces: Vec::new(),
            }],
        }
    }

    fn top(&mut self) -> &mut Element {
        let last = self.stack.len() - 1;
        &mut self.stack[last].element
    }

    fn resolve(&self, prefix: &str, declared: &[(String, String)]) -> Option<String> {
        declared
            .iter()
            .chain(self.stack.iter().rev().flat_map(|f| f.namespaces.iter()))
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.clone())
            .filter(|uri| !uri.is_empty())
    }

    fn open(&mut self, start: &BytesStart<'_>, empty: bool) -> VCardResult<()> {
        let html = self.dialect == Dialect::Html;
        let mut name = std::str::from_utf8(start.local_name().as_ref())?.to_owned();
        if html {
            name.make_ascii_lowercase();
        }
        let mut element = Element::new(name);
        let mut declared = Vec::new();

        let attributes = if html {
            start.html_attributes()
        } else {
            start.attributes()
        };
        for attr in attributes.flatten() {
            let key = std::str::from_utf8(attr.key.as_ref())?;
            let raw = std::str::from_utf8(&attr.value)?;
            let value = quick_xml::escape::unescape(raw)
                .map_or_else(|_| raw.to_string(), Cow::into_owned);
            if let Some(prefix) = key.strip_prefix("xmlns:") {
                declared.push((prefix.to_string(), value));
            } else if key == "xmlns" {
                declared.push((String::new(), value));
            } else if html {
                element.attributes.push((key.to_ascii_lowercase(), value));
            } else {
                element.attributes.push((key.to_string(), value));
            }
        }

        if !html {
            let qname = start.name();
            let prefix = match qname.prefix() {
                Some(p) => std::str::from_utf8(p.as_ref())?.to_owned(),
                None => String::new(),
            };
            element.namespace = self.resolve(&prefix, &declared);
        }

        // The document frame does not count towards the depth.
        let full = self.stack.len() > MAX_DEPTH;
        if full && !html && !empty {
            return Err(VCardError::Xml(format!("elements nested deeper than {MAX_DEPTH}")));
        }
        if empty || full || (html && is_void(&element.name)) {
            self.top().push_element(element);
        } else {
            self.stack.push(Frame {
                element,
                namespaces: declared,
            });
        }
        Ok(())
    }

    fn close(&mut self, name: &str) -> VCardResult<()> {
        match self.dialect {
            Dialect::Xml => {
                if self.stack.len() < 2 {
                    return Err(VCardError::Xml(format!("unexpected closing tag </{name}>")));
                }
                self.pop();
            }
            Dialect::Html => {
                let name = name.to_ascii_lowercase();
                let open = self
                    .stack
                    .iter()
                    .skip(1)
                    .rposition(|f| f.element.name == name);
                if let Some(index) = open {
                    while self.stack.len() > index + 1 {
                        self.pop();
                    }
                }
            }
        }
        Ok(())
    }

    fn pop(&mut self) {
        if let Some(frame) = self.stack.pop() {
            let mut element = frame.element;
            if self.dialect == Dialect::Xml && element.elements().next().is_some() {
                element
                    .children
                    .retain(|n| !matches!(n, Node::Text(t) if t.trim().is_empty()));
            }
            self.top().push_element(element);
        }
    }

    /// Appends text, merging with a preceding text node.
    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let top = self.top();
        if let Some(Node::Text(previous)) = top.children.last_mut() {
            previous.push_str(text);
        } else {
            top.push_text(text);
        }
    }

    fn finish(mut self) -> VCardResult<Element> {
        if self.dialect == Dialect::Xml && self.stack.len() > 1 {
            let open = &self.stack[self.stack.len() - 1].element.name;
            return Err(VCardError::Xml(format!("unclosed element <{open}>")));
        }
        while self.stack.len() > 1 {
            self.pop();
        }
        Ok(self
            .stack
            .pop()
            .map(|f| f.element)
            .unwrap_or_else(|| Element::new(DOCUMENT)))
    }
}

/// Resolves an entity reference's name to its text.
fn resolve_reference(name: &str, dialect: Dialect) -> Option<String> {
    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => number.parse().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }
    if let Some(text) = quick_xml::escape::resolve_predefined_entity(name) {
        return Some(text.to_string());
    }
    if dialect == Dialect::Xml {
        return None;
    }
    let text = match name {
        "nbsp" => "\u{a0}",
        "copy" => "\u{a9}",
        "reg" => "\u{ae}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        _ => return None,
    };
    Some(text.to_string())
}

/// Parses a document into a tree rooted at a synthetic [`DOCUMENT`] element.
///
/// ## Errors
/// For [`Dialect::Xml`], returns an error if the document is not well formed.
/// [`Dialect::Html`] stops at the first unrecoverable syntax error and keeps
/// what it has.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub(crate) fn parse(input: &[u8], dialect: Dialect) -> VCardResult<Element> {
    let mut reader = Reader::from_reader(input);
    if dialect == Dialect::Html {
        reader.config_mut().check_end_names = false;
    }

    let mut builder = TreeBuilder::new(dialect);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => builder.open(e, false)?,
            Ok(Event::Empty(ref e)) => builder.open(e, true)?,
            Ok(Event::End(ref e)) => {
                let name = std::str::from_utf8(e.local_name().as_ref())?.to_owned();
                builder.close(&name)?;
            }
            Ok(Event::Text(ref e)) => {
                let decoded = reader.decoder().decode(e.as_ref())?;
                builder.text(&decoded);
            }
            Ok(Event::CData(ref e)) => {
                let text = std::str::from_utf8(e.as_ref())?.to_owned();
                builder.text(&text);
            }
            Ok(Event::GeneralRef(ref e)) => {
                let name = reader.decoder().decode(e.as_ref())?;
                match resolve_reference(&name, dialect) {
                    Some(text) => builder.text(&text),
                    None if dialect == Dialect::Html => builder.text(&format!("&{name};")),
                    None => return Err(VCardError::Xml(format!("unknown entity &{name};"))),
                }
            }
            Ok(Event::Eof) => break,
            Err(e) if dialect == Dialect::Html => {
                tracing::warn!(
                    position = reader.buffer_position(),
                    "HTML syntax error, keeping the document read so far: {e}"
                );
                break;
            }
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }
    builder.finish()
}

/// Writes `element` and its subtree.
///
/// A namespace differing from `inherited` is declared with `xmlns`; HTML
/// output carries no namespaces.
pub(crate) fn write_element<W: Write>(
    writer: &mut Writer<W>,
    element: &Element,
    dialect: Dialect,
    inherited: Option<&str>,
) -> VCardResult<()> {
    let mut start = BytesStart::new(element.name.as_str());
    let namespace = match dialect {
        Dialect::Xml => element.namespace.as_deref(),
        Dialect::Html => None,
    };
    if let Some(ns) = namespace
        && Some(ns) != inherited
    {
        start.push_attribute(("xmlns", ns));
    }
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    let self_closing = match dialect {
        Dialect::Xml => element.children.is_empty(),
        Dialect::Html => is_void(&element.name),
    };
    if self_closing {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    let end = start.to_end().into_owned();
    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
            Node::Element(e) => write_element(writer, e, dialect, namespace.or(inherited))?,
        }
    }
    writer.write_event(Event::End(end))?;
    Ok(())
}
