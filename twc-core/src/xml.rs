//! Minimal owned XML document tree for `doctype=xml` responses.

use quick_xml::{
    Reader,
    escape::resolve_predefined_entity,
    events::{BytesStart, Event},
};

use crate::{
    error::{Error, Result},
    model::Format,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// First direct child element called `name`.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.name == name)
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|n| match n {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// Concatenated direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                XmlNode::Text(t) => Some(t.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }
}

/// Parse a document and return its root element.
///
/// Whitespace-only text between elements is dropped; other text is kept verbatim
/// with entity and character references resolved.
pub fn parse(input: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(input);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut text = String::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader.read_event().map_err(xml_error)?;

        match event {
            Event::Start(start) => {
                flush_text(&mut stack, &mut text);
                ensure_single_root(&root, &stack)?;
                stack.push(open_element(&start)?);
            }
            Event::Empty(start) => {
                flush_text(&mut stack, &mut text);
                ensure_single_root(&root, &stack)?;
                let element = open_element(&start)?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                flush_text(&mut stack, &mut text);
                let element = stack
                    .pop()
                    .ok_or_else(|| xml_error("closing tag without an open element"))?;
                attach(&mut stack, &mut root, element);
            }
            Event::Text(t) => {
                let decoded = t.decode().map_err(xml_error)?;
                push_text(&stack, &mut text, &decoded)?;
            }
            Event::CData(c) => {
                let decoded = c.decode().map_err(xml_error)?;
                push_text(&stack, &mut text, &decoded)?;
            }
            Event::GeneralRef(r) => {
                let resolved = match r.resolve_char_ref().map_err(xml_error)? {
                    Some(ch) => ch.to_string(),
                    None => {
                        let name = r.decode().map_err(xml_error)?;
                        resolve_predefined_entity(&name)
                            .ok_or_else(|| xml_error(format!("unknown entity '&{name};'")))?
                            .to_string()
                    }
                };
                push_text(&stack, &mut text, &resolved)?;
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes carry no data.
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(xml_error(format!("unclosed element <{}>", open.name)));
    }

    root.ok_or_else(|| xml_error("document has no root element"))
}

fn open_element(start: &BytesStart<'_>) -> Result<XmlElement> {
    let name = utf8(start.name().as_ref())?;

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(xml_error)?;
        let key = utf8(attr.key.as_ref())?;
        let value = attr.unescape_value().map_err(xml_error)?.into_owned();
        attributes.push((key, value));
    }

    Ok(XmlElement { name, attributes, children: Vec::new() })
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None => *root = Some(element),
    }
}

fn ensure_single_root(root: &Option<XmlElement>, stack: &[XmlElement]) -> Result<()> {
    if root.is_some() && stack.is_empty() {
        return Err(xml_error("multiple root elements"));
    }
    Ok(())
}

fn push_text(stack: &[XmlElement], buf: &mut String, text: &str) -> Result<()> {
    if stack.is_empty() {
        if text.trim().is_empty() {
            return Ok(());
        }
        return Err(xml_error("text outside of the root element"));
    }
    buf.push_str(text);
    Ok(())
}

fn flush_text(stack: &mut [XmlElement], buf: &mut String) {
    if buf.trim().is_empty() {
        buf.clear();
        return;
    }
    if let Some(parent) = stack.last_mut() {
        parent.children.push(XmlNode::Text(std::mem::take(buf)));
    }
}

fn utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes).map(str::to_owned).map_err(xml_error)
}

fn xml_error(err: impl std::fmt::Display) -> Error {
    Error::decode(Format::Xml, err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_with_attributes() {
        let doc = parse(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <weather ver="2.0">
              <loc id="UKXX0085"><dnam>London, United Kingdom</dnam><tm>9:30 PM</tm></loc>
              <cc/>
            </weather>"#,
        )
        .expect("valid document");

        assert_eq!(doc.name, "weather");
        assert_eq!(doc.attr("ver"), Some("2.0"));

        let loc = doc.child("loc").expect("loc element");
        assert_eq!(loc.attr("id"), Some("UKXX0085"));
        assert_eq!(loc.child("dnam").map(XmlElement::text).as_deref(), Some("London, United Kingdom"));
        assert_eq!(doc.elements().map(|e| e.name.as_str()).collect::<Vec<_>>(), ["loc", "cc"]);
    }

    #[test]
    fn resolves_entities_in_text_and_attributes() {
        let doc = parse(r#"<t a="x &amp; y">Rain &amp; wind &#176;C<![CDATA[<raw>]]></t>"#).unwrap();

        assert_eq!(doc.attr("a"), Some("x & y"));
        assert_eq!(doc.text(), "Rain & wind °C<raw>");
    }

    #[test]
    fn mismatched_tags_are_decode_errors() {
        let err = parse("<a><b></a>").unwrap_err();
        assert!(matches!(err, Error::DecodeError { format: Format::Xml, .. }));
    }

    #[test]
    fn unclosed_and_empty_documents_are_decode_errors() {
        assert!(matches!(parse("<a><b></b>"), Err(Error::DecodeError { .. })));
        assert!(matches!(parse("   "), Err(Error::DecodeError { .. })));
        assert!(matches!(parse("not xml"), Err(Error::DecodeError { .. })));
        assert!(matches!(parse("<a/><b/>"), Err(Error::DecodeError { .. })));
    }
}
