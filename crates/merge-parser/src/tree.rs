// crates/merge-parser/src/tree.rs
// ============================================================================
// Module: Generic XML Element Tree
// Description: Namespace-agnostic DOM-lite reader shared by every per-type
//              decoder.
// Purpose: Give the twelve object decoders (spec §4.2) a common, forgiving
//          tree shape instead of hand-rolling event handling per type.
// Dependencies: quick-xml
// ============================================================================

//! ## Overview
//! Appian's object XML is vendor-defined and unversioned from the analyzer's
//! point of view (spec §9). Rather than derive a strict serde schema per
//! object type, the parser builds a permissive element tree once per entry
//! and lets each decoder pull the fields it recognizes, ignoring the rest.
//! This is what "unrecognized elements are preserved... but never
//! participate in comparisons" (spec §4.2) looks like in practice: the tree
//! itself keeps everything, each decoder just doesn't look at the parts it
//! doesn't know.

use std::collections::BTreeMap;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

/// One element of the decoded tree: its local (namespace-stripped) name,
/// attributes, directly-contained text, and child elements in document order.
#[derive(Debug, Clone, Default)]
pub struct XmlElement {
    /// Local element name, namespace prefix stripped.
    pub name: String,
    /// Attribute map, namespace prefixes stripped from keys.
    pub attrs: BTreeMap<String, String>,
    /// Concatenated text directly under this element (not nested further).
    pub text: String,
    /// Child elements, in document order.
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Returns the first child with the given local name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Returns the text of the first child with the given local name.
    #[must_use]
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).map(|c| c.text.clone())
    }

    /// Iterates all children with the given local name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Self> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Returns an attribute value by local name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// Parses a complete XML document into its root [`XmlElement`].
///
/// # Errors
/// Returns the underlying `quick_xml` error on malformed markup (unclosed
/// tags, invalid byte sequences the decoder cannot recover from).
pub fn parse_tree(xml: &[u8]) -> Result<XmlElement, quick_xml::Error> {
    let text = String::from_utf8_lossy(xml);
    let mut reader = Reader::from_str(&text);
    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = vec![XmlElement::default()];

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => stack.push(element_from_start(e)),
            Event::Empty(ref e) => {
                let elem = element_from_start(e);
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(elem);
                }
            }
            Event::End(_) => {
                if stack.len() > 1 {
                    if let Some(finished) = stack.pop() {
                        if let Some(parent) = stack.last_mut() {
                            parent.children.push(finished);
                        }
                    }
                }
            }
            Event::Text(ref e) => {
                let chunk = e.unescape()?;
                push_text(&mut stack, chunk.trim());
            }
            Event::CData(ref e) => {
                let chunk = String::from_utf8_lossy(e.as_ref());
                push_text(&mut stack, &chunk);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let mut root = stack.pop().unwrap_or_default();
    Ok(root.children.pop().unwrap_or(root))
}

fn push_text(stack: &mut [XmlElement], chunk: &str) {
    if chunk.is_empty() {
        return;
    }
    if let Some(top) = stack.last_mut() {
        top.text.push_str(chunk);
    }
}

fn element_from_start(e: &quick_xml::events::BytesStart) -> XmlElement {
    let mut elem = XmlElement { name: local_name(e.name().as_ref()), ..XmlElement::default() };
    for attr in e.attributes().flatten() {
        let key = local_name(attr.key.as_ref());
        if let Ok(value) = attr.unescape_value() {
            elem.attrs.insert(key, value.into_owned());
        }
    }
    elem
}

/// Strips a namespace prefix from an element or attribute name.
fn local_name(raw: &[u8]) -> String {
    let s = String::from_utf8_lossy(raw);
    match s.rsplit_once(':') {
        Some((_, local)) => local.to_string(),
        None => s.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_nested_children_and_attrs() {
        let xml = br#"<interface id="x"><uuid>abc</uuid><parameters><parameter><name>p1</name></parameter></parameters></interface>"#;
        let root = parse_tree(xml).expect("valid xml");
        assert_eq!(root.name, "interface");
        assert_eq!(root.attr("id"), Some("x"));
        assert_eq!(root.child_text("uuid"), Some("abc".to_string()));
        let params = root.child("parameters").expect("parameters element");
        assert_eq!(params.children_named("parameter").count(), 1);
    }

    #[test]
    fn strips_namespace_prefixes() {
        let xml = br#"<ns:rule><ns:uuid>u1</ns:uuid></ns:rule>"#;
        let root = parse_tree(xml).expect("valid xml");
        assert_eq!(root.name, "rule");
        assert_eq!(root.child_text("uuid"), Some("u1".to_string()));
    }

    #[test]
    fn reads_cdata_text() {
        let xml = br#"<rule><code><![CDATA[a!localVariables()]]></code></rule>"#;
        let root = parse_tree(xml).expect("valid xml");
        assert_eq!(root.child_text("code"), Some("a!localVariables()".to_string()));
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let xml = b"<rule><unterminated>";
        assert!(parse_tree(xml).is_err());
    }
}
