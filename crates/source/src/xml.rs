//! XML parse collaborator: text to an owned [`XmlDocument`].

use crate::error::SourceError;
use folio_types::{XmlDocument, XmlElement, XmlNode};

/// Parses XML text into an owned document tree.
///
/// Whitespace-only text between elements is dropped; names are local names
/// (namespace prefixes are not kept).
pub fn parse_xml(text: &str) -> Result<XmlDocument, SourceError> {
    let doc = roxmltree::Document::parse(text)?;
    Ok(XmlDocument::new(convert_element(doc.root_element())))
}

fn convert_element(node: roxmltree::Node<'_, '_>) -> XmlElement {
    let mut element = XmlElement::new(node.tag_name().name());
    for attr in node.attributes() {
        element = element.with_attribute(attr.name(), attr.value());
    }
    for child in node.children() {
        if child.is_element() {
            element.push(XmlNode::Element(convert_element(child)));
        } else if child.is_text()
            && let Some(text) = child.text()
            && !text.trim().is_empty()
        {
            element.push(XmlNode::Text(text.to_string()));
        }
    }
    element
}
