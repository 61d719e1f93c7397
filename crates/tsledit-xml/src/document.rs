#![forbid(unsafe_code)]

//! XML document wrapper over roxmltree with ID attribute registration.

use std::collections::HashMap;
use tsledit_core::Error;

/// An owned XML document.  Stores the text and pre-computed metadata.
///
/// To work with the parsed tree, call [`XmlDocument::parse_doc`] which
/// returns a temporary `roxmltree::Document` borrowing from the text.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    text: String,
}

impl XmlDocument {
    /// Parse and validate XML from a string, taking ownership.
    pub fn parse(text: String) -> Result<Self, Error> {
        roxmltree::Document::parse_with_options(&text, crate::parsing_options())
            .map_err(|e| Error::XmlParse(e.to_string()))?;
        Ok(Self { text })
    }

    /// Get the raw XML text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parse the document and return a temporary `roxmltree::Document`.
    ///
    /// Call this once at the top of a processing pipeline and pass the
    /// resulting document down through the call chain.
    pub fn parse_doc(&self) -> Result<roxmltree::Document<'_>, Error> {
        roxmltree::Document::parse_with_options(&self.text, crate::parsing_options())
            .map_err(|e| Error::XmlParse(e.to_string()))
    }

    /// Build the ID → NodeId mapping for a parsed document.
    pub fn build_id_map<'a>(doc: &'a roxmltree::Document<'a>) -> HashMap<String, roxmltree::NodeId> {
        let default_attrs = ["Id", "ID", "id"];
        let mut map = HashMap::new();
        for node in doc.descendants().filter(|n| n.is_element()) {
            for attr_name in &default_attrs {
                if let Some(val) = node.attribute(*attr_name) {
                    map.insert(val.to_owned(), node.id());
                }
            }
        }
        map
    }
}

/// True if `node` is an element named `{ns}local_name`.
pub fn is_element(node: &roxmltree::Node<'_, '_>, ns: &str, local_name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local_name
        && node.tag_name().namespace().unwrap_or("") == ns
}

/// First child element named `{ns}local_name`.
pub fn find_child<'a, 'input>(
    parent: roxmltree::Node<'a, 'input>,
    ns: &str,
    local_name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    parent.children().find(|n| is_element(n, ns, local_name))
}

/// All child elements named `{ns}local_name`, in document order.
pub fn find_children<'a, 'input>(
    parent: roxmltree::Node<'a, 'input>,
    ns: &'a str,
    local_name: &'a str,
) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> + 'a
where
    'input: 'a,
{
    parent
        .children()
        .filter(move |n| is_element(n, ns, local_name))
}

/// Text content of a token-typed element (URI, date, number, base64),
/// with surrounding whitespace trimmed.
pub fn text_content(node: roxmltree::Node<'_, '_>) -> String {
    raw_text(node).trim().to_owned()
}

/// Concatenated direct text children exactly as parsed. Character
/// references such as `&#13;` survive.
pub fn raw_text(node: roxmltree::Node<'_, '_>) -> String {
    let mut text = String::new();
    for child in node.children().filter(|c| c.is_text()) {
        text.push_str(child.text().unwrap_or(""));
    }
    text
}

/// The prefix an element was written with, or `None` for an unprefixed name.
///
/// roxmltree resolves names to namespace URIs and drops the prefix, but
/// exclusive canonicalization must reproduce it, so it is read back from
/// the source text.
pub fn element_prefix<'input>(node: &roxmltree::Node<'_, 'input>) -> Option<&'input str> {
    let input = node.document().input_text();
    let start = node.range().start + 1;
    let rest = input.get(start..)?;
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(rest.len());
    let qname = &rest[..end];
    qname.split_once(':').map(|(prefix, _)| prefix)
}

/// The prefix an attribute was written with, or `None`.
pub fn attribute_prefix<'input>(
    doc: &roxmltree::Document<'input>,
    attr: &roxmltree::Attribute<'_, 'input>,
) -> Option<&'input str> {
    let qname = doc.input_text().get(attr.range_qname())?;
    qname.split_once(':').map(|(prefix, _)| prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_xml() {
        let err = XmlDocument::parse("<a><b></a>".into()).unwrap_err();
        assert!(matches!(err, Error::XmlParse(_)));
    }

    #[test]
    fn id_map_finds_registered_ids() {
        let xml = XmlDocument::parse(r#"<r Id="one"><c ID="two"/><c id="three"/></r>"#.into())
            .unwrap();
        let doc = xml.parse_doc().unwrap();
        let map = XmlDocument::build_id_map(&doc);
        assert_eq!(map.len(), 3);
        assert!(map.contains_key("two"));
    }

    #[test]
    fn prefixes_are_read_from_source() {
        let text = r#"<tsl:Root xmlns:tsl="urn:t" xmlns:x="urn:x" x:a="1" b="2"><Plain/></tsl:Root>"#;
        let doc = roxmltree::Document::parse(text).unwrap();
        let root = doc.root_element();
        assert_eq!(element_prefix(&root), Some("tsl"));
        let prefixes: Vec<_> = root
            .attributes()
            .map(|a| attribute_prefix(&doc, &a))
            .collect();
        assert_eq!(prefixes, vec![Some("x"), None]);
        let plain = root.first_element_child().unwrap();
        assert_eq!(element_prefix(&plain), None);
    }

    #[test]
    fn child_lookup_and_text() {
        let text = r#"<r xmlns="urn:n"><a> hi </a><b/><a>there</a></r>"#;
        let doc = roxmltree::Document::parse(text).unwrap();
        let root = doc.root_element();
        assert_eq!(find_children(root, "urn:n", "a").count(), 2);
        let first = find_child(root, "urn:n", "a").unwrap();
        assert_eq!(text_content(first), "hi");
        assert_eq!(raw_text(first), " hi ");
        assert!(find_child(root, "urn:other", "a").is_none());
    }

    #[test]
    fn raw_text_keeps_character_references() {
        let text = "<r>A &amp; B \"q\" &#13;</r>";
        let doc = roxmltree::Document::parse(text).unwrap();
        assert_eq!(raw_text(doc.root_element()), "A & B \"q\" \r");
        assert_eq!(text_content(doc.root_element()), "A & B \"q\"");
    }
}
