#![forbid(unsafe_code)]

//! URI resolution for XML-DSig references.
//!
//! Handles:
//! - Empty URI ("") — the entire document minus comments
//! - Same-document references ("#id") — the identified subtree minus comments
//!
//! External references are rejected.

use std::collections::HashMap;
use tsledit_core::Error;
use tsledit_xml::xpath;
use tsledit_xml::NodeSet;

/// Resolve a reference URI to the node set it selects.
pub fn resolve_uri(
    uri: &str,
    doc: &roxmltree::Document<'_>,
    id_map: &HashMap<String, roxmltree::NodeId>,
) -> Result<NodeSet, Error> {
    if uri.is_empty() {
        Ok(NodeSet::all_without_comments(doc))
    } else if let Some(id) = xpath::parse_same_document_ref(uri) {
        let node = xpath::resolve_id(doc, id_map, id)?;
        Ok(NodeSet::tree_without_comments(node))
    } else {
        Err(Error::InvalidUri(format!("external URI not supported: {uri}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsledit_xml::XmlDocument;

    #[test]
    fn resolves_empty_and_fragment_uris() {
        let xml = r#"<r><!--c--><a Id="x"><b/></a></r>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let ids = XmlDocument::build_id_map(&doc);

        let whole = resolve_uri("", &doc, &ids).unwrap();
        assert_eq!(whole.len(), NodeSet::all(&doc).len() - 1);

        let subtree = resolve_uri("#x", &doc, &ids).unwrap();
        assert_eq!(subtree.len(), 2);

        assert!(matches!(
            resolve_uri("#missing", &doc, &ids),
            Err(Error::InvalidUri(_))
        ));
        assert!(matches!(
            resolve_uri("http://example.com/tsl.xml", &doc, &ids),
            Err(Error::InvalidUri(_))
        ));
    }
}
