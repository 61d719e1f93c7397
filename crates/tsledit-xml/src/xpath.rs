#![forbid(unsafe_code)]

//! Minimal same-document reference resolution for XML-DSig processing.
//!
//! Only same-document URI references (`#id-value`) are supported, the
//! only form a trust list signature uses besides `""`.

use std::collections::HashMap;
use tsledit_core::Error;

/// Parse a same-document reference (e.g., `#foo` → `foo`).
pub fn parse_same_document_ref(uri: &str) -> Option<&str> {
    uri.strip_prefix('#')
}

/// Resolve an ID value in a parsed document using a pre-built ID map.
pub fn resolve_id<'a>(
    doc: &'a roxmltree::Document<'a>,
    id_map: &HashMap<String, roxmltree::NodeId>,
    id: &str,
) -> Result<roxmltree::Node<'a, 'a>, Error> {
    id_map
        .get(id)
        .and_then(|nid| doc.get_node(*nid))
        .ok_or_else(|| Error::InvalidUri(format!("ID not found: {id}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_document_refs() {
        assert_eq!(parse_same_document_ref("#tsl-1"), Some("tsl-1"));
        assert_eq!(parse_same_document_ref("http://x"), None);
    }

    #[test]
    fn unknown_id_is_invalid_uri() {
        let doc = roxmltree::Document::parse("<a Id='x'><b/></a>").unwrap();
        let map = crate::XmlDocument::build_id_map(&doc);
        assert!(resolve_id(&doc, &map, "x").is_ok());
        assert!(matches!(
            resolve_id(&doc, &map, "y"),
            Err(Error::InvalidUri(_))
        ));
    }
}
