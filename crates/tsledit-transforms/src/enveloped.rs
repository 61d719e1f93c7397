#![forbid(unsafe_code)]

//! Enveloped signature transform.
//!
//! Removes the `<Signature>` element that contains the reference from the
//! node set.

use crate::pipeline::{Transform, TransformData};
use tsledit_core::{algorithm, Error};
use tsledit_xml::nodeset::node_index;
use tsledit_xml::NodeSet;

/// Drops the enveloping `<Signature>` element and its descendants.
pub struct EnvelopedSignatureTransform {
    /// Node index of the `<Signature>` element in the parsed document.
    signature_node_index: usize,
}

impl EnvelopedSignatureTransform {
    /// Create with the node index of the Signature element to remove.
    pub fn new(signature_node_index: usize) -> Self {
        Self { signature_node_index }
    }

    /// Create from a parsed `<Signature>` node.
    pub fn from_node(signature: roxmltree::Node<'_, '_>) -> Self {
        Self::new(node_index(signature))
    }
}

impl Transform for EnvelopedSignatureTransform {
    fn uri(&self) -> &str {
        algorithm::ENVELOPED_SIGNATURE
    }

    fn execute(&self, input: TransformData) -> Result<TransformData, Error> {
        match input {
            TransformData::Xml { xml_text, node_set } => {
                let doc = roxmltree::Document::parse_with_options(
                    &xml_text,
                    tsledit_xml::parsing_options(),
                )
                .map_err(|e| Error::XmlParse(e.to_string()))?;

                let signature = doc
                    .descendants()
                    .find(|n| node_index(*n) == self.signature_node_index)
                    .ok_or_else(|| {
                        Error::Transform("enveloped signature node not found".into())
                    })?;

                let mut ns = node_set.unwrap_or_else(|| NodeSet::all(&doc));
                ns.remove_subtree(signature);
                drop(doc);

                Ok(TransformData::Xml {
                    xml_text,
                    node_set: Some(ns),
                })
            }
            TransformData::Binary(_) => Err(Error::Transform(
                "enveloped-signature transform requires XML input".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsledit_c14n::C14nMode;
    use tsledit_core::ns;

    #[test]
    fn signature_subtree_is_removed() {
        let xml = format!(
            r#"<r Id="r"><a>1</a><ds:Signature xmlns:ds="{}"><ds:SignedInfo/></ds:Signature></r>"#,
            ns::DSIG
        );
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let sig = doc
            .descendants()
            .find(|n| n.tag_name().name() == ns::node::SIGNATURE)
            .unwrap();
        let transform = EnvelopedSignatureTransform::from_node(sig);
        let set = NodeSet::tree_without_comments(doc.root_element());
        drop(doc);

        let out = transform
            .execute(TransformData::Xml {
                xml_text: xml.clone(),
                node_set: Some(set),
            })
            .unwrap();
        let TransformData::Xml { xml_text, node_set } = out else {
            panic!("expected XML output");
        };
        let bytes =
            tsledit_c14n::canonicalize(&xml_text, C14nMode::Exclusive, node_set.as_ref(), &[])
                .unwrap();
        assert_eq!(bytes, br#"<r Id="r"><a>1</a></r>"#);
    }

    #[test]
    fn binary_input_is_rejected() {
        let transform = EnvelopedSignatureTransform::new(0);
        assert!(matches!(
            transform.execute(TransformData::Binary(vec![1, 2])),
            Err(Error::Transform(_))
        ));
    }
}
