#![forbid(unsafe_code)]

//! Exclusive Canonical XML 1.0 (exc-C14N).
//!
//! Algorithm URI: `http://www.w3.org/2001/10/xml-exc-c14n#`
//! With comments: `http://www.w3.org/2001/10/xml-exc-c14n#WithComments`
//!
//! Only "visibly utilized" namespace declarations are output.  A namespace is
//! visibly utilized if:
//! 1. Its prefix is used by the element's tag name, OR
//! 2. Its prefix is used by one of the element's attributes, OR
//! 3. The prefix appears in the InclusiveNamespaces PrefixList.

use crate::escape;
use crate::render::{Attr, NsDecl};
use roxmltree::{Node, NodeType};
use std::collections::{BTreeMap, HashSet};
use tsledit_core::{ns, Error};
use tsledit_xml::document::{attribute_prefix, element_prefix};
use tsledit_xml::NodeSet;

/// Canonicalize using Exclusive C14N 1.0.
pub fn canonicalize(
    doc: &roxmltree::Document<'_>,
    with_comments: bool,
    node_set: Option<&NodeSet>,
    inclusive_prefixes: &[String],
) -> Result<Vec<u8>, Error> {
    let inclusive_prefixes = inclusive_prefixes
        .iter()
        .map(|p| if p == "#default" { String::new() } else { p.clone() })
        .collect();
    let mut output = Vec::new();
    let ctx = ExcC14nContext {
        doc,
        with_comments,
        node_set,
        inclusive_prefixes,
    };
    ctx.process_node(doc.root(), &mut output, &BTreeMap::new())?;
    Ok(output)
}

struct ExcC14nContext<'a, 'input> {
    doc: &'a roxmltree::Document<'input>,
    with_comments: bool,
    node_set: Option<&'a NodeSet>,
    inclusive_prefixes: HashSet<String>,
}

impl<'a, 'input> ExcC14nContext<'a, 'input> {
    fn is_visible(&self, node: &Node<'_, '_>) -> bool {
        self.node_set.map_or(true, |set| set.contains(node))
    }

    fn process_node(
        &self,
        node: Node<'a, 'input>,
        output: &mut Vec<u8>,
        rendered_ns: &BTreeMap<String, String>,
    ) -> Result<(), Error> {
        match node.node_type() {
            NodeType::Root => {
                for child in node.children() {
                    self.process_node(child, output, rendered_ns)?;
                }
            }
            NodeType::Element => self.process_element(node, output, rendered_ns)?,
            NodeType::Text => {
                if self.is_visible(&node) {
                    let text = node.text().unwrap_or("");
                    output.extend_from_slice(escape::escape_text(text).as_bytes());
                }
            }
            NodeType::Comment => {
                if self.with_comments && self.is_visible(&node) {
                    let text = node.text().unwrap_or("");
                    self.wrap_top_level(node, output, |out| {
                        out.extend_from_slice(b"<!--");
                        out.extend_from_slice(text.as_bytes());
                        out.extend_from_slice(b"-->");
                    });
                }
            }
            NodeType::PI => {
                if self.is_visible(&node) {
                    if let Some(pi) = node.pi() {
                        self.wrap_top_level(node, output, |out| {
                            out.extend_from_slice(b"<?");
                            out.extend_from_slice(pi.target.as_bytes());
                            if let Some(value) = pi.value.filter(|v| !v.is_empty()) {
                                out.push(b' ');
                                out.extend_from_slice(escape::escape_pi(value).as_bytes());
                            }
                            out.extend_from_slice(b"?>");
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Comments and PIs outside the document element are separated from it
    /// by a line feed.
    fn wrap_top_level(
        &self,
        node: Node<'_, '_>,
        output: &mut Vec<u8>,
        render: impl FnOnce(&mut Vec<u8>),
    ) {
        let top_level = node
            .parent()
            .is_some_and(|p| p.node_type() == NodeType::Root);
        if top_level && node.prev_siblings().skip(1).any(|s| s.is_element()) {
            output.push(b'\n');
        }
        render(output);
        if top_level && node.next_siblings().skip(1).any(|s| s.is_element()) {
            output.push(b'\n');
        }
    }

    fn process_element(
        &self,
        node: Node<'a, 'input>,
        output: &mut Vec<u8>,
        rendered_ns: &BTreeMap<String, String>,
    ) -> Result<(), Error> {
        if !self.is_visible(&node) {
            // Invisible elements render nothing themselves; visible
            // descendants still see the nearest rendered bindings.
            for child in node.children() {
                self.process_node(child, output, rendered_ns)?;
            }
            return Ok(());
        }

        let elem_prefix = element_prefix(&node).unwrap_or("");
        let mut utilized: HashSet<&str> = HashSet::new();
        utilized.insert(elem_prefix);

        let mut attrs: Vec<Attr> = Vec::new();
        for attr in node.attributes() {
            let prefix = attribute_prefix(self.doc, &attr);
            let local = attr.name();
            let qualified_name = match prefix {
                Some(p) => {
                    utilized.insert(p);
                    format!("{p}:{local}")
                }
                None => local.to_owned(),
            };
            attrs.push(Attr {
                ns_uri: attr.namespace().unwrap_or("").to_owned(),
                local_name: local.to_owned(),
                qualified_name,
                value: attr.value().to_owned(),
            });
        }
        attrs.sort();
        for p in &self.inclusive_prefixes {
            utilized.insert(p.as_str());
        }

        let inscope = inscope_namespaces(&node);
        let mut ns_decls: Vec<NsDecl> = Vec::new();
        for prefix in utilized {
            if prefix == "xml" {
                continue;
            }
            match inscope.get(prefix) {
                Some(uri) => {
                    if rendered_ns.get(prefix) != Some(uri) {
                        ns_decls.push(NsDecl {
                            prefix: prefix.to_owned(),
                            uri: uri.clone(),
                        });
                    }
                }
                None if prefix.is_empty() => {
                    // Undeclare a default namespace an output ancestor rendered.
                    if rendered_ns.get("").is_some_and(|uri| !uri.is_empty()) {
                        ns_decls.push(NsDecl {
                            prefix: String::new(),
                            uri: String::new(),
                        });
                    }
                }
                None => {
                    return Err(Error::Canonicalization(format!(
                        "prefix '{prefix}' is not bound on element {}",
                        node.tag_name().name()
                    )))
                }
            }
        }
        ns_decls.sort();

        let elem_name = match element_prefix(&node) {
            Some(p) => format!("{p}:{}", node.tag_name().name()),
            None => node.tag_name().name().to_owned(),
        };

        output.push(b'<');
        output.extend_from_slice(elem_name.as_bytes());
        for decl in &ns_decls {
            output.extend_from_slice(decl.render().as_bytes());
        }
        for attr in &attrs {
            output.extend_from_slice(attr.render().as_bytes());
        }
        output.push(b'>');

        let mut child_rendered_ns = rendered_ns.clone();
        for decl in ns_decls {
            child_rendered_ns.insert(decl.prefix, decl.uri);
        }
        for child in node.children() {
            self.process_node(child, output, &child_rendered_ns)?;
        }

        output.extend_from_slice(b"</");
        output.extend_from_slice(elem_name.as_bytes());
        output.push(b'>');
        Ok(())
    }
}

/// In-scope namespace bindings of an element, keyed by prefix ("" for the
/// default namespace). The implicit `xml` binding and default-namespace
/// undeclarations are left out.
fn inscope_namespaces(node: &Node<'_, '_>) -> BTreeMap<String, String> {
    node.namespaces()
        .filter(|n| n.uri() != ns::XML && !n.uri().is_empty())
        .map(|n| (n.name().unwrap_or("").to_owned(), n.uri().to_owned()))
        .collect()
}
