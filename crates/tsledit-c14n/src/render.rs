#![forbid(unsafe_code)]

//! Start-tag pieces and their canonical ordering.

use crate::escape;
use std::cmp::Ordering;

/// A namespace declaration to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NsDecl {
    /// "" for the default namespace.
    pub prefix: String,
    pub uri: String,
}

impl NsDecl {
    pub fn render(&self) -> String {
        let value = escape::escape_attr(&self.uri);
        if self.prefix.is_empty() {
            format!(" xmlns=\"{value}\"")
        } else {
            format!(" xmlns:{}=\"{value}\"", self.prefix)
        }
    }
}

/// Default namespace first, then by prefix.
impl Ord for NsDecl {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.prefix.is_empty(), other.prefix.is_empty()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => self.prefix.cmp(&other.prefix),
        }
    }
}

impl PartialOrd for NsDecl {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// An attribute to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    /// "" when the attribute is in no namespace.
    pub ns_uri: String,
    pub local_name: String,
    /// `prefix:local` or `local`, as it appears in the output.
    pub qualified_name: String,
    pub value: String,
}

impl Attr {
    pub fn render(&self) -> String {
        format!(
            " {}=\"{}\"",
            self.qualified_name,
            escape::escape_attr(&self.value)
        )
    }
}

/// Unqualified attributes first (by local name), then by
/// (namespace URI, local name).
impl Ord for Attr {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.ns_uri.is_empty(), other.ns_uri.is_empty()) {
            (true, true) => self.local_name.cmp(&other.local_name),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self
                .ns_uri
                .cmp(&other.ns_uri)
                .then_with(|| self.local_name.cmp(&other.local_name)),
        }
    }
}

impl PartialOrd for Attr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(ns: &str, local: &str) -> Attr {
        Attr {
            ns_uri: ns.into(),
            local_name: local.into(),
            qualified_name: local.into(),
            value: String::new(),
        }
    }

    #[test]
    fn default_namespace_sorts_first() {
        let mut decls = vec![
            NsDecl { prefix: "tsl".into(), uri: "urn:t".into() },
            NsDecl { prefix: "".into(), uri: "urn:d".into() },
            NsDecl { prefix: "ds".into(), uri: "urn:ds".into() },
        ];
        decls.sort();
        let order: Vec<_> = decls.iter().map(|d| d.prefix.as_str()).collect();
        assert_eq!(order, vec!["", "ds", "tsl"]);
        assert_eq!(decls[0].render(), " xmlns=\"urn:d\"");
    }

    #[test]
    fn unqualified_attributes_sort_first() {
        let mut attrs = vec![attr("urn:z", "a"), attr("", "TSLTag"), attr("", "Id")];
        attrs.sort();
        let order: Vec<_> = attrs.iter().map(|a| a.local_name.as_str()).collect();
        assert_eq!(order, vec!["Id", "TSLTag", "a"]);
    }
}
