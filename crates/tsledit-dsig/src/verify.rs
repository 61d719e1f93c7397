#![forbid(unsafe_code)]

//! XML-DSig verification of an enveloped trust list signature.
//!
//! Processing order:
//! 1. Find the `<ds:Signature>` child of the document element
//! 2. Read `<SignedInfo>`: CanonicalizationMethod, SignatureMethod
//! 3. For each `<Reference>`: resolve URI, run transforms, compute digest, compare
//! 4. Take the signer key from the `<X509Certificate>` in `<KeyInfo>`
//! 5. Canonicalize `<SignedInfo>` and check `<SignatureValue>`
//! 6. Check the XAdES signing-certificate digest against that certificate

use base64::Engine;
use std::collections::HashMap;
use tsledit_c14n::C14nMode;
use tsledit_core::{algorithm, ns, Error};
use tsledit_transforms::{C14nTransform, EnvelopedSignatureTransform, Transform, TransformData, TransformPipeline};
use tsledit_xml::document::{find_child, find_children, text_content};
use tsledit_xml::{NodeSet, XmlDocument};
use x509_cert::Certificate;

/// Result of signature verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyResult {
    /// The document element has no `<ds:Signature>` child.
    Unsigned,
    /// Every reference digest and the signature value check out.
    Valid { certificate: Certificate },
    /// A signature is present but does not verify.
    Invalid { reason: String },
}

impl VerifyResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, VerifyResult::Valid { .. })
    }

    /// The signer certificate of a valid signature.
    pub fn certificate(&self) -> Option<&Certificate> {
        match self {
            VerifyResult::Valid { certificate } => Some(certificate),
            _ => None,
        }
    }

    fn invalid(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        log::warn!("signature invalid: {reason}");
        VerifyResult::Invalid { reason }
    }
}

/// The enveloped `<ds:Signature>` of a document: a direct child of the
/// document element.
pub fn find_enveloped_signature<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
) -> Option<roxmltree::Node<'a, 'input>> {
    find_child(doc.root_element(), ns::DSIG, ns::node::SIGNATURE)
}

/// Verify the enveloped signature of a serialized document.
///
/// Malformed signature structure is an `Err`; a well-formed signature that
/// fails a check is `Ok(VerifyResult::Invalid)`.
pub fn verify(xml: &str) -> Result<VerifyResult, Error> {
    let doc = roxmltree::Document::parse_with_options(xml, tsledit_xml::parsing_options())
        .map_err(|e| Error::XmlParse(e.to_string()))?;
    let id_map = XmlDocument::build_id_map(&doc);

    let Some(sig_node) = find_enveloped_signature(&doc) else {
        log::debug!("document carries no enveloped signature");
        return Ok(VerifyResult::Unsigned);
    };

    let signed_info = find_child(sig_node, ns::DSIG, ns::node::SIGNED_INFO)
        .ok_or_else(|| Error::MissingElement("SignedInfo".into()))?;

    let c14n_method_node = find_child(signed_info, ns::DSIG, ns::node::CANONICALIZATION_METHOD)
        .ok_or_else(|| Error::MissingElement("CanonicalizationMethod".into()))?;
    let c14n_uri = c14n_method_node
        .attribute(ns::attr::ALGORITHM)
        .ok_or_else(|| Error::MissingAttribute("Algorithm on CanonicalizationMethod".into()))?;
    let c14n_mode = C14nMode::from_uri(c14n_uri)
        .ok_or_else(|| Error::UnsupportedAlgorithm(format!("C14N: {c14n_uri}")))?;
    let inclusive_prefixes = read_inclusive_prefixes(c14n_method_node);

    let sig_method_uri = find_child(signed_info, ns::DSIG, ns::node::SIGNATURE_METHOD)
        .ok_or_else(|| Error::MissingElement("SignatureMethod".into()))?
        .attribute(ns::attr::ALGORITHM)
        .ok_or_else(|| Error::MissingAttribute("Algorithm on SignatureMethod".into()))?;

    // References
    let references: Vec<_> = find_children(signed_info, ns::DSIG, ns::node::REFERENCE).collect();
    if references.is_empty() {
        return Ok(VerifyResult::invalid("SignedInfo has no references"));
    }
    for reference in &references {
        let uri = reference.attribute(ns::attr::URI).unwrap_or("");
        let expected = find_child(*reference, ns::DSIG, ns::node::DIGEST_VALUE)
            .ok_or_else(|| Error::MissingElement("DigestValue".into()))?;
        let expected = decode_b64(&text_content(expected), "DigestValue")?;
        let computed = compute_reference_digest(*reference, &doc, &id_map, xml, sig_node)?;
        if computed != expected {
            return Ok(VerifyResult::invalid(format!(
                "reference digest mismatch for URI={uri}"
            )));
        }
        log::debug!("reference URI={uri} digest ok");
    }
    if !references
        .iter()
        .any(|r| covers_document_element(*r, &doc, &id_map))
    {
        return Ok(VerifyResult::invalid(
            "no enveloped reference covers the document element",
        ));
    }

    // Signer key
    let Some(cert_der) = find_child(sig_node, ns::DSIG, ns::node::KEY_INFO)
        .and_then(tsledit_keys::keyinfo::embedded_certificate_der)
    else {
        return Ok(VerifyResult::invalid("KeyInfo carries no X509Certificate"));
    };
    let key = tsledit_keys::loader::load_x509_cert_der(&cert_der)?;

    // SignedInfo
    let signed_info_ns = NodeSet::tree_without_comments(signed_info);
    let c14n_signed_info =
        tsledit_c14n::canonicalize_doc(&doc, c14n_mode, Some(&signed_info_ns), &inclusive_prefixes)?;

    let sig_value_node = find_child(sig_node, ns::DSIG, ns::node::SIGNATURE_VALUE)
        .ok_or_else(|| Error::MissingElement("SignatureValue".into()))?;
    let sig_value = decode_b64(&text_content(sig_value_node), "SignatureValue")?;

    let sig_alg = tsledit_crypto::sign::from_uri(sig_method_uri)?;
    if !sig_alg.verify(&key.to_signing_key(), &c14n_signed_info, &sig_value)? {
        return Ok(VerifyResult::invalid("signature value verification failed"));
    }

    if signing_certificate_mismatch(sig_node, &cert_der)? {
        return Ok(VerifyResult::invalid(
            "XAdES signing certificate digest does not match the KeyInfo certificate",
        ));
    }

    let certificate = tsledit_keys::x509::parse_der(&cert_der)?;
    log::debug!(
        "signature valid, signer {}",
        tsledit_keys::x509::subject_name(&certificate)
    );
    Ok(VerifyResult::Valid { certificate })
}

fn signing_certificate_mismatch(sig_node: roxmltree::Node<'_, '_>, cert_der: &[u8]) -> Result<bool, Error> {
    Ok(crate::xades::check_signing_certificate(sig_node, cert_der)? == Some(false))
}

/// Digest of one `<Reference>` after its transforms.
pub(crate) fn compute_reference_digest(
    reference: roxmltree::Node<'_, '_>,
    doc: &roxmltree::Document<'_>,
    id_map: &HashMap<String, roxmltree::NodeId>,
    xml: &str,
    sig_node: roxmltree::Node<'_, '_>,
) -> Result<Vec<u8>, Error> {
    let uri = reference.attribute(ns::attr::URI).unwrap_or("");
    let digest_uri = find_child(reference, ns::DSIG, ns::node::DIGEST_METHOD)
        .ok_or_else(|| Error::MissingElement("DigestMethod".into()))?
        .attribute(ns::attr::ALGORITHM)
        .ok_or_else(|| Error::MissingAttribute("Algorithm on DigestMethod".into()))?;

    let node_set = tsledit_transforms::uri::resolve_uri(uri, doc, id_map)?;

    let mut pipeline = TransformPipeline::new();
    if let Some(transforms) = find_child(reference, ns::DSIG, ns::node::TRANSFORMS) {
        for t_node in find_children(transforms, ns::DSIG, ns::node::TRANSFORM) {
            let t_uri = t_node
                .attribute(ns::attr::ALGORITHM)
                .ok_or_else(|| Error::MissingAttribute("Algorithm on Transform".into()))?;
            pipeline.push(transform_for(t_uri, t_node, sig_node)?);
        }
    }

    let bytes = pipeline
        .execute(TransformData::Xml {
            xml_text: xml.to_owned(),
            node_set: Some(node_set),
        })?
        .into_binary()?;
    tsledit_crypto::digest::digest(digest_uri, &bytes)
}

/// Build the transform a `<Transform Algorithm=…>` names.
fn transform_for(
    uri: &str,
    transform_node: roxmltree::Node<'_, '_>,
    sig_node: roxmltree::Node<'_, '_>,
) -> Result<Box<dyn Transform>, Error> {
    if uri == algorithm::ENVELOPED_SIGNATURE {
        return Ok(Box::new(EnvelopedSignatureTransform::from_node(sig_node)));
    }
    match C14nMode::from_uri(uri) {
        Some(mode) => Ok(Box::new(C14nTransform::new(
            mode,
            read_inclusive_prefixes(transform_node),
        ))),
        None => Err(Error::UnsupportedAlgorithm(format!("transform: {uri}"))),
    }
}

/// True if `reference` selects the document element and strips the
/// signature from it.
fn covers_document_element(
    reference: roxmltree::Node<'_, '_>,
    doc: &roxmltree::Document<'_>,
    id_map: &HashMap<String, roxmltree::NodeId>,
) -> bool {
    let uri = reference.attribute(ns::attr::URI).unwrap_or("");
    let selects_root = match tsledit_xml::xpath::parse_same_document_ref(uri) {
        Some(id) => id_map.get(id) == Some(&doc.root_element().id()),
        None => uri.is_empty(),
    };
    let enveloped = find_child(reference, ns::DSIG, ns::node::TRANSFORMS).is_some_and(|t| {
        find_children(t, ns::DSIG, ns::node::TRANSFORM)
            .any(|n| n.attribute(ns::attr::ALGORITHM) == Some(algorithm::ENVELOPED_SIGNATURE))
    });
    selects_root && enveloped
}

fn read_inclusive_prefixes(node: roxmltree::Node<'_, '_>) -> Vec<String> {
    find_child(node, ns::EXC_C14N, ns::node::INCLUSIVE_NAMESPACES)
        .and_then(|n| n.attribute(ns::attr::PREFIX_LIST))
        .map(|list| list.split_whitespace().map(str::to_owned).collect())
        .unwrap_or_default()
}

fn decode_b64(text: &str, what: &str) -> Result<Vec<u8>, Error> {
    let clean: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(clean)
        .map_err(|e| Error::Base64(format!("{what}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_without_signature_is_unsigned() {
        let xml = format!(r#"<tsl:L xmlns:tsl="{}" Id="tsl-1"><tsl:V>3</tsl:V></tsl:L>"#, ns::TSL);
        assert_eq!(verify(&xml).unwrap(), VerifyResult::Unsigned);
    }

    #[test]
    fn nested_signature_is_not_enveloped() {
        let xml = format!(
            r#"<r><a><ds:Signature xmlns:ds="{}"/></a></r>"#,
            ns::DSIG
        );
        assert_eq!(verify(&xml).unwrap(), VerifyResult::Unsigned);
    }

    #[test]
    fn signature_without_signed_info_is_an_error() {
        let xml = format!(r#"<r><ds:Signature xmlns:ds="{}"/></r>"#, ns::DSIG);
        assert!(matches!(verify(&xml), Err(Error::MissingElement(_))));
    }

    #[test]
    fn malformed_xml_is_a_parse_error() {
        assert!(matches!(verify("<r>"), Err(Error::XmlParse(_))));
    }
}
