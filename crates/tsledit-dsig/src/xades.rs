#![forbid(unsafe_code)]

//! XAdES-BES qualifying properties.
//!
//! The signed properties bind the signing time and a digest of the signing
//! certificate into the signature, so a certificate swap in `KeyInfo` is
//! detected even when the key is unchanged.

use base64::Engine;
use time::OffsetDateTime;
use tsledit_core::{ns, Error};
use tsledit_xml::document::{find_child, text_content};
use tsledit_xml::XmlWriter;

fn xades(local: &str) -> String {
    format!("{}:{local}", ns::prefix::XADES)
}

fn ds(local: &str) -> String {
    format!("{}:{local}", ns::prefix::DSIG)
}

/// `Id` of the `SignedProperties` element of signature `signature_id`.
pub fn signed_properties_id(signature_id: &str) -> String {
    format!("{signature_id}-xades")
}

/// Values recorded in the signed properties.
pub struct QualifyingProperties<'a> {
    pub signature_id: &'a str,
    pub signing_time: OffsetDateTime,
    pub certificate_der: &'a [u8],
    pub cert_digest_method: &'a str,
}

impl QualifyingProperties<'_> {
    /// Write `<ds:Object><xades:QualifyingProperties>…</ds:Object>`.
    pub fn write(&self, w: &mut XmlWriter) -> Result<(), Error> {
        let cert = tsledit_keys::x509::parse_der(self.certificate_der)?;
        let digest = tsledit_crypto::digest::digest(self.cert_digest_method, self.certificate_der)?;
        let target = format!("#{}", self.signature_id);
        let props_id = signed_properties_id(self.signature_id);

        w.start_element(&ds(ns::node::OBJECT), &[])?;
        w.start_element(
            &xades(ns::node::QUALIFYING_PROPERTIES),
            &[("xmlns:xades", ns::XADES), (ns::attr::TARGET, target.as_str())],
        )?;
        w.start_element(&xades(ns::node::SIGNED_PROPERTIES), &[(ns::attr::ID, props_id.as_str())])?;
        w.start_element(&xades(ns::node::SIGNED_SIGNATURE_PROPERTIES), &[])?;
        w.text_element(
            &xades(ns::node::SIGNING_TIME),
            &[],
            &tsledit_xml::datetime::format(self.signing_time)?,
        )?;
        w.start_element(&xades(ns::node::SIGNING_CERTIFICATE), &[])?;
        w.start_element(&xades(ns::node::CERT), &[])?;
        w.start_element(&xades(ns::node::CERT_DIGEST), &[])?;
        w.empty_element(
            &ds(ns::node::DIGEST_METHOD),
            &[(ns::attr::ALGORITHM, self.cert_digest_method)],
        )?;
        w.text_element(
            &ds(ns::node::DIGEST_VALUE),
            &[],
            &base64::engine::general_purpose::STANDARD.encode(digest),
        )?;
        w.end_element(&xades(ns::node::CERT_DIGEST))?;
        w.start_element(&xades(ns::node::ISSUER_SERIAL), &[])?;
        w.text_element(
            &ds(ns::node::X509_ISSUER_NAME),
            &[],
            &tsledit_keys::x509::issuer_name(&cert),
        )?;
        w.text_element(
            &ds(ns::node::X509_SERIAL_NUMBER),
            &[],
            &tsledit_keys::x509::serial_decimal(&cert),
        )?;
        w.end_element(&xades(ns::node::ISSUER_SERIAL))?;
        w.end_element(&xades(ns::node::CERT))?;
        w.end_element(&xades(ns::node::SIGNING_CERTIFICATE))?;
        w.end_element(&xades(ns::node::SIGNED_SIGNATURE_PROPERTIES))?;
        w.end_element(&xades(ns::node::SIGNED_PROPERTIES))?;
        w.end_element(&xades(ns::node::QUALIFYING_PROPERTIES))?;
        w.end_element(&ds(ns::node::OBJECT))
    }
}

/// The `SignedSignatureProperties` of a parsed `<ds:Signature>`, if any.
fn signed_signature_properties<'a, 'input>(
    signature: roxmltree::Node<'a, 'input>,
) -> Option<roxmltree::Node<'a, 'input>> {
    signature
        .children()
        .filter(|n| tsledit_xml::document::is_element(n, ns::DSIG, ns::node::OBJECT))
        .filter_map(|obj| find_child(obj, ns::XADES, ns::node::QUALIFYING_PROPERTIES))
        .filter_map(|qp| find_child(qp, ns::XADES, ns::node::SIGNED_PROPERTIES))
        .find_map(|sp| find_child(sp, ns::XADES, ns::node::SIGNED_SIGNATURE_PROPERTIES))
}

/// Signing time claimed by the signature.
pub fn signing_time(signature: roxmltree::Node<'_, '_>) -> Option<OffsetDateTime> {
    let ssp = signed_signature_properties(signature)?;
    let node = find_child(ssp, ns::XADES, ns::node::SIGNING_TIME)?;
    tsledit_xml::datetime::parse(&text_content(node)).ok()
}

/// Compare the `CertDigest` of the signed properties with `certificate_der`.
///
/// `Ok(None)` when the signature carries no signing-certificate property.
pub fn check_signing_certificate(
    signature: roxmltree::Node<'_, '_>,
    certificate_der: &[u8],
) -> Result<Option<bool>, Error> {
    let Some(cert_digest) = signed_signature_properties(signature)
        .and_then(|ssp| find_child(ssp, ns::XADES, ns::node::SIGNING_CERTIFICATE))
        .and_then(|sc| find_child(sc, ns::XADES, ns::node::CERT))
        .and_then(|c| find_child(c, ns::XADES, ns::node::CERT_DIGEST))
    else {
        return Ok(None);
    };

    let method = find_child(cert_digest, ns::DSIG, ns::node::DIGEST_METHOD)
        .and_then(|m| m.attribute(ns::attr::ALGORITHM))
        .ok_or_else(|| Error::MissingElement("CertDigest/DigestMethod".into()))?;
    let value = find_child(cert_digest, ns::DSIG, ns::node::DIGEST_VALUE)
        .ok_or_else(|| Error::MissingElement("CertDigest/DigestValue".into()))?;
    let clean: String = text_content(value)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let expected = base64::engine::general_purpose::STANDARD
        .decode(clean)
        .map_err(|e| Error::Base64(format!("CertDigest: {e}")))?;

    let computed = tsledit_crypto::digest::digest(method, certificate_der)?;
    Ok(Some(computed == expected))
}
