#![forbid(unsafe_code)]

//! Enveloped XAdES-BES signature creation.
//!
//! A template `<ds:Signature>` with empty `DigestValue` and `SignatureValue`
//! elements is appended to the document element, the reference digests are
//! computed against the combined document and filled in, and finally the
//! canonical `SignedInfo` is signed.

use crate::context::{DsigContext, SignatureConfig};
use crate::xades::{self, QualifyingProperties};
use base64::Engine;
use time::OffsetDateTime;
use tsledit_core::{algorithm, ns, Error};
use tsledit_xml::document::{element_prefix, find_child, find_children};
use tsledit_xml::{NodeSet, XmlDocument, XmlWriter};

const EMPTY_DIGEST_VALUE: &str = "<ds:DigestValue></ds:DigestValue>";

/// Sign `xml` with an enveloped signature over its document element.
///
/// The document element must carry an `Id` attribute. Any enveloped
/// signature already present is replaced. Returns the signed document.
pub fn sign_enveloped(ctx: &DsigContext, xml: &str) -> Result<String, Error> {
    ctx.config.validate()?;
    if !ctx.key.has_private() {
        return Err(Error::Key("signing requires a private key".into()));
    }
    let cert = tsledit_keys::x509::parse_der(&ctx.certificate_der)?;
    if !ctx.key.matches_certificate(&cert) {
        return Err(Error::Key(
            "signing key does not match the signer certificate".into(),
        ));
    }
    let signing_key = ctx.key.to_signing_key();
    let signature_method = ctx.config.signature_method(signing_key.family())?;

    let unsigned = strip_enveloped_signatures(xml)?;
    let root_id = {
        let doc = XmlDocument::parse(unsigned.clone())?;
        let parsed = doc.parse_doc()?;
        parsed
            .root_element()
            .attribute(ns::attr::ID)
            .map(str::to_owned)
            .ok_or_else(|| Error::MissingAttribute("Id on document element".into()))?
    };

    let signature_id = format!("xmldsig-{}", uuid::Uuid::new_v4());
    let template = SignatureTemplate {
        signature_id: &signature_id,
        root_id: &root_id,
        signature_method,
        config: &ctx.config,
        certificate_der: &ctx.certificate_der,
        signing_time: ctx.signing_time.unwrap_or_else(OffsetDateTime::now_utc),
    }
    .build()?;
    let combined = insert_before_root_end(&unsigned, &template)?;
    log::debug!(
        "signing #{root_id} as {signature_id} with {signature_method}, digest {}",
        ctx.config.digest_method
    );

    // Reference digests
    let engine = base64::engine::general_purpose::STANDARD;
    let mut result = combined.clone();
    {
        let doc = roxmltree::Document::parse_with_options(&combined, tsledit_xml::parsing_options())
            .map_err(|e| Error::XmlParse(e.to_string()))?;
        let id_map = XmlDocument::build_id_map(&doc);
        let sig_node = tsledit_xml::xpath::resolve_id(&doc, &id_map, &signature_id)?;
        let signed_info = find_child(sig_node, ns::DSIG, ns::node::SIGNED_INFO)
            .ok_or_else(|| Error::MissingElement("SignedInfo".into()))?;

        for reference in find_children(signed_info, ns::DSIG, ns::node::REFERENCE) {
            let computed =
                crate::verify::compute_reference_digest(reference, &doc, &id_map, &combined, sig_node)?;
            result = result.replacen(
                EMPTY_DIGEST_VALUE,
                &format!("<ds:DigestValue>{}</ds:DigestValue>", engine.encode(&computed)),
                1,
            );
        }
    }

    // SignedInfo
    let signature_value = {
        let doc = roxmltree::Document::parse_with_options(&result, tsledit_xml::parsing_options())
            .map_err(|e| Error::XmlParse(e.to_string()))?;
        let id_map = XmlDocument::build_id_map(&doc);
        let sig_node = tsledit_xml::xpath::resolve_id(&doc, &id_map, &signature_id)?;
        let signed_info = find_child(sig_node, ns::DSIG, ns::node::SIGNED_INFO)
            .ok_or_else(|| Error::MissingElement("SignedInfo".into()))?;
        let signed_info_ns = NodeSet::tree_without_comments(signed_info);
        let c14n_signed_info =
            tsledit_c14n::canonicalize_doc(&doc, ctx.config.c14n, Some(&signed_info_ns), &[])?;

        let sig_alg = tsledit_crypto::sign::from_uri(signature_method)?;
        sig_alg.sign(&signing_key, &c14n_signed_info)?
    };

    let value_id = signature_value_id(&signature_id);
    let empty = format!(r#"<ds:SignatureValue Id="{value_id}"></ds:SignatureValue>"#);
    if !result.contains(&empty) {
        return Err(Error::Other("signature template lost its SignatureValue".into()));
    }
    Ok(result.replacen(
        &empty,
        &format!(
            r#"<ds:SignatureValue Id="{value_id}">{}</ds:SignatureValue>"#,
            engine.encode(&signature_value)
        ),
        1,
    ))
}

fn signature_value_id(signature_id: &str) -> String {
    format!("{signature_id}-signature-value")
}

// ── Template ─────────────────────────────────────────────────────────

struct SignatureTemplate<'a> {
    signature_id: &'a str,
    root_id: &'a str,
    signature_method: &'a str,
    config: &'a SignatureConfig,
    certificate_der: &'a [u8],
    signing_time: OffsetDateTime,
}

impl SignatureTemplate<'_> {
    fn build(&self) -> Result<String, Error> {
        let ds = |local: &str| format!("{}:{local}", ns::prefix::DSIG);
        let c14n = self.config.c14n.uri();
        let digest = self.config.digest_method.as_str();
        let mut w = XmlWriter::new();

        w.start_element(
            &ds(ns::node::SIGNATURE),
            &[("xmlns:ds", ns::DSIG), (ns::attr::ID, self.signature_id)],
        )?;
        w.start_element(&ds(ns::node::SIGNED_INFO), &[])?;
        w.empty_element(&ds(ns::node::CANONICALIZATION_METHOD), &[(ns::attr::ALGORITHM, c14n)])?;
        w.empty_element(
            &ds(ns::node::SIGNATURE_METHOD),
            &[(ns::attr::ALGORITHM, self.signature_method)],
        )?;

        let root_uri = format!("#{}", self.root_id);
        let ref_id = format!("{}-ref0", self.signature_id);
        w.start_element(
            &ds(ns::node::REFERENCE),
            &[(ns::attr::ID, ref_id.as_str()), (ns::attr::URI, root_uri.as_str())],
        )?;
        w.start_element(&ds(ns::node::TRANSFORMS), &[])?;
        w.empty_element(
            &ds(ns::node::TRANSFORM),
            &[(ns::attr::ALGORITHM, algorithm::ENVELOPED_SIGNATURE)],
        )?;
        w.empty_element(&ds(ns::node::TRANSFORM), &[(ns::attr::ALGORITHM, c14n)])?;
        w.end_element(&ds(ns::node::TRANSFORMS))?;
        write_digest_placeholder(&mut w, digest)?;
        w.end_element(&ds(ns::node::REFERENCE))?;

        let props_uri = format!("#{}", xades::signed_properties_id(self.signature_id));
        w.start_element(
            &ds(ns::node::REFERENCE),
            &[
                (ns::attr::TYPE, algorithm::XADES_SIGNED_PROPERTIES),
                (ns::attr::URI, props_uri.as_str()),
            ],
        )?;
        w.start_element(&ds(ns::node::TRANSFORMS), &[])?;
        w.empty_element(&ds(ns::node::TRANSFORM), &[(ns::attr::ALGORITHM, c14n)])?;
        w.end_element(&ds(ns::node::TRANSFORMS))?;
        write_digest_placeholder(&mut w, digest)?;
        w.end_element(&ds(ns::node::REFERENCE))?;
        w.end_element(&ds(ns::node::SIGNED_INFO))?;

        let value_id = signature_value_id(self.signature_id);
        w.start_element(&ds(ns::node::SIGNATURE_VALUE), &[(ns::attr::ID, value_id.as_str())])?;
        w.end_element(&ds(ns::node::SIGNATURE_VALUE))?;

        self.write_key_info(&mut w)?;

        QualifyingProperties {
            signature_id: self.signature_id,
            signing_time: self.signing_time,
            certificate_der: self.certificate_der,
            cert_digest_method: &self.config.cert_digest_method,
        }
        .write(&mut w)?;

        w.end_element(&ds(ns::node::SIGNATURE))?;
        w.into_string()
    }

    /// `KeyInfo` is derived from the certificate alone.
    fn write_key_info(&self, w: &mut XmlWriter) -> Result<(), Error> {
        let ds = |local: &str| format!("{}:{local}", ns::prefix::DSIG);
        let cert = tsledit_keys::x509::parse_der(self.certificate_der)?;
        let public = tsledit_keys::loader::load_x509_cert_der(self.certificate_der)?;

        w.start_element(&ds(ns::node::KEY_INFO), &[])?;
        w.start_element(&ds(ns::node::X509_DATA), &[])?;
        w.text_element(
            &ds(ns::node::X509_CERTIFICATE),
            &[],
            &base64::engine::general_purpose::STANDARD.encode(self.certificate_der),
        )?;
        w.start_element(&ds(ns::node::X509_ISSUER_SERIAL), &[])?;
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
        w.end_element(&ds(ns::node::X509_ISSUER_SERIAL))?;
        w.end_element(&ds(ns::node::X509_DATA))?;
        tsledit_keys::keyinfo::write_key_value(w, &public)?;
        w.end_element(&ds(ns::node::KEY_INFO))
    }
}

fn write_digest_placeholder(w: &mut XmlWriter, digest_uri: &str) -> Result<(), Error> {
    let ds = |local: &str| format!("{}:{local}", ns::prefix::DSIG);
    w.empty_element(&ds(ns::node::DIGEST_METHOD), &[(ns::attr::ALGORITHM, digest_uri)])?;
    w.start_element(&ds(ns::node::DIGEST_VALUE), &[])?;
    w.end_element(&ds(ns::node::DIGEST_VALUE))
}

// ── Document surgery ─────────────────────────────────────────────────

/// Remove every `<ds:Signature>` child of the document element.
pub fn strip_enveloped_signatures(xml: &str) -> Result<String, Error> {
    let doc = roxmltree::Document::parse_with_options(xml, tsledit_xml::parsing_options())
        .map_err(|e| Error::XmlParse(e.to_string()))?;
    let ranges: Vec<_> = find_children(doc.root_element(), ns::DSIG, ns::node::SIGNATURE)
        .map(|n| n.range())
        .collect();
    if ranges.is_empty() {
        return Ok(xml.to_owned());
    }
    log::debug!("dropping {} existing signature(s)", ranges.len());
    let mut out = String::with_capacity(xml.len());
    let mut pos = 0;
    for range in ranges {
        out.push_str(&xml[pos..range.start]);
        pos = range.end;
    }
    out.push_str(&xml[pos..]);
    Ok(out)
}

/// Insert `fragment` as the last child of the document element.
fn insert_before_root_end(xml: &str, fragment: &str) -> Result<String, Error> {
    let doc = roxmltree::Document::parse_with_options(xml, tsledit_xml::parsing_options())
        .map_err(|e| Error::XmlParse(e.to_string()))?;
    let root = doc.root_element();
    let range = root.range();
    let element_text = &xml[range.clone()];

    let mut out = String::with_capacity(xml.len() + fragment.len() + 64);
    if element_text.ends_with("/>") {
        let qname = match element_prefix(&root) {
            Some(p) => format!("{p}:{}", root.tag_name().name()),
            None => root.tag_name().name().to_owned(),
        };
        out.push_str(&xml[..range.end - 2]);
        out.push('>');
        out.push_str(fragment);
        out.push_str(&format!("</{qname}>"));
    } else {
        let close = element_text
            .rfind("</")
            .ok_or_else(|| Error::XmlStructure("document element has no end tag".into()))?;
        out.push_str(&xml[..range.start + close]);
        out.push_str(fragment);
        out.push_str(&xml[range.start + close..range.end]);
    }
    out.push_str(&xml[range.end..]);
    Ok(out)
}
