#![forbid(unsafe_code)]

//! KeyInfo XML processing: reads `<ds:KeyInfo>` to recover the signer's key
//! and certificate, and writes the `<ds:KeyValue>` of a signing key.

use crate::key::{Key, KeyData, KeyUsage};
use base64::Engine;
use tsledit_core::{ns, Error};
use tsledit_xml::document::{find_child, find_children, is_element, text_content};
use tsledit_xml::XmlWriter;

const P256_CURVE_URI: &str = "urn:oid:1.2.840.10045.3.1.7";

fn decode_b64(text: &str, what: &str) -> Result<Vec<u8>, Error> {
    let clean: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if clean.is_empty() {
        return Err(Error::Base64(format!("{what}: empty value")));
    }
    base64::engine::general_purpose::STANDARD
        .decode(clean)
        .map_err(|e| Error::Base64(format!("{what}: {e}")))
}

/// Extract an inline key from `<KeyInfo>`.
///
/// The embedded certificate wins over a bare `KeyValue`: a trust list
/// signature is always verified against the certificate it names.
pub fn extract_key_value(key_info_node: roxmltree::Node<'_, '_>) -> Option<Key> {
    if let Some(der) = embedded_certificate_der(key_info_node) {
        if let Ok(key) = crate::loader::load_x509_cert_der(&der) {
            return Some(key);
        }
    }

    for kv in find_children(key_info_node, ns::DSIG, ns::node::KEY_VALUE) {
        if let Ok(key) = parse_rsa_key_value(kv) {
            return Some(key);
        }
        if let Ok(key) = parse_ec_key_value(kv) {
            return Some(key);
        }
    }
    None
}

/// DER bytes of the first `<X509Certificate>` under `<X509Data>`.
pub fn embedded_certificate_der(key_info_node: roxmltree::Node<'_, '_>) -> Option<Vec<u8>> {
    find_children(key_info_node, ns::DSIG, ns::node::X509_DATA)
        .flat_map(|data| find_children(data, ns::DSIG, ns::node::X509_CERTIFICATE))
        .find_map(|cert| decode_b64(&text_content(cert), "X509Certificate").ok())
}

/// Extract an RSA public key from a `<KeyValue><RSAKeyValue>` element.
pub fn parse_rsa_key_value(key_value_node: roxmltree::Node<'_, '_>) -> Result<Key, Error> {
    let rsa_kv = find_child(key_value_node, ns::DSIG, ns::node::RSA_KEY_VALUE)
        .ok_or_else(|| Error::MissingElement("RSAKeyValue".into()))?;
    let modulus = find_child(rsa_kv, ns::DSIG, ns::node::RSA_MODULUS)
        .ok_or_else(|| Error::MissingElement("Modulus".into()))?;
    let exponent = find_child(rsa_kv, ns::DSIG, ns::node::RSA_EXPONENT)
        .ok_or_else(|| Error::MissingElement("Exponent".into()))?;

    let n = rsa::BigUint::from_bytes_be(&decode_b64(&text_content(modulus), "Modulus")?);
    let e = rsa::BigUint::from_bytes_be(&decode_b64(&text_content(exponent), "Exponent")?);
    let public = rsa::RsaPublicKey::new(n, e)
        .map_err(|err| Error::Key(format!("invalid RSA public key: {err}")))?;

    Ok(Key::new(
        KeyData::Rsa { private: None, public },
        KeyUsage::Verify,
    ))
}

/// Extract a P-256 public key from a `<KeyValue><dsig11:ECKeyValue>` element.
pub fn parse_ec_key_value(key_value_node: roxmltree::Node<'_, '_>) -> Result<Key, Error> {
    let ec_kv = key_value_node
        .children()
        .find(|n| {
            is_element(n, ns::DSIG11, ns::node::EC_KEY_VALUE)
                || is_element(n, ns::DSIG, ns::node::EC_KEY_VALUE)
        })
        .ok_or_else(|| Error::MissingElement("ECKeyValue".into()))?;

    let curve_uri = ec_kv
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == ns::node::NAMED_CURVE)
        .ok_or_else(|| Error::MissingElement("NamedCurve".into()))?
        .attribute(ns::attr::URI)
        .ok_or_else(|| Error::MissingAttribute("URI on NamedCurve".into()))?;
    if curve_uri != P256_CURVE_URI {
        return Err(Error::UnsupportedAlgorithm(format!("EC curve: {curve_uri}")));
    }

    let public_key = ec_kv
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == ns::node::PUBLIC_KEY)
        .ok_or_else(|| Error::MissingElement("PublicKey".into()))?;
    let point = decode_b64(&text_content(public_key), "EC PublicKey")?;
    let public = p256::ecdsa::VerifyingKey::from_sec1_bytes(&point)
        .map_err(|e| Error::Key(format!("invalid P-256 public key point: {e}")))?;

    Ok(Key::new(
        KeyData::EcP256 { private: None, public },
        KeyUsage::Verify,
    ))
}

// ── Writing ──────────────────────────────────────────────────────────

/// Write `<ds:KeyValue>` for the public half of `key`.
pub fn write_key_value(w: &mut XmlWriter, key: &Key) -> Result<(), Error> {
    let engine = base64::engine::general_purpose::STANDARD;
    let ds = |local: &str| format!("{}:{local}", ns::prefix::DSIG);

    w.start_element(&ds(ns::node::KEY_VALUE), &[])?;
    match &key.data {
        KeyData::Rsa { public, .. } => {
            use rsa::traits::PublicKeyParts;
            w.start_element(&ds(ns::node::RSA_KEY_VALUE), &[])?;
            w.text_element(
                &ds(ns::node::RSA_MODULUS),
                &[],
                &engine.encode(public.n().to_bytes_be()),
            )?;
            w.text_element(
                &ds(ns::node::RSA_EXPONENT),
                &[],
                &engine.encode(public.e().to_bytes_be()),
            )?;
            w.end_element(&ds(ns::node::RSA_KEY_VALUE))?;
        }
        KeyData::EcP256 { public, .. } => {
            let point = public.to_encoded_point(false);
            w.start_element("dsig11:ECKeyValue", &[("xmlns:dsig11", ns::DSIG11)])?;
            w.empty_element("dsig11:NamedCurve", &[(ns::attr::URI, P256_CURVE_URI)])?;
            w.text_element("dsig11:PublicKey", &[], &engine.encode(point.as_bytes()))?;
            w.end_element("dsig11:ECKeyValue")?;
        }
    }
    w.end_element(&ds(ns::node::KEY_VALUE))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(inner: &str) -> String {
        format!(r#"<ds:KeyInfo xmlns:ds="{}">{inner}</ds:KeyInfo>"#, ns::DSIG)
    }

    fn ec_key() -> Key {
        let sk = p256::ecdsa::SigningKey::from_slice(&[9u8; 32]).unwrap();
        let public = *sk.verifying_key();
        Key::new(
            KeyData::EcP256 { private: Some(sk), public },
            KeyUsage::Any,
        )
    }

    #[test]
    fn ec_key_value_round_trips_through_xml() {
        let key = ec_key();
        let mut w = XmlWriter::new();
        write_key_value(&mut w, &key).unwrap();
        let xml = wrap(&w.into_string().unwrap());
        let doc = roxmltree::Document::parse(&xml).unwrap();

        let parsed = extract_key_value(doc.root_element()).unwrap();
        assert!(!parsed.has_private());
        assert_eq!(parsed.ec_p256_public_key(), key.ec_p256_public_key());
    }

    #[test]
    fn rsa_key_value_round_trips_through_xml() {
        let private = rsa::RsaPrivateKey::new(&mut rand::thread_rng(), 1024).unwrap();
        let public = private.to_public_key();
        let key = Key::new(
            KeyData::Rsa { private: Some(private), public: public.clone() },
            KeyUsage::Any,
        );
        let mut w = XmlWriter::new();
        write_key_value(&mut w, &key).unwrap();
        let xml = wrap(&w.into_string().unwrap());
        let doc = roxmltree::Document::parse(&xml).unwrap();

        let parsed = extract_key_value(doc.root_element()).unwrap();
        assert_eq!(parsed.rsa_public_key(), Some(&public));
    }

    #[test]
    fn unsupported_curve_is_rejected() {
        let xml = format!(
            r#"<ds:KeyValue xmlns:ds="{}" xmlns:dsig11="{}"><dsig11:ECKeyValue><dsig11:NamedCurve URI="urn:oid:1.3.132.0.34"/><dsig11:PublicKey>AA==</dsig11:PublicKey></dsig11:ECKeyValue></ds:KeyValue>"#,
            ns::DSIG,
            ns::DSIG11
        );
        let doc = roxmltree::Document::parse(&xml).unwrap();
        assert!(matches!(
            parse_ec_key_value(doc.root_element()),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn embedded_certificate_is_preferred() {
        let key_pair = rcgen::KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256).unwrap();
        let cert = rcgen::CertificateParams::new(vec!["tsl.example".into()])
            .unwrap()
            .self_signed(&key_pair)
            .unwrap();
        let b64 = base64::engine::general_purpose::STANDARD.encode(cert.der());

        let mut w = XmlWriter::new();
        write_key_value(&mut w, &ec_key()).unwrap();
        let xml = wrap(&format!(
            "<ds:X509Data><ds:X509Certificate>{b64}</ds:X509Certificate></ds:X509Data>{}",
            w.into_string().unwrap()
        ));
        let doc = roxmltree::Document::parse(&xml).unwrap();

        assert_eq!(
            embedded_certificate_der(doc.root_element()).unwrap(),
            cert.der().to_vec()
        );
        let key = extract_key_value(doc.root_element()).unwrap();
        assert_eq!(key.x509_chain, vec![cert.der().to_vec()]);
        assert_ne!(key.ec_p256_public_key(), ec_key().ec_p256_public_key());
    }

    #[test]
    fn empty_key_info_yields_nothing() {
        let xml = wrap("");
        let doc = roxmltree::Document::parse(&xml).unwrap();
        assert!(extract_key_value(doc.root_element()).is_none());
        assert!(embedded_certificate_der(doc.root_element()).is_none());
    }
}
