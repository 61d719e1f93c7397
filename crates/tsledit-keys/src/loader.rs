#![forbid(unsafe_code)]

//! Key and certificate loading from PEM and DER.

use crate::key::{Key, KeyData, KeyUsage};
use std::path::Path;
use tsledit_core::Error;

/// Load an RSA private key from PEM data (PKCS#8 or PKCS#1).
pub fn load_rsa_private_pem(pem_data: &[u8]) -> Result<Key, Error> {
    use pkcs8::DecodePrivateKey;
    let pem_str = pem_text(pem_data)?;

    if let Ok(pk) = rsa::RsaPrivateKey::from_pkcs8_pem(pem_str) {
        return Ok(rsa_private_key(pk));
    }

    use pkcs1::DecodeRsaPrivateKey;
    let pk = rsa::RsaPrivateKey::from_pkcs1_pem(pem_str)
        .map_err(|e| Error::Key(format!("failed to parse RSA private key PEM: {e}")))?;
    Ok(rsa_private_key(pk))
}

/// Load an EC P-256 private key from PEM data (PKCS#8 or SEC1).
pub fn load_ec_p256_private_pem(pem_data: &[u8]) -> Result<Key, Error> {
    use pkcs8::DecodePrivateKey;
    let pem_str = pem_text(pem_data)?;

    let sk = match p256::ecdsa::SigningKey::from_pkcs8_pem(pem_str) {
        Ok(sk) => sk,
        Err(_) => {
            use p256::elliptic_curve::SecretKey;
            let secret = SecretKey::<p256::NistP256>::from_sec1_pem(pem_str)
                .map_err(|e| Error::Key(format!("failed to parse EC P-256 private key: {e}")))?;
            p256::ecdsa::SigningKey::from(secret)
        }
    };
    Ok(ec_p256_private_key(sk))
}

/// Load any supported private key from PEM, keyed on the PEM label.
pub fn load_private_key_pem(pem_data: &[u8]) -> Result<Key, Error> {
    let pem_str = pem_text(pem_data)?;
    let label = pem_str
        .trim_start()
        .strip_prefix("-----BEGIN ")
        .and_then(|rest| rest.split_once("-----"))
        .map(|(label, _)| label)
        .ok_or_else(|| Error::Key("not a PEM document".into()))?;

    match label {
        "RSA PRIVATE KEY" => load_rsa_private_pem(pem_data),
        "EC PRIVATE KEY" => load_ec_p256_private_pem(pem_data),
        "PRIVATE KEY" => {
            let (_, der) = pem_rfc7468::decode_vec(pem_str.trim().as_bytes())
                .map_err(|e| Error::Key(format!("failed to decode PEM: {e}")))?;
            load_private_key_pkcs8_der(&der)
        }
        "ENCRYPTED PRIVATE KEY" => Err(Error::Key(
            "encrypted private keys are not supported; decrypt the key first".into(),
        )),
        other => Err(Error::Key(format!("unsupported PEM label: {other}"))),
    }
}

/// Load a private key from PKCS#8 DER bytes. Tries RSA, then P-256.
pub fn load_private_key_pkcs8_der(der: &[u8]) -> Result<Key, Error> {
    use pkcs8::DecodePrivateKey;

    if let Ok(pk) = rsa::RsaPrivateKey::from_pkcs8_der(der) {
        return Ok(rsa_private_key(pk));
    }
    if let Ok(sk) = p256::ecdsa::SigningKey::from_pkcs8_der(der) {
        return Ok(ec_p256_private_key(sk));
    }
    Err(Error::Key(
        "unable to parse PKCS#8 DER private key (tried RSA, P-256)".into(),
    ))
}

/// Load a public key (and the certificate itself) from PEM certificate data.
pub fn load_x509_cert_pem(pem_data: &[u8]) -> Result<Key, Error> {
    let der = certificate_der_from_pem(pem_data)?;
    load_x509_cert_der(&der)
}

/// Load a public key from a DER-encoded X.509 certificate.
pub fn load_x509_cert_der(data: &[u8]) -> Result<Key, Error> {
    use der::Encode;

    let cert = crate::x509::parse_der(data)?;
    let spki_der = cert
        .tbs_certificate
        .subject_public_key_info
        .to_der()
        .map_err(|e| Error::Key(format!("failed to encode SPKI: {e}")))?;
    let mut key = load_spki_der(&spki_der)?;
    key.x509_chain = vec![data.to_vec()];
    Ok(key)
}

/// Load a key from raw SubjectPublicKeyInfo DER bytes.
pub fn load_spki_der(spki_der: &[u8]) -> Result<Key, Error> {
    use spki::DecodePublicKey;

    if let Ok(public) = rsa::RsaPublicKey::from_public_key_der(spki_der) {
        return Ok(Key::new(KeyData::Rsa { private: None, public }, KeyUsage::Verify));
    }
    if let Ok(public) = p256::ecdsa::VerifyingKey::from_public_key_der(spki_der) {
        return Ok(Key::new(KeyData::EcP256 { private: None, public }, KeyUsage::Verify));
    }
    Err(Error::Key(
        "unsupported public key algorithm (expected RSA or P-256)".into(),
    ))
}

/// Extract the DER bytes of a PEM `CERTIFICATE`.
pub fn certificate_der_from_pem(pem_data: &[u8]) -> Result<Vec<u8>, Error> {
    // Some PEM files have extra trailing newlines
    let trimmed = pem_text(pem_data)?.trim();
    let (label, der_bytes) = pem_rfc7468::decode_vec(trimmed.as_bytes())
        .map_err(|e| Error::Certificate(format!("failed to decode certificate PEM: {e}")))?;
    if label != "CERTIFICATE" {
        return Err(Error::Certificate(format!(
            "expected CERTIFICATE PEM label, got: {label}"
        )));
    }
    Ok(der_bytes)
}

/// Read a certificate file, PEM or DER, and return its DER bytes.
pub fn load_certificate_file(path: &Path) -> Result<Vec<u8>, Error> {
    let data = std::fs::read(path)?;
    let der = if data.starts_with(b"-----BEGIN") {
        certificate_der_from_pem(&data)?
    } else {
        data
    };
    // Fail early on garbage rather than at signing time.
    crate::x509::parse_der(&der)?;
    Ok(der)
}

/// Load a private key from a file, auto-detecting PEM or DER.
pub fn load_key_file(path: &Path) -> Result<Key, Error> {
    let data = std::fs::read(path)?;

    if data.starts_with(b"-----BEGIN") {
        return load_private_key_pem(&data);
    }

    if let Ok(key) = load_private_key_pkcs8_der(&data) {
        return Ok(key);
    }

    use pkcs1::DecodeRsaPrivateKey;
    if let Ok(pk) = rsa::RsaPrivateKey::from_pkcs1_der(&data) {
        return Ok(rsa_private_key(pk));
    }

    Err(Error::Key(format!(
        "unable to auto-detect key format from file: {}",
        path.display()
    )))
}

/// Load a private key and attach the certificate from a second file.
///
/// Fails if the certificate does not carry the key's public half.
pub fn load_signing_identity(key_path: &Path, cert_path: &Path) -> Result<Key, Error> {
    let mut key = load_key_file(key_path)?;
    let cert_der = load_certificate_file(cert_path)?;
    let cert = crate::x509::parse_der(&cert_der)?;
    if !key.matches_certificate(&cert) {
        return Err(Error::Key(format!(
            "certificate {} does not match private key {}",
            cert_path.display(),
            key_path.display()
        )));
    }
    key.x509_chain = vec![cert_der];
    key.usage = KeyUsage::Sign;
    Ok(key)
}

fn pem_text(pem_data: &[u8]) -> Result<&str, Error> {
    std::str::from_utf8(pem_data).map_err(|e| Error::Key(format!("invalid PEM encoding: {e}")))
}

fn rsa_private_key(pk: rsa::RsaPrivateKey) -> Key {
    let public = pk.to_public_key();
    Key::new(
        KeyData::Rsa {
            private: Some(pk),
            public,
        },
        KeyUsage::Any,
    )
}

fn ec_p256_private_key(sk: p256::ecdsa::SigningKey) -> Key {
    let public = *sk.verifying_key();
    Key::new(
        KeyData::EcP256 {
            private: Some(sk),
            public,
        },
        KeyUsage::Any,
    )
}
