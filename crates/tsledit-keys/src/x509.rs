#![forbid(unsafe_code)]

//! X.509 certificate facts recorded in trust lists and signatures.
//!
//! A trust service is identified by its certificate, subject name and
//! subject key identifier; a XAdES signature names its signer by issuer and
//! decimal serial number. These helpers extract those values.

use der::{Decode, Encode};
use time::OffsetDateTime;
use tsledit_core::{algorithm, Error};
use x509_cert::Certificate;

/// Parse a DER certificate.
pub fn parse_der(der: &[u8]) -> Result<Certificate, Error> {
    Certificate::from_der(der)
        .map_err(|e| Error::Certificate(format!("failed to parse X.509 certificate: {e}")))
}

/// DER encoding of a parsed certificate.
pub fn to_der(cert: &Certificate) -> Result<Vec<u8>, Error> {
    cert.to_der()
        .map_err(|e| Error::Certificate(format!("failed to encode X.509 certificate: {e}")))
}

/// Subject distinguished name in RFC 4514 form.
pub fn subject_name(cert: &Certificate) -> String {
    cert.tbs_certificate.subject.to_string()
}

/// Issuer distinguished name in RFC 4514 form.
pub fn issuer_name(cert: &Certificate) -> String {
    cert.tbs_certificate.issuer.to_string()
}

/// Serial number as an unsigned decimal string, as XML-DSig writes it.
pub fn serial_decimal(cert: &Certificate) -> String {
    rsa::BigUint::from_bytes_be(cert.tbs_certificate.serial_number.as_bytes()).to_string()
}

/// Start of the validity period.
pub fn not_before(cert: &Certificate) -> Result<OffsetDateTime, Error> {
    validity_time(&cert.tbs_certificate.validity.not_before)
}

/// End of the validity period.
pub fn not_after(cert: &Certificate) -> Result<OffsetDateTime, Error> {
    validity_time(&cert.tbs_certificate.validity.not_after)
}

fn validity_time(t: &x509_cert::time::Time) -> Result<OffsetDateTime, Error> {
    let secs = i64::try_from(t.to_unix_duration().as_secs())
        .map_err(|_| Error::Certificate("validity time out of range".into()))?;
    OffsetDateTime::from_unix_timestamp(secs)
        .map_err(|e| Error::Certificate(format!("validity time out of range: {e}")))
}

/// Subject key identifier.
///
/// Taken from the extension when present, otherwise derived as the SHA-1 of
/// the subject public key bits (RFC 5280 section 4.2.1.2, method 1).
pub fn subject_key_identifier(cert: &Certificate) -> Result<Vec<u8>, Error> {
    use der::oid::AssociatedOid;
    use x509_cert::ext::pkix::SubjectKeyIdentifier;

    if let Some(exts) = &cert.tbs_certificate.extensions {
        for ext in exts.iter() {
            if ext.extn_id == SubjectKeyIdentifier::OID {
                let ski = SubjectKeyIdentifier::from_der(ext.extn_value.as_bytes())
                    .map_err(|e| Error::Certificate(format!("invalid subject key identifier: {e}")))?;
                return Ok(ski.0.as_bytes().to_vec());
            }
        }
    }
    let key_bits = cert
        .tbs_certificate
        .subject_public_key_info
        .subject_public_key
        .raw_bytes();
    tsledit_crypto::digest::digest(algorithm::SHA1, key_bits)
}

/// Hex fingerprint of a DER certificate under the given digest URI.
pub fn fingerprint(cert_der: &[u8], digest_uri: &str) -> Result<String, Error> {
    tsledit_crypto::digest::hex_digest(digest_uri, cert_der)
}
