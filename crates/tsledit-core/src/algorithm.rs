#![forbid(unsafe_code)]

//! Algorithm URI constants.
//!
//! Each constant is the canonical URI string that appears in `Algorithm`
//! attributes of a signature.

// ── Canonicalization ─────────────────────────────────────────────────

pub const EXC_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";
pub const EXC_C14N_WITH_COMMENTS: &str = "http://www.w3.org/2001/10/xml-exc-c14n#WithComments";

// ── Digest algorithms ────────────────────────────────────────────────

pub const SHA1: &str = "http://www.w3.org/2000/09/xmldsig#sha1";
pub const SHA256: &str = "http://www.w3.org/2001/04/xmlenc#sha256";

// ── RSA signature algorithms ─────────────────────────────────────────

pub const RSA_SHA1: &str = "http://www.w3.org/2000/09/xmldsig#rsa-sha1";
pub const RSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";

// ── ECDSA signature algorithms ───────────────────────────────────────

pub const ECDSA_SHA1: &str = "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha1";
pub const ECDSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha256";

// ── Transform algorithms ─────────────────────────────────────────────

pub const ENVELOPED_SIGNATURE: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";

// ── KeyValue type URIs ───────────────────────────────────────────────

pub const RSA_KEY_VALUE: &str = "http://www.w3.org/2000/09/xmldsig#RSAKeyValue";
pub const EC_KEY_VALUE: &str = "http://www.w3.org/2009/xmldsig11#ECKeyValue";

// ── X509 URIs ────────────────────────────────────────────────────────

pub const X509_DATA: &str = "http://www.w3.org/2000/09/xmldsig#X509Data";

// ── XAdES ────────────────────────────────────────────────────────────

/// Reference `Type` of the XAdES `SignedProperties` block.
pub const XADES_SIGNED_PROPERTIES: &str = "http://uri.etsi.org/01903#SignedProperties";

/// Signature method for a key family and reference digest.
///
/// Returns `None` for combinations that have no URI.
pub fn signature_method_for(key_family: KeyFamily, digest_uri: &str) -> Option<&'static str> {
    match (key_family, digest_uri) {
        (KeyFamily::Rsa, SHA1) => Some(RSA_SHA1),
        (KeyFamily::Rsa, SHA256) => Some(RSA_SHA256),
        (KeyFamily::EcP256, SHA1) => Some(ECDSA_SHA1),
        (KeyFamily::EcP256, SHA256) => Some(ECDSA_SHA256),
        _ => None,
    }
}

/// Asymmetric key families that can produce a TSL signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFamily {
    Rsa,
    EcP256,
}
