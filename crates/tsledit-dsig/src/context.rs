#![forbid(unsafe_code)]

//! Signature configuration and the signing context.

use time::OffsetDateTime;
use tsledit_c14n::C14nMode;
use tsledit_core::algorithm::{self, KeyFamily};
use tsledit_core::Error;
use tsledit_keys::Key;

/// Algorithm choices for a new signature.
///
/// The signature method is not configured directly: it follows from the
/// key family and `digest_method`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureConfig {
    /// Digest of both references.
    pub digest_method: String,
    /// Canonicalization of `SignedInfo` and of each reference.
    pub c14n: C14nMode,
    /// Digest of the signing certificate in the XAdES `CertDigest`.
    pub cert_digest_method: String,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            digest_method: algorithm::SHA256.to_owned(),
            c14n: C14nMode::Exclusive,
            cert_digest_method: algorithm::SHA1.to_owned(),
        }
    }
}

impl SignatureConfig {
    pub fn with_digest_method(mut self, uri: &str) -> Self {
        self.digest_method = uri.to_owned();
        self
    }

    pub fn with_c14n(mut self, mode: C14nMode) -> Self {
        self.c14n = mode;
        self
    }

    pub fn with_cert_digest_method(mut self, uri: &str) -> Self {
        self.cert_digest_method = uri.to_owned();
        self
    }

    /// The signature method URI for a key of the given family.
    pub fn signature_method(&self, family: KeyFamily) -> Result<&'static str, Error> {
        algorithm::signature_method_for(family, &self.digest_method).ok_or_else(|| {
            Error::UnsupportedAlgorithm(format!(
                "no signature method for {family:?} with digest {}",
                self.digest_method
            ))
        })
    }

    /// Reject digest URIs the crypto layer cannot compute.
    pub fn validate(&self) -> Result<(), Error> {
        tsledit_crypto::digest::from_uri(&self.digest_method)?;
        tsledit_crypto::digest::from_uri(&self.cert_digest_method)?;
        Ok(())
    }
}

/// Everything needed to produce one signature.
pub struct DsigContext {
    /// Private key; must match `certificate_der`.
    pub key: Key,
    /// DER of the signer certificate embedded in `KeyInfo`.
    pub certificate_der: Vec<u8>,
    pub config: SignatureConfig,
    /// Fixed signing time; the current time when `None`.
    pub signing_time: Option<OffsetDateTime>,
}

impl DsigContext {
    pub fn new(key: Key, certificate_der: Vec<u8>) -> Self {
        Self {
            key,
            certificate_der,
            config: SignatureConfig::default(),
            signing_time: None,
        }
    }

    pub fn with_config(mut self, config: SignatureConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_signing_time(mut self, t: OffsetDateTime) -> Self {
        self.signing_time = Some(t);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SignatureConfig::default();
        assert_eq!(config.digest_method, algorithm::SHA256);
        assert_eq!(config.cert_digest_method, algorithm::SHA1);
        assert_eq!(config.c14n, C14nMode::Exclusive);
        assert_eq!(
            config.signature_method(KeyFamily::Rsa).unwrap(),
            algorithm::RSA_SHA256
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn sha1_selects_sha1_signature_methods() {
        let config = SignatureConfig::default().with_digest_method(algorithm::SHA1);
        assert_eq!(
            config.signature_method(KeyFamily::EcP256).unwrap(),
            algorithm::ECDSA_SHA1
        );
    }

    #[test]
    fn unknown_digest_is_rejected() {
        let config = SignatureConfig::default()
            .with_digest_method("http://www.w3.org/2001/04/xmldsig-more#md5");
        assert!(matches!(config.validate(), Err(Error::UnsupportedAlgorithm(_))));
        assert!(matches!(
            config.signature_method(KeyFamily::Rsa),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }
}
