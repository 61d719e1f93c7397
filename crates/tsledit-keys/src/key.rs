#![forbid(unsafe_code)]

//! Key types and data structures.

use tsledit_core::Error;
use tsledit_crypto::SigningKey;

/// Usage flags for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyUsage {
    Sign,
    Verify,
    Any,
}

/// The underlying key data.
#[derive(Clone)]
pub enum KeyData {
    Rsa {
        private: Option<rsa::RsaPrivateKey>,
        public: rsa::RsaPublicKey,
    },
    EcP256 {
        private: Option<p256::ecdsa::SigningKey>,
        public: p256::ecdsa::VerifyingKey,
    },
}

impl std::fmt::Debug for KeyData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rsa { private, .. } => {
                if private.is_some() {
                    write!(f, "RSA private+public key")
                } else {
                    write!(f, "RSA public key")
                }
            }
            Self::EcP256 { private, .. } => {
                if private.is_some() {
                    write!(f, "EC P-256 private+public key")
                } else {
                    write!(f, "EC P-256 public key")
                }
            }
        }
    }
}

/// A named key with associated data.
#[derive(Debug, Clone)]
pub struct Key {
    /// Optional name (token alias) for key lookup.
    pub name: Option<String>,
    pub data: KeyData,
    pub usage: KeyUsage,
    /// X.509 certificate chain (DER-encoded), signer certificate first.
    pub x509_chain: Vec<Vec<u8>>,
}

impl Key {
    /// Create a new key.
    pub fn new(data: KeyData, usage: KeyUsage) -> Self {
        Self {
            name: None,
            data,
            usage,
            x509_chain: Vec::new(),
        }
    }

    /// Set the key name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Convert to a `SigningKey` for use with crypto algorithms.
    pub fn to_signing_key(&self) -> SigningKey {
        match &self.data {
            KeyData::Rsa { private: Some(pk), .. } => SigningKey::Rsa(pk.clone()),
            KeyData::Rsa { public, .. } => SigningKey::RsaPublic(public.clone()),
            KeyData::EcP256 { private: Some(sk), .. } => SigningKey::EcP256(sk.clone()),
            KeyData::EcP256 { public, .. } => SigningKey::EcP256Public(*public),
        }
    }

    pub fn has_private(&self) -> bool {
        matches!(
            &self.data,
            KeyData::Rsa { private: Some(_), .. } | KeyData::EcP256 { private: Some(_), .. }
        )
    }

    /// Get the RSA public key if available.
    pub fn rsa_public_key(&self) -> Option<&rsa::RsaPublicKey> {
        match &self.data {
            KeyData::Rsa { public, .. } => Some(public),
            _ => None,
        }
    }

    /// Get the P-256 public key if available.
    pub fn ec_p256_public_key(&self) -> Option<&p256::ecdsa::VerifyingKey> {
        match &self.data {
            KeyData::EcP256 { public, .. } => Some(public),
            _ => None,
        }
    }

    /// The first certificate of the chain, parsed.
    pub fn certificate(&self) -> Result<x509_cert::Certificate, Error> {
        let der = self
            .x509_chain
            .first()
            .ok_or_else(|| Error::Certificate("key carries no certificate".into()))?;
        crate::x509::parse_der(der)
    }

    /// True if `cert` carries this key's public key.
    pub fn matches_certificate(&self, cert: &x509_cert::Certificate) -> bool {
        use der::Encode;
        let Ok(spki_der) = cert.tbs_certificate.subject_public_key_info.to_der() else {
            return false;
        };
        match crate::loader::load_spki_der(&spki_der) {
            Ok(cert_key) => match (&self.data, &cert_key.data) {
                (KeyData::Rsa { public: a, .. }, KeyData::Rsa { public: b, .. }) => a == b,
                (KeyData::EcP256 { public: a, .. }, KeyData::EcP256 { public: b, .. }) => a == b,
                _ => false,
            },
            Err(_) => false,
        }
    }
}
