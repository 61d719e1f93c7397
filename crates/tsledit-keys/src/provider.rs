#![forbid(unsafe_code)]

//! Key providers.
//!
//! A provider is a key store that must be registered before use and
//! deregistered afterwards, the way a PKCS#11 token is. [`ProviderSession`]
//! holds a provider open for a scope and closes it on drop, on every exit
//! path.

use crate::key::Key;
use crate::manager::KeysManager;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use tsledit_core::Error;

/// A store of signing identities addressed by alias.
pub trait KeyProvider {
    /// Human-readable provider name, used in log output.
    fn name(&self) -> &str;

    /// Register the provider and make its keys available.
    fn open(&mut self) -> Result<(), Error>;

    /// Aliases of the private keys the provider holds.
    fn aliases(&self) -> Result<Vec<String>, Error>;

    /// The private key (with certificate chain) stored under `alias`.
    fn private_key(&self, alias: &str) -> Result<Key, Error>;

    /// Deregister the provider. Must be safe to call on a provider that
    /// failed to open.
    fn close(&mut self);
}

/// Scoped registration of a [`KeyProvider`].
pub struct ProviderSession<'a, P: KeyProvider + ?Sized> {
    provider: &'a mut P,
}

impl<'a, P: KeyProvider + ?Sized> ProviderSession<'a, P> {
    /// Open `provider` for the lifetime of the returned guard.
    pub fn open(provider: &'a mut P) -> Result<Self, Error> {
        log::debug!("opening key provider {}", provider.name());
        if let Err(e) = provider.open() {
            provider.close();
            return Err(e);
        }
        Ok(Self { provider })
    }
}

impl<P: KeyProvider + ?Sized> Deref for ProviderSession<'_, P> {
    type Target = P;

    fn deref(&self) -> &P {
        self.provider
    }
}

impl<P: KeyProvider + ?Sized> DerefMut for ProviderSession<'_, P> {
    fn deref_mut(&mut self) -> &mut P {
        self.provider
    }
}

impl<P: KeyProvider + ?Sized> Drop for ProviderSession<'_, P> {
    fn drop(&mut self) {
        log::debug!("closing key provider {}", self.provider.name());
        self.provider.close();
    }
}

// ── PEM directory ────────────────────────────────────────────────────

/// Keys stored as `<alias>.pem` private keys next to `<alias>.crt`
/// certificates in one directory.
#[derive(Debug)]
pub struct PemDirectoryProvider {
    dir: PathBuf,
    keys: KeysManager,
    open: bool,
}

impl PemDirectoryProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            keys: KeysManager::new(),
            open: false,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.open {
            Ok(())
        } else {
            Err(Error::Key(format!("key provider {} is not open", self.dir.display())))
        }
    }
}

impl KeyProvider for PemDirectoryProvider {
    fn name(&self) -> &str {
        "pem-directory"
    }

    fn open(&mut self) -> Result<(), Error> {
        let mut entries: Vec<PathBuf> = std::fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "pem"))
            .collect();
        entries.sort();

        for key_path in entries {
            let cert_path = key_path.with_extension("crt");
            if !cert_path.exists() {
                log::debug!("skipping {}: no certificate", key_path.display());
                continue;
            }
            let Some(alias) = key_path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let key = crate::loader::load_signing_identity(&key_path, &cert_path)?;
            self.keys.add_key(key.with_name(alias));
        }
        self.open = true;
        log::debug!(
            "key provider {} holds {} key(s)",
            self.dir.display(),
            self.keys.len()
        );
        Ok(())
    }

    fn aliases(&self) -> Result<Vec<String>, Error> {
        self.ensure_open()?;
        Ok(self.keys.names())
    }

    fn private_key(&self, alias: &str) -> Result<Key, Error> {
        self.ensure_open()?;
        self.keys
            .find_by_name(alias)
            .cloned()
            .ok_or_else(|| Error::KeyNotFound(format!("no key with alias {alias}")))
    }

    fn close(&mut self) {
        self.keys.clear();
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingProvider {
        fail_open: bool,
        opened: usize,
        closed: usize,
    }

    impl KeyProvider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }

        fn open(&mut self) -> Result<(), Error> {
            self.opened += 1;
            if self.fail_open {
                Err(Error::Key("token absent".into()))
            } else {
                Ok(())
            }
        }

        fn aliases(&self) -> Result<Vec<String>, Error> {
            Ok(vec!["signer".into()])
        }

        fn private_key(&self, alias: &str) -> Result<Key, Error> {
            Err(Error::KeyNotFound(alias.into()))
        }

        fn close(&mut self) {
            self.closed += 1;
        }
    }

    fn use_session(provider: &mut CountingProvider) -> Result<Key, Error> {
        let session = ProviderSession::open(provider)?;
        assert_eq!(session.aliases()?, vec!["signer"]);
        session.private_key("signer")
    }

    #[test]
    fn session_closes_on_error_path() {
        let mut provider = CountingProvider::default();
        assert!(use_session(&mut provider).is_err());
        assert_eq!((provider.opened, provider.closed), (1, 1));
    }

    #[test]
    fn failed_open_still_closes() {
        let mut provider = CountingProvider {
            fail_open: true,
            ..Default::default()
        };
        assert!(ProviderSession::open(&mut provider).is_err());
        assert_eq!((provider.opened, provider.closed), (1, 1));
    }

    fn write_identity(dir: &Path, alias: &str) {
        let key_pair = rcgen::KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256).unwrap();
        let cert = rcgen::CertificateParams::new(vec![format!("{alias}.example")])
            .unwrap()
            .self_signed(&key_pair)
            .unwrap();
        std::fs::write(dir.join(format!("{alias}.pem")), key_pair.serialize_pem()).unwrap();
        std::fs::write(dir.join(format!("{alias}.crt")), cert.pem()).unwrap();
    }

    #[test]
    fn pem_directory_lists_paired_keys() {
        let dir = tempfile::tempdir().unwrap();
        write_identity(dir.path(), "operator");
        write_identity(dir.path(), "backup");
        std::fs::write(dir.path().join("orphan.pem"), "ignored").unwrap();

        let mut provider = PemDirectoryProvider::new(dir.path());
        assert!(provider.aliases().is_err());
        {
            let session = ProviderSession::open(&mut provider).unwrap();
            assert_eq!(session.aliases().unwrap(), vec!["backup", "operator"]);
            let key = session.private_key("operator").unwrap();
            assert!(key.has_private());
            assert_eq!(key.x509_chain.len(), 1);
            assert!(matches!(
                session.private_key("nobody"),
                Err(Error::KeyNotFound(_))
            ));
        }
        assert!(!provider.is_open());
        assert!(provider.private_key("operator").is_err());
    }
}
