#![forbid(unsafe_code)]

//! Key manager with named key store.

use crate::key::{Key, KeyUsage};
use tsledit_core::Error;

/// A collection of keys, looked up by alias when a provider hands out a
/// signing identity.
#[derive(Debug, Default)]
pub struct KeysManager {
    keys: Vec<Key>,
}

impl KeysManager {
    /// Create an empty keys manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key to the manager.
    pub fn add_key(&mut self, key: Key) {
        self.keys.push(key);
    }

    /// Find a key by name.
    pub fn find_by_name(&self, name: &str) -> Option<&Key> {
        self.keys.iter().find(|k| k.name.as_deref() == Some(name))
    }

    /// Find the first key matching the given usage.
    pub fn find_by_usage(&self, usage: KeyUsage) -> Option<&Key> {
        self.keys
            .iter()
            .find(|k| k.usage == usage || k.usage == KeyUsage::Any)
    }

    /// Names of all named keys, in insertion order.
    pub fn names(&self) -> Vec<String> {
        self.keys.iter().filter_map(|k| k.name.clone()).collect()
    }

    /// Iterator over all keys.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.keys.iter()
    }

    /// Get the first key available (for simple single-key scenarios).
    pub fn first_key(&self) -> Result<&Key, Error> {
        self.keys
            .first()
            .ok_or_else(|| Error::KeyNotFound("no keys in manager".into()))
    }

    /// Drop every key.
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyData;

    fn named(name: &str, usage: KeyUsage) -> Key {
        let sk = p256::ecdsa::SigningKey::from_slice(&[3u8; 32]).unwrap();
        let public = *sk.verifying_key();
        Key::new(KeyData::EcP256 { private: Some(sk), public }, usage).with_name(name)
    }

    #[test]
    fn lookup_by_name_and_usage() {
        let mut mgr = KeysManager::new();
        assert!(matches!(mgr.first_key(), Err(Error::KeyNotFound(_))));

        mgr.add_key(named("verify-only", KeyUsage::Verify));
        mgr.add_key(named("operator", KeyUsage::Sign));

        assert_eq!(mgr.len(), 2);
        assert_eq!(mgr.names(), vec!["verify-only", "operator"]);
        assert!(mgr.find_by_name("operator").is_some());
        assert!(mgr.find_by_name("missing").is_none());
        assert_eq!(
            mgr.find_by_usage(KeyUsage::Sign).unwrap().name.as_deref(),
            Some("operator")
        );

        mgr.clear();
        assert!(mgr.is_empty());
    }
}
