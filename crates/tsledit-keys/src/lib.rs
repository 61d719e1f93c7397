#![forbid(unsafe_code)]

//! Key management for tsledit.
//!
//! Loads signing keys and certificates from PEM/DER, reads and writes the
//! `KeyInfo` material of a signature, extracts the certificate facts a
//! trust list records, and models key stores as scoped providers.

pub mod key;
pub mod keyinfo;
pub mod loader;
pub mod manager;
pub mod provider;
pub mod x509;

pub use key::{Key, KeyData, KeyUsage};
pub use manager::KeysManager;
pub use provider::{KeyProvider, PemDirectoryProvider, ProviderSession};
