#![forbid(unsafe_code)]

//! ETSI Trust Service Status Lists (TS 102 231 v2, version 3 documents).
//!
//! [`TrustList`] holds the scheme information and providers of a list and
//! drives its lifecycle: load, edit, sign with an enveloped XAdES-BES
//! signature, save, verify.
//!
//! ```no_run
//! use tsledit_list::{CountryProfile, TrustList};
//! use std::path::Path;
//!
//! # fn main() -> tsledit_core::Result<()> {
//! let key = tsledit_keys::loader::load_signing_identity(
//!     Path::new("operator.pem"),
//!     Path::new("operator.crt"),
//! )?;
//! let cert = key.x509_chain[0].clone();
//!
//! let mut list = TrustList::new();
//! CountryProfile::belgium().apply(&mut list, time::OffsetDateTime::now_utc())?;
//! list.sign(&key, &cert)?;
//! list.save("tsl-be.xml")?;
//!
//! let reloaded = TrustList::load("tsl-be.xml")?;
//! assert!(reloaded.verify().is_some());
//! # Ok(())
//! # }
//! ```

mod element;
mod marshal;
mod unmarshal;

pub mod country;
pub mod lang;
pub mod list;
pub mod profile;
pub mod provider;
pub mod service;

pub use country::EuCountry;
pub use lang::{LangString, LangStrings};
pub use list::{fingerprint, OtherTslPointer, SignatureStatus, TrustList};
pub use profile::{CountryProfile, ProviderProfile, ServiceProfile};
pub use provider::{PostalAddress, TrustServiceProvider};
pub use service::{
    DigitalIdentity, OtherExtension, PolicyIdentifier, Qualification, ServiceHistoryInstance,
    TrustService,
};
pub use tsledit_dsig::SignatureConfig;
