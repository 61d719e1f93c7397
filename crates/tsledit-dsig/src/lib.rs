#![forbid(unsafe_code)]

//! Enveloped XML-DSig signatures with XAdES-BES qualifying properties.
//!
//! [`sign::sign_enveloped`] appends a signature to the document element of
//! a serialized trust list; [`verify::verify`] checks it against the
//! certificate embedded in its `KeyInfo`.

pub mod context;
pub mod sign;
pub mod verify;
pub mod xades;

pub use context::{DsigContext, SignatureConfig};
pub use sign::sign_enveloped;
pub use verify::{verify, VerifyResult};
