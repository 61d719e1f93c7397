#![forbid(unsafe_code)]

//! Cryptographic algorithm implementations for tsledit.
//!
//! Provides the digest and signature algorithms a trust list signature can
//! name, looked up by their XML-DSig URIs.

pub mod digest;
pub mod sign;

pub use digest::DigestAlgorithm;
pub use sign::{SignatureAlgorithm, SigningKey};
