#![forbid(unsafe_code)]

//! Shared error type, namespace and algorithm constants.

pub mod algorithm;
pub mod error;
pub mod ns;

pub use error::{Error, Result};
