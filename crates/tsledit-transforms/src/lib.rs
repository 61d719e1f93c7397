#![forbid(unsafe_code)]

//! Transform pipeline for XML-DSig references.
//!
//! Each reference of a signature names a sequence of transforms that are
//! applied in order to the node set its URI selects. Trust list signatures
//! use two: the enveloped-signature transform and exclusive
//! canonicalization.

pub mod enveloped;
pub mod pipeline;
pub mod uri;

pub use enveloped::EnvelopedSignatureTransform;
pub use pipeline::{C14nTransform, Transform, TransformData, TransformPipeline};
