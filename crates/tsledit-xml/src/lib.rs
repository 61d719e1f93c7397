#![forbid(unsafe_code)]

//! XML document abstraction for tsledit.
//!
//! Provides a DOM-like interface over `roxmltree` for reading, a
//! `quick-xml` backed writer for producing documents, plus the `NodeSet`
//! needed for canonicalization and signature transforms.

pub mod datetime;
pub mod document;
pub mod nodeset;
pub mod writer;
pub mod xpath;

pub use document::XmlDocument;
pub use nodeset::NodeSet;
pub use writer::XmlWriter;

/// Return roxmltree parsing options that allow DTD.
///
/// roxmltree never expands external entities, so accepting a DTD is safe.
/// Some published trust lists still carry a DOCTYPE.
pub fn parsing_options() -> roxmltree::ParsingOptions {
    roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    }
}
