#![forbid(unsafe_code)]

//! XML writing utilities over `quick-xml`, used for marshalling trust lists
//! and building signature templates.

use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::Writer;
use std::borrow::Cow;
use tsledit_core::Error;

/// A streaming XML writer. No XML declaration is ever emitted.
pub struct XmlWriter {
    writer: Writer<Vec<u8>>,
}

impl XmlWriter {
    /// Create a new XML writer.
    pub fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    /// Start an element with the given name and optional attributes.
    pub fn start_element(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), Error> {
        self.emit(Event::Start(start_tag(name, attrs)))
    }

    /// Write an empty element (self-closing).
    pub fn empty_element(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), Error> {
        self.emit(Event::Empty(start_tag(name, attrs)))
    }

    /// End the current element.
    pub fn end_element(&mut self, name: &str) -> Result<(), Error> {
        self.emit(Event::End(BytesEnd::new(name)))
    }

    /// Write text content. Markup characters are escaped, and so is a
    /// carriage return, which a parser would otherwise fold into a newline.
    pub fn write_text(&mut self, text: &str) -> Result<(), Error> {
        self.emit(Event::Text(BytesText::from_escaped(escape_text(text))))
    }

    /// Write already serialized markup as is. It must be well-formed and
    /// declare every namespace it uses.
    pub fn write_raw(&mut self, markup: &str) -> Result<(), Error> {
        self.emit(Event::Text(BytesText::from_escaped(markup)))
    }

    /// `<name attrs>text</name>`, the shape most TSL leaves take.
    pub fn text_element(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
        text: &str,
    ) -> Result<(), Error> {
        self.start_element(name, attrs)?;
        self.write_text(text)?;
        self.end_element(name)
    }

    /// Finish writing and return the XML bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_inner()
    }

    /// Finish writing and return the XML as a string.
    pub fn into_string(self) -> Result<String, Error> {
        String::from_utf8(self.into_bytes()).map_err(|e| Error::Other(format!("invalid UTF-8: {e}")))
    }

    fn emit(&mut self, event: Event<'_>) -> Result<(), Error> {
        self.writer
            .write_event(event)
            .map_err(|e| Error::Other(format!("XML write error: {e}")))
    }
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn start_tag<'a>(name: &'a str, attrs: &[(&'a str, &'a str)]) -> BytesStart<'a> {
    let mut tag = BytesStart::new(name);
    for (key, value) in attrs {
        tag.push_attribute(Attribute {
            key: QName(key.as_bytes()),
            value: Cow::Owned(escape_attribute(value).into_bytes()),
        });
    }
    tag
}

fn escape_text(text: &str) -> String {
    partial_escape(text).replace('\r', "&#13;")
}

// Attribute value normalization turns literal whitespace into spaces.
fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in escape(value).chars() {
        match c {
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            c => out.push(c),
        }
    }
    out
}
