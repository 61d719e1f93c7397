#![forbid(unsafe_code)]

//! `xs:dateTime` values as trust lists and XAdES write them.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};
use tsledit_core::Error;

/// Format as `YYYY-MM-DDThh:mm:ssZ`, in UTC, without fractional seconds.
pub fn format(t: OffsetDateTime) -> Result<String, Error> {
    let utc = t.to_offset(UtcOffset::UTC);
    utc.replace_nanosecond(0)
        .map_err(|e| Error::Other(format!("invalid time: {e}")))?
        .format(&Rfc3339)
        .map_err(|e| Error::Other(format!("cannot format date-time: {e}")))
}

/// Parse an `xs:dateTime`. A value without a zone designator is taken as
/// UTC.
pub fn parse(text: &str) -> Result<OffsetDateTime, Error> {
    let text = text.trim();
    if let Ok(t) = OffsetDateTime::parse(text, &Rfc3339) {
        return Ok(t.to_offset(UtcOffset::UTC));
    }
    let local = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    PrimitiveDateTime::parse(text, &local)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|e| Error::XmlStructure(format!("invalid dateTime '{text}': {e}")))
}
