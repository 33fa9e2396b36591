//! Device page parsing
//!
//! Controller pages are XML documents whose root holds a flat list of
//! `INPUT` elements, each with a `NAME` and a `VALUE` attribute. A page
//! parse retypes every register through [`crate::client::typing`].

use crate::client::typing::{retype, TypeOverrides};
use crate::client::PageSnapshot;
use crate::error::{KotelError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

/// Parse one page document into a snapshot of typed registers
///
/// Malformed XML is a parse error. A well-formed document without any
/// `INPUT` elements yields an empty snapshot; whether that means a
/// dropped session is for the caller's retry policy to decide.
pub fn parse_page(content: &str, overrides: &TypeOverrides) -> Result<PageSnapshot> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut registers = PageSnapshot::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"INPUT" {
                    let (name, value) = input_attributes(&e)?;
                    let typed = retype(&name, &value, overrides)?;
                    registers.insert(name, typed);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(KotelError::parse(format!(
                    "Malformed page document at position {}: {e}",
                    reader.buffer_position()
                )))
            }
        }
    }

    debug!("Found {} registers in page", registers.len());
    Ok(registers)
}

/// Extract the NAME/VALUE attribute pair of one INPUT element
fn input_attributes(element: &BytesStart<'_>) -> Result<(String, String)> {
    let name = attribute(element, b"NAME")?;
    let value = attribute(element, b"VALUE")?;
    Ok((name, value))
}

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Result<String> {
    let attr = element
        .try_get_attribute(key)
        .map_err(|e| KotelError::parse(format!("Malformed INPUT attribute: {e}")))?
        .ok_or_else(|| {
            KotelError::parse(format!(
                "INPUT element missing {} attribute",
                String::from_utf8_lossy(key)
            ))
        })?;

    let value = attr
        .unescape_value()
        .map_err(|e| KotelError::parse(format!("Malformed INPUT attribute value: {e}")))?;
    Ok(value.into_owned())
}
