//! Shared fixtures: canned page documents with known register values

#![allow(dead_code)]

use kotel2influx::client::page::parse_page;
use kotel2influx::client::typing::default_overrides;
use kotel2influx::client::{DeviceSnapshot, PageId};
use kotel2influx::mock::MockSession;
use std::collections::HashMap;

/// Render a page document from (register, raw value) pairs
pub fn page_xml(registers: &[(&str, &str)]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<PAGE>\n");
    for (name, value) in registers {
        xml.push_str(&format!(
            "  <INPUT TYPE=\"TEXT\" NAME=\"{name}\" VALUE=\"{value}\"/>\n"
        ));
    }
    xml.push_str("</PAGE>\n");
    xml
}

/// The six controller pages with hand-picked register values
///
/// Expected derivations: heating season 1 (mode 0, selector 0), compressor
/// enabled 1 (raw 0 inverted), boiler enabled 0 (raw 1 inverted).
pub fn fixture_pages() -> HashMap<PageId, String> {
    let mut pages = HashMap::new();

    pages.insert(
        PageId::Heating,
        page_xml(&[
            ("__R2373.1_BOOL_i", "0"),
            ("__R2376_REAL_.1f", "35.0"),
            ("__R2369_USINT_d", "7"),
            ("__R2502_REAL_.1f", "2.5"),
            ("__R2516_REAL_.1f", "-1.5"),
            ("__R2362.1_BOOL_i", "1"),
            ("__R190_USINT_u", "0"),
            ("__R196_USINT_u", "0"),
            ("__R23596_REAL_.1f", "21.5"),
        ]),
    );

    pages.insert(
        PageId::HotWater,
        page_xml(&[
            ("__R4501.1_BOOL_i", "1"),
            ("__R4513_REAL_.1f", "45.0"),
            ("__R4541_REAL_.1f", "40.0"),
            ("__R23612_REAL_.1f", "44.5"),
        ]),
    );

    pages.insert(
        PageId::Compressor,
        page_xml(&[("__R811.1_BOOL_i", "0"), ("__R23658_UDINT_u", "123456")]),
    );

    pages.insert(
        PageId::Boiler,
        page_xml(&[("__R1747.1_BOOL_i", "1"), ("__R1858_REAL_.1f", "-5.0")]),
    );

    pages.insert(
        PageId::Temperatures,
        page_xml(&[
            ("__R23101_REAL_.1f", "30.2"),
            ("__R23107_REAL_.1f", "46.8"),
            ("__R23083_REAL_.1f", "78.4"),
            ("__R23065_REAL_.1f", "8.3"),
            ("__R23071_REAL_.1f", "4.1"),
            ("__R23053_REAL_.1f", "28.9"),
            ("__R23059_REAL_.1f", "33.6"),
        ]),
    );

    pages.insert(
        PageId::Statuses,
        page_xml(&[
            ("__R24261.0_BOOL_i", "1"),
            ("__R24435.0_BOOL_i", "0"),
            ("__R24434.6_BOOL_i", "1"),
            ("__R24029.0_BOOL_i", "0"),
            ("__R24056.0_BOOL_i", "0"),
            ("__R24083.0_BOOL_i", "1"),
            ("__R24137.0_BOOL_i", "1"),
            ("__R24434.7_BOOL_i", "1"),
        ]),
    );

    pages
}

/// A scripted session serving the full fixture page set
pub fn fixture_session() -> MockSession {
    MockSession::new(fixture_pages())
}

/// The fixture pages parsed into a ready snapshot
pub fn fixture_snapshot() -> DeviceSnapshot {
    let overrides = default_overrides();
    fixture_pages()
        .iter()
        .map(|(page, xml)| (*page, parse_page(xml, &overrides).unwrap()))
        .collect()
}
