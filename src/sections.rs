//! Split a free-text block into labeled sections by `【...】` markers
//!
//! Each configured marker found in the text opens a section that runs up to the
//! next `【` after it, whether or not that bracket belongs to a configured
//! marker, or to the end of the text. Markers are searched independently, so a
//! repeated marker only counts at its first occurrence.

use std::collections::BTreeMap;

const OPEN_BRACKET: char = '【';

/// A bracketed heading and the key its section is stored under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionMarker {
    pub key: &'static str,
    pub marker: &'static str,
}

impl SectionMarker {
    pub const fn new(key: &'static str, marker: &'static str) -> Self {
        Self { key, marker }
    }
}

/// Section key to section text (marker included, whitespace trimmed)
pub type Sections = BTreeMap<String, String>;

pub fn split_sections(text: &str, markers: &[SectionMarker]) -> Sections {
    let mut sections = Sections::new();

    for m in markers {
        let Some(start) = text.find(m.marker) else {
            continue;
        };
        let after_open = start + text[start..].chars().next().map_or(0, char::len_utf8);
        let end = text[after_open..]
            .find(OPEN_BRACKET)
            .map_or(text.len(), |offset| after_open + offset);

        sections.insert(m.key.to_string(), text[start..end].trim().to_string());
    }

    sections
}

/// Whether the markers present in `text` occur in the configured order.
///
/// When they do not, sections are still cut at the next `【`, but the result
/// may not match what a reader of the page would call each section.
pub fn markers_in_order(text: &str, markers: &[SectionMarker]) -> bool {
    let positions: Vec<usize> = markers.iter().filter_map(|m| text.find(m.marker)).collect();
    positions.windows(2).all(|pair| pair[0] < pair[1])
}
