//! Label-anchored lookups on the SwissADME results table.
//!
//! Every property sits in a two-cell row: a label cell followed by a value cell. The
//! value is found by locating the first `td` whose normalized text starts with the
//! label and reading its next sibling.

use std::time::Duration;

use super::session::BrowserSession;
use super::{ExtractionResult, Property};

/// Cell whose presence means the remote computation finished.
pub const RESULTS_MARKER_XPATH: &str = "//td[normalize-space(.)='Molecular weight']";

/// XPath 1.0 has no escape sequence, so a label containing `'` goes through `concat()`.
pub fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        return format!("'{text}'");
    }
    if !text.contains('"') {
        return format!("\"{text}\"");
    }

    let parts = text
        .split('\'')
        .map(|part| format!("'{part}'"))
        .collect::<Vec<_>>()
        .join(", \"'\", ");
    format!("concat({parts})")
}

pub fn label_xpath(label: &str) -> String {
    format!(
        "//td[starts-with(normalize-space(.), {})]/following-sibling::td",
        xpath_literal(label)
    )
}

pub fn clean_value(property: Property, raw: &str) -> Option<String> {
    let value = raw.trim();
    let value = match property {
        // "63.60 Å²" -> "63.60"
        Property::Tpsa => value.split_whitespace().next().unwrap_or(""),
        _ => value,
    };

    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Absent labels are routine (not every molecule gets every row), so any failure
/// here is reported as `None` rather than an error.
pub fn extract_field<S: BrowserSession + ?Sized>(
    session: &mut S,
    property: Property,
    timeout: Duration,
) -> Option<String> {
    match session.inner_text(&label_xpath(property.label()), timeout) {
        Ok(raw) => clean_value(property, &raw),
        Err(e) => {
            log::debug!("field {:?} unavailable: {}", property.label(), e);
            None
        }
    }
}

pub fn extract_all<S: BrowserSession + ?Sized>(
    session: &mut S,
    result: &mut ExtractionResult,
    timeout: Duration,
) {
    for property in Property::ALL {
        let value = extract_field(session, property, timeout);
        result.set(property, value);
    }
}
