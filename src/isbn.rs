use std::sync::LazyLock;

use regex::Regex;

use crate::error::ExtractionWarning;

static ISBN13: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(978[0-9]{9}[0-9Xx])").expect("valid isbn13 regex"));
static ISBN10: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([0-9]{9}[0-9Xx])").expect("valid isbn10 regex"));
static NINE_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{9}").expect("valid digit-run regex"));

/// Finds an ISBN inside free-form edition text.
///
/// ISBN-13 (`978` prefix) wins over ISBN-10. A nine-digit run that fits
/// neither shape is reported as a warning instead of being dropped silently.
pub fn parse_edition_isbn(edition: &str) -> Result<Option<String>, ExtractionWarning> {
    if let Some(caps) = ISBN13.captures(edition) {
        return Ok(Some(caps[1].to_owned()));
    }
    if let Some(caps) = ISBN10.captures(edition) {
        return Ok(Some(caps[1].to_owned()));
    }
    if NINE_DIGITS.is_match(edition) {
        return Err(ExtractionWarning::UnrecognizedIsbn {
            edition: edition.to_owned(),
        });
    }
    Ok(None)
}
