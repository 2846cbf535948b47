//! Derivation of follow-up page URLs for paginated book lists.

use std::sync::LazyLock;

use regex::Regex;

use crate::document::Fragment;
use crate::error::{ExtractError, Result};

static PAGE_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*[?&]page=([0-9]+)").expect("valid page param regex"));

/// Highest page number followed; larger links are ignored with a warning.
pub const MAX_PAGE: u32 = 10_000;

/// `div.pagination`, or the parent of the disabled "previous" marker.
pub fn find_pagination_control<F: Fragment>(page: &F) -> Result<F> {
    if let Some(control) = page.find_first(|f| f.is_tagged("div", "pagination")) {
        return Ok(control);
    }
    page.find_first(|f| f.is("span") && f.has_classes("previous_page disabled"))
        .and_then(|previous| previous.parent_fragment())
        .ok_or_else(|| {
            ExtractError::missing_fragment("div.pagination or span.previous_page.disabled")
        })
}

pub fn page_number(href: &str) -> Option<(u32, &str)> {
    let digits = PAGE_PARAM.captures(href)?.get(1)?.as_str();
    Some((digits.parse().ok()?, digits))
}

/// URLs for pages `2..=N`: the max-page href with its `page=N` text swapped
/// for each target number.
pub fn resolve_pagination_urls<F: Fragment>(page: &F) -> Result<Vec<String>> {
    let control = find_pagination_control(page)?;

    let mut max: Option<(u32, String, String)> = None;
    for link in control.find_all(|f| f.is("a")) {
        let Some(href) = link.attribute("href") else {
            continue;
        };
        let Some((number, digits)) = page_number(href) else {
            if PAGE_PARAM.is_match(href) {
                tracing::warn!(%href, "page number out of range");
            }
            continue;
        };
        if number > MAX_PAGE {
            tracing::warn!(%href, number, max = MAX_PAGE, "page number too large");
            continue;
        }
        if max.as_ref().is_none_or(|(best, _, _)| number > *best) {
            max = Some((number, digits.to_owned(), href.to_owned()));
        }
    }

    let Some((max_page, digits, max_url)) = max else {
        tracing::debug!("pagination control has no page links");
        return Ok(Vec::new());
    };

    let needle = format!("page={digits}");
    Ok((2..=max_page)
        .map(|n| max_url.replace(&needle, &format!("page={n}")))
        .collect())
}
