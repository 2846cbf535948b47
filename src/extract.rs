//! Record extraction from saved review, book and list pages.
//!
//! Every function here is pure: it reads a [`Fragment`] tree and returns
//! records. Optional fields degrade to `None`; only identity fragments and
//! structurally mandatory containers produce an [`ExtractError`].

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::document::Fragment;
use crate::error::{ExtractError, Extracted, ExtractionWarning, Result};
use crate::formats::{
    BookListEntry, BookMetadata, GenreVotes, LanguageLink, PageFormat, ReviewRecord,
};
use crate::isbn::parse_edition_isbn;

static RATING_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Rating ([0-5]) out of 5").expect("valid rating label regex"));

const MAX_STARS: usize = 5;
const GENRE_SEPARATOR: &str = " -- ";
const FREE_TEXT_ID_PREFIX: &str = "freeTextContainer";
const PARAGRAPH_SEPARATOR: &str = "\n\n";

pub fn book_id_numeric(book_id: &str) -> Result<String> {
    let digits: String = book_id
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        return Err(ExtractError::InvalidBookId(book_id.to_owned()));
    }
    Ok(digits)
}

pub fn extract_reviews<F: Fragment>(
    book_id: &str,
    language: &str,
    page: &F,
    format: PageFormat,
) -> Vec<Result<Extracted<ReviewRecord>>> {
    match format {
        PageFormat::Current => page
            .find_all(|f| f.is_tagged("div", "review"))
            .iter()
            .map(|review| extract_review(book_id, language, review))
            .collect(),
        PageFormat::Legacy => page
            .find_all(|f| f.is_tagged("article", "ReviewCard"))
            .iter()
            .map(|card| extract_review_legacy(book_id, language, card))
            .collect(),
    }
}

pub fn extract_review<F: Fragment>(
    book_id: &str,
    language: &str,
    review: &F,
) -> Result<Extracted<ReviewRecord>> {
    let book_id_numeric = book_id_numeric(book_id)?;

    let user_link = review
        .find_first(|f| f.is_tagged("a", "user"))
        .ok_or_else(|| ExtractError::malformed_review("missing a.user link"))?;
    let username = user_link
        .attribute("name")
        .ok_or_else(|| ExtractError::malformed_review("a.user link has no name"))?;
    let user_url = user_link
        .attribute("href")
        .ok_or_else(|| ExtractError::malformed_review("a.user link has no href"))?;

    let date_link = review
        .find_first(|f| f.is_tagged("a", "reviewDate"))
        .ok_or_else(|| ExtractError::malformed_review("missing a.reviewDate link"))?;

    let edition = review
        .find_first(|f| f.is_tagged("a", "lightGreyText"))
        .and_then(|link| link.attribute("title").map(str::to_owned));

    let mut warnings = Vec::new();
    let edition_isbn = edition
        .as_deref()
        .and_then(|edition| isbn_or_warn(edition, &mut warnings));

    let stars = review
        .find_all(|f| f.is_tagged("span", "staticStar"))
        .len()
        .min(MAX_STARS);

    let record = ReviewRecord {
        username: username.to_owned(),
        user_url: user_url.to_owned(),
        book_id: book_id.to_owned(),
        book_id_numeric,
        review_date: date_link.text_content(),
        rating: Some(stars as u8),
        edition,
        edition_isbn,
        review_language: language.to_owned(),
        review_text: current_review_text(review),
        review_url: date_link.attribute("href").map(str::to_owned),
    };
    Ok(Extracted::new(record, warnings))
}

pub fn extract_review_legacy<F: Fragment>(
    book_id: &str,
    language: &str,
    card: &F,
) -> Result<Extracted<ReviewRecord>> {
    let book_id_numeric = book_id_numeric(book_id)?;

    let content = card
        .find_first(|f| f.is_tagged("section", "ReviewCard__content"))
        .ok_or_else(|| ExtractError::malformed_review("missing section.ReviewCard__content"))?;

    let profile = card
        .find_first(|f| f.has_class("ReviewerProfile__name"))
        .ok_or_else(|| ExtractError::malformed_review("missing .ReviewerProfile__name"))?;
    let user_url = profile
        .find_first(|f| f.is("a"))
        .and_then(|link| link.attribute("href").map(str::to_owned))
        .ok_or_else(|| ExtractError::malformed_review("reviewer profile has no link"))?;

    let row = content
        .find_first(|f| f.is_tagged("section", "ReviewCard__row"))
        .ok_or_else(|| ExtractError::malformed_review("missing section.ReviewCard__row"))?;

    let rating = legacy_rating(&content)?;

    let review_text = card
        .find_first(|f| f.is_tagged("section", "ReviewText"))
        .and_then(|section| join_paragraphs(section.stripped_strings()));

    let record = ReviewRecord {
        username: profile.stripped_text(),
        user_url,
        book_id: book_id.to_owned(),
        book_id_numeric,
        review_date: row.stripped_text(),
        rating,
        edition: None,
        edition_isbn: None,
        review_language: language.to_owned(),
        review_text,
        review_url: row
            .find_first(|f| f.is("a"))
            .and_then(|link| link.attribute("href").map(str::to_owned)),
    };
    Ok(Extracted::new(record, Vec::new()))
}

/// Parses a `Rating N out of 5` label. Any other shape is an error.
pub fn parse_rating_label(label: &str) -> Result<u8> {
    let digit = RATING_LABEL
        .captures(label)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| ExtractError::malformed_review(format!("unexpected rating label {label:?}")))?;
    digit
        .as_str()
        .parse()
        .map_err(|_| ExtractError::malformed_review(format!("unexpected rating label {label:?}")))
}

fn legacy_rating<F: Fragment>(content: &F) -> Result<Option<u8>> {
    let Some(stars) = content.find_first(|f| f.is_tagged("span", "RatingStars")) else {
        return Ok(None);
    };
    let label = stars
        .attribute("aria-label")
        .ok_or_else(|| ExtractError::malformed_review("span.RatingStars has no aria-label"))?;
    parse_rating_label(label).map(Some)
}

fn current_review_text<F: Fragment>(review: &F) -> Option<String> {
    let container = review.find_first(|f| f.is_tagged("div", "reviewText"))?;
    let spans = container.find_all(|f| f.is("span"));
    let body = spans
        .iter()
        .find(|span| is_free_text_container(*span))
        .or_else(|| spans.iter().find(|span| is_hidden(*span)))?;
    join_paragraphs(body.stripped_strings())
}

fn is_free_text_container<F: Fragment>(span: &F) -> bool {
    span.attribute("id")
        .is_some_and(|id| id.starts_with(FREE_TEXT_ID_PREFIX))
}

fn is_hidden<F: Fragment>(span: &F) -> bool {
    span.attribute("style").is_some_and(|style| {
        let compact: String = style.chars().filter(|c| !c.is_whitespace()).collect();
        compact
            .trim_end_matches(';')
            .eq_ignore_ascii_case("display:none")
    })
}

fn join_paragraphs(paragraphs: Vec<String>) -> Option<String> {
    if paragraphs.is_empty() {
        return None;
    }
    Some(paragraphs.join(PARAGRAPH_SEPARATOR))
}

fn isbn_or_warn(edition: &str, warnings: &mut Vec<ExtractionWarning>) -> Option<String> {
    match parse_edition_isbn(edition) {
        Ok(isbn) => isbn,
        Err(warning) => {
            warnings.push(warning);
            None
        }
    }
}

pub fn extract_book_metadata<F: Fragment>(
    book_id: &str,
    language: &str,
    page: &F,
) -> Result<Extracted<BookMetadata>> {
    let numeric = book_id_numeric(book_id)?;
    let mut metadata = BookMetadata::empty(book_id, &numeric, language);
    let mut warnings = Vec::new();

    for meta in page.find_all(|f| f.is("meta")) {
        let (Some(property), Some(content)) = (meta.attribute("property"), meta.attribute("content"))
        else {
            continue;
        };
        if let Some(slot) = property_slot(&mut metadata, property) {
            *slot = Some(content.to_owned());
        }
    }

    metadata.source_url = canonical_url(page);

    if let Some(meta_col) = page.find_first(|f| f.is("div") && f.attribute("id") == Some("metacol")) {
        metadata.author_name = meta_col
            .find_all(|f| f.is_tagged("div", "authorName__container"))
            .iter()
            .map(|author| author.stripped_text())
            .collect();
    }

    if let Some(book_meta) =
        page.find_first(|f| f.is("div") && f.attribute("id") == Some("bookMeta"))
    {
        for span in book_meta.find_all(|f| f.is("span") && f.attribute("itemprop") == Some("ratingValue")) {
            if let Some(value) = parse_number("avg_rating", &span.text_content(), &mut warnings) {
                metadata.avg_rating = Some(value);
            }
        }
        for meta in book_meta.find_all(|f| f.is("meta")) {
            let Some(content) = meta.attribute("content") else {
                continue;
            };
            match meta.attribute("itemprop") {
                Some("ratingCount") => {
                    if let Some(value) = parse_number("num_ratings", content, &mut warnings) {
                        metadata.num_ratings = Some(value);
                    }
                }
                Some("reviewCount") => {
                    if let Some(value) = parse_number("num_reviews", content, &mut warnings) {
                        metadata.num_reviews = Some(value);
                    }
                }
                _ => {}
            }
        }
    }

    metadata.genres = extract_genres(page);

    Ok(Extracted::new(metadata, warnings))
}

/// Maps `og:*` and `books:*` meta properties onto their `book_*` field.
fn property_slot<'m>(metadata: &'m mut BookMetadata, property: &str) -> Option<&'m mut Option<String>> {
    let slot = match property {
        "og:title" => &mut metadata.book_title,
        "og:description" => &mut metadata.book_description,
        "og:url" => &mut metadata.book_url,
        "og:image" => &mut metadata.book_image,
        "og:type" => &mut metadata.book_type,
        "books:author" => &mut metadata.book_author,
        "books:isbn" => &mut metadata.book_isbn,
        "books:page_count" => &mut metadata.book_page_count,
        _ => return None,
    };
    Some(slot)
}

fn parse_number<T: FromStr>(
    field: &'static str,
    value: &str,
    warnings: &mut Vec<ExtractionWarning>,
) -> Option<T> {
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warnings.push(ExtractionWarning::UnparseableNumber {
                field,
                value: value.to_owned(),
            });
            None
        }
    }
}

pub fn canonical_url<F: Fragment>(page: &F) -> Option<String> {
    page.find_first(|f| f.is("link") && f.attribute_has_token("rel", "canonical"))
        .and_then(|link| link.attribute("href").map(str::to_owned))
}

pub fn extract_genres<F: Fragment>(page: &F) -> Vec<GenreVotes> {
    fold_genres(&page.find_all(|f| f.has_class("bookPageGenreLink")))
}

/// Folds a flat run of genre fragments: links extend the current genre path,
/// a `div` closes it with its user count and starts a new path.
pub fn fold_genres<F: Fragment>(fragments: &[F]) -> Vec<GenreVotes> {
    let (_, genres) = fragments.iter().fold(
        (String::new(), Vec::new()),
        |(mut path, mut genres), fragment| {
            if fragment.is("a") {
                if !path.is_empty() {
                    path.push_str(GENRE_SEPARATOR);
                }
                path.push_str(&fragment.stripped_text());
            } else if fragment.is("div") {
                genres.push(GenreVotes {
                    genre: std::mem::take(&mut path),
                    users: fragment.stripped_text(),
                });
            }
            (path, genres)
        },
    );
    genres
}

pub fn extract_book_list_entries<F: Fragment>(page: &F, list_name: &str) -> Result<Vec<BookListEntry>> {
    let table = page
        .find_first(|f| f.is("table"))
        .ok_or_else(|| ExtractError::missing_fragment("table"))?;
    table
        .find_all(|f| f.is("tr"))
        .iter()
        .map(|row| book_list_entry(row, list_name))
        .collect()
}

fn book_list_entry<F: Fragment>(row: &F, list_name: &str) -> Result<BookListEntry> {
    let resource = row
        .find_first(|f| f.is("div") && f.attribute("data-resource-type") == Some("Book"))
        .ok_or_else(|| ExtractError::missing_fragment("div[data-resource-type=Book] in table row"))?;
    let book_id = resource
        .attribute("data-resource-id")
        .ok_or_else(|| ExtractError::missing_fragment("data-resource-id on book resource"))?;
    let (book_title, book_url) = link_text_and_href(row, "bookTitle")?;
    let (author_name, author_url) = link_text_and_href(row, "authorName")?;

    Ok(BookListEntry {
        book_id: book_id.to_owned(),
        book_title,
        book_url,
        author_name,
        author_url,
        book_lists: vec![list_name.to_owned()],
    })
}

fn link_text_and_href<F: Fragment>(row: &F, class: &str) -> Result<(String, String)> {
    let link = row
        .find_first(|f| f.is_tagged("a", class))
        .ok_or_else(|| ExtractError::missing_fragment(format!("a.{class} in table row")))?;
    let href = link
        .attribute("href")
        .ok_or_else(|| ExtractError::missing_fragment(format!("href of a.{class}")))?;
    Ok((link.stripped_text(), href.to_owned()))
}

pub fn extract_enjoyed_book_links<F: Fragment>(page: &F) -> Result<Vec<String>> {
    let carousel = page
        .find_first(|f| f.is_tagged("section", "Carousel"))
        .ok_or_else(|| ExtractError::missing_fragment("section.Carousel"))?;
    Ok(carousel
        .find_all(|f| f.is_tagged("div", "BookCard"))
        .iter()
        .filter_map(|card| card.find_first(|f| f.is_tagged("a", "BookCard__clickCardTarget")))
        .filter_map(|link| link.attribute("href").map(str::to_owned))
        .collect())
}

pub fn extract_language_links<F: Fragment>(page: &F) -> Vec<LanguageLink> {
    let head = if page.is("head") {
        Some(page.clone())
    } else {
        page.find_first(|f| f.is("head"))
    };
    let Some(head) = head else {
        return Vec::new();
    };
    head.find_all(|f| f.is("link") && f.attribute_has_token("rel", "alternate"))
        .iter()
        .filter_map(|link| {
            Some(LanguageLink {
                hreflang: link.attribute("hreflang")?.to_owned(),
                href: link.attribute("href")?.to_owned(),
            })
        })
        .collect()
}

/// Keeps links whose `hreflang` is in `targets`; an empty target list keeps all.
pub fn filter_language_links(links: Vec<LanguageLink>, targets: &[String]) -> Vec<LanguageLink> {
    if targets.is_empty() {
        return links;
    }
    links
        .into_iter()
        .filter(|link| targets.iter().any(|target| *target == link.hreflang))
        .collect()
}
