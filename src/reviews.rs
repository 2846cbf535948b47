use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::cli::{PageArgs, ReviewsArgs};
use crate::document::parse_html;
use crate::error::ExtractError;
use crate::extract::{extract_enjoyed_book_links, extract_reviews};
use crate::formats::{PageFormat, ReviewRecord};
use crate::raw_store;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReviewRunSummary {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
    pub reviews: usize,
    pub malformed: usize,
}

/// Extracts reviews from every `<html>/<lang>/*.html` page into
/// `<out>/<lang>/<book>-reviews.json`. Pages whose JSON already exists are
/// skipped; a page that fails is logged and the run moves on.
pub fn run(args: ReviewsArgs) -> anyhow::Result<ReviewRunSummary> {
    let html_dir = PathBuf::from(&args.html);
    let out_dir = PathBuf::from(&args.out);

    let pages = raw_store::language_html_files(&html_dir).context("list review pages")?;
    tracing::info!(pages = pages.len(), format = ?args.format, "extracting reviews");

    let mut summary = ReviewRunSummary::default();
    for (idx, html_path) in pages.iter().enumerate() {
        let json_path = raw_store::reviews_json_path(html_path, &out_dir)?;
        if json_path.exists() {
            tracing::debug!(path = %json_path.display(), "reviews already extracted");
            summary.skipped += 1;
            continue;
        }

        tracing::info!(
            page = idx + 1,
            of = pages.len(),
            path = %html_path.display(),
            "extract reviews"
        );
        let page = match page_reviews(html_path, args.format) {
            Ok(page) => page,
            Err(err) => {
                tracing::error!(path = %html_path.display(), "skipping page: {err:#}");
                summary.failed += 1;
                continue;
            }
        };

        let json = serde_json::to_vec(&page.reviews).context("serialize reviews")?;
        raw_store::write_new_file(&json_path, &json).context("write reviews json")?;

        summary.written += 1;
        summary.reviews += page.reviews.len();
        summary.malformed += page.malformed;
    }

    tracing::info!(
        written = summary.written,
        skipped = summary.skipped,
        failed = summary.failed,
        reviews = summary.reviews,
        malformed = summary.malformed,
        "reviews done"
    );
    Ok(summary)
}

struct PageReviews {
    reviews: Vec<ReviewRecord>,
    malformed: usize,
}

fn page_reviews(html_path: &Path, format: PageFormat) -> anyhow::Result<PageReviews> {
    let language = raw_store::page_language(html_path)?;
    let book_id = raw_store::page_book_id(html_path)?;
    let html = std::fs::read_to_string(html_path)
        .with_context(|| format!("read page: {}", html_path.display()))?;
    let document = parse_html(&html);

    let mut reviews = Vec::new();
    let mut malformed = 0_usize;
    for result in extract_reviews(&book_id, &language, &document.root_element(), format) {
        match result {
            Ok(extracted) => {
                for warning in &extracted.warnings {
                    tracing::warn!(path = %html_path.display(), %warning, "review field left empty");
                }
                reviews.push(extracted.record);
            }
            Err(err @ ExtractError::MalformedReview(_)) => {
                tracing::warn!(path = %html_path.display(), %err, "skipping review");
                malformed += 1;
            }
            Err(err) => {
                return Err(err).with_context(|| format!("extract reviews: {}", html_path.display()));
            }
        }
    }

    Ok(PageReviews { reviews, malformed })
}

/// Prints the "readers also enjoyed" book URLs of one page as a JSON array.
pub fn print_enjoyed(args: PageArgs) -> anyhow::Result<()> {
    let html = std::fs::read_to_string(&args.page)
        .with_context(|| format!("read page: {}", args.page))?;
    let document = parse_html(&html);
    let links = extract_enjoyed_book_links(&document.root_element())
        .with_context(|| format!("extract enjoyed books: {}", args.page))?;
    println!("{}", serde_json::to_string(&links).context("serialize links")?);
    Ok(())
}
