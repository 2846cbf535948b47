use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::catalog::BookCatalog;
use crate::cli::{BookListsArgs, PageArgs};
use crate::document::parse_html;
use crate::extract::extract_book_list_entries;
use crate::formats::BookListEntry;
use crate::pagination::resolve_pagination_urls;
use crate::raw_store;

/// Merges the entries of every saved list page (first pages and their
/// `--pageN` followers) into one catalog file. Returns `None` when the
/// catalog file already exists.
pub fn run(args: BookListsArgs) -> anyhow::Result<Option<BookCatalog>> {
    let pages_dir = PathBuf::from(&args.pages);
    let out_path = PathBuf::from(&args.out);

    if out_path.exists() {
        tracing::info!(path = %out_path.display(), "book catalog already written");
        return Ok(None);
    }

    let pages = raw_store::html_files(&pages_dir).context("list book list pages")?;
    tracing::info!(pages = pages.len(), "extracting book lists");

    let mut catalog = BookCatalog::new();
    for path in &pages {
        match list_entries(path) {
            Ok(entries) => {
                catalog.merge(entries);
                tracing::info!(books = catalog.len(), path = %path.display(), "merged list page");
            }
            Err(err) => {
                tracing::error!(path = %path.display(), "skipping list page: {err:#}");
            }
        }
    }

    let json = serde_json::to_vec_pretty(catalog.entries()).context("serialize book catalog")?;
    raw_store::write_new_file(&out_path, &json).context("write book catalog")?;

    Ok(Some(catalog))
}

fn list_entries(path: &Path) -> anyhow::Result<Vec<BookListEntry>> {
    let list_name = raw_store::list_name_from_path(path)?;
    let html = std::fs::read_to_string(path)
        .with_context(|| format!("read list page: {}", path.display()))?;
    let document = parse_html(&html);
    extract_book_list_entries(&document.root_element(), &list_name)
        .with_context(|| format!("extract list entries: {}", path.display()))
}

pub fn read_catalog(path: &Path) -> anyhow::Result<BookCatalog> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read book catalog: {}", path.display()))?;
    let entries: Vec<BookListEntry> =
        serde_json::from_str(&json).context("parse book catalog")?;
    Ok(BookCatalog::from_entries(entries))
}

/// Pagination URLs of one saved list page.
pub fn pagination_urls(path: &Path) -> anyhow::Result<Vec<String>> {
    let html = std::fs::read_to_string(path)
        .with_context(|| format!("read list page: {}", path.display()))?;
    let document = parse_html(&html);
    resolve_pagination_urls(&document.root_element())
        .with_context(|| format!("resolve pagination: {}", path.display()))
}

pub fn print_pagination(args: PageArgs) -> anyhow::Result<()> {
    let urls = pagination_urls(Path::new(&args.page))?;
    println!("{}", serde_json::to_string(&urls).context("serialize pagination urls")?);
    Ok(())
}
