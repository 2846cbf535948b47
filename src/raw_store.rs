//! File naming for saved pages and extracted records.
//!
//! A path that already exists means the page was fetched (or extracted)
//! earlier and is skipped, so these names must stay stable across runs.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::Context as _;
use regex::Regex;

static LIST_FILENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*) \(([0-9]+) books\)").expect("valid list filename regex"));

const HTML_EXTENSION: &str = "html";
const REVIEWS_SUFFIX: &str = "-reviews.json";
const PAGE_SUFFIX: &str = "--page";

/// Last path segment of a URL, query string included.
pub fn url_basename(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// `{dir}/{basename_of(url)}.html`
pub fn page_filename(dir: &Path, url: &str) -> PathBuf {
    dir.join(format!("{}.{HTML_EXTENSION}", url_basename(url)))
}

/// Language code of a saved page: the name of its parent directory.
pub fn page_language(html_path: &Path) -> anyhow::Result<String> {
    html_path
        .parent()
        .and_then(Path::file_name)
        .and_then(|name| name.to_str())
        .map(str::to_owned)
        .ok_or_else(|| anyhow::anyhow!("page has no language directory: {}", html_path.display()))
}

/// Book id of a saved page: its file name without `.html`.
pub fn page_book_id(html_path: &Path) -> anyhow::Result<String> {
    let name = html_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow::anyhow!("page has no file name: {}", html_path.display()))?;
    Ok(name
        .strip_suffix(".html")
        .unwrap_or(name)
        .to_owned())
}

/// `{json_base}/{language}/{basename}-reviews.json` for a page saved at
/// `{html_base}/{language}/{basename}.html`.
pub fn reviews_json_path(html_path: &Path, json_base: &Path) -> anyhow::Result<PathBuf> {
    let language = page_language(html_path).context("derive review language")?;
    let book_id = page_book_id(html_path).context("derive book id")?;
    Ok(json_base
        .join(language)
        .join(format!("{book_id}{REVIEWS_SUFFIX}")))
}

/// List name encoded in a saved list page name such as
/// `Best Epics (120 books) _ Goodreads.html`; falls back to the file stem.
pub fn list_name_from_path(path: &Path) -> anyhow::Result<String> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow::anyhow!("list page has no file name: {}", path.display()))?;
    if let Some(caps) = LIST_FILENAME.captures(name) {
        return Ok(caps[1].to_owned());
    }
    let stem = name.strip_suffix(".html").unwrap_or(name);
    tracing::debug!(file = %name, "list page name has no book count; using file stem");
    Ok(stem.to_owned())
}

/// `{stem}--page{n}.html` next to the first list page.
pub fn paginated_list_path(first_page: &Path, page: u32) -> anyhow::Result<PathBuf> {
    let stem = first_page
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| anyhow::anyhow!("list page has no file stem: {}", first_page.display()))?;
    Ok(first_page.with_file_name(format!("{stem}{PAGE_SUFFIX}{page}.{HTML_EXTENSION}")))
}

pub fn is_paginated_list_path(path: &Path) -> bool {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.contains(PAGE_SUFFIX))
}

/// `.html` files directly inside `dir`, sorted by path.
pub fn html_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("read dir: {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(HTML_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// `.html` files in the language subdirectories of `base`, sorted by path.
pub fn language_html_files(base: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(base).with_context(|| format!("read dir: {}", base.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            files.extend(html_files(&path)?);
        }
    }
    files.sort();
    Ok(files)
}

/// Writes `contents` to a new file, creating parent directories.
pub fn write_new_file(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    if path.exists() {
        anyhow::bail!("output already exists: {}", path.display());
    }

    let parent_dir = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("output path must have parent: {}", path.display()))?;
    std::fs::create_dir_all(parent_dir)
        .with_context(|| format!("create output dir: {}", parent_dir.display()))?;

    std::fs::write(path, contents).with_context(|| format!("write: {}", path.display()))?;

    Ok(())
}
