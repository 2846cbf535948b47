use std::fs::OpenOptions;
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::cli::MetadataArgs;
use crate::document::parse_html;
use crate::extract::extract_book_metadata;
use crate::formats::BookMetadata;
use crate::raw_store;

/// Writes one [`BookMetadata`] JSON line per saved page, in path order. An
/// existing output file is left as it is.
pub fn run(args: MetadataArgs) -> anyhow::Result<()> {
    let html_dir = PathBuf::from(&args.html);
    let out_path = PathBuf::from(&args.out);

    if out_path.exists() {
        tracing::info!(path = %out_path.display(), "metadata already extracted");
        return Ok(());
    }

    let pages = raw_store::language_html_files(&html_dir).context("list book pages")?;
    tracing::info!(pages = pages.len(), "extracting book metadata");

    if let Some(parent) = out_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create metadata dir: {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(&out_path)
        .with_context(|| format!("create metadata output: {}", out_path.display()))?;
    let mut out = BufWriter::new(file);

    let mut failed = 0_usize;
    for html_path in &pages {
        let metadata = match page_metadata(html_path) {
            Ok(metadata) => metadata,
            Err(err) => {
                tracing::error!(path = %html_path.display(), "skipping page: {err:#}");
                failed += 1;
                continue;
            }
        };
        serde_json::to_writer(&mut out, &metadata).context("serialize metadata record")?;
        out.write_all(b"\n").context("write metadata newline")?;
    }
    out.flush().context("flush metadata")?;

    tracing::info!(pages = pages.len(), failed, "metadata done");
    Ok(())
}

fn page_metadata(html_path: &Path) -> anyhow::Result<BookMetadata> {
    let language = raw_store::page_language(html_path)?;
    let book_id = raw_store::page_book_id(html_path)?;
    let html = std::fs::read_to_string(html_path)
        .with_context(|| format!("read page: {}", html_path.display()))?;
    let document = parse_html(&html);

    let extracted = extract_book_metadata(&book_id, &language, &document.root_element())
        .with_context(|| format!("extract metadata: {}", html_path.display()))?;
    for warning in &extracted.warnings {
        tracing::warn!(path = %html_path.display(), %warning, "metadata field left empty");
    }
    Ok(extracted.into_record())
}
