use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use reqwest::header::ACCEPT;
use url::Url;

use crate::cli::{CrawlCanonicalArgs, CrawlLanguagesArgs, CrawlListPagesArgs, FetchArgs};
use crate::document::parse_html;
use crate::extract::{extract_language_links, filter_language_links};
use crate::formats::{FetchRecord, LanguageLink};
use crate::{book_lists, languages, pagination, raw_store};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CRAWL_LOG_NAME: &str = "crawl.jsonl";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Saved,
    AlreadyPresent,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    pub saved: usize,
    pub present: usize,
    pub failed: usize,
}

impl CrawlSummary {
    fn record(&mut self, url: &Url, result: anyhow::Result<FetchOutcome>) {
        match result {
            Ok(FetchOutcome::Saved) => self.saved += 1,
            Ok(FetchOutcome::AlreadyPresent) => self.present += 1,
            Err(err) => {
                tracing::error!(%url, "fetch failed: {err:#}");
                self.failed += 1;
            }
        }
    }
}

/// Sequential fetcher with a fixed wait after every request.
pub struct Crawler {
    client: reqwest::Client,
    wait: Duration,
    max_attempts: u32,
    log: File,
}

impl Crawler {
    pub fn new(args: &FetchArgs, log_dir: &Path) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(args.user_agent.clone())
            .build()
            .context("build http client")?;

        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("create crawl dir: {}", log_dir.display()))?;
        let log_path = log_dir.join(CRAWL_LOG_NAME);
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("open crawl log: {}", log_path.display()))?;

        Ok(Self {
            client,
            wait: Duration::from_millis(args.wait_ms),
            max_attempts: args.max_attempts.max(1),
            log,
        })
    }

    /// Saves `url` to `path` unless `path` already exists.
    pub async fn fetch_to(&mut self, url: &Url, path: &Path) -> anyhow::Result<FetchOutcome> {
        if path.exists() {
            tracing::debug!(path = %path.display(), "file exists");
            return Ok(FetchOutcome::AlreadyPresent);
        }

        tracing::info!(%url, path = %path.display(), "downloading");
        let (status, html) = self.fetch_html(url).await?;
        raw_store::write_new_file(path, html.as_bytes()).context("write page")?;

        let record = FetchRecord {
            url: url.to_string(),
            path: path.to_string_lossy().to_string(),
            status,
            retrieved_at: chrono::Utc::now().to_rfc3339(),
        };
        serde_json::to_writer(&mut self.log, &record).context("write fetch record json")?;
        self.log
            .write_all(b"\n")
            .context("write fetch record newline")?;

        Ok(FetchOutcome::Saved)
    }

    async fn fetch_html(&self, url: &Url) -> anyhow::Result<(u16, String)> {
        let mut last_err = None;
        for attempt in 1..=self.max_attempts {
            let result = self.try_fetch(url).await;
            tokio::time::sleep(self.wait).await;
            match result {
                Ok(page) => return Ok(page),
                Err(err) => {
                    tracing::warn!(%url, attempt, "fetch attempt failed: {err:#}");
                    last_err = Some(err);
                }
            }
        }
        let err = last_err.unwrap_or_else(|| anyhow::anyhow!("no fetch attempts made"));
        Err(err.context(format!("GET {url}: giving up after {} attempts", self.max_attempts)))
    }

    async fn try_fetch(&self, url: &Url) -> anyhow::Result<(u16, String)> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("GET {url}: HTTP {status}");
        }
        let body = response.text().await.context("read response body")?;
        Ok((status.as_u16(), body))
    }
}

pub async fn list_pages(args: CrawlListPagesArgs) -> anyhow::Result<CrawlSummary> {
    let pages_dir = PathBuf::from(&args.pages);
    let base_url = Url::parse(&args.base_url).context("parse --base-url")?;
    let mut crawler = Crawler::new(&args.fetch, &pages_dir)?;
    let mut summary = CrawlSummary::default();

    let first_pages: Vec<PathBuf> = raw_store::html_files(&pages_dir)
        .context("list book list pages")?
        .into_iter()
        .filter(|path| !raw_store::is_paginated_list_path(path))
        .collect();
    tracing::info!(lists = first_pages.len(), "crawling list pages");

    for first_page in &first_pages {
        let hrefs = match book_lists::pagination_urls(first_page) {
            Ok(hrefs) => hrefs,
            Err(err) => {
                tracing::error!(path = %first_page.display(), "skipping list: {err:#}");
                summary.failed += 1;
                continue;
            }
        };
        for href in hrefs {
            let Some((page, _)) = pagination::page_number(&href) else {
                continue;
            };
            let path = match raw_store::paginated_list_path(first_page, page) {
                Ok(path) => path,
                Err(err) => {
                    tracing::error!(path = %first_page.display(), "skipping list: {err:#}");
                    summary.failed += 1;
                    break;
                }
            };
            let url = match base_url.join(&href) {
                Ok(url) => url,
                Err(err) => {
                    tracing::error!(%href, %err, "bad pagination url");
                    summary.failed += 1;
                    continue;
                }
            };
            let result = crawler.fetch_to(&url, &path).await;
            summary.record(&url, result);
        }
    }

    log_summary(&summary);
    Ok(summary)
}

pub async fn canonical(args: CrawlCanonicalArgs) -> anyhow::Result<CrawlSummary> {
    let out_dir = PathBuf::from(&args.out);
    let base_url = Url::parse(&args.base_url).context("parse --base-url")?;
    let catalog = book_lists::read_catalog(Path::new(&args.books))?;
    let skip = match &args.skip {
        Some(path) => read_skip_list(Path::new(path))?,
        None => HashSet::new(),
    };
    let mut crawler = Crawler::new(&args.fetch, &out_dir)?;
    let mut summary = CrawlSummary::default();

    tracing::info!(books = catalog.len(), skip = skip.len(), "crawling canonical pages");
    for (idx, entry) in catalog.entries().iter().enumerate() {
        if skip.contains(&entry.book_id) {
            tracing::debug!(book_id = %entry.book_id, "in skip list");
            continue;
        }
        let url = match base_url.join(&entry.book_url) {
            Ok(url) => url,
            Err(err) => {
                tracing::error!(book_id = %entry.book_id, %err, "bad book url");
                summary.failed += 1;
                continue;
            }
        };
        tracing::debug!(book = idx + 1, of = catalog.len(), book_id = %entry.book_id, "canonical page");
        let path = raw_store::page_filename(&out_dir, &entry.book_url);
        let result = crawler.fetch_to(&url, &path).await;
        summary.record(&url, result);
    }

    log_summary(&summary);
    Ok(summary)
}

fn read_skip_list(path: &Path) -> anyhow::Result<HashSet<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("read skip list: {}", path.display()))?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}

pub async fn languages(args: CrawlLanguagesArgs) -> anyhow::Result<CrawlSummary> {
    let canonical_dir = PathBuf::from(&args.canonical);
    let out_dir = PathBuf::from(&args.out);
    let targets = if args.langs.is_empty() {
        languages::default_target_codes()
    } else {
        args.langs.clone()
    };
    let mut crawler = Crawler::new(&args.fetch, &out_dir)?;
    let mut summary = CrawlSummary::default();

    let canonical_pages = raw_store::html_files(&canonical_dir).context("list canonical pages")?;
    tracing::info!(pages = canonical_pages.len(), ?targets, "crawling language pages");

    for canonical_page in &canonical_pages {
        let links = match page_language_links(canonical_page, &targets) {
            Ok(links) => links,
            Err(err) => {
                tracing::error!(path = %canonical_page.display(), "skipping page: {err:#}");
                summary.failed += 1;
                continue;
            }
        };
        for link in links {
            if !languages::is_valid_code(&link.hreflang) {
                tracing::warn!(hreflang = %link.hreflang, "ignoring unusable language code");
                continue;
            }
            let url = match Url::parse(&link.href) {
                Ok(url) => url,
                Err(err) => {
                    tracing::error!(href = %link.href, %err, "bad language link");
                    summary.failed += 1;
                    continue;
                }
            };
            tracing::debug!(
                lang = %link.hreflang,
                name = languages::language_name(&link.hreflang).unwrap_or("unlisted"),
                "language page"
            );
            let path = raw_store::page_filename(&out_dir.join(&link.hreflang), &link.href);
            let result = crawler.fetch_to(&url, &path).await;
            summary.record(&url, result);
        }
    }

    log_summary(&summary);
    Ok(summary)
}

fn page_language_links(path: &Path, targets: &[String]) -> anyhow::Result<Vec<LanguageLink>> {
    let html = std::fs::read_to_string(path)
        .with_context(|| format!("read canonical page: {}", path.display()))?;
    let document = parse_html(&html);
    Ok(filter_language_links(
        extract_language_links(&document.root_element()),
        targets,
    ))
}

fn log_summary(summary: &CrawlSummary) {
    tracing::info!(
        saved = summary.saved,
        present = summary.present,
        failed = summary.failed,
        "crawl done"
    );
}
