use clap::{Args, Parser, Subcommand};

use crate::formats::PageFormat;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Reviews(ReviewsArgs),
    Metadata(MetadataArgs),
    BookLists(BookListsArgs),
    Pagination(PageArgs),
    Enjoyed(PageArgs),
    Crawl {
        #[command(subcommand)]
        command: CrawlCommand,
    },
}

#[derive(Debug, Args)]
pub struct ReviewsArgs {
    /// Directory of saved pages, one subdirectory per language code.
    #[arg(long)]
    pub html: String,

    /// Output directory for `<lang>/<book>-reviews.json` files.
    #[arg(long)]
    pub out: String,

    /// Review markup generation of the saved pages.
    #[arg(long, value_enum, default_value_t = PageFormat::Current)]
    pub format: PageFormat,
}

#[derive(Debug, Args)]
pub struct MetadataArgs {
    /// Directory of saved pages, one subdirectory per language code.
    #[arg(long)]
    pub html: String,

    /// Output file path for the metadata JSON lines.
    #[arg(long)]
    pub out: String,
}

#[derive(Debug, Args)]
pub struct BookListsArgs {
    /// Directory of saved book list pages.
    #[arg(long)]
    pub pages: String,

    /// Output file path for the merged book catalog (JSON array).
    #[arg(long)]
    pub out: String,
}

#[derive(Debug, Args)]
pub struct PageArgs {
    /// Saved HTML page.
    #[arg(long)]
    pub page: String,
}

#[derive(Debug, Subcommand)]
pub enum CrawlCommand {
    /// Fetch pages 2..N of every saved book list page.
    ListPages(CrawlListPagesArgs),
    /// Fetch the canonical page of every book in a catalog.
    Canonical(CrawlCanonicalArgs),
    /// Fetch alternate-language variants of saved canonical pages.
    Languages(CrawlLanguagesArgs),
}

#[derive(Debug, Clone, Args)]
pub struct FetchArgs {
    /// Wait after each request (politeness).
    #[arg(long, default_value_t = 2000)]
    pub wait_ms: u64,

    /// Attempts per URL before giving up on it.
    #[arg(long, default_value_t = 5)]
    pub max_attempts: u32,

    /// User-Agent header sent with every request.
    #[arg(long, default_value = "shelfscrape/0.1")]
    pub user_agent: String,
}

#[derive(Debug, Args)]
pub struct CrawlListPagesArgs {
    /// Directory of saved first pages of book lists.
    #[arg(long)]
    pub pages: String,

    /// Base URL that relative pagination links are resolved against.
    #[arg(long)]
    pub base_url: String,

    #[command(flatten)]
    pub fetch: FetchArgs,
}

#[derive(Debug, Args)]
pub struct CrawlCanonicalArgs {
    /// Book catalog written by `book-lists`.
    #[arg(long)]
    pub books: String,

    /// Output directory for canonical book pages.
    #[arg(long)]
    pub out: String,

    /// Base URL that relative book links are resolved against.
    #[arg(long)]
    pub base_url: String,

    /// File of book ids (one per line) to leave out.
    #[arg(long)]
    pub skip: Option<String>,

    #[command(flatten)]
    pub fetch: FetchArgs,
}

#[derive(Debug, Args)]
pub struct CrawlLanguagesArgs {
    /// Directory of saved canonical book pages.
    #[arg(long)]
    pub canonical: String,

    /// Output directory; pages land in `<out>/<lang>/`.
    #[arg(long)]
    pub out: String,

    /// Language codes to fetch (repeatable; default: the built-in target list).
    #[arg(long = "lang")]
    pub langs: Vec<String>,

    #[command(flatten)]
    pub fetch: FetchArgs,
}
