use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    shelfscrape::logging::init().context("init logging")?;

    let cli = shelfscrape::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        shelfscrape::cli::Command::Reviews(args) => {
            shelfscrape::reviews::run(args).context("reviews")?;
        }
        shelfscrape::cli::Command::Metadata(args) => {
            shelfscrape::metadata::run(args).context("metadata")?;
        }
        shelfscrape::cli::Command::BookLists(args) => {
            shelfscrape::book_lists::run(args).context("book-lists")?;
        }
        shelfscrape::cli::Command::Pagination(args) => {
            shelfscrape::book_lists::print_pagination(args).context("pagination")?;
        }
        shelfscrape::cli::Command::Enjoyed(args) => {
            shelfscrape::reviews::print_enjoyed(args).context("enjoyed")?;
        }
        shelfscrape::cli::Command::Crawl {
            command: shelfscrape::cli::CrawlCommand::ListPages(args),
        } => {
            shelfscrape::crawl::list_pages(args)
                .await
                .context("crawl list-pages")?;
        }
        shelfscrape::cli::Command::Crawl {
            command: shelfscrape::cli::CrawlCommand::Canonical(args),
        } => {
            shelfscrape::crawl::canonical(args)
                .await
                .context("crawl canonical")?;
        }
        shelfscrape::cli::Command::Crawl {
            command: shelfscrape::cli::CrawlCommand::Languages(args),
        } => {
            shelfscrape::crawl::languages(args)
                .await
                .context("crawl languages")?;
        }
    }

    Ok(())
}
