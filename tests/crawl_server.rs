use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use predicates::prelude::*;
use shelfscrape::formats::{BookListEntry, FetchRecord};

const FIRST_LIST_PAGE: &str = r#"<!doctype html>
<html><body>
<table class="tableList"></table>
<div class="pagination">
  <span class="previous_page disabled">previous</span>
  <em class="current">1</em>
  <a href="/list/show/1.Best_Epics?page=2">2</a>
  <a href="/list/show/1.Best_Epics?page=3">3</a>
</div>
</body></html>
"#;

const FOLLOW_UP_LIST_PAGE: &str = r#"<!doctype html>
<html><body><table class="tableList"></table></body></html>
"#;

const BOOK_PAGE: &str = r#"<!doctype html>
<html><head><title>Some Title</title></head><body><p>book</p></body></html>
"#;

struct DocsServer {
    base_url: String,
    hits: Arc<AtomicUsize>,
    shutdown: mpsc::Sender<()>,
    handle: thread::JoinHandle<()>,
}

impl DocsServer {
    fn stop(self) {
        let _ = self.shutdown.send(());
        self.handle.join().expect("join server thread");
    }
}

fn spawn_server() -> DocsServer {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("start tiny_http server");
    let base_url = format!("http://{}", server.server_addr());
    let hits = Arc::new(AtomicUsize::new(0));
    let (shutdown, shutdown_rx) = mpsc::channel::<()>();

    let counter = Arc::clone(&hits);
    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            let request = match server.recv_timeout(Duration::from_millis(50)) {
                Ok(Some(req)) => req,
                Ok(None) => continue,
                Err(_) => break,
            };
            counter.fetch_add(1, Ordering::SeqCst);

            let (status, body) = match request.url() {
                "/list/show/1.Best_Epics?page=2" | "/list/show/1.Best_Epics?page=3" => {
                    (200, FOLLOW_UP_LIST_PAGE)
                }
                "/book/show/12345.Some_Title"
                | "/de/book/show/12345.Some_Title"
                | "/fr/book/show/12345.Some_Title" => (200, BOOK_PAGE),
                _ => (404, "not found"),
            };
            let _ = request.respond(
                tiny_http::Response::from_string(body)
                    .with_status_code(status)
                    .with_header(
                        "Content-Type: text/html; charset=utf-8"
                            .parse::<tiny_http::Header>()
                            .expect("content-type header"),
                    ),
            );
        }
    });

    DocsServer {
        base_url,
        hits,
        shutdown,
        handle,
    }
}

fn read_fetch_log(path: &Path) -> Vec<FetchRecord> {
    fs::read_to_string(path)
        .expect("read crawl log")
        .lines()
        .map(|line| serde_json::from_str(line).expect("parse fetch record"))
        .collect()
}

#[test]
fn list_pages_fetches_follow_up_pages_once() {
    let server = spawn_server();
    let temp = tempfile::TempDir::new().expect("tempdir");
    let pages = temp.path().join("lists");
    fs::create_dir_all(&pages).expect("create lists dir");
    fs::write(pages.join("Best Epics (120 books).html"), FIRST_LIST_PAGE).expect("write list");

    let args = [
        "crawl",
        "list-pages",
        "--pages",
        pages.to_str().unwrap(),
        "--base-url",
        server.base_url.as_str(),
        "--wait-ms",
        "0",
    ];

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("shelfscrape");
    cmd.args(args).assert().success();

    assert!(pages.join("Best Epics (120 books)--page2.html").is_file());
    assert!(pages.join("Best Epics (120 books)--page3.html").is_file());
    let records = read_fetch_log(&pages.join("crawl.jsonl"));
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|record| record.status == 200));
    assert!(records[0].url.ends_with("/list/show/1.Best_Epics?page=2"));
    assert_eq!(server.hits.load(Ordering::SeqCst), 2);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("shelfscrape");
    cmd.args(args).assert().success();
    assert_eq!(server.hits.load(Ordering::SeqCst), 2);

    server.stop();
}

#[test]
fn list_pages_moves_past_an_unresolvable_href() {
    let server = spawn_server();
    let temp = tempfile::TempDir::new().expect("tempdir");
    let pages = temp.path().join("lists");
    fs::create_dir_all(&pages).expect("create lists dir");
    fs::write(
        pages.join("A Broken List (1 books).html"),
        r#"<html><body><div class="pagination"><a href="http://[oops/list?page=2">2</a></div></body></html>"#,
    )
    .expect("write broken list");
    fs::write(pages.join("Best Epics (120 books).html"), FIRST_LIST_PAGE).expect("write list");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("shelfscrape");
    cmd.args([
        "crawl",
        "list-pages",
        "--pages",
        pages.to_str().unwrap(),
        "--base-url",
        server.base_url.as_str(),
        "--wait-ms",
        "0",
    ])
    .assert()
    .success()
    .stderr(predicate::str::contains("bad pagination url"));

    assert!(!pages.join("A Broken List (1 books)--page2.html").exists());
    assert!(pages.join("Best Epics (120 books)--page2.html").is_file());
    assert!(pages.join("Best Epics (120 books)--page3.html").is_file());
    assert_eq!(server.hits.load(Ordering::SeqCst), 2);

    server.stop();
}

#[test]
fn canonical_skips_listed_books_and_survives_failures() {
    let server = spawn_server();
    let temp = tempfile::TempDir::new().expect("tempdir");
    let out = temp.path().join("canonical");
    let books = temp.path().join("books.json");
    let skip = temp.path().join("skip.txt");

    let entry = |book_id: &str| BookListEntry {
        book_id: book_id.to_owned(),
        book_title: book_id.to_owned(),
        book_url: format!("/book/show/{book_id}"),
        author_name: "J. Writer".to_owned(),
        author_url: "/author/show/1.J_Writer".to_owned(),
        book_lists: vec!["Best Epics".to_owned()],
    };
    let catalog = vec![
        entry("12345.Some_Title"),
        entry("404.Gone"),
        entry("777.Skipped"),
    ];
    fs::write(&books, serde_json::to_vec(&catalog).expect("catalog json")).expect("write books");
    fs::write(&skip, "777.Skipped\n").expect("write skip list");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("shelfscrape");
    cmd.args([
        "crawl",
        "canonical",
        "--books",
        books.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
        "--base-url",
        server.base_url.as_str(),
        "--skip",
        skip.to_str().unwrap(),
        "--wait-ms",
        "0",
        "--max-attempts",
        "2",
    ])
    .assert()
    .success()
    .stderr(predicate::str::contains("fetch failed"));

    assert_eq!(
        fs::read_to_string(out.join("12345.Some_Title.html")).expect("read page"),
        BOOK_PAGE
    );
    assert!(!out.join("404.Gone.html").exists());
    assert!(!out.join("777.Skipped.html").exists());
    // One successful fetch plus two attempts at the missing book.
    assert_eq!(server.hits.load(Ordering::SeqCst), 3);

    server.stop();
}

#[test]
fn languages_fetches_requested_alternates_only() {
    let server = spawn_server();
    let temp = tempfile::TempDir::new().expect("tempdir");
    let canonical = temp.path().join("canonical");
    let out = temp.path().join("html");
    fs::create_dir_all(&canonical).expect("create canonical dir");

    let page = format!(
        r#"<!doctype html>
<html><head>
<link rel="alternate" hreflang="de" href="{base}/de/book/show/12345.Some_Title">
<link rel="alternate" hreflang="fr" href="{base}/fr/book/show/12345.Some_Title">
<link rel="alternate" hreflang="../x" href="{base}/x/book/show/12345.Some_Title">
</head><body></body></html>
"#,
        base = server.base_url
    );
    fs::write(canonical.join("12345.Some_Title.html"), page).expect("write canonical page");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("shelfscrape");
    cmd.args([
        "crawl",
        "languages",
        "--canonical",
        canonical.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
        "--lang",
        "de",
        "--lang",
        "../x",
        "--wait-ms",
        "0",
    ])
    .assert()
    .success();

    assert!(out.join("de").join("12345.Some_Title.html").is_file());
    assert!(!out.join("fr").exists());
    assert_eq!(server.hits.load(Ordering::SeqCst), 1);
    let records = read_fetch_log(&out.join("crawl.jsonl"));
    assert_eq!(records.len(), 1);
    assert!(records[0].url.ends_with("/de/book/show/12345.Some_Title"));

    server.stop();
}
