use serde::{Deserialize, Serialize};

/// Markup generation a review page was saved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PageFormat {
    /// `div.review` blocks with `span.staticStar` markers.
    #[default]
    Current,
    /// `article.ReviewCard` blocks with a `Rating N out of 5` label.
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub username: String,
    pub user_url: String,
    pub book_id: String,
    pub book_id_numeric: String,
    pub review_date: String,
    pub rating: Option<u8>,
    pub edition: Option<String>,
    pub edition_isbn: Option<String>,
    pub review_language: String,
    pub review_text: Option<String>,
    pub review_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreVotes {
    pub genre: String,
    pub users: String,
}

/// Book-level metadata. Every field is always serialized, `null` when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookMetadata {
    pub book_id: String,
    pub book_id_numeric: String,
    pub source_url: Option<String>,
    pub review_file_language: String,
    pub book_title: Option<String>,
    pub book_description: Option<String>,
    pub book_url: Option<String>,
    pub book_image: Option<String>,
    pub book_type: Option<String>,
    pub book_author: Option<String>,
    pub book_isbn: Option<String>,
    pub book_page_count: Option<String>,
    pub author_name: Vec<String>,
    pub avg_rating: Option<f64>,
    pub num_ratings: Option<u64>,
    pub num_reviews: Option<u64>,
    pub genres: Vec<GenreVotes>,
}

impl BookMetadata {
    pub(crate) fn empty(book_id: &str, book_id_numeric: &str, language: &str) -> Self {
        Self {
            book_id: book_id.to_owned(),
            book_id_numeric: book_id_numeric.to_owned(),
            source_url: None,
            review_file_language: language.to_owned(),
            book_title: None,
            book_description: None,
            book_url: None,
            book_image: None,
            book_type: None,
            book_author: None,
            book_isbn: None,
            book_page_count: None,
            author_name: Vec::new(),
            avg_rating: None,
            num_ratings: None,
            num_reviews: None,
            genres: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookListEntry {
    pub book_id: String,
    pub book_title: String,
    pub book_url: String,
    pub author_name: String,
    pub author_url: String,
    pub book_lists: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageLink {
    pub hreflang: String,
    pub href: String,
}

/// One line of `crawl.jsonl`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchRecord {
    pub url: String,
    pub path: String,
    pub status: u16,
    pub retrieved_at: String,
}
