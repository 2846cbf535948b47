#![forbid(unsafe_code)]

pub mod book_lists;
pub mod catalog;
pub mod cli;
pub mod crawl;
pub mod document;
pub mod error;
pub mod extract;
pub mod formats;
pub mod isbn;
pub mod languages;
pub mod logging;
pub mod metadata;
pub mod pagination;
pub mod raw_store;
pub mod reviews;
