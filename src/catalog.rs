use std::collections::HashMap;

use crate::formats::BookListEntry;

/// Book list entries merged by `book_id` across list pages.
///
/// Entries keep first-seen order; a book met again only gains the new list
/// names.
#[derive(Debug, Default)]
pub struct BookCatalog {
    entries: Vec<BookListEntry>,
    index: HashMap<String, usize>,
}

impl BookCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<BookListEntry>) -> Self {
        let mut catalog = Self::new();
        catalog.merge(entries);
        catalog
    }

    pub fn merge(&mut self, entries: impl IntoIterator<Item = BookListEntry>) {
        for entry in entries {
            match self.index.get(&entry.book_id) {
                Some(&idx) => {
                    let known = &mut self.entries[idx];
                    for list in entry.book_lists {
                        if !known.book_lists.contains(&list) {
                            known.book_lists.push(list);
                        }
                    }
                }
                None => {
                    self.index.insert(entry.book_id.clone(), self.entries.len());
                    self.entries.push(entry);
                }
            }
        }
    }

    pub fn get(&self, book_id: &str) -> Option<&BookListEntry> {
        self.index.get(book_id).map(|&idx| &self.entries[idx])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[BookListEntry] {
        &self.entries
    }
}
