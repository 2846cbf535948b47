//! Parsed-document abstraction used by the extractors.
//!
//! Extraction code is written against [`Fragment`] rather than a concrete
//! parser so it can run over `scraper` trees in production and over small
//! hand-built trees in tests.

/// One element of a parsed document tree.
pub trait Fragment: Clone {
    /// Lower-case tag name.
    fn tag_name(&self) -> &str;

    fn attribute(&self, name: &str) -> Option<&str>;

    /// Enclosing element, `None` at the document root.
    fn parent_fragment(&self) -> Option<Self>;

    /// Descendant elements in document order, excluding `self`.
    fn fragments(&self) -> Vec<Self>;

    /// Descendant text nodes in document order.
    fn text_chunks(&self) -> Vec<&str>;

    fn is(&self, tag: &str) -> bool {
        self.tag_name().eq_ignore_ascii_case(tag)
    }

    fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|value| value.split_whitespace().any(|c| c == class))
    }

    /// True when every whitespace-separated class in `classes` is present.
    fn has_classes(&self, classes: &str) -> bool {
        classes.split_whitespace().all(|class| self.has_class(class))
    }

    fn is_tagged(&self, tag: &str, class: &str) -> bool {
        self.is(tag) && self.has_class(class)
    }

    /// True when the whitespace-separated attribute value contains `token`
    /// (e.g. `rel="alternate canonical"`).
    fn attribute_has_token(&self, name: &str, token: &str) -> bool {
        self.attribute(name)
            .is_some_and(|value| value.split_whitespace().any(|t| t == token))
    }

    fn find_first<P>(&self, predicate: P) -> Option<Self>
    where
        P: Fn(&Self) -> bool,
    {
        self.fragments().into_iter().find(|fragment| predicate(fragment))
    }

    fn find_all<P>(&self, predicate: P) -> Vec<Self>
    where
        P: Fn(&Self) -> bool,
    {
        self.fragments()
            .into_iter()
            .filter(|fragment| predicate(fragment))
            .collect()
    }

    fn text_content(&self) -> String {
        self.text_chunks().concat()
    }

    fn stripped_text(&self) -> String {
        self.text_content().trim().to_owned()
    }

    /// Text chunks with surrounding whitespace removed; blank chunks dropped.
    fn stripped_strings(&self) -> Vec<String> {
        self.text_chunks()
            .into_iter()
            .map(str::trim)
            .filter(|chunk| !chunk.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

impl<'a> Fragment for scraper::ElementRef<'a> {
    fn tag_name(&self) -> &str {
        self.value().name()
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.value().attr(name)
    }

    fn parent_fragment(&self) -> Option<Self> {
        self.parent().and_then(scraper::ElementRef::wrap)
    }

    fn fragments(&self) -> Vec<Self> {
        self.descendants()
            .skip(1)
            .filter_map(scraper::ElementRef::wrap)
            .collect()
    }

    fn text_chunks(&self) -> Vec<&str> {
        self.text().collect()
    }
}

pub fn parse_html(html: &str) -> scraper::Html {
    scraper::Html::parse_document(html)
}
