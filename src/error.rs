//! Error and warning types for page extraction.
//!
//! Errors abort the record (or page) they occur in. Warnings never do: they
//! travel beside the extracted record in [`Extracted`] and the caller decides
//! whether to log them.

use thiserror::Error;

/// Extraction failures a caller must decide about.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// A review lacks an identity fragment (user, date) or carries a rating
    /// label of an unknown shape.
    #[error("malformed review: {0}")]
    MalformedReview(String),

    /// A structurally mandatory fragment is absent. Retrying never helps.
    #[error("missing fragment: {0}")]
    MissingFragment(String),

    /// The book id does not start with a run of digits.
    #[error("book id has no numeric prefix: {0}")]
    InvalidBookId(String),
}

impl ExtractError {
    pub fn malformed_review<S: Into<String>>(msg: S) -> Self {
        ExtractError::MalformedReview(msg.into())
    }

    pub fn missing_fragment<S: Into<String>>(what: S) -> Self {
        ExtractError::MissingFragment(what.into())
    }
}

/// Non-fatal findings. The affected field is left empty.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionWarning {
    #[error("edition has a nine-digit run but no ISBN shape: {edition:?}")]
    UnrecognizedIsbn { edition: String },

    #[error("could not parse {field} from {value:?}")]
    UnparseableNumber { field: &'static str, value: String },
}

/// A record together with the warnings raised while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted<T> {
    pub record: T,
    pub warnings: Vec<ExtractionWarning>,
}

impl<T> Extracted<T> {
    pub fn new(record: T, warnings: Vec<ExtractionWarning>) -> Self {
        Self { record, warnings }
    }

    pub fn into_record(self) -> T {
        self.record
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;
