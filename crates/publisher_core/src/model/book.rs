//! Book record.
//!
//! Books are owned by at most one publisher. Only their identity and
//! back-reference matter to publisher rules; the remaining fields are carried
//! for response shaping.

use crate::model::publisher::PublisherId;

/// Storage-generated book identifier.
pub type BookId = i64;

/// Persisted book row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: Option<String>,
    pub isbn: Option<String>,
    /// Owning publisher. Changed only through `Publisher::add_book` /
    /// `Publisher::remove_book`, then persisted with `save_owner`.
    pub publisher_id: Option<PublisherId>,
}

/// Insert payload for a book; the id is assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewBook {
    pub title: String,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub publisher_id: Option<PublisherId>,
}

impl NewBook {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the owning publisher.
    pub fn published_by(mut self, publisher_id: PublisherId) -> Self {
        self.publisher_id = Some(publisher_id);
        self
    }
}
