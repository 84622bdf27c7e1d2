//! Publisher aggregate.
//!
//! # Responsibility
//! - Hold persisted publisher fields plus the loaded book collection.
//! - Keep both sides of the Publisher↔Book link consistent.
//!
//! # Invariants
//! - Every book in `books` has `publisher_id == Some(self.id)`.
//! - `name` is non-blank once persisted (see `PublisherValidationError`).

use crate::model::book::{Book, BookId};
use chrono::NaiveDate;
use thiserror::Error;

/// Storage-generated publisher identifier.
pub type PublisherId = i64;

/// Validation failures for publisher input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublisherValidationError {
    #[error("publisher name must not be blank")]
    BlankName,
}

/// Checks the publisher name rule shared by create and update.
pub fn validate_name(name: &str) -> Result<(), PublisherValidationError> {
    if name.trim().is_empty() {
        return Err(PublisherValidationError::BlankName);
    }
    Ok(())
}

/// Persisted publisher with its owned books.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publisher {
    pub id: PublisherId,
    pub name: String,
    pub established_date: Option<NaiveDate>,
    pub address: Option<String>,
    books: Vec<Book>,
}

/// Insert payload for a publisher; the id is assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPublisher {
    pub name: String,
    pub established_date: Option<NaiveDate>,
    pub address: Option<String>,
}

impl Publisher {
    /// Creates a publisher with no details and no books loaded.
    pub fn new(id: PublisherId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            established_date: None,
            address: None,
            books: Vec::new(),
        }
    }

    /// Builds the persisted form of an insert payload.
    pub fn from_new(id: PublisherId, new: NewPublisher) -> Self {
        Self {
            id,
            name: new.name,
            established_date: new.established_date,
            address: new.address,
            books: Vec::new(),
        }
    }

    /// Books loaded with this publisher.
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// Attaches `book` to this publisher, overwriting its back-reference.
    pub fn add_book(&mut self, mut book: Book) {
        book.publisher_id = Some(self.id);
        self.books.push(book);
    }

    /// Detaches the book with `book_id` and clears its back-reference.
    ///
    /// Returns `None` when the book is not part of this publisher.
    pub fn remove_book(&mut self, book_id: BookId) -> Option<Book> {
        let index = self.books.iter().position(|book| book.id == book_id)?;
        let mut book = self.books.remove(index);
        book.publisher_id = None;
        Some(book)
    }

    /// Replaces the editable fields. All three are applied, even when unchanged.
    pub fn apply_changes(
        &mut self,
        name: impl Into<String>,
        address: Option<String>,
        established_date: Option<NaiveDate>,
    ) {
        self.name = name.into();
        self.address = address;
        self.established_date = established_date;
    }
}
