//! Publisher request/response DTOs.
//!
//! # Invariants
//! - `PublisherSimpleResponse::book_count` is computed by a count query, never
//!   read from a loaded collection.
//! - `PublisherResponse::books` mirrors the books loaded with the publisher.

use crate::model::book::{Book, BookId};
use crate::model::publisher::{
    validate_name, NewPublisher, Publisher, PublisherId, PublisherValidationError,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Create/update input. Update replaces all three fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublisherRequest {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub established_date: Option<NaiveDate>,
}

impl PublisherRequest {
    /// Request with only the required name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
            established_date: None,
        }
    }

    pub fn validate(&self) -> Result<(), PublisherValidationError> {
        validate_name(&self.name)
    }

    pub fn to_new_publisher(&self) -> NewPublisher {
        NewPublisher {
            name: self.name.clone(),
            established_date: self.established_date,
            address: self.address.clone(),
        }
    }
}

/// List item: identity plus aggregate book count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublisherSimpleResponse {
    pub id: PublisherId,
    pub name: String,
    pub book_count: u64,
}

impl PublisherSimpleResponse {
    pub fn new(publisher: &Publisher, book_count: u64) -> Self {
        Self {
            id: publisher.id,
            name: publisher.name.clone(),
            book_count,
        }
    }
}

/// Book entry nested in a detailed publisher response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    pub id: BookId,
    pub title: String,
    pub author: Option<String>,
    pub isbn: Option<String>,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone(),
        }
    }
}

/// Detailed publisher view with its books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublisherResponse {
    pub id: PublisherId,
    pub name: String,
    pub address: Option<String>,
    pub established_date: Option<NaiveDate>,
    pub books: Vec<BookSummary>,
}

impl PublisherResponse {
    pub fn from_entity(publisher: &Publisher) -> Self {
        Self {
            id: publisher.id,
            name: publisher.name.clone(),
            address: publisher.address.clone(),
            established_date: publisher.established_date,
            books: publisher.books().iter().map(BookSummary::from).collect(),
        }
    }
}
