//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define reader/writer data access contracts per record type.
//! - Isolate SQL details from service orchestration.
//!
//! # Invariants
//! - Reader traits never issue write statements.
//! - A unique-index violation on `publishers.name` surfaces as
//!   `RepoError::DuplicateName`, never as a raw SQLite error.

use crate::db::DbError;
use crate::model::book::BookId;
use crate::model::publisher::PublisherId;
use thiserror::Error;

pub mod book_repo;
pub mod publisher_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for catalog persistence and query operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("publisher name already exists: {0}")]
    DuplicateName(String),
    #[error("publisher not found: {0}")]
    PublisherNotFound(PublisherId),
    #[error("book not found: {0}")]
    BookNotFound(BookId),
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
