//! Core domain logic for the publisher catalog.
//! This crate is the single source of truth for publisher business rules.

pub mod db;
pub mod dto;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use dto::publisher_dto::{
    BookSummary, PublisherRequest, PublisherResponse, PublisherSimpleResponse,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::book::{Book, BookId, NewBook};
pub use model::publisher::{NewPublisher, Publisher, PublisherId, PublisherValidationError};
pub use repo::book_repo::{BookReader, BookRepository, SqliteBookRepository};
pub use repo::publisher_repo::{PublisherReader, PublisherRepository, SqlitePublisherRepository};
pub use repo::{RepoError, RepoResult};
pub use service::publisher_service::{
    LookupValue, PublisherService, PublisherServiceError, ServiceResult,
};
