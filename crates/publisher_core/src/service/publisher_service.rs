//! Publisher use-case service.
//!
//! # Responsibility
//! - Enforce publisher business rules: unique names, no delete while books
//!   exist.
//! - Run each operation inside one transaction scope and shape its output.
//!
//! # Invariants
//! - Queries run in read-only scopes; every mutation runs in a read-write scope.
//! - Book ownership only changes through the loaded `Publisher` aggregate.
//! - Every predictable failure is one of `NotFound`, `DuplicateName`,
//!   `HasDependents` or `Validation`; nothing is retried or swallowed.
//! - A failed write leaves storage untouched (scope rollback).

use crate::db::{ensure_schema_ready, read_only, read_write, DbError};
use crate::dto::publisher_dto::{PublisherRequest, PublisherResponse, PublisherSimpleResponse};
use crate::model::book::{BookId, NewBook};
use crate::model::publisher::{PublisherId, PublisherValidationError};
use crate::repo::book_repo::{BookReader, BookRepository};
use crate::repo::publisher_repo::{PublisherReader, PublisherRepository};
use crate::repo::RepoError;
use log::{info, warn};
use rusqlite::Connection;
use std::fmt::{Display, Formatter};
use thiserror::Error;

const PUBLISHER_ENTITY: &str = "Publisher";
const BOOK_ENTITY: &str = "Book";

pub type ServiceResult<T> = Result<T, PublisherServiceError>;

/// Key used by a failed lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupValue {
    Id(i64),
    Name(String),
}

impl Display for LookupValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

/// Service error for publisher use-cases.
#[derive(Debug, Error)]
pub enum PublisherServiceError {
    #[error("{entity} not found with {field}: {value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: LookupValue,
    },
    #[error("publisher name already exists: {0}")]
    DuplicateName(String),
    #[error("publisher {id} still has {count} book(s)")]
    HasDependents { id: PublisherId, count: u64 },
    #[error(transparent)]
    Validation(#[from] PublisherValidationError),
    #[error(transparent)]
    Repo(RepoError),
}

impl PublisherServiceError {
    fn publisher_id_not_found(id: PublisherId) -> Self {
        Self::NotFound {
            entity: PUBLISHER_ENTITY,
            field: "id",
            value: LookupValue::Id(id),
        }
    }

    fn book_id_not_found(id: BookId) -> Self {
        Self::NotFound {
            entity: BOOK_ENTITY,
            field: "id",
            value: LookupValue::Id(id),
        }
    }

    fn publisher_name_not_found(name: &str) -> Self {
        Self::NotFound {
            entity: PUBLISHER_ENTITY,
            field: "name",
            value: LookupValue::Name(name.to_string()),
        }
    }

    /// Stable machine-readable code for boundary layers and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "RESOURCE_NOT_FOUND",
            Self::DuplicateName(_) => "PUBLISHER_NAME_DUPLICATE",
            Self::HasDependents { .. } => "PUBLISHER_HAS_BOOKS",
            Self::Validation(_) => "INVALID_INPUT",
            Self::Repo(_) => "STORAGE_FAILURE",
        }
    }
}

impl From<RepoError> for PublisherServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateName(name) => Self::DuplicateName(name),
            RepoError::PublisherNotFound(id) => Self::publisher_id_not_found(id),
            RepoError::BookNotFound(id) => Self::book_id_not_found(id),
            other => Self::Repo(other),
        }
    }
}

impl From<DbError> for PublisherServiceError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

impl From<rusqlite::Error> for PublisherServiceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}

/// Publisher service bound to one migrated connection.
pub struct PublisherService<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> PublisherService<'conn> {
    /// Creates a service after checking the connection schema is current.
    pub fn try_new(conn: &'conn mut Connection) -> ServiceResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    /// Lists every publisher with its book count, ordered by id.
    pub fn get_all_publishers(&mut self) -> ServiceResult<Vec<PublisherSimpleResponse>> {
        read_only(self.conn, |scope| {
            let books = scope.books();
            scope
                .publishers()
                .find_all()?
                .iter()
                .map(|publisher| -> ServiceResult<PublisherSimpleResponse> {
                    let count = books.count_by_publisher_id(publisher.id)?;
                    Ok(PublisherSimpleResponse::new(publisher, count))
                })
                .collect()
        })
    }

    /// Loads one publisher and its books by id.
    pub fn get_publisher_by_id(&mut self, id: PublisherId) -> ServiceResult<PublisherResponse> {
        read_only(self.conn, |scope| {
            let publisher = scope
                .publishers()
                .find_by_id_with_books(id)?
                .ok_or_else(|| PublisherServiceError::publisher_id_not_found(id))?;
            Ok(PublisherResponse::from_entity(&publisher))
        })
    }

    /// Loads one publisher and its books by exact name.
    pub fn get_publisher_by_name(&mut self, name: &str) -> ServiceResult<PublisherResponse> {
        read_only(self.conn, |scope| {
            let mut publisher = scope
                .publishers()
                .find_by_name(name)?
                .ok_or_else(|| PublisherServiceError::publisher_name_not_found(name))?;
            for book in scope.books().find_by_publisher_id(publisher.id)? {
                publisher.add_book(book);
            }
            Ok(PublisherResponse::from_entity(&publisher))
        })
    }

    /// Creates a publisher with a name no other publisher holds.
    pub fn create_publisher(
        &mut self,
        request: &PublisherRequest,
    ) -> ServiceResult<PublisherResponse> {
        let outcome = self.insert_publisher(request);
        match &outcome {
            Ok(response) => info!(
                "event=publisher_create module=service status=ok publisher_id={}",
                response.id
            ),
            Err(err) => log_rejected("publisher_create", err),
        }
        outcome
    }

    /// Replaces name, address and established date of an existing publisher.
    ///
    /// Keeping the current name never counts as a duplicate.
    pub fn update_publisher(
        &mut self,
        id: PublisherId,
        request: &PublisherRequest,
    ) -> ServiceResult<PublisherResponse> {
        let outcome = self.replace_publisher(id, request);
        match &outcome {
            Ok(_) => info!("event=publisher_update module=service status=ok publisher_id={id}"),
            Err(err) => log_rejected("publisher_update", err),
        }
        outcome
    }

    /// Deletes a publisher that owns no books.
    pub fn delete_publisher(&mut self, id: PublisherId) -> ServiceResult<()> {
        let outcome: ServiceResult<_> = read_write(self.conn, |scope| {
            let publishers = scope.publishers();
            if !publishers.exists_by_id(id)? {
                return Err(PublisherServiceError::publisher_id_not_found(id));
            }

            let count = scope.books().count_by_publisher_id(id)?;
            if count > 0 {
                return Err(PublisherServiceError::HasDependents { id, count });
            }

            publishers.delete_by_id(id)?;
            Ok(())
        });

        match &outcome {
            Ok(()) => info!("event=publisher_delete module=service status=ok publisher_id={id}"),
            Err(err) => log_rejected("publisher_delete", err),
        }
        outcome
    }

    /// Stores a new book owned by an existing publisher.
    ///
    /// Any owner set on `book` is replaced by `publisher_id`.
    pub fn add_book(
        &mut self,
        publisher_id: PublisherId,
        book: NewBook,
    ) -> ServiceResult<PublisherResponse> {
        let outcome: ServiceResult<_> = read_write(self.conn, |scope| {
            let mut publisher = scope
                .publishers()
                .find_by_id_with_books(publisher_id)?
                .ok_or_else(|| PublisherServiceError::publisher_id_not_found(publisher_id))?;

            let saved = scope.books().insert(&NewBook {
                publisher_id: Some(publisher_id),
                ..book
            })?;
            publisher.add_book(saved);
            Ok(PublisherResponse::from_entity(&publisher))
        });

        match &outcome {
            Ok(_) => info!(
                "event=publisher_add_book module=service status=ok publisher_id={publisher_id}"
            ),
            Err(err) => log_rejected("publisher_add_book", err),
        }
        outcome
    }

    /// Detaches one of the publisher's books; the book row is kept unowned.
    pub fn remove_book(
        &mut self,
        publisher_id: PublisherId,
        book_id: BookId,
    ) -> ServiceResult<PublisherResponse> {
        let outcome: ServiceResult<_> = read_write(self.conn, |scope| {
            let mut publisher = scope
                .publishers()
                .find_by_id_with_books(publisher_id)?
                .ok_or_else(|| PublisherServiceError::publisher_id_not_found(publisher_id))?;

            let detached = publisher
                .remove_book(book_id)
                .ok_or_else(|| PublisherServiceError::book_id_not_found(book_id))?;
            scope.books().save_owner(&detached)?;
            Ok(PublisherResponse::from_entity(&publisher))
        });

        match &outcome {
            Ok(_) => info!(
                "event=publisher_remove_book module=service status=ok publisher_id={publisher_id} book_id={book_id}"
            ),
            Err(err) => log_rejected("publisher_remove_book", err),
        }
        outcome
    }

    fn insert_publisher(&mut self, request: &PublisherRequest) -> ServiceResult<PublisherResponse> {
        request.validate()?;

        read_write(self.conn, |scope| {
            let publishers = scope.publishers();
            if publishers.exists_by_name(&request.name)? {
                return Err(PublisherServiceError::DuplicateName(request.name.clone()));
            }
            let saved = publishers.insert(&request.to_new_publisher())?;
            Ok(PublisherResponse::from_entity(&saved))
        })
    }

    fn replace_publisher(
        &mut self,
        id: PublisherId,
        request: &PublisherRequest,
    ) -> ServiceResult<PublisherResponse> {
        request.validate()?;

        read_write(self.conn, |scope| {
            let publishers = scope.publishers();
            let mut publisher = publishers
                .find_by_id_with_books(id)?
                .ok_or_else(|| PublisherServiceError::publisher_id_not_found(id))?;

            if publisher.name != request.name && publishers.exists_by_name(&request.name)? {
                return Err(PublisherServiceError::DuplicateName(request.name.clone()));
            }

            publisher.apply_changes(
                request.name.clone(),
                request.address.clone(),
                request.established_date,
            );
            publishers.update(&publisher)?;
            Ok(PublisherResponse::from_entity(&publisher))
        })
    }
}

fn log_rejected(event: &str, err: &PublisherServiceError) {
    warn!(
        "event={event} module=service status=rejected error_code={}",
        err.code()
    );
}
