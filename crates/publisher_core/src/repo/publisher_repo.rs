//! Publisher repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide lookups by id, by name and existence checks over `publishers`.
//! - Load a publisher together with its books in one joined query.
//! - Provide insert/update/delete for the service write paths.
//!
//! # Invariants
//! - `find_all` is ordered by `publisher_id ASC`.
//! - Name lookups are exact, case-sensitive matches.
//! - Read paths reject malformed persisted dates instead of masking them.

use crate::model::book::Book;
use crate::model::publisher::{NewPublisher, Publisher, PublisherId};
use crate::repo::{RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

const PUBLISHER_SELECT_SQL: &str = "SELECT
    publisher_id,
    name,
    established_date,
    address
FROM publishers";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Read-side publisher queries.
pub trait PublisherReader {
    fn find_all(&self) -> RepoResult<Vec<Publisher>>;
    /// Loads the publisher row only; `books()` is empty.
    fn find_by_id(&self, id: PublisherId) -> RepoResult<Option<Publisher>>;
    /// Loads the publisher and all of its books.
    fn find_by_id_with_books(&self, id: PublisherId) -> RepoResult<Option<Publisher>>;
    fn find_by_name(&self, name: &str) -> RepoResult<Option<Publisher>>;
    fn exists_by_id(&self, id: PublisherId) -> RepoResult<bool>;
    fn exists_by_name(&self, name: &str) -> RepoResult<bool>;
}

/// Write-side publisher operations.
pub trait PublisherRepository: PublisherReader {
    /// Inserts a publisher and returns it with its generated id.
    fn insert(&self, publisher: &NewPublisher) -> RepoResult<Publisher>;
    /// Persists name, address and established date of `publisher`.
    fn update(&self, publisher: &Publisher) -> RepoResult<()>;
    /// Deletes the publisher row. Books cascade at the storage layer.
    fn delete_by_id(&self, id: PublisherId) -> RepoResult<()>;
}

/// SQLite-backed publisher repository.
pub struct SqlitePublisherRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePublisherRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PublisherReader for SqlitePublisherRepository<'_> {
    fn find_all(&self) -> RepoResult<Vec<Publisher>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PUBLISHER_SELECT_SQL} ORDER BY publisher_id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut publishers = Vec::new();
        while let Some(row) = rows.next()? {
            publishers.push(parse_publisher_row(row)?);
        }
        Ok(publishers)
    }

    fn find_by_id(&self, id: PublisherId) -> RepoResult<Option<Publisher>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PUBLISHER_SELECT_SQL} WHERE publisher_id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_publisher_row(row)?)),
            None => Ok(None),
        }
    }

    fn find_by_id_with_books(&self, id: PublisherId) -> RepoResult<Option<Publisher>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                p.publisher_id AS publisher_id,
                p.name AS name,
                p.established_date AS established_date,
                p.address AS address,
                b.book_id AS book_id,
                b.title AS title,
                b.author AS author,
                b.isbn AS isbn
             FROM publishers p
             LEFT JOIN books b ON b.publisher_id = p.publisher_id
             WHERE p.publisher_id = ?1
             ORDER BY b.book_id ASC;",
        )?;
        let mut rows = stmt.query([id])?;

        let Some(first) = rows.next()? else {
            return Ok(None);
        };
        let mut publisher = parse_publisher_row(first)?;
        attach_joined_book(&mut publisher, first)?;
        while let Some(row) = rows.next()? {
            attach_joined_book(&mut publisher, row)?;
        }

        Ok(Some(publisher))
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Publisher>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PUBLISHER_SELECT_SQL} WHERE name = ?1;"))?;
        let mut rows = stmt.query([name])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_publisher_row(row)?)),
            None => Ok(None),
        }
    }

    fn exists_by_id(&self, id: PublisherId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM publishers WHERE publisher_id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn exists_by_name(&self, name: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM publishers WHERE name = ?1);",
            [name],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

impl PublisherRepository for SqlitePublisherRepository<'_> {
    fn insert(&self, publisher: &NewPublisher) -> RepoResult<Publisher> {
        self.conn
            .execute(
                "INSERT INTO publishers (name, established_date, address)
                 VALUES (?1, ?2, ?3);",
                params![
                    publisher.name.as_str(),
                    publisher.established_date,
                    publisher.address.as_deref(),
                ],
            )
            .map_err(|err| map_unique_violation(err, &publisher.name))?;

        Ok(Publisher::from_new(
            self.conn.last_insert_rowid(),
            publisher.clone(),
        ))
    }

    fn update(&self, publisher: &Publisher) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE publishers
                 SET
                    name = ?1,
                    established_date = ?2,
                    address = ?3
                 WHERE publisher_id = ?4;",
                params![
                    publisher.name.as_str(),
                    publisher.established_date,
                    publisher.address.as_deref(),
                    publisher.id,
                ],
            )
            .map_err(|err| map_unique_violation(err, &publisher.name))?;

        if changed == 0 {
            return Err(RepoError::PublisherNotFound(publisher.id));
        }
        Ok(())
    }

    fn delete_by_id(&self, id: PublisherId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM publishers WHERE publisher_id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::PublisherNotFound(id));
        }
        Ok(())
    }
}

fn parse_publisher_row(row: &Row<'_>) -> RepoResult<Publisher> {
    let established_date = match row.get::<_, Option<String>>("established_date")? {
        Some(text) => Some(NaiveDate::parse_from_str(&text, DATE_FORMAT).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid date `{text}` in publishers.established_date"
            ))
        })?),
        None => None,
    };

    let mut publisher = Publisher::new(row.get("publisher_id")?, row.get::<_, String>("name")?);
    publisher.established_date = established_date;
    publisher.address = row.get("address")?;
    Ok(publisher)
}

/// Adds the book columns of one `find_by_id_with_books` row, if present.
fn attach_joined_book(publisher: &mut Publisher, row: &Row<'_>) -> RepoResult<()> {
    if let Some(book_id) = row.get::<_, Option<i64>>("book_id")? {
        publisher.add_book(Book {
            id: book_id,
            title: row.get("title")?,
            author: row.get("author")?,
            isbn: row.get("isbn")?,
            publisher_id: None,
        });
    }
    Ok(())
}

fn map_unique_violation(err: rusqlite::Error, name: &str) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            RepoError::DuplicateName(name.to_string())
        }
        _ => err.into(),
    }
}
