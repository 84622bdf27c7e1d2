//! Book repository contracts and SQLite implementation.
//!
//! Publisher rules only need counts and ownership. Ownership changes are made
//! on a loaded `Publisher` aggregate and then persisted with `save_owner`.

use crate::model::book::{Book, BookId, NewBook};
use crate::model::publisher::PublisherId;
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const BOOK_SELECT_SQL: &str = "SELECT
    book_id,
    title,
    author,
    isbn,
    publisher_id
FROM books";

/// Read-side book queries.
pub trait BookReader {
    /// Number of books whose back-reference equals `publisher_id`.
    fn count_by_publisher_id(&self, publisher_id: PublisherId) -> RepoResult<u64>;
    fn find_by_publisher_id(&self, publisher_id: PublisherId) -> RepoResult<Vec<Book>>;
    fn find_by_id(&self, id: BookId) -> RepoResult<Option<Book>>;
}

/// Write-side book operations.
pub trait BookRepository: BookReader {
    fn insert(&self, book: &NewBook) -> RepoResult<Book>;
    /// Persists the back-reference currently held by `book`.
    fn save_owner(&self, book: &Book) -> RepoResult<()>;
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl BookReader for SqliteBookRepository<'_> {
    fn count_by_publisher_id(&self, publisher_id: PublisherId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM books WHERE publisher_id = ?1;",
            [publisher_id],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative book count `{count}`")))
    }

    fn find_by_publisher_id(&self, publisher_id: PublisherId) -> RepoResult<Vec<Book>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BOOK_SELECT_SQL} WHERE publisher_id = ?1 ORDER BY book_id ASC;"
        ))?;
        let mut rows = stmt.query([publisher_id])?;
        let mut books = Vec::new();
        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }
        Ok(books)
    }

    fn find_by_id(&self, id: BookId) -> RepoResult<Option<Book>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOK_SELECT_SQL} WHERE book_id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_book_row(row)?)),
            None => Ok(None),
        }
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn insert(&self, book: &NewBook) -> RepoResult<Book> {
        self.conn.execute(
            "INSERT INTO books (title, author, isbn, publisher_id)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                book.title.as_str(),
                book.author.as_deref(),
                book.isbn.as_deref(),
                book.publisher_id,
            ],
        )?;

        Ok(Book {
            id: self.conn.last_insert_rowid(),
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone(),
            publisher_id: book.publisher_id,
        })
    }

    fn save_owner(&self, book: &Book) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE books SET publisher_id = ?1 WHERE book_id = ?2;",
            params![book.publisher_id, book.id],
        )?;
        if changed == 0 {
            return Err(RepoError::BookNotFound(book.id));
        }
        Ok(())
    }
}

fn parse_book_row(row: &Row<'_>) -> RepoResult<Book> {
    Ok(Book {
        id: row.get("book_id")?,
        title: row.get("title")?,
        author: row.get("author")?,
        isbn: row.get("isbn")?,
        publisher_id: row.get("publisher_id")?,
    })
}
