//! Explicit transaction scopes for service operations.
//!
//! # Responsibility
//! - Run one unit of work inside one SQLite transaction.
//! - Hand out repositories bound to that transaction.
//!
//! # Invariants
//! - [`ReadScope`] only exposes reader traits, and the connection is switched
//!   to `query_only` for the scope lifetime, so writes fail inside it.
//! - [`WriteScope`] commits only when the unit of work returns `Ok`; any
//!   `Err` rolls the transaction back.

use crate::repo::book_repo::{BookReader, SqliteBookRepository};
use crate::repo::publisher_repo::{PublisherReader, SqlitePublisherRepository};
use log::debug;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Read-only transaction scope.
pub struct ReadScope<'conn> {
    tx: Transaction<'conn>,
}

impl ReadScope<'_> {
    /// Publisher queries bound to this scope.
    pub fn publishers(&self) -> impl PublisherReader + '_ {
        SqlitePublisherRepository::new(&self.tx)
    }

    /// Book queries bound to this scope.
    pub fn books(&self) -> impl BookReader + '_ {
        SqliteBookRepository::new(&self.tx)
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.tx
    }
}

/// Read-write transaction scope.
pub struct WriteScope<'conn> {
    tx: Transaction<'conn>,
}

impl WriteScope<'_> {
    /// Publisher repository bound to this scope.
    pub fn publishers(&self) -> SqlitePublisherRepository<'_> {
        SqlitePublisherRepository::new(&self.tx)
    }

    /// Book repository bound to this scope.
    pub fn books(&self) -> SqliteBookRepository<'_> {
        SqliteBookRepository::new(&self.tx)
    }
}

/// Runs `work` inside a deferred, query-only transaction.
///
/// The `query_only` flag is cleared again before returning, whatever the
/// outcome of `work`.
pub fn read_only<T, E, F>(conn: &mut Connection, work: F) -> Result<T, E>
where
    E: From<rusqlite::Error>,
    F: FnOnce(&ReadScope<'_>) -> Result<T, E>,
{
    let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;
    tx.pragma_update(None, "query_only", true)?;
    let scope = ReadScope { tx };

    let outcome = work(&scope);

    let tx = scope.tx;
    tx.pragma_update(None, "query_only", false)?;
    match outcome {
        Ok(value) => {
            tx.commit()?;
            debug!("event=scope_end module=db mode=read_only status=ok");
            Ok(value)
        }
        Err(err) => {
            tx.rollback()?;
            debug!("event=scope_end module=db mode=read_only status=error");
            Err(err)
        }
    }
}

/// Runs `work` inside an immediate read-write transaction.
///
/// Commits when `work` succeeds; rolls back and returns the error otherwise.
pub fn read_write<T, E, F>(conn: &mut Connection, work: F) -> Result<T, E>
where
    E: From<rusqlite::Error>,
    F: FnOnce(&WriteScope<'_>) -> Result<T, E>,
{
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let scope = WriteScope { tx };

    match work(&scope) {
        Ok(value) => {
            scope.tx.commit()?;
            debug!("event=scope_end module=db mode=read_write status=committed");
            Ok(value)
        }
        Err(err) => {
            scope.tx.rollback()?;
            debug!("event=scope_end module=db mode=read_write status=rolled_back");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{read_only, read_write};
    use crate::db::open_db_in_memory;
    use crate::model::publisher::NewPublisher;
    use crate::repo::publisher_repo::PublisherRepository;
    use crate::repo::RepoError;

    fn publisher_rows(conn: &rusqlite::Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM publishers;", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn read_only_scope_rejects_writes() {
        let mut conn = open_db_in_memory().unwrap();

        let result: Result<(), rusqlite::Error> = read_only(&mut conn, |scope| {
            scope
                .connection()
                .execute("INSERT INTO publishers (name) VALUES ('Acme');", [])?;
            Ok(())
        });

        assert!(result.is_err());
        assert_eq!(publisher_rows(&conn), 0);
    }

    #[test]
    fn read_only_flag_is_cleared_after_scope() {
        let mut conn = open_db_in_memory().unwrap();
        read_only::<_, rusqlite::Error, _>(&mut conn, |_| Ok(())).unwrap();

        conn.execute("INSERT INTO publishers (name) VALUES ('Acme');", [])
            .unwrap();
        assert_eq!(publisher_rows(&conn), 1);
    }

    #[test]
    fn write_scope_rolls_back_on_error() {
        let mut conn = open_db_in_memory().unwrap();

        let result: Result<(), RepoError> = read_write(&mut conn, |scope| {
            scope.publishers().insert(&NewPublisher {
                name: "Acme".to_string(),
                established_date: None,
                address: None,
            })?;
            Err(RepoError::InvalidData("abort after insert".to_string()))
        });

        assert!(matches!(result, Err(RepoError::InvalidData(_))));
        assert_eq!(publisher_rows(&conn), 0);
    }

    #[test]
    fn write_scope_commits_on_success() {
        let mut conn = open_db_in_memory().unwrap();

        let saved = read_write::<_, RepoError, _>(&mut conn, |scope| {
            scope.publishers().insert(&NewPublisher {
                name: "Acme".to_string(),
                established_date: None,
                address: None,
            })
        })
        .unwrap();

        assert_eq!(saved.id, 1);
        assert_eq!(publisher_rows(&conn), 1);
    }
}
