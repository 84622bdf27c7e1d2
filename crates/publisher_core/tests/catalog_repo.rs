use chrono::NaiveDate;
use publisher_core::db::open_db_in_memory;
use publisher_core::{
    Book, BookReader, BookRepository, NewBook, NewPublisher, PublisherReader, PublisherRepository,
    RepoError, SqliteBookRepository, SqlitePublisherRepository,
};

fn new_publisher(name: &str) -> NewPublisher {
    NewPublisher {
        name: name.to_string(),
        established_date: None,
        address: None,
    }
}

#[test]
fn insert_and_find_roundtrip_preserves_optional_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePublisherRepository::new(&conn);

    let established = NaiveDate::from_ymd_opt(1998, 4, 1).unwrap();
    let saved = repo
        .insert(&NewPublisher {
            name: "Acme".to_string(),
            established_date: Some(established),
            address: Some("1 Main St".to_string()),
        })
        .unwrap();
    assert_eq!(saved.id, 1);

    let loaded = repo.find_by_id(saved.id).unwrap().unwrap();
    assert_eq!(loaded.name, "Acme");
    assert_eq!(loaded.established_date, Some(established));
    assert_eq!(loaded.address.as_deref(), Some("1 Main St"));
    assert!(loaded.books().is_empty());

    let by_name = repo.find_by_name("Acme").unwrap().unwrap();
    assert_eq!(by_name.id, saved.id);
    assert!(repo.find_by_name("acme").unwrap().is_none());
}

#[test]
fn existence_checks_by_id_and_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePublisherRepository::new(&conn);
    let saved = repo.insert(&new_publisher("Acme")).unwrap();

    assert!(repo.exists_by_id(saved.id).unwrap());
    assert!(!repo.exists_by_id(saved.id + 1).unwrap());
    assert!(repo.exists_by_name("Acme").unwrap());
    assert!(!repo.exists_by_name("Globex").unwrap());
}

#[test]
fn unique_index_rejects_duplicate_names_on_insert_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePublisherRepository::new(&conn);
    repo.insert(&new_publisher("Acme")).unwrap();
    let mut globex = repo.insert(&new_publisher("Globex")).unwrap();

    let err = repo.insert(&new_publisher("Acme")).unwrap_err();
    assert!(matches!(err, RepoError::DuplicateName(ref name) if name == "Acme"));

    globex.name = "Acme".to_string();
    let err = repo.update(&globex).unwrap_err();
    assert!(matches!(err, RepoError::DuplicateName(_)));
}

#[test]
fn find_by_id_with_books_links_every_book() {
    let conn = open_db_in_memory().unwrap();
    let publishers = SqlitePublisherRepository::new(&conn);
    let books = SqliteBookRepository::new(&conn);

    let acme = publishers.insert(&new_publisher("Acme")).unwrap();
    let globex = publishers.insert(&new_publisher("Globex")).unwrap();
    books.insert(&NewBook::new("First").published_by(acme.id)).unwrap();
    books.insert(&NewBook::new("Second").published_by(acme.id)).unwrap();
    books.insert(&NewBook::new("Elsewhere").published_by(globex.id)).unwrap();

    let loaded = publishers.find_by_id_with_books(acme.id).unwrap().unwrap();
    let titles: Vec<_> = loaded.books().iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second"]);
    assert!(loaded
        .books()
        .iter()
        .all(|book| book.publisher_id == Some(acme.id)));

    let empty = publishers.insert(&new_publisher("Initech")).unwrap();
    let loaded_empty = publishers.find_by_id_with_books(empty.id).unwrap().unwrap();
    assert!(loaded_empty.books().is_empty());

    assert!(publishers.find_by_id_with_books(999).unwrap().is_none());
}

#[test]
fn count_follows_ownership_saved_from_aggregates() {
    let conn = open_db_in_memory().unwrap();
    let publishers = SqlitePublisherRepository::new(&conn);
    let books = SqliteBookRepository::new(&conn);

    let acme = publishers.insert(&new_publisher("Acme")).unwrap();
    let mut globex = publishers.insert(&new_publisher("Globex")).unwrap();
    let book = books.insert(&NewBook::new("Moving").published_by(acme.id)).unwrap();
    books.insert(&NewBook::new("Unowned")).unwrap();
    assert_eq!(books.count_by_publisher_id(acme.id).unwrap(), 1);

    let mut loaded = publishers.find_by_id_with_books(acme.id).unwrap().unwrap();
    let moving = loaded.remove_book(book.id).unwrap();
    globex.add_book(moving);
    books.save_owner(&globex.books()[0]).unwrap();
    assert_eq!(books.count_by_publisher_id(acme.id).unwrap(), 0);
    assert_eq!(books.count_by_publisher_id(globex.id).unwrap(), 1);

    let detached = globex.remove_book(book.id).unwrap();
    books.save_owner(&detached).unwrap();
    let stored = books.find_by_id(book.id).unwrap().unwrap();
    assert_eq!(stored.publisher_id, None);

    let missing = Book {
        id: 999,
        ..detached
    };
    let err = books.save_owner(&missing).unwrap_err();
    assert!(matches!(err, RepoError::BookNotFound(999)));
}

#[test]
fn deleting_publisher_cascades_to_books_at_storage_layer() {
    let conn = open_db_in_memory().unwrap();
    let publishers = SqlitePublisherRepository::new(&conn);
    let books = SqliteBookRepository::new(&conn);

    let acme = publishers.insert(&new_publisher("Acme")).unwrap();
    let book = books.insert(&NewBook::new("Doomed").published_by(acme.id)).unwrap();

    publishers.delete_by_id(acme.id).unwrap();
    assert!(books.find_by_id(book.id).unwrap().is_none());
    assert!(matches!(
        publishers.delete_by_id(acme.id),
        Err(RepoError::PublisherNotFound(id)) if id == acme.id
    ));
}

#[test]
fn malformed_persisted_date_is_reported() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO publishers (name, established_date) VALUES ('Broken', 'last tuesday');",
        [],
    )
    .unwrap();

    let repo = SqlitePublisherRepository::new(&conn);
    let err = repo.find_all().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}
