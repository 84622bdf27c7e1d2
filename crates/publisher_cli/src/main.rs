//! Command-line entry point for the publisher catalog.
//!
//! # Responsibility
//! - Map each publisher use-case to a subcommand.
//! - Print results as JSON and map typed failures to exit codes.

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use publisher_core::db::open_db;
use publisher_core::{
    default_log_level, init_logging, BookId, NewBook, PublisherId, PublisherRequest,
    PublisherService, PublisherServiceError,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "publisher", version, about = "Manage publishers and their books")]
struct Cli {
    /// SQLite database file.
    #[arg(long, env = "PUBLISHER_DB", default_value = "publishers.sqlite3")]
    db: PathBuf,

    /// Log level: trace|debug|info|warn|error.
    #[arg(long, env = "PUBLISHER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "PUBLISHER_LOG_DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List all publishers with their book counts.
    List,
    /// Show one publisher with its books.
    Get {
        #[arg(long, conflicts_with = "name", required_unless_present = "name")]
        id: Option<PublisherId>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Create a publisher.
    Create(PublisherArgs),
    /// Replace name, address and established date of a publisher.
    Update {
        id: PublisherId,
        #[command(flatten)]
        fields: PublisherArgs,
    },
    /// Delete a publisher that has no books.
    Delete { id: PublisherId },
    /// Add a book owned by a publisher.
    AddBook {
        publisher_id: PublisherId,
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        isbn: Option<String>,
    },
    /// Detach a book from its publisher; the book itself is kept.
    RemoveBook {
        publisher_id: PublisherId,
        book_id: BookId,
    },
}

#[derive(Debug, Args)]
struct PublisherArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    address: Option<String>,
    /// Date in YYYY-MM-DD form.
    #[arg(long)]
    established: Option<NaiveDate>,
}

impl From<PublisherArgs> for PublisherRequest {
    fn from(args: PublisherArgs) -> Self {
        Self {
            name: args.name,
            address: args.address,
            established_date: args.established,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;

    match cli.command {
        Command::List => print_json(&PublisherService::try_new(&mut conn)?.get_all_publishers()?),
        Command::Get { id: Some(id), .. } => {
            print_json(&PublisherService::try_new(&mut conn)?.get_publisher_by_id(id)?)
        }
        Command::Get {
            name: Some(name), ..
        } => print_json(&PublisherService::try_new(&mut conn)?.get_publisher_by_name(&name)?),
        Command::Get { .. } => anyhow::bail!("either --id or --name is required"),
        Command::Create(args) => {
            let request = PublisherRequest::from(args);
            print_json(&PublisherService::try_new(&mut conn)?.create_publisher(&request)?)
        }
        Command::Update { id, fields } => {
            let request = PublisherRequest::from(fields);
            print_json(&PublisherService::try_new(&mut conn)?.update_publisher(id, &request)?)
        }
        Command::Delete { id } => {
            PublisherService::try_new(&mut conn)?.delete_publisher(id)?;
            print_json(&serde_json::json!({ "deleted": id }))
        }
        Command::AddBook {
            publisher_id,
            title,
            author,
            isbn,
        } => {
            let book = NewBook {
                title,
                author,
                isbn,
                publisher_id: None,
            };
            print_json(&PublisherService::try_new(&mut conn)?.add_book(publisher_id, book)?)
        }
        Command::RemoveBook {
            publisher_id,
            book_id,
        } => {
            let mut service = PublisherService::try_new(&mut conn)?;
            print_json(&service.remove_book(publisher_id, book_id)?)
        }
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report(err: &anyhow::Error) -> ExitCode {
    let (code, exit) = match err.downcast_ref::<PublisherServiceError>() {
        Some(service_err) => (service_err.code(), exit_code_for(service_err)),
        None => ("INTERNAL_ERROR", 1),
    };
    let body = ErrorBody {
        code,
        message: format!("{err:#}"),
    };
    match serde_json::to_string(&body) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!("{code}: {err:#}"),
    }
    ExitCode::from(exit)
}

fn exit_code_for(err: &PublisherServiceError) -> u8 {
    match err {
        PublisherServiceError::NotFound { .. } => 2,
        PublisherServiceError::DuplicateName(_) => 3,
        PublisherServiceError::HasDependents { .. } => 4,
        PublisherServiceError::Validation(_) => 5,
        PublisherServiceError::Repo(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::{exit_code_for, report, run, Cli, Command};
    use clap::Parser;
    use publisher_core::{PublisherRequest, PublisherServiceError};
    use std::process::ExitCode;

    #[test]
    fn parses_update_with_all_fields() {
        let cli = Cli::try_parse_from([
            "publisher",
            "--db",
            "/tmp/catalog.db",
            "update",
            "3",
            "--name",
            "Acme",
            "--established",
            "1999-12-31",
        ])
        .unwrap();

        match cli.command {
            Command::Update { id, fields } => {
                assert_eq!(id, 3);
                let request = PublisherRequest::from(fields);
                assert_eq!(request.name, "Acme");
                assert_eq!(request.address, None);
                assert_eq!(
                    request.established_date,
                    chrono::NaiveDate::from_ymd_opt(1999, 12, 31)
                );
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn get_requires_exactly_one_key() {
        assert!(Cli::try_parse_from(["publisher", "get"]).is_err());
        assert!(Cli::try_parse_from(["publisher", "get", "--id", "1", "--name", "Acme"]).is_err());
        assert!(Cli::try_parse_from(["publisher", "get", "--name", "Acme"]).is_ok());
    }

    #[test]
    fn rejects_malformed_dates() {
        let parsed = Cli::try_parse_from([
            "publisher",
            "create",
            "--name",
            "Acme",
            "--established",
            "31/12/1999",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn business_failures_map_to_distinct_exit_codes() {
        let duplicate = PublisherServiceError::DuplicateName("Acme".to_string());
        let dependents = PublisherServiceError::HasDependents { id: 1, count: 2 };
        assert_eq!(exit_code_for(&duplicate), 3);
        assert_eq!(exit_code_for(&dependents), 4);
    }

    #[test]
    fn add_book_to_missing_publisher_exits_as_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("catalog.db");
        let cli = Cli::try_parse_from([
            "publisher",
            "--db",
            db.to_str().unwrap(),
            "add-book",
            "42",
            "--title",
            "Orphan",
        ])
        .unwrap();

        let err = run(cli).unwrap_err();
        let service_err = err
            .downcast_ref::<PublisherServiceError>()
            .expect("typed service error");
        assert_eq!(service_err.code(), "RESOURCE_NOT_FOUND");
        assert_eq!(exit_code_for(service_err), 2);
        assert_eq!(report(&err), ExitCode::from(2));
    }
}
