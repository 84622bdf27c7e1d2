//! Catalog domain model.
//!
//! # Responsibility
//! - Define the Publisher and Book records used by repositories and services.
//! - Own the synchronization of the Publisher↔Book link.
//!
//! # Invariants
//! - `Book::publisher_id` is the single source of truth for ownership.
//! - A `Publisher`'s book collection only changes through `add_book` /
//!   `remove_book`.

pub mod book;
pub mod publisher;
