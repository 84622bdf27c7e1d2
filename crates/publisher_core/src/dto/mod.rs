//! Request and response shapes exchanged with callers.
//!
//! Field names serialize as camelCase (`bookCount`, `establishedDate`).

pub mod publisher_dto;
